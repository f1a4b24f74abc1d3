//! # Environment Configuration
//!
//! Traversal-limit overrides read from the environment.
//!
//! | Variable                | Overrides                         |
//! |-------------------------|-----------------------------------|
//! | `FERROSCOPE_LIST_DEPTH` | list depth bound                  |
//! | `FERROSCOPE_TREE_DEPTH` | tree depth bound                  |
//! | `FERROSCOPE_LIST_NODES` | `std::list` node cap              |
//! | `FERROSCOPE_CELL_WIDTH` | array/vector cell width in chars  |
//! | `FERROSCOPE_TABLE_CELLS`| array/vector cells shown          |
//!
//! Unset variables leave the built-in default in place. Command-line flags
//! take precedence over anything read here.

use std::env;
use std::str::FromStr;

use tracing::debug;

/// List depth bound
pub const LIST_DEPTH_VAR: &str = "FERROSCOPE_LIST_DEPTH";
/// Tree depth bound
pub const TREE_DEPTH_VAR: &str = "FERROSCOPE_TREE_DEPTH";
/// Node-list node cap
pub const LIST_NODES_VAR: &str = "FERROSCOPE_LIST_NODES";
/// Table cell width
pub const CELL_WIDTH_VAR: &str = "FERROSCOPE_CELL_WIDTH";
/// Table cell cap
pub const TABLE_CELLS_VAR: &str = "FERROSCOPE_TABLE_CELLS";

/// Limit overrides; `None` keeps the default
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LimitOverrides
{
    pub list_depth: Option<usize>,
    pub tree_depth: Option<usize>,
    pub list_nodes: Option<usize>,
    pub cell_width: Option<usize>,
    pub table_cells: Option<usize>,
}

impl LimitOverrides
{
    /// Read overrides from the process environment
    ///
    /// ## Errors
    ///
    /// - `InvalidValue`: A variable is set but is not a non-negative integer
    pub fn from_env() -> Result<Self, ConfigError>
    {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Read overrides through `lookup`, which maps a variable name to its value
    ///
    /// ## Errors
    ///
    /// - `InvalidValue`: A variable is set but is not a non-negative integer
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError>
    {
        let overrides = LimitOverrides {
            list_depth: parse_var(&lookup, LIST_DEPTH_VAR)?,
            tree_depth: parse_var(&lookup, TREE_DEPTH_VAR)?,
            list_nodes: parse_var(&lookup, LIST_NODES_VAR)?,
            cell_width: parse_var(&lookup, CELL_WIDTH_VAR)?,
            table_cells: parse_var(&lookup, TABLE_CELLS_VAR)?,
        };
        debug!(?overrides, "limit overrides");
        Ok(overrides)
    }

    /// Fill every unset field from `fallback`
    #[must_use]
    pub fn or(self, fallback: LimitOverrides) -> Self
    {
        LimitOverrides {
            list_depth: self.list_depth.or(fallback.list_depth),
            tree_depth: self.tree_depth.or(fallback.tree_depth),
            list_nodes: self.list_nodes.or(fallback.list_nodes),
            cell_width: self.cell_width.or(fallback.cell_width),
            table_cells: self.table_cells.or(fallback.table_cells),
        }
    }
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, name: &'static str) -> Result<Option<T>, ConfigError>
{
    let Some(raw) = lookup(name) else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse()
        .map(Some)
        .map_err(|_| ConfigError::InvalidValue { var: name, value: raw })
}

/// Configuration error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError
{
    /// The variable does not hold a usable value
    #[error("{var} must be a non-negative integer, got {value:?}")]
    InvalidValue
    {
        /// Variable name
        var: &'static str,
        /// Value found
        value: String,
    },
}

#[cfg(test)]
mod tests
{
    use std::collections::HashMap;

    use super::*;

    fn lookup_in(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String>
    {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_unset_means_no_override()
    {
        assert_eq!(LimitOverrides::from_lookup(lookup_in(&[])).unwrap(), LimitOverrides::default());
    }

    #[test]
    fn test_values_are_parsed()
    {
        let overrides = LimitOverrides::from_lookup(lookup_in(&[
            (LIST_DEPTH_VAR, "5"),
            (CELL_WIDTH_VAR, " 12 "),
            (TABLE_CELLS_VAR, "64"),
        ]))
        .unwrap();
        assert_eq!(overrides.list_depth, Some(5));
        assert_eq!(overrides.cell_width, Some(12));
        assert_eq!(overrides.table_cells, Some(64));
        assert_eq!(overrides.tree_depth, None);
    }

    #[test]
    fn test_empty_value_is_unset()
    {
        let overrides = LimitOverrides::from_lookup(lookup_in(&[(TREE_DEPTH_VAR, "")])).unwrap();
        assert_eq!(overrides.tree_depth, None);
    }

    #[test]
    fn test_invalid_value()
    {
        let err = LimitOverrides::from_lookup(lookup_in(&[(LIST_NODES_VAR, "-3")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                var: LIST_NODES_VAR,
                value: "-3".to_string()
            }
        );
        assert!(err.to_string().starts_with("FERROSCOPE_LIST_NODES"));
    }

    #[test]
    fn test_flags_win_over_environment()
    {
        let flags = LimitOverrides {
            list_depth: Some(3),
            ..LimitOverrides::default()
        };
        let env = LimitOverrides {
            list_depth: Some(9),
            tree_depth: Some(4),
            ..LimitOverrides::default()
        };
        let merged = flags.or(env);
        assert_eq!(merged.list_depth, Some(3));
        assert_eq!(merged.tree_depth, Some(4));
    }
}
