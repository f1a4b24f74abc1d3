//! # Error Types
//!
//! Errors raised while reading inspected memory.
//!
//! We use `thiserror` to automatically generate `Error` trait implementations
//! and nice error messages.
//!
//! None of these errors ever reach a caller of [`crate::Visualizer`]: a
//! failed resolve becomes a text payload, and every other variant is recovered
//! by the traversal branch that hit it.

use thiserror::Error;

use crate::types::{Address, TypeCategory};

/// Failure of a single memory-inspection primitive
///
/// ## Error Categories
///
/// 1. **Expression errors**: Resolve
/// 2. **Shape errors**: FieldAbsent, TypeMismatch, Cast
/// 3. **Memory errors**: Deref, NoAddress, IndexOutOfBounds
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InspectError
{
    /// The expression cannot be evaluated against current memory
    ///
    /// This happens when:
    /// - A symbol is not in scope
    /// - The expression does not parse
    /// - A step of the expression fails (missing field, bad pointer)
    #[error("cannot evaluate `{expr}`: {reason}")]
    Resolve
    {
        /// The expression as the caller wrote it
        expr: String,
        /// What went wrong
        reason: String,
    },

    /// The struct has no field with this name
    #[error("there is no member named {0}")]
    FieldAbsent(String),

    /// The operation needs a different kind of value
    #[error("expected {expected}, found {found}")]
    TypeMismatch
    {
        /// What the operation needs
        expected: TypeCategory,
        /// What the value actually is
        found: TypeCategory,
    },

    /// Memory at the address cannot be read
    ///
    /// Null pointers, dangling pointers, and pointers into unmapped regions
    /// all end up here.
    #[error("cannot access memory at address {0}")]
    Deref(Address),

    /// The value is not stored in memory (a temporary or a register value)
    #[error("value is not an lvalue")]
    NoAddress,

    /// The value cannot be reinterpreted as the requested type
    #[error("no type named {0}")]
    Cast(String),

    /// Array index beyond the array bounds
    #[error("index {index} out of bounds for length {len}")]
    IndexOutOfBounds
    {
        /// Requested index
        index: u64,
        /// Number of elements in the array
        len: u64,
    },
}

impl InspectError
{
    /// Build a resolve error for `expr`
    pub fn resolve(expr: impl Into<String>, reason: impl Into<String>) -> Self
    {
        InspectError::Resolve {
            expr: expr.into(),
            reason: reason.into(),
        }
    }
}

/// Convenience type alias for `Result<T, InspectError>`
pub type InspectResult<T> = std::result::Result<T, InspectError>;

/// History playback errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HistoryError
{
    /// The requested step is not in `0..len`
    ///
    /// The message spells the valid range as `0-{len - 1}`, so an empty
    /// history reports `0--1`.
    #[error("Invalid step. History has {len} steps (0-{last})", last = last_index(.len))]
    InvalidStep
    {
        /// Step the caller asked for
        requested: usize,
        /// Number of recorded steps
        len: usize,
    },
}

#[allow(clippy::cast_possible_wrap, clippy::trivially_copy_pass_by_ref)]
fn last_index(len: &usize) -> i64
{
    *len as i64 - 1
}

/// Convenience type alias for `Result<T, HistoryError>`
pub type HistoryResult<T> = std::result::Result<T, HistoryError>;

/// Errors raised while loading a heap image
#[derive(Error, Debug)]
pub enum ImageError
{
    /// The image file cannot be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The image is not valid JSON or does not match the image schema
    #[error("malformed heap image: {0}")]
    Json(#[from] serde_json::Error),

    /// Two objects claim the same address
    #[error("duplicate object at address {0}")]
    DuplicateAddress(Address),
}

/// Convenience type alias for `Result<T, ImageError>`
pub type ImageResult<T> = std::result::Result<T, ImageError>;
