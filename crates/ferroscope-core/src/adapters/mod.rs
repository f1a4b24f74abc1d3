//! # Container Adapters
//!
//! Translate the internal layout of standard containers into the common
//! table or graph model.
//!
//! - [`contiguous`]: C arrays and `std::vector`, as an index/value strip
//! - [`node_list`]: `std::list`, walked from its sentinel node
//! - [`ordered_map`]: `std::map` / `std::set`, as a single summary node
//!
//! The field names used here (`_M_impl`, `_M_start`, `_M_node`, ...) are the
//! libstdc++ ones.

pub mod contiguous;
pub mod node_list;
pub mod ordered_map;

pub use contiguous::{array_table, vector_table};
pub use node_list::node_list_graph;
pub use ordered_map::map_summary;

/// Standard container recognised from its type name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind
{
    /// `std::vector<T>`
    Vector,
    /// `std::list<T>`
    List,
    /// `std::map<K, V>`
    Map,
    /// `std::set<T>`
    Set,
}

impl ContainerKind
{
    /// Recognise a container from a full type name
    ///
    /// ```rust
    /// use ferroscope_core::adapters::ContainerKind;
    ///
    /// assert_eq!(ContainerKind::detect("std::vector<int, std::allocator<int> >"), Some(ContainerKind::Vector));
    /// assert_eq!(ContainerKind::detect("const std::__cxx11::list<int, std::allocator<int> >"), Some(ContainerKind::List));
    /// assert_eq!(ContainerKind::detect("Node"), None);
    /// ```
    pub fn detect(type_name: &str) -> Option<Self>
    {
        let base = type_name.trim();
        let base = base.strip_prefix("const ").unwrap_or(base).trim_start();
        let base = base.strip_prefix("volatile ").unwrap_or(base).trim_start();

        const PREFIXES: [(&str, ContainerKind); 6] = [
            ("std::vector<", ContainerKind::Vector),
            ("std::__cxx11::vector<", ContainerKind::Vector),
            ("std::list<", ContainerKind::List),
            ("std::__cxx11::list<", ContainerKind::List),
            ("std::map<", ContainerKind::Map),
            ("std::set<", ContainerKind::Set),
        ];
        PREFIXES
            .iter()
            .find(|(prefix, _)| base.starts_with(prefix))
            .map(|&(_, kind)| kind)
    }

    /// Name used in labels and messages
    pub const fn name(self) -> &'static str
    {
        match self {
            ContainerKind::Vector => "std::vector",
            ContainerKind::List => "std::list",
            ContainerKind::Map => "std::map",
            ContainerKind::Set => "std::set",
        }
    }
}

/// First template argument of a type name, respecting nested brackets
///
/// ```rust
/// use ferroscope_core::adapters::first_template_argument;
///
/// assert_eq!(first_template_argument("std::list<int, std::allocator<int> >"), Some("int"));
/// assert_eq!(
///     first_template_argument("std::vector<std::pair<int, int>, std::allocator<std::pair<int, int> > >"),
///     Some("std::pair<int, int>")
/// );
/// assert_eq!(first_template_argument("Node"), None);
/// ```
pub fn first_template_argument(type_name: &str) -> Option<&str>
{
    let open = type_name.find('<')?;
    let rest = &type_name[open + 1..];
    let mut depth = 0usize;
    for (i, c) in rest.char_indices() {
        match c {
            '<' => depth += 1,
            '>' if depth == 0 => return non_empty(rest[..i].trim()),
            '>' => depth -= 1,
            ',' if depth == 0 => return non_empty(rest[..i].trim()),
            _ => {}
        }
    }
    None
}

fn non_empty(s: &str) -> Option<&str>
{
    (!s.is_empty()).then_some(s)
}
