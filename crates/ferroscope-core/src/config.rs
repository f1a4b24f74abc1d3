//! # Configuration
//!
//! Traversal bounds and the field-name tables used for shape inference.
//!
//! Both are plain data. [`Limits`] may be tuned per session (the command-line
//! tool reads overrides from flags and the environment); [`FieldNameTable`]
//! is static and immutable at run time.

/// Safety valves against runaway traversal
///
/// These bounds are the only protection against unbounded or malformed
/// structures: there is no timeout and no cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits
{
    /// Deepest list node emitted before the branch is truncated (depth 0 is the head)
    pub list_depth: usize,
    /// Deepest tree node emitted before the branch is truncated (depth 0 is the root)
    pub tree_depth: usize,
    /// Most nodes the node-list adapter walks
    pub node_list_nodes: usize,
    /// Most cells an array or vector table shows
    pub table_cells: usize,
    /// Widest table cell, in characters, including the `...` marker
    pub cell_chars: usize,
    /// Widest node-list label, in characters
    pub node_list_label_chars: usize,
}

impl Limits
{
    /// List depth bound
    pub const DEFAULT_LIST_DEPTH: usize = 50;
    /// Tree depth bound
    pub const DEFAULT_TREE_DEPTH: usize = 30;
    /// Node-list node cap
    pub const DEFAULT_NODE_LIST_NODES: usize = 100;
    /// Table cell cap
    pub const DEFAULT_TABLE_CELLS: usize = 1000;
    /// Table cell width
    pub const DEFAULT_CELL_CHARS: usize = 10;
    /// Node-list label width
    pub const DEFAULT_NODE_LIST_LABEL_CHARS: usize = 20;
}

impl Default for Limits
{
    fn default() -> Self
    {
        Limits {
            list_depth: Self::DEFAULT_LIST_DEPTH,
            tree_depth: Self::DEFAULT_TREE_DEPTH,
            node_list_nodes: Self::DEFAULT_NODE_LIST_NODES,
            table_cells: Self::DEFAULT_TABLE_CELLS,
            cell_chars: Self::DEFAULT_CELL_CHARS,
            node_list_label_chars: Self::DEFAULT_NODE_LIST_LABEL_CHARS,
        }
    }
}

/// Candidate field names per role, in priority order
///
/// Order matters: the first candidate present on a value wins.
#[derive(Debug, Clone, Copy)]
pub struct FieldNameTable
{
    /// Forward link of a list node
    pub next: &'static [&'static str],
    /// Backward link of a doubly linked node
    pub previous: &'static [&'static str],
    /// `(left, right)` child pairs of a binary tree node
    pub tree_pairs: &'static [(&'static str, &'static str)],
    /// Entry pointer of a container object (`list.head`, `tree.root`)
    pub wrapper_roots: &'static [&'static str],
    /// Payload fields used for node labels
    pub data: &'static [&'static str],
}

impl FieldNameTable
{
    /// Conventions seen in textbook and Windows-style C/C++ code
    pub const DEFAULT: FieldNameTable = FieldNameTable {
        next: &["next", "_next", "pNext", "m_next", "link", "flink"],
        previous: &["previous", "prev", "_prev", "pPrev", "m_prev", "blink"],
        tree_pairs: &[
            ("left", "right"),
            ("lchild", "rchild"),
            ("pLeft", "pRight"),
            ("m_left", "m_right"),
        ],
        wrapper_roots: &["root", "_root", "m_root", "head", "_head", "m_head", "first", "top"],
        data: &["data", "val", "value", "id", "key", "info", "elem", "item"],
    };
}

impl Default for FieldNameTable
{
    fn default() -> Self
    {
        Self::DEFAULT
    }
}
