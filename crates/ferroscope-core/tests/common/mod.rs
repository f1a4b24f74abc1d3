//! Heap fixtures shared by the integration tests

#![allow(dead_code)]

use ferroscope_core::image::{MemoryImage, ValueSpec};

/// Spacing between consecutive fixture nodes
pub const STRIDE: u64 = 0x20;

/// Address of the `i`-th node of a fixture starting at `base`
pub fn at(base: u64, i: usize) -> u64
{
    base + STRIDE * i as u64
}

pub fn list_node(data: i64, next: u64) -> ValueSpec
{
    ValueSpec::structure("Node", [("data", ValueSpec::int(data)), ("next", ValueSpec::ptr(next, "Node"))])
}

pub fn dlist_node(data: i64, prev: u64, next: u64) -> ValueSpec
{
    ValueSpec::structure(
        "DNode",
        [
            ("data", ValueSpec::int(data)),
            ("prev", ValueSpec::ptr(prev, "DNode")),
            ("next", ValueSpec::ptr(next, "DNode")),
        ],
    )
}

pub fn tree_node(data: i64, left: u64, right: u64) -> ValueSpec
{
    ValueSpec::structure(
        "TreeNode",
        [
            ("val", ValueSpec::int(data)),
            ("left", ValueSpec::ptr(left, "TreeNode")),
            ("right", ValueSpec::ptr(right, "TreeNode")),
        ],
    )
}

/// Singly linked chain `1 -> 2 -> ... -> len` at `base`, bound to `head`
pub fn chain(len: usize, base: u64) -> MemoryImage
{
    let mut image = MemoryImage::new();
    for i in 0..len {
        let next = if i + 1 < len { at(base, i + 1) } else { 0 };
        image.insert_object(at(base, i), list_node(i as i64 + 1, next)).unwrap();
    }
    image.bind("head", ValueSpec::ptr(if len > 0 { base } else { 0 }, "Node"));
    image
}

/// ```text
///         4
///       /   \
///      2     6
///     / \
///    1   3
/// ```
///
/// Bound to `root`.
pub fn small_bst() -> MemoryImage
{
    let mut image = MemoryImage::new();
    image.insert_object(0x100u64, tree_node(4, 0x200, 0x300)).unwrap();
    image.insert_object(0x200u64, tree_node(2, 0x400, 0x500)).unwrap();
    image.insert_object(0x300u64, tree_node(6, 0, 0)).unwrap();
    image.insert_object(0x400u64, tree_node(1, 0, 0)).unwrap();
    image.insert_object(0x500u64, tree_node(3, 0, 0)).unwrap();
    image.bind("root", ValueSpec::ptr(0x100, "TreeNode"));
    image
}
