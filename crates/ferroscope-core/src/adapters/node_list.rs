//! `std::list` as a doubly linked graph.
//!
//! libstdc++ keeps a sentinel header node inside the list object; the first
//! element is `sentinel._M_next` and the last element links back to the
//! sentinel. The walk stops at the first of:
//!
//! - the sentinel again (normal end)
//! - an address already visited (corrupted, cyclic list)
//! - a null or unreadable link
//! - [`Limits::node_list_nodes`] nodes

use std::collections::HashSet;

use tracing::{debug, info};

use super::first_template_argument;
use crate::config::Limits;
use crate::error::InspectResult;
use crate::graph::{palette, EdgeStyle, HighlightSet, Node, NodeId, NodeShape};
use crate::inspect::MemoryInspector;
use crate::present::Visualization;
use crate::traversal::TraversalContext;
use crate::types::Address;

/// Walk a `std::list` from its sentinel
pub fn node_list_graph<I: MemoryInspector>(
    inspector: &I,
    expr: &str,
    highlights: &HighlightSet,
    limits: &Limits,
) -> Visualization
{
    info!(expr, "visualizing node list");
    let list = match inspector.resolve(expr) {
        Ok(list) => list,
        Err(e) => return Visualization::text(format!("std::list Error: {e}")),
    };

    let element_type = first_template_argument(&inspector.type_name(&list)).map(str::to_string);
    let Some((sentinel, mut current)) = sentinel_and_first(inspector, &list) else {
        return Visualization::text("Cannot access std::list structure");
    };

    let mut ctx = TraversalContext::new();
    let mut seen = HashSet::new();
    let mut previous: Option<NodeId> = None;

    while seen.len() < limits.node_list_nodes {
        let address = match inspector.pointer_value(&current) {
            Ok(address) => address,
            Err(e) => {
                debug!(error = %e, "link unreadable");
                break;
            }
        };
        if address == sentinel || address.is_null() {
            break;
        }
        if !seen.insert(address) {
            debug!(%address, "cycle in node list");
            break;
        }
        ctx.visit(address);

        let value = element_text(inspector, &current, element_type.as_deref());
        let label = truncate_label(&value, limits.node_list_label_chars);
        let (color, label) = highlights.decorate(address, previous.is_none(), label);
        let id = NodeId::Address(address);
        ctx.push_node(Node {
            id,
            label,
            color,
            shape: NodeShape::Box,
        });

        if let Some(previous) = previous {
            ctx.push_edge(previous, id, "next", EdgeStyle::colored(palette::FORWARD));
            ctx.push_edge(id, previous, "prev", EdgeStyle::colored(palette::BACKWARD).dashed());
        }
        previous = Some(id);

        current = match next_link(inspector, &current) {
            Ok(next) => next,
            Err(e) => {
                debug!(%address, error = %e, "next link unreadable");
                break;
            }
        };
    }

    if seen.is_empty() {
        return Visualization::text(format!("{expr}: empty std::list"));
    }
    Visualization::Graph(ctx.into_graph())
}

/// Sentinel address and the link to the first element
fn sentinel_and_first<I: MemoryInspector>(inspector: &I, list: &I::Value) -> Option<(Address, I::Value)>
{
    let sentinel = inspector
        .field(list, "_M_impl")
        .and_then(|implementation| inspector.field(&implementation, "_M_node"))
        .ok()?;
    let address = inspector.address(&sentinel)?;
    let first = next_field(inspector, &sentinel).ok()?;
    Some((address, first))
}

/// `node._M_next`, or `node._M_data._M_next` on older layouts
fn next_field<I: MemoryInspector>(inspector: &I, node: &I::Value) -> InspectResult<I::Value>
{
    inspector
        .field(node, "_M_next")
        .or_else(|_| inspector.field(node, "_M_data").and_then(|data| inspector.field(&data, "_M_next")))
}

fn next_link<I: MemoryInspector>(inspector: &I, link: &I::Value) -> InspectResult<I::Value>
{
    let node = inspector.dereference(link)?;
    next_field(inspector, &node)
}

/// Element stored in the node a link points at, or `?`
///
/// The link is typed as the node base, so it is cast to the full node type
/// `std::_List_node<T>` before reading `_M_storage`.
fn element_text<I: MemoryInspector>(inspector: &I, link: &I::Value, element_type: Option<&str>) -> String
{
    let Some(element_type) = element_type else {
        return "?".to_string();
    };

    let typed_node = inspector
        .cast(link, &format!("std::_List_node<{element_type}> *"))
        .and_then(|node| inspector.dereference(&node))
        .or_else(|e| {
            debug!(error = %e, "node cast failed, reading base node");
            inspector.dereference(link)
        });

    let storage = typed_node.and_then(|node| inspector.field(&node, "_M_storage"));
    match storage {
        Ok(storage) => {
            let element = inspector.cast(&storage, element_type).unwrap_or(storage);
            inspector.format(&element)
        }
        Err(e) => {
            debug!(error = %e, "element unreadable");
            "?".to_string()
        }
    }
}

fn truncate_label(text: &str, max_chars: usize) -> String
{
    text.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_labels_are_cut_without_marker()
    {
        assert_eq!(truncate_label("abcdefghijklmnopqrstuvwxyz", 20), "abcdefghijklmnopqrst");
        assert_eq!(truncate_label("short", 20), "short");
    }
}
