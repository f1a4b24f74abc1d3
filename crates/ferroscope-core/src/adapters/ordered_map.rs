//! `std::map` / `std::set` summary.
//!
//! The red-black tree behind these containers is not reconstructed; the
//! adapter reports a single node carrying the element count.

use tracing::{debug, info};

use super::ContainerKind;
use crate::graph::{palette, Graph, Node, NodeId, NodeShape};
use crate::inspect::MemoryInspector;
use crate::present::Visualization;

/// Summary node for an ordered associative container
pub fn map_summary<I: MemoryInspector>(inspector: &I, expr: &str, kind: ContainerKind) -> Visualization
{
    info!(expr, kind = kind.name(), "visualizing ordered container");
    let container = match inspector.resolve(expr) {
        Ok(container) => container,
        Err(e) => return Visualization::text(format!("{} Error: {e}", kind.name())),
    };

    let count = inspector
        .field(&container, "_M_t")
        .and_then(|tree| inspector.field(&tree, "_M_impl"))
        .and_then(|implementation| inspector.field(&implementation, "_M_node_count"))
        .and_then(|count| inspector.as_integer(&count))
        .unwrap_or_else(|e| {
            debug!(error = %e, "node count unreadable");
            0
        });

    if count <= 0 {
        return Visualization::text(format!("{expr}: empty {} (size=0)", kind.name()));
    }

    Visualization::Graph(Graph {
        nodes: vec![Node {
            id: NodeId::MapRoot,
            label: format!("{}\nsize={count}", kind.name()),
            color: palette::ROOT,
            shape: NodeShape::Ellipse,
        }],
        edges: Vec::new(),
    })
}
