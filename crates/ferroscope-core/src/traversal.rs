//! # Graph Builder
//!
//! Walks a classified value and accumulates a deduplicated node/edge graph.
//!
//! All strategies share one policy, implemented once in [`GraphBuilder::enter`]:
//!
//! - **Identity**: a node is its address. An address already visited is never
//!   emitted or walked again, but its id is still handed back so the caller
//!   can close an edge to it. This is what makes cycles terminate.
//! - **Null guard**: a zero address ends the branch without an edge.
//! - **Depth bound**: past the strategy's bound a single `truncated` sentinel
//!   stands in for the rest of the branch. Only unvisited nodes are cut, so a
//!   cycle closing at the bound still gets its edge.
//! - **Read failures**: a missing field or a bad pointer ends only the branch
//!   that hit it. Only when the very first node is unreadable does the
//!   builder emit an `error` node.
//!
//! Strategy specifics:
//!
//! - Linked lists follow `next` only. A doubly linked node also emits a
//!   dashed edge to its `prev` target, which may not be visited (yet).
//! - Binary trees compose post-order: a child subtree is finished before the
//!   parent emits the edge to it.
//! - Generic pointer bags get one node and one edge per non-null pointer,
//!   without recursing.

use std::collections::HashSet;

use tracing::{debug, trace};

use crate::config::{FieldNameTable, Limits};
use crate::error::{InspectError, InspectResult};
use crate::graph::{palette, Edge, EdgeStyle, Graph, HighlightSet, Node, NodeId, NodeShape};
use crate::inspect::MemoryInspector;
use crate::shape::Shape;
use crate::types::{Address, TypeCategory};

/// Per-request traversal state
///
/// Created fresh for every top-level request and consumed into the
/// resulting [`Graph`]. Invariant: every address in `graph.nodes` is in
/// `visited`, and appears there once.
#[derive(Debug, Default)]
pub struct TraversalContext
{
    visited: HashSet<Address>,
    graph: Graph,
    truncated: bool,
}

impl TraversalContext
{
    /// Fresh, empty context
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Whether an address has been visited
    pub fn is_visited(&self, address: Address) -> bool
    {
        self.visited.contains(&address)
    }

    /// Mark an address visited; false if it already was
    pub fn visit(&mut self, address: Address) -> bool
    {
        self.visited.insert(address)
    }

    /// Graph accumulated so far
    pub fn graph(&self) -> &Graph
    {
        &self.graph
    }

    /// Append a node
    pub fn push_node(&mut self, node: Node)
    {
        trace!(id = %node.id, "emit node");
        self.graph.nodes.push(node);
    }

    /// Append an edge
    pub fn push_edge(&mut self, from: NodeId, to: NodeId, label: impl Into<String>, style: EdgeStyle)
    {
        self.graph.edges.push(Edge {
            from,
            to,
            label: label.into(),
            style,
        });
    }

    /// Emit the truncation sentinel unless it is already present
    pub fn push_truncated(&mut self)
    {
        if !self.truncated {
            self.truncated = true;
            self.push_node(Node::truncated());
        }
    }

    /// Finish the traversal
    pub fn into_graph(self) -> Graph
    {
        self.graph
    }
}

/// Outcome of stepping onto a value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Entry
{
    /// First visit; the node has just been emitted
    Fresh(Address),
    /// Already visited; nothing emitted
    Seen(Address),
    /// Past the depth bound; the sentinel stands in
    Truncated,
}

impl Entry
{
    fn id(self) -> NodeId
    {
        match self {
            Entry::Fresh(address) | Entry::Seen(address) => NodeId::Address(address),
            Entry::Truncated => NodeId::Truncated,
        }
    }
}

/// Shape-directed walker over inspected memory
pub struct GraphBuilder<'a, I: MemoryInspector>
{
    inspector: &'a I,
    names: &'a FieldNameTable,
    limits: &'a Limits,
    highlights: &'a HighlightSet,
    ctx: TraversalContext,
}

impl<'a, I: MemoryInspector> GraphBuilder<'a, I>
{
    /// Builder with a fresh traversal context
    pub fn new(inspector: &'a I, names: &'a FieldNameTable, limits: &'a Limits, highlights: &'a HighlightSet) -> Self
    {
        GraphBuilder {
            inspector,
            names,
            limits,
            highlights,
            ctx: TraversalContext::new(),
        }
    }

    /// Walk `root` according to `shape` and return the graph
    ///
    /// `Wrapper` and `Scalar` shapes are resolved by the caller; handed in
    /// here they produce an empty graph.
    pub fn build(mut self, root: &I::Value, shape: &Shape) -> Graph
    {
        match shape {
            Shape::DoublyLinkedList { next, prev } => self.list(root, next, Some(*prev)),
            Shape::LinkedList { next } => self.list(root, next, None),
            Shape::BinaryTree { left, right } => self.tree(root, left, right),
            Shape::Generic(pointers) => self.generic(root, pointers),
            Shape::Wrapper { .. } | Shape::Scalar => {
                debug!(shape = shape.kind(), "shape has no traversal");
            }
        }
        self.ctx.into_graph()
    }

    /// Label for a node: first data-ish field, else first non-pointer field, else `Node`
    pub fn node_label(&self, value: &I::Value) -> String
    {
        for name in self.names.data {
            if let Ok(field) = self.inspector.field(value, name) {
                return self.inspector.format(&field);
            }
        }

        if let Ok(fields) = self.inspector.fields(value) {
            let payload = fields.iter().find(|(_, field)| {
                !matches!(
                    self.inspector.type_category(field),
                    TypeCategory::Pointer | TypeCategory::Function
                )
            });
            if let Some((name, field)) = payload {
                return format!("{name}={}", self.inspector.format(field));
            }
        }

        "Node".to_string()
    }

    /// Step onto `value` at `depth`: apply the null guard, the visited check
    /// and the depth bound, and emit the node on first visit.
    ///
    /// The visited check comes first so a cycle closing just past the bound
    /// still points back at its node. `Ok(None)` means the branch ended at a
    /// null address.
    fn enter(&mut self, value: &I::Value, depth: usize, max_depth: usize, shape: NodeShape) -> InspectResult<Option<Entry>>
    {
        let address = self.inspector.address(value).ok_or(InspectError::NoAddress)?;
        if address.is_null() {
            return Ok(None);
        }
        if self.ctx.is_visited(address) {
            return Ok(Some(Entry::Seen(address)));
        }
        if depth > max_depth {
            debug!(depth, max_depth, "depth bound reached");
            self.ctx.push_truncated();
            return Ok(Some(Entry::Truncated));
        }
        self.ctx.visit(address);

        let label = self.node_label(value);
        let (color, label) = self.highlights.decorate(address, depth == 0, label);
        self.ctx.push_node(Node {
            id: NodeId::Address(address),
            label,
            color,
            shape,
        });
        Ok(Some(Entry::Fresh(address)))
    }

    /// Read pointer field `name`; `Ok(None)` when it is null
    fn follow(&self, value: &I::Value, name: &str) -> InspectResult<Option<I::Value>>
    {
        let pointer = self.inspector.field(value, name)?;
        if self.inspector.pointer_value(&pointer)?.is_null() {
            return Ok(None);
        }
        self.inspector.dereference(&pointer).map(Some)
    }

    /// Target address of pointer field `name`; `Ok(None)` when it is null
    fn pointer_target(&self, value: &I::Value, name: &str) -> InspectResult<Option<Address>>
    {
        let pointer = self.inspector.field(value, name)?;
        let target = self.inspector.pointer_value(&pointer)?;
        Ok((!target.is_null()).then_some(target))
    }

    /// Emit the root, or the error node if it cannot be read
    fn enter_root(&mut self, root: &I::Value, max_depth: usize, shape: NodeShape) -> Option<Address>
    {
        match self.enter(root, 0, max_depth, shape) {
            Ok(Some(Entry::Fresh(address))) => Some(address),
            Ok(_) => None,
            Err(e) => {
                debug!(error = %e, "root unreadable");
                if self.ctx.graph().nodes.is_empty() {
                    self.ctx.push_node(Node::error(e));
                }
                None
            }
        }
    }

    fn list(&mut self, root: &I::Value, next: &str, prev: Option<&str>)
    {
        let max_depth = self.limits.list_depth;
        if let Some(address) = self.enter_root(root, max_depth, NodeShape::Box) {
            self.list_from(root, address, 0, next, prev);
        }
    }

    fn list_from(&mut self, value: &I::Value, address: Address, depth: usize, next: &str, prev: Option<&str>)
    {
        let id = NodeId::Address(address);
        let doubly = prev.is_some();
        let max_depth = self.limits.list_depth;

        match self.follow(value, next) {
            Ok(Some(child)) => match self.enter(&child, depth + 1, max_depth, NodeShape::Box) {
                Ok(Some(entry)) => {
                    let style = if doubly {
                        EdgeStyle::colored(palette::FORWARD).directed()
                    } else {
                        EdgeStyle::PLAIN
                    };
                    let label = if doubly { "next" } else { next };
                    self.ctx.push_edge(id, entry.id(), label, style);
                    if let Entry::Fresh(child_address) = entry {
                        self.list_from(&child, child_address, depth + 1, next, prev);
                    }
                }
                Ok(None) => {}
                Err(e) => debug!(node = %id, error = %e, "next node unreadable"),
            },
            Ok(None) => {}
            Err(e) => debug!(node = %id, field = next, error = %e, "next pointer unreadable"),
        }

        // The backward link is drawn, never walked.
        if let Some(prev) = prev {
            match self.pointer_target(value, prev) {
                Ok(Some(target)) => self.ctx.push_edge(
                    id,
                    NodeId::Address(target),
                    "prev",
                    EdgeStyle::colored(palette::BACKWARD).dashed().directed(),
                ),
                Ok(None) => {}
                Err(e) => debug!(node = %id, field = prev, error = %e, "prev pointer unreadable"),
            }
        }
    }

    fn tree(&mut self, root: &I::Value, left: &str, right: &str)
    {
        let max_depth = self.limits.tree_depth;
        if let Some(address) = self.enter_root(root, max_depth, NodeShape::Ellipse) {
            self.tree_from(root, address, 0, left, right);
        }
    }

    fn tree_from(&mut self, value: &I::Value, address: Address, depth: usize, left: &str, right: &str)
    {
        let id = NodeId::Address(address);
        let max_depth = self.limits.tree_depth;

        for (field, label, color) in [(left, "L", palette::FORWARD), (right, "R", palette::BACKWARD)] {
            let child = match self.follow(value, field) {
                Ok(Some(child)) => child,
                Ok(None) => continue,
                Err(e) => {
                    debug!(node = %id, field, error = %e, "child pointer unreadable");
                    continue;
                }
            };
            let entry = match self.enter(&child, depth + 1, max_depth, NodeShape::Ellipse) {
                Ok(Some(entry)) => entry,
                Ok(None) => continue,
                Err(e) => {
                    debug!(node = %id, field, error = %e, "child node unreadable");
                    continue;
                }
            };
            if let Entry::Fresh(child_address) = entry {
                self.tree_from(&child, child_address, depth + 1, left, right);
            }
            self.ctx.push_edge(id, entry.id(), label, EdgeStyle::colored(color));
        }
    }

    fn generic(&mut self, root: &I::Value, pointers: &[String])
    {
        // One level only: no shape contract bounds deeper recursion.
        let Some(address) = self.enter_root(root, 0, NodeShape::Box) else {
            return;
        };
        let id = NodeId::Address(address);
        for field in pointers {
            match self.pointer_target(root, field) {
                Ok(Some(target)) => self.ctx.push_edge(id, NodeId::Address(target), field.as_str(), EdgeStyle::PLAIN),
                Ok(None) => {}
                Err(e) => debug!(node = %id, field = field.as_str(), error = %e, "pointer unreadable"),
            }
        }
    }
}
