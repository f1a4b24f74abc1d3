//! # Graph Model
//!
//! Nodes, edges and the highlight set produced by the graph builder.
//!
//! The field names and value spellings here are part of the payload schema
//! consumed by the renderer, so the `Serialize` output must not drift.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Serialize, Serializer};

use crate::types::Address;

/// Node and edge colors
///
/// Root, interior and highlighted nodes use the same three colors in every
/// traversal strategy.
pub mod palette
{
    /// First node of a traversal
    pub const ROOT: &str = "#69db7c";
    /// Every other node
    pub const INTERIOR: &str = "#a5d8ff";
    /// Highlighted node, and the truncation and error sentinels
    pub const HIGHLIGHT: &str = "#ff6b6b";
    /// Overlay nodes (step and traversal info)
    pub const INFO: &str = "#ffd43b";
    /// Forward links and left children
    pub const FORWARD: &str = "#228be6";
    /// Backward links and right children
    pub const BACKWARD: &str = "#fab005";
    /// Plain table cell
    pub const CELL: &str = "#228be6";
}

/// Identity of a node in the payload
///
/// Real nodes are identified by address. The remaining variants are
/// synthetic nodes with fixed ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeId
{
    /// Node for the value at this address
    Address(Address),
    /// Depth-bound sentinel
    Truncated,
    /// The first node could not be read
    Error,
    /// Ordered map/set summary
    MapRoot,
    /// History step overlay
    StepInfo,
    /// Traversal-order overlay
    TraversalInfo,
}

impl fmt::Display for NodeId
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        match self {
            NodeId::Address(address) => write!(f, "{address}"),
            NodeId::Truncated => f.write_str("truncated"),
            NodeId::Error => f.write_str("error"),
            NodeId::MapRoot => f.write_str("map_root"),
            NodeId::StepInfo => f.write_str("step_info"),
            NodeId::TraversalInfo => f.write_str("traversal_info"),
        }
    }
}

impl From<Address> for NodeId
{
    fn from(address: Address) -> Self
    {
        NodeId::Address(address)
    }
}

impl Serialize for NodeId
{
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error>
    {
        serializer.collect_str(self)
    }
}

/// Node outline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeShape
{
    /// List nodes, containers and sentinels
    Box,
    /// Tree nodes and map summaries
    Ellipse,
}

/// One visual node
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Node
{
    pub id: NodeId,
    pub label: String,
    pub color: &'static str,
    pub shape: NodeShape,
}

impl Node
{
    /// Truncation sentinel emitted once per traversal
    pub fn truncated() -> Self
    {
        Node {
            id: NodeId::Truncated,
            label: "... (max depth)".to_string(),
            color: palette::HIGHLIGHT,
            shape: NodeShape::Box,
        }
    }

    /// Fallback node when the first value of a traversal is unreadable
    pub fn error(message: impl fmt::Display) -> Self
    {
        Node {
            id: NodeId::Error,
            label: format!("Error: {message}"),
            color: palette::HIGHLIGHT,
            shape: NodeShape::Box,
        }
    }

    /// Yellow overlay node (step or traversal info)
    pub fn info(id: NodeId, label: String) -> Self
    {
        Node {
            id,
            label,
            color: palette::INFO,
            shape: NodeShape::Box,
        }
    }
}

/// Arrow heads drawn on an edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Arrows
{
    /// Arrow at the target end
    To,
}

/// Optional styling of an edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct EdgeStyle
{
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dashes: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arrows: Option<Arrows>,
}

impl EdgeStyle
{
    /// Unstyled edge (singly linked and generic pointers)
    pub const PLAIN: EdgeStyle = EdgeStyle {
        color: None,
        dashes: None,
        arrows: None,
    };

    /// Solid colored edge
    pub const fn colored(color: &'static str) -> Self
    {
        EdgeStyle {
            color: Some(color),
            dashes: None,
            arrows: None,
        }
    }

    /// Same style, dashed
    #[must_use]
    pub const fn dashed(mut self) -> Self
    {
        self.dashes = Some(true);
        self
    }

    /// Same style, with an arrow head at the target
    #[must_use]
    pub const fn directed(mut self) -> Self
    {
        self.arrows = Some(Arrows::To);
        self
    }
}

/// One visual edge
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Edge
{
    pub from: NodeId,
    pub to: NodeId,
    pub label: String,
    #[serde(flatten)]
    pub style: EdgeStyle,
}

/// Node/edge graph in emission order
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Graph
{
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl Graph
{
    /// Empty graph
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Node with this id, if emitted
    pub fn node(&self, id: NodeId) -> Option<&Node>
    {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Edges leaving `id`, in emission order
    pub fn edges_from(&self, id: NodeId) -> impl Iterator<Item = &Edge>
    {
        self.edges.iter().filter(move |e| e.from == id)
    }

    /// Copy of this graph with `node` placed first
    #[must_use]
    pub fn with_overlay(&self, node: Node) -> Self
    {
        let mut nodes = Vec::with_capacity(self.nodes.len() + 1);
        nodes.push(node);
        nodes.extend(self.nodes.iter().cloned());
        Graph {
            nodes,
            edges: self.edges.clone(),
        }
    }
}

/// Caller-supplied addresses to call out, with their tags
///
/// Typically the names of algorithm pointers (`slow`, `fast`) resolved to
/// the node they point at.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HighlightSet
{
    tags: BTreeMap<Address, String>,
}

impl HighlightSet
{
    /// Empty set
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Tag an address; a second tag on the same address is joined with `,`
    pub fn insert(&mut self, address: Address, tag: impl Into<String>)
    {
        let tag = tag.into();
        self.tags
            .entry(address)
            .and_modify(|existing| {
                existing.push(',');
                existing.push_str(&tag);
            })
            .or_insert(tag);
    }

    /// Tag for an address, if highlighted
    pub fn tag(&self, address: Address) -> Option<&str>
    {
        self.tags.get(&address).map(String::as_str)
    }

    /// Whether an address is highlighted
    pub fn contains(&self, address: Address) -> bool
    {
        self.tags.contains_key(&address)
    }

    /// Number of highlighted addresses
    pub fn len(&self) -> usize
    {
        self.tags.len()
    }

    /// Whether nothing is highlighted
    pub fn is_empty(&self) -> bool
    {
        self.tags.is_empty()
    }

    /// Color and label for a node at `address`
    ///
    /// Highlight beats root, root beats interior.
    pub fn decorate(&self, address: Address, is_root: bool, label: String) -> (&'static str, String)
    {
        match self.tag(address) {
            Some(tag) => (palette::HIGHLIGHT, format!("{label}\n[{tag}]")),
            None if is_root => (palette::ROOT, label),
            None => (palette::INTERIOR, label),
        }
    }
}

#[cfg(test)]
mod tests
{
    use serde_json::json;

    use super::*;

    #[test]
    fn test_node_ids_serialize_as_strings()
    {
        assert_eq!(NodeId::Address(Address::new(0x1000)).to_string(), "0x1000");
        assert_eq!(NodeId::Truncated.to_string(), "truncated");
        assert_eq!(NodeId::MapRoot.to_string(), "map_root");
        assert_eq!(serde_json::to_value(NodeId::StepInfo).unwrap(), json!("step_info"));
    }

    #[test]
    fn test_node_serialization()
    {
        let node = Node {
            id: Address::new(0x10).into(),
            label: "3".to_string(),
            color: palette::ROOT,
            shape: NodeShape::Box,
        };
        assert_eq!(
            serde_json::to_value(&node).unwrap(),
            json!({"id": "0x10", "label": "3", "color": "#69db7c", "shape": "box"})
        );
    }

    #[test]
    fn test_edge_style_fields_are_optional()
    {
        let plain = Edge {
            from: Address::new(0x10).into(),
            to: Address::new(0x20).into(),
            label: "next".to_string(),
            style: EdgeStyle::PLAIN,
        };
        assert_eq!(
            serde_json::to_value(&plain).unwrap(),
            json!({"from": "0x10", "to": "0x20", "label": "next"})
        );

        let back = Edge {
            style: EdgeStyle::colored(palette::BACKWARD).dashed().directed(),
            label: "prev".to_string(),
            ..plain
        };
        assert_eq!(
            serde_json::to_value(&back).unwrap(),
            json!({"from": "0x10", "to": "0x20", "label": "prev", "color": "#fab005", "dashes": true, "arrows": "to"})
        );
    }

    #[test]
    fn test_highlight_precedence()
    {
        let mut highlights = HighlightSet::new();
        highlights.insert(Address::new(0x10), "slow");

        let (color, label) = highlights.decorate(Address::new(0x10), true, "1".to_string());
        assert_eq!(color, palette::HIGHLIGHT);
        assert_eq!(label, "1\n[slow]");

        let (color, label) = highlights.decorate(Address::new(0x20), true, "2".to_string());
        assert_eq!(color, palette::ROOT);
        assert_eq!(label, "2");

        let (color, _) = highlights.decorate(Address::new(0x20), false, "2".to_string());
        assert_eq!(color, palette::INTERIOR);
    }

    #[test]
    fn test_highlight_tags_on_same_address_are_joined()
    {
        let mut highlights = HighlightSet::new();
        highlights.insert(Address::new(0x10), "slow");
        highlights.insert(Address::new(0x10), "fast");
        assert_eq!(highlights.tag(Address::new(0x10)), Some("slow,fast"));
        assert_eq!(highlights.len(), 1);
    }

    #[test]
    fn test_overlay_does_not_touch_original()
    {
        let graph = Graph {
            nodes: vec![Node::truncated()],
            edges: Vec::new(),
        };
        let overlaid = graph.with_overlay(Node::info(NodeId::StepInfo, "Step 0".to_string()));
        assert_eq!(graph.nodes.len(), 1);
        assert_eq!(overlaid.nodes.len(), 2);
        assert_eq!(overlaid.nodes[0].id, NodeId::StepInfo);
    }
}
