//! # Visualization Presenter
//!
//! Turns a visualization result into the JSON payload the renderer reads.
//!
//! Two payload shapes exist, and the producer of a result decides which one
//! it gets:
//!
//! ```text
//! {"kind":{"graph":true},"nodes":[...],"edges":[...]}
//! {"kind":{"text":true},"text":"...","mimetype":"text/html"}   // mimetype optional
//! ```

use std::fmt::Write as _;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::graph::{palette, Graph};

/// Result of one visualization request, before serialization
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Visualization
{
    /// Pointer structure
    Graph(Graph),
    /// Contiguous storage, rendered as an index/value strip
    Table(Table),
    /// Scalars, empty containers and every error message
    Text(String),
}

impl Visualization
{
    /// Text result from anything printable
    pub fn text(message: impl Into<String>) -> Self
    {
        Visualization::Text(message.into())
    }

    /// The graph, if this is a graph result
    pub fn as_graph(&self) -> Option<&Graph>
    {
        match self {
            Visualization::Graph(graph) => Some(graph),
            _ => None,
        }
    }

    /// The table, if this is a table result
    pub fn as_table(&self) -> Option<&Table>
    {
        match self {
            Visualization::Table(table) => Some(table),
            _ => None,
        }
    }

    /// The message, if this is a text result
    pub fn as_text(&self) -> Option<&str>
    {
        match self {
            Visualization::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Serializable payload
    pub fn present(&self) -> Payload<'_>
    {
        present(self)
    }
}

/// One value cell of a [`Table`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell
{
    /// Formatted value, already truncated
    pub text: String,
    /// Whether the index was asked to be highlighted
    pub highlighted: bool,
}

/// Two-row strip: indices on top, values below
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table
{
    /// Caption above the strip (`Array: arr`)
    pub title: String,
    /// Index header row
    pub headers: Vec<String>,
    /// Value row, one cell per header
    pub cells: Vec<Cell>,
}

impl Table
{
    /// Render as an HTML fragment
    pub fn to_html(&self) -> String
    {
        let mut html = String::new();
        html.push_str("<div style=\"font-family: monospace; font-size: 14px;\">");
        let _ = write!(html, "<div style=\"margin-bottom: 5px;\">{}</div>", escape_html(&self.title));
        html.push_str("<table style=\"border-collapse: collapse; border: 1px solid #555;\"><tr>");
        for header in &self.headers {
            let _ = write!(
                html,
                "<td style=\"border: 1px solid #555; padding: 4px; text-align: center; color: #888; font-size: 10px;\">{}</td>",
                escape_html(header)
            );
        }
        html.push_str("</tr><tr>");
        for cell in &self.cells {
            let background = if cell.highlighted { palette::HIGHLIGHT } else { palette::CELL };
            let _ = write!(
                html,
                "<td style=\"border: 1px solid #555; background-color: {background}; color: white; padding: 8px; min-width: 30px; text-align: center;\">{}</td>",
                escape_html(&cell.text)
            );
        }
        html.push_str("</tr></table></div>");
        html
    }
}

/// Cut `text` to at most `max_chars` characters, marking the cut with `...`
///
/// ```rust
/// use ferroscope_core::present::truncate_cell;
///
/// assert_eq!(truncate_cell("3", 10), "3");
/// assert_eq!(truncate_cell("0x55555556aeb0", 10), "0x55555...");
/// ```
pub fn truncate_cell(text: &str, max_chars: usize) -> String
{
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let keep = max_chars.saturating_sub(3);
    let mut cut: String = text.chars().take(keep).collect();
    cut.push_str("...");
    cut
}

fn escape_html(text: &str) -> String
{
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Wire payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload<'a>
{
    /// `{"kind":{"graph":true},"nodes":[...],"edges":[...]}`
    Graph(&'a Graph),
    /// `{"kind":{"text":true},"text":"...","mimetype"?:"..."}`
    Text
    {
        /// Body
        text: std::borrow::Cow<'a, str>,
        /// Hint for rich text
        mimetype: Option<&'static str>,
    },
}

impl Payload<'_>
{
    /// Serialize to a JSON string
    pub fn to_json(&self) -> String
    {
        // Serializing plain strings and slices of derived structs cannot fail.
        serde_json::to_string(self).unwrap_or_else(|e| format!("{{\"kind\":{{\"text\":true}},\"text\":\"{e}\"}}"))
    }

    /// Serialize to a JSON value
    pub fn to_value(&self) -> serde_json::Value
    {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// Choose the payload shape for a result
pub fn present(result: &Visualization) -> Payload<'_>
{
    match result {
        Visualization::Graph(graph) => Payload::Graph(graph),
        Visualization::Table(table) => Payload::Text {
            text: table.to_html().into(),
            mimetype: Some("text/html"),
        },
        Visualization::Text(text) => Payload::Text {
            text: text.as_str().into(),
            mimetype: None,
        },
    }
}

struct Kind(&'static str);

impl Serialize for Kind
{
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error>
    {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(self.0, &true)?;
        map.end()
    }
}

impl Serialize for Payload<'_>
{
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error>
    {
        match self {
            Payload::Graph(graph) => {
                let mut map = serializer.serialize_map(Some(3))?;
                map.serialize_entry("kind", &Kind("graph"))?;
                map.serialize_entry("nodes", &graph.nodes)?;
                map.serialize_entry("edges", &graph.edges)?;
                map.end()
            }
            Payload::Text { text, mimetype } => {
                let mut map = serializer.serialize_map(None)?;
                map.serialize_entry("kind", &Kind("text"))?;
                map.serialize_entry("text", text)?;
                if let Some(mimetype) = mimetype {
                    map.serialize_entry("mimetype", mimetype)?;
                }
                map.end()
            }
        }
    }
}

#[cfg(test)]
mod tests
{
    use serde_json::json;

    use super::*;
    use crate::graph::{EdgeStyle, Node, NodeId, NodeShape};
    use crate::traversal::TraversalContext;
    use crate::types::Address;

    #[test]
    fn test_text_payload_shape()
    {
        let result = Visualization::text("x = 3");
        assert_eq!(result.present().to_json(), r#"{"kind":{"text":true},"text":"x = 3"}"#);
    }

    #[test]
    fn test_graph_payload_shape()
    {
        let mut ctx = TraversalContext::new();
        ctx.push_node(Node {
            id: Address::new(0x10).into(),
            label: "1".to_string(),
            color: palette::ROOT,
            shape: NodeShape::Box,
        });
        ctx.push_edge(
            Address::new(0x10).into(),
            NodeId::Truncated,
            "next",
            EdgeStyle::PLAIN,
        );
        let result = Visualization::Graph(ctx.into_graph());
        assert_eq!(
            result.present().to_value(),
            json!({
                "kind": {"graph": true},
                "nodes": [{"id": "0x10", "label": "1", "color": "#69db7c", "shape": "box"}],
                "edges": [{"from": "0x10", "to": "truncated", "label": "next"}]
            })
        );
        assert!(result.present().to_json().starts_with(r#"{"kind":{"graph":true},"nodes":"#));
    }

    #[test]
    fn test_table_payload_is_html()
    {
        let table = Table {
            title: "Array: arr".to_string(),
            headers: vec!["0".to_string(), "1".to_string()],
            cells: vec![
                Cell {
                    text: "3".to_string(),
                    highlighted: false,
                },
                Cell {
                    text: "<1>".to_string(),
                    highlighted: true,
                },
            ],
        };
        let value = Visualization::Table(table).present().to_value();
        assert_eq!(value["kind"], json!({"text": true}));
        assert_eq!(value["mimetype"], json!("text/html"));
        let html = value["text"].as_str().unwrap();
        assert!(html.contains("Array: arr"));
        assert!(html.contains("&lt;1&gt;"));
        assert!(html.contains(palette::HIGHLIGHT));
    }

    #[test]
    fn test_truncate_cell()
    {
        assert_eq!(truncate_cell("1234567890", 10), "1234567890");
        assert_eq!(truncate_cell("12345678901", 10), "1234567...");
        assert_eq!(truncate_cell("héllo wörld!", 10).chars().count(), 10);
    }
}
