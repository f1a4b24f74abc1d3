//! History playback, traversal-order highlighting and payload schema

mod common;

use common::{chain, small_bst};
use ferroscope_core::graph::{palette, NodeId};
use ferroscope_core::image::{MemoryImage, ValueSpec};
use ferroscope_core::{Address, TraversalOrder, Visualizer};
use serde_json::json;

#[test]
fn test_history_round_trip_matches_direct_visualize()
{
    let mut vis = Visualizer::new(chain(3, 0x1000));
    let direct = vis.visualize::<&str>("head", &[]);

    assert_eq!(vis.record_step("head", "d").as_text(), Some("Step 0 recorded: d"));
    let shown = vis.show_step(Some(0));

    let direct = direct.as_graph().unwrap();
    let shown = shown.as_graph().unwrap();
    assert_eq!(shown.nodes.len(), direct.nodes.len() + 1);
    assert_eq!(shown.nodes[0].id, NodeId::StepInfo);
    assert_eq!(shown.nodes[0].label, "Step 0\nd");
    assert_eq!(shown.nodes[0].color, palette::INFO);
    assert_eq!(&shown.nodes[1..], direct.nodes.as_slice());
    assert_eq!(shown.edges, direct.edges);
}

#[test]
fn test_show_step_out_of_range()
{
    let mut vis = Visualizer::new(MemoryImage::new());
    let text = vis.show_step(Some(5));
    let text = text.as_text().unwrap();
    assert_eq!(text, "Invalid step. History has 0 steps (0--1)");
}

#[test]
fn test_history_survives_new_breakpoint()
{
    let mut vis = Visualizer::new(chain(2, 0x1000));
    vis.record_step("head", "before");

    // The process moved on and the list grew
    vis.set_inspector(chain(4, 0x1000));
    vis.record_step("head", "after");

    assert_eq!(vis.show_step(Some(0)).as_graph().unwrap().nodes.len(), 3);
    assert_eq!(vis.show_step(Some(1)).as_graph().unwrap().nodes.len(), 5);
    assert_eq!(vis.history().current(), 1);
}

#[test]
fn test_recorded_text_results_are_replayed_as_is()
{
    let mut image = MemoryImage::new();
    image.bind("x", ValueSpec::int(3));
    let mut vis = Visualizer::new(image);
    vis.record_step("x", "scalar");
    assert_eq!(vis.show_step(Some(0)).as_text(), Some("x = 3"));
}

#[test]
fn test_bfs_traversal_highlight()
{
    let vis = Visualizer::new(small_bst());
    let result = vis.visualize_with_traversal("root", TraversalOrder::Bfs, 2);
    let graph = result.as_graph().unwrap();

    assert_eq!(graph.nodes[0].id, NodeId::TraversalInfo);
    assert_eq!(graph.nodes[0].label, "BFS\nStep 2/4");
    assert_eq!(graph.nodes.len(), 6);

    let third = graph.node(NodeId::Address(Address::new(0x300))).unwrap();
    assert_eq!(third.color, palette::HIGHLIGHT);
    assert_eq!(third.label, "6\n[→ 2]");
    let highlighted = graph.nodes.iter().filter(|n| n.color == palette::HIGHLIGHT).count();
    assert_eq!(highlighted, 1);
}

#[test]
fn test_inorder_traversal_highlight()
{
    let vis = Visualizer::new(small_bst());
    for (step, address, label) in [(0, 0x400, "1"), (1, 0x200, "2"), (3, 0x100, "4"), (4, 0x300, "6")] {
        let result = vis.visualize_with_traversal("root", TraversalOrder::Inorder, step);
        let graph = result.as_graph().unwrap();
        let node = graph.node(NodeId::Address(Address::new(address))).unwrap();
        assert_eq!(node.label, format!("{label}\n[→ {step}]"));
    }

    let dfs = vis.visualize_with_traversal("root", TraversalOrder::from_name("dfs"), 0);
    assert_eq!(dfs.as_graph().unwrap().nodes[0].label, "DFS\nStep 0/4");
}

#[test]
fn test_traversal_step_past_the_end_highlights_nothing()
{
    let vis = Visualizer::new(small_bst());
    let result = vis.visualize_with_traversal("root", TraversalOrder::Bfs, 9);
    let graph = result.as_graph().unwrap();
    assert_eq!(graph.nodes[0].label, "BFS\nStep 9/4");
    assert!(graph.nodes.iter().all(|n| n.color != palette::HIGHLIGHT));
}

#[test]
fn test_traversal_text_outcomes()
{
    let mut image = chain(2, 0x1000);
    image.bind("empty", ValueSpec::null("TreeNode"));
    let vis = Visualizer::new(image);

    assert_eq!(
        vis.visualize_with_traversal("head", TraversalOrder::Bfs, 0).as_text(),
        Some("Not a binary tree structure")
    );
    assert_eq!(vis.visualize_with_traversal("empty", TraversalOrder::Bfs, 0).as_text(), Some("NULL tree"));
    assert!(vis
        .visualize_with_traversal("nope", TraversalOrder::Inorder, 0)
        .as_text()
        .unwrap()
        .starts_with("Traversal Error: "));
}

#[test]
fn test_graph_payload_schema()
{
    let vis = Visualizer::new(chain(2, 0x1000));
    let payload = vis.visualize::<&str>("head", &[]).present().to_value();
    assert_eq!(
        payload,
        json!({
            "kind": {"graph": true},
            "nodes": [
                {"id": "0x1000", "label": "1", "color": "#69db7c", "shape": "box"},
                {"id": "0x1020", "label": "2", "color": "#a5d8ff", "shape": "box"}
            ],
            "edges": [{"from": "0x1000", "to": "0x1020", "label": "next"}]
        })
    );
}

#[test]
fn test_text_payload_schema()
{
    let vis = Visualizer::new(MemoryImage::new());
    let json = vis.visualize::<&str>("nope", &[]).present().to_json();
    assert!(json.starts_with(r#"{"kind":{"text":true},"text":"Error: "#));
    assert!(!json.contains("mimetype"));
}

#[test]
fn test_table_payload_carries_mimetype()
{
    let mut image = MemoryImage::new();
    image.bind("arr", ValueSpec::array("int", [1, 2].map(ValueSpec::int)));
    let payload = Visualizer::new(image).visualize::<&str>("arr", &[]).present().to_value();
    assert_eq!(payload["kind"], json!({"text": true}));
    assert_eq!(payload["mimetype"], json!("text/html"));
    assert!(payload["text"].as_str().unwrap().contains("Array: arr"));
}
