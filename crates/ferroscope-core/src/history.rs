//! # History Recorder
//!
//! Append-only log of visualization snapshots, for stepping through how a
//! structure changed across breakpoints.
//!
//! The log only grows until [`History::clear`] empties it. Playback never
//! mutates a stored entry: [`History::show`] returns a copy with a step-info
//! node placed in front.

use tracing::debug;

use crate::error::{HistoryError, HistoryResult};
use crate::graph::{Node, NodeId};
use crate::present::Visualization;

/// One recorded snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry
{
    /// 0-based position in the log
    pub step: usize,
    /// Caller's note ("after insert")
    pub description: String,
    /// Expression that was visualized
    pub expression: String,
    /// Captured result
    pub result: Visualization,
}

/// Recorded snapshots, oldest first
#[derive(Debug, Clone, Default)]
pub struct History
{
    entries: Vec<HistoryEntry>,
    current: usize,
}

impl History
{
    /// Empty log
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Append a snapshot and return its step index
    pub fn record(&mut self, expression: impl Into<String>, description: impl Into<String>, result: Visualization) -> usize
    {
        let step = self.entries.len();
        let entry = HistoryEntry {
            step,
            description: description.into(),
            expression: expression.into(),
            result,
        };
        debug!(step, expression = %entry.expression, "recorded step");
        self.entries.push(entry);
        self.current = step;
        step
    }

    /// Stored entry for a step
    ///
    /// ## Errors
    ///
    /// - `InvalidStep`: `step` is not in `0..len`
    pub fn entry(&self, step: usize) -> HistoryResult<&HistoryEntry>
    {
        self.entries.get(step).ok_or(HistoryError::InvalidStep {
            requested: step,
            len: self.entries.len(),
        })
    }

    /// Result for a step, with a `step_info` node prepended to graph results
    ///
    /// Moves the cursor to `step`.
    ///
    /// ## Errors
    ///
    /// - `InvalidStep`: `step` is not in `0..len`
    pub fn show(&mut self, step: usize) -> HistoryResult<Visualization>
    {
        let entry = self.entry(step)?;
        let result = match &entry.result {
            Visualization::Graph(graph) => {
                let info = Node::info(NodeId::StepInfo, format!("Step {step}\n{}", entry.description));
                Visualization::Graph(graph.with_overlay(info))
            }
            other => other.clone(),
        };
        self.current = step;
        Ok(result)
    }

    /// `(step, description)` for every entry, oldest first
    pub fn show_all(&self) -> Vec<(usize, &str)>
    {
        self.entries.iter().map(|e| (e.step, e.description.as_str())).collect()
    }

    /// Forget every entry
    pub fn clear(&mut self)
    {
        debug!(steps = self.entries.len(), "clearing history");
        self.entries.clear();
        self.current = 0;
    }

    /// Step most recently recorded or shown
    pub fn current(&self) -> usize
    {
        self.current
    }

    /// Number of recorded steps
    pub fn len(&self) -> usize
    {
        self.entries.len()
    }

    /// Whether nothing has been recorded
    pub fn is_empty(&self) -> bool
    {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests
{
    use super::*;
    use crate::graph::Graph;

    fn one_node_graph() -> Visualization
    {
        Visualization::Graph(Graph {
            nodes: vec![Node::truncated()],
            edges: Vec::new(),
        })
    }

    #[test]
    fn test_record_returns_monotonic_steps()
    {
        let mut history = History::new();
        assert_eq!(history.record("head", "initial", one_node_graph()), 0);
        assert_eq!(history.record("head", "after insert", one_node_graph()), 1);
        assert_eq!(history.len(), 2);
        assert_eq!(history.current(), 1);
    }

    #[test]
    fn test_show_prepends_step_info_without_mutating()
    {
        let mut history = History::new();
        history.record("head", "initial", one_node_graph());

        let shown = history.show(0).unwrap();
        let graph = shown.as_graph().unwrap();
        assert_eq!(graph.nodes.len(), 2);
        assert_eq!(graph.nodes[0].id, NodeId::StepInfo);
        assert_eq!(graph.nodes[0].label, "Step 0\ninitial");

        // A second show starts from the stored entry again
        let again = history.show(0).unwrap();
        assert_eq!(again.as_graph().unwrap().nodes.len(), 2);
        assert_eq!(history.entry(0).unwrap().result, one_node_graph());
    }

    #[test]
    fn test_show_text_entries_unchanged()
    {
        let mut history = History::new();
        history.record("x", "scalar", Visualization::text("x = 3"));
        assert_eq!(history.show(0).unwrap(), Visualization::text("x = 3"));
    }

    #[test]
    fn test_show_out_of_range()
    {
        let mut history = History::new();
        let err = history.show(5).unwrap_err();
        assert_eq!(err, HistoryError::InvalidStep { requested: 5, len: 0 });
        assert!(err.to_string().contains("0--1"));

        history.record("head", "initial", one_node_graph());
        assert!(history.show(1).unwrap_err().to_string().contains("(0-0)"));
    }

    #[test]
    fn test_clear()
    {
        let mut history = History::new();
        history.record("head", "a", one_node_graph());
        history.record("head", "b", one_node_graph());
        history.clear();
        assert!(history.is_empty());
        assert_eq!(history.current(), 0);
        assert!(history.show_all().is_empty());
    }

    #[test]
    fn test_show_all_lists_descriptions()
    {
        let mut history = History::new();
        history.record("head", "a", one_node_graph());
        history.record("head", "b", one_node_graph());
        assert_eq!(history.show_all(), vec![(0, "a"), (1, "b")]);
    }
}
