//! # Visualizer Session
//!
//! The command surface: one object owning the inspector, the traversal
//! bounds and the step history.
//!
//! Every operation returns a [`Visualization`] and never fails. Resolve
//! errors, null roots and out-of-range steps all come back as text results,
//! because the caller is a debugger prompt that prints whatever it gets.
//!
//! Each top-level call builds its own traversal context; nothing but the
//! history survives from one call to the next.

use std::collections::{BTreeSet, HashSet, VecDeque};
use std::fmt;
use std::fmt::Write as _;

use smallvec::SmallVec;
use tracing::{debug, info};

use crate::adapters::{array_table, map_summary, node_list_graph, vector_table, ContainerKind};
use crate::config::{FieldNameTable, Limits};
use crate::graph::{HighlightSet, Node, NodeId};
use crate::history::History;
use crate::inspect::MemoryInspector;
use crate::present::Visualization;
use crate::shape::{classify, Shape};
use crate::traversal::GraphBuilder;
use crate::types::{Address, TypeCategory};

/// Visiting order for [`Visualizer::visualize_with_traversal`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TraversalOrder
{
    /// Level order
    #[default]
    Bfs,
    /// Left, node, right
    Inorder,
    /// Same walk as `Inorder`, under its other name
    Dfs,
}

impl TraversalOrder
{
    /// Order for a name; anything unrecognised is breadth-first
    ///
    /// ```rust
    /// use ferroscope_core::visualizer::TraversalOrder;
    ///
    /// assert_eq!(TraversalOrder::from_name("inorder"), TraversalOrder::Inorder);
    /// assert_eq!(TraversalOrder::from_name("zigzag"), TraversalOrder::Bfs);
    /// ```
    pub fn from_name(name: &str) -> Self
    {
        match name.trim().to_ascii_lowercase().as_str() {
            "inorder" => TraversalOrder::Inorder,
            "dfs" => TraversalOrder::Dfs,
            other => {
                if other != "bfs" {
                    debug!(order = other, "unknown traversal order, using bfs");
                }
                TraversalOrder::Bfs
            }
        }
    }

    /// Lowercase name
    pub const fn name(self) -> &'static str
    {
        match self {
            TraversalOrder::Bfs => "bfs",
            TraversalOrder::Inorder => "inorder",
            TraversalOrder::Dfs => "dfs",
        }
    }
}

impl fmt::Display for TraversalOrder
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.write_str(self.name())
    }
}

/// Addresses of wrappers already resolved during one request
type WrapperChain = SmallVec<[Address; 4]>;

/// Visualization session over one memory inspector
#[derive(Debug)]
pub struct Visualizer<I: MemoryInspector>
{
    inspector: I,
    limits: Limits,
    names: FieldNameTable,
    history: History,
}

impl<I: MemoryInspector> Visualizer<I>
{
    /// Session with default limits and field names
    pub fn new(inspector: I) -> Self
    {
        Visualizer {
            inspector,
            limits: Limits::default(),
            names: FieldNameTable::DEFAULT,
            history: History::new(),
        }
    }

    /// Replace the traversal bounds
    #[must_use]
    pub fn with_limits(mut self, limits: Limits) -> Self
    {
        self.limits = limits;
        self
    }

    /// Replace the field-name table
    #[must_use]
    pub fn with_names(mut self, names: FieldNameTable) -> Self
    {
        self.names = names;
        self
    }

    /// Current inspector
    pub fn inspector(&self) -> &I
    {
        &self.inspector
    }

    /// Swap in a new inspector (the process stopped somewhere else); history is kept
    pub fn set_inspector(&mut self, inspector: I)
    {
        self.inspector = inspector;
    }

    /// Traversal bounds in use
    pub fn limits(&self) -> &Limits
    {
        &self.limits
    }

    /// Recorded steps
    pub fn history(&self) -> &History
    {
        &self.history
    }

    /// Visualize `expr`, tagging the nodes that `highlight_vars` point at
    ///
    /// Arrays and standard containers are recognised from their type before
    /// shape classification. Wrappers are unwrapped by visualizing
    /// `(expr).field` instead.
    pub fn visualize<S: AsRef<str>>(&self, expr: &str, highlight_vars: &[S]) -> Visualization
    {
        info!(expr, highlights = highlight_vars.len(), "visualize");
        let highlights = self.highlights(highlight_vars);
        self.visualize_expr(expr, &highlights, &mut WrapperChain::new())
    }

    /// Resolve highlight variables to the addresses they point at
    ///
    /// Variables that do not resolve, are not pointers, or are null are skipped.
    fn highlights<S: AsRef<str>>(&self, vars: &[S]) -> HighlightSet
    {
        let mut highlights = HighlightSet::new();
        for var in vars {
            let var = var.as_ref();
            match self.inspector.resolve(var).and_then(|value| self.inspector.pointer_value(&value)) {
                Ok(address) if !address.is_null() => highlights.insert(address, var),
                Ok(_) => debug!(var, "highlight pointer is null"),
                Err(e) => debug!(var, error = %e, "highlight variable skipped"),
            }
        }
        highlights
    }

    fn visualize_expr(&self, expr: &str, highlights: &HighlightSet, wrappers: &mut WrapperChain) -> Visualization
    {
        let inspector = &self.inspector;
        let value = match inspector.resolve(expr) {
            Ok(value) => value,
            Err(e) => return Visualization::text(format!("Error: {e}")),
        };

        if inspector.type_category(&value) == TypeCategory::Array {
            return match inspector.array_bounds(&value) {
                Ok((low, high)) => {
                    array_table(inspector, expr, bounds_len(low, high), &self.limits)
                }
                Err(e) => Visualization::text(format!("Error: {e}")),
            };
        }

        match ContainerKind::detect(&inspector.type_name(&value)) {
            Some(ContainerKind::Vector) => return vector_table(inspector, expr, &BTreeSet::new(), &self.limits),
            Some(ContainerKind::List) => return node_list_graph(inspector, expr, &HighlightSet::new(), &self.limits),
            Some(kind @ (ContainerKind::Map | ContainerKind::Set)) => return map_summary(inspector, expr, kind),
            None => {}
        }

        let value = if inspector.type_category(&value) == TypeCategory::Pointer {
            if inspector.is_zero(&value) {
                return Visualization::text(format!("NULL pointer: {expr}"));
            }
            match inspector.dereference(&value) {
                Ok(target) => target,
                Err(e) => return Visualization::text(format!("Error: {e}")),
            }
        } else {
            value
        };

        match classify(inspector, &value, &self.names) {
            Shape::Wrapper { field } => {
                if let Some(address) = inspector.address(&value) {
                    if wrappers.contains(&address) {
                        debug!(expr, %address, "wrapper refers back to itself");
                        return Visualization::text(format!("Wrapper cycle: {expr} leads back to {address}"));
                    }
                    wrappers.push(address);
                }
                let inner = format!("({expr}).{field}");
                debug!(expr, inner = inner.as_str(), "unwrapping");
                self.visualize_expr(&inner, highlights, wrappers)
            }
            Shape::Scalar => Visualization::text(format!("{expr} = {}", inspector.format(&value))),
            shape => {
                let builder = GraphBuilder::new(inspector, &self.names, &self.limits, highlights);
                Visualization::Graph(builder.build(&value, &shape))
            }
        }
    }

    /// Index/value strip of the first `size` elements of `expr`
    pub fn visualize_array(&self, expr: &str, size: u64) -> Visualization
    {
        array_table(&self.inspector, expr, size, &self.limits)
    }

    /// `std::vector` strip with the given indices highlighted
    pub fn visualize_contiguous(&self, expr: &str, highlight_indices: &[u64]) -> Visualization
    {
        let highlights: BTreeSet<u64> = highlight_indices.iter().copied().collect();
        vector_table(&self.inspector, expr, &highlights, &self.limits)
    }

    /// `std::list` walked from its sentinel
    pub fn visualize_node_list(&self, expr: &str) -> Visualization
    {
        node_list_graph(&self.inspector, expr, &HighlightSet::new(), &self.limits)
    }

    /// Visualize `expr` and append the result to the history
    pub fn record_step(&mut self, expr: &str, description: &str) -> Visualization
    {
        let result = self.visualize::<&str>(expr, &[]);
        let step = self.history.record(expr, description, result);
        Visualization::text(format!("Step {step} recorded: {description}"))
    }

    /// A recorded step, or the list of all steps when `step` is `None`
    pub fn show_step(&mut self, step: Option<usize>) -> Visualization
    {
        let Some(step) = step else {
            return self.show_all_steps();
        };
        self.history
            .show(step)
            .unwrap_or_else(|e| Visualization::text(e.to_string()))
    }

    fn show_all_steps(&self) -> Visualization
    {
        let steps = self.history.show_all();
        if steps.is_empty() {
            return Visualization::text("No steps recorded. Use 'vis_record <expr> <description>' to record.");
        }
        let mut text = String::from("Recorded Steps:\n");
        for (step, description) in steps {
            let _ = writeln!(text, "  [{step}] {description}");
        }
        Visualization::text(text)
    }

    /// Forget every recorded step
    pub fn clear_history(&mut self) -> Visualization
    {
        self.history.clear();
        Visualization::text("History cleared.")
    }

    /// Binary tree at `expr` with the `step`-th node in `order` highlighted
    ///
    /// A `traversal_info` node naming the order and position is placed first.
    pub fn visualize_with_traversal(&self, expr: &str, order: TraversalOrder, step: usize) -> Visualization
    {
        info!(expr, %order, step, "visualize traversal");
        let inspector = &self.inspector;
        let value = match inspector.resolve(expr) {
            Ok(value) => value,
            Err(e) => return Visualization::text(format!("Traversal Error: {e}")),
        };

        let value = if inspector.type_category(&value) == TypeCategory::Pointer {
            if inspector.is_zero(&value) {
                return Visualization::text("NULL tree");
            }
            match inspector.dereference(&value) {
                Ok(target) => target,
                Err(e) => return Visualization::text(format!("Traversal Error: {e}")),
            }
        } else {
            value
        };

        let shape = classify(inspector, &value, &self.names);
        let Shape::BinaryTree { left, right } = shape else {
            return Visualization::text("Not a binary tree structure");
        };

        let visit_order = match order {
            TraversalOrder::Bfs => self.level_order(&value, left, right),
            TraversalOrder::Inorder | TraversalOrder::Dfs => {
                let mut collected = Vec::new();
                self.in_order(&value, left, right, 0, &mut HashSet::new(), &mut collected);
                collected
            }
        };

        let mut highlights = HighlightSet::new();
        if let Some(&current) = visit_order.get(step) {
            highlights.insert(current, format!("→ {step}"));
        }

        let graph = GraphBuilder::new(inspector, &self.names, &self.limits, &highlights).build(&value, &shape);
        let last = i64::try_from(visit_order.len()).unwrap_or(i64::MAX) - 1;
        let info = Node::info(
            NodeId::TraversalInfo,
            format!("{}\nStep {step}/{last}", order.name().to_uppercase()),
        );
        Visualization::Graph(graph.with_overlay(info))
    }

    /// Non-null child through pointer field `name`
    fn child(&self, node: &I::Value, name: &str) -> Option<I::Value>
    {
        let pointer = self.inspector.field(node, name).ok()?;
        if self.inspector.is_zero(&pointer) {
            return None;
        }
        self.inspector.dereference(&pointer).ok()
    }

    fn level_order(&self, root: &I::Value, left: &str, right: &str) -> Vec<Address>
    {
        let mut order = Vec::new();
        let mut seen = HashSet::new();
        let mut queue = VecDeque::from([root.clone()]);
        while let Some(node) = queue.pop_front() {
            let Some(address) = self.inspector.address(&node).filter(|a| !a.is_null()) else {
                continue;
            };
            if !seen.insert(address) {
                continue;
            }
            order.push(address);
            queue.extend([left, right].into_iter().filter_map(|field| self.child(&node, field)));
        }
        order
    }

    fn in_order(
        &self,
        node: &I::Value,
        left: &str,
        right: &str,
        depth: usize,
        seen: &mut HashSet<Address>,
        order: &mut Vec<Address>,
    )
    {
        if depth > self.limits.tree_depth {
            return;
        }
        let Some(address) = self.inspector.address(node).filter(|a| !a.is_null()) else {
            return;
        };
        if !seen.insert(address) {
            return;
        }
        if let Some(child) = self.child(node, left) {
            self.in_order(&child, left, right, depth + 1, seen, order);
        }
        order.push(address);
        if let Some(child) = self.child(node, right) {
            self.in_order(&child, left, right, depth + 1, seen, order);
        }
    }
}

/// Element count of inclusive bounds; zero when they are inverted or overflow
fn bounds_len(low: i64, high: i64) -> u64
{
    high.checked_sub(low)
        .and_then(|span| span.checked_add(1))
        .and_then(|len| u64::try_from(len).ok())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests
{
    use super::*;
    use crate::image::{MemoryImage, ValueSpec};

    #[test]
    fn test_traversal_order_names()
    {
        assert_eq!(TraversalOrder::from_name("BFS"), TraversalOrder::Bfs);
        assert_eq!(TraversalOrder::from_name("dfs"), TraversalOrder::Dfs);
        assert_eq!(TraversalOrder::from_name(""), TraversalOrder::Bfs);
        assert_eq!(TraversalOrder::Inorder.to_string(), "inorder");
    }

    #[test]
    fn test_scalar_and_errors_are_text()
    {
        let mut image = MemoryImage::new();
        image.bind("x", ValueSpec::int(3));
        image.bind("p", ValueSpec::null("Node"));
        let vis = Visualizer::new(image);

        assert_eq!(vis.visualize::<&str>("x", &[]).as_text(), Some("x = 3"));
        assert_eq!(vis.visualize::<&str>("p", &[]).as_text(), Some("NULL pointer: p"));
        let missing = vis.visualize::<&str>("nope", &[]);
        assert!(missing.as_text().unwrap().starts_with("Error: "));
    }

    #[test]
    fn test_self_referencing_wrapper_stops()
    {
        let mut image = MemoryImage::new();
        image
            .insert_object(0x40u64, ValueSpec::structure("Holder", [("head", ValueSpec::ptr(0x40, "Holder"))]))
            .unwrap();
        image.bind("h", ValueSpec::ptr(0x40, "Holder"));
        let vis = Visualizer::new(image);

        let result = vis.visualize::<&str>("h", &[]);
        assert!(result.as_text().unwrap().starts_with("Wrapper cycle: (h).head"));
    }

    #[test]
    fn test_show_all_steps_text()
    {
        let mut image = MemoryImage::new();
        image.bind("x", ValueSpec::int(1));
        let mut vis = Visualizer::new(image);

        assert_eq!(
            vis.show_step(None).as_text(),
            Some("No steps recorded. Use 'vis_record <expr> <description>' to record.")
        );
        assert_eq!(vis.record_step("x", "first").as_text(), Some("Step 0 recorded: first"));
        assert_eq!(vis.record_step("x", "second").as_text(), Some("Step 1 recorded: second"));
        assert_eq!(
            vis.show_step(None).as_text(),
            Some("Recorded Steps:\n  [0] first\n  [1] second\n")
        );
        assert_eq!(vis.clear_history().as_text(), Some("History cleared."));
        assert!(vis.history().is_empty());
    }

    #[test]
    fn test_bounds_len_survives_hostile_bounds()
    {
        assert_eq!(bounds_len(0, 4), 5);
        assert_eq!(bounds_len(0, -1), 0);
        assert_eq!(bounds_len(3, 1), 0);
        assert_eq!(bounds_len(i64::MIN, i64::MAX), 0);
        assert_eq!(bounds_len(0, i64::MAX), 0);
        assert_eq!(bounds_len(1, i64::MAX), u64::try_from(i64::MAX).unwrap());
    }
}
