//! Contiguous storage (C arrays, `std::vector`) as an index/value strip.
//!
//! Contiguous data reads better as a strip than as a graph, so these
//! adapters produce a [`Table`] rather than nodes and edges.

use std::collections::BTreeSet;

use tracing::{debug, info};

use super::first_template_argument;
use crate::config::Limits;
use crate::error::InspectResult;
use crate::inspect::MemoryInspector;
use crate::present::{truncate_cell, Cell, Table, Visualization};

/// Render `size` elements of an array or pointer expression
///
/// Unreadable elements show as `?`. At most [`Limits::table_cells`] are shown.
pub fn array_table<I: MemoryInspector>(inspector: &I, expr: &str, size: u64, limits: &Limits) -> Visualization
{
    info!(expr, size, "visualizing array");
    match inspector.resolve(expr) {
        Ok(array) => {
            let shown = shown_cells(size, limits);
            let title = if shown < size {
                format!("Array: {expr} (showing {shown} of {size})")
            } else {
                format!("Array: {expr}")
            };
            let table = strip(inspector, &array, title, shown, &BTreeSet::new(), limits);
            Visualization::Table(table)
        }
        Err(e) => Visualization::text(format!("Error: {e}")),
    }
}

/// Render a `std::vector`, sized from its begin/end pointers
///
/// Element size comes from the vector's template argument, then from the
/// begin pointer's target type, and falls back to 1.
pub fn vector_table<I: MemoryInspector>(
    inspector: &I,
    expr: &str,
    highlights: &BTreeSet<u64>,
    limits: &Limits,
) -> Visualization
{
    info!(expr, highlights = highlights.len(), "visualizing vector");
    match vector_parts(inspector, expr) {
        Ok((start, size)) => {
            if size == 0 {
                return Visualization::text(format!("{expr}: empty vector (size=0)"));
            }
            let shown = shown_cells(size, limits);
            let title = if shown < size {
                format!("Vector: {expr} (size: {size}, showing {shown})")
            } else {
                format!("Vector: {expr} (size: {size})")
            };
            Visualization::Table(strip(inspector, &start, title, shown, highlights, limits))
        }
        Err(e) => Visualization::text(format!(
            "std::vector Error: {e}\nMake sure this is a libstdc++ std::vector"
        )),
    }
}

/// Begin pointer and element count of a vector
fn vector_parts<I: MemoryInspector>(inspector: &I, expr: &str) -> InspectResult<(I::Value, u64)>
{
    let vector = inspector.resolve(expr)?;
    let implementation = inspector.field(&vector, "_M_impl")?;
    let start = inspector.field(&implementation, "_M_start")?;
    let finish = inspector.field(&implementation, "_M_finish")?;

    let element_size = first_template_argument(&inspector.type_name(&vector))
        .and_then(|element| inspector.size_of(element))
        .or_else(|| inspector.target_size(&start))
        .filter(|&size| size > 0)
        .unwrap_or(1);

    let begin = inspector.pointer_value(&start)?;
    let end = inspector.pointer_value(&finish)?;
    let size = end.checked_distance_from(begin).unwrap_or(0) / element_size;
    debug!(%begin, %end, element_size, size, "vector layout");
    Ok((start, size))
}

/// Cells to render; a corrupt header can claim millions of elements
fn shown_cells(size: u64, limits: &Limits) -> u64
{
    let cap = u64::try_from(limits.table_cells).unwrap_or(u64::MAX);
    if size > cap {
        debug!(size, cap, "table truncated");
    }
    size.min(cap)
}

fn strip<I: MemoryInspector>(
    inspector: &I,
    base: &I::Value,
    title: String,
    size: u64,
    highlights: &BTreeSet<u64>,
    limits: &Limits,
) -> Table
{
    let headers = (0..size).map(|i| i.to_string()).collect();
    let cells = (0..size)
        .map(|i| {
            let text = match inspector.index(base, i) {
                Ok(element) => truncate_cell(&inspector.format(&element), limits.cell_chars),
                Err(e) => {
                    debug!(index = i, error = %e, "element unreadable");
                    "?".to_string()
                }
            };
            Cell {
                text,
                highlighted: highlights.contains(&i),
            }
        })
        .collect();
    Table { title, headers, cells }
}
