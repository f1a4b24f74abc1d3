//! Common module for library exports

pub use crate::adapters::ContainerKind;
pub use crate::config::{FieldNameTable, Limits};
pub use crate::error::{HistoryError, ImageError, InspectError, InspectResult};
pub use crate::graph::{Edge, EdgeStyle, Graph, HighlightSet, Node, NodeId, NodeShape};
pub use crate::image::{MemoryImage, ValueSpec};
pub use crate::inspect::MemoryInspector;
pub use crate::present::{Payload, Table, Visualization};
pub use crate::shape::Shape;
pub use crate::types::{Address, TypeCategory};
pub use crate::visualizer::{TraversalOrder, Visualizer};
