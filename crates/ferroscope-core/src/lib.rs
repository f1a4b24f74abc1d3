//! # ferroscope-core
//!
//! Pointer-structure detection and graph construction over inspected memory.
//!
//! This crate turns a typed value in a stopped process into something a
//! renderer can draw:
//! - Shape inference from field names (lists, trees, wrappers, pointer bags)
//! - Cycle-safe, depth-bounded traversal into a node/edge graph
//! - Adapters for `std::vector`, `std::list`, `std::map` and `std::set`
//! - Step recording and playback
//! - The JSON payload consumed by the renderer
//!
//! ## Memory access
//!
//! Nothing here reads a process directly. All reads go through the
//! [`MemoryInspector`] trait; [`image::MemoryImage`] is an implementation
//! backed by a recorded heap snapshot.
//!
//! ## Entry point
//!
//! [`Visualizer`] holds an inspector, the traversal limits and the step
//! history, and exposes one method per command:
//!
//! ```rust
//! use ferroscope_core::image::{MemoryImage, ValueSpec};
//! use ferroscope_core::Visualizer;
//!
//! let mut image = MemoryImage::new();
//! image.bind("x", ValueSpec::int(42));
//!
//! let vis = Visualizer::new(image);
//! let result = vis.visualize::<&str>("x", &[]);
//! assert_eq!(result.present().to_json(), r#"{"kind":{"text":true},"text":"x = 42"}"#);
//! ```

pub mod adapters;
pub mod config;
pub mod error;
pub mod graph;
pub mod history;
pub mod image;
pub mod inspect;
pub mod prelude;
pub mod present;
pub mod shape;
pub mod traversal;
pub mod types;
pub mod visualizer;

// Re-export commonly used types
pub use config::{FieldNameTable, Limits};
pub use error::{HistoryError, ImageError, InspectError, InspectResult};
pub use graph::{Graph, HighlightSet};
pub use inspect::MemoryInspector;
pub use present::{Payload, Visualization};
pub use shape::Shape;
pub use types::Address;
pub use visualizer::{TraversalOrder, Visualizer};
