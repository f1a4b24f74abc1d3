//! # Types
//!
//! Backend-agnostic types shared by the inspection interface and the graph
//! builder.
//!
//! These types abstract away where values come from (a live debugger session
//! or a recorded heap image), so the rest of the crate can reason about
//! "an address" or "a pointer-shaped value" without knowing the backend.

pub mod address;

use std::fmt;

// Re-export all public types
pub use address::{Address, ParseAddressError};

/// Coarse type category of an inspected value
///
/// This is all the structure detection needs to know about a type: whether
/// it can be descended into (struct), followed (pointer), indexed (array),
/// or only printed (scalar, function pointer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeCategory
{
    /// Integers, floats, characters, booleans, enums
    Scalar,
    /// Struct, class or union with named fields
    Struct,
    /// Data pointer
    Pointer,
    /// Fixed-size C array
    Array,
    /// Pointer to function; never followed during traversal
    Function,
}

impl TypeCategory
{
    /// Whether values of this category are followed as graph edges
    pub const fn is_data_pointer(self) -> bool
    {
        matches!(self, TypeCategory::Pointer)
    }
}

impl fmt::Display for TypeCategory
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        let name = match self {
            TypeCategory::Scalar => "scalar",
            TypeCategory::Struct => "struct",
            TypeCategory::Pointer => "pointer",
            TypeCategory::Array => "array",
            TypeCategory::Function => "function pointer",
        };
        f.write_str(name)
    }
}
