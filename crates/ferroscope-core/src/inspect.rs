//! # Memory Inspection Interface
//!
//! The narrow interface the graph builder uses to read inspected memory.
//!
//! The structure-detection engine never touches a process directly. It asks
//! an implementation of [`MemoryInspector`] to evaluate expressions, list
//! struct fields and follow pointers. Backends include:
//!
//! - **Debugger sessions**: evaluate through the host debugger's value API
//! - **Heap images**: [`crate::image::MemoryImage`], a recorded snapshot that
//!   tests and the command-line tool use
//!
//! ## Why use a trait?
//!
//! Traits allow us to:
//! - Write the traversal once and run it against any backend
//! - Swap in a recorded image for testing
//! - Keep every memory read behind a `Result`, so a bad pointer is just a
//!   failed branch and never a crash
//!
//! ## Ownership
//!
//! Values are transient handles owned by the backend. The graph builder
//! clones them freely and never keeps one past the request that produced it.

use crate::error::InspectResult;
use crate::types::{Address, TypeCategory};

/// Read access to typed values in inspected memory
///
/// Every method may fail; callers treat failures as recoverable. Methods that
/// only describe a value (`type_category`, `type_name`, `format`) are total.
pub trait MemoryInspector
{
    /// Backend handle for one typed value
    type Value: Clone;

    /// Evaluate an expression such as `list.head` or `(tree).root` in the
    /// current scope.
    ///
    /// ## Errors
    ///
    /// - `Resolve`: The expression does not parse or a step of it fails
    fn resolve(&self, expr: &str) -> InspectResult<Self::Value>;

    /// Coarse category of the value's type
    fn type_category(&self, value: &Self::Value) -> TypeCategory;

    /// Full type name as the debugger prints it (`std::vector<int, std::allocator<int> >`)
    fn type_name(&self, value: &Self::Value) -> String;

    /// Struct fields in declaration order
    ///
    /// ## Errors
    ///
    /// - `TypeMismatch`: The value is not a struct
    fn fields(&self, value: &Self::Value) -> InspectResult<Vec<(String, Self::Value)>>;

    /// A single named field
    ///
    /// ## Errors
    ///
    /// - `FieldAbsent`: No field with that name
    /// - `TypeMismatch`: The value is not a struct
    fn field(&self, value: &Self::Value, name: &str) -> InspectResult<Self::Value>;

    /// Location of the value in memory (`&value`), if it has one
    ///
    /// Scalars read out of a struct field may have no address of their own.
    fn address(&self, value: &Self::Value) -> Option<Address>;

    /// Numeric value of a pointer (the address it points at)
    ///
    /// ## Errors
    ///
    /// - `TypeMismatch`: The value is not a pointer
    fn pointer_value(&self, value: &Self::Value) -> InspectResult<Address>;

    /// Whether a pointer is null
    ///
    /// Non-pointers are never zero.
    fn is_zero(&self, value: &Self::Value) -> bool
    {
        self.pointer_value(value).is_ok_and(Address::is_null)
    }

    /// Follow a pointer
    ///
    /// ## Errors
    ///
    /// - `Deref`: The target is null or unreadable
    /// - `TypeMismatch`: The value is not a pointer
    fn dereference(&self, value: &Self::Value) -> InspectResult<Self::Value>;

    /// Inclusive index bounds of a fixed-size array, `(low, high)`
    ///
    /// An empty array reports `(0, -1)`.
    ///
    /// ## Errors
    ///
    /// - `TypeMismatch`: The value is not an array
    fn array_bounds(&self, value: &Self::Value) -> InspectResult<(i64, i64)>;

    /// Element `index` of an array, or `ptr[index]` for a pointer
    ///
    /// ## Errors
    ///
    /// - `IndexOutOfBounds`: Index past the end of an array
    /// - `Deref`: The element memory is unreadable
    fn index(&self, value: &Self::Value, index: u64) -> InspectResult<Self::Value>;

    /// Reinterpret the value as another type
    ///
    /// A trailing `*` in `type_name` casts a pointer to a different pointee type.
    ///
    /// ## Errors
    ///
    /// - `Cast`: The type is unknown to the backend
    fn cast(&self, value: &Self::Value, type_name: &str) -> InspectResult<Self::Value>;

    /// Size in bytes of a named type
    fn size_of(&self, type_name: &str) -> Option<u64>;

    /// Size in bytes of the type a pointer points at
    fn target_size(&self, value: &Self::Value) -> Option<u64>;

    /// Integer value of a scalar
    ///
    /// ## Errors
    ///
    /// - `TypeMismatch`: The value is not an integer
    fn as_integer(&self, value: &Self::Value) -> InspectResult<i64>;

    /// The value printed the way the debugger prints it (`3`, `0x1000`, `{data = 3, next = 0x0}`)
    fn format(&self, value: &Self::Value) -> String;
}
