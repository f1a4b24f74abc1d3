//! # Shape Classifier
//!
//! Infers what kind of pointer structure a struct value is from the names of
//! its pointer fields.
//!
//! Classification is a pure function of the ordered pointer-field names and
//! the [`FieldNameTable`]. The tests run in strict priority order and the
//! first match wins:
//!
//! 1. doubly linked list: a previous-name and a next-name are both present
//! 2. linked list: a next-name alone
//! 3. binary tree: both names of a `(left, right)` pair
//! 4. wrapper: a root/head-style entry pointer on a container object
//! 5. generic: any other pointer fields
//! 6. scalar: no pointer fields at all
//!
//! A doubly linked node also satisfies the singly linked test, which is why
//! it has to be checked first.

use smallvec::SmallVec;
use tracing::debug;

use crate::config::FieldNameTable;
use crate::inspect::MemoryInspector;

/// Pointer-field names of a generic node
pub type PointerFields = SmallVec<[String; 4]>;

/// Inferred structural category of a struct value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape
{
    /// Node with both forward and backward links
    DoublyLinkedList
    {
        /// Forward link field
        next: &'static str,
        /// Backward link field
        prev: &'static str,
    },
    /// Node with a forward link
    LinkedList
    {
        /// Forward link field
        next: &'static str,
    },
    /// Node with two child links
    BinaryTree
    {
        /// Left child field
        left: &'static str,
        /// Right child field
        right: &'static str,
    },
    /// Container object holding a pointer to the real structure
    Wrapper
    {
        /// Field holding the entry pointer
        field: &'static str,
    },
    /// Pointer bag with no recognised convention, in declaration order
    Generic(PointerFields),
    /// No pointer fields
    Scalar,
}

impl Shape
{
    /// Short name used in logs
    pub const fn kind(&self) -> &'static str
    {
        match self {
            Shape::DoublyLinkedList { .. } => "doubly_linked_list",
            Shape::LinkedList { .. } => "linked_list",
            Shape::BinaryTree { .. } => "binary_tree",
            Shape::Wrapper { .. } => "wrapper",
            Shape::Generic(_) => "generic",
            Shape::Scalar => "scalar",
        }
    }
}

/// Classify a set of pointer-field names
///
/// `pointer_fields` must be in declaration order; that order is kept in
/// [`Shape::Generic`].
pub fn classify_fields<S: AsRef<str>>(pointer_fields: &[S], names: &FieldNameTable) -> Shape
{
    let has = |candidate: &str| pointer_fields.iter().any(|f| f.as_ref() == candidate);
    let first_of = |candidates: &'static [&'static str]| candidates.iter().copied().find(|&c| has(c));

    let next = first_of(names.next);
    let prev = first_of(names.previous);

    match (next, prev) {
        (Some(next), Some(prev)) => return Shape::DoublyLinkedList { next, prev },
        (Some(next), None) => return Shape::LinkedList { next },
        _ => {}
    }

    if let Some(&(left, right)) = names.tree_pairs.iter().find(|&&(l, r)| has(l) && has(r)) {
        return Shape::BinaryTree { left, right };
    }

    if let Some(field) = first_of(names.wrapper_roots) {
        return Shape::Wrapper { field };
    }

    if pointer_fields.is_empty() {
        Shape::Scalar
    } else {
        Shape::Generic(pointer_fields.iter().map(|f| f.as_ref().to_string()).collect())
    }
}

/// Names of the data-pointer fields of a struct value, in declaration order
///
/// Non-structs and unreadable structs have no pointer fields.
pub fn pointer_field_names<I: MemoryInspector>(inspector: &I, value: &I::Value) -> PointerFields
{
    match inspector.fields(value) {
        Ok(fields) => fields
            .into_iter()
            .filter(|(_, field)| inspector.type_category(field).is_data_pointer())
            .map(|(name, _)| name)
            .collect(),
        Err(e) => {
            debug!(error = %e, "value has no readable fields");
            PointerFields::new()
        }
    }
}

/// Classify a struct value read through `inspector`
pub fn classify<I: MemoryInspector>(inspector: &I, value: &I::Value, names: &FieldNameTable) -> Shape
{
    let pointers = pointer_field_names(inspector, value);
    let shape = classify_fields(pointers.as_slice(), names);
    debug!(shape = shape.kind(), fields = ?pointers, "classified value");
    shape
}
