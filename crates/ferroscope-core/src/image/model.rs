//! Serialisable description of typed values in a heap image.
//!
//! Values are externally tagged in JSON:
//!
//! ```json
//! {"int": 3}
//! {"text": "'a'"}
//! {"ptr": {"addr": "0x1010", "to": "Node"}}
//! {"struct": {"type": "Node", "fields": [{"name": "data", "value": {"int": 3}}]}}
//! {"array": {"of": "int", "items": [{"int": 1}, {"int": 2}]}}
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::Address;

/// A typed value as stored in an image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueSpec
{
    /// Integer scalar
    Int(i64),
    /// Floating-point scalar
    Float(f64),
    /// Any other scalar, kept as the debugger prints it
    Text(String),
    /// Data pointer
    Ptr
    {
        /// Target address (`0x0` for null)
        addr: Address,
        /// Pointee type name
        to: String,
    },
    /// Function pointer, by function name
    Func(String),
    /// Struct with ordered fields
    Struct
    {
        /// Type name
        #[serde(rename = "type")]
        ty: String,
        /// Where an embedded struct lives; objects take their key address
        #[serde(default, skip_serializing_if = "Option::is_none")]
        at: Option<Address>,
        /// Fields in declaration order
        fields: Vec<FieldSpec>,
    },
    /// Fixed-size array
    Array
    {
        /// Element type name
        of: String,
        /// Address of element 0, if known
        #[serde(default, skip_serializing_if = "Option::is_none")]
        at: Option<Address>,
        /// Elements
        items: Vec<ValueSpec>,
    },
}

impl ValueSpec
{
    /// Integer scalar
    pub fn int(value: i64) -> Self
    {
        ValueSpec::Int(value)
    }

    /// Printed scalar
    pub fn text(value: impl Into<String>) -> Self
    {
        ValueSpec::Text(value.into())
    }

    /// Pointer to `to` at `addr`
    pub fn ptr(addr: u64, to: impl Into<String>) -> Self
    {
        ValueSpec::Ptr {
            addr: Address::new(addr),
            to: to.into(),
        }
    }

    /// Null pointer to `to`
    pub fn null(to: impl Into<String>) -> Self
    {
        Self::ptr(0, to)
    }

    /// Struct of type `ty`
    pub fn structure<N: Into<String>>(ty: impl Into<String>, fields: impl IntoIterator<Item = (N, ValueSpec)>) -> Self
    {
        ValueSpec::Struct {
            ty: ty.into(),
            at: None,
            fields: fields
                .into_iter()
                .map(|(name, value)| FieldSpec {
                    name: name.into(),
                    value,
                })
                .collect(),
        }
    }

    /// Array of `of`
    pub fn array(of: impl Into<String>, items: impl IntoIterator<Item = ValueSpec>) -> Self
    {
        ValueSpec::Array {
            of: of.into(),
            at: None,
            items: items.into_iter().collect(),
        }
    }

    /// Place an embedded struct or array at `address`; other values are unchanged
    #[must_use]
    pub fn at(mut self, address: u64) -> Self
    {
        if let ValueSpec::Struct { at, .. } | ValueSpec::Array { at, .. } = &mut self {
            *at = Some(Address::new(address));
        }
        self
    }
}

/// Named struct field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec
{
    /// Field name
    pub name: String,
    /// Field value
    pub value: ValueSpec,
}

/// Value stored at an address
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectSpec
{
    /// Where the value lives
    pub address: Address,
    /// The value
    pub value: ValueSpec,
}

/// On-disk heap image
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ImageFile
{
    /// Type sizes in bytes, beyond the built-in scalar sizes
    #[serde(default)]
    pub sizes: BTreeMap<String, u64>,
    /// Variables in scope
    #[serde(default)]
    pub symbols: BTreeMap<String, ValueSpec>,
    /// Addressable memory
    #[serde(default)]
    pub objects: Vec<ObjectSpec>,
}
