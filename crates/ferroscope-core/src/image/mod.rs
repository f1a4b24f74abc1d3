//! # Heap Images
//!
//! A recorded snapshot of typed memory that implements [`MemoryInspector`].
//!
//! An image is a set of variables in scope (`symbols`) and a set of values
//! keyed by address (`objects`). Pointers are followed by looking the target
//! address up in `objects`; an address with nothing recorded behaves like
//! unmapped memory.
//!
//! Images are loaded from JSON (see [`model`] for the schema) or built in
//! code, which is how the tests describe the structures they walk:
//!
//! ```rust
//! use ferroscope_core::image::{MemoryImage, ValueSpec};
//! use ferroscope_core::inspect::MemoryInspector;
//!
//! let mut image = MemoryImage::new();
//! image
//!     .insert_object(0x1000u64, ValueSpec::structure("Node", [("data", ValueSpec::int(1)), ("next", ValueSpec::null("Node"))]))
//!     .unwrap();
//! image.bind("head", ValueSpec::ptr(0x1000, "Node"));
//!
//! let node = image.resolve("*head").unwrap();
//! assert_eq!(image.format(&node), "{data = 1, next = 0x0}");
//! ```
//!
//! Pointer arithmetic (`ptr[i]`, `std::vector` storage) needs the pointee
//! size. Built-in scalar sizes are known; struct sizes come from the image's
//! `sizes` table. An address inside a recorded array resolves to the element
//! at that offset.

pub mod expr;
pub mod model;

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use tracing::{debug, info};

use self::expr::Expr;
pub use self::model::{FieldSpec, ImageFile, ObjectSpec, ValueSpec};
use crate::error::{ImageError, ImageResult, InspectError, InspectResult};
use crate::inspect::MemoryInspector;
use crate::types::{Address, TypeCategory};

/// Pointer width of the recorded target
pub const POINTER_SIZE: u64 = 8;

const BUILTIN_SIZES: &[(&str, u64)] = &[
    ("char", 1),
    ("signed char", 1),
    ("unsigned char", 1),
    ("bool", 1),
    ("short", 2),
    ("unsigned short", 2),
    ("int", 4),
    ("unsigned int", 4),
    ("float", 4),
    ("long", 8),
    ("unsigned long", 8),
    ("long long", 8),
    ("unsigned long long", 8),
    ("double", 8),
    ("size_t", 8),
];

/// One typed value read out of an image
#[derive(Debug, Clone, PartialEq)]
pub struct ImageValue
{
    location: Option<Address>,
    ty: String,
    data: ValueSpec,
}

impl ImageValue
{
    fn new(location: Option<Address>, data: ValueSpec) -> Self
    {
        let ty = default_type_name(&data);
        ImageValue { location, ty, data }
    }

    fn typed(location: Option<Address>, ty: impl Into<String>, data: ValueSpec) -> Self
    {
        ImageValue {
            location,
            ty: ty.into(),
            data,
        }
    }

    /// Where the value lives, if it has a recorded address
    pub fn location(&self) -> Option<Address>
    {
        self.location
    }

    /// Type name of the value
    pub fn type_name(&self) -> &str
    {
        &self.ty
    }

    /// The recorded value
    pub fn data(&self) -> &ValueSpec
    {
        &self.data
    }
}

fn default_type_name(data: &ValueSpec) -> String
{
    match data {
        ValueSpec::Int(_) => "int".to_string(),
        ValueSpec::Float(_) => "double".to_string(),
        ValueSpec::Text(_) => "char".to_string(),
        ValueSpec::Ptr { to, .. } => format!("{to} *"),
        ValueSpec::Func(_) => "void (*)(void)".to_string(),
        ValueSpec::Struct { ty, .. } => ty.clone(),
        ValueSpec::Array { of, items, .. } => format!("{of} [{}]", items.len()),
    }
}

fn category(data: &ValueSpec) -> TypeCategory
{
    match data {
        ValueSpec::Int(_) | ValueSpec::Float(_) | ValueSpec::Text(_) => TypeCategory::Scalar,
        ValueSpec::Ptr { .. } => TypeCategory::Pointer,
        ValueSpec::Func(_) => TypeCategory::Function,
        ValueSpec::Struct { .. } => TypeCategory::Struct,
        ValueSpec::Array { .. } => TypeCategory::Array,
    }
}

/// Embedded address of a struct or array
fn embedded_address(data: &ValueSpec) -> Option<Address>
{
    match data {
        ValueSpec::Struct { at, .. } | ValueSpec::Array { at, .. } => *at,
        _ => None,
    }
}

/// Recorded snapshot of typed memory
#[derive(Debug, Clone, Default)]
pub struct MemoryImage
{
    objects: BTreeMap<Address, ValueSpec>,
    symbols: BTreeMap<String, ValueSpec>,
    sizes: BTreeMap<String, u64>,
    types: BTreeSet<String>,
}

impl MemoryImage
{
    /// Empty image
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Parse an image from JSON text
    ///
    /// ## Errors
    ///
    /// - `Json`: Malformed JSON or schema mismatch
    /// - `DuplicateAddress`: Two objects share an address
    pub fn from_json(text: &str) -> ImageResult<Self>
    {
        let file: ImageFile = serde_json::from_str(text)?;
        Self::try_from(file)
    }

    /// Load an image file
    ///
    /// ## Errors
    ///
    /// - `Io`: The file cannot be read
    /// - `Json`, `DuplicateAddress`: See [`MemoryImage::from_json`]
    pub fn load(path: impl AsRef<Path>) -> ImageResult<Self>
    {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let image = Self::from_json(&text)?;
        info!(
            path = %path.display(),
            objects = image.objects.len(),
            symbols = image.symbols.len(),
            "loaded heap image"
        );
        Ok(image)
    }

    /// Record `value` at `address`
    ///
    /// Embedded structs carrying their own `at` address become addressable
    /// too, unless something is already recorded there.
    ///
    /// ## Errors
    ///
    /// - `DuplicateAddress`: A value is already recorded at `address`
    pub fn insert_object(&mut self, address: impl Into<Address>, value: ValueSpec) -> ImageResult<()>
    {
        let address = address.into();
        if self.objects.contains_key(&address) {
            return Err(ImageError::DuplicateAddress(address));
        }
        self.register(&value);
        self.objects.insert(address, value);
        Ok(())
    }

    /// Put a variable in scope, replacing any previous binding
    pub fn bind(&mut self, name: impl Into<String>, value: ValueSpec)
    {
        self.register(&value);
        if let Some(address) = embedded_address(&value) {
            self.objects.entry(address).or_insert_with(|| value.clone());
        }
        self.symbols.insert(name.into(), value);
    }

    /// Declare the size of a type
    pub fn set_size(&mut self, type_name: impl Into<String>, size: u64)
    {
        let type_name = type_name.into();
        self.types.insert(type_name.clone());
        self.sizes.insert(type_name, size);
    }

    /// Number of addressable values
    pub fn object_count(&self) -> usize
    {
        self.objects.len()
    }

    /// Record type names and embedded addressable values nested in `value`
    fn register(&mut self, value: &ValueSpec)
    {
        match value {
            ValueSpec::Struct { ty, fields, .. } => {
                self.types.insert(ty.clone());
                for field in fields {
                    if let Some(address) = embedded_address(&field.value) {
                        self.objects.entry(address).or_insert_with(|| field.value.clone());
                    }
                    self.register(&field.value);
                }
            }
            ValueSpec::Array { of, items, .. } => {
                self.types.insert(of.clone());
                for item in items {
                    self.register(item);
                }
            }
            ValueSpec::Ptr { to, .. } => {
                self.types.insert(to.clone());
            }
            _ => {}
        }
    }

    fn knows_type(&self, type_name: &str) -> bool
    {
        type_name == "void" || BUILTIN_SIZES.iter().any(|&(name, _)| name == type_name) || self.types.contains(type_name)
    }

    /// Value recorded at `address`, including elements inside recorded arrays
    fn read(&self, address: Address) -> Option<ImageValue>
    {
        if let Some(value) = self.objects.get(&address) {
            return Some(ImageValue::new(Some(address), value.clone()));
        }

        let (&base, value) = self.objects.range(..address).next_back()?;
        let ValueSpec::Array { of, items, .. } = value else {
            return None;
        };
        let size = self.size_of(of).filter(|&size| size > 0)?;
        let offset = address.checked_distance_from(base)?;
        if offset % size != 0 {
            return None;
        }
        let item = items.get(usize::try_from(offset / size).ok()?)?;
        Some(ImageValue::typed(Some(address), of.as_str(), item.clone()))
    }

    /// Read through a pointer; scalars take the pointee type of the pointer
    fn read_through(&self, target: Address, pointee: &str) -> InspectResult<ImageValue>
    {
        if target.is_null() {
            return Err(InspectError::Deref(target));
        }
        let mut value = self.read(target).ok_or(InspectError::Deref(target))?;
        // A pointer to the element type of an array points at its first element
        if let ValueSpec::Array { of, items, .. } = &value.data {
            if of == pointee {
                let first = items.first().ok_or(InspectError::Deref(target))?.clone();
                return Ok(ImageValue::typed(Some(target), pointee, first));
            }
        }
        if matches!(category(&value.data), TypeCategory::Scalar | TypeCategory::Pointer) && pointee != "void" {
            value.ty = pointee.to_string();
        }
        Ok(value)
    }

    fn eval(&self, expr: &Expr) -> InspectResult<ImageValue>
    {
        match expr {
            Expr::Symbol(name) => {
                let spec = self
                    .symbols
                    .get(name)
                    .ok_or_else(|| InspectError::resolve(name.as_str(), format!("No symbol \"{name}\" in current context.")))?;
                Ok(ImageValue::new(embedded_address(spec), spec.clone()))
            }
            Expr::Field(base, name) => {
                let mut value = self.eval(base)?;
                if matches!(value.data, ValueSpec::Ptr { .. }) {
                    value = self.dereference(&value)?;
                }
                self.field(&value, name)
            }
            Expr::Arrow(base, name) => {
                let pointer = self.eval(base)?;
                let target = self.dereference(&pointer)?;
                self.field(&target, name)
            }
            Expr::Deref(base) => self.dereference(&self.eval(base)?),
            Expr::Index(base, index) => self.index(&self.eval(base)?, *index),
        }
    }

    fn render(&self, data: &ValueSpec) -> String
    {
        match data {
            ValueSpec::Int(value) => value.to_string(),
            ValueSpec::Float(value) => value.to_string(),
            ValueSpec::Text(text) => text.clone(),
            ValueSpec::Ptr { addr, .. } => addr.to_string(),
            ValueSpec::Func(name) => format!("<{name}>"),
            ValueSpec::Struct { fields, .. } => {
                let inner: Vec<String> = fields
                    .iter()
                    .map(|field| format!("{} = {}", field.name, self.render(&field.value)))
                    .collect();
                format!("{{{}}}", inner.join(", "))
            }
            ValueSpec::Array { items, .. } => {
                let inner: Vec<String> = items.iter().map(|item| self.render(item)).collect();
                format!("{{{}}}", inner.join(", "))
            }
        }
    }
}

impl TryFrom<ImageFile> for MemoryImage
{
    type Error = ImageError;

    fn try_from(file: ImageFile) -> ImageResult<Self>
    {
        let mut image = MemoryImage::new();
        for (name, size) in file.sizes {
            image.set_size(name, size);
        }
        for object in file.objects {
            image.insert_object(object.address, object.value)?;
        }
        for (name, value) in file.symbols {
            image.bind(name, value);
        }
        debug!(objects = image.objects.len(), "built heap image");
        Ok(image)
    }
}

impl MemoryInspector for MemoryImage
{
    type Value = ImageValue;

    fn resolve(&self, expr: &str) -> InspectResult<ImageValue>
    {
        let parsed = expr::parse(expr).map_err(|reason| InspectError::resolve(expr, reason))?;
        self.eval(&parsed).map_err(|e| match e {
            InspectError::Resolve { reason, .. } => InspectError::resolve(expr, reason),
            other => InspectError::resolve(expr, other.to_string()),
        })
    }

    fn type_category(&self, value: &ImageValue) -> TypeCategory
    {
        category(&value.data)
    }

    fn type_name(&self, value: &ImageValue) -> String
    {
        value.ty.clone()
    }

    fn fields(&self, value: &ImageValue) -> InspectResult<Vec<(String, ImageValue)>>
    {
        match &value.data {
            ValueSpec::Struct { fields, .. } => Ok(fields
                .iter()
                .map(|field| {
                    let child = ImageValue::new(embedded_address(&field.value), field.value.clone());
                    (field.name.clone(), child)
                })
                .collect()),
            other => Err(InspectError::TypeMismatch {
                expected: TypeCategory::Struct,
                found: category(other),
            }),
        }
    }

    fn field(&self, value: &ImageValue, name: &str) -> InspectResult<ImageValue>
    {
        let ValueSpec::Struct { fields, .. } = &value.data else {
            return Err(InspectError::TypeMismatch {
                expected: TypeCategory::Struct,
                found: category(&value.data),
            });
        };
        fields
            .iter()
            .find(|field| field.name == name)
            .map(|field| ImageValue::new(embedded_address(&field.value), field.value.clone()))
            .ok_or_else(|| InspectError::FieldAbsent(name.to_string()))
    }

    fn address(&self, value: &ImageValue) -> Option<Address>
    {
        value.location
    }

    fn pointer_value(&self, value: &ImageValue) -> InspectResult<Address>
    {
        match &value.data {
            ValueSpec::Ptr { addr, .. } => Ok(*addr),
            other => Err(InspectError::TypeMismatch {
                expected: TypeCategory::Pointer,
                found: category(other),
            }),
        }
    }

    fn dereference(&self, value: &ImageValue) -> InspectResult<ImageValue>
    {
        match &value.data {
            ValueSpec::Ptr { addr, to } => self.read_through(*addr, to),
            other => Err(InspectError::TypeMismatch {
                expected: TypeCategory::Pointer,
                found: category(other),
            }),
        }
    }

    fn array_bounds(&self, value: &ImageValue) -> InspectResult<(i64, i64)>
    {
        match &value.data {
            ValueSpec::Array { items, .. } => {
                let len = i64::try_from(items.len()).unwrap_or(i64::MAX);
                Ok((0, len - 1))
            }
            other => Err(InspectError::TypeMismatch {
                expected: TypeCategory::Array,
                found: category(other),
            }),
        }
    }

    fn index(&self, value: &ImageValue, index: u64) -> InspectResult<ImageValue>
    {
        match &value.data {
            ValueSpec::Array { of, at, items } => {
                let item = usize::try_from(index)
                    .ok()
                    .and_then(|i| items.get(i))
                    .ok_or(InspectError::IndexOutOfBounds {
                        index,
                        len: items.len() as u64,
                    })?;
                let location = at.zip(self.size_of(of)).and_then(|(base, size)| {
                    index.checked_mul(size).and_then(|offset| base.checked_add(offset))
                });
                Ok(ImageValue::typed(location, of.as_str(), item.clone()))
            }
            ValueSpec::Ptr { addr, to } => {
                let size = self.size_of(to).ok_or_else(|| InspectError::Cast(to.clone()))?;
                let target = index
                    .checked_mul(size)
                    .and_then(|offset| addr.checked_add(offset))
                    .ok_or(InspectError::Deref(*addr))?;
                self.read_through(target, to)
            }
            other => Err(InspectError::TypeMismatch {
                expected: TypeCategory::Array,
                found: category(other),
            }),
        }
    }

    fn cast(&self, value: &ImageValue, type_name: &str) -> InspectResult<ImageValue>
    {
        let type_name = type_name.trim();
        if let Some(pointee) = type_name.strip_suffix('*') {
            let pointee = pointee.trim();
            let ValueSpec::Ptr { addr, .. } = &value.data else {
                return Err(InspectError::Cast(type_name.to_string()));
            };
            if !self.knows_type(pointee) && !pointee.ends_with('*') {
                return Err(InspectError::Cast(pointee.to_string()));
            }
            let data = ValueSpec::Ptr {
                addr: *addr,
                to: pointee.to_string(),
            };
            return Ok(ImageValue::typed(value.location, format!("{pointee} *"), data));
        }

        if !self.knows_type(type_name) {
            return Err(InspectError::Cast(type_name.to_string()));
        }
        Ok(ImageValue::typed(value.location, type_name, value.data.clone()))
    }

    fn size_of(&self, type_name: &str) -> Option<u64>
    {
        let type_name = type_name.trim();
        if type_name.ends_with('*') {
            return Some(POINTER_SIZE);
        }
        BUILTIN_SIZES
            .iter()
            .find(|&&(name, _)| name == type_name)
            .map(|&(_, size)| size)
            .or_else(|| self.sizes.get(type_name).copied())
    }

    fn target_size(&self, value: &ImageValue) -> Option<u64>
    {
        match &value.data {
            ValueSpec::Ptr { to, .. } => self.size_of(to),
            _ => None,
        }
    }

    fn as_integer(&self, value: &ImageValue) -> InspectResult<i64>
    {
        match &value.data {
            ValueSpec::Int(value) => Ok(*value),
            other => Err(InspectError::TypeMismatch {
                expected: TypeCategory::Scalar,
                found: category(other),
            }),
        }
    }

    fn format(&self, value: &ImageValue) -> String
    {
        self.render(&value.data)
    }
}
