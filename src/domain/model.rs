use serde::Serialize;
use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

/// A boxed model instance whose concrete type is known only through its descriptor.
pub type ModelInstance = Box<dyn Any + Send>;

/// Identity of a model type, used as the registry key.
///
/// Equality and hashing only look at the [`TypeId`]; the type name is kept
/// around for messages.
#[derive(Clone, Copy)]
pub struct ModelTypeId {
    type_id: TypeId,
    type_name: &'static str,
}

impl ModelTypeId {
    pub fn of<M: Any>() -> Self {
        Self {
            type_id: TypeId::of::<M>(),
            type_name: std::any::type_name::<M>(),
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Full Rust path of the type, e.g. `my_app::model::Address`.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Last path segment of the type name, e.g. `Address`.
    pub fn short_name(&self) -> &'static str {
        let without_generics = self.type_name.split('<').next().unwrap_or(self.type_name);
        without_generics
            .rsplit("::")
            .next()
            .unwrap_or(without_generics)
    }
}

impl PartialEq for ModelTypeId {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for ModelTypeId {}

impl Hash for ModelTypeId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl fmt::Debug for ModelTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ModelTypeId({})", self.type_name)
    }
}

impl fmt::Display for ModelTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

/// Type token of a model enumeration: its name and the variant names in ordinal order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EnumType {
    name: &'static str,
    variants: &'static [&'static str],
}

impl EnumType {
    pub const fn new(name: &'static str, variants: &'static [&'static str]) -> Self {
        Self { name, variants }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn variants(&self) -> &'static [&'static str] {
        self.variants
    }

    pub fn variant_at(&self, ordinal: usize) -> Option<&'static str> {
        self.variants.get(ordinal).copied()
    }

    pub fn ordinal_of(&self, name: &str) -> Option<usize> {
        self.variants.iter().position(|variant| *variant == name)
    }
}

/// Declared type of a model field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    Bool,
    Int32,
    Int64,
    Double,
    String,
    Enum(EnumType),
    Model(ModelTypeId),
    List(Box<FieldType>),
}

impl FieldType {
    pub fn list_of(inner: FieldType) -> Self {
        FieldType::List(Box::new(inner))
    }

    pub fn is_list(&self) -> bool {
        matches!(self, FieldType::List(_))
    }

    /// The type with every list layer removed.
    pub fn element_type(&self) -> &FieldType {
        match self {
            FieldType::List(inner) => inner.element_type(),
            other => other,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Bool => f.write_str("Bool"),
            FieldType::Int32 => f.write_str("Int32"),
            FieldType::Int64 => f.write_str("Int64"),
            FieldType::Double => f.write_str("Double"),
            FieldType::String => f.write_str("String"),
            FieldType::Enum(enum_type) => write!(f, "Enum<{}>", enum_type.name()),
            FieldType::Model(model) => write!(f, "Model<{}>", model),
            FieldType::List(inner) => write!(f, "List<{}>", inner),
        }
    }
}

/// Model-side value of a single field, as produced by a getter and consumed by a setter.
pub enum FieldValue {
    Null,
    Bool(bool),
    Int32(i32),
    Int64(i64),
    Double(f64),
    String(String),
    /// Ordinal of the variant within its [`EnumType`].
    Enum(usize),
    Model(ModelInstance),
    List(Vec<FieldValue>),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            FieldValue::Null => "Null",
            FieldValue::Bool(_) => "Bool",
            FieldValue::Int32(_) => "Int32",
            FieldValue::Int64(_) => "Int64",
            FieldValue::Double(_) => "Double",
            FieldValue::String(_) => "String",
            FieldValue::Enum(_) => "Enum",
            FieldValue::Model(_) => "Model",
            FieldValue::List(_) => "List",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(value) => Some(value),
            _ => None,
        }
    }
}

impl fmt::Debug for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => f.write_str("Null"),
            FieldValue::Bool(value) => write!(f, "Bool({value})"),
            FieldValue::Int32(value) => write!(f, "Int32({value})"),
            FieldValue::Int64(value) => write!(f, "Int64({value})"),
            FieldValue::Double(value) => write!(f, "Double({value})"),
            FieldValue::String(value) => write!(f, "String({value:?})"),
            FieldValue::Enum(ordinal) => write!(f, "Enum({ordinal})"),
            FieldValue::Model(_) => f.write_str("Model(..)"),
            FieldValue::List(items) => f.debug_tuple("List").field(items).finish(),
        }
    }
}

/// Returned by [`ModelField::from_value`](crate::domain::ports::ModelField::from_value)
/// when a value does not fit the Rust field type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueMismatch {
    pub expected: String,
    pub actual: String,
}

impl ValueMismatch {
    pub fn new(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self {
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}

/// Where an emitted adapter should live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmitTarget {
    pub namespace: String,
}

impl EmitTarget {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }
}
