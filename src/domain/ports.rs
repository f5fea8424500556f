use crate::core::definition::AdapterDefinition;
use crate::domain::model::{EmitTarget, EnumType, FieldType, FieldValue, ValueMismatch};
use crate::utils::error::Result;
use bson::oid::ObjectId;

/// A Rust type that can live in a model field.
///
/// Implemented for the scalar types, `Option<T>` and `Vec<T>`. Model structs and
/// enums get an implementation through [`impl_model_field!`](crate::impl_model_field)
/// and [`impl_model_enum!`](crate::impl_model_enum).
pub trait ModelField: Sized + Send + 'static {
    fn field_type() -> FieldType;

    fn into_value(self) -> FieldValue;

    /// `FieldValue::Null` maps to the zero value for non-optional types.
    fn from_value(value: FieldValue) -> std::result::Result<Self, ValueMismatch>;
}

/// A fieldless Rust enum stored in documents by variant name.
pub trait ModelEnum: Copy + PartialEq + Default + Send + 'static {
    const ENUM_TYPE: EnumType;

    /// All variants, in the same order as `ENUM_TYPE.variants()`.
    fn values() -> &'static [Self];

    /// `None` when `values()` leaves this variant out.
    fn ordinal(self) -> Option<usize> {
        Self::values().iter().position(|value| *value == self)
    }

    fn from_ordinal(ordinal: usize) -> Option<Self> {
        Self::values().get(ordinal).copied()
    }
}

/// Converts identifier strings held by models to store-native ids and back.
///
/// Null handling is done by the caller; both methods only ever see present values.
pub trait IdCodec: Send + Sync {
    fn string_to_id(&self, value: &str) -> std::result::Result<ObjectId, String>;

    fn id_to_string(&self, id: &ObjectId) -> String;
}

/// Turns a finished adapter definition into an artifact.
pub trait AdapterEmitter {
    type Artifact;

    fn emit(&self, definition: &AdapterDefinition, target: &EmitTarget) -> Result<Self::Artifact>;
}
