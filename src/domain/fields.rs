use crate::domain::model::{FieldType, FieldValue, ModelTypeId, ValueMismatch};
use crate::domain::ports::{ModelEnum, ModelField};
use std::any::Any;

impl ModelField for bool {
    fn field_type() -> FieldType {
        FieldType::Bool
    }

    fn into_value(self) -> FieldValue {
        FieldValue::Bool(self)
    }

    fn from_value(value: FieldValue) -> Result<Self, ValueMismatch> {
        match value {
            FieldValue::Null => Ok(false),
            FieldValue::Bool(value) => Ok(value),
            other => Err(ValueMismatch::new("Bool", other.kind())),
        }
    }
}

impl ModelField for i32 {
    fn field_type() -> FieldType {
        FieldType::Int32
    }

    fn into_value(self) -> FieldValue {
        FieldValue::Int32(self)
    }

    fn from_value(value: FieldValue) -> Result<Self, ValueMismatch> {
        match value {
            FieldValue::Null => Ok(0),
            FieldValue::Int32(value) => Ok(value),
            FieldValue::Int64(value) => {
                i32::try_from(value).map_err(|_| ValueMismatch::new("Int32", "Int64 out of range"))
            }
            other => Err(ValueMismatch::new("Int32", other.kind())),
        }
    }
}

impl ModelField for i64 {
    fn field_type() -> FieldType {
        FieldType::Int64
    }

    fn into_value(self) -> FieldValue {
        FieldValue::Int64(self)
    }

    fn from_value(value: FieldValue) -> Result<Self, ValueMismatch> {
        match value {
            FieldValue::Null => Ok(0),
            FieldValue::Int32(value) => Ok(i64::from(value)),
            FieldValue::Int64(value) => Ok(value),
            other => Err(ValueMismatch::new("Int64", other.kind())),
        }
    }
}

impl ModelField for f64 {
    fn field_type() -> FieldType {
        FieldType::Double
    }

    fn into_value(self) -> FieldValue {
        FieldValue::Double(self)
    }

    fn from_value(value: FieldValue) -> Result<Self, ValueMismatch> {
        match value {
            FieldValue::Null => Ok(0.0),
            FieldValue::Double(value) => Ok(value),
            FieldValue::Int32(value) => Ok(f64::from(value)),
            other => Err(ValueMismatch::new("Double", other.kind())),
        }
    }
}

impl ModelField for String {
    fn field_type() -> FieldType {
        FieldType::String
    }

    fn into_value(self) -> FieldValue {
        FieldValue::String(self)
    }

    fn from_value(value: FieldValue) -> Result<Self, ValueMismatch> {
        match value {
            FieldValue::Null => Ok(String::new()),
            FieldValue::String(value) => Ok(value),
            other => Err(ValueMismatch::new("String", other.kind())),
        }
    }
}

impl<T: ModelField> ModelField for Option<T> {
    fn field_type() -> FieldType {
        T::field_type()
    }

    fn into_value(self) -> FieldValue {
        match self {
            Some(value) => value.into_value(),
            None => FieldValue::Null,
        }
    }

    fn from_value(value: FieldValue) -> Result<Self, ValueMismatch> {
        match value {
            FieldValue::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: ModelField> ModelField for Vec<T> {
    fn field_type() -> FieldType {
        FieldType::list_of(T::field_type())
    }

    fn into_value(self) -> FieldValue {
        FieldValue::List(self.into_iter().map(ModelField::into_value).collect())
    }

    fn from_value(value: FieldValue) -> Result<Self, ValueMismatch> {
        match value {
            FieldValue::Null => Ok(Vec::new()),
            FieldValue::List(items) => items.into_iter().map(T::from_value).collect(),
            other => Err(ValueMismatch::new(
                format!("List<{}>", T::field_type()),
                other.kind(),
            )),
        }
    }
}

/// Backs the [`ModelField`] impl generated by [`impl_model_enum!`](crate::impl_model_enum).
///
/// A variant missing from `values()` gets an out-of-range ordinal, which the
/// conversion rule rejects as an unknown variant.
pub fn enum_into_value<E: ModelEnum>(value: E) -> FieldValue {
    FieldValue::Enum(value.ordinal().unwrap_or(E::ENUM_TYPE.variants().len()))
}

pub fn enum_from_value<E: ModelEnum>(value: FieldValue) -> Result<E, ValueMismatch> {
    match value {
        FieldValue::Null => Ok(E::default()),
        FieldValue::Enum(ordinal) => E::from_ordinal(ordinal).ok_or_else(|| {
            ValueMismatch::new(
                format!("Enum<{}>", E::ENUM_TYPE.name()),
                format!("ordinal {ordinal}"),
            )
        }),
        other => Err(ValueMismatch::new(
            format!("Enum<{}>", E::ENUM_TYPE.name()),
            other.kind(),
        )),
    }
}

/// Backs the [`ModelField`] impl generated by [`impl_model_field!`](crate::impl_model_field).
pub fn model_into_value<M: Any + Send>(value: M) -> FieldValue {
    FieldValue::Model(Box::new(value))
}

pub fn model_from_value<M: Any + Send + Default>(value: FieldValue) -> Result<M, ValueMismatch> {
    let expected = || format!("Model<{}>", ModelTypeId::of::<M>());
    match value {
        FieldValue::Null => Ok(M::default()),
        FieldValue::Model(instance) => instance
            .downcast::<M>()
            .map(|model| *model)
            .map_err(|_| ValueMismatch::new(expected(), "Model of another type")),
        other => Err(ValueMismatch::new(expected(), other.kind())),
    }
}

/// Lets a model struct be used as the type of a nested-model field.
///
/// ```ignore
/// #[derive(Debug, Clone, Default)]
/// struct Address { street: String }
/// doc_adapter::impl_model_field!(Address);
/// ```
#[macro_export]
macro_rules! impl_model_field {
    ($($model:ty),+ $(,)?) => {
        $(
            impl $crate::domain::ports::ModelField for $model {
                fn field_type() -> $crate::domain::model::FieldType {
                    $crate::domain::model::FieldType::Model(
                        $crate::domain::model::ModelTypeId::of::<$model>(),
                    )
                }

                fn into_value(self) -> $crate::domain::model::FieldValue {
                    $crate::domain::fields::model_into_value(self)
                }

                fn from_value(
                    value: $crate::domain::model::FieldValue,
                ) -> ::std::result::Result<Self, $crate::domain::model::ValueMismatch> {
                    $crate::domain::fields::model_from_value(value)
                }
            }
        )+
    };
}

/// Implements [`ModelEnum`] and [`ModelField`] for a fieldless enum.
///
/// ```ignore
/// #[derive(Debug, Clone, Copy, PartialEq, Default)]
/// enum Gender { #[default] Male, Female }
/// doc_adapter::impl_model_enum!(Gender { Male => "MALE", Female => "FEMALE" });
/// ```
#[macro_export]
macro_rules! impl_model_enum {
    ($enum:ident { $($variant:ident => $name:literal),+ $(,)? }) => {
        impl $crate::domain::ports::ModelEnum for $enum {
            const ENUM_TYPE: $crate::domain::model::EnumType =
                $crate::domain::model::EnumType::new(stringify!($enum), &[$($name),+]);

            fn values() -> &'static [Self] {
                &[$($enum::$variant),+]
            }
        }

        impl $crate::domain::ports::ModelField for $enum {
            fn field_type() -> $crate::domain::model::FieldType {
                $crate::domain::model::FieldType::Enum(
                    <$enum as $crate::domain::ports::ModelEnum>::ENUM_TYPE,
                )
            }

            fn into_value(self) -> $crate::domain::model::FieldValue {
                $crate::domain::fields::enum_into_value(self)
            }

            fn from_value(
                value: $crate::domain::model::FieldValue,
            ) -> ::std::result::Result<Self, $crate::domain::model::ValueMismatch> {
                $crate::domain::fields::enum_from_value(value)
            }
        }
    };
}
