use crate::core::descriptor::{FieldDescriptor, ModelType};
use crate::domain::model::{EnumType, FieldType, ModelTypeId};
use crate::utils::error::{AdapterError, Result};
use indexmap::IndexSet;
use std::fmt;

/// Resolved shape of a field's declared type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Scalar,
    Identifier,
    Enumeration(EnumType),
    NestedModel(ModelTypeId),
    ListOf(Box<Classification>),
}

impl Classification {
    pub fn is_list(&self) -> bool {
        matches!(self, Classification::ListOf(_))
    }

    /// The classification with every `ListOf` layer removed.
    pub fn element(&self) -> &Classification {
        match self {
            Classification::ListOf(inner) => inner.element(),
            other => other,
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Classification::Scalar => f.write_str("Scalar"),
            Classification::Identifier => f.write_str("Identifier"),
            Classification::Enumeration(enum_type) => write!(f, "Enumeration({})", enum_type.name()),
            Classification::NestedModel(model) => write!(f, "NestedModel({})", model),
            Classification::ListOf(inner) => write!(f, "ListOf({})", inner),
        }
    }
}

/// Classifies fields of one model, given the adapter's identifier fields.
///
/// A field is an identifier when either its model field name or its document
/// key appears in `identifier_fields`.
pub struct TypeClassifier<'a> {
    model: &'a ModelType,
    identifier_fields: &'a IndexSet<String>,
}

impl<'a> TypeClassifier<'a> {
    pub fn new(model: &'a ModelType, identifier_fields: &'a IndexSet<String>) -> Self {
        Self {
            model,
            identifier_fields,
        }
    }

    pub fn classify(&self, field: &FieldDescriptor, doc_key: &str) -> Result<Classification> {
        let identifier = self.identifier_fields.contains(field.name())
            || self.identifier_fields.contains(doc_key);
        self.classify_type(field, field.field_type(), identifier)
    }

    fn classify_type(
        &self,
        field: &FieldDescriptor,
        declared: &FieldType,
        identifier: bool,
    ) -> Result<Classification> {
        if let FieldType::List(inner) = declared {
            let inner = self.classify_type(field, inner, identifier)?;
            return Ok(Classification::ListOf(Box::new(inner)));
        }

        // Identifiers are plain strings on the model side, so this check has to
        // run before the enum and nested-model checks.
        if identifier {
            return match declared {
                FieldType::String => Ok(Classification::Identifier),
                _ => Err(AdapterError::IdentifierNotString {
                    model: self.model.name().to_string(),
                    field: field.name().to_string(),
                    actual: field.field_type().to_string(),
                }),
            };
        }

        Ok(match declared {
            FieldType::Enum(enum_type) => Classification::Enumeration(*enum_type),
            FieldType::Model(target) => Classification::NestedModel(*target),
            _ => Classification::Scalar,
        })
    }
}
