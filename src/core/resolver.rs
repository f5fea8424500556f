use crate::core::classifier::Classification;
use crate::core::descriptor::{FieldDescriptor, ModelType};
use crate::core::overrides::{ExtractOverride, FieldOverride, InjectOverride};
use crate::core::registry::AdapterRegistry;
use crate::domain::model::{EnumType, FieldType, FieldValue, ModelTypeId};
use crate::utils::error::{AdapterError, Result};
use bson::Bson;
use std::any::Any;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Single,
    List,
}

/// The conversion applied to one value (or, for [`Arity::List`], to each element).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleKind {
    /// Identity towards the document, narrowing cast to the declared type back.
    Copy(FieldType),
    Identifier,
    Enumeration(EnumType),
    Nested(ModelTypeId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionRule {
    kind: RuleKind,
    arity: Arity,
}

impl ConversionRule {
    pub fn single(kind: RuleKind) -> Self {
        Self {
            kind,
            arity: Arity::Single,
        }
    }

    pub fn list(kind: RuleKind) -> Self {
        Self {
            kind,
            arity: Arity::List,
        }
    }

    pub fn kind(&self) -> &RuleKind {
        &self.kind
    }

    pub fn arity(&self) -> Arity {
        self.arity
    }

    pub fn extractor_name(&self) -> String {
        let name = match &self.kind {
            RuleKind::Copy(_) => "copy".to_string(),
            RuleKind::Identifier => "string2id".to_string(),
            RuleKind::Enumeration(_) => "enum2obj".to_string(),
            RuleKind::Nested(target) => format!("model2doc<{}>", target),
        };
        self.decorate(name)
    }

    pub fn injector_name(&self) -> String {
        let name = match &self.kind {
            RuleKind::Copy(declared) => format!("cast<{}>", declared),
            RuleKind::Identifier => "id2string".to_string(),
            RuleKind::Enumeration(enum_type) => format!("obj2enum<{}>", enum_type.name()),
            RuleKind::Nested(target) => format!("doc2model<{}>", target),
        };
        self.decorate(name)
    }

    fn decorate(&self, name: String) -> String {
        match self.arity {
            Arity::Single => name,
            Arity::List => format!("{name}[]"),
        }
    }

    /// Model value -> document value. `Bson::Null` means "do not write".
    pub fn to_doc(&self, registry: &AdapterRegistry, value: FieldValue) -> Result<Bson> {
        match self.arity {
            Arity::Single => self.item_to_doc(registry, value),
            Arity::List => match value {
                FieldValue::Null => Ok(Bson::Null),
                FieldValue::List(items) => items
                    .into_iter()
                    .map(|item| self.item_to_doc(registry, item))
                    .collect::<Result<Vec<_>>>()
                    .map(Bson::Array),
                other => Err(AdapterError::conversion("List", other.kind())),
            },
        }
    }

    /// Document value -> model value. Absent keys arrive as `Bson::Null`.
    pub fn from_doc(&self, registry: &AdapterRegistry, value: Bson) -> Result<FieldValue> {
        match self.arity {
            Arity::Single => self.item_from_doc(registry, value),
            Arity::List => match value {
                Bson::Null => Ok(FieldValue::Null),
                Bson::Array(items) => items
                    .into_iter()
                    .map(|item| self.item_from_doc(registry, item))
                    .collect::<Result<Vec<_>>>()
                    .map(FieldValue::List),
                other => Err(AdapterError::conversion("Array", bson_kind(&other))),
            },
        }
    }

    fn item_to_doc(&self, registry: &AdapterRegistry, value: FieldValue) -> Result<Bson> {
        if value.is_null() {
            return Ok(Bson::Null);
        }
        match (&self.kind, value) {
            (RuleKind::Copy(_), value) => scalar_to_bson(value),
            // zero value of a non-optional id: not assigned yet
            (RuleKind::Identifier, FieldValue::String(id)) if id.is_empty() => Ok(Bson::Null),
            (RuleKind::Identifier, FieldValue::String(id)) => registry
                .id_codec()
                .string_to_id(&id)
                .map(Bson::ObjectId)
                .map_err(|reason| AdapterError::InvalidIdentifier {
                    model: String::new(),
                    field: String::new(),
                    value: id,
                    reason,
                }),
            (RuleKind::Enumeration(enum_type), FieldValue::Enum(ordinal)) => enum_type
                .variant_at(ordinal)
                .map(|name| Bson::String(name.to_string()))
                .ok_or_else(|| AdapterError::UnknownEnumVariant {
                    model: String::new(),
                    field: String::new(),
                    enum_name: enum_type.name().to_string(),
                    variant: format!("#{ordinal}"),
                }),
            (RuleKind::Nested(target), FieldValue::Model(instance)) => {
                let adapter = registry.lookup(*target)?;
                let mut doc = bson::Document::new();
                adapter.write_fields(registry, &*instance, &mut doc)?;
                Ok(Bson::Document(doc))
            }
            (kind, other) => Err(AdapterError::conversion(expected_model_kind(kind), other.kind())),
        }
    }

    fn item_from_doc(&self, registry: &AdapterRegistry, value: Bson) -> Result<FieldValue> {
        if matches!(value, Bson::Null) {
            return Ok(FieldValue::Null);
        }
        match (&self.kind, value) {
            (RuleKind::Copy(declared), value) => cast_bson(declared, value),
            (RuleKind::Identifier, Bson::ObjectId(id)) => {
                Ok(FieldValue::String(registry.id_codec().id_to_string(&id)))
            }
            (RuleKind::Enumeration(enum_type), Bson::String(name)) => enum_type
                .ordinal_of(&name)
                .map(FieldValue::Enum)
                .ok_or_else(|| AdapterError::UnknownEnumVariant {
                    model: String::new(),
                    field: String::new(),
                    enum_name: enum_type.name().to_string(),
                    variant: name,
                }),
            (RuleKind::Nested(target), Bson::Document(doc)) => {
                let adapter = registry.lookup(*target)?;
                let mut instance = adapter.new_instance();
                adapter.read_fields(registry, &doc, &mut *instance)?;
                Ok(FieldValue::Model(instance))
            }
            (kind, other) => Err(AdapterError::conversion(expected_doc_kind(kind), bson_kind(&other))),
        }
    }
}

fn expected_model_kind(kind: &RuleKind) -> String {
    match kind {
        RuleKind::Copy(declared) => declared.to_string(),
        RuleKind::Identifier => "String".to_string(),
        RuleKind::Enumeration(enum_type) => format!("Enum<{}>", enum_type.name()),
        RuleKind::Nested(target) => format!("Model<{}>", target),
    }
}

fn expected_doc_kind(kind: &RuleKind) -> String {
    match kind {
        RuleKind::Copy(declared) => declared.to_string(),
        RuleKind::Identifier => "ObjectId".to_string(),
        RuleKind::Enumeration(enum_type) => format!("String (variant of {})", enum_type.name()),
        RuleKind::Nested(_) => "Document".to_string(),
    }
}

fn scalar_to_bson(value: FieldValue) -> Result<Bson> {
    match value {
        FieldValue::Null => Ok(Bson::Null),
        FieldValue::Bool(value) => Ok(Bson::Boolean(value)),
        FieldValue::Int32(value) => Ok(Bson::Int32(value)),
        FieldValue::Int64(value) => Ok(Bson::Int64(value)),
        FieldValue::Double(value) => Ok(Bson::Double(value)),
        FieldValue::String(value) => Ok(Bson::String(value)),
        FieldValue::List(items) => items
            .into_iter()
            .map(scalar_to_bson)
            .collect::<Result<Vec<_>>>()
            .map(Bson::Array),
        other => Err(AdapterError::conversion("scalar", other.kind())),
    }
}

/// Narrowing cast of a dynamically typed document value to a declared scalar type.
fn cast_bson(declared: &FieldType, value: Bson) -> Result<FieldValue> {
    match (declared, value) {
        (_, Bson::Null) => Ok(FieldValue::Null),
        (FieldType::Bool, Bson::Boolean(value)) => Ok(FieldValue::Bool(value)),
        (FieldType::Int32, Bson::Int32(value)) => Ok(FieldValue::Int32(value)),
        (FieldType::Int32, Bson::Int64(value)) => i32::try_from(value)
            .map(FieldValue::Int32)
            .map_err(|_| AdapterError::conversion("Int32", format!("Int64 {value} out of range"))),
        (FieldType::Int64, Bson::Int32(value)) => Ok(FieldValue::Int64(i64::from(value))),
        (FieldType::Int64, Bson::Int64(value)) => Ok(FieldValue::Int64(value)),
        (FieldType::Double, Bson::Double(value)) => Ok(FieldValue::Double(value)),
        (FieldType::Double, Bson::Int32(value)) => Ok(FieldValue::Double(f64::from(value))),
        (FieldType::String, Bson::String(value)) => Ok(FieldValue::String(value)),
        (FieldType::List(inner), Bson::Array(items)) => items
            .into_iter()
            .map(|item| cast_bson(inner, item))
            .collect::<Result<Vec<_>>>()
            .map(FieldValue::List),
        (declared, other) => Err(AdapterError::conversion(declared.to_string(), bson_kind(&other))),
    }
}

pub(crate) fn bson_kind(value: &Bson) -> &'static str {
    match value {
        Bson::Null => "Null",
        Bson::Boolean(_) => "Boolean",
        Bson::Int32(_) => "Int32",
        Bson::Int64(_) => "Int64",
        Bson::Double(_) => "Double",
        Bson::String(_) => "String",
        Bson::Array(_) => "Array",
        Bson::Document(_) => "Document",
        Bson::ObjectId(_) => "ObjectId",
        Bson::DateTime(_) => "DateTime",
        Bson::Binary(_) => "Binary",
        Bson::Decimal128(_) => "Decimal128",
        _ => "other BSON value",
    }
}

/// A fully resolved field: where it goes in the document and how it gets there and back.
#[derive(Clone)]
pub struct FieldConversionRule {
    field: FieldDescriptor,
    doc_key: String,
    classification: Classification,
    rule: ConversionRule,
    extract_override: Option<ExtractOverride>,
    inject_override: Option<InjectOverride>,
}

impl FieldConversionRule {
    pub fn field_name(&self) -> &str {
        self.field.name()
    }

    pub fn doc_key(&self) -> &str {
        &self.doc_key
    }

    pub fn classification(&self) -> &Classification {
        &self.classification
    }

    pub fn rule(&self) -> &ConversionRule {
        &self.rule
    }

    pub fn overrides_extractor(&self) -> bool {
        self.extract_override.is_some()
    }

    pub fn overrides_injector(&self) -> bool {
        self.inject_override.is_some()
    }

    pub fn extract(&self, registry: &AdapterRegistry, model: &dyn Any) -> Result<Bson> {
        let value = self.field.get(model)?;
        let default = |value: FieldValue| self.rule.to_doc(registry, value);
        match &self.extract_override {
            Some(custom) => custom(value, &default),
            None => default(value),
        }
    }

    pub fn inject(&self, registry: &AdapterRegistry, value: Bson, model: &mut dyn Any) -> Result<()> {
        let default = |value: Bson| self.rule.from_doc(registry, value);
        let value = match &self.inject_override {
            Some(custom) => custom(value, &default)?,
            None => default(value)?,
        };
        self.field.set(model, value)
    }
}

impl fmt::Debug for FieldConversionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldConversionRule")
            .field("field", &self.field.name())
            .field("doc_key", &self.doc_key)
            .field("classification", &self.classification)
            .field("rule", &self.rule)
            .field("extract_override", &self.extract_override.is_some())
            .field("inject_override", &self.inject_override.is_some())
            .finish()
    }
}

/// Picks the extraction and injection rule of each field.
pub struct FieldRuleResolver<'r> {
    registry: &'r AdapterRegistry,
}

impl<'r> FieldRuleResolver<'r> {
    pub fn new(registry: &'r AdapterRegistry) -> Self {
        Self { registry }
    }

    pub fn resolve(
        &self,
        model: &ModelType,
        field: &FieldDescriptor,
        doc_key: &str,
        classification: Classification,
        field_override: Option<&FieldOverride>,
    ) -> Result<FieldConversionRule> {
        let rule = self.resolve_rule(model, field, &classification)?;
        Ok(FieldConversionRule {
            field: field.clone(),
            doc_key: doc_key.to_string(),
            classification,
            rule,
            extract_override: field_override.and_then(|o| o.extractor().cloned()),
            inject_override: field_override.and_then(|o| o.injector().cloned()),
        })
    }

    fn resolve_rule(
        &self,
        model: &ModelType,
        field: &FieldDescriptor,
        classification: &Classification,
    ) -> Result<ConversionRule> {
        // Scalars at any list depth are one cast against the full declared type.
        if classification.element() == &Classification::Scalar {
            return Ok(ConversionRule::single(RuleKind::Copy(field.field_type().clone())));
        }
        match classification {
            Classification::ListOf(inner) => {
                Ok(ConversionRule::list(self.resolve_kind(model, field, inner)?))
            }
            other => Ok(ConversionRule::single(self.resolve_kind(model, field, other)?)),
        }
    }

    fn resolve_kind(
        &self,
        model: &ModelType,
        field: &FieldDescriptor,
        classification: &Classification,
    ) -> Result<RuleKind> {
        match classification {
            Classification::Scalar => Ok(RuleKind::Copy(field.field_type().element_type().clone())),
            Classification::Identifier => Ok(RuleKind::Identifier),
            Classification::Enumeration(enum_type) => Ok(RuleKind::Enumeration(*enum_type)),
            Classification::NestedModel(target) => {
                if !self.registry.contains(*target) {
                    return Err(AdapterError::UnresolvedReference {
                        model: model.name().to_string(),
                        field: field.name().to_string(),
                        target: target.to_string(),
                    });
                }
                Ok(RuleKind::Nested(*target))
            }
            Classification::ListOf(_) => Err(AdapterError::UnsupportedFieldType {
                model: model.name().to_string(),
                field: field.name().to_string(),
                declared: field.field_type().to_string(),
            }),
        }
    }
}
