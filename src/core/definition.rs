//! Assembled adapters: the field-key table and the per-model conversion routines.

use crate::core::descriptor::{BaseProjection, ModelFactory};
use crate::core::registry::AdapterRegistry;
use crate::core::resolver::FieldConversionRule;
use crate::domain::model::{ModelInstance, ModelTypeId};
use crate::utils::error::{AdapterError, Result};
use bson::{Bson, Document};
use indexmap::IndexMap;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Model field name -> document key, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMapping {
    entries: IndexMap<String, String>,
}

impl FieldMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Maps `field` to `key`. Mapping the same field again replaces its key.
    pub fn map(mut self, field: impl Into<String>, key: impl Into<String>) -> Self {
        self.entries.insert(field.into(), key.into());
        self
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.entries.get(field).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(f, k)| (f.as_str(), k.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<F: Into<String>, K: Into<String>> FromIterator<(F, K)> for FieldMapping {
    fn from_iter<I: IntoIterator<Item = (F, K)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(field, key)| (field.into(), key.into()))
                .collect(),
        }
    }
}

impl From<IndexMap<String, String>> for FieldMapping {
    fn from(entries: IndexMap<String, String>) -> Self {
        Self { entries }
    }
}

/// The document keys of one adapter. Lookups fall through to the superclass table.
#[derive(Debug, Clone, Default)]
pub struct FieldKeys {
    own: IndexMap<String, String>,
    parent: Option<Arc<FieldKeys>>,
}

impl FieldKeys {
    pub fn new(own: IndexMap<String, String>, parent: Option<Arc<FieldKeys>>) -> Self {
        Self { own, parent }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        match self.own.get(field) {
            Some(key) => Some(key.as_str()),
            None => self.parent.as_ref().and_then(|parent| parent.get(field)),
        }
    }

    pub fn own(&self) -> impl Iterator<Item = (&str, &str)> {
        self.own.iter().map(|(f, k)| (f.as_str(), k.as_str()))
    }

    pub fn parent(&self) -> Option<&FieldKeys> {
        self.parent.as_deref()
    }

    /// Inherited and own keys, superclass first. A shadowed key appears once, at the
    /// position of the inherited entry.
    pub fn all(&self) -> IndexMap<String, String> {
        let mut keys = self
            .parent
            .as_ref()
            .map(|parent| parent.all())
            .unwrap_or_default();
        for (field, key) in &self.own {
            keys.insert(field.clone(), key.clone());
        }
        keys
    }
}

#[derive(Clone)]
pub struct SuperclassLink {
    model: ModelTypeId,
    projection: BaseProjection,
}

impl SuperclassLink {
    pub fn new(model: ModelTypeId, projection: BaseProjection) -> Self {
        Self { model, projection }
    }

    pub fn model(&self) -> ModelTypeId {
        self.model
    }
}

/// A finished, immutable adapter for one model type.
#[derive(Clone)]
pub struct AdapterDefinition {
    model: ModelTypeId,
    model_name: String,
    name: String,
    keys: Arc<FieldKeys>,
    superclass: Option<SuperclassLink>,
    rules: Vec<FieldConversionRule>,
    factory: ModelFactory,
}

impl AdapterDefinition {
    pub(crate) fn new(
        model: ModelTypeId,
        model_name: &str,
        keys: Arc<FieldKeys>,
        superclass: Option<SuperclassLink>,
        rules: Vec<FieldConversionRule>,
        factory: ModelFactory,
    ) -> Self {
        Self {
            model,
            model_name: model_name.to_string(),
            name: format!("{model_name}Adapter"),
            keys,
            superclass,
            rules,
            factory,
        }
    }

    pub fn model(&self) -> ModelTypeId {
        self.model
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// `<Model>Adapter`.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn keys(&self) -> &FieldKeys {
        &self.keys
    }

    pub(crate) fn shared_keys(&self) -> Arc<FieldKeys> {
        Arc::clone(&self.keys)
    }

    pub fn superclass(&self) -> Option<ModelTypeId> {
        self.superclass.as_ref().map(SuperclassLink::model)
    }

    /// Own-field rules in mapping order. Inherited fields are handled by the superclass adapter.
    pub fn rules(&self) -> &[FieldConversionRule] {
        &self.rules
    }

    pub fn new_instance(&self) -> ModelInstance {
        (self.factory)()
    }

    pub fn model_to_doc(&self, registry: &AdapterRegistry, model: Option<&dyn Any>) -> Result<Option<Document>> {
        let Some(model) = model else {
            return Ok(None);
        };
        self.check_instance(model)?;
        let mut doc = Document::new();
        self.write_fields(registry, model, &mut doc)?;
        Ok(Some(doc))
    }

    pub fn doc_to_model(
        &self,
        registry: &AdapterRegistry,
        doc: Option<&Document>,
    ) -> Result<Option<ModelInstance>> {
        let Some(doc) = doc else {
            return Ok(None);
        };
        let mut instance = self.new_instance();
        self.read_fields(registry, doc, &mut *instance)?;
        Ok(Some(instance))
    }

    /// Appends the superclass fields, then the own fields, skipping null values.
    pub fn write_fields(&self, registry: &AdapterRegistry, model: &dyn Any, doc: &mut Document) -> Result<()> {
        if let Some(link) = &self.superclass {
            let base = link
                .projection
                .project(model)
                .ok_or_else(|| self.instance_mismatch())?;
            registry.lookup(link.model)?.write_fields(registry, base, doc)?;
        }

        for rule in &self.rules {
            let value = rule
                .extract(registry, model)
                .map_err(|e| e.in_field(&self.model_name, rule.field_name()))?;
            if !matches!(value, Bson::Null) {
                doc.insert(rule.doc_key(), value);
            }
        }
        Ok(())
    }

    /// Injects the superclass fields, then the own fields. Absent keys inject `Null`.
    pub fn read_fields(&self, registry: &AdapterRegistry, doc: &Document, model: &mut dyn Any) -> Result<()> {
        if let Some(link) = &self.superclass {
            let base = link
                .projection
                .project_mut(model)
                .ok_or_else(|| self.instance_mismatch())?;
            registry.lookup(link.model)?.read_fields(registry, doc, base)?;
        }

        for rule in &self.rules {
            let value = doc.get(rule.doc_key()).cloned().unwrap_or(Bson::Null);
            rule.inject(registry, value, model)
                .map_err(|e| e.in_field(&self.model_name, rule.field_name()))?;
        }
        Ok(())
    }

    fn check_instance(&self, model: &dyn Any) -> Result<()> {
        if Any::type_id(model) == self.model.type_id() {
            Ok(())
        } else {
            Err(self.instance_mismatch())
        }
    }

    fn instance_mismatch(&self) -> AdapterError {
        AdapterError::ModelTypeMismatch {
            expected: self.model_name.clone(),
        }
    }
}

impl fmt::Debug for AdapterDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdapterDefinition")
            .field("name", &self.name)
            .field("superclass", &self.superclass())
            .field("keys", &self.keys)
            .field("rules", &self.rules)
            .finish_non_exhaustive()
    }
}
