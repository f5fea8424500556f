use crate::core::classifier::TypeClassifier;
use crate::core::definition::{AdapterDefinition, FieldKeys, FieldMapping, SuperclassLink};
use crate::core::descriptor::ModelType;
use crate::core::overrides::FieldOverride;
use crate::core::registry::AdapterRegistry;
use crate::core::resolver::FieldRuleResolver;
use crate::domain::model::ModelTypeId;
use crate::utils::error::{AdapterError, Result};
use indexmap::{IndexMap, IndexSet};
use std::any::Any;
use std::sync::Arc;

/// Document key that is treated as an identifier unless configured otherwise.
pub const PRIMARY_IDENTIFIER: &str = "_id";

/// Per-adapter build options.
#[derive(Debug, Clone)]
pub struct AdapterOptions {
    pub superclass: Option<ModelTypeId>,
    /// Model field names or document keys whose values are identifiers.
    pub identifier_fields: IndexSet<String>,
    /// Model field name -> override.
    pub overrides: IndexMap<String, FieldOverride>,
}

impl Default for AdapterOptions {
    fn default() -> Self {
        Self {
            superclass: None,
            identifier_fields: IndexSet::from([PRIMARY_IDENTIFIER.to_string()]),
            overrides: IndexMap::new(),
        }
    }
}

impl AdapterOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extends<B: Any>(mut self) -> Self {
        self.superclass = Some(ModelTypeId::of::<B>());
        self
    }

    pub fn set_superclass(&mut self, superclass: ModelTypeId) -> &mut Self {
        self.superclass = Some(superclass);
        self
    }

    /// Replaces the identifier set (the default `_id` is dropped).
    pub fn identifier_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.identifier_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Adds one identifier on top of the current set.
    pub fn identifier(mut self, field: impl Into<String>) -> Self {
        self.identifier_fields.insert(field.into());
        self
    }

    pub fn override_field(mut self, field: impl Into<String>, field_override: FieldOverride) -> Self {
        self.overrides.insert(field.into(), field_override);
        self
    }
}

/// Resolves every mapped field of a model and registers the assembled adapter.
pub struct AdapterDefinitionBuilder<'r> {
    registry: &'r mut AdapterRegistry,
}

impl<'r> AdapterDefinitionBuilder<'r> {
    pub fn new(registry: &'r mut AdapterRegistry) -> Self {
        Self { registry }
    }

    /// Builds the adapter of `model`. The registry is left untouched on any error.
    pub fn build(
        self,
        model: &ModelType,
        mapping: &FieldMapping,
        options: &AdapterOptions,
    ) -> Result<&'r AdapterDefinition> {
        let definition = self.assemble(model, mapping, options)?;
        let registry = self.registry;
        let registered = registry.register(definition)?;
        tracing::info!(
            "🧩 Registered {} ({} own fields{})",
            registered.name(),
            registered.rules().len(),
            registered
                .superclass()
                .map(|s| format!(", extends {}", s))
                .unwrap_or_default()
        );
        Ok(registered)
    }

    fn assemble(
        &self,
        model: &ModelType,
        mapping: &FieldMapping,
        options: &AdapterOptions,
    ) -> Result<AdapterDefinition> {
        if self.registry.contains(model.id()) {
            return Err(AdapterError::DuplicateAdapter {
                model: model.name().to_string(),
            });
        }

        let superclass = self.resolve_superclass(model, options)?;
        let parent_keys = superclass
            .as_ref()
            .map(|(_, parent)| parent.shared_keys());

        let keys = own_keys(model, mapping, parent_keys.as_deref())?;

        for field in options.overrides.keys() {
            if mapping.get(field).is_none() {
                tracing::warn!(
                    "⚠️ Override for '{}' on {} ignored: field is not mapped",
                    field,
                    model.name()
                );
            }
        }

        let classifier = TypeClassifier::new(model, &options.identifier_fields);
        let resolver = FieldRuleResolver::new(&*self.registry);
        let mut rules = Vec::with_capacity(mapping.len());

        for (field_name, doc_key) in mapping.iter() {
            let field = model
                .field(field_name)
                .ok_or_else(|| AdapterError::UnknownField {
                    model: model.name().to_string(),
                    field: field_name.to_string(),
                })?;
            let classification = classifier.classify(field, doc_key)?;
            let rule = resolver.resolve(
                model,
                field,
                doc_key,
                classification,
                options.overrides.get(field_name),
            )?;
            tracing::debug!(
                "{}.{} -> '{}': {} [{} / {}]{}",
                model.name(),
                field_name,
                doc_key,
                rule.classification(),
                rule.rule().extractor_name(),
                rule.rule().injector_name(),
                if rule.overrides_extractor() || rule.overrides_injector() {
                    " (overridden)"
                } else {
                    ""
                }
            );
            rules.push(rule);
        }

        Ok(AdapterDefinition::new(
            model.id(),
            model.name(),
            Arc::new(FieldKeys::new(keys, parent_keys)),
            superclass.map(|(link, _)| link),
            rules,
            model.factory(),
        ))
    }

    fn resolve_superclass(
        &self,
        model: &ModelType,
        options: &AdapterOptions,
    ) -> Result<Option<(SuperclassLink, &AdapterDefinition)>> {
        let Some(superclass) = options.superclass else {
            return Ok(None);
        };
        let parent = self
            .registry
            .get(superclass)
            .ok_or_else(|| AdapterError::UnresolvedSuperclass {
                model: model.name().to_string(),
                superclass: superclass.to_string(),
            })?;
        let projection = model
            .base(superclass)
            .ok_or_else(|| AdapterError::MissingBaseProjection {
                model: model.name().to_string(),
                base: parent.model_name().to_string(),
            })?;
        Ok(Some((SuperclassLink::new(superclass, projection.clone()), parent)))
    }
}

/// Own key table. Keys must be unique among own fields; shadowing an inherited key is allowed.
fn own_keys(
    model: &ModelType,
    mapping: &FieldMapping,
    parent: Option<&FieldKeys>,
) -> Result<IndexMap<String, String>> {
    let inherited = parent.map(FieldKeys::all).unwrap_or_default();
    let mut used: IndexMap<&str, &str> = IndexMap::new();
    for (field, key) in mapping.iter() {
        if let Some(first) = used.insert(key, field) {
            return Err(AdapterError::AmbiguousDocumentKey {
                model: model.name().to_string(),
                key: key.to_string(),
                first: first.to_string(),
                second: field.to_string(),
            });
        }
        if let Some(previous) = inherited.get(field) {
            tracing::warn!(
                "⚠️ {}.{} shadows inherited key '{}' with '{}'",
                model.name(),
                field,
                previous,
                key
            );
        }
        if let Some(owner) = inherited_key_owner(&inherited, key).filter(|owner| *owner != field) {
            tracing::warn!(
                "⚠️ {}.{} reuses key '{}' inherited from field '{}'",
                model.name(),
                field,
                key,
                owner
            );
        }
    }
    Ok(mapping
        .iter()
        .map(|(field, key)| (field.to_string(), key.to_string()))
        .collect())
}

/// Inherited field stored under `key`, if any.
fn inherited_key_owner<'a>(inherited: &'a IndexMap<String, String>, key: &str) -> Option<&'a str> {
    inherited
        .iter()
        .find(|(_, inherited_key)| inherited_key.as_str() == key)
        .map(|(field, _)| field.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::classifier::Classification;

    #[derive(Debug, Default)]
    struct Tag {
        label: String,
        weight: i32,
    }

    #[derive(Debug, Default)]
    struct Labeled {
        tag: Tag,
        note: String,
    }

    fn tag_type() -> ModelType {
        ModelType::builder::<Tag>()
            .field("label", |t: &Tag| t.label.clone(), |t, v| t.label = v)
            .field("weight", |t: &Tag| t.weight, |t, v| t.weight = v)
            .build()
    }

    fn labeled_type() -> ModelType {
        ModelType::builder::<Labeled>()
            .field("note", |l: &Labeled| l.note.clone(), |l, v| l.note = v)
            .extends::<Tag>(|l| &l.tag, |l| &mut l.tag)
            .build()
    }

    #[test]
    fn test_default_options() {
        let options = AdapterOptions::default();
        assert!(options.superclass.is_none());
        assert!(options.identifier_fields.contains("_id"));
        assert!(options.overrides.is_empty());

        let options = AdapterOptions::new().identifier("friends");
        assert_eq!(options.identifier_fields.len(), 2);
        let options = AdapterOptions::new().identifier_fields(["ref"]);
        assert!(!options.identifier_fields.contains("_id"));
    }

    #[test]
    fn test_build_registers_rules_in_mapping_order() {
        let mut registry = AdapterRegistry::new();
        let mapping = FieldMapping::new().map("weight", "w").map("label", "l");
        let definition = AdapterDefinitionBuilder::new(&mut registry)
            .build(&tag_type(), &mapping, &AdapterOptions::default())
            .unwrap();

        assert_eq!(definition.name(), "TagAdapter");
        let keys: Vec<_> = definition.rules().iter().map(|r| r.doc_key()).collect();
        assert_eq!(keys, vec!["w", "l"]);
        assert!(definition
            .rules()
            .iter()
            .all(|r| r.classification() == &Classification::Scalar));
    }

    #[test]
    fn test_duplicate_key_is_rejected_without_registering() {
        let mut registry = AdapterRegistry::new();
        let mapping = FieldMapping::new().map("label", "x").map("weight", "x");
        let err = AdapterDefinitionBuilder::new(&mut registry)
            .build(&tag_type(), &mapping, &AdapterOptions::default())
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Ambiguous document key 'x' in Tag: used by both 'label' and 'weight'"
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn test_unknown_field() {
        let mut registry = AdapterRegistry::new();
        let mapping = FieldMapping::new().map("colour", "c");
        let err = AdapterDefinitionBuilder::new(&mut registry)
            .build(&tag_type(), &mapping, &AdapterOptions::default())
            .unwrap_err();
        assert!(matches!(err, AdapterError::UnknownField { ref field, .. } if field == "colour"));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_superclass_must_be_registered_first() {
        let mut registry = AdapterRegistry::new();
        let options = AdapterOptions::new().extends::<Tag>();
        let err = AdapterDefinitionBuilder::new(&mut registry)
            .build(&labeled_type(), &FieldMapping::new().map("note", "n"), &options)
            .unwrap_err();
        assert!(matches!(err, AdapterError::UnresolvedSuperclass { .. }));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_superclass_needs_base_projection() {
        let mut registry = AdapterRegistry::new();
        AdapterDefinitionBuilder::new(&mut registry)
            .build(&tag_type(), &FieldMapping::new().map("label", "l"), &AdapterOptions::default())
            .unwrap();

        #[derive(Debug, Default)]
        struct Loose {
            note: String,
        }
        let loose = ModelType::builder::<Loose>()
            .field("note", |l: &Loose| l.note.clone(), |l, v| l.note = v)
            .build();
        let err = AdapterDefinitionBuilder::new(&mut registry)
            .build(
                &loose,
                &FieldMapping::new().map("note", "n"),
                &AdapterOptions::new().extends::<Tag>(),
            )
            .unwrap_err();
        assert_eq!(err.to_string(), "Model Loose declares no base projection to Tag");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_key_table_chains_to_superclass_and_allows_shadowing() {
        let mut registry = AdapterRegistry::new();
        AdapterDefinitionBuilder::new(&mut registry)
            .build(
                &tag_type(),
                &FieldMapping::new().map("label", "l").map("weight", "w"),
                &AdapterOptions::default(),
            )
            .unwrap();

        // "note" reuses the inherited key "w".
        let definition = AdapterDefinitionBuilder::new(&mut registry)
            .build(
                &labeled_type(),
                &FieldMapping::new().map("note", "w"),
                &AdapterOptions::new().extends::<Tag>(),
            )
            .unwrap();
        assert_eq!(definition.keys().get("note"), Some("w"));
        assert_eq!(definition.keys().get("label"), Some("l"));
        assert_eq!(definition.superclass(), Some(ModelTypeId::of::<Tag>()));

        let inherited = registry.lookup(ModelTypeId::of::<Tag>()).unwrap().keys().all();
        assert_eq!(inherited_key_owner(&inherited, "w"), Some("weight"));
        assert_eq!(inherited_key_owner(&inherited, "n"), None);
    }

    #[test]
    fn test_duplicate_registration() {
        let mut registry = AdapterRegistry::new();
        let mapping = FieldMapping::new().map("label", "l");
        AdapterDefinitionBuilder::new(&mut registry)
            .build(&tag_type(), &mapping, &AdapterOptions::default())
            .unwrap();
        let err = AdapterDefinitionBuilder::new(&mut registry)
            .build(&tag_type(), &mapping, &AdapterOptions::default())
            .unwrap_err();
        assert_eq!(err.to_string(), "Adapter already registered for Tag");
        assert_eq!(registry.len(), 1);
    }
}
