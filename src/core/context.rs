use crate::config::toml_config::{AdapterConfig, AdapterSpec};
use crate::core::builder::{AdapterDefinitionBuilder, AdapterOptions};
use crate::core::catalog::ModelCatalog;
use crate::core::definition::{AdapterDefinition, FieldMapping};
use crate::core::descriptor::ModelType;
use crate::core::overrides::FieldOverride;
use crate::core::registry::AdapterRegistry;
use crate::domain::model::EmitTarget;
use crate::domain::ports::AdapterEmitter;
use crate::utils::error::{AdapterError, Result};
use crate::utils::validation::Validate;

/// A generation run: builds adapters in order into one registry.
#[derive(Debug)]
pub struct AdapterContext {
    registry: AdapterRegistry,
    target: EmitTarget,
}

impl AdapterContext {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self::with_registry(AdapterRegistry::new(), namespace)
    }

    pub fn with_registry(registry: AdapterRegistry, namespace: impl Into<String>) -> Self {
        Self {
            registry,
            target: EmitTarget::new(namespace),
        }
    }

    /// Validates `config` and builds all of its adapters in file order.
    pub fn from_config(config: &AdapterConfig, catalog: &ModelCatalog) -> Result<Self> {
        let mut context = Self::new(config.generator.namespace.clone());
        context.build_from_config(config, catalog)?;
        Ok(context)
    }

    /// Builds the adapter of `model`; `configure` adjusts the default options.
    ///
    /// ```ignore
    /// context.create_adapter(&person, &mapping, |options| {
    ///     options.identifier("friends").extends::<Base>()
    /// })?;
    /// ```
    pub fn create_adapter<F>(
        &mut self,
        model: &ModelType,
        mapping: &FieldMapping,
        configure: F,
    ) -> Result<&AdapterDefinition>
    where
        F: FnOnce(AdapterOptions) -> AdapterOptions,
    {
        let options = configure(AdapterOptions::default());
        self.build(model, mapping, &options)
    }

    /// Builds the adapter of `model`, then hands it to `emitter`.
    ///
    /// A failing emitter leaves the adapter registered.
    pub fn create_and_emit<F, E>(
        &mut self,
        model: &ModelType,
        mapping: &FieldMapping,
        configure: F,
        emitter: &E,
    ) -> Result<E::Artifact>
    where
        F: FnOnce(AdapterOptions) -> AdapterOptions,
        E: AdapterEmitter,
    {
        let target = self.target.clone();
        let definition = self.create_adapter(model, mapping, configure)?;
        emitter.emit(definition, &target).map_err(|e| {
            tracing::error!("❌ Emitting {} failed: {}", definition.name(), e);
            e
        })
    }

    pub fn build_from_config(&mut self, config: &AdapterConfig, catalog: &ModelCatalog) -> Result<usize> {
        config.validate()?;
        tracing::info!(
            "📂 Building {} adapters for generator '{}'",
            config.adapters.len(),
            config.generator.name
        );

        for spec in &config.adapters {
            let model = catalog.get(&spec.model)?;
            let mapping = FieldMapping::from(spec.fields.clone());
            let options = options_for(spec, catalog)?;
            self.build(model, &mapping, &options)?;
        }
        Ok(config.adapters.len())
    }

    /// Runs `emitter` over every registered adapter, in registration order.
    pub fn emit_all<E: AdapterEmitter>(&self, emitter: &E) -> Result<Vec<E::Artifact>> {
        self.registry
            .iter()
            .map(|definition| emitter.emit(definition, &self.target))
            .collect()
    }

    pub fn registry(&self) -> &AdapterRegistry {
        &self.registry
    }

    pub fn into_registry(self) -> AdapterRegistry {
        self.registry
    }

    pub fn target(&self) -> &EmitTarget {
        &self.target
    }

    fn build(
        &mut self,
        model: &ModelType,
        mapping: &FieldMapping,
        options: &AdapterOptions,
    ) -> Result<&AdapterDefinition> {
        AdapterDefinitionBuilder::new(&mut self.registry)
            .build(model, mapping, options)
            .map_err(|e| {
                let adapter = format!("{}Adapter", model.name());
                tracing::error!("❌ {} not built: {}", adapter, e);
                AdapterError::BuildFailed {
                    adapter,
                    source: Box::new(e),
                }
            })
    }
}

fn options_for(spec: &AdapterSpec, catalog: &ModelCatalog) -> Result<AdapterOptions> {
    let mut options = AdapterOptions::default();

    if let Some(parent) = &spec.extends {
        options.set_superclass(catalog.get(parent)?.id());
    }
    if let Some(identifiers) = &spec.identifier_fields {
        options = options.identifier_fields(identifiers.iter().cloned());
    }
    for (field, name) in spec.overrides.iter().flatten() {
        let field_override =
            FieldOverride::named(name).ok_or_else(|| AdapterError::InvalidConfigValueError {
                field: format!("overrides.{field}"),
                value: name.clone(),
                reason: "Unknown override".to_string(),
            })?;
        options = options.override_field(field.clone(), field_override);
    }
    Ok(options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::ModelTypeId;

    #[derive(Debug, Default)]
    struct Tag {
        label: String,
    }

    #[derive(Debug, Default)]
    struct Labeled {
        tag: Tag,
        note: String,
    }

    fn tag_type() -> ModelType {
        ModelType::builder::<Tag>()
            .field("label", |t: &Tag| t.label.clone(), |t, v| t.label = v)
            .build()
    }

    fn labeled_type() -> ModelType {
        ModelType::builder::<Labeled>()
            .field("note", |l: &Labeled| l.note.clone(), |l, v| l.note = v)
            .extends::<Tag>(|l| &l.tag, |l| &mut l.tag)
            .build()
    }

    struct NameEmitter;

    impl AdapterEmitter for NameEmitter {
        type Artifact = String;

        fn emit(&self, definition: &AdapterDefinition, target: &EmitTarget) -> Result<String> {
            Ok(format!("{}.{}", target.namespace, definition.name()))
        }
    }

    struct FailingEmitter;

    impl AdapterEmitter for FailingEmitter {
        type Artifact = ();

        fn emit(&self, _definition: &AdapterDefinition, _target: &EmitTarget) -> Result<()> {
            Err(AdapterError::ConfigError {
                message: "no output".to_string(),
            })
        }
    }

    #[test]
    fn test_create_adapter_with_configuration_closure() {
        let mut context = AdapterContext::new("sample");
        context
            .create_adapter(&tag_type(), &FieldMapping::new().map("label", "l"), |o| o)
            .unwrap();
        let definition = context
            .create_adapter(&labeled_type(), &FieldMapping::new().map("note", "n"), |o| {
                o.extends::<Tag>()
            })
            .unwrap();
        assert_eq!(definition.superclass(), Some(ModelTypeId::of::<Tag>()));

        let names = context.emit_all(&NameEmitter).unwrap();
        assert_eq!(names, vec!["sample.TagAdapter", "sample.LabeledAdapter"]);
    }

    #[test]
    fn test_failures_are_wrapped_with_adapter_name() {
        let mut context = AdapterContext::new("sample");
        let err = context
            .create_adapter(&labeled_type(), &FieldMapping::new().map("note", "n"), |o| {
                o.extends::<Tag>()
            })
            .unwrap_err();
        assert!(err.to_string().starts_with("Failed to build LabeledAdapter:"));
        assert!(matches!(err.root_cause(), AdapterError::UnresolvedSuperclass { .. }));
        assert!(context.registry().is_empty());
    }

    #[test]
    fn test_emission_failure_keeps_registration() {
        let mut context = AdapterContext::new("sample");
        let result = context.create_and_emit(
            &tag_type(),
            &FieldMapping::new().map("label", "l"),
            |o| o,
            &FailingEmitter,
        );
        assert!(result.is_err());
        assert_eq!(context.registry().len(), 1);

        let emitted = context
            .create_and_emit(
                &labeled_type(),
                &FieldMapping::new().map("note", "n"),
                |o| o.extends::<Tag>(),
                &NameEmitter,
            )
            .unwrap();
        assert_eq!(emitted, "sample.LabeledAdapter");
    }
}
