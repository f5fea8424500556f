use crate::core::definition::AdapterDefinition;
use crate::domain::model::EmitTarget;
use crate::domain::ports::AdapterEmitter;
use crate::utils::error::Result;
use serde::Serialize;

/// Serializable description of one adapter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdapterManifest {
    pub adapter: String,
    pub model: String,
    pub namespace: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub superclass: Option<String>,
    pub fields: Vec<FieldManifest>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldManifest {
    pub field: String,
    pub key: String,
    pub classification: String,
    pub extractor: String,
    pub injector: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub overridden: bool,
}

impl AdapterManifest {
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ManifestEmitter;

impl AdapterEmitter for ManifestEmitter {
    type Artifact = AdapterManifest;

    fn emit(&self, definition: &AdapterDefinition, target: &EmitTarget) -> Result<AdapterManifest> {
        let fields = definition
            .rules()
            .iter()
            .map(|rule| FieldManifest {
                field: rule.field_name().to_string(),
                key: rule.doc_key().to_string(),
                classification: rule.classification().to_string(),
                extractor: rule.rule().extractor_name(),
                injector: rule.rule().injector_name(),
                overridden: rule.overrides_extractor() || rule.overrides_injector(),
            })
            .collect();

        Ok(AdapterManifest {
            adapter: definition.name().to_string(),
            model: definition.model_name().to_string(),
            namespace: target.namespace.clone(),
            superclass: definition.superclass().map(|s| format!("{}Adapter", s)),
            fields,
        })
    }
}
