use crate::core::descriptor::ModelType;
use crate::utils::error::{AdapterError, Result};
use indexmap::IndexMap;

/// Model descriptors by name, so configuration files can refer to them.
#[derive(Debug, Clone, Default)]
pub struct ModelCatalog {
    models: IndexMap<String, ModelType>,
}

impl ModelCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `model` under its descriptor name.
    pub fn with(mut self, model: ModelType) -> Self {
        self.register(model);
        self
    }

    /// Registering a second descriptor under the same name replaces the first.
    pub fn register(&mut self, model: ModelType) {
        let name = model.name().to_string();
        if self.models.insert(name.clone(), model).is_some() {
            tracing::warn!("⚠️ Model catalog entry '{}' replaced", name);
        }
    }

    pub fn get(&self, name: &str) -> Result<&ModelType> {
        self.models.get(name).ok_or_else(|| AdapterError::UnknownModel {
            name: name.to_string(),
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.models.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.models.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}
