use crate::adapters::object_id::HexObjectIdCodec;
use crate::core::adapter::Adapter;
use crate::core::definition::AdapterDefinition;
use crate::domain::model::ModelTypeId;
use crate::domain::ports::IdCodec;
use crate::utils::error::{AdapterError, Result};
use indexmap::IndexMap;
use indexmap::map::Entry;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Model type -> finished adapter definition.
///
/// Definitions are only ever added, never replaced. Once building is over the
/// registry is read-only and can be shared between threads.
pub struct AdapterRegistry {
    adapters: IndexMap<ModelTypeId, AdapterDefinition>,
    id_codec: Arc<dyn IdCodec>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self::with_id_codec(Arc::new(HexObjectIdCodec))
    }

    pub fn with_id_codec(id_codec: Arc<dyn IdCodec>) -> Self {
        Self {
            adapters: IndexMap::new(),
            id_codec,
        }
    }

    pub fn id_codec(&self) -> &dyn IdCodec {
        self.id_codec.as_ref()
    }

    pub fn register(&mut self, definition: AdapterDefinition) -> Result<&AdapterDefinition> {
        match self.adapters.entry(definition.model()) {
            Entry::Occupied(_) => Err(AdapterError::DuplicateAdapter {
                model: definition.model_name().to_string(),
            }),
            Entry::Vacant(slot) => Ok(slot.insert(definition)),
        }
    }

    pub fn lookup(&self, model: ModelTypeId) -> Result<&AdapterDefinition> {
        self.adapters
            .get(&model)
            .ok_or_else(|| AdapterError::AdapterNotFound {
                model: model.to_string(),
            })
    }

    pub fn get(&self, model: ModelTypeId) -> Option<&AdapterDefinition> {
        self.adapters.get(&model)
    }

    pub fn contains(&self, model: ModelTypeId) -> bool {
        self.adapters.contains_key(&model)
    }

    /// Typed handle to the adapter of `M`.
    pub fn adapter<M: Any + Send>(&self) -> Result<Adapter<'_, M>> {
        let definition = self.lookup(ModelTypeId::of::<M>())?;
        Ok(Adapter::new(self, definition))
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }

    /// Definitions in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &AdapterDefinition> {
        self.adapters.values()
    }
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdapterRegistry")
            .field("adapters", &self.adapters.values().map(|d| d.name()).collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}
