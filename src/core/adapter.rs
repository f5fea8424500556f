//! Runnable adapters: a definition bound to the registry it resolves nested types in.

use crate::core::definition::{AdapterDefinition, FieldKeys};
use crate::core::registry::AdapterRegistry;
use crate::domain::model::{EmitTarget, ModelInstance, ModelTypeId};
use crate::domain::ports::AdapterEmitter;
use crate::utils::error::{AdapterError, Result};
use bson::Document;
use std::any::Any;
use std::borrow::Cow;
use std::marker::PhantomData;

/// Untyped adapter working on `dyn Any` model instances.
#[derive(Clone)]
pub struct DynAdapter<'r> {
    registry: &'r AdapterRegistry,
    definition: Cow<'r, AdapterDefinition>,
}

impl<'r> DynAdapter<'r> {
    pub fn new(registry: &'r AdapterRegistry, definition: &'r AdapterDefinition) -> Self {
        Self {
            registry,
            definition: Cow::Borrowed(definition),
        }
    }

    pub fn name(&self) -> &str {
        self.definition.name()
    }

    pub fn model(&self) -> ModelTypeId {
        self.definition.model()
    }

    pub fn definition(&self) -> &AdapterDefinition {
        &self.definition
    }

    pub fn model_to_doc(&self, model: Option<&dyn Any>) -> Result<Option<Document>> {
        self.definition.model_to_doc(self.registry, model)
    }

    pub fn doc_to_model(&self, doc: Option<&Document>) -> Result<Option<ModelInstance>> {
        self.definition.doc_to_model(self.registry, doc)
    }

    /// Typed view, if this adapter was built for `M`.
    pub fn typed<M: Any + Send>(self) -> Result<Adapter<'r, M>> {
        if self.model() != ModelTypeId::of::<M>() {
            return Err(AdapterError::ModelTypeMismatch {
                expected: self.definition.model_name().to_string(),
            });
        }
        Ok(Adapter {
            inner: self,
            _model: PhantomData,
        })
    }
}

/// Typed adapter for model type `M`, obtained from [`AdapterRegistry::adapter`].
pub struct Adapter<'r, M> {
    inner: DynAdapter<'r>,
    _model: PhantomData<fn() -> M>,
}

impl<'r, M: Any + Send> Adapter<'r, M> {
    pub(crate) fn new(registry: &'r AdapterRegistry, definition: &'r AdapterDefinition) -> Self {
        Self {
            inner: DynAdapter::new(registry, definition),
            _model: PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    pub fn keys(&self) -> &FieldKeys {
        self.inner.definition().keys()
    }

    pub fn definition(&self) -> &AdapterDefinition {
        self.inner.definition()
    }

    pub fn model_to_doc(&self, model: Option<&M>) -> Result<Option<Document>> {
        self.inner.model_to_doc(model.map(|model| model as &dyn Any))
    }

    pub fn doc_to_model(&self, doc: Option<&Document>) -> Result<Option<M>> {
        match self.inner.doc_to_model(doc)? {
            None => Ok(None),
            Some(instance) => instance
                .downcast::<M>()
                .map(|model| Some(*model))
                .map_err(|_| AdapterError::ModelTypeMismatch {
                    expected: self.inner.definition().model_name().to_string(),
                }),
        }
    }

    pub fn models_to_docs(&self, models: Option<&[M]>) -> Result<Option<Vec<Document>>> {
        let Some(models) = models else {
            return Ok(None);
        };
        let mut docs = Vec::with_capacity(models.len());
        for model in models {
            if let Some(doc) = self.model_to_doc(Some(model))? {
                docs.push(doc);
            }
        }
        Ok(Some(docs))
    }

    pub fn docs_to_models(&self, docs: Option<&[Document]>) -> Result<Option<Vec<M>>> {
        let Some(docs) = docs else {
            return Ok(None);
        };
        let mut models = Vec::with_capacity(docs.len());
        for doc in docs {
            if let Some(model) = self.doc_to_model(Some(doc))? {
                models.push(model);
            }
        }
        Ok(Some(models))
    }
}

/// Emits runnable [`DynAdapter`]s bound to a registry.
pub struct RuntimeEmitter<'r> {
    registry: &'r AdapterRegistry,
}

impl<'r> RuntimeEmitter<'r> {
    pub fn new(registry: &'r AdapterRegistry) -> Self {
        Self { registry }
    }
}

impl<'r> AdapterEmitter for RuntimeEmitter<'r> {
    type Artifact = DynAdapter<'r>;

    fn emit(&self, definition: &AdapterDefinition, _target: &EmitTarget) -> Result<Self::Artifact> {
        // Nested types resolve through the registry, so the model must be registered there.
        self.registry.lookup(definition.model())?;
        Ok(DynAdapter {
            registry: self.registry,
            definition: Cow::Owned(definition.clone()),
        })
    }
}
