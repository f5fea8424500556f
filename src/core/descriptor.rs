//! Model type descriptors: the explicit, statically supplied schema of a model
//! type (fields, declared types, accessors, factory and base projections).

use crate::domain::model::{FieldType, FieldValue, ModelInstance, ModelTypeId};
use crate::domain::ports::ModelField;
use crate::utils::error::{AdapterError, Result};
use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

pub type FieldGetter = Arc<dyn Fn(&dyn Any) -> Result<FieldValue> + Send + Sync>;
pub type FieldSetter = Arc<dyn Fn(&mut dyn Any, FieldValue) -> Result<()> + Send + Sync>;
pub type ModelFactory = Arc<dyn Fn() -> ModelInstance + Send + Sync>;
pub type Upcast = Arc<dyn for<'a> Fn(&'a dyn Any) -> Option<&'a dyn Any> + Send + Sync>;
pub type UpcastMut = Arc<dyn for<'a> Fn(&'a mut dyn Any) -> Option<&'a mut dyn Any> + Send + Sync>;

/// One field of a model type: name, declared type and get/set capability.
#[derive(Clone)]
pub struct FieldDescriptor {
    name: String,
    field_type: FieldType,
    getter: FieldGetter,
    setter: FieldSetter,
}

impl FieldDescriptor {
    /// Untyped constructor for callers that manage their own model representation.
    pub fn new(
        name: impl Into<String>,
        field_type: FieldType,
        getter: FieldGetter,
        setter: FieldSetter,
    ) -> Self {
        Self {
            name: name.into(),
            field_type,
            getter,
            setter,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field_type(&self) -> &FieldType {
        &self.field_type
    }

    pub fn get(&self, model: &dyn Any) -> Result<FieldValue> {
        (self.getter)(model)
    }

    pub fn set(&self, model: &mut dyn Any, value: FieldValue) -> Result<()> {
        (self.setter)(model, value)
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("field_type", &self.field_type)
            .finish_non_exhaustive()
    }
}

/// How to reach the embedded base part of a derived model.
#[derive(Clone)]
pub struct BaseProjection {
    base: ModelTypeId,
    upcast: Upcast,
    upcast_mut: UpcastMut,
}

impl BaseProjection {
    pub fn base(&self) -> ModelTypeId {
        self.base
    }

    pub fn project<'a>(&self, model: &'a dyn Any) -> Option<&'a dyn Any> {
        (self.upcast)(model)
    }

    pub fn project_mut<'a>(&self, model: &'a mut dyn Any) -> Option<&'a mut dyn Any> {
        (self.upcast_mut)(model)
    }
}

impl fmt::Debug for BaseProjection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BaseProjection")
            .field("base", &self.base)
            .finish_non_exhaustive()
    }
}

/// Schema of a model type.
#[derive(Clone)]
pub struct ModelType {
    id: ModelTypeId,
    name: String,
    fields: Vec<FieldDescriptor>,
    bases: Vec<BaseProjection>,
    factory: ModelFactory,
}

impl ModelType {
    pub fn builder<M: Any + Default + Send>() -> ModelTypeBuilder<M> {
        ModelTypeBuilder::new()
    }

    pub fn id(&self) -> ModelTypeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|field| field.name() == name)
    }

    pub fn base(&self, base: ModelTypeId) -> Option<&BaseProjection> {
        self.bases.iter().find(|projection| projection.base() == base)
    }

    pub fn factory(&self) -> ModelFactory {
        Arc::clone(&self.factory)
    }

    pub fn new_instance(&self) -> ModelInstance {
        (self.factory)()
    }
}

impl fmt::Debug for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelType")
            .field("name", &self.name)
            .field("fields", &self.fields)
            .field("bases", &self.bases)
            .finish_non_exhaustive()
    }
}

/// Typed builder for [`ModelType`].
///
/// ```ignore
/// let address = ModelType::builder::<Address>()
///     .field("street", |a: &Address| a.street.clone(), |a, v| a.street = v)
///     .field("number", |a: &Address| a.number, |a, v| a.number = v)
///     .build();
/// ```
pub struct ModelTypeBuilder<M> {
    name: String,
    fields: Vec<FieldDescriptor>,
    bases: Vec<BaseProjection>,
    _model: PhantomData<fn() -> M>,
}

impl<M: Any + Default + Send> ModelTypeBuilder<M> {
    fn new() -> Self {
        Self {
            name: ModelTypeId::of::<M>().short_name().to_string(),
            fields: Vec::new(),
            bases: Vec::new(),
            _model: PhantomData,
        }
    }

    /// Overrides the display name (defaults to the Rust type name).
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn field<V, G, S>(mut self, name: &str, get: G, set: S) -> Self
    where
        V: ModelField,
        G: Fn(&M) -> V + Send + Sync + 'static,
        S: Fn(&mut M, V) + Send + Sync + 'static,
    {
        let model_name = self.name.clone();
        let field_name = name.to_string();

        let getter: FieldGetter = Arc::new(move |model: &dyn Any| -> Result<FieldValue> {
            let model = downcast_model::<M>(model)?;
            Ok(get(model).into_value())
        });

        let setter: FieldSetter = Arc::new(move |model: &mut dyn Any, value: FieldValue| -> Result<()> {
            let model = model
                .downcast_mut::<M>()
                .ok_or_else(|| model_type_mismatch::<M>())?;
            let value = V::from_value(value).map_err(|mismatch| AdapterError::ConversionType {
                model: model_name.clone(),
                field: field_name.clone(),
                expected: mismatch.expected,
                actual: mismatch.actual,
            })?;
            set(model, value);
            Ok(())
        });

        self.fields
            .push(FieldDescriptor::new(name, V::field_type(), getter, setter));
        self
    }

    /// Adds a field built with [`FieldDescriptor::new`].
    pub fn raw_field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    /// Declares that `M` embeds the base model `B`, reachable through the two projections.
    pub fn extends<B: Any>(mut self, upcast: fn(&M) -> &B, upcast_mut: fn(&mut M) -> &mut B) -> Self {
        let projection = BaseProjection {
            base: ModelTypeId::of::<B>(),
            upcast: Arc::new(upcast_fn(move |model: &dyn Any| {
                model
                    .downcast_ref::<M>()
                    .map(|model| upcast(model) as &dyn Any)
            })),
            upcast_mut: Arc::new(upcast_mut_fn(move |model: &mut dyn Any| {
                model
                    .downcast_mut::<M>()
                    .map(|model| upcast_mut(model) as &mut dyn Any)
            })),
        };
        self.bases.push(projection);
        self
    }

    pub fn build(self) -> ModelType {
        ModelType {
            id: ModelTypeId::of::<M>(),
            name: self.name,
            fields: self.fields,
            bases: self.bases,
            factory: Arc::new(|| Box::new(M::default()) as ModelInstance),
        }
    }
}

fn downcast_model<M: Any>(model: &dyn Any) -> Result<&M> {
    model.downcast_ref::<M>().ok_or_else(|| model_type_mismatch::<M>())
}

fn model_type_mismatch<M: Any>() -> AdapterError {
    AdapterError::ModelTypeMismatch {
        expected: ModelTypeId::of::<M>().short_name().to_string(),
    }
}

// Pins the closure signatures to the higher-ranked forms stored in `Upcast`/`UpcastMut`.
fn upcast_fn<F>(f: F) -> F
where
    F: for<'a> Fn(&'a dyn Any) -> Option<&'a dyn Any>,
{
    f
}

fn upcast_mut_fn<F>(f: F) -> F
where
    F: for<'a> Fn(&'a mut dyn Any) -> Option<&'a mut dyn Any>,
{
    f
}
