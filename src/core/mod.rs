pub mod adapter;
pub mod builder;
pub mod catalog;
pub mod classifier;
pub mod context;
pub mod definition;
pub mod descriptor;
pub mod overrides;
pub mod registry;
pub mod resolver;

pub use crate::domain::model::{EmitTarget, FieldType, FieldValue, ModelTypeId};
pub use crate::domain::ports::{AdapterEmitter, IdCodec, ModelEnum, ModelField};
pub use crate::utils::error::Result;
