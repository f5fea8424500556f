pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{HexObjectIdCodec, ManifestEmitter};
pub use config::AdapterConfig;
pub use core::{
    adapter::{Adapter, DynAdapter, RuntimeEmitter},
    builder::{AdapterDefinitionBuilder, AdapterOptions},
    catalog::ModelCatalog,
    classifier::Classification,
    context::AdapterContext,
    definition::{AdapterDefinition, FieldKeys, FieldMapping},
    descriptor::{FieldDescriptor, ModelType},
    overrides::FieldOverride,
    registry::AdapterRegistry,
};
pub use domain::model::{EmitTarget, EnumType, FieldType, FieldValue, ModelTypeId};
pub use domain::ports::{AdapterEmitter, IdCodec, ModelEnum, ModelField};
pub use utils::error::{AdapterError, Result};
