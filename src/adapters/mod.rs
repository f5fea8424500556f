// Adapters layer: concrete implementations of the domain ports (id codecs, emitters).

pub mod manifest;
pub mod object_id;

pub use manifest::{AdapterManifest, FieldManifest, ManifestEmitter};
pub use object_id::HexObjectIdCodec;
