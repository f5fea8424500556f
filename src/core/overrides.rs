//! Per-field overrides of the default conversion rules.
//!
//! An override replaces the rule of one direction. It is handed the default
//! rule as a callable so it can adjust the default result instead of
//! reimplementing it.

use crate::domain::model::FieldValue;
use crate::utils::error::{AdapterError, Result};
use bson::Bson;
use std::fmt;
use std::sync::Arc;

pub type ExtractOverride =
    Arc<dyn Fn(FieldValue, &dyn Fn(FieldValue) -> Result<Bson>) -> Result<Bson> + Send + Sync>;
pub type InjectOverride =
    Arc<dyn Fn(Bson, &dyn Fn(Bson) -> Result<FieldValue>) -> Result<FieldValue> + Send + Sync>;

/// Names accepted by [`FieldOverride::named`].
pub const BUILTIN_OVERRIDES: &[&str] = &["string_as_int32", "string_as_int64"];

#[derive(Clone, Default)]
pub struct FieldOverride {
    to_doc: Option<ExtractOverride>,
    from_doc: Option<InjectOverride>,
}

impl FieldOverride {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the model->document rule.
    pub fn to_doc<F>(mut self, f: F) -> Self
    where
        F: Fn(FieldValue, &dyn Fn(FieldValue) -> Result<Bson>) -> Result<Bson> + Send + Sync + 'static,
    {
        self.to_doc = Some(Arc::new(f));
        self
    }

    /// Replaces the document->model rule.
    pub fn from_doc<F>(mut self, f: F) -> Self
    where
        F: Fn(Bson, &dyn Fn(Bson) -> Result<FieldValue>) -> Result<FieldValue> + Send + Sync + 'static,
    {
        self.from_doc = Some(Arc::new(f));
        self
    }

    pub fn extractor(&self) -> Option<&ExtractOverride> {
        self.to_doc.as_ref()
    }

    pub fn injector(&self) -> Option<&InjectOverride> {
        self.from_doc.as_ref()
    }

    /// Model keeps a decimal string, the document stores an Int32.
    pub fn string_as_int32() -> Self {
        Self::new()
            .to_doc(|value, default| match default(value)? {
                Bson::String(text) => text
                    .trim()
                    .parse::<i32>()
                    .map(Bson::Int32)
                    .map_err(|_| AdapterError::conversion("decimal Int32 string", format!("\"{text}\""))),
                other => Ok(other),
            })
            .from_doc(|value, default| match value {
                Bson::Int32(number) => Ok(FieldValue::String(number.to_string())),
                Bson::Int64(number) => Ok(FieldValue::String(number.to_string())),
                other => default(other),
            })
    }

    /// Model keeps a decimal string, the document stores an Int64.
    pub fn string_as_int64() -> Self {
        Self::new()
            .to_doc(|value, default| match default(value)? {
                Bson::String(text) => text
                    .trim()
                    .parse::<i64>()
                    .map(Bson::Int64)
                    .map_err(|_| AdapterError::conversion("decimal Int64 string", format!("\"{text}\""))),
                other => Ok(other),
            })
            .from_doc(|value, default| match value {
                Bson::Int32(number) => Ok(FieldValue::String(number.to_string())),
                Bson::Int64(number) => Ok(FieldValue::String(number.to_string())),
                other => default(other),
            })
    }

    /// Looks up one of the [`BUILTIN_OVERRIDES`] by name.
    pub fn named(name: &str) -> Option<Self> {
        match name {
            "string_as_int32" => Some(Self::string_as_int32()),
            "string_as_int64" => Some(Self::string_as_int64()),
            _ => None,
        }
    }
}

impl fmt::Debug for FieldOverride {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldOverride")
            .field("to_doc", &self.to_doc.is_some())
            .field("from_doc", &self.from_doc.is_some())
            .finish()
    }
}
