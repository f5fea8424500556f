use thiserror::Error;

#[derive(Error, Debug)]
pub enum AdapterError {
    #[error("Identifier field {model}.{field} must be string-typed, found {actual}")]
    IdentifierNotString {
        model: String,
        field: String,
        actual: String,
    },

    #[error("Ambiguous document key '{key}' in {model}: used by both '{first}' and '{second}'")]
    AmbiguousDocumentKey {
        model: String,
        key: String,
        first: String,
        second: String,
    },

    #[error("Unknown field '{field}' on model {model}")]
    UnknownField { model: String, field: String },

    #[error("Model {model} declares no base projection to {base}")]
    MissingBaseProjection { model: String, base: String },

    #[error("Unsupported type {declared} for field {model}.{field}")]
    UnsupportedFieldType {
        model: String,
        field: String,
        declared: String,
    },

    #[error("Unresolved reference from {model}.{field}: no adapter registered for {target}")]
    UnresolvedReference {
        model: String,
        field: String,
        target: String,
    },

    #[error("Unresolved superclass of {model}: no adapter registered for {superclass}")]
    UnresolvedSuperclass { model: String, superclass: String },

    #[error("Adapter already registered for {model}")]
    DuplicateAdapter { model: String },

    #[error("Adapter not found for type {model}")]
    AdapterNotFound { model: String },

    #[error("Model instance is not a {expected}")]
    ModelTypeMismatch { expected: String },

    #[error("Conversion type error in {model}.{field}: expected {expected}, found {actual}")]
    ConversionType {
        model: String,
        field: String,
        expected: String,
        actual: String,
    },

    #[error("Invalid identifier '{value}' in {model}.{field}: {reason}")]
    InvalidIdentifier {
        model: String,
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unknown variant '{variant}' of enum {enum_name} in {model}.{field}")]
    UnknownEnumVariant {
        model: String,
        field: String,
        enum_name: String,
        variant: String,
    },

    #[error("Failed to build {adapter}: {source}")]
    BuildFailed {
        adapter: String,
        #[source]
        source: Box<AdapterError>,
    },

    #[error("Unknown model '{name}': not present in the model catalog")]
    UnknownModel { name: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration '{field}'")]
    MissingConfigError { field: String },
}

pub type Result<T> = std::result::Result<T, AdapterError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Schema,
    UnresolvedReference,
    Registry,
    ConversionType,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl AdapterError {
    /// A conversion error whose model and field are filled in later by [`AdapterError::in_field`].
    pub fn conversion(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        AdapterError::ConversionType {
            model: String::new(),
            field: String::new(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Attaches model and field names to a use-time error that does not carry them yet.
    pub fn in_field(mut self, model_name: &str, field_name: &str) -> Self {
        match &mut self {
            AdapterError::ConversionType { model, field, .. }
            | AdapterError::InvalidIdentifier { model, field, .. }
            | AdapterError::UnknownEnumVariant { model, field, .. } => {
                if model.is_empty() && field.is_empty() {
                    *model = model_name.to_string();
                    *field = field_name.to_string();
                }
            }
            _ => {}
        }
        self
    }

    /// The innermost error, looking through [`AdapterError::BuildFailed`].
    pub fn root_cause(&self) -> &AdapterError {
        match self {
            AdapterError::BuildFailed { source, .. } => source.root_cause(),
            other => other,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            AdapterError::BuildFailed { source, .. } => source.category(),
            AdapterError::IdentifierNotString { .. }
            | AdapterError::AmbiguousDocumentKey { .. }
            | AdapterError::UnknownField { .. }
            | AdapterError::MissingBaseProjection { .. }
            | AdapterError::UnsupportedFieldType { .. } => ErrorCategory::Schema,
            AdapterError::UnresolvedReference { .. } | AdapterError::UnresolvedSuperclass { .. } => {
                ErrorCategory::UnresolvedReference
            }
            AdapterError::DuplicateAdapter { .. }
            | AdapterError::AdapterNotFound { .. }
            | AdapterError::ModelTypeMismatch { .. } => ErrorCategory::Registry,
            AdapterError::ConversionType { .. }
            | AdapterError::InvalidIdentifier { .. }
            | AdapterError::UnknownEnumVariant { .. } => ErrorCategory::ConversionType,
            AdapterError::UnknownModel { .. }
            | AdapterError::ConfigError { .. }
            | AdapterError::ConfigValidationError { .. }
            | AdapterError::InvalidConfigValueError { .. }
            | AdapterError::MissingConfigError { .. } => ErrorCategory::Configuration,
            AdapterError::IoError(_) | AdapterError::SerializationError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::ConversionType => ErrorSeverity::Medium,
            ErrorCategory::Schema
            | ErrorCategory::UnresolvedReference
            | ErrorCategory::Registry
            | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            AdapterError::BuildFailed { source, .. } => source.recovery_suggestion(),
            AdapterError::IdentifierNotString { .. } => {
                "Declare the identifier field as String (or a list of String), or remove it from identifier_fields"
            }
            AdapterError::AmbiguousDocumentKey { .. } => {
                "Give every mapped field of the adapter its own document key"
            }
            AdapterError::UnknownField { .. } => {
                "Check the field mapping against the fields declared on the model descriptor"
            }
            AdapterError::MissingBaseProjection { .. } => {
                "Declare the base type on the model descriptor with `extends` before using it as superclass"
            }
            AdapterError::UnsupportedFieldType { .. } => {
                "Lists of lists are only supported for scalar element types"
            }
            AdapterError::UnresolvedReference { .. } | AdapterError::UnresolvedSuperclass { .. } => {
                "Build adapters for referenced types before the adapters that use them"
            }
            AdapterError::DuplicateAdapter { .. } => "Build each model's adapter only once",
            AdapterError::AdapterNotFound { .. } => {
                "Build the adapter for this model before converting values of it"
            }
            AdapterError::ModelTypeMismatch { .. } => {
                "Pass instances of the model type the adapter was built for"
            }
            AdapterError::ConversionType { .. }
            | AdapterError::InvalidIdentifier { .. }
            | AdapterError::UnknownEnumVariant { .. } => {
                "Check that stored documents match the declared model field types"
            }
            AdapterError::UnknownModel { .. } => {
                "Register the model descriptor in the catalog under the name used in the config"
            }
            AdapterError::ConfigError { .. }
            | AdapterError::ConfigValidationError { .. }
            | AdapterError::InvalidConfigValueError { .. }
            | AdapterError::MissingConfigError { .. } => {
                "Fix the adapter configuration file and run the check again"
            }
            AdapterError::IoError(_) => "Check that the file exists and is readable",
            AdapterError::SerializationError(_) => "Report this as a bug in doc-adapter",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Schema => format!("Invalid adapter schema: {}", self),
            ErrorCategory::UnresolvedReference => format!("Adapters built out of order: {}", self),
            ErrorCategory::Registry => format!("Adapter registry problem: {}", self),
            ErrorCategory::ConversionType => format!("Document does not match the model: {}", self),
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::System => format!("System error: {}", self),
        }
    }
}
