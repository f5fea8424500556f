use crate::core::overrides::BUILTIN_OVERRIDES;
use crate::domain::model::EmitTarget;
use crate::utils::error::{AdapterError, Result};
use crate::utils::validation::{
    validate_document_key, validate_identifier, validate_non_empty_string, validate_one_of,
    validate_unique, Validate,
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdapterConfig {
    pub generator: GeneratorConfig,
    #[serde(default)]
    pub adapters: Vec<AdapterSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    pub name: String,
    pub description: Option<String>,
    pub namespace: String,
}

/// One `[[adapters]]` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdapterSpec {
    pub model: String,
    pub extends: Option<String>,
    /// Replaces the default `["_id"]` when present.
    pub identifier_fields: Option<Vec<String>>,
    #[serde(default)]
    pub fields: IndexMap<String, String>,
    /// Model field name -> built-in override name.
    pub overrides: Option<IndexMap<String, String>>,
}

impl AdapterConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(AdapterError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        // 處理環境變數替換
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| AdapterError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${NAMESPACE})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| AdapterError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validate_non_empty_string("generator.name", &self.generator.name)?;
        validate_non_empty_string("generator.namespace", &self.generator.namespace)?;
        for segment in self.generator.namespace.split('.') {
            validate_identifier("generator.namespace", segment)?;
        }

        if self.adapters.is_empty() {
            return Err(AdapterError::MissingConfigError {
                field: "adapters".to_string(),
            });
        }

        let mut declared: HashSet<&str> = HashSet::new();
        for (index, adapter) in self.adapters.iter().enumerate() {
            let prefix = format!("adapters[{}]", index);
            adapter.validate_entry(&prefix, &declared)?;
            declared.insert(adapter.model.as_str());
        }

        validate_unique("adapters.model", self.adapters.iter().map(|a| a.model.as_str()))
    }

    /// 取得指定模型的 adapter 設定
    pub fn adapter(&self, model: &str) -> Option<&AdapterSpec> {
        self.adapters.iter().find(|adapter| adapter.model == model)
    }

    pub fn emit_target(&self) -> EmitTarget {
        EmitTarget::new(self.generator.namespace.clone())
    }
}

impl AdapterSpec {
    /// `declared` holds the models listed before this entry.
    fn validate_entry(&self, prefix: &str, declared: &HashSet<&str>) -> Result<()> {
        validate_identifier(&format!("{prefix}.model"), &self.model)?;

        if let Some(parent) = &self.extends {
            if !declared.contains(parent.as_str()) {
                return Err(AdapterError::ConfigValidationError {
                    field: format!("{prefix}.extends"),
                    message: format!(
                        "'{}' must be listed before '{}' so its adapter exists first",
                        parent, self.model
                    ),
                });
            }
        }

        for (field, key) in &self.fields {
            validate_identifier(&format!("{prefix}.fields"), field)?;
            validate_document_key(&format!("{prefix}.fields.{field}"), key)?;
        }
        validate_unique(
            &format!("{prefix}.fields"),
            self.fields.values().map(String::as_str),
        )?;

        for identifier in self.identifier_fields.iter().flatten() {
            let mapped = self.fields.contains_key(identifier)
                || self.fields.values().any(|key| key == identifier);
            if !mapped {
                return Err(AdapterError::ConfigValidationError {
                    field: format!("{prefix}.identifier_fields"),
                    message: format!("'{}' is neither a mapped field nor a document key", identifier),
                });
            }
        }

        for (field, name) in self.overrides.iter().flatten() {
            if !self.fields.contains_key(field) {
                return Err(AdapterError::ConfigValidationError {
                    field: format!("{prefix}.overrides"),
                    message: format!("'{}' is not a mapped field", field),
                });
            }
            validate_one_of(&format!("{prefix}.overrides.{field}"), name, BUILTIN_OVERRIDES)?;
        }

        Ok(())
    }
}

impl Validate for AdapterConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = r#"
[generator]
name = "sample"
namespace = "com.example.adapters"

[[adapters]]
model = "Address"
fields = { street = "str", number = "num" }

[[adapters]]
model = "AddressExt"
extends = "Address"
fields = { city = "city" }

[[adapters]]
model = "Person"
identifier_fields = ["_id", "friends"]
fields = { id = "_id", friendIds = "friends", number = "number" }
overrides = { number = "string_as_int32" }
"#;

    #[test]
    fn test_parse_sample_config() {
        let config = AdapterConfig::from_toml_str(SAMPLE).unwrap();

        assert_eq!(config.generator.name, "sample");
        assert_eq!(config.adapters.len(), 3);
        assert_eq!(config.emit_target().namespace, "com.example.adapters");

        let ext = config.adapter("AddressExt").unwrap();
        assert_eq!(ext.extends.as_deref(), Some("Address"));

        let person = config.adapter("Person").unwrap();
        let fields: Vec<_> = person.fields.keys().map(String::as_str).collect();
        assert_eq!(fields, vec!["id", "friendIds", "number"]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("DOC_ADAPTER_TEST_NAMESPACE", "org.acme.store");

        let toml_content = r#"
[generator]
name = "env"
namespace = "${DOC_ADAPTER_TEST_NAMESPACE}"

[[adapters]]
model = "Tag"
fields = { label = "${DOC_ADAPTER_TEST_UNSET_KEY}" }
"#;

        let config = AdapterConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.generator.namespace, "org.acme.store");
        assert_eq!(config.adapters[0].fields["label"], "${DOC_ADAPTER_TEST_UNSET_KEY}");

        std::env::remove_var("DOC_ADAPTER_TEST_NAMESPACE");
    }

    #[test]
    fn test_extends_must_come_first() {
        let toml_content = r#"
[generator]
name = "order"
namespace = "sample"

[[adapters]]
model = "AddressExt"
extends = "Address"
fields = { city = "city" }

[[adapters]]
model = "Address"
fields = { street = "str" }
"#;

        let config = AdapterConfig::from_toml_str(toml_content).unwrap();
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            AdapterError::ConfigValidationError { ref field, .. } if field == "adapters[0].extends"
        ));
    }

    #[test]
    fn test_rejects_duplicate_keys_and_unknown_overrides() {
        let duplicate_keys = r#"
[generator]
name = "dup"
namespace = "sample"

[[adapters]]
model = "Address"
fields = { street = "s", number = "s" }
"#;
        let config = AdapterConfig::from_toml_str(duplicate_keys).unwrap();
        assert!(config.validate().is_err());

        let unknown_override = r#"
[generator]
name = "ovr"
namespace = "sample"

[[adapters]]
model = "Address"
fields = { street = "s" }
overrides = { street = "uppercase" }
"#;
        let config = AdapterConfig::from_toml_str(unknown_override).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("uppercase"));
    }

    #[test]
    fn test_identifier_fields_must_be_mapped() {
        let toml_content = r#"
[generator]
name = "ids"
namespace = "sample"

[[adapters]]
model = "Person"
identifier_fields = ["owner"]
fields = { id = "_id" }
"#;
        let config = AdapterConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_adapter_list_is_missing_config() {
        let toml_content = r#"
[generator]
name = "empty"
namespace = "sample"
"#;
        let config = AdapterConfig::from_toml_str(toml_content).unwrap();
        assert!(matches!(
            config.validate(),
            Err(AdapterError::MissingConfigError { .. })
        ));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(SAMPLE.as_bytes()).unwrap();

        let config = AdapterConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.generator.name, "sample");

        let missing = AdapterConfig::from_file("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(missing, AdapterError::IoError(_)));
    }
}
