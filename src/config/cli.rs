use crate::utils::error::Result;
use crate::utils::validation::{validate_non_empty_string, Validate};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "adapter-check")]
#[command(about = "Validate a document adapter configuration and print the build plan")]
pub struct CliConfig {
    /// Adapter configuration file (TOML)
    #[arg(default_value = "adapters.toml")]
    pub config: PathBuf,

    #[arg(long, short, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("config", &self.config.to_string_lossy())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flags() {
        let config = CliConfig::parse_from(["adapter-check", "conf/sample.toml", "-v", "--json-logs"]);
        assert_eq!(config.config, PathBuf::from("conf/sample.toml"));
        assert!(config.verbose);
        assert!(config.json_logs);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_defaults() {
        let config = CliConfig::parse_from(["adapter-check"]);
        assert_eq!(config.config, PathBuf::from("adapters.toml"));
        assert!(!config.verbose);
        assert!(!config.json_logs);
    }
}
