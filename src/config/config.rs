//! On-disk CLI configuration: alias mappings and output preferences that
//! would otherwise need to be repeated on every invocation.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub resolution: ResolutionConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

fn default_version() -> String {
    "1.0".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            resolution: ResolutionConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

/// Controls how imports, resource references, and other cross-document
/// lookups are resolved during a compile.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResolutionConfig {
    /// Short-name to URL alias table, equivalent to a series of inline
    /// `--alias name=url` flags.
    #[serde(default)]
    pub alias_mapping: HashMap<String, String>,
    /// A URL to fetch an alias mapping document from.
    #[serde(default)]
    pub alias_mapping_url: Option<String>,
    /// Fallback base URL for resources that cannot be resolved any other way.
    #[serde(default)]
    pub resources_base_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Yaml,
    Json,
}

impl Default for OutputFormat {
    fn default() -> Self {
        OutputFormat::Yaml
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
    #[serde(default)]
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Yaml,
            pretty: true,
        }
    }
}

impl Config {
    /// Load configuration from a YAML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let contents = serde_yaml::to_string(self)?;
        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write config file {}", path.display()))
    }

    pub fn validate(&self) -> Result<()> {
        if self.version.trim().is_empty() {
            bail!("config version must not be empty");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.output.format, OutputFormat::Yaml);
    }

    #[test]
    fn round_trips_through_yaml() {
        let config = Config::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let parsed: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(config.version, parsed.version);
        assert_eq!(config.output.pretty, parsed.output.pretty);
    }

    #[test]
    fn rejects_empty_version() {
        let mut config = Config::default();
        config.version = String::new();
        assert!(config.validate().is_err());
    }
}
