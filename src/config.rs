//! YAML configuration for the content pipeline.
//!
//! A configuration file can replace the rule set of any target, restrict the
//! allowed model and cap the input size. Targets that are not listed keep the
//! built-in rules.
//!
//! ## Example YAML Configuration
//!
//! ```yaml
//! version: "1.0"
//! name: "storefront"
//! allowed_model: "gpt-4o-mini"
//! max_input_bytes: 65536
//!
//! targets:
//!   facebook:
//!     title: { min_len: 5, max_len: 80 }
//!     description: { min_len: 40, max_len: 600 }
//!     tags: { min_count: 1, max_count: 5 }
//!     banned_words:
//!       scope: both
//!       words: ["click here"]
//!     fallback:
//!       on_unrepairable: reject
//!     default_record:
//!       title: "From our workshop"
//!       description: "Small-batch pieces made by hand and packed with care for you."
//!       tags: ["#handmade"]
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use rules::{Catalog, RuleSet, RuleSetError, Target};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The only model the pipeline accepts unless configured otherwise.
pub const DEFAULT_ALLOWED_MODEL: &str = "gpt-4o-mini";

/// Default cap on raw model output, in bytes.
pub const DEFAULT_MAX_INPUT_BYTES: usize = 64 * 1024;

/// Errors that can occur when loading YAML configuration files
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unsupported config version: {0}")]
    UnsupportedVersion(String),

    #[error("invalid rule set: {0}")]
    RuleSet(#[from] RuleSetError),
}

/// Top-level YAML configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PipelineConfig {
    /// Configuration format version
    pub version: String,

    /// Optional configuration name/description
    #[serde(default)]
    pub name: Option<String>,

    /// Model name accepted by `process_output_from_model`
    #[serde(default = "default_allowed_model")]
    pub allowed_model: String,

    /// Inputs longer than this fail with `VALIDATION_ERROR`; `null` disables
    /// the check
    #[serde(default = "default_max_input_bytes")]
    pub max_input_bytes: Option<usize>,

    /// Full rule-set replacements, keyed by target
    #[serde(default)]
    pub targets: BTreeMap<Target, RuleSet>,
}

impl PipelineConfig {
    /// Load a YAML configuration file from the given path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse YAML configuration from a string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: PipelineConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.version.as_str() {
            "1.0" | "1" => Ok(()),
            v => Err(ConfigLoadError::UnsupportedVersion(v.to_string())),
        }?;

        if self.allowed_model.trim().is_empty() {
            return Err(ConfigLoadError::Validation(
                "allowed_model must not be empty".into(),
            ));
        }
        if self.max_input_bytes == Some(0) {
            return Err(ConfigLoadError::Validation(
                "max_input_bytes must be > 0".into(),
            ));
        }

        for (target, rules) in &self.targets {
            rules.validate(*target)?;
        }
        Ok(())
    }

    /// Built-in catalog with this configuration's overrides applied.
    pub fn build_catalog(&self) -> Result<Catalog, ConfigLoadError> {
        let mut catalog = Catalog::builtin();
        for (target, rules) in &self.targets {
            catalog = catalog.with_rules(*target, rules.clone())?;
        }
        Ok(catalog)
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            name: None,
            allowed_model: default_allowed_model(),
            max_input_bytes: default_max_input_bytes(),
            targets: BTreeMap::new(),
        }
    }
}

fn default_allowed_model() -> String {
    DEFAULT_ALLOWED_MODEL.to_string()
}
fn default_max_input_bytes() -> Option<usize> {
    Some(DEFAULT_MAX_INPUT_BYTES)
}
