//! Engine configuration.
//!
//! Loaded from a YAML file or from environment variables:
//!
//! ```yaml
//! dataset: static/features.json      # path or http(s) URL
//! inheritance: implicit              # implicit | explicit
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, LoadError};
use crate::loader::DatasetSource;
use crate::normalize::InheritanceStrategy;

/// Default dataset location, relative to the working directory.
pub const DEFAULT_DATASET: &str = "static/features.json";

pub const ENV_DATASET: &str = "MATRIX_DATASET";
pub const ENV_INHERITANCE: &str = "MATRIX_INHERITANCE";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixConfig {
    /// Path or URL of the dataset document
    #[serde(default = "default_dataset")]
    pub dataset: String,
    #[serde(default)]
    pub inheritance: InheritanceStrategy,
}

fn default_dataset() -> String {
    DEFAULT_DATASET.to_string()
}

impl Default for MatrixConfig {
    fn default() -> Self {
        Self {
            dataset: default_dataset(),
            inheritance: InheritanceStrategy::default(),
        }
    }
}

impl MatrixConfig {
    /// Load configuration from a YAML file
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_string(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Build from `MATRIX_DATASET` / `MATRIX_INHERITANCE`, falling back to
    /// defaults for unset variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(dataset) = lookup(ENV_DATASET).filter(|v| !v.trim().is_empty()) {
            config.dataset = dataset;
        }
        if let Some(inheritance) = lookup(ENV_INHERITANCE) {
            config.inheritance = inheritance.parse().map_err(|_| ConfigError::InvalidValue {
                key: ENV_INHERITANCE,
                value: inheritance.clone(),
                expected: "implicit or explicit",
            })?;
        }
        Ok(config)
    }

    pub fn source(&self) -> Result<DatasetSource, LoadError> {
        DatasetSource::parse(&self.dataset)
    }
}
