//! Error types for loading and configuration.
//!
//! Validation findings are not errors; see [`matrix_types::Warning`].

use thiserror::Error;

/// Failure to obtain or parse the dataset document. Fatal to session start.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read dataset '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to fetch dataset from {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("dataset request to {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("dataset '{origin}' is not valid JSON: {source}")]
    Json {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("dataset '{origin}' is not valid YAML: {source}")]
    Yaml {
        origin: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid dataset source '{0}'")]
    InvalidSource(String),
}

impl LoadError {
    /// Short machine-readable code for the error view.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Io { .. } => "IO",
            Self::Http { .. } => "HTTP",
            Self::Status { .. } => "HTTP_STATUS",
            Self::Json { .. } | Self::Yaml { .. } => "PARSE",
            Self::InvalidSource(_) => "INVALID_SOURCE",
        }
    }

    pub fn is_parse_error(&self) -> bool {
        matches!(self, Self::Json { .. } | Self::Yaml { .. })
    }
}

/// Invalid configuration file or environment value.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid value '{value}' for {key} (expected {expected})")]
    InvalidValue {
        key: &'static str,
        value: String,
        expected: &'static str,
    },
}
