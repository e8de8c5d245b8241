//! Server configuration from the environment.

use std::path::PathBuf;

use feature_matrix::config::{ENV_DATASET, MatrixConfig};
use feature_matrix::ConfigError;

pub const DEFAULT_PORT: u16 = 8000;

/// Hosting platforms disagree on the port variable; first one set wins.
const PORT_VARS: [&str; 3] = ["WEBSITES_PORT", "PORT", "SERVER_PORT"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    pub static_dir: PathBuf,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = PORT_VARS
            .iter()
            .find_map(|key| {
                let raw = lookup(key)?;
                match raw.trim().parse::<u16>() {
                    Ok(port) => Some(port),
                    Err(e) => {
                        tracing::warn!("Ignoring invalid {}={:?}: {}", key, raw, e);
                        None
                    }
                }
            })
            .unwrap_or(DEFAULT_PORT);

        // STATIC_DIR at runtime, else the crate's own static/ directory
        let static_dir = lookup("STATIC_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("static"));

        Self { port, static_dir }
    }
}

/// Engine config: `MATRIX_CONFIG` YAML file if set, else environment.
///
/// Without an explicit dataset the document bundled in the static directory
/// is used, so the page and `/static/features.json` show the same data.
pub fn matrix_config<F>(lookup: F, static_dir: &std::path::Path) -> Result<MatrixConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(path) = lookup("MATRIX_CONFIG") {
        return MatrixConfig::from_file(&path);
    }
    let explicit_dataset = lookup(ENV_DATASET).is_some_and(|v| !v.trim().is_empty());
    let mut config = MatrixConfig::from_lookup(&lookup)?;
    if !explicit_dataset {
        config.dataset = static_dir.join("features.json").display().to_string();
    }
    Ok(config)
}
