//! One-time load of the dataset document.
//!
//! The document is fetched exactly once at startup, from a local path or an
//! http(s) URL, and parsed as JSON (or YAML for `.yaml`/`.yml` sources).
//! There is no retry and no timeout; any failure is a [`LoadError`].

use std::fmt;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use url::Url;

use matrix_types::RawDataset;

use crate::error::LoadError;

/// Where the dataset document lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetSource {
    File(PathBuf),
    Url(Url),
}

impl DatasetSource {
    /// `http://` and `https://` strings become URLs, anything else a path.
    pub fn parse(raw: &str) -> Result<Self, LoadError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(LoadError::InvalidSource(raw.to_string()));
        }
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            return Url::parse(trimmed)
                .map(Self::Url)
                .map_err(|_| LoadError::InvalidSource(raw.to_string()));
        }
        Ok(Self::File(PathBuf::from(trimmed)))
    }

    /// Document format implied by the source's extension.
    pub fn format(&self) -> DocumentFormat {
        let path = match self {
            Self::File(path) => path.as_path(),
            Self::Url(url) => Path::new(url.path()),
        };
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                DocumentFormat::Yaml
            }
            _ => DocumentFormat::Json,
        }
    }
}

impl fmt::Display for DatasetSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Url(url) => write!(f, "{}", url),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
}

/// Fetches the raw bytes of a dataset document.
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    async fn fetch(&self, source: &DatasetSource) -> Result<Vec<u8>, LoadError>;
}

/// Reads files with `tokio::fs` and URLs with `reqwest`.
#[derive(Debug, Clone, Default)]
pub struct SourceFetcher {
    client: reqwest::Client,
}

impl SourceFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DocumentFetcher for SourceFetcher {
    async fn fetch(&self, source: &DatasetSource) -> Result<Vec<u8>, LoadError> {
        match source {
            DatasetSource::File(path) => {
                tokio::fs::read(path).await.map_err(|source| LoadError::Io {
                    path: path.display().to_string(),
                    source,
                })
            }
            DatasetSource::Url(url) => {
                let http_err = |source| LoadError::Http {
                    url: url.to_string(),
                    source,
                };
                let response = self
                    .client
                    .get(url.clone())
                    .send()
                    .await
                    .map_err(http_err)?;
                let status = response.status();
                if !status.is_success() {
                    return Err(LoadError::Status {
                        url: url.to_string(),
                        status: status.as_u16(),
                    });
                }
                let body = response.bytes().await.map_err(http_err)?;
                Ok(body.to_vec())
            }
        }
    }
}

/// Parse a fetched document.
pub fn parse_document(
    bytes: &[u8],
    format: DocumentFormat,
    origin: &str,
) -> Result<RawDataset, LoadError> {
    match format {
        DocumentFormat::Json => serde_json::from_slice(bytes).map_err(|source| LoadError::Json {
            origin: origin.to_string(),
            source,
        }),
        DocumentFormat::Yaml => serde_yaml::from_slice(bytes).map_err(|source| LoadError::Yaml {
            origin: origin.to_string(),
            source,
        }),
    }
}

/// Fetch and parse the dataset with the default fetcher.
pub async fn load_dataset(source: &DatasetSource) -> Result<RawDataset, LoadError> {
    load_dataset_with(&SourceFetcher::new(), source).await
}

/// Fetch and parse the dataset with a caller-supplied fetcher.
pub async fn load_dataset_with(
    fetcher: &dyn DocumentFetcher,
    source: &DatasetSource,
) -> Result<RawDataset, LoadError> {
    let bytes = fetcher.fetch(source).await?;
    let origin = source.to_string();
    let dataset = parse_document(&bytes, source.format(), &origin)?;
    tracing::info!(
        source = %origin,
        bytes = bytes.len(),
        ides = dataset.ide_count(),
        "dataset loaded"
    );
    Ok(dataset)
}
