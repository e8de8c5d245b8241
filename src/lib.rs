//! Feature Matrix - normalization and pivot engine for IDE feature support.
//!
//! The input is a sparse, versioned document: for every IDE, for every
//! version, the features declared at that version with their release type.
//! The engine resolves it into a dense fact table and answers pivot queries
//! over it.
//!
//! # Architecture
//!
//! ```text
//! RawDataset ──► validate ──► Vec<Warning>        (advisory side channel)
//!      │
//!      └──────► Normalizer ──► Vec<Fact> ──► pivot / views ──► PivotTable
//! ```
//!
//! - [`version`] - ordering of year and dotted version identifiers
//! - [`normalize`] - inheritance fold producing one fact per (ide, version, feature)
//! - [`validate`] - duplicate / chronology / inheritance checks on raw declarations
//! - [`pivot`] - two-axis cross-tabulation
//! - [`views`] - latest-per-IDE, per-IDE history and preview/GA lookup
//! - [`session`] - the loaded dataset with its cached facts and warnings
//!
//! # Example
//!
//! ```
//! use feature_matrix::{MatrixSession, InheritanceStrategy};
//! use matrix_types::RawDataset;
//!
//! let json = r#"{
//!   "VS Code": {
//!     "1.60.0": { "Code Completion": { "releaseType": "ga" } },
//!     "1.70.0": { "Chat": { "releaseType": "ga" },
//!                 "Inline Edit": { "releaseType": "preview" } },
//!     "1.80.0": { "Inline Edit": { "releaseType": "ga" } }
//!   }
//! }"#;
//!
//! let dataset: RawDataset = serde_json::from_str(json).unwrap();
//! let session = MatrixSession::from_dataset(dataset, InheritanceStrategy::Implicit);
//!
//! let latest = session.latest_view();
//! assert_eq!(latest.cell("Inline Edit", "VS Code"), Some("full"));
//! assert!(session.warnings().is_empty());
//! ```

pub mod config;
pub mod error;
pub mod loader;
pub mod normalize;
pub mod pivot;
pub mod session;
pub mod validate;
pub mod version;
pub mod views;

// Re-exports
pub use config::MatrixConfig;
pub use error::{ConfigError, LoadError};
pub use loader::{load_dataset, DatasetSource, DocumentFetcher, SourceFetcher};
pub use normalize::{normalize, InheritanceStrategy, Normalizer};
pub use pivot::{pivot, PivotQuery};
pub use session::{MatrixSession, SessionMeta};
pub use validate::{validate, ValidationReport};
pub use version::compare_versions;
pub use views::ViewKind;
