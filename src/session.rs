//! Loaded dataset plus everything derived from it.
//!
//! A `MatrixSession` is built once and never mutated: the raw document,
//! the normalized facts and the validation warnings are all computed up
//! front. Every query is a pure read, so the session can be shared behind
//! an `Arc` without locking.

use chrono::{DateTime, Utc};
use serde::Serialize;

use matrix_types::{Axis, Fact, PivotFilters, PivotTable, RawDataset, Warning};

use crate::config::MatrixConfig;
use crate::error::LoadError;
use crate::loader::{load_dataset_with, DocumentFetcher, SourceFetcher};
use crate::normalize::{InheritanceStrategy, Normalizer};
use crate::pivot::{distinct_values, filter_facts, PivotQuery};
use crate::validate::{validate, ValidationReport};
use crate::version::sort_versions;
use crate::views;

/// Summary of how the session was built.
#[derive(Debug, Clone, Serialize)]
pub struct SessionMeta {
    /// Where the dataset came from ("inline" when built in memory)
    pub source: String,
    pub loaded_at: DateTime<Utc>,
    pub inheritance: InheritanceStrategy,
    pub ide_count: usize,
    pub fact_count: usize,
    pub warning_count: usize,
}

#[derive(Debug, Clone)]
pub struct MatrixSession {
    dataset: RawDataset,
    facts: Vec<Fact>,
    report: ValidationReport,
    meta: SessionMeta,
}

impl MatrixSession {
    /// Normalize and validate an in-memory dataset.
    pub fn from_dataset(dataset: RawDataset, inheritance: InheritanceStrategy) -> Self {
        Self::build(dataset, inheritance, "inline".to_string())
    }

    /// Load the configured document once and build the session from it.
    pub async fn load(config: &MatrixConfig) -> Result<Self, LoadError> {
        Self::load_with(config, &SourceFetcher::new()).await
    }

    pub async fn load_with(
        config: &MatrixConfig,
        fetcher: &dyn DocumentFetcher,
    ) -> Result<Self, LoadError> {
        let source = config.source()?;
        let dataset = load_dataset_with(fetcher, &source).await?;
        Ok(Self::build(dataset, config.inheritance, source.to_string()))
    }

    fn build(dataset: RawDataset, inheritance: InheritanceStrategy, source: String) -> Self {
        let facts = Normalizer::new(inheritance).normalize(&dataset);
        let report = ValidationReport::new(validate(&dataset));

        for warning in &report.warnings {
            tracing::warn!(
                kind = %warning.kind,
                ide = %warning.ide,
                feature = %warning.feature,
                version = %warning.version,
                "{}",
                warning.message
            );
        }

        let meta = SessionMeta {
            source,
            loaded_at: Utc::now(),
            inheritance,
            ide_count: dataset.ide_count(),
            fact_count: facts.len(),
            warning_count: report.count(),
        };
        tracing::info!(
            source = %meta.source,
            ides = meta.ide_count,
            facts = meta.fact_count,
            warnings = meta.warning_count,
            "feature matrix session ready"
        );

        Self {
            dataset,
            facts,
            report,
            meta,
        }
    }

    pub fn dataset(&self) -> &RawDataset {
        &self.dataset
    }

    pub fn meta(&self) -> &SessionMeta {
        &self.meta
    }

    pub fn all_facts(&self) -> &[Fact] {
        &self.facts
    }

    /// Facts matching the filters, in normalization order.
    pub fn facts(&self, filters: &PivotFilters) -> Vec<&Fact> {
        filter_facts(&self.facts, filters)
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.report.warnings
    }

    pub fn report(&self) -> &ValidationReport {
        &self.report
    }

    /// Every IDE, sorted lexicographically.
    pub fn distinct_ides(&self) -> Vec<String> {
        self.distinct(Axis::Ide)
    }

    /// Every feature across all IDEs, sorted lexicographically.
    pub fn distinct_features(&self) -> Vec<String> {
        self.distinct(Axis::Feature)
    }

    /// Every version across all IDEs, in comparator order.
    pub fn distinct_versions(&self) -> Vec<String> {
        self.distinct(Axis::Version)
    }

    /// Versions declared for `ide`, ascending; empty for unknown IDEs.
    pub fn versions_for_ide(&self, ide: &str) -> Vec<String> {
        let mut versions: Vec<String> = self
            .dataset
            .ide(ide)
            .map(|v| v.keys().cloned().collect())
            .unwrap_or_default();
        sort_versions(&mut versions);
        versions
    }

    pub fn pivot(&self, query: &PivotQuery) -> PivotTable {
        query.run(&self.facts)
    }

    pub fn latest_view(&self) -> PivotTable {
        views::latest_view(&self.facts)
    }

    pub fn ide_view(&self, filters: &PivotFilters) -> PivotTable {
        views::ide_view(&self.facts, filters)
    }

    pub fn release_view(&self, filters: &PivotFilters) -> PivotTable {
        views::release_view(&self.facts, filters.feature.as_deref())
    }

    fn distinct(&self, axis: Axis) -> Vec<String> {
        let all: Vec<&Fact> = self.facts.iter().collect();
        distinct_values(&all, axis)
            .into_iter()
            .map(str::to_string)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pivot::tests::two_ides;
    use matrix_types::ReleaseType::Ga;
    use matrix_types::VersionEntry;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_distinct_queries() {
        let session = MatrixSession::from_dataset(two_ides(), InheritanceStrategy::Implicit);
        assert_eq!(session.distinct_ides(), vec!["JetBrains", "VS Code"]);
        assert_eq!(
            session.distinct_features(),
            vec!["Chat", "Code Completion", "Inline Edit"]
        );
        assert_eq!(session.versions_for_ide("VS Code"), vec!["1.60.0", "1.70.0"]);
        assert_eq!(
            session.distinct_versions(),
            vec!["1.60.0", "1.70.0", "2023", "2024"]
        );
        assert!(session.versions_for_ide("Emacs").is_empty());
    }

    #[test]
    fn test_versions_for_ide_sorted_by_comparator() {
        let dataset = RawDataset::new()
            .with_version("Vim", "1.10.0", VersionEntry::new().declare("A", Ga))
            .with_version("Vim", "1.9.0", VersionEntry::new());
        let session = MatrixSession::from_dataset(dataset, InheritanceStrategy::Implicit);
        assert_eq!(session.versions_for_ide("Vim"), vec!["1.9.0", "1.10.0"]);
    }

    #[test]
    fn test_meta_counts() {
        let session = MatrixSession::from_dataset(two_ides(), InheritanceStrategy::Implicit);
        let meta = session.meta();
        assert_eq!(meta.source, "inline");
        assert_eq!(meta.ide_count, 2);
        // VS Code: 2 versions x 3 features, JetBrains: 2 versions x 2 features
        assert_eq!(meta.fact_count, 10);
        assert_eq!(meta.warning_count, 0);
    }

    #[test]
    fn test_views_delegate() {
        let session = MatrixSession::from_dataset(two_ides(), InheritanceStrategy::Implicit);
        assert_eq!(session.latest_view().rows.len(), 3);
        assert!(session.ide_view(&PivotFilters::default()).is_empty());
        assert!(session.release_view(&PivotFilters::default()).is_empty());
        let release = session.release_view(&PivotFilters::new().with_feature("Chat"));
        assert_eq!(release.cell("JetBrains", "Preview"), Some("2024"));
        assert_eq!(release.cell("VS Code", "GA"), Some("1.70.0"));
    }

    #[test]
    fn test_facts_filtered() {
        let session = MatrixSession::from_dataset(two_ides(), InheritanceStrategy::Implicit);
        let facts = session.facts(&PivotFilters::new().with_ide("JetBrains").with_version("2024"));
        assert_eq!(facts.len(), 2);
        assert!(facts.iter().all(|f| f.ide == "JetBrains" && f.version == "2024"));
    }
}
