//! End-to-end tests of the matrix engine through its public API.
//!
//! The fixture mixes semantic and year versions, lists VS Code versions out
//! of order and carries one `_inherits` marker plus a few deliberate data
//! problems for the validator.

use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;

use feature_matrix::config::MatrixConfig;
use feature_matrix::views::{latest_versions, release_view};
use feature_matrix::{
    compare_versions, normalize, pivot, validate, InheritanceStrategy, LoadError, MatrixSession,
    Normalizer, PivotQuery,
};
use matrix_types::{Axis, Fact, PivotFilters, RawDataset, SupportLevel, WarningKind};
use pretty_assertions::assert_eq;

const FIXTURE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/features.json");

fn fixture() -> RawDataset {
    let content = std::fs::read_to_string(FIXTURE).expect("read fixture");
    serde_json::from_str(&content).expect("parse fixture")
}

fn fact<'a>(facts: &'a [Fact], ide: &str, version: &str, feature: &str) -> &'a Fact {
    facts
        .iter()
        .find(|f| f.ide == ide && f.version == version && f.feature == feature)
        .unwrap_or_else(|| panic!("no fact for {ide} {version} {feature}"))
}

#[test]
fn test_introduced_version_fixed_at_first_declaration() {
    let facts = normalize(&fixture());

    let inline = fact(&facts, "VS Code", "1.80.0", "Inline Edit");
    assert_eq!(inline.support, SupportLevel::Full);
    assert_eq!(inline.introduced_version.as_deref(), Some("1.70.0"));

    let chat = fact(&facts, "VS Code", "1.80.0", "Chat");
    assert_eq!(chat.support, SupportLevel::Full);
    assert_eq!(chat.introduced_version.as_deref(), Some("1.70.0"));

    // Not declared yet at the first version
    let early = fact(&facts, "VS Code", "1.60.0", "Chat");
    assert_eq!(early.support, SupportLevel::Unsupported);
    assert_eq!(early.introduced_version, None);
}

#[test]
fn test_every_version_covers_feature_union() {
    let facts = normalize(&fixture());
    assert_eq!(facts.len(), 3 * 3 + 3 * 2);

    let mut union: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    let mut per_version: BTreeMap<(&str, &str), BTreeSet<&str>> = BTreeMap::new();
    for f in &facts {
        union.entry(f.ide.as_str()).or_default().insert(f.feature.as_str());
        let seen = per_version
            .entry((f.ide.as_str(), f.version.as_str()))
            .or_default();
        assert!(seen.insert(f.feature.as_str()), "duplicate fact {f:?}");
    }
    for ((ide, _), features) in &per_version {
        assert_eq!(features, &union[ide]);
    }
}

#[test]
fn test_emission_order() {
    let facts = normalize(&fixture());
    let vs_code_versions: Vec<&str> = facts
        .iter()
        .filter(|f| f.ide == "VS Code" && f.feature == "Chat")
        .map(|f| f.version.as_str())
        .collect();
    assert_eq!(vs_code_versions, vec!["1.60.0", "1.70.0", "1.80.0"]);
    // IDEs in source order
    assert_eq!(facts.first().map(|f| f.ide.as_str()), Some("VS Code"));
    assert_eq!(facts.last().map(|f| f.ide.as_str()), Some("JetBrains"));
}

#[test]
fn test_explicit_inheritance() {
    let facts = Normalizer::new(InheritanceStrategy::Explicit).normalize(&fixture());

    // No markers in VS Code: every version stands alone
    assert_eq!(
        fact(&facts, "VS Code", "1.80.0", "Chat").support,
        SupportLevel::Unsupported
    );
    assert_eq!(
        fact(&facts, "VS Code", "1.80.0", "Inline Edit").support,
        SupportLevel::Full
    );
    // 2024 inherits 2023
    assert_eq!(
        fact(&facts, "JetBrains", "2024", "Code Completion").support,
        SupportLevel::Full
    );
    assert_eq!(fact(&facts, "JetBrains", "2024", "Chat").support, SupportLevel::Full);
    assert_eq!(
        fact(&facts, "JetBrains", "2025", "Chat").support,
        SupportLevel::Partial
    );
}

#[test]
fn test_validation_warnings() {
    let warnings = validate(&fixture());
    let summary: Vec<(WarningKind, &str, &str)> = warnings
        .iter()
        .map(|w| (w.kind, w.feature.as_str(), w.version.as_str()))
        .collect();
    assert_eq!(
        summary,
        vec![
            (WarningKind::Duplicate, "Code Completion", "2025"),
            (WarningKind::Duplicate, "Chat", "2025"),
            (WarningKind::Chronology, "Chat", "2025"),
        ]
    );
    assert!(warnings.iter().all(|w| w.ide == "JetBrains"));
}

#[test]
fn test_pivot_shape_and_transpose() {
    let facts = normalize(&fixture());
    let query = PivotQuery::new(Axis::Feature, Axis::Ide);
    let table = query.run(&facts);

    assert_eq!(table.headers, vec!["Feature", "JetBrains", "VS Code"]);
    assert_eq!(table.rows.len(), 3);
    // JetBrains never declares Inline Edit
    assert_eq!(table.cell("Inline Edit", "JetBrains"), Some("none"));
    // Unconstrained version: the greatest one wins
    assert_eq!(table.cell("Chat", "JetBrains"), Some("partial"));

    let swapped = query.transposed().run(&facts);
    assert_eq!(swapped.headers[0], "IDE");
    for row in &table.rows {
        for (column, value) in table.columns().iter().zip(&row.values) {
            assert_eq!(swapped.cell(column, &row.name), Some(value.as_str()));
        }
    }
}

#[test]
fn test_pivot_filters_and_same_axis() {
    let facts = normalize(&fixture());
    let filters = PivotFilters::new().with_ide("VS Code");
    let history = pivot(&facts, Axis::Feature, Axis::Version, &filters);
    assert_eq!(history.headers, vec!["Feature", "1.60.0", "1.70.0", "1.80.0"]);
    assert_eq!(history.cell("Inline Edit", "1.70.0"), Some("partial"));

    assert!(pivot(&facts, Axis::Ide, Axis::Ide, &PivotFilters::default()).is_empty());
}

#[test]
fn test_latest_uses_comparator_max() {
    let dataset: RawDataset = serde_json::from_str(
        r#"{ "Vim": {
              "1.9.0":  { "Chat": { "releaseType": "ga" } },
              "1.10.0": { "Chat": { "releaseType": "preview" } }
        } }"#,
    )
    .unwrap();
    let facts = normalize(&dataset);
    assert_eq!(latest_versions(&facts)["Vim"], "1.10.0");
    assert_eq!(
        compare_versions("1.10.0", "1.9.0"),
        std::cmp::Ordering::Greater
    );
}

#[test]
fn test_release_view() {
    let facts = normalize(&fixture());
    let table = release_view(&facts, Some("Chat"));
    assert_eq!(table.headers, vec!["IDE", "Preview", "GA"]);
    assert_eq!(table.cell("JetBrains", "Preview"), Some("2023"));
    assert_eq!(table.cell("JetBrains", "GA"), Some("2024"));
    assert_eq!(table.cell("VS Code", "Preview"), Some("N/A"));
    assert_eq!(table.cell("VS Code", "GA"), Some("1.70.0"));
    assert!(release_view(&facts, None).is_empty());
}

#[tokio::test]
async fn test_session_load_from_file() {
    let config = MatrixConfig {
        dataset: FIXTURE.to_string(),
        inheritance: InheritanceStrategy::Implicit,
    };
    let session = MatrixSession::load(&config).await.expect("load fixture");

    assert_eq!(session.meta().ide_count, 2);
    assert_eq!(session.meta().warning_count, 3);
    assert_eq!(session.distinct_ides(), vec!["JetBrains", "VS Code"]);
    assert_eq!(session.versions_for_ide("VS Code"), vec!["1.60.0", "1.70.0", "1.80.0"]);

    let latest = session.latest_view();
    assert_eq!(latest.cell("Inline Edit", "VS Code"), Some("full"));
    assert_eq!(latest.cell("Chat", "JetBrains"), Some("partial"));
}

#[tokio::test]
async fn test_session_load_failures() {
    let missing = MatrixConfig {
        dataset: "/nonexistent/features.json".to_string(),
        ..MatrixConfig::default()
    };
    let err = MatrixSession::load(&missing).await.unwrap_err();
    assert!(matches!(err, LoadError::Io { .. }));

    let mut broken = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    broken.write_all(b"{ \"VS Code\": [").unwrap();
    let config = MatrixConfig {
        dataset: broken.path().display().to_string(),
        ..MatrixConfig::default()
    };
    let err = MatrixSession::load(&config).await.unwrap_err();
    assert!(err.is_parse_error());
    assert_eq!(err.code(), "PARSE");
}
