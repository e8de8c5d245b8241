//! Derived views built on top of [`pivot`](crate::pivot::pivot).
//!
//! | View       | Rows    | Columns        | Required filter |
//! |------------|---------|----------------|-----------------|
//! | `latest`   | feature | ide            | -               |
//! | `ide`      | feature | version        | `ide`           |
//! | `feature`  | ide     | Preview / GA   | `feature`       |
//! | `pivot`    | any     | any            | -               |
//!
//! Views that lack their required filter return the empty table.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;

use matrix_types::{
    Axis, Fact, PivotFilters, PivotRow, PivotTable, ReleaseType, NOT_AVAILABLE,
};

use crate::pivot::pivot;
use crate::version::compare_versions;

/// The tabs a presentation layer can switch between.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ViewKind {
    /// Latest version of every IDE, feature × IDE
    #[default]
    Latest,
    /// One IDE's history, feature × version
    Ide,
    /// Preview / GA version per IDE for one feature
    Feature,
    /// Free pivot with caller-chosen axes
    Pivot,
}

impl ViewKind {
    pub const ALL: [ViewKind; 4] = [
        ViewKind::Latest,
        ViewKind::Ide,
        ViewKind::Feature,
        ViewKind::Pivot,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Latest => "latest",
            Self::Ide => "ide",
            Self::Feature => "feature",
            Self::Pivot => "pivot",
        }
    }

    /// Tab caption
    pub fn title(&self) -> &'static str {
        match self {
            Self::Latest => "Latest by IDE",
            Self::Ide => "Features by IDE",
            Self::Feature => "IDEs by Feature",
            Self::Pivot => "Full Pivot",
        }
    }
}

impl fmt::Display for ViewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViewKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "latest" => Ok(Self::Latest),
            "ide" => Ok(Self::Ide),
            "feature" => Ok(Self::Feature),
            "pivot" => Ok(Self::Pivot),
            other => Err(format!("unknown view '{other}'")),
        }
    }
}

/// Each IDE's greatest version by [`compare_versions`].
pub fn latest_versions(facts: &[Fact]) -> BTreeMap<&str, &str> {
    let mut latest: BTreeMap<&str, &str> = BTreeMap::new();
    for fact in facts {
        latest
            .entry(fact.ide.as_str())
            .and_modify(|current| {
                if compare_versions(&fact.version, current) == Ordering::Greater {
                    *current = fact.version.as_str();
                }
            })
            .or_insert(fact.version.as_str());
    }
    latest
}

/// Feature × IDE matrix restricted to every IDE's latest version.
pub fn latest_view(facts: &[Fact]) -> PivotTable {
    let latest = latest_versions(facts);
    let restricted: Vec<Fact> = facts
        .iter()
        .filter(|fact| latest.get(fact.ide.as_str()) == Some(&fact.version.as_str()))
        .cloned()
        .collect();
    pivot(&restricted, Axis::Feature, Axis::Ide, &PivotFilters::default())
}

/// Feature × version history of the IDE named in `filters`.
///
/// `filters.feature` and `filters.version` narrow the table further.
pub fn ide_view(facts: &[Fact], filters: &PivotFilters) -> PivotTable {
    if filters.ide.as_deref().map_or(true, str::is_empty) {
        return PivotTable::empty();
    }
    pivot(facts, Axis::Feature, Axis::Version, filters)
}

/// For one feature: earliest preview and earliest GA version per IDE.
///
/// Every IDE in the fact table gets a row; a missing stage reads
/// [`NOT_AVAILABLE`].
pub fn release_view(facts: &[Fact], feature: Option<&str>) -> PivotTable {
    let Some(feature) = feature.filter(|f| !f.is_empty()) else {
        return PivotTable::empty();
    };

    let mut ides: Vec<&str> = facts
        .iter()
        .map(|fact| fact.ide.as_str())
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    ides.sort_unstable();

    let rows = ides
        .into_iter()
        .map(|ide| {
            let stage = |release_type| {
                earliest_release(facts, ide, feature, release_type)
                    .unwrap_or(NOT_AVAILABLE)
                    .to_string()
            };
            PivotRow {
                name: ide.to_string(),
                values: vec![stage(ReleaseType::Preview), stage(ReleaseType::Ga)],
            }
        })
        .collect();

    PivotTable {
        headers: vec!["IDE".to_string(), "Preview".to_string(), "GA".to_string()],
        rows,
    }
}

/// Earliest version at which `ide` supports `feature` with `release_type`.
pub fn earliest_release<'a>(
    facts: &'a [Fact],
    ide: &str,
    feature: &str,
    release_type: ReleaseType,
) -> Option<&'a str> {
    facts
        .iter()
        .filter(|fact| {
            fact.ide == ide
                && fact.feature == feature
                && fact.support.is_supported()
                && fact.release_type == Some(release_type)
        })
        .map(|fact| fact.version.as_str())
        .min_by(|a, b| compare_versions(a, b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;
    use crate::pivot::tests::two_ides;
    use matrix_types::ReleaseType::{Ga, Preview};
    use matrix_types::{RawDataset, VersionEntry};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_latest_uses_comparator_max() {
        let dataset = RawDataset::new()
            .with_version("Vim", "1.9.0", VersionEntry::new().declare("A", Ga))
            .with_version("Vim", "1.10.0", VersionEntry::new().declare("A", Preview));
        let facts = normalize(&dataset);

        assert_eq!(latest_versions(&facts)["Vim"], "1.10.0");
        let table = latest_view(&facts);
        assert_eq!(table.headers, vec!["Feature", "Vim"]);
        assert_eq!(table.cell("A", "Vim"), Some("partial"));
    }

    #[test]
    fn test_latest_view_across_ides() {
        let facts = normalize(&two_ides());
        let table = latest_view(&facts);

        assert_eq!(table.headers, vec!["Feature", "JetBrains", "VS Code"]);
        assert_eq!(table.cell("Code Completion", "VS Code"), Some("full"));
        assert_eq!(table.cell("Inline Edit", "VS Code"), Some("partial"));
        assert_eq!(table.cell("Chat", "JetBrains"), Some("partial"));
        assert_eq!(table.cell("Inline Edit", "JetBrains"), Some("none"));
    }

    #[test]
    fn test_ide_view_requires_ide() {
        let facts = normalize(&two_ides());
        assert!(ide_view(&facts, &PivotFilters::default()).is_empty());
        assert!(ide_view(&facts, &PivotFilters::new().with_ide("")).is_empty());

        let table = ide_view(&facts, &PivotFilters::new().with_ide("VS Code"));
        assert_eq!(table.headers, vec!["Feature", "1.60.0", "1.70.0"]);
        assert_eq!(table.cell("Chat", "1.60.0"), Some("none"));
        assert_eq!(table.cell("Chat", "1.70.0"), Some("full"));
    }

    #[test]
    fn test_release_view() {
        let dataset = RawDataset::new()
            .with_version("VS Code", "1.70.0", VersionEntry::new().declare("Inline Edit", Preview))
            .with_version("VS Code", "1.75.0", VersionEntry::new())
            .with_version("VS Code", "1.80.0", VersionEntry::new().declare("Inline Edit", Ga))
            .with_version("JetBrains", "2024", VersionEntry::new().declare("Chat", Ga));
        let facts = normalize(&dataset);
        let table = release_view(&facts, Some("Inline Edit"));

        assert_eq!(table.headers, vec!["IDE", "Preview", "GA"]);
        assert_eq!(
            table.rows,
            vec![
                PivotRow {
                    name: "JetBrains".into(),
                    values: vec![NOT_AVAILABLE.into(), NOT_AVAILABLE.into()],
                },
                PivotRow {
                    name: "VS Code".into(),
                    values: vec!["1.70.0".into(), "1.80.0".into()],
                },
            ]
        );
    }

    #[test]
    fn test_release_view_requires_feature() {
        let facts = normalize(&two_ides());
        assert!(release_view(&facts, None).is_empty());
        assert!(release_view(&facts, Some("")).is_empty());
    }

    #[test]
    fn test_earliest_release_uses_version_order() {
        let dataset = RawDataset::new()
            .with_version("Vim", "1.10.0", VersionEntry::new().declare("A", Ga))
            .with_version("Vim", "1.9.0", VersionEntry::new().declare("A", Ga));
        let facts = normalize(&dataset);
        assert_eq!(earliest_release(&facts, "Vim", "A", Ga), Some("1.9.0"));
        assert_eq!(earliest_release(&facts, "Vim", "A", Preview), None);
    }

    #[test]
    fn test_view_kind_parse() {
        assert_eq!("Feature".parse::<ViewKind>(), Ok(ViewKind::Feature));
        assert!("language".parse::<ViewKind>().is_err());
        assert_eq!(ViewKind::default(), ViewKind::Latest);
    }
}
