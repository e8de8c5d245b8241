//! Validation of the raw dataset.
//!
//! Runs over explicit declarations only, never over normalized facts:
//! 1. Duplicate release types (same type declared in more than one version)
//! 2. Chronology (preview declared after GA)
//! 3. Unresolved `_inherits` markers
//!
//! Findings are advisory. Normalization proceeds with the data as declared.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, HashSet};

use matrix_types::{IdeVersions, RawDataset, ReleaseType, Warning, WarningKind};

use crate::normalize::{feature_union, ordered_versions};
use crate::version::compare_versions;

/// Warnings grouped for display.
#[derive(Debug, Default, Clone)]
pub struct ValidationReport {
    pub warnings: Vec<Warning>,
}

impl ValidationReport {
    pub fn new(warnings: Vec<Warning>) -> Self {
        Self { warnings }
    }

    /// No findings at all.
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn count(&self) -> usize {
        self.warnings.len()
    }

    /// Warnings bucketed by kind, each bucket in emission order.
    pub fn by_kind(&self) -> BTreeMap<WarningKind, Vec<&Warning>> {
        let mut grouped: BTreeMap<WarningKind, Vec<&Warning>> = BTreeMap::new();
        for warning in &self.warnings {
            grouped.entry(warning.kind).or_default().push(warning);
        }
        grouped
    }

    pub fn count_of(&self, kind: WarningKind) -> usize {
        self.warnings.iter().filter(|w| w.kind == kind).count()
    }
}

/// Validate a raw dataset.
///
/// Output is grouped by IDE (source order), then by feature (discovery
/// order); within a feature duplicates come before chronology warnings.
/// Inheritance findings for an IDE follow its feature findings.
///
/// # Example
///
/// ```
/// use feature_matrix::validate::validate;
/// use matrix_types::{RawDataset, ReleaseType, VersionEntry, WarningKind};
///
/// let dataset = RawDataset::new()
///     .with_version("Zed", "0.1", VersionEntry::new().declare("Chat", ReleaseType::Ga))
///     .with_version("Zed", "0.2", VersionEntry::new().declare("Chat", ReleaseType::Preview));
///
/// let warnings = validate(&dataset);
/// assert_eq!(warnings.len(), 1);
/// assert_eq!(warnings[0].kind, WarningKind::Chronology);
/// ```
pub fn validate(dataset: &RawDataset) -> Vec<Warning> {
    let mut warnings = Vec::new();
    for (ide, versions) in dataset.iter() {
        validate_ide(ide, versions, &mut warnings);
    }
    warnings
}

/// Validate and wrap the result for grouped display.
pub fn validate_report(dataset: &RawDataset) -> ValidationReport {
    ValidationReport::new(validate(dataset))
}

fn validate_ide(ide: &str, versions: &IdeVersions, out: &mut Vec<Warning>) {
    let ordered = ordered_versions(versions);

    for feature in feature_union(&ordered) {
        // explicit declaration history for this feature, version ascending
        let history: Vec<(&str, ReleaseType)> = ordered
            .iter()
            .filter_map(|(version, entry)| {
                entry
                    .features
                    .get(feature)
                    .map(|decl| (version.as_str(), decl.release_type))
            })
            .collect();

        check_duplicates(ide, feature, &history, out);
        check_chronology(ide, feature, &history, out);
    }

    check_inheritance(ide, versions, out);
}

fn check_duplicates(
    ide: &str,
    feature: &str,
    history: &[(&str, ReleaseType)],
    out: &mut Vec<Warning>,
) {
    let mut first_seen: HashMap<ReleaseType, &str> = HashMap::new();
    for &(version, release_type) in history {
        match first_seen.get(&release_type) {
            None => {
                first_seen.insert(release_type, version);
            }
            Some(first) => out.push(Warning {
                kind: WarningKind::Duplicate,
                ide: ide.to_string(),
                feature: feature.to_string(),
                version: version.to_string(),
                message: format!(
                    "{ide}: '{feature}' declared {release_type} again at {version} \
                     (first declared {release_type} at {first})"
                ),
            }),
        }
    }
}

fn check_chronology(
    ide: &str,
    feature: &str,
    history: &[(&str, ReleaseType)],
    out: &mut Vec<Warning>,
) {
    let mut ga_at: Option<&str> = None;
    for &(version, release_type) in history {
        match (release_type, ga_at) {
            (ReleaseType::Ga, None) => ga_at = Some(version),
            (ReleaseType::Preview, Some(ga_version)) => out.push(Warning {
                kind: WarningKind::Chronology,
                ide: ide.to_string(),
                feature: feature.to_string(),
                version: version.to_string(),
                message: format!(
                    "{ide}: '{feature}' declared preview at {version} after reaching ga at {ga_version}"
                ),
            }),
            _ => {}
        }
    }
}

fn check_inheritance(ide: &str, versions: &IdeVersions, out: &mut Vec<Warning>) {
    let known: HashSet<&str> = versions.keys().map(String::as_str).collect();

    for (version, entry) in versions {
        let Some(parent) = entry.inherits.as_deref() else {
            continue;
        };
        let problem = if !known.contains(parent) {
            "is not a declared version"
        } else if compare_versions(parent, version) != Ordering::Less {
            "is not earlier than the inheriting version"
        } else {
            continue;
        };
        out.push(Warning {
            kind: WarningKind::UnresolvedInheritance,
            ide: ide.to_string(),
            feature: parent.to_string(),
            version: version.clone(),
            message: format!("{ide}: version {version} inherits from {parent}, which {problem}"),
        });
    }
}
