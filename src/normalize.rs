//! Inheritance resolver / normalizer.
//!
//! Turns the sparse `IDE -> version -> declarations` document into a dense
//! fact table with exactly one [`Fact`] per (ide, version, feature), where
//! feature ranges over every feature the IDE ever declared.
//!
//! Both input variants are the same fold over versions in ascending order:
//!
//! ```text
//! state(v0) = base(v0)            + declared(v0)
//! state(vN) = base(vN, state(..)) + declared(vN)
//! ```
//!
//! and differ only in `base`, which is chosen by [`InheritanceStrategy`].

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use matrix_types::{Fact, IdeVersions, RawDataset, ReleaseType, SupportLevel, VersionEntry};

use crate::error::ConfigError;
use crate::version::compare_versions;

/// How a version picks up the declarations of earlier versions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InheritanceStrategy {
    /// Every version inherits from its immediate predecessor. `_inherits`
    /// markers are ignored.
    #[default]
    Implicit,
    /// A version starts empty unless its `_inherits` marker names an
    /// earlier version, whose resolved state it then starts from.
    Explicit,
}

impl InheritanceStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Implicit => "implicit",
            Self::Explicit => "explicit",
        }
    }

    /// Starting state for `entry` before its own declarations are merged.
    fn base_state<'a>(
        &self,
        ide: &str,
        version: &str,
        entry: &VersionEntry,
        previous: &ResolvedState<'a>,
        resolved: &HashMap<&'a str, ResolvedState<'a>>,
    ) -> ResolvedState<'a> {
        match self {
            Self::Implicit => previous.clone(),
            Self::Explicit => match entry.inherits.as_deref() {
                None => ResolvedState::new(),
                Some(parent) => match resolved.get(parent) {
                    Some(state) => state.clone(),
                    None => {
                        tracing::warn!(
                            ide = %ide,
                            version = %version,
                            parent = %parent,
                            "inherited version is unknown or not earlier; starting empty"
                        );
                        ResolvedState::new()
                    }
                },
            },
        }
    }
}

impl fmt::Display for InheritanceStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InheritanceStrategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "implicit" => Ok(Self::Implicit),
            "explicit" => Ok(Self::Explicit),
            _ => Err(ConfigError::InvalidValue {
                key: "inheritance",
                value: s.to_string(),
                expected: "implicit or explicit",
            }),
        }
    }
}

/// feature -> governing release type
type ResolvedState<'a> = HashMap<&'a str, ReleaseType>;

/// Resolves a [`RawDataset`] into flat facts.
#[derive(Debug, Clone, Copy, Default)]
pub struct Normalizer {
    strategy: InheritanceStrategy,
}

impl Normalizer {
    pub fn new(strategy: InheritanceStrategy) -> Self {
        Self { strategy }
    }

    pub fn strategy(&self) -> InheritanceStrategy {
        self.strategy
    }

    /// Normalize every IDE.
    ///
    /// Output order: IDEs in source order, then versions ascending, then
    /// features in discovery order.
    pub fn normalize(&self, dataset: &RawDataset) -> Vec<Fact> {
        let mut facts = Vec::new();
        for (ide, versions) in dataset.iter() {
            let before = facts.len();
            self.normalize_ide(ide, versions, &mut facts);
            tracing::debug!(
                ide = %ide,
                versions = versions.len(),
                facts = facts.len() - before,
                strategy = %self.strategy,
                "normalized IDE"
            );
        }
        facts
    }

    fn normalize_ide(&self, ide: &str, versions: &IdeVersions, out: &mut Vec<Fact>) {
        let ordered = ordered_versions(versions);
        let features = feature_union(&ordered);

        let mut previous = ResolvedState::new();
        let mut resolved: HashMap<&str, ResolvedState> = HashMap::new();
        // feature -> first version with an explicit declaration
        let mut introduced: HashMap<&str, &str> = HashMap::new();

        for (version, entry) in ordered {
            let mut state = self
                .strategy
                .base_state(ide, version, entry, &previous, &resolved);

            for (feature, declaration) in &entry.features {
                state.insert(feature.as_str(), declaration.release_type);
                introduced.entry(feature.as_str()).or_insert(version.as_str());
            }

            for feature in &features {
                let release_type = state.get(feature).copied();
                out.push(Fact {
                    ide: ide.to_string(),
                    version: version.clone(),
                    feature: (*feature).to_string(),
                    support: release_type.map_or(SupportLevel::Unsupported, SupportLevel::from),
                    introduced_version: introduced.get(feature).map(|v| (*v).to_string()),
                    release_type,
                });
            }

            if self.strategy == InheritanceStrategy::Explicit {
                resolved.insert(version.as_str(), state.clone());
            }
            previous = state;
        }
    }
}

/// Normalize with the default (implicit) strategy.
pub fn normalize(dataset: &RawDataset) -> Vec<Fact> {
    Normalizer::default().normalize(dataset)
}

/// Versions of one IDE sorted ascending; ties keep source order.
pub(crate) fn ordered_versions(versions: &IdeVersions) -> Vec<(&String, &VersionEntry)> {
    let mut ordered: Vec<_> = versions.iter().collect();
    ordered.sort_by(|(a, _), (b, _)| compare_versions(a, b));
    ordered
}

/// Every feature declared by any version, in discovery order.
pub(crate) fn feature_union<'a>(ordered: &[(&'a String, &'a VersionEntry)]) -> IndexSet<&'a str> {
    ordered
        .iter()
        .flat_map(|(_, entry)| entry.features.keys().map(String::as_str))
        .collect()
}
