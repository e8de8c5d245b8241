//! Matrix Types - Level 1 Foundation Types
//!
//! Pure data structures shared by the normalization engine and the web
//! presentation layer. Nothing here knows how facts are derived; it only
//! defines what they look like on the wire.
//!
//! ## Architecture Level: LEVEL 1 (Foundation)
//!
//! This crate depends on no other workspace crate. The engine
//! (`feature-matrix`) and the web server (`feature-matrix-web`) both build
//! on it.
//!
//! ## Contents
//!
//! - Raw input document: `RawDataset`, `VersionEntry`, `FeatureDeclaration`
//! - Resolved output: `Fact`, `SupportLevel`
//! - Validation output: `Warning`, `WarningKind`
//! - View output: `PivotTable`, `PivotRow`, `Axis`, `PivotFilters`
//!
//! ## Rules
//!
//! 1. **NO BUSINESS LOGIC** - only data structures, constructors and accessors
//! 2. **NO WORKSPACE DEPENDENCIES**
//! 3. **SERIALIZABLE** - every type round-trips through serde

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Sentinel shown when a lookup view has no matching version.
pub const NOT_AVAILABLE: &str = "N/A";

/// Marker key inside a version entry naming the version it inherits from.
pub const INHERITS_KEY: &str = "_inherits";

// ============================================================================
// RAW INPUT DOCUMENT
// ============================================================================

/// Release stage of a declared feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReleaseType {
    /// Beta / partial availability
    #[serde(alias = "Preview", alias = "PREVIEW")]
    Preview,
    /// General availability
    #[serde(alias = "GA", alias = "Ga")]
    Ga,
}

impl ReleaseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReleaseType::Preview => "preview",
            ReleaseType::Ga => "ga",
        }
    }
}

impl fmt::Display for ReleaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single feature declaration inside one version entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureDeclaration {
    pub release_type: ReleaseType,
}

impl FeatureDeclaration {
    pub fn new(release_type: ReleaseType) -> Self {
        Self { release_type }
    }

    pub fn preview() -> Self {
        Self::new(ReleaseType::Preview)
    }

    pub fn ga() -> Self {
        Self::new(ReleaseType::Ga)
    }
}

/// Features declared at one version of one IDE.
///
/// On the wire this is a flat object keyed by feature name; the optional
/// `_inherits` key names a parent version and is only honoured by the
/// explicit inheritance strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionEntry {
    /// Parent version named by the `_inherits` marker
    #[serde(rename = "_inherits", default, skip_serializing_if = "Option::is_none")]
    pub inherits: Option<String>,
    /// Explicit declarations, in source order
    #[serde(flatten)]
    pub features: IndexMap<String, FeatureDeclaration>,
}

impl VersionEntry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a declaration (builder style)
    pub fn declare(mut self, feature: impl Into<String>, release_type: ReleaseType) -> Self {
        self.features
            .insert(feature.into(), FeatureDeclaration::new(release_type));
        self
    }

    /// Set the `_inherits` marker (builder style)
    pub fn inheriting(mut self, parent: impl Into<String>) -> Self {
        self.inherits = Some(parent.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// Version history of a single IDE: version identifier -> entry.
pub type IdeVersions = IndexMap<String, VersionEntry>;

/// The raw sparse document: IDE -> version -> entry.
///
/// Source order of IDEs and versions is preserved so that validation output
/// can be grouped in the order the document was written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawDataset {
    pub ides: IndexMap<String, IdeVersions>,
}

impl RawDataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a version entry for an IDE (builder style)
    pub fn with_version(
        mut self,
        ide: impl Into<String>,
        version: impl Into<String>,
        entry: VersionEntry,
    ) -> Self {
        self.ides
            .entry(ide.into())
            .or_default()
            .insert(version.into(), entry);
        self
    }

    pub fn ide(&self, name: &str) -> Option<&IdeVersions> {
        self.ides.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &IdeVersions)> {
        self.ides.iter()
    }

    pub fn ide_count(&self) -> usize {
        self.ides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ides.is_empty()
    }
}

// ============================================================================
// RESOLVED FACTS
// ============================================================================

/// Derived support level of a feature at a version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SupportLevel {
    /// No declaration in effect
    #[serde(rename = "none")]
    Unsupported,
    /// Governing declaration is `preview`
    Partial,
    /// Governing declaration is `ga`
    Full,
}

impl SupportLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SupportLevel::Unsupported => "none",
            SupportLevel::Partial => "partial",
            SupportLevel::Full => "full",
        }
    }

    /// Parse the wire string back into a level
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "none" => Some(SupportLevel::Unsupported),
            "partial" => Some(SupportLevel::Partial),
            "full" => Some(SupportLevel::Full),
            _ => None,
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, SupportLevel::Unsupported)
    }
}

impl From<ReleaseType> for SupportLevel {
    fn from(release_type: ReleaseType) -> Self {
        match release_type {
            ReleaseType::Preview => SupportLevel::Partial,
            ReleaseType::Ga => SupportLevel::Full,
        }
    }
}

impl fmt::Display for SupportLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One resolved (ide, version, feature) support record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fact {
    pub ide: String,
    pub version: String,
    pub feature: String,
    pub support: SupportLevel,
    /// First version at which the feature was ever declared for this IDE
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub introduced_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_type: Option<ReleaseType>,
}

// ============================================================================
// VALIDATION WARNINGS
// ============================================================================

/// Category of a validation warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WarningKind {
    /// Same release type declared in more than one version
    Duplicate,
    /// Preview declared after GA
    Chronology,
    /// `_inherits` marker names a missing or later version
    UnresolvedInheritance,
}

impl WarningKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            WarningKind::Duplicate => "duplicate",
            WarningKind::Chronology => "chronology",
            WarningKind::UnresolvedInheritance => "unresolved-inheritance",
        }
    }
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Advisory validation finding. Never blocks normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warning {
    pub kind: WarningKind,
    pub ide: String,
    pub feature: String,
    /// Version of the offending entry
    pub version: String,
    /// Human-readable description
    pub message: String,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}

// ============================================================================
// PIVOT VIEWS
// ============================================================================

/// Dimension of the fact table usable as a pivot axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Ide,
    Version,
    Feature,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::Ide, Axis::Version, Axis::Feature];

    pub fn as_str(&self) -> &'static str {
        match self {
            Axis::Ide => "ide",
            Axis::Version => "version",
            Axis::Feature => "feature",
        }
    }

    /// Header label for the row-name column
    pub fn label(&self) -> &'static str {
        match self {
            Axis::Ide => "IDE",
            Axis::Version => "Version",
            Axis::Feature => "Feature",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown axis name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown pivot axis '{0}' (expected ide, version or feature)")]
pub struct AxisParseError(pub String);

impl FromStr for Axis {
    type Err = AxisParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ide" => Ok(Axis::Ide),
            "version" => Ok(Axis::Version),
            "feature" => Ok(Axis::Feature),
            _ => Err(AxisParseError(s.to_string())),
        }
    }
}

/// Optional equality constraints applied before pivoting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PivotFilters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ide: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature: Option<String>,
}

impl PivotFilters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ide(mut self, ide: impl Into<String>) -> Self {
        self.ide = Some(ide.into());
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_feature(mut self, feature: impl Into<String>) -> Self {
        self.feature = Some(feature.into());
        self
    }

    /// Constraint on the given axis, if any
    pub fn get(&self, axis: Axis) -> Option<&str> {
        match axis {
            Axis::Ide => self.ide.as_deref(),
            Axis::Version => self.version.as_deref(),
            Axis::Feature => self.feature.as_deref(),
        }
    }
}

/// One row of a pivot table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PivotRow {
    pub name: String,
    pub values: Vec<String>,
}

/// Two-axis grid ready for rendering.
///
/// `headers[0]` labels the row-name column; the remaining headers name the
/// value columns in order. An empty table (no headers, no rows) is the
/// sentinel for "not enough input to build this view".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PivotTable {
    pub headers: Vec<String>,
    pub rows: Vec<PivotRow>,
}

impl PivotTable {
    /// The empty sentinel
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty() && self.rows.is_empty()
    }

    /// Value column labels (headers without the row-label header)
    pub fn columns(&self) -> &[String] {
        self.headers.get(1..).unwrap_or(&[])
    }

    pub fn row(&self, name: &str) -> Option<&PivotRow> {
        self.rows.iter().find(|r| r.name == name)
    }

    /// Cell lookup by row name and column label
    pub fn cell(&self, row: &str, column: &str) -> Option<&str> {
        let idx = self.columns().iter().position(|c| c == column)?;
        self.row(row)?.values.get(idx).map(String::as_str)
    }
}
