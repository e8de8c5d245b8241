//! Two-axis pivot over the flat fact table.
//!
//! Rows and columns are the sorted distinct values of the chosen axes in the
//! filtered fact set, so output order never depends on input order. Cells
//! hold the support level of the matching fact, or `none` when nothing
//! matches.

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

use matrix_types::{Axis, Fact, PivotFilters, PivotRow, PivotTable, SupportLevel};

use crate::version::compare_versions;

/// A pivot request: row axis, column axis and equality filters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PivotQuery {
    pub rows: Axis,
    pub columns: Axis,
    pub filters: PivotFilters,
}

impl PivotQuery {
    pub fn new(rows: Axis, columns: Axis) -> Self {
        Self {
            rows,
            columns,
            filters: PivotFilters::default(),
        }
    }

    pub fn with_filters(mut self, filters: PivotFilters) -> Self {
        self.filters = filters;
        self
    }

    /// Same query with the axes swapped.
    pub fn transposed(&self) -> Self {
        Self {
            rows: self.columns,
            columns: self.rows,
            filters: self.filters.clone(),
        }
    }

    pub fn run(&self, facts: &[Fact]) -> PivotTable {
        pivot(facts, self.rows, self.columns, &self.filters)
    }
}

/// Cross-tabulate `facts` into a `row_axis` × `column_axis` grid.
///
/// When the axis not on the grid is left unconstrained several facts can
/// land in one cell; the one with the greatest version wins, ties broken by
/// the smallest (ide, feature, version). Identical axes yield the empty
/// table.
pub fn pivot(
    facts: &[Fact],
    row_axis: Axis,
    column_axis: Axis,
    filters: &PivotFilters,
) -> PivotTable {
    if row_axis == column_axis {
        tracing::debug!(axis = %row_axis, "pivot requested on a single axis");
        return PivotTable::empty();
    }

    let filtered = filter_facts(facts, filters);
    let row_values = distinct_values(&filtered, row_axis);
    let column_values = distinct_values(&filtered, column_axis);

    let mut cells: HashMap<(&str, &str), &Fact> = HashMap::new();
    for &fact in &filtered {
        let key = (axis_value(fact, row_axis), axis_value(fact, column_axis));
        let replace = cells
            .get(&key)
            .map_or(true, |current| supersedes(fact, current));
        if replace {
            cells.insert(key, fact);
        }
    }

    let mut headers = Vec::with_capacity(column_values.len() + 1);
    headers.push(row_axis.label().to_string());
    headers.extend(column_values.iter().map(|c| c.to_string()));

    let rows = row_values
        .iter()
        .map(|row| PivotRow {
            name: row.to_string(),
            values: column_values
                .iter()
                .map(|column| {
                    cells
                        .get(&(*row, *column))
                        .map_or(SupportLevel::Unsupported, |fact| fact.support)
                        .as_str()
                        .to_string()
                })
                .collect(),
        })
        .collect();

    PivotTable { headers, rows }
}

/// Facts matching every provided equality constraint.
pub fn filter_facts<'a>(facts: &'a [Fact], filters: &PivotFilters) -> Vec<&'a Fact> {
    facts
        .iter()
        .filter(|fact| {
            Axis::ALL.iter().all(|&axis| {
                filters
                    .get(axis)
                    .map_or(true, |wanted| axis_value(fact, axis) == wanted)
            })
        })
        .collect()
}

/// Value of `fact` on `axis`.
pub fn axis_value(fact: &Fact, axis: Axis) -> &str {
    match axis {
        Axis::Ide => &fact.ide,
        Axis::Version => &fact.version,
        Axis::Feature => &fact.feature,
    }
}

/// Sorted distinct values on `axis`: version order for versions,
/// lexicographic otherwise.
pub fn distinct_values<'a>(facts: &[&'a Fact], axis: Axis) -> Vec<&'a str> {
    let set: BTreeSet<&'a str> = facts.iter().map(|&fact| axis_value(fact, axis)).collect();
    let mut values: Vec<&str> = set.into_iter().collect();
    if axis == Axis::Version {
        values.sort_by(|a, b| compare_versions(a, b));
    }
    values
}

/// Whether `candidate` should replace `current` in a shared cell.
fn supersedes(candidate: &Fact, current: &Fact) -> bool {
    match compare_versions(&candidate.version, &current.version) {
        Ordering::Greater => true,
        Ordering::Less => false,
        Ordering::Equal => {
            (&candidate.ide, &candidate.feature, &candidate.version)
                < (&current.ide, &current.feature, &current.version)
        }
    }
}
