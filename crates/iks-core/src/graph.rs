//! Normalizing user-supplied graph formats into a coupling matrix.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::coupling::CouplingMatrix;
use crate::errors::{ErrorInfo, IksError};

/// A problem graph in one of the accepted input formats.
///
/// - `Mapping`: entries keyed by a spin-label pair `(i, j)`; the value is the
///   coupling between the spins, or the local field when `i == j`. Labels may
///   be arbitrary integers; the resulting matrix orders them ascending.
/// - `Matrix`: a rectangular nested array. A square array is read as a dense
///   coupling matrix over labels `0..n`. An array with exactly three columns
///   whose first two columns hold nonnegative integral values is read as
///   `(i, j, value)` row triples instead; this disambiguation heuristic is
///   inherited behaviour and can misread very small dense systems.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Graph {
    /// Sparse `(i, j) -> value` entries.
    Mapping(Vec<((i64, i64), f64)>),
    /// Dense matrix or row triples, disambiguated by shape and content.
    Matrix(Vec<Vec<f64>>),
}

/// Reads a graph into an upper-triangular coupling matrix plus spin labels.
///
/// `labels[i]` names the spin represented by row `i` of the matrix; entries
/// mentioning the same unordered pair accumulate into one cell.
pub fn read_graph(graph: &Graph) -> Result<(CouplingMatrix, Vec<i64>), IksError> {
    match graph {
        Graph::Mapping(entries) => ising_from_entries(entries.iter().copied()),
        Graph::Matrix(rows) => ising_from_matrix(rows),
    }
}

fn ising_from_matrix(rows: &[Vec<f64>]) -> Result<(CouplingMatrix, Vec<i64>), IksError> {
    let nrows = rows.len();
    if nrows == 0 {
        return Err(format_error("graph contains no entries"));
    }
    let ncols = rows[0].len();
    if rows.iter().any(|row| row.len() != ncols) {
        return Err(format_error("graph rows have inconsistent lengths"));
    }
    if ncols == 3 && has_spin_labels(rows) {
        return ising_from_rows(rows);
    }
    if nrows == ncols {
        let mut matrix = CouplingMatrix::zeros(nrows);
        for (i, row) in rows.iter().enumerate() {
            for (j, &value) in row.iter().enumerate() {
                matrix.fold_upper(i, j, value);
            }
        }
        let labels = (0..nrows as i64).collect();
        return Ok((matrix, labels));
    }
    Err(format_error("unsupported graph shape"))
}

/// True when the first two columns of every row look like spin labels:
/// nonnegative values that are exactly representable as integers.
fn has_spin_labels(rows: &[Vec<f64>]) -> bool {
    rows.iter().all(|row| {
        row[..2]
            .iter()
            .all(|&v| v.is_finite() && v >= 0.0 && v.fract() == 0.0 && v <= i64::MAX as f64)
    })
}

fn ising_from_rows(rows: &[Vec<f64>]) -> Result<(CouplingMatrix, Vec<i64>), IksError> {
    // Duplicate (i, j) rows overwrite earlier ones, as in a keyed mapping.
    let mut entries: BTreeMap<(i64, i64), f64> = BTreeMap::new();
    for row in rows {
        entries.insert((row[0] as i64, row[1] as i64), row[2]);
    }
    ising_from_entries(entries.iter().map(|(&pair, &value)| (pair, value)))
}

fn ising_from_entries(
    entries: impl Iterator<Item = ((i64, i64), f64)> + Clone,
) -> Result<(CouplingMatrix, Vec<i64>), IksError> {
    let mut seen = BTreeSet::new();
    for ((i, j), _) in entries.clone() {
        seen.insert(i);
        seen.insert(j);
    }
    if seen.is_empty() {
        return Err(format_error("graph contains no entries"));
    }
    let labels: Vec<i64> = seen.into_iter().collect();
    let index: BTreeMap<i64, usize> = labels
        .iter()
        .enumerate()
        .map(|(idx, &label)| (label, idx))
        .collect();
    let mut matrix = CouplingMatrix::zeros(labels.len());
    for ((i, j), value) in entries {
        matrix.fold_upper(index[&i], index[&j], value);
    }
    Ok((matrix, labels))
}

fn format_error(message: &str) -> IksError {
    IksError::Format(
        ErrorInfo::new("unsupported-graph-format", message)
            .with_hint("supply a mapping, (i, j, value) rows, or a square matrix"),
    )
}
