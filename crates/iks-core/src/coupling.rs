//! Dense coupling matrix for an Ising Hamiltonian.

use serde::{Deserialize, Serialize};

/// Upper-triangular coupling matrix of an Ising system.
///
/// The diagonal entry `(i, i)` holds the local field `h_i` and the entry
/// `(i, j)` with `i < j` holds the coupling `J_ij`. Entries below the
/// diagonal are never written; the normalizer folds every contribution into
/// the upper triangle before a matrix reaches the search core. The matrix is
/// treated as immutable for the lifetime of one search.
///
/// Hamiltonian convention:
/// `H(s) = -sum_i h_i s_i - sum_{i<j} J_ij s_i s_j` with `s_i` in `{+1, -1}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CouplingMatrix {
    size: usize,
    data: Vec<f64>,
}

impl CouplingMatrix {
    /// Creates a zeroed matrix for a system of `size` spins.
    pub fn zeros(size: usize) -> Self {
        Self {
            size,
            data: vec![0.0; size * size],
        }
    }

    /// Number of spins in the system.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns the entry at `(i, j)`.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.size + j]
    }

    /// Accumulates `value` into the upper-triangular cell covering `(i, j)`.
    pub fn fold_upper(&mut self, i: usize, j: usize, value: f64) {
        let (low, high) = if i <= j { (i, j) } else { (j, i) };
        self.data[low * self.size + high] += value;
    }
}
