//! Ising-to-QUBO transform and the canonical energy evaluation.

use serde::{Deserialize, Serialize};

use crate::coupling::CouplingMatrix;

/// Dense quadratic 0/1 objective derived from a [`CouplingMatrix`].
///
/// Only the upper triangle (including the diagonal) is populated. The QUBO
/// energy of a state code, plus the offset returned by [`ising_to_qubo`],
/// equals the Ising Hamiltonian of the decoded spin assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuboMatrix {
    size: usize,
    data: Vec<f64>,
}

impl QuboMatrix {
    /// Number of binary variables.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns the entry at `(i, j)`.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.size + j]
    }

    /// Canonical energy of a state code, before the offset is added back.
    ///
    /// Variable `i` (row `i` of the matrix) occupies bit `size - 1 - i` of
    /// the code, matching the decoder contract: the most significant of the
    /// `n` bits is variable 0. Every accept/evict decision in the engines is
    /// made on values produced by this routine, so both backends agree
    /// bit-for-bit.
    pub fn energy(&self, code: u64) -> f64 {
        let n = self.size;
        let mut energy = 0.0;
        for i in 0..n {
            if (code >> (n - 1 - i)) & 1 == 1 {
                for j in i..n {
                    let x_j = ((code >> (n - 1 - j)) & 1) as f64;
                    energy -= self.data[i * n + j] * x_j;
                }
            }
        }
        energy
    }

    /// Sum of absolute entries; an upper bound on `|energy|` over all states.
    ///
    /// Engines derive conservative prefilter margins from this scale.
    pub fn abs_scale(&self) -> f64 {
        self.data.iter().map(|q| q.abs()).sum()
    }

    /// Read-only view of the row-major entries, for device upload.
    pub fn entries(&self) -> &[f64] {
        &self.data
    }
}

/// Converts an Ising coupling matrix into an equivalent QUBO plus offset.
///
/// The pair loop runs over both orderings of `(i, j)`, so each off-diagonal
/// coupling contributes twice to the offset and to the diagonal terms. The
/// minimum of the QUBO objective shifted by the offset equals the minimum of
/// the Hamiltonian.
pub fn ising_to_qubo(ham: &CouplingMatrix) -> (QuboMatrix, f64) {
    let n = ham.size();
    let mut data = vec![0.0; n * n];
    let mut constant = 0.0;
    for i in 0..n {
        data[i * n + i] = 2.0 * ham.get(i, i);
        constant += ham.get(i, i);
        for j in 0..n {
            if i != j {
                let (low, high) = if i < j { (i, j) } else { (j, i) };
                let coupling = ham.get(low, high);
                constant -= coupling * 0.5;
                data[i * n + i] -= 2.0 * coupling;
                data[low * n + high] += 2.0 * coupling;
            }
        }
    }
    (QuboMatrix { size: n, data }, constant)
}
