//! Gray-order incremental scanning of a sub-range of state codes.

use iks_core::{Candidate, QuboMatrix, TopKList};

/// Precomputed single-bit-flip deltas for the quadratic form.
///
/// `rows[v * n + j]` holds the symmetrized neighbour weight
/// `Q[min(v,j), max(v,j)]` for `j != v`, and `diag[v]` holds `Q[v, v]`.
/// Built once per run and shared read-only across worker threads.
pub(crate) struct FlipTable {
    n: usize,
    rows: Vec<f64>,
    diag: Vec<f64>,
}

impl FlipTable {
    pub(crate) fn new(qubo: &QuboMatrix) -> Self {
        let n = qubo.size();
        let mut rows = vec![0.0; n * n];
        let mut diag = vec![0.0; n];
        for v in 0..n {
            diag[v] = qubo.get(v, v);
            for j in 0..n {
                if j != v {
                    let (low, high) = if v < j { (v, j) } else { (j, v) };
                    rows[v * n + j] = qubo.get(low, high);
                }
            }
        }
        Self { n, rows, diag }
    }

    /// Energy change caused by the toggle of variable `v`, evaluated against
    /// the code after the toggle.
    fn toggle_delta(&self, code_after: u64, v: usize) -> f64 {
        let n = self.n;
        let mut acc = self.diag[v];
        for j in 0..n {
            if j != v && (code_after >> (n - 1 - j)) & 1 == 1 {
                acc += self.rows[v * n + j];
            }
        }
        // Setting x_v contributes -acc to the energy; clearing it undoes it.
        if (code_after >> (n - 1 - v)) & 1 == 1 {
            -acc
        } else {
            acc
        }
    }
}

fn gray(k: u64) -> u64 {
    k ^ (k >> 1)
}

/// Scans enumeration indices `[start, start + len)` of one chunk.
///
/// Index `k` maps to state code `chunk_base | gray(k)`, so consecutive steps
/// differ by a single bit flip and the sub-range still covers exactly `len`
/// distinct codes of the chunk. The running energy is a prefilter only:
/// every admissible state is rescored with the canonical evaluation before
/// entering the local list, keeping selection decisions identical across
/// traversal orders and backends. `margin` must bound the drift of the
/// running sum over `len` steps.
pub(crate) fn scan_subrange(
    qubo: &QuboMatrix,
    flips: &FlipTable,
    chunk_base: u64,
    start: u64,
    len: u64,
    num_states: usize,
    margin: f64,
) -> TopKList {
    let n = qubo.size();
    let mut local = TopKList::new(num_states);
    let mut k = start;
    let mut code = chunk_base | gray(k);
    let mut running = qubo.energy(code);
    for step in 0..len {
        let admissible = match local.admission_bound() {
            None => true,
            Some(worst) => running <= worst.energy + margin,
        };
        if admissible {
            local.insert(Candidate {
                energy: qubo.energy(code),
                code,
            });
        }
        if step + 1 == len {
            break;
        }
        k += 1;
        let bit = k.trailing_zeros();
        code ^= 1u64 << bit;
        running += flips.toggle_delta(code, n - 1 - bit as usize);
    }
    local
}
