//! Chunk orchestration for the CPU backend.

use iks_core::errors::ErrorInfo;
use iks_core::{
    EnumerationEngine, EnumerationRequest, IksError, ProgressObserver, QuboMatrix, TopKList,
};
use rayon::prelude::*;

use crate::scan::{scan_subrange, FlipTable};

/// States scanned per worker unit; also the re-anchor interval for the
/// incremental energy, which keeps the drift covered by the margin small.
const SUBRANGE_EXP: u32 = 16;

/// CPU enumeration engine backed by a rayon worker pool.
///
/// Each chunk is split into fixed-size sub-ranges scanned independently in
/// Gray order; per-thread bounded lists fold into the chunk list and then
/// into the global list through the associative merge, so the result is
/// independent of thread count and scheduling.
#[derive(Debug, Clone, Copy, Default)]
pub struct CpuEngine {
    threads: usize,
}

impl CpuEngine {
    /// Creates an engine using the default rayon thread count.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an engine with a fixed worker count (0 means default).
    pub fn with_threads(threads: usize) -> Self {
        Self { threads }
    }
}

impl EnumerationEngine for CpuEngine {
    fn name(&self) -> &'static str {
        "cpu"
    }

    fn run(
        &self,
        qubo: &QuboMatrix,
        request: &EnumerationRequest,
        progress: &mut dyn ProgressObserver,
    ) -> Result<TopKList, IksError> {
        let n = qubo.size() as u32;
        if request.chunk_exp > n {
            return Err(IksError::Configuration(
                ErrorInfo::new(
                    "chunk-exceeds-space",
                    "chunk exponent is larger than the system size",
                )
                .with_context("chunk_exp", request.chunk_exp.to_string())
                .with_context("n", n.to_string()),
            ));
        }
        let total = 1u64 << n;
        let chunk_len = 1u64 << request.chunk_exp;
        let num_chunks = total >> request.chunk_exp;
        let sub_len = chunk_len.min(1u64 << SUBRANGE_EXP);
        let subranges_per_chunk = chunk_len / sub_len;

        let flips = FlipTable::new(qubo);
        let margin = qubo.abs_scale() * f64::EPSILON * sub_len as f64 * 16.0;

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.threads)
            .build()
            .map_err(|err| {
                IksError::Resource(ErrorInfo::new("thread-pool", err.to_string()))
            })?;

        let mut global = TopKList::new(request.num_states);
        for chunk_index in 0..num_chunks {
            let base = chunk_index << request.chunk_exp;
            let chunk_list = pool.install(|| {
                (0..subranges_per_chunk)
                    .into_par_iter()
                    .map(|sub| {
                        scan_subrange(
                            qubo,
                            &flips,
                            base,
                            sub * sub_len,
                            sub_len,
                            request.num_states,
                            margin,
                        )
                    })
                    .reduce(
                        || TopKList::new(request.num_states),
                        |mut left, right| {
                            left.merge_from(right);
                            left
                        },
                    )
            });
            global.merge_from(chunk_list);
            progress.states_processed(((chunk_index + 1) << request.chunk_exp).min(total));
        }
        Ok(global)
    }
}
