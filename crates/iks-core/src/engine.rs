//! Engine contract and the injected observer seams.

use serde::{Deserialize, Serialize};

use crate::errors::IksError;
use crate::qubo::QuboMatrix;
use crate::topk::TopKList;

/// Parameters handed to an enumeration engine for one search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumerationRequest {
    /// log2 of the number of states enumerated per pass.
    pub chunk_exp: u32,
    /// Number of lowest-energy states to keep.
    pub num_states: usize,
}

/// Exhaustive chunked top-K enumeration over `2^n` states.
///
/// Implementations enumerate every state code in `[0, 2^n)` chunk by chunk,
/// reduce each chunk to a bounded top-K list, and fold chunk results through
/// the associative merge in [`TopKList`]. Both backends must return
/// bit-identical energy and code sequences for the same input; ties are
/// always resolved by ascending state code.
pub trait EnumerationEngine {
    /// Short backend identifier ("cpu", "gpu") used in diagnostics.
    fn name(&self) -> &'static str;

    /// Runs the full enumeration and returns the global top-K list.
    ///
    /// `progress` receives the cumulative number of states processed after
    /// each completed chunk, from the orchestrating thread only; the final
    /// invocation reports exactly `2^n`. A failure mid-run aborts the whole
    /// search; there is no partial-result path.
    fn run(
        &self,
        qubo: &QuboMatrix,
        request: &EnumerationRequest,
        progress: &mut dyn ProgressObserver,
    ) -> Result<TopKList, IksError>;
}

/// Observer for per-chunk progress reports.
pub trait ProgressObserver {
    /// Called with the cumulative number of states processed so far.
    fn states_processed(&mut self, count: u64);
}

/// Default observer that ignores every report.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProgress;

impl ProgressObserver for NoopProgress {
    fn states_processed(&mut self, _count: u64) {}
}

/// Structured events emitted while orchestrating a search.
///
/// Replaces ambient logging: the sink is passed into the search call
/// explicitly and defaults to a no-op, so there is no process-wide state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum Diagnostic {
    /// The execution backend chosen for this search.
    MethodSelected {
        /// Backend identifier ("cpu" or "gpu").
        method: String,
        /// Whether the backend was chosen automatically.
        auto: bool,
    },
    /// Bytes-available figure obtained from the memory probe.
    MemoryProbed {
        /// Budget in bytes reported by the probe.
        bytes: u64,
    },
    /// The chunk decomposition selected for this search.
    ChunkPlanned {
        /// Chunk exponent used per enumeration pass.
        chunk_exp: u32,
        /// Number of chunks covering the space.
        num_chunks: u64,
    },
    /// The requested K exceeded what two chunks can supply and was reduced.
    StatesClamped {
        /// Number of states originally requested.
        requested: usize,
        /// Number of states that will actually be kept.
        effective: usize,
    },
}

/// Sink for [`Diagnostic`] events.
pub trait DiagnosticSink {
    /// Records one event.
    fn record(&mut self, diagnostic: &Diagnostic);
}

/// Default sink that discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopDiagnostics;

impl DiagnosticSink for NoopDiagnostics {
    fn record(&mut self, _diagnostic: &Diagnostic) {}
}
