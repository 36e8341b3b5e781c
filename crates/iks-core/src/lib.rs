#![deny(missing_docs)]

//! Core types and contracts for the IKS exhaustive ground-state search
//! engine: the coupling/QUBO data model, chunk planner, bounded top-K
//! selection, state decoding, graph normalization, and the engine/observer
//! seams shared by the CPU and GPU backends.

/// Coupling matrix data model.
pub mod coupling;
/// State-code decoding into labelled spin assignments.
pub mod decode;
/// Engine contract and injected observer traits.
pub mod engine;
/// Structured error taxonomy.
pub mod errors;
/// Graph input normalization.
pub mod graph;
/// Chunk planning under a memory budget.
pub mod plan;
/// Ising-to-QUBO transform and canonical energy evaluation.
pub mod qubo;
/// Bounded top-K lists and the chunk merger.
pub mod topk;

pub use coupling::CouplingMatrix;
pub use decode::decode_state;
pub use engine::{
    Diagnostic, DiagnosticSink, EnumerationEngine, EnumerationRequest, NoopDiagnostics,
    NoopProgress, ProgressObserver,
};
pub use errors::{ErrorInfo, IksError};
pub use graph::{read_graph, Graph};
pub use plan::{max_chunk_size, plan, ChunkPlan, MemoryProbe, MAX_SPINS};
pub use qubo::{ising_to_qubo, QuboMatrix};
pub use topk::{Candidate, TopKList};
