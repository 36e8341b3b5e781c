#![deny(missing_docs)]

//! Orchestration layer for the IKS exhaustive ground-state search.
//!
//! [`search`] is the public entry point: it normalizes the input graph,
//! transforms it to QUBO form, resolves the execution backend, plans the
//! chunk decomposition against a memory budget, runs the enumeration, and
//! decodes the retained states back into labelled spin assignments.

mod config;
mod probe;

use iks_core::errors::ErrorInfo;
use iks_core::{
    decode_state, ising_to_qubo, plan, read_graph, Diagnostic, DiagnosticSink, EnumerationEngine,
    EnumerationRequest, MemoryProbe, NoopDiagnostics, NoopProgress, ProgressObserver,
};
use iks_cpu::CpuEngine;
use iks_gpu::GpuEngine;

pub use config::{Method, SearchOptions, SearchResult};
pub use iks_core::{Graph, IksError, MAX_SPINS};
pub use probe::{FixedMemoryProbe, SystemMemoryProbe};

/// Observer seams injected into [`search_with`].
pub struct SearchHooks<'a> {
    /// Receives cumulative per-chunk progress reports.
    pub progress: &'a mut dyn ProgressObserver,
    /// Receives structured orchestration events.
    pub diagnostics: &'a mut dyn DiagnosticSink,
}

/// Runs a search with no observers attached.
pub fn search(graph: &Graph, options: &SearchOptions) -> Result<SearchResult, IksError> {
    let mut progress = NoopProgress;
    let mut diagnostics = NoopDiagnostics;
    search_with(
        graph,
        options,
        &mut SearchHooks {
            progress: &mut progress,
            diagnostics: &mut diagnostics,
        },
    )
}

/// Runs a search, reporting progress and diagnostics through `hooks`.
pub fn search_with(
    graph: &Graph,
    options: &SearchOptions,
    hooks: &mut SearchHooks<'_>,
) -> Result<SearchResult, IksError> {
    let (couplings, labels) = read_graph(graph)?;
    let n = couplings.size();
    if n > MAX_SPINS as usize {
        return Err(IksError::Configuration(
            ErrorInfo::new("system-too-large", "system exceeds the supported spin count")
                .with_context("spins", n.to_string())
                .with_context("max_spins", MAX_SPINS.to_string()),
        ));
    }
    let (qubo, offset) = ising_to_qubo(&couplings);

    let (engine, budget) = resolve_backend(options, hooks.diagnostics)?;
    hooks
        .diagnostics
        .record(&Diagnostic::MemoryProbed { bytes: budget });

    let chunk_plan = plan(budget, n as u32, options.num_states, options.chunk_exponent)?;
    hooks.diagnostics.record(&Diagnostic::ChunkPlanned {
        chunk_exp: chunk_plan.chunk_exp,
        num_chunks: chunk_plan.num_chunks(n as u32),
    });
    if chunk_plan.states_clamped() {
        hooks.diagnostics.record(&Diagnostic::StatesClamped {
            requested: chunk_plan.requested_states,
            effective: chunk_plan.num_states,
        });
    }

    let request = EnumerationRequest {
        chunk_exp: chunk_plan.chunk_exp,
        num_states: chunk_plan.num_states,
    };
    hooks.progress.states_processed(0);
    let retained = engine
        .run(&qubo, &request, &mut *hooks.progress)?
        .into_sorted();

    let energies = retained.iter().map(|c| c.energy + offset).collect();
    let states = if options.energies_only {
        None
    } else {
        Some(
            retained
                .iter()
                .map(|c| decode_state(c.code, n, &labels))
                .collect(),
        )
    };
    Ok(SearchResult { energies, states })
}

/// Picks the engine and its memory budget per the configured method.
///
/// An explicit gpu request on a machine without a compatible device is a
/// configuration error; auto quietly settles on the CPU instead.
fn resolve_backend(
    options: &SearchOptions,
    diagnostics: &mut dyn DiagnosticSink,
) -> Result<(Box<dyn EnumerationEngine>, u64), IksError> {
    let auto = options.method == Method::Auto;
    let use_gpu = match options.method {
        Method::Cpu => false,
        Method::Gpu => {
            if !GpuEngine::is_available() {
                return Err(IksError::Configuration(
                    ErrorInfo::new(
                        "gpu-unavailable",
                        "gpu method requested but no compatible device is present",
                    )
                    .with_hint("request the cpu method, or let the method auto-select"),
                ));
            }
            true
        }
        Method::Auto => GpuEngine::is_available(),
    };

    if use_gpu {
        let engine = GpuEngine::new()?;
        diagnostics.record(&Diagnostic::MethodSelected {
            method: engine.name().to_string(),
            auto,
        });
        let budget = match options.memory_budget {
            Some(bytes) => bytes,
            None => engine.memory_probe().available_bytes()?,
        };
        Ok((Box::new(engine), budget))
    } else {
        let engine = CpuEngine::new();
        diagnostics.record(&Diagnostic::MethodSelected {
            method: engine.name().to_string(),
            auto,
        });
        let budget = match options.memory_budget {
            Some(bytes) => bytes,
            None => SystemMemoryProbe.available_bytes()?,
        };
        Ok((Box::new(engine), budget))
    }
}
