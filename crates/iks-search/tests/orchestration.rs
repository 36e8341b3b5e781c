//! Backend resolution, planning diagnostics, and orchestration errors.

use iks_core::{Diagnostic, DiagnosticSink, IksError, ProgressObserver};
use iks_search::{search, search_with, Graph, Method, SearchHooks, SearchOptions};

#[derive(Default)]
struct DiagnosticRecorder(Vec<Diagnostic>);

impl DiagnosticSink for DiagnosticRecorder {
    fn record(&mut self, diagnostic: &Diagnostic) {
        self.0.push(diagnostic.clone());
    }
}

#[derive(Default)]
struct ProgressRecorder(Vec<u64>);

impl ProgressObserver for ProgressRecorder {
    fn states_processed(&mut self, count: u64) {
        self.0.push(count);
    }
}

fn small_graph() -> Graph {
    Graph::Mapping(vec![
        ((0, 0), -1.0),
        ((1, 1), 0.3),
        ((2, 2), -0.4),
        ((3, 3), 0.2),
        ((0, 3), -0.6),
    ])
}

#[test]
fn diagnostics_cover_method_plan_and_clamp() {
    let options = SearchOptions {
        num_states: 1000,
        method: Method::Cpu,
        memory_budget: Some(1 << 35),
        ..SearchOptions::default()
    };
    let mut diagnostics = DiagnosticRecorder::default();
    let mut progress = ProgressRecorder::default();
    let result = search_with(
        &small_graph(),
        &options,
        &mut SearchHooks {
            progress: &mut progress,
            diagnostics: &mut diagnostics,
        },
    )
    .unwrap();

    // The planner caps the chunk exponent at n = 4 and clamps K to one
    // chunk's worth of states.
    assert_eq!(result.energies.len(), 16);
    assert_eq!(
        diagnostics.0,
        vec![
            Diagnostic::MethodSelected {
                method: "cpu".to_string(),
                auto: false,
            },
            Diagnostic::MemoryProbed { bytes: 1 << 35 },
            Diagnostic::ChunkPlanned {
                chunk_exp: 4,
                num_chunks: 1,
            },
            Diagnostic::StatesClamped {
                requested: 1000,
                effective: 16,
            },
        ]
    );
}

#[test]
fn progress_reports_are_cumulative_and_end_at_the_full_space() {
    let options = SearchOptions {
        num_states: 3,
        method: Method::Cpu,
        chunk_exponent: Some(2),
        memory_budget: Some(1 << 35),
        ..SearchOptions::default()
    };
    let mut diagnostics = DiagnosticRecorder::default();
    let mut progress = ProgressRecorder::default();
    search_with(
        &small_graph(),
        &options,
        &mut SearchHooks {
            progress: &mut progress,
            diagnostics: &mut diagnostics,
        },
    )
    .unwrap();
    assert_eq!(progress.0, vec![0, 4, 8, 12, 16]);
}

#[test]
fn explicit_gpu_request_without_a_device_is_a_configuration_error() {
    if iks_gpu::GpuEngine::is_available() {
        eprintln!("skipping: a GPU adapter is available");
        return;
    }
    let options = SearchOptions {
        method: Method::Gpu,
        ..SearchOptions::default()
    };
    let err = search(&small_graph(), &options).unwrap_err();
    assert!(matches!(err, IksError::Configuration(_)));
    assert_eq!(err.info().code, "gpu-unavailable");
}

#[test]
fn auto_method_always_resolves_to_a_backend() {
    let options = SearchOptions {
        num_states: 2,
        memory_budget: Some(1 << 35),
        ..SearchOptions::default()
    };
    let mut diagnostics = DiagnosticRecorder::default();
    let mut progress = ProgressRecorder::default();
    search_with(
        &small_graph(),
        &options,
        &mut SearchHooks {
            progress: &mut progress,
            diagnostics: &mut diagnostics,
        },
    )
    .unwrap();
    match &diagnostics.0[0] {
        Diagnostic::MethodSelected { method, auto } => {
            assert!(method == "cpu" || method == "gpu");
            assert!(auto);
        }
        other => panic!("expected method selection first, got {other:?}"),
    }
}

#[test]
fn oversized_systems_are_rejected() {
    let entries: Vec<((i64, i64), f64)> = (0..63).map(|i| ((i, i), -1.0)).collect();
    let err = search(&Graph::Mapping(entries), &SearchOptions::default()).unwrap_err();
    assert!(matches!(err, IksError::Configuration(_)));
    assert_eq!(err.info().code, "system-too-large");
}

#[test]
fn budget_below_the_reserve_is_a_resource_error() {
    let options = SearchOptions {
        method: Method::Cpu,
        memory_budget: Some(32),
        ..SearchOptions::default()
    };
    let err = search(&small_graph(), &options).unwrap_err();
    assert!(matches!(err, IksError::Resource(_)));
}

#[test]
fn zero_requested_states_is_a_configuration_error() {
    let options = SearchOptions {
        num_states: 0,
        method: Method::Cpu,
        memory_budget: Some(1 << 35),
        ..SearchOptions::default()
    };
    let err = search(&small_graph(), &options).unwrap_err();
    assert!(matches!(err, IksError::Configuration(_)));
}
