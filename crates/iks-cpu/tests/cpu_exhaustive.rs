use iks_core::{
    ising_to_qubo, Candidate, CouplingMatrix, EnumerationEngine, EnumerationRequest, IksError,
    NoopProgress, ProgressObserver, QuboMatrix,
};
use iks_cpu::CpuEngine;
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_qubo(seed: u64, n: usize) -> QuboMatrix {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut couplings = CouplingMatrix::zeros(n);
    for i in 0..n {
        for j in i..n {
            couplings.fold_upper(i, j, rng.gen_range(-1.0..1.0));
        }
    }
    ising_to_qubo(&couplings).0
}

fn direct_topk(qubo: &QuboMatrix, k: usize) -> Vec<Candidate> {
    let n = qubo.size();
    let mut all: Vec<Candidate> = (0..(1u64 << n))
        .map(|code| Candidate {
            energy: qubo.energy(code),
            code,
        })
        .collect();
    all.sort();
    all.truncate(k);
    all
}

fn run_cpu(qubo: &QuboMatrix, chunk_exp: u32, num_states: usize) -> Vec<Candidate> {
    CpuEngine::new()
        .run(
            qubo,
            &EnumerationRequest {
                chunk_exp,
                num_states,
            },
            &mut NoopProgress,
        )
        .unwrap()
        .into_sorted()
}

#[test]
fn saturated_search_equals_full_enumeration() {
    for n in 1..=10usize {
        let qubo = random_qubo(n as u64, n);
        let k = 1usize << n;
        let chunk_exp = (n as u32).min(3);
        let result = run_cpu(&qubo, chunk_exp, k);
        assert_eq!(result.len(), k, "n {n}");
        assert_eq!(result, direct_topk(&qubo, k), "n {n}");
    }
}

#[test]
fn result_is_invariant_under_chunk_exponent() {
    let qubo = random_qubo(42, 9);
    let reference = run_cpu(&qubo, 9, 12);
    for chunk_exp in 0..=9u32 {
        assert_eq!(run_cpu(&qubo, chunk_exp, 12), reference, "exp {chunk_exp}");
    }
}

#[test]
fn result_is_invariant_under_thread_count() {
    let qubo = random_qubo(7, 10);
    let request = EnumerationRequest {
        chunk_exp: 6,
        num_states: 17,
    };
    let single = CpuEngine::with_threads(1)
        .run(&qubo, &request, &mut NoopProgress)
        .unwrap()
        .into_sorted();
    let pooled = CpuEngine::with_threads(4)
        .run(&qubo, &request, &mut NoopProgress)
        .unwrap()
        .into_sorted();
    assert_eq!(single, pooled);
}

#[test]
fn tied_energies_resolve_to_ascending_codes() {
    // A zero Hamiltonian ties every state at energy zero; the kept codes
    // must then be the smallest ones in ascending order.
    let qubo = ising_to_qubo(&CouplingMatrix::zeros(5)).0;
    let result = run_cpu(&qubo, 3, 6);
    assert_eq!(
        result.iter().map(|c| c.code).collect::<Vec<_>>(),
        vec![0, 1, 2, 3, 4, 5]
    );
}

struct Recorder(Vec<u64>);

impl ProgressObserver for Recorder {
    fn states_processed(&mut self, count: u64) {
        self.0.push(count);
    }
}

#[test]
fn progress_reports_cumulative_counts_per_chunk() {
    let qubo = random_qubo(3, 6);
    let mut recorder = Recorder(Vec::new());
    CpuEngine::new()
        .run(
            &qubo,
            &EnumerationRequest {
                chunk_exp: 4,
                num_states: 4,
            },
            &mut recorder,
        )
        .unwrap();
    assert_eq!(recorder.0, vec![16, 32, 48, 64]);
}

#[test]
fn chunk_exponent_beyond_space_is_rejected() {
    let qubo = random_qubo(1, 4);
    let err = CpuEngine::new()
        .run(
            &qubo,
            &EnumerationRequest {
                chunk_exp: 10,
                num_states: 4,
            },
            &mut NoopProgress,
        )
        .unwrap_err();
    assert!(matches!(err, IksError::Configuration(_)));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn random_instances_match_direct_selection(
        seed in any::<u64>(),
        n in 2usize..=9,
        k in 1usize..=20,
        exp_offset in 0u32..10,
    ) {
        let qubo = random_qubo(seed, n);
        let chunk_exp = exp_offset % (n as u32 + 1);
        let k = k.min(1 << chunk_exp);
        let result = run_cpu(&qubo, chunk_exp, k);
        prop_assert_eq!(result, direct_topk(&qubo, k));
    }
}
