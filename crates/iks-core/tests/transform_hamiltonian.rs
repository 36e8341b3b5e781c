use iks_core::{ising_to_qubo, CouplingMatrix};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Direct Hamiltonian evaluation used as the reference:
/// `H(s) = -sum_i h_i s_i - sum_{i<j} J_ij s_i s_j`, where variable `i`
/// occupies bit `n - 1 - i` of the code and a set bit means `+1`.
fn hamiltonian(couplings: &CouplingMatrix, code: u64) -> f64 {
    let n = couplings.size();
    let spin = |i: usize| -> f64 {
        if (code >> (n - 1 - i)) & 1 == 1 {
            1.0
        } else {
            -1.0
        }
    };
    let mut total = 0.0;
    for i in 0..n {
        total -= couplings.get(i, i) * spin(i);
        for j in i + 1..n {
            total -= couplings.get(i, j) * spin(i) * spin(j);
        }
    }
    total
}

#[test]
fn qubo_energy_plus_offset_matches_hamiltonian() {
    let mut rng = StdRng::seed_from_u64(0x5EED_1505);
    for trial in 0..200 {
        let n = rng.gen_range(1..=8);
        let mut couplings = CouplingMatrix::zeros(n);
        for i in 0..n {
            for j in i..n {
                couplings.fold_upper(i, j, rng.gen_range(-1.0..1.0));
            }
        }
        let (qubo, offset) = ising_to_qubo(&couplings);
        for code in 0..(1u64 << n) {
            let got = qubo.energy(code) + offset;
            let want = hamiltonian(&couplings, code);
            let tol = 1e-9 * want.abs().max(1.0);
            assert!(
                (got - want).abs() <= tol,
                "trial {trial}, n {n}, code {code}: {got} != {want}"
            );
        }
    }
}

#[test]
fn transform_applies_offdiagonal_terms_twice() {
    // One coupling J_01 = -0.2 and one field h_0 = -1. The pair loop visits
    // (0, 1) and (1, 0), so the coupling lands twice on the offset, twice on
    // each diagonal, and twice on the upper cell. Inherited arithmetic;
    // changing it would break stored-result compatibility.
    let mut couplings = CouplingMatrix::zeros(2);
    couplings.fold_upper(0, 0, -1.0);
    couplings.fold_upper(0, 1, -0.2);
    let (qubo, offset) = ising_to_qubo(&couplings);
    assert_eq!(qubo.get(0, 0), 2.0 * -1.0 - 2.0 * -0.2);
    assert_eq!(qubo.get(1, 1), -2.0 * -0.2);
    assert_eq!(qubo.get(0, 1), 4.0 * -0.2);
    assert_eq!(offset, -1.0 - 2.0 * 0.5 * -0.2);
}

#[test]
fn abs_scale_bounds_every_state_energy() {
    let mut rng = StdRng::seed_from_u64(7);
    let n = 6;
    let mut couplings = CouplingMatrix::zeros(n);
    for i in 0..n {
        for j in i..n {
            couplings.fold_upper(i, j, rng.gen_range(-2.0..2.0));
        }
    }
    let (qubo, _) = ising_to_qubo(&couplings);
    let scale = qubo.abs_scale();
    for code in 0..(1u64 << n) {
        assert!(qubo.energy(code).abs() <= scale);
    }
}
