use iks_core::decode_state;

/// Independent re-encoding: `labels[0]` is the most significant of the `n`
/// bits, a `+1` spin sets the bit.
fn encode(state: &std::collections::BTreeMap<i64, i8>, labels: &[i64]) -> u64 {
    let n = labels.len();
    let mut code = 0u64;
    for (position, label) in labels.iter().enumerate() {
        if state[label] == 1 {
            code |= 1u64 << (n - 1 - position);
        }
    }
    code
}

#[test]
fn decode_then_encode_recovers_every_code() {
    for n in 1..=10usize {
        let labels: Vec<i64> = (0..n as i64).map(|i| i * 3 - 2).collect();
        for code in 0..(1u64 << n) {
            let state = decode_state(code, n, &labels);
            assert_eq!(state.len(), n);
            assert!(state.values().all(|&s| s == 1 || s == -1));
            assert_eq!(encode(&state, &labels), code, "n {n}");
        }
    }
}

#[test]
fn most_significant_bit_maps_to_first_label() {
    let labels = [10, 20, 30];
    // 0b101: labels[0] and labels[2] are set, labels[1] is not.
    let state = decode_state(0b101, 3, &labels);
    assert_eq!(state[&10], 1);
    assert_eq!(state[&20], -1);
    assert_eq!(state[&30], 1);
}

#[test]
fn leading_zeros_decode_to_minus_one() {
    let labels = [0, 1, 2, 3];
    let state = decode_state(0, 4, &labels);
    assert!(state.values().all(|&s| s == -1));
}
