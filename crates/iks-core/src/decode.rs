//! Decoding integer state codes into labelled spin assignments.

use std::collections::BTreeMap;

/// Decodes a state code into a `label -> spin` mapping.
///
/// The most significant of the `n` bits (position `n - 1`) corresponds to
/// `labels[0]`; each successively lower bit corresponds to the next label. A
/// set bit decodes to `+1`, an unset bit to `-1`. Codes outside `[0, 2^n)`
/// are a programming-contract violation, not a recoverable error.
pub fn decode_state(code: u64, n: usize, labels: &[i64]) -> BTreeMap<i64, i8> {
    debug_assert_eq!(labels.len(), n);
    debug_assert!(n as u32 == u64::BITS || code < 1u64 << n);
    let mut state = BTreeMap::new();
    let mut rest = code;
    for i in 0..n {
        let spin = if rest % 2 == 1 { 1 } else { -1 };
        state.insert(labels[n - 1 - i], spin);
        rest /= 2;
    }
    state
}
