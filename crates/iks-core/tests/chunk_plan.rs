use iks_core::{max_chunk_size, plan, IksError};

#[test]
fn max_chunk_size_honours_the_reserve() {
    // 2 * 16 * 2^30 bytes of working-array budget plus varying headroom;
    // only a full extra GiB clears the reserve and buys the next exponent.
    let base = 2u64 * 16 * (1 << 30);
    assert_eq!(max_chunk_size(base + 500 * (1 << 20)).unwrap(), 29);
    assert_eq!(max_chunk_size(base + 600 * (1 << 20)).unwrap(), 29);
    assert_eq!(max_chunk_size(base).unwrap(), 29);
    assert_eq!(max_chunk_size(base + 1024 * (1 << 20)).unwrap(), 30);
}

#[test]
fn max_chunk_size_rejects_zero_budget() {
    assert!(matches!(max_chunk_size(0), Err(IksError::Resource(_))));
}

#[test]
fn reserve_decrements_small_budgets_exactly_once() {
    // 1024 bytes yields exponent 5 before the reserve check; the reserve
    // costs one exponent, never more, so the budget still plans.
    assert_eq!(max_chunk_size(1024).unwrap(), 4);
}

#[test]
fn max_chunk_size_rejects_budget_below_reserve() {
    // 32 bytes yields exponent 0, which the reserve cannot reduce further.
    assert!(matches!(max_chunk_size(32), Err(IksError::Resource(_))));
}

#[test]
fn chunk_exponent_clamps_to_system_size() {
    let plan = plan(u64::MAX, 4, 10, Some(10)).unwrap();
    assert_eq!(plan.chunk_exp, 4);
    assert_eq!(plan.num_chunks(4), 1);
}

#[test]
fn oversized_state_request_clamps_to_one_chunk() {
    // 1000 states against an effective chunk of 16: more than two chunks can
    // supply, so K collapses to one chunk's capacity.
    let plan = plan(u64::MAX, 4, 1000, Some(4)).unwrap();
    assert_eq!(plan.num_states, 16);
    assert_eq!(plan.requested_states, 1000);
    assert!(plan.states_clamped());
}

#[test]
fn state_request_never_exceeds_chunk_length() {
    // 20 states fits within two 16-state chunks, but the kernels only ever
    // select one chunk's worth.
    let plan = plan(u64::MAX, 8, 20, Some(4)).unwrap();
    assert_eq!(plan.chunk_exp, 4);
    assert_eq!(plan.num_states, 16);
}

#[test]
fn modest_state_request_is_untouched() {
    let plan = plan(u64::MAX, 8, 10, Some(6)).unwrap();
    assert_eq!(plan.num_states, 10);
    assert!(!plan.states_clamped());
    assert_eq!(plan.chunk_len(), 64);
    assert_eq!(plan.num_chunks(8), 4);
}

#[test]
fn oversized_system_is_a_configuration_error() {
    // Shifting 1u64 by more than 63 would overflow; the planner must reject
    // such systems up front instead of computing state counts for them.
    assert!(matches!(
        plan(u64::MAX, 70, 10, Some(70)),
        Err(IksError::Configuration(_))
    ));
    assert!(matches!(
        plan(1 << 40, 70, 10, None),
        Err(IksError::Configuration(_))
    ));
}

#[test]
fn oversized_explicit_exponent_is_a_configuration_error() {
    assert!(matches!(
        plan(u64::MAX, 40, 10, Some(63)),
        Err(IksError::Configuration(_))
    ));
}

#[test]
fn largest_supported_system_still_plans() {
    let plan = plan(u64::MAX, 62, 10, Some(62)).unwrap();
    assert_eq!(plan.chunk_exp, 62);
    assert_eq!(plan.num_chunks(62), 1);
}

#[test]
fn zero_state_request_is_a_configuration_error() {
    assert!(matches!(
        plan(u64::MAX, 8, 0, Some(4)),
        Err(IksError::Configuration(_))
    ));
}

#[test]
fn derived_exponent_comes_from_the_budget() {
    let base = 2u64 * 16 * (1 << 30);
    let plan = plan(base + 1024 * (1 << 20), 40, 10, None).unwrap();
    assert_eq!(plan.chunk_exp, 30);
    assert_eq!(plan.num_states, 10);
}
