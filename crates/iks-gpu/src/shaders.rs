//! WGSL compute shader for the state filter pass.

/// Threshold filter over a range of chunk-local state indices.
///
/// Each invocation walks its grid-strided share of the range, evaluates the
/// f32 quadratic form for the corresponding state code, and appends the
/// chunk-local index of every state at or below the threshold to the
/// survivor buffer through an atomic cursor. The threshold is widened on the
/// host so that f32 evaluation error can never drop a true top-K member; the
/// host rescores survivors in f64.
///
/// Variable `i` occupies bit `n - 1 - i` of the code; bits at or above the
/// chunk exponent come from the chunk base, split into two 32-bit halves
/// because WGSL has no 64-bit integers.
pub const FILTER_SHADER: &str = r#"
struct Params {
    n: u32,
    chunk_exp: u32,
    base_lo: u32,
    base_hi: u32,
    range_start: u32,
    range_len: u32,
    capacity: u32,
    threshold: f32,
}

@group(0) @binding(0) var<uniform> params: Params;
@group(0) @binding(1) var<storage, read> qubo: array<f32>;
@group(0) @binding(2) var<storage, read_write> survivors: array<u32>;
@group(0) @binding(3) var<storage, read_write> cursor: atomic<u32>;

fn code_bit(local: u32, position: u32) -> u32 {
    if (position < params.chunk_exp) {
        return (local >> position) & 1u;
    }
    if (position < 32u) {
        return (params.base_lo >> position) & 1u;
    }
    return (params.base_hi >> (position - 32u)) & 1u;
}

fn state_energy(local: u32) -> f32 {
    let n = params.n;
    var energy = 0.0;
    for (var i = 0u; i < n; i++) {
        if (code_bit(local, n - 1u - i) == 1u) {
            for (var j = i; j < n; j++) {
                if (code_bit(local, n - 1u - j) == 1u) {
                    energy -= qubo[i * n + j];
                }
            }
        }
    }
    return energy;
}

@compute @workgroup_size(256)
fn main(
    @builtin(global_invocation_id) gid: vec3<u32>,
    @builtin(num_workgroups) workgroups: vec3<u32>,
) {
    let stride = workgroups.x * 256u;
    var offset = gid.x;
    while (offset < params.range_len) {
        let local = params.range_start + offset;
        if (state_energy(local) <= params.threshold) {
            let slot = atomicAdd(&cursor, 1u);
            if (slot < params.capacity) {
                survivors[slot] = local;
            }
        }
        offset += stride;
    }
}
"#;
