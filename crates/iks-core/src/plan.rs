//! Chunk planning under a memory budget.

use serde::{Deserialize, Serialize};

use crate::errors::{ErrorInfo, IksError};

/// Largest supported system size; state codes and state counts must fit in
/// a `u64` with headroom for the full-space count `2^n`.
pub const MAX_SPINS: u32 = 62;

/// Source of a bytes-available figure for planning.
///
/// Injected by the orchestrator so planning stays deterministic in tests and
/// independent of how a backend actually measures its budget (host memory,
/// device limits, a fixed override).
pub trait MemoryProbe {
    /// Number of bytes the engine may use for per-chunk working arrays.
    fn available_bytes(&self) -> Result<u64, IksError>;
}

/// Result of [`plan`]: the chunk exponent and the effective K.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkPlan {
    /// log2 of the number of states enumerated per pass.
    pub chunk_exp: u32,
    /// Effective number of lowest-energy states to keep.
    pub num_states: usize,
    /// The K originally requested, before clamping.
    pub requested_states: usize,
}

impl ChunkPlan {
    /// Number of states in one chunk.
    pub fn chunk_len(&self) -> u64 {
        1u64 << self.chunk_exp
    }

    /// Number of chunks covering the full space of `2^n` states.
    pub fn num_chunks(&self, n: u32) -> u64 {
        let total = 1u64 << n;
        total.div_ceil(self.chunk_len())
    }

    /// True when the requested K was reduced to fit the chunk size.
    pub fn states_clamped(&self) -> bool {
        self.num_states != self.requested_states
    }
}

/// Largest chunk exponent whose working arrays fit in `mem_bytes`.
///
/// Each enumerated state needs two 8-byte slots (energy and state code),
/// doubled for double buffering, hence `mem_bytes / 32` elements. The
/// exponent is the floor log2 of that element count, reduced by one if the
/// arrays would eat into a fixed 1 GiB reserve.
pub fn max_chunk_size(mem_bytes: u64) -> Result<u32, IksError> {
    if mem_bytes == 0 {
        return Err(IksError::Resource(
            ErrorInfo::new("empty-memory-budget", "memory budget is zero")
                .with_hint("supply a positive budget or a chunk exponent explicitly"),
        ));
    }
    let mut elements_max = mem_bytes / 32;
    let mut chunk_exp: u32 = 0;
    while elements_max > 1 {
        elements_max >>= 1;
        chunk_exp += 1;
    }
    if (32u128 << chunk_exp) + (1u128 << 30) > u128::from(mem_bytes) {
        if chunk_exp == 0 {
            return Err(IksError::Resource(
                ErrorInfo::new(
                    "budget-below-reserve",
                    "memory budget cannot fit any chunk beside the 1 GiB reserve",
                )
                .with_context("mem_bytes", mem_bytes.to_string()),
            ));
        }
        chunk_exp -= 1;
    }
    Ok(chunk_exp)
}

/// Computes the chunk exponent and effective K for a search.
///
/// The exponent is taken from `requested_chunk_exp` when given, otherwise
/// derived from the budget, and never exceeds `n`. Requesting more states
/// than two chunks can supply clamps K to one chunk's capacity; K never
/// exceeds the chunk length. The clamp is recorded in the returned plan so
/// the orchestrator can surface it as a diagnostic. Systems and explicit
/// exponents beyond [`MAX_SPINS`] are rejected before any shift on the
/// state count can overflow.
pub fn plan(
    mem_bytes: u64,
    n: u32,
    requested_states: usize,
    requested_chunk_exp: Option<u32>,
) -> Result<ChunkPlan, IksError> {
    if n > MAX_SPINS {
        return Err(IksError::Configuration(
            ErrorInfo::new("system-too-large", "system exceeds the supported spin count")
                .with_context("spins", n.to_string())
                .with_context("max_spins", MAX_SPINS.to_string()),
        ));
    }
    if let Some(exp) = requested_chunk_exp {
        if exp > MAX_SPINS {
            return Err(IksError::Configuration(
                ErrorInfo::new(
                    "chunk-exponent-too-large",
                    "chunk exponent exceeds the supported spin count",
                )
                .with_context("chunk_exp", exp.to_string())
                .with_context("max_spins", MAX_SPINS.to_string()),
            ));
        }
    }
    if requested_states == 0 {
        return Err(IksError::Configuration(ErrorInfo::new(
            "zero-states-requested",
            "at least one lowest-energy state must be requested",
        )));
    }
    let mut chunk_exp = match requested_chunk_exp {
        Some(exp) => exp,
        None => max_chunk_size(mem_bytes)?,
    };
    if chunk_exp > n {
        chunk_exp = n;
    }
    let chunk_len = 1u64 << chunk_exp;
    let mut num_states = requested_states;
    if num_states as u64 > 2 * chunk_len {
        num_states = chunk_len as usize;
    }
    // The enumeration kernels never select more than one chunk's worth.
    if num_states as u64 > chunk_len {
        num_states = chunk_len as usize;
    }
    Ok(ChunkPlan {
        chunk_exp,
        num_states,
        requested_states,
    })
}
