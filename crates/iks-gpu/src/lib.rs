//! GPU enumeration engine for the IKS exhaustive ground-state search.
//!
//! The device runs a wide f32 threshold filter over each chunk of the state
//! space; the host rescores surviving states with the canonical f64
//! evaluation, so the GPU backend returns exactly the same energies and
//! state codes as the CPU backend.

mod context;
mod engine;
mod shaders;

pub use context::{DeviceMemoryProbe, GpuContext};
pub use engine::GpuEngine;
