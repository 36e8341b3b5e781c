#![deny(missing_docs)]

//! CPU enumeration engine: rayon-parallel, Gray-order incremental scanning
//! with bounded per-thread selection.

mod engine;
mod scan;

pub use engine::CpuEngine;
