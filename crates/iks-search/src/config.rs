//! Search options and their serialized form.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Execution backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Method {
    /// Prefer the GPU when a compatible device is present, else the CPU.
    #[default]
    Auto,
    /// Multithreaded host enumeration.
    Cpu,
    /// Device-filtered enumeration; an error when no device is present.
    Gpu,
}

impl Method {
    /// Identifier used in diagnostics and on the command line.
    pub fn name(self) -> &'static str {
        match self {
            Method::Auto => "auto",
            Method::Cpu => "cpu",
            Method::Gpu => "gpu",
        }
    }
}

/// Tunable parameters for one search.
///
/// Every field has a default, so a configuration file needs to mention only
/// what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchOptions {
    /// Number of lowest-energy states to return.
    #[serde(default = "default_num_states")]
    pub num_states: usize,
    /// Skip decoding: return energies without spin assignments.
    #[serde(default)]
    pub energies_only: bool,
    /// Execution backend.
    #[serde(default)]
    pub method: Method,
    /// Fixed chunk exponent, bypassing the memory-derived choice.
    #[serde(default)]
    pub chunk_exponent: Option<u32>,
    /// Fixed memory budget in bytes, bypassing the probe.
    #[serde(default)]
    pub memory_budget: Option<u64>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        SearchOptions {
            num_states: default_num_states(),
            energies_only: false,
            method: Method::Auto,
            chunk_exponent: None,
            memory_budget: None,
        }
    }
}

fn default_num_states() -> usize {
    10
}

/// Outcome of a search: ascending energies and, unless suppressed, the
/// matching spin assignments keyed by spin label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Energies of the retained states, ascending, offset included.
    pub energies: Vec<f64>,
    /// Spin assignment per retained state; `None` with `energies_only`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub states: Option<Vec<BTreeMap<i64, i8>>>,
}
