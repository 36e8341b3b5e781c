//! Memory probes used when no explicit budget is given.

use iks_core::{IksError, MemoryProbe};

/// Reports the host's currently available memory.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemMemoryProbe;

impl MemoryProbe for SystemMemoryProbe {
    fn available_bytes(&self) -> Result<u64, IksError> {
        let mut system = sysinfo::System::new();
        system.refresh_memory();
        Ok(system.available_memory())
    }
}

/// Probe with a fixed answer, for deterministic planning in tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedMemoryProbe {
    /// Byte count the probe reports.
    pub bytes: u64,
}

impl MemoryProbe for FixedMemoryProbe {
    fn available_bytes(&self) -> Result<u64, IksError> {
        Ok(self.bytes)
    }
}
