//! Device bootstrap and memory probing.

use std::sync::Arc;

use iks_core::errors::ErrorInfo;
use iks_core::{IksError, MemoryProbe};

/// Owns the wgpu device/queue pair used by the GPU engine.
pub struct GpuContext {
    pub(crate) device: Arc<wgpu::Device>,
    pub(crate) queue: Arc<wgpu::Queue>,
    max_buffer_size: u64,
}

impl GpuContext {
    /// Initializes the first compatible adapter.
    ///
    /// Fails with `UnsupportedMethod` when no adapter is present and with
    /// `Resource` when the device cannot be created within default limits.
    pub fn new() -> Result<Self, IksError> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: None,
            force_fallback_adapter: false,
        }))
        .ok_or_else(|| {
            IksError::UnsupportedMethod(
                ErrorInfo::new("no-gpu-adapter", "no compatible GPU adapter is present")
                    .with_hint("request the cpu method, or let the method auto-select"),
            )
        })?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("iks-gpu-device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .map_err(|err| IksError::Resource(ErrorInfo::new("gpu-device", err.to_string())))?;

        let max_buffer_size = device.limits().max_buffer_size;
        Ok(Self {
            device: Arc::new(device),
            queue: Arc::new(queue),
            max_buffer_size,
        })
    }

    /// True when at least one compatible adapter can be acquired.
    pub fn is_available() -> bool {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: None,
            force_fallback_adapter: false,
        }))
        .is_some()
    }

    /// Largest single allocation the device accepts.
    pub(crate) fn max_buffer_size(&self) -> u64 {
        self.max_buffer_size
    }

    /// Planner budget for this device.
    ///
    /// wgpu exposes no free-memory query, so the probe reports the maximum
    /// buffer size the device accepts; the planner's reserve applies on top.
    pub fn memory_probe(&self) -> DeviceMemoryProbe {
        DeviceMemoryProbe {
            bytes: self.max_buffer_size,
        }
    }
}

/// Bytes-available figure derived from device limits.
#[derive(Debug, Clone, Copy)]
pub struct DeviceMemoryProbe {
    bytes: u64,
}

impl MemoryProbe for DeviceMemoryProbe {
    fn available_bytes(&self) -> Result<u64, IksError> {
        Ok(self.bytes)
    }
}
