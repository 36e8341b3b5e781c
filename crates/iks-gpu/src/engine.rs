//! GPU enumeration engine: f32 device prefilter, exact f64 host rescoring.

use bytemuck::{Pod, Zeroable};
use iks_core::errors::ErrorInfo;
use iks_core::{
    Candidate, EnumerationEngine, EnumerationRequest, IksError, ProgressObserver, QuboMatrix,
    TopKList,
};

use crate::context::{DeviceMemoryProbe, GpuContext};
use crate::shaders::FILTER_SHADER;

/// Upper bound on chunk-local indices: WGSL works in 32-bit integers.
const MAX_DEVICE_CHUNK_EXP: u32 = 31;

/// Parameters uploaded per filter dispatch.
#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct FilterParams {
    n: u32,
    chunk_exp: u32,
    base_lo: u32,
    base_hi: u32,
    range_start: u32,
    range_len: u32,
    capacity: u32,
    threshold: f32,
}

/// GPU enumeration engine.
///
/// Each chunk is processed by one or more synchronous filter dispatches: the
/// device evaluates the f32 quadratic form for every state in a range and
/// compacts the indices of states at or below a conservatively widened
/// threshold; the host rescores survivors with the canonical f64 evaluation
/// and feeds the chunk-local top-K list. Because every accept/evict decision
/// happens on canonical energies, the results are bit-identical to the CPU
/// backend's.
pub struct GpuEngine {
    context: GpuContext,
}

impl GpuEngine {
    /// Acquires a device; fails when none is present.
    pub fn new() -> Result<Self, IksError> {
        Ok(Self {
            context: GpuContext::new()?,
        })
    }

    /// True when a compatible adapter can be acquired.
    pub fn is_available() -> bool {
        GpuContext::is_available()
    }

    /// Planner budget probe for the acquired device.
    pub fn memory_probe(&self) -> DeviceMemoryProbe {
        self.context.memory_probe()
    }
}

struct FilterPipeline<'a> {
    context: &'a GpuContext,
    pipeline: wgpu::ComputePipeline,
    bind_group: wgpu::BindGroup,
    params_buffer: wgpu::Buffer,
    cursor_buffer: wgpu::Buffer,
    survivors_buffer: wgpu::Buffer,
    cursor_staging: wgpu::Buffer,
    survivors_staging: wgpu::Buffer,
    capacity: u32,
}

impl<'a> FilterPipeline<'a> {
    fn new(
        context: &'a GpuContext,
        qubo: &QuboMatrix,
        capacity: u32,
    ) -> Result<Self, IksError> {
        let device = &context.device;
        let n = qubo.size() as u64;
        let qubo_bytes = n * n * std::mem::size_of::<f32>() as u64;
        let survivor_bytes = u64::from(capacity) * std::mem::size_of::<u32>() as u64;
        if qubo_bytes.max(survivor_bytes) > context.max_buffer_size() {
            return Err(IksError::Resource(
                ErrorInfo::new("gpu-buffer-too-large", "a working buffer exceeds device limits")
                    .with_context("qubo_bytes", qubo_bytes.to_string())
                    .with_context("survivor_bytes", survivor_bytes.to_string()),
            ));
        }

        let qubo_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("qubo_matrix"),
            size: qubo_bytes,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let entries_f32: Vec<f32> = qubo.entries().iter().map(|&q| q as f32).collect();
        context
            .queue
            .write_buffer(&qubo_buffer, 0, bytemuck::cast_slice(&entries_f32));

        let params_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("filter_params"),
            size: std::mem::size_of::<FilterParams>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let survivors_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("survivors"),
            size: survivor_bytes,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });
        let cursor_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("survivor_cursor"),
            size: std::mem::size_of::<u32>() as u64,
            usage: wgpu::BufferUsages::STORAGE
                | wgpu::BufferUsages::COPY_DST
                | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });
        let survivors_staging = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("survivors_staging"),
            size: survivor_bytes,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let cursor_staging = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("cursor_staging"),
            size: std::mem::size_of::<u32>() as u64,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("filter_bind_group_layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: false },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: false },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("filter_shader"),
            source: wgpu::ShaderSource::Wgsl(FILTER_SHADER.into()),
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("filter_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });
        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("filter_pipeline"),
            layout: Some(&pipeline_layout),
            module: &module,
            entry_point: Some("main"),
            compilation_options: Default::default(),
            cache: None,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("filter_bind_group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: params_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: qubo_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: survivors_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: cursor_buffer.as_entire_binding(),
                },
            ],
        });

        Ok(Self {
            context,
            pipeline,
            bind_group,
            params_buffer,
            cursor_buffer,
            survivors_buffer,
            cursor_staging,
            survivors_staging,
            capacity,
        })
    }

    /// Runs one synchronous filter dispatch and reads back the survivors.
    ///
    /// Returns the raw hit count (which may exceed the buffer capacity) and
    /// the chunk-local indices actually stored.
    fn dispatch(&self, params: FilterParams) -> Result<(u32, Vec<u32>), IksError> {
        let device = &self.context.device;
        let queue = &self.context.queue;

        queue.write_buffer(&self.params_buffer, 0, bytemuck::bytes_of(&params));
        queue.write_buffer(&self.cursor_buffer, 0, bytemuck::bytes_of(&0u32));

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("filter_encoder"),
        });
        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("filter_pass"),
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &self.bind_group, &[]);
            let workgroups = params.range_len.div_ceil(256).clamp(1, 65_535);
            pass.dispatch_workgroups(workgroups, 1, 1);
        }
        encoder.copy_buffer_to_buffer(
            &self.cursor_buffer,
            0,
            &self.cursor_staging,
            0,
            std::mem::size_of::<u32>() as u64,
        );
        encoder.copy_buffer_to_buffer(
            &self.survivors_buffer,
            0,
            &self.survivors_staging,
            0,
            u64::from(self.capacity) * std::mem::size_of::<u32>() as u64,
        );
        queue.submit(Some(encoder.finish()));

        let cursor_slice = self.cursor_staging.slice(..);
        let survivors_slice = self.survivors_staging.slice(..);
        let (cursor_tx, cursor_rx) = futures_intrusive::channel::shared::oneshot_channel();
        let (survivors_tx, survivors_rx) = futures_intrusive::channel::shared::oneshot_channel();
        cursor_slice.map_async(wgpu::MapMode::Read, move |result| {
            cursor_tx.send(result).ok();
        });
        survivors_slice.map_async(wgpu::MapMode::Read, move |result| {
            survivors_tx.send(result).ok();
        });
        device.poll(wgpu::Maintain::Wait);

        let map_error = |_| {
            IksError::Resource(ErrorInfo::new(
                "gpu-readback",
                "mapping a staging buffer for readback failed",
            ))
        };
        pollster::block_on(cursor_rx.receive())
            .ok_or_else(|| map_error(()))?
            .map_err(|_| map_error(()))?;
        pollster::block_on(survivors_rx.receive())
            .ok_or_else(|| map_error(()))?
            .map_err(|_| map_error(()))?;

        let count = {
            let data = cursor_slice.get_mapped_range();
            bytemuck::cast_slice::<u8, u32>(&data)[0]
        };
        let stored = count.min(self.capacity) as usize;
        let survivors = {
            let data = survivors_slice.get_mapped_range();
            bytemuck::cast_slice::<u8, u32>(&data)[..stored].to_vec()
        };
        self.cursor_staging.unmap();
        self.survivors_staging.unmap();
        Ok((count, survivors))
    }
}

/// Best admission bound currently known across the global and chunk lists.
fn admission_energy(global: &TopKList, local: &TopKList) -> Option<f64> {
    match (global.admission_bound(), local.admission_bound()) {
        (Some(g), Some(l)) => Some(g.energy.min(l.energy)),
        (Some(g), None) => Some(g.energy),
        (None, Some(l)) => Some(l.energy),
        (None, None) => None,
    }
}

impl EnumerationEngine for GpuEngine {
    fn name(&self) -> &'static str {
        "gpu"
    }

    fn run(
        &self,
        qubo: &QuboMatrix,
        request: &EnumerationRequest,
        progress: &mut dyn ProgressObserver,
    ) -> Result<TopKList, IksError> {
        let n = qubo.size() as u32;
        if request.chunk_exp > n {
            return Err(IksError::Configuration(
                ErrorInfo::new(
                    "chunk-exceeds-space",
                    "chunk exponent is larger than the system size",
                )
                .with_context("chunk_exp", request.chunk_exp.to_string())
                .with_context("n", n.to_string()),
            ));
        }
        if request.chunk_exp > MAX_DEVICE_CHUNK_EXP {
            return Err(IksError::Resource(
                ErrorInfo::new(
                    "chunk-exceeds-device-index-space",
                    "the device kernel indexes states with 32-bit integers",
                )
                .with_context("chunk_exp", request.chunk_exp.to_string())
                .with_hint("request a chunk exponent of at most 31"),
            ));
        }

        let total = 1u64 << n;
        let chunk_len = 1u64 << request.chunk_exp;
        let num_chunks = total >> request.chunk_exp;

        let capacity = (request.num_states as u64)
            .saturating_mul(2)
            .clamp(1 << 16, 1 << 22) as u32;
        let pipeline = FilterPipeline::new(&self.context, qubo, capacity)?;

        // Widened so f32 matrix conversion and summation error can never
        // reject a true top-K member; false positives only cost a rescore.
        let n_f = n as f64;
        let margin = qubo.abs_scale() * (n_f * n_f + 64.0) * f64::from(f32::EPSILON) * 4.0;

        let mut global = TopKList::new(request.num_states);
        for chunk_index in 0..num_chunks {
            let base = chunk_index << request.chunk_exp;
            let mut chunk_list = TopKList::new(request.num_states);
            let mut pending: Vec<(u32, u32)> = vec![(0, chunk_len as u32)];
            while let Some((start, len)) = pending.pop() {
                let threshold = match admission_energy(&global, &chunk_list) {
                    Some(bound) => (bound + margin) as f32,
                    None => f32::MAX,
                };
                let params = FilterParams {
                    n,
                    chunk_exp: request.chunk_exp,
                    base_lo: base as u32,
                    base_hi: (base >> 32) as u32,
                    range_start: start,
                    range_len: len,
                    capacity,
                    threshold,
                };
                let (count, survivors) = pipeline.dispatch(params)?;
                if count > capacity && len > 1 {
                    // Too many hits to store: split the range and filter each
                    // half against the (by then tighter) threshold.
                    let half = len / 2;
                    pending.push((start + half, len - half));
                    pending.push((start, half));
                    continue;
                }
                for local in survivors {
                    let code = base + u64::from(local);
                    chunk_list.insert(Candidate {
                        energy: qubo.energy(code),
                        code,
                    });
                }
            }
            global.merge_from(chunk_list);
            progress.states_processed(((chunk_index + 1) << request.chunk_exp).min(total));
        }
        Ok(global)
    }
}
