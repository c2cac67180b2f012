//! Control pass - patch tessellation controller on the GPU
//!
//! Dispatches one 4-invocation workgroup per patch. Outputs the pass-through
//! control points and one `TessellationFactors` record per patch; the domain
//! pass reads both.

use super::shader_validation::{
    create_shader_module, with_validation_scope, EntryStage, CONTROL_PASS_SOURCE,
};
use crate::constants::bindings::TRANSFORMS_GROUP;
use crate::constants::tessellation::{CONTROL_POINTS_PER_PATCH, MAX_TESSELLATION_LEVEL};
use crate::constants::terrain::MAX_PATCHES;
use crate::error::{invalid_config, TerrainError, TerrainResult};
use crate::tessellation::{pack_control_points, GpuControlPoint, Patch, TessellationFactors};
use bytemuck::Pod;
use encase::ShaderType;
use wgpu::util::DeviceExt;

/// Matches `TessellationParams` in WGSL
#[derive(Debug, Clone, Copy, PartialEq, ShaderType)]
pub struct TessellationParams {
    pub tessellation_level: f32,
    pub height_scale: f32,
    pub max_level: u32,
    pub patch_count: u32,
}

impl TessellationParams {
    pub fn new(tessellation_level: f32, height_scale: f32, patch_count: u32) -> Self {
        Self {
            tessellation_level,
            height_scale,
            max_level: MAX_TESSELLATION_LEVEL as u32,
            patch_count,
        }
    }

    pub fn to_uniform_bytes(&self) -> TerrainResult<Vec<u8>> {
        let mut buffer = encase::UniformBuffer::new(Vec::new());
        buffer.write(self).map_err(|e| TerrainError::Internal {
            message: format!("TessellationParams encoding failed: {}", e),
        })?;
        Ok(buffer.into_inner())
    }
}

pub struct ControlPass {
    pipeline: wgpu::ComputePipeline,
    bind_group: wgpu::BindGroup,
    params_buffer: wgpu::Buffer,
    control_points: wgpu::Buffer,
    factors: wgpu::Buffer,
    patch_count: u32,
}

fn storage_entry(binding: u32, read_only: bool) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Storage { read_only },
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

impl ControlPass {
    pub fn new(
        device: &wgpu::Device,
        transforms_layout: &wgpu::BindGroupLayout,
        patches: &[Patch],
        params: &TessellationParams,
    ) -> TerrainResult<Self> {
        let patch_count = patches.len() as u32;
        if patches.is_empty() || patches.len() > MAX_PATCHES as usize {
            return Err(invalid_config(
                "patches",
                patches.len(),
                "patch count must be in [1, 65535]",
            ));
        }

        let shader = create_shader_module(
            device,
            "control_pass",
            CONTROL_PASS_SOURCE,
            &[("control_main", EntryStage::Compute)],
        )?;

        let params_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Tessellation Params"),
            contents: &params.to_uniform_bytes()?,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let patches_in = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Patch Control Points In"),
            contents: bytemuck::cast_slice(&pack_control_points(patches)),
            usage: wgpu::BufferUsages::STORAGE,
        });

        let control_points = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Patch Control Points Out"),
            size: (patches.len() * CONTROL_POINTS_PER_PATCH * std::mem::size_of::<GpuControlPoint>())
                as u64,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });

        let factors = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Tessellation Factors"),
            size: (patches.len() * std::mem::size_of::<TessellationFactors>()) as u64,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });

        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Control Pass Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: Some(TessellationParams::min_size()),
                    },
                    count: None,
                },
                storage_entry(1, true),
                storage_entry(2, false),
                storage_entry(3, false),
            ],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Control Pass Bind Group"),
            layout: &layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: params_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: patches_in.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: control_points.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: factors.as_entire_binding(),
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Control Pass Pipeline Layout"),
            bind_group_layouts: &[transforms_layout, &layout],
            push_constant_ranges: &[],
        });

        let pipeline = with_validation_scope(device, "control_pass pipeline", || {
            device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
                label: Some("Control Pass Pipeline"),
                layout: Some(&pipeline_layout),
                module: &shader,
                entry_point: "control_main",
            })
        })?;

        log::info!("[ControlPass] Created for {} patches", patch_count);

        Ok(Self {
            pipeline,
            bind_group,
            params_buffer,
            control_points,
            factors,
            patch_count,
        })
    }

    pub fn patch_count(&self) -> u32 {
        self.patch_count
    }

    pub fn params_buffer(&self) -> &wgpu::Buffer {
        &self.params_buffer
    }

    /// Pass-through control points, 4 per patch
    pub fn control_points(&self) -> &wgpu::Buffer {
        &self.control_points
    }

    pub fn factors(&self) -> &wgpu::Buffer {
        &self.factors
    }

    pub fn update_params(&self, queue: &wgpu::Queue, params: &TessellationParams) -> TerrainResult<()> {
        queue.write_buffer(&self.params_buffer, 0, &params.to_uniform_bytes()?);
        Ok(())
    }

    pub fn dispatch(&self, encoder: &mut wgpu::CommandEncoder, transforms: &wgpu::BindGroup) {
        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("Control Pass"),
            timestamp_writes: None,
        });
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(TRANSFORMS_GROUP, transforms, &[]);
        pass.set_bind_group(1, &self.bind_group, &[]);
        pass.dispatch_workgroups(self.patch_count, 1, 1);
    }

    /// Read back the factors written by the last dispatch
    pub async fn read_factors(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
    ) -> TerrainResult<Vec<TessellationFactors>> {
        read_buffer(device, queue, &self.factors, "tessellation factors").await
    }

    /// Read back the pass-through control points of the last dispatch
    pub async fn read_control_points(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
    ) -> TerrainResult<Vec<GpuControlPoint>> {
        read_buffer(device, queue, &self.control_points, "control points").await
    }
}

/// Copy a storage buffer into a mappable one and decode it
async fn read_buffer<T: Pod>(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    source: &wgpu::Buffer,
    operation: &str,
) -> TerrainResult<Vec<T>> {
    let readback = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Readback Buffer"),
        size: source.size(),
        usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("Readback"),
    });
    encoder.copy_buffer_to_buffer(source, 0, &readback, 0, source.size());
    queue.submit(Some(encoder.finish()));

    let buffer_slice = readback.slice(..);
    let (sender, receiver) = flume::bounded(1);
    buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
        let _ = sender.send(result);
    });

    device.poll(wgpu::Maintain::Wait);
    receiver
        .recv_async()
        .await
        .map_err(|_| TerrainError::BufferMapping {
            operation: format!("{} recv_async", operation),
        })?
        .map_err(|_| TerrainError::BufferMapping {
            operation: format!("{} map_async", operation),
        })?;

    let data = buffer_slice.get_mapped_range();
    let values = bytemuck::cast_slice::<u8, T>(&data).to_vec();
    drop(data);
    readback.unmap();

    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_uniform_layout() {
        let params = TessellationParams::new(6.0, 250.0, 1024);
        let bytes = params.to_uniform_bytes().expect("encodable");
        assert_eq!(bytes.len(), 16);
        assert_eq!(&bytes[0..4], &6.0f32.to_le_bytes());
        assert_eq!(&bytes[4..8], &250.0f32.to_le_bytes());
        assert_eq!(&bytes[8..12], &16u32.to_le_bytes());
        assert_eq!(&bytes[12..16], &1024u32.to_le_bytes());
    }
}
