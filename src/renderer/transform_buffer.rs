//! GPU copy of the shared transform block
//!
//! One uniform buffer bound at group 0, binding 0 for every pipeline. The
//! buffer is rewritten only when a newer snapshot version is seen.

use crate::constants::bindings::TRANSFORMS_BINDING;
use crate::transforms::{TransformBlock, TransformSnapshot};

/// Tracks which snapshot version the GPU already holds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UploadTracker {
    uploaded: Option<u64>,
}

impl UploadTracker {
    /// Record `version` and report whether it needs uploading
    pub fn needs_upload(&mut self, version: u64) -> bool {
        if self.uploaded == Some(version) {
            return false;
        }
        self.uploaded = Some(version);
        true
    }
}

pub struct TransformBuffer {
    buffer: wgpu::Buffer,
    bind_group_layout: wgpu::BindGroupLayout,
    bind_group: wgpu::BindGroup,
    tracker: UploadTracker,
}

impl TransformBuffer {
    pub fn new(device: &wgpu::Device) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Transform Block"),
            size: std::mem::size_of::<TransformBlock>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Transform Block Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: TRANSFORMS_BINDING,
                visibility: wgpu::ShaderStages::COMPUTE
                    | wgpu::ShaderStages::VERTEX
                    | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(
                        std::mem::size_of::<TransformBlock>() as u64,
                    ),
                },
                count: None,
            }],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Transform Block Bind Group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: TRANSFORMS_BINDING,
                resource: buffer.as_entire_binding(),
            }],
        });

        Self {
            buffer,
            bind_group_layout,
            bind_group,
            tracker: UploadTracker::default(),
        }
    }

    /// Upload `snapshot` if it is newer than what the GPU holds
    pub fn sync(&mut self, queue: &wgpu::Queue, snapshot: &TransformSnapshot) -> bool {
        if !self.tracker.needs_upload(snapshot.version) {
            return false;
        }
        queue.write_buffer(&self.buffer, 0, bytemuck::bytes_of(&snapshot.block));
        log::trace!("[TransformBuffer] Uploaded version {}", snapshot.version);
        true
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}
