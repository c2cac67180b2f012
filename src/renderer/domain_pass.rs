//! Domain pass - tessellated terrain rendering
//!
//! Non-indexed draw, one instance per patch and a fixed vertex budget per
//! instance. `domain_main` evaluates each generated vertex from the control
//! pass outputs, `surface_main` colors it from the surface texture.

use super::control_pass::{ControlPass, TessellationParams};
use super::shader_validation::{
    create_shader_module, with_validation_scope, EntryStage, DOMAIN_PASS_SOURCE,
};
use super::textures::{create_linear_clamp_sampler, GpuTexture, DEPTH_FORMAT};
use crate::constants::bindings::TRANSFORMS_GROUP;
use crate::constants::tessellation::MAX_TESSELLATION_LEVEL;
use crate::error::TerrainResult;
use crate::tessellation::vertices_per_patch;
use encase::ShaderType;

pub struct DomainPass {
    pipeline: wgpu::RenderPipeline,
    patch_bind_group: wgpu::BindGroup,
    texture_bind_group: wgpu::BindGroup,
    vertices_per_patch: u32,
    patch_count: u32,
}

fn vertex_storage_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::VERTEX,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Storage { read_only: true },
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

impl DomainPass {
    pub fn new(
        device: &wgpu::Device,
        transforms_layout: &wgpu::BindGroupLayout,
        control: &ControlPass,
        height_texture: &GpuTexture,
        surface_texture: &GpuTexture,
        color_format: wgpu::TextureFormat,
    ) -> TerrainResult<Self> {
        let shader = create_shader_module(
            device,
            "domain_pass",
            DOMAIN_PASS_SOURCE,
            &[
                ("domain_main", EntryStage::Vertex),
                ("surface_main", EntryStage::Fragment),
            ],
        )?;

        let patch_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Domain Pass Patch Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: Some(TessellationParams::min_size()),
                    },
                    count: None,
                },
                vertex_storage_entry(1),
                vertex_storage_entry(2),
            ],
        });

        let patch_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Domain Pass Patch Bind Group"),
            layout: &patch_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: control.params_buffer().as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: control.control_points().as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: control.factors().as_entire_binding(),
                },
            ],
        });

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Domain Pass Texture Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: false },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let sampler = create_linear_clamp_sampler(device, "Surface Sampler");
        let texture_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Domain Pass Texture Bind Group"),
            layout: &texture_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&height_texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&surface_texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Domain Pass Pipeline Layout"),
            bind_group_layouts: &[transforms_layout, &patch_layout, &texture_layout],
            push_constant_ranges: &[],
        });

        let pipeline = with_validation_scope(device, "domain_pass pipeline", || {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("Domain Pass Pipeline"),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: "domain_main",
                    buffers: &[],
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: "surface_main",
                    targets: &[Some(wgpu::ColorTargetState {
                        format: color_format,
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    // Terrain is visible from below as well
                    cull_mode: None,
                    ..Default::default()
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DEPTH_FORMAT,
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
            })
        })?;

        let vertices_per_patch = vertices_per_patch(MAX_TESSELLATION_LEVEL);
        log::info!(
            "[DomainPass] Created: {} patches x {} vertices",
            control.patch_count(),
            vertices_per_patch
        );

        Ok(Self {
            pipeline,
            patch_bind_group,
            texture_bind_group,
            vertices_per_patch,
            patch_count: control.patch_count(),
        })
    }

    pub fn draw<'a>(&'a self, pass: &mut wgpu::RenderPass<'a>, transforms: &'a wgpu::BindGroup) {
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(TRANSFORMS_GROUP, transforms, &[]);
        pass.set_bind_group(1, &self.patch_bind_group, &[]);
        pass.set_bind_group(2, &self.texture_bind_group, &[]);
        pass.draw(0..self.vertices_per_patch, 0..self.patch_count);
    }
}
