//! Terrain renderer - frame orchestration
//!
//! Per frame: upload the transform snapshot if it changed, run the control
//! pass, then one render pass drawing the terrain followed by the skybox.

use super::control_pass::{ControlPass, TessellationParams};
use super::domain_pass::DomainPass;
use super::gpu_context::GpuContext;
use super::skybox_pass::SkyboxPass;
use super::textures::{
    create_cubemap_texture, create_depth_texture, create_height_texture, create_surface_texture,
    write_height_texture, GpuTexture,
};
use super::transform_buffer::TransformBuffer;
use crate::config::clamp_tessellation_level;
use crate::error::TerrainResult;
use crate::heightmap::Heightmap;
use crate::scene::TerrainScene;
use crate::tessellation::TessellationFactors;
use crate::transforms::TransformSnapshot;

const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.0,
    g: 0.0,
    b: 0.0,
    a: 1.0,
};

pub struct TerrainRenderer {
    transforms: TransformBuffer,
    control: ControlPass,
    domain: DomainPass,
    skybox: SkyboxPass,
    depth: GpuTexture,
    params: TessellationParams,
    params_dirty: bool,
    height_texture: GpuTexture,
    // Sampled by the bind groups above
    _surface_texture: GpuTexture,
    _cubemap: GpuTexture,
}

impl TerrainRenderer {
    pub fn new(
        context: &GpuContext,
        scene: &TerrainScene,
        tessellation_level: f32,
        color_format: wgpu::TextureFormat,
        size: (u32, u32),
    ) -> TerrainResult<Self> {
        let device = context.device.as_ref();
        let queue = context.queue.as_ref();

        let transforms = TransformBuffer::new(device);
        let params = TessellationParams::new(
            clamp_tessellation_level(tessellation_level),
            scene.height_scale,
            scene.patches.len() as u32,
        );

        let height_texture = create_height_texture(device, queue, &scene.heightmap)?;
        let surface_texture = create_surface_texture(device, queue, &scene.surface)?;
        let cubemap = create_cubemap_texture(device, queue, &scene.cubemap)?;

        let control = ControlPass::new(
            device,
            transforms.bind_group_layout(),
            &scene.patches,
            &params,
        )?;
        let domain = DomainPass::new(
            device,
            transforms.bind_group_layout(),
            &control,
            &height_texture,
            &surface_texture,
            color_format,
        )?;
        let skybox = SkyboxPass::new(device, transforms.bind_group_layout(), &cubemap, color_format)?;
        let depth = create_depth_texture(device, size.0, size.1)?;

        log::info!(
            "[TerrainRenderer] Ready: {}x{}, tessellation level {}",
            size.0,
            size.1,
            params.tessellation_level
        );

        Ok(Self {
            transforms,
            control,
            domain,
            skybox,
            depth,
            params,
            params_dirty: false,
            height_texture,
            _surface_texture: surface_texture,
            _cubemap: cubemap,
        })
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) -> TerrainResult<()> {
        self.depth = create_depth_texture(device, width, height)?;
        Ok(())
    }

    pub fn tessellation_level(&self) -> f32 {
        self.params.tessellation_level
    }

    /// Set the level for following frames; returns the clamped value
    pub fn set_tessellation_level(&mut self, level: f32) -> f32 {
        let level = clamp_tessellation_level(level);
        if level != self.params.tessellation_level {
            self.params.tessellation_level = level;
            self.params_dirty = true;
            log::debug!("[TerrainRenderer] Tessellation level -> {}", level);
        }
        level
    }

    /// Re-upload the heightmap after an edit; the size must not change
    pub fn update_heightmap(&self, queue: &wgpu::Queue, heightmap: &Heightmap) -> TerrainResult<()> {
        write_height_texture(queue, &self.height_texture, heightmap)
    }

    /// Render one frame into `target`
    pub fn render(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        target: &wgpu::TextureView,
        snapshot: &TransformSnapshot,
    ) -> TerrainResult<()> {
        self.transforms.sync(queue, snapshot);
        if self.params_dirty {
            self.control.update_params(queue, &self.params)?;
            self.params_dirty = false;
        }

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Terrain Frame"),
        });

        self.control.dispatch(&mut encoder, self.transforms.bind_group());

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Terrain Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            self.domain.draw(&mut pass, self.transforms.bind_group());
            self.skybox.draw(&mut pass, self.transforms.bind_group());
        }

        queue.submit(Some(encoder.finish()));
        Ok(())
    }

    /// Factors from the most recent control pass
    pub async fn read_factors(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
    ) -> TerrainResult<Vec<TessellationFactors>> {
        self.control.read_factors(device, queue).await
    }

    pub fn control_pass(&self) -> &ControlPass {
        &self.control
    }
}
