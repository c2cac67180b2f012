//! Texture uploads
//!
//! Sizes are checked against the device limits, then creation and upload run
//! inside a validation scope. Failures come back as `TextureCreation`.

use super::shader_validation::capture_validation_error;
use crate::error::{TerrainError, TerrainResult};
use crate::heightmap::Heightmap;
use crate::skybox::CubemapImage;
use crate::surface::SurfaceTexture;

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// A texture with its default view
pub struct GpuTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

/// Reject sizes the device cannot hold
fn check_texture_size(device: &wgpu::Device, label: &str, size: (u32, u32)) -> TerrainResult<()> {
    let max = device.limits().max_texture_dimension_2d;
    if size.0 == 0 || size.1 == 0 || size.0 > max || size.1 > max {
        log::error!(
            "[Textures] {} is {}x{}, device limit is {}",
            label,
            size.0,
            size.1,
            max
        );
        return Err(TerrainError::TextureCreation {
            label: label.to_string(),
            error: format!("{}x{} outside the device limit of {}", size.0, size.1, max),
        });
    }
    Ok(())
}

/// Create a texture and run `fill` on it, turning validation errors into `Err`
fn create_checked(
    device: &wgpu::Device,
    descriptor: &wgpu::TextureDescriptor,
    fill: impl FnOnce(&wgpu::Texture),
) -> TerrainResult<wgpu::Texture> {
    let label = descriptor.label.unwrap_or("texture");
    check_texture_size(device, label, (descriptor.size.width, descriptor.size.height))?;

    match capture_validation_error(device, || {
        let texture = device.create_texture(descriptor);
        fill(&texture);
        texture
    }) {
        (_, Some(error)) => {
            log::error!("[Textures] {} failed validation: {}", label, error);
            Err(TerrainError::TextureCreation {
                label: label.to_string(),
                error: error.to_string(),
            })
        }
        (texture, None) => Ok(texture),
    }
}

fn sampled_descriptor<'a>(
    label: &'a str,
    size: (u32, u32),
    layers: u32,
    format: wgpu::TextureFormat,
) -> wgpu::TextureDescriptor<'a> {
    wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width: size.0,
            height: size.1,
            depth_or_array_layers: layers,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    }
}

fn upload_layer(
    queue: &wgpu::Queue,
    texture: &wgpu::Texture,
    layer: u32,
    bytes_per_texel: u32,
    size: (u32, u32),
    data: &[u8],
) {
    queue.write_texture(
        wgpu::ImageCopyTexture {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d { x: 0, y: 0, z: layer },
            aspect: wgpu::TextureAspect::All,
        },
        data,
        wgpu::ImageDataLayout {
            offset: 0,
            bytes_per_row: Some(size.0 * bytes_per_texel),
            rows_per_image: Some(size.1),
        },
        wgpu::Extent3d {
            width: size.0,
            height: size.1,
            depth_or_array_layers: 1,
        },
    );
}

/// Single-channel float heightmap, read with `textureLoad` in the domain pass
pub fn create_height_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    heightmap: &Heightmap,
) -> TerrainResult<GpuTexture> {
    let size = (heightmap.width(), heightmap.height());
    let descriptor = sampled_descriptor("Heightmap", size, 1, wgpu::TextureFormat::R32Float);
    let texture = create_checked(device, &descriptor, |texture| {
        upload_layer(queue, texture, 0, 4, size, bytemuck::cast_slice(heightmap.texels()));
    })?;

    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    Ok(GpuTexture { texture, view })
}

/// Overwrite an existing height texture with an edited heightmap of the same size
pub fn write_height_texture(
    queue: &wgpu::Queue,
    target: &GpuTexture,
    heightmap: &Heightmap,
) -> TerrainResult<()> {
    let expected = (target.texture.width(), target.texture.height());
    let found = (heightmap.width(), heightmap.height());
    if expected != found {
        return Err(TerrainError::TextureDimensions { expected, found });
    }
    upload_layer(
        queue,
        &target.texture,
        0,
        4,
        found,
        bytemuck::cast_slice(heightmap.texels()),
    );
    Ok(())
}

pub fn create_surface_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    surface: &SurfaceTexture,
) -> TerrainResult<GpuTexture> {
    let size = (surface.width(), surface.height());
    let descriptor =
        sampled_descriptor("Surface Texture", size, 1, wgpu::TextureFormat::Rgba8UnormSrgb);
    let texture = create_checked(device, &descriptor, |texture| {
        upload_layer(queue, texture, 0, 4, size, surface.rgba());
    })?;

    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    Ok(GpuTexture { texture, view })
}

/// Six-layer texture viewed as a cube
pub fn create_cubemap_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    cubemap: &CubemapImage,
) -> TerrainResult<GpuTexture> {
    let size = (cubemap.size, cubemap.size);
    let descriptor =
        sampled_descriptor("Skybox Cubemap", size, 6, wgpu::TextureFormat::Rgba8UnormSrgb);
    let texture = create_checked(device, &descriptor, |texture| {
        for (layer, face) in cubemap.faces.iter().enumerate() {
            upload_layer(queue, texture, layer as u32, 4, size, face);
        }
    })?;

    let view = texture.create_view(&wgpu::TextureViewDescriptor {
        label: Some("Skybox Cubemap View"),
        dimension: Some(wgpu::TextureViewDimension::Cube),
        ..Default::default()
    });
    Ok(GpuTexture { texture, view })
}

pub fn create_depth_texture(
    device: &wgpu::Device,
    width: u32,
    height: u32,
) -> TerrainResult<GpuTexture> {
    let descriptor = wgpu::TextureDescriptor {
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        ..sampled_descriptor("Depth Buffer", (width.max(1), height.max(1)), 1, DEPTH_FORMAT)
    };
    let texture = create_checked(device, &descriptor, |_| {})?;
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    Ok(GpuTexture { texture, view })
}

/// Linear filtering, clamp-to-edge on every axis
pub fn create_linear_clamp_sampler(device: &wgpu::Device, label: &str) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some(label),
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::FilterMode::Nearest,
        ..Default::default()
    })
}
