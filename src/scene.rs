//! Terrain scene - everything loaded from a `TerrainConfig`

use crate::config::TerrainConfig;
use crate::error::TerrainResult;
use crate::heightmap::Heightmap;
use crate::patch_grid::{build_patch_grid, TerrainExtent};
use crate::picking::TerrainSurface;
use crate::skybox::CubemapImage;
use crate::surface::SurfaceTexture;
use crate::tessellation::Patch;

const GRADIENT_SKY_SIZE: u32 = 64;
const ZENITH: [u8; 3] = [46, 96, 178];
const HORIZON: [u8; 3] = [196, 214, 232];

/// CPU-side assets of one terrain
#[derive(Debug, Clone)]
pub struct TerrainScene {
    pub extent: TerrainExtent,
    pub height_scale: f32,
    pub patches: Vec<Patch>,
    pub heightmap: Heightmap,
    pub surface: SurfaceTexture,
    pub cubemap: CubemapImage,
}

impl TerrainScene {
    pub fn load(config: &TerrainConfig) -> TerrainResult<Self> {
        let extent = config.extent();
        let patches = build_patch_grid(&extent, config.patches_per_side)?;
        let heightmap = Heightmap::from_source(&config.heightmap)?;

        let surface = match &config.surface_texture {
            Some(path) => SurfaceTexture::from_image_path(path)?,
            None => SurfaceTexture::from_heightmap(&heightmap),
        };

        let cubemap = match &config.skybox {
            Some(faces) => CubemapImage::load(faces)?,
            None => CubemapImage::gradient(GRADIENT_SKY_SIZE, ZENITH, HORIZON),
        };

        log::info!(
            "[TerrainScene] {} patches over {}x{} units, heightmap {}x{}",
            patches.len(),
            extent.size,
            extent.size,
            heightmap.width(),
            heightmap.height()
        );

        Ok(Self {
            extent,
            height_scale: config.height_scale,
            patches,
            heightmap,
            surface,
            cubemap,
        })
    }

    /// Displaced surface for picking
    pub fn surface(&self) -> TerrainSurface<'_, Heightmap> {
        TerrainSurface {
            heightmap: &self.heightmap,
            extent: self.extent,
            height_scale: self.height_scale,
        }
    }
}
