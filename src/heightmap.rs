//! Heightmap sources and sampling
//!
//! Sampling follows the texture unit the domain pass is configured with:
//! bilinear filtering between texel centers, clamp-to-edge addressing. The
//! WGSL `sample_height` function performs the same arithmetic.

use crate::constants::terrain::MAX_HEIGHTMAP_RESOLUTION;
use crate::error::{invalid_config, ErrorContext, TerrainError, TerrainResult};
use noise::{Fbm, MultiFractal, NoiseFn, Perlin};
use serde::{Deserialize, Serialize};

/// Anything the domain evaluator can read heights from
pub trait HeightSampler: Send + Sync {
    /// Red channel at `uv`, normally in [0, 1]
    fn sample_red(&self, uv: [f32; 2]) -> f32;
}

/// Where the terrain heightmap comes from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HeightmapSource {
    Flat {
        resolution: u32,
        value: f32,
    },
    Procedural {
        resolution: u32,
        seed: u32,
        octaves: usize,
        frequency: f64,
    },
    Image {
        path: String,
    },
}

impl HeightmapSource {
    /// Side length of a generated heightmap; `None` for decoded images
    pub fn resolution(&self) -> Option<u32> {
        match self {
            HeightmapSource::Flat { resolution, .. }
            | HeightmapSource::Procedural { resolution, .. } => Some(*resolution),
            HeightmapSource::Image { .. } => None,
        }
    }
}

impl Default for HeightmapSource {
    fn default() -> Self {
        HeightmapSource::Procedural {
            resolution: 512,
            seed: 7,
            octaves: 6,
            frequency: 3.0,
        }
    }
}

/// Single-channel height field, row-major, row 0 at v = 0
#[derive(Debug, Clone, PartialEq)]
pub struct Heightmap {
    width: u32,
    height: u32,
    texels: Vec<f32>,
}

impl Heightmap {
    pub fn from_texels(width: u32, height: u32, texels: Vec<f32>) -> TerrainResult<Self> {
        if width == 0 || height == 0 {
            return Err(invalid_config(
                "heightmap",
                format!("{}x{}", width, height),
                "dimensions must be non-zero",
            ));
        }
        if texels.len() != (width as usize) * (height as usize) {
            return Err(TerrainError::TextureDimensions {
                expected: (width, height),
                found: (texels.len() as u32, 1),
            });
        }
        Ok(Self {
            width,
            height,
            texels,
        })
    }

    pub fn flat(width: u32, height: u32, value: f32) -> TerrainResult<Self> {
        let width = checked_side("heightmap width", width)?;
        let height = checked_side("heightmap height", height)?;
        Ok(Self {
            width,
            height,
            texels: vec![value; width as usize * height as usize],
        })
    }

    /// Fractal Perlin noise remapped to [0, 1]
    pub fn procedural(
        resolution: u32,
        seed: u32,
        octaves: usize,
        frequency: f64,
    ) -> TerrainResult<Self> {
        let resolution = checked_side("heightmap resolution", resolution)?;
        let fbm = Fbm::<Perlin>::new(seed)
            .set_octaves(octaves.clamp(1, Fbm::<Perlin>::MAX_OCTAVES))
            .set_frequency(frequency);

        let side = resolution as usize;
        let texels = (0..side * side)
            .map(|i| {
                let x = (i % side) as f64 / side as f64;
                let y = (i / side) as f64 / side as f64;
                ((fbm.get([x, y]) * 0.5 + 0.5) as f32).clamp(0.0, 1.0)
            })
            .collect();

        log::debug!(
            "[Heightmap] Generated {}x{} procedural heightmap (seed {}, {} octaves)",
            resolution,
            resolution,
            seed,
            octaves
        );

        Ok(Self {
            width: resolution,
            height: resolution,
            texels,
        })
    }

    /// Decode an image and keep its red channel
    pub fn from_image_path(path: &str) -> TerrainResult<Self> {
        let image = image::open(path).with_path(path)?.to_rgba32f();
        let (width, height) = image.dimensions();
        let texels = image.pixels().map(|pixel| pixel.0[0]).collect();
        log::info!("[Heightmap] Loaded {} ({}x{})", path, width, height);
        Self::from_texels(width, height, texels)
    }

    pub fn from_source(source: &HeightmapSource) -> TerrainResult<Self> {
        match source {
            HeightmapSource::Flat { resolution, value } => {
                Self::flat(*resolution, *resolution, *value)
            }
            HeightmapSource::Procedural {
                resolution,
                seed,
                octaves,
                frequency,
            } => Self::procedural(*resolution, *seed, *octaves, *frequency),
            HeightmapSource::Image { path } => Self::from_image_path(path),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn texels(&self) -> &[f32] {
        &self.texels
    }

    pub(crate) fn texels_mut(&mut self) -> &mut [f32] {
        &mut self.texels
    }

    /// Texel fetch with clamp-to-edge addressing
    pub fn texel(&self, x: i64, y: i64) -> f32 {
        let x = x.clamp(0, self.width as i64 - 1) as usize;
        let y = y.clamp(0, self.height as i64 - 1) as usize;
        self.texels[y * self.width as usize + x]
    }

    /// Bilinear sample between texel centers
    pub fn sample_bilinear(&self, uv: [f32; 2]) -> f32 {
        let x = uv[0] * self.width as f32 - 0.5;
        let y = uv[1] * self.height as f32 - 0.5;
        let x0 = x.floor();
        let y0 = y.floor();
        let fx = x - x0;
        let fy = y - y0;
        let (x0, y0) = (x0 as i64, y0 as i64);

        let top = self.texel(x0, y0) * (1.0 - fx) + self.texel(x0 + 1, y0) * fx;
        let bottom = self.texel(x0, y0 + 1) * (1.0 - fx) + self.texel(x0 + 1, y0 + 1) * fx;
        top * (1.0 - fy) + bottom * fy
    }
}

impl HeightSampler for Heightmap {
    fn sample_red(&self, uv: [f32; 2]) -> f32 {
        self.sample_bilinear(uv)
    }
}

/// Generated heightmap sides must be in [1, MAX_HEIGHTMAP_RESOLUTION]
fn checked_side(field: &str, side: u32) -> TerrainResult<u32> {
    if side == 0 || side > MAX_HEIGHTMAP_RESOLUTION {
        return Err(invalid_config(
            field,
            side,
            &format!("must be in [1, {}]", MAX_HEIGHTMAP_RESOLUTION),
        ));
    }
    Ok(side)
}

/// Same height everywhere
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantHeight(pub f32);

impl HeightSampler for ConstantHeight {
    fn sample_red(&self, _uv: [f32; 2]) -> f32 {
        self.0
    }
}
