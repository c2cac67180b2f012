//! Terrain Surface Shader
//!
//! The terrain color is the surface texture at the interpolated UV, with no
//! lighting applied. `surface_main` in WGSL does the lookup on the GPU with
//! a linear, clamp-to-edge sampler.

use crate::error::{ErrorContext, TerrainError, TerrainResult};
use crate::heightmap::Heightmap;

/// RGBA8 surface texture, row 0 at v = 0
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceTexture {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl SurfaceTexture {
    pub fn from_rgba8(width: u32, height: u32, rgba: Vec<u8>) -> TerrainResult<Self> {
        if width == 0 || height == 0 || rgba.len() != (width * height * 4) as usize {
            return Err(TerrainError::TextureDimensions {
                expected: (width, height),
                found: ((rgba.len() / 4) as u32, 1),
            });
        }
        Ok(Self {
            width,
            height,
            rgba,
        })
    }

    pub fn solid(color: [u8; 4]) -> Self {
        Self {
            width: 1,
            height: 1,
            rgba: color.to_vec(),
        }
    }

    pub fn from_image_path(path: &str) -> TerrainResult<Self> {
        let image = image::open(path).with_path(path)?.to_rgba8();
        let (width, height) = image.dimensions();
        log::info!("[Surface] Loaded {} ({}x{})", path, width, height);
        Self::from_rgba8(width, height, image.into_raw())
    }

    /// Altitude-banded coloring of a heightmap, used when no texture is given
    pub fn from_heightmap(heightmap: &Heightmap) -> Self {
        const BANDS: [(f32, [u8; 3]); 5] = [
            (0.00, [38, 70, 40]),
            (0.35, [70, 105, 52]),
            (0.55, [118, 102, 78]),
            (0.75, [132, 128, 124]),
            (0.90, [236, 236, 240]),
        ];

        let rgba = heightmap
            .texels()
            .iter()
            .flat_map(|&h| {
                let band = BANDS
                    .iter()
                    .rev()
                    .find(|(threshold, _)| h >= *threshold)
                    .map_or(BANDS[0].1, |(_, color)| *color);
                [band[0], band[1], band[2], 255]
            })
            .collect();

        Self {
            width: heightmap.width(),
            height: heightmap.height(),
            rgba,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn rgba(&self) -> &[u8] {
        &self.rgba
    }

    fn texel(&self, x: i64, y: i64) -> [f32; 4] {
        let x = x.clamp(0, self.width as i64 - 1) as usize;
        let y = y.clamp(0, self.height as i64 - 1) as usize;
        let offset = (y * self.width as usize + x) * 4;
        let mut color = [0.0; 4];
        for (channel, value) in color.iter_mut().zip(&self.rgba[offset..offset + 4]) {
            *channel = *value as f32 / 255.0;
        }
        color
    }

    /// Bilinear, clamp-to-edge lookup in normalized color
    pub fn sample(&self, uv: [f32; 2]) -> [f32; 4] {
        let x = uv[0] * self.width as f32 - 0.5;
        let y = uv[1] * self.height as f32 - 0.5;
        let (x0, y0) = (x.floor(), y.floor());
        let (fx, fy) = (x - x0, y - y0);
        let (x0, y0) = (x0 as i64, y0 as i64);

        let corners = [
            (self.texel(x0, y0), (1.0 - fx) * (1.0 - fy)),
            (self.texel(x0 + 1, y0), fx * (1.0 - fy)),
            (self.texel(x0, y0 + 1), (1.0 - fx) * fy),
            (self.texel(x0 + 1, y0 + 1), fx * fy),
        ];

        let mut color = [0.0; 4];
        for (texel, weight) in corners {
            for (channel, value) in color.iter_mut().zip(texel) {
                *channel += value * weight;
            }
        }
        color
    }
}

/// Final terrain pixel color for an interpolated UV
pub fn shade_surface(texture: &SurfaceTexture, tile_uv: [f32; 2]) -> [f32; 4] {
    texture.sample(tile_uv)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solid_texture_is_returned_unmodified() {
        let texture = SurfaceTexture::solid([255, 0, 51, 255]);
        let color = shade_surface(&texture, [0.3, 0.8]);
        for (channel, expected) in color.iter().zip([1.0, 0.0, 0.2, 1.0]) {
            assert!((channel - expected).abs() < 1e-6);
        }
    }

    #[test]
    fn test_texel_centers_are_exact() {
        let texture =
            SurfaceTexture::from_rgba8(2, 1, vec![255, 0, 0, 255, 0, 0, 255, 255]).expect("valid");
        assert_eq!(shade_surface(&texture, [0.25, 0.5]), [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(shade_surface(&texture, [0.75, 0.5]), [0.0, 0.0, 1.0, 1.0]);
    }

    #[test]
    fn test_uv_outside_texture_clamps() {
        let texture =
            SurfaceTexture::from_rgba8(2, 1, vec![255, 0, 0, 255, 0, 0, 255, 255]).expect("valid");
        assert_eq!(shade_surface(&texture, [-1.0, 0.5]), [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(shade_surface(&texture, [2.0, 2.0]), [0.0, 0.0, 1.0, 1.0]);
    }

    #[test]
    fn test_heightmap_bands_follow_altitude() {
        let heightmap = Heightmap::from_texels(2, 1, vec![0.0, 1.0]).expect("valid");
        let texture = SurfaceTexture::from_heightmap(&heightmap);
        assert_eq!(&texture.rgba()[0..4], &[38, 70, 40, 255]);
        assert_eq!(&texture.rgba()[4..8], &[236, 236, 240, 255]);
    }

    #[test]
    fn test_mismatched_buffer_is_rejected() {
        assert!(SurfaceTexture::from_rgba8(2, 2, vec![0; 3]).is_err());
    }
}
