//! Sculpting brush
//!
//! Raises or lowers the heightmap around a picked terrain point. The edit
//! happens on the CPU copy; the renderer re-uploads the height texture.

use crate::constants::brush::{
    DEFAULT_SIZE, DEFAULT_STRENGTH, MAX_SIZE, MIN_SIZE, RESIZE_STEP,
};
use crate::heightmap::Heightmap;
use crate::patch_grid::TerrainExtent;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainBrush {
    /// Radius in world units
    pub size: f32,
    /// Normalized height change per second at the center
    pub strength: f32,
}

impl Default for TerrainBrush {
    fn default() -> Self {
        Self {
            size: DEFAULT_SIZE,
            strength: DEFAULT_STRENGTH,
        }
    }
}

impl TerrainBrush {
    /// Scrolling up shrinks the brush
    pub fn resized(&self, scroll_lines: f32) -> Self {
        Self {
            size: (self.size - scroll_lines * RESIZE_STEP).clamp(MIN_SIZE, MAX_SIZE),
            ..*self
        }
    }

    /// 1 at the center, 0 at and beyond the radius, smooth in between
    pub fn falloff(&self, distance: f32) -> f32 {
        let t = distance / self.size;
        if !(t < 1.0) {
            return 0.0;
        }
        let s = 1.0 - t * t;
        s * s
    }

    /// Apply one frame of sculpting at world `center` (x, z).
    ///
    /// Heights stay in [0, 1]. Returns the number of texels changed.
    pub fn sculpt(
        &self,
        heightmap: &mut Heightmap,
        extent: &TerrainExtent,
        center: [f32; 2],
        delta_time: f32,
        raise: bool,
    ) -> usize {
        let (width, height) = (heightmap.width() as usize, heightmap.height() as usize);
        let texel_size = [extent.size / width as f32, extent.size / height as f32];
        let amount = self.strength * delta_time * if raise { 1.0 } else { -1.0 };
        if amount == 0.0 {
            return 0;
        }

        // Texel range covering the brush circle
        let span = |axis: usize, count: usize| {
            let low = (center[axis] - self.size - extent.origin[axis]) / texel_size[axis];
            let high = (center[axis] + self.size - extent.origin[axis]) / texel_size[axis];
            let low = low.floor().max(0.0) as usize;
            let high = (high.ceil().max(0.0) as usize).min(count);
            low..high
        };

        let mut changed = 0;
        let texels = heightmap.texels_mut();
        for y in span(1, height) {
            let z = extent.origin[1] + (y as f32 + 0.5) * texel_size[1];
            for x in span(0, width) {
                let px = extent.origin[0] + (x as f32 + 0.5) * texel_size[0];
                let distance = ((px - center[0]).powi(2) + (z - center[1]).powi(2)).sqrt();
                let weight = self.falloff(distance);
                if weight <= 0.0 {
                    continue;
                }
                let texel = &mut texels[y * width + x];
                let updated = (*texel + amount * weight).clamp(0.0, 1.0);
                if updated != *texel {
                    *texel = updated;
                    changed += 1;
                }
            }
        }

        if changed > 0 {
            log::debug!(
                "[TerrainBrush] {} texels at ({:.1}, {:.1}), radius {:.1}",
                changed,
                center[0],
                center[1],
                self.size
            );
        }
        changed
    }
}
