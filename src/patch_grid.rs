//! Patch grid over a square terrain extent
//!
//! Corners follow the patch convention: c0/c1 on the v = 1 edge, c2/c3 on
//! the v = 0 edge, first of each pair at u = 0. Terrain UV grows with x and
//! z, so c0 is the (min x, max z) corner and a domain sample (u, v) lands on
//! the matching terrain UV inside the patch.

use crate::constants::terrain::MAX_PATCHES;
use crate::error::{invalid_config, TerrainResult};
use crate::tessellation::{Patch, PatchCorner};
use serde::{Deserialize, Serialize};

/// Square region of the XZ plane covered by the terrain
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TerrainExtent {
    /// Minimum corner on X and Z
    pub origin: [f32; 2],
    pub size: f32,
}

impl TerrainExtent {
    /// Extent of the given size centered on the origin
    pub fn centered(size: f32) -> Self {
        Self {
            origin: [-size * 0.5, -size * 0.5],
            size,
        }
    }

    /// Terrain UV of a world XZ position
    pub fn uv_at(&self, x: f32, z: f32) -> [f32; 2] {
        [
            (x - self.origin[0]) / self.size,
            (z - self.origin[1]) / self.size,
        ]
    }

    pub fn contains(&self, x: f32, z: f32) -> bool {
        let [u, v] = self.uv_at(x, z);
        (0.0..=1.0).contains(&u) && (0.0..=1.0).contains(&v)
    }
}

fn corner(extent: &TerrainExtent, x: f32, z: f32) -> PatchCorner {
    PatchCorner::new([x, 0.0, z], extent.uv_at(x, z))
}

/// Build `patches_per_side`² flat patches, row-major along Z
pub fn build_patch_grid(extent: &TerrainExtent, patches_per_side: u32) -> TerrainResult<Vec<Patch>> {
    if !(extent.size > 0.0) {
        return Err(invalid_config("terrain_size", extent.size, "must be positive"));
    }
    let count = patches_per_side as u64 * patches_per_side as u64;
    if patches_per_side == 0 || count > MAX_PATCHES as u64 {
        return Err(invalid_config(
            "patches_per_side",
            patches_per_side,
            "patch count must be in [1, 65535]",
        ));
    }

    let step = extent.size / patches_per_side as f32;
    let [ox, oz] = extent.origin;

    let patches: Vec<Patch> = (0..patches_per_side)
        .flat_map(|row| (0..patches_per_side).map(move |column| (row, column)))
        .map(|(row, column)| {
            let x0 = ox + column as f32 * step;
            let z0 = oz + row as f32 * step;
            let (x1, z1) = (x0 + step, z0 + step);
            Patch::new([
                corner(extent, x0, z1),
                corner(extent, x1, z1),
                corner(extent, x0, z0),
                corner(extent, x1, z0),
            ])
        })
        .collect();

    log::debug!(
        "[PatchGrid] Built {} patches ({}x{}, step {:.2})",
        patches.len(),
        patches_per_side,
        patches_per_side,
        step
    );
    Ok(patches)
}
