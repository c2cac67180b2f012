//! Terrain picking
//!
//! Intersects a view ray with the displaced terrain surface. The surface is
//! the heightmap stretched over the terrain extent, which is what the domain
//! pass renders at the limit of infinite tessellation.

use crate::heightmap::HeightSampler;
use crate::patch_grid::TerrainExtent;
use cgmath::{InnerSpace, Point3, Vector3};

const MARCH_STEPS: u32 = 512;
const BISECTION_STEPS: u32 = 24;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Point3<f32>,
    /// Unit length
    pub direction: Vector3<f32>,
}

impl Ray {
    pub fn new(origin: Point3<f32>, direction: Vector3<f32>) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    pub fn at(&self, distance: f32) -> Point3<f32> {
        self.origin + self.direction * distance
    }
}

/// Hit on the terrain surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TerrainHit {
    pub position: Point3<f32>,
    pub distance: f32,
    pub tile_uv: [f32; 2],
}

/// Displaced terrain, for CPU-side height queries
pub struct TerrainSurface<'a, H: HeightSampler + ?Sized> {
    pub heightmap: &'a H,
    pub extent: TerrainExtent,
    pub height_scale: f32,
}

impl<'a, H: HeightSampler + ?Sized> TerrainSurface<'a, H> {
    /// Surface height at a world XZ position, `None` outside the extent
    pub fn height_at(&self, x: f32, z: f32) -> Option<f32> {
        if !self.extent.contains(x, z) {
            return None;
        }
        Some(self.heightmap.sample_red(self.extent.uv_at(x, z)) * self.height_scale)
    }

    /// Signed height of a point above the surface
    fn clearance(&self, point: Point3<f32>) -> Option<f32> {
        self.height_at(point.x, point.z).map(|h| point.y - h)
    }

    /// First intersection within `max_distance`
    ///
    /// Marches in fixed steps until the ray passes below the surface, then
    /// bisects the bracketing interval.
    pub fn intersect_ray(&self, ray: &Ray, max_distance: f32) -> Option<TerrainHit> {
        if !(max_distance > 0.0) {
            return None;
        }
        let step = max_distance / MARCH_STEPS as f32;

        let mut previous: Option<f32> = None;
        for i in 0..=MARCH_STEPS {
            let t = i as f32 * step;
            let Some(clearance) = self.clearance(ray.at(t)) else {
                previous = None;
                continue;
            };

            if clearance <= 0.0 {
                let distance = match previous {
                    Some(start) => self.bisect(ray, start, t),
                    // Origin already under the surface, or entered from outside the extent
                    None => t,
                };
                let position = ray.at(distance);
                return Some(TerrainHit {
                    position,
                    distance,
                    tile_uv: self.extent.uv_at(position.x, position.z),
                });
            }
            previous = Some(t);
        }
        None
    }

    fn bisect(&self, ray: &Ray, mut above: f32, mut below: f32) -> f32 {
        for _ in 0..BISECTION_STEPS {
            let middle = 0.5 * (above + below);
            match self.clearance(ray.at(middle)) {
                Some(c) if c > 0.0 => above = middle,
                _ => below = middle,
            }
        }
        below
    }
}
