//! Patch Domain Evaluator
//!
//! Runs once per tessellator-generated vertex. Resolves the vertex's UV and
//! position by bilinear interpolation over the patch corners, displaces the
//! position along +Y by the heightmap, and projects it. Mirrors
//! `domain_main` in WGSL.

use super::patch_data::Patch;
use super::tessellator::{DomainGrid, DomainSample};
use crate::heightmap::HeightSampler;
use crate::transforms::TransformBlock;
use cgmath::{Matrix4, Vector2, Vector3, Vector4};
use rayon::prelude::*;

/// A fully resolved terrain vertex
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DomainVertex {
    pub clip_position: Vector4<f32>,
    /// Displaced position after the model transform
    pub world_position: Vector3<f32>,
    pub tile_uv: Vector2<f32>,
}

/// `a * (1 - t) + b * t`, the form WGSL `mix` uses.
/// Exact at both ends, unlike `a + (b - a) * t`.
fn mix<V>(a: V, b: V, t: f32) -> V
where
    V: std::ops::Mul<f32, Output = V> + std::ops::Add<Output = V>,
{
    a * (1.0 - t) + b * t
}

/// Bilinear position and UV of a domain sample, before displacement
pub fn interpolate(patch: &Patch, sample: DomainSample) -> (Vector3<f32>, Vector2<f32>) {
    let [c0, c1, c2, c3] = patch.corners;

    let uv_top = mix(c0.uv, c1.uv, sample.u);
    let uv_bottom = mix(c2.uv, c3.uv, sample.u);
    let tile_uv = mix(uv_bottom, uv_top, sample.v);

    let pos_top = mix(c0.position, c1.position, sample.u);
    let pos_bottom = mix(c2.position, c3.position, sample.u);
    let position = mix(pos_bottom, pos_top, sample.v);

    (position, tile_uv)
}

/// Add `height * height_scale` to the Y axis
pub fn displace(position: Vector3<f32>, height: f32, height_scale: f32) -> Vector3<f32> {
    Vector3::new(position.x, position.y + height * height_scale, position.z)
}

pub struct DomainEvaluator<'a, H: HeightSampler + ?Sized> {
    heightmap: &'a H,
    height_scale: f32,
    mvp: Matrix4<f32>,
    model: Matrix4<f32>,
}

impl<'a, H: HeightSampler + ?Sized> DomainEvaluator<'a, H> {
    pub fn new(heightmap: &'a H, height_scale: f32, transforms: &TransformBlock) -> Self {
        Self {
            heightmap,
            height_scale,
            mvp: transforms.mvp(),
            model: transforms.model(),
        }
    }

    pub fn height_scale(&self) -> f32 {
        self.height_scale
    }

    /// Evaluate one generated vertex
    pub fn evaluate(&self, patch: &Patch, sample: DomainSample) -> DomainVertex {
        let (position, tile_uv) = interpolate(patch, sample);
        let height = self.heightmap.sample_red(tile_uv.into());
        let displaced = displace(position, height, self.height_scale);
        let local = displaced.extend(1.0);

        DomainVertex {
            clip_position: self.mvp * local,
            world_position: (self.model * local).truncate(),
            tile_uv,
        }
    }

    /// Evaluate every sample of a tessellated patch; vertices are independent
    pub fn evaluate_grid(&self, patch: &Patch, grid: &DomainGrid) -> Vec<DomainVertex> {
        grid.samples
            .par_iter()
            .map(|&sample| self.evaluate(patch, sample))
            .collect()
    }
}
