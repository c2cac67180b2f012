//! Tessellation core
//!
//! CPU reference of the two programmable tessellation stages and the
//! tessellator between them. The GPU passes in `renderer` run the same
//! logic in WGSL; these functions define what those passes must produce.

pub mod controller;
pub mod domain;
pub mod factors;
pub mod metric;
pub mod patch_data;
pub mod tessellator;

pub use controller::{
    classify_patch, ControlStats, PatchControlResult, PatchController, PatchVisibility,
};
pub use domain::{displace, interpolate, DomainEvaluator, DomainVertex};
pub use factors::{TessellationFactors, OUTER_EDGE_CORNERS};
pub use metric::{TessellationMetric, UniformLevel};
pub use patch_data::{pack_control_points, GpuControlPoint, Patch, PatchCorner};
pub use tessellator::{
    expanded_sample, grid_dimensions, tessellate_quad, vertices_per_patch, DomainGrid,
    DomainSample,
};

use crate::heightmap::HeightSampler;
use crate::transforms::TransformBlock;

/// Geometry produced for one patch
#[derive(Debug, Clone)]
pub struct PatchGeometry {
    pub control: PatchControlResult,
    pub grid: DomainGrid,
    pub vertices: Vec<DomainVertex>,
}

/// Run controller, tessellator and domain evaluator over a patch list
pub fn tessellate_patches<M, H>(
    patches: &[Patch],
    transforms: &TransformBlock,
    controller: &PatchController<M>,
    heightmap: &H,
    height_scale: f32,
) -> (Vec<PatchGeometry>, ControlStats)
where
    M: TessellationMetric,
    H: HeightSampler + ?Sized,
{
    let (controls, stats) = controller.control_patches(patches, transforms);
    let evaluator = DomainEvaluator::new(heightmap, height_scale, transforms);

    let geometry = controls
        .into_iter()
        .map(|control| {
            let grid = tessellate_quad(&control.factors);
            // The evaluator reads the controller's pass-through corners
            let patch = Patch::new(control.control_points);
            let vertices = evaluator.evaluate_grid(&patch, &grid);
            PatchGeometry {
                control,
                grid,
                vertices,
            }
        })
        .collect();

    (geometry, stats)
}
