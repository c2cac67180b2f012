//! Patch Tessellation Controller
//!
//! Mirrors the `control_main` compute entry point. Each patch is handled by a
//! group of four invocations, one per control point:
//!
//! 1. every invocation passes its corner through and records the corner's
//!    clip-space depth in group-shared storage;
//! 2. barrier;
//! 3. the leader (invocation 0) alone classifies the patch and publishes the
//!    six tessellation factors.
//!
//! Patches are independent, so groups run in parallel across patches.

use super::factors::{TessellationFactors, OUTER_EDGE_CORNERS};
use super::metric::TessellationMetric;
use super::patch_data::{Patch, PatchCorner};
use crate::constants::tessellation::{CONTROL_POINTS_PER_PATCH, LEADER_INVOCATION};
use crate::transforms::TransformBlock;
use cgmath::{Matrix4, Vector4};
use rayon::prelude::*;

/// Visibility decision for one patch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchVisibility {
    /// Every corner lies behind the view plane
    Culled,
    Visible,
}

/// Output of one invocation group
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PatchControlResult {
    /// Corners passed through untouched, slot `i` written by invocation `i`
    pub control_points: [PatchCorner; CONTROL_POINTS_PER_PATCH],
    pub factors: TessellationFactors,
    pub visibility: PatchVisibility,
}

/// Per-frame counters, like the GPU culling stats
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControlStats {
    pub total_patches: u32,
    pub visible_patches: u32,
    pub culled_patches: u32,
}

/// Storage shared by the four invocations of one group
#[derive(Debug, Clone, Copy)]
struct GroupShared {
    clip_positions: [Vector4<f32>; CONTROL_POINTS_PER_PATCH],
}

impl Default for GroupShared {
    fn default() -> Self {
        Self {
            clip_positions: [Vector4::new(0.0, 0.0, 0.0, 0.0); CONTROL_POINTS_PER_PATCH],
        }
    }
}

/// Single view-plane test: the patch is culled only when every corner has
/// clip z <= 0. Large patches straddling the plane can be culled wrongly;
/// that approximation is kept as is.
pub fn classify_patch(clip_positions: &[Vector4<f32>; CONTROL_POINTS_PER_PATCH]) -> PatchVisibility {
    if clip_positions.iter().all(|clip| clip.z <= 0.0) {
        PatchVisibility::Culled
    } else {
        PatchVisibility::Visible
    }
}

pub struct PatchController<M: TessellationMetric> {
    metric: M,
}

impl<M: TessellationMetric> PatchController<M> {
    pub fn new(metric: M) -> Self {
        Self { metric }
    }

    pub fn metric(&self) -> &M {
        &self.metric
    }

    /// Phase 1 of one invocation: pass the corner through, share its clip position
    fn corner_invocation(
        invocation_id: usize,
        patch: &Patch,
        mvp: &Matrix4<f32>,
        shared: &mut GroupShared,
    ) -> PatchCorner {
        let corner = patch.corners[invocation_id];
        shared.clip_positions[invocation_id] = *mvp * corner.position.extend(1.0);
        corner
    }

    /// Phase 2, run by the leader only: classify and assign factors
    fn publish_factors(
        &self,
        invocation_id: usize,
        shared: &GroupShared,
    ) -> (PatchVisibility, TessellationFactors) {
        debug_assert_eq!(invocation_id, LEADER_INVOCATION);
        match classify_patch(&shared.clip_positions) {
            PatchVisibility::Culled => (PatchVisibility::Culled, TessellationFactors::CULLED),
            PatchVisibility::Visible => {
                let clip = &shared.clip_positions;
                let outer = OUTER_EDGE_CORNERS
                    .map(|(from, to)| self.metric.edge_factor(clip[from], clip[to]).max(0.0));
                (PatchVisibility::Visible, TessellationFactors::from_outer(outer))
            }
        }
    }

    /// Run the invocation group of one patch
    pub fn control_patch(&self, patch: &Patch, transforms: &TransformBlock) -> PatchControlResult {
        let mvp = transforms.mvp();
        let mut shared = GroupShared::default();
        let mut control_points = patch.corners;

        for (invocation_id, slot) in control_points.iter_mut().enumerate() {
            *slot = Self::corner_invocation(invocation_id, patch, &mvp, &mut shared);
        }

        // Barrier: every corner has written `shared` before the leader reads it.
        let (visibility, factors) = self.publish_factors(LEADER_INVOCATION, &shared);

        PatchControlResult {
            control_points,
            factors,
            visibility,
        }
    }

    /// Run the control stage over a patch list, one group per patch
    pub fn control_patches(
        &self,
        patches: &[Patch],
        transforms: &TransformBlock,
    ) -> (Vec<PatchControlResult>, ControlStats) {
        let results: Vec<PatchControlResult> = patches
            .par_iter()
            .map(|patch| self.control_patch(patch, transforms))
            .collect();

        let visible = results
            .iter()
            .filter(|result| result.visibility == PatchVisibility::Visible)
            .count() as u32;
        let stats = ControlStats {
            total_patches: results.len() as u32,
            visible_patches: visible,
            culled_patches: results.len() as u32 - visible,
        };

        log::debug!(
            "[PatchController] {} patches: {} visible, {} culled",
            stats.total_patches,
            stats.visible_patches,
            stats.culled_patches
        );

        (results, stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tessellation::metric::UniformLevel;
    use cgmath::{Matrix4, SquareMatrix};

    fn identity_transforms() -> TransformBlock {
        let identity = Matrix4::identity();
        TransformBlock::new(identity, identity, identity, identity)
    }

    /// With an identity mvp, clip z equals model-space z
    fn patch_at_depths(depths: [f32; 4]) -> Patch {
        let mut corners = [PatchCorner::new([0.0; 3], [0.0; 2]); 4];
        for (i, corner) in corners.iter_mut().enumerate() {
            *corner = PatchCorner::new(
                [(i % 2) as f32, (i / 2) as f32, depths[i]],
                [(i % 2) as f32, (i / 2) as f32],
            );
        }
        Patch::new(corners)
    }

    #[test]
    fn test_all_corners_behind_culls_for_any_level() {
        let patch = patch_at_depths([-1.0, -0.5, -2.0, -0.001]);
        for level in [0.0, 1.0, 4.0, 16.0, 64.0] {
            let controller = PatchController::new(UniformLevel::new(level));
            let result = controller.control_patch(&patch, &identity_transforms());
            assert_eq!(result.visibility, PatchVisibility::Culled);
            assert_eq!(result.factors.outer, [0.0; 4]);
            assert_eq!(result.factors, TessellationFactors::CULLED);
        }
    }

    #[test]
    fn test_corners_on_view_plane_count_as_behind() {
        let patch = patch_at_depths([0.0, 0.0, -1.0, 0.0]);
        let controller = PatchController::new(UniformLevel::new(4.0));
        let result = controller.control_patch(&patch, &identity_transforms());
        assert_eq!(result.visibility, PatchVisibility::Culled);
    }

    #[test]
    fn test_smallest_positive_depth_keeps_patch() {
        let patch = patch_at_depths([0.0, 0.0, 0.0, f32::MIN_POSITIVE]);
        let controller = PatchController::new(UniformLevel::new(4.0));
        let result = controller.control_patch(&patch, &identity_transforms());
        assert_eq!(result.visibility, PatchVisibility::Visible);
        assert_eq!(result.factors.outer, [4.0; 4]);
    }

    #[test]
    fn test_one_corner_in_front_keeps_patch() {
        let patch = patch_at_depths([-5.0, -5.0, -5.0, 0.25]);
        let controller = PatchController::new(UniformLevel::new(7.0));
        let result = controller.control_patch(&patch, &identity_transforms());

        assert_eq!(result.visibility, PatchVisibility::Visible);
        assert_eq!(result.factors.outer, [7.0; 4]);
        let outer = result.factors.outer;
        assert_eq!(result.factors.inner[0], outer[1].min(outer[3]));
        assert_eq!(result.factors.inner[1], outer[0].min(outer[2]));
    }

    #[test]
    fn test_corners_pass_through_in_both_branches() {
        let controller = PatchController::new(UniformLevel::new(3.0));
        for depths in [[-1.0; 4], [1.0; 4]] {
            let patch = patch_at_depths(depths);
            let result = controller.control_patch(&patch, &identity_transforms());
            assert_eq!(result.control_points, patch.corners);
        }
    }

    /// Metric keyed on the edge's first corner, to exercise non-uniform outers
    struct DepthKeyed;

    impl TessellationMetric for DepthKeyed {
        fn edge_factor(&self, from: Vector4<f32>, to: Vector4<f32>) -> f32 {
            from.z + to.z
        }
    }

    #[test]
    fn test_inner_factors_follow_bounding_edges() {
        let patch = patch_at_depths([1.0, 2.0, 3.0, 4.0]);
        let controller = PatchController::new(DepthKeyed);
        let result = controller.control_patch(&patch, &identity_transforms());

        // Edges (2,0) (2,3) (3,1) (0,1)
        assert_eq!(result.factors.outer, [4.0, 7.0, 6.0, 3.0]);
        assert_eq!(result.factors.inner, [3.0, 4.0]);
    }

    #[test]
    fn test_negative_metric_output_is_clamped() {
        let patch = patch_at_depths([1.0, -2.0, -3.0, -4.0]);
        let controller = PatchController::new(DepthKeyed);
        let result = controller.control_patch(&patch, &identity_transforms());
        assert!(result.factors.outer.iter().all(|&f| f >= 0.0));
        assert!(result.factors.inner.iter().all(|&f| f >= 0.0));
    }

    #[test]
    fn test_parallel_stage_matches_single_patches() {
        let patches: Vec<Patch> = (0..64)
            .map(|i| {
                let z = if i % 3 == 0 { -1.0 } else { 1.0 };
                patch_at_depths([z, z, z, z])
            })
            .collect();
        let controller = PatchController::new(UniformLevel::new(5.0));
        let transforms = identity_transforms();

        let (results, stats) = controller.control_patches(&patches, &transforms);
        assert_eq!(results.len(), patches.len());
        for (patch, result) in patches.iter().zip(&results) {
            assert_eq!(*result, controller.control_patch(patch, &transforms));
        }
        assert_eq!(stats.total_patches, 64);
        assert_eq!(stats.culled_patches, 22);
        assert_eq!(stats.visible_patches, 42);
    }
}
