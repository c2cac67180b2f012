//! Patch data - the coarse quad control primitive

use crate::constants::tessellation::CONTROL_POINTS_PER_PATCH;
use bytemuck::{Pod, Zeroable};
use cgmath::{Vector2, Vector3};
use static_assertions::const_assert_eq;

/// One control point: model-space position plus terrain UV
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PatchCorner {
    pub position: Vector3<f32>,
    pub uv: Vector2<f32>,
}

impl PatchCorner {
    pub fn new(position: [f32; 3], uv: [f32; 2]) -> Self {
        Self {
            position: position.into(),
            uv: uv.into(),
        }
    }
}

/// A quad patch.
///
/// Corners 0 and 1 span the v = 1 edge, corners 2 and 3 the v = 0 edge.
/// The first corner of each pair sits at u = 0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Patch {
    pub corners: [PatchCorner; CONTROL_POINTS_PER_PATCH],
}

impl Patch {
    pub fn new(corners: [PatchCorner; CONTROL_POINTS_PER_PATCH]) -> Self {
        Self { corners }
    }

    /// Patch whose four corners share one position and one UV
    pub fn collapsed(corner: PatchCorner) -> Self {
        Self {
            corners: [corner; CONTROL_POINTS_PER_PATCH],
        }
    }
}

/// GPU layout of a control point, matches `ControlPoint` in WGSL
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct GpuControlPoint {
    /// xyz position, w = 1
    pub position: [f32; 4],
    pub uv: [f32; 2],
    pub _padding: [f32; 2],
}

const_assert_eq!(std::mem::size_of::<GpuControlPoint>(), 32);

impl From<PatchCorner> for GpuControlPoint {
    fn from(corner: PatchCorner) -> Self {
        Self {
            position: [corner.position.x, corner.position.y, corner.position.z, 1.0],
            uv: corner.uv.into(),
            _padding: [0.0; 2],
        }
    }
}

impl From<GpuControlPoint> for PatchCorner {
    fn from(point: GpuControlPoint) -> Self {
        Self::new(
            [point.position[0], point.position[1], point.position[2]],
            point.uv,
        )
    }
}

/// Flatten patches into the control point buffer layout (4 per patch)
pub fn pack_control_points(patches: &[Patch]) -> Vec<GpuControlPoint> {
    patches
        .iter()
        .flat_map(|patch| patch.corners.iter().map(|&corner| corner.into()))
        .collect()
}
