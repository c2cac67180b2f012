//! Shared transform block data - Pure DOP
//!
//! NO METHODS beyond constructors and accessors. Publishing and building
//! happen in transform_operations.rs.

use bytemuck::{Pod, Zeroable};
use cgmath::{Matrix4, SquareMatrix};
use static_assertions::const_assert_eq;
use std::sync::Arc;

/// Camera and light matrices shared by every stage.
/// Must match `TransformBlock` in the WGSL sources exactly.
///
/// Matrices are stored column by column, the layout `mat4x4<f32>` expects.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct TransformBlock {
    /// proj * view * model
    pub mvp: [[f32; 4]; 4],
    pub proj: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub model: [[f32; 4]; 4],
    /// Sun view-projection, consumed by shadow lookups
    pub sun_vp: [[f32; 4]; 4],
}

const_assert_eq!(std::mem::size_of::<TransformBlock>(), 320);

impl TransformBlock {
    /// Assemble a block, deriving `mvp` from the other matrices
    pub fn new(
        model: Matrix4<f32>,
        view: Matrix4<f32>,
        proj: Matrix4<f32>,
        sun_vp: Matrix4<f32>,
    ) -> Self {
        Self {
            mvp: (proj * view * model).into(),
            proj: proj.into(),
            view: view.into(),
            model: model.into(),
            sun_vp: sun_vp.into(),
        }
    }

    pub fn mvp(&self) -> Matrix4<f32> {
        Matrix4::from(self.mvp)
    }

    pub fn proj(&self) -> Matrix4<f32> {
        Matrix4::from(self.proj)
    }

    pub fn view(&self) -> Matrix4<f32> {
        Matrix4::from(self.view)
    }

    pub fn model(&self) -> Matrix4<f32> {
        Matrix4::from(self.model)
    }

    pub fn sun_vp(&self) -> Matrix4<f32> {
        Matrix4::from(self.sun_vp)
    }
}

impl Default for TransformBlock {
    fn default() -> Self {
        let identity = Matrix4::identity();
        Self::new(identity, identity, identity, identity)
    }
}

/// One frame's immutable view of the transform block
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformSnapshot {
    /// Bumped on every publish; 0 is the initial block
    pub version: u64,
    pub block: TransformBlock,
}

/// Process-wide holder of the current snapshot.
///
/// Readers clone the `Arc` and keep observing that snapshot for the rest of
/// their frame, so a concurrent publish can never be seen half-written.
#[derive(Debug)]
pub struct SharedTransforms {
    pub(super) current: parking_lot::RwLock<Arc<TransformSnapshot>>,
}
