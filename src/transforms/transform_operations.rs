//! Transform block operations - building and publishing snapshots

use super::transform_data::{SharedTransforms, TransformBlock, TransformSnapshot};
use crate::camera::{self, CameraData, OPENGL_TO_WGPU_MATRIX};
use crate::constants::sun;
use cgmath::{Matrix4, Point3, Vector3};
use std::sync::Arc;

// ============================================================================
// BUILDING
// ============================================================================

/// Fixed orthographic sun covering the terrain, in wgpu clip space
pub fn sun_view_projection() -> Matrix4<f32> {
    let e = sun::ORTHO_HALF_EXTENT;
    let proj = OPENGL_TO_WGPU_MATRIX * cgmath::ortho(-e, e, -e, e, sun::NEAR, sun::FAR);
    let view = Matrix4::look_at_rh(
        Point3::from(sun::POSITION),
        Point3::new(0.0, 0.0, 0.0),
        Vector3::new(0.0, 1.0, 0.0),
    );
    proj * view
}

/// Build the per-frame transform block from the camera
pub fn build_transform_block(camera: &CameraData, model: Matrix4<f32>) -> TransformBlock {
    TransformBlock::new(
        model,
        camera::build_view_matrix(camera),
        camera::build_projection_matrix(camera),
        sun_view_projection(),
    )
}

// ============================================================================
// PUBLISHING
// ============================================================================

impl SharedTransforms {
    pub fn new(initial: TransformBlock) -> Self {
        Self {
            current: parking_lot::RwLock::new(Arc::new(TransformSnapshot {
                version: 0,
                block: initial,
            })),
        }
    }
}

impl Default for SharedTransforms {
    fn default() -> Self {
        Self::new(TransformBlock::default())
    }
}

/// Replace the current snapshot. Returns the new version.
pub fn publish_transforms(shared: &SharedTransforms, block: TransformBlock) -> u64 {
    let mut current = shared.current.write();
    let version = current.version + 1;
    *current = Arc::new(TransformSnapshot { version, block });
    log::trace!("[Transforms] Published version {}", version);
    version
}

/// Take the snapshot a frame should render with
pub fn snapshot_transforms(shared: &SharedTransforms) -> Arc<TransformSnapshot> {
    shared.current.read().clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{SquareMatrix, Vector4};

    #[test]
    fn test_mvp_is_proj_view_model() {
        let model = Matrix4::from_translation(Vector3::new(1.0, 2.0, 3.0));
        let view = Matrix4::from_scale(2.0);
        let proj = Matrix4::from_nonuniform_scale(1.0, 1.0, 0.5);
        let block = TransformBlock::new(model, view, proj, Matrix4::identity());

        let p = Vector4::new(1.0, 1.0, 1.0, 1.0);
        assert_eq!(block.mvp() * p, proj * (view * (model * p)));
    }

    #[test]
    fn test_snapshot_survives_publish() {
        let shared = SharedTransforms::default();
        let before = snapshot_transforms(&shared);
        assert_eq!(before.version, 0);

        let moved = TransformBlock::new(
            Matrix4::from_scale(3.0),
            Matrix4::identity(),
            Matrix4::identity(),
            Matrix4::identity(),
        );
        assert_eq!(publish_transforms(&shared, moved), 1);

        // The old frame keeps its own view of the block
        assert_eq!(before.block, TransformBlock::default());
        let after = snapshot_transforms(&shared);
        assert_eq!(after.version, 1);
        assert_eq!(after.block, moved);
    }

    #[test]
    fn test_concurrent_readers_never_see_torn_blocks() {
        let shared = Arc::new(SharedTransforms::default());
        let writer = {
            let shared = Arc::clone(&shared);
            std::thread::spawn(move || {
                for i in 1..=200 {
                    let s = i as f32;
                    let block = TransformBlock::new(
                        Matrix4::from_scale(s),
                        Matrix4::from_scale(s),
                        Matrix4::from_scale(s),
                        Matrix4::from_scale(s),
                    );
                    publish_transforms(&shared, block);
                }
            })
        };

        for _ in 0..200 {
            let snapshot = snapshot_transforms(&shared);
            let block = snapshot.block;
            // Every matrix in one block was built from the same scale
            assert_eq!(block.model[0][0], block.view[0][0]);
            assert_eq!(block.view[0][0], block.proj[0][0]);
            assert_eq!(block.proj[0][0], block.sun_vp[0][0]);
        }

        writer.join().expect("writer thread");
        assert_eq!(snapshot_transforms(&shared).version, 200);
    }

    #[test]
    fn test_sun_sees_origin() {
        let clip = sun_view_projection() * Vector4::new(0.0, 0.0, 0.0, 1.0);
        let ndc = clip / clip.w;
        assert!(ndc.x.abs() < 1e-4 && ndc.y.abs() < 1e-4);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }
}
