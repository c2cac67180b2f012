/// Shared Transform Block
///
/// - transform_data.rs: the GPU-layout block and its versioned snapshot holder
/// - transform_operations.rs: building blocks from the camera and publishing them

pub mod transform_data;
pub mod transform_operations;

pub use transform_data::{SharedTransforms, TransformBlock, TransformSnapshot};
pub use transform_operations::{
    build_transform_block, publish_transforms, snapshot_transforms, sun_view_projection,
};
