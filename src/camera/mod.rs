/// Camera Module - Data-Oriented Programming (DOP) style
///
/// - camera_data.rs: Pure data structures with NO methods
/// - camera_operations.rs: Pure functions that operate on data
///
/// The camera is a collaborator of the tessellation core: it only feeds the
/// view and projection matrices that end up in the shared transform block.

pub mod camera_data;
pub mod camera_operations;

pub use camera_data::{CameraConfig, CameraData, CameraTransformBatch};

pub use camera_operations::{
    // Initialization
    init_camera_from_config,
    init_camera_looking_at,

    // View/projection
    build_projection_matrix,
    build_view_matrix,
    build_view_projection_matrix,

    // Updates
    update_aspect_ratio,

    // Movement
    apply_transform_batch,
    move_forward,
    move_right,
    move_up,
    rotate,

    // Utilities
    calculate_forward_vector,
    calculate_right_vector,
    ray_through_pixel,
    OPENGL_TO_WGPU_MATRIX,
};
