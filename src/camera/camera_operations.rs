//! Camera operations - Pure DOP functions
//!
//! All functions are pure: they take data, return new data, no side effects.

use super::camera_data::{CameraConfig, CameraData, CameraTransformBatch};
use crate::picking::Ray;
use cgmath::{InnerSpace, Matrix4, Point3, Rad, SquareMatrix, Vector3, Vector4};

/// cgmath builds OpenGL-style clip space (z in [-w, w]); wgpu expects z in [0, w].
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

const PITCH_LIMIT: f32 = std::f32::consts::FRAC_PI_2 - 0.01;

// ============================================================================
// INITIALIZATION
// ============================================================================

/// Initialize a camera at `position` oriented towards `target`
pub fn init_camera_looking_at(
    position: Point3<f32>,
    target: Point3<f32>,
    aspect_ratio: f32,
) -> CameraData {
    let direction = target - position;
    let (yaw, pitch) = if direction.magnitude2() > f32::EPSILON {
        let direction = direction.normalize();
        (
            direction.z.atan2(direction.x),
            direction.y.clamp(-1.0, 1.0).asin(),
        )
    } else {
        (0.0, 0.0)
    };

    CameraData {
        position,
        yaw_radians: yaw,
        pitch_radians: pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT),
        aspect_ratio,
        ..Default::default()
    }
}

/// Initialize camera from config
pub fn init_camera_from_config(config: &CameraConfig, aspect_ratio: f32) -> CameraData {
    let camera = init_camera_looking_at(
        Point3::from(config.position),
        Point3::from(config.target),
        aspect_ratio,
    );

    CameraData {
        fov_radians: config.fov_degrees.to_radians(),
        near_plane: config.near_plane,
        far_plane: config.far_plane,
        movement_speed: config.movement_speed,
        ..camera
    }
}

// ============================================================================
// VIEW/PROJECTION MATRICES
// ============================================================================

/// Build view matrix from camera data
pub fn build_view_matrix(camera: &CameraData) -> Matrix4<f32> {
    let forward = calculate_forward_vector(camera.yaw_radians, camera.pitch_radians);
    let target = camera.position + forward;
    let up = Vector3::new(0.0, 1.0, 0.0);

    Matrix4::look_at_rh(camera.position, target, up)
}

/// Build projection matrix in wgpu clip space
pub fn build_projection_matrix(camera: &CameraData) -> Matrix4<f32> {
    OPENGL_TO_WGPU_MATRIX
        * cgmath::perspective(
            Rad(camera.fov_radians),
            camera.aspect_ratio,
            camera.near_plane,
            camera.far_plane,
        )
}

pub fn build_view_projection_matrix(camera: &CameraData) -> Matrix4<f32> {
    build_projection_matrix(camera) * build_view_matrix(camera)
}

// ============================================================================
// UPDATES
// ============================================================================

/// Update aspect ratio (e.g., on window resize)
pub fn update_aspect_ratio(camera: &CameraData, width: u32, height: u32) -> CameraData {
    let mut new_camera = *camera;
    new_camera.aspect_ratio = width.max(1) as f32 / height.max(1) as f32;
    new_camera
}

// ============================================================================
// MOVEMENT
// ============================================================================

/// Move camera forward by distance (in camera's forward direction)
pub fn move_forward(camera: &CameraData, distance: f32) -> CameraData {
    let forward = calculate_forward_vector(camera.yaw_radians, camera.pitch_radians);
    let mut new_camera = *camera;
    new_camera.position += forward * distance;
    new_camera
}

/// Move camera right by distance (in camera's right direction)
pub fn move_right(camera: &CameraData, distance: f32) -> CameraData {
    let right = calculate_right_vector(camera.yaw_radians);
    let mut new_camera = *camera;
    new_camera.position += right * distance;
    new_camera
}

/// Move camera up by distance (in world up direction)
pub fn move_up(camera: &CameraData, distance: f32) -> CameraData {
    let mut new_camera = *camera;
    new_camera.position.y += distance;
    new_camera
}

/// Rotate camera by yaw/pitch deltas (radians)
pub fn rotate(camera: &CameraData, yaw_delta: f32, pitch_delta: f32) -> CameraData {
    let mut new_camera = *camera;
    new_camera.yaw_radians += yaw_delta;
    new_camera.pitch_radians =
        (new_camera.pitch_radians + pitch_delta).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    new_camera
}

/// Apply one frame of accumulated input to the camera
pub fn apply_transform_batch(
    camera: &CameraData,
    batch: &CameraTransformBatch,
    delta_time: f32,
) -> CameraData {
    let mut result = rotate(camera, batch.yaw_delta, batch.pitch_delta);

    let speed = if batch.boost {
        camera.movement_speed * camera.boost_multiplier
    } else {
        camera.movement_speed
    };
    let step = speed * delta_time;

    result = move_forward(&result, batch.forward_delta * step);
    result = move_right(&result, batch.right_delta * step);
    move_up(&result, batch.up_delta * step)
}

// ============================================================================
// UTILITIES
// ============================================================================

/// Calculate forward vector from yaw and pitch
pub fn calculate_forward_vector(yaw: f32, pitch: f32) -> Vector3<f32> {
    Vector3::new(
        yaw.cos() * pitch.cos(),
        pitch.sin(),
        yaw.sin() * pitch.cos(),
    )
    .normalize()
}

/// Calculate right vector from yaw
pub fn calculate_right_vector(yaw: f32) -> Vector3<f32> {
    Vector3::new(
        (yaw + std::f32::consts::FRAC_PI_2).cos(),
        0.0,
        (yaw + std::f32::consts::FRAC_PI_2).sin(),
    )
    .normalize()
}

/// Build a world-space ray through a pointer position given in logical pixels.
///
/// Returns `None` when the view-projection matrix is singular.
pub fn ray_through_pixel(
    camera: &CameraData,
    pointer: (f32, f32),
    screen_size: (f32, f32),
) -> Option<Ray> {
    let inverse = build_view_projection_matrix(camera).invert()?;

    let ndc_x = 2.0 * pointer.0 / screen_size.0.max(1.0) - 1.0;
    let ndc_y = 1.0 - 2.0 * pointer.1 / screen_size.1.max(1.0);

    let unproject = |z: f32| {
        let p = inverse * Vector4::new(ndc_x, ndc_y, z, 1.0);
        Point3::new(p.x / p.w, p.y / p.w, p.z / p.w)
    };

    let near = unproject(0.0);
    let far = unproject(1.0);
    Some(Ray::new(near, far - near))
}
