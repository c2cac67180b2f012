//! Camera data structures - Pure DOP
//!
//! NO METHODS. Just data.
//! All transformations happen in camera_operations.rs

use cgmath::Point3;
use serde::{Deserialize, Serialize};

/// Camera data structure - pure data, no methods
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraData {
    /// Camera position in world space
    pub position: Point3<f32>,

    /// Yaw rotation (radians, around Y axis)
    pub yaw_radians: f32,

    /// Pitch rotation (radians, around X axis)
    pub pitch_radians: f32,

    /// Field of view (vertical, radians)
    pub fov_radians: f32,

    /// Aspect ratio (width / height)
    pub aspect_ratio: f32,

    /// Near clipping plane distance
    pub near_plane: f32,

    /// Far clipping plane distance
    pub far_plane: f32,

    /// Movement speed (world units per second)
    pub movement_speed: f32,

    /// Multiplier applied while the speed boost modifier is held
    pub boost_multiplier: f32,

    /// Rotation sensitivity (radians per logical pixel)
    pub rotation_sensitivity: f32,
}

/// Batch transform data for camera updates
/// Accumulates one frame of input before it is applied
#[derive(Debug, Clone, Copy, Default)]
pub struct CameraTransformBatch {
    /// Forward/backward movement (-1, 0 or 1)
    pub forward_delta: f32,

    /// Left/right movement (-1, 0 or 1)
    pub right_delta: f32,

    /// Up/down movement (-1, 0 or 1)
    pub up_delta: f32,

    /// Yaw rotation delta (radians)
    pub yaw_delta: f32,

    /// Pitch rotation delta (radians)
    pub pitch_delta: f32,

    /// Whether the speed boost is held
    pub boost: bool,
}

impl Default for CameraData {
    fn default() -> Self {
        Self {
            position: Point3::new(0.0, 0.0, 0.0),
            yaw_radians: 0.0,
            pitch_radians: 0.0,
            fov_radians: 45.0_f32.to_radians(),
            aspect_ratio: 16.0 / 9.0,
            near_plane: 0.1,
            far_plane: 5000.0,
            movement_speed: 60.0,
            boost_multiplier: 4.0,
            rotation_sensitivity: 0.003,
        }
    }
}

/// Camera configuration for initialization
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: [f32; 3],
    pub target: [f32; 3],
    pub fov_degrees: f32,
    pub near_plane: f32,
    pub far_plane: f32,
    pub movement_speed: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: [520.0, 250.0, 100.0],
            target: [0.0, 130.0, 0.0],
            fov_degrees: 45.0,
            near_plane: 0.1,
            far_plane: 5000.0,
            movement_speed: 60.0,
        }
    }
}
