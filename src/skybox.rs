//! Skybox Depth-Pin Stage
//!
//! The cube is drawn around the camera with the view translation removed, and
//! its clip z is replaced by w so every fragment lands on the far plane.
//! With a `LessEqual` depth test against a buffer cleared to 1.0, the sky
//! fills exactly the pixels no terrain covered.

use crate::error::{ErrorContext, TerrainError, TerrainResult};
use cgmath::{Matrix4, Vector3, Vector4};
use serde::{Deserialize, Serialize};

/// Unit cube, 12 triangles
#[rustfmt::skip]
pub const SKYBOX_VERTICES: [[f32; 3]; 36] = [
    [-1.0,  1.0, -1.0], [-1.0, -1.0, -1.0], [ 1.0, -1.0, -1.0],
    [ 1.0, -1.0, -1.0], [ 1.0,  1.0, -1.0], [-1.0,  1.0, -1.0],

    [-1.0, -1.0,  1.0], [-1.0, -1.0, -1.0], [-1.0,  1.0, -1.0],
    [-1.0,  1.0, -1.0], [-1.0,  1.0,  1.0], [-1.0, -1.0,  1.0],

    [ 1.0, -1.0, -1.0], [ 1.0, -1.0,  1.0], [ 1.0,  1.0,  1.0],
    [ 1.0,  1.0,  1.0], [ 1.0,  1.0, -1.0], [ 1.0, -1.0, -1.0],

    [-1.0, -1.0,  1.0], [-1.0,  1.0,  1.0], [ 1.0,  1.0,  1.0],
    [ 1.0,  1.0,  1.0], [ 1.0, -1.0,  1.0], [-1.0, -1.0,  1.0],

    [-1.0,  1.0, -1.0], [ 1.0,  1.0, -1.0], [ 1.0,  1.0,  1.0],
    [ 1.0,  1.0,  1.0], [-1.0,  1.0,  1.0], [-1.0,  1.0, -1.0],

    [-1.0, -1.0, -1.0], [-1.0, -1.0,  1.0], [ 1.0, -1.0, -1.0],
    [ 1.0, -1.0, -1.0], [-1.0, -1.0,  1.0], [ 1.0, -1.0,  1.0],
];

/// Keep the rotation of a view matrix, drop its translation
pub fn strip_translation(view: &Matrix4<f32>) -> Matrix4<f32> {
    Matrix4::from_cols(
        view.x.truncate().extend(0.0),
        view.y.truncate().extend(0.0),
        view.z.truncate().extend(0.0),
        Vector4::unit_w(),
    )
}

/// Clip position of a skybox vertex, with depth pinned to the far plane
pub fn skybox_clip_position(
    position: Vector3<f32>,
    view: &Matrix4<f32>,
    proj: &Matrix4<f32>,
) -> Vector4<f32> {
    let clip = *proj * strip_translation(view) * position.extend(1.0);
    Vector4::new(clip.x, clip.y, clip.w, clip.w)
}

/// Cube face images in +X, -X, +Y, -Y, +Z, -Z order
/// (right, left, top, bottom, front, back)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkyboxFaces {
    pub faces: [String; 6],
}

/// Decoded cubemap, all faces square and the same size
#[derive(Debug, Clone, PartialEq)]
pub struct CubemapImage {
    pub size: u32,
    pub faces: [Vec<u8>; 6],
}

impl CubemapImage {
    pub fn load(faces: &SkyboxFaces) -> TerrainResult<Self> {
        let mut size = None;
        let mut decoded: [Vec<u8>; 6] = Default::default();

        for (slot, path) in decoded.iter_mut().zip(&faces.faces) {
            let image = image::open(path).with_path(path)?.to_rgba8();
            let (width, height) = image.dimensions();
            let expected = *size.get_or_insert(width);
            if width != expected || height != expected {
                return Err(TerrainError::TextureDimensions {
                    expected: (expected, expected),
                    found: (width, height),
                });
            }
            *slot = image.into_raw();
        }

        let size = size.unwrap_or(1);
        log::info!("[Skybox] Loaded cubemap ({}x{} per face)", size, size);
        Ok(Self {
            size,
            faces: decoded,
        })
    }

    /// Vertical gradient sky used when no face images are configured
    pub fn gradient(size: u32, zenith: [u8; 3], horizon: [u8; 3]) -> Self {
        let size = size.max(1);
        let lerp = |t: f32| -> [u8; 4] {
            let mut color = [255; 4];
            for (i, channel) in color.iter_mut().take(3).enumerate() {
                *channel = (horizon[i] as f32 * (1.0 - t) + zenith[i] as f32 * t).round() as u8;
            }
            color
        };

        let side: Vec<u8> = (0..size)
            .flat_map(|row| {
                // Row 0 is the top of a side face
                let t = 1.0 - (row as f32 + 0.5) / size as f32;
                let color = lerp(t);
                (0..size).flat_map(move |_| color)
            })
            .collect();
        let top: Vec<u8> = (0..size * size).flat_map(|_| lerp(1.0)).collect();
        let bottom: Vec<u8> = (0..size * size).flat_map(|_| lerp(0.0)).collect();

        Self {
            size,
            faces: [side.clone(), side.clone(), top, bottom, side.clone(), side],
        }
    }
}
