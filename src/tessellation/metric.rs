//! Edge density metrics for visible patches

use cgmath::Vector4;

/// Chooses the outer factor of one patch edge from its clip-space endpoints.
///
/// The controller only asks for factors of visible patches; culling is
/// decided before the metric runs.
pub trait TessellationMetric: Send + Sync {
    fn edge_factor(&self, from: Vector4<f32>, to: Vector4<f32>) -> f32;
}

/// Every edge gets the same configured level
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UniformLevel {
    pub level: f32,
}

impl UniformLevel {
    pub fn new(level: f32) -> Self {
        Self {
            level: level.max(0.0),
        }
    }
}

impl TessellationMetric for UniformLevel {
    fn edge_factor(&self, _from: Vector4<f32>, _to: Vector4<f32>) -> f32 {
        self.level
    }
}
