//! Tessellation factors for the quad domain
//!
//! Outer factor `i` controls edge `i` of the domain:
//!
//! | factor   | domain edge | corners |
//! |----------|-------------|---------|
//! | outer[0] | u = 0       | 2 → 0   |
//! | outer[1] | v = 0       | 2 → 3   |
//! | outer[2] | u = 1       | 3 → 1   |
//! | outer[3] | v = 1       | 0 → 1   |
//!
//! inner[0] subdivides along u, inner[1] along v.

use bytemuck::{Pod, Zeroable};
use static_assertions::const_assert_eq;

/// Corner pairs bounding each outer edge, indexed like `outer`
pub const OUTER_EDGE_CORNERS: [(usize, usize); 4] = [(2, 0), (2, 3), (3, 1), (0, 1)];

/// Matches `TessellationFactors` in WGSL (vec4 + vec2, padded to 32 bytes)
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct TessellationFactors {
    pub outer: [f32; 4],
    pub inner: [f32; 2],
    pub _padding: [f32; 2],
}

const_assert_eq!(std::mem::size_of::<TessellationFactors>(), 32);

impl TessellationFactors {
    /// Degenerate factors: the tessellator emits nothing for this patch
    pub const CULLED: Self = Self {
        outer: [0.0; 4],
        inner: [0.0; 2],
        _padding: [0.0; 2],
    };

    /// Derive the inner factors from the outer ones.
    ///
    /// Each inner factor takes the smaller of the two outer edges running
    /// in its direction.
    pub fn from_outer(outer: [f32; 4]) -> Self {
        Self {
            outer,
            inner: [outer[1].min(outer[3]), outer[0].min(outer[2])],
            _padding: [0.0; 2],
        }
    }

    pub fn uniform(level: f32) -> Self {
        Self::from_outer([level; 4])
    }

    /// True when any outer edge is zero (or NaN), which discards the patch
    pub fn is_culled(&self) -> bool {
        self.outer.iter().any(|&factor| !(factor > 0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inner_takes_min_of_bounding_edges() {
        let factors = TessellationFactors::from_outer([2.0, 5.0, 3.0, 4.0]);
        assert_eq!(factors.inner, [4.0, 2.0]);
    }

    #[test]
    fn test_culled_is_all_zero() {
        let culled = TessellationFactors::CULLED;
        assert!(culled.is_culled());
        assert!(culled.outer.iter().chain(culled.inner.iter()).all(|&f| f == 0.0));
    }

    #[test]
    fn test_any_zero_edge_culls() {
        assert!(TessellationFactors::from_outer([1.0, 1.0, 0.0, 1.0]).is_culled());
        assert!(TessellationFactors::from_outer([1.0, f32::NAN, 1.0, 1.0]).is_culled());
        assert!(!TessellationFactors::uniform(1.0).is_culled());
    }
}
