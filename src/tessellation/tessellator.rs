//! Quad-domain tessellator
//!
//! Stand-in for the fixed-function tessellator: turns a factor set into a
//! deterministic grid of domain samples plus triangle connectivity. Equal
//! spacing, segments per direction = ceil(inner factor).
//!
//! Outer factors only decide whether the patch exists. Edges are not
//! stitched to differing neighbour densities.
//!
//! `domain_pass.wgsl` derives the same samples from `vertex_index`; see
//! [`expanded_sample`].

use super::factors::TessellationFactors;
use crate::constants::tessellation::{MAX_TESSELLATION_LEVEL, VERTICES_PER_CELL};

/// A normalized (u, v) position inside a patch
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DomainSample {
    pub u: f32,
    pub v: f32,
}

impl DomainSample {
    pub fn new(u: f32, v: f32) -> Self {
        Self { u, v }
    }
}

/// Two triangles per cell, as (column, row) offsets
pub const CELL_CORNERS: [(u32, u32); VERTICES_PER_CELL as usize] =
    [(0, 0), (1, 0), (1, 1), (0, 0), (1, 1), (0, 1)];

/// Tessellated domain of one patch
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DomainGrid {
    /// Segments along u
    pub columns: u32,
    /// Segments along v
    pub rows: u32,
    /// (columns + 1) * (rows + 1) samples, row by row
    pub samples: Vec<DomainSample>,
    pub indices: Vec<u32>,
}

impl DomainGrid {
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Segment count for one direction, 0 when the factor is not positive
pub fn segment_count(factor: f32, max_level: f32) -> u32 {
    if !(factor > 0.0) {
        return 0;
    }
    factor.min(max_level).ceil().max(1.0) as u32
}

/// Grid dimensions for a factor set, `None` for discarded patches
pub fn grid_dimensions(factors: &TessellationFactors, max_level: f32) -> Option<(u32, u32)> {
    if factors.is_culled() {
        return None;
    }
    // Outer edges are all positive, so inner (their minimum) is too
    let columns = segment_count(factors.inner[0], max_level).max(1);
    let rows = segment_count(factors.inner[1], max_level).max(1);
    Some((columns, rows))
}

/// Tessellate the quad domain for one patch
pub fn tessellate_quad(factors: &TessellationFactors) -> DomainGrid {
    let Some((columns, rows)) = grid_dimensions(factors, MAX_TESSELLATION_LEVEL) else {
        return DomainGrid::default();
    };

    let stride = columns + 1;
    let mut samples = Vec::with_capacity((stride * (rows + 1)) as usize);
    for row in 0..=rows {
        for column in 0..=columns {
            samples.push(DomainSample::new(
                column as f32 / columns as f32,
                row as f32 / rows as f32,
            ));
        }
    }

    let mut indices = Vec::with_capacity((columns * rows * VERTICES_PER_CELL) as usize);
    for row in 0..rows {
        for column in 0..columns {
            for (dc, dr) in CELL_CORNERS {
                indices.push((row + dr) * stride + column + dc);
            }
        }
    }

    DomainGrid {
        columns,
        rows,
        samples,
        indices,
    }
}

/// Vertex budget per patch for non-indexed drawing
pub fn vertices_per_patch(max_level: f32) -> u32 {
    let cells = max_level.ceil() as u32;
    cells * cells * VERTICES_PER_CELL
}

/// Domain sample of a non-indexed vertex, mirroring the domain vertex shader.
///
/// Returns `None` for vertices past the patch's grid; the shader collapses
/// those to a degenerate point.
pub fn expanded_sample(vertex_index: u32, columns: u32, rows: u32) -> Option<DomainSample> {
    if columns == 0 || rows == 0 {
        return None;
    }
    let cell = vertex_index / VERTICES_PER_CELL;
    if cell >= columns * rows {
        return None;
    }
    let (dc, dr) = CELL_CORNERS[(vertex_index % VERTICES_PER_CELL) as usize];
    let column = cell % columns + dc;
    let row = cell / columns + dr;
    Some(DomainSample::new(
        column as f32 / columns as f32,
        row as f32 / rows as f32,
    ))
}
