// Trefoil Terrain - hardware-style quad patch tessellation for heightmap terrain
//
// The frame pipeline:
// - transforms: per-frame matrices published as versioned snapshots
// - tessellation: patch controller, quad-domain tessellator, domain evaluator
// - surface / skybox: fragment color and the far-plane sky
// - renderer: the same stages as wgpu passes
//
// The CPU code under `tessellation` is the reference the WGSL passes follow.

// Constants module
pub mod constants;

pub mod error;

// Core stages
pub mod heightmap;
pub mod skybox;
pub mod surface;
pub mod tessellation;
pub mod transforms;

// Collaborators
pub mod brush;
pub mod camera;
pub mod config;
pub mod patch_grid;
pub mod picking;
pub mod scene;

// GPU
pub mod renderer;

pub use brush::TerrainBrush;
pub use camera::{CameraConfig, CameraData, CameraTransformBatch};
pub use config::{clamp_tessellation_level, TerrainConfig};
pub use error::{TerrainError, TerrainResult};
pub use heightmap::{HeightSampler, Heightmap, HeightmapSource};
pub use patch_grid::{build_patch_grid, TerrainExtent};
pub use picking::{Ray, TerrainHit, TerrainSurface};
pub use renderer::{GpuContext, TerrainRenderer};
pub use scene::TerrainScene;
pub use skybox::{skybox_clip_position, CubemapImage, SkyboxFaces};
pub use surface::{shade_surface, SurfaceTexture};
pub use tessellation::{
    tessellate_patches, DomainEvaluator, Patch, PatchController, PatchCorner,
    TessellationFactors, UniformLevel,
};
pub use transforms::{
    build_transform_block, publish_transforms, snapshot_transforms, SharedTransforms,
    TransformBlock, TransformSnapshot,
};

// Re-export wgpu for callers that drive their own surface
pub use wgpu;
