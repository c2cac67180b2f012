//! Engine-wide constants

pub mod tessellation {
    /// Control points per quad patch (one control invocation each)
    pub const CONTROL_POINTS_PER_PATCH: usize = 4;

    /// Invocation that publishes the shared factors of its group
    pub const LEADER_INVOCATION: usize = 0;

    /// Lower bound for the user-tunable tessellation level
    pub const MIN_TESSELLATION_LEVEL: f32 = 1.0;

    /// Upper bound for the user-tunable tessellation level.
    /// Also sizes the per-patch vertex budget of the domain pass.
    pub const MAX_TESSELLATION_LEVEL: f32 = 16.0;

    pub const DEFAULT_TESSELLATION_LEVEL: f32 = 8.0;

    /// Vertices emitted per triangulated domain cell
    pub const VERTICES_PER_CELL: u32 = 6;
}

pub mod terrain {
    /// Maximum displacement along +Y for a heightmap sample of 1.0
    pub const DEFAULT_HEIGHT_SCALE: f32 = 250.0;

    pub const DEFAULT_TERRAIN_SIZE: f32 = 1024.0;

    pub const DEFAULT_PATCHES_PER_SIDE: u32 = 32;

    /// Dispatch limit: one workgroup per patch along X
    pub const MAX_PATCHES: u32 = 65_535;

    /// Largest generated heightmap side; the default wgpu 2D texture limit
    pub const MAX_HEIGHTMAP_RESOLUTION: u32 = 8192;
}

pub mod brush {
    /// Brush radius range in world units
    pub const MIN_SIZE: f32 = 0.1;
    pub const MAX_SIZE: f32 = 200.0;
    pub const DEFAULT_SIZE: f32 = 40.0;

    /// Normalized height change per second at the brush center
    pub const DEFAULT_STRENGTH: f32 = 0.25;

    /// Radius change per scroll line
    pub const RESIZE_STEP: f32 = 1.5;
}

pub mod bindings {
    /// Fixed slot of the shared transform block in every pipeline
    pub const TRANSFORMS_GROUP: u32 = 0;
    pub const TRANSFORMS_BINDING: u32 = 0;
}

pub mod sun {
    pub const POSITION: [f32; 3] = [0.0, 200.0, 500.0];
    pub const ORTHO_HALF_EXTENT: f32 = 600.0;
    pub const NEAR: f32 = 1.0;
    pub const FAR: f32 = 1200.0;
}
