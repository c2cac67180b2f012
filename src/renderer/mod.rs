//! GPU renderer
//!
//! wgpu has no hull or domain stages. The control stage runs as a compute
//! pass and the domain stage as a vertex shader that derives its domain
//! sample from `vertex_index`; both match the CPU code in `tessellation`.

pub mod control_pass;
pub mod domain_pass;
pub mod gpu_context;
pub mod shader_validation;
pub mod skybox_pass;
pub mod terrain_renderer;
pub mod textures;
pub mod transform_buffer;

pub use control_pass::{ControlPass, TessellationParams};
pub use domain_pass::DomainPass;
pub use gpu_context::GpuContext;
pub use shader_validation::{validate_entry_point, EntryStage};
pub use skybox_pass::SkyboxPass;
pub use terrain_renderer::TerrainRenderer;
pub use textures::GpuTexture;
pub use transform_buffer::TransformBuffer;
