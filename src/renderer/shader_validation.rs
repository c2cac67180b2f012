//! Shader validation
//!
//! Entry points are checked against the WGSL source before any pipeline is
//! built, so a renamed function fails with the list of what the shader does
//! define. Module and pipeline creation then run inside a validation error
//! scope; wgpu reports problems there instead of returning a `Result`.

use crate::error::{TerrainError, TerrainResult};

pub const CONTROL_PASS_SOURCE: &str = include_str!("../shaders/control_pass.wgsl");
pub const DOMAIN_PASS_SOURCE: &str = include_str!("../shaders/domain_pass.wgsl");
pub const SKYBOX_SOURCE: &str = include_str!("../shaders/skybox.wgsl");

/// Pipeline stage an entry point is declared for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryStage {
    Compute,
    Vertex,
    Fragment,
}

impl EntryStage {
    fn attribute(self) -> &'static str {
        match self {
            EntryStage::Compute => "@compute",
            EntryStage::Vertex => "@vertex",
            EntryStage::Fragment => "@fragment",
        }
    }
}

/// Validate that an entry point exists and carries the stage attribute
pub fn validate_entry_point(
    shader_source: &str,
    entry_point: &str,
    stage: EntryStage,
) -> Result<(), String> {
    let fn_pattern = format!("fn {}(", entry_point);
    let lines: Vec<&str> = shader_source.lines().collect();

    let Some(position) = lines.iter().position(|line| line.contains(&fn_pattern)) else {
        return Err(format!(
            "Entry point '{}' not found in shader. Available functions: {}",
            entry_point,
            extract_function_names(shader_source).join(", ")
        ));
    };

    // Walk back over attributes and comments directly above the function
    let mut has_stage_attribute = false;
    for previous in lines[..position].iter().rev().map(|line| line.trim()) {
        if previous.is_empty() || previous.starts_with("//") {
            continue;
        }
        if previous.contains(stage.attribute()) {
            has_stage_attribute = true;
            break;
        }
        if !previous.starts_with('@') {
            break;
        }
    }

    if !has_stage_attribute {
        return Err(format!(
            "Entry point '{}' found but missing {} annotation",
            entry_point,
            stage.attribute()
        ));
    }

    log::debug!(
        "[ShaderValidation] Entry point {} ({}) validated",
        entry_point,
        stage.attribute()
    );
    Ok(())
}

/// Function names declared in a shader, for error messages
pub fn extract_function_names(shader_source: &str) -> Vec<String> {
    shader_source
        .lines()
        .map(str::trim)
        .filter_map(|line| line.strip_prefix("fn "))
        .filter_map(|rest| rest.find('(').map(|end| rest[..end].trim()))
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// Check every entry point, then compile the module in an error scope
pub fn create_shader_module(
    device: &wgpu::Device,
    name: &str,
    source: &str,
    entry_points: &[(&str, EntryStage)],
) -> TerrainResult<wgpu::ShaderModule> {
    for (entry_point, stage) in entry_points {
        validate_entry_point(source, entry_point, *stage).map_err(|error| {
            log::error!("[ShaderValidation] {}: {}", name, error);
            TerrainError::ShaderValidation {
                name: name.to_string(),
                error,
            }
        })?;
    }

    with_validation_scope(device, name, || {
        device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(name),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        })
    })
}

/// Run `create` inside a validation error scope and return what it raised
pub(crate) fn capture_validation_error<T>(
    device: &wgpu::Device,
    create: impl FnOnce() -> T,
) -> (T, Option<wgpu::Error>) {
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let value = create();
    let error = pollster::block_on(device.pop_error_scope());
    (value, error)
}

/// Run a wgpu object constructor and surface validation errors as `Err`
pub fn with_validation_scope<T>(
    device: &wgpu::Device,
    name: &str,
    create: impl FnOnce() -> T,
) -> TerrainResult<T> {
    match capture_validation_error(device, create) {
        (_, Some(error)) => {
            log::error!("[ShaderValidation] {} failed validation: {}", name, error);
            Err(TerrainError::ShaderValidation {
                name: name.to_string(),
                error: error.to_string(),
            })
        }
        (value, None) => Ok(value),
    }
}
