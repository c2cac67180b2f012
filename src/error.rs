//! Error handling for trefoil-terrain
//!
//! The per-patch and per-vertex stages never fail. Everything that can fail
//! lives on the host side: configuration, asset decoding and GPU setup.

use std::fmt;

/// Main error type for host-side terrain setup
#[derive(Debug, thiserror::Error)]
pub enum TerrainError {
    // Configuration Errors
    #[error("Invalid config: {field} = {value} ({reason})")]
    InvalidConfig {
        field: String,
        value: String,
        reason: String,
    },
    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    // Asset Errors
    #[error("IO error for {path}: {error}")]
    Io { path: String, error: String },
    #[error("Image decode failed for {path}: {error}")]
    ImageDecode { path: String, error: String },
    #[error("Texture dimensions mismatch: expected {expected:?}, found {found:?}")]
    TextureDimensions {
        expected: (u32, u32),
        found: (u32, u32),
    },

    // GPU Errors
    #[error("GPU adapter not found")]
    AdapterNotFound,
    #[error("GPU adapter unsupported: {reason}")]
    UnsupportedAdapter { reason: String },
    #[error("GPU device request failed: {0}")]
    DeviceRequest(#[from] wgpu::RequestDeviceError),
    #[error("Shader '{name}' is invalid: {error}")]
    ShaderValidation { name: String, error: String },
    #[error("Texture '{label}' could not be created: {error}")]
    TextureCreation { label: String, error: String },
    #[error("Buffer mapping failed during {operation}")]
    BufferMapping { operation: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Type alias for Results in trefoil-terrain
pub type TerrainResult<T> = Result<T, TerrainError>;

impl From<std::io::Error> for TerrainError {
    fn from(error: std::io::Error) -> Self {
        TerrainError::Io {
            path: String::new(),
            error: error.to_string(),
        }
    }
}

/// Convert Option to Result with a lazily built error
pub trait OptionExt<T> {
    fn ok_or_terrain<F>(self, f: F) -> TerrainResult<T>
    where
        F: FnOnce() -> TerrainError;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_terrain<F>(self, f: F) -> TerrainResult<T>
    where
        F: FnOnce() -> TerrainError,
    {
        self.ok_or_else(f)
    }
}

/// Attach a path to IO and decode failures
pub trait ErrorContext<T> {
    fn with_path(self, path: &str) -> TerrainResult<T>;
}

impl<T> ErrorContext<T> for Result<T, std::io::Error> {
    fn with_path(self, path: &str) -> TerrainResult<T> {
        self.map_err(|e| TerrainError::Io {
            path: path.to_string(),
            error: e.to_string(),
        })
    }
}

impl<T> ErrorContext<T> for Result<T, image::ImageError> {
    fn with_path(self, path: &str) -> TerrainResult<T> {
        self.map_err(|e| TerrainError::ImageDecode {
            path: path.to_string(),
            error: e.to_string(),
        })
    }
}

/// Shorthand for building an `InvalidConfig` error
pub fn invalid_config(field: &str, value: impl fmt::Display, reason: &str) -> TerrainError {
    TerrainError::InvalidConfig {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
