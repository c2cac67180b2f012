//! Terrain configuration, loaded from TOML

use crate::camera::CameraConfig;
use crate::constants::terrain::{
    DEFAULT_HEIGHT_SCALE, DEFAULT_PATCHES_PER_SIDE, DEFAULT_TERRAIN_SIZE,
    MAX_HEIGHTMAP_RESOLUTION, MAX_PATCHES,
};
use crate::constants::tessellation::{
    DEFAULT_TESSELLATION_LEVEL, MAX_TESSELLATION_LEVEL, MIN_TESSELLATION_LEVEL,
};
use crate::error::{ErrorContext, TerrainError, TerrainResult};
use crate::heightmap::HeightmapSource;
use crate::patch_grid::TerrainExtent;
use crate::skybox::SkyboxFaces;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Clamp a requested tessellation level to the supported range
pub fn clamp_tessellation_level(level: f32) -> f32 {
    if level.is_nan() {
        return MIN_TESSELLATION_LEVEL;
    }
    level.clamp(MIN_TESSELLATION_LEVEL, MAX_TESSELLATION_LEVEL)
}

/// Main terrain configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    pub window_title: String,
    pub window_width: u32,
    pub window_height: u32,
    pub tessellation_level: f32,
    pub height_scale: f32,
    pub terrain_size: f32,
    pub patches_per_side: u32,
    /// Surface color image; altitude bands of the heightmap when absent
    pub surface_texture: Option<String>,
    pub heightmap: HeightmapSource,
    /// Cubemap faces; gradient sky when absent
    pub skybox: Option<SkyboxFaces>,
    pub camera: CameraConfig,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            window_title: "Trefoil Terrain".to_string(),
            window_width: 1280,
            window_height: 720,
            tessellation_level: DEFAULT_TESSELLATION_LEVEL,
            height_scale: DEFAULT_HEIGHT_SCALE,
            terrain_size: DEFAULT_TERRAIN_SIZE,
            patches_per_side: DEFAULT_PATCHES_PER_SIDE,
            surface_texture: None,
            heightmap: HeightmapSource::default(),
            skybox: None,
            camera: CameraConfig::default(),
        }
    }
}

impl TerrainConfig {
    pub fn from_toml_str(source: &str) -> TerrainResult<Self> {
        Ok(toml::from_str(source)?)
    }

    pub fn load(path: impl AsRef<Path>) -> TerrainResult<Self> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let source = std::fs::read_to_string(path).with_path(&display)?;
        let config = Self::from_toml_str(&source)?;
        log::info!("[TerrainConfig] Loaded {}", display);
        Ok(config)
    }

    pub fn to_toml_string(&self) -> TerrainResult<String> {
        toml::to_string_pretty(self).map_err(|e| TerrainError::Internal {
            message: format!("config serialization failed: {}", e),
        })
    }

    pub fn extent(&self) -> TerrainExtent {
        TerrainExtent::centered(self.terrain_size)
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if !(MIN_TESSELLATION_LEVEL..=MAX_TESSELLATION_LEVEL).contains(&self.tessellation_level) {
            return Err(anyhow::anyhow!(
                "TerrainConfig: tessellation_level {} outside [{}, {}]",
                self.tessellation_level,
                MIN_TESSELLATION_LEVEL,
                MAX_TESSELLATION_LEVEL
            ));
        }

        if !(self.height_scale >= 0.0) {
            return Err(anyhow::anyhow!(
                "TerrainConfig: height_scale {} must be non-negative",
                self.height_scale
            ));
        }

        if !(self.terrain_size > 0.0) {
            return Err(anyhow::anyhow!(
                "TerrainConfig: terrain_size {} must be positive",
                self.terrain_size
            ));
        }

        if self.patches_per_side == 0 {
            return Err(anyhow::anyhow!("TerrainConfig: patches_per_side cannot be 0"));
        }

        let patch_count = self.patches_per_side as u64 * self.patches_per_side as u64;
        if patch_count > MAX_PATCHES as u64 {
            return Err(anyhow::anyhow!(
                "TerrainConfig: {} patches exceeds the dispatch limit of {}",
                patch_count,
                MAX_PATCHES
            ));
        }

        if let Some(resolution) = self.heightmap.resolution() {
            if resolution == 0 || resolution > MAX_HEIGHTMAP_RESOLUTION {
                return Err(anyhow::anyhow!(
                    "TerrainConfig: heightmap resolution {} outside [1, {}]",
                    resolution,
                    MAX_HEIGHTMAP_RESOLUTION
                ));
            }
        }

        log::info!(
            "[TerrainConfig] Validation: level={}, patches={}, patch_size={:.2}, height_scale={}",
            self.tessellation_level,
            patch_count,
            self.terrain_size / self.patches_per_side as f32,
            self.height_scale
        );

        // Validate window dimensions
        if self.window_width < 320 || self.window_height < 240 {
            return Err(anyhow::anyhow!(
                "TerrainConfig: Window dimensions too small (min 320x240)"
            ));
        }

        if self.window_width > 16384 || self.window_height > 16384 {
            return Err(anyhow::anyhow!(
                "TerrainConfig: Window dimensions too large (max 16384x16384)"
            ));
        }

        log::info!("[TerrainConfig] Configuration validated successfully");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config_is_valid() {
        assert!(TerrainConfig::default().validate().is_ok());
    }

    #[test]
    fn test_clamp_tessellation_level() {
        assert_eq!(clamp_tessellation_level(0.0), 1.0);
        assert_eq!(clamp_tessellation_level(40.0), 16.0);
        assert_eq!(clamp_tessellation_level(5.5), 5.5);
        assert_eq!(clamp_tessellation_level(f32::NAN), 1.0);
    }

    #[test]
    fn test_validation_rejects_out_of_range_values() {
        let config = TerrainConfig {
            tessellation_level: 17.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = TerrainConfig {
            patches_per_side: 300,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = TerrainConfig {
            window_width: 100,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_oversized_heightmap() {
        let config = TerrainConfig {
            heightmap: HeightmapSource::Flat {
                resolution: 70_000,
                value: 0.0,
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = TerrainConfig {
            heightmap: HeightmapSource::Procedural {
                resolution: 0,
                seed: 1,
                octaves: 2,
                frequency: 1.0,
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = TerrainConfig::from_toml_str(
            "tessellation_level = 4.0\n\n[heightmap]\nkind = \"flat\"\nresolution = 16\nvalue = 0.5\n",
        )
        .expect("valid toml");
        assert_eq!(config.tessellation_level, 4.0);
        assert_eq!(config.height_scale, DEFAULT_HEIGHT_SCALE);
        assert_eq!(
            config.heightmap,
            HeightmapSource::Flat {
                resolution: 16,
                value: 0.5
            }
        );
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().expect("temp file");
        let config = TerrainConfig {
            patches_per_side: 8,
            surface_texture: Some("textures/grass.png".to_string()),
            ..Default::default()
        };
        file.write_all(config.to_toml_string().expect("serializable").as_bytes())
            .expect("write config");

        let loaded = TerrainConfig::load(file.path()).expect("load config");
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_file_and_bad_toml_are_errors() {
        assert!(TerrainConfig::load("no/such/terrain.toml").is_err());
        assert!(TerrainConfig::from_toml_str("tessellation_level = \"high\"").is_err());
    }
}
