//! Adapter and device setup

use crate::error::{OptionExt, TerrainError, TerrainResult};
use std::sync::Arc;

/// Device, queue and the adapter they came from
pub struct GpuContext {
    pub adapter: wgpu::Adapter,
    pub device: Arc<wgpu::Device>,
    pub queue: Arc<wgpu::Queue>,
}

impl GpuContext {
    pub fn create_instance() -> wgpu::Instance {
        wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        })
    }

    /// Request an adapter able to run the terrain passes.
    ///
    /// The domain pass reads storage buffers from the vertex stage, which
    /// some downlevel adapters cannot do.
    pub async fn new(
        instance: &wgpu::Instance,
        compatible_surface: Option<&wgpu::Surface<'_>>,
    ) -> TerrainResult<Self> {
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface,
                force_fallback_adapter: false,
            })
            .await
            .ok_or_terrain(|| TerrainError::AdapterNotFound)?;

        let info = adapter.get_info();
        log::info!(
            "[GpuContext] Adapter: {} ({:?}, {:?})",
            info.name,
            info.device_type,
            info.backend
        );

        let downlevel = adapter.get_downlevel_capabilities();
        for (flag, name) in [
            (wgpu::DownlevelFlags::COMPUTE_SHADERS, "compute shaders"),
            (wgpu::DownlevelFlags::VERTEX_STORAGE, "vertex stage storage buffers"),
        ] {
            if !downlevel.flags.contains(flag) {
                return Err(TerrainError::UnsupportedAdapter {
                    reason: format!("{} lacks {}", info.name, name),
                });
            }
        }

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Terrain Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default().using_resolution(adapter.limits()),
                },
                None,
            )
            .await?;

        device.on_uncaptured_error(Box::new(|error| {
            log::error!("[GpuContext] Uncaptured GPU error: {}", error);
        }));

        Ok(Self {
            adapter,
            device: Arc::new(device),
            queue: Arc::new(queue),
        })
    }

    /// Blocking headless setup, for tools and tests
    pub fn headless() -> TerrainResult<Self> {
        let instance = Self::create_instance();
        pollster::block_on(Self::new(&instance, None))
    }
}
