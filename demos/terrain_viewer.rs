//! Interactive terrain viewer
//!
//! Controls:
//! - hold right mouse button: free camera (mouse look, WASD, Space/C up/down)
//! - Shift: speed boost
//! - mouse wheel: tessellation level (1 to 16)
//! - Alt + mouse wheel: brush size
//! - hold left mouse button: raise the terrain under the cursor (Ctrl lowers)
//!
//! Usage: `cargo run --example terrain_viewer [config.toml]`

use cgmath::{Matrix4, SquareMatrix};
use std::sync::Arc;
use std::time::Instant;
use trefoil_terrain::camera::{self, CameraData, CameraTransformBatch};
use trefoil_terrain::{
    build_transform_block, publish_transforms, snapshot_transforms, GpuContext, SharedTransforms,
    TerrainBrush, TerrainConfig, TerrainHit, TerrainRenderer, TerrainScene,
};
use winit::{
    dpi::PhysicalSize,
    event::{DeviceEvent, ElementState, Event, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::EventLoop,
    keyboard::{KeyCode, PhysicalKey},
    window::{CursorGrabMode, WindowBuilder},
};

/// Pick distance in world units
const PICK_DISTANCE: f32 = 4000.0;

#[derive(Default)]
struct InputState {
    forward: bool,
    back: bool,
    left: bool,
    right: bool,
    up: bool,
    down: bool,
    boost: bool,
    free_camera: bool,
    sculpting: bool,
    ctrl: bool,
    alt: bool,
    mouse_delta: (f32, f32),
    cursor: (f32, f32),
}

impl InputState {
    fn axis(positive: bool, negative: bool) -> f32 {
        (positive as i32 - negative as i32) as f32
    }

    /// Drain this frame's input into a camera batch
    fn take_batch(&mut self, camera: &CameraData) -> CameraTransformBatch {
        let (dx, dy) = std::mem::take(&mut self.mouse_delta);
        if !self.free_camera {
            return CameraTransformBatch::default();
        }
        CameraTransformBatch {
            forward_delta: Self::axis(self.forward, self.back),
            right_delta: Self::axis(self.right, self.left),
            up_delta: Self::axis(self.up, self.down),
            yaw_delta: dx * camera.rotation_sensitivity,
            pitch_delta: -dy * camera.rotation_sensitivity,
            boost: self.boost,
        }
    }

    fn set_key(&mut self, code: KeyCode, pressed: bool) {
        match code {
            KeyCode::KeyW => self.forward = pressed,
            KeyCode::KeyS => self.back = pressed,
            KeyCode::KeyA => self.left = pressed,
            KeyCode::KeyD => self.right = pressed,
            KeyCode::Space => self.up = pressed,
            KeyCode::KeyC => self.down = pressed,
            KeyCode::ShiftLeft | KeyCode::ShiftRight => self.boost = pressed,
            _ => {}
        }
    }
}

/// Terrain point under the cursor
fn pick(
    scene: &TerrainScene,
    camera_state: &CameraData,
    cursor: (f32, f32),
    surface_config: &wgpu::SurfaceConfiguration,
) -> Option<TerrainHit> {
    let screen = (surface_config.width as f32, surface_config.height as f32);
    camera::ray_through_pixel(camera_state, cursor, screen)
        .and_then(|ray| scene.surface().intersect_ray(&ray, PICK_DISTANCE))
}

fn load_config() -> anyhow::Result<TerrainConfig> {
    let config = match std::env::args().nth(1) {
        Some(path) => TerrainConfig::load(&path)?,
        None => TerrainConfig::default(),
    };
    config.validate()?;
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    env_logger::init();

    let config = load_config()?;
    let mut scene = TerrainScene::load(&config)?;

    let event_loop = EventLoop::new()?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(&config.window_title)
            .with_inner_size(PhysicalSize::new(config.window_width, config.window_height))
            .build(&event_loop)?,
    );

    let instance = GpuContext::create_instance();
    let surface = instance.create_surface(window.clone())?;
    let context = pollster::block_on(GpuContext::new(&instance, Some(&surface)))?;

    let size = window.inner_size();
    let mut surface_config = surface
        .get_default_config(&context.adapter, size.width.max(1), size.height.max(1))
        .ok_or_else(|| anyhow::anyhow!("surface is not supported by the adapter"))?;
    surface_config.present_mode = wgpu::PresentMode::AutoVsync;
    surface.configure(&context.device, &surface_config);

    let mut renderer = TerrainRenderer::new(
        &context,
        &scene,
        config.tessellation_level,
        surface_config.format,
        (surface_config.width, surface_config.height),
    )?;

    let aspect = surface_config.width as f32 / surface_config.height as f32;
    let mut camera_state = camera::init_camera_from_config(&config.camera, aspect);
    let transforms = SharedTransforms::default();
    let model = Matrix4::identity();
    let mut input = InputState::default();
    let mut brush = TerrainBrush::default();
    let mut last_frame = Instant::now();

    log::info!("[Viewer] Hold the right mouse button to fly, scroll to change tessellation");

    event_loop.run(move |event, elwt| match event {
        Event::AboutToWait => window.request_redraw(),
        Event::DeviceEvent {
            event: DeviceEvent::MouseMotion { delta },
            ..
        } => {
            if input.free_camera {
                input.mouse_delta.0 += delta.0 as f32;
                input.mouse_delta.1 += delta.1 as f32;
            }
        }
        Event::WindowEvent { event, window_id } if window_id == window.id() => match event {
            WindowEvent::CloseRequested => elwt.exit(),
            WindowEvent::Resized(new_size) => {
                surface_config.width = new_size.width.max(1);
                surface_config.height = new_size.height.max(1);
                surface.configure(&context.device, &surface_config);
                if let Err(e) =
                    renderer.resize(&context.device, surface_config.width, surface_config.height)
                {
                    log::error!("[Viewer] Resize failed: {}", e);
                    elwt.exit();
                    return;
                }
                camera_state =
                    camera::update_aspect_ratio(&camera_state, surface_config.width, surface_config.height);
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state,
                        ..
                    },
                ..
            } => {
                if code == KeyCode::Escape && state == ElementState::Pressed {
                    elwt.exit();
                }
                input.set_key(code, state == ElementState::Pressed);
            }
            WindowEvent::ModifiersChanged(modifiers) => {
                input.ctrl = modifiers.state().control_key();
                input.alt = modifiers.state().alt_key();
            }
            WindowEvent::MouseInput { state, button, .. } => match button {
                MouseButton::Right => {
                    input.free_camera = state == ElementState::Pressed;
                    let grab = if input.free_camera {
                        CursorGrabMode::Confined
                    } else {
                        CursorGrabMode::None
                    };
                    if let Err(e) = window.set_cursor_grab(grab) {
                        log::debug!("[Viewer] Cursor grab unavailable: {}", e);
                    }
                    window.set_cursor_visible(!input.free_camera);
                }
                MouseButton::Left => {
                    input.sculpting = state == ElementState::Pressed;
                    if input.sculpting {
                        match pick(&scene, &camera_state, input.cursor, &surface_config) {
                            Some(hit) => log::info!(
                                "[Viewer] Picked ({:.1}, {:.1}, {:.1}) uv ({:.3}, {:.3})",
                                hit.position.x,
                                hit.position.y,
                                hit.position.z,
                                hit.tile_uv[0],
                                hit.tile_uv[1]
                            ),
                            None => log::info!("[Viewer] No terrain under cursor"),
                        }
                    }
                }
                _ => {}
            },
            WindowEvent::CursorMoved { position, .. } => {
                input.cursor = (position.x as f32, position.y as f32);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let steps = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(position) => (position.y / 40.0) as f32,
                };
                if input.alt {
                    brush = brush.resized(steps);
                    log::info!("[Viewer] Brush size {:.1}", brush.size);
                } else {
                    let level = renderer.set_tessellation_level(renderer.tessellation_level() + steps);
                    log::info!("[Viewer] Tessellation level {}", level);
                }
            }
            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                let delta_time = (now - last_frame).as_secs_f32();
                last_frame = now;

                let batch = input.take_batch(&camera_state);
                camera_state = camera::apply_transform_batch(&camera_state, &batch, delta_time);
                publish_transforms(&transforms, build_transform_block(&camera_state, model));

                if input.sculpting {
                    if let Some(hit) = pick(&scene, &camera_state, input.cursor, &surface_config) {
                        let center = [hit.position.x, hit.position.z];
                        let extent = scene.extent;
                        let changed =
                            brush.sculpt(&mut scene.heightmap, &extent, center, delta_time, !input.ctrl);
                        if changed > 0 {
                            if let Err(e) = renderer.update_heightmap(&context.queue, &scene.heightmap) {
                                log::error!("[Viewer] Heightmap upload failed: {}", e);
                            }
                        }
                    }
                }

                let frame = match surface.get_current_texture() {
                    Ok(frame) => frame,
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        surface.configure(&context.device, &surface_config);
                        return;
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("[Viewer] Out of GPU memory");
                        elwt.exit();
                        return;
                    }
                    Err(e) => {
                        log::warn!("[Viewer] Dropped frame: {}", e);
                        return;
                    }
                };
                let view = frame
                    .texture
                    .create_view(&wgpu::TextureViewDescriptor::default());

                let snapshot = snapshot_transforms(&transforms);
                if let Err(e) = renderer.render(&context.device, &context.queue, &view, &snapshot) {
                    log::error!("[Viewer] Render failed: {}", e);
                    elwt.exit();
                    return;
                }
                frame.present();
            }
            _ => {}
        },
        _ => {}
    })?;

    Ok(())
}
