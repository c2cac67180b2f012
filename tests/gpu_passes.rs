//! GPU passes against the CPU reference. Skipped when no adapter is present.

use cgmath::{Matrix4, Point3, SquareMatrix};
use trefoil_terrain::camera::init_camera_looking_at;
use trefoil_terrain::heightmap::HeightmapSource;
use trefoil_terrain::tessellation::pack_control_points;
use trefoil_terrain::{
    build_transform_block, CubemapImage, GpuContext, Heightmap, PatchController, SurfaceTexture,
    TerrainBrush, TerrainConfig, TerrainError, TerrainRenderer, TerrainScene, TransformSnapshot,
    UniformLevel,
};

const TARGET_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;
// 64 texels x 4 bytes keeps rows at the 256-byte copy alignment
const TARGET_SIZE: u32 = 64;
const TERRAIN_COLOR: [u8; 4] = [200, 60, 40, 255];
const SKY_COLOR: [u8; 3] = [40, 90, 210];

fn context_or_skip() -> Option<GpuContext> {
    match GpuContext::headless() {
        Ok(context) => Some(context),
        Err(e) => {
            eprintln!("skipping GPU test: {}", e);
            None
        }
    }
}

#[test]
fn control_pass_matches_cpu_controller() {
    let Some(context) = context_or_skip() else {
        return;
    };

    let config = TerrainConfig {
        terrain_size: 64.0,
        patches_per_side: 4,
        tessellation_level: 6.0,
        heightmap: HeightmapSource::Flat {
            resolution: 16,
            value: 0.5,
        },
        ..Default::default()
    };
    let scene = TerrainScene::load(&config).expect("scene");

    let format = wgpu::TextureFormat::Rgba8UnormSrgb;
    let size = (64, 64);
    let mut renderer = TerrainRenderer::new(&context, &scene, config.tessellation_level, format, size)
        .expect("renderer");

    let target = context.device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Test Target"),
        size: wgpu::Extent3d {
            width: size.0,
            height: size.1,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    let view = target.create_view(&wgpu::TextureViewDescriptor::default());

    let camera = init_camera_looking_at(
        Point3::new(8.0, 50.0, 0.0),
        Point3::new(100.0, 50.0, 0.0),
        1.0,
    );
    let block = build_transform_block(&camera, Matrix4::identity());
    let snapshot = TransformSnapshot { version: 1, block };

    renderer
        .render(&context.device, &context.queue, &view, &snapshot)
        .expect("frame");

    let gpu_factors = pollster::block_on(renderer.read_factors(&context.device, &context.queue))
        .expect("factor readback");
    let controller = PatchController::new(UniformLevel::new(config.tessellation_level));
    let (cpu, _) = controller.control_patches(&scene.patches, &block);

    assert_eq!(gpu_factors.len(), cpu.len());
    for (index, (gpu, cpu)) in gpu_factors.iter().zip(&cpu).enumerate() {
        assert_eq!(gpu.outer, cpu.factors.outer, "outer factors of patch {}", index);
        assert_eq!(gpu.inner, cpu.factors.inner, "inner factors of patch {}", index);
    }

    let control_points = pollster::block_on(
        renderer
            .control_pass()
            .read_control_points(&context.device, &context.queue),
    )
    .expect("control point readback");
    assert_eq!(control_points, pack_control_points(&scene.patches));
}

#[test]
fn tessellation_level_changes_reach_the_gpu() {
    let Some(context) = context_or_skip() else {
        return;
    };

    let config = TerrainConfig {
        terrain_size: 16.0,
        patches_per_side: 2,
        heightmap: HeightmapSource::Flat {
            resolution: 4,
            value: 0.0,
        },
        ..Default::default()
    };
    let scene = TerrainScene::load(&config).expect("scene");
    let format = wgpu::TextureFormat::Rgba8UnormSrgb;
    let mut renderer =
        TerrainRenderer::new(&context, &scene, 2.0, format, (32, 32)).expect("renderer");
    assert_eq!(renderer.set_tessellation_level(40.0), 16.0);

    let target = context.device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Test Target"),
        size: wgpu::Extent3d {
            width: 32,
            height: 32,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    let view = target.create_view(&wgpu::TextureViewDescriptor::default());

    // Camera above the terrain looking down: every patch is in front
    let camera = init_camera_looking_at(
        Point3::new(0.0, 40.0, 0.1),
        Point3::new(0.0, 0.0, 0.0),
        1.0,
    );
    let snapshot = TransformSnapshot {
        version: 1,
        block: build_transform_block(&camera, Matrix4::identity()),
    };
    renderer
        .render(&context.device, &context.queue, &view, &snapshot)
        .expect("frame");

    let factors = pollster::block_on(renderer.read_factors(&context.device, &context.queue))
        .expect("factor readback");
    assert!(factors.iter().all(|f| f.outer == [16.0; 4] && f.inner == [16.0; 2]));
}

/// Flat 16x16 terrain with a solid surface color and a solid sky
fn solid_scene(height_value: f32, height_scale: f32) -> TerrainScene {
    let config = TerrainConfig {
        terrain_size: 16.0,
        patches_per_side: 2,
        height_scale,
        heightmap: HeightmapSource::Flat {
            resolution: 4,
            value: height_value,
        },
        ..Default::default()
    };
    let mut scene = TerrainScene::load(&config).expect("scene");
    scene.surface = SurfaceTexture::solid(TERRAIN_COLOR);
    scene.cubemap = CubemapImage::gradient(8, SKY_COLOR, SKY_COLOR);
    scene
}

/// Render one frame from straight above the terrain center and read it back
fn render_from_above(context: &GpuContext, scene: &TerrainScene, camera_height: f32) -> Vec<u8> {
    let mut renderer = solid_renderer(context, scene);
    render_and_read(context, &mut renderer, camera_height)
}

fn solid_renderer(context: &GpuContext, scene: &TerrainScene) -> TerrainRenderer {
    TerrainRenderer::new(
        context,
        scene,
        4.0,
        TARGET_FORMAT,
        (TARGET_SIZE, TARGET_SIZE),
    )
    .expect("renderer")
}

fn render_and_read(
    context: &GpuContext,
    renderer: &mut TerrainRenderer,
    camera_height: f32,
) -> Vec<u8> {
    let target = context.device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Readback Target"),
        size: wgpu::Extent3d {
            width: TARGET_SIZE,
            height: TARGET_SIZE,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: TARGET_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    });
    let view = target.create_view(&wgpu::TextureViewDescriptor::default());

    let camera = init_camera_looking_at(
        Point3::new(0.0, camera_height, 0.01),
        Point3::new(0.0, 0.0, 0.0),
        1.0,
    );
    let snapshot = TransformSnapshot {
        version: 1,
        block: build_transform_block(&camera, Matrix4::identity()),
    };
    renderer
        .render(&context.device, &context.queue, &view, &snapshot)
        .expect("frame");

    let bytes_per_row = TARGET_SIZE * 4;
    let readback = context.device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Pixel Readback"),
        size: (bytes_per_row * TARGET_SIZE) as u64,
        usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    let mut encoder = context
        .device
        .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: None });
    encoder.copy_texture_to_buffer(
        target.as_image_copy(),
        wgpu::ImageCopyBuffer {
            buffer: &readback,
            layout: wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(bytes_per_row),
                rows_per_image: Some(TARGET_SIZE),
            },
        },
        wgpu::Extent3d {
            width: TARGET_SIZE,
            height: TARGET_SIZE,
            depth_or_array_layers: 1,
        },
    );
    context.queue.submit(Some(encoder.finish()));

    let slice = readback.slice(..);
    let (sender, receiver) = flume::bounded(1);
    slice.map_async(wgpu::MapMode::Read, move |result| {
        let _ = sender.send(result);
    });
    context.device.poll(wgpu::Maintain::Wait);
    receiver.recv().expect("map callback").expect("map succeeded");
    let pixels = slice.get_mapped_range().to_vec();
    readback.unmap();
    pixels
}

fn pixel(pixels: &[u8], x: u32, y: u32) -> [u8; 3] {
    let offset = ((y * TARGET_SIZE + x) * 4) as usize;
    [pixels[offset], pixels[offset + 1], pixels[offset + 2]]
}

fn assert_color(actual: [u8; 3], expected: [u8; 3], what: &str) {
    let close = actual
        .iter()
        .zip(expected.iter())
        .all(|(a, e)| (*a as i16 - *e as i16).abs() <= 2);
    assert!(close, "{}: got {:?}, expected {:?}", what, actual, expected);
}

#[test]
fn flat_terrain_renders_surface_color_under_sky() {
    let Some(context) = context_or_skip() else {
        return;
    };
    let terrain = [TERRAIN_COLOR[0], TERRAIN_COLOR[1], TERRAIN_COLOR[2]];

    // At 40 units with a 45 degree fov the 16-unit terrain covers the middle
    // of the frame only
    let pixels = render_from_above(&context, &solid_scene(0.0, 30.0), 40.0);
    let center = TARGET_SIZE / 2;
    assert_color(pixel(&pixels, center, center), terrain, "center pixel");
    assert_color(pixel(&pixels, 1, 1), SKY_COLOR, "corner pixel");
    assert_color(
        pixel(&pixels, TARGET_SIZE - 2, TARGET_SIZE - 2),
        SKY_COLOR,
        "opposite corner pixel",
    );
}

#[test]
fn displaced_terrain_rises_toward_the_camera() {
    let Some(context) = context_or_skip() else {
        return;
    };
    let terrain = [TERRAIN_COLOR[0], TERRAIN_COLOR[1], TERRAIN_COLOR[2]];

    // Height 1.0 x scale 30 lifts the surface to 10 units below the camera,
    // close enough to fill the whole frame
    let pixels = render_from_above(&context, &solid_scene(1.0, 30.0), 40.0);
    assert_color(pixel(&pixels, 1, 1), terrain, "corner pixel");
    assert_color(
        pixel(&pixels, TARGET_SIZE - 2, TARGET_SIZE - 2),
        terrain,
        "opposite corner pixel",
    );
}

#[test]
fn oversized_heightmap_fails_renderer_setup() {
    let Some(context) = context_or_skip() else {
        return;
    };

    let mut scene = solid_scene(0.0, 30.0);
    let too_wide = context.device.limits().max_texture_dimension_2d + 1;
    scene.heightmap =
        Heightmap::from_texels(too_wide, 1, vec![0.0; too_wide as usize]).expect("cpu heightmap");

    match TerrainRenderer::new(&context, &scene, 4.0, TARGET_FORMAT, (32, 32)) {
        Err(TerrainError::TextureCreation { label, .. }) => assert_eq!(label, "Heightmap"),
        Err(other) => panic!("unexpected error: {}", other),
        Ok(_) => panic!("renderer accepted a heightmap wider than the device limit"),
    }
}

#[test]
fn sculpted_heightmap_reaches_the_gpu() {
    let Some(context) = context_or_skip() else {
        return;
    };
    let terrain = [TERRAIN_COLOR[0], TERRAIN_COLOR[1], TERRAIN_COLOR[2]];

    let mut scene = solid_scene(0.0, 30.0);
    let mut renderer = solid_renderer(&context, &scene);
    let before = render_and_read(&context, &mut renderer, 40.0);
    assert_color(pixel(&before, 1, 1), SKY_COLOR, "corner before sculpting");

    // A brush wider than the terrain, strong enough to reach full height
    let brush = TerrainBrush {
        size: 100.0,
        strength: 100.0,
    };
    let extent = scene.extent;
    assert!(brush.sculpt(&mut scene.heightmap, &extent, [0.0, 0.0], 1.0, true) > 0);
    renderer
        .update_heightmap(&context.queue, &scene.heightmap)
        .expect("heightmap upload");

    let after = render_and_read(&context, &mut renderer, 40.0);
    assert_color(pixel(&after, 1, 1), terrain, "corner after sculpting");

    let resized = Heightmap::flat(8, 8, 0.0).expect("valid size");
    assert!(matches!(
        renderer.update_heightmap(&context.queue, &resized),
        Err(TerrainError::TextureDimensions { .. })
    ));
}
