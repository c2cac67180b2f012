//! CPU pipeline from patch list to displaced vertices

use cgmath::{Matrix4, Point3, SquareMatrix, Vector3};
use std::sync::Arc;
use std::thread;
use trefoil_terrain::camera::init_camera_looking_at;
use trefoil_terrain::heightmap::{ConstantHeight, Heightmap};
use trefoil_terrain::tessellation::{tessellate_patches, PatchVisibility};
use trefoil_terrain::{
    build_patch_grid, build_transform_block, publish_transforms, snapshot_transforms, Patch,
    PatchController, PatchCorner, SharedTransforms, TerrainExtent, UniformLevel,
};

fn unit_patch() -> Patch {
    Patch::new([
        PatchCorner::new([0.0, 0.0, 0.0], [0.0, 0.0]),
        PatchCorner::new([1.0, 0.0, 0.0], [1.0, 0.0]),
        PatchCorner::new([0.0, 0.0, 1.0], [0.0, 1.0]),
        PatchCorner::new([1.0, 0.0, 1.0], [1.0, 1.0]),
    ])
}

#[test]
fn unit_patch_in_front_of_camera() {
    let camera = init_camera_looking_at(
        Point3::new(0.5, 2.0, 4.0),
        Point3::new(0.5, 0.0, 0.5),
        1.0,
    );
    let transforms = build_transform_block(&camera, Matrix4::identity());
    let controller = PatchController::new(UniformLevel::new(4.0));
    let flat = Heightmap::flat(8, 8, 0.0).expect("valid size");

    let (geometry, stats) = tessellate_patches(&[unit_patch()], &transforms, &controller, &flat, 250.0);
    assert_eq!(stats.visible_patches, 1);

    let patch = &geometry[0];
    assert_eq!(patch.control.visibility, PatchVisibility::Visible);
    assert_eq!(patch.control.factors.outer, [4.0; 4]);
    assert_eq!(patch.control.factors.inner, [4.0; 2]);
    assert_eq!(patch.control.control_points, unit_patch().corners);

    assert_eq!((patch.grid.columns, patch.grid.rows), (4, 4));
    assert_eq!(patch.grid.triangle_count(), 32);

    // Sample (2, 2) of the 5x5 grid is the domain center
    let center = patch.vertices[2 * 5 + 2];
    assert_eq!(center.world_position, Vector3::new(0.5, 0.0, 0.5));
    assert_eq!(center.tile_uv, cgmath::Vector2::new(0.5, 0.5));
}

#[test]
fn patch_behind_camera_produces_no_vertices() {
    let camera = init_camera_looking_at(
        Point3::new(0.5, 1.0, -2.0),
        Point3::new(0.5, 1.0, -10.0),
        1.0,
    );
    let transforms = build_transform_block(&camera, Matrix4::identity());
    let controller = PatchController::new(UniformLevel::new(16.0));

    let (geometry, stats) =
        tessellate_patches(&[unit_patch()], &transforms, &controller, &ConstantHeight(0.3), 10.0);
    assert_eq!(stats.culled_patches, 1);
    assert!(geometry[0].control.factors.is_culled());
    assert!(geometry[0].grid.is_empty());
    assert!(geometry[0].vertices.is_empty());
}

#[test]
fn grid_split_by_view_plane() {
    let extent = TerrainExtent::centered(64.0);
    let patches = build_patch_grid(&extent, 4).expect("valid grid");
    // Looking along +X from x = 8: columns left of x = 0 are behind
    let camera = init_camera_looking_at(
        Point3::new(8.0, 50.0, 0.0),
        Point3::new(100.0, 50.0, 0.0),
        1.0,
    );
    let transforms = build_transform_block(&camera, Matrix4::identity());
    let controller = PatchController::new(UniformLevel::new(3.0));

    let (results, stats) = controller.control_patches(&patches, &transforms);
    assert_eq!(stats.total_patches, 16);
    assert_eq!(stats.visible_patches, 8);
    for (index, result) in results.iter().enumerate() {
        let column = index % 4;
        let expected = if column >= 2 {
            PatchVisibility::Visible
        } else {
            PatchVisibility::Culled
        };
        assert_eq!(result.visibility, expected, "patch {}", index);
    }
}

#[test]
fn displacement_follows_heightmap() {
    let camera = init_camera_looking_at(
        Point3::new(0.5, 5.0, 5.0),
        Point3::new(0.5, 0.0, 0.5),
        1.0,
    );
    let transforms = build_transform_block(&camera, Matrix4::identity());
    let controller = PatchController::new(UniformLevel::new(2.0));
    let low = ConstantHeight(0.2);
    let high = ConstantHeight(0.6);

    let (a, _) = tessellate_patches(&[unit_patch()], &transforms, &controller, &low, 100.0);
    let (b, _) = tessellate_patches(&[unit_patch()], &transforms, &controller, &high, 100.0);
    for (low, high) in a[0].vertices.iter().zip(&b[0].vertices) {
        assert_eq!(low.tile_uv, high.tile_uv);
        assert!((high.world_position.y - low.world_position.y - 40.0).abs() < 1e-3);
    }
}

#[test]
fn published_snapshots_are_never_torn() {
    let shared = Arc::new(SharedTransforms::default());
    let writer = {
        let shared = Arc::clone(&shared);
        thread::spawn(move || {
            for step in 1..=200 {
                let camera = init_camera_looking_at(
                    Point3::new(step as f32, 10.0, 0.0),
                    Point3::new(0.0, 0.0, 0.0),
                    1.0,
                );
                publish_transforms(&shared, build_transform_block(&camera, Matrix4::identity()));
            }
        })
    };

    let mut last_version = 0;
    for _ in 0..200 {
        let snapshot = snapshot_transforms(&shared);
        assert!(snapshot.version >= last_version);
        last_version = snapshot.version;
        let block = snapshot.block;
        let expected = block.proj() * block.view() * block.model();
        let mvp = block.mvp();
        for column in 0..4 {
            for row in 0..4 {
                assert!((mvp[column][row] - expected[column][row]).abs() < 1e-3);
            }
        }
    }
    writer.join().expect("writer thread");
    assert_eq!(snapshot_transforms(&shared).version, 200);
}
