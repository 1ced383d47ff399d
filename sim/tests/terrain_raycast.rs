use sim::{HeightField, TerrainConfig};
use spider::{GroundQuery, Vec3d, DOWN};

#[test]
fn downward_ray_lands_on_column_top() {
    let steps = HeightField::new(TerrainConfig::Steps { step_height: 0.5, step_length: 2.0 });
    for (x, expected) in [(0.5, 0.0), (2.5, 0.5), (4.5, 1.0)] {
        let hit = steps.raycast_ground(Vec3d::new(x, 3.0, 0.5), DOWN, 10.0).expect("ray should hit");
        assert!((hit.y - expected).abs() < 1e-3, "x={x}: hit={hit:?} expected y={expected}");
        assert!(!steps.is_solid(hit), "hit point should sit on the surface, not inside");
    }
}

#[test]
fn horizontal_ray_stops_at_step_face() {
    let steps = HeightField::new(TerrainConfig::Steps { step_height: 1.0, step_length: 2.0 });
    let hit = steps
        .raycast_ground(Vec3d::new(0.5, 0.5, 0.5), Vec3d::X, 5.0)
        .expect("ray should hit the first riser");
    assert!((hit.x - 2.0).abs() < 1e-3, "hit={hit:?}");
}

#[test]
fn short_or_degenerate_rays_miss() {
    let flat = HeightField::new(TerrainConfig::Flat { height: 0.0 });
    assert!(flat.raycast_ground(Vec3d::new(0.0, 5.0, 0.0), DOWN, 2.0).is_none());
    assert!(flat.raycast_ground(Vec3d::new(0.0, 5.0, 0.0), Vec3d::ZERO, 10.0).is_none());
    assert_eq!(
        flat.raycast_ground(Vec3d::new(0.0, -1.0, 0.0), DOWN, 1.0),
        Some(Vec3d::new(0.0, -1.0, 0.0)),
        "a ray starting inside terrain hits at its origin"
    );
}

#[test]
fn ground_contact_and_collision_use_the_surface() {
    let flat = HeightField::new(TerrainConfig::Flat { height: 1.0 });
    assert!(flat.is_on_ground(Vec3d::new(3.2, 1.0005, -4.0), DOWN));
    assert!(!flat.is_on_ground(Vec3d::new(3.2, 1.2, -4.0), DOWN));

    let resolved = flat
        .resolve_collision(Vec3d::new(0.5, 0.7, 0.5), DOWN)
        .expect("sunken point resolves to the surface");
    assert!((resolved.position.y - 1.0).abs() < 1e-3, "resolved={resolved:?}");
    assert!((resolved.offset.y - 0.3).abs() < 1e-3, "offset={:?}", resolved.offset);
    assert!(flat.resolve_collision(Vec3d::new(0.5, 1.3, 0.5), DOWN).is_none());
}
