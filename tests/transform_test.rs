use cgmath::{InnerSpace, One, Quaternion, Rotation, Rotation3, Vector3};
use xrview::{
    app,
    scene::{model::plane_geometry, transform::Transform},
};

#[test]
fn default_transform_is_identity() {
    let transform = Transform::default();
    assert_eq!(transform.position, Vector3::new(0.0, 0.0, 0.0));
    assert_eq!(transform.rotation, Quaternion::one());
    assert_eq!(transform.scale, Vector3::new(1.0, 1.0, 1.0));
}

#[test]
fn matrix_carries_the_translation() {
    let transform = Transform {
        position: Vector3::new(1.0, -2.0, 3.5),
        ..Transform::default()
    };
    let matrix = transform.to_matrix();
    assert_eq!(matrix.w.x, 1.0);
    assert_eq!(matrix.w.y, -2.0);
    assert_eq!(matrix.w.z, 3.5);
}

#[test]
fn composition_applies_parent_scale_and_offset() {
    let parent = Transform {
        position: Vector3::new(10.0, 0.0, 0.0),
        scale: Vector3::new(2.0, 2.0, 2.0),
        ..Transform::default()
    };
    let child = Transform {
        position: Vector3::new(1.0, 1.0, 0.0),
        ..Transform::default()
    };

    let world = &parent * &child;

    assert_eq!(world.position, Vector3::new(12.0, 2.0, 0.0));
    assert_eq!(world.scale, Vector3::new(2.0, 2.0, 2.0));
}

#[test]
fn composing_with_identity_changes_nothing() {
    let transform = Transform {
        position: Vector3::new(4.0, 5.0, 6.0),
        rotation: Quaternion::from_axis_angle(Vector3::unit_y(), cgmath::Deg(30.0)),
        scale: Vector3::new(0.5, 0.5, 0.5),
    };

    let left = &Transform::default() * &transform;
    let right = &transform * &Transform::default();

    assert_eq!(left, transform);
    assert_eq!(right.position, transform.position);
    assert_eq!(right.scale, transform.scale);
}

#[test]
fn ground_lies_flat_with_its_normal_up() {
    let transform = app::ground_transform();
    assert_eq!(transform.position, Vector3::new(0.0, 0.0, 0.0));
    assert_eq!(transform.scale, Vector3::new(1.0, 1.0, 1.0));

    // The plane's +Z normal must come out pointing straight up.
    let normal = transform.rotation.rotate_vector(Vector3::unit_z());
    assert!((normal - Vector3::unit_y()).magnitude() < 1e-6);

    // -90 degrees about X.
    let half_angle = (-std::f32::consts::FRAC_PI_2 / 2.0).sin();
    assert!((transform.rotation.v.x - half_angle).abs() < 1e-6);
    assert!(transform.rotation.v.y.abs() < 1e-6);
    assert!(transform.rotation.v.z.abs() < 1e-6);
}

#[test]
fn ground_plane_spans_ten_by_ten_units() {
    let (vertices, indices) = plane_geometry(app::GROUND_SIZE, app::GROUND_SIZE);

    assert_eq!(vertices.len(), 4);
    assert_eq!(indices.len(), 6);

    let xs: Vec<f32> = vertices.iter().map(|v| v.position[0]).collect();
    let ys: Vec<f32> = vertices.iter().map(|v| v.position[1]).collect();
    assert_eq!(xs.iter().cloned().fold(f32::INFINITY, f32::min), -5.0);
    assert_eq!(xs.iter().cloned().fold(f32::NEG_INFINITY, f32::max), 5.0);
    assert_eq!(ys.iter().cloned().fold(f32::INFINITY, f32::min), -5.0);
    assert_eq!(ys.iter().cloned().fold(f32::NEG_INFINITY, f32::max), 5.0);

    for vertex in &vertices {
        assert_eq!(vertex.position[2], 0.0);
        assert_eq!(vertex.normal, [0.0, 0.0, 1.0]);
    }
    assert!(indices.iter().all(|idx| (*idx as usize) < vertices.len()));
}
