use std::time::Duration;

use cgmath::{InnerSpace, Point3, Rad};
use xrview::{
    camera::{Camera, CameraUniform, OrbitController, Projection},
    context,
};

fn viewer_camera() -> Camera {
    Camera::new(context::CAMERA_POSITION, context::CAMERA_TARGET)
}

fn viewer_projection(width: u32, height: u32) -> Projection {
    Projection::new(
        width,
        height,
        cgmath::Deg(context::CAMERA_FOVY_DEG),
        context::CAMERA_ZNEAR,
        context::CAMERA_ZFAR,
    )
}

const FRAME: Duration = Duration::from_millis(16);

#[test]
fn aspect_ratio_follows_the_viewport() {
    let mut projection = viewer_projection(800, 600);
    assert_eq!(projection.aspect, 800.0 / 600.0);

    projection.resize(1920, 1080);
    assert_eq!(projection.aspect, 1920.0 / 1080.0);
    assert_eq!(projection.fovy, Rad::from(cgmath::Deg(50.0)));
    assert_eq!(projection.znear, 0.1);
    assert_eq!(projection.zfar, 100.0);
}

#[test]
fn repeated_resizes_only_keep_the_last_dimensions() {
    let mut projection = viewer_projection(100, 100);
    for i in 1..=100u32 {
        projection.resize(100 + i, 200 + i);
    }
    assert_eq!(projection.aspect, 200.0 / 300.0);
}

#[test]
fn camera_starts_at_standing_eye_height() {
    let camera = viewer_camera();
    assert_eq!(camera.position, Point3::new(0.0, 1.6, 3.0));
    assert_eq!(camera.target, Point3::new(0.0, 1.6, 0.0));
}

#[test]
fn idle_controller_leaves_the_camera_in_place() {
    let mut camera = viewer_camera();
    let mut controller = OrbitController::new(0.005, 8.0);

    for _ in 0..10 {
        controller.update(&mut camera, FRAME);
    }

    assert!((camera.position - Point3::new(0.0, 1.6, 3.0)).magnitude() < 1e-5);
    assert_eq!(camera.target, Point3::new(0.0, 1.6, 0.0));
}

#[test]
fn orbiting_preserves_the_distance_to_the_target() {
    let mut camera = viewer_camera();
    let mut controller = OrbitController::new(0.005, 8.0);
    let radius = (camera.position - camera.target).magnitude();

    controller.handle_mouse(120.0, -45.0);
    controller.update(&mut camera, FRAME);

    let after = (camera.position - camera.target).magnitude();
    assert!((after - radius).abs() < 1e-4);
    // The drag actually moved the camera.
    assert!((camera.position - Point3::new(0.0, 1.6, 3.0)).magnitude() > 0.1);
    assert_eq!(camera.target, Point3::new(0.0, 1.6, 0.0));
}

#[test]
fn scrolling_zooms_towards_the_target() {
    let mut camera = viewer_camera();
    let mut controller = OrbitController::new(0.005, 8.0);
    let before = (camera.position - camera.target).magnitude();

    controller.handle_scroll(3.0);
    // Zoom eases in over several frames; give it a few.
    for _ in 0..30 {
        controller.update(&mut camera, FRAME);
    }

    let after = (camera.position - camera.target).magnitude();
    assert!(after < before);
    assert!(after > 0.0);
    assert_eq!(camera.target, Point3::new(0.0, 1.6, 0.0));
}

#[test]
fn pitch_never_flips_over_the_pole() {
    let mut camera = viewer_camera();
    let mut controller = OrbitController::new(0.005, 8.0);

    // A drag far past the vertical.
    for _ in 0..100 {
        controller.handle_mouse(0.0, 10_000.0);
        controller.update(&mut camera, FRAME);
    }

    let offset = camera.position - camera.target;
    let pitch = (offset.y / offset.magnitude()).asin();
    assert!(pitch < std::f32::consts::FRAC_PI_2);
    assert!(pitch > 0.0);
}

#[test]
fn panning_moves_the_orbit_target() {
    let mut camera = viewer_camera();
    let mut controller = OrbitController::new(0.005, 8.0);
    let radius = (camera.position - camera.target).magnitude();

    controller.handle_pan(200.0, 0.0);
    controller.update(&mut camera, FRAME);

    assert!(camera.target != Point3::new(0.0, 1.6, 0.0));
    let after = (camera.position - camera.target).magnitude();
    assert!((after - radius).abs() < 1e-4);
}

#[test]
fn view_matrix_looks_at_the_target() {
    let camera = viewer_camera();
    let projection = viewer_projection(640, 480);
    let mut uniform = CameraUniform::new();
    uniform.update_view_proj(&camera, &projection);

    // The target sits straight ahead of the camera, so its view-space
    // position is on the -Z axis.
    let view = camera.calc_matrix();
    let target_view = view * camera.target.to_homogeneous();
    assert!(target_view.x.abs() < 1e-5);
    assert!(target_view.y.abs() < 1e-5);
    assert!(target_view.z < 0.0);
}
