use std::sync::atomic::{AtomicUsize, Ordering};

use cgmath::Vector3;
use xrview::{
    app::{LoadToken, apply_load_outcome},
    scene::{Scene, SceneNode, transform::Transform},
};

use crate::common::test_utils::StubNode;

mod common;

static ERROR_RECORDS: AtomicUsize = AtomicUsize::new(0);

struct CountingLogger;

impl log::Log for CountingLogger {
    fn enabled(&self, _metadata: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        if record.level() == log::Level::Error {
            ERROR_RECORDS.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn flush(&self) {}
}

static LOGGER: CountingLogger = CountingLogger;

/// One test covers all outcomes so the scenarios share the global logger
/// without racing each other.
#[test]
fn load_outcomes_update_the_scene_and_the_diagnostic_channel() {
    log::set_logger(&LOGGER).expect("no other logger in this binary");
    log::set_max_level(log::LevelFilter::Trace);

    let mut scene = Scene::new(wgpu::Color::BLACK);
    scene.add(Box::new(StubNode::new()));
    let token = LoadToken::new();

    // Failure: child count unchanged, exactly one error record.
    let attached = apply_load_outcome(
        &mut scene,
        &token,
        Err(anyhow::anyhow!("simulated network error")),
    );
    assert!(!attached);
    assert_eq!(scene.child_count(), 1);
    assert_eq!(ERROR_RECORDS.load(Ordering::SeqCst), 1);

    // Success: exactly one new child, reset to the origin at unit scale.
    let node = StubNode::with_transform(Transform {
        position: Vector3::new(7.0, 8.0, 9.0),
        scale: Vector3::new(3.0, 3.0, 3.0),
        ..Transform::default()
    });
    let attached = apply_load_outcome(&mut scene, &token, Ok(Box::new(node)));
    assert!(attached);
    assert_eq!(scene.child_count(), 2);
    let model = &scene.children()[1];
    assert_eq!(model.local_transform().position, Vector3::new(0.0, 0.0, 0.0));
    assert_eq!(model.local_transform().scale, Vector3::new(1.0, 1.0, 1.0));
    // Success paths log no errors.
    assert_eq!(ERROR_RECORDS.load(Ordering::SeqCst), 1);

    // Cancelled: the result is discarded, the scene untouched, no error.
    token.cancel();
    assert!(token.is_cancelled());
    let attached = apply_load_outcome(&mut scene, &token, Ok(Box::new(StubNode::new())));
    assert!(!attached);
    assert_eq!(scene.child_count(), 2);
    assert_eq!(ERROR_RECORDS.load(Ordering::SeqCst), 1);

    // A failure after cancellation is silent too; the viewer is gone.
    let attached = apply_load_outcome(&mut scene, &token, Err(anyhow::anyhow!("late failure")));
    assert!(!attached);
    assert_eq!(ERROR_RECORDS.load(Ordering::SeqCst), 1);
}
