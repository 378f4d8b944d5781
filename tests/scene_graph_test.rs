use cgmath::{InnerSpace, Vector3};
use xrview::{
    app,
    scene::{GroupNode, LightNode, Scene, SceneNode, clear_colour, transform::Transform},
    xr::XrState,
};

use crate::common::test_utils::StubNode;

mod common;

/// Scene wired up the way the viewer does it, with a stub standing in for
/// the GPU-backed ground plane.
fn populated_scene() -> (Scene, XrState) {
    let mut scene = Scene::new(clear_colour(app::BACKGROUND));
    scene.add(Box::new(LightNode::new(app::hemisphere_light())));
    scene.add(Box::new(LightNode::new(app::sun_light())));
    scene.add(Box::new(StubNode::with_transform(app::ground_transform())));
    let xr = XrState::new(&mut scene);
    (scene, xr)
}

#[test]
fn scene_contains_exactly_the_added_nodes() {
    let (scene, xr) = populated_scene();

    // 1 hemisphere + 1 directional + 1 ground + 2 anchors
    assert_eq!(scene.child_count(), 5);
    assert_eq!(xr.controllers.len(), 2);
    assert!(xr.enabled);
    assert_eq!(xr.controllers[0].index, 0);
    assert_eq!(xr.controllers[1].index, 1);
    // The anchors sit at the node indices the handles claim.
    assert_eq!(xr.controllers[0].node, 3);
    assert_eq!(xr.controllers[1].node, 4);
}

#[test]
fn lighting_folds_scene_lights_into_the_uniform() {
    let (scene, _xr) = populated_scene();
    let uniform = scene.lighting();

    let expected = 1.0 / 3.0_f32.sqrt();
    for component in uniform.sun_direction {
        assert!((component - expected).abs() < 1e-6);
    }
    assert_eq!(uniform.sun_colour, [1.0, 1.0, 1.0]);
    assert_eq!(uniform.sky_colour, [0x60 as f32 / 255.0; 3]);
    assert_eq!(uniform.ground_colour, [0x40 as f32 / 255.0; 3]);
}

#[test]
fn sun_light_direction_is_normalized() {
    let xrview::scene::Light::Directional { direction, .. } = app::sun_light() else {
        panic!("sun light should be directional");
    };
    assert!((direction.magnitude() - 1.0).abs() < 1e-6);
    let expected = Vector3::new(1.0, 1.0, 1.0).normalize();
    assert!((direction - expected).magnitude() < 1e-6);
}

#[test]
fn world_transforms_propagate_through_the_graph() {
    let mut scene = Scene::new(wgpu::Color::BLACK);

    let mut parent = GroupNode::new();
    parent.set_local_transform(Transform {
        position: Vector3::new(1.0, 2.0, 3.0),
        ..Transform::default()
    });
    parent.add_child(Box::new(StubNode::with_transform(Transform {
        position: Vector3::new(1.0, 0.0, 0.0),
        ..Transform::default()
    })));
    scene.add(Box::new(parent));

    scene.update_world_transforms();

    let parent = &scene.children()[0];
    assert_eq!(
        parent.world_transform().position,
        Vector3::new(1.0, 2.0, 3.0)
    );
    assert_eq!(
        parent.children()[0].world_transform().position,
        Vector3::new(2.0, 2.0, 3.0)
    );
}

#[test]
fn removing_children_is_explicit_and_bounded() {
    let mut scene = Scene::new(wgpu::Color::BLACK);
    scene.add(Box::new(StubNode::new()));
    scene.add(Box::new(GroupNode::new()));

    assert!(scene.remove(5).is_none());
    assert_eq!(scene.child_count(), 2);

    assert!(scene.remove(0).is_some());
    assert_eq!(scene.child_count(), 1);

    scene.clear();
    assert_eq!(scene.child_count(), 0);
}

#[test]
fn anchors_receive_no_pose_outside_an_immersive_session() {
    let (mut scene, xr) = populated_scene();

    let before: Vec<_> = xr
        .controllers
        .iter()
        .map(|handle| scene.children()[handle.node].local_transform())
        .collect();

    xr.update_anchors(&mut scene);

    for (handle, previous) in xr.controllers.iter().zip(before) {
        assert_eq!(scene.children()[handle.node].local_transform(), previous);
    }
}
