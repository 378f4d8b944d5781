//! Scene graph and hierarchical scene organization.
//!
//! Provides the [`Scene`] container and the [`SceneNode`] trait: a
//! hierarchical representation of everything the viewer draws, including
//! lights, the ground plane, tracking anchors and the streamed model.
//!
//! The node capability set (add/remove/children/transforms/draw) is a trait
//! so tests can substitute doubles for GPU-backed nodes.

use log::warn;
use wgpu::util::DeviceExt;

use crate::{
    pipelines::lighting::LightingUniform,
    scene::{
        model::{DrawModel, Model},
        transform::Transform,
    },
};

pub mod model;
pub mod texture;
pub mod transform;

/// Convert a 24-bit hex tint (e.g. `0x606060`) into normalized RGB.
pub fn colour(hex: u32) -> [f32; 3] {
    [
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    ]
}

/// Convert a 24-bit hex tint into an opaque clear colour.
pub fn clear_colour(hex: u32) -> wgpu::Color {
    let [r, g, b] = colour(hex);
    wgpu::Color {
        r: r as f64,
        g: g as f64,
        b: b as f64,
        a: 1.0,
    }
}

/// A light source contributing to the frame's lighting uniform.
///
/// Lights live in the scene graph like any other node but don't draw;
/// [`Scene::lighting`] folds them into the [`LightingUniform`] each frame.
#[derive(Clone, Debug, PartialEq)]
pub enum Light {
    /// Ambient-style light fading between a sky tint (facing up) and a
    /// ground tint (facing down).
    Hemisphere { sky: [f32; 3], ground: [f32; 3] },
    /// Parallel light along `direction` (pointing from the scene towards
    /// the light, as in most scene-graph engines).
    Directional {
        colour: [f32; 3],
        direction: cgmath::Vector3<f32>,
    },
}

/// A node in the scene graph.
///
/// Nodes own their children exclusively; the world transform of a child is
/// its local transform composed onto the parent's world transform.
pub trait SceneNode: Send {
    fn local_transform(&self) -> Transform;

    fn set_local_transform(&mut self, transform: Transform);

    fn world_transform(&self) -> Transform;

    /// Recompute this node's world transform from `parent` and propagate to
    /// all children.
    fn update_world_transform(&mut self, parent: &Transform);

    fn children(&self) -> &[Box<dyn SceneNode>];

    fn children_mut(&mut self) -> &mut Vec<Box<dyn SceneNode>>;

    fn add_child(&mut self, child: Box<dyn SceneNode>);

    /// Remove and return the child at `idx`, or `None` when out of bounds.
    fn remove_child(&mut self, idx: usize) -> Option<Box<dyn SceneNode>>;

    /// The light this node contributes, if any.
    fn light(&self) -> Option<&Light> {
        None
    }

    /// Upload world transforms to GPU buffers before drawing.
    fn write_to_buffers(&mut self, queue: &wgpu::Queue, device: &wgpu::Device);

    fn draw(
        &self,
        camera_bind_group: &wgpu::BindGroup,
        lighting_bind_group: &wgpu::BindGroup,
        render_pass: &mut wgpu::RenderPass<'_>,
    );
}

/// The scene: a flat background colour and an ordered collection of nodes.
///
/// The scene contains exactly the nodes explicitly added to it; nothing is
/// inserted or dropped behind the caller's back.
pub struct Scene {
    pub background: wgpu::Color,
    nodes: Vec<Box<dyn SceneNode>>,
}

impl Scene {
    pub fn new(background: wgpu::Color) -> Self {
        Self {
            background,
            nodes: Vec::new(),
        }
    }

    pub fn add(&mut self, node: Box<dyn SceneNode>) {
        self.nodes.push(node);
    }

    pub fn remove(&mut self, idx: usize) -> Option<Box<dyn SceneNode>> {
        if idx >= self.nodes.len() {
            warn!(
                "you tried to remove scene child {}, but there are only {}",
                idx,
                self.nodes.len()
            );
            return None;
        }
        Some(self.nodes.remove(idx))
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    pub fn children(&self) -> &[Box<dyn SceneNode>] {
        &self.nodes
    }

    pub fn child_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn node_mut(&mut self, idx: usize) -> Option<&mut Box<dyn SceneNode>> {
        self.nodes.get_mut(idx)
    }

    /// Fold all lights in the graph into one uniform for the frame.
    ///
    /// Later lights of the same kind win; missing kinds keep the uniform's
    /// defaults.
    pub fn lighting(&self) -> LightingUniform {
        let mut uniform = LightingUniform::default();
        for node in &self.nodes {
            fold_lighting(node.as_ref(), &mut uniform);
        }
        uniform
    }

    pub fn update_world_transforms(&mut self) {
        let root = Transform::default();
        for node in &mut self.nodes {
            node.update_world_transform(&root);
        }
    }

    pub fn write_to_buffers(&mut self, queue: &wgpu::Queue, device: &wgpu::Device) {
        for node in &mut self.nodes {
            node.write_to_buffers(queue, device);
        }
    }

    pub fn draw(
        &self,
        camera_bind_group: &wgpu::BindGroup,
        lighting_bind_group: &wgpu::BindGroup,
        render_pass: &mut wgpu::RenderPass<'_>,
    ) {
        for node in &self.nodes {
            node.draw(camera_bind_group, lighting_bind_group, render_pass);
        }
    }
}

fn fold_lighting(node: &dyn SceneNode, uniform: &mut LightingUniform) {
    if let Some(light) = node.light() {
        match light {
            Light::Hemisphere { sky, ground } => {
                uniform.sky_colour = *sky;
                uniform.ground_colour = *ground;
            }
            Light::Directional { colour, direction } => {
                uniform.sun_colour = *colour;
                uniform.set_sun_direction(*direction);
            }
        }
    }
    for child in node.children() {
        fold_lighting(child.as_ref(), uniform);
    }
}

/// An empty node: pure container or tracking anchor.
pub struct GroupNode {
    children: Vec<Box<dyn SceneNode>>,
    local: Transform,
    world: Transform,
}

impl GroupNode {
    pub fn new() -> Self {
        Self {
            children: Vec::new(),
            local: Transform::default(),
            world: Transform::default(),
        }
    }
}

impl Default for GroupNode {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneNode for GroupNode {
    fn local_transform(&self) -> Transform {
        self.local.clone()
    }

    fn set_local_transform(&mut self, transform: Transform) {
        self.local = transform;
    }

    fn world_transform(&self) -> Transform {
        self.world.clone()
    }

    fn update_world_transform(&mut self, parent: &Transform) {
        self.world = parent * &self.local;
        for child in &mut self.children {
            child.update_world_transform(&self.world);
        }
    }

    fn children(&self) -> &[Box<dyn SceneNode>] {
        &self.children
    }

    fn children_mut(&mut self) -> &mut Vec<Box<dyn SceneNode>> {
        &mut self.children
    }

    fn add_child(&mut self, child: Box<dyn SceneNode>) {
        self.children.push(child);
    }

    fn remove_child(&mut self, idx: usize) -> Option<Box<dyn SceneNode>> {
        if idx >= self.children.len() {
            return None;
        }
        Some(self.children.remove(idx))
    }

    fn write_to_buffers(&mut self, queue: &wgpu::Queue, device: &wgpu::Device) {
        for child in &mut self.children {
            child.write_to_buffers(queue, device);
        }
    }

    fn draw(
        &self,
        camera_bind_group: &wgpu::BindGroup,
        lighting_bind_group: &wgpu::BindGroup,
        render_pass: &mut wgpu::RenderPass<'_>,
    ) {
        for child in &self.children {
            child.draw(camera_bind_group, lighting_bind_group, render_pass);
        }
    }
}

/// A light in the scene graph. Contributes to the lighting uniform, draws
/// nothing itself.
pub struct LightNode {
    light: Light,
    children: Vec<Box<dyn SceneNode>>,
    local: Transform,
    world: Transform,
}

impl LightNode {
    pub fn new(light: Light) -> Self {
        Self {
            light,
            children: Vec::new(),
            local: Transform::default(),
            world: Transform::default(),
        }
    }
}

impl SceneNode for LightNode {
    fn local_transform(&self) -> Transform {
        self.local.clone()
    }

    fn set_local_transform(&mut self, transform: Transform) {
        self.local = transform;
    }

    fn world_transform(&self) -> Transform {
        self.world.clone()
    }

    fn update_world_transform(&mut self, parent: &Transform) {
        self.world = parent * &self.local;
        for child in &mut self.children {
            child.update_world_transform(&self.world);
        }
    }

    fn children(&self) -> &[Box<dyn SceneNode>] {
        &self.children
    }

    fn children_mut(&mut self) -> &mut Vec<Box<dyn SceneNode>> {
        &mut self.children
    }

    fn add_child(&mut self, child: Box<dyn SceneNode>) {
        self.children.push(child);
    }

    fn remove_child(&mut self, idx: usize) -> Option<Box<dyn SceneNode>> {
        if idx >= self.children.len() {
            return None;
        }
        Some(self.children.remove(idx))
    }

    fn light(&self) -> Option<&Light> {
        Some(&self.light)
    }

    fn write_to_buffers(&mut self, queue: &wgpu::Queue, device: &wgpu::Device) {
        for child in &mut self.children {
            child.write_to_buffers(queue, device);
        }
    }

    fn draw(
        &self,
        camera_bind_group: &wgpu::BindGroup,
        lighting_bind_group: &wgpu::BindGroup,
        render_pass: &mut wgpu::RenderPass<'_>,
    ) {
        for child in &self.children {
            child.draw(camera_bind_group, lighting_bind_group, render_pass);
        }
    }
}

/// A renderable node: a model plus its transform buffer on the GPU.
pub struct MeshNode {
    model: Model,
    transform_buffer: wgpu::Buffer,
    children: Vec<Box<dyn SceneNode>>,
    local: Transform,
    world: Transform,
}

impl MeshNode {
    pub fn new(device: &wgpu::Device, model: Model) -> Self {
        let local = Transform::default();
        let transform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Transform Buffer"),
            contents: bytemuck::cast_slice(&[local.to_raw()]),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });

        Self {
            model,
            transform_buffer,
            children: Vec::new(),
            world: local.clone(),
            local,
        }
    }
}

impl SceneNode for MeshNode {
    fn local_transform(&self) -> Transform {
        self.local.clone()
    }

    fn set_local_transform(&mut self, transform: Transform) {
        self.local = transform;
    }

    fn world_transform(&self) -> Transform {
        self.world.clone()
    }

    fn update_world_transform(&mut self, parent: &Transform) {
        self.world = parent * &self.local;
        for child in &mut self.children {
            child.update_world_transform(&self.world);
        }
    }

    fn children(&self) -> &[Box<dyn SceneNode>] {
        &self.children
    }

    fn children_mut(&mut self) -> &mut Vec<Box<dyn SceneNode>> {
        &mut self.children
    }

    fn add_child(&mut self, child: Box<dyn SceneNode>) {
        self.children.push(child);
    }

    fn remove_child(&mut self, idx: usize) -> Option<Box<dyn SceneNode>> {
        if idx >= self.children.len() {
            return None;
        }
        Some(self.children.remove(idx))
    }

    fn write_to_buffers(&mut self, queue: &wgpu::Queue, device: &wgpu::Device) {
        queue.write_buffer(
            &self.transform_buffer,
            0,
            bytemuck::cast_slice(&[self.world.to_raw()]),
        );
        for child in &mut self.children {
            child.write_to_buffers(queue, device);
        }
    }

    fn draw(
        &self,
        camera_bind_group: &wgpu::BindGroup,
        lighting_bind_group: &wgpu::BindGroup,
        render_pass: &mut wgpu::RenderPass<'_>,
    ) {
        render_pass.set_vertex_buffer(1, self.transform_buffer.slice(..));
        render_pass.draw_model_instanced(
            &self.model,
            0..1,
            camera_bind_group,
            lighting_bind_group,
        );
        for child in &self.children {
            child.draw(camera_bind_group, lighting_bind_group, render_pass);
        }
    }
}
