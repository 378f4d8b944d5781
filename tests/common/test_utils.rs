use xrview::scene::{SceneNode, transform::Transform};

/// A scene node double without GPU resources.
///
/// Stands in for mesh-backed nodes so graph bookkeeping can be exercised
/// without a device.
pub(crate) struct StubNode {
    children: Vec<Box<dyn SceneNode>>,
    local: Transform,
    world: Transform,
}

impl StubNode {
    pub(crate) fn new() -> Self {
        Self {
            children: Vec::new(),
            local: Transform::default(),
            world: Transform::default(),
        }
    }

    #[allow(dead_code)]
    pub(crate) fn with_transform(transform: Transform) -> Self {
        let mut node = Self::new();
        node.set_local_transform(transform);
        node
    }
}

impl SceneNode for StubNode {
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

    fn write_to_buffers(&mut self, _queue: &wgpu::Queue, _device: &wgpu::Device) {}

    fn draw(
        &self,
        _camera_bind_group: &wgpu::BindGroup,
        _lighting_bind_group: &wgpu::BindGroup,
        _render_pass: &mut wgpu::RenderPass<'_>,
    ) {
    }
}
