//! Render pipeline definitions and lighting GPU resources.
//!
//! - `mesh` builds the one pipeline the viewer draws with
//! - `lighting` holds the lighting uniform and its bind group

pub mod lighting;
pub mod mesh;

/// The pipelines owned by the context, built once at startup.
#[derive(Debug)]
pub struct Pipelines {
    pub mesh: wgpu::RenderPipeline,
}

impl Pipelines {
    pub fn new(
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
        camera_bind_group_layout: &wgpu::BindGroupLayout,
        lighting_bind_group_layout: &wgpu::BindGroupLayout,
    ) -> Self {
        Self {
            mesh: mesh::mk_mesh_pipeline(
                device,
                config,
                camera_bind_group_layout,
                lighting_bind_group_layout,
            ),
        }
    }
}
