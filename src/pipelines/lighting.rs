use cgmath::InnerSpace;
use wgpu::util::DeviceExt;

/// Lighting state for one frame: a hemisphere light plus one directional lamp.
///
/// The scene graph folds its light nodes into this uniform each frame; the
/// defaults (white sun along the normalized (1,1,1) axis, mid-gray sky and
/// ground tints) apply when the scene carries no lights.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightingUniform {
    pub sun_direction: [f32; 3],
    // Due to uniforms requiring 16 byte (4 float) spacing, we need to use a padding field here
    pub _padding: u32,
    pub sun_colour: [f32; 3],
    pub _padding2: u32,
    pub sky_colour: [f32; 3],
    pub _padding3: u32,
    pub ground_colour: [f32; 3],
    pub _padding4: u32,
}

impl LightingUniform {
    /// Store `direction` normalized; degenerate (near-zero) vectors are kept
    /// as-is and will black out the lambert term rather than produce NaNs
    /// in every shaded pixel.
    pub fn set_sun_direction(&mut self, direction: cgmath::Vector3<f32>) {
        if direction.magnitude2() > f32::EPSILON {
            self.sun_direction = direction.normalize().into();
        } else {
            self.sun_direction = direction.into();
        }
    }
}

impl Default for LightingUniform {
    fn default() -> Self {
        let mut uniform = Self {
            sun_direction: [0.0; 3],
            _padding: 0,
            sun_colour: [1.0, 1.0, 1.0],
            _padding2: 0,
            sky_colour: [0.5, 0.5, 0.5],
            _padding3: 0,
            ground_colour: [0.25, 0.25, 0.25],
            _padding4: 0,
        };
        uniform.set_sun_direction(cgmath::Vector3::new(1.0, 1.0, 1.0));
        uniform
    }
}

/// GPU-side lighting resources, written once per frame from the scene.
#[derive(Debug)]
pub struct LightingResources {
    pub uniform: LightingUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

impl LightingResources {
    pub fn new(device: &wgpu::Device, uniform: LightingUniform) -> Self {
        let buffer = mk_buffer(device, uniform);
        let bind_group_layout = mk_bind_group_layout(device);
        let bind_group = mk_bind_group(device, &bind_group_layout, &buffer);
        Self {
            uniform,
            buffer,
            bind_group,
            bind_group_layout,
        }
    }
}

pub fn mk_buffer(device: &wgpu::Device, uniform: LightingUniform) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Lighting Buffer"),
        contents: bytemuck::cast_slice(&[uniform]),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    })
}

pub fn mk_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
        label: None,
    })
}

pub fn mk_bind_group(
    device: &wgpu::Device,
    bind_group_layout: &wgpu::BindGroupLayout,
    lighting_buffer: &wgpu::Buffer,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout: bind_group_layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: lighting_buffer.as_entire_binding(),
        }],
        label: None,
    })
}
