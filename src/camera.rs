//! Camera types, orbit controller and uniforms for view/projection.
//!
//! The camera orbits a fixed look-at target: left-drag orbits, right-drag
//! pans, and the scroll wheel zooms. The controller accumulates pointer
//! deltas between frames and applies them in [`OrbitController::update`].

use instant::Duration;

use cgmath::{InnerSpace, Matrix4, Point3, Rad, Vector2, Vector3};
use winit::event::{MouseScrollDelta, WindowEvent};

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

/// Keep the orbit from flipping over the poles.
const MAX_PITCH: f32 = std::f32::consts::FRAC_PI_2 - 0.02;

#[derive(Clone, Debug)]
pub struct Camera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
}

impl Camera {
    pub fn new<P: Into<Point3<f32>>>(position: P, target: P) -> Self {
        Self {
            position: position.into(),
            target: target.into(),
            up: Vector3::unit_y(),
        }
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(self.position, self.target, self.up)
    }
}

#[derive(Clone, Debug)]
pub struct Projection {
    pub aspect: f32,
    pub fovy: Rad<f32>,
    pub znear: f32,
    pub zfar: f32,
}

impl Projection {
    pub fn new<F: Into<Rad<f32>>>(width: u32, height: u32, fovy: F, znear: f32, zfar: f32) -> Self {
        Self {
            aspect: width as f32 / height as f32,
            fovy: fovy.into(),
            znear,
            zfar,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height as f32;
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * cgmath::perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }
}

/// The camera data as it is stored on the GPU.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    view_position: [f32; 4],
    view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn new() -> Self {
        use cgmath::SquareMatrix;
        Self {
            view_position: [0.0; 4],
            view_proj: Matrix4::identity().into(),
        }
    }

    pub fn update_view_proj(&mut self, camera: &Camera, projection: &Projection) {
        self.view_position = camera.position.to_homogeneous().into();
        self.view_proj = (projection.calc_matrix() * camera.calc_matrix()).into();
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

/// Pointer-driven orbit navigation around the camera's look-at target.
#[derive(Debug)]
pub struct OrbitController {
    rotate_speed: f32,
    pan_speed: f32,
    zoom_rate: f32,
    min_radius: f32,
    max_radius: f32,
    rotate_delta: Vector2<f32>,
    pan_delta: Vector2<f32>,
    scroll: f32,
}

impl OrbitController {
    pub fn new(rotate_speed: f32, zoom_rate: f32) -> Self {
        Self {
            rotate_speed,
            pan_speed: 0.001,
            zoom_rate,
            min_radius: 0.25,
            max_radius: 50.0,
            rotate_delta: Vector2::new(0.0, 0.0),
            pan_delta: Vector2::new(0.0, 0.0),
            scroll: 0.0,
        }
    }

    /// Accumulate an orbit drag (raw pointer delta in pixels).
    pub fn handle_mouse(&mut self, dx: f64, dy: f64) {
        self.rotate_delta.x += dx as f32;
        self.rotate_delta.y += dy as f32;
    }

    /// Accumulate a pan drag (raw pointer delta in pixels).
    pub fn handle_pan(&mut self, dx: f64, dy: f64) {
        self.pan_delta.x += dx as f32;
        self.pan_delta.y += dy as f32;
    }

    /// Accumulate a zoom step, in scroll lines (positive zooms in).
    pub fn handle_scroll(&mut self, lines: f32) {
        self.scroll += lines;
    }

    pub fn handle_window_events(&mut self, event: &WindowEvent) {
        if let WindowEvent::MouseWheel { delta, .. } = event {
            self.handle_scroll(match delta {
                MouseScrollDelta::LineDelta(_, y) => *y,
                MouseScrollDelta::PixelDelta(position) => position.y as f32 / 50.0,
            });
        }
    }

    /// Apply the accumulated deltas to `camera`.
    ///
    /// Scroll input is consumed in dt-sized slices so zooming eases in over a
    /// few frames instead of jumping.
    pub fn update(&mut self, camera: &mut Camera, dt: Duration) {
        let dt = dt.as_secs_f32();
        let zoom = self.scroll * (dt * self.zoom_rate).min(1.0);
        self.scroll -= zoom;

        let offset = camera.position - camera.target;
        let mut radius = offset.magnitude();
        if radius < f32::EPSILON {
            return;
        }

        let mut yaw = offset.x.atan2(offset.z);
        let mut pitch = (offset.y / radius).asin();

        yaw -= self.rotate_delta.x * self.rotate_speed;
        pitch = (pitch + self.rotate_delta.y * self.rotate_speed).clamp(-MAX_PITCH, MAX_PITCH);
        radius = (radius * (1.0 - zoom * 0.1)).clamp(self.min_radius, self.max_radius);

        let forward = (camera.target - camera.position).normalize();
        let right = forward.cross(Vector3::unit_y()).normalize();
        let up = right.cross(forward);
        let pan = (right * -self.pan_delta.x + up * self.pan_delta.y) * self.pan_speed * radius;
        camera.target += pan;

        let orbit = Vector3::new(
            yaw.sin() * pitch.cos(),
            pitch.sin(),
            yaw.cos() * pitch.cos(),
        ) * radius;
        camera.position = camera.target + orbit;

        self.rotate_delta = Vector2::new(0.0, 0.0);
        self.pan_delta = Vector2::new(0.0, 0.0);
    }
}

/// Camera state bundled with its GPU resources.
#[derive(Debug)]
pub struct CameraResources {
    pub camera: Camera,
    pub controller: OrbitController,
    pub uniform: CameraUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}
