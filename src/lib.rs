//! xrview
//!
//! A minimal, cross-platform VR model viewer for native and WASM targets.
//! The crate constructs a display surface, a perspective camera and a small
//! scene graph, streams a single glTF model from a content-addressed gateway,
//! and renders the result in a continuous loop with orbit controls and an
//! immersive-session entry point.
//!
//! High-level modules
//! - `app`: the viewer application and winit event loop
//! - `camera`: camera, projection and the orbit controller
//! - `context`: central GPU and window context that owns device/queue/pipelines
//! - `scene`: scene graph, transforms, meshes, materials and textures
//! - `pipelines`: render pipeline and lighting GPU resources
//! - `resources`: gateway fetch and glTF decoding into scene nodes
//! - `xr`: immersive-session affordance and tracked input handles
//!

pub mod app;
pub mod camera;
pub mod context;
pub mod pipelines;
pub mod resources;
pub mod scene;
pub mod xr;

// Re-exports commonly used types for convenience in downstream code.
pub use cgmath::*;
pub use wgpu::*;
pub use winit::dpi::PhysicalPosition;
pub use winit::event::DeviceEvent;
pub use winit::event::WindowEvent;
