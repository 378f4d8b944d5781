//! The viewer application and its event loop.
//!
//! A single [`Viewer`] owns the GPU context, the scene and the immersive
//! state. The surrounding [`App`] is the winit `ApplicationHandler`: it
//! creates the window, initializes the viewer asynchronously (blocking on the
//! tokio runtime natively, `spawn_local` plus the event-loop proxy on wasm),
//! then reacts to resize/redraw/input events until the process ends.
//!
//! # Lifecycle
//!
//! 1. `resumed` creates the window and the viewer
//! 2. the model fetch is spawned; its result arrives as a [`ViewerEvent`]
//! 3. every `Resized` event reconfigures surface, depth buffer and projection
//! 4. every `RedrawRequested` updates uniforms and draws the scene, then
//!    requests the next redraw

use std::{
    fmt::Debug,
    iter,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use instant::{Duration, Instant};

use cgmath::{InnerSpace, Rotation3};
use winit::{
    application::ApplicationHandler,
    event::{DeviceEvent, DeviceId, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop, EventLoopProxy},
    window::Window,
};

use crate::{
    context::Context,
    resources,
    scene::{
        self, Light, LightNode, MeshNode, Scene, SceneNode,
        model::{self, Material, Model},
        texture::Texture,
        transform::Transform,
    },
    xr::XrState,
};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// Flat background behind the scene.
pub const BACKGROUND: u32 = 0x505050;
/// Sky and ground tints of the hemisphere light.
pub const HEMISPHERE_SKY: u32 = 0x606060;
pub const HEMISPHERE_GROUND: u32 = 0x404040;
/// Ground plane edge length (world units) and tint.
pub const GROUND_SIZE: f32 = 10.0;
pub const GROUND_COLOUR: u32 = 0x808080;

pub fn hemisphere_light() -> Light {
    Light::Hemisphere {
        sky: scene::colour(HEMISPHERE_SKY),
        ground: scene::colour(HEMISPHERE_GROUND),
    }
}

pub fn sun_light() -> Light {
    Light::Directional {
        colour: [1.0, 1.0, 1.0],
        direction: cgmath::Vector3::new(1.0, 1.0, 1.0).normalize(),
    }
}

/// The ground lies flat: -90° about X turns the upright plane horizontal.
pub fn ground_transform() -> Transform {
    Transform {
        rotation: cgmath::Quaternion::from_axis_angle(
            cgmath::Vector3::unit_x(),
            cgmath::Rad(-std::f32::consts::FRAC_PI_2),
        ),
        ..Transform::default()
    }
}

/// Populate the scene: hemisphere light, directional lamp and the ground
/// plane. The model joins later, once the gateway fetch completes.
pub fn init_scene(scene: &mut Scene, device: &wgpu::Device, queue: &wgpu::Queue) {
    scene.clear();

    scene.add(Box::new(LightNode::new(hemisphere_light())));
    scene.add(Box::new(LightNode::new(sun_light())));

    let (vertices, indices) = model::plane_geometry(GROUND_SIZE, GROUND_SIZE);
    let layout = crate::pipelines::mesh::material_layout(device);
    let tint = GROUND_COLOUR.to_be_bytes();
    let texture = Texture::from_color(device, queue, [tint[1], tint[2], tint[3], 0xff]);
    let material = Material::new(device, "ground", texture, &layout);
    let ground_model = Model::from_geometry(device, "ground", &vertices, &indices, material);
    let mut ground = MeshNode::new(device, ground_model);
    ground.set_local_transform(ground_transform());
    scene.add(Box::new(ground));
}

/// Token cancelling the in-flight model load when the viewer goes away.
///
/// The load completion may fire after teardown; applying its result is gated
/// on this token so a gone scene is never touched.
#[derive(Clone, Debug, Default)]
pub struct LoadToken(Arc<AtomicBool>);

impl LoadToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Apply a finished model load to the scene.
///
/// Success appends the subtree at the origin with unit scale. Failure is
/// logged once and otherwise swallowed; the scene stays valid without the
/// model. A cancelled token discards the result entirely. Returns whether a
/// node was attached.
pub fn apply_load_outcome(
    scene: &mut Scene,
    token: &LoadToken,
    result: anyhow::Result<Box<dyn SceneNode>>,
) -> bool {
    if token.is_cancelled() {
        log::warn!("model load finished after shutdown; discarding the result");
        return false;
    }
    match result {
        Ok(mut node) => {
            node.set_local_transform(Transform::default());
            scene.add(node);
            true
        }
        Err(error) => {
            log::error!("failed to load the model from the gateway: {error:#}");
            false
        }
    }
}

/// Events resolved asynchronously back onto the event loop.
pub enum ViewerEvent {
    #[allow(dead_code)]
    Initialized(Box<Viewer>),
    ModelLoaded(anyhow::Result<Box<dyn SceneNode>>),
}

impl Debug for ViewerEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Initialized(_) => f.write_str("Initialized(Viewer)"),
            Self::ModelLoaded(result) => f
                .debug_tuple("ModelLoaded")
                .field(&result.as_ref().map(|_| "SceneNode"))
                .finish(),
        }
    }
}

/// The viewer: GPU context, scene, immersive state and the pending load.
pub struct Viewer {
    pub(crate) ctx: Context,
    pub scene: Scene,
    pub xr: XrState,
    load_token: LoadToken,
    is_surface_configured: bool,
}

impl Viewer {
    pub async fn new(window: Arc<Window>) -> anyhow::Result<Self> {
        let ctx = Context::new(window).await?;
        let mut scene = Scene::new(scene::clear_colour(BACKGROUND));
        init_scene(&mut scene, &ctx.device, &ctx.queue);
        let xr = XrState::new(&mut scene);

        Ok(Self {
            ctx,
            scene,
            xr,
            load_token: LoadToken::new(),
            is_surface_configured: false,
        })
    }

    /// The asynchronous model fetch; its outcome arrives back on the event
    /// loop as [`ViewerEvent::ModelLoaded`].
    pub fn model_load_future(
        &self,
        proxy: EventLoopProxy<ViewerEvent>,
    ) -> impl Future<Output = ()> + use<> {
        // Device and queue are internally reference counted, cloning is cheap.
        let device = self.ctx.device.clone();
        let queue = self.ctx.queue.clone();
        async move {
            let result =
                resources::load_model_from_gateway(resources::fetch::MODEL_CID, &device, &queue)
                    .await;
            if proxy.send_event(ViewerEvent::ModelLoaded(result)).is_err() {
                log::warn!("event loop closed before the model load completed");
            }
        }
    }

    /// Cancel the pending model load; a late completion will be discarded.
    pub fn cancel_pending_load(&self) {
        self.load_token.cancel();
    }

    pub fn attach_model(&mut self, result: anyhow::Result<Box<dyn SceneNode>>) {
        apply_load_outcome(&mut self.scene, &self.load_token, result);
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.ctx.config.width = width;
            self.ctx.config.height = height;
            self.is_surface_configured = true;
            self.ctx.projection.resize(width, height);
            self.ctx
                .surface
                .configure(&self.ctx.device, &self.ctx.config);
            self.ctx.depth_texture = Texture::create_depth_texture(
                &self.ctx.device,
                [self.ctx.config.width, self.ctx.config.height],
                "depth_texture",
            );
        }
    }

    pub fn render(&mut self, dt: Duration) -> Result<(), wgpu::SurfaceError> {
        // invoke the next tick of the render loop
        self.ctx.window.request_redraw();

        // Rendering requires the surface to be configured
        if !self.is_surface_configured {
            return Ok(());
        }

        // Per-frame updates: camera, lighting, tracked anchors, transforms.
        self.ctx
            .camera
            .controller
            .update(&mut self.ctx.camera.camera, dt);
        self.ctx
            .camera
            .uniform
            .update_view_proj(&self.ctx.camera.camera, &self.ctx.projection);
        self.ctx.queue.write_buffer(
            &self.ctx.camera.buffer,
            0,
            bytemuck::cast_slice(&[self.ctx.camera.uniform]),
        );
        self.ctx.lighting.uniform = self.scene.lighting();
        self.ctx.queue.write_buffer(
            &self.ctx.lighting.buffer,
            0,
            bytemuck::cast_slice(&[self.ctx.lighting.uniform]),
        );
        self.xr.update_anchors(&mut self.scene);
        self.scene.update_world_transforms();
        self.scene.write_to_buffers(&self.ctx.queue, &self.ctx.device);

        let output = self.ctx.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder: wgpu::CommandEncoder =
            self.ctx
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("Render Encoder"),
                });
        {
            let mut render_pass: wgpu::RenderPass<'_> =
                encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("Render Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Clear(self.scene.background),
                            store: wgpu::StoreOp::Store,
                        },
                        depth_slice: None,
                    })],
                    depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                        view: &self.ctx.depth_texture.view,
                        depth_ops: Some(wgpu::Operations {
                            load: wgpu::LoadOp::Clear(1.0),
                            store: wgpu::StoreOp::Store,
                        }),
                        stencil_ops: None,
                    }),
                    occlusion_query_set: None,
                    timestamp_writes: None,
                });

            render_pass.set_pipeline(&self.ctx.pipelines.mesh);
            self.scene.draw(
                &self.ctx.camera.bind_group,
                &self.ctx.lighting.bind_group,
                &mut render_pass,
            );
        }

        self.ctx.queue.submit(iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum MousePressed {
    Left,
    Right,
    None,
}

pub struct App {
    #[cfg(not(target_arch = "wasm32"))]
    async_runtime: tokio::runtime::Runtime,
    proxy: EventLoopProxy<ViewerEvent>,
    viewer: Option<Viewer>,
    pressed: MousePressed,
    last_time: Instant,
}

impl App {
    fn new(event_loop: &EventLoop<ViewerEvent>) -> Self {
        let proxy = event_loop.create_proxy();
        #[cfg(not(target_arch = "wasm32"))]
        let async_runtime = tokio::runtime::Runtime::new().unwrap();
        Self {
            #[cfg(not(target_arch = "wasm32"))]
            async_runtime,
            proxy,
            viewer: None,
            pressed: MousePressed::None,
            last_time: Instant::now(),
        }
    }

    fn start_model_load(&self) {
        let Some(viewer) = &self.viewer else {
            return;
        };
        let fut = viewer.model_load_future(self.proxy.clone());

        #[cfg(not(target_arch = "wasm32"))]
        self.async_runtime.spawn(fut);

        #[cfg(target_arch = "wasm32")]
        wasm_bindgen_futures::spawn_local(fut);
    }
}

impl ApplicationHandler<ViewerEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        #[allow(unused_mut)]
        let mut window_attributes = Window::default_attributes();

        #[cfg(target_arch = "wasm32")]
        {
            use wasm_bindgen::JsCast;
            use winit::platform::web::WindowAttributesExtWebSys;

            const CANVAS_ID: &str = "canvas";

            let window = wgpu::web_sys::window().unwrap_throw();
            let document = window.document().unwrap_throw();
            let canvas = document.get_element_by_id(CANVAS_ID).unwrap_throw();
            let html_canvas_element = canvas.unchecked_into();
            window_attributes = window_attributes.with_canvas(Some(html_canvas_element));
        }

        let window = Arc::new(event_loop.create_window(window_attributes).unwrap());
        let init_future = Viewer::new(window);

        #[cfg(not(target_arch = "wasm32"))]
        {
            let mut viewer = match self.async_runtime.block_on(init_future) {
                Ok(viewer) => viewer,
                Err(e) => panic!(
                    "App initialization failed. Cannot create the viewer: {}",
                    e
                ),
            };
            let size = viewer.ctx.window.inner_size();
            viewer.resize(size.width, size.height);
            self.viewer = Some(viewer);
            self.start_model_load();
        }

        #[cfg(target_arch = "wasm32")]
        {
            let proxy = self.proxy.clone();
            wasm_bindgen_futures::spawn_local(async move {
                match init_future.await {
                    Ok(viewer) => assert!(
                        proxy
                            .send_event(ViewerEvent::Initialized(Box::new(viewer)))
                            .is_ok()
                    ),
                    Err(e) => {
                        panic!("App initialization failed. Cannot create the viewer: {}", e)
                    }
                }
            });
        }
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, event: ViewerEvent) {
        match event {
            ViewerEvent::Initialized(viewer) => {
                // This is the message from our wasm `spawn_local`
                self.viewer = Some(*viewer);

                // Important: Trigger a resize and redraw now that we are initialized
                if let Some(viewer) = &mut self.viewer {
                    let size = viewer.ctx.window.inner_size();
                    viewer.resize(size.width, size.height);
                    viewer.ctx.window.request_redraw();
                }
                self.start_model_load();
            }
            ViewerEvent::ModelLoaded(result) => match &mut self.viewer {
                Some(viewer) => viewer.attach_model(result),
                None => log::warn!("model load finished but there is no viewer to attach it to"),
            },
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        let viewer = match &mut self.viewer {
            Some(viewer) => viewer,
            None => return,
        };
        if let DeviceEvent::MouseMotion { delta: (dx, dy) } = event {
            let controller = &mut viewer.ctx.camera.controller;
            match self.pressed {
                MousePressed::Left => controller.handle_mouse(dx, dy),
                MousePressed::Right => controller.handle_pan(dx, dy),
                MousePressed::None => (),
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let viewer = match &mut self.viewer {
            Some(viewer) => viewer,
            None => return,
        };

        viewer.ctx.camera.controller.handle_window_events(&event);

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => viewer.resize(size.width, size.height),
            WindowEvent::RedrawRequested => {
                let dt = self.last_time.elapsed();
                self.last_time = Instant::now();

                match viewer.render(dt) {
                    Ok(_) => {}
                    // Reconfigure the surface if it's lost or outdated
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        let size = viewer.ctx.window.inner_size();
                        viewer.resize(size.width, size.height);
                    }
                    Err(e) => {
                        log::error!("Unable to render {}", e);
                    }
                }
            }
            WindowEvent::MouseInput {
                state: button_state,
                button,
                ..
            } => match (button, button_state.is_pressed()) {
                (MouseButton::Left, true) => self.pressed = MousePressed::Left,
                (MouseButton::Right, true) => self.pressed = MousePressed::Right,
                (_, false) => self.pressed = MousePressed::None,
                _ => (),
            },
            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(viewer) = &self.viewer {
            viewer.cancel_pending_load();
        }
    }
}

pub fn run() -> anyhow::Result<()> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Err(e) = env_logger::try_init() {
            println!("Warning: Could not initialize logger: {}", e);
        };
    }

    #[cfg(target_arch = "wasm32")]
    {
        console_log::init_with_level(log::Level::Info).unwrap_throw();
    }

    let event_loop: EventLoop<ViewerEvent> = EventLoop::with_user_event().build()?;
    let mut app = App::new(&event_loop);

    event_loop.run_app(&mut app)?;

    Ok(())
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() {
    run().unwrap_throw();
}
