//! Immersive-session entry and tracked input handles.
//!
//! Session negotiation, permissions and device communication are owned by the
//! host layer (the browser's WebXR implementation); this module only provides
//! the entry affordance and the scene anchors the host's tracking drives.
//! On native targets there is no immersive host layer and the affordance
//! stays inert.

use crate::scene::{GroupNode, Scene, SceneNode, transform::Transform};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// Left and right hand controllers.
pub const CONTROLLER_COUNT: usize = 2;

/// Handle to one tracked controller and its anchor node in the scene.
///
/// Anchors are added during setup and never removed, so the stored node
/// index stays valid for the scene's lifetime.
#[derive(Debug)]
pub struct ControllerHandle {
    pub index: usize,
    pub node: usize,
}

/// Immersive-session state: the capability flag, the entry affordance and
/// the tracked input handles.
pub struct XrState {
    pub enabled: bool,
    pub controllers: [ControllerHandle; CONTROLLER_COUNT],
    #[allow(dead_code)]
    session_button: SessionButton,
}

impl XrState {
    /// Enable immersive support, create the session-entry affordance, and
    /// add one anchor node per controller to the scene.
    pub fn new(scene: &mut Scene) -> Self {
        let controllers = core::array::from_fn(|index| {
            let node = scene.child_count();
            scene.add(Box::new(GroupNode::new()));
            ControllerHandle { index, node }
        });
        let session_button = SessionButton::new();

        Self {
            enabled: true,
            controllers,
            session_button,
        }
    }

    /// Latest tracked pose per controller, in controller index order.
    ///
    /// Poses exist only while the host runs an immersive frame loop; outside
    /// of one (and always on native) every handle reports no pose and its
    /// anchor keeps the last transform.
    pub fn poll_poses(&self) -> [Option<Transform>; CONTROLLER_COUNT] {
        [const { None }; CONTROLLER_COUNT]
    }

    /// Write fresh controller poses into their anchor nodes.
    pub fn update_anchors(&self, scene: &mut Scene) {
        for (handle, pose) in self.controllers.iter().zip(self.poll_poses()) {
            let Some(pose) = pose else { continue };
            if let Some(anchor) = scene.node_mut(handle.node) {
                anchor.set_local_transform(pose);
            }
        }
    }
}

/// The on-screen control entering/exiting the immersive session.
#[cfg(not(target_arch = "wasm32"))]
struct SessionButton;

#[cfg(not(target_arch = "wasm32"))]
impl SessionButton {
    fn new() -> Self {
        log::info!("immersive sessions are not available on this platform");
        Self
    }
}

/// The on-screen control entering/exiting the immersive session.
///
/// A DOM overlay button; clicking it hands session negotiation to the
/// browser's WebXR layer.
#[cfg(target_arch = "wasm32")]
struct SessionButton {
    // Keeps the DOM element handle alive alongside the viewer.
    #[allow(dead_code)]
    element: web_sys::Element,
}

#[cfg(target_arch = "wasm32")]
impl SessionButton {
    fn new() -> Self {
        use wasm_bindgen::JsCast;

        let window = web_sys::window().unwrap_throw();
        let document = window.document().unwrap_throw();
        let element = document.create_element("button").unwrap_throw();
        element.set_text_content(Some("ENTER VR"));

        let button: &web_sys::HtmlElement = element.unchecked_ref();
        let style = button.style();
        style.set_property("position", "absolute").unwrap_throw();
        style.set_property("bottom", "20px").unwrap_throw();
        style.set_property("left", "50%").unwrap_throw();
        style
            .set_property("transform", "translateX(-50%)")
            .unwrap_throw();

        let on_click = Closure::<dyn FnMut()>::new(request_session);
        button.set_onclick(Some(on_click.as_ref().unchecked_ref()));
        // The closure has to outlive the page; the DOM keeps calling it.
        on_click.forget();

        document
            .body()
            .unwrap_throw()
            .append_child(&element)
            .unwrap_throw();

        Self { element }
    }
}

#[cfg(all(target_arch = "wasm32", feature = "webxr"))]
fn request_session() {
    use wasm_bindgen::JsCast;

    let navigator = web_sys::window().unwrap_throw().navigator();
    let promise = navigator
        .xr()
        .request_session(web_sys::XrSessionMode::ImmersiveVr);
    wasm_bindgen_futures::spawn_local(async move {
        match wasm_bindgen_futures::JsFuture::from(promise).await {
            Ok(session) => {
                let _session: web_sys::XrSession = session.unchecked_into();
                log::info!("immersive session granted; the host compositor drives frames now");
            }
            Err(error) => log::warn!("immersive session request was denied: {error:?}"),
        }
    });
}

#[cfg(all(target_arch = "wasm32", not(feature = "webxr")))]
fn request_session() {
    log::warn!("built without the webxr feature; immersive session entry is disabled");
}
