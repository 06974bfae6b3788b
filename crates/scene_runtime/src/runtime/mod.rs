//! Runtime and shared frame loop
//!
//! One [`Runtime`] exists per render surface. It owns the backend, the entity
//! registry, the synthesized clock and every scene it created. All active
//! scenes share a single frame loop:
//!
//! - starting the first scene requests a host frame;
//! - every frame advances the clock, then ticks and draws each active scene
//!   in activation order;
//! - the loop asks for another frame only while some scene is active, and
//!   stops at the first frame that finds none.
//!
//! Failures inside one scene (a dynamic argument erroring or panicking, or the
//! backend refusing a draw) are recorded as [`FrameFault`]s. The scene is not
//! drawn for that frame and every other scene carries on.

mod error;
mod scheduler;

pub use error::{FrameFault, RuntimeError, RuntimeResult};
pub use scheduler::{FrameScheduler, FrameSignal};

use std::any::Any;
use std::cell::{Ref, RefCell};
use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;
use std::time::Duration;

use slotmap::SlotMap;

use crate::config::RuntimeConfig;
use crate::engine::{EngineObject, ObjectBody, PerspectiveCamera, RenderBackend, RenderSurface};
use crate::foundation::math::{Color, Vec3};
use crate::foundation::time::FrameClock;
use crate::node::Node;
use crate::registry::EntityRegistry;
use crate::scene::{Scene, SceneId, SceneState};

/// Shared state behind a [`Runtime`] and its [`Scene`] handles
///
/// Never borrowed while user closures run.
pub(crate) struct RuntimeCore {
    backend: Box<dyn RenderBackend>,
    scheduler: Box<dyn FrameScheduler>,
    config: RuntimeConfig,
    surface: RenderSurface,
    clock: FrameClock,
    scenes: SlotMap<SceneId, Rc<RefCell<SceneState>>>,
    active: Vec<SceneId>,
    looping: bool,
    faults: VecDeque<FrameFault>,
    disposed: bool,
}

impl RuntimeCore {
    pub(crate) fn is_disposed(&self) -> bool {
        self.disposed
    }

    fn camera_object(&self, fov: Option<f64>) -> EngineObject {
        EngineObject::new(ObjectBody::Camera(PerspectiveCamera {
            fov: fov.unwrap_or(self.config.default_fov),
            aspect: self.surface.aspect(),
            near: self.config.near,
            far: self.config.far,
        }))
    }

    pub(crate) fn default_camera(&self) -> Node {
        let mut camera = self.camera_object(None);
        camera.pose.position = Vec3::new(0.0, 0.0, self.config.default_camera_distance);
        Node::new(camera)
    }

    /// Add a scene to the active set, starting the loop if it is idle
    pub(crate) fn activate(&mut self, id: SceneId) {
        if self.disposed {
            return;
        }
        if !self.active.contains(&id) {
            self.active.push(id);
            log::debug!("Scene {:?} activated ({} active)", id, self.active.len());
        }
        if !self.looping {
            self.looping = true;
            self.clock.reanchor();
            self.scheduler.request_frame();
            log::info!("Frame loop started");
        }
    }

    pub(crate) fn deactivate(&mut self, id: SceneId) {
        let before = self.active.len();
        self.active.retain(|&active| active != id);
        if self.active.len() != before {
            log::debug!("Scene {:?} deactivated ({} active)", id, self.active.len());
        }
    }

    pub(crate) fn release_scene(&mut self, id: SceneId) {
        self.deactivate(id);
        if self.scenes.remove(id).is_some() && !self.disposed {
            self.backend.release_scene(id);
        }
    }

    fn record_fault(&mut self, scene: SceneId, time: f64, message: String) {
        log::error!("Scene {:?} failed at t={:.3}s: {}", scene, time, message);
        if self.config.max_retained_faults == 0 {
            return;
        }
        while self.faults.len() >= self.config.max_retained_faults {
            self.faults.pop_front();
        }
        self.faults.push_back(FrameFault { scene, time, message });
    }

    fn draw(&mut self, id: SceneId, state: &RefCell<SceneState>, time: f64) {
        let result = {
            let state = state.borrow();
            if state.disposed {
                return;
            }
            let Some(camera) = &state.camera else {
                return;
            };
            let camera = camera.object();
            let objects: Vec<Ref<'_, EngineObject>> = state.nodes.iter().map(Node::object).collect();
            let objects: Vec<&EngineObject> = objects.iter().map(|object| &**object).collect();
            self.backend.render(id, &camera, &objects)
        };
        if let Err(err) = result {
            self.record_fault(id, time, err.to_string());
        }
    }
}

/// Scene-graph runtime bound to one render surface
pub struct Runtime {
    core: Rc<RefCell<RuntimeCore>>,
    registry: EntityRegistry,
}

impl Runtime {
    /// Create a runtime drawing into `surface` through `backend`
    ///
    /// Discovers the entity kinds the backend exports and asks the backend to
    /// prepare the surface. Frames are requested from `scheduler`; the host
    /// answers each request by calling [`Runtime::on_frame`].
    pub fn new(
        surface: RenderSurface,
        mut backend: impl RenderBackend + 'static,
        scheduler: impl FrameScheduler + 'static,
        config: RuntimeConfig,
    ) -> RuntimeResult<Self> {
        config.validate()?;
        backend.initialize(&surface, &config)?;
        let registry = EntityRegistry::discover(backend.entity_kinds());

        log::info!(
            "Runtime created for {}x{} surface with {} entity kinds",
            surface.width,
            surface.height,
            registry.len()
        );

        Ok(Self {
            core: Rc::new(RefCell::new(RuntimeCore {
                backend: Box::new(backend),
                scheduler: Box::new(scheduler),
                config,
                surface,
                clock: FrameClock::new(),
                scenes: SlotMap::with_key(),
                active: Vec::new(),
                looping: false,
                faults: VecDeque::new(),
                disposed: false,
            })),
            registry,
        })
    }

    /// Build a root node of a registered entity kind
    ///
    /// Missing trailing arguments take the kind's declared defaults; extra
    /// arguments are ignored.
    pub fn entity(&self, name: &str, args: &[f64]) -> RuntimeResult<Node> {
        let descriptor = self
            .registry
            .get(name)
            .ok_or_else(|| RuntimeError::UnknownEntity(name.to_string()))?;
        let material_color = Color::from(self.core.borrow().config.default_material_color);
        let object = descriptor
            .build(args, material_color)
            .map_err(|source| RuntimeError::Construction {
                name: name.to_string(),
                source,
            })?;
        Ok(Node::new(object))
    }

    /// Perspective camera node with the current surface aspect ratio
    ///
    /// `fov` is in degrees and defaults to the configured field of view.
    pub fn camera(&self, fov: Option<f64>) -> Node {
        Node::new(self.core.borrow().camera_object(fov))
    }

    /// Create an empty scene tracked by this runtime
    ///
    /// After [`Runtime::dispose`] the scene is returned already disposed and
    /// is never tracked.
    pub fn scene(&self) -> Scene {
        let state = Rc::new(RefCell::new(SceneState::default()));
        let mut core = self.core.borrow_mut();
        if core.disposed {
            log::warn!("Scene requested from disposed runtime; returning a disposed scene");
            state.borrow_mut().disposed = true;
            return Scene::new(SceneId::default(), state, Rc::downgrade(&self.core));
        }
        let id = core.scenes.insert(Rc::clone(&state));
        drop(core);
        log::debug!("Scene {:?} created", id);
        Scene::new(id, state, Rc::downgrade(&self.core))
    }

    /// Resize the surface and the backend viewport
    ///
    /// Nothing is redrawn until the next frame. Cameras already built keep the
    /// aspect ratio they were created with.
    pub fn set_resolution(&self, width: u32, height: u32) {
        let mut core = self.core.borrow_mut();
        if core.disposed {
            log::warn!("Ignoring resize of disposed runtime");
            return;
        }
        core.surface = RenderSurface::new(width, height);
        core.backend.set_viewport(width, height);
        log::debug!("Surface resized to {}x{}", width, height);
    }

    /// Host frame callback
    ///
    /// `timestamp` is the host's monotonic frame time; only differences
    /// between consecutive frames matter.
    pub fn on_frame(&self, timestamp: Duration) {
        let (time, active) = {
            let mut core = self.core.borrow_mut();
            if !core.looping || core.disposed {
                return;
            }
            if core.active.is_empty() {
                core.looping = false;
                log::info!("Frame loop stopped");
                return;
            }
            let time = core.clock.advance(timestamp);
            let active: Vec<_> = core
                .active
                .iter()
                .filter_map(|&id| core.scenes.get(id).map(|state| (id, Rc::clone(state))))
                .collect();
            (time, active)
        };
        log::trace!("Frame at t={:.3}s for {} scene(s)", time, active.len());

        for (id, state) in active {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| SceneState::evaluate(&state, time)));
            let mut core = self.core.borrow_mut();
            if core.disposed {
                return;
            }
            match outcome {
                Ok(Ok(())) => core.draw(id, &state, time),
                Ok(Err(err)) => core.record_fault(id, time, err.to_string()),
                Err(payload) => core.record_fault(id, time, panic_message(payload.as_ref())),
            }
        }

        let mut core = self.core.borrow_mut();
        if core.disposed {
            return;
        }
        if core.active.is_empty() {
            core.looping = false;
            log::info!("Frame loop stopped");
        } else {
            core.scheduler.request_frame();
        }
    }

    /// Dispose every scene, then release the backend
    ///
    /// Calling it again does nothing. Also run when the runtime is dropped.
    pub fn dispose(&self) {
        let mut core = self.core.borrow_mut();
        if core.disposed {
            return;
        }
        let core = &mut *core;
        core.active.clear();
        core.looping = false;
        for (id, state) in core.scenes.drain() {
            {
                let mut state = state.borrow_mut();
                state.rendering = false;
                state.disposed = true;
            }
            core.backend.release_scene(id);
        }
        core.backend.dispose();
        core.disposed = true;
        log::info!("Runtime disposed");
    }

    /// Names of every registered entity factory
    pub fn entity_names(&self) -> Vec<String> {
        self.registry.names().map(str::to_string).collect()
    }

    /// The entity registry
    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    /// Current surface
    pub fn surface(&self) -> RenderSurface {
        self.core.borrow().surface
    }

    /// Configuration the runtime was created with
    pub fn config(&self) -> RuntimeConfig {
        self.core.borrow().config.clone()
    }

    /// Whether the frame loop is running
    pub fn is_looping(&self) -> bool {
        self.core.borrow().looping
    }

    /// Active scenes in draw order
    pub fn active_scenes(&self) -> Vec<SceneId> {
        self.core.borrow().active.clone()
    }

    /// Synthesized time in seconds
    pub fn time(&self) -> f64 {
        self.core.borrow().clock.seconds()
    }

    /// Frames processed so far
    pub fn frame_count(&self) -> u64 {
        self.core.borrow().clock.frame_count()
    }

    /// Drain recorded frame faults, oldest first
    pub fn take_faults(&self) -> Vec<FrameFault> {
        self.core.borrow_mut().faults.drain(..).collect()
    }

    /// Whether [`Runtime::dispose`] has run
    pub fn is_disposed(&self) -> bool {
        self.core.borrow().disposed
    }
}

impl Drop for Runtime {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let core = self.core.borrow();
        f.debug_struct("Runtime")
            .field("surface", &core.surface)
            .field("scenes", &core.scenes.len())
            .field("active", &core.active)
            .field("looping", &core.looping)
            .field("disposed", &core.disposed)
            .finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("panicked: {message}")
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("panicked: {message}")
    } else {
        "panicked".to_string()
    }
}
