//! Headless backend
//!
//! Records every draw submission instead of rasterizing. Used by the test
//! suite and by the demo binary to observe what the runtime would have drawn.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use super::backend::{BackendResult, RenderBackend, RenderSurface};
use super::object::EngineObject;
use super::EngineError;
use crate::config::RuntimeConfig;
use crate::scene::SceneId;

/// One recorded `render` call
#[derive(Debug, Clone)]
pub struct DrawRecord {
    /// Scene that was drawn
    pub scene: SceneId,
    /// Camera state at draw time
    pub camera: EngineObject,
    /// Object states at draw time, in submission order
    pub objects: Vec<EngineObject>,
}

#[derive(Debug, Default)]
struct LogState {
    draws: Vec<DrawRecord>,
    viewport: Option<(u32, u32)>,
    released: Vec<SceneId>,
    failing: HashSet<SceneId>,
    disposed: bool,
}

/// Shared view of what a [`HeadlessBackend`] has recorded
///
/// Cloning yields another handle onto the same log.
#[derive(Debug, Clone, Default)]
pub struct DrawLog {
    state: Rc<RefCell<LogState>>,
}

impl DrawLog {
    /// Every draw so far
    pub fn draws(&self) -> Vec<DrawRecord> {
        self.state.borrow().draws.clone()
    }

    /// Number of draws so far
    pub fn draw_count(&self) -> usize {
        self.state.borrow().draws.len()
    }

    /// Number of draws of one scene
    pub fn draws_of(&self, scene: SceneId) -> usize {
        self.state.borrow().draws.iter().filter(|d| d.scene == scene).count()
    }

    /// Most recent draw of one scene
    pub fn last_draw_of(&self, scene: SceneId) -> Option<DrawRecord> {
        self.state.borrow().draws.iter().rev().find(|d| d.scene == scene).cloned()
    }

    /// Scenes in the order they were drawn
    pub fn scene_order(&self) -> Vec<SceneId> {
        self.state.borrow().draws.iter().map(|d| d.scene).collect()
    }

    /// Last viewport size the backend was given
    pub fn viewport(&self) -> Option<(u32, u32)> {
        self.state.borrow().viewport
    }

    /// Scenes whose resources were released, in order
    pub fn released(&self) -> Vec<SceneId> {
        self.state.borrow().released.clone()
    }

    /// Whether the backend was disposed
    pub fn is_disposed(&self) -> bool {
        self.state.borrow().disposed
    }

    /// Make every future draw of `scene` fail
    pub fn fail_draws_of(&self, scene: SceneId) {
        self.state.borrow_mut().failing.insert(scene);
    }
}

/// Backend that records draws into a [`DrawLog`]
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    log: DrawLog,
}

impl HeadlessBackend {
    /// Create a backend with a fresh log
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle onto this backend's log
    pub fn log(&self) -> DrawLog {
        self.log.clone()
    }
}

impl RenderBackend for HeadlessBackend {
    fn initialize(&mut self, surface: &RenderSurface, config: &RuntimeConfig) -> BackendResult<()> {
        log::debug!(
            "Headless backend initialized at {}x{} (antialias: {}, clear color: {:?})",
            surface.width,
            surface.height,
            config.antialias,
            config.clear_color
        );
        self.set_viewport(surface.width, surface.height);
        Ok(())
    }

    fn set_viewport(&mut self, width: u32, height: u32) {
        self.log.state.borrow_mut().viewport = Some((width, height));
    }

    fn render(&mut self, scene: SceneId, camera: &EngineObject, objects: &[&EngineObject]) -> BackendResult<()> {
        let mut state = self.log.state.borrow_mut();
        if state.disposed {
            return Err(EngineError::Disposed);
        }
        if state.failing.contains(&scene) {
            return Err(EngineError::RenderingFailed(format!("injected failure for {scene:?}")));
        }
        state.draws.push(DrawRecord {
            scene,
            camera: camera.clone(),
            objects: objects.iter().map(|&object| object.clone()).collect(),
        });
        Ok(())
    }

    fn release_scene(&mut self, scene: SceneId) {
        self.log.state.borrow_mut().released.push(scene);
    }

    fn dispose(&mut self) {
        self.log.state.borrow_mut().disposed = true;
    }
}
