//! Scenes
//!
//! A scene is an ordered list of top-level nodes plus the camera they are
//! drawn from. Scenes are created by the runtime, which keeps their state in a
//! `slotmap` arena keyed by [`SceneId`] and draws every active scene once per
//! frame.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::node::{EvalError, Node};
use crate::runtime::{RuntimeCore, RuntimeError, RuntimeResult};

slotmap::new_key_type! {
    /// Stable handle for a scene in the runtime's arena
    pub struct SceneId;
}

#[derive(Debug, Default)]
pub(crate) struct SceneState {
    pub(crate) nodes: Vec<Node>,
    pub(crate) camera: Option<Node>,
    pub(crate) rendering: bool,
    pub(crate) disposed: bool,
}

impl SceneState {
    /// Tick the camera, then every top-level node, at `time`
    ///
    /// Works on a snapshot of the node list so that user closures may call
    /// back into the scene.
    pub(crate) fn evaluate(state: &RefCell<SceneState>, time: f64) -> Result<(), EvalError> {
        let (camera, nodes) = {
            let state = state.borrow();
            (state.camera.clone(), state.nodes.clone())
        };
        if let Some(camera) = camera {
            camera.tick(time)?;
        }
        for node in &nodes {
            node.tick(time)?;
        }
        Ok(())
    }
}

/// Handle onto a scene owned by a runtime
#[derive(Clone)]
pub struct Scene {
    id: SceneId,
    state: Rc<RefCell<SceneState>>,
    runtime: Weak<RefCell<RuntimeCore>>,
}

impl Scene {
    pub(crate) fn new(id: SceneId, state: Rc<RefCell<SceneState>>, runtime: Weak<RefCell<RuntimeCore>>) -> Self {
        Self { id, state, runtime }
    }

    /// Append top-level nodes
    ///
    /// Nodes are drawn in the order they were added. The same node may be
    /// added more than once; it is still evaluated once per frame.
    pub fn add(&self, nodes: &[Node]) -> &Self {
        let mut state = self.state.borrow_mut();
        if state.disposed {
            log::warn!("Ignoring add of {} node(s) to disposed scene {:?}", nodes.len(), self.id);
            return self;
        }
        state.nodes.extend_from_slice(nodes);
        self
    }

    /// Start drawing the scene every frame
    ///
    /// The first call binds `camera`, or a default camera placed
    /// `default_camera_distance` back along +Z, for the scene's lifetime.
    /// Calling it again while the scene is rendering does nothing; calling it
    /// after [`Scene::stop`] resumes with the originally bound camera.
    pub fn render(&self, camera: Option<&Node>) -> RuntimeResult<()> {
        let core = self.runtime.upgrade().ok_or(RuntimeError::RuntimeDropped)?;
        {
            let mut state = self.state.borrow_mut();
            if state.disposed {
                return Err(RuntimeError::SceneDisposed(self.id));
            }
            if core.borrow().is_disposed() {
                return Err(RuntimeError::Disposed);
            }
            if state.rendering {
                return Ok(());
            }

            let bound = state.camera.clone();
            match (bound, camera) {
                (None, Some(camera)) => state.camera = Some(camera.clone()),
                (None, None) => state.camera = Some(core.borrow().default_camera()),
                (Some(bound), Some(camera)) if !bound.ptr_eq(camera) => {
                    log::warn!("Scene {:?} keeps its original camera; ignoring the new one", self.id);
                }
                _ => {}
            }
            state.rendering = true;
        }

        core.borrow_mut().activate(self.id);
        Ok(())
    }

    /// Stop drawing the scene; its nodes and camera are kept
    ///
    /// Takes effect at the next frame boundary.
    pub fn stop(&self) {
        self.state.borrow_mut().rendering = false;
        if let Some(core) = self.runtime.upgrade() {
            core.borrow_mut().deactivate(self.id);
        }
    }

    /// Stop the scene and release its engine resources
    ///
    /// Calling it again does nothing.
    pub fn dispose(&self) {
        if self.state.borrow().disposed {
            return;
        }
        self.stop();
        self.state.borrow_mut().disposed = true;
        if let Some(core) = self.runtime.upgrade() {
            core.borrow_mut().release_scene(self.id);
        }
        log::debug!("Scene {:?} disposed", self.id);
    }

    /// Evaluate the camera and every node at `time` without drawing
    pub fn tick(&self, time: f64) -> Result<(), EvalError> {
        SceneState::evaluate(&self.state, time)
    }

    /// Arena key
    pub fn id(&self) -> SceneId {
        self.id
    }

    /// Number of top-level nodes
    pub fn len(&self) -> usize {
        self.state.borrow().nodes.len()
    }

    /// Whether the scene has no nodes
    pub fn is_empty(&self) -> bool {
        self.state.borrow().nodes.is_empty()
    }

    /// Top-level nodes in draw order
    pub fn nodes(&self) -> Vec<Node> {
        self.state.borrow().nodes.clone()
    }

    /// Bound camera, once `render` has been called
    pub fn camera(&self) -> Option<Node> {
        self.state.borrow().camera.clone()
    }

    /// Whether the scene is in the active set
    pub fn is_rendering(&self) -> bool {
        self.state.borrow().rendering
    }

    /// Whether the scene was disposed
    pub fn is_disposed(&self) -> bool {
        self.state.borrow().disposed
    }
}

impl std::fmt::Debug for Scene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("Scene")
            .field("id", &self.id)
            .field("nodes", &state.nodes.len())
            .field("rendering", &state.rendering)
            .field("disposed", &state.disposed)
            .finish()
    }
}
