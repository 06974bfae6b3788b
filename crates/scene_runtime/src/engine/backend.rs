//! Backend abstraction for the rendering engine
//!
//! The runtime treats the rasterizer as a black box. Everything it needs from
//! one is captured by [`RenderBackend`]: which entity kinds exist, how large
//! the viewport is, how to draw one scene from one camera, and how to release
//! resources.

use super::catalog::{self, EntityKindInfo};
use super::object::EngineObject;
use super::EngineError;
use crate::config::RuntimeConfig;
use crate::scene::SceneId;

/// Result type for backend operations
pub type BackendResult<T> = Result<T, EngineError>;

/// Pixel dimensions of the surface the runtime draws into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderSurface {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl RenderSurface {
    /// Create a surface description
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width divided by height; `1.0` for a zero-height surface
    pub fn aspect(&self) -> f64 {
        if self.height == 0 {
            1.0
        } else {
            f64::from(self.width) / f64::from(self.height)
        }
    }
}

/// Main rendering backend trait
///
/// Implementations are driven from a single thread, once per frame per active
/// scene, and are never called re-entrantly.
pub trait RenderBackend {
    /// Prepare the backend for a surface
    fn initialize(&mut self, _surface: &RenderSurface, _config: &RuntimeConfig) -> BackendResult<()> {
        Ok(())
    }

    /// Entity types this engine can construct
    fn entity_kinds(&self) -> Vec<EntityKindInfo> {
        catalog::builtin_kinds()
    }

    /// Resize the viewport; takes effect on the next draw
    fn set_viewport(&mut self, width: u32, height: u32);

    /// Draw one scene's objects as seen from `camera`
    fn render(&mut self, scene: SceneId, camera: &EngineObject, objects: &[&EngineObject]) -> BackendResult<()>;

    /// Free any resources held for `scene`
    fn release_scene(&mut self, scene: SceneId);

    /// Free every resource; the backend is not used afterwards
    fn dispose(&mut self);
}
