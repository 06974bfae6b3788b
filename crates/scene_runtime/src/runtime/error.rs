//! Runtime errors and frame faults

use thiserror::Error;

use crate::config::ConfigError;
use crate::engine::EngineError;
use crate::scene::SceneId;

/// Errors returned by runtime and scene operations
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// No factory is registered under this name
    #[error("Unknown entity: {0}")]
    UnknownEntity(String),

    /// The engine rejected the constructor arguments
    #[error("Failed to construct {name}: {source}")]
    Construction {
        /// Factory name
        name: String,
        /// Engine error
        #[source]
        source: EngineError,
    },

    /// Invalid runtime configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The backend failed to initialize
    #[error("Backend error: {0}")]
    Backend(#[from] EngineError),

    /// The runtime was already disposed
    #[error("Runtime already disposed")]
    Disposed,

    /// The scene was already disposed
    #[error("Scene {0:?} already disposed")]
    SceneDisposed(SceneId),

    /// The runtime that created this scene no longer exists
    #[error("Runtime dropped")]
    RuntimeDropped,
}

/// Result type for runtime operations
pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// A failure isolated to one scene during one frame
///
/// The scene keeps its last drawn state for that frame and the loop carries
/// on.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameFault {
    /// Scene that failed
    pub scene: SceneId,
    /// Synthesized time of the frame
    pub time: f64,
    /// What went wrong
    pub message: String,
}
