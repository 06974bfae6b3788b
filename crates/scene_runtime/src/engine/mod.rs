//! Rendering engine model
//!
//! The runtime orchestrates scene composition on top of a rendering engine it
//! treats as a black box. This module holds the small slice of that engine the
//! runtime touches:
//!
//! - [`object`]: value-semantic meshes, lights and cameras with a pose
//! - [`catalog`]: the entity kinds the engine exports and their constructors
//! - [`backend`]: the [`RenderBackend`] trait and [`RenderSurface`]
//! - [`headless`]: a recording backend for tests and headless hosts

pub mod backend;
pub mod catalog;
pub mod headless;
pub mod object;

pub use backend::{BackendResult, RenderBackend, RenderSurface};
pub use catalog::{Constructor, ConstructorSignature, EntityKindInfo};
pub use headless::{DrawLog, DrawRecord, HeadlessBackend};
pub use object::{EngineObject, Geometry, Light, LightKind, Material, Mesh, ObjectBody, ObjectKind, PerspectiveCamera};

use thiserror::Error;

/// Errors raised by the engine while constructing or drawing objects
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// A required constructor parameter received no value
    #[error("Missing argument: {param}")]
    MissingArgument {
        /// Parameter name
        param: &'static str,
    },

    /// A constructor parameter received an unusable value
    #[error("Invalid argument {param}: {reason}")]
    InvalidArgument {
        /// Parameter name
        param: &'static str,
        /// Why the value was rejected
        reason: String,
    },

    /// A draw call failed
    #[error("Rendering failed: {0}")]
    RenderingFailed(String),

    /// The backend was used after disposal
    #[error("Backend already disposed")]
    Disposed,
}
