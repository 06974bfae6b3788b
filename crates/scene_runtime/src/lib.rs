//! # Scene Runtime
//!
//! A functional scene-graph runtime for live-coded 3D scenes.
//!
//! ## Features
//!
//! - **Entity Registry**: factories discovered from the engine's exported kinds
//! - **Transformation Chains**: immutable nodes whose state is a function of time
//! - **Shared Frame Loop**: one host-driven loop for every active scene
//! - **Fault Isolation**: a failing scene freezes while the others keep drawing
//! - **Pluggable Backends**: anything implementing [`engine::RenderBackend`]
//!
//! ## Quick Start
//!
//! ```rust
//! use std::time::Duration;
//! use scene_runtime::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let signal = FrameSignal::new();
//!     let backend = HeadlessBackend::new();
//!     let draws = backend.log();
//!     let runtime = Runtime::new(RenderSurface::new(800, 600), backend, signal.clone(), RuntimeConfig::default())?;
//!
//!     let planet = runtime
//!         .entity("sphere", &[0.5])?
//!         .translate(&args![2])?
//!         .rotate(&args![0, 0, 0, 0, 0.1])?;
//!
//!     let scene = runtime.scene();
//!     scene.add(&[planet]);
//!     scene.render(None)?;
//!
//!     let mut frame = 0;
//!     while signal.take() && frame < 3 {
//!         runtime.on_frame(Duration::from_millis(16 * frame));
//!         frame += 1;
//!     }
//!     assert_eq!(draws.draw_count(), 3);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod engine;
pub mod foundation;
pub mod node;
pub mod registry;
pub mod runtime;
pub mod scene;

#[cfg(test)]
mod tests;

/// Common imports for runtime users
pub mod prelude {
    pub use crate::{
        args,
        config::{Config, RuntimeConfig},
        engine::{HeadlessBackend, RenderBackend, RenderSurface},
        foundation::math::{Color, Quat, Vec3},
        node::{FrameContext, Node, Value},
        runtime::{FrameFault, FrameScheduler, FrameSignal, Runtime, RuntimeError},
        scene::{Scene, SceneId},
    };
}
