//! Cross-module scenario tests
//!
//! Drive a [`Runtime`] over a [`HeadlessBackend`] and a [`FrameSignal`], the
//! way a host would.

mod frame_loop;

use std::time::Duration;

use crate::config::RuntimeConfig;
use crate::engine::{DrawLog, HeadlessBackend, RenderSurface};
use crate::runtime::{FrameSignal, Runtime};

fn headless_runtime_with(config: RuntimeConfig) -> (Runtime, FrameSignal, DrawLog) {
    let signal = FrameSignal::new();
    let backend = HeadlessBackend::new();
    let draws = backend.log();
    let runtime = Runtime::new(RenderSurface::new(640, 480), backend, signal.clone(), config)
        .expect("headless runtime");
    (runtime, signal, draws)
}

fn headless_runtime() -> (Runtime, FrameSignal, DrawLog) {
    headless_runtime_with(RuntimeConfig::default())
}

/// Answer one pending frame request at `millis`; `false` if none was pending
fn frame(runtime: &Runtime, signal: &FrameSignal, millis: u64) -> bool {
    if !signal.take() {
        return false;
    }
    runtime.on_frame(Duration::from_millis(millis));
    true
}
