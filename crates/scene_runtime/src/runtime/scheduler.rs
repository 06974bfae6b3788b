//! Host frame scheduling
//!
//! The runtime never drives its own loop. It asks the host for one frame at a
//! time through a [`FrameScheduler`], and the host answers by calling
//! `Runtime::on_frame` with its frame timestamp.

use std::cell::Cell;
use std::rc::Rc;

/// Host hook for requesting the next frame callback
pub trait FrameScheduler {
    /// Ask the host to call `Runtime::on_frame` once more
    fn request_frame(&mut self);
}

/// Counts outstanding frame requests
///
/// Clones share one counter, so a host loop can keep a handle while the
/// runtime owns another:
///
/// ```
/// use scene_runtime::runtime::{FrameScheduler, FrameSignal};
///
/// let signal = FrameSignal::new();
/// let mut scheduler = signal.clone();
/// scheduler.request_frame();
/// assert!(signal.take());
/// assert!(!signal.take());
/// ```
#[derive(Debug, Clone, Default)]
pub struct FrameSignal {
    pending: Rc<Cell<u32>>,
    requested: Rc<Cell<u64>>,
}

impl FrameSignal {
    /// Create a signal with nothing pending
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume one pending request
    pub fn take(&self) -> bool {
        match self.pending.get() {
            0 => false,
            n => {
                self.pending.set(n - 1);
                true
            }
        }
    }

    /// Requests not yet taken
    pub fn pending(&self) -> u32 {
        self.pending.get()
    }

    /// Requests made over the signal's lifetime
    pub fn total_requests(&self) -> u64 {
        self.requested.get()
    }
}

impl FrameScheduler for FrameSignal {
    fn request_frame(&mut self) {
        self.pending.set(self.pending.get().saturating_add(1));
        self.requested.set(self.requested.get() + 1);
    }
}
