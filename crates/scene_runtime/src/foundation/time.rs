//! Time management utilities

use std::time::Duration;

/// Synthesized clock driven by host frame timestamps
///
/// The clock accumulates the delta between consecutive frame timestamps instead
/// of reading wall-clock time. After [`FrameClock::reanchor`] the next frame
/// contributes no delta, so time spent with the loop stopped is never counted
/// and animation resumes exactly where it paused.
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    last_timestamp: Option<Duration>,
    elapsed: Duration,
    frame_count: u64,
}

impl FrameClock {
    /// Create a clock at time zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the previous frame timestamp
    ///
    /// Called whenever the frame loop (re)starts.
    pub fn reanchor(&mut self) {
        self.last_timestamp = None;
    }

    /// Advance with the host timestamp of the current frame
    ///
    /// Returns the synthesized time in seconds. Timestamps that go backwards
    /// contribute no delta.
    pub fn advance(&mut self, timestamp: Duration) -> f64 {
        if let Some(last) = self.last_timestamp {
            self.elapsed += timestamp.saturating_sub(last);
        }
        self.last_timestamp = Some(timestamp);
        self.frame_count += 1;
        self.seconds()
    }

    /// Synthesized time in seconds
    pub fn seconds(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }

    /// Number of frames the clock has been advanced
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}
