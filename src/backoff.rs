//! Reconnect delay policy for the watch loop.
//!
//! Doubles the delay on each failed attempt up to a cap, resets to the base
//! delay after a cleanly completed attempt, and drops to a short fixed resume
//! delay when the server closes the stream without error. The resume delay is
//! deliberately distinct from the reset value; the two paths must never be
//! conflated.

use std::time::Duration;

/// Default first retry delay after a transport error.
pub const DEFAULT_INITIAL_BACKOFF: Duration = Duration::from_secs(1);
/// Default ceiling for the exponential sequence.
pub const DEFAULT_MAX_BACKOFF: Duration = Duration::from_secs(60);
/// Default delay before reconnecting after a clean end-of-stream.
pub const DEFAULT_RESUME_DELAY: Duration = Duration::from_millis(500);

/// Exponential backoff with a clean-disconnect fast path.
#[derive(Debug, Clone)]
pub struct ReconnectBackoff {
    /// Base delay, restored by [`reset`](Self::reset).
    initial: Duration,
    /// Delay for the next sleep.
    current: Duration,
    /// Cap for the exponential sequence.
    max: Duration,
    /// Fixed delay used after a clean end-of-stream.
    resume: Duration,
    /// Consecutive failed attempts since the last reset.
    failure_count: u32,
}

impl ReconnectBackoff {
    pub fn new() -> Self {
        Self::with_config(
            DEFAULT_INITIAL_BACKOFF,
            DEFAULT_MAX_BACKOFF,
            DEFAULT_RESUME_DELAY,
        )
    }

    pub fn with_config(initial: Duration, max: Duration, resume: Duration) -> Self {
        Self {
            initial,
            current: initial,
            max,
            resume,
            failure_count: 0,
        }
    }

    /// Record a failed attempt and compute the delay for the upcoming sleep.
    ///
    /// The first failure in a run sleeps the base delay; each further failure
    /// doubles it, capped at the ceiling (1s, 2s, 4s, ... for the defaults).
    pub fn record_failure(&mut self) {
        self.current = if self.failure_count == 0 {
            self.initial
        } else {
            (self.current * 2).min(self.max)
        };
        self.failure_count += 1;
    }

    /// A cleanly completed attempt returns the delay to the base value.
    pub fn reset(&mut self) {
        self.failure_count = 0;
        self.current = self.initial;
    }

    /// The server closed the stream without error: reconnect after the short
    /// fixed resume delay instead of advancing the exponential sequence.
    pub fn set_resume(&mut self) {
        self.failure_count = 0;
        self.current = self.resume;
    }

    /// Delay for the upcoming sleep.
    pub fn current(&self) -> Duration {
        self.current
    }

    /// Consecutive failures since the last reset.
    pub fn failure_count(&self) -> u32 {
        self.failure_count
    }
}

impl Default for ReconnectBackoff {
    fn default() -> Self {
        Self::new()
    }
}
