#![forbid(unsafe_code)]

//! Hover polling throttle with latest-wins coalescing.
//!
//! At most one sample is released per period. Samples offered inside the
//! period replace each other; the newest is released by [`HoverThrottle::poll`]
//! once the period has elapsed, so the final resting position of the cursor
//! is always evaluated.

use web_time::{Duration, Instant};

/// Rate limiter for hover lookups.
#[derive(Debug, Clone)]
pub struct HoverThrottle<T> {
    period: Duration,
    last: Option<Instant>,
    pending: Option<T>,
}

impl<T> HoverThrottle<T> {
    /// Create a throttle releasing at most one sample per `period`.
    #[must_use]
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            last: None,
            pending: None,
        }
    }

    /// Throttle period.
    #[must_use]
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Change the throttle period.
    pub fn set_period(&mut self, period: Duration) {
        self.period = period;
    }

    fn is_open(&self, now: Instant) -> bool {
        self.last
            .is_none_or(|last| now.saturating_duration_since(last) >= self.period)
    }

    /// Offer a sample. Returns it immediately if the period has elapsed;
    /// otherwise keeps it as the pending sample and returns `None`.
    pub fn offer(&mut self, sample: T, now: Instant) -> Option<T> {
        if self.is_open(now) {
            self.last = Some(now);
            self.pending = None;
            Some(sample)
        } else {
            self.pending = Some(sample);
            None
        }
    }

    /// Release the pending sample if the period has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        if self.pending.is_some() && self.is_open(now) {
            self.last = Some(now);
            self.pending.take()
        } else {
            None
        }
    }

    /// Whether a sample is waiting for the period to elapse.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Drop the pending sample and reopen the gate.
    pub fn reset(&mut self) {
        self.last = None;
        self.pending = None;
    }
}
