//! Interval gating driven by caller-supplied timestamps.

/// Lets an action through at most once per `period_ms`.
///
/// A limiter that has never fired is immediately ready.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RateLimiter {
    period_ms: u64,
    last_ms: Option<u64>,
}

impl RateLimiter {
    pub const fn new(period_ms: u64) -> Self {
        Self {
            period_ms,
            last_ms: None,
        }
    }

    pub const fn period_ms(&self) -> u64 {
        self.period_ms
    }

    pub const fn last_ms(&self) -> Option<u64> {
        self.last_ms
    }

    pub fn ready(&self, now_ms: u64) -> bool {
        self.last_ms
            .is_none_or(|last| now_ms.saturating_sub(last) >= self.period_ms)
    }

    pub fn mark(&mut self, now_ms: u64) {
        self.last_ms = Some(now_ms);
    }

    /// `ready` + `mark` in one step.
    pub fn try_acquire(&mut self, now_ms: u64) -> bool {
        if !self.ready(now_ms) {
            return false;
        }
        self.mark(now_ms);
        true
    }

    pub fn reset(&mut self) {
        self.last_ms = None;
    }
}
