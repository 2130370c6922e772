//! Hover event throttling
//!
//! Pointer-over events arrive at display refresh rate; the drag state
//! machine wants a bounded stream. The throttle is a token bucket sitting
//! upstream of [`hover`](crate::engine::BoardEngine::hover), keeping the
//! machine itself free of timing concerns so tests can drive it with
//! synthetic event sequences.

use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use nonzero_ext::nonzero;
use std::num::NonZeroU32;

/// Default hover events admitted per second
pub const DEFAULT_HOVER_EVENTS_PER_SECOND: NonZeroU32 = nonzero!(30u32);

/// Token-bucket gate for hover events.
pub struct HoverThrottle {
    limiter: DefaultDirectRateLimiter,
}

impl HoverThrottle {
    /// Create a throttle admitting the default event rate
    pub fn new() -> Self {
        Self::with_rate(DEFAULT_HOVER_EVENTS_PER_SECOND)
    }

    /// Create a throttle admitting `events_per_second` with an equal burst
    pub fn with_rate(events_per_second: NonZeroU32) -> Self {
        Self::with_quota(Quota::per_second(events_per_second))
    }

    /// Create a throttle from an explicit quota
    pub fn with_quota(quota: Quota) -> Self {
        Self {
            limiter: RateLimiter::direct(quota),
        }
    }

    /// Whether the event may be forwarded to the state machine. Denied
    /// events are simply dropped; the next admitted hover supersedes them.
    pub fn allow(&self) -> bool {
        self.limiter.check().is_ok()
    }
}

impl Default for HoverThrottle {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_burst_then_denied() {
        let throttle = HoverThrottle::with_quota(
            Quota::per_second(nonzero!(1u32)).allow_burst(nonzero!(2u32)),
        );

        assert!(throttle.allow());
        assert!(throttle.allow());
        // Bucket exhausted within the same instant.
        assert!(!throttle.allow());
    }

    #[test]
    fn test_default_admits_initial_events() {
        let throttle = HoverThrottle::new();
        assert!(throttle.allow());
    }
}
