// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Input-rate storm guard.
//!
//! A runaway controller or MIDI feedback loop must not be able to exhaust
//! memory or starve downstream processing. The guard runs before any
//! buffering or timestamp-sensitive logic and drops events once the rate
//! inside a sliding window exceeds the limit.

use std::collections::VecDeque;

/// Default sliding window in milliseconds
pub const DEFAULT_WINDOW_MS: f64 = 1000.0;

/// Default event limit within the window
pub const DEFAULT_LIMIT: usize = 150;

/// Transition of the frozen latch. Emitted once per edge, not per
/// dropped event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardTransition {
    /// Rate limit exceeded; input is frozen
    Overloaded,
    /// Rate back under the limit; input restored
    Recovered,
}

/// Result of a single admission check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Admission {
    /// Whether the event may proceed downstream
    pub admitted: bool,
    /// Latch transition caused by this call, if any
    pub transition: Option<GuardTransition>,
}

/// Sliding-window rate limiter with a frozen latch.
#[derive(Debug)]
pub struct StormGuard {
    window_ms: f64,
    limit: usize,
    arrivals: VecDeque<f64>,
    frozen: bool,
}

impl StormGuard {
    pub fn new(window_ms: f64, limit: usize) -> Self {
        Self {
            window_ms,
            limit,
            arrivals: VecDeque::new(),
            frozen: false,
        }
    }

    /// Check whether an event arriving at `now` may pass.
    ///
    /// The arrival is recorded before the limit check, so rejected events
    /// still consume window budget; a storm has to actually subside before
    /// input thaws.
    pub fn admit(&mut self, now: f64) -> Admission {
        while let Some(&oldest) = self.arrivals.front() {
            if now - oldest >= self.window_ms {
                self.arrivals.pop_front();
            } else {
                break;
            }
        }
        self.arrivals.push_back(now);

        if self.arrivals.len() > self.limit {
            let transition = if self.frozen {
                None
            } else {
                self.frozen = true;
                Some(GuardTransition::Overloaded)
            };
            Admission {
                admitted: false,
                transition,
            }
        } else {
            let transition = if self.frozen {
                self.frozen = false;
                Some(GuardTransition::Recovered)
            } else {
                None
            };
            Admission {
                admitted: true,
                transition,
            }
        }
    }

    /// Whether the guard is currently latched frozen
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Forget all recorded arrivals and clear the latch
    pub fn reset(&mut self) {
        self.arrivals.clear();
        self.frozen = false;
    }
}

impl Default for StormGuard {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_MS, DEFAULT_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admits_up_to_limit() {
        let mut guard = StormGuard::new(1000.0, 150);
        for i in 0..150 {
            let adm = guard.admit(i as f64);
            assert!(adm.admitted, "event {} should be admitted", i);
            assert_eq!(adm.transition, None);
        }
    }

    #[test]
    fn test_rejects_past_limit_with_single_transition() {
        let mut guard = StormGuard::new(1000.0, 150);
        for i in 0..150 {
            guard.admit(i as f64);
        }

        let adm = guard.admit(150.0);
        assert!(!adm.admitted);
        assert_eq!(adm.transition, Some(GuardTransition::Overloaded));
        assert!(guard.is_frozen());

        // Further rejections do not repeat the notification
        let adm = guard.admit(151.0);
        assert!(!adm.admitted);
        assert_eq!(adm.transition, None);
    }

    #[test]
    fn test_recovers_after_window_slides() {
        let mut guard = StormGuard::new(1000.0, 150);
        for i in 0..151 {
            guard.admit(i as f64);
        }
        assert!(guard.is_frozen());

        // Well past the window: old arrivals pruned, admission resumes
        let adm = guard.admit(5000.0);
        assert!(adm.admitted);
        assert_eq!(adm.transition, Some(GuardTransition::Recovered));
        assert!(!guard.is_frozen());
    }

    #[test]
    fn test_rejected_events_consume_budget() {
        let mut guard = StormGuard::new(1000.0, 2);
        assert!(guard.admit(0.0).admitted);
        assert!(guard.admit(1.0).admitted);
        assert!(!guard.admit(2.0).admitted);
        // Still inside the window and arrivals keep accumulating
        assert!(!guard.admit(3.0).admitted);
    }

    #[test]
    fn test_reset_clears_latch() {
        let mut guard = StormGuard::new(1000.0, 1);
        guard.admit(0.0);
        guard.admit(1.0);
        assert!(guard.is_frozen());

        guard.reset();
        assert!(!guard.is_frozen());
        let adm = guard.admit(2.0);
        assert!(adm.admitted);
        assert_eq!(adm.transition, None);
    }
}
