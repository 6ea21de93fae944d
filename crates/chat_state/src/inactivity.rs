//! Inactivity clock - elapsed-time tracking for the timeout mode
//!
//! The clock is mutated only through [`InactivityClock::check`] and
//! [`InactivityClock::touch`]; the caller supplies `now`, which keeps the
//! logic deterministic under test.

use chrono::{DateTime, Duration, Utc};

/// Tracks the time of last session activity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InactivityClock {
    last_activity: DateTime<Utc>,
}

impl InactivityClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { last_activity: now }
    }

    pub fn last_activity(&self) -> DateTime<Utc> {
        self.last_activity
    }

    /// Record activity (a new user message) without a timeout check.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_activity = now;
    }

    /// Evaluate the timeout and refresh the clock.
    ///
    /// Returns true when more than `threshold` elapsed since the last
    /// activity. `last_activity` is refreshed on every call, so consecutive
    /// checks inside the threshold never time out.
    pub fn check(&mut self, now: DateTime<Utc>, threshold: Duration) -> bool {
        let elapsed = now - self.last_activity;
        self.last_activity = now;
        elapsed > threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn no_timeout_within_threshold() {
        let mut clock = InactivityClock::new(at(0));
        assert!(!clock.check(at(30), Duration::seconds(60)));
    }

    #[test]
    fn timeout_after_threshold() {
        let mut clock = InactivityClock::new(at(0));
        assert!(clock.check(at(61), Duration::seconds(60)));
    }

    #[test]
    fn threshold_boundary_is_exclusive() {
        let mut clock = InactivityClock::new(at(0));
        // exactly the threshold has not yet exceeded it
        assert!(!clock.check(at(60), Duration::seconds(60)));
    }

    #[test]
    fn check_refreshes_the_clock() {
        let mut clock = InactivityClock::new(at(0));
        assert!(clock.check(at(120), Duration::seconds(60)));
        // the previous check counted as activity
        assert!(!clock.check(at(150), Duration::seconds(60)));
        assert_eq!(clock.last_activity(), at(150));
    }

    #[test]
    fn touch_resets_elapsed_time() {
        let mut clock = InactivityClock::new(at(0));
        clock.touch(at(100));
        assert!(!clock.check(at(130), Duration::seconds(60)));
    }
}
