//! A cancellable deferred timer on a millisecond timeline.
//!
//! Nothing here sleeps or spawns. Time is passed in by the caller, which makes
//! the timer deterministic under test and lets a single-threaded event loop
//! drive it by polling.

use std::time::{Duration, Instant};

/// A point on the timer timeline, in milliseconds.
pub type Millis = u64;

/// Converts a duration to timeline milliseconds, saturating.
#[must_use]
pub fn millis(duration: Duration) -> Millis {
    Millis::try_from(duration.as_millis()).unwrap_or(Millis::MAX)
}

/// Identifies one scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerToken(u64);

#[derive(Debug)]
struct Pending<T> {
    due: Millis,
    value: T,
}

/// A one-shot timer carrying a value delivered when it expires.
///
/// At most one timer is pending: scheduling a new one cancels the old.
#[derive(Debug)]
pub struct Timer<T> {
    next_token: u64,
    pending: Option<Pending<T>>,
}

impl<T> Default for Timer<T> {
    fn default() -> Self {
        Self {
            next_token: 0,
            pending: None,
        }
    }
}

impl<T> Timer<T> {
    /// Schedules `value` to be delivered at `due`, replacing any pending
    /// timer.
    pub fn schedule(&mut self, value: T, due: Millis) -> TimerToken {
        let token = TimerToken(self.next_token);
        self.next_token += 1;
        self.pending = Some(Pending { due, value });
        token
    }

    /// Cancels the pending timer, if any. Returns whether one was pending.
    pub fn clear(&mut self) -> bool {
        self.pending.take().is_some()
    }

    /// When the pending timer is due.
    #[must_use]
    pub fn due(&self) -> Option<Millis> {
        self.pending.as_ref().map(|pending| pending.due)
    }

    /// Removes and returns the pending value if it is due at or before `now`.
    pub fn expire(&mut self, now: Millis) -> Option<T> {
        if self.due()? > now {
            return None;
        }
        self.pending.take().map(|pending| pending.value)
    }
}

/// Measures elapsed wall time on the timer timeline.
#[derive(Debug, Clone, Copy)]
pub struct Stopwatch {
    started: Instant,
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::start()
    }
}

impl Stopwatch {
    /// Starts measuring from now.
    #[must_use]
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    /// Milliseconds elapsed since the stopwatch was started.
    #[must_use]
    pub fn now(&self) -> Millis {
        millis(self.started.elapsed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expires_once_due() {
        let mut timer = Timer::default();
        timer.schedule("save", 300);

        assert_eq!(timer.expire(299), None);
        assert_eq!(timer.expire(300), Some("save"));
        assert_eq!(timer.expire(1_000), None);
        assert_eq!(timer.due(), None);
    }

    #[test]
    fn rescheduling_replaces_pending_timer() {
        let mut timer = Timer::default();
        let stale = timer.schedule("first", 100);
        let fresh = timer.schedule("second", 500);

        assert_ne!(stale, fresh);
        assert_eq!(timer.due(), Some(500));
        assert_eq!(timer.expire(499), None);
        assert_eq!(timer.expire(500), Some("second"));
    }

    #[test]
    fn cleared_timer_never_fires() {
        let mut timer = Timer::default();
        timer.schedule(1, 10);

        assert!(timer.clear());
        assert!(!timer.clear());
        assert_eq!(timer.expire(1_000), None);
        assert_eq!(timer.due(), None);
    }

    #[test]
    fn millis_saturates() {
        assert_eq!(millis(Duration::from_millis(400)), 400);
        assert_eq!(millis(Duration::MAX), Millis::MAX);
    }
}
