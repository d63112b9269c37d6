use std::time::Duration;

use crate::autosave::timer::{Millis, Timer, TimerToken, millis};

/// Where a [`Debouncer`] is in its cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No value is waiting.
    Idle,
    /// A value is waiting for the quiescence window to pass.
    Pending {
        /// When the waiting value will be released.
        due: Millis,
    },
}

/// Turns a burst of values into the last value of the burst.
///
/// Each observed value restarts the quiescence window, cancelling the timer
/// of the value it replaces. Once a full window passes with no new value,
/// [`poll`](Self::poll) releases the latest value. The first value observed is
/// treated as the initial state and never released.
#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Millis,
    timer: Timer<T>,
    primed: bool,
}

impl<T> Debouncer<T> {
    /// A debouncer with the given quiescence window.
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self {
            delay: millis(delay),
            timer: Timer::default(),
            primed: false,
        }
    }

    /// Records a new value seen at `now`.
    ///
    /// Returns the token of the timer started for it, or `None` if this was
    /// the first value and was suppressed.
    pub fn observe(&mut self, value: T, now: Millis) -> Option<TimerToken> {
        if !self.primed {
            self.primed = true;
            return None;
        }

        // replaces the stale timer, if any
        Some(self.timer.schedule(value, now.saturating_add(self.delay)))
    }

    /// Releases the waiting value if its window has passed by `now`.
    pub fn poll(&mut self, now: Millis) -> Option<T> {
        self.timer.expire(now)
    }

    /// Drops the waiting value, if any, without releasing it.
    ///
    /// Returns whether a value was waiting.
    pub fn cancel(&mut self) -> bool {
        self.timer.clear()
    }

    /// The current phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.timer
            .due()
            .map_or(Phase::Idle, |due| Phase::Pending { due })
    }

    /// The quiescence window, in milliseconds.
    #[must_use]
    pub const fn delay(&self) -> Millis {
        self.delay
    }
}
