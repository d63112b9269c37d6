//! Debounced autosave of the live form into the current draft.

mod debounce;
mod scheduler;
/// A cancellable timer and the millisecond timeline it runs on.
pub mod timer;

pub use debounce::{Debouncer, Phase};
pub use scheduler::{AutosaveScheduler, Outcome, save_draft};
pub use timer::{Millis, Stopwatch, Timer, TimerToken};
