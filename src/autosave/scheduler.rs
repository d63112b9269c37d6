use std::time::Duration;

use tracing::instrument;

use crate::{
    autosave::{
        debounce::{Debouncer, Phase},
        timer::Millis,
    },
    domain::{FormValues, RecordId},
    store::Store,
};

/// What happened when the autosave timer fired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The values were written to this draft.
    Saved(RecordId),
    /// The values were blank, so nothing was written.
    Skipped,
}

/// Autosaves a live form into the current draft once editing pauses.
///
/// One scheduler belongs to one form instance. Feed it every change with
/// [`value_changed`](Self::value_changed) and call [`poll`](Self::poll)
/// from the event loop. Dropping the scheduler (or calling
/// [`teardown`](Self::teardown)) cancels any pending save.
#[derive(Debug)]
pub struct AutosaveScheduler {
    debouncer: Debouncer<FormValues>,
}

impl AutosaveScheduler {
    /// A scheduler that waits `delay` after the last change before saving.
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self {
            debouncer: Debouncer::new(delay),
        }
    }

    /// Records the form values as of `now`, restarting the quiescence window.
    ///
    /// The first values seen are the form's initial state and are never saved.
    pub fn value_changed(&mut self, values: FormValues, now: Millis) {
        if self.debouncer.observe(values, now).is_none() {
            tracing::trace!("initial form values, not scheduling a save");
        }
    }

    /// Saves the pending values if the quiescence window has passed.
    ///
    /// Returns `None` if nothing was due.
    #[instrument(level = "debug", skip(self, store))]
    pub fn poll(&mut self, now: Millis, store: &mut Store) -> Option<Outcome> {
        let values = self.debouncer.poll(now)?;
        Some(save_draft(store, values))
    }

    /// When the pending save will fire, if one is pending.
    #[must_use]
    pub fn deadline(&self) -> Option<Millis> {
        match self.debouncer.phase() {
            Phase::Idle => None,
            Phase::Pending { due } => Some(due),
        }
    }

    /// Cancels any pending save.
    pub fn teardown(&mut self) {
        if self.debouncer.cancel() {
            tracing::debug!("cancelled pending autosave");
        }
    }
}

impl Drop for AutosaveScheduler {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Writes `values` into the current draft, unless they are blank.
///
/// A new draft is created (and selected) if there is no current draft.
pub fn save_draft(store: &mut Store, values: FormValues) -> Outcome {
    if values.is_trivial() {
        tracing::debug!("form is blank, skipping autosave");
        return Outcome::Skipped;
    }

    store.set_saving(true);
    let current = store.drafts().current_id().cloned();
    let id = store.upsert_draft(values, current);
    tracing::info!(%id, "autosaved draft");
    Outcome::Saved(id)
}
