//! The in-memory logbook state and the container that mutates it.
//!
//! [`State`] is the whole state tree: the draft slice and the log slice.
//! [`Store`] owns a state tree and is the only way to change it. Every
//! mutation is applied completely before any [`Observer`] is told about it,
//! which is how persistence hooks in without the slices depending on storage.

mod drafts;
mod logs;

use std::{cell::Cell, fmt, rc::Rc};

use chrono::{DateTime, TimeDelta, Utc};
pub use drafts::{DRAFT_ID_PREFIX, DraftStore};
pub use logs::{LOG_ID_PREFIX, LogStore};

use crate::domain::{FormPatch, FormValues, RecordId, ServiceLog};

/// The complete logbook state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct State {
    /// Drafts, selection and save status.
    pub drafts: DraftStore,
    /// Submitted service logs.
    pub logs: LogStore,
}

/// Which part of the state a mutation touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    /// The draft slice changed.
    Drafts,
    /// The log slice changed.
    Logs,
}

/// Receives the committed state after every mutation.
pub trait Observer {
    /// Called once per mutation, after it has been fully applied.
    fn committed(&mut self, change: Change, state: &State);
}

/// A source of wall-clock time for record timestamps.
pub trait Clock {
    /// The current time.
    fn now(&self) -> DateTime<Utc>;
}

/// The system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
///
/// Clones share the same time, so a test can keep one handle and give another
/// to a [`Store`].
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Rc<Cell<DateTime<Utc>>>,
}

impl ManualClock {
    /// A clock stopped at `start`.
    #[must_use]
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Rc::new(Cell::new(start)),
        }
    }

    /// Moves the clock forward.
    pub fn advance(&self, by: TimeDelta) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }
}

/// Owns the logbook state and applies mutations to it.
pub struct Store {
    state: State,
    clock: Box<dyn Clock>,
    observers: Vec<Box<dyn Observer>>,
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("state", &self.state)
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new(State::default())
    }
}

impl Store {
    /// A store holding `state`, stamping records with the system clock.
    #[must_use]
    pub fn new(state: State) -> Self {
        Self::with_clock(state, SystemClock)
    }

    /// A store holding `state`, stamping records with `clock`.
    #[must_use]
    pub fn with_clock(state: State, clock: impl Clock + 'static) -> Self {
        Self {
            state,
            clock: Box::new(clock),
            observers: Vec::new(),
        }
    }

    /// Registers an observer to be told about every subsequent mutation.
    pub fn observe(&mut self, observer: impl Observer + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// The current state.
    #[must_use]
    pub const fn state(&self) -> &State {
        &self.state
    }

    /// The draft slice.
    #[must_use]
    pub const fn drafts(&self) -> &DraftStore {
        &self.state.drafts
    }

    /// The log slice.
    #[must_use]
    pub const fn logs(&self) -> &LogStore {
        &self.state.logs
    }

    /// Saves form values as a draft. See [`DraftStore::upsert`].
    ///
    /// Returns the identifier of the draft written.
    pub fn upsert_draft(&mut self, values: FormValues, id: Option<RecordId>) -> RecordId {
        let now = self.clock.now();
        let id = self.state.drafts.upsert(values, id, now).id.clone();
        self.commit(Change::Drafts);
        id
    }

    /// Deletes a draft. See [`DraftStore::remove`].
    pub fn remove_draft(&mut self, id: &RecordId) -> bool {
        let was_current = self.state.drafts.current_id() == Some(id);
        let removed = self.state.drafts.remove(id);
        if removed || was_current {
            self.commit(Change::Drafts);
        }
        removed
    }

    /// Deletes every draft. See [`DraftStore::clear`].
    pub fn clear_drafts(&mut self) {
        self.state.drafts.clear();
        self.commit(Change::Drafts);
    }

    /// Selects the draft loaded into the form.
    pub fn set_current_draft(&mut self, id: Option<RecordId>) {
        if self.state.drafts.current_id() != id.as_ref() {
            self.state.drafts.set_current(id);
            self.commit(Change::Drafts);
        }
    }

    /// Marks a draft save as in flight (or not).
    pub fn set_saving(&mut self, saving: bool) {
        if self.state.drafts.is_saving() != saving {
            self.state.drafts.set_saving(saving);
            self.commit(Change::Drafts);
        }
    }

    /// Overrides the time of the last completed draft save.
    pub fn set_last_saved_at(&mut self, at: Option<DateTime<Utc>>) {
        if self.state.drafts.last_saved_at() != at {
            self.state.drafts.set_last_saved_at(at);
            self.commit(Change::Drafts);
        }
    }

    /// Appends a service log. See [`LogStore::add`].
    pub fn add_log(&mut self, values: FormValues) -> ServiceLog {
        let now = self.clock.now();
        let log = self.state.logs.add(values, now).clone();
        self.commit(Change::Logs);
        log
    }

    /// Merges `patch` into a service log. See [`LogStore::update`].
    pub fn update_log(&mut self, id: &RecordId, patch: &FormPatch) -> bool {
        let updated = self.state.logs.update(id, patch);
        if updated {
            self.commit(Change::Logs);
        }
        updated
    }

    /// Deletes a service log. See [`LogStore::remove`].
    pub fn remove_log(&mut self, id: &RecordId) -> bool {
        let removed = self.state.logs.remove(id);
        if removed {
            self.commit(Change::Logs);
        }
        removed
    }

    fn commit(&mut self, change: Change) {
        for observer in &mut self.observers {
            observer.committed(change, &self.state);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::domain::ServiceType;

    #[derive(Clone, Default)]
    struct Recorder {
        seen: Rc<RefCell<Vec<(Change, usize, usize)>>>,
    }

    impl Observer for Recorder {
        fn committed(&mut self, change: Change, state: &State) {
            self.seen
                .borrow_mut()
                .push((change, state.drafts.len(), state.logs.len()));
        }
    }

    fn values() -> FormValues {
        FormValues {
            provider_id: "P1".to_string(),
            service_order: "SO-1".to_string(),
            car_id: "C1".to_string(),
            odometer: 100.0,
            engine_hours: 10.0,
            start_date: "2024-01-01".to_string(),
            end_date: "2024-01-02".to_string(),
            kind: ServiceType::Planned,
            service_description: "Test".to_string(),
        }
    }

    fn store() -> (Store, Recorder, ManualClock) {
        let clock = ManualClock::new(DateTime::from_timestamp_millis(1_700_000_000_000).unwrap());
        let mut store = Store::with_clock(State::default(), clock.clone());
        let recorder = Recorder::default();
        store.observe(recorder.clone());
        (store, recorder, clock)
    }

    #[test]
    fn observers_see_committed_state() {
        let (mut store, recorder, _) = store();

        store.upsert_draft(values(), None);
        store.add_log(values());

        assert_eq!(
            *recorder.seen.borrow(),
            [(Change::Drafts, 1, 0), (Change::Logs, 1, 1)]
        );
    }

    #[test]
    fn noops_are_not_committed() {
        let (mut store, recorder, _) = store();
        let missing: RecordId = "missing".parse().unwrap();

        assert!(!store.remove_draft(&missing));
        assert!(!store.remove_log(&missing));
        assert!(!store.update_log(&missing, &FormPatch::default()));
        store.set_saving(false);
        store.set_current_draft(None);

        assert!(recorder.seen.borrow().is_empty());
    }

    #[test]
    fn timestamps_come_from_the_clock() {
        let (mut store, _, clock) = store();
        let id = store.upsert_draft(values(), None);
        let created = store.drafts().get(&id).unwrap().updated_at;

        clock.advance(TimeDelta::seconds(2));
        store.upsert_draft(values(), Some(id.clone()));
        let updated = store.drafts().get(&id).unwrap().updated_at;

        assert_eq!(updated - created, TimeDelta::seconds(2));
        assert_eq!(store.drafts().len(), 1);
        assert_eq!(store.add_log(values()).created_at, clock.now());
    }

    #[test]
    fn removing_dangling_current_selection_clears_it() {
        let (mut store, recorder, _) = store();
        let dangling: RecordId = "gone".parse().unwrap();
        store.set_current_draft(Some(dangling.clone()));

        assert!(!store.remove_draft(&dangling));
        assert_eq!(store.drafts().current_id(), None);
        assert_eq!(recorder.seen.borrow().len(), 2);
    }
}
