//! The draft slice of the logbook state.
//!
//! The [`DraftStore`] keeps drafts in insertion order, tracks which draft is
//! loaded into the form and carries the save status shown next to the form.
//! It knows nothing about clocks or storage: callers pass the current time in.

use chrono::{DateTime, TimeDelta, Utc};
use tracing::instrument;

use crate::domain::{Draft, FormValues, RecordId};

/// Prefix of generated draft identifiers.
pub const DRAFT_ID_PREFIX: &str = "draft";

/// An ordered collection of drafts plus selection and save status.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DraftStore {
    items: Vec<Draft>,
    current: Option<RecordId>,
    saving: bool,
    last_saved_at: Option<DateTime<Utc>>,
}

impl DraftStore {
    /// Rebuilds a store from previously saved parts.
    ///
    /// The saving flag always starts cleared.
    #[must_use]
    pub const fn from_parts(
        items: Vec<Draft>,
        current: Option<RecordId>,
        last_saved_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            items,
            current,
            saving: false,
            last_saved_at,
        }
    }

    /// Saves form values as a draft.
    ///
    /// If `id` names an existing draft, that draft's values are replaced in
    /// place and its position is kept. Otherwise a new draft is appended,
    /// using `id` if one was given or a fresh identifier if not, and becomes
    /// the current draft.
    ///
    /// Either way the save status is updated: `last_saved_at` is set and the
    /// saving flag cleared. Readings that are not finite numbers are stored as
    /// zero.
    ///
    /// The stored `updated_at` never goes backwards for a given draft: if
    /// `now` is not later than the previous value, the previous value plus one
    /// millisecond is used instead.
    #[instrument(level = "debug", skip(self, values))]
    pub fn upsert(&mut self, values: FormValues, id: Option<RecordId>, now: DateTime<Utc>) -> &Draft {
        let values = values.normalized();
        let existing = id
            .as_ref()
            .and_then(|id| self.items.iter().position(|draft| &draft.id == id));

        let (index, updated_at) = if let Some(index) = existing {
            let draft = &mut self.items[index];
            let updated_at = after(draft.updated_at, now);
            draft.values = values;
            draft.updated_at = updated_at;
            tracing::debug!(id = %draft.id, "updated draft");
            (index, updated_at)
        } else {
            let id = id.unwrap_or_else(|| RecordId::generate(DRAFT_ID_PREFIX));
            tracing::debug!(%id, "created draft");
            self.current = Some(id.clone());
            self.items.push(Draft {
                id,
                values,
                updated_at: now,
            });
            (self.items.len() - 1, now)
        };

        self.last_saved_at = Some(updated_at);
        self.saving = false;

        &self.items[index]
    }

    /// Deletes a draft.
    ///
    /// If the draft was the current draft, the selection is cleared. Returns
    /// whether a draft was removed.
    pub fn remove(&mut self, id: &RecordId) -> bool {
        let before = self.items.len();
        self.items.retain(|draft| &draft.id != id);

        if self.current.as_ref() == Some(id) {
            self.current = None;
        }

        self.items.len() != before
    }

    /// Deletes every draft and resets the selection and last save time.
    pub fn clear(&mut self) {
        self.items.clear();
        self.current = None;
        self.last_saved_at = None;
    }

    /// Selects the draft loaded into the form.
    ///
    /// The identifier is not checked against the stored drafts.
    pub fn set_current(&mut self, id: Option<RecordId>) {
        self.current = id;
    }

    /// Marks a save as in flight (or not).
    pub const fn set_saving(&mut self, saving: bool) {
        self.saving = saving;
    }

    /// Overrides the time of the last completed save.
    pub const fn set_last_saved_at(&mut self, at: Option<DateTime<Utc>>) {
        self.last_saved_at = at;
    }

    /// The drafts, oldest first.
    #[must_use]
    pub fn items(&self) -> &[Draft] {
        &self.items
    }

    /// Looks up a draft by identifier.
    #[must_use]
    pub fn get(&self, id: &RecordId) -> Option<&Draft> {
        self.items.iter().find(|draft| &draft.id == id)
    }

    /// The identifier of the current draft, if any.
    #[must_use]
    pub const fn current_id(&self) -> Option<&RecordId> {
        self.current.as_ref()
    }

    /// The current draft, if one is selected and still exists.
    #[must_use]
    pub fn current(&self) -> Option<&Draft> {
        self.current.as_ref().and_then(|id| self.get(id))
    }

    /// Whether a save is in flight.
    #[must_use]
    pub const fn is_saving(&self) -> bool {
        self.saving
    }

    /// When a draft was last saved.
    #[must_use]
    pub const fn last_saved_at(&self) -> Option<DateTime<Utc>> {
        self.last_saved_at
    }

    /// The number of drafts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether there are no drafts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

fn after(previous: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
    if now > previous {
        now
    } else {
        previous + TimeDelta::milliseconds(1)
    }
}
