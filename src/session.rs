//! The logbook as seen by its user interface.
//!
//! A [`Session`] owns the store, wires persistence into it and exposes the
//! explicit actions a user can take. Each action runs synchronously against
//! the store; only form editing goes through the
//! [`AutosaveScheduler`](crate::autosave::AutosaveScheduler).

use std::path::Path;

use tracing::instrument;

use crate::{
    autosave::AutosaveScheduler,
    domain::{Config, FormPatch, FormValidator, FormValues, RecordId, ServiceLog, Validate, ValidationErrors},
    storage::{FileStorage, KeyValueStorage, PersistenceGateway},
    store::{State, Store},
};

/// The question asked before a service log is deleted.
pub const DELETE_LOG_PROMPT: &str = "Delete this service log?";

/// Asks the user to confirm a destructive action.
pub trait Confirmation {
    /// Returns `true` if the user agreed to `prompt`.
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirmation for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// An open logbook.
#[derive(Debug)]
pub struct Session<V = FormValidator> {
    store: Store,
    config: Config,
    validator: V,
}

impl Session {
    /// Opens the logbook stored in `root`.
    ///
    /// The stored snapshot is rehydrated before this returns. A missing or
    /// unreadable snapshot leaves the logbook empty.
    #[must_use]
    pub fn open(root: &Path, config: Config) -> Self {
        Self::with_storage(FileStorage::new(root.to_path_buf()), config)
    }

    /// Opens the logbook held in `storage`.
    #[must_use]
    pub fn with_storage(storage: impl KeyValueStorage + 'static, config: Config) -> Self {
        let mut gateway = PersistenceGateway::new(storage, config.storage_key());
        let state = gateway.rehydrate();
        let mut store = Store::new(state);
        store.observe(gateway);
        Self::with_store(store, config)
    }

    /// Wraps an existing store. Nothing is persisted unless the store already
    /// has a gateway installed.
    #[must_use]
    pub const fn with_store(store: Store, config: Config) -> Self {
        Self {
            store,
            config,
            validator: FormValidator,
        }
    }

    /// An empty logbook that is never persisted.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::with_store(Store::new(State::default()), Config::default())
    }
}

impl<V: Validate> Session<V> {
    /// Replaces the rules used to check submitted and edited logs.
    pub fn with_validator<W: Validate>(self, validator: W) -> Session<W> {
        Session {
            store: self.store,
            config: self.config,
            validator,
        }
    }

    /// The logbook state.
    #[must_use]
    pub const fn store(&self) -> &Store {
        &self.store
    }

    /// Mutable access to the store, for the autosave scheduler.
    pub const fn store_mut(&mut self) -> &mut Store {
        &mut self.store
    }

    /// The configuration the session was opened with.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Checks form values against the session's rules. Nothing is changed.
    ///
    /// # Errors
    ///
    /// Returns every field error found.
    pub fn validate(&self, values: &FormValues) -> Result<(), ValidationErrors> {
        self.validator.validate(values)
    }

    /// A scheduler for autosaving a form into this logbook.
    #[must_use]
    pub fn autosave(&self) -> AutosaveScheduler {
        AutosaveScheduler::new(self.config.autosave_delay())
    }

    /// Saves `values` as a new draft and selects it.
    ///
    /// Unlike autosave, this always creates a draft, even if the form is
    /// blank or another draft is selected.
    #[instrument(level = "debug", skip_all)]
    pub fn create_draft(&mut self, values: FormValues) -> RecordId {
        self.store.set_saving(true);
        let id = self.store.upsert_draft(values, None);
        tracing::info!(%id, "saved draft");
        id
    }

    /// Selects a draft, returning the values to load into the form.
    ///
    /// Returns `None`, and changes nothing, if the draft does not exist.
    #[instrument(level = "debug", skip(self))]
    pub fn select_draft(&mut self, id: &RecordId) -> Option<FormValues> {
        let values = self.store.drafts().get(id)?.values.clone();
        self.store.set_current_draft(Some(id.clone()));
        Some(values)
    }

    /// Deletes a draft.
    ///
    /// Returns `true` if it was the current draft, in which case the form
    /// should be reset.
    #[instrument(level = "debug", skip(self))]
    pub fn delete_draft(&mut self, id: &RecordId) -> bool {
        let was_current = self.store.drafts().current_id() == Some(id);
        if self.store.remove_draft(id) {
            tracing::info!(%id, "deleted draft");
        }
        was_current
    }

    /// Deletes every draft.
    #[instrument(level = "debug", skip(self))]
    pub fn clear_drafts(&mut self) {
        let count = self.store.drafts().len();
        self.store.clear_drafts();
        tracing::info!(count, "cleared drafts");
    }

    /// Records `values` as a new service log.
    ///
    /// The current draft is deselected but kept.
    ///
    /// # Errors
    ///
    /// Returns the field errors if the values are not valid. Nothing is
    /// changed in that case.
    #[instrument(level = "debug", skip_all)]
    pub fn submit_log(&mut self, values: FormValues) -> Result<ServiceLog, ValidationErrors> {
        self.validator.validate(&values)?;
        let log = self.store.add_log(values);
        self.store.set_current_draft(None);
        tracing::info!(id = %log.id, "created service log");
        Ok(log)
    }

    /// Replaces the values of a service log.
    ///
    /// Returns `false` if no log has that identifier.
    ///
    /// # Errors
    ///
    /// Returns the field errors if the values are not valid. Nothing is
    /// changed in that case.
    #[instrument(level = "debug", skip(self, values))]
    pub fn edit_log(&mut self, id: &RecordId, values: FormValues) -> Result<bool, ValidationErrors> {
        self.validator.validate(&values)?;
        let updated = self.store.update_log(id, &FormPatch::from(values.normalized()));
        if updated {
            tracing::info!(%id, "updated service log");
        }
        Ok(updated)
    }

    /// Deletes a service log once the user confirms.
    ///
    /// Returns whether the log was deleted. The user is not asked about a
    /// log that does not exist.
    #[instrument(level = "debug", skip(self, confirmation))]
    pub fn delete_log(&mut self, id: &RecordId, confirmation: &dyn Confirmation) -> bool {
        if self.store.logs().get(id).is_none() {
            return false;
        }
        if !confirmation.confirm(DELETE_LOG_PROMPT) {
            tracing::debug!(%id, "deletion declined");
            return false;
        }
        let removed = self.store.remove_log(id);
        tracing::info!(%id, "deleted service log");
        removed
    }
}
