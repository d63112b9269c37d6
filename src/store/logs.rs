use chrono::{DateTime, Utc};
use tracing::instrument;

use crate::domain::{FormPatch, FormValues, RecordId, ServiceLog};

/// Prefix of generated service log identifiers.
pub const LOG_ID_PREFIX: &str = "log";

/// An ordered collection of submitted service logs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogStore {
    logs: Vec<ServiceLog>,
}

impl LogStore {
    /// Rebuilds a store from previously saved logs.
    #[must_use]
    pub const fn from_logs(logs: Vec<ServiceLog>) -> Self {
        Self { logs }
    }

    /// Appends a new log built from `values`.
    ///
    /// Readings are coerced to finite numbers and the log is given a fresh
    /// identifier.
    #[instrument(level = "debug", skip(self, values))]
    pub fn add(&mut self, values: FormValues, now: DateTime<Utc>) -> &ServiceLog {
        let log = ServiceLog {
            id: RecordId::generate(LOG_ID_PREFIX),
            values: values.normalized(),
            created_at: now,
        };
        tracing::debug!(id = %log.id, "added service log");
        self.logs.push(log);
        &self.logs[self.logs.len() - 1]
    }

    /// Merges `patch` into the log with the given identifier.
    ///
    /// Returns `false`, leaving the store untouched, if no such log exists.
    pub fn update(&mut self, id: &RecordId, patch: &FormPatch) -> bool {
        let Some(log) = self.logs.iter_mut().find(|log| &log.id == id) else {
            tracing::debug!(%id, "no service log to update");
            return false;
        };
        patch.apply_to(&mut log.values);
        true
    }

    /// Deletes the log with the given identifier.
    ///
    /// Returns whether a log was removed.
    pub fn remove(&mut self, id: &RecordId) -> bool {
        let before = self.logs.len();
        self.logs.retain(|log| &log.id != id);
        self.logs.len() != before
    }

    /// Looks up a log by identifier.
    #[must_use]
    pub fn get(&self, id: &RecordId) -> Option<&ServiceLog> {
        self.logs.iter().find(|log| &log.id == id)
    }

    /// The logs, oldest first.
    #[must_use]
    pub fn as_slice(&self) -> &[ServiceLog] {
        &self.logs
    }

    /// The number of logs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.logs.len()
    }

    /// Whether there are no logs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.logs.is_empty()
    }
}
