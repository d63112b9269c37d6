use sha2::{Digest, Sha256};
use tracing::instrument;

use crate::{
    storage::{KeyValueStorage, Snapshot, StorageError},
    store::{Change, Observer, State},
};

/// Errors raised while loading or saving the logbook snapshot.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    /// The storage backend failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
    /// The snapshot could not be encoded, or the stored value is not a
    /// snapshot.
    #[error("invalid logbook snapshot")]
    Json(#[from] serde_json::Error),
}

/// Writes the logbook state to a [`KeyValueStorage`] and reads it back.
///
/// Installed as an [`Observer`], the gateway writes a fresh snapshot after
/// every committed mutation. Failures are logged and otherwise ignored; the
/// in-memory state is never rolled back.
#[derive(Debug)]
pub struct PersistenceGateway<S> {
    storage: S,
    key: String,
    last_digest: Option<String>,
}

impl<S: KeyValueStorage> PersistenceGateway<S> {
    /// A gateway storing the snapshot under `key`.
    pub fn new(storage: S, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
            last_digest: None,
        }
    }

    /// Reads the stored snapshot.
    ///
    /// Returns `None` if nothing has been stored yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage cannot be read or the stored value is
    /// not a valid snapshot.
    pub fn load(&mut self) -> Result<Option<State>, PersistError> {
        let Some(json) = self.storage.read(&self.key)? else {
            return Ok(None);
        };
        let snapshot = Snapshot::from_json(&json)?;
        self.last_digest = Some(digest(&json));
        Ok(Some(snapshot.into_state()))
    }

    /// Reads the stored snapshot, falling back to an empty state.
    ///
    /// A missing, unreadable or corrupt snapshot is not an error at startup.
    #[instrument(level = "debug", skip(self), fields(key = %self.key))]
    pub fn rehydrate(&mut self) -> State {
        match self.load() {
            Ok(Some(state)) => {
                tracing::debug!(
                    drafts = state.drafts.len(),
                    logs = state.logs.len(),
                    "rehydrated logbook"
                );
                state
            }
            Ok(None) => {
                tracing::debug!("no stored logbook, starting empty");
                State::default()
            }
            Err(e) => {
                tracing::warn!("failed to rehydrate logbook, starting empty: {e}");
                State::default()
            }
        }
    }

    /// Writes a snapshot of `state`.
    ///
    /// Returns `false` if the snapshot is identical to the last one written
    /// or read, in which case nothing is written.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be encoded or written.
    pub fn save(&mut self, state: &State) -> Result<bool, PersistError> {
        let json = Snapshot::capture(state).to_json()?;
        let digest = digest(&json);
        if self.last_digest.as_deref() == Some(digest.as_str()) {
            return Ok(false);
        }

        self.storage.write(&self.key, &json)?;
        self.last_digest = Some(digest);
        Ok(true)
    }
}

impl<S: KeyValueStorage> Observer for PersistenceGateway<S> {
    fn committed(&mut self, change: Change, state: &State) {
        match self.save(state) {
            Ok(true) => tracing::trace!(?change, "persisted logbook"),
            Ok(false) => {}
            Err(e) => tracing::error!(?change, "failed to persist logbook: {e}"),
        }
    }
}

fn digest(json: &str) -> String {
    let hash = Sha256::digest(json.as_bytes());
    format!("{hash:x}")
}
