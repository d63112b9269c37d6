//! The serialized form of the logbook state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    domain::{Draft, RecordId, ServiceLog},
    store::{DraftStore, LogStore, State},
};

/// Everything about the logbook that survives a restart.
///
/// The saving flag is transient and is not part of the snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "SnapshotVersion", into = "SnapshotVersion")]
pub struct Snapshot {
    drafts: Vec<Draft>,
    current_draft_id: Option<RecordId>,
    last_saved_at: Option<DateTime<Utc>>,
    service_logs: Vec<ServiceLog>,
}

impl Snapshot {
    /// Captures the persistent parts of `state`.
    #[must_use]
    pub fn capture(state: &State) -> Self {
        Self {
            drafts: state.drafts.items().to_vec(),
            current_draft_id: state.drafts.current_id().cloned(),
            last_saved_at: state.drafts.last_saved_at(),
            service_logs: state.logs.as_slice().to_vec(),
        }
    }

    /// Rebuilds the state the snapshot was captured from.
    #[must_use]
    pub fn into_state(self) -> State {
        State {
            drafts: DraftStore::from_parts(self.drafts, self.current_draft_id, self.last_saved_at),
            logs: LogStore::from_logs(self.service_logs),
        }
    }

    /// Serializes the snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if a value cannot be represented as JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Deserializes a snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if `json` is malformed or is not a known snapshot
    /// version.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct DraftsV1 {
    #[serde(default)]
    items: Vec<Draft>,
    #[serde(default)]
    current_draft_id: Option<RecordId>,
    #[serde(default)]
    last_saved_at: Option<DateTime<Utc>>,
}

/// The serialized versions of the snapshot.
///
/// New versions are added alongside the old ones so existing stored data can
/// still be read.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum SnapshotVersion {
    #[serde(rename = "1")]
    V1 {
        #[serde(default)]
        drafts: DraftsV1,
        #[serde(default)]
        service_logs: Vec<ServiceLog>,
    },
}

impl From<SnapshotVersion> for Snapshot {
    fn from(version: SnapshotVersion) -> Self {
        match version {
            SnapshotVersion::V1 {
                drafts:
                    DraftsV1 {
                        items,
                        current_draft_id,
                        last_saved_at,
                    },
                service_logs,
            } => Self {
                drafts: items,
                current_draft_id,
                last_saved_at,
                service_logs,
            },
        }
    }
}

impl From<Snapshot> for SnapshotVersion {
    fn from(snapshot: Snapshot) -> Self {
        let Snapshot {
            drafts,
            current_draft_id,
            last_saved_at,
            service_logs,
        } = snapshot;
        Self::V1 {
            drafts: DraftsV1 {
                items: drafts,
                current_draft_id,
                last_saved_at,
            },
            service_logs,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::domain::FormValues;

    fn state() -> State {
        let now = DateTime::from_timestamp_millis(1_700_000_000_000).unwrap();
        let mut values = FormValues::blank(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        values.provider_id = "P1".to_string();

        let mut state = State::default();
        state.drafts.upsert(values.clone(), None, now);
        state.drafts.set_saving(true);
        state.logs.add(values, now);
        state
    }

    #[test]
    fn restores_everything_but_the_saving_flag() {
        let state = state();
        let json = Snapshot::capture(&state).to_json().unwrap();

        let restored = Snapshot::from_json(&json).unwrap().into_state();

        assert_eq!(restored.drafts.items(), state.drafts.items());
        assert_eq!(restored.drafts.current_id(), state.drafts.current_id());
        assert_eq!(restored.drafts.last_saved_at(), state.drafts.last_saved_at());
        assert_eq!(restored.logs, state.logs);
        assert!(!restored.drafts.is_saving());
    }

    #[test]
    fn is_tagged_with_version() {
        let json: serde_json::Value =
            serde_json::from_str(&Snapshot::capture(&state()).to_json().unwrap()).unwrap();

        assert_eq!(json["_version"], "1");
        assert_eq!(json["drafts"]["items"].as_array().unwrap().len(), 1);
        assert_eq!(json["service_logs"].as_array().unwrap().len(), 1);
        assert!(json["drafts"].get("saving").is_none());
    }

    #[test]
    fn missing_slices_default_to_empty() {
        let state = Snapshot::from_json(r#"{"_version":"1"}"#).unwrap().into_state();
        assert_eq!(state, State::default());
    }

    #[test]
    fn unknown_version_is_rejected() {
        assert!(Snapshot::from_json(r#"{"_version":"99"}"#).is_err());
        assert!(Snapshot::from_json("not json").is_err());
    }
}
