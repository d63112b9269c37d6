use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{FormValues, RecordId};

/// An unsubmitted, autosaved copy of the service log form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Draft {
    /// Stable identifier of the draft.
    pub id: RecordId,
    /// The form values as last saved.
    #[serde(flatten)]
    pub values: FormValues,
    /// When the draft was last written.
    pub updated_at: DateTime<Utc>,
}

impl Draft {
    /// A short human readable label, e.g. `SO-1 – P1`.
    #[must_use]
    pub fn label(&self) -> String {
        let order = non_blank_or(&self.values.service_order, "Untitled");
        let provider = non_blank_or(&self.values.provider_id, "—");
        format!("{order} – {provider}")
    }
}

fn non_blank_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.trim().is_empty() { fallback } else { value }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn draft(service_order: &str, provider_id: &str) -> Draft {
        let mut values = FormValues::blank(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        values.service_order = service_order.to_string();
        values.provider_id = provider_id.to_string();
        Draft {
            id: RecordId::generate("draft"),
            values,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn label_uses_order_and_provider() {
        assert_eq!(draft("SO-1", "P1").label(), "SO-1 – P1");
    }

    #[test]
    fn label_falls_back_for_blank_fields() {
        assert_eq!(draft("", " ").label(), "Untitled – —");
    }

    #[test]
    fn values_are_flattened_when_serialized() {
        let json = serde_json::to_value(draft("SO-1", "P1")).unwrap();
        assert_eq!(json["service_order"], "SO-1");
        assert!(json["id"].as_str().unwrap().starts_with("draft-"));
    }
}
