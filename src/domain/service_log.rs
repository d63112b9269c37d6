use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{FormValues, RecordId, ServiceType};

/// A submitted, finalised service record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceLog {
    /// Stable identifier of the log.
    pub id: RecordId,
    /// The submitted values.
    #[serde(flatten)]
    pub values: FormValues,
    /// When the log was submitted.
    pub created_at: DateTime<Utc>,
}

/// Criteria for narrowing a list of service logs.
///
/// Every criterion is optional; an empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogFilter {
    /// Case-insensitive text matched against the provider, service order, car
    /// and description.
    pub search: Option<String>,
    /// Earliest start date (inclusive, `YYYY-MM-DD`).
    pub from: Option<String>,
    /// Latest start date (inclusive, `YYYY-MM-DD`).
    pub to: Option<String>,
    /// Only logs of this service type.
    pub kind: Option<ServiceType>,
}

impl LogFilter {
    /// Whether `log` satisfies every criterion.
    #[must_use]
    pub fn matches(&self, log: &ServiceLog) -> bool {
        let values = &log.values;

        if let Some(query) = self.query() {
            let hit = [
                &values.provider_id,
                &values.service_order,
                &values.car_id,
                &values.service_description,
            ]
            .iter()
            .any(|field| field.to_lowercase().contains(&query));
            if !hit {
                return false;
            }
        }

        // ISO dates order lexicographically
        if let Some(from) = non_empty(self.from.as_deref()) {
            if values.start_date.as_str() < from {
                return false;
            }
        }
        if let Some(to) = non_empty(self.to.as_deref()) {
            if values.start_date.as_str() > to {
                return false;
            }
        }

        self.kind.is_none_or(|kind| values.kind == kind)
    }

    /// Returns the logs matching this filter, preserving order.
    pub fn apply<'a>(&self, logs: &'a [ServiceLog]) -> impl Iterator<Item = &'a ServiceLog> {
        logs.iter().filter(|log| self.matches(log))
    }

    fn query(&self) -> Option<String> {
        non_empty(self.search.as_deref()).map(str::to_lowercase)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
