use std::{fmt, str::FromStr};

use chrono::{Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Format of every date carried by the form.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// The kind of service performed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceType {
    /// Scheduled maintenance.
    #[default]
    Planned,
    /// Unscheduled but non-urgent work.
    Unplanned,
    /// Breakdown or safety-critical repair.
    Emergency,
}

impl ServiceType {
    /// Every service type, in display order.
    pub const ALL: [Self; 3] = [Self::Planned, Self::Unplanned, Self::Emergency];

    /// The lowercase name used in storage and on the command line.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Planned => "planned",
            Self::Unplanned => "unplanned",
            Self::Emergency => "emergency",
        }
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceType {
    type Err = InvalidServiceTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| InvalidServiceTypeError(s.to_string()))
    }
}

/// Error returned when a service type name is not recognised.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("Invalid service type '{0}': expected one of planned, unplanned, emergency")]
pub struct InvalidServiceTypeError(String);

/// The values held by the service log form.
///
/// Drafts capture these values as typed, so nothing here is validated: text
/// fields may be blank and dates may be malformed until the form is submitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormValues {
    /// Identifier of the service provider.
    pub provider_id: String,
    /// The provider's work order reference.
    pub service_order: String,
    /// Identifier of the serviced vehicle.
    pub car_id: String,
    /// Odometer reading at the time of service.
    pub odometer: f64,
    /// Engine hour meter reading at the time of service.
    pub engine_hours: f64,
    /// First day of the service (`YYYY-MM-DD`).
    pub start_date: String,
    /// Last day of the service (`YYYY-MM-DD`).
    pub end_date: String,
    /// The kind of service.
    #[serde(rename = "type")]
    pub kind: ServiceType,
    /// Free text description of the work done.
    pub service_description: String,
}

impl FormValues {
    /// A fresh form starting on `today` and ending the day after.
    #[must_use]
    pub fn blank(today: NaiveDate) -> Self {
        let start_date = today.format(DATE_FORMAT).to_string();
        let end_date = add_one_day(&start_date).unwrap_or_else(|| start_date.clone());
        Self {
            provider_id: String::new(),
            service_order: String::new(),
            car_id: String::new(),
            odometer: 0.0,
            engine_hours: 0.0,
            start_date,
            end_date,
            kind: ServiceType::Planned,
            service_description: String::new(),
        }
    }

    fn text_fields(&self) -> [&str; 6] {
        [
            &self.provider_id,
            &self.service_order,
            &self.car_id,
            &self.start_date,
            &self.end_date,
            &self.service_description,
        ]
    }

    /// Whether the form holds nothing worth saving.
    ///
    /// A form is trivial when every text field is blank after trimming and
    /// neither reading is greater than zero.
    #[must_use]
    pub fn is_trivial(&self) -> bool {
        self.text_fields().iter().all(|field| field.trim().is_empty())
            && !(self.odometer > 0.0)
            && !(self.engine_hours > 0.0)
    }

    /// Changes the start date, moving the end date to the following day.
    ///
    /// Setting the same start date again leaves the end date alone, so an end
    /// date chosen by hand survives unrelated edits. If the new start date is
    /// not a calendar date the end date is left unchanged.
    pub fn set_start_date(&mut self, start_date: String) {
        if start_date.is_empty() || start_date == self.start_date {
            self.start_date = start_date;
            return;
        }
        if let Some(end_date) = add_one_day(&start_date) {
            self.end_date = end_date;
        }
        self.start_date = start_date;
    }

    /// Returns the values with readings coerced to finite numbers.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.odometer = finite_or_zero(self.odometer);
        self.engine_hours = finite_or_zero(self.engine_hours);
        self
    }
}

impl Default for FormValues {
    fn default() -> Self {
        Self::blank(Utc::now().date_naive())
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

/// A partial set of form values.
///
/// Fields left as `None` are not touched when the patch is applied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormPatch {
    /// New provider identifier.
    pub provider_id: Option<String>,
    /// New service order.
    pub service_order: Option<String>,
    /// New vehicle identifier.
    pub car_id: Option<String>,
    /// New odometer reading.
    pub odometer: Option<f64>,
    /// New engine hour reading.
    pub engine_hours: Option<f64>,
    /// New start date.
    pub start_date: Option<String>,
    /// New end date.
    pub end_date: Option<String>,
    /// New service type.
    pub kind: Option<ServiceType>,
    /// New description.
    pub service_description: Option<String>,
}

impl FormPatch {
    /// Whether the patch changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Writes every present field into `values`.
    pub fn apply_to(&self, values: &mut FormValues) {
        if let Some(provider_id) = &self.provider_id {
            values.provider_id.clone_from(provider_id);
        }
        if let Some(service_order) = &self.service_order {
            values.service_order.clone_from(service_order);
        }
        if let Some(car_id) = &self.car_id {
            values.car_id.clone_from(car_id);
        }
        if let Some(odometer) = self.odometer {
            values.odometer = finite_or_zero(odometer);
        }
        if let Some(engine_hours) = self.engine_hours {
            values.engine_hours = finite_or_zero(engine_hours);
        }
        if let Some(start_date) = &self.start_date {
            values.start_date.clone_from(start_date);
        }
        if let Some(end_date) = &self.end_date {
            values.end_date.clone_from(end_date);
        }
        if let Some(kind) = self.kind {
            values.kind = kind;
        }
        if let Some(service_description) = &self.service_description {
            values.service_description.clone_from(service_description);
        }
    }
}

impl From<FormValues> for FormPatch {
    fn from(values: FormValues) -> Self {
        Self {
            provider_id: Some(values.provider_id),
            service_order: Some(values.service_order),
            car_id: Some(values.car_id),
            odometer: Some(values.odometer),
            engine_hours: Some(values.engine_hours),
            start_date: Some(values.start_date),
            end_date: Some(values.end_date),
            kind: Some(values.kind),
            service_description: Some(values.service_description),
        }
    }
}

/// Parses a reading typed into a numeric field.
///
/// Blank input reads as zero. Returns `None` if the text is not a finite
/// number.
#[must_use]
pub fn parse_reading(text: &str) -> Option<f64> {
    let text = text.trim();
    if text.is_empty() {
        return Some(0.0);
    }
    text.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Parses a `YYYY-MM-DD` calendar date.
#[must_use]
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text, DATE_FORMAT).ok()
}

/// Returns the calendar day after `date`, or `None` if `date` is not a
/// `YYYY-MM-DD` calendar date.
#[must_use]
pub fn add_one_day(date: &str) -> Option<String> {
    parse_date(date)?
        .checked_add_days(Days::new(1))
        .map(|next| next.format(DATE_FORMAT).to_string())
}
