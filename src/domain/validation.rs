//! Field-level validation of service log form values.
//!
//! Validation never fails an operation outright: it produces a map of field
//! errors which callers surface next to the offending fields.

use std::{collections::BTreeMap, fmt, sync::LazyLock};

use regex::Regex;

use crate::domain::{FormValues, form::parse_date};

static DATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("date pattern is valid"));

/// A field of the service log form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    /// The provider identifier.
    ProviderId,
    /// The service order.
    ServiceOrder,
    /// The vehicle identifier.
    CarId,
    /// The odometer reading.
    Odometer,
    /// The engine hour reading.
    EngineHours,
    /// The start date.
    StartDate,
    /// The end date.
    EndDate,
    /// The service description.
    ServiceDescription,
}

impl Field {
    /// The field name as it appears in stored records.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ProviderId => "provider_id",
            Self::ServiceOrder => "service_order",
            Self::CarId => "car_id",
            Self::Odometer => "odometer",
            Self::EngineHours => "engine_hours",
            Self::StartDate => "start_date",
            Self::EndDate => "end_date",
            Self::ServiceDescription => "service_description",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The set of problems found in a form, keyed by field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: BTreeMap<Field, String>,
}

impl ValidationErrors {
    /// Records an error against `field`.
    ///
    /// Only the first error for each field is kept.
    pub fn add(&mut self, field: Field, message: impl Into<String>) {
        self.errors.entry(field).or_insert_with(|| message.into());
    }

    /// The error recorded against `field`, if any.
    #[must_use]
    pub fn get(&self, field: Field) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    /// Whether no errors were recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// The number of fields with errors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Iterates over `(field, message)` pairs in form order.
    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.errors.iter().map(|(&field, message)| (field, message.as_str()))
    }

    fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid form: ")?;
        for (i, (field, message)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{field}: {message}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Checks form values before they become a service log.
pub trait Validate {
    /// Validates `values`.
    ///
    /// # Errors
    ///
    /// Returns every field error found.
    fn validate(&self, values: &FormValues) -> Result<(), ValidationErrors>;
}

/// The standard service log rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormValidator;

impl Validate for FormValidator {
    fn validate(&self, values: &FormValues) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();

        required(&mut errors, Field::ProviderId, &values.provider_id, "Provider ID is required");
        required(&mut errors, Field::ServiceOrder, &values.service_order, "Service order is required");
        required(&mut errors, Field::CarId, &values.car_id, "Car ID is required");
        reading(&mut errors, Field::Odometer, values.odometer, "Odometer");
        reading(&mut errors, Field::EngineHours, values.engine_hours, "Engine hours");
        date(&mut errors, Field::StartDate, &values.start_date, "Start date");
        date(&mut errors, Field::EndDate, &values.end_date, "End date");
        required(
            &mut errors,
            Field::ServiceDescription,
            &values.service_description,
            "Service description is required",
        );

        if let (Some(start), Some(end)) = (valid_date(&values.start_date), valid_date(&values.end_date)) {
            if end < start {
                errors.add(Field::EndDate, "End date must be on or after start date");
            }
        }

        errors.into_result()
    }
}

fn required(errors: &mut ValidationErrors, field: Field, value: &str, message: &str) {
    if value.trim().is_empty() {
        errors.add(field, message);
    }
}

fn reading(errors: &mut ValidationErrors, field: Field, value: f64, label: &str) {
    if !value.is_finite() {
        errors.add(field, format!("{label} is required"));
    } else if value < 0.0 {
        errors.add(field, format!("{label} must be 0 or greater"));
    }
}

fn date(errors: &mut ValidationErrors, field: Field, value: &str, label: &str) {
    if value.trim().is_empty() {
        errors.add(field, format!("{label} is required"));
    } else if valid_date(value).is_none() {
        errors.add(field, format!("{label} must be YYYY-MM-DD"));
    }
}

/// Whether `value` is a `YYYY-MM-DD` calendar date.
#[must_use]
pub fn is_date(value: &str) -> bool {
    valid_date(value).is_some()
}

fn valid_date(value: &str) -> Option<chrono::NaiveDate> {
    if DATE_PATTERN.is_match(value) {
        parse_date(value)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ServiceType;

    fn valid() -> FormValues {
        FormValues {
            provider_id: "P1".to_string(),
            service_order: "SO-001".to_string(),
            car_id: "C1".to_string(),
            odometer: 1000.0,
            engine_hours: 50.0,
            start_date: "2024-01-01".to_string(),
            end_date: "2024-01-02".to_string(),
            kind: ServiceType::Planned,
            service_description: "Oil change".to_string(),
        }
    }

    fn errors(values: &FormValues) -> ValidationErrors {
        FormValidator.validate(values).unwrap_err()
    }

    #[test]
    fn accepts_valid_values() {
        assert_eq!(FormValidator.validate(&valid()), Ok(()));
    }

    #[test]
    fn rejects_missing_required_fields() {
        let mut values = valid();
        values.provider_id = String::new();
        values.service_order = "   ".to_string();

        let errors = errors(&values);
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.get(Field::ProviderId), Some("Provider ID is required"));
        assert_eq!(errors.get(Field::ServiceOrder), Some("Service order is required"));
    }

    #[test]
    fn rejects_end_date_before_start_date() {
        let mut values = valid();
        values.start_date = "2024-01-10".to_string();
        values.end_date = "2024-01-05".to_string();

        let message = errors(&values).get(Field::EndDate).unwrap().to_lowercase();
        assert!(message.contains("end date"));
    }

    #[test]
    fn accepts_end_date_equal_to_start_date() {
        let mut values = valid();
        values.end_date = values.start_date.clone();
        assert!(FormValidator.validate(&values).is_ok());
    }

    #[test]
    fn rejects_negative_readings() {
        let mut values = valid();
        values.odometer = -1.0;
        values.engine_hours = f64::NAN;

        let errors = errors(&values);
        assert_eq!(errors.get(Field::Odometer), Some("Odometer must be 0 or greater"));
        assert_eq!(errors.get(Field::EngineHours), Some("Engine hours is required"));
    }

    #[test]
    fn rejects_other_date_separators() {
        for bad in ["01/01/2024", "2024/01/01", "2024.01.01", "2024-1-1", "2024-02-30"] {
            let mut values = valid();
            values.start_date = bad.to_string();
            values.end_date = "2024-12-31".to_string();
            assert_eq!(
                errors(&values).get(Field::StartDate),
                Some("Start date must be YYYY-MM-DD"),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn date_check_requires_padded_calendar_dates() {
        assert!(is_date("2024-02-29"));
        assert!(!is_date("2023-02-29"));
        assert!(!is_date("2024-1-1"));
        assert!(!is_date(""));
    }

    #[test]
    fn display_lists_every_field() {
        let mut values = valid();
        values.car_id = String::new();
        values.service_description = String::new();
        assert_eq!(
            errors(&values).to_string(),
            "invalid form: car_id: Car ID is required; service_description: Service description is required"
        );
    }
}
