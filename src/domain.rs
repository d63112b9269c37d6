//! Domain models for the service logbook.
//!
//! This module contains the core domain types: form values, drafts, service
//! logs, their identifiers, validation rules and configuration.

mod config;
pub use config::Config;

mod draft;
pub use draft::Draft;

/// Form values, partial updates and date helpers.
pub mod form;
pub use form::{FormPatch, FormValues, ServiceType};

/// Unique identifier generation.
pub mod id;
pub use id::{InvalidIdError, RecordId};

mod service_log;
pub use service_log::{LogFilter, ServiceLog};

pub mod validation;
pub use validation::{FormValidator, Validate, ValidationErrors};
