//! Vehicle service logbook
//!
//! Service logs are entered through a form whose in-progress values are
//! autosaved as drafts. Drafts and submitted logs are kept in a single
//! versioned snapshot that is rehydrated when the logbook is opened.

pub mod domain;
pub use domain::{Config, Draft, FormPatch, FormValues, RecordId, ServiceLog, ServiceType};

pub mod store;
pub use store::{State, Store};

pub mod autosave;
pub use autosave::AutosaveScheduler;

pub mod storage;
pub use storage::{FileStorage, PersistenceGateway};

pub mod session;
pub use session::{Confirmation, Session};
