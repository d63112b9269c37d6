//! Durable storage for the logbook.
//!
//! The whole logbook is stored as one versioned [`Snapshot`] under a single
//! key. The [`PersistenceGateway`] writes a new snapshot after every committed
//! store mutation and reads it back at startup.

mod backend;
mod gateway;
mod snapshot;

pub use backend::{FileStorage, KeyValueStorage, MemoryStorage, StorageError};
pub use gateway::{PersistError, PersistenceGateway};
pub use snapshot::Snapshot;
