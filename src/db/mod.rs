pub mod sqlite;
pub mod repository;
pub mod export;
pub mod store;

pub use sqlite::*;
pub use repository::*;
pub use export::*;
pub use store::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Session result could not be (de)serialized: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid enum value for {field}: {value}")]
    InvalidEnum { field: String, value: String },

    #[error("Invalid {field}: {value}")]
    InvalidId { field: &'static str, value: String },

    #[error("Migration failed at version {version}: {reason}")]
    MigrationFailed { version: i64, reason: String },

    #[error("Internal lock error")]
    LockPoisoned,
}
