//! Error types for the library half of the crate.
//!
//! Only the fallible setup paths (opening the store, running the schema
//! lifecycle, loading configuration) report through this type. The contact
//! store's day-to-day operations never return it; they log and degrade.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// The database file could not be opened or created.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("database query failed: {0}")]
    Database(#[from] rusqlite::Error),

    /// The stored or requested schema version is unusable.
    #[error("schema version error: {message}")]
    SchemaVersion { message: String },

    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not locate home directory")]
    HomeDirectoryMissing,

    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    #[error("invalid configuration: {message}")]
    ConfigValidation { message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    #[must_use]
    pub fn config_validation(message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn schema_version(message: impl Into<String>) -> Self {
        Self::SchemaVersion {
            message: message.into(),
        }
    }
}
