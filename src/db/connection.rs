use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use rusqlite::Connection;
use tracing::{debug, info, warn};

use super::schema::{prepare_schema, SchemaAction, SCHEMA_VERSION};
use crate::error::{Error, Result};

/// Durable home of every contact. One long-lived connection sits behind a
/// mutex; each operation takes the lock for its own duration and releases it
/// when the guard drops.
#[derive(Debug)]
pub struct ContactStore {
    path: PathBuf,
    schema_version: u32,
    conn: Mutex<Connection>,
}

impl ContactStore {
    /// Open (or create) the database at `path` with the current schema version.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_version(path, SCHEMA_VERSION)
    }

    /// Open the database expecting `version`. A file stored under any other
    /// version loses its rows; see [`prepare_schema`].
    pub fn open_with_version(path: impl AsRef<Path>, version: u32) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("opening database at {}", path.display());
        let mut conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        match prepare_schema(&mut conn, version)? {
            SchemaAction::Recreated { from } => warn!(
                from,
                to = version,
                "existing contacts were discarded by the schema upgrade"
            ),
            action => debug!(?action, "schema ready"),
        }

        info!("database opened at {}", path.display());
        Ok(Self {
            path,
            schema_version: version,
            conn: Mutex::new(conn),
        })
    }

    /// Fresh store that lives only as long as the value. Used by tests.
    pub fn open_in_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;
        prepare_schema(&mut conn, SCHEMA_VERSION)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            schema_version: SCHEMA_VERSION,
            conn: Mutex::new(conn),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn schema_version(&self) -> u32 {
        self.schema_version
    }

    /// Borrow the connection for one operation. `None` when a previous holder
    /// panicked mid-operation; callers treat that as an unavailable database.
    pub(super) fn connection(&self) -> Option<MutexGuard<'_, Connection>> {
        match self.conn.lock() {
            Ok(guard) => Some(guard),
            Err(_) => {
                warn!("database handle unavailable: connection lock poisoned");
                None
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn poison(&self) {
        let conn = &self.conn;
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = conn.lock();
            panic!("poisoning the contact store for a test");
        }));
    }
}
