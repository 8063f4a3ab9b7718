//! Table definition and the version lifecycle of the contacts database.
//!
//! The stored generation lives in SQLite's `user_version` pragma. A mismatch
//! with a recorded version drops the table and recreates it empty; rows from
//! the previous generation are not carried over. A file with no recorded
//! version keeps whatever `contato` table it already has.

use rusqlite::Connection;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};

/// Schema generation the application expects today.
pub const SCHEMA_VERSION: u32 = 2;

pub const TABLE_NAME: &str = "contato";

pub const CREATE_TABLE: &str = r"
CREATE TABLE contato (
    id INTEGER NOT NULL,
    nome TEXT NOT NULL,
    telefone TEXT NOT NULL,
    PRIMARY KEY(id AUTOINCREMENT)
)
";

pub const DROP_TABLE: &str = "DROP TABLE IF EXISTS contato";

/// What `prepare_schema` did to bring the file up to the expected version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaAction {
    /// Fresh file: the table was created.
    Created,
    /// No version was recorded but the table already existed; its rows were
    /// kept and the version stamped.
    Adopted,
    /// Versions matched; nothing touched.
    Unchanged,
    /// Versions differed; the table was dropped and recreated empty.
    Recreated { from: u32 },
}

/// Bring the connection's schema to `expected`.
pub fn prepare_schema(conn: &mut Connection, expected: u32) -> Result<SchemaAction> {
    if expected == 0 {
        return Err(Error::schema_version("expected version must be at least 1"));
    }

    let stored = stored_version(conn)?;
    if stored == expected {
        debug!(version = stored, "schema up to date");
        return Ok(SchemaAction::Unchanged);
    }

    let tx = conn.transaction()?;
    let action = if stored == 0 {
        if table_exists(&tx)? {
            info!(version = expected, "adopting existing {TABLE_NAME} table");
            SchemaAction::Adopted
        } else {
            tx.execute(CREATE_TABLE, [])?;
            info!(version = expected, "created {TABLE_NAME} table");
            SchemaAction::Created
        }
    } else {
        warn!(
            from = stored,
            to = expected,
            "schema version changed, dropping {TABLE_NAME} table"
        );
        tx.execute(DROP_TABLE, [])?;
        tx.execute(CREATE_TABLE, [])?;
        SchemaAction::Recreated { from: stored }
    };
    tx.pragma_update(None, "user_version", expected)?;
    tx.commit()?;

    Ok(action)
}

fn table_exists(conn: &Connection) -> Result<bool> {
    let exists = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1)",
        [TABLE_NAME],
        |row| row.get(0),
    )?;
    Ok(exists)
}

/// Version recorded in the file, 0 for a database that was never prepared.
pub fn stored_version(conn: &Connection) -> Result<u32> {
    let version: i64 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    u32::try_from(version)
        .map_err(|_| Error::schema_version(format!("invalid stored version: {version}")))
}
