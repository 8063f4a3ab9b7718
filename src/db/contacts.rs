use rusqlite::{params, Connection, Params, Row};
use tracing::{debug, warn};

use super::connection::ContactStore;
use crate::models::{Contact, ContactDraft};

const SELECT_BY_ID: &str = "SELECT id, nome, telefone FROM contato WHERE id = ?1";

/// `instr` keeps the match case-sensitive and treats `%` and `_` literally,
/// which `LIKE` would not.
const SELECT_BY_NAME: &str = "SELECT id, nome, telefone FROM contato
     WHERE ?1 = '' OR instr(nome, ?1) > 0
     ORDER BY id";

impl ContactStore {
    /// Look contacts up by name substring, or by id when `exact_by_id` is set
    /// (then `filter` holds the id as text; surrounding spaces are ignored).
    ///
    /// Never fails: an unavailable database yields an empty list, and an error
    /// while walking the rows stops the walk and returns what was collected.
    pub fn search(&self, filter: &str, exact_by_id: bool) -> Vec<Contact> {
        let Some(conn) = self.connection() else {
            return Vec::new();
        };

        if exact_by_id {
            // Bound as text so SQLite's numeric affinity decides what counts
            // as the id: "1", "+1" and "1.0" all match row 1.
            let id = filter.trim();
            if id.is_empty() {
                debug!("id lookup with an empty filter");
                return Vec::new();
            }
            collect_contacts(&conn, SELECT_BY_ID, params![id])
        } else {
            collect_contacts(&conn, SELECT_BY_NAME, params![filter])
        }
    }

    /// Store a new contact and return the id SQLite assigned. `None` means
    /// nothing was written.
    pub fn insert(&self, draft: &ContactDraft) -> Option<i64> {
        let conn = self.connection()?;
        match conn.execute(
            "INSERT INTO contato (nome, telefone) VALUES (?1, ?2)",
            params![draft.name, draft.phone],
        ) {
            Ok(_) => {
                let id = conn.last_insert_rowid();
                debug!(id, "inserted contact");
                Some(id)
            }
            Err(err) => {
                warn!(%err, "failed to insert contact");
                None
            }
        }
    }

    /// Replace name and phone of the row with `contact.id`. A missing row is
    /// not an error.
    pub fn update(&self, contact: &Contact) {
        let Some(conn) = self.connection() else {
            return;
        };
        match conn.execute(
            "UPDATE contato SET nome = ?1, telefone = ?2 WHERE id = ?3",
            params![contact.name, contact.phone, contact.id],
        ) {
            Ok(0) => debug!(id = contact.id, "update matched no contact"),
            Ok(_) => debug!(id = contact.id, "updated contact"),
            Err(err) => warn!(id = contact.id, %err, "failed to update contact"),
        }
    }

    /// Remove the row with `id`. A missing row is not an error.
    pub fn delete(&self, id: i64) {
        let Some(conn) = self.connection() else {
            return;
        };
        match conn.execute("DELETE FROM contato WHERE id = ?1", params![id]) {
            Ok(0) => debug!(id, "delete matched no contact"),
            Ok(_) => debug!(id, "deleted contact"),
            Err(err) => warn!(id, %err, "failed to delete contact"),
        }
    }

    /// Number of stored contacts, 0 when the database is unavailable.
    pub fn count(&self) -> usize {
        let Some(conn) = self.connection() else {
            return 0;
        };
        match conn.query_row("SELECT COUNT(*) FROM contato", [], |row| {
            row.get::<_, i64>(0)
        }) {
            Ok(count) => usize::try_from(count).unwrap_or(0),
            Err(err) => {
                warn!(%err, "failed to count contacts");
                0
            }
        }
    }
}

/// Run `sql` and gather every row that decodes. The first failure ends the
/// walk; earlier rows are kept.
fn collect_contacts<P: Params>(conn: &Connection, sql: &str, params: P) -> Vec<Contact> {
    let mut contacts = Vec::new();

    let mut stmt = match conn.prepare(sql) {
        Ok(stmt) => stmt,
        Err(err) => {
            warn!(%err, "failed to prepare contact query");
            return contacts;
        }
    };

    let mut rows = match stmt.query(params) {
        Ok(rows) => rows,
        Err(err) => {
            warn!(%err, "failed to execute contact query");
            return contacts;
        }
    };

    loop {
        match rows.next() {
            Ok(Some(row)) => match contact_from_row(row) {
                Ok(contact) => contacts.push(contact),
                Err(err) => {
                    warn!(%err, kept = contacts.len(), "failed to read contact row");
                    break;
                }
            },
            Ok(None) => break,
            Err(err) => {
                warn!(%err, kept = contacts.len(), "failed to fetch contact row");
                break;
            }
        }
    }

    contacts
}

fn contact_from_row(row: &Row<'_>) -> rusqlite::Result<Contact> {
    Ok(Contact {
        id: row.get(0)?,
        name: row.get(1)?,
        phone: row.get(2)?,
    })
}
