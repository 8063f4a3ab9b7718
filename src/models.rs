//! Domain models that mirror the `contato` table and get passed between the
//! store, the task runner and the TUI. They stay plain data holders; the store
//! is the single source of truth and screens only keep transient copies.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
/// A stored contact. Only the store hands these out, so every value carries
/// the id SQLite assigned on insert.
pub struct Contact {
    /// Primary key. Stable once assigned and the only handle used for update
    /// and delete targeting.
    pub id: i64,
    /// Display name, matched by the list screen's substring search.
    pub name: String,
    /// Phone number kept as raw text so formatting survives untouched.
    pub phone: String,
}

impl Contact {
    /// Attach an id to a draft, typically right after the store inserted it.
    pub fn from_draft(id: i64, draft: ContactDraft) -> Self {
        Self {
            id,
            name: draft.name,
            phone: draft.phone,
        }
    }
}

impl fmt::Display for Contact {
    /// `Name (phone)`, or just the name when the phone is blank.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.phone.trim().is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{} ({})", self.name, self.phone)
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// A contact that has not been written yet. Empty fields are accepted.
pub struct ContactDraft {
    pub name: String,
    pub phone: String,
}

impl ContactDraft {
    pub fn new(name: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            phone: phone.into(),
        }
    }
}
