//! Core library surface for the contact list TUI.
//!
//! The binary wires these pieces together; they are public so the store and
//! the task runner can be driven without a terminal, which is how the
//! integration tests use them.
pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod models;
pub mod tasks;
pub mod ui;

/// The SQLite-backed contact store.
pub use db::{ContactStore, SCHEMA_VERSION};

/// The domain types that other layers manipulate.
pub use models::{Contact, ContactDraft};

pub use config::Config;
pub use error::{Error, Result};
pub use logging::{init_logging, Verbosity};
pub use tasks::TaskRunner;

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
