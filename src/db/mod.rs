//! Persistence module split across logical submodules.

mod connection;
mod contacts;
pub mod schema;

pub use connection::ContactStore;
pub use schema::{SchemaAction, SCHEMA_VERSION};
