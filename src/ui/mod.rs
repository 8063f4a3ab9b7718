//! Terminal interface: the contact list with its search bar, and the detail
//! form layered on top of it.
mod app;
mod forms;
mod helpers;
mod screens;
mod terminal;

pub use app::App;
pub use terminal::run_app;
