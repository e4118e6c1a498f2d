//! Inflation Dashboard - settings persistence and filter state
//!
//! The dashboard loads country-level CPI inflation figures, lets a session
//! filter them by country and year range, and keeps display preferences and
//! the last used filters in a JSON settings file shared by all sessions.

pub mod app;
pub mod config;
pub mod data;
pub mod error;
pub mod filter;
pub mod logging;
pub mod palette;
pub mod prefs;
pub mod session;
pub mod settings;
pub mod store;

pub use app::{Dashboard, Event, View};
pub use error::{DataError, StoreError};
pub use session::{Rerender, SessionState};
pub use store::SettingsStore;
