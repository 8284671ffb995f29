//! Vinted search watcher: polls catalog searches, alerts on new listings over
//! Telegram, optionally logs them to Google Sheets, and serves a small status
//! dashboard.

pub mod config;
pub mod models;
pub mod notify;
pub mod scanner;
pub mod scrapers;
pub mod status;
pub mod store;

pub use config::Config;
pub use scanner::{CycleReport, Scanner};
pub use store::Tracker;
