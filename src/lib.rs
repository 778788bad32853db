//! Harvest shame reporter.
//!
//! This library fetches per-user time entries from Harvest for a configured
//! date range, aggregates hours per user per day, and emails a color-coded
//! HTML summary table to a configured recipient list.

pub mod config;
pub mod helpers;
pub mod models;
pub mod service;

pub use config::Config;
pub use service::{BlameError, BlameService};

// Re-export key types for convenience
pub use helpers::report::{Band, Report};
pub use models::harvest::{DailyHours, DateRange, DayEntry, User};
