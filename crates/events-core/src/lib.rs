//! Core domain types for the special-events dashboard.
//!
//! Holds the event model, calendar-month and date helpers, the percentile
//! helper used for attendance capping, display formatting, the shared error
//! type and the command-line settings.

pub mod dates;
pub mod error;
pub mod formatting;
pub mod models;
pub mod percentile;
pub mod settings;

pub use error::{EventsError, Result};
