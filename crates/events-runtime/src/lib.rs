//! Session layer for the special events dashboard.
//!
//! Loads the dataset once, shares it immutably, and keeps the user's date
//! and month selection so every interaction can recompute its view.

pub mod data_manager;
pub mod session;

pub use events_core as core;
pub use events_data as data;
