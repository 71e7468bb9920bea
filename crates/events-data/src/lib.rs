//! Data layer for the special events dashboard.
//!
//! Discovers and reads geocoded event files, loads the city boundary overlay,
//! runs the event density aggregation and builds the daily and monthly view
//! snapshots consumed by the UI.

pub mod aggregator;
pub mod analysis;
pub mod boundary;
pub mod reader;

pub use events_core as core;
