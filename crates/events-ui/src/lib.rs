//! Terminal UI layer for the special events dashboard.
//!
//! Provides themes, the header, map canvas, calendar heatmap and notice
//! components, the welcome, daily and monthly views, and the main
//! application event loop built on top of [`ratatui`].

pub mod app;
pub mod components;
pub mod daily_view;
pub mod monthly_view;
pub mod themes;
pub mod welcome_view;

pub use events_core as core;
