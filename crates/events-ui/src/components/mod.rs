//! Reusable rendering components for the dashboard views.

pub mod calendar;
pub mod header;
pub mod map_canvas;
pub mod notice;
