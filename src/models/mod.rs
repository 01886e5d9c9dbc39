//! Data models.

pub mod config;
pub mod recording;
pub mod report;
pub mod series;
pub mod state;
