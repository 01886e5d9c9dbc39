//! Recording Organizer Library
//!
//! Resolves recorded TV episodes and movies against TheTVDB: maps local
//! series names to catalog series, keeps episode catalogs cached and matches
//! recordings to episodes, asking the operator when a choice is ambiguous.

pub mod cli;
pub mod core;
pub mod decision;
pub mod error;
pub mod generators;
pub mod models;
pub mod preflight;
pub mod services;
pub mod utils;

pub use error::{Error, Result};
