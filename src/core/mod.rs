//! Core reconciliation engine.

pub mod fetcher;
pub mod ignore;
pub mod matcher;
pub mod reconciler;
pub mod resolver;
pub mod source;
pub mod store;
pub mod updates;
