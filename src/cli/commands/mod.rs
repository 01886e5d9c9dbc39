//! CLI command implementations.

pub mod ignore;
pub mod run;
pub mod state;
