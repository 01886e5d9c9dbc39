//! Operator decisions.
//!
//! The engine never reads the console directly. Every question goes through a
//! [`DecisionProvider`]: the terminal implementation in production, a scripted
//! one in tests.

pub mod console;
pub mod scripted;

pub use console::ConsoleDecisions;
pub use scripted::{ScriptedAnswer, ScriptedDecisions};

use crate::Result;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// Answer to a numbered selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    /// Zero-based index into the offered options.
    Selected(usize),
    /// Operator skipped (entered 0).
    Skipped,
}

/// Source of operator decisions.
///
/// Calls block until answered and return [`crate::Error::Cancelled`] once the
/// token fires.
#[async_trait]
pub trait DecisionProvider: Send + Sync {
    /// Ask a yes/no question.
    async fn yes_no(&self, prompt: &str, cancel: &CancellationToken) -> Result<bool>;

    /// Ask the operator to pick one of `options`, or skip.
    async fn choose(
        &self,
        prompt: &str,
        options: &[String],
        cancel: &CancellationToken,
    ) -> Result<Choice>;

    /// Ask for a new search string. `None` means skip.
    async fn search_text(&self, prompt: &str, cancel: &CancellationToken)
        -> Result<Option<String>>;
}
