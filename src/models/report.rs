//! Run report model.

use crate::models::recording::{EpisodeRecord, ItemKind};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Final outcome for one recording item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemOutcome {
    /// Series and episode identified.
    Matched,
    /// Series identified, episode not.
    SeriesOnly,
    /// On the ignore list (or newly ignored).
    Ignored,
    /// Series could not be resolved.
    Unresolved,
    /// Movie, left as is.
    Movie,
}

/// Report entry for one recording item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportEntry {
    /// Item kind.
    pub kind: ItemKind,
    /// Raw title.
    pub title: String,
    /// Local series name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub series_name: Option<String>,
    /// Canonical series id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub series_id: Option<String>,
    /// Matched episode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub episode: Option<EpisodeRecord>,
    /// Proposed path relative to the destination root.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<PathBuf>,
    /// Copy-protected recording.
    pub protected: bool,
    /// Outcome.
    pub outcome: ItemOutcome,
}

/// Summary of one reconciliation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Report version.
    pub version: String,
    /// Unique run id.
    pub run_id: String,
    /// Start timestamp.
    pub started_at: String,
    /// Finish timestamp.
    pub finished_at: String,
    /// Whether the run was cancelled before completing.
    pub cancelled: bool,
    /// Change-feed cursor after the run.
    pub update_cursor: i64,
    /// Per-item entries, in input order.
    pub items: Vec<ReportEntry>,
}

impl RunReport {
    /// Count entries with a given outcome.
    pub fn count(&self, outcome: ItemOutcome) -> usize {
        self.items.iter().filter(|i| i.outcome == outcome).count()
    }
}
