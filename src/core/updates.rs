//! Update tracker.
//!
//! Learns which series changed since the last run from the catalog's change
//! feed. Failures only skip the sync for this run.

use crate::services::{CatalogApi, UpdateMode};
use crate::Result;
use std::collections::HashSet;
use tokio_util::sync::CancellationToken;

/// Change-feed reader.
pub struct UpdateTracker<'a> {
    catalog: &'a dyn CatalogApi,
}

impl<'a> UpdateTracker<'a> {
    /// Create a tracker.
    pub fn new(catalog: &'a dyn CatalogApi) -> Self {
        Self { catalog }
    }

    /// Fetch changes since `cursor`.
    ///
    /// Returns the new cursor (never below `cursor`) and the changed series
    /// ids. Request and parse failures return `(cursor, {})`; only
    /// cancellation is an error.
    pub async fn fetch_changes(
        &self,
        cursor: i64,
        cancel: &CancellationToken,
    ) -> Result<(i64, HashSet<String>)> {
        let mode = if cursor == 0 {
            UpdateMode::None
        } else {
            UpdateMode::Series
        };

        match self.catalog.fetch_changes(mode, cursor, cancel).await {
            Ok(feed) => {
                let next = feed.timestamp.max(cursor);
                if feed.timestamp < cursor {
                    tracing::warn!(
                        "Change feed time {} is behind cursor {}; keeping cursor",
                        feed.timestamp,
                        cursor
                    );
                }
                let changed: HashSet<String> = feed.series_ids.into_iter().collect();
                tracing::info!(
                    "Change feed: {} series changed, cursor {} -> {}",
                    changed.len(),
                    cursor,
                    next
                );
                Ok((next, changed))
            }
            Err(e) if e.is_cancelled() => Err(e),
            Err(e) => {
                tracing::error!("Error reading change feed, sync skipped: {}", e);
                Ok((cursor, HashSet::new()))
            }
        }
    }
}
