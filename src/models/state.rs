//! Persisted state model.

use crate::models::series::SeriesIdentity;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

/// Durable engine state: series mappings, ignore list and change-feed cursor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistedState {
    /// Change-feed cursor (0 = never synced).
    #[serde(rename = "tvDbLastUpdate", default)]
    pub update_cursor: i64,
    /// Known series mappings, unique by local name.
    #[serde(rename = "tvSeries", default)]
    pub series: Vec<SeriesIdentity>,
    /// Ignored series local names and movie titles.
    #[serde(rename = "ignoreItems", default)]
    pub ignore_items: Vec<String>,
    /// Directory for cached catalog archives.
    #[serde(rename = "workingDirectory", default)]
    pub working_directory: PathBuf,
}

impl PersistedState {
    /// Create an empty state rooted at a working directory.
    pub fn new(working_directory: PathBuf) -> Self {
        Self {
            working_directory,
            ..Default::default()
        }
    }

    /// Find a known series by exact local name.
    pub fn find_series(&self, local_name: &str) -> Option<&SeriesIdentity> {
        self.series.iter().find(|s| s.local_name == local_name)
    }

    /// Add a series mapping. Returns false if the local name is already known.
    pub fn add_series(&mut self, series: SeriesIdentity) -> bool {
        if self.find_series(&series.local_name).is_some() {
            return false;
        }
        self.series.push(series);
        true
    }

    /// All mappings pointing at a canonical id.
    pub fn series_with_id_mut<'a>(
        &'a mut self,
        canonical_id: &'a str,
    ) -> impl Iterator<Item = &'a mut SeriesIdentity> + 'a {
        self.series
            .iter_mut()
            .filter(move |s| s.canonical_id.as_deref() == Some(canonical_id))
    }

    /// Forget the cached catalog of every mapping whose canonical id is in
    /// `changed`, so the next refresh fetches it again. Returns the number of
    /// mappings cleared.
    pub fn invalidate_catalogs(&mut self, changed: &HashSet<String>) -> usize {
        let mut cleared = 0;
        for series in self.series.iter_mut() {
            let listed = series
                .canonical_id
                .as_deref()
                .map_or(false, |id| changed.contains(id));
            if listed && series.catalog_file.take().is_some() {
                cleared += 1;
            }
        }
        cleared
    }

    /// Advance the cursor. Never moves it backwards; returns the resulting value.
    pub fn advance_cursor(&mut self, cursor: i64) -> i64 {
        if cursor > self.update_cursor {
            self.update_cursor = cursor;
        }
        self.update_cursor
    }

    /// Whether a key is on the ignore list (exact match).
    pub fn is_ignored(&self, key: &str) -> bool {
        self.ignore_items.iter().any(|i| i == key)
    }

    /// Add an ignore entry. Returns false if it was already present.
    pub fn add_ignore(&mut self, key: &str) -> bool {
        if self.is_ignored(key) {
            return false;
        }
        self.ignore_items.push(key.to_string());
        true
    }

    /// Remove an ignore entry. Returns false if it was not present.
    pub fn remove_ignore(&mut self, key: &str) -> bool {
        let before = self.ignore_items.len();
        self.ignore_items.retain(|i| i != key);
        self.ignore_items.len() != before
    }
}
