//! Episode catalog fetcher.
//!
//! Downloads and caches a series' full episode list when it is missing, when
//! the change feed lists the series, or when the cached file has disappeared.
//!
//! Layout under the working directory:
//!
//! ```text
//! <folder>/<id>/en.zip     archive, deleted after extraction
//! <folder>/<id>/en/en.xml  episode list
//! ```
//!
//! Fetches for distinct series run concurrently. Each fetch owns its folder
//! and only returns an outcome; the caller applies outcomes to the state one
//! at a time and saves after each.

use crate::core::store::StateStore;
use crate::models::recording::{ItemKind, RecordingItem};
use crate::models::state::PersistedState;
use crate::services::{xml, CatalogApi};
use crate::utils::fs::{extract_zip, remove_dir_if_exists};
use crate::{Error, Result};
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;

/// One series to (re)fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchJob {
    /// Canonical series id.
    pub canonical_id: String,
    /// Sanitized folder name.
    pub folder_name: String,
}

/// Result of one fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutcome {
    /// Canonical series id.
    pub canonical_id: String,
    /// Sanitized folder name.
    pub folder_name: String,
    /// Extracted episode list, or `None` when the fetch failed.
    pub catalog_file: Option<PathBuf>,
}

/// Counts for one refresh pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchSummary {
    /// Series whose catalog was stored.
    pub fetched: usize,
    /// Series whose fetch failed (retried next run).
    pub failed: usize,
}

/// Select the distinct series among `items` that need a fresh catalog.
///
/// Series come from `state` (not the items' snapshots) and are deduplicated
/// by canonical id, in first-seen order.
pub fn plan_refresh(
    state: &PersistedState,
    items: &[RecordingItem],
    changed: &HashSet<String>,
) -> Vec<FetchJob> {
    let mut seen = HashSet::new();
    let mut jobs = Vec::new();

    for item in items.iter().filter(|i| i.kind == ItemKind::Tv) {
        let Some(series) = item.local_series_name().and_then(|n| state.find_series(n)) else {
            continue;
        };
        if !series.is_resolved() {
            continue;
        }
        let Some(id) = series.canonical_id.as_deref() else {
            continue;
        };
        if !seen.insert(id.to_string()) {
            continue;
        }

        let reason = match series.catalog_file.as_deref() {
            None => Some("no cached catalog"),
            Some(_) if changed.contains(id) => Some("changed in catalog"),
            Some(path) if !path.is_file() => Some("cached catalog missing"),
            Some(_) => None,
        };

        if let Some(reason) = reason {
            tracing::debug!("Refreshing {} [{}]: {}", series.local_name, id, reason);
            let folder_name = series
                .folder()
                .filter(|f| !f.is_empty())
                .unwrap_or_else(|| id.to_string());
            jobs.push(FetchJob {
                canonical_id: id.to_string(),
                folder_name,
            });
        }
    }

    jobs
}

/// Downloads, extracts and validates episode lists.
pub struct CatalogFetcher<'a> {
    catalog: &'a dyn CatalogApi,
    working_dir: PathBuf,
    concurrency: usize,
}

impl<'a> CatalogFetcher<'a> {
    /// Create a fetcher.
    pub fn new(catalog: &'a dyn CatalogApi, working_dir: &Path, concurrency: usize) -> Self {
        Self {
            catalog,
            working_dir: working_dir.to_path_buf(),
            concurrency: concurrency.max(1),
        }
    }

    /// Refresh every series among `items` that needs it, saving the state
    /// after each completed fetch.
    pub async fn refresh(
        &self,
        store: &mut StateStore,
        items: &[RecordingItem],
        changed: &HashSet<String>,
        cancel: &CancellationToken,
    ) -> Result<FetchSummary> {
        let jobs = plan_refresh(store.state(), items, changed);
        let mut summary = FetchSummary::default();
        if jobs.is_empty() {
            return Ok(summary);
        }

        tracing::info!(
            "Fetching {} episode catalogs ({} at a time)",
            jobs.len(),
            self.concurrency
        );

        let pb = ProgressBar::new(jobs.len() as u64);
        if let Ok(style) =
            ProgressStyle::default_bar().template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            pb.set_style(style.progress_chars("=>-"));
        }

        let mut outcomes = stream::iter(jobs)
            .map(|job| self.fetch_one(job, cancel))
            .buffer_unordered(self.concurrency);

        let mut cancelled = false;
        while let Some(result) = outcomes.next().await {
            let outcome = match result {
                Ok(outcome) => outcome,
                Err(_) => {
                    cancelled = true;
                    break;
                }
            };

            pb.set_message(outcome.folder_name.clone());
            pb.inc(1);
            if outcome.catalog_file.is_some() {
                summary.fetched += 1;
            } else {
                summary.failed += 1;
            }

            apply_outcome(store.state_mut(), &outcome);
            store.save_logged("catalog fetch");
        }
        pb.finish_and_clear();

        if cancelled {
            return Err(Error::Cancelled);
        }
        tracing::info!(
            "Catalogs fetched: {}, failed: {}",
            summary.fetched,
            summary.failed
        );
        Ok(summary)
    }

    /// Download, store and extract one series' catalog.
    ///
    /// Only cancellation is an error; any other failure yields an outcome
    /// without a catalog file.
    async fn fetch_one(&self, job: FetchJob, cancel: &CancellationToken) -> Result<FetchOutcome> {
        let language = self.catalog.language();
        let series_dir = self
            .working_dir
            .join(&job.folder_name)
            .join(&job.canonical_id);

        let catalog_file = match self
            .catalog
            .download_episode_archive(&job.canonical_id, cancel)
            .await
        {
            Ok(bytes) => match store_archive(&series_dir, &language, &bytes) {
                Ok(path) => Some(path),
                Err(e) => {
                    tracing::warn!("Catalog for [{}] unusable: {}", job.canonical_id, e);
                    None
                }
            },
            Err(e) if e.is_cancelled() => return Err(e),
            Err(e) => {
                tracing::warn!("Catalog download for [{}] failed: {}", job.canonical_id, e);
                None
            }
        };

        Ok(FetchOutcome {
            canonical_id: job.canonical_id,
            folder_name: job.folder_name,
            catalog_file,
        })
    }
}

/// Record a fetch outcome on every mapping with that canonical id.
pub fn apply_outcome(state: &mut PersistedState, outcome: &FetchOutcome) {
    for series in state.series_with_id_mut(&outcome.canonical_id) {
        series.folder_name = Some(outcome.folder_name.clone());
        series.catalog_file = outcome.catalog_file.clone();
    }
}

/// Write the archive, re-extract it and check the episode list parses.
fn store_archive(series_dir: &Path, language: &str, bytes: &[u8]) -> Result<PathBuf> {
    fs::create_dir_all(series_dir)?;

    let archive = series_dir.join(format!("{}.zip", language));
    fs::write(&archive, bytes)?;

    let extract_dir = series_dir.join(language);
    remove_dir_if_exists(&extract_dir)?;
    let extracted = extract_zip(&archive, &extract_dir);
    if let Err(e) = fs::remove_file(&archive) {
        tracing::debug!("Could not remove {}: {}", archive.display(), e);
    }
    extracted?;

    let episode_file = extract_dir.join(format!("{}.xml", language));
    if !episode_file.is_file() {
        return Err(Error::Parse(format!(
            "{}.xml not found in archive",
            language
        )));
    }

    let content = fs::read_to_string(&episode_file)?;
    let episodes = xml::parse_episode_list(&content)?;
    tracing::debug!(
        "Stored {} episodes at {}",
        episodes.len(),
        episode_file.display()
    );

    Ok(episode_file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::series::SeriesIdentity;

    fn state_with(series: Vec<SeriesIdentity>) -> PersistedState {
        PersistedState {
            series,
            ..Default::default()
        }
    }

    #[test]
    fn test_plan_refresh_unset_catalog() {
        let state = state_with(vec![SeriesIdentity::resolved("Foo", "123", "Foo: The Show")]);
        let items = vec![RecordingItem::tv("Foo", "a"), RecordingItem::tv("Foo", "b")];

        let jobs = plan_refresh(&state, &items, &HashSet::new());
        assert_eq!(
            jobs,
            vec![FetchJob {
                canonical_id: "123".to_string(),
                folder_name: "Foo_ The Show".to_string(),
            }]
        );
    }

    #[test]
    fn test_plan_refresh_skips_fresh_and_unknown() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let file = temp_dir.path().join("en.xml");
        fs::write(&file, "<Data></Data>").unwrap();

        let mut fresh = SeriesIdentity::resolved("Foo", "123", "Foo");
        fresh.catalog_file = Some(file);
        let state = state_with(vec![fresh]);
        let items = vec![
            RecordingItem::tv("Foo", "a"),
            RecordingItem::tv("Unknown", "b"),
            RecordingItem::movie("Foo", None),
        ];

        assert!(plan_refresh(&state, &items, &HashSet::new()).is_empty());

        let changed: HashSet<String> = ["123".to_string()].into_iter().collect();
        assert_eq!(plan_refresh(&state, &items, &changed).len(), 1);
    }

    #[test]
    fn test_plan_refresh_missing_file() {
        let mut stale = SeriesIdentity::resolved("Foo", "123", "Foo");
        stale.catalog_file = Some(PathBuf::from("/nonexistent/en/en.xml"));
        let state = state_with(vec![stale]);
        let items = vec![RecordingItem::tv("Foo", "a")];
        assert_eq!(plan_refresh(&state, &items, &HashSet::new()).len(), 1);
    }

    #[test]
    fn test_plan_refresh_dedupes_shared_id() {
        let state = state_with(vec![
            SeriesIdentity::resolved("Foo", "123", "Foo"),
            SeriesIdentity::resolved("Foo HD", "123", "Foo"),
        ]);
        let items = vec![RecordingItem::tv("Foo", "a"), RecordingItem::tv("Foo HD", "b")];
        assert_eq!(plan_refresh(&state, &items, &HashSet::new()).len(), 1);
    }

    #[test]
    fn test_apply_outcome_updates_all_mappings() {
        let mut state = state_with(vec![
            SeriesIdentity::resolved("Foo", "123", "Foo"),
            SeriesIdentity::resolved("Foo HD", "123", "Foo"),
            SeriesIdentity::resolved("Bar", "456", "Bar"),
        ]);
        let outcome = FetchOutcome {
            canonical_id: "123".to_string(),
            folder_name: "Foo".to_string(),
            catalog_file: Some(PathBuf::from("/cache/Foo/123/en/en.xml")),
        };
        apply_outcome(&mut state, &outcome);

        assert!(state.series[0].catalog_file.is_some());
        assert!(state.series[1].catalog_file.is_some());
        assert!(state.series[2].catalog_file.is_none());
    }
}
