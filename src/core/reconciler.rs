//! Reconciliation pipeline.
//!
//! Runs one batch of recordings through every phase, saving the state after
//! each:
//!
//! 1. Resolve series (sequential, may prompt)
//! 2. Sync the change feed, drop the cached catalogs it lists, and advance
//!    the cursor
//! 3. Fetch stale or missing catalogs (bounded parallel)
//! 4. Refresh item series snapshots from the state
//! 5. Match episodes (may prompt)
//!
//! Cancellation skips the remaining phases; the state is still saved and the
//! report is marked cancelled.

use crate::core::fetcher::CatalogFetcher;
use crate::core::ignore;
use crate::core::matcher::{self, EpisodeMatcher, MatchOutcome};
use crate::core::resolver::{Resolution, SeriesResolver};
use crate::core::store::StateStore;
use crate::core::updates::UpdateTracker;
use crate::decision::DecisionProvider;
use crate::generators::filename::proposed_target;
use crate::models::recording::{EpisodeRecord, ItemKind, RecordingItem};
use crate::models::report::{ItemOutcome, ReportEntry, RunReport};
use crate::models::state::PersistedState;
use crate::services::CatalogApi;
use crate::Result;
use chrono::Utc;
use std::collections::HashMap;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Current report version.
const REPORT_VERSION: &str = "1.0";

/// Drives a reconciliation run.
pub struct Reconciler<'a> {
    catalog: &'a dyn CatalogApi,
    decisions: &'a dyn DecisionProvider,
    fetch_concurrency: usize,
}

impl<'a> Reconciler<'a> {
    /// Create a reconciler.
    pub fn new(
        catalog: &'a dyn CatalogApi,
        decisions: &'a dyn DecisionProvider,
        fetch_concurrency: usize,
    ) -> Self {
        Self {
            catalog,
            decisions,
            fetch_concurrency,
        }
    }

    /// Reconcile `items`, filling in their series and episodes.
    pub async fn run(
        &self,
        store: &mut StateStore,
        items: &mut [RecordingItem],
        cancel: &CancellationToken,
    ) -> RunReport {
        let started_at = Utc::now().to_rfc3339();
        let run_id = Uuid::new_v4().to_string();
        tracing::info!("Starting run {} with {} recordings", run_id, items.len());

        let cancelled = match self.run_phases(store, items, cancel).await {
            Ok(()) => false,
            Err(e) if e.is_cancelled() => {
                tracing::warn!("Run cancelled; saving progress");
                true
            }
            Err(e) => {
                tracing::error!("Run stopped: {}", e);
                false
            }
        };

        store.save_logged("run");

        let report = build_report(store.state(), items, run_id, started_at, cancelled);
        tracing::info!(
            "Run finished: {} matched, {} series only, {} ignored, {} unresolved",
            report.count(ItemOutcome::Matched),
            report.count(ItemOutcome::SeriesOnly),
            report.count(ItemOutcome::Ignored),
            report.count(ItemOutcome::Unresolved)
        );
        report
    }

    async fn run_phases(
        &self,
        store: &mut StateStore,
        items: &mut [RecordingItem],
        cancel: &CancellationToken,
    ) -> Result<()> {
        self.resolve_all(store, items, cancel).await?;
        store.save_logged("series resolution");

        let cursor = store.state().update_cursor;
        let (next, changed) = UpdateTracker::new(self.catalog)
            .fetch_changes(cursor, cancel)
            .await?;
        let cleared = store.state_mut().invalidate_catalogs(&changed);
        if cleared > 0 {
            tracing::info!("{} cached catalogs marked stale by the change feed", cleared);
        }
        store.state_mut().advance_cursor(next);
        store.save_logged("update sync");

        let working_dir = store.state().working_directory.clone();
        CatalogFetcher::new(self.catalog, &working_dir, self.fetch_concurrency)
            .refresh(store, items, &changed, cancel)
            .await?;

        refresh_snapshots(store.state(), items);

        self.match_all(items, cancel).await?;
        Ok(())
    }

    async fn resolve_all(
        &self,
        store: &mut StateStore,
        items: &mut [RecordingItem],
        cancel: &CancellationToken,
    ) -> Result<()> {
        let mut resolver = SeriesResolver::new(self.catalog, self.decisions);

        for item in items.iter_mut() {
            match resolver.resolve(store.state_mut(), item, cancel).await {
                Ok(Resolution::Resolved { new }) => {
                    if new {
                        store.save_logged("new series mapping");
                    }
                    matcher::apply_title_episode(item);
                }
                Ok(_) => {}
                Err(e) if e.is_cancelled() => return Err(e),
                Err(e) => {
                    tracing::warn!("Could not resolve {}: {}", item.label(), e);
                }
            }
        }
        Ok(())
    }

    async fn match_all(
        &self,
        items: &mut [RecordingItem],
        cancel: &CancellationToken,
    ) -> Result<()> {
        let episode_matcher = EpisodeMatcher::new(self.decisions);
        let mut catalogs: HashMap<PathBuf, Option<Vec<EpisodeRecord>>> = HashMap::new();

        for item in items.iter_mut() {
            if item.kind != ItemKind::Tv || item.episode.is_some() {
                continue;
            }
            let Some(path) = item.series.as_ref().and_then(|s| s.catalog_file.clone()) else {
                continue;
            };

            let episodes = catalogs
                .entry(path)
                .or_insert_with_key(|path| match matcher::load_catalog(path) {
                    Ok(episodes) => Some(episodes),
                    Err(e) => {
                        tracing::warn!("Skipping catalog {}: {}", path.display(), e);
                        None
                    }
                });
            let Some(episodes) = episodes.as_deref() else {
                continue;
            };

            match episode_matcher.match_item(item, episodes, cancel).await {
                Ok(MatchOutcome::Matched(episode)) => {
                    tracing::info!("{} -> {}", item.label(), episode.label());
                    item.episode = Some(episode);
                }
                Ok(_) => {}
                Err(e) if e.is_cancelled() => return Err(e),
                Err(e) => {
                    tracing::warn!("Could not match {}: {}", item.label(), e);
                }
            }
        }
        Ok(())
    }
}

/// Replace each resolved item's series snapshot with the state's current copy.
fn refresh_snapshots(state: &PersistedState, items: &mut [RecordingItem]) {
    for item in items.iter_mut().filter(|i| i.series.is_some()) {
        if let Some(name) = item.local_series_name() {
            if let Some(series) = state.find_series(name) {
                item.series = Some(series.clone());
            }
        }
    }
}

fn outcome_for(state: &PersistedState, item: &RecordingItem) -> ItemOutcome {
    if ignore::is_ignored(state, item) {
        return ItemOutcome::Ignored;
    }
    match item.kind {
        ItemKind::Movie => ItemOutcome::Movie,
        ItemKind::Tv => match (&item.series, &item.episode) {
            (Some(_), Some(_)) => ItemOutcome::Matched,
            (Some(_), None) => ItemOutcome::SeriesOnly,
            _ => ItemOutcome::Unresolved,
        },
    }
}

/// Build the run report from the final item and state snapshots.
pub fn build_report(
    state: &PersistedState,
    items: &[RecordingItem],
    run_id: String,
    started_at: String,
    cancelled: bool,
) -> RunReport {
    let entries = items
        .iter()
        .map(|item| {
            let outcome = outcome_for(state, item);
            let target = match outcome {
                ItemOutcome::Matched | ItemOutcome::Movie => proposed_target(item),
                _ => None,
            };
            ReportEntry {
                kind: item.kind,
                title: item.title.clone(),
                series_name: item.local_series_name().map(str::to_string),
                series_id: item.series.as_ref().and_then(|s| s.canonical_id.clone()),
                episode: item.episode.clone(),
                target,
                protected: item.protected,
                outcome,
            }
        })
        .collect();

    RunReport {
        version: REPORT_VERSION.to_string(),
        run_id,
        started_at,
        finished_at: Utc::now().to_rfc3339(),
        cancelled,
        update_cursor: state.update_cursor,
        items: entries,
    }
}
