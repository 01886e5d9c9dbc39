//! Series resolver.
//!
//! Maps a recording's local series name to a canonical catalog series:
//!
//! 1. Ignored items stop here
//! 2. Known local names resolve from the state, with no remote call
//! 3. The operator may ignore the series now
//! 4. A remote search with exactly one candidate of the same name resolves silently
//! 5. Otherwise the operator picks from the candidates, or searches again when
//!    there were none

use crate::core::ignore;
use crate::decision::{Choice, DecisionProvider};
use crate::models::recording::{ItemKind, RecordingItem};
use crate::models::series::SeriesIdentity;
use crate::models::state::PersistedState;
use crate::services::{CatalogApi, SeriesCandidate};
use crate::Result;
use std::collections::HashSet;
use tokio_util::sync::CancellationToken;

/// Result of resolving one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Series attached to the item; `new` when the mapping was created now.
    Resolved { new: bool },
    /// Item is (now) on the ignore list.
    Ignored,
    /// Operator skipped; the item stays unresolved this run.
    Unresolved,
    /// Nothing to resolve (movie, or TV without a series name).
    NotApplicable,
}

/// Series resolver for one run.
pub struct SeriesResolver<'a> {
    catalog: &'a dyn CatalogApi,
    decisions: &'a dyn DecisionProvider,
    /// Local names the operator declined this run.
    declined: HashSet<String>,
}

impl<'a> SeriesResolver<'a> {
    /// Create a resolver.
    pub fn new(catalog: &'a dyn CatalogApi, decisions: &'a dyn DecisionProvider) -> Self {
        Self {
            catalog,
            decisions,
            declined: HashSet::new(),
        }
    }

    /// Resolve one item, attaching the series on success and recording new
    /// mappings and ignore decisions in `state`.
    pub async fn resolve(
        &mut self,
        state: &mut PersistedState,
        item: &mut RecordingItem,
        cancel: &CancellationToken,
    ) -> Result<Resolution> {
        if ignore::is_ignored(state, item) {
            tracing::debug!("Skipping ignored item: {}", item.label());
            return Ok(Resolution::Ignored);
        }

        if item.kind == ItemKind::Movie {
            let prompt = match item.release_year {
                Some(year) => format!("Ignore movie {} ({})", item.title, year),
                None => format!("Ignore movie {}", item.title),
            };
            if self.decisions.yes_no(&prompt, cancel).await? {
                ignore::record_decision(state, item, true);
                return Ok(Resolution::Ignored);
            }
            return Ok(Resolution::NotApplicable);
        }

        let Some(local_name) = item.local_series_name().map(str::to_string) else {
            return Ok(Resolution::NotApplicable);
        };

        if let Some(series) = state.find_series(&local_name) {
            item.series = Some(series.clone());
            return Ok(Resolution::Resolved { new: false });
        }

        if self.declined.contains(&local_name) {
            return Ok(Resolution::Unresolved);
        }

        let prompt = format!("Ignore TV series {}", local_name);
        if self.decisions.yes_no(&prompt, cancel).await? {
            ignore::record_decision(state, item, true);
            return Ok(Resolution::Ignored);
        }

        match self.find_series(&local_name, cancel).await? {
            Some(candidate) => {
                let series = SeriesIdentity::resolved(&local_name, &candidate.id, &candidate.name);
                tracing::info!(
                    "Resolved {:?} to {} [{}]",
                    local_name,
                    candidate.name,
                    candidate.id
                );
                state.add_series(series.clone());
                item.series = Some(series);
                Ok(Resolution::Resolved { new: true })
            }
            None => {
                tracing::info!("Series {:?} left unresolved", local_name);
                self.declined.insert(local_name);
                Ok(Resolution::Unresolved)
            }
        }
    }

    /// Remote search for the local name, then operator selection or re-search.
    async fn find_series(
        &self,
        local_name: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<SeriesCandidate>> {
        let candidates = self.search(local_name, cancel).await?;
        if !candidates.is_empty() {
            return self.pick(local_name, &candidates, cancel).await;
        }

        let prompt = format!("No series matches for {}", local_name);
        loop {
            let Some(query) = self.decisions.search_text(&prompt, cancel).await? else {
                return Ok(None);
            };
            let candidates = self.search(&query, cancel).await?;
            if candidates.is_empty() {
                continue;
            }
            if let Some(candidate) = self.pick(local_name, &candidates, cancel).await? {
                return Ok(Some(candidate));
            }
        }
    }

    /// Accept a single same-named candidate, otherwise ask.
    async fn pick(
        &self,
        local_name: &str,
        candidates: &[SeriesCandidate],
        cancel: &CancellationToken,
    ) -> Result<Option<SeriesCandidate>> {
        if let [only] = candidates {
            if only.name == local_name {
                return Ok(Some(only.clone()));
            }
        }

        let options: Vec<String> = candidates.iter().map(SeriesCandidate::label).collect();
        let prompt = format!("Multiple series matches for {}", local_name);
        match self.decisions.choose(&prompt, &options, cancel).await? {
            Choice::Selected(index) => Ok(candidates.get(index).cloned()),
            Choice::Skipped => Ok(None),
        }
    }

    /// Search the catalog; failures other than cancellation count as no results.
    async fn search(&self, query: &str, cancel: &CancellationToken) -> Result<Vec<SeriesCandidate>> {
        match self.catalog.search_series(query, cancel).await {
            Ok(candidates) => {
                tracing::debug!("Search {:?}: {} candidates", query, candidates.len());
                Ok(candidates)
            }
            Err(e) if e.is_cancelled() => Err(e),
            Err(e) => {
                tracing::warn!("Series search for {:?} failed: {}", query, e);
                Ok(Vec::new())
            }
        }
    }
}
