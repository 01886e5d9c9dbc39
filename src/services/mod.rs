//! Remote catalog services.
//!
//! The engine talks to the catalog only through [`CatalogApi`], so tests can
//! substitute an in-memory catalog for the TheTVDB client.

pub mod tvdb;
pub mod xml;

use crate::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

/// A series returned by a catalog search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesCandidate {
    /// Canonical id.
    pub id: String,
    /// Canonical name.
    pub name: String,
    /// First-aired date as reported by the catalog.
    pub first_aired: Option<String>,
}

impl SeriesCandidate {
    /// Label shown in selection prompts.
    pub fn label(&self) -> String {
        match &self.first_aired {
            Some(aired) => format!("{} ({})", self.name, aired),
            None => self.name.clone(),
        }
    }
}

/// Change-feed request mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateMode {
    /// Full history; only the server time is returned.
    None,
    /// Series changed since a cursor.
    Series,
}

impl UpdateMode {
    /// Query-string value.
    pub fn as_str(&self) -> &'static str {
        match self {
            UpdateMode::None => "none",
            UpdateMode::Series => "series",
        }
    }
}

/// Parsed change feed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeFeed {
    /// Server time at which the feed was produced.
    pub timestamp: i64,
    /// Ids of series changed since the requested cursor.
    pub series_ids: Vec<String>,
}

/// Remote metadata catalog.
///
/// Every call takes the run's cancellation token and returns
/// [`crate::Error::Cancelled`] once it fires.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// Search series by name.
    async fn search_series(
        &self,
        name: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<SeriesCandidate>>;

    /// Fetch the change feed.
    async fn fetch_changes(
        &self,
        mode: UpdateMode,
        cursor: i64,
        cancel: &CancellationToken,
    ) -> Result<ChangeFeed>;

    /// Download the zipped episode list for a series.
    async fn download_episode_archive(
        &self,
        series_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<u8>>;

    /// Archive language; names the archive, its extract folder and the
    /// episode list document (`en.zip`, `en/`, `en.xml`).
    fn language(&self) -> String {
        "en".to_string()
    }
}
