//! Recording-related data models.

use crate::models::series::SeriesIdentity;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Kind of recorded item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Tv,
    Movie,
}

impl std::fmt::Display for ItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ItemKind::Tv => write!(f, "tv"),
            ItemKind::Movie => write!(f, "movie"),
        }
    }
}

/// A locally recorded TV episode or movie, as supplied by the recording source.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordingItem {
    /// TV episode or movie.
    pub kind: ItemKind,
    /// Raw title as recorded.
    pub title: String,
    /// Programme description.
    #[serde(default)]
    pub description: String,
    /// Local broadcast time.
    #[serde(default)]
    pub broadcast_date: Option<NaiveDateTime>,
    /// Series name as it appears in the recording.
    #[serde(default)]
    pub series_name: Option<String>,
    /// Resolved series (engine output).
    #[serde(default)]
    pub series: Option<SeriesIdentity>,
    /// Resolved episode (engine output).
    #[serde(default)]
    pub episode: Option<EpisodeRecord>,
    /// Release year (movies).
    #[serde(default)]
    pub release_year: Option<u16>,
    /// Copy-protected recording.
    #[serde(default)]
    pub protected: bool,
    /// Rerun of an earlier broadcast.
    #[serde(default)]
    pub is_rerun: bool,
    /// Source file on disk.
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl RecordingItem {
    /// Create a TV recording.
    pub fn tv(series_name: &str, title: &str) -> Self {
        Self {
            kind: ItemKind::Tv,
            title: title.to_string(),
            description: String::new(),
            broadcast_date: None,
            series_name: Some(series_name.to_string()),
            series: None,
            episode: None,
            release_year: None,
            protected: false,
            is_rerun: false,
            file: None,
        }
    }

    /// Create a movie recording.
    pub fn movie(title: &str, release_year: Option<u16>) -> Self {
        Self {
            kind: ItemKind::Movie,
            title: title.to_string(),
            description: String::new(),
            broadcast_date: None,
            series_name: None,
            series: None,
            episode: None,
            release_year,
            protected: false,
            is_rerun: false,
            file: None,
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    /// Set the broadcast time.
    pub fn with_broadcast(mut self, broadcast: NaiveDateTime) -> Self {
        self.broadcast_date = Some(broadcast);
        self
    }

    /// Local series name, if any and non-empty.
    pub fn local_series_name(&self) -> Option<&str> {
        self.series_name.as_deref().filter(|s| !s.is_empty())
    }

    /// Calendar date of the broadcast.
    pub fn broadcast_day(&self) -> Option<NaiveDate> {
        self.broadcast_date.map(|d| d.date())
    }

    /// Display label for log lines and prompts.
    pub fn label(&self) -> String {
        match (self.kind, self.local_series_name()) {
            (ItemKind::Tv, Some(series)) => format!("{}: {}", series, self.title),
            _ => self.title.clone(),
        }
    }
}

/// One episode entry from a series' catalog file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeRecord {
    /// Episode name.
    pub name: String,
    /// Episode overview.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overview: Option<String>,
    /// Season number (0 when unknown).
    pub season_number: u32,
    /// Episode number (0 when unknown).
    pub episode_number: u32,
    /// First-aired date.
    #[serde(default)]
    pub first_aired: Option<NaiveDate>,
}

impl EpisodeRecord {
    /// Numbered label shown in selection prompts.
    pub fn label(&self) -> String {
        let aired = self
            .first_aired
            .map(|d| d.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        format!(
            "s{:02} e{:02} {} ({})",
            self.season_number, self.episode_number, self.name, aired
        )
    }
}
