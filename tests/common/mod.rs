//! Shared test helpers: an in-memory catalog and archive builders.

#![allow(dead_code)]

use async_trait::async_trait;
use recording_organizer::services::{CatalogApi, ChangeFeed, SeriesCandidate, UpdateMode};
use recording_organizer::{Error, Result};
use std::collections::HashMap;
use std::io::{Cursor, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio_util::sync::CancellationToken;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// In-memory catalog that counts every call.
#[derive(Default)]
pub struct MockCatalog {
    search_results: HashMap<String, Vec<SeriesCandidate>>,
    feed: Option<ChangeFeed>,
    archives: HashMap<String, Vec<u8>>,
    searches: Mutex<Vec<String>>,
    feed_requests: Mutex<Vec<(UpdateMode, i64)>>,
    downloads: Mutex<Vec<String>>,
    pub cancel_on_download: Option<CancellationToken>,
    pub in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl MockCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Search results for an exact query.
    pub fn with_search(mut self, query: &str, candidates: Vec<(&str, &str)>) -> Self {
        self.search_results.insert(
            query.to_string(),
            candidates
                .into_iter()
                .map(|(id, name)| SeriesCandidate {
                    id: id.to_string(),
                    name: name.to_string(),
                    first_aired: None,
                })
                .collect(),
        );
        self
    }

    /// Change feed response. Without one, feed requests fail.
    pub fn with_feed(mut self, timestamp: i64, series_ids: &[&str]) -> Self {
        self.feed = Some(ChangeFeed {
            timestamp,
            series_ids: series_ids.iter().map(|s| s.to_string()).collect(),
        });
        self
    }

    /// Archive served for a series id. Without one, downloads fail.
    pub fn with_archive(mut self, series_id: &str, archive: Vec<u8>) -> Self {
        self.archives.insert(series_id.to_string(), archive);
        self
    }

    pub fn searches(&self) -> Vec<String> {
        self.searches.lock().unwrap().clone()
    }

    pub fn feed_requests(&self) -> Vec<(UpdateMode, i64)> {
        self.feed_requests.lock().unwrap().clone()
    }

    pub fn downloads(&self) -> Vec<String> {
        let mut downloads = self.downloads.lock().unwrap().clone();
        downloads.sort();
        downloads
    }

    /// Every remote call made so far.
    pub fn total_calls(&self) -> usize {
        self.searches().len() + self.feed_requests().len() + self.downloads().len()
    }
}

#[async_trait]
impl CatalogApi for MockCatalog {
    async fn search_series(
        &self,
        name: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<SeriesCandidate>> {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        self.searches.lock().unwrap().push(name.to_string());
        Ok(self.search_results.get(name).cloned().unwrap_or_default())
    }

    async fn fetch_changes(
        &self,
        mode: UpdateMode,
        cursor: i64,
        cancel: &CancellationToken,
    ) -> Result<ChangeFeed> {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        self.feed_requests.lock().unwrap().push((mode, cursor));
        self.feed
            .clone()
            .ok_or_else(|| Error::Network("feed unavailable".to_string()))
    }

    async fn download_episode_archive(
        &self,
        series_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<u8>> {
        if let Some(token) = &self.cancel_on_download {
            token.cancel();
        }
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        self.downloads.lock().unwrap().push(series_id.to_string());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        tokio::task::yield_now().await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        self.archives
            .get(series_id)
            .cloned()
            .ok_or_else(|| Error::Network(format!("no archive for {}", series_id)))
    }
}

/// One `<Episode>` entry: (name, overview, season, episode, first aired).
pub type EpisodeRow<'a> = (&'a str, &'a str, u32, u32, &'a str);

/// Build an episode list document.
pub fn episode_xml(rows: &[EpisodeRow]) -> String {
    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\" ?>\n<Data>\n");
    for (name, overview, season, episode, aired) in rows {
        xml.push_str(&format!(
            "  <Episode>\n    <EpisodeName>{}</EpisodeName>\n    <Overview>{}</Overview>\n    \
             <SeasonNumber>{}</SeasonNumber>\n    <EpisodeNumber>{}</EpisodeNumber>\n    \
             <FirstAired>{}</FirstAired>\n  </Episode>\n",
            name, overview, season, episode, aired
        ));
    }
    xml.push_str("</Data>\n");
    xml
}

/// Zip a single file.
pub fn zip_file(name: &str, content: &str) -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    {
        let mut zip = ZipWriter::new(&mut buffer);
        zip.start_file(name, SimpleFileOptions::default()).unwrap();
        zip.write_all(content.as_bytes()).unwrap();
        zip.finish().unwrap();
    }
    buffer.into_inner()
}

/// Zipped `en.xml` episode list.
pub fn episode_archive(rows: &[EpisodeRow]) -> Vec<u8> {
    zip_file("en.xml", &episode_xml(rows))
}
