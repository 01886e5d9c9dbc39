//! TheTVDB API client (legacy XML interface).

use crate::models::config::TvDbConfig;
use crate::services::{xml, CatalogApi, ChangeFeed, SeriesCandidate, UpdateMode};
use crate::{Error, Result};
use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// TheTVDB API client.
pub struct TvDbClient {
    config: TvDbConfig,
    client: reqwest::Client,
}

impl TvDbClient {
    /// Create a new client.
    pub fn new(config: TvDbConfig) -> Result<Self> {
        if config.base_url.trim().is_empty() {
            return Err(Error::Config("tvdb.base_url is empty".to_string()));
        }
        let client = reqwest::Client::builder()
            .user_agent(concat!("recording_organizer/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout.max(1)))
            .build()?;
        Ok(Self { config, client })
    }

    /// Build URL under the API root.
    fn build_url(&self, path: &str) -> String {
        format!("{}/api/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// Series search URL.
    pub fn search_url(&self, name: &str) -> String {
        self.build_url(&format!(
            "GetSeries.php?seriesname={}&language={}",
            urlencoding::encode(name),
            self.config.language
        ))
    }

    /// Change feed URL.
    pub fn updates_url(&self, mode: UpdateMode, cursor: i64) -> String {
        let time = match mode {
            UpdateMode::None => String::new(),
            UpdateMode::Series => cursor.to_string(),
        };
        self.build_url(&format!("Updates.php?type={}&time={}", mode.as_str(), time))
    }

    /// Episode archive URL for a series.
    pub fn archive_url(&self, series_id: &str) -> Result<String> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(Error::TvDbApiKeyMissing)?;
        Ok(self.build_url(&format!(
            "{}/series/{}/all/{}.zip",
            api_key,
            urlencoding::encode(series_id),
            self.config.language
        )))
    }

    /// Verify the API answers. Uses the change feed as a cheap probe.
    pub async fn verify_connection(&self) -> Result<bool> {
        let url = self.updates_url(UpdateMode::None, 0);
        match self.client.get(&url).send().await {
            Ok(resp) => Ok(resp.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    async fn get_text(&self, url: &str) -> Result<String> {
        tracing::debug!("GET {}", url);
        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Network(format!("{} returned {}", url, status)));
        }
        Ok(resp.text().await?)
    }

    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        tracing::debug!("GET {}", url);
        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Network(format!("series archive returned {}", status)));
        }
        Ok(resp.bytes().await?.to_vec())
    }
}

/// Run a request until it completes or the token fires.
async fn cancellable<T>(
    cancel: &CancellationToken,
    request: impl Future<Output = Result<T>>,
) -> Result<T> {
    tokio::select! {
        _ = cancel.cancelled() => Err(Error::Cancelled),
        result = request => result,
    }
}

#[async_trait]
impl CatalogApi for TvDbClient {
    async fn search_series(
        &self,
        name: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<SeriesCandidate>> {
        let url = self.search_url(name);
        let body = cancellable(cancel, self.get_text(&url)).await?;
        xml::parse_series_search(&body)
    }

    async fn fetch_changes(
        &self,
        mode: UpdateMode,
        cursor: i64,
        cancel: &CancellationToken,
    ) -> Result<ChangeFeed> {
        let url = self.updates_url(mode, cursor);
        let body = cancellable(cancel, self.get_text(&url)).await?;
        xml::parse_change_feed(&body)
    }

    async fn download_episode_archive(
        &self,
        series_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<u8>> {
        let url = self.archive_url(series_id)?;
        cancellable(cancel, self.get_bytes(&url)).await
    }

    fn language(&self) -> String {
        self.config.language.clone()
    }
}
