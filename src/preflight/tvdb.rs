//! TheTVDB preflight check.

use super::CheckResult;
use crate::models::config::TvDbConfig;
use crate::services::tvdb::TvDbClient;

/// Check that an API key is configured and the API answers.
pub async fn check(config: &TvDbConfig) -> CheckResult {
    if config.api_key.as_deref().map_or(true, str::is_empty) {
        return CheckResult::fail(
            "TheTVDB API",
            "API key not configured",
            "Set TVDB_API_KEY environment variable or tvdb.api_key in config.toml",
        );
    }

    match TvDbClient::new(config.clone()) {
        Ok(client) => match client.verify_connection().await {
            Ok(true) => CheckResult::ok("TheTVDB API", "connected"),
            Ok(false) | Err(_) => CheckResult::fail(
                "TheTVDB API",
                "connection failed",
                "Check your network connection and tvdb.base_url",
            ),
        },
        Err(e) => CheckResult::fail("TheTVDB API", &e.to_string(), "Check tvdb settings in config.toml"),
    }
}
