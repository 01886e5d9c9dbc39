//! Recording source: reads the batch of recordings to reconcile.

use crate::models::recording::RecordingItem;
use crate::{Error, Result};
use std::fs;
use std::path::Path;

/// Load recording items from a JSON array.
pub fn load_recordings(path: &Path) -> Result<Vec<RecordingItem>> {
    if !path.exists() {
        return Err(Error::PathNotFound(path.display().to_string()));
    }

    let content = fs::read_to_string(path)?;
    let items: Vec<RecordingItem> = serde_json::from_str(&content)?;

    tracing::info!("Loaded {} recordings from {}", items.len(), path.display());
    Ok(items)
}
