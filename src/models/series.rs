//! Series identity model.

use crate::generators::folder::clean_folder_name;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Mapping from a local series name to its canonical catalog entry.
///
/// Field names follow the persisted state file layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesIdentity {
    /// Local series name (the key; never changes).
    #[serde(rename = "wmcName")]
    pub local_name: String,
    /// Canonical catalog id.
    #[serde(rename = "tvDbId", default)]
    pub canonical_id: Option<String>,
    /// Canonical catalog name.
    #[serde(rename = "tvDbName", default)]
    pub canonical_name: Option<String>,
    /// Sanitized folder name derived from the canonical name.
    #[serde(rename = "folderName", default)]
    pub folder_name: Option<String>,
    /// Extracted episode list file.
    #[serde(rename = "episodeDataFile", default)]
    pub catalog_file: Option<PathBuf>,
}

impl SeriesIdentity {
    /// Create a resolved identity for a local name.
    pub fn resolved(local_name: &str, canonical_id: &str, canonical_name: &str) -> Self {
        Self {
            local_name: local_name.to_string(),
            canonical_id: Some(canonical_id.to_string()),
            canonical_name: Some(canonical_name.to_string()),
            folder_name: Some(clean_folder_name(canonical_name)),
            catalog_file: None,
        }
    }

    /// Whether the identity points at a canonical series.
    pub fn is_resolved(&self) -> bool {
        self.canonical_id.is_some() && self.canonical_name.is_some()
    }

    /// Folder name, deriving it from the canonical name when not yet stored.
    pub fn folder(&self) -> Option<String> {
        self.folder_name
            .clone()
            .filter(|f| !f.is_empty())
            .or_else(|| self.canonical_name.as_deref().map(clean_folder_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolved_derives_folder() {
        let series = SeriesIdentity::resolved("Marvel's Agents", "263365", "Marvel's Agents: S.H.I.E.L.D.");
        assert!(series.is_resolved());
        assert_eq!(series.folder_name.as_deref(), Some("Marvel's Agents_ S.H.I.E.L.D"));
    }

    #[test]
    fn test_state_field_names() {
        let series = SeriesIdentity::resolved("Foo", "123", "Foo");
        let json = serde_json::to_value(&series).unwrap();
        assert_eq!(json["wmcName"], "Foo");
        assert_eq!(json["tvDbId"], "123");
        assert_eq!(json["tvDbName"], "Foo");
        assert_eq!(json["folderName"], "Foo");
        assert!(json["episodeDataFile"].is_null());
    }
}
