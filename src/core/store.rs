//! Persisted state store.
//!
//! Loaded once at start and saved after each phase. A save always writes a
//! complete snapshot atomically, and an unreadable state file is set aside
//! rather than overwritten.

use crate::models::state::PersistedState;
use crate::utils::fs::{sibling_with_suffix, write_atomic};
use crate::{Error, Result};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// State file plus its in-memory contents.
#[derive(Debug)]
pub struct StateStore {
    path: PathBuf,
    state: PersistedState,
}

impl StateStore {
    /// Load the state file.
    ///
    /// Never fails: a missing file yields an empty state, and an unreadable
    /// one is copied to `*.corrupt` before falling back to an empty state.
    pub fn load(path: &Path, default_working_dir: &Path) -> Self {
        let mut state = match read_state(path) {
            Ok(Some(state)) => {
                tracing::info!(
                    "Loaded state: {} series, {} ignored, cursor {}",
                    state.series.len(),
                    state.ignore_items.len(),
                    state.update_cursor
                );
                state
            }
            Ok(None) => {
                tracing::info!("No state file at {}, starting fresh", path.display());
                PersistedState::default()
            }
            Err(e) => {
                tracing::error!("Error loading state {}: {}", path.display(), e);
                let corrupt = sibling_with_suffix(path, ".corrupt");
                match fs::copy(path, &corrupt) {
                    Ok(_) => tracing::warn!("Unreadable state kept at {}", corrupt.display()),
                    Err(copy_err) => tracing::error!(
                        "Could not preserve unreadable state {}: {}",
                        path.display(),
                        copy_err
                    ),
                }
                PersistedState::default()
            }
        };

        dedupe_series(&mut state);
        if state.working_directory.as_os_str().is_empty() {
            state.working_directory = default_working_dir.to_path_buf();
        }

        Self {
            path: path.to_path_buf(),
            state,
        }
    }

    /// Wrap an in-memory state (tests, tools).
    pub fn with_state(path: &Path, state: PersistedState) -> Self {
        Self {
            path: path.to_path_buf(),
            state,
        }
    }

    /// State file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current state.
    pub fn state(&self) -> &PersistedState {
        &self.state
    }

    /// Current state, mutable.
    pub fn state_mut(&mut self) -> &mut PersistedState {
        &mut self.state
    }

    /// Save a complete snapshot.
    ///
    /// The previous file is kept as `*.backup`. On failure the in-memory
    /// state is untouched so a later save can retry.
    pub fn save(&self) -> Result<()> {
        let content = serde_json::to_string_pretty(&self.state)?;

        if self.path.exists() {
            let backup = sibling_with_suffix(&self.path, ".backup");
            if let Err(e) = fs::copy(&self.path, &backup) {
                tracing::warn!("Could not back up state to {}: {}", backup.display(), e);
            }
        }

        write_atomic(&self.path, content.as_bytes()).map_err(|e| {
            Error::Persistence(format!("cannot write {}: {}", self.path.display(), e))
        })?;

        tracing::debug!("State saved to: {}", self.path.display());
        Ok(())
    }

    /// Save, logging instead of returning a failure.
    pub fn save_logged(&self, phase: &str) -> bool {
        match self.save() {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("Error saving state after {}: {}", phase, e);
                false
            }
        }
    }
}

fn read_state(path: &Path) -> Result<Option<PersistedState>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)
        .map_err(|e| Error::Persistence(format!("cannot read {}: {}", path.display(), e)))?;
    let state = serde_json::from_str(&content)?;
    Ok(Some(state))
}

/// Keep the first mapping per local name.
fn dedupe_series(state: &mut PersistedState) {
    let mut seen = HashSet::new();
    state.series.retain(|series| {
        if seen.insert(series.local_name.clone()) {
            true
        } else {
            tracing::warn!(
                "Duplicate series mapping for {:?} in state file; keeping the first",
                series.local_name
            );
            false
        }
    });
}
