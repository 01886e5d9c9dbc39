//! Ignore command implementation.

use crate::core::store::StateStore;
use crate::models::config::Config;
use crate::Result;
use colored::Colorize;
use std::path::Path;

/// List ignored keys.
pub fn list(config: &Config, state_path: &Path) -> Result<()> {
    let store = StateStore::load(state_path, &config.working_directory);
    let keys = &store.state().ignore_items;

    if keys.is_empty() {
        println!("Ignore list is empty.");
        return Ok(());
    }
    for key in keys {
        println!("{}", key);
    }
    Ok(())
}

/// Add a key to the ignore list.
pub fn add(config: &Config, state_path: &Path, key: &str) -> Result<bool> {
    let mut store = StateStore::load(state_path, &config.working_directory);
    let added = store.state_mut().add_ignore(key);
    if added {
        store.save()?;
        println!("{} {}", "Ignoring".green(), key);
    } else {
        println!("{} is already ignored", key);
    }
    Ok(added)
}

/// Remove a key from the ignore list.
pub fn remove(config: &Config, state_path: &Path, key: &str) -> Result<bool> {
    let mut store = StateStore::load(state_path, &config.working_directory);
    let removed = store.state_mut().remove_ignore(key);
    if removed {
        store.save()?;
        println!("{} {}", "No longer ignoring".green(), key);
    } else {
        println!("{} {} was not ignored", "!".yellow(), key);
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_then_remove_persists() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let state_path = temp_dir.path().join("state.json");
        let config = Config {
            working_directory: temp_dir.path().to_path_buf(),
            ..Config::default()
        };

        assert!(add(&config, &state_path, "Bar").unwrap());
        assert!(!add(&config, &state_path, "Bar").unwrap());
        let store = StateStore::load(&state_path, temp_dir.path());
        assert_eq!(store.state().ignore_items, vec!["Bar".to_string()]);

        assert!(remove(&config, &state_path, "Bar").unwrap());
        assert!(!remove(&config, &state_path, "Bar").unwrap());
        let store = StateStore::load(&state_path, temp_dir.path());
        assert!(store.state().ignore_items.is_empty());
    }
}
