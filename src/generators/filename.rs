//! Target filename generator.
//!
//! Proposes deterministic names for matched recordings. Nothing here touches
//! the file system.

use super::folder::{season_folder, split_and_join};
use crate::models::recording::{EpisodeRecord, ItemKind, RecordingItem};
use std::path::{Path, PathBuf};

/// Extension used when the recording has no source file.
const DEFAULT_EXTENSION: &str = "wtv";

/// Characters removed from episode names.
const FILE_BLACKLIST: &[char] = &['\\', '/', ':'];

/// Generate TV episode filename.
///
/// Format: `${folder} - s${seasonNr2}e${episodeNr2} - ${episodeName}.${ext}`
pub fn generate_episode_filename(folder: &str, episode: &EpisodeRecord, extension: &str) -> String {
    format!(
        "{} - s{:02}e{:02} - {}.{}",
        folder,
        episode.season_number,
        episode.episode_number,
        clean_file_name(&episode.name),
        extension
    )
}

/// Generate movie filename.
///
/// Format: `${fileStemBeforeUnderscore} (${year}).${ext}`
pub fn generate_movie_filename(file_stem: &str, year: Option<u16>, extension: &str) -> String {
    let base = match file_stem.find('_') {
        Some(index) if index > 0 => &file_stem[..index],
        _ => file_stem,
    };
    match year {
        Some(y) => format!("{} ({}).{}", base, y, extension),
        None => format!("{}.{}", base, extension),
    }
}

/// Propose a target path, relative to the destination root, for a recording.
///
/// Returns `None` until enough is known (TV needs series and episode).
pub fn proposed_target(item: &RecordingItem) -> Option<PathBuf> {
    let extension = item
        .file
        .as_deref()
        .and_then(extension_of)
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string());

    match item.kind {
        ItemKind::Tv => {
            let folder = item.series.as_ref()?.folder()?;
            let episode = item.episode.as_ref()?;
            Some(
                PathBuf::from(&folder)
                    .join(season_folder(episode.season_number))
                    .join(generate_episode_filename(&folder, episode, &extension)),
            )
        }
        ItemKind::Movie => {
            let stem = item
                .file
                .as_deref()
                .and_then(|f| f.file_stem())
                .and_then(|s| s.to_str())
                .map(str::to_string)
                .unwrap_or_else(|| clean_file_name(&item.title));
            Some(PathBuf::from(generate_movie_filename(
                &stem,
                item.release_year,
                &extension,
            )))
        }
    }
}

/// Clean an episode name for use in a filename.
pub fn clean_file_name(name: &str) -> String {
    split_and_join(name, FILE_BLACKLIST)
}

fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_string())
}
