//! Folder name generator.

/// Characters removed from series folder names.
const FOLDER_BLACKLIST: &[char] = &[':', '!', '?'];

/// Characters that are invalid in a path component on any supported platform.
const INVALID_PATH_CHARS: &[char] = &['"', '<', '>', '|', '/', '\\'];

/// Generate the folder name for a canonical series name.
///
/// Blacklisted characters split the name; the remaining non-empty pieces are
/// joined with `_` and trailing dots are trimmed.
pub fn clean_folder_name(name: &str) -> String {
    split_and_join(name, FOLDER_BLACKLIST)
}

/// Generate the season folder name.
///
/// Format: `Season NN`
pub fn season_folder(season_number: u32) -> String {
    format!("Season {:02}", season_number)
}

/// Split on blacklisted and invalid characters, drop empty pieces, join with `_`.
pub(crate) fn split_and_join(name: &str, blacklist: &[char]) -> String {
    let joined = name
        .split(|c: char| blacklist.contains(&c) || INVALID_PATH_CHARS.contains(&c) || c.is_control())
        .filter(|piece| !piece.is_empty())
        .collect::<Vec<_>>()
        .join("_");
    joined.trim_end_matches('.').to_string()
}
