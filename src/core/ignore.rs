//! Ignore list manager.

use crate::models::recording::{ItemKind, RecordingItem};
use crate::models::state::PersistedState;

/// Key an item is ignored by: series local name for TV, title for movies.
pub fn effective_key(item: &RecordingItem) -> Option<&str> {
    match item.kind {
        ItemKind::Tv => item.local_series_name(),
        ItemKind::Movie => Some(item.title.as_str()).filter(|t| !t.is_empty()),
    }
}

/// Whether the item's key is on the ignore list.
pub fn is_ignored(state: &PersistedState, item: &RecordingItem) -> bool {
    effective_key(item).map_or(false, |key| state.is_ignored(key))
}

/// Record the operator's ignore decision. Returns whether the list changed.
pub fn record_decision(state: &mut PersistedState, item: &RecordingItem, ignore: bool) -> bool {
    if !ignore {
        return false;
    }
    match effective_key(item) {
        Some(key) => {
            let added = state.add_ignore(key);
            if added {
                tracing::info!("Ignoring {} {:?} from now on", item.kind, key);
            }
            added
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_key() {
        assert_eq!(effective_key(&RecordingItem::tv("Bar", "Episode")), Some("Bar"));
        assert_eq!(effective_key(&RecordingItem::movie("Alien", Some(1979))), Some("Alien"));
        assert_eq!(effective_key(&RecordingItem::tv("", "Episode")), None);
    }

    #[test]
    fn test_is_ignored_exact_match() {
        let mut state = PersistedState::default();
        state.add_ignore("Bar");
        assert!(is_ignored(&state, &RecordingItem::tv("Bar", "Anything")));
        assert!(!is_ignored(&state, &RecordingItem::tv("bar", "Anything")));
        assert!(!is_ignored(&state, &RecordingItem::tv("Bar ", "Anything")));
        assert!(is_ignored(&state, &RecordingItem::movie("Bar", None)));
    }

    #[test]
    fn test_record_decision_is_idempotent() {
        let mut state = PersistedState::default();
        let item = RecordingItem::tv("Bar", "Episode");
        assert!(!record_decision(&mut state, &item, false));
        assert!(state.ignore_items.is_empty());
        assert!(record_decision(&mut state, &item, true));
        assert!(!record_decision(&mut state, &item, true));
        assert_eq!(state.ignore_items, vec!["Bar".to_string()]);
    }
}
