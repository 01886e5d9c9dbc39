//! Episode matcher.
//!
//! Titles of the form `s01e03 Pilot` carry season and episode directly.
//! Anything else is looked up in the series' catalog through ordered tiers:
//! episode name, then overview, then first-aired date. The first tier with
//! any candidate decides; several candidates are narrowed by broadcast date
//! and, if still ambiguous, put to the operator.

use crate::decision::{Choice, DecisionProvider};
use crate::models::recording::{EpisodeRecord, ItemKind, RecordingItem};
use crate::services::xml;
use crate::{Error, Result};
use std::fs;
use std::path::Path;
use tokio_util::sync::CancellationToken;

/// Season, episode and name taken from a recording title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleEpisode {
    pub season: u32,
    pub episode: u32,
    pub name: String,
}

impl From<TitleEpisode> for EpisodeRecord {
    fn from(parsed: TitleEpisode) -> Self {
        EpisodeRecord {
            name: parsed.name,
            season_number: parsed.season,
            episode_number: parsed.episode,
            ..Default::default()
        }
    }
}

/// Parse `s<digits>e<digits> <name>` anywhere in a title (case-sensitive).
pub fn parse_title_episode(title: &str) -> Option<TitleEpisode> {
    let re = regex::Regex::new(r"s(\d+)e(\d+)\s(.+$)").ok()?;
    let caps = re.captures(title)?;

    let season = caps.get(1)?.as_str().parse().ok()?;
    let episode = caps.get(2)?.as_str().parse().ok()?;
    let name = caps.get(3)?.as_str().to_string();

    Some(TitleEpisode {
        season,
        episode,
        name,
    })
}

/// Set the item's episode from its title when the title encodes one.
pub fn apply_title_episode(item: &mut RecordingItem) -> bool {
    if item.kind != ItemKind::Tv || item.episode.is_some() {
        return false;
    }
    match parse_title_episode(&item.title) {
        Some(parsed) => {
            tracing::debug!(
                "Title {:?} gives s{:02}e{:02}",
                item.title,
                parsed.season,
                parsed.episode
            );
            item.episode = Some(parsed.into());
            true
        }
        None => false,
    }
}

/// Read and parse a cached catalog file.
pub fn load_catalog(path: &Path) -> Result<Vec<EpisodeRecord>> {
    let content = fs::read_to_string(path)
        .map_err(|e| Error::Parse(format!("cannot read {}: {}", path.display(), e)))?;
    xml::parse_episode_list(&content)
}

/// Which field a set of candidates was matched on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchTier {
    Name,
    Overview,
    AirDate,
}

/// Result of matching one item.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchOutcome {
    /// The item already had an episode.
    AlreadyMatched,
    /// Episode identified.
    Matched(EpisodeRecord),
    /// No candidate, or the operator skipped.
    Unmatched,
}

/// Candidates from the first tier that yields any.
pub fn tier_candidates<'e>(
    item: &RecordingItem,
    episodes: &'e [EpisodeRecord],
) -> Option<(MatchTier, Vec<&'e EpisodeRecord>)> {
    let title = Some(item.title.as_str()).filter(|t| !t.trim().is_empty());
    let description = Some(item.description.as_str()).filter(|d| !d.trim().is_empty());
    let day = item.broadcast_day();

    for tier in [MatchTier::Name, MatchTier::Overview, MatchTier::AirDate] {
        let candidates: Vec<&EpisodeRecord> = episodes
            .iter()
            .filter(|e| match tier {
                MatchTier::Name => title.map_or(false, |t| e.name == t),
                MatchTier::Overview => description.map_or(false, |d| e.overview.as_deref() == Some(d)),
                MatchTier::AirDate => day.is_some() && e.first_aired == day,
            })
            .collect();
        if !candidates.is_empty() {
            return Some((tier, candidates));
        }
    }
    None
}

/// Matches items against catalogs, asking when ambiguous.
pub struct EpisodeMatcher<'a> {
    decisions: &'a dyn DecisionProvider,
}

impl<'a> EpisodeMatcher<'a> {
    /// Create a matcher.
    pub fn new(decisions: &'a dyn DecisionProvider) -> Self {
        Self { decisions }
    }

    /// Match one item against its series' episodes.
    pub async fn match_item(
        &self,
        item: &RecordingItem,
        episodes: &[EpisodeRecord],
        cancel: &CancellationToken,
    ) -> Result<MatchOutcome> {
        if item.episode.is_some() {
            return Ok(MatchOutcome::AlreadyMatched);
        }

        let Some((tier, candidates)) = tier_candidates(item, episodes) else {
            tracing::debug!("No episode match for {}", item.label());
            return Ok(MatchOutcome::Unmatched);
        };

        if let [only] = candidates.as_slice() {
            tracing::debug!("{} matched by {:?}: {}", item.label(), tier, only.label());
            return Ok(MatchOutcome::Matched((*only).clone()));
        }

        let narrowed: Vec<&EpisodeRecord> = match item.broadcast_day() {
            Some(day) => candidates
                .iter()
                .copied()
                .filter(|e| e.first_aired == Some(day))
                .collect(),
            None => Vec::new(),
        };
        if let [only] = narrowed.as_slice() {
            tracing::debug!("{} matched by {:?} and air date", item.label(), tier);
            return Ok(MatchOutcome::Matched((*only).clone()));
        }

        let offered = if narrowed.len() >= 2 { narrowed } else { candidates };
        let options: Vec<String> = offered.iter().map(|e| e.label()).collect();
        let prompt = format!("Multiple episode match for {}", item.label());

        match self.decisions.choose(&prompt, &options, cancel).await? {
            Choice::Selected(index) => match offered.get(index) {
                Some(episode) => Ok(MatchOutcome::Matched((*episode).clone())),
                None => Ok(MatchOutcome::Unmatched),
            },
            Choice::Skipped => {
                tracing::info!("Episode for {} skipped", item.label());
                Ok(MatchOutcome::Unmatched)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decision::{ScriptedAnswer, ScriptedDecisions};
    use chrono::NaiveDate;

    fn episode(name: &str, season: u32, number: u32, aired: Option<(i32, u32, u32)>) -> EpisodeRecord {
        EpisodeRecord {
            name: name.to_string(),
            overview: None,
            season_number: season,
            episode_number: number,
            first_aired: aired.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d)),
        }
    }

    fn at(y: i32, m: u32, d: u32) -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(20, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_parse_title_episode() {
        let parsed = parse_title_episode("s01e03 Pilot").unwrap();
        assert_eq!(parsed.season, 1);
        assert_eq!(parsed.episode, 3);
        assert_eq!(parsed.name, "Pilot");

        let parsed = parse_title_episode("Foo s12e104 The Long Night").unwrap();
        assert_eq!(parsed.season, 12);
        assert_eq!(parsed.episode, 104);
        assert_eq!(parsed.name, "The Long Night");
    }

    #[test]
    fn test_parse_title_episode_rejects() {
        assert!(parse_title_episode("Pilot").is_none());
        assert!(parse_title_episode("S01E03 Pilot").is_none());
        assert!(parse_title_episode("s01e03Pilot").is_none());
        assert!(parse_title_episode("s01e03 ").is_none());
    }

    #[test]
    fn test_apply_title_episode() {
        let mut item = RecordingItem::tv("Foo", "s01e03 Pilot");
        assert!(apply_title_episode(&mut item));
        let episode = item.episode.clone().unwrap();
        assert_eq!(episode.season_number, 1);
        assert_eq!(episode.episode_number, 3);
        assert_eq!(episode.name, "Pilot");
        assert!(!apply_title_episode(&mut item));

        let mut movie = RecordingItem::movie("s01e03 Pilot", None);
        assert!(!apply_title_episode(&mut movie));
    }

    #[test]
    fn test_tier_order_name_first() {
        let mut by_overview = episode("Other", 1, 2, Some((2020, 1, 8)));
        by_overview.overview = Some("A town.".to_string());
        let episodes = vec![episode("Pilot", 1, 1, None), by_overview];

        let item = RecordingItem::tv("Foo", "Pilot").with_description("A town.");
        let (tier, candidates) = tier_candidates(&item, &episodes).unwrap();
        assert_eq!(tier, MatchTier::Name);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].episode_number, 1);
    }

    #[test]
    fn test_tier_falls_through_on_zero() {
        let mut by_overview = episode("Other", 1, 2, None);
        by_overview.overview = Some("A town.".to_string());
        let episodes = vec![by_overview, episode("Third", 1, 3, Some((2020, 1, 15)))];

        let item = RecordingItem::tv("Foo", "Unknown").with_description("A town.");
        assert_eq!(tier_candidates(&item, &episodes).unwrap().0, MatchTier::Overview);

        let item = RecordingItem::tv("Foo", "Unknown").with_broadcast(at(2020, 1, 15));
        let (tier, candidates) = tier_candidates(&item, &episodes).unwrap();
        assert_eq!(tier, MatchTier::AirDate);
        assert_eq!(candidates[0].episode_number, 3);
    }

    #[test]
    fn test_blank_fields_never_match() {
        let episodes = vec![episode("", 1, 1, None)];
        let item = RecordingItem::tv("Foo", "");
        assert!(tier_candidates(&item, &episodes).is_none());
    }

    #[test]
    fn test_matching_is_case_sensitive() {
        let episodes = vec![episode("Pilot", 1, 1, None)];
        let item = RecordingItem::tv("Foo", "pilot");
        assert!(tier_candidates(&item, &episodes).is_none());
    }

    #[tokio::test]
    async fn test_duplicate_names_narrowed_by_date() {
        let episodes = vec![
            episode("Pilot", 1, 1, Some((2019, 9, 1))),
            episode("Pilot", 2, 1, Some((2020, 9, 6))),
        ];
        let item = RecordingItem::tv("Foo", "Pilot").with_broadcast(at(2020, 9, 6));
        let decisions = ScriptedDecisions::silent();
        let matcher = EpisodeMatcher::new(&decisions);

        let outcome = matcher
            .match_item(&item, &episodes, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(outcome, MatchOutcome::Matched(episodes[1].clone()));
        assert_eq!(decisions.prompt_count(), 0);
    }

    #[tokio::test]
    async fn test_ambiguous_asks_and_skip_leaves_unmatched() {
        let episodes = vec![episode("Pilot", 1, 1, None), episode("Pilot", 2, 1, None)];
        let item = RecordingItem::tv("Foo", "Pilot");
        let decisions = ScriptedDecisions::new(vec![ScriptedAnswer::Choose(Choice::Skipped)]);
        let matcher = EpisodeMatcher::new(&decisions);

        let outcome = matcher
            .match_item(&item, &episodes, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(outcome, MatchOutcome::Unmatched);
        assert_eq!(decisions.prompts(), vec!["Multiple episode match for Foo: Pilot".to_string()]);
    }

    #[tokio::test]
    async fn test_ambiguous_selection() {
        let episodes = vec![episode("Pilot", 1, 1, None), episode("Pilot", 2, 1, None)];
        let item = RecordingItem::tv("Foo", "Pilot");
        let decisions = ScriptedDecisions::new(vec![ScriptedAnswer::Choose(Choice::Selected(1))]);
        let matcher = EpisodeMatcher::new(&decisions);

        let outcome = matcher
            .match_item(&item, &episodes, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(outcome, MatchOutcome::Matched(episodes[1].clone()));
    }

    #[tokio::test]
    async fn test_already_matched_is_untouched() {
        let mut item = RecordingItem::tv("Foo", "s01e03 Pilot");
        apply_title_episode(&mut item);
        let decisions = ScriptedDecisions::silent();
        let matcher = EpisodeMatcher::new(&decisions);

        let outcome = matcher
            .match_item(&item, &[], &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(outcome, MatchOutcome::AlreadyMatched);
    }
}
