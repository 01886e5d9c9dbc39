//! TheTVDB XML document parsing.
//!
//! The legacy API returns flat documents: a root element holding repeated
//! records (`<Series>`, `<Episode>`) whose children are simple text fields,
//! or, for the change feed, repeated leaf elements.

use crate::models::recording::EpisodeRecord;
use crate::services::{ChangeFeed, SeriesCandidate};
use crate::{Error, Result};
use chrono::NaiveDate;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::collections::HashMap;

/// Text fields of one record element.
type Record = HashMap<String, String>;

/// Collect every `record_tag` element's child fields.
fn collect_records(content: &str, record_tag: &str) -> Result<Vec<Record>> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut records = Vec::new();
    let mut current: Option<Record> = None;
    let mut field: Option<String> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                if current.is_none() {
                    if name == record_tag {
                        current = Some(Record::new());
                    }
                } else {
                    field = Some(name);
                }
            }
            Event::Empty(e) => {
                if let Some(record) = current.as_mut() {
                    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    record.entry(name).or_default();
                }
            }
            Event::Text(e) => {
                if let (Some(record), Some(name)) = (current.as_mut(), field.as_ref()) {
                    let text = e.unescape()?;
                    record.entry(name.clone()).or_default().push_str(&text);
                }
            }
            Event::CData(e) => {
                if let (Some(record), Some(name)) = (current.as_mut(), field.as_ref()) {
                    let text = String::from_utf8_lossy(e.as_ref()).into_owned();
                    record.entry(name.clone()).or_default().push_str(&text);
                }
            }
            Event::End(e) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                if field.as_deref() == Some(name.as_str()) {
                    field = None;
                } else if name == record_tag {
                    if let Some(record) = current.take() {
                        records.push(record);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(records)
}

/// Collect the text of every `tag` leaf element.
fn collect_leaves(content: &str, tag: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut values = Vec::new();
    let mut inside = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                inside = e.name().as_ref() == tag.as_bytes();
                if inside {
                    values.push(String::new());
                }
            }
            Event::Text(e) => {
                if inside {
                    if let Some(last) = values.last_mut() {
                        last.push_str(&e.unescape()?);
                    }
                }
            }
            Event::End(_) => inside = false,
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(values)
}

fn non_empty(record: &Record, key: &str) -> Option<String> {
    record
        .get(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse a `GetSeries.php` response.
///
/// Records without an id or name are dropped.
pub fn parse_series_search(content: &str) -> Result<Vec<SeriesCandidate>> {
    let candidates = collect_records(content, "Series")?
        .iter()
        .filter_map(|record| {
            let id = non_empty(record, "id").or_else(|| non_empty(record, "seriesid"))?;
            let name = non_empty(record, "SeriesName")?;
            Some(SeriesCandidate {
                id,
                name,
                first_aired: non_empty(record, "FirstAired"),
            })
        })
        .collect();
    Ok(candidates)
}

/// Parse an `Updates.php` response.
pub fn parse_change_feed(content: &str) -> Result<ChangeFeed> {
    let time = collect_leaves(content, "Time")?
        .into_iter()
        .next()
        .ok_or_else(|| Error::Parse("change feed has no Time element".to_string()))?;
    let timestamp = time
        .trim()
        .parse::<i64>()
        .map_err(|_| Error::Parse(format!("invalid change feed time: {:?}", time)))?;

    let series_ids = collect_leaves(content, "Series")?
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    Ok(ChangeFeed {
        timestamp,
        series_ids,
    })
}

/// Parse an episode list document (`<Data><Episode>...</Episode></Data>`).
///
/// Unparseable numbers become 0 and unparseable dates are dropped.
pub fn parse_episode_list(content: &str) -> Result<Vec<EpisodeRecord>> {
    if !content.contains("<Data") {
        return Err(Error::Parse("episode list has no Data element".to_string()));
    }

    let episodes = collect_records(content, "Episode")?
        .iter()
        .map(|record| EpisodeRecord {
            name: record.get("EpisodeName").cloned().unwrap_or_default(),
            overview: record.get("Overview").cloned(),
            season_number: parse_number(record.get("SeasonNumber")),
            episode_number: parse_number(record.get("EpisodeNumber")),
            first_aired: record
                .get("FirstAired")
                .and_then(|d| NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d").ok()),
        })
        .collect();
    Ok(episodes)
}

fn parse_number(value: Option<&String>) -> u32 {
    value.and_then(|v| v.trim().parse().ok()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_series_search() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8" ?>
<Data>
  <Series>
    <seriesid>83462</seriesid>
    <language>en</language>
    <SeriesName>Castle (2009)</SeriesName>
    <Overview>After a serial killer imitates the plots of his novels...</Overview>
    <FirstAired>2009-03-09</FirstAired>
    <id>83462</id>
  </Series>
  <Series>
    <seriesid>70000</seriesid>
    <SeriesName>Castle &amp; Key</SeriesName>
    <id>70000</id>
  </Series>
  <Series>
    <id>1</id>
  </Series>
</Data>"#;

        let candidates = parse_series_search(xml).unwrap();
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].id, "83462");
        assert_eq!(candidates[0].name, "Castle (2009)");
        assert_eq!(candidates[0].first_aired.as_deref(), Some("2009-03-09"));
        assert_eq!(candidates[1].name, "Castle & Key");
        assert_eq!(candidates[1].first_aired, None);
    }

    #[test]
    fn test_parse_empty_search() {
        let candidates = parse_series_search("<?xml version=\"1.0\"?><Data></Data>").unwrap();
        assert!(candidates.is_empty());
    }

    #[test]
    fn test_parse_change_feed() {
        let xml = "<Items><Time>1400000000</Time><Series>83462</Series><Series>70000</Series><Episode>1</Episode></Items>";
        let feed = parse_change_feed(xml).unwrap();
        assert_eq!(feed.timestamp, 1_400_000_000);
        assert_eq!(feed.series_ids, vec!["83462".to_string(), "70000".to_string()]);
    }

    #[test]
    fn test_parse_change_feed_time_only() {
        let feed = parse_change_feed("<Items><Time>1300000000</Time></Items>").unwrap();
        assert_eq!(feed.timestamp, 1_300_000_000);
        assert!(feed.series_ids.is_empty());
    }

    #[test]
    fn test_parse_change_feed_rejects_missing_time() {
        assert!(parse_change_feed("<Items><Series>1</Series></Items>").is_err());
        assert!(parse_change_feed("<Items><Time>soon</Time></Items>").is_err());
    }

    #[test]
    fn test_parse_episode_list() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8" ?>
<Data>
  <Series>
    <id>83462</id>
    <SeriesName>Castle (2009)</SeriesName>
    <Overview>Series overview</Overview>
  </Series>
  <Episode>
    <id>1</id>
    <EpisodeName>Flowers for Your Grave</EpisodeName>
    <EpisodeNumber>1</EpisodeNumber>
    <FirstAired>2009-03-09</FirstAired>
    <Overview>A killer copies a novel.</Overview>
    <SeasonNumber>1</SeasonNumber>
  </Episode>
  <Episode>
    <EpisodeName>Unaired Pilot</EpisodeName>
    <EpisodeNumber>x</EpisodeNumber>
    <FirstAired/>
    <Overview/>
    <SeasonNumber>0</SeasonNumber>
  </Episode>
</Data>"#;

        let episodes = parse_episode_list(xml).unwrap();
        assert_eq!(episodes.len(), 2);
        assert_eq!(episodes[0].name, "Flowers for Your Grave");
        assert_eq!(episodes[0].season_number, 1);
        assert_eq!(episodes[0].episode_number, 1);
        assert_eq!(episodes[0].overview.as_deref(), Some("A killer copies a novel."));
        assert_eq!(episodes[0].first_aired, NaiveDate::from_ymd_opt(2009, 3, 9));
        assert_eq!(episodes[1].episode_number, 0);
        assert_eq!(episodes[1].first_aired, None);
        assert_eq!(episodes[1].overview.as_deref(), Some(""));
    }

    #[test]
    fn test_parse_episode_list_rejects_other_documents() {
        assert!(parse_episode_list("<html><body>Not found</body></html>").is_err());
        assert!(parse_episode_list("<Data><Episode><EpisodeName>x</Data>").is_err());
    }
}
