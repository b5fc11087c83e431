//! Most-played songs of the current ISO week.

use crate::enrich::EnrichedEvent;
use crate::report::ReportRow;
use chrono::{Datelike, Duration, NaiveDateTime};
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopSong {
    pub song_id: i64,
    pub title: String,
    pub artist: String,
    pub plays: u64,
}

impl ReportRow for TopSong {
    const COLUMNS: &'static [&'static str] = &["song_id", "title", "artist", "plays"];

    fn fields(&self) -> Vec<String> {
        vec![
            self.song_id.to_string(),
            self.title.clone(),
            self.artist.clone(),
            self.plays.to_string(),
        ]
    }
}

/// Monday 00:00:00 of the ISO week containing `as_of`.
#[must_use]
pub fn week_start(as_of: NaiveDateTime) -> NaiveDateTime {
    let monday = as_of.date() - Duration::days(i64::from(as_of.weekday().num_days_from_monday()));
    monday.and_time(chrono::NaiveTime::MIN)
}

/// Plays per song with `week_start(as_of) <= timestamp <= as_of`, most played
/// first, ties by ascending song id, truncated to `limit`.
pub fn top_songs(enriched: &[EnrichedEvent], as_of: NaiveDateTime, limit: usize) -> Vec<TopSong> {
    let start = week_start(as_of);

    let mut plays: HashMap<i64, (&EnrichedEvent, u64)> = HashMap::new();
    for e in enriched
        .iter()
        .filter(|e| e.timestamp >= start && e.timestamp <= as_of)
    {
        plays.entry(e.song_id).or_insert((e, 0)).1 += 1;
    }

    let mut rows: Vec<TopSong> = plays
        .into_values()
        .map(|(e, plays)| TopSong {
            song_id: e.song_id,
            title: e.title.clone(),
            artist: e.artist.clone(),
            plays,
        })
        .collect();
    rows.sort_by(|a, b| b.plays.cmp(&a.plays).then(a.song_id.cmp(&b.song_id)));
    rows.truncate(limit);
    rows
}
