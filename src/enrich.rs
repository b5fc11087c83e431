//! Inner join of the event log against the catalog.

use crate::catalog::Catalog;
use crate::events::ListenEvent;
use chrono::NaiveDateTime;
use log::info;
use serde::{Deserialize, Serialize};

/// A listening event carrying its song's metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichedEvent {
    pub song_id: i64,
    pub user_id: i64,
    pub timestamp: NaiveDateTime,
    pub duration_sec: i64,
    pub title: String,
    pub artist: String,
    pub genre: String,
    pub mood: String,
}

/// Join every event whose song exists in the catalog. Events pointing at
/// unknown songs are dropped; nothing is deduplicated. Output keeps event order.
pub fn enrich(events: &[ListenEvent], catalog: &Catalog) -> Vec<EnrichedEvent> {
    let enriched: Vec<EnrichedEvent> = events
        .iter()
        .filter_map(|event| {
            catalog.get(event.song_id).map(|song| EnrichedEvent {
                song_id: event.song_id,
                user_id: event.user_id,
                timestamp: event.timestamp,
                duration_sec: event.duration_sec,
                title: song.title.clone(),
                artist: song.artist.clone(),
                genre: song.genre.clone(),
                mood: song.mood.clone(),
            })
        })
        .collect();

    let gaps = events.len() - enriched.len();
    if gaps > 0 {
        info!("{gaps} event(s) reference songs missing from the catalog; left out of the join");
    }
    enriched
}

/// Number of events whose song id has no catalog entry.
#[must_use]
pub fn count_referential_gaps(events: &[ListenEvent], catalog: &Catalog) -> usize {
    events.iter().filter(|e| !catalog.contains(e.song_id)).count()
}
