//! Each user's most-played genre.

use crate::enrich::EnrichedEvent;
use crate::report::ReportRow;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FavoriteGenre {
    pub user_id: i64,
    pub genre: String,
    pub play_count: u64,
}

impl ReportRow for FavoriteGenre {
    const COLUMNS: &'static [&'static str] = &["user_id", "genre", "play_count"];

    fn fields(&self) -> Vec<String> {
        vec![
            self.user_id.to_string(),
            self.genre.clone(),
            self.play_count.to_string(),
        ]
    }
}

/// Per-user play counts by genre, keyed by user in ascending order.
pub(crate) fn genre_counts(enriched: &[EnrichedEvent]) -> BTreeMap<i64, HashMap<&str, u64>> {
    enriched.iter().fold(BTreeMap::new(), |mut acc, e| {
        *acc.entry(e.user_id)
            .or_insert_with(HashMap::new)
            .entry(e.genre.as_str())
            .or_insert(0) += 1;
        acc
    })
}

/// Highest count, ties going to the lexicographically smallest genre.
pub(crate) fn top_genre<'a>(counts: &HashMap<&'a str, u64>) -> Option<(&'a str, u64)> {
    counts
        .iter()
        .map(|(&genre, &count)| (genre, count))
        .max_by(|(ga, ca), (gb, cb)| ca.cmp(cb).then_with(|| gb.cmp(ga)))
}

/// One row per user with at least one enriched event, ascending by user id.
pub fn favorite_genres(enriched: &[EnrichedEvent]) -> Vec<FavoriteGenre> {
    genre_counts(enriched)
        .into_iter()
        .filter_map(|(user_id, counts)| {
            top_genre(&counts).map(|(genre, play_count)| FavoriteGenre {
                user_id,
                genre: genre.to_string(),
                play_count,
            })
        })
        .collect()
}
