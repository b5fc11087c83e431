//! Happy-song recommendations for users who mostly listen to sad songs.
//!
//! Users are partitioned by id; for each partition the sad ratio decides
//! eligibility and an anti-join against the user's heard songs yields the
//! candidates. Partitions are concatenated in ascending user order, and
//! candidates are taken in ascending song order, so the output is stable
//! across runs.

use crate::catalog::{Catalog, Song};
use crate::enrich::EnrichedEvent;
use crate::report::ReportRow;
use log::debug;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recommendation {
    pub user_id: i64,
    pub song_id: i64,
    pub title: String,
    pub artist: String,
}

impl ReportRow for Recommendation {
    const COLUMNS: &'static [&'static str] = &["user_id", "song_id", "title", "artist"];

    fn fields(&self) -> Vec<String> {
        vec![
            self.user_id.to_string(),
            self.song_id.to_string(),
            self.title.clone(),
            self.artist.clone(),
        ]
    }
}

/// Listening summary for one user partition.
#[derive(Debug, Default)]
struct UserMoodProfile {
    total: u64,
    sad: u64,
    heard: HashSet<i64>,
}

impl UserMoodProfile {
    #[allow(clippy::cast_precision_loss)]
    fn sad_ratio(&self) -> f64 {
        self.sad as f64 / self.total as f64
    }
}

/// Policy knobs for [`recommend`].
#[derive(Debug, Clone, Copy)]
pub struct RecommendPolicy<'a> {
    pub sad_ratio_threshold: f64,
    pub max_per_user: usize,
    pub happy_mood: &'a str,
    pub sad_mood: &'a str,
}

impl Default for RecommendPolicy<'_> {
    fn default() -> Self {
        Self {
            sad_ratio_threshold: 0.3,
            max_per_user: 3,
            happy_mood: "Happy",
            sad_mood: "Sad",
        }
    }
}

fn profiles(enriched: &[EnrichedEvent], sad_mood: &str) -> BTreeMap<i64, UserMoodProfile> {
    enriched.iter().fold(BTreeMap::new(), |mut acc, e| {
        let profile: &mut UserMoodProfile = acc.entry(e.user_id).or_default();
        profile.total += 1;
        if e.mood == sad_mood {
            profile.sad += 1;
        }
        profile.heard.insert(e.song_id);
        acc
    })
}

/// Up to `max_per_user` unheard happy songs for every user whose sad ratio is
/// strictly above the threshold. Rows are ordered by user, then song id.
pub fn recommend(
    enriched: &[EnrichedEvent],
    catalog: &Catalog,
    policy: RecommendPolicy<'_>,
) -> Vec<Recommendation> {
    let happy: Vec<&Song> = catalog.with_mood(policy.happy_mood);
    let profiles = profiles(enriched, policy.sad_mood);

    let eligible: Vec<(i64, UserMoodProfile)> = profiles
        .into_iter()
        .filter(|(_, p)| p.sad_ratio() > policy.sad_ratio_threshold)
        .collect();
    debug!(
        "{} user(s) above sad ratio {}, {} happy song(s) in catalog",
        eligible.len(),
        policy.sad_ratio_threshold,
        happy.len()
    );

    eligible
        .into_iter()
        .flat_map(|(user_id, profile)| {
            happy
                .iter()
                .filter(move |song| !profile.heard.contains(&song.song_id))
                .take(policy.max_per_user)
                .map(move |song| Recommendation {
                    user_id,
                    song_id: song.song_id,
                    title: song.title.clone(),
                    artist: song.artist.clone(),
                })
                .collect::<Vec<_>>()
        })
        .collect()
}
