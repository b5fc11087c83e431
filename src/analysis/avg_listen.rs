//! Mean listening duration per song.

use super::desc_f64;
use crate::catalog::Catalog;
use crate::events::ListenEvent;
use crate::report::ReportRow;
use crate::table::format_float;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AvgListenTime {
    pub song_id: i64,
    pub title: String,
    pub artist: String,
    pub avg_duration_sec: f64,
}

impl ReportRow for AvgListenTime {
    const COLUMNS: &'static [&'static str] = &["song_id", "title", "artist", "avg_duration_sec"];

    fn fields(&self) -> Vec<String> {
        vec![
            self.song_id.to_string(),
            self.title.clone(),
            self.artist.clone(),
            format_float(self.avg_duration_sec),
        ]
    }
}

/// Average over every event of each catalogued song, longest first,
/// ties by ascending song id. Songs absent from the catalog are left out.
pub fn avg_listen_time(events: &[ListenEvent], catalog: &Catalog) -> Vec<AvgListenTime> {
    // Durations are unbounded; i128 keeps the per-song sum exact.
    let totals: HashMap<i64, (i128, u64)> = events.iter().fold(HashMap::new(), |mut acc, e| {
        let (sum, n) = acc.entry(e.song_id).or_insert((0, 0));
        *sum += i128::from(e.duration_sec);
        *n += 1;
        acc
    });

    let mut rows: Vec<AvgListenTime> = totals
        .into_iter()
        .filter_map(|(song_id, (sum, n))| {
            #[allow(clippy::cast_precision_loss)]
            let avg_duration_sec = sum as f64 / n as f64;
            catalog.get(song_id).map(|song| AvgListenTime {
                song_id,
                title: song.title.clone(),
                artist: song.artist.clone(),
                avg_duration_sec,
            })
        })
        .collect();

    rows.sort_by(|a, b| {
        desc_f64(a.avg_duration_sec, b.avg_duration_sec).then(a.song_id.cmp(&b.song_id))
    });
    rows
}
