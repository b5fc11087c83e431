//! Users who play music in the small hours.

use crate::events::ListenEvent;
use crate::report::ReportRow;
use chrono::Timelike;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NightOwl {
    pub user_id: i64,
    pub night_listens: u64,
}

impl ReportRow for NightOwl {
    const COLUMNS: &'static [&'static str] = &["user_id", "night_listens"];

    fn fields(&self) -> Vec<String> {
        vec![self.user_id.to_string(), self.night_listens.to_string()]
    }
}

/// Count raw events whose hour lies in `[start_hour, end_hour)`. Events for
/// songs missing from the catalog still count. Most night plays first, ties by
/// ascending user id.
pub fn night_owls(events: &[ListenEvent], start_hour: u32, end_hour: u32) -> Vec<NightOwl> {
    let counts: HashMap<i64, u64> = events
        .iter()
        .filter(|e| (start_hour..end_hour).contains(&e.timestamp.hour()))
        .fold(HashMap::new(), |mut acc, e| {
            *acc.entry(e.user_id).or_insert(0) += 1;
            acc
        });

    let mut rows: Vec<NightOwl> = counts
        .into_iter()
        .map(|(user_id, night_listens)| NightOwl {
            user_id,
            night_listens,
        })
        .collect();
    rows.sort_by(|a, b| {
        b.night_listens
            .cmp(&a.night_listens)
            .then(a.user_id.cmp(&b.user_id))
    });
    rows
}
