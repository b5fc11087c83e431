//! Listening event log.

use crate::error::{PipelineError, Result};
use crate::table::RawTable;
use chrono::NaiveDateTime;
use log::info;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const TABLE_NAME: &str = "listening_logs";

/// Input and output timestamp layout.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One play. Repeats of the same (user, song, timestamp) are distinct plays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListenEvent {
    pub user_id: i64,
    pub song_id: i64,
    /// Local wall-clock time as logged; no timezone conversion is applied.
    pub timestamp: NaiveDateTime,
    pub duration_sec: i64,
}

/// Parse a timestamp in `YYYY-MM-DD HH:MM:SS` (a `T` separator is also accepted).
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .ok()
}

#[must_use]
pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

pub fn load(path: &Path) -> Result<Vec<ListenEvent>> {
    let events = from_table(&RawTable::read(TABLE_NAME, path)?)?;
    info!("Loaded {} listening events from {}", events.len(), path.display());
    Ok(events)
}

pub fn from_csv_str(text: &str) -> Result<Vec<ListenEvent>> {
    from_table(&RawTable::parse(TABLE_NAME, text)?)
}

fn from_table(table: &RawTable) -> Result<Vec<ListenEvent>> {
    let user_id = table.column("user_id")?;
    let song_id = table.column("song_id")?;
    let timestamp = table.column("timestamp")?;
    let duration = table.column("duration_sec")?;

    table
        .rows
        .iter()
        .map(|row| {
            let raw_ts = &row.fields[timestamp];
            let ts = parse_timestamp(raw_ts).ok_or_else(|| {
                PipelineError::schema(
                    TABLE_NAME,
                    row.line,
                    format!("timestamp `{}` is not YYYY-MM-DD HH:MM:SS", raw_ts.trim()),
                )
            })?;
            Ok(ListenEvent {
                user_id: table.parse_int(row, user_id, "user_id")?,
                song_id: table.parse_int(row, song_id, "song_id")?,
                timestamp: ts,
                duration_sec: table.parse_int(row, duration, "duration_sec")?,
            })
        })
        .collect()
}
