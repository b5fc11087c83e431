//! Report tables and how they reach disk.
//!
//! Every report is written as `<output>/<report dir>/data.csv` with a header
//! row, also when it has no data rows. Writing is staged: all tables go into a
//! temporary directory under the output directory first, and only when every
//! one of them is on disk are they moved into place.

use crate::analysis::{
    AvgListenTime, FavoriteGenre, LoyaltyScore, NightOwl, Recommendation, TopSong,
};
use crate::enrich::EnrichedEvent;
use crate::error::{PipelineError, Result};
use crate::events::format_timestamp;
use crate::table;
use clap::ValueEnum;
use log::{debug, info};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// File name used inside each report directory.
pub const DATA_FILE: &str = "data.csv";

/// A row type that can be rendered as one line of a report.
pub trait ReportRow {
    const COLUMNS: &'static [&'static str];

    fn fields(&self) -> Vec<String>;
}

impl ReportRow for EnrichedEvent {
    const COLUMNS: &'static [&'static str] = &[
        "song_id",
        "user_id",
        "timestamp",
        "duration_sec",
        "title",
        "artist",
        "genre",
        "mood",
    ];

    fn fields(&self) -> Vec<String> {
        vec![
            self.song_id.to_string(),
            self.user_id.to_string(),
            format_timestamp(&self.timestamp),
            self.duration_sec.to_string(),
            self.title.clone(),
            self.artist.clone(),
            self.genre.clone(),
            self.mood.clone(),
        ]
    }
}

/// The tables a run can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum ReportKind {
    FavoriteGenres,
    AvgListenTime,
    TopSongs,
    HappyRecommendations,
    GenreLoyalty,
    NightOwls,
    EnrichedLogs,
}

impl ReportKind {
    /// The six analyzer reports, in write order.
    pub const ANALYZERS: [Self; 6] = [
        Self::FavoriteGenres,
        Self::AvgListenTime,
        Self::TopSongs,
        Self::HappyRecommendations,
        Self::GenreLoyalty,
        Self::NightOwls,
    ];

    /// Directory name under the output directory.
    #[must_use]
    pub const fn dir_name(self) -> &'static str {
        match self {
            Self::FavoriteGenres => "user_favorite_genres",
            Self::AvgListenTime => "avg_listen_time_per_song",
            Self::TopSongs => "top_songs_this_week",
            Self::HappyRecommendations => "happy_recommendations",
            Self::GenreLoyalty => "genre_loyalty_scores",
            Self::NightOwls => "night_owl_users",
            Self::EnrichedLogs => "enriched_logs",
        }
    }

    #[must_use]
    pub fn columns(self) -> &'static [&'static str] {
        match self {
            Self::FavoriteGenres => FavoriteGenre::COLUMNS,
            Self::AvgListenTime => AvgListenTime::COLUMNS,
            Self::TopSongs => TopSong::COLUMNS,
            Self::HappyRecommendations => Recommendation::COLUMNS,
            Self::GenreLoyalty => LoyaltyScore::COLUMNS,
            Self::NightOwls => NightOwl::COLUMNS,
            Self::EnrichedLogs => EnrichedEvent::COLUMNS,
        }
    }
}

/// A rendered report: fixed columns plus string cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub kind: ReportKind,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn from_rows<R: ReportRow>(kind: ReportKind, rows: &[R]) -> Self {
        debug_assert_eq!(kind.columns(), R::COLUMNS);
        Self {
            kind,
            rows: rows.iter().map(ReportRow::fields).collect(),
        }
    }

    #[must_use]
    pub fn to_csv(&self) -> String {
        table::render(self.kind.columns(), &self.rows)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// All rows computed by one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reports {
    pub favorite_genres: Vec<FavoriteGenre>,
    pub avg_listen_time: Vec<AvgListenTime>,
    pub top_songs: Vec<TopSong>,
    pub happy_recommendations: Vec<Recommendation>,
    pub genre_loyalty: Vec<LoyaltyScore>,
    pub night_owls: Vec<NightOwl>,
    /// Present only when the run was asked to keep the joined table.
    #[serde(skip)]
    pub enriched_logs: Option<Vec<EnrichedEvent>>,
}

impl Reports {
    /// Render every table, analyzers first, then the enriched log if kept.
    #[must_use]
    pub fn tables(&self) -> Vec<Table> {
        let mut tables = vec![
            Table::from_rows(ReportKind::FavoriteGenres, &self.favorite_genres),
            Table::from_rows(ReportKind::AvgListenTime, &self.avg_listen_time),
            Table::from_rows(ReportKind::TopSongs, &self.top_songs),
            Table::from_rows(ReportKind::HappyRecommendations, &self.happy_recommendations),
            Table::from_rows(ReportKind::GenreLoyalty, &self.genre_loyalty),
            Table::from_rows(ReportKind::NightOwls, &self.night_owls),
        ];
        if let Some(enriched) = &self.enriched_logs {
            tables.push(Table::from_rows(ReportKind::EnrichedLogs, enriched));
        }
        tables
    }

    /// Serialize one report's rows as pretty JSON.
    pub fn to_json(&self, kind: ReportKind) -> serde_json::Result<String> {
        match kind {
            ReportKind::FavoriteGenres => serde_json::to_string_pretty(&self.favorite_genres),
            ReportKind::AvgListenTime => serde_json::to_string_pretty(&self.avg_listen_time),
            ReportKind::TopSongs => serde_json::to_string_pretty(&self.top_songs),
            ReportKind::HappyRecommendations => {
                serde_json::to_string_pretty(&self.happy_recommendations)
            }
            ReportKind::GenreLoyalty => serde_json::to_string_pretty(&self.genre_loyalty),
            ReportKind::NightOwls => serde_json::to_string_pretty(&self.night_owls),
            ReportKind::EnrichedLogs => {
                serde_json::to_string_pretty(self.enriched_logs.as_deref().unwrap_or_default())
            }
        }
    }

    /// Render one report as CSV text.
    #[must_use]
    pub fn to_csv(&self, kind: ReportKind) -> String {
        match kind {
            ReportKind::EnrichedLogs => Table::from_rows(
                kind,
                self.enriched_logs.as_deref().unwrap_or_default(),
            )
            .to_csv(),
            _ => self
                .tables()
                .into_iter()
                .find(|t| t.kind == kind)
                .map(|t| t.to_csv())
                .unwrap_or_else(|| table::render(kind.columns(), &[])),
        }
    }
}

/// Write every table under `output_dir`, replacing directories from an earlier
/// run. Returns the written data file paths in table order.
pub fn write_tables(output_dir: &Path, tables: &[Table]) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(output_dir).map_err(|e| PipelineError::io(output_dir, e))?;

    let staging = tempfile::Builder::new()
        .prefix(".staging-")
        .tempdir_in(output_dir)
        .map_err(|e| PipelineError::io(output_dir, e))?;

    for t in tables {
        let dir = staging.path().join(t.kind.dir_name());
        fs::create_dir_all(&dir).map_err(|e| PipelineError::io(&dir, e))?;
        let file = dir.join(DATA_FILE);
        fs::write(&file, t.to_csv()).map_err(|e| PipelineError::io(&file, e))?;
        debug!("Staged {} ({} rows)", t.kind.dir_name(), t.len());
    }

    let mut written = Vec::with_capacity(tables.len());
    for t in tables {
        let target = output_dir.join(t.kind.dir_name());
        if target.exists() {
            fs::remove_dir_all(&target).map_err(|e| PipelineError::io(&target, e))?;
        }
        fs::rename(staging.path().join(t.kind.dir_name()), &target)
            .map_err(|e| PipelineError::io(&target, e))?;
        info!("Wrote {} rows to {}", t.len(), target.display());
        written.push(target.join(DATA_FILE));
    }
    Ok(written)
}
