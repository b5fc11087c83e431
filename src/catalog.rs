//! Song catalog: the reference table every enriched report joins against.

use crate::error::{PipelineError, Result};
use crate::table::RawTable;
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

pub const TABLE_NAME: &str = "songs_metadata";

/// One catalog row. Loaded once per run and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Song {
    pub song_id: i64,
    pub title: String,
    pub artist: String,
    pub genre: String,
    pub mood: String,
}

/// Songs in input order plus an id index for the join.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    songs: Vec<Song>,
    by_id: HashMap<i64, usize>,
}

impl Catalog {
    /// Build a catalog, rejecting duplicate ids.
    pub fn new(songs: Vec<Song>) -> Result<Self> {
        Self::index(songs, |_| 0)
    }

    /// Index songs by id. `line_of` maps a song's position to its source line.
    fn index(songs: Vec<Song>, line_of: impl Fn(usize) -> usize) -> Result<Self> {
        let mut by_id = HashMap::with_capacity(songs.len());
        for (idx, song) in songs.iter().enumerate() {
            if by_id.insert(song.song_id, idx).is_some() {
                return Err(PipelineError::schema(
                    TABLE_NAME,
                    line_of(idx),
                    format!("duplicate song_id {}", song.song_id),
                ));
            }
        }
        Ok(Self { songs, by_id })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let catalog = Self::from_table(&RawTable::read(TABLE_NAME, path)?)?;
        info!("Loaded {} songs from {}", catalog.len(), path.display());
        Ok(catalog)
    }

    pub fn from_csv_str(text: &str) -> Result<Self> {
        Self::from_table(&RawTable::parse(TABLE_NAME, text)?)
    }

    fn from_table(table: &RawTable) -> Result<Self> {
        let song_id = table.column("song_id")?;
        let title = table.column("title")?;
        let artist = table.column("artist")?;
        let genre = table.column("genre")?;
        let mood = table.column("mood")?;

        let mut songs = Vec::with_capacity(table.rows.len());
        for row in &table.rows {
            songs.push(Song {
                song_id: table.parse_int(row, song_id, "song_id")?,
                title: row.fields[title].trim().to_string(),
                artist: row.fields[artist].trim().to_string(),
                genre: row.fields[genre].trim().to_string(),
                mood: row.fields[mood].trim().to_string(),
            });
        }
        Self::index(songs, |idx| table.rows[idx].line)
    }

    #[must_use]
    pub fn get(&self, song_id: i64) -> Option<&Song> {
        self.by_id.get(&song_id).map(|&idx| &self.songs[idx])
    }

    #[must_use]
    pub fn contains(&self, song_id: i64) -> bool {
        self.by_id.contains_key(&song_id)
    }

    pub fn songs(&self) -> &[Song] {
        &self.songs
    }

    /// Songs carrying `mood`, ascending by id.
    pub fn with_mood(&self, mood: &str) -> Vec<&Song> {
        let mut songs: Vec<&Song> = self.songs.iter().filter(|s| s.mood == mood).collect();
        songs.sort_by_key(|s| s.song_id);
        songs
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.songs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }
}
