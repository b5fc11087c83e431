//! # Configuration Module
//!
//! Policy values for the analytics pipeline. The join and aggregation mechanics
//! never embed these numbers; every analyzer reads them from [`PipelineConfig`].
//!
//! ## Lookup Order
//!
//! 1. An explicit `--config <file.json>` path
//! 2. `pipeline.json` in the platform config directory:
//!    - Linux: `~/.config/muse-analytics/pipeline.json`
//!    - macOS: `~/Library/Application Support/muse-analytics/pipeline.json`
//!    - Windows: `%APPDATA%\muse-analytics\pipeline.json`
//! 3. Built-in defaults
//!
//! Missing fields in a file fall back to their defaults, so a file containing
//! only `{"loyalty_threshold": 0.8}` is valid.

use crate::error::{PipelineError, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Name of the per-user config file inside the platform config directory.
pub const CONFIG_FILE_NAME: &str = "pipeline.json";

/// Returns the platform-appropriate default config file path, if the platform
/// has a config directory at all. The file itself may not exist.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("muse-analytics").join(CONFIG_FILE_NAME))
}

/// Thresholds and labels that drive the six reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Users whose sad-play fraction is strictly above this get recommendations.
    pub sad_ratio_threshold: f64,
    /// Users whose loyalty score is strictly above this are reported.
    pub loyalty_threshold: f64,
    pub max_recommendations_per_user: usize,
    /// First hour (inclusive) of the night window.
    pub night_start_hour: u32,
    /// Hour (exclusive) where the night window ends.
    pub night_end_hour: u32,
    pub top_songs_limit: usize,
    pub happy_mood: String,
    pub sad_mood: String,
    /// Also write the joined event table next to the reports.
    pub write_enriched_log: bool,
    /// Run independent analyzers on the rayon pool.
    pub parallel: bool,
    /// Abort (writing nothing) if computing the reports takes longer than this.
    pub max_runtime_secs: Option<u64>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            sad_ratio_threshold: 0.3,
            loyalty_threshold: 0.6,
            max_recommendations_per_user: 3,
            night_start_hour: 0,
            night_end_hour: 5,
            top_songs_limit: 10,
            happy_mood: "Happy".to_string(),
            sad_mood: "Sad".to_string(),
            write_enriched_log: true,
            parallel: true,
            max_runtime_secs: None,
        }
    }
}

impl PipelineConfig {
    /// Load configuration from `path`, or from the default location when
    /// `path` is `None`. A missing default file is not an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => match default_config_path().filter(|p| p.is_file()) {
                Some(default) => {
                    info!("Using config file {}", default.display());
                    Self::from_file(&default)
                }
                None => {
                    debug!("No config file found, using defaults");
                    Ok(Self::default())
                }
            },
        }
    }

    /// Read a JSON config file. Does not validate.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| PipelineError::io(path, e))?;
        serde_json::from_str(&text).map_err(|source| PipelineError::ConfigFormat {
            path: path.to_path_buf(),
            source,
        })
    }

    #[must_use]
    pub fn max_runtime(&self) -> Option<Duration> {
        self.max_runtime_secs.map(Duration::from_secs)
    }

    /// Reject values no run can meaningfully use. Called before any input is read.
    pub fn validate(&self) -> Result<()> {
        validate_ratio("sad_ratio_threshold", self.sad_ratio_threshold)?;
        validate_ratio("loyalty_threshold", self.loyalty_threshold)?;

        if self.max_recommendations_per_user == 0 {
            return Err(PipelineError::configuration(
                "max_recommendations_per_user",
                0,
                "must be at least 1",
            ));
        }
        if self.top_songs_limit == 0 {
            return Err(PipelineError::configuration(
                "top_songs_limit",
                0,
                "must be at least 1",
            ));
        }
        if self.night_end_hour > 24 {
            return Err(PipelineError::configuration(
                "night_end_hour",
                self.night_end_hour,
                "must be at most 24",
            ));
        }
        if self.night_start_hour >= self.night_end_hour {
            return Err(PipelineError::configuration(
                "night_start_hour",
                self.night_start_hour,
                format!("must be below night_end_hour ({})", self.night_end_hour),
            ));
        }
        for (field, label) in [("happy_mood", &self.happy_mood), ("sad_mood", &self.sad_mood)] {
            if label.trim().is_empty() {
                return Err(PipelineError::configuration(field, "\"\"", "must not be empty"));
            }
        }
        if self.max_runtime_secs == Some(0) {
            return Err(PipelineError::configuration(
                "max_runtime_secs",
                0,
                "must be positive when set",
            ));
        }
        Ok(())
    }
}

fn validate_ratio(field: &str, value: f64) -> Result<()> {
    if value.is_nan() || !(0.0..=1.0).contains(&value) {
        return Err(PipelineError::configuration(
            field,
            value,
            "must be a ratio between 0 and 1",
        ));
    }
    Ok(())
}
