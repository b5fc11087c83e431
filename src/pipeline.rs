//! # Pipeline Orchestration
//!
//! Wires the components together for one run:
//!
//! ```text
//! config.validate()
//!   ├── Catalog::load ──┐
//!   └── events::load ───┴── enrich (once, shared read-only)
//!                              ├── favorite_genres
//!                              ├── avg_listen_time   (raw events + catalog)
//!                              ├── top_songs
//!                              ├── recommend
//!                              ├── loyalty_scores
//!                              └── night_owls        (raw events)
//! ```
//!
//! Configuration and schema errors abort before anything is written. Reports
//! are written only after all of them have been loaded and computed within the
//! runtime limit.

use crate::analysis::{self, recommend::RecommendPolicy};
use crate::catalog::Catalog;
use crate::config::PipelineConfig;
use crate::enrich::{self, EnrichedEvent};
use crate::error::{PipelineError, Result};
use crate::events::{self, ListenEvent};
use crate::report::{self, Reports};
use chrono::NaiveDateTime;
use log::{debug, info};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// The two loaded inputs of a run.
#[derive(Debug, Clone)]
pub struct Inputs {
    pub catalog: Catalog,
    pub events: Vec<ListenEvent>,
}

impl Inputs {
    /// Load both tables. A schema error in either aborts the load.
    pub fn load(songs_path: &Path, logs_path: &Path) -> Result<Self> {
        Ok(Self {
            catalog: Catalog::load(songs_path)?,
            events: events::load(logs_path)?,
        })
    }

    /// Events whose song id is not in the catalog.
    #[must_use]
    pub fn referential_gaps(&self) -> usize {
        enrich::count_referential_gaps(&self.events, &self.catalog)
    }
}

/// Wall-clock budget for one run, measured from when the run started.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Deadline {
    started: Instant,
    limit: Option<Duration>,
}

impl Deadline {
    pub(crate) fn start(limit: Option<Duration>) -> Self {
        Self::starting_at(Instant::now(), limit)
    }

    pub(crate) const fn starting_at(started: Instant, limit: Option<Duration>) -> Self {
        Self { started, limit }
    }

    pub(crate) fn check(&self) -> Result<()> {
        let elapsed = self.started.elapsed();
        match self.limit {
            Some(limit) if elapsed > limit => {
                Err(PipelineError::RuntimeExceeded { limit, elapsed })
            }
            _ => Ok(()),
        }
    }
}

/// Compute every report. `as_of` anchors the "this week" window.
///
/// Used directly by the `report` command, so it validates `config` itself and
/// applies the runtime limit to the computation alone.
pub fn compute(inputs: &Inputs, config: &PipelineConfig, as_of: NaiveDateTime) -> Result<Reports> {
    config.validate()?;
    let deadline = Deadline::start(config.max_runtime());
    let reports = compute_reports(inputs, config, as_of);
    deadline.check()?;
    Ok(reports)
}

/// Load, compute and write. Returns the data files written.
///
/// The runtime limit covers loading and computation; it is checked before
/// anything is written.
pub fn run(
    songs_path: &Path,
    logs_path: &Path,
    output_dir: &Path,
    config: &PipelineConfig,
    as_of: NaiveDateTime,
) -> Result<Vec<PathBuf>> {
    config.validate()?;
    let deadline = Deadline::start(config.max_runtime());
    run_with_deadline(songs_path, logs_path, output_dir, config, as_of, &deadline)
}

/// Body of [`run`] for an already validated config.
pub(crate) fn run_with_deadline(
    songs_path: &Path,
    logs_path: &Path,
    output_dir: &Path,
    config: &PipelineConfig,
    as_of: NaiveDateTime,
    deadline: &Deadline,
) -> Result<Vec<PathBuf>> {
    let inputs = Inputs::load(songs_path, logs_path)?;
    let reports = compute_reports(&inputs, config, as_of);
    deadline.check()?;
    report::write_tables(output_dir, &reports.tables())
}

fn compute_reports(inputs: &Inputs, config: &PipelineConfig, as_of: NaiveDateTime) -> Reports {
    let started = Instant::now();
    let enriched = enrich::enrich(&inputs.events, &inputs.catalog);
    info!(
        "Enriched {} of {} events against {} songs",
        enriched.len(),
        inputs.events.len(),
        inputs.catalog.len()
    );

    let reports = if config.parallel {
        run_parallel(inputs, &enriched, config, as_of)
    } else {
        run_sequential(inputs, &enriched, config, as_of)
    };
    let reports = Reports {
        enriched_logs: config.write_enriched_log.then_some(enriched),
        ..reports
    };

    debug!("Computed all reports in {:?}", started.elapsed());
    log_empty_reports(&reports);
    reports
}

fn policy(config: &PipelineConfig) -> RecommendPolicy<'_> {
    RecommendPolicy {
        sad_ratio_threshold: config.sad_ratio_threshold,
        max_per_user: config.max_recommendations_per_user,
        happy_mood: &config.happy_mood,
        sad_mood: &config.sad_mood,
    }
}

fn run_sequential(
    inputs: &Inputs,
    enriched: &[EnrichedEvent],
    config: &PipelineConfig,
    as_of: NaiveDateTime,
) -> Reports {
    Reports {
        favorite_genres: analysis::favorite_genres(enriched),
        avg_listen_time: analysis::avg_listen_time(&inputs.events, &inputs.catalog),
        top_songs: analysis::top_songs(enriched, as_of, config.top_songs_limit),
        happy_recommendations: analysis::recommend(enriched, &inputs.catalog, policy(config)),
        genre_loyalty: analysis::loyalty_scores(enriched, config.loyalty_threshold),
        night_owls: analysis::night_owls(
            &inputs.events,
            config.night_start_hour,
            config.night_end_hour,
        ),
        enriched_logs: None,
    }
}

fn run_parallel(
    inputs: &Inputs,
    enriched: &[EnrichedEvent],
    config: &PipelineConfig,
    as_of: NaiveDateTime,
) -> Reports {
    let (
        (favorite_genres, avg_listen_time),
        ((top_songs, happy_recommendations), (genre_loyalty, night_owls)),
    ) = rayon::join(
        || {
            rayon::join(
                || analysis::favorite_genres(enriched),
                || analysis::avg_listen_time(&inputs.events, &inputs.catalog),
            )
        },
        || {
            rayon::join(
                || {
                    rayon::join(
                        || analysis::top_songs(enriched, as_of, config.top_songs_limit),
                        || analysis::recommend(enriched, &inputs.catalog, policy(config)),
                    )
                },
                || {
                    rayon::join(
                        || analysis::loyalty_scores(enriched, config.loyalty_threshold),
                        || {
                            analysis::night_owls(
                                &inputs.events,
                                config.night_start_hour,
                                config.night_end_hour,
                            )
                        },
                    )
                },
            )
        },
    );

    Reports {
        favorite_genres,
        avg_listen_time,
        top_songs,
        happy_recommendations,
        genre_loyalty,
        night_owls,
        enriched_logs: None,
    }
}

fn log_empty_reports(reports: &Reports) {
    for table in reports.tables() {
        if table.is_empty() {
            info!("{} has no rows; writing header only", table.kind.dir_name());
        }
    }
}
