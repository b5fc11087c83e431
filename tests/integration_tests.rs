//! # Integration Tests for Muse Analytics
//!
//! End-to-end runs of the pipeline against temporary input directories,
//! covering file output, determinism, fatal input errors and the CLI binary.

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

const SONGS: &str = "song_id,title,artist,genre,mood\n\
                     1,A,X,Pop,Happy\n\
                     2,B,Y,Pop,Sad\n\
                     3,C,Z,Rock,Sad\n";

const LOGS: &str = "user_id,song_id,timestamp,duration_sec\n\
                    10,2,2025-03-24 01:15:00,60\n\
                    10,2,2025-03-25 12:00:00,90\n\
                    10,3,2025-03-26 18:30:00,120\n";

const AS_OF: &str = "2025-03-27 12:00:00";

/// Test helper to lay out an input directory with the two tables
fn create_inputs(songs: &str, logs: &str) -> Result<(TempDir, PathBuf, PathBuf)> {
    let temp_dir = TempDir::new()?;
    let songs_path = temp_dir.path().join("songs_metadata.csv");
    let logs_path = temp_dir.path().join("listening_logs.csv");
    fs::write(&songs_path, songs)?;
    fs::write(&logs_path, logs)?;
    Ok((temp_dir, songs_path, logs_path))
}

fn read_report(output_dir: &Path, dir: &str) -> Result<String> {
    Ok(fs::read_to_string(output_dir.join(dir).join("data.csv"))?)
}

#[cfg(test)]
mod pipeline_tests {
    use super::*;
    use muse_analytics::config::PipelineConfig;
    use muse_analytics::error::PipelineError;
    use muse_analytics::events::parse_timestamp;
    use muse_analytics::pipeline;

    fn run_into(output: &Path, songs: &Path, logs: &Path) -> Result<Vec<PathBuf>> {
        let as_of = parse_timestamp(AS_OF).unwrap();
        Ok(pipeline::run(songs, logs, output, &PipelineConfig::default(), as_of)?)
    }

    #[test]
    fn test_scenario_writes_expected_reports() -> Result<()> {
        let (dir, songs, logs) = create_inputs(SONGS, LOGS)?;
        let out = dir.path().join("output");
        let written = run_into(&out, &songs, &logs)?;
        assert_eq!(written.len(), 7);

        assert_eq!(
            read_report(&out, "user_favorite_genres")?,
            "user_id,genre,play_count\n10,Pop,2\n"
        );
        assert_eq!(
            read_report(&out, "avg_listen_time_per_song")?,
            "song_id,title,artist,avg_duration_sec\n3,C,Z,120.0\n2,B,Y,75.0\n"
        );
        assert_eq!(
            read_report(&out, "top_songs_this_week")?,
            "song_id,title,artist,plays\n2,B,Y,2\n3,C,Z,1\n"
        );
        assert_eq!(
            read_report(&out, "happy_recommendations")?,
            "user_id,song_id,title,artist\n10,1,A,X\n"
        );
        assert_eq!(
            read_report(&out, "genre_loyalty_scores")?,
            "user_id,loyalty_score\n10,0.6666666666666666\n"
        );
        assert_eq!(
            read_report(&out, "night_owl_users")?,
            "user_id,night_listens\n10,1\n"
        );
        assert_eq!(read_report(&out, "enriched_logs")?.lines().count(), 4);
        Ok(())
    }

    #[test]
    fn test_two_runs_are_byte_identical() -> Result<()> {
        let (dir, songs, logs) = create_inputs(SONGS, LOGS)?;
        let first = run_into(&dir.path().join("a"), &songs, &logs)?;
        let second = run_into(&dir.path().join("b"), &songs, &logs)?;

        for (a, b) in first.iter().zip(&second) {
            assert_eq!(fs::read(a)?, fs::read(b)?, "{} differs between runs", a.display());
        }
        Ok(())
    }

    #[test]
    fn test_empty_log_writes_header_only_reports() -> Result<()> {
        let (dir, songs, logs) = create_inputs(SONGS, "user_id,song_id,timestamp,duration_sec\n")?;
        let out = dir.path().join("output");
        for path in run_into(&out, &songs, &logs)? {
            assert_eq!(fs::read_to_string(&path)?.lines().count(), 1, "{}", path.display());
        }
        Ok(())
    }

    #[test]
    fn test_schema_error_writes_nothing() -> Result<()> {
        let bad_logs = "user_id,song_id,timestamp,duration_sec\n10,two,2025-03-24 01:15:00,60\n";
        let (dir, songs, logs) = create_inputs(SONGS, bad_logs)?;
        let out = dir.path().join("output");

        let err = pipeline::run(
            &songs,
            &logs,
            &out,
            &PipelineConfig::default(),
            parse_timestamp(AS_OF).unwrap(),
        )
        .unwrap_err();
        assert!(matches!(err, PipelineError::Schema { .. }));
        assert!(!out.exists());
        Ok(())
    }

    #[test]
    fn test_missing_column_is_fatal() -> Result<()> {
        let (dir, songs, logs) =
            create_inputs("song_id,title,artist,genre\n1,A,X,Pop\n", LOGS)?;
        let result = run_into(&dir.path().join("output"), &songs, &logs);
        assert!(result.is_err());
        Ok(())
    }

    #[test]
    fn test_rerun_replaces_previous_output() -> Result<()> {
        let (dir, songs, logs) = create_inputs(SONGS, LOGS)?;
        let out = dir.path().join("output");
        run_into(&out, &songs, &logs)?;

        fs::write(&logs, "user_id,song_id,timestamp,duration_sec\n")?;
        run_into(&out, &songs, &logs)?;
        assert_eq!(
            read_report(&out, "happy_recommendations")?,
            "user_id,song_id,title,artist\n"
        );
        Ok(())
    }
}

#[cfg(test)]
mod property_tests {
    use muse_analytics::catalog::{Catalog, Song};
    use muse_analytics::config::PipelineConfig;
    use muse_analytics::events::{parse_timestamp, ListenEvent};
    use muse_analytics::pipeline::{self, Inputs};
    use std::collections::HashSet;

    /// A deterministic mixed dataset: 40 songs, 25 users, some unknown song ids.
    fn dataset() -> Inputs {
        let genres = ["Pop", "Rock", "Jazz", "Folk"];
        let moods = ["Happy", "Sad", "Chill", "Sad", "Energetic"];
        let songs = (1..=40)
            .map(|id: i64| Song {
                song_id: id,
                title: format!("Song {id}"),
                artist: format!("Artist {}", id % 7),
                genre: genres[(id % 4) as usize].to_string(),
                mood: moods[(id % 5) as usize].to_string(),
            })
            .collect();

        let start = parse_timestamp("2025-03-17 00:00:00").unwrap();
        let events = (0..600i64)
            .map(|i| ListenEvent {
                user_id: i % 25,
                song_id: (i * 13 + i / 7) % 45 + 1,
                timestamp: start + chrono::Duration::minutes(i * 37),
                duration_sec: 30 + (i * 17) % 271,
            })
            .collect();

        Inputs {
            catalog: Catalog::new(songs).unwrap(),
            events,
        }
    }

    #[test]
    fn test_report_invariants_hold() {
        let inputs = dataset();
        let config = PipelineConfig::default();
        let as_of = parse_timestamp("2025-03-27 12:00:00").unwrap();
        let reports = pipeline::compute(&inputs, &config, as_of).unwrap();

        for e in reports.enriched_logs.as_ref().unwrap() {
            let song = inputs.catalog.get(e.song_id).expect("joined song is catalogued");
            assert_eq!((&e.genre, &e.mood, &e.title), (&song.genre, &song.mood, &song.title));
        }

        for row in &reports.genre_loyalty {
            assert!(row.loyalty_score > config.loyalty_threshold);
            assert!(row.loyalty_score <= 1.0);
        }

        let heard: HashSet<(i64, i64)> =
            inputs.events.iter().map(|e| (e.user_id, e.song_id)).collect();
        for rec in &reports.happy_recommendations {
            assert!(!heard.contains(&(rec.user_id, rec.song_id)));
            assert_eq!(inputs.catalog.get(rec.song_id).unwrap().mood, "Happy");
        }
        let per_user = reports
            .happy_recommendations
            .iter()
            .fold(std::collections::HashMap::new(), |mut acc, r| {
                *acc.entry(r.user_id).or_insert(0usize) += 1;
                acc
            });
        assert!(per_user.values().all(|&n| n <= config.max_recommendations_per_user));

        assert!(reports.top_songs.len() <= config.top_songs_limit);
        assert!(reports.top_songs.windows(2).all(|w| w[0].plays >= w[1].plays));
    }

    #[test]
    fn test_repeated_computation_is_stable() {
        let inputs = dataset();
        let as_of = parse_timestamp("2025-03-27 12:00:00").unwrap();
        let first = pipeline::compute(&inputs, &PipelineConfig::default(), as_of).unwrap();
        for _ in 0..5 {
            let again = pipeline::compute(&inputs, &PipelineConfig::default(), as_of).unwrap();
            assert_eq!(first, again);
        }
    }
}

#[cfg(test)]
mod cli_tests {
    use super::*;

    fn bin() -> Command {
        Command::new(env!("CARGO_BIN_EXE_muse-analytics"))
    }

    #[test]
    fn test_cli_help_displays_correctly() {
        let output = bin().arg("--help").output().expect("Failed to run help command");
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("run"));
        assert!(stdout.contains("report"));
        assert!(stdout.contains("validate"));
    }

    #[test]
    fn test_cli_run_writes_reports() -> Result<()> {
        let (dir, songs, logs) = create_inputs(SONGS, LOGS)?;
        let out = dir.path().join("output");
        let status = bin()
            .arg("run")
            .arg("--songs")
            .arg(&songs)
            .arg("--logs")
            .arg(&logs)
            .arg("--output-dir")
            .arg(&out)
            .args(["--as-of", AS_OF, "--no-enriched-log"])
            .status()?;

        assert!(status.success());
        assert!(out.join("night_owl_users").join("data.csv").is_file());
        assert!(!out.join("enriched_logs").exists());
        Ok(())
    }

    #[test]
    fn test_cli_report_json() -> Result<()> {
        let (_dir, songs, logs) = create_inputs(SONGS, LOGS)?;
        let output = bin()
            .args(["report", "favorite-genres", "--format", "json", "--as-of", AS_OF])
            .arg("--songs")
            .arg(&songs)
            .arg("--logs")
            .arg(&logs)
            .output()?;

        assert!(output.status.success());
        let rows: serde_json::Value = serde_json::from_slice(&output.stdout)?;
        assert_eq!(rows[0]["genre"], "Pop");
        assert_eq!(rows[0]["play_count"], 2);
        Ok(())
    }

    #[test]
    fn test_cli_rejects_invalid_config() -> Result<()> {
        let (dir, songs, logs) = create_inputs(SONGS, LOGS)?;
        let config = dir.path().join("pipeline.json");
        fs::write(&config, r#"{"sad_ratio_threshold": -1.0}"#)?;
        let out = dir.path().join("output");

        let status = bin()
            .arg("run")
            .arg("--songs")
            .arg(&songs)
            .arg("--logs")
            .arg(&logs)
            .arg("--config")
            .arg(&config)
            .arg("--output-dir")
            .arg(&out)
            .status()?;

        assert!(!status.success());
        assert!(!out.exists());
        Ok(())
    }
}
