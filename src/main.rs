//! # Muse Analytics
//!
//! Batch listening reports from a play log and a song catalog.
//!
//! ## Usage
//!
//! ```bash
//! # Compute everything into ./output
//! muse-analytics run
//!
//! # Pin "this week" for reproducible runs
//! muse-analytics run --as-of "2025-03-27 12:00:00"
//!
//! # Look at one report
//! muse-analytics report genre-loyalty --format json
//! ```

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use clap::{CommandFactory, Parser};
use log::info;
use muse_analytics::cli::{self, ComputeArgs, Format, InputArgs};
use muse_analytics::config::PipelineConfig;
use muse_analytics::pipeline::{self, Inputs};
use muse_analytics::{completion, events};

/// Resolve config from file plus CLI overrides, validated.
fn resolve_config(input: &InputArgs, compute: &ComputeArgs) -> Result<PipelineConfig> {
    let mut config = PipelineConfig::load(input.config.as_deref())
        .context("Failed to load pipeline configuration")?;
    if compute.sequential {
        config.parallel = false;
    }
    if compute.max_runtime_secs.is_some() {
        config.max_runtime_secs = compute.max_runtime_secs;
    }
    config.validate().context("Invalid pipeline configuration")?;
    Ok(config)
}

/// Reference time for the weekly window: `--as-of`, else the local clock.
fn resolve_as_of(compute: &ComputeArgs) -> Result<NaiveDateTime> {
    match &compute.as_of {
        Some(raw) => events::parse_timestamp(raw).ok_or_else(|| {
            anyhow::anyhow!("Invalid --as-of `{raw}`. Use YYYY-MM-DD HH:MM:SS")
        }),
        None => Ok(chrono::Local::now().naive_local()),
    }
}

fn load_inputs(input: &InputArgs) -> Result<Inputs> {
    Inputs::load(&input.songs, &input.logs).with_context(|| {
        format!(
            "Failed to load inputs ({} and {})",
            input.songs.display(),
            input.logs.display()
        )
    })
}

/// Initializes logging, parses arguments and routes each command to the library.
///
/// Logging is controlled via `RUST_LOG` and defaults to `info`:
/// - `RUST_LOG=debug muse-analytics run`
/// - `RUST_LOG=muse_analytics::report=debug muse-analytics run`
fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = cli::Args::parse();

    match args.command {
        cli::Command::Run {
            input,
            compute,
            output_dir,
            no_enriched_log,
        } => {
            let mut config = resolve_config(&input, &compute)?;
            if no_enriched_log {
                config.write_enriched_log = false;
            }
            let as_of = resolve_as_of(&compute)?;
            info!("Running pipeline as of {}", events::format_timestamp(&as_of));

            let written = pipeline::run(&input.songs, &input.logs, &output_dir, &config, as_of)
                .context("Pipeline run failed; no reports were written")?;
            println!("Wrote {} reports to {}", written.len(), output_dir.display());
        }
        cli::Command::Report {
            kind,
            input,
            compute,
            format,
        } => {
            let mut config = resolve_config(&input, &compute)?;
            config.write_enriched_log = kind == muse_analytics::report::ReportKind::EnrichedLogs;
            let as_of = resolve_as_of(&compute)?;
            let inputs = load_inputs(&input)?;
            let reports = pipeline::compute(&inputs, &config, as_of)?;

            match format {
                Format::Csv => print!("{}", reports.to_csv(kind)),
                Format::Json => println!(
                    "{}",
                    reports.to_json(kind).context("Failed to serialize report")?
                ),
            }
        }
        cli::Command::Validate { input } => {
            resolve_config(&input, &ComputeArgs::default())?;
            let inputs = load_inputs(&input)?;
            println!("songs:  {}", inputs.catalog.len());
            println!("events: {}", inputs.events.len());
            println!("events referencing unknown songs: {}", inputs.referential_gaps());
        }
        cli::Command::Completion { shell } => {
            let mut cmd = cli::Args::command();
            let shell = completion::shell_to_completion_shell(shell);
            completion::generate_completions(shell, &mut cmd);
        }
    }

    Ok(())
}
