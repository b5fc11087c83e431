//! # Command-Line Interface Module
//!
//! Clap derive definitions for the `muse-analytics` binary.
//!
//! ## Commands
//!
//! - `run`: compute all reports and write them under the output directory
//! - `report`: compute one report and print it to stdout
//! - `validate`: check config and inputs without writing anything
//! - `completion`: print a shell completion script
//!
//! ## Examples
//!
//! ```bash
//! muse-analytics run --output-dir output
//! muse-analytics run --as-of "2025-03-27 12:00:00" --sequential
//! muse-analytics report happy-recommendations --format json
//! ```

use crate::report::ReportKind;
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Shell types supported for completion generation
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

/// Output format for the `report` command
#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug, Default)]
pub enum Format {
    #[default]
    Csv,
    Json,
}

/// Main application arguments structure.
#[derive(Parser, Debug)]
#[command(name = "muse-analytics")]
#[command(about = "Muse Analytics: listening reports from play logs & a song catalog")]
#[command(version)]
pub struct Args {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Where the inputs live and which policy file to use.
#[derive(ClapArgs, Debug, Clone)]
pub struct InputArgs {
    /// Song catalog (song_id,title,artist,genre,mood)
    #[arg(long, env = "MUSE_SONGS", default_value = "input/songs_metadata.csv")]
    pub songs: PathBuf,

    /// Listening log (user_id,song_id,timestamp,duration_sec)
    #[arg(long, env = "MUSE_LOGS", default_value = "input/listening_logs.csv")]
    pub logs: PathBuf,

    /// JSON policy file; defaults to the platform config directory
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,
}

/// Options that change how reports are computed.
#[derive(ClapArgs, Debug, Clone, Default)]
pub struct ComputeArgs {
    /// Reference time for "this week" (YYYY-MM-DD HH:MM:SS); defaults to now
    #[arg(long)]
    pub as_of: Option<String>,

    /// Run analyzers one after another instead of on the thread pool
    #[arg(long)]
    pub sequential: bool,

    /// Abort without writing if computing takes longer than this
    #[arg(long)]
    pub max_runtime_secs: Option<u64>,
}

/// Enumeration of all available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compute all reports and write them to disk
    ///
    /// Each report lands in `<output-dir>/<report>/data.csv` with a header row,
    /// even when it has no data rows. Nothing is written if any input or
    /// config value is invalid.
    Run {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        compute: ComputeArgs,

        /// Directory receiving one sub-directory per report
        #[arg(short, long, default_value = "output")]
        output_dir: PathBuf,

        /// Do not write the joined event table
        #[arg(long)]
        no_enriched_log: bool,
    },

    /// Compute a single report and print it
    Report {
        /// Which report to print
        #[arg(value_enum)]
        kind: ReportKind,

        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        compute: ComputeArgs,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Csv)]
        format: Format,
    },

    /// Validate config and inputs, print row counts
    Validate {
        #[command(flatten)]
        input: InputArgs,
    },

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
