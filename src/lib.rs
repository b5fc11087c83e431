//! Batch listening analytics over a play log and a song catalog.
//!
//! Core modules:
//! - [`catalog`] - Song metadata loading and validation
//! - [`events`] - Listening event loading and validation
//! - [`enrich`] - Inner join of events with song metadata
//! - [`analysis`] - The six report analyzers
//! - [`pipeline`] - Orchestration of a full run
//!
//! ### Supporting Modules
//!
//! - [`config`] - Policy thresholds and config file lookup
//! - [`error`] - Typed fatal errors
//! - [`table`] - Delimited table reading and rendering
//! - [`report`] - Report tables and staged output writing
//! - [`cli`] - Command-line interface definitions with clap integration
//! - [`completion`] - Shell completion generation
//!
//! ## Quick Start Example
//!
//! ```
//! use muse_analytics::catalog::Catalog;
//! use muse_analytics::config::PipelineConfig;
//! use muse_analytics::events;
//! use muse_analytics::pipeline::{self, Inputs};
//!
//! let catalog = Catalog::from_csv_str(
//!     "song_id,title,artist,genre,mood\n1,A,X,Pop,Happy\n2,B,Y,Pop,Sad\n3,C,Z,Rock,Sad\n",
//! )?;
//! let events = events::from_csv_str(
//!     "user_id,song_id,timestamp,duration_sec\n\
//!      10,2,2025-03-24 10:00:00,60\n\
//!      10,2,2025-03-25 10:00:00,90\n\
//!      10,3,2025-03-26 10:00:00,120\n",
//! )?;
//!
//! let as_of = events::parse_timestamp("2025-03-27 12:00:00").unwrap();
//! let inputs = Inputs { catalog, events };
//! let reports = pipeline::compute(&inputs, &PipelineConfig::default(), as_of)?;
//!
//! assert_eq!(reports.favorite_genres[0].genre, "Pop");
//! assert_eq!(reports.happy_recommendations[0].song_id, 1);
//! # Ok::<(), muse_analytics::error::PipelineError>(())
//! ```
//!
//! ## Determinism
//!
//! Every report has a total row order, so two runs over the same inputs with the
//! same `as_of` produce byte-identical files:
//!
//! - Favorite genre ties go to the lexicographically smallest genre
//! - Score and count orderings break ties by ascending id
//! - Recommendations take unheard happy songs in ascending song id
//!
//! ## Error Handling
//!
//! Fatal conditions are [`error::PipelineError`] values: schema problems in an
//! input, out-of-range policy values, I/O failures and runtime overruns. Events
//! that reference unknown songs and reports with no rows are not errors.

pub mod analysis;
pub mod catalog;
pub mod cli;
pub mod completion;
pub mod config;
pub mod enrich;
pub mod error;
pub mod events;
pub mod pipeline;
pub mod report;
pub mod table;
