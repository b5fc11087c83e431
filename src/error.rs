//! Error types for the analytics pipeline.
//!
//! Only fatal conditions are errors. Events referencing songs missing from the
//! catalog and reports with zero rows are normal outcomes and never show up here.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Fatal pipeline failure. Any of these aborts the run before output is written.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// An input table is missing a column or carries an unparseable value.
    #[error("Schema error in {table} (line {line}): {message}")]
    Schema {
        table: String,
        line: usize,
        message: String,
    },

    /// A policy value is out of range.
    #[error("Invalid configuration: {field} = {value} ({reason})")]
    Configuration {
        field: String,
        value: String,
        reason: String,
    },

    #[error("I/O failure on {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Config file {} is not valid JSON", .path.display())]
    ConfigFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Reports were computed but took longer than allowed; all of them are discarded.
    #[error("Pipeline exceeded its runtime limit of {limit:?} (took {elapsed:?})")]
    RuntimeExceeded { limit: Duration, elapsed: Duration },
}

impl PipelineError {
    pub fn schema(table: impl Into<String>, line: usize, message: impl Into<String>) -> Self {
        Self::Schema {
            table: table.into(),
            line,
            message: message.into(),
        }
    }

    pub fn configuration(
        field: impl Into<String>,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        Self::Configuration {
            field: field.into(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// True for the error kinds that a caller fixes by editing input or config.
    #[must_use]
    pub const fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Self::Schema { .. } | Self::Configuration { .. } | Self::ConfigFormat { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_error_message_names_table_and_line() {
        let err = PipelineError::schema("songs_metadata", 4, "song_id `abc` is not an integer");
        let msg = err.to_string();
        assert!(msg.contains("songs_metadata"));
        assert!(msg.contains("line 4"));
        assert!(msg.contains("abc"));
        assert!(err.is_caller_error());
    }

    #[test]
    fn test_runtime_exceeded_is_not_caller_error() {
        let err = PipelineError::RuntimeExceeded {
            limit: Duration::from_secs(1),
            elapsed: Duration::from_secs(2),
        };
        assert!(!err.is_caller_error());
    }
}
