//! Centralised error types used across the crate.

use std::{io, path::PathBuf};

use chrono::{DateTime, Utc};

/// Faults in time literals and calendar arithmetic.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TimeError {
    #[error("no four-digit year in time literal '{0}'")]
    MissingYear(String),
    #[error("invalid calendar time '{0}'")]
    InvalidLiteral(String),
    #[error("time arithmetic out of range")]
    OutOfRange,
}

/// Faults while reading source metadata.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("failed to read '{path}': {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("'{0}' has no data rows in its first or last lines")]
    NoSamples(PathBuf),
    #[error("'{path}': {source}")]
    BadTimestamp { path: PathBuf, source: TimeError },
    #[error("too many input files: {0} given, at most {max} supported", max = crate::core::constants::SOURCE_LETTERS.len())]
    TooMany(usize),
    #[error("no input files")]
    Empty,
    #[error("combined time span of all files is empty")]
    EmptySpan,
}

/// Precise configuration faults.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("window start {start} must be before window end {end}")]
    InvalidWindow {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    #[error("line width must be a positive number, got {0}")]
    InvalidLineWidth(f64),
}

/// Top-level error type bubbled up by public APIs.
#[derive(Debug, thiserror::Error)]
pub enum IgpError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to start plotting backend '{path}': {source}")]
    Spawn { path: PathBuf, source: io::Error },
    #[error("plotting backend closed its input")]
    BackendClosed,
}
