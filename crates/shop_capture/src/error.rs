use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading a [`crate::CaptureConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config `{path}`: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse capture config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("threshold must be at least 1 (got {0})")]
    InvalidThreshold(u32),
}

/// Errors raised while appending to the durable shop log.
#[derive(Debug, Error)]
pub enum ShopLogError {
    #[error("failed to open shop log `{path}`: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write shop log `{path}`: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised while running the external analysis command.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("analysis command `{binary}` could not be spawned: {source}")]
    Spawn {
        binary: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed waiting for analysis process: {0}")]
    Wait(#[source] std::io::Error),
    #[error("failed reading analysis stdout: {0}")]
    StdoutRead(#[source] std::io::Error),
    #[error("failed reading analysis stderr: {0}")]
    StderrRead(#[source] std::io::Error),
    #[error("internal error: missing stdout pipe")]
    MissingStdout,
    #[error("internal error: missing stderr pipe")]
    MissingStderr,
    #[error("internal error: join failure: {0}")]
    Join(String),
    #[error("no async runtime available to run the analysis")]
    NoRuntime,
}

/// Per-line failures reported by [`crate::LineIngestor`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LineRecordError {
    #[error("I/O error while reading chat input")]
    Io,
    #[error("invalid UTF-8 in chat input")]
    InvalidUtf8,
    #[error("line too long (observed_bytes={observed_bytes}, max_line_bytes={max_line_bytes})")]
    LineTooLong {
        observed_bytes: usize,
        max_line_bytes: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineRecord {
    pub line_number: usize,
    pub outcome: Result<String, LineRecordError>,
}
