//! Error types.
//!
//! Nothing inside the engine fails: bad escape sequences and wild cursor
//! motion degrade to something visible. Only acquiring the bytes and
//! reading configuration can go wrong.

use std::io;
use thiserror::Error;

/// Failure to materialize the bytes to play
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("{0}")]
    Io(#[from] io::Error),

    #[error("{0}")]
    Unavailable(String),
}

/// Invalid playback configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}
