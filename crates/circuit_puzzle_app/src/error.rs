// SPDX-License-Identifier: MIT OR Apache-2.0
//! Application errors.

use circuit_puzzle_game::{RepositoryError, SessionError};
use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the command line player
#[derive(Debug, Error)]
pub enum AppError {
    /// Level data could not be loaded
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// A toggle named something other than an input
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Settings file could not be read or written
    #[error("Settings error in {path:?}: {source}")]
    Settings {
        /// Settings file
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// Progress file could not be read or written
    #[error("Progress error in {path:?}: {source}")]
    Progress {
        /// Progress file
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// Terminal I/O failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Output could not be encoded
    #[error("Failed to encode output: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Result type for application operations
pub type Result<T> = std::result::Result<T, AppError>;
