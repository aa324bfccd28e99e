// SPDX-License-Identifier: MIT OR Apache-2.0
//! Error types for level loading and play sessions.

use circuit_puzzle_graph::NodeId;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the level repository
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// No level with this ID exists
    #[error("Level not found: {0}")]
    LevelNotFound(String),

    /// A level file could not be read
    #[error("Failed to read level file {path:?}: {source}")]
    Io {
        /// File being read
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// A level file is not valid level JSON
    #[error("Failed to parse level file {path:?}: {source}")]
    Parse {
        /// File being parsed
        path: PathBuf,
        /// Underlying error
        source: serde_json::Error,
    },

    /// The level directory could not be walked
    #[error("Failed to scan level directory: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Errors raised by a play session
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The node is missing or is not an Input node
    #[error("Not an input node: {0}")]
    NotAnInput(NodeId),
}

/// Result type for repository operations
pub type Result<T> = std::result::Result<T, RepositoryError>;
