// SPDX-License-Identifier: MIT OR Apache-2.0
//! Game layer for the circuit puzzle.
//!
//! This crate provides everything between the circuit core and a frontend:
//! - Level records and their JSON format
//! - A cached level repository
//! - Play sessions with edge-triggered completion
//! - Star scoring, player progress and category unlocks
//! - Achievement reporting through a pluggable sink
//!
//! ## Architecture
//!
//! The repository is the only shared state. It hands out `Arc<[Level]>`
//! snapshots; sessions and progress work on owned data and never touch disk.

pub mod error;
pub mod level;
pub mod scoring;
pub mod achievements;
pub mod repository;
pub mod session;
pub mod progress;

pub use error::{RepositoryError, SessionError};
pub use level::{Constraints, Level, LevelCategory, PopUp, StarRatings};
pub use scoring::{score, Stars};
pub use achievements::{AchievementSink, AchievementTable, NullSink, ACHIEVEMENT_UNLOCK_INTERMEDIATE};
pub use repository::{DirectorySource, LevelGroup, LevelRepository, LevelSource, StaticSource};
pub use session::{Completion, CompletionState, PlaySession, SessionEvent};
pub use progress::{
    CategoryProgress, CompletionEvent, LevelProgress, ProgressRecord, RandomStats, UNLOCK_THRESHOLD,
};
