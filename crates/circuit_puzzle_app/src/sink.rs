// SPDX-License-Identifier: MIT OR Apache-2.0
//! Achievement sink for builds without an achievement service.

use circuit_puzzle_game::AchievementSink;

/// Logs unlocked achievements
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingSink;

impl AchievementSink for LoggingSink {
    fn unlock(&self, achievement_id: &str) {
        tracing::info!(achievement = achievement_id, "achievement unlocked");
    }
}
