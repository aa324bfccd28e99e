// SPDX-License-Identifier: MIT OR Apache-2.0
//! Achievement identifiers and the bridge to an external achievement service.

use indexmap::IndexMap;

/// Achievement awarded when the Intermediate category unlocks
pub const ACHIEVEMENT_UNLOCK_INTERMEDIATE: &str = "CgkIoqOdjqsOEAIQBA";

/// Receiver for unlocked achievements
pub trait AchievementSink {
    /// Report one unlocked achievement
    fn unlock(&self, achievement_id: &str);
}

/// Sink that drops every unlock
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl AchievementSink for NullSink {
    fn unlock(&self, _achievement_id: &str) {}
}

/// Mapping from level IDs to the achievement their first completion unlocks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AchievementTable {
    by_level: IndexMap<String, String>,
    unlock_intermediate: String,
}

impl AchievementTable {
    /// Create an empty table
    pub fn new(unlock_intermediate: impl Into<String>) -> Self {
        Self {
            by_level: IndexMap::new(),
            unlock_intermediate: unlock_intermediate.into(),
        }
    }

    /// Builder: map a level to an achievement
    pub fn with_level(mut self, level_id: impl Into<String>, achievement_id: impl Into<String>) -> Self {
        self.by_level.insert(level_id.into(), achievement_id.into());
        self
    }

    /// Achievement for completing a level, if any
    pub fn for_level(&self, level_id: &str) -> Option<&str> {
        self.by_level.get(level_id).map(String::as_str)
    }

    /// Achievement for unlocking the Intermediate category
    pub fn unlock_intermediate(&self) -> &str {
        &self.unlock_intermediate
    }

    /// Iterate over level mappings
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.by_level.iter().map(|(l, a)| (l.as_str(), a.as_str()))
    }
}

impl Default for AchievementTable {
    fn default() -> Self {
        Self::new(ACHIEVEMENT_UNLOCK_INTERMEDIATE)
            .with_level("level_basic_001", "CgkIoqOdjqsOEAIQAA")
            .with_level("level_basic_009", "CgkIoqOdjqsOEAIQAQ")
            .with_level("level_basic_033", "CgkIoqOdjqsOEAIQAg")
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::AchievementSink;
    use parking_lot::Mutex;

    /// Sink that remembers every unlock
    #[derive(Debug, Default)]
    pub struct RecordingSink {
        log: Mutex<Vec<String>>,
    }

    impl RecordingSink {
        pub fn unlocked(&self) -> Vec<String> {
            self.log.lock().clone()
        }
    }

    impl AchievementSink for RecordingSink {
        fn unlock(&self, achievement_id: &str) {
            self.log.lock().push(achievement_id.to_string());
        }
    }
}
