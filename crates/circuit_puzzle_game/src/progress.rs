// SPDX-License-Identifier: MIT OR Apache-2.0
//! Player progress: best stars per level, awarded achievements, category
//! unlocks and random challenge selection.

use crate::achievements::{AchievementSink, AchievementTable};
use crate::level::{Level, LevelCategory};
use crate::scoring::Stars;
use crate::session::Completion;
use indexmap::IndexMap;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Completion share of the previous category needed to unlock the next
pub const UNLOCK_THRESHOLD: f32 = 0.8;

/// Best result on one level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelProgress {
    /// Most stars ever earned
    pub stars: u8,
}

/// Outcome of recording a completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionEvent {
    /// Completed level
    pub level_id: String,
    /// Stars earned by this completion
    pub stars_earned: Stars,
    /// Whether the level had never been completed before
    pub is_first_completion: bool,
    /// Achievements unlocked by this completion
    pub unlocked_achievements: Vec<String>,
}

/// Completion counts for one category
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CategoryProgress {
    /// Completed levels
    pub completed: usize,
    /// Levels in the category
    pub total: usize,
    /// Completed share, 0 to 100
    pub percentage: f32,
}

impl CategoryProgress {
    fn new(completed: usize, total: usize) -> Self {
        let percentage = if total > 0 {
            completed as f32 / total as f32 * 100.0
        } else {
            0.0
        };
        Self {
            completed,
            total,
            percentage,
        }
    }

    /// Check whether the unlock threshold is reached
    pub fn meets_threshold(&self) -> bool {
        self.total > 0 && self.completed as f32 / self.total as f32 >= UNLOCK_THRESHOLD
    }
}

/// Random challenge statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RandomStats {
    /// Random levels completed at least once
    pub played: usize,
    /// Random levels available
    pub total: usize,
    /// Best stars summed over random levels
    pub total_stars: u32,
}

impl RandomStats {
    /// Mean best stars over played levels, rounded to two decimals
    pub fn average_stars(&self) -> f32 {
        if self.played == 0 {
            return 0.0;
        }
        let mean = self.total_stars as f32 / self.played as f32;
        (mean * 100.0).round() / 100.0
    }
}

/// Persistent player progress
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecord {
    /// Best result per completed level
    #[serde(default)]
    pub completed_levels: IndexMap<String, LevelProgress>,
    /// Achievements already reported
    #[serde(default)]
    pub awarded_achievements: IndexMap<String, bool>,
}

impl ProgressRecord {
    /// Create empty progress
    pub fn new() -> Self {
        Self::default()
    }

    /// Best stars on a level, if completed
    pub fn stars(&self, level_id: &str) -> Option<u8> {
        self.completed_levels.get(level_id).map(|p| p.stars)
    }

    /// Check whether a level was completed
    pub fn is_completed(&self, level_id: &str) -> bool {
        self.completed_levels.contains_key(level_id)
    }

    /// Check whether an achievement was already reported
    pub fn is_awarded(&self, achievement_id: &str) -> bool {
        self.awarded_achievements
            .get(achievement_id)
            .copied()
            .unwrap_or(false)
    }

    /// Report an achievement once. Returns `true` if it was newly awarded.
    fn award(&mut self, achievement_id: &str, sink: &dyn AchievementSink) -> bool {
        if self.is_awarded(achievement_id) {
            return false;
        }
        sink.unlock(achievement_id);
        self.awarded_achievements
            .insert(achievement_id.to_string(), true);
        tracing::info!(achievement = achievement_id, "achievement awarded");
        true
    }

    /// Record a completion, keeping the best stars.
    ///
    /// The level's achievement is reported on its first completion only.
    pub fn record_completion(
        &mut self,
        completion: &Completion,
        achievements: &AchievementTable,
        sink: &dyn AchievementSink,
    ) -> CompletionEvent {
        let earned = completion.stars.get();
        let is_first_completion = match self.completed_levels.get_mut(&completion.level_id) {
            Some(progress) => {
                progress.stars = progress.stars.max(earned);
                false
            }
            None => {
                self.completed_levels
                    .insert(completion.level_id.clone(), LevelProgress { stars: earned });
                true
            }
        };

        let mut unlocked_achievements = Vec::new();
        if is_first_completion {
            if let Some(id) = achievements.for_level(&completion.level_id) {
                if self.award(id, sink) {
                    unlocked_achievements.push(id.to_string());
                }
            }
        }

        tracing::debug!(
            level = %completion.level_id,
            stars = earned,
            first = is_first_completion,
            "completion recorded"
        );

        CompletionEvent {
            level_id: completion.level_id.clone(),
            stars_earned: completion.stars,
            is_first_completion,
            unlocked_achievements,
        }
    }

    /// Completion counts for one category
    pub fn category_progress(&self, levels: &[Level], category: LevelCategory) -> CategoryProgress {
        let in_category = levels.iter().filter(|l| l.category == category);
        let total = in_category.clone().count();
        let completed = in_category.filter(|l| self.is_completed(&l.level_id)).count();
        CategoryProgress::new(completed, total)
    }

    /// Check whether a category is playable.
    ///
    /// Basic is always unlocked. A later category needs the previous one
    /// unlocked and at or above the threshold, unless the category itself is
    /// empty. Only an empty Basic waives the threshold for the next category;
    /// any other empty category keeps its successor locked.
    pub fn is_category_unlocked(&self, levels: &[Level], category: LevelCategory) -> bool {
        let Some(previous) = category.previous() else {
            return true;
        };
        if !self.is_category_unlocked(levels, previous) {
            return false;
        }
        let prev = self.category_progress(levels, previous);
        let own = self.category_progress(levels, category);
        let empty_first = previous.previous().is_none() && prev.total == 0;
        own.total == 0 || empty_first || prev.meets_threshold()
    }

    /// Report category unlock achievements that are now earned.
    ///
    /// The Intermediate unlock is reported once Intermediate is unlocked and
    /// holds at least one level. Returns the newly awarded achievement IDs.
    pub fn award_category_unlocks(
        &mut self,
        levels: &[Level],
        achievements: &AchievementTable,
        sink: &dyn AchievementSink,
    ) -> Vec<String> {
        let mut awarded = Vec::new();
        let intermediate = self.category_progress(levels, LevelCategory::Intermediate);
        if intermediate.total > 0 && self.is_category_unlocked(levels, LevelCategory::Intermediate) {
            let id = achievements.unlock_intermediate();
            if self.award(id, sink) {
                awarded.push(id.to_string());
            }
        }
        awarded
    }

    /// Played count and star total over random levels
    pub fn random_stats(&self, levels: &[Level]) -> RandomStats {
        levels
            .iter()
            .filter(|l| l.category == LevelCategory::Random)
            .fold(RandomStats::default(), |mut stats, level| {
                stats.total += 1;
                if let Some(stars) = self.stars(&level.level_id) {
                    stats.played += 1;
                    stats.total_stars += u32::from(stars);
                }
                stats
            })
    }

    /// Pick a random level, preferring ones never completed
    pub fn pick_random_level<'a, R: Rng + ?Sized>(
        &self,
        levels: &'a [Level],
        rng: &mut R,
    ) -> Option<&'a Level> {
        let random: Vec<&Level> = levels
            .iter()
            .filter(|l| l.category == LevelCategory::Random)
            .collect();
        let unplayed: Vec<&Level> = random
            .iter()
            .copied()
            .filter(|l| !self.is_completed(&l.level_id))
            .collect();

        let pool = if unplayed.is_empty() { &random } else { &unplayed };
        pool.choose(rng).copied()
    }
}
