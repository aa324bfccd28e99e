// SPDX-License-Identifier: MIT OR Apache-2.0
//! Level repository with an explicitly invalidated cache.

use crate::error::{RepositoryError, Result};
use crate::level::{Level, LevelCategory};
use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Levels of one category, in play order
#[derive(Debug, Clone, PartialEq)]
pub struct LevelGroup {
    /// Category of every level in the group
    pub category: LevelCategory,
    /// Levels in play order
    pub levels: Vec<Level>,
}

impl LevelGroup {
    /// Create a group
    pub fn new(category: LevelCategory, levels: Vec<Level>) -> Self {
        Self { category, levels }
    }
}

/// Where level data comes from
pub trait LevelSource {
    /// Load every level group
    fn load(&self) -> Result<Vec<LevelGroup>>;
}

/// Level JSON files under one directory per category
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    /// Create a source rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn load_category(&self, category: LevelCategory) -> Result<Vec<Level>> {
        let dir = self.root.join(category.dir_name());
        if !dir.is_dir() {
            tracing::debug!(dir = %dir.display(), "no level directory for category");
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        for entry in walkdir::WalkDir::new(&dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry?;
            let is_json = entry.path().extension().and_then(|e| e.to_str()) == Some("json");
            if entry.file_type().is_file() && is_json {
                files.push(entry.into_path());
            }
        }

        files.iter().map(|path| read_level(path)).collect()
    }
}

fn read_level(path: &Path) -> Result<Level> {
    let content = std::fs::read_to_string(path).map_err(|source| RepositoryError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let level: Level = serde_json::from_str(&content).map_err(|source| RepositoryError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    for connection in level.suspect_connections() {
        tracing::warn!(
            level = %level.level_id,
            from = %connection.from,
            to = %connection.to,
            "connection names a missing node or feeds a gate into itself"
        );
    }
    Ok(level)
}

impl LevelSource for DirectorySource {
    fn load(&self) -> Result<Vec<LevelGroup>> {
        LevelCategory::all()
            .iter()
            .map(|&category| Ok(LevelGroup::new(category, self.load_category(category)?)))
            .collect()
    }
}

/// Levels held in memory
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    groups: Vec<LevelGroup>,
}

impl StaticSource {
    /// Create a source from groups
    pub fn new(groups: Vec<LevelGroup>) -> Self {
        Self { groups }
    }
}

impl LevelSource for StaticSource {
    fn load(&self) -> Result<Vec<LevelGroup>> {
        Ok(self.groups.clone())
    }
}

/// Level lookup over a [`LevelSource`].
///
/// The source is read on first access and cached until [`invalidate`] is
/// called. Readers share the cached slice without holding the lock.
///
/// [`invalidate`]: LevelRepository::invalidate
pub struct LevelRepository<S> {
    source: S,
    cache: RwLock<Option<Arc<[Level]>>>,
}

impl<S: LevelSource> LevelRepository<S> {
    /// Create a repository with an empty cache
    pub fn new(source: S) -> Self {
        Self {
            source,
            cache: RwLock::new(None),
        }
    }

    /// The underlying source
    pub fn source(&self) -> &S {
        &self.source
    }

    /// All levels in category order, loading them on first use
    pub fn levels(&self) -> Result<Arc<[Level]>> {
        if let Some(levels) = self.cache.read().as_ref() {
            return Ok(Arc::clone(levels));
        }

        let mut cache = self.cache.write();
        if let Some(levels) = cache.as_ref() {
            return Ok(Arc::clone(levels));
        }

        let mut all = Vec::new();
        for group in self.source.load()? {
            tracing::debug!(category = ?group.category, count = group.levels.len(), "loaded level group");
            all.extend(group.levels.into_iter().map(|mut level| {
                level.category = group.category;
                level
            }));
        }
        tracing::info!(count = all.len(), "level cache populated");

        let levels: Arc<[Level]> = all.into();
        *cache = Some(Arc::clone(&levels));
        Ok(levels)
    }

    /// Look up one level by ID
    pub fn level(&self, level_id: &str) -> Result<Level> {
        self.levels()?
            .iter()
            .find(|l| l.level_id == level_id)
            .cloned()
            .ok_or_else(|| RepositoryError::LevelNotFound(level_id.to_string()))
    }

    /// Levels of one category, in play order
    pub fn levels_in(&self, category: LevelCategory) -> Result<Vec<Level>> {
        Ok(self
            .levels()?
            .iter()
            .filter(|l| l.category == category)
            .cloned()
            .collect())
    }

    /// The level after `level_id` in the same category.
    ///
    /// Random levels have no successor. Unknown IDs and the last level of a
    /// category yield `None`.
    pub fn next_level(&self, level_id: &str) -> Result<Option<Level>> {
        let levels = self.levels()?;
        let Some(index) = levels.iter().position(|l| l.level_id == level_id) else {
            return Ok(None);
        };
        let current = &levels[index];
        if current.category == LevelCategory::Random {
            return Ok(None);
        }
        Ok(levels[index + 1..]
            .iter()
            .find(|l| l.category == current.category)
            .cloned())
    }

    /// Drop the cache so the next access reloads from the source
    pub fn invalidate(&self) {
        *self.cache.write() = None;
        tracing::debug!("level cache invalidated");
    }

    /// Check whether levels are cached
    pub fn is_cached(&self) -> bool {
        self.cache.read().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::fixtures::single_and;

    fn static_repo() -> LevelRepository<StaticSource> {
        LevelRepository::new(StaticSource::new(vec![
            LevelGroup::new(
                LevelCategory::Basic,
                vec![single_and("b1"), single_and("b2")],
            ),
            LevelGroup::new(LevelCategory::Intermediate, vec![single_and("i1")]),
            LevelGroup::new(LevelCategory::Random, vec![single_and("r1"), single_and("r2")]),
        ]))
    }

    fn levels_dir() -> PathBuf {
        PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/../../levels"))
    }

    #[test]
    fn test_cache_and_invalidate() {
        let repo = static_repo();
        assert!(!repo.is_cached());
        let first = repo.levels().unwrap();
        assert!(repo.is_cached());
        let second = repo.levels().unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        repo.invalidate();
        assert!(!repo.is_cached());
        let third = repo.levels().unwrap();
        assert!(!Arc::ptr_eq(&first, &third));
        assert_eq!(third.len(), 5);
    }

    #[test]
    fn test_category_assigned_from_group() {
        let repo = static_repo();
        assert_eq!(repo.level("i1").unwrap().category, LevelCategory::Intermediate);
        assert_eq!(repo.levels_in(LevelCategory::Basic).unwrap().len(), 2);
        assert!(repo.levels_in(LevelCategory::Advanced).unwrap().is_empty());
    }

    #[test]
    fn test_level_not_found() {
        let repo = static_repo();
        let err = repo.level("nope").unwrap_err();
        assert!(matches!(err, RepositoryError::LevelNotFound(ref id) if id == "nope"));
    }

    #[test]
    fn test_next_level_stays_in_category() {
        let repo = static_repo();
        assert_eq!(repo.next_level("b1").unwrap().unwrap().level_id, "b2");
        assert!(repo.next_level("b2").unwrap().is_none());
        assert!(repo.next_level("i1").unwrap().is_none());
        assert!(repo.next_level("r1").unwrap().is_none());
        assert!(repo.next_level("unknown").unwrap().is_none());
    }

    #[test]
    fn test_directory_source_loads_shipped_levels() {
        let repo = LevelRepository::new(DirectorySource::new(levels_dir()));
        let levels = repo.levels().unwrap();
        assert!(!levels.is_empty());

        let basic = repo.levels_in(LevelCategory::Basic).unwrap();
        assert_eq!(basic[0].level_id, "level_basic_001");
        let ids: Vec<_> = basic.iter().map(|l| l.level_id.as_str()).collect();
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        assert_eq!(ids, sorted);

        for level in levels.iter() {
            assert!(!level.nodes.is_empty(), "{} has no nodes", level.level_id);
            assert!(!level.target_outputs.is_empty(), "{} has no targets", level.level_id);
        }
    }

    #[test]
    fn test_directory_source_missing_root() {
        let source = DirectorySource::new(levels_dir().join("does-not-exist"));
        let groups = source.load().unwrap();
        assert_eq!(groups.len(), 4);
        assert!(groups.iter().all(|g| g.levels.is_empty()));
    }
}
