//! `priorityplot-memory` – the Goal Memory engine.
//!
//! Remembers the value/time estimates a user previously assigned to a goal
//! by name, so that re-entering the same or a similarly named goal can
//! auto-fill plausible defaults.
//!
//! # Modules
//!
//! - [`normalize`] – canonicalises free-form goal names into matching keys.
//! - [`similarity`] – Ratcliff/Obershelp ratio, containment bonus, and the
//!   length-adaptive acceptance threshold.
//! - [`store`] – [`MemoryStore`][store::MemoryStore]: the in-memory mapping
//!   with deterministic fuzzy lookup and recency eviction.
//! - [`persist`] – best-effort JSON load and atomic temp-file + rename save.
//!
//! # Example
//!
//! ```rust
//! use priorityplot_memory::GoalMemory;
//! use priorityplot_types::Task;
//!
//! let dir = tempfile::tempdir().unwrap();
//! let mut memory = GoalMemory::open(dir.path().join("goal_memory.json"));
//!
//! memory
//!     .update_from_tasks(&[Task::new("Write Report", 4.0, 2.0)], true)
//!     .unwrap();
//!
//! let hit = memory.find_match("write report!").unwrap();
//! assert_eq!(hit.name, "Write Report");
//! assert_eq!(hit.score, 1.0);
//! ```

pub mod normalize;
pub mod persist;
pub mod similarity;
pub mod store;

use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::debug;

use priorityplot_types::GoalEstimate;

pub use persist::MemoryError;
pub use store::{GoalMemoryEntry, MAX_ENTRIES, MemoryStore};

use normalize::normalize;

// ─────────────────────────────────────────────────────────────────────────────
// GoalMemoryMatch
// ─────────────────────────────────────────────────────────────────────────────

/// Read-only result of a successful [`GoalMemory::find_match`] query.
#[derive(Debug, Clone, PartialEq)]
pub struct GoalMemoryMatch {
    /// Stored display name of the matched goal.
    pub name: String,
    /// Remembered value estimate.
    pub value: f64,
    /// Remembered time estimate.
    pub time: f64,
    /// Match confidence in `[0, 1]`; `1.0` for an exact key match.
    pub score: f64,
}

// ─────────────────────────────────────────────────────────────────────────────
// GoalMemory
// ─────────────────────────────────────────────────────────────────────────────

/// Persistent, approximate-match cache of previously-scored goals.
///
/// Construct with [`GoalMemory::open`] against an explicit storage path
/// (tests point it at a temp directory) or [`GoalMemory::open_default`] for
/// the per-user location.  Loading is best-effort: a missing or corrupt
/// file starts the engine empty rather than failing construction.
///
/// Single-threaded by design — there is no internal locking, and the engine
/// must not be mutated from multiple threads or processes without an
/// external mutex.
pub struct GoalMemory {
    storage_path: PathBuf,
    store: MemoryStore,
}

impl GoalMemory {
    /// Open a goal memory backed by `storage_path`, loading any previously
    /// persisted entries.
    pub fn open(storage_path: impl Into<PathBuf>) -> Self {
        let storage_path = storage_path.into();
        let store = MemoryStore::from_entries(persist::load(&storage_path));
        debug!(path = %storage_path.display(), entries = store.len(), "goal memory opened");
        Self {
            storage_path,
            store,
        }
    }

    /// Open the per-user goal memory at [`GoalMemory::default_storage_path`].
    pub fn open_default() -> Self {
        Self::open(Self::default_storage_path())
    }

    /// The default per-user storage location:
    /// `<home>/.priorityplot/goal_memory.json`.
    pub fn default_storage_path() -> PathBuf {
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home)
            .join(".priorityplot")
            .join("goal_memory.json")
    }

    /// Path this engine persists to.
    pub fn storage_path(&self) -> &Path {
        &self.storage_path
    }

    /// Look up a remembered goal for `name`.
    ///
    /// An exact normalized-key hit returns the stored entry with score
    /// `1.0`.  Otherwise every entry is scored (ascending key order, first
    /// seen wins ties) and the best candidate is returned only if it clears
    /// the adaptive threshold for the longer of the two keys.  Empty names
    /// and an empty store return `None`.
    pub fn find_match(&self, name: &str) -> Option<GoalMemoryMatch> {
        let query = normalize(name);
        if query.is_empty() || self.store.is_empty() {
            return None;
        }

        if let Some(entry) = self.store.get(&query) {
            return Some(GoalMemoryMatch {
                name: entry.name.clone(),
                value: entry.value,
                time: entry.time,
                score: 1.0,
            });
        }

        let (best, score) = self.store.best_fuzzy(&query)?;
        if score < similarity::min_score_for(&query, &best.normalized) {
            return None;
        }
        Some(GoalMemoryMatch {
            name: best.name.clone(),
            value: best.value,
            time: best.time,
            score,
        })
    }

    /// Remember the current estimates of `goals`, persisting when `save` is
    /// true and at least one entry actually changed.
    ///
    /// Goals whose names normalize to the empty key are skipped.  An entry
    /// is considered changed when its `name`, `value` or `time` differ from
    /// what is stored; the `updated_at` timestamp alone never dirties the
    /// store (see [`GoalMemoryEntry::same_estimate`]).
    pub fn update_from_tasks<G: GoalEstimate>(
        &mut self,
        goals: &[G],
        save: bool,
    ) -> Result<(), MemoryError> {
        let now = Utc::now();
        let mut dirty = false;
        for goal in goals {
            let normalized = normalize(goal.name());
            if normalized.is_empty() {
                continue;
            }
            let candidate = GoalMemoryEntry {
                name: goal.name().to_string(),
                normalized,
                value: goal.value(),
                time: goal.time(),
                updated_at: now,
            };
            let unchanged = self
                .store
                .get(&candidate.normalized)
                .is_some_and(|existing| existing.same_estimate(&candidate));
            if !unchanged {
                self.store.upsert(candidate);
                dirty = true;
            }
        }

        if dirty && save {
            self.save()?;
        }
        Ok(())
    }

    /// Persist the store now: evict past the entry cap, then write the file
    /// atomically.  I/O failures propagate to the caller.
    pub fn save(&mut self) -> Result<(), MemoryError> {
        self.store.evict_to_cap();
        let entries = self.store.by_recency();
        persist::save(&self.storage_path, &entries)
    }

    /// All remembered entries, most recently updated first.
    pub fn entries_by_recency(&self) -> Vec<&GoalMemoryEntry> {
        self.store.by_recency()
    }

    /// Number of remembered goals.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Returns `true` if nothing has been remembered yet.
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use priorityplot_types::Task;

    fn memory_in(dir: &tempfile::TempDir) -> GoalMemory {
        GoalMemory::open(dir.path().join("goal_memory.json"))
    }

    // ── find_match: exact ────────────────────────────────────────────────────

    #[test]
    fn exact_match_returns_stored_estimates_with_score_one() {
        let dir = tempfile::tempdir().unwrap();
        let mut memory = memory_in(&dir);
        memory
            .update_from_tasks(&[Task::new("Write Report", 4.0, 2.0)], false)
            .unwrap();

        let hit = memory.find_match("Write Report").unwrap();
        assert_eq!(hit.name, "Write Report");
        assert!((hit.value - 4.0).abs() < f64::EPSILON);
        assert!((hit.time - 2.0).abs() < f64::EPSILON);
        assert_eq!(hit.score, 1.0);
    }

    #[test]
    fn exact_match_ignores_casing_and_punctuation() {
        let dir = tempfile::tempdir().unwrap();
        let mut memory = memory_in(&dir);
        memory
            .update_from_tasks(&[Task::new("Write Report", 4.0, 2.0)], false)
            .unwrap();

        let hit = memory.find_match("  write REPORT!! ").unwrap();
        assert_eq!(hit.score, 1.0);
        assert_eq!(hit.name, "Write Report");
    }

    // ── find_match: fuzzy ────────────────────────────────────────────────────

    #[test]
    fn fuzzy_match_accepts_contained_query() {
        let dir = tempfile::tempdir().unwrap();
        let mut memory = memory_in(&dir);
        memory
            .update_from_tasks(&[Task::new("Daily Standup Meeting", 2.0, 0.5)], false)
            .unwrap();

        let hit = memory.find_match("daily standup").unwrap();
        assert_eq!(hit.name, "Daily Standup Meeting");
        assert!((hit.value - 2.0).abs() < f64::EPSILON);
        assert!((hit.time - 0.5).abs() < f64::EPSILON);
        assert!(hit.score >= 0.80);
        assert!(hit.score < 1.0);
    }

    #[test]
    fn fuzzy_match_rejects_short_near_miss() {
        let dir = tempfile::tempdir().unwrap();
        let mut memory = memory_in(&dir);
        memory
            .update_from_tasks(&[Task::new("Fix Bug", 4.0, 1.0)], false)
            .unwrap();

        // "fox bag" vs "fix bug" scores ~0.71, far below the 0.92 bar for
        // keys this short.
        assert!(memory.find_match("Fox Bag").is_none());
    }

    #[test]
    fn empty_name_and_empty_store_return_none() {
        let dir = tempfile::tempdir().unwrap();
        let mut memory = memory_in(&dir);
        assert!(memory.find_match("anything").is_none());

        memory
            .update_from_tasks(&[Task::new("Fix Bug", 4.0, 1.0)], false)
            .unwrap();
        assert!(memory.find_match("").is_none());
        assert!(memory.find_match("!!!").is_none());
    }

    // ── update_from_tasks ────────────────────────────────────────────────────

    #[test]
    fn goals_with_empty_keys_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let mut memory = memory_in(&dir);
        memory
            .update_from_tasks(
                &[Task::new("???", 1.0, 1.0), Task::new("Real Goal", 2.0, 1.0)],
                false,
            )
            .unwrap();
        assert_eq!(memory.len(), 1);
    }

    #[test]
    fn re_entering_a_goal_updates_its_estimates() {
        let dir = tempfile::tempdir().unwrap();
        let mut memory = memory_in(&dir);
        memory
            .update_from_tasks(&[Task::new("Fix Bug", 4.0, 1.0)], false)
            .unwrap();
        memory
            .update_from_tasks(&[Task::new("Fix Bug", 5.0, 2.5)], false)
            .unwrap();

        let hit = memory.find_match("Fix Bug").unwrap();
        assert!((hit.value - 5.0).abs() < f64::EPSILON);
        assert!((hit.time - 2.5).abs() < f64::EPSILON);
        assert_eq!(memory.len(), 1);
    }

    #[test]
    fn unchanged_goals_do_not_rewrite_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("goal_memory.json");
        let mut memory = GoalMemory::open(&path);
        let goals = [Task::new("Write Report", 4.0, 2.0)];
        memory.update_from_tasks(&goals, true).unwrap();
        assert!(path.exists());

        // Same estimates again: the dirty check compares name/value/time and
        // ignores the timestamp, so no save happens.
        std::fs::remove_file(&path).unwrap();
        memory.update_from_tasks(&goals, true).unwrap();
        assert!(!path.exists(), "identical upsert must not persist");
    }

    #[test]
    fn update_without_save_defers_persistence() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("goal_memory.json");
        let mut memory = GoalMemory::open(&path);
        memory
            .update_from_tasks(&[Task::new("Fix Bug", 4.0, 1.0)], false)
            .unwrap();
        assert!(!path.exists());

        memory.save().unwrap();
        assert!(path.exists());
    }

    // ── persistence round-trip ───────────────────────────────────────────────

    #[test]
    fn estimates_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("goal_memory.json");
        let goals: Vec<Task> = (0..50)
            .map(|i| Task::new(format!("Goal Number {i}"), i as f64, 0.5 + i as f64))
            .collect();

        let mut writer = GoalMemory::open(&path);
        writer.update_from_tasks(&goals, true).unwrap();
        drop(writer);

        let reader = GoalMemory::open(&path);
        for goal in &goals {
            let hit = reader.find_match(&goal.name).unwrap();
            assert_eq!(hit.name, goal.name);
            assert!((hit.value - goal.value).abs() < f64::EPSILON);
            assert!((hit.time - goal.time).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn corrupt_file_opens_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("goal_memory.json");
        std::fs::write(&path, "not even json").unwrap();
        let memory = GoalMemory::open(&path);
        assert!(memory.is_empty());
    }

    // ── capacity ─────────────────────────────────────────────────────────────

    #[test]
    fn save_evicts_oldest_beyond_capacity() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("goal_memory.json");
        let mut memory = GoalMemory::open(&path);

        // Seed directly with strictly increasing updated_at values so the
        // recency ordering is unambiguous without waiting on the clock.
        for i in 0..(MAX_ENTRIES + 5) {
            memory.store.upsert(GoalMemoryEntry {
                name: format!("Unique Goal {i}"),
                normalized: format!("unique goal {i}"),
                value: 1.0,
                time: 1.0,
                updated_at: Utc.timestamp_opt(i as i64, 0).unwrap(),
            });
        }
        assert_eq!(memory.len(), MAX_ENTRIES + 5);
        memory.save().unwrap();
        assert_eq!(memory.len(), MAX_ENTRIES);

        let reloaded = GoalMemory::open(&path);
        assert_eq!(reloaded.len(), MAX_ENTRIES);
        // The five earliest goals are gone from exact lookup.
        for i in 0..5 {
            let name = format!("Unique Goal {i}");
            let hit = reloaded.find_match(&name);
            assert!(
                hit.as_ref().is_none_or(|m| m.score < 1.0),
                "goal {i} should have been evicted, got {hit:?}"
            );
        }
        // The most recent goals are still exactly matchable.
        for i in (MAX_ENTRIES..MAX_ENTRIES + 5).rev() {
            let hit = reloaded.find_match(&format!("Unique Goal {i}")).unwrap();
            assert_eq!(hit.score, 1.0);
        }
    }

    // ── listing ──────────────────────────────────────────────────────────────

    #[test]
    fn entries_by_recency_reports_latest_first() {
        let dir = tempfile::tempdir().unwrap();
        let mut memory = memory_in(&dir);
        memory
            .update_from_tasks(&[Task::new("First Goal", 1.0, 1.0)], false)
            .unwrap();
        std::thread::sleep(std::time::Duration::from_millis(2));
        memory
            .update_from_tasks(&[Task::new("Second Goal", 2.0, 1.0)], false)
            .unwrap();

        let names: Vec<&str> = memory
            .entries_by_recency()
            .iter()
            .map(|e| e.name.as_str())
            .collect();
        assert_eq!(names, vec!["Second Goal", "First Goal"]);
    }
}
