//! In-memory entry store with deterministic fuzzy lookup.
//!
//! Entries are keyed by their normalized form in a `BTreeMap`, so the fuzzy
//! scan always walks candidates in ascending key order and tie-breaks
//! between equally-scored candidates are reproducible across runs and
//! platforms.  Capacity is enforced lazily: inserts may push the store past
//! [`MAX_ENTRIES`], and [`MemoryStore::evict_to_cap`] drops the oldest
//! entries when the engine persists.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use crate::similarity;

/// Maximum number of entries retained in the persisted file.
pub const MAX_ENTRIES: usize = 1000;

/// One remembered goal: the display name the user last typed, its matching
/// key, and the estimates to auto-fill on a future match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalMemoryEntry {
    /// Display name, last-seen original casing and punctuation.
    pub name: String,
    /// Canonical matching key; unique within the store, never empty.
    pub normalized: String,
    /// Last value estimate the user assigned.
    pub value: f64,
    /// Last time estimate the user assigned.
    pub time: f64,
    /// When this entry was last written; drives recency eviction only.
    pub updated_at: DateTime<Utc>,
}

impl GoalMemoryEntry {
    /// Whether `other` carries the same remembered estimate.
    ///
    /// Compares `name`, `value` and `time` but deliberately ignores
    /// `updated_at`: the timestamp changes on every upsert, and including it
    /// would make every `update_from_tasks` call dirty the store and rewrite
    /// the file even when nothing the user cares about has changed.
    pub fn same_estimate(&self, other: &GoalMemoryEntry) -> bool {
        self.name == other.name && self.value == other.value && self.time == other.time
    }
}

/// Mapping from normalized key to remembered entry.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, GoalMemoryEntry>,
}

impl MemoryStore {
    /// Build a store from already-validated entries (normalized keys are
    /// trusted to be non-empty).
    pub fn from_entries(entries: impl IntoIterator<Item = GoalMemoryEntry>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|e| (e.normalized.clone(), e))
                .collect(),
        }
    }

    /// Exact lookup by normalized key.
    pub fn get(&self, normalized: &str) -> Option<&GoalMemoryEntry> {
        self.entries.get(normalized)
    }

    /// Insert or replace the entry under its normalized key.
    pub fn upsert(&mut self, entry: GoalMemoryEntry) {
        self.entries.insert(entry.normalized.clone(), entry);
    }

    /// Best fuzzy candidate for `query` and its score, scanning entries in
    /// ascending key order (first-seen wins ties).
    ///
    /// The caller is responsible for the acceptance threshold; this only
    /// ranks.
    pub fn best_fuzzy(&self, query: &str) -> Option<(&GoalMemoryEntry, f64)> {
        let mut best: Option<(&GoalMemoryEntry, f64)> = None;
        for entry in self.entries.values() {
            let score = similarity::score(query, &entry.normalized);
            if best.as_ref().is_none_or(|(_, s)| score > *s) {
                best = Some((entry, score));
            }
        }
        best
    }

    /// All entries ordered by `updated_at` descending (most recent first).
    ///
    /// Ties fall back to ascending normalized key so the ordering stays
    /// deterministic even when timestamps collide.
    pub fn by_recency(&self) -> Vec<&GoalMemoryEntry> {
        let mut entries: Vec<&GoalMemoryEntry> = self.entries.values().collect();
        entries.sort_by(|a, b| {
            b.updated_at
                .cmp(&a.updated_at)
                .then_with(|| a.normalized.cmp(&b.normalized))
        });
        entries
    }

    /// Drop the oldest entries until the store fits [`MAX_ENTRIES`].
    ///
    /// Returns the number of entries evicted.  Called at persist time so the
    /// in-memory map matches what lands on disk.
    pub fn evict_to_cap(&mut self) -> usize {
        if self.entries.len() <= MAX_ENTRIES {
            return 0;
        }
        let doomed: Vec<String> = self
            .by_recency()
            .into_iter()
            .skip(MAX_ENTRIES)
            .map(|e| e.normalized.clone())
            .collect();
        for key in &doomed {
            self.entries.remove(key);
        }
        debug!(evicted = doomed.len(), "evicted oldest goal-memory entries");
        doomed.len()
    }

    /// Number of remembered goals.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing has been remembered yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
