//! `priorityplot-types` – shared data model for the PriorityPlot stack.
//!
//! Defines the [`Task`] record (a goal with its value/time estimates and
//! derived priority score) and the [`GoalEstimate`] trait, the narrow
//! structural view of a goal consumed by the goal-memory engine.

use serde::{Deserialize, Serialize};

/// The minimal view of a goal that the memory engine needs: a display name
/// plus the user's value/time estimates.
///
/// The engine is deliberately decoupled from the richer [`Task`] abstraction
/// (scheduling state, derived score); anything exposing these three fields
/// can be remembered.
pub trait GoalEstimate {
    /// Display name of the goal, original casing and punctuation.
    fn name(&self) -> &str;
    /// Estimated value of completing the goal.
    fn value(&self) -> f64;
    /// Estimated time to complete the goal, in hours.
    fn time(&self) -> f64;
}

/// A single goal on the priority plot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Display name entered by the user.
    pub name: String,
    /// Estimated value of completing the goal.
    pub value: f64,
    /// Estimated time to complete the goal, in hours.
    pub time: f64,
    /// Derived priority score; `0.0` until [`Task::calculate_score`] runs.
    #[serde(default)]
    pub score: f64,
}

impl Task {
    /// Create a task with the given estimates and an unscored priority.
    pub fn new(name: impl Into<String>, value: f64, time: f64) -> Self {
        Self {
            name: name.into(),
            value,
            time,
            score: 0.0,
        }
    }

    /// Recompute and return the priority score: `value / ln(max(e, time))`.
    ///
    /// Clamping the time at `e` keeps the logarithm at or above 1, so quick
    /// tasks cannot blow the score up to infinity.
    pub fn calculate_score(&mut self) -> f64 {
        self.score = self.value / self.time.max(std::f64::consts::E).ln();
        self.score
    }
}

impl GoalEstimate for Task {
    fn name(&self) -> &str {
        &self.name
    }
    fn value(&self) -> f64 {
        self.value
    }
    fn time(&self) -> f64 {
        self.time
    }
}

/// Score every task and sort the slice by descending priority.
pub fn calculate_and_sort(tasks: &mut [Task]) {
    for t in tasks.iter_mut() {
        t.calculate_score();
    }
    tasks.sort_by(|a, b| b.score.total_cmp(&a.score));
}
