//! Local fallback scheduler.
//!
//! Rearranges flexible tasks into the free time around fixed ones without
//! any external help:
//! - Fixed tasks seed the occupied windows and never move
//! - Flexible tasks are taken in current start order
//! - Each one goes to the first step-aligned candidate after the cursor that
//!   avoids every occupied window and ends before the placement limit
//! - Tasks that cannot be placed keep their times
//!
//! Greedy first-fit by current order always terminates and never creates a
//! conflict; it makes no attempt to minimise gaps.

use serde::{Deserialize, Serialize};

use crate::policy::SchedulingPolicy;
use crate::schedule::{Clock, Task};

/// Summary returned by every fallback run.
pub const FALLBACK_SUMMARY: &str =
    "Flexible tasks were rearranged into the free slots around your fixed commitments.";

/// Which strategy produced a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlanProvider {
    /// External advisor, by name
    Advisor { name: String },
    /// Deterministic local heuristic
    LocalHeuristic,
}

impl PlanProvider {
    pub fn label(&self) -> String {
        match self {
            Self::Advisor { name } => format!("advisor ({name})"),
            Self::LocalHeuristic => "local heuristic".to_string(),
        }
    }
}

/// A rearranged day: every input task exactly once, sorted by start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptimizedPlan {
    pub tasks: Vec<Task>,
    pub summary: String,
    pub provider: PlanProvider,
}

/// Half-open occupied window in minutes.
#[derive(Debug, Clone, Copy)]
struct Window {
    start: i32,
    end: i32,
}

impl Window {
    fn intersects(&self, start: i32, end: i32) -> bool {
        start < self.end && self.start < end
    }
}

/// Deterministic first-fit scheduler
pub struct FallbackScheduler {
    policy: SchedulingPolicy,
}

impl FallbackScheduler {
    /// Create a new scheduler with the default policy
    pub fn new() -> Self {
        Self {
            policy: SchedulingPolicy::default(),
        }
    }

    /// Create with a custom policy
    pub fn with_policy(policy: SchedulingPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &SchedulingPolicy {
        &self.policy
    }

    /// Rearrange flexible tasks around fixed ones.
    ///
    /// # Arguments
    /// * `tasks` - The day task set, any order
    ///
    /// # Returns
    /// All tasks, fixed ones untouched, sorted by start. Never fails.
    pub fn optimize(&self, tasks: &[Task]) -> OptimizedPlan {
        let (tasks, placed) = self.arrange(tasks);
        tracing::debug!(placed = placed.len(), total = tasks.len(), "fallback arrangement done");

        OptimizedPlan {
            tasks,
            summary: FALLBACK_SUMMARY.to_string(),
            provider: PlanProvider::LocalHeuristic,
        }
    }

    /// Arranged tasks plus the ids that received a new slot.
    pub(crate) fn arrange(&self, tasks: &[Task]) -> (Vec<Task>, Vec<String>) {
        let (fixed, mut flexible): (Vec<Task>, Vec<Task>) =
            tasks.iter().cloned().partition(|t| t.fixed);
        flexible.sort_by_key(|t| t.start_minutes());

        let mut occupied: Vec<Window> = fixed
            .iter()
            .map(|t| Window {
                start: t.start_minutes(),
                end: t.end_minutes(),
            })
            .collect();
        let mut cursor = self.policy.placement_start as i32;
        let mut placed_ids = Vec::new();

        let placed: Vec<Task> = flexible
            .into_iter()
            .map(|task| {
                let duration = task.duration_minutes();
                if duration <= 0 {
                    tracing::debug!(task_id = %task.id, "keeping task with non-positive duration");
                    return task;
                }
                match self.find_slot(cursor, duration, &occupied) {
                    Some(start) => {
                        let end = start + duration;
                        occupied.push(Window { start, end });
                        cursor = end;
                        placed_ids.push(task.id.clone());
                        tracing::debug!(task_id = %task.id, start, end, "placed flexible task");
                        task.with_times(Clock::clamped(start), Clock::clamped(end))
                    }
                    None => {
                        tracing::debug!(task_id = %task.id, "no free slot, keeping original times");
                        task
                    }
                }
            })
            .collect();

        let mut merged = fixed;
        merged.extend(placed);
        merged.sort_by_key(|t| t.start_minutes());
        (merged, placed_ids)
    }

    /// First candidate start from `cursor` whose interval is free and ends in time.
    fn find_slot(&self, cursor: i32, duration: i32, occupied: &[Window]) -> Option<i32> {
        let step = self.policy.slot_step.max(1) as i32;
        let limit = self.policy.placement_end as i32;

        (0..self.policy.max_scan_steps as i32)
            .map(|k| cursor + k * step)
            .take_while(|start| start + duration <= limit)
            .find(|&start| {
                let end = start + duration;
                !occupied.iter().any(|w| w.intersects(start, end))
            })
    }
}

impl Default for FallbackScheduler {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience function to run the fallback with the default policy
pub fn fallback_optimize(tasks: &[Task]) -> OptimizedPlan {
    FallbackScheduler::new().optimize(tasks)
}
