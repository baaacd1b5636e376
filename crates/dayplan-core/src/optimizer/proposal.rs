//! Staged optimization results.
//!
//! An optimization never writes to the live task set. Its result is staged
//! in a [`ProposalSlot`] and only reaches the live set on an explicit
//! [`ProposalSlot::apply`]; [`ProposalSlot::discard`] drops it.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::events::PlanEvent;
use crate::schedule::{Clock, Task};
use crate::scheduler::OptimizedPlan;

/// An alternative schedule awaiting approval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanProposal {
    pub id: String,
    pub date: NaiveDate,
    pub plan: OptimizedPlan,
    pub created_at: DateTime<Utc>,
}

/// One task whose times differ between the live set and a proposal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskChange {
    pub task_id: String,
    pub title: String,
    pub from: (Clock, Clock),
    pub to: (Clock, Clock),
}

impl PlanProposal {
    pub fn new(date: NaiveDate, plan: OptimizedPlan) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            date,
            plan,
            created_at: Utc::now(),
        }
    }

    /// Differences against the live set, in proposal order.
    ///
    /// Tasks deleted since the proposal was made are left out.
    pub fn changes(&self, live: &[Task]) -> Vec<TaskChange> {
        self.plan
            .tasks
            .iter()
            .filter_map(|proposed| {
                let current = live.iter().find(|t| t.id == proposed.id)?;
                let moved = current.start_time != proposed.start_time
                    || current.end_time != proposed.end_time;
                moved.then(|| TaskChange {
                    task_id: current.id.clone(),
                    title: current.title.clone(),
                    from: (current.start_time, current.end_time),
                    to: (proposed.start_time, proposed.end_time),
                })
            })
            .collect()
    }
}

/// Holds at most one pending proposal next to the live set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProposalSlot {
    pending: Option<PlanProposal>,
}

impl ProposalSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> Option<&PlanProposal> {
        self.pending.as_ref()
    }

    /// Stage a plan for `date`, replacing any earlier pending proposal.
    pub fn stage(&mut self, date: NaiveDate, plan: OptimizedPlan) -> PlanEvent {
        let proposal = PlanProposal::new(date, plan);
        let event = PlanEvent::ProposalStaged {
            proposal_id: proposal.id.clone(),
            date,
            provider: proposal.plan.provider.clone(),
            at: Utc::now(),
        };
        if let Some(previous) = self.pending.replace(proposal) {
            tracing::debug!(proposal_id = %previous.id, "replaced pending proposal");
        }
        event
    }

    /// Write the pending proposal's times into the live set and clear the slot.
    ///
    /// Only time fields of live tasks on the proposal's date whose id appears
    /// in the proposal are rewritten. Tasks that are fixed in the live set
    /// keep their times. Returns `None` when nothing is pending.
    pub fn apply(&mut self, live: &mut [Task]) -> Option<PlanEvent> {
        let proposal = self.pending.take()?;
        let mut updated = 0;

        for task in live.iter_mut().filter(|t| t.date == proposal.date && !t.fixed) {
            let Some(proposed) = proposal.plan.tasks.iter().find(|p| p.id == task.id) else {
                continue;
            };
            if task.start_time != proposed.start_time || task.end_time != proposed.end_time {
                task.start_time = proposed.start_time;
                task.end_time = proposed.end_time;
                updated += 1;
            }
        }

        tracing::info!(proposal_id = %proposal.id, updated, "applied proposal");
        Some(PlanEvent::ProposalApplied {
            proposal_id: proposal.id,
            updated,
            at: Utc::now(),
        })
    }

    /// Drop the pending proposal without touching the live set.
    pub fn discard(&mut self) -> Option<PlanEvent> {
        let proposal = self.pending.take()?;
        Some(PlanEvent::ProposalDiscarded {
            proposal_id: proposal.id,
            at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::test_support::{day, fixed, task};
    use crate::scheduler::fallback_optimize;

    fn live_day() -> Vec<Task> {
        vec![
            fixed("1", "07:00", "08:00"),
            task("2", "07:30", "08:30"),
            task("3", "09:00", "09:15"),
        ]
    }

    #[test]
    fn staging_leaves_live_set_untouched() {
        let live = live_day();
        let mut slot = ProposalSlot::new();
        let event = slot.stage(day(), fallback_optimize(&live));
        assert!(matches!(event, PlanEvent::ProposalStaged { .. }));
        assert_eq!(live, live_day());
        assert!(slot.pending().is_some());
    }

    #[test]
    fn apply_rewrites_times_and_clears_slot() {
        let mut live = live_day();
        let mut slot = ProposalSlot::new();
        slot.stage(day(), fallback_optimize(&live));

        let changes = slot.pending().unwrap().changes(&live);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].task_id, "2");

        let event = slot.apply(&mut live).unwrap();
        assert!(matches!(event, PlanEvent::ProposalApplied { updated: 1, .. }));
        assert_eq!(live[1].start_time.to_string(), "08:00");
        assert_eq!(live[1].id, "2");
        assert!(slot.pending().is_none());
        assert!(slot.apply(&mut live).is_none());
    }

    #[test]
    fn discard_keeps_live_set() {
        let mut live = live_day();
        let mut slot = ProposalSlot::new();
        slot.stage(day(), fallback_optimize(&live));
        assert!(matches!(slot.discard(), Some(PlanEvent::ProposalDiscarded { .. })));
        assert!(slot.discard().is_none());
        assert!(slot.apply(&mut live).is_none());
        assert_eq!(live, live_day());
    }

    #[test]
    fn stale_proposal_does_not_resurrect_or_touch_other_days() {
        let original = live_day();
        let mut slot = ProposalSlot::new();
        slot.stage(day(), fallback_optimize(&original));

        // Task 2 was deleted and a task on another day shares id 3 while pending.
        let mut other_day = task("3", "12:00", "12:15");
        other_day.date = day().succ_opt().unwrap();
        let mut live = vec![original[0].clone(), other_day.clone()];

        slot.apply(&mut live);
        assert_eq!(live.len(), 2);
        assert_eq!(live[1], other_day);
    }

    #[test]
    fn restaging_replaces_pending_proposal() {
        let live = live_day();
        let mut slot = ProposalSlot::new();
        slot.stage(day(), fallback_optimize(&live));
        let first = slot.pending().unwrap().id.clone();
        slot.stage(day(), fallback_optimize(&live));
        assert_ne!(slot.pending().unwrap().id, first);
    }

    #[test]
    fn slot_survives_json_storage() {
        let mut slot = ProposalSlot::new();
        slot.stage(day(), fallback_optimize(&live_day()));
        let json = serde_json::to_string(&slot).unwrap();
        let restored: ProposalSlot = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, slot);
    }
}
