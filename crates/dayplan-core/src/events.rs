use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::schedule::Clock;
use crate::scheduler::PlanProvider;

/// Every user-visible change to the plan produces an Event.
/// The UI renders them; the CLI prints them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PlanEvent {
    /// An optimization result is waiting for apply/discard.
    ProposalStaged {
        proposal_id: String,
        date: NaiveDate,
        provider: PlanProvider,
        at: DateTime<Utc>,
    },
    /// The pending proposal replaced the live times.
    ProposalApplied {
        proposal_id: String,
        /// Live tasks whose times changed.
        updated: usize,
        at: DateTime<Utc>,
    },
    /// The pending proposal was dropped; the live set is untouched.
    ProposalDiscarded {
        proposal_id: String,
        at: DateTime<Utc>,
    },
    /// A drag gesture committed new times.
    TaskMoved {
        task_id: String,
        start_time: Clock,
        end_time: Clock,
        at: DateTime<Utc>,
    },
    /// A gesture below the click threshold; open the task for editing.
    TaskClicked {
        task_id: String,
        at: DateTime<Utc>,
    },
}
