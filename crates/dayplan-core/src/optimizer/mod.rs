//! Plan optimization orchestrator.
//!
//! Strategies are tried in order and the first one that produces a plan
//! wins. The local heuristic cannot fail, so `optimize` always returns a
//! plan; advisor failures are logged and never surface to the caller.

pub mod advisor;
pub mod prompt;
pub mod proposal;
pub mod response;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub use advisor::{Advisor, AdvisorConfig, AdvisorStatus, ChatMessage, HttpAdvisor};
pub use proposal::{PlanProposal, ProposalSlot, TaskChange};
pub use response::{AdvisorReply, AdvisorUpdate, RejectReason, ValidatedUpdates};

use crate::error::AdvisorError;
use crate::policy::SchedulingPolicy;
use crate::schedule::{Tag, Task};
use crate::scheduler::{FallbackScheduler, OptimizedPlan, PlanProvider};

/// Summary used when the advisor leaves its own summary blank.
pub const ADVISOR_DEFAULT_SUMMARY: &str = "The advisor suggested a rearranged schedule.";

/// One way of producing a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanStrategy {
    Advisor,
    LocalHeuristic,
}

/// Tagged result of running one strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StrategyOutcome {
    Ok(OptimizedPlan),
    Unavailable(String),
}

/// Orchestrates the advisor and the local fallback.
pub struct PlanOptimizer {
    advisor: Option<Arc<dyn Advisor>>,
    fallback: FallbackScheduler,
    strategies: Vec<PlanStrategy>,
}

impl PlanOptimizer {
    /// Advisor first, local heuristic second.
    pub fn new(advisor: Arc<dyn Advisor>, policy: SchedulingPolicy) -> Self {
        Self {
            advisor: Some(advisor),
            fallback: FallbackScheduler::with_policy(policy),
            strategies: vec![PlanStrategy::Advisor, PlanStrategy::LocalHeuristic],
        }
    }

    /// No advisor; every run uses the local heuristic.
    pub fn local_only(policy: SchedulingPolicy) -> Self {
        Self {
            advisor: None,
            fallback: FallbackScheduler::with_policy(policy),
            strategies: vec![PlanStrategy::LocalHeuristic],
        }
    }

    /// Replace the strategy order.
    pub fn with_strategies(mut self, strategies: Vec<PlanStrategy>) -> Self {
        self.strategies = strategies;
        self
    }

    pub fn strategies(&self) -> &[PlanStrategy] {
        &self.strategies
    }

    pub fn policy(&self) -> &SchedulingPolicy {
        self.fallback.policy()
    }

    pub async fn optimize(&self, tasks: &[Task]) -> OptimizedPlan {
        self.optimize_with_tags(tasks, &[]).await
    }

    /// Rearrange a day's tasks. Tags give the advisor category names.
    ///
    /// The input is treated as a snapshot; the caller stages the result.
    pub async fn optimize_with_tags(&self, tasks: &[Task], tags: &[Tag]) -> OptimizedPlan {
        for strategy in &self.strategies {
            match self.run_strategy(*strategy, tasks, tags).await {
                StrategyOutcome::Ok(plan) => {
                    tracing::info!(provider = %plan.provider.label(), "optimization provider selected");
                    return plan;
                }
                StrategyOutcome::Unavailable(reason) => {
                    tracing::warn!(?strategy, %reason, "strategy unavailable");
                }
            }
        }

        tracing::warn!("no strategy produced a plan, using local heuristic");
        self.fallback.optimize(tasks)
    }

    pub async fn run_strategy(
        &self,
        strategy: PlanStrategy,
        tasks: &[Task],
        tags: &[Tag],
    ) -> StrategyOutcome {
        match strategy {
            PlanStrategy::LocalHeuristic => StrategyOutcome::Ok(self.fallback.optimize(tasks)),
            PlanStrategy::Advisor => {
                let Some(advisor) = self.advisor.as_deref() else {
                    return StrategyOutcome::Unavailable("no advisor configured".to_string());
                };
                match self.consult(advisor, tasks, tags).await {
                    Ok(plan) => StrategyOutcome::Ok(plan),
                    Err(e) => StrategyOutcome::Unavailable(e.to_string()),
                }
            }
        }
    }

    async fn consult(
        &self,
        advisor: &dyn Advisor,
        tasks: &[Task],
        tags: &[Tag],
    ) -> Result<OptimizedPlan, AdvisorError> {
        let messages = prompt::build_messages(tasks, tags, self.policy());
        let text = advisor.send_chat_turn(&messages).await?;
        let reply = response::parse_reply(&text)?;
        let validated = response::apply_updates(tasks, &reply);

        for (task_id, reason) in &validated.rejected {
            tracing::warn!(%task_id, ?reason, "rejected advisor update");
        }
        if !validated.unknown.is_empty() {
            tracing::debug!(ids = ?validated.unknown, "ignored updates for unknown tasks");
        }

        let summary = match reply.summary.trim() {
            "" => ADVISOR_DEFAULT_SUMMARY.to_string(),
            s => s.to_string(),
        };
        Ok(OptimizedPlan {
            tasks: validated.tasks,
            summary,
            provider: PlanProvider::Advisor {
                name: advisor.name().to_string(),
            },
        })
    }

    /// Reachability of the configured advisor, for status messages.
    pub async fn probe(&self) -> AdvisorStatus {
        match self.advisor.as_deref() {
            Some(advisor) => advisor.probe().await,
            None => AdvisorStatus::Unreachable {
                reason: "no advisor configured".to_string(),
            },
        }
    }
}
