//! Optimization commands for CLI.
//!
//! The pending proposal lives in `proposal.json` next to the database, so
//! `propose` and `apply`/`discard` can run as separate invocations.

use std::sync::Arc;

use clap::Subcommand;
use dayplan_core::optimizer::{HttpAdvisor, PlanOptimizer, PlanProposal, ProposalSlot};
use dayplan_core::schedule::Task;
use dayplan_core::storage::{self, PlanDb};
use dayplan_core::Config;

use super::resolve_date;

#[derive(Subcommand)]
pub enum OptimizeAction {
    /// Compute a rearranged day and stage it as a proposal
    Propose {
        /// Day (YYYY-MM-DD, default: today)
        #[arg(long)]
        date: Option<String>,
        /// Skip the advisor and use the local heuristic
        #[arg(long)]
        local: bool,
    },
    /// Show the pending proposal
    Show,
    /// Write the pending proposal's times into the plan
    Apply,
    /// Drop the pending proposal
    Discard,
}

pub(crate) fn build_optimizer(
    config: &Config,
    local: bool,
) -> Result<PlanOptimizer, Box<dyn std::error::Error>> {
    if local || !config.advisor.enabled {
        return Ok(PlanOptimizer::local_only(config.policy.clone()));
    }
    let advisor = HttpAdvisor::new(config.advisor.clone())?;
    Ok(PlanOptimizer::new(Arc::new(advisor), config.policy.clone()))
}

fn print_proposal(proposal: &PlanProposal, live: &[Task]) {
    println!("Proposal {} for {}", proposal.id, proposal.date);
    println!("Provider: {}", proposal.plan.provider.label());
    println!("Summary: {}", proposal.plan.summary);
    let changes = proposal.changes(live);
    if changes.is_empty() {
        println!("No time changes.");
    }
    for change in changes {
        println!(
            "  {}-{} -> {}-{}  {}",
            change.from.0, change.from.1, change.to.0, change.to.1, change.title
        );
    }
}

pub fn run(action: OptimizeAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = PlanDb::open()?;
    let path = storage::proposal_path()?;
    let mut slot: ProposalSlot = storage::load_proposal_slot(&path)?;

    match action {
        OptimizeAction::Propose { date, local } => {
            let config = Config::load()?;
            let date = resolve_date(date.as_deref())?;
            let tasks = db.list_tasks_for_day(date)?;
            let tags = db.list_tags()?;

            let optimizer = build_optimizer(&config, local)?;
            let runtime = tokio::runtime::Runtime::new()?;
            let plan = runtime.block_on(optimizer.optimize_with_tags(&tasks, &tags));

            let event = slot.stage(date, plan);
            storage::save_proposal_slot(&path, &slot)?;
            if let Some(proposal) = slot.pending() {
                print_proposal(proposal, &tasks);
            }
            println!("{}", serde_json::to_string_pretty(&event)?);
        }
        OptimizeAction::Show => {
            let proposal = slot.pending().ok_or("no pending proposal")?;
            let live = db.list_tasks_for_day(proposal.date)?;
            print_proposal(proposal, &live);
        }
        OptimizeAction::Apply => {
            let date = slot.pending().ok_or("no pending proposal")?.date;
            let mut live = db.list_tasks_for_day(date)?;
            let event = slot.apply(&mut live).ok_or("no pending proposal")?;
            db.update_task_times(&live)?;
            storage::save_proposal_slot(&path, &slot)?;
            println!("{}", serde_json::to_string_pretty(&event)?);
        }
        OptimizeAction::Discard => {
            let event = slot.discard().ok_or("no pending proposal")?;
            storage::save_proposal_slot(&path, &slot)?;
            println!("{}", serde_json::to_string_pretty(&event)?);
        }
    }
    Ok(())
}
