use clap::Subcommand;
use dayplan_core::Config;

use super::optimize::build_optimizer;

#[derive(Subcommand)]
pub enum AdvisorAction {
    /// Check whether the configured advisor answers
    Status,
}

pub fn run(action: AdvisorAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        AdvisorAction::Status => {
            let config = Config::load()?;
            let optimizer = build_optimizer(&config, false)?;
            let runtime = tokio::runtime::Runtime::new()?;
            let status = runtime.block_on(optimizer.probe());

            println!("Endpoint: {}", config.advisor.endpoint);
            println!("Model: {}", config.advisor.model);
            if status.is_reachable() {
                println!("Advisor reachable; optimize will consult it first.");
            } else {
                println!("Advisor unavailable; optimize will use the local heuristic.");
            }
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
    }
    Ok(())
}
