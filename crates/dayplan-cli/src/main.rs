use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "dayplan", version, about = "Dayplan CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Task management
    Task {
        #[command(subcommand)]
        action: commands::task::TaskAction,
    },
    /// Tag management
    Tag {
        #[command(subcommand)]
        action: commands::tag::TagAction,
    },
    /// Print the lane layout for a day
    Layout(commands::layout::LayoutArgs),
    /// Propose, review, apply or discard an optimized day
    Optimize {
        #[command(subcommand)]
        action: commands::optimize::OptimizeAction,
    },
    /// Advisor connectivity
    Advisor {
        #[command(subcommand)]
        action: commands::advisor::AdvisorAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("DAYPLAN_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_logging();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Task { action } => commands::task::run(action),
        Commands::Tag { action } => commands::tag::run(action),
        Commands::Layout(args) => commands::layout::run(args),
        Commands::Optimize { action } => commands::optimize::run(action),
        Commands::Advisor { action } => commands::advisor::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
