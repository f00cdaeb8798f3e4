use clap::{Parser, Subcommand};

mod commands;
mod common;

#[derive(Parser)]
#[command(name = "cooloff", version, about = "Cooloff CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Capture a new intent and start its wait
    Capture(commands::capture::CaptureArgs),
    /// List intents by lifecycle bucket
    List {
        #[command(subcommand)]
        action: commands::list::ListAction,
    },
    /// Log and manage urges
    Urge {
        #[command(subcommand)]
        action: commands::urge::UrgeAction,
    },
    /// Finalize a decision at (or after) the checkpoint
    Decide(commands::decide::DecideArgs),
    /// Extend the wait under a new protocol
    Postpone(commands::postpone::PostponeArgs),
    /// Reopen the most recent gave-in decision
    Recover,
    /// Sweep checkpoints once, or keep sweeping with --watch
    Refresh(commands::refresh::RefreshArgs),
    /// Achievement catalog, unlocks, and progress
    Achievements,
    /// Print the current reminder plan
    Remind,
    /// Inspect and drain the sync outbox
    Sync {
        #[command(subcommand)]
        action: commands::sync::SyncAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Capture(args) => commands::capture::run(args),
        Commands::List { action } => commands::list::run(action),
        Commands::Urge { action } => commands::urge::run(action),
        Commands::Decide(args) => commands::decide::run(args),
        Commands::Postpone(args) => commands::postpone::run(args),
        Commands::Recover => commands::recover::run(),
        Commands::Refresh(args) => commands::refresh::run(args),
        Commands::Achievements => commands::achievements::run(),
        Commands::Remind => commands::remind::run(),
        Commands::Sync { action } => commands::sync::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
