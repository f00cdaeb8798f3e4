use clap::Subcommand;

use crate::common::{self, CliResult};

#[derive(Subcommand)]
pub enum SyncAction {
    /// Number of pending outbox operations
    Status,
    /// Pop up to --limit operations off the outbox and print them
    Drain {
        #[arg(long, default_value = "50")]
        limit: usize,
    },
}

pub fn run(action: SyncAction) -> CliResult {
    let repo = common::open_repo()?;
    match action {
        SyncAction::Status => {
            println!("{} pending operation(s)", repo.outbox().len());
        }
        SyncAction::Drain { limit } => {
            let drained = repo.outbox().drain_up_to(limit);
            println!("{}", serde_json::to_string_pretty(&drained)?);
            common::persist_outbox(&repo)?;
        }
    }
    Ok(())
}
