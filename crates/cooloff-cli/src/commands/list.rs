use clap::Subcommand;

use crate::common::{self, CliResult};

#[derive(Subcommand)]
pub enum ListAction {
    /// Intents ready for a decision
    Due,
    /// Intents still inside their waiting window
    Waiting,
    /// Resolved and canceled intents
    Finished,
    /// Everything
    All,
}

pub fn run(action: ListAction) -> CliResult {
    let repo = common::open_repo()?;
    let now = repo.now();
    let intents = match action {
        ListAction::Due => repo.due_now(now)?,
        ListAction::Waiting => repo.in_delay_window(now)?,
        ListAction::Finished => repo.finished()?,
        ListAction::All => repo.store().list_intents()?,
    };
    println!("{}", serde_json::to_string_pretty(&intents)?);
    Ok(())
}
