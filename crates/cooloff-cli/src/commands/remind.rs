use cooloff_core::{plan, Config};

use crate::common::{self, CliResult};

pub fn run() -> CliResult {
    let repo = common::open_repo()?;
    let config = Config::load()?;
    // No OS delivery backend on the CLI; treat the channel as authorized.
    let prefs = config.reminders.to_prefs(true);
    let intents = repo.store().list_intents()?;
    let instants = plan(&intents, &prefs, repo.now());
    println!("{}", serde_json::to_string_pretty(&instants)?);
    Ok(())
}
