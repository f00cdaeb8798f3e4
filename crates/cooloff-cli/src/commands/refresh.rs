use std::sync::{Arc, Mutex};

use clap::Args;
use cooloff_core::sweeper::{cancellation, Sweeper};
use cooloff_core::Config;

use crate::common::{self, CliResult};

#[derive(Args)]
pub struct RefreshArgs {
    /// Keep sweeping on the configured interval until interrupted
    #[arg(long)]
    pub watch: bool,
}

pub fn run(args: RefreshArgs) -> CliResult {
    let repo = common::open_repo()?;

    if !args.watch {
        let transitioned = repo.refresh_lifecycle()?;
        println!("{transitioned} intent(s) reached their checkpoint");
        common::persist_outbox(&repo)?;
        return Ok(());
    }

    let config = Config::load()?;
    let interval = std::time::Duration::from_secs(config.sweep.interval_secs.max(1));
    let repo = Arc::new(Mutex::new(repo));

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let (tx, rx) = cancellation();
        let handle = tokio::spawn(Sweeper::new(repo.clone(), interval).run(rx));
        tokio::signal::ctrl_c().await?;
        tx.send(true)?;
        handle.await?;
        Ok::<(), Box<dyn std::error::Error>>(())
    })?;

    let repo = repo.lock().unwrap_or_else(|e| e.into_inner());
    common::persist_outbox(&repo)?;
    Ok(())
}
