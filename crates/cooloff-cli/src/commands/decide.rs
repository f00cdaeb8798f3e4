use clap::Args;
use cooloff_core::Decision;
use uuid::Uuid;

use crate::common::{self, CliResult, OutcomeArg};

#[derive(Args)]
pub struct DecideArgs {
    pub intent_id: Uuid,
    #[arg(value_enum)]
    pub outcome: OutcomeArg,
    /// What the wait taught you
    #[arg(long)]
    pub reflection: Option<String>,
    /// How strong the urge felt at decision time, 1-5
    #[arg(long)]
    pub urge_score: Option<u8>,
    /// How much you expect to regret this, 1-5
    #[arg(long)]
    pub regret_score: Option<u8>,
}

pub fn run(args: DecideArgs) -> CliResult {
    let repo = common::open_repo()?;
    let intent = repo.complete_decision(
        args.intent_id,
        Decision {
            outcome: args.outcome.into(),
            reflection: args.reflection,
            urge_score: args.urge_score,
            regret_score: args.regret_score,
        },
    )?;
    println!("{}", serde_json::to_string_pretty(&intent)?);
    common::persist_outbox(&repo)?;
    Ok(())
}
