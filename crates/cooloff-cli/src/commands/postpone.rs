use clap::Args;
use uuid::Uuid;

use crate::common::{self, CliResult, ProtocolArg};

#[derive(Args)]
pub struct PostponeArgs {
    pub intent_id: Uuid,
    #[arg(long, value_enum, default_value = "one-day")]
    pub protocol: ProtocolArg,
    /// Checkpoint date for the custom protocol (RFC 3339)
    #[arg(long)]
    pub date: Option<String>,
    #[arg(long)]
    pub note: Option<String>,
}

pub fn run(args: PostponeArgs) -> CliResult {
    let repo = common::open_repo()?;
    let protocol = common::protocol_from_args(args.protocol, args.date.as_deref())?;
    let intent = repo.postpone_decision(args.intent_id, protocol, args.note)?;
    println!("{}", serde_json::to_string_pretty(&intent)?);
    common::persist_outbox(&repo)?;
    Ok(())
}
