use clap::Args;
use cooloff_core::NewIntent;

use crate::common::{self, CategoryArg, CliResult, KindArg, ProtocolArg};

#[derive(Args)]
pub struct CaptureArgs {
    /// What you're holding off on
    pub title: String,
    /// Why it caught you
    #[arg(long)]
    pub rationale: Option<String>,
    #[arg(long, value_enum, default_value = "other")]
    pub category: CategoryArg,
    #[arg(long, value_enum, default_value = "resist")]
    pub kind: KindArg,
    #[arg(long, value_enum, default_value = "one-day")]
    pub protocol: ProtocolArg,
    /// Checkpoint date for the custom protocol (RFC 3339)
    #[arg(long)]
    pub date: Option<String>,
    /// Estimated cost if you went through with it
    #[arg(long)]
    pub cost: Option<f64>,
    /// Substitute action for when an urge hits
    #[arg(long)]
    pub fallback: Option<String>,
}

pub fn run(args: CaptureArgs) -> CliResult {
    let repo = common::open_repo()?;
    let protocol = common::protocol_from_args(args.protocol, args.date.as_deref())?;
    let intent = repo.capture(NewIntent {
        title: args.title,
        rationale: args.rationale,
        category: args.category.into(),
        kind: args.kind.into(),
        protocol,
        estimated_cost: args.cost,
        fallback_action: args.fallback,
    })?;
    println!("{}", serde_json::to_string_pretty(&intent)?);
    common::persist_outbox(&repo)?;
    Ok(())
}
