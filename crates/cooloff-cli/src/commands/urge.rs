use clap::Subcommand;
use uuid::Uuid;

use crate::common::{self, CliResult};

#[derive(Subcommand)]
pub enum UrgeAction {
    /// Log an urge against a waiting intent
    Log {
        intent_id: Uuid,
        /// 1 (mild) to 5 (overwhelming)
        #[arg(long, default_value = "3")]
        intensity: i64,
        #[arg(long)]
        note: Option<String>,
        /// The fallback action was used instead
        #[arg(long)]
        used_fallback: bool,
    },
    /// Delete a logged urge
    Delete { intent_id: Uuid, urge_id: Uuid },
    /// Most recent urges across all intents
    Recent {
        #[arg(long, default_value = "10")]
        limit: usize,
    },
}

pub fn run(action: UrgeAction) -> CliResult {
    let repo = common::open_repo()?;
    match action {
        UrgeAction::Log {
            intent_id,
            intensity,
            note,
            used_fallback,
        } => {
            let urge = repo.log_urge(intent_id, intensity, note, used_fallback)?;
            println!("{}", serde_json::to_string_pretty(&urge)?);
            common::persist_outbox(&repo)?;
        }
        UrgeAction::Delete { intent_id, urge_id } => {
            repo.delete_urge(intent_id, urge_id)?;
            println!("deleted");
            common::persist_outbox(&repo)?;
        }
        UrgeAction::Recent { limit } => {
            let urges = repo.recent_urges(limit)?;
            println!("{}", serde_json::to_string_pretty(&urges)?);
        }
    }
    Ok(())
}
