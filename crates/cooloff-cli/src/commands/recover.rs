use crate::common::{self, CliResult};

pub fn run() -> CliResult {
    let repo = common::open_repo()?;
    match repo.recover_latest_strict_failure()? {
        Some(intent) => {
            println!("{}", serde_json::to_string_pretty(&intent)?);
            common::persist_outbox(&repo)?;
        }
        None => println!("nothing to recover"),
    }
    Ok(())
}
