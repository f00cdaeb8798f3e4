use std::collections::HashMap;

use chrono::{DateTime, Utc};
use cooloff_core::{Tier, CATALOG};
use serde::Serialize;

use crate::common::{self, CliResult};

#[derive(Serialize)]
struct AchievementView {
    key: &'static str,
    title: &'static str,
    tier: Tier,
    unlocked: bool,
    unlocked_at: Option<DateTime<Utc>>,
    current: f64,
    target: f64,
}

pub fn run() -> CliResult {
    let repo = common::open_repo()?;
    let progress = repo.progress()?;
    let unlocks: HashMap<String, DateTime<Utc>> = repo
        .unlocks()?
        .into_iter()
        .map(|u| (u.key, u.unlocked_at))
        .collect();

    let views: Vec<AchievementView> = CATALOG
        .iter()
        .map(|def| {
            let (current, target) = def.rule.progress(&progress);
            AchievementView {
                key: def.key,
                title: def.title,
                tier: def.tier,
                unlocked: unlocks.contains_key(def.key),
                unlocked_at: unlocks.get(def.key).copied(),
                current,
                target,
            }
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&views)?);
    Ok(())
}
