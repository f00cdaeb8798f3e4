use clap::Subcommand;
use cooloff_core::Config;

use crate::common::CliResult;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration as TOML
    Show,
    /// Print the configuration file path
    Path,
    /// Set a configuration value
    Set { key: String, value: String },
}

pub fn run(action: ConfigAction) -> CliResult {
    match action {
        ConfigAction::Show => {
            let config = Config::load()?;
            print!("{}", toml::to_string_pretty(&config)?);
        }
        ConfigAction::Path => {
            println!("{}", Config::path()?.display());
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            apply(&mut config, &key, &value)?;
            config.save()?;
            println!("{key} = {value}");
        }
    }
    Ok(())
}

fn apply(config: &mut Config, key: &str, value: &str) -> CliResult {
    match key {
        "reminders.enabled" => config.reminders.enabled = value.parse()?,
        "reminders.daily_reminder" => config.reminders.daily_reminder = value.parse()?,
        "reminders.milestones" => config.reminders.milestones = value.parse()?,
        "reminders.checkpoint_warnings" => config.reminders.checkpoint_warnings = value.parse()?,
        "reminders.preferred_hour" => config.reminders.preferred_hour = value.parse()?,
        "reminders.preferred_minute" => config.reminders.preferred_minute = value.parse()?,
        "outbox.capacity" => config.outbox.capacity = value.parse()?,
        "sweep.interval_secs" => config.sweep.interval_secs = value.parse()?,
        _ => return Err(format!("unknown configuration key: {key}").into()),
    }
    Ok(())
}
