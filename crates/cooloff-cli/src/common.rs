//! Shared plumbing for CLI commands.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use cooloff_core::{
    data_dir, AnalyticsBuffer, Config, DelayProtocol, IntentCategory, IntentKind,
    IntentRepository, Outcome, Store, SyncOutbox, SystemClock,
};

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Open the repository over the default store, restoring the persisted
/// outbox.
pub fn open_repo() -> Result<IntentRepository, Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let store = Store::open_default()?;
    let outbox = SyncOutbox::with_capacity(config.outbox.capacity);
    outbox.load(&outbox_path()?)?;
    let analytics = AnalyticsBuffer::with_capacity(config.outbox.capacity);
    Ok(IntentRepository::new(
        store,
        Arc::new(SystemClock),
        outbox,
        analytics,
    ))
}

pub fn outbox_path() -> Result<PathBuf, std::io::Error> {
    Ok(data_dir()?.join("outbox.json"))
}

/// Write the outbox back to disk after a mutation.
pub fn persist_outbox(repo: &IntentRepository) -> CliResult {
    repo.outbox().persist(&outbox_path()?)?;
    Ok(())
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CategoryArg {
    Purchase,
    Food,
    Media,
    Message,
    Habit,
    Other,
}

impl From<CategoryArg> for IntentCategory {
    fn from(arg: CategoryArg) -> Self {
        match arg {
            CategoryArg::Purchase => IntentCategory::Purchase,
            CategoryArg::Food => IntentCategory::Food,
            CategoryArg::Media => IntentCategory::Media,
            CategoryArg::Message => IntentCategory::Message,
            CategoryArg::Habit => IntentCategory::Habit,
            CategoryArg::Other => IntentCategory::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum KindArg {
    Resist,
    Adopt,
}

impl From<KindArg> for IntentKind {
    fn from(arg: KindArg) -> Self {
        match arg {
            KindArg::Resist => IntentKind::Resist,
            KindArg::Adopt => IntentKind::Adopt,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutcomeArg {
    Resisted,
    IntentionalYes,
    GaveIn,
    Canceled,
}

impl From<OutcomeArg> for Outcome {
    fn from(arg: OutcomeArg) -> Self {
        match arg {
            OutcomeArg::Resisted => Outcome::Resisted,
            OutcomeArg::IntentionalYes => Outcome::IntentionalYes,
            OutcomeArg::GaveIn => Outcome::GaveIn,
            OutcomeArg::Canceled => Outcome::Canceled,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ProtocolArg {
    TenMinutes,
    OneDay,
    ThreeDays,
    Payday,
    Custom,
}

/// Build a protocol from the CLI flags. `--date` only applies to `custom`.
pub fn protocol_from_args(
    arg: ProtocolArg,
    date: Option<&str>,
) -> Result<DelayProtocol, Box<dyn std::error::Error>> {
    Ok(match arg {
        ProtocolArg::TenMinutes => DelayProtocol::TenMinutes,
        ProtocolArg::OneDay => DelayProtocol::OneDay,
        ProtocolArg::ThreeDays => DelayProtocol::ThreeDays,
        ProtocolArg::Payday => DelayProtocol::UntilPayday,
        ProtocolArg::Custom => {
            let date: Option<DateTime<Utc>> = date
                .map(|raw| {
                    DateTime::parse_from_rfc3339(raw).map(|d| d.with_timezone(&Utc))
                })
                .transpose()?;
            DelayProtocol::Custom { date }
        }
    })
}
