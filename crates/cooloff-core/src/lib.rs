//! # Cooloff Core Library
//!
//! This library provides the core business logic for Cooloff, a tool for
//! deferring impulsive decisions. An intent is captured with a waiting
//! protocol, sits out its delay window, and is decided deliberately at a
//! checkpoint. All operations are available through the library; the CLI
//! binary is a thin layer over the same core.
//!
//! ## Architecture
//!
//! - **Protocol**: Pure date arithmetic mapping a waiting rule to a
//!   concrete checkpoint instant
//! - **Repository**: The sole mutation surface -- validates, persists, and
//!   fires best-effort side effects
//! - **Storage**: SQLite-based records and TOML-based configuration
//! - **Achievements**: Pure rule evaluation over recomputed progress
//! - **Notify**: Idempotent reminder-instant planning
//! - **Outbox**: Bounded local logs for an external sync consumer
//!
//! ## Key Components
//!
//! - [`IntentRepository`]: Lifecycle operations and typed queries
//! - [`DelayProtocol`]: Waiting-rule variants and their checkpoint math
//! - [`Store`]: Durable record storage
//! - [`Sweeper`]: Background checkpoint sweep with cooperative cancellation

pub mod achievements;
pub mod clock;
pub mod error;
pub mod intent;
pub mod notify;
pub mod outbox;
pub mod protocol;
pub mod repo;
pub mod storage;
pub mod sweeper;

pub use achievements::{AchievementDef, Progress, Rule, Tier, CATALOG};
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{CoreError, Result, StoreError, ValidationError};
pub use intent::{
    AchievementUnlock, CompletionRecord, Intent, IntentCategory, IntentKind, IntentStatus,
    Outcome, RewardEntry, UrgeEvent,
};
pub use notify::{
    plan, sync_plan, MemoryDelivery, NotificationDelivery, PlannedInstant, ReminderPrefs,
    MAX_PLANNED_INSTANTS,
};
pub use outbox::{AnalyticsBuffer, AnalyticsEvent, SyncOperation, SyncOperationKind, SyncOutbox};
pub use protocol::DelayProtocol;
pub use repo::{Decision, IntentPatch, IntentRepository, NewIntent};
pub use storage::{data_dir, Config, Store};
pub use sweeper::Sweeper;
