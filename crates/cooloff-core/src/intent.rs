//! Intent entities and their closed enumerations.
//!
//! An intent is a captured decision-to-be-deferred. It owns its urge events
//! and reward entries (deleted with it); completion records and achievement
//! unlocks reference it by plain id and outlive deletion for history.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::protocol::DelayProtocol;

/// Lifecycle status of an intent.
///
/// `Resolved` and `Canceled` are terminal; the only escape is the explicit
/// strict-failure recovery path on the repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentStatus {
    ActiveWait,
    CheckpointDue,
    Resolved,
    Canceled,
}

impl IntentStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, IntentStatus::Resolved | IntentStatus::Canceled)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            IntentStatus::ActiveWait => "active_wait",
            IntentStatus::CheckpointDue => "checkpoint_due",
            IntentStatus::Resolved => "resolved",
            IntentStatus::Canceled => "canceled",
        }
    }

    /// Parse a persisted status string.
    ///
    /// Accepts the legacy aliases (`active`/`paused`, `completed`/`failed`)
    /// so the store migration can read old rows; canonical values are the
    /// only thing written back.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active_wait" | "active" | "paused" => Some(IntentStatus::ActiveWait),
            "checkpoint_due" => Some(IntentStatus::CheckpointDue),
            "resolved" | "completed" | "failed" => Some(IntentStatus::Resolved),
            "canceled" => Some(IntentStatus::Canceled),
            _ => None,
        }
    }
}

impl fmt::Display for IntentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Disposition chosen at (or after) the checkpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Decided against acting on the impulse.
    Resisted,
    /// Went ahead, but deliberately.
    IntentionalYes,
    /// Acted on the impulse before deciding.
    GaveIn,
    /// The wait was extended instead of decided.
    Postponed,
    /// The intent was dropped without a decision.
    Canceled,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Resisted => "resisted",
            Outcome::IntentionalYes => "intentional_yes",
            Outcome::GaveIn => "gave_in",
            Outcome::Postponed => "postponed",
            Outcome::Canceled => "canceled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "resisted" => Some(Outcome::Resisted),
            "intentional_yes" => Some(Outcome::IntentionalYes),
            "gave_in" => Some(Outcome::GaveIn),
            "postponed" => Some(Outcome::Postponed),
            "canceled" => Some(Outcome::Canceled),
            _ => None,
        }
    }

    /// Resisted and intentional-yes both count as deliberate decisions.
    pub fn is_intentional(&self) -> bool {
        matches!(self, Outcome::Resisted | Outcome::IntentionalYes)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What area of life the impulse belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentCategory {
    Purchase,
    Food,
    Media,
    Message,
    Habit,
    Other,
}

impl IntentCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntentCategory::Purchase => "purchase",
            IntentCategory::Food => "food",
            IntentCategory::Media => "media",
            IntentCategory::Message => "message",
            IntentCategory::Habit => "habit",
            IntentCategory::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "purchase" => Some(IntentCategory::Purchase),
            "food" => Some(IntentCategory::Food),
            "media" => Some(IntentCategory::Media),
            "message" => Some(IntentCategory::Message),
            "habit" => Some(IntentCategory::Habit),
            "other" => Some(IntentCategory::Other),
            _ => None,
        }
    }
}

/// Whether the wait is about resisting an urge or adopting one deliberately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentKind {
    Resist,
    Adopt,
}

impl IntentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntentKind::Resist => "resist",
            IntentKind::Adopt => "adopt",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "resist" => Some(IntentKind::Resist),
            "adopt" => Some(IntentKind::Adopt),
            _ => None,
        }
    }
}

/// A captured decision-to-be-deferred.
///
/// Invariant held across every mutation: `checkpoint_time > start_time`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Intent {
    pub id: Uuid,
    pub title: String,
    pub rationale: Option<String>,
    pub category: IntentCategory,
    pub kind: IntentKind,
    pub start_time: DateTime<Utc>,
    /// Earliest instant at which a decision may be finalized.
    pub checkpoint_time: DateTime<Utc>,
    pub status: IntentStatus,
    pub outcome: Option<Outcome>,
    /// Waiting protocol in effect; recomputed whenever the intent is postponed.
    pub protocol: DelayProtocol,
    /// Nominal waiting duration in whole hours, for progress and analytics.
    pub delay_hours: i64,
    pub estimated_cost: Option<f64>,
    /// Suggested substitute action when an urge hits.
    pub fallback_action: Option<String>,
    pub postpone_count: u32,
    pub resolved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Intent {
    /// 0.0 .. 100.0 progress through the waiting window at `now`.
    pub fn progress_pct(&self, now: DateTime<Utc>) -> f64 {
        let total = (self.checkpoint_time - self.start_time).num_seconds();
        if total <= 0 {
            return 100.0;
        }
        let elapsed = (now - self.start_time).num_seconds();
        ((elapsed as f64 / total as f64) * 100.0).clamp(0.0, 100.0)
    }
}

/// A logged moment of wanting to act before the checkpoint. Owned by its intent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrgeEvent {
    pub id: Uuid,
    pub intent_id: Uuid,
    pub at: DateTime<Utc>,
    /// 1 (mild) .. 5 (overwhelming).
    pub intensity: u8,
    pub note: Option<String>,
    pub used_fallback: bool,
}

impl UrgeEvent {
    pub fn clamp_intensity(raw: i64) -> u8 {
        raw.clamp(1, 5) as u8
    }
}

/// Points awarded for a decision. Owned by its intent, append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewardEntry {
    pub id: Uuid,
    pub intent_id: Uuid,
    pub points: i64,
    pub reason: String,
    pub at: DateTime<Utc>,
}

/// Immutable snapshot written once per terminal-or-postpone transition.
///
/// Holds the intent id as a plain foreign key so the record survives
/// intent deletion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRecord {
    pub id: Uuid,
    pub intent_id: Uuid,
    pub outcome: Outcome,
    /// Protocol variant label at completion time.
    pub protocol_label: String,
    pub delay_hours: i64,
    /// Whole days between start and completion, floor, never below 1.
    pub duration_days: i64,
    /// Whether the decision came at or after the checkpoint.
    pub was_after_checkpoint: bool,
    pub reflection: Option<String>,
    pub urge_score: Option<u8>,
    pub regret_score: Option<u8>,
    pub cost: Option<f64>,
    pub completed_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// A permanently unlocked achievement. At most one row per catalog key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AchievementUnlock {
    pub key: String,
    pub unlocked_at: DateTime<Utc>,
    /// The intent whose mutation triggered the unlock, if any. Plain lookup
    /// id; survives intent deletion.
    pub intent_id: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn legacy_status_aliases_parse() {
        assert_eq!(IntentStatus::parse("active"), Some(IntentStatus::ActiveWait));
        assert_eq!(IntentStatus::parse("paused"), Some(IntentStatus::ActiveWait));
        assert_eq!(IntentStatus::parse("completed"), Some(IntentStatus::Resolved));
        assert_eq!(IntentStatus::parse("failed"), Some(IntentStatus::Resolved));
        assert_eq!(IntentStatus::parse("checkpoint_due"), Some(IntentStatus::CheckpointDue));
        assert_eq!(IntentStatus::parse("bogus"), None);
    }

    #[test]
    fn canonical_statuses_round_trip() {
        for status in [
            IntentStatus::ActiveWait,
            IntentStatus::CheckpointDue,
            IntentStatus::Resolved,
            IntentStatus::Canceled,
        ] {
            assert_eq!(IntentStatus::parse(status.as_str()), Some(status));
        }
    }

    #[test]
    fn intensity_is_clamped() {
        assert_eq!(UrgeEvent::clamp_intensity(0), 1);
        assert_eq!(UrgeEvent::clamp_intensity(3), 3);
        assert_eq!(UrgeEvent::clamp_intensity(99), 5);
    }

    #[test]
    fn progress_pct_clamps_to_bounds() {
        let start = Utc.with_ymd_and_hms(2025, 5, 1, 12, 0, 0).unwrap();
        let intent = Intent {
            id: Uuid::new_v4(),
            title: "Skip the flash sale".to_string(),
            rationale: None,
            category: IntentCategory::Purchase,
            kind: IntentKind::Resist,
            start_time: start,
            checkpoint_time: start + chrono::Duration::hours(24),
            status: IntentStatus::ActiveWait,
            outcome: None,
            protocol: DelayProtocol::OneDay,
            delay_hours: 24,
            estimated_cost: Some(80.0),
            fallback_action: None,
            postpone_count: 0,
            resolved_at: None,
            created_at: start,
            updated_at: start,
        };
        assert_eq!(intent.progress_pct(start - chrono::Duration::hours(1)), 0.0);
        assert!((intent.progress_pct(start + chrono::Duration::hours(12)) - 50.0).abs() < 1e-9);
        assert_eq!(intent.progress_pct(start + chrono::Duration::hours(48)), 100.0);
    }
}
