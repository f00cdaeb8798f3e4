//! Reminder instant planning.
//!
//! Derives a bounded set of future reminder instants from the live intent
//! set and the user's preferences. Every instant carries a deterministic
//! identifier, so re-running the planner replaces prior output instead of
//! duplicating it; planning is safe to invoke on every tick. Delivery and
//! authorization live behind [`NotificationDelivery`].

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::intent::Intent;

/// Hard cap on instants produced by one planning run.
pub const MAX_PLANNED_INSTANTS: usize = 64;

/// Elapsed-time milestones within the waiting window, in percent.
const MILESTONE_PERCENTS: [i32; 3] = [25, 50, 75];

/// Warning offsets before the checkpoint, in days.
const WARNING_DAY_OFFSETS: [i64; 2] = [3, 1];

/// Identifier of the repeating daily reminder.
const DAILY_IDENTIFIER: &str = "daily-reminder";

/// Reminder preferences plus the delivery system's authorization state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderPrefs {
    pub enabled: bool,
    pub authorized: bool,
    pub daily_reminder: bool,
    pub milestones: bool,
    pub checkpoint_warnings: bool,
    pub preferred_hour: u32,
    pub preferred_minute: u32,
}

impl Default for ReminderPrefs {
    fn default() -> Self {
        Self {
            enabled: true,
            authorized: true,
            daily_reminder: true,
            milestones: true,
            checkpoint_warnings: true,
            preferred_hour: 19,
            preferred_minute: 0,
        }
    }
}

/// One planned reminder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedInstant {
    /// Deterministic identifier; scheduling the same identifier again
    /// replaces the earlier instant.
    pub identifier: String,
    pub fire_at: DateTime<Utc>,
    pub repeats_daily: bool,
    pub title: String,
    pub body: String,
}

/// Produce the full reminder plan for the given intents at `now`.
///
/// Returns the empty set when reminders are disabled or unauthorized;
/// callers then withdraw everything via [`sync_plan`].
pub fn plan(intents: &[Intent], prefs: &ReminderPrefs, now: DateTime<Utc>) -> Vec<PlannedInstant> {
    if !prefs.enabled || !prefs.authorized {
        return Vec::new();
    }

    let mut instants = Vec::new();
    if prefs.daily_reminder {
        instants.push(PlannedInstant {
            identifier: DAILY_IDENTIFIER.to_string(),
            fire_at: next_preferred_time(now, prefs),
            repeats_daily: true,
            title: "Check in".to_string(),
            body: "Any urges worth logging today?".to_string(),
        });
    }

    for intent in intents.iter().filter(|i| !i.status.is_terminal()) {
        if instants.len() >= MAX_PLANNED_INSTANTS {
            break;
        }
        if prefs.milestones {
            let span = intent.checkpoint_time - intent.start_time;
            for pct in MILESTONE_PERCENTS {
                let fire_at = snap_to_preferred(intent.start_time + span * pct / 100, prefs);
                if fire_at > now {
                    instants.push(PlannedInstant {
                        identifier: format!("intent-{}-milestone-{pct}", intent.id),
                        fire_at,
                        repeats_daily: false,
                        title: intent.title.clone(),
                        body: format!("{pct}% of the wait is behind you."),
                    });
                }
            }
        }
        if prefs.checkpoint_warnings {
            for days in WARNING_DAY_OFFSETS {
                let fire_at =
                    snap_to_preferred(intent.checkpoint_time - Duration::days(days), prefs);
                if fire_at > now {
                    instants.push(PlannedInstant {
                        identifier: format!("intent-{}-warn-{days}d", intent.id),
                        fire_at,
                        repeats_daily: false,
                        title: intent.title.clone(),
                        body: format!("Checkpoint in {days} day(s). Start weighing it."),
                    });
                }
            }
        }
    }

    instants.truncate(MAX_PLANNED_INSTANTS);
    instants
}

/// Move an instant to the preferred time-of-day on its calendar date.
fn snap_to_preferred(at: DateTime<Utc>, prefs: &ReminderPrefs) -> DateTime<Utc> {
    match at
        .date_naive()
        .and_hms_opt(prefs.preferred_hour, prefs.preferred_minute, 0)
    {
        Some(snapped) => snapped.and_utc(),
        None => at,
    }
}

/// First occurrence of the preferred time-of-day strictly after `now`.
fn next_preferred_time(now: DateTime<Utc>, prefs: &ReminderPrefs) -> DateTime<Utc> {
    let today = snap_to_preferred(now, prefs);
    if today > now {
        today
    } else {
        today + Duration::days(1)
    }
}

/// External delivery system: schedules by identifier, withdraws by
/// identifier, reports what is pending.
pub trait NotificationDelivery {
    fn schedule(&mut self, instant: &PlannedInstant);
    fn withdraw(&mut self, identifier: &str);
    fn pending(&self) -> Vec<String>;
}

/// Whether an identifier was produced by this planner.
fn is_managed(identifier: &str) -> bool {
    identifier == DAILY_IDENTIFIER || identifier.starts_with("intent-")
}

/// Apply a plan: withdraw managed identifiers that are no longer planned,
/// then (re)schedule the fresh set. Identifiers the planner never produced
/// are left alone.
pub fn sync_plan(delivery: &mut dyn NotificationDelivery, plan: &[PlannedInstant]) {
    let fresh: HashSet<&str> = plan.iter().map(|p| p.identifier.as_str()).collect();
    for identifier in delivery.pending() {
        if is_managed(&identifier) && !fresh.contains(identifier.as_str()) {
            delivery.withdraw(&identifier);
        }
    }
    for instant in plan {
        delivery.schedule(instant);
    }
}

/// In-memory delivery, for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryDelivery {
    scheduled: HashMap<String, PlannedInstant>,
}

impl MemoryDelivery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, identifier: &str) -> Option<&PlannedInstant> {
        self.scheduled.get(identifier)
    }

    pub fn len(&self) -> usize {
        self.scheduled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scheduled.is_empty()
    }
}

impl NotificationDelivery for MemoryDelivery {
    fn schedule(&mut self, instant: &PlannedInstant) {
        self.scheduled
            .insert(instant.identifier.clone(), instant.clone());
    }

    fn withdraw(&mut self, identifier: &str) {
        self.scheduled.remove(identifier);
    }

    fn pending(&self) -> Vec<String> {
        self.scheduled.keys().cloned().collect()
    }
}
