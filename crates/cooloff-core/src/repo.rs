//! Intent lifecycle repository.
//!
//! Sole mutation surface for intents. Every operation runs as
//! validate -> mutate -> persist -> best-effort side effects. The primary
//! write is a single store transaction; side effects (achievement
//! re-evaluation, outbox and analytics enqueue) run strictly after the
//! commit and their failures are logged, never propagated.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::warn;
use uuid::Uuid;

use crate::achievements::{Progress, CATALOG};
use crate::clock::Clock;
use crate::error::{Result, StoreError, ValidationError};
use crate::intent::{
    AchievementUnlock, CompletionRecord, Intent, IntentCategory, IntentKind, IntentStatus,
    Outcome, RewardEntry, UrgeEvent,
};
use crate::outbox::{AnalyticsBuffer, AnalyticsEvent, SyncOperation, SyncOperationKind, SyncOutbox};
use crate::protocol::DelayProtocol;
use crate::storage::Store;

const RESIST_POINTS: i64 = 10;
const INTENTIONAL_POINTS: i64 = 5;
const SLIP_POINTS: i64 = 1;
const ADHERENCE_BONUS: i64 = 5;

/// Minimum extension applied when a strict failure is recovered.
const RECOVERY_EXTENSION_HOURS: i64 = 6;

/// Fields for capturing a new intent.
#[derive(Debug, Clone)]
pub struct NewIntent {
    pub title: String,
    pub rationale: Option<String>,
    pub category: IntentCategory,
    pub kind: IntentKind,
    pub protocol: DelayProtocol,
    pub estimated_cost: Option<f64>,
    pub fallback_action: Option<String>,
}

/// Partial update; `None` leaves the field unchanged.
#[derive(Debug, Clone, Default)]
pub struct IntentPatch {
    pub title: Option<String>,
    pub rationale: Option<String>,
    pub category: Option<IntentCategory>,
    pub kind: Option<IntentKind>,
    pub estimated_cost: Option<f64>,
    pub fallback_action: Option<String>,
    pub checkpoint_time: Option<DateTime<Utc>>,
}

/// The decision made at (or after) the checkpoint.
#[derive(Debug, Clone)]
pub struct Decision {
    pub outcome: Outcome,
    pub reflection: Option<String>,
    pub urge_score: Option<u8>,
    pub regret_score: Option<u8>,
}

impl Decision {
    pub fn new(outcome: Outcome) -> Self {
        Self {
            outcome,
            reflection: None,
            urge_score: None,
            regret_score: None,
        }
    }
}

/// Repository over the store, the injected clock, and the side-effect
/// buffers.
pub struct IntentRepository {
    store: Store,
    clock: Arc<dyn Clock>,
    outbox: SyncOutbox,
    analytics: AnalyticsBuffer,
}

impl IntentRepository {
    pub fn new(
        store: Store,
        clock: Arc<dyn Clock>,
        outbox: SyncOutbox,
        analytics: AnalyticsBuffer,
    ) -> Self {
        Self {
            store,
            clock,
            outbox,
            analytics,
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn outbox(&self) -> &SyncOutbox {
        &self.outbox
    }

    pub fn analytics(&self) -> &AnalyticsBuffer {
        &self.analytics
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    // ── Mutations ────────────────────────────────────────────────────

    /// Capture a new intent and start its wait.
    pub fn capture(&self, new: NewIntent) -> Result<Intent> {
        let title = validated_title(&new.title)?;
        validate_cost(new.estimated_cost)?;

        let now = self.clock.now();
        let checkpoint_time = new.protocol.checkpoint(now);
        let delay_hours = new.protocol.duration_hours(now);
        if checkpoint_time <= now {
            return Err(ValidationError::InvalidDateRange {
                start: now,
                checkpoint: checkpoint_time,
            }
            .into());
        }
        if delay_hours < 0 {
            return Err(ValidationError::InvalidState(format!(
                "delay duration must be non-negative, got {delay_hours}h"
            ))
            .into());
        }

        let intent = Intent {
            id: Uuid::new_v4(),
            title,
            rationale: new.rationale,
            category: new.category,
            kind: new.kind,
            start_time: now,
            checkpoint_time,
            status: IntentStatus::ActiveWait,
            outcome: None,
            protocol: new.protocol,
            delay_hours,
            estimated_cost: new.estimated_cost,
            fallback_action: new.fallback_action,
            postpone_count: 0,
            resolved_at: None,
            created_at: now,
            updated_at: now,
        };
        self.store.insert_intent(&intent)?;
        self.side_effects(
            SyncOperationKind::IntentCaptured,
            Some(intent.id),
            payload(&[("title", intent.title.clone())]),
        );
        Ok(intent)
    }

    /// Edit descriptive fields of a non-terminal intent.
    pub fn update(&self, id: Uuid, patch: IntentPatch) -> Result<Intent> {
        let mut intent = self.get_required(id)?;
        if intent.status.is_terminal() {
            return Err(ValidationError::InvalidStatusTransition {
                from: intent.status,
                trigger: "update",
            }
            .into());
        }

        if let Some(title) = patch.title {
            intent.title = validated_title(&title)?;
        }
        if let Some(rationale) = patch.rationale {
            intent.rationale = Some(rationale);
        }
        if let Some(category) = patch.category {
            intent.category = category;
        }
        if let Some(kind) = patch.kind {
            intent.kind = kind;
        }
        if let Some(cost) = patch.estimated_cost {
            validate_cost(Some(cost))?;
            intent.estimated_cost = Some(cost);
        }
        if let Some(fallback) = patch.fallback_action {
            intent.fallback_action = Some(fallback);
        }
        if let Some(checkpoint) = patch.checkpoint_time {
            if checkpoint <= intent.start_time {
                return Err(ValidationError::InvalidDateRange {
                    start: intent.start_time,
                    checkpoint,
                }
                .into());
            }
            intent.checkpoint_time = checkpoint;
        }
        intent.updated_at = self.clock.now();

        self.store.update_intent(&intent)?;
        self.side_effects(
            SyncOperationKind::IntentUpdated,
            Some(id),
            payload(&[("title", intent.title.clone())]),
        );
        Ok(intent)
    }

    /// Delete an intent. Owned urge events and reward entries go with it;
    /// completion records and unlocks stay. Not reversible.
    pub fn delete_intent(&self, id: Uuid) -> Result<()> {
        let intent = self.get_required(id)?;
        self.store.delete_intent(id)?;
        self.side_effects(
            SyncOperationKind::IntentDeleted,
            Some(id),
            payload(&[("title", intent.title)]),
        );
        Ok(())
    }

    /// Log an urge against a non-terminal intent. Intensity is clamped to
    /// 1..=5.
    pub fn log_urge(
        &self,
        intent_id: Uuid,
        intensity: i64,
        note: Option<String>,
        used_fallback: bool,
    ) -> Result<UrgeEvent> {
        let intent = self.get_required(intent_id)?;
        if intent.status.is_terminal() {
            return Err(ValidationError::InvalidStatusTransition {
                from: intent.status,
                trigger: "log an urge against",
            }
            .into());
        }

        let urge = UrgeEvent {
            id: Uuid::new_v4(),
            intent_id,
            at: self.clock.now(),
            intensity: UrgeEvent::clamp_intensity(intensity),
            note,
            used_fallback,
        };
        self.store.insert_urge(&urge)?;
        self.side_effects(
            SyncOperationKind::UrgeLogged,
            Some(intent_id),
            payload(&[("intensity", urge.intensity.to_string())]),
        );
        Ok(urge)
    }

    pub fn delete_urge(&self, intent_id: Uuid, urge_id: Uuid) -> Result<()> {
        let intent = self.get_required(intent_id)?;
        if intent.status.is_terminal() {
            return Err(ValidationError::InvalidStatusTransition {
                from: intent.status,
                trigger: "delete an urge from",
            }
            .into());
        }
        if !self.store.delete_urge(urge_id)? {
            return Err(StoreError::NotFound(urge_id.to_string()).into());
        }
        self.side_effects(
            SyncOperationKind::IntentUpdated,
            Some(intent_id),
            payload(&[("action", "urge_deleted".to_string())]),
        );
        Ok(())
    }

    /// Finalize a decision. Postponing goes through [`Self::postpone_decision`].
    pub fn complete_decision(&self, id: Uuid, decision: Decision) -> Result<Intent> {
        if decision.outcome == Outcome::Postponed {
            return Err(ValidationError::InvalidOutcome(
                "postponing is a separate operation".to_string(),
            )
            .into());
        }
        let mut intent = self.get_required(id)?;
        if intent.status.is_terminal() {
            return Err(ValidationError::InvalidStatusTransition {
                from: intent.status,
                trigger: "complete",
            }
            .into());
        }

        let now = self.clock.now();
        let was_after_checkpoint = now >= intent.checkpoint_time;
        let record = completion_record(
            &intent,
            decision.outcome,
            now,
            was_after_checkpoint,
            decision.reflection,
            decision.urge_score,
            decision.regret_score,
        );
        let rewards = reward_entries(&intent, decision.outcome, was_after_checkpoint, now);

        intent.status = if decision.outcome == Outcome::Canceled {
            IntentStatus::Canceled
        } else {
            IntentStatus::Resolved
        };
        intent.outcome = Some(decision.outcome);
        intent.resolved_at = Some(now);
        intent.updated_at = now;

        self.store.apply_completion(&intent, &record, &rewards)?;
        self.side_effects(
            SyncOperationKind::StatusChanged,
            Some(id),
            payload(&[
                ("status", intent.status.as_str().to_string()),
                ("outcome", decision.outcome.as_str().to_string()),
            ]),
        );
        Ok(intent)
    }

    /// Extend the wait under a fresh protocol computed from the current
    /// instant. Writes a postponed completion record for the closed window.
    pub fn postpone_decision(
        &self,
        id: Uuid,
        new_protocol: DelayProtocol,
        note: Option<String>,
    ) -> Result<Intent> {
        let mut intent = self.get_required(id)?;
        if intent.status.is_terminal() {
            return Err(ValidationError::CheckpointUnavailable(format!(
                "intent is already {}",
                intent.status
            ))
            .into());
        }

        let now = self.clock.now();
        let new_checkpoint = new_protocol.checkpoint(now);
        if new_checkpoint <= intent.start_time {
            return Err(ValidationError::InvalidDateRange {
                start: intent.start_time,
                checkpoint: new_checkpoint,
            }
            .into());
        }

        let was_after_checkpoint = now >= intent.checkpoint_time;
        // Snapshot the protocol that governed the window being closed.
        let record = completion_record(
            &intent,
            Outcome::Postponed,
            now,
            was_after_checkpoint,
            note,
            None,
            None,
        );

        intent.status = IntentStatus::ActiveWait;
        intent.checkpoint_time = new_checkpoint;
        intent.protocol = new_protocol;
        intent.delay_hours = new_protocol.duration_hours(now);
        intent.postpone_count += 1;
        intent.updated_at = now;

        self.store.apply_completion(&intent, &record, &[])?;
        self.side_effects(
            SyncOperationKind::StatusChanged,
            Some(id),
            payload(&[
                ("status", "active_wait".to_string()),
                ("reason", "postponed".to_string()),
            ]),
        );
        Ok(intent)
    }

    /// The one permitted terminal-state escape: reopen the most recently
    /// resolved gave-in intent, clearing its outcome and extending the
    /// checkpoint by at least six hours.
    pub fn recover_latest_strict_failure(&self) -> Result<Option<Intent>> {
        let mut candidates: Vec<Intent> = self
            .store
            .list_intents()?
            .into_iter()
            .filter(|i| i.status == IntentStatus::Resolved && i.outcome == Some(Outcome::GaveIn))
            .collect();
        candidates.sort_by_key(|i| i.resolved_at);
        let Some(mut intent) = candidates.pop() else {
            return Ok(None);
        };

        let now = self.clock.now();
        let base = intent.checkpoint_time.max(now);
        intent.checkpoint_time = base + Duration::hours(RECOVERY_EXTENSION_HOURS);
        intent.status = IntentStatus::ActiveWait;
        intent.outcome = None;
        intent.resolved_at = None;
        intent.updated_at = now;

        self.store.update_intent(&intent)?;
        self.side_effects(
            SyncOperationKind::StatusChanged,
            Some(intent.id),
            payload(&[
                ("status", "active_wait".to_string()),
                ("reason", "recovered".to_string()),
            ]),
        );
        Ok(Some(intent))
    }

    /// Sweep waiting intents whose checkpoint has passed into
    /// `CheckpointDue`. Idempotent; returns the number transitioned.
    pub fn refresh_lifecycle(&self) -> Result<usize> {
        let now = self.clock.now();
        let mut transitioned = 0;
        for mut intent in self.store.list_intents()? {
            if intent.status == IntentStatus::ActiveWait && intent.checkpoint_time <= now {
                intent.status = IntentStatus::CheckpointDue;
                intent.updated_at = now;
                self.store.update_intent(&intent)?;
                self.side_effects(
                    SyncOperationKind::StatusChanged,
                    Some(intent.id),
                    payload(&[("status", "checkpoint_due".to_string())]),
                );
                transitioned += 1;
            }
        }
        Ok(transitioned)
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// Intents whose decision may be finalized at `reference`.
    pub fn due_now(&self, reference: DateTime<Utc>) -> Result<Vec<Intent>> {
        Ok(self
            .store
            .list_intents()?
            .into_iter()
            .filter(|i| {
                i.status == IntentStatus::CheckpointDue
                    || (i.status == IntentStatus::ActiveWait && i.checkpoint_time <= reference)
            })
            .collect())
    }

    /// Intents still inside their waiting window at `reference`.
    pub fn in_delay_window(&self, reference: DateTime<Utc>) -> Result<Vec<Intent>> {
        Ok(self
            .store
            .list_intents()?
            .into_iter()
            .filter(|i| i.status == IntentStatus::ActiveWait && i.checkpoint_time > reference)
            .collect())
    }

    /// Resolved and canceled intents.
    pub fn finished(&self) -> Result<Vec<Intent>> {
        Ok(self
            .store
            .list_intents()?
            .into_iter()
            .filter(|i| i.status.is_terminal())
            .collect())
    }

    pub fn recent_urges(&self, limit: usize) -> Result<Vec<UrgeEvent>> {
        Ok(self.store.recent_urges(limit)?)
    }

    /// Current aggregate progress, recomputed from the full history.
    pub fn progress(&self) -> Result<Progress> {
        let completions = self.store.list_completions()?;
        let live = self.store.count_urges()?;
        let buffered = self.analytics.count_named("urge_logged");
        Ok(Progress::aggregate(&completions, live, buffered))
    }

    pub fn unlocks(&self) -> Result<Vec<AchievementUnlock>> {
        Ok(self.store.list_unlocks()?)
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn get_required(&self, id: Uuid) -> Result<Intent> {
        self.store
            .get_intent(id)?
            .ok_or_else(|| StoreError::NotFound(id.to_string()).into())
    }

    /// Best-effort bookkeeping after the primary write committed. Never
    /// fails the operation.
    fn side_effects(
        &self,
        kind: SyncOperationKind,
        intent_id: Option<Uuid>,
        payload: HashMap<String, String>,
    ) {
        let at = self.clock.now();
        self.outbox.enqueue(SyncOperation {
            kind,
            intent_id,
            at,
            payload: payload.clone(),
        });
        self.analytics.record(AnalyticsEvent {
            name: kind.as_str().to_string(),
            at,
            properties: payload,
        });
        if let Err(e) = self.evaluate_unlocks(intent_id) {
            warn!(error = %e, "achievement evaluation failed");
        }
    }

    /// Evaluate the full catalog against fresh progress and persist any
    /// newly satisfied unlocks, at most once per key.
    fn evaluate_unlocks(&self, intent_id: Option<Uuid>) -> Result<()> {
        let progress = self.progress()?;
        let unlocked = self.store.unlocked_keys()?;
        for def in CATALOG {
            if unlocked.contains(def.key) || !def.rule.satisfied(&progress) {
                continue;
            }
            let unlock = AchievementUnlock {
                key: def.key.to_string(),
                unlocked_at: self.clock.now(),
                intent_id,
            };
            if self.store.insert_unlock(&unlock)? {
                let properties = payload(&[("key", def.key.to_string())]);
                self.outbox.enqueue(SyncOperation {
                    kind: SyncOperationKind::AchievementUnlocked,
                    intent_id,
                    at: unlock.unlocked_at,
                    payload: properties.clone(),
                });
                self.analytics.record(AnalyticsEvent {
                    name: "achievement_unlocked".to_string(),
                    at: unlock.unlocked_at,
                    properties,
                });
            }
        }
        Ok(())
    }
}

fn validated_title(raw: &str) -> Result<String> {
    let title = raw.trim();
    if title.is_empty() {
        return Err(ValidationError::EmptyTitle.into());
    }
    Ok(title.to_string())
}

fn validate_cost(cost: Option<f64>) -> Result<()> {
    if let Some(cost) = cost {
        if !cost.is_finite() || cost < 0.0 {
            return Err(ValidationError::InvalidState(format!(
                "estimated cost must be non-negative, got {cost}"
            ))
            .into());
        }
    }
    Ok(())
}

fn payload(pairs: &[(&str, String)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), v.clone()))
        .collect()
}

fn completion_record(
    intent: &Intent,
    outcome: Outcome,
    completed_at: DateTime<Utc>,
    was_after_checkpoint: bool,
    reflection: Option<String>,
    urge_score: Option<u8>,
    regret_score: Option<u8>,
) -> CompletionRecord {
    CompletionRecord {
        id: Uuid::new_v4(),
        intent_id: intent.id,
        outcome,
        protocol_label: intent.protocol.label().to_string(),
        delay_hours: intent.delay_hours,
        duration_days: (completed_at - intent.start_time).num_days().max(1),
        was_after_checkpoint,
        reflection: reflection.filter(|r| !r.trim().is_empty()),
        urge_score: urge_score.map(|s| s.clamp(1, 5)),
        regret_score: regret_score.map(|s| s.clamp(1, 5)),
        cost: intent.estimated_cost,
        completed_at,
        created_at: completed_at,
    }
}

fn reward_entries(
    intent: &Intent,
    outcome: Outcome,
    was_after_checkpoint: bool,
    at: DateTime<Utc>,
) -> Vec<RewardEntry> {
    let mut rewards = Vec::new();
    let mut push = |points: i64, reason: &str| {
        rewards.push(RewardEntry {
            id: Uuid::new_v4(),
            intent_id: intent.id,
            points,
            reason: reason.to_string(),
            at,
        });
    };
    match outcome {
        Outcome::Resisted => push(RESIST_POINTS, "resisted the urge"),
        Outcome::IntentionalYes => push(INTENTIONAL_POINTS, "made a deliberate yes"),
        Outcome::GaveIn => push(SLIP_POINTS, "logged an honest slip"),
        Outcome::Postponed | Outcome::Canceled => {}
    }
    if was_after_checkpoint && outcome.is_intentional() {
        push(ADHERENCE_BONUS, "held out to the checkpoint");
    }
    rewards
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::error::CoreError;
    use chrono::TimeZone;

    fn repo_at(now: DateTime<Utc>) -> (IntentRepository, FixedClock) {
        let clock = FixedClock::at(now);
        let repo = IntentRepository::new(
            Store::open_memory().unwrap(),
            Arc::new(clock.clone()),
            SyncOutbox::with_capacity(64),
            AnalyticsBuffer::with_capacity(64),
        );
        (repo, clock)
    }

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 10, 12, 0, 0).unwrap()
    }

    fn new_intent(title: &str) -> NewIntent {
        NewIntent {
            title: title.to_string(),
            rationale: None,
            category: IntentCategory::Purchase,
            kind: IntentKind::Resist,
            protocol: DelayProtocol::OneDay,
            estimated_cost: None,
            fallback_action: None,
        }
    }

    #[test]
    fn capture_rejects_blank_title_without_persisting() {
        let (repo, _clock) = repo_at(base());
        let err = repo.capture(new_intent("   ")).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::EmptyTitle)
        ));
        assert!(repo.store().list_intents().unwrap().is_empty());
        assert!(repo.outbox().is_empty());
    }

    #[test]
    fn capture_rejects_negative_cost() {
        let (repo, _clock) = repo_at(base());
        let mut new = new_intent("New couch");
        new.estimated_cost = Some(-5.0);
        let err = repo.capture(new).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::InvalidState(_))
        ));
    }

    #[test]
    fn capture_trims_title_and_sets_checkpoint() {
        let (repo, _clock) = repo_at(base());
        let intent = repo.capture(new_intent("  New couch  ")).unwrap();
        assert_eq!(intent.title, "New couch");
        assert_eq!(intent.checkpoint_time, base() + Duration::hours(24));
        assert_eq!(intent.status, IntentStatus::ActiveWait);
        assert_eq!(intent.delay_hours, 24);
    }

    #[test]
    fn complete_rejects_postponed_outcome() {
        let (repo, _clock) = repo_at(base());
        let intent = repo.capture(new_intent("Another jacket")).unwrap();
        let err = repo
            .complete_decision(intent.id, Decision::new(Outcome::Postponed))
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::InvalidOutcome(_))
        ));
    }

    #[test]
    fn terminal_intents_reject_further_mutation() {
        let (repo, _clock) = repo_at(base());
        let intent = repo.capture(new_intent("Impulse order")).unwrap();
        repo.complete_decision(intent.id, Decision::new(Outcome::Resisted))
            .unwrap();

        let err = repo
            .complete_decision(intent.id, Decision::new(Outcome::GaveIn))
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::InvalidStatusTransition { .. })
        ));

        let err = repo
            .postpone_decision(intent.id, DelayProtocol::OneDay, None)
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::CheckpointUnavailable(_))
        ));

        let err = repo.log_urge(intent.id, 3, None, false).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::InvalidStatusTransition { .. })
        ));
    }

    #[test]
    fn refresh_lifecycle_is_idempotent() {
        let (repo, clock) = repo_at(base());
        repo.capture(new_intent("Wait on the sneakers")).unwrap();

        clock.advance(Duration::hours(25));
        assert_eq!(repo.refresh_lifecycle().unwrap(), 1);
        assert_eq!(repo.refresh_lifecycle().unwrap(), 0);

        let intents = repo.store().list_intents().unwrap();
        assert_eq!(intents[0].status, IntentStatus::CheckpointDue);
    }

    #[test]
    fn resisted_awards_points_with_adherence_bonus() {
        let (repo, clock) = repo_at(base());
        let intent = repo.capture(new_intent("Limited drop")).unwrap();
        clock.advance(Duration::hours(25));
        repo.complete_decision(intent.id, Decision::new(Outcome::Resisted))
            .unwrap();

        let rewards = repo.store().rewards_for(intent.id).unwrap();
        let total: i64 = rewards.iter().map(|r| r.points).sum();
        assert_eq!(total, RESIST_POINTS + ADHERENCE_BONUS);
    }

    #[test]
    fn early_decision_skips_adherence_bonus() {
        let (repo, clock) = repo_at(base());
        let intent = repo.capture(new_intent("Limited drop")).unwrap();
        clock.advance(Duration::hours(2));
        repo.complete_decision(intent.id, Decision::new(Outcome::Resisted))
            .unwrap();

        let total: i64 = repo
            .store()
            .rewards_for(intent.id)
            .unwrap()
            .iter()
            .map(|r| r.points)
            .sum();
        assert_eq!(total, RESIST_POINTS);

        let record = &repo.store().list_completions().unwrap()[0];
        assert!(!record.was_after_checkpoint);
    }

    #[test]
    fn cancel_writes_record_but_no_reward() {
        let (repo, _clock) = repo_at(base());
        let intent = repo.capture(new_intent("Doom scroll upgrade")).unwrap();
        repo.complete_decision(intent.id, Decision::new(Outcome::Canceled))
            .unwrap();

        assert!(repo.store().rewards_for(intent.id).unwrap().is_empty());
        let records = repo.store().list_completions().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].outcome, Outcome::Canceled);
        let stored = repo.store().get_intent(intent.id).unwrap().unwrap();
        assert_eq!(stored.status, IntentStatus::Canceled);
    }

    #[test]
    fn mutation_enqueues_outbox_entry() {
        let (repo, _clock) = repo_at(base());
        let intent = repo.capture(new_intent("Flash sale")).unwrap();
        let drained = repo.outbox().drain_up_to(10);
        assert!(!drained.is_empty());
        assert_eq!(drained[0].kind, SyncOperationKind::IntentCaptured);
        assert_eq!(drained[0].intent_id, Some(intent.id));
    }
}
