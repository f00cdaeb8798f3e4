//! Integration tests for achievement unlocking through the repository.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use cooloff_core::{
    AnalyticsBuffer, CompletionRecord, Decision, DelayProtocol, FixedClock, IntentCategory,
    IntentKind, IntentRepository, NewIntent, Outcome, Progress, Store, SyncOutbox,
};
use uuid::Uuid;

fn start_instant() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 6, 9, 0, 0).unwrap()
}

fn setup() -> (IntentRepository, FixedClock) {
    let clock = FixedClock::at(start_instant());
    let repo = IntentRepository::new(
        Store::open_memory().unwrap(),
        Arc::new(clock.clone()),
        SyncOutbox::with_capacity(512),
        AnalyticsBuffer::with_capacity(512),
    );
    (repo, clock)
}

fn resist(title: &str) -> NewIntent {
    NewIntent {
        title: title.to_string(),
        rationale: None,
        category: IntentCategory::Habit,
        kind: IntentKind::Resist,
        protocol: DelayProtocol::TenMinutes,
        estimated_cost: None,
        fallback_action: None,
    }
}

#[test]
fn first_decision_unlocks_exactly_once() {
    let (repo, clock) = setup();

    for i in 0..3 {
        let intent = repo.capture(resist(&format!("Urge {i}"))).unwrap();
        clock.advance(Duration::hours(1));
        repo.complete_decision(intent.id, Decision::new(Outcome::Resisted))
            .unwrap();
    }

    let unlocks = repo.unlocks().unwrap();
    let first_decision: Vec<_> = unlocks
        .iter()
        .filter(|u| u.key == "first_decision")
        .collect();
    assert_eq!(first_decision.len(), 1);

    // Recomputing progress any number of times adds nothing.
    for _ in 0..5 {
        repo.progress().unwrap();
    }
    assert_eq!(
        repo.unlocks()
            .unwrap()
            .iter()
            .filter(|u| u.key == "first_decision")
            .count(),
        1
    );
}

#[test]
fn unlock_survives_triggering_intent_deletion() {
    let (repo, clock) = setup();
    let intent = repo.capture(resist("One urge")).unwrap();
    clock.advance(Duration::hours(1));
    repo.complete_decision(intent.id, Decision::new(Outcome::Resisted))
        .unwrap();

    let unlocks = repo.unlocks().unwrap();
    assert!(unlocks.iter().any(|u| u.key == "first_decision"));

    repo.delete_intent(intent.id).unwrap();
    let unlocks = repo.unlocks().unwrap();
    assert!(unlocks.iter().any(|u| u.key == "first_decision"));
}

#[test]
fn streak_unlock_requires_consecutive_runs() {
    let (repo, clock) = setup();

    // Four deliberate decisions, one slip, then five more deliberate ones.
    for i in 0..4 {
        let intent = repo.capture(resist(&format!("Early {i}"))).unwrap();
        clock.advance(Duration::hours(1));
        repo.complete_decision(intent.id, Decision::new(Outcome::Resisted))
            .unwrap();
    }
    let slip = repo.capture(resist("Slip")).unwrap();
    clock.advance(Duration::hours(1));
    repo.complete_decision(slip.id, Decision::new(Outcome::GaveIn))
        .unwrap();
    assert!(!repo.unlocks().unwrap().iter().any(|u| u.key == "streak_five"));

    for i in 0..5 {
        let intent = repo.capture(resist(&format!("Late {i}"))).unwrap();
        clock.advance(Duration::hours(1));
        repo.complete_decision(intent.id, Decision::new(Outcome::IntentionalYes))
            .unwrap();
    }
    assert!(repo.unlocks().unwrap().iter().any(|u| u.key == "streak_five"));
}

#[test]
fn urge_logging_unlocks_from_either_source() {
    let (repo, _clock) = setup();
    let intent = repo.capture(resist("Scrolling")).unwrap();
    for _ in 0..5 {
        repo.log_urge(intent.id, 3, None, false).unwrap();
    }
    assert!(repo.unlocks().unwrap().iter().any(|u| u.key == "urge_logger"));

    // Deleting the intent clears its live urges, but the buffered count
    // keeps the metric from regressing.
    repo.delete_intent(intent.id).unwrap();
    let progress = repo.progress().unwrap();
    assert_eq!(progress.urge_log_count, 5);
}

/// Full-history recomputation is O(n); guard that a large history stays
/// interactive. Run with `cargo test -- --ignored`.
#[test]
#[ignore]
fn aggregation_stays_fast_on_large_history() {
    let t = start_instant();
    let completions: Vec<CompletionRecord> = (0..100_000i64)
        .map(|i| CompletionRecord {
            id: Uuid::new_v4(),
            intent_id: Uuid::new_v4(),
            outcome: if i % 7 == 0 {
                Outcome::GaveIn
            } else {
                Outcome::Resisted
            },
            protocol_label: "one_day".to_string(),
            delay_hours: 24,
            duration_days: 1,
            was_after_checkpoint: i % 3 != 0,
            reflection: (i % 5 == 0).then(|| "noted".to_string()),
            urge_score: None,
            regret_score: None,
            cost: Some(12.5),
            completed_at: t + Duration::minutes(i),
            created_at: t + Duration::minutes(i),
        })
        .collect();

    let started = std::time::Instant::now();
    let progress = Progress::aggregate(&completions, 0, 0);
    let elapsed = started.elapsed();

    assert_eq!(progress.resolved_count, 100_000);
    assert!(
        elapsed < std::time::Duration::from_secs(1),
        "aggregation took {elapsed:?}"
    );
}
