//! Achievement rules and progress aggregation.
//!
//! The engine is a pure function over an aggregated [`Progress`] snapshot:
//! each catalog rule answers "satisfied?" plus a `(current, target)` pair
//! for display. Unlock bookkeeping (at-most-once per key) lives in the
//! repository against the persisted unlock set, never here.

use serde::{Deserialize, Serialize};

use crate::intent::{CompletionRecord, Outcome};

/// Aggregated progress metrics, recomputed from the full history each time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Progress {
    /// Completions excluding postponed and canceled.
    pub resolved_count: u32,
    /// Resolved with a deliberate outcome (resisted or intentional-yes).
    pub intentional_count: u32,
    pub resisted_count: u32,
    /// Count of postponed completions.
    pub postpone_count: u32,
    /// Resolved completions carrying a non-blank reflection.
    pub reflection_count: u32,
    /// Share of resolved completions decided at or after the checkpoint.
    pub delay_adherence_rate: f64,
    /// Sum of cost snapshots over resisted completions.
    pub estimated_spend_avoided: f64,
    /// Longest consecutive run of deliberate outcomes, in completion order.
    pub max_intentional_run: u32,
    pub urge_log_count: u32,
}

impl Progress {
    /// Recompute from scratch over the full completion history.
    ///
    /// `live_urge_count` is the sum of urge events still attached to
    /// intents; `buffered_urge_count` is the standalone analytics counter.
    /// The two sources overlap (events are deleted with their intent, the
    /// buffer is bounded), so the larger one wins.
    pub fn aggregate(
        completions: &[CompletionRecord],
        live_urge_count: u32,
        buffered_urge_count: u32,
    ) -> Self {
        let mut ordered: Vec<&CompletionRecord> = completions.iter().collect();
        ordered.sort_by_key(|r| (r.completed_at, r.created_at));

        let mut progress = Progress {
            urge_log_count: live_urge_count.max(buffered_urge_count),
            ..Progress::default()
        };
        let mut adherent = 0u32;
        let mut run = 0u32;

        for record in ordered {
            match record.outcome {
                Outcome::Postponed => {
                    progress.postpone_count += 1;
                    continue;
                }
                Outcome::Canceled => continue,
                _ => {}
            }

            progress.resolved_count += 1;
            if record.was_after_checkpoint {
                adherent += 1;
            }
            if record
                .reflection
                .as_deref()
                .is_some_and(|r| !r.trim().is_empty())
            {
                progress.reflection_count += 1;
            }

            if record.outcome.is_intentional() {
                progress.intentional_count += 1;
                run += 1;
                progress.max_intentional_run = progress.max_intentional_run.max(run);
            } else {
                run = 0;
            }

            if record.outcome == Outcome::Resisted {
                progress.resisted_count += 1;
                progress.estimated_spend_avoided += record.cost.unwrap_or(0.0);
            }
        }

        if progress.resolved_count > 0 {
            progress.delay_adherence_rate =
                f64::from(adherent) / f64::from(progress.resolved_count);
        }
        progress
    }
}

/// A single achievement predicate over [`Progress`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rule {
    MinIntentional(u32),
    MinUrgeLogs(u32),
    MinReflections(u32),
    MinAdherence { rate: f64, min_samples: u32 },
    MinResisted(u32),
    MinPostpones(u32),
    MinAvoidedSpend(f64),
    MinIntentionalRun(u32),
}

impl Rule {
    pub fn satisfied(&self, progress: &Progress) -> bool {
        match *self {
            Rule::MinIntentional(n) => progress.intentional_count >= n,
            Rule::MinUrgeLogs(n) => progress.urge_log_count >= n,
            Rule::MinReflections(n) => progress.reflection_count >= n,
            Rule::MinAdherence { rate, min_samples } => {
                progress.resolved_count >= min_samples && progress.delay_adherence_rate >= rate
            }
            Rule::MinResisted(n) => progress.resisted_count >= n,
            Rule::MinPostpones(n) => progress.postpone_count >= n,
            Rule::MinAvoidedSpend(amount) => progress.estimated_spend_avoided >= amount,
            Rule::MinIntentionalRun(n) => progress.max_intentional_run >= n,
        }
    }

    /// `(current, target)` pair for display.
    pub fn progress(&self, progress: &Progress) -> (f64, f64) {
        match *self {
            Rule::MinIntentional(n) => (f64::from(progress.intentional_count), f64::from(n)),
            Rule::MinUrgeLogs(n) => (f64::from(progress.urge_log_count), f64::from(n)),
            Rule::MinReflections(n) => (f64::from(progress.reflection_count), f64::from(n)),
            Rule::MinAdherence { rate, .. } => (progress.delay_adherence_rate, rate),
            Rule::MinResisted(n) => (f64::from(progress.resisted_count), f64::from(n)),
            Rule::MinPostpones(n) => (f64::from(progress.postpone_count), f64::from(n)),
            Rule::MinAvoidedSpend(amount) => (progress.estimated_spend_avoided, amount),
            Rule::MinIntentionalRun(n) => (f64::from(progress.max_intentional_run), f64::from(n)),
        }
    }
}

/// Achievement tier, for display grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Bronze,
    Silver,
    Gold,
}

/// One catalog entry. Keys are permanent and globally unique.
#[derive(Debug, Clone, Copy)]
pub struct AchievementDef {
    pub key: &'static str,
    pub title: &'static str,
    pub tier: Tier,
    pub rule: Rule,
}

/// The fixed, ordered achievement catalog.
///
/// Keys must never be renamed or reused; unlocked rows reference them
/// forever.
pub const CATALOG: &[AchievementDef] = &[
    AchievementDef {
        key: "first_decision",
        title: "First Call",
        tier: Tier::Bronze,
        rule: Rule::MinIntentional(1),
    },
    AchievementDef {
        key: "deliberate_ten",
        title: "Ten Deliberate Calls",
        tier: Tier::Silver,
        rule: Rule::MinIntentional(10),
    },
    AchievementDef {
        key: "deliberate_fifty",
        title: "Fifty Deliberate Calls",
        tier: Tier::Gold,
        rule: Rule::MinIntentional(50),
    },
    AchievementDef {
        key: "urge_logger",
        title: "Urge Logger",
        tier: Tier::Bronze,
        rule: Rule::MinUrgeLogs(5),
    },
    AchievementDef {
        key: "urge_cartographer",
        title: "Urge Cartographer",
        tier: Tier::Silver,
        rule: Rule::MinUrgeLogs(25),
    },
    AchievementDef {
        key: "reflective",
        title: "Looking Back",
        tier: Tier::Bronze,
        rule: Rule::MinReflections(5),
    },
    AchievementDef {
        key: "steady_hand",
        title: "Steady Hand",
        tier: Tier::Silver,
        rule: Rule::MinAdherence {
            rate: 0.8,
            min_samples: 5,
        },
    },
    AchievementDef {
        key: "iron_patience",
        title: "Iron Patience",
        tier: Tier::Gold,
        rule: Rule::MinAdherence {
            rate: 0.9,
            min_samples: 20,
        },
    },
    AchievementDef {
        key: "resister_five",
        title: "Five Urges Down",
        tier: Tier::Bronze,
        rule: Rule::MinResisted(5),
    },
    AchievementDef {
        key: "resister_twentyfive",
        title: "Twenty-Five Urges Down",
        tier: Tier::Gold,
        rule: Rule::MinResisted(25),
    },
    AchievementDef {
        key: "patient_postponer",
        title: "Still Waiting",
        tier: Tier::Bronze,
        rule: Rule::MinPostpones(3),
    },
    AchievementDef {
        key: "saver_hundred",
        title: "Hundred Saved",
        tier: Tier::Silver,
        rule: Rule::MinAvoidedSpend(100.0),
    },
    AchievementDef {
        key: "saver_thousand",
        title: "Thousand Saved",
        tier: Tier::Gold,
        rule: Rule::MinAvoidedSpend(1000.0),
    },
    AchievementDef {
        key: "streak_five",
        title: "Five in a Row",
        tier: Tier::Silver,
        rule: Rule::MinIntentionalRun(5),
    },
    AchievementDef {
        key: "streak_ten",
        title: "Ten in a Row",
        tier: Tier::Gold,
        rule: Rule::MinIntentionalRun(10),
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use uuid::Uuid;

    fn record(
        outcome: Outcome,
        at: DateTime<Utc>,
        cost: Option<f64>,
        reflection: Option<&str>,
        adherent: bool,
    ) -> CompletionRecord {
        CompletionRecord {
            id: Uuid::new_v4(),
            intent_id: Uuid::new_v4(),
            outcome,
            protocol_label: "one_day".to_string(),
            delay_hours: 24,
            duration_days: 1,
            was_after_checkpoint: adherent,
            reflection: reflection.map(str::to_string),
            urge_score: None,
            regret_score: None,
            cost,
            completed_at: at,
            created_at: at,
        }
    }

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 4, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn counts_exclude_postponed_and_canceled() {
        let t = base();
        let history = vec![
            record(Outcome::Resisted, t, Some(50.0), None, true),
            record(Outcome::Postponed, t + Duration::hours(1), None, None, false),
            record(Outcome::Canceled, t + Duration::hours(2), None, None, false),
            record(Outcome::GaveIn, t + Duration::hours(3), Some(20.0), None, false),
        ];
        let progress = Progress::aggregate(&history, 0, 0);
        assert_eq!(progress.resolved_count, 2);
        assert_eq!(progress.intentional_count, 1);
        assert_eq!(progress.resisted_count, 1);
        assert_eq!(progress.postpone_count, 1);
        // Only resisted costs count as avoided spend.
        assert!((progress.estimated_spend_avoided - 50.0).abs() < 1e-9);
    }

    #[test]
    fn intentional_run_resets_on_gave_in() {
        let t = base();
        let mut history = Vec::new();
        for i in 0..3 {
            history.push(record(
                Outcome::Resisted,
                t + Duration::hours(i),
                None,
                None,
                true,
            ));
        }
        history.push(record(Outcome::GaveIn, t + Duration::hours(3), None, None, true));
        history.push(record(
            Outcome::IntentionalYes,
            t + Duration::hours(4),
            None,
            None,
            true,
        ));
        history.push(record(Outcome::Resisted, t + Duration::hours(5), None, None, true));

        let progress = Progress::aggregate(&history, 0, 0);
        assert_eq!(progress.max_intentional_run, 3);

        // The rebuilt run after the reset is the two trailing entries.
        let tail = Progress::aggregate(&history[3..], 0, 0);
        assert_eq!(tail.max_intentional_run, 2);
    }

    #[test]
    fn run_is_order_independent_of_input_slice() {
        let t = base();
        let mut history = vec![
            record(Outcome::Resisted, t + Duration::hours(2), None, None, true),
            record(Outcome::GaveIn, t + Duration::hours(1), None, None, true),
            record(Outcome::Resisted, t, None, None, true),
        ];
        let progress = Progress::aggregate(&history, 0, 0);
        // Sorted by completion time: resisted, gave_in, resisted.
        assert_eq!(progress.max_intentional_run, 1);
        history.reverse();
        let same = Progress::aggregate(&history, 0, 0);
        assert_eq!(same.max_intentional_run, 1);
    }

    #[test]
    fn adherence_rate_handles_empty_history() {
        let progress = Progress::aggregate(&[], 0, 0);
        assert_eq!(progress.delay_adherence_rate, 0.0);
        assert_eq!(progress.resolved_count, 0);
    }

    #[test]
    fn blank_reflections_do_not_count() {
        let t = base();
        let history = vec![
            record(Outcome::Resisted, t, None, Some("   "), true),
            record(Outcome::Resisted, t + Duration::hours(1), None, Some("kept busy"), true),
        ];
        let progress = Progress::aggregate(&history, 0, 0);
        assert_eq!(progress.reflection_count, 1);
    }

    #[test]
    fn urge_count_takes_the_larger_source() {
        let progress = Progress::aggregate(&[], 3, 7);
        assert_eq!(progress.urge_log_count, 7);
        let progress = Progress::aggregate(&[], 9, 7);
        assert_eq!(progress.urge_log_count, 9);
    }

    #[test]
    fn adherence_rule_requires_samples() {
        let t = base();
        let history = vec![record(Outcome::Resisted, t, None, None, true)];
        let progress = Progress::aggregate(&history, 0, 0);
        let rule = Rule::MinAdherence {
            rate: 0.8,
            min_samples: 5,
        };
        // Rate is 1.0 but there is only one sample.
        assert!(!rule.satisfied(&progress));
    }

    #[test]
    fn catalog_keys_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for def in CATALOG {
            assert!(seen.insert(def.key), "duplicate catalog key: {}", def.key);
        }
    }

    #[test]
    fn rule_progress_pairs_track_current_and_target() {
        let t = base();
        let history = vec![
            record(Outcome::Resisted, t, Some(40.0), None, true),
            record(Outcome::Resisted, t + Duration::hours(1), Some(25.0), None, true),
        ];
        let progress = Progress::aggregate(&history, 0, 0);
        assert_eq!(Rule::MinResisted(5).progress(&progress), (2.0, 5.0));
        assert_eq!(Rule::MinAvoidedSpend(100.0).progress(&progress), (65.0, 100.0));
    }
}
