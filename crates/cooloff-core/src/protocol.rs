//! Delay protocol date arithmetic.
//!
//! Maps a waiting-protocol variant plus a start instant to the concrete
//! checkpoint instant, and separately to a nominal duration in hours used
//! for progress percentages and analytics.

use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Paydays land at 09:00 UTC on the 15th and the 1st.
const PAYDAY_HOUR: u32 = 9;
const PAYDAY_MID_DAY: u32 = 15;

/// Minimum gap a custom date may produce.
const CUSTOM_FLOOR_MINUTES: i64 = 10;

/// The waiting rule attached to an intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "variant", rename_all = "snake_case")]
pub enum DelayProtocol {
    /// A breather: ten minutes.
    TenMinutes,
    /// Sleep on it: 24 hours.
    OneDay,
    /// A long weekend: 72 hours.
    ThreeDays,
    /// Wait for the next payday (15th or 1st, at 09:00).
    UntilPayday,
    /// Wait until a chosen date; missing date falls back to one day.
    Custom { date: Option<DateTime<Utc>> },
}

impl DelayProtocol {
    pub fn label(&self) -> &'static str {
        match self {
            DelayProtocol::TenMinutes => "ten_minutes",
            DelayProtocol::OneDay => "one_day",
            DelayProtocol::ThreeDays => "three_days",
            DelayProtocol::UntilPayday => "until_payday",
            DelayProtocol::Custom { .. } => "custom",
        }
    }

    /// Concrete checkpoint instant for an intent starting at `start`.
    ///
    /// Always strictly after `start`: fixed variants add their offset, the
    /// payday variant falls back to one day when the calendar cannot produce
    /// an instant, and custom dates are floored to `start` + 10 minutes.
    pub fn checkpoint(&self, start: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            DelayProtocol::TenMinutes => start + Duration::minutes(10),
            DelayProtocol::OneDay => start + Duration::hours(24),
            DelayProtocol::ThreeDays => start + Duration::hours(72),
            DelayProtocol::UntilPayday => {
                payday_after(start).unwrap_or_else(|| start + Duration::hours(24))
            }
            DelayProtocol::Custom { date } => {
                let floor = start + Duration::minutes(CUSTOM_FLOOR_MINUTES);
                match date {
                    Some(date) => (*date).max(floor),
                    None => start + Duration::hours(24),
                }
            }
        }
    }

    /// Nominal waiting duration in whole hours.
    ///
    /// Fixed variants report a constant; the payday variant reports a flat
    /// two weeks; a custom date reports the hours remaining from `now`,
    /// never below 1.
    pub fn duration_hours(&self, now: DateTime<Utc>) -> i64 {
        match self {
            DelayProtocol::TenMinutes => 1,
            DelayProtocol::OneDay => 24,
            DelayProtocol::ThreeDays => 72,
            DelayProtocol::UntilPayday => 336,
            DelayProtocol::Custom { date } => match date {
                Some(date) => (*date - now).num_hours().max(1),
                None => 24,
            },
        }
    }
}

/// Next payday instant strictly after `start`.
///
/// The 15th-at-09:00 of the start month when that full instant is still
/// ahead of `start`; otherwise the 1st-at-09:00 of the following month. The
/// comparison is on the complete instant, so a start on the 15th at 10:00
/// rolls to the next month while one at 08:00 does not.
fn payday_after(start: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let mid = Utc
        .with_ymd_and_hms(start.year(), start.month(), PAYDAY_MID_DAY, PAYDAY_HOUR, 0, 0)
        .single()?;
    if mid > start {
        return Some(mid);
    }
    let (year, month) = match start.month() {
        12 => (start.year() + 1, 1),
        m => (start.year(), m + 1),
    };
    Utc.with_ymd_and_hms(year, month, 1, PAYDAY_HOUR, 0, 0).single()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    #[test]
    fn fixed_offsets() {
        let start = at(2025, 7, 3, 14, 30);
        assert_eq!(
            DelayProtocol::TenMinutes.checkpoint(start),
            start + Duration::minutes(10)
        );
        assert_eq!(
            DelayProtocol::OneDay.checkpoint(start),
            start + Duration::hours(24)
        );
        assert_eq!(
            DelayProtocol::ThreeDays.checkpoint(start),
            start + Duration::hours(72)
        );
    }

    #[test]
    fn payday_early_in_month_uses_the_fifteenth() {
        let start = at(2025, 7, 10, 13, 0); // 31-day month
        assert_eq!(
            DelayProtocol::UntilPayday.checkpoint(start),
            at(2025, 7, 15, 9, 0)
        );
    }

    #[test]
    fn payday_late_in_month_rolls_to_the_first() {
        let start = at(2025, 7, 20, 8, 0);
        assert_eq!(
            DelayProtocol::UntilPayday.checkpoint(start),
            at(2025, 8, 1, 9, 0)
        );
    }

    #[test]
    fn payday_on_the_fifteenth_after_nine_rolls_over() {
        let start = at(2025, 7, 15, 10, 0);
        assert_eq!(
            DelayProtocol::UntilPayday.checkpoint(start),
            at(2025, 8, 1, 9, 0)
        );
    }

    #[test]
    fn payday_on_the_fifteenth_before_nine_holds() {
        // The comparison is on the full instant, not the day number.
        let start = at(2025, 7, 15, 8, 0);
        assert_eq!(
            DelayProtocol::UntilPayday.checkpoint(start),
            at(2025, 7, 15, 9, 0)
        );
    }

    #[test]
    fn payday_december_rolls_into_january() {
        let start = at(2025, 12, 20, 12, 0);
        assert_eq!(
            DelayProtocol::UntilPayday.checkpoint(start),
            at(2026, 1, 1, 9, 0)
        );
    }

    #[test]
    fn custom_date_below_floor_is_raised() {
        let start = at(2025, 7, 3, 14, 0);
        let protocol = DelayProtocol::Custom {
            date: Some(start + Duration::minutes(2)),
        };
        assert_eq!(protocol.checkpoint(start), start + Duration::minutes(10));
    }

    #[test]
    fn custom_date_in_the_past_is_raised() {
        let start = at(2025, 7, 3, 14, 0);
        let protocol = DelayProtocol::Custom {
            date: Some(start - Duration::days(1)),
        };
        assert_eq!(protocol.checkpoint(start), start + Duration::minutes(10));
    }

    #[test]
    fn custom_without_date_defaults_to_one_day() {
        let start = at(2025, 7, 3, 14, 0);
        let protocol = DelayProtocol::Custom { date: None };
        assert_eq!(protocol.checkpoint(start), start + Duration::hours(24));
        assert_eq!(protocol.duration_hours(start), 24);
    }

    #[test]
    fn duration_hours_constants() {
        let now = at(2025, 7, 3, 14, 0);
        assert_eq!(DelayProtocol::TenMinutes.duration_hours(now), 1);
        assert_eq!(DelayProtocol::OneDay.duration_hours(now), 24);
        assert_eq!(DelayProtocol::ThreeDays.duration_hours(now), 72);
        assert_eq!(DelayProtocol::UntilPayday.duration_hours(now), 336);
    }

    #[test]
    fn custom_duration_has_a_floor_of_one_hour() {
        let now = at(2025, 7, 3, 14, 0);
        let near = DelayProtocol::Custom {
            date: Some(now + Duration::minutes(5)),
        };
        assert_eq!(near.duration_hours(now), 1);

        let past = DelayProtocol::Custom {
            date: Some(now - Duration::hours(3)),
        };
        assert_eq!(past.duration_hours(now), 1);

        let far = DelayProtocol::Custom {
            date: Some(now + Duration::hours(50)),
        };
        assert_eq!(far.duration_hours(now), 50);
    }

    proptest! {
        #[test]
        fn checkpoint_is_strictly_after_start(
            secs in 0i64..4_102_444_800i64, // through 2099
            choice in 0usize..6,
            custom_secs in 0i64..4_102_444_800i64,
        ) {
            let start = Utc.timestamp_opt(secs, 0).single().unwrap();
            let custom = Utc.timestamp_opt(custom_secs, 0).single().unwrap();
            let protocol = match choice {
                0 => DelayProtocol::TenMinutes,
                1 => DelayProtocol::OneDay,
                2 => DelayProtocol::ThreeDays,
                3 => DelayProtocol::UntilPayday,
                4 => DelayProtocol::Custom { date: None },
                _ => DelayProtocol::Custom { date: Some(custom) },
            };
            prop_assert!(protocol.checkpoint(start) > start);
        }
    }
}
