/// IDX market session calculator (WIB, UTC+7)
use chrono::{DateTime, Datelike, Duration, NaiveDateTime, Timelike, Utc, Weekday};

use crate::types::SessionState;

/// WIB is a fixed UTC+7 with no daylight saving
pub const WIB_OFFSET_HOURS: i64 = 7;

/// Weekday windows as half-open minute-of-day ranges `[start, end)`
pub const SESSION_WINDOWS: [(u32, u32, SessionState); 4] = [
    (525, 540, SessionState::PreOpening), // 08:45 - 09:00
    (540, 720, SessionState::Open),       // 09:00 - 12:00
    (720, 810, SessionState::LunchBreak), // 12:00 - 13:30
    (810, 960, SessionState::Open),       // 13:30 - 16:00
];

/// Convert a UTC instant to WIB wall-clock time.
/// Independent of the host's local timezone.
pub fn to_wib(now_utc: DateTime<Utc>) -> NaiveDateTime {
    now_utc.naive_utc() + Duration::hours(WIB_OFFSET_HOURS)
}

pub fn minute_of_day(wib: &NaiveDateTime) -> u32 {
    wib.hour() * 60 + wib.minute()
}

pub fn is_trading_day(weekday: Weekday) -> bool {
    !matches!(weekday, Weekday::Sat | Weekday::Sun)
}

/// Table lookup for a WIB weekday and minute of day
pub fn session_state_at(weekday: Weekday, minute: u32) -> SessionState {
    if !is_trading_day(weekday) {
        return SessionState::Closed;
    }

    SESSION_WINDOWS
        .iter()
        .find(|(start, end, _)| minute >= *start && minute < *end)
        .map(|(_, _, state)| *state)
        .unwrap_or(SessionState::Closed)
}

/// Session state of the IDX at `now_utc`
pub fn compute_session_state(now_utc: DateTime<Utc>) -> SessionState {
    let wib = to_wib(now_utc);
    session_state_at(wib.weekday(), minute_of_day(&wib))
}

/// Next instant at which the session state changes
pub fn next_transition(now_utc: DateTime<Utc>) -> DateTime<Utc> {
    let wib = to_wib(now_utc);
    let current_minute = minute_of_day(&wib);

    // Start of the current WIB day, expressed in UTC
    let wib_midnight = now_utc
        - Duration::seconds(wib.num_seconds_from_midnight() as i64)
        - Duration::nanoseconds(wib.nanosecond() as i64);

    let boundaries = SESSION_WINDOWS
        .iter()
        .flat_map(|(start, end, _)| [*start, *end]);

    if is_trading_day(wib.weekday()) {
        if let Some(minute) = boundaries.filter(|m| *m > current_minute).min() {
            return wib_midnight + Duration::minutes(minute as i64);
        }
    }

    let first_open = SESSION_WINDOWS[0].0;
    let mut day = wib.weekday().succ();
    let mut offset_days = 1;
    while !is_trading_day(day) {
        day = day.succ();
        offset_days += 1;
    }

    wib_midnight + Duration::days(offset_days) + Duration::minutes(first_open as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    /// Build a UTC instant from a WIB wall-clock reading
    fn wib(y: i32, m: u32, d: u32, hh: u32, mm: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, hh, mm, 0).unwrap() - Duration::hours(WIB_OFFSET_HOURS)
    }

    #[test]
    fn test_reference_examples() {
        // 2024-01-01 is a Monday, 2024-01-06 a Saturday
        assert_eq!(compute_session_state(wib(2024, 1, 1, 9, 0)), SessionState::Open);
        assert_eq!(compute_session_state(wib(2024, 1, 1, 12, 0)), SessionState::LunchBreak);
        assert_eq!(compute_session_state(wib(2024, 1, 6, 10, 0)), SessionState::Closed);
    }

    #[test]
    fn test_boundaries_belong_to_later_window() {
        let mon = Weekday::Mon;
        assert_eq!(session_state_at(mon, 524), SessionState::Closed);
        assert_eq!(session_state_at(mon, 525), SessionState::PreOpening);
        assert_eq!(session_state_at(mon, 539), SessionState::PreOpening);
        assert_eq!(session_state_at(mon, 540), SessionState::Open);
        assert_eq!(session_state_at(mon, 719), SessionState::Open);
        assert_eq!(session_state_at(mon, 720), SessionState::LunchBreak);
        assert_eq!(session_state_at(mon, 809), SessionState::LunchBreak);
        assert_eq!(session_state_at(mon, 810), SessionState::Open);
        assert_eq!(session_state_at(mon, 959), SessionState::Open);
        assert_eq!(session_state_at(mon, 960), SessionState::Closed);
    }

    #[test]
    fn test_weekend_always_closed() {
        for day in [Weekday::Sat, Weekday::Sun] {
            for minute in 0..1440 {
                assert_eq!(session_state_at(day, minute), SessionState::Closed);
            }
        }
    }

    #[test]
    fn test_every_weekday_minute_matches_window_table() {
        let weekdays = [Weekday::Mon, Weekday::Tue, Weekday::Wed, Weekday::Thu, Weekday::Fri];
        for day in weekdays {
            for minute in 0..1440 {
                let expected = match minute {
                    525..=539 => SessionState::PreOpening,
                    540..=719 | 810..=959 => SessionState::Open,
                    720..=809 => SessionState::LunchBreak,
                    _ => SessionState::Closed,
                };
                assert_eq!(session_state_at(day, minute), expected, "{:?} {}", day, minute);
            }
        }
    }

    #[test]
    fn test_offset_crosses_utc_date_line() {
        // Friday 23:30 UTC is already Saturday 06:30 WIB
        let fri_late_utc = Utc.with_ymd_and_hms(2024, 1, 5, 23, 30, 0).unwrap();
        assert_eq!(to_wib(fri_late_utc).weekday(), Weekday::Sat);
        assert_eq!(compute_session_state(fri_late_utc), SessionState::Closed);

        // Monday 02:00 UTC is Monday 09:00 WIB
        let mon_utc = Utc.with_ymd_and_hms(2024, 1, 1, 2, 0, 0).unwrap();
        assert_eq!(compute_session_state(mon_utc), SessionState::Open);
    }

    #[test]
    fn test_next_transition_within_day() {
        assert_eq!(next_transition(wib(2024, 1, 1, 8, 0)), wib(2024, 1, 1, 8, 45));
        assert_eq!(next_transition(wib(2024, 1, 1, 9, 0)), wib(2024, 1, 1, 12, 0));
        assert_eq!(next_transition(wib(2024, 1, 1, 12, 30)), wib(2024, 1, 1, 13, 30));
        assert_eq!(next_transition(wib(2024, 1, 1, 15, 59)), wib(2024, 1, 1, 16, 0));
    }

    #[test]
    fn test_next_transition_skips_weekend() {
        // Friday after close -> Monday pre-opening
        assert_eq!(next_transition(wib(2024, 1, 5, 16, 0)), wib(2024, 1, 8, 8, 45));
        // Sunday morning -> Monday pre-opening
        assert_eq!(next_transition(wib(2024, 1, 7, 10, 0)), wib(2024, 1, 8, 8, 45));
        // Tuesday evening -> Wednesday pre-opening
        assert_eq!(next_transition(wib(2024, 1, 2, 20, 0)), wib(2024, 1, 3, 8, 45));
    }
}
