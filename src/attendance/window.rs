//! Shift window evaluation.
//!
//! This module answers "may this person act right now" for a shift
//! definition. The same functions are used by the access gate on the request
//! path and by the auto-logout sweeper, so the two can never disagree about
//! whether a session has expired.
//!
//! All comparisons happen at minute granularity in minutes-since-midnight.

use chrono::{Datelike, Duration, NaiveDateTime};

use crate::models::{MINUTES_PER_DAY, ShiftDefinition, ShiftTime};

/// Returns true if `now` falls inside the shift's window, grace included.
///
/// # Examples
///
/// ```
/// use shift_attendance::attendance::is_within_window;
/// use shift_attendance::models::ShiftDefinition;
/// use chrono::NaiveDateTime;
///
/// let at = |s: &str| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap();
/// let shift = ShiftDefinition {
///     id: "shift_day".to_string(),
///     name: "Day".to_string(),
///     start_time: "09:00".parse().unwrap(),
///     end_time: "17:00".parse().unwrap(),
///     grace_period_minutes: 10,
///     days_of_week: None,
///     is_active: true,
///     created_at: at("2026-01-01 00:00"),
///     updated_at: at("2026-01-01 00:00"),
/// };
///
/// assert!(is_within_window(at("2026-01-15 08:50"), &shift));
/// assert!(!is_within_window(at("2026-01-15 08:49"), &shift));
/// assert!(is_within_window(at("2026-01-15 17:10"), &shift));
/// assert!(!is_within_window(at("2026-01-15 17:11"), &shift));
/// ```
pub fn is_within_window(now: NaiveDateTime, shift: &ShiftDefinition) -> bool {
    is_within_window_extended(now, shift, 0)
}

/// Like [`is_within_window`], with the end pushed back by `extension_minutes`.
///
/// The extension comes from admin overrides on a specific session.
pub fn is_within_window_extended(
    now: NaiveDateTime,
    shift: &ShiftDefinition,
    extension_minutes: u32,
) -> bool {
    if !shift.is_active {
        return false;
    }
    if !shift.runs_on(now.weekday()) {
        return false;
    }

    let day = i64::from(MINUTES_PER_DAY);
    let grace = i64::from(shift.grace_period_minutes);
    let extension = i64::from(extension_minutes);

    let span = i64::from(shift.duration_minutes()) + 2 * grace + extension;
    if span >= day {
        return true;
    }

    let start = (i64::from(shift.start_time.minutes()) - grace).rem_euclid(day);
    let end = (i64::from(shift.end_time.minutes()) + grace + extension).rem_euclid(day);
    let now = i64::from(ShiftTime::from(now).minutes());

    if start > end {
        now >= start || now <= end
    } else {
        start <= now && now <= end
    }
}

/// The concrete nominal start and end of the shift occurrence a session belongs to.
///
/// A session is anchored to the occurrence whose graced window opened most
/// recently at or before `clock_in_at`, which keeps overnight sessions tied to
/// the evening they started on.
pub fn session_bounds(
    clock_in_at: NaiveDateTime,
    shift: &ShiftDefinition,
) -> (NaiveDateTime, NaiveDateTime) {
    let grace = Duration::minutes(i64::from(shift.grace_period_minutes));
    let mut start = clock_in_at
        .date()
        .and_time(shift.start_time.to_naive_time());

    if start - grace > clock_in_at {
        start -= Duration::days(1);
    } else if start - grace + Duration::days(1) <= clock_in_at {
        start += Duration::days(1);
    }

    let end = start + Duration::minutes(i64::from(shift.duration_minutes()));
    (start, end)
}

/// Returns true while an open session clocked in at `clock_in_at` may continue.
///
/// The time-of-day window alone repeats every day, so a session is also held
/// to the occurrence it belongs to: it ends at the anchored nominal end plus
/// grace and extensions, however large the extensions grow.
pub fn is_session_within_window(
    now: NaiveDateTime,
    clock_in_at: NaiveDateTime,
    shift: &ShiftDefinition,
    extension_minutes: u32,
) -> bool {
    let (_, end) = session_bounds(clock_in_at, shift);
    let deadline = end
        + Duration::minutes(i64::from(shift.grace_period_minutes))
        + Duration::minutes(i64::from(extension_minutes));
    now <= deadline && is_within_window_extended(now, shift, extension_minutes)
}

/// Minutes from `now` until the session's effective end (nominal end plus extensions).
///
/// Partial minutes count as a whole minute, so any time left before the end
/// is at least 1. Zero or negative once the effective end has passed.
pub fn minutes_until_end(
    now: NaiveDateTime,
    clock_in_at: NaiveDateTime,
    shift: &ShiftDefinition,
    extension_minutes: u32,
) -> i64 {
    let (_, end) = session_bounds(clock_in_at, shift);
    let effective_end = end + Duration::minutes(i64::from(extension_minutes));
    let seconds = (effective_end - now).num_seconds();
    seconds.div_euclid(60) + i64::from(seconds.rem_euclid(60) > 0)
}

/// The wall-clock end time once `extension_minutes` are added.
pub fn effective_end_time(shift: &ShiftDefinition, extension_minutes: u32) -> ShiftTime {
    ShiftTime::from_minutes(shift.end_time.minutes() + extension_minutes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DayCode;
    use proptest::prelude::*;

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    fn make_shift(start: &str, end: &str, grace: u32) -> ShiftDefinition {
        ShiftDefinition {
            id: "shift_001".to_string(),
            name: "Test".to_string(),
            start_time: start.parse().unwrap(),
            end_time: end.parse().unwrap(),
            grace_period_minutes: grace,
            days_of_week: None,
            is_active: true,
            created_at: at("2026-01-01 00:00"),
            updated_at: at("2026-01-01 00:00"),
        }
    }

    /// 2026-01-15 is a Thursday.
    fn on_day(minute_of_day: u32) -> NaiveDateTime {
        at("2026-01-15 00:00") + Duration::minutes(i64::from(minute_of_day))
    }

    #[test]
    fn test_day_shift_with_grace_boundaries() {
        let shift = make_shift("09:00", "17:00", 10);
        assert!(is_within_window(at("2026-01-15 08:50"), &shift));
        assert!(!is_within_window(at("2026-01-15 08:49"), &shift));
        assert!(is_within_window(at("2026-01-15 12:00"), &shift));
        assert!(is_within_window(at("2026-01-15 17:10"), &shift));
        assert!(!is_within_window(at("2026-01-15 17:11"), &shift));
    }

    #[test]
    fn test_overnight_shift() {
        let shift = make_shift("22:00", "06:00", 0);
        assert!(is_within_window(at("2026-01-15 23:30"), &shift));
        assert!(is_within_window(at("2026-01-16 03:00"), &shift));
        assert!(is_within_window(at("2026-01-16 06:00"), &shift));
        assert!(!is_within_window(at("2026-01-16 06:01"), &shift));
        assert!(!is_within_window(at("2026-01-15 12:00"), &shift));
        assert!(!is_within_window(at("2026-01-15 21:59"), &shift));
    }

    #[test]
    fn test_grace_wraps_past_midnight() {
        // 00:15 start with 30 minutes grace opens at 23:45 the previous evening.
        let shift = make_shift("00:15", "08:00", 30);
        assert!(is_within_window(at("2026-01-15 23:45"), &shift));
        assert!(!is_within_window(at("2026-01-15 23:44"), &shift));
        assert!(is_within_window(at("2026-01-16 08:30"), &shift));
    }

    #[test]
    fn test_extension_pushes_end() {
        let shift = make_shift("09:00", "17:00", 10);
        assert!(!is_within_window(at("2026-01-15 17:15"), &shift));
        assert!(is_within_window_extended(at("2026-01-15 17:15"), &shift, 30));
        assert!(is_within_window_extended(at("2026-01-15 17:40"), &shift, 30));
        assert!(!is_within_window_extended(at("2026-01-15 17:41"), &shift, 30));
    }

    #[test]
    fn test_extension_can_wrap_midnight() {
        let shift = make_shift("16:00", "23:50", 0);
        assert!(is_within_window_extended(at("2026-01-16 00:15"), &shift, 30));
        assert!(!is_within_window_extended(at("2026-01-16 00:21"), &shift, 30));
    }

    #[test]
    fn test_full_day_span_always_open() {
        let shift = make_shift("06:00", "05:30", 30);
        assert!(is_within_window(at("2026-01-15 05:45"), &shift));
    }

    #[test]
    fn test_inactive_shift_rejects() {
        let mut shift = make_shift("09:00", "17:00", 10);
        shift.is_active = false;
        assert!(!is_within_window(at("2026-01-15 12:00"), &shift));
    }

    #[test]
    fn test_day_filter() {
        let mut shift = make_shift("09:00", "17:00", 0);
        shift.days_of_week = Some([DayCode::Sat, DayCode::Sun].into_iter().collect());
        // Thursday
        assert!(!is_within_window(at("2026-01-15 12:00"), &shift));
        // Saturday
        assert!(is_within_window(at("2026-01-17 12:00"), &shift));
    }

    #[test]
    fn test_session_bounds_day_shift() {
        let shift = make_shift("09:00", "17:00", 10);
        let (start, end) = session_bounds(at("2026-01-15 08:52"), &shift);
        assert_eq!(start, at("2026-01-15 09:00"));
        assert_eq!(end, at("2026-01-15 17:00"));

        // Clocking in during the trailing grace still belongs to today's shift.
        let (_, end) = session_bounds(at("2026-01-15 17:05"), &shift);
        assert_eq!(end, at("2026-01-15 17:00"));
    }

    #[test]
    fn test_session_bounds_overnight() {
        let shift = make_shift("22:00", "06:00", 0);
        let (start, end) = session_bounds(at("2026-01-15 23:30"), &shift);
        assert_eq!(start, at("2026-01-15 22:00"));
        assert_eq!(end, at("2026-01-16 06:00"));

        let (start, end) = session_bounds(at("2026-01-16 01:00"), &shift);
        assert_eq!(start, at("2026-01-15 22:00"));
        assert_eq!(end, at("2026-01-16 06:00"));
    }

    #[test]
    fn test_session_bounds_early_grace_before_midnight() {
        let shift = make_shift("00:30", "08:00", 60);
        let (start, _) = session_bounds(at("2026-01-15 23:45"), &shift);
        assert_eq!(start, at("2026-01-16 00:30"));
    }

    #[test]
    fn test_minutes_until_end() {
        let shift = make_shift("09:00", "17:00", 10);
        let clock_in = at("2026-01-15 09:00");
        assert_eq!(minutes_until_end(at("2026-01-15 16:52"), clock_in, &shift, 0), 8);
        assert_eq!(minutes_until_end(at("2026-01-15 16:52"), clock_in, &shift, 30), 38);
        assert_eq!(minutes_until_end(at("2026-01-15 17:05"), clock_in, &shift, 0), -5);
    }

    #[test]
    fn test_minutes_until_end_rounds_partial_minutes_up() {
        let shift = make_shift("09:00", "17:00", 10);
        let clock_in = at("2026-01-15 09:00");
        let half_minute_left = at("2026-01-15 16:59") + Duration::seconds(30);
        assert_eq!(minutes_until_end(half_minute_left, clock_in, &shift, 0), 1);

        let just_past = at("2026-01-15 17:00") + Duration::seconds(30);
        assert_eq!(minutes_until_end(just_past, clock_in, &shift, 0), 0);
    }

    #[test]
    fn test_session_window_matches_day_window_without_extension() {
        let shift = make_shift("09:00", "17:00", 10);
        let clock_in = at("2026-01-15 09:00");
        assert!(is_session_within_window(at("2026-01-15 17:10"), clock_in, &shift, 0));
        assert!(!is_session_within_window(at("2026-01-15 17:11"), clock_in, &shift, 0));
        // Same time of day on the next morning belongs to another occurrence.
        assert!(!is_session_within_window(at("2026-01-16 10:00"), clock_in, &shift, 0));
    }

    #[test]
    fn test_session_window_overnight() {
        let shift = make_shift("22:00", "06:00", 0);
        let clock_in = at("2026-01-15 23:30");
        assert!(is_session_within_window(at("2026-01-16 03:00"), clock_in, &shift, 0));
        assert!(is_session_within_window(at("2026-01-16 06:00"), clock_in, &shift, 0));
        assert!(!is_session_within_window(at("2026-01-16 06:01"), clock_in, &shift, 0));
    }

    #[test]
    fn test_session_window_ends_after_day_long_extensions() {
        let shift = make_shift("09:00", "17:00", 10);
        let clock_in = at("2026-01-15 09:00");
        // 960 extra minutes push the span past a full day.
        assert!(is_within_window_extended(at("2026-01-18 12:00"), &shift, 960));
        assert!(is_session_within_window(at("2026-01-16 09:10"), clock_in, &shift, 960));
        assert!(!is_session_within_window(at("2026-01-16 09:11"), clock_in, &shift, 960));
        assert!(!is_session_within_window(at("2026-01-18 12:00"), clock_in, &shift, 960));
    }

    #[test]
    fn test_session_window_single_extension_does_not_reopen_next_morning() {
        let shift = make_shift("09:00", "17:00", 10);
        let clock_in = at("2026-01-15 09:00");
        // Ends 01:10 with 480 extra; 09:00 the next day repeats the time-of-day window.
        assert!(is_session_within_window(at("2026-01-16 01:10"), clock_in, &shift, 480));
        assert!(!is_session_within_window(at("2026-01-16 09:00"), clock_in, &shift, 480));
    }

    #[test]
    fn test_effective_end_time_wraps() {
        let shift = make_shift("16:00", "23:50", 0);
        assert_eq!(effective_end_time(&shift, 30).to_string(), "00:20");
        assert_eq!(effective_end_time(&shift, 0).to_string(), "23:50");
    }

    proptest! {
        #[test]
        fn prop_day_shift_matches_closed_interval(
            start in 60u32..700,
            length in 60u32..600,
            grace in 0u32..=60,
            now in 0u32..1440,
        ) {
            let end = start + length;
            prop_assume!(end + grace < 1440 && start >= grace);
            let mut shift = make_shift("00:00", "00:01", grace);
            shift.start_time = ShiftTime::from_minutes(start);
            shift.end_time = ShiftTime::from_minutes(end);

            let expected = start - grace <= now && now <= end + grace;
            prop_assert_eq!(is_within_window(on_day(now), &shift), expected);
        }

        #[test]
        fn prop_overnight_shift_matches_wrapped_interval(
            start in 1200u32..1380,
            end in 60u32..600,
            grace in 0u32..=60,
            now in 0u32..1440,
        ) {
            let mut shift = make_shift("00:00", "00:01", grace);
            shift.start_time = ShiftTime::from_minutes(start);
            shift.end_time = ShiftTime::from_minutes(end);

            let expected = now >= start - grace || now <= end + grace;
            prop_assert_eq!(is_within_window(on_day(now), &shift), expected);
        }
    }
}
