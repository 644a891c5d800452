//! Day-switch aware time ordering
//!
//! A night shift runs past midnight: with a day switch of 05:00, a cast who
//! starts at 00:30 came *after* one who started at 23:00. Times of day are
//! normalized to minutes with everything before the switch pushed into the
//! next day (+1440), which gives a plain sortable key.

use chrono::{DateTime, NaiveTime, Timelike};
use chrono_tz::Tz;

use crate::models::CastAssignment;

const MINUTES_PER_DAY: u32 = 24 * 60;

/// Default business-day switch (05:00)
pub const DEFAULT_DAY_SWITCH: NaiveTime = match NaiveTime::from_hms_opt(5, 0, 0) {
    Some(t) => t,
    None => panic!("invalid default day switch"),
};

/// Parse `HH:MM` or `HH:MM:SS`
pub fn parse_time(s: &str) -> Option<NaiveTime> {
    let s = s.trim();
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .ok()
}

/// Minute-of-day of `time`, shifted by a day when it falls before `day_switch`
pub fn time_value(time: NaiveTime, day_switch: NaiveTime) -> u32 {
    let minutes = time.hour() * 60 + time.minute();
    if time < day_switch {
        minutes + MINUTES_PER_DAY
    } else {
        minutes
    }
}

/// String form of [`time_value`]
///
/// An unparsable day switch falls back to [`DEFAULT_DAY_SWITCH`]; an
/// unparsable time yields `None`.
pub fn time_value_str(time: &str, day_switch: &str) -> Option<u32> {
    let switch = parse_time(day_switch).unwrap_or(DEFAULT_DAY_SWITCH);
    parse_time(time).map(|t| time_value(t, switch))
}

/// Local time of day for a Unix-millis timestamp
pub fn local_time_of(millis: i64, tz: Tz) -> Option<NaiveTime> {
    DateTime::from_timestamp_millis(millis).map(|dt| dt.with_timezone(&tz).time())
}

/// Sort assignments by normalized start time
///
/// The sort is stable; assignments without a start time go last.
pub fn sort_casts_by_time(assignments: &mut [CastAssignment], day_switch: NaiveTime, tz: Tz) {
    assignments.sort_by_key(|a| {
        let key = a
            .start_time
            .and_then(|ms| local_time_of(ms, tz))
            .map(|t| time_value(t, day_switch));
        (key.is_none(), key)
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CastStatus;
    use chrono::{NaiveDate, TimeZone};

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn assignment(id: i64, start: Option<i64>) -> CastAssignment {
        CastAssignment {
            id,
            store_id: 1,
            table_session_id: 1,
            cast_id: id,
            guest_id: None,
            status: CastStatus::Serving,
            grid_x: 0,
            grid_y: 0,
            start_time: start,
            end_time: None,
            created_at: 0,
            updated_at: 0,
        }
    }

    fn utc_millis(day: u32, h: u32, m: u32) -> i64 {
        chrono::Utc
            .from_utc_datetime(
                &NaiveDate::from_ymd_opt(2024, 1, day)
                    .unwrap()
                    .and_hms_opt(h, m, 0)
                    .unwrap(),
            )
            .timestamp_millis()
    }

    #[test]
    fn test_parse_time() {
        assert_eq!(parse_time("05:00"), Some(hm(5, 0)));
        assert_eq!(parse_time("23:15:30"), NaiveTime::from_hms_opt(23, 15, 30));
        assert_eq!(parse_time("25:00"), None);
        assert_eq!(parse_time("abc"), None);
    }

    #[test]
    fn test_time_value_around_switch() {
        assert_eq!(time_value(hm(4, 59), DEFAULT_DAY_SWITCH), 1739);
        assert_eq!(time_value(hm(5, 0), DEFAULT_DAY_SWITCH), 300);
        assert_eq!(time_value(hm(0, 0), DEFAULT_DAY_SWITCH), 1440);
        assert_eq!(time_value(hm(23, 59), DEFAULT_DAY_SWITCH), 1439);
    }

    #[test]
    fn test_time_value_str() {
        assert_eq!(time_value_str("04:59", "05:00"), Some(1739));
        assert_eq!(time_value_str("05:00", "05:00"), Some(300));
        // bad switch falls back to 05:00
        assert_eq!(time_value_str("04:59", "nope"), Some(1739));
        assert_eq!(time_value_str("nope", "05:00"), None);
    }

    #[test]
    fn test_sort_across_midnight() {
        let mut list = vec![
            assignment(3, Some(utc_millis(2, 4, 0))),
            assignment(1, Some(utc_millis(1, 23, 0))),
            assignment(2, Some(utc_millis(2, 0, 30))),
        ];
        sort_casts_by_time(&mut list, DEFAULT_DAY_SWITCH, chrono_tz::UTC);
        let ids: Vec<i64> = list.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_sort_missing_start_last_and_stable() {
        let mut list = vec![
            assignment(1, None),
            assignment(2, Some(utc_millis(1, 22, 0))),
            assignment(3, None),
            assignment(4, Some(utc_millis(1, 22, 0))),
        ];
        sort_casts_by_time(&mut list, DEFAULT_DAY_SWITCH, chrono_tz::UTC);
        let ids: Vec<i64> = list.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![2, 4, 1, 3]);
    }

    #[test]
    fn test_sort_uses_business_timezone() {
        // 15:30 UTC is 00:30 in Tokyo, after 23:00 Tokyo (14:00 UTC)
        let mut list = vec![
            assignment(2, Some(utc_millis(1, 15, 30))),
            assignment(1, Some(utc_millis(1, 14, 0))),
        ];
        sort_casts_by_time(&mut list, DEFAULT_DAY_SWITCH, chrono_tz::Asia::Tokyo);
        let ids: Vec<i64> = list.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }
}
