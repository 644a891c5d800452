//! Business timezone helpers
//!
//! Repositories only see `i64` Unix millis. Conversions to local dates and
//! business days happen here, with the store's day switch applied.

use chrono::{DateTime, NaiveDate, NaiveTime};
use chrono_tz::Tz;
use shared::time_utils::{self, DEFAULT_DAY_SWITCH};

/// Parse the stored day switch (HH:MM); falls back to 05:00
pub fn parse_day_switch(value: &str) -> NaiveTime {
    time_utils::parse_time(value).unwrap_or_else(|| {
        tracing::warn!(
            "Failed to parse day_switch_time '{}', falling back to {}",
            value,
            DEFAULT_DAY_SWITCH.format("%H:%M")
        );
        DEFAULT_DAY_SWITCH
    })
}

/// Business date a timestamp belongs to
///
/// Local time before the switch → still the previous business day.
pub fn business_date(millis: i64, day_switch: NaiveTime, tz: Tz) -> NaiveDate {
    let local = DateTime::from_timestamp_millis(millis)
        .unwrap_or_default()
        .with_timezone(&tz);
    if local.time() < day_switch {
        (local - chrono::Duration::days(1)).date_naive()
    } else {
        local.date_naive()
    }
}
