//! Reset windows for variable backs
//!
//! Tier counters accumulate from the start of the window that contains the
//! event's business date and start over in the next window.

use chrono::{Datelike, NaiveDate};
use shared::models::ResetPeriod;

/// First business date of the window containing `date`
///
/// Weeks start on Monday; half-months on the 1st and 16th; quarters in
/// January, April, July and October; half-years in January and July.
pub fn window_start(date: NaiveDate, period: ResetPeriod) -> NaiveDate {
    let first_of = |month: u32| NaiveDate::from_ymd_opt(date.year(), month, 1).unwrap_or(date);
    match period {
        ResetPeriod::Week => {
            date - chrono::Duration::days(i64::from(date.weekday().num_days_from_monday()))
        }
        ResetPeriod::HalfMonth => {
            let day = if date.day() >= 16 { 16 } else { 1 };
            date.with_day(day).unwrap_or(date)
        }
        ResetPeriod::Month => first_of(date.month()),
        ResetPeriod::Quarter => first_of((date.month0() / 3) * 3 + 1),
        ResetPeriod::HalfYear => first_of(if date.month() >= 7 { 7 } else { 1 }),
        ResetPeriod::Year => first_of(1),
    }
}
