//! # Temporal Helpers — Business-Day Arithmetic
//!
//! Business-day distance calculations backing the TRID timing checks.
//! Regulatory timing windows ("within 3 business days of application")
//! count Monday through Friday; federal holidays are out of scope for
//! this layer and handled operationally.
//!
//! Determinism: these functions are pure. Callers supply both endpoints;
//! nothing here reads a clock.

use chrono::{Datelike, NaiveDate, Weekday};

/// Whether the given date falls on a business day (Mon–Fri).
pub fn is_business_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Number of business days between two dates.
///
/// Counts the business days strictly after `from` up to and including
/// `to`. The direction is normalized, so the result is symmetric:
/// `business_days_between(a, b) == business_days_between(b, a)`.
///
/// A disclosure dated exactly N business days after application yields a
/// distance of N — timing rules compare with `> N`, so the boundary day
/// itself is compliant.
pub fn business_days_between(from: NaiveDate, to: NaiveDate) -> u32 {
    let (start, end) = if from <= to { (from, to) } else { (to, from) };
    let mut count = 0;
    let mut day = start;
    while day < end {
        day = day + chrono::Duration::days(1);
        if is_business_day(day) {
            count += 1;
        }
    }
    count
}
