//! Month navigation and month-close eligibility.

use api_types::month::Month;
use chrono::{Datelike, NaiveDate};

use crate::EngineError;

const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Three-letter English name of a 1-based month.
pub fn month_name(month: u32) -> Result<&'static str, EngineError> {
    month
        .checked_sub(1)
        .and_then(|idx| MONTH_NAMES.get(idx as usize))
        .copied()
        .ok_or_else(|| EngineError::InvalidMonth(format!("month {month} out of range")))
}

/// `"Mar 2026"`, or `"?? 2026"` for an out-of-range month.
pub fn month_label(year: i32, month: u32) -> String {
    format!("{} {year}", month_name(month).unwrap_or("??"))
}

/// Last calendar day of the given month.
pub fn last_day_of_month(year: i32, month: u32) -> Result<u32, EngineError> {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    let first_of_month = NaiveDate::from_ymd_opt(year, month, 1);
    let first_of_next = NaiveDate::from_ymd_opt(next_year, next_month, 1);
    match (first_of_month, first_of_next) {
        (Some(_), Some(next)) => next
            .pred_opt()
            .map(|last| last.day())
            .ok_or_else(|| EngineError::InvalidMonth(format!("{year}-{month}"))),
        _ => Err(EngineError::InvalidMonth(format!("{year}-{month}"))),
    }
}

/// A month can be closed only on the last day of the running calendar
/// month, and only once.
pub fn can_close(month: &Month, today: NaiveDate) -> bool {
    if month.is_closed {
        return false;
    }
    if month.year != today.year() || month.month != today.month() {
        return false;
    }
    last_day_of_month(today.year(), today.month()).is_ok_and(|last| today.day() == last)
}

/// Neighbours of the selected month in a newest-first month list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MonthNav {
    /// Next older month.
    pub prev: Option<i64>,
    /// Next newer month.
    pub next: Option<i64>,
}

impl MonthNav {
    pub fn new(months: &[Month], selected_id: i64) -> Self {
        let Some(idx) = months.iter().position(|m| m.id == selected_id) else {
            return Self::default();
        };
        Self {
            prev: months.get(idx + 1).map(|m| m.id),
            next: idx.checked_sub(1).and_then(|i| months.get(i)).map(|m| m.id),
        }
    }
}
