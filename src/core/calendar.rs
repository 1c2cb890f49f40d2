//! Age-year bookkeeping.
//!
//! An age year runs from one birthday month to the month before the next.
//! Every calendar month maps to the label of the age year it falls in, and
//! the month before the birth month closes the bucket.

use chrono::{Datelike, NaiveDate};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgeYearPosition {
    pub label: i32,
    pub is_boundary: bool,
}

/// `calendar_month` and `birth_month` are 1-based.
pub fn age_year_position(calendar_year: i32, calendar_month: u32, birth_month: u32) -> AgeYearPosition {
    let label = if calendar_month < birth_month {
        calendar_year
    } else {
        calendar_year + 1
    };
    let boundary_month = if birth_month <= 1 { 12 } else { birth_month - 1 };
    AgeYearPosition {
        label,
        is_boundary: calendar_month == boundary_month,
    }
}

/// Plain Jan-Dec buckets used when no birth date is known.
pub fn calendar_year_position(calendar_year: i32, calendar_month: u32) -> AgeYearPosition {
    AgeYearPosition {
        label: calendar_year,
        is_boundary: calendar_month == 12,
    }
}

/// Age during the age year labelled `label`. Only the birth month is
/// considered, never the day.
pub fn age_for_label(label: i32, birth_year: i32) -> u32 {
    (label - birth_year - 1).max(0) as u32
}

pub fn next_month(year: i32, month: u32) -> (i32, u32) {
    if month >= 12 { (year + 1, 1) } else { (year, month + 1) }
}

/// Label of the age year containing `date`.
pub fn label_for_date(date: NaiveDate, birth_month: Option<u32>) -> i32 {
    match birth_month {
        Some(birth_month) => age_year_position(date.year(), date.month(), birth_month).label,
        None => date.year(),
    }
}
