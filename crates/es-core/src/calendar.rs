//! Hour layout of a typical (non-leap) meteorological year.

use std::ops::Range;

/// Hours in a non-leap year; hourly series are indexed 0..8760.
pub const HOURS_PER_YEAR: usize = 8760;

pub const DAYS_PER_YEAR: usize = 365;

pub const MONTH_DAYS: [usize; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

pub const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Contiguous hour ranges for each calendar month, starting at hour 0.
pub fn month_hour_ranges() -> [Range<usize>; 12] {
    let mut offset = 0;
    MONTH_DAYS.map(|days| {
        let start = offset;
        offset += days * 24;
        start..offset
    })
}
