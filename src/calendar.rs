//! Calendar tables for a standard 365-day, 8760-hour year.

/// Hours in a non-leap year.
pub const HOURS_PER_YEAR: usize = 8760;

/// Months in a year.
pub const MONTHS_PER_YEAR: usize = 12;

/// Days in each calendar month (non-leap year).
pub const DAYS_IN_MONTH: [usize; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// Hours in each calendar month (non-leap year).
pub const HOURS_IN_MONTH: [usize; 12] = [
    744, 672, 744, 720, 744, 720, 744, 744, 720, 744, 720, 744,
];

/// Returns the half-open hour-of-year range `[start, end)` covered by a month (0-11).
pub fn month_hour_range(month: usize) -> std::ops::Range<usize> {
    let start: usize = HOURS_IN_MONTH[..month].iter().sum();
    start..start + HOURS_IN_MONTH[month]
}

/// Returns the month index (0-11) containing a given hour of the year (0-8759).
pub fn month_of_hour(hour_of_year: usize) -> usize {
    let mut remaining = hour_of_year;
    for (month, &hours) in HOURS_IN_MONTH.iter().enumerate() {
        if remaining < hours {
            return month;
        }
        remaining -= hours;
    }
    11
}
