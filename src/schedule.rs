//! Usage schedule templates and their expansion to annual hourly series.
//!
//! A compact template (24-hour daily profiles, days off per week, days used
//! per year, a monthly usage fraction) is expanded into four 8760-hour
//! multiplier series: occupancy, devices, lighting and setpoint mode.

use anyhow::{Result, ensure};
use serde::{Deserialize, Serialize};

use crate::calendar::{DAYS_IN_MONTH, HOURS_PER_YEAR, MONTHS_PER_YEAR};

/// A 24-hour multiplier profile with a fallback for unoccupied days.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyProfile {
    /// Hourly multipliers for an occupied day.
    pub hourly: [f64; 24],
    /// Constant multiplier used for all 24 hours of an unoccupied day.
    pub unoccupied_default: f64,
}

impl DailyProfile {
    /// Creates a constant profile (same value occupied and unoccupied).
    pub fn constant(value: f64) -> Self {
        Self {
            hourly: [value; 24],
            unoccupied_default: value,
        }
    }
}

/// Compact description of how a room is used over the year.
///
/// `days_used_per_year` must equal `365 - days_off_per_week * 52`; the
/// template is rejected otherwise rather than silently corrected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageScheduleTemplate {
    pub occupancy: DailyProfile,
    pub devices: DailyProfile,
    pub lighting: DailyProfile,
    /// Setpoint mode profile: 1.0 = full setpoint, 0.5 = setback.
    pub setpoint_mode: DailyProfile,
    /// Non-working days per week (e.g. 2 for a five-day week).
    pub days_off_per_week: u32,
    /// Used days per year; must be consistent with `days_off_per_week`.
    pub days_used_per_year: u32,
    /// Fraction of each month's days that are "used" (12 values, 0..1).
    pub yearly_profile: [f64; 12],
}

impl UsageScheduleTemplate {
    /// A continuously used room with all multipliers at 1.0.
    pub fn always_on() -> Self {
        Self {
            occupancy: DailyProfile::constant(1.0),
            devices: DailyProfile::constant(1.0),
            lighting: DailyProfile::constant(1.0),
            setpoint_mode: DailyProfile::constant(1.0),
            days_off_per_week: 0,
            days_used_per_year: 365,
            yearly_profile: [1.0; 12],
        }
    }
}

/// Expanded annual schedules, one multiplier per hour of the year.
#[derive(Debug, Clone)]
pub struct ExpandedSchedules {
    pub occupancy: Vec<f64>,
    pub devices: Vec<f64>,
    pub lighting: Vec<f64>,
    pub setpoint_mode: Vec<f64>,
}

/// Expands a usage template into four 8760-hour multiplier series.
///
/// Months are iterated in calendar order. Within each month,
/// `days_on = round(month_days * yearly_profile[month])` days are used;
/// a day is unoccupied if it falls on a weekly day off (rolling weekday
/// counter starting at `year_start_weekday`, 0 = Monday) or past the
/// month's used-day count. Unoccupied days repeat the channel's
/// `unoccupied_default` for all 24 hours.
pub fn expand_schedules(
    template: &UsageScheduleTemplate,
    year_start_weekday: u32,
) -> Result<ExpandedSchedules> {
    ensure!(
        template.days_off_per_week <= 7,
        "days_off_per_week={} exceeds a week",
        template.days_off_per_week,
    );
    ensure!(
        365 - template.days_off_per_week * 52 == template.days_used_per_year,
        "inconsistent schedule template: days_off_per_week={} implies {} used days, \
         but days_used_per_year={}",
        template.days_off_per_week,
        365 - template.days_off_per_week * 52,
        template.days_used_per_year,
    );

    let mut occupancy = Vec::with_capacity(HOURS_PER_YEAR);
    let mut devices = Vec::with_capacity(HOURS_PER_YEAR);
    let mut lighting = Vec::with_capacity(HOURS_PER_YEAR);
    let mut setpoint_mode = Vec::with_capacity(HOURS_PER_YEAR);

    let first_weekday_off = 7 - template.days_off_per_week;
    let mut weekday = year_start_weekday % 7;

    for month in 0..MONTHS_PER_YEAR {
        let month_days = DAYS_IN_MONTH[month];
        let days_on = (month_days as f64 * template.yearly_profile[month]).round();

        for day in 1..=month_days {
            let unoccupied = weekday >= first_weekday_off || day as f64 > days_on;

            append_day(&mut occupancy, &template.occupancy, unoccupied);
            append_day(&mut devices, &template.devices, unoccupied);
            append_day(&mut lighting, &template.lighting, unoccupied);
            append_day(&mut setpoint_mode, &template.setpoint_mode, unoccupied);

            weekday = (weekday + 1) % 7;
        }
    }

    debug_assert_eq!(occupancy.len(), HOURS_PER_YEAR);
    Ok(ExpandedSchedules {
        occupancy,
        devices,
        lighting,
        setpoint_mode,
    })
}

fn append_day(series: &mut Vec<f64>, profile: &DailyProfile, unoccupied: bool) {
    if unoccupied {
        series.extend(std::iter::repeat_n(profile.unoccupied_default, 24));
    } else {
        series.extend_from_slice(&profile.hourly);
    }
}

/// Reconciliation multiplier that rescales a channel's load so the expanded
/// hourly shape preserves the specified annual full-load-hour total.
///
/// Returns `full_load_hours / sum(series)`, or 0.0 for an all-zero series
/// (a channel that is never on carries no load regardless of its rating).
pub fn annual_load_multiplier(series: &[f64], full_load_hours: f64) -> f64 {
    let total: f64 = series.iter().sum();
    if total > 0.0 && full_load_hours.is_finite() {
        full_load_hours / total
    } else {
        0.0
    }
}
