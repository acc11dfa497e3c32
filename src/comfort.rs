//! Indoor comfort setpoint resolution.
//!
//! Produces the upper/lower indoor temperature bound series the balance
//! engine works against, either from externally supplied adaptive-comfort
//! bounds or from fixed design setpoints with optional setback.

use anyhow::{Result, ensure};

use crate::calendar::{HOURS_PER_YEAR, MONTHS_PER_YEAR, month_hour_range};
use crate::properties::Horizon;

/// Resolved comfort bounds at the run resolution.
#[derive(Debug, Clone)]
pub struct ComfortBounds {
    /// Upper (cooling) bound per timestep in °C.
    pub upper_c: Vec<f64>,
    /// Lower (heating) bound per timestep in °C.
    pub lower_c: Vec<f64>,
}

/// Fixed design setpoints with optional setback values.
#[derive(Debug, Clone, Copy)]
pub struct FixedSetpoints {
    pub upper_c: f64,
    pub lower_c: f64,
    /// Setback bounds, applied during setback hours of the setpoint-mode
    /// schedule. `None` disables setback handling.
    pub setback_upper_c: Option<f64>,
    pub setback_lower_c: Option<f64>,
}

/// Resolves the comfort bound series for a run.
///
/// - With `adaptive` bounds supplied, they are passed through hourly, or
///   averaged per calendar month for monthly runs.
/// - Otherwise the fixed setpoints are replicated across the horizon. For
///   hourly runs with setback values, the `setpoint_mode` schedule selects
///   per hour: 1.0 = full setpoint, 0.5 = setback, anything else falls
///   back to the full setpoint. Monthly runs always use the full
///   setpoints; setback is an hourly concern.
pub fn resolve_comfort_bounds(
    horizon: Horizon,
    adaptive: Option<(&[f64], &[f64])>,
    fixed: FixedSetpoints,
    setpoint_mode: Option<&[f64]>,
) -> Result<ComfortBounds> {
    if let Some((upper_hourly, lower_hourly)) = adaptive {
        ensure!(
            upper_hourly.len() == HOURS_PER_YEAR && lower_hourly.len() == HOURS_PER_YEAR,
            "adaptive comfort bounds must be hourly (8760), got upper={} lower={}",
            upper_hourly.len(),
            lower_hourly.len(),
        );
        return Ok(match horizon {
            Horizon::Hourly => ComfortBounds {
                upper_c: upper_hourly.to_vec(),
                lower_c: lower_hourly.to_vec(),
            },
            Horizon::Monthly => ComfortBounds {
                upper_c: monthly_means(upper_hourly),
                lower_c: monthly_means(lower_hourly),
            },
        });
    }

    let n = horizon.len();
    let setback = match (fixed.setback_upper_c, fixed.setback_lower_c) {
        (Some(ub), Some(lb)) => Some((ub, lb)),
        _ => None,
    };

    match (horizon, setback, setpoint_mode) {
        (Horizon::Hourly, Some((setback_ub, setback_lb)), Some(mode)) => {
            ensure!(
                mode.len() == HOURS_PER_YEAR,
                "setpoint mode schedule must be hourly (8760), got {}",
                mode.len(),
            );
            let mut upper_c = Vec::with_capacity(n);
            let mut lower_c = Vec::with_capacity(n);
            for &m in mode {
                if (m - 0.5).abs() < 1e-9 {
                    upper_c.push(setback_ub);
                    lower_c.push(setback_lb);
                } else {
                    upper_c.push(fixed.upper_c);
                    lower_c.push(fixed.lower_c);
                }
            }
            Ok(ComfortBounds { upper_c, lower_c })
        }
        _ => Ok(ComfortBounds {
            upper_c: vec![fixed.upper_c; n],
            lower_c: vec![fixed.lower_c; n],
        }),
    }
}

/// Arithmetic mean of an hourly series over each calendar month.
pub fn monthly_means(hourly: &[f64]) -> Vec<f64> {
    let mut means = Vec::with_capacity(MONTHS_PER_YEAR);
    for month in 0..MONTHS_PER_YEAR {
        let range = month_hour_range(month);
        let hours = range.len() as f64;
        let sum: f64 = hourly[range].iter().sum();
        means.push(sum / hours);
    }
    means
}
