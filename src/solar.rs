//! Transmitted solar heat gains per window.
//!
//! Converts per-window incident irradiance into transmitted gains through
//! the glazing, switching to a shading-engaged g-value when the specific
//! irradiance exceeds the shading activation threshold.

use anyhow::{Result, ensure};
use serde::{Deserialize, Serialize};

use crate::calendar::{HOURS_PER_YEAR, MONTHS_PER_YEAR, month_hour_range};
use crate::properties::Horizon;

/// Per-window irradiance input for a run.
///
/// Each inner series is indexed `[window][timestep]` and holds incident
/// irradiance on the whole window in W (hourly, 8760 values) or Wh
/// (monthly, 12 values). The obstructed variant accounts for external
/// shading context; the `run_obstructed` flag selects which one is used.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolarGainInput {
    pub irradiance_obstructed: Vec<Vec<f64>>,
    pub irradiance_unobstructed: Vec<Vec<f64>>,
    /// Glazing transmittance without shading, 0..1.
    pub g_value: f64,
    /// Glazing transmittance with shading engaged, 0..1.
    pub g_value_shaded: f64,
    /// Specific irradiance above which shading engages, in W/m².
    pub shading_threshold_w_per_m2: f64,
}

impl SolarGainInput {
    /// Input for a zone without windows.
    pub fn none() -> Self {
        Self {
            irradiance_obstructed: Vec::new(),
            irradiance_unobstructed: Vec::new(),
            g_value: 0.0,
            g_value_shaded: 0.0,
            shading_threshold_w_per_m2: 0.0,
        }
    }
}

/// Aggregated transmitted solar gains at the run resolution, in Wh.
#[derive(Debug, Clone)]
pub struct SolarGains {
    /// Transmitted gain per window, indexed `[window][timestep]`.
    pub per_window_wh: Vec<Vec<f64>>,
    /// Sum across windows per timestep.
    pub total_wh: Vec<f64>,
}

/// Computes transmitted solar gains for every window and their total.
///
/// Per window and timestep: `specific = irradiance / area`; shading
/// engages strictly above the threshold (a value exactly at the threshold
/// keeps the base g-value); the transmitted gain is `specific * g * area`.
/// Hourly input is reduced to monthly sums after the per-hour g-value
/// switch when a monthly horizon is requested. Without windows the result
/// is all zeros at the requested length.
pub fn aggregate_solar_gains(
    irradiance: &[Vec<f64>],
    window_areas_m2: &[f64],
    g_value: f64,
    g_value_shaded: f64,
    shading_threshold_w_per_m2: f64,
    horizon: Horizon,
) -> Result<SolarGains> {
    ensure!(
        irradiance.len() == window_areas_m2.len(),
        "irradiance branches ({}) must match window count ({})",
        irradiance.len(),
        window_areas_m2.len(),
    );

    let n = horizon.len();
    if irradiance.is_empty() {
        return Ok(SolarGains {
            per_window_wh: Vec::new(),
            total_wh: vec![0.0; n],
        });
    }

    let input_len = irradiance[0].len();
    ensure!(
        input_len == HOURS_PER_YEAR || input_len == MONTHS_PER_YEAR,
        "per-window irradiance must have 12 or 8760 values, got {input_len}",
    );
    ensure!(
        !(horizon == Horizon::Hourly && input_len == MONTHS_PER_YEAR),
        "hourly output requires hourly irradiance input",
    );
    for (w, series) in irradiance.iter().enumerate() {
        ensure!(
            series.len() == input_len,
            "irradiance series for window {w} has {} values, expected {input_len}",
            series.len(),
        );
    }

    let mut per_window_wh = Vec::with_capacity(irradiance.len());
    for (series, &area) in irradiance.iter().zip(window_areas_m2) {
        let gains: Vec<f64> = series
            .iter()
            .map(|&incident| {
                transmitted_gain(
                    incident,
                    area,
                    g_value,
                    g_value_shaded,
                    shading_threshold_w_per_m2,
                )
            })
            .collect();
        let gains = match (horizon, input_len) {
            (Horizon::Monthly, HOURS_PER_YEAR) => monthly_sums(&gains),
            _ => gains,
        };
        per_window_wh.push(gains);
    }

    let mut total_wh = vec![0.0; n];
    for gains in &per_window_wh {
        for (t, &g) in gains.iter().enumerate() {
            total_wh[t] += g;
        }
    }

    Ok(SolarGains {
        per_window_wh,
        total_wh,
    })
}

fn transmitted_gain(
    incident_w: f64,
    area_m2: f64,
    g_value: f64,
    g_value_shaded: f64,
    threshold_w_per_m2: f64,
) -> f64 {
    if area_m2 <= 0.0 {
        return 0.0;
    }
    let specific = incident_w / area_m2;
    let g = if specific > threshold_w_per_m2 {
        g_value_shaded
    } else {
        g_value
    };
    specific * g * area_m2
}

/// Sum of an hourly series over each calendar month.
pub fn monthly_sums(hourly: &[f64]) -> Vec<f64> {
    let mut sums = Vec::with_capacity(MONTHS_PER_YEAR);
    for month in 0..MONTHS_PER_YEAR {
        sums.push(hourly[month_hour_range(month)].iter().sum());
    }
    sums
}
