//! Result series, unit conversion and monthly roll-ups.

use crate::calendar::{MONTHS_PER_YEAR, month_hour_range};
use crate::properties::Horizon;
use crate::solar::monthly_sums;

/// Demand and loss/gain breakdown of one zone for one run.
///
/// All series are parallel, kWh-denominated and share the run horizon
/// (12 or 8760 entries). Produced fresh by each run; read-only afterwards.
#[derive(Debug, Clone)]
pub struct DemandResultSeries {
    pub horizon: Horizon,
    /// Heating demand per timestep, ≥ 0.
    pub heating_kwh: Vec<f64>,
    /// Cooling demand per timestep, ≤ 0.
    pub cooling_kwh: Vec<f64>,
    /// Electricity demand (lighting + devices) per timestep, ≥ 0.
    pub electricity_kwh: Vec<f64>,
    /// Domestic hot water heat demand per timestep, ≥ 0.
    pub dhw_kwh: Vec<f64>,
    /// Transmission losses through opaque surfaces.
    pub transmission_opaque_kwh: Vec<f64>,
    /// Transmission losses through windows.
    pub transmission_transparent_kwh: Vec<f64>,
    /// Ventilation losses of the winning ventilation variant.
    pub ventilation_kwh: Vec<f64>,
    /// Internal gains entering the balance.
    pub internal_gains_kwh: Vec<f64>,
    /// Solar gains entering the balance.
    pub solar_gains_kwh: Vec<f64>,
    /// Transmitted solar gain per window, `[window][timestep]`, for
    /// diagnostics and visualization.
    pub solar_gains_per_window_kwh: Vec<Vec<f64>>,
}

/// Annual totals and peaks derived from a result series.
#[derive(Debug, Clone)]
pub struct AnnualSummary {
    pub heating_kwh: f64,
    pub cooling_kwh: f64,
    pub electricity_kwh: f64,
    pub dhw_kwh: f64,
    /// Largest single-timestep heating demand in kWh.
    pub peak_heating_kwh: f64,
    /// Largest single-timestep cooling demand in kWh (magnitude).
    pub peak_cooling_kwh: f64,
    pub monthly_heating_kwh: [f64; 12],
    pub monthly_cooling_kwh: [f64; 12],
}

impl DemandResultSeries {
    /// Rolls the series up into annual totals, peaks and monthly tables.
    pub fn annual_summary(&self) -> AnnualSummary {
        let mut monthly_heating = [0.0; MONTHS_PER_YEAR];
        let mut monthly_cooling = [0.0; MONTHS_PER_YEAR];
        match self.horizon {
            Horizon::Monthly => {
                for month in 0..MONTHS_PER_YEAR {
                    monthly_heating[month] = self.heating_kwh[month];
                    monthly_cooling[month] = self.cooling_kwh[month];
                }
            }
            Horizon::Hourly => {
                for month in 0..MONTHS_PER_YEAR {
                    let range = month_hour_range(month);
                    monthly_heating[month] = self.heating_kwh[range.clone()].iter().sum();
                    monthly_cooling[month] = self.cooling_kwh[range].iter().sum();
                }
            }
        }

        let peak = |series: &[f64]| series.iter().cloned().fold(0.0_f64, f64::max);
        AnnualSummary {
            heating_kwh: self.heating_kwh.iter().sum(),
            cooling_kwh: self.cooling_kwh.iter().sum(),
            electricity_kwh: self.electricity_kwh.iter().sum(),
            dhw_kwh: self.dhw_kwh.iter().sum(),
            peak_heating_kwh: peak(&self.heating_kwh),
            peak_cooling_kwh: peak(&self.cooling_kwh.iter().map(|c| -c).collect::<Vec<_>>()),
            monthly_heating_kwh: monthly_heating,
            monthly_cooling_kwh: monthly_cooling,
        }
    }
}

/// Converts a Wh series to kWh in place-compatible form.
pub fn wh_to_kwh(series: Vec<f64>) -> Vec<f64> {
    series.into_iter().map(|v| v / 1000.0).collect()
}

/// Reduces an hourly energy series (Wh or kWh) to monthly sums.
pub fn monthly_energy(hourly: &[f64]) -> Vec<f64> {
    monthly_sums(hourly)
}
