//! Assembled simulation input and its fail-fast validation.

use anyhow::{Result, ensure};
use serde::{Deserialize, Serialize};

use crate::calendar::{HOURS_PER_YEAR, MONTHS_PER_YEAR};
use crate::properties::{Horizon, RoomThermalProperties, Surface};
use crate::schedule::UsageScheduleTemplate;
use crate::solar::SolarGainInput;

/// Everything one zone run needs, already adapted from the host side
/// (property catalogs, geometry, irradiance simulation) into plain typed
/// data. The run never mutates its input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationInput {
    pub properties: RoomThermalProperties,
    pub template: UsageScheduleTemplate,
    /// Weekday of January 1st, 0 = Monday.
    pub year_start_weekday: u32,
    /// Heated floor area in m².
    pub floor_area_m2: f64,
    /// Hourly ambient dry-bulb temperature in °C, 8760 values. Monthly
    /// runs reduce this to per-month means internally.
    pub ambient_c: Vec<f64>,
    /// Adaptive-comfort upper bound in °C, hourly, when adaptive comfort
    /// is in use.
    pub adaptive_upper_c: Option<Vec<f64>>,
    /// Adaptive-comfort lower bound in °C, hourly.
    pub adaptive_lower_c: Option<Vec<f64>>,
    /// Envelope surfaces; the `Window` entries correspond positionally to
    /// the per-window irradiance series in `solar`.
    pub surfaces: Vec<Surface>,
    pub solar: SolarGainInput,
    /// Use the obstructed irradiance variant.
    pub run_obstructed: bool,
    /// Hourly (8760) instead of monthly (12) resolution.
    pub hourly: bool,
    pub use_adaptive_comfort: bool,
    pub use_natural_ventilation: bool,
    pub use_fixed_time_constant: bool,
}

impl SimulationInput {
    pub fn horizon(&self) -> Horizon {
        if self.hourly {
            Horizon::Hourly
        } else {
            Horizon::Monthly
        }
    }

    /// Number of window surfaces, in irradiance branch order.
    pub fn window_count(&self) -> usize {
        self.surfaces
            .iter()
            .filter(|s| s.surface_type.is_transparent())
            .count()
    }

    /// Checks every input contract before any computation starts.
    ///
    /// Length mismatches are contract violations and fail fast; numeric
    /// oddities inside the values (NaN properties) are not errors and are
    /// sanitized later.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.floor_area_m2.is_finite() && self.floor_area_m2 > 0.0,
            "floor area must be positive, got {}",
            self.floor_area_m2,
        );
        ensure!(
            self.ambient_c.len() == HOURS_PER_YEAR,
            "ambient temperature must be hourly (8760), got {}",
            self.ambient_c.len(),
        );

        if self.use_adaptive_comfort {
            let (Some(upper), Some(lower)) = (&self.adaptive_upper_c, &self.adaptive_lower_c)
            else {
                anyhow::bail!("adaptive comfort requested but bound series are missing");
            };
            ensure!(
                upper.len() == HOURS_PER_YEAR && lower.len() == HOURS_PER_YEAR,
                "adaptive comfort bounds must be hourly (8760), got upper={} lower={}",
                upper.len(),
                lower.len(),
            );
        }

        let windows = self.window_count();
        for (label, series) in [
            ("obstructed", &self.solar.irradiance_obstructed),
            ("unobstructed", &self.solar.irradiance_unobstructed),
        ] {
            ensure!(
                series.len() == windows,
                "{label} irradiance has {} branches but the envelope has {windows} windows",
                series.len(),
            );
            for (w, branch) in series.iter().enumerate() {
                ensure!(
                    branch.len() == HOURS_PER_YEAR || branch.len() == MONTHS_PER_YEAR,
                    "{label} irradiance for window {w} has {} values, expected 12 or 8760",
                    branch.len(),
                );
                ensure!(
                    !(self.hourly && branch.len() == MONTHS_PER_YEAR),
                    "{label} irradiance for window {w} is monthly but an hourly run was requested",
                );
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::properties::SurfaceType;

    fn minimal_input() -> SimulationInput {
        SimulationInput {
            properties: RoomThermalProperties::default(),
            template: UsageScheduleTemplate::always_on(),
            year_start_weekday: 0,
            floor_area_m2: 20.0,
            ambient_c: vec![5.0; 8760],
            adaptive_upper_c: None,
            adaptive_lower_c: None,
            surfaces: vec![Surface {
                area_m2: 60.0,
                surface_type: SurfaceType::Wall,
            }],
            solar: SolarGainInput::none(),
            run_obstructed: false,
            hourly: false,
            use_adaptive_comfort: false,
            use_natural_ventilation: false,
            use_fixed_time_constant: true,
        }
    }

    #[test]
    fn test_minimal_input_validates() {
        minimal_input().validate().unwrap();
    }

    #[test]
    fn test_wrong_ambient_length_rejected() {
        let mut input = minimal_input();
        input.ambient_c = vec![5.0; 12];
        let err = input.validate().unwrap_err();
        assert!(err.to_string().contains("8760"), "{err}");
    }

    #[test]
    fn test_adaptive_flag_requires_bounds() {
        let mut input = minimal_input();
        input.use_adaptive_comfort = true;
        let err = input.validate().unwrap_err();
        assert!(err.to_string().contains("missing"), "{err}");

        input.adaptive_upper_c = Some(vec![27.0; 8760]);
        input.adaptive_lower_c = Some(vec![20.0; 100]);
        let err = input.validate().unwrap_err();
        assert!(err.to_string().contains("lower=100"), "{err}");
    }

    #[test]
    fn test_irradiance_branch_count_must_match_windows() {
        let mut input = minimal_input();
        input.surfaces.push(Surface {
            area_m2: 4.0,
            surface_type: SurfaceType::Window,
        });
        // One window, zero branches.
        let err = input.validate().unwrap_err();
        assert!(err.to_string().contains("1 windows"), "{err}");

        input.solar.irradiance_obstructed = vec![vec![0.0; 12]];
        input.solar.irradiance_unobstructed = vec![vec![0.0; 12]];
        input.validate().unwrap();
    }

    #[test]
    fn test_monthly_irradiance_rejected_for_hourly_run() {
        let mut input = minimal_input();
        input.hourly = true;
        input.surfaces.push(Surface {
            area_m2: 4.0,
            surface_type: SurfaceType::Window,
        });
        input.solar.irradiance_obstructed = vec![vec![0.0; 12]];
        input.solar.irradiance_unobstructed = vec![vec![0.0; 12]];
        let err = input.validate().unwrap_err();
        assert!(err.to_string().contains("hourly run"), "{err}");
    }
}
