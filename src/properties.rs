//! Static zone properties: thermal parameters and envelope surfaces.

use serde::{Deserialize, Serialize};

use crate::calendar::{HOURS_PER_YEAR, MONTHS_PER_YEAR};

/// Time resolution of a simulation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Horizon {
    /// 12 values, one per calendar month.
    Monthly,
    /// 8760 values, one per hour of the year.
    Hourly,
}

impl Horizon {
    /// Number of timesteps in a run at this resolution.
    pub fn len(&self) -> usize {
        match self {
            Horizon::Monthly => MONTHS_PER_YEAR,
            Horizon::Hourly => HOURS_PER_YEAR,
        }
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Envelope surface classification.
///
/// `Window` is the only transparent type; all others are opaque and use
/// their respective U-values from [`RoomThermalProperties`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SurfaceType {
    Wall,
    Roof,
    Floor,
    Window,
}

impl SurfaceType {
    pub fn is_transparent(&self) -> bool {
        matches!(self, SurfaceType::Window)
    }
}

/// One envelope surface: an area tagged with its type.
///
/// Surfaces are identified by their position in the surface list; every
/// per-window series elsewhere (irradiance, solar gains) follows the same
/// ordering as the `Window` entries here.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Surface {
    /// Surface area in m².
    pub area_m2: f64,
    pub surface_type: SurfaceType,
}

/// Room-specific thermal parameters, immutable for a simulation run.
///
/// All NaN or infinite values are treated as 0.0 by [`Self::sanitized`];
/// callers adapting external property dictionaries should not need to
/// pre-clean their data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomThermalProperties {
    /// Building time constant in h, used when a fixed time constant is requested.
    pub time_constant_h: f64,
    /// Heat capacitance per floor area in Wh/(m²·K).
    pub capacitance_wh_per_m2_k: f64,
    /// U-value of opaque floor surfaces in W/(m²·K).
    pub u_value_floor: f64,
    /// U-value of opaque roof surfaces in W/(m²·K).
    pub u_value_roof: f64,
    /// U-value of opaque wall surfaces in W/(m²·K).
    pub u_value_wall: f64,
    /// U-value of windows in W/(m²·K).
    pub u_value_window: f64,
    /// Specific outdoor air flow for mechanical ventilation in m³/(m²·h).
    pub vdot_ventilation_m3_per_m2_h: f64,
    /// Specific outdoor air flow for infiltration in m³/(m²·h).
    pub vdot_infiltration_m3_per_m2_h: f64,
    /// Heat recovery effectiveness of the ventilation system, 0..1.
    pub heat_recovery_effectiveness: f64,
    /// Occupant heat load per floor area in W/m².
    pub occupant_load_w_per_m2: f64,
    /// Lighting heat load per floor area in W/m².
    pub lighting_load_w_per_m2: f64,
    /// Device (equipment) heat load per floor area in W/m².
    pub device_load_w_per_m2: f64,
    /// Annual full-load hours of occupancy in h/yr.
    pub occupant_full_load_hours: f64,
    /// Annual full-load hours of lighting in h/yr.
    pub lighting_full_load_hours: f64,
    /// Annual full-load hours of devices in h/yr.
    pub device_full_load_hours: f64,
    /// Annual domestic hot water demand per floor area in kWh/(m²·yr).
    pub dhw_annual_kwh_per_m2: f64,
    /// Design cooling setpoint (upper comfort bound) in °C.
    pub setpoint_upper_c: f64,
    /// Design heating setpoint (lower comfort bound) in °C.
    pub setpoint_lower_c: f64,
    /// Setback cooling setpoint in °C, used during setback hours.
    pub setback_upper_c: f64,
    /// Setback heating setpoint in °C, used during setback hours.
    pub setback_lower_c: f64,
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

impl RoomThermalProperties {
    /// Returns a copy with every non-finite field replaced by 0.0.
    ///
    /// External property catalogs occasionally carry NaN for parameters a
    /// room does not use (e.g. heat recovery in an unventilated room); a
    /// zero there is the physically inert choice.
    pub fn sanitized(&self) -> Self {
        Self {
            time_constant_h: finite_or_zero(self.time_constant_h),
            capacitance_wh_per_m2_k: finite_or_zero(self.capacitance_wh_per_m2_k),
            u_value_floor: finite_or_zero(self.u_value_floor),
            u_value_roof: finite_or_zero(self.u_value_roof),
            u_value_wall: finite_or_zero(self.u_value_wall),
            u_value_window: finite_or_zero(self.u_value_window),
            vdot_ventilation_m3_per_m2_h: finite_or_zero(self.vdot_ventilation_m3_per_m2_h),
            vdot_infiltration_m3_per_m2_h: finite_or_zero(self.vdot_infiltration_m3_per_m2_h),
            heat_recovery_effectiveness: finite_or_zero(self.heat_recovery_effectiveness)
                .clamp(0.0, 1.0),
            occupant_load_w_per_m2: finite_or_zero(self.occupant_load_w_per_m2),
            lighting_load_w_per_m2: finite_or_zero(self.lighting_load_w_per_m2),
            device_load_w_per_m2: finite_or_zero(self.device_load_w_per_m2),
            occupant_full_load_hours: finite_or_zero(self.occupant_full_load_hours),
            lighting_full_load_hours: finite_or_zero(self.lighting_full_load_hours),
            device_full_load_hours: finite_or_zero(self.device_full_load_hours),
            dhw_annual_kwh_per_m2: finite_or_zero(self.dhw_annual_kwh_per_m2),
            setpoint_upper_c: finite_or_zero(self.setpoint_upper_c),
            setpoint_lower_c: finite_or_zero(self.setpoint_lower_c),
            setback_upper_c: finite_or_zero(self.setback_upper_c),
            setback_lower_c: finite_or_zero(self.setback_lower_c),
        }
    }

    /// U-value for a surface type in W/(m²·K).
    pub fn u_value(&self, surface_type: SurfaceType) -> f64 {
        match surface_type {
            SurfaceType::Wall => self.u_value_wall,
            SurfaceType::Roof => self.u_value_roof,
            SurfaceType::Floor => self.u_value_floor,
            SurfaceType::Window => self.u_value_window,
        }
    }
}

impl Default for RoomThermalProperties {
    /// A plain mid-weight room: moderately insulated, mechanically
    /// ventilated without heat recovery, office-like internal loads.
    fn default() -> Self {
        Self {
            time_constant_h: 60.0,
            capacitance_wh_per_m2_k: 40.0,
            u_value_floor: 0.3,
            u_value_roof: 0.25,
            u_value_wall: 0.3,
            u_value_window: 1.3,
            vdot_ventilation_m3_per_m2_h: 1.0,
            vdot_infiltration_m3_per_m2_h: 0.15,
            heat_recovery_effectiveness: 0.0,
            occupant_load_w_per_m2: 5.0,
            lighting_load_w_per_m2: 10.0,
            device_load_w_per_m2: 7.0,
            occupant_full_load_hours: 2400.0,
            lighting_full_load_hours: 2250.0,
            device_full_load_hours: 2750.0,
            dhw_annual_kwh_per_m2: 13.5,
            setpoint_upper_c: 26.0,
            setpoint_lower_c: 21.0,
            setback_upper_c: 28.0,
            setback_lower_c: 19.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_horizon_len() {
        assert_eq!(Horizon::Monthly.len(), 12);
        assert_eq!(Horizon::Hourly.len(), 8760);
    }

    #[test]
    fn test_sanitized_replaces_nan() {
        let props = RoomThermalProperties {
            heat_recovery_effectiveness: f64::NAN,
            u_value_wall: f64::INFINITY,
            ..Default::default()
        };
        let clean = props.sanitized();
        assert_eq!(clean.heat_recovery_effectiveness, 0.0);
        assert_eq!(clean.u_value_wall, 0.0);
        assert!((clean.u_value_window - 1.3).abs() < 1e-12, "finite fields untouched");
    }

    #[test]
    fn test_heat_recovery_clamped() {
        let props = RoomThermalProperties {
            heat_recovery_effectiveness: 1.4,
            ..Default::default()
        };
        assert_eq!(props.sanitized().heat_recovery_effectiveness, 1.0);
    }

    #[test]
    fn test_u_value_by_surface_type() {
        let props = RoomThermalProperties::default();
        assert_eq!(props.u_value(SurfaceType::Window), props.u_value_window);
        assert_eq!(props.u_value(SurfaceType::Roof), props.u_value_roof);
        assert!(SurfaceType::Window.is_transparent());
        assert!(!SurfaceType::Floor.is_transparent());
    }
}
