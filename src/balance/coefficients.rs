//! Static heat-transfer coefficients, computed once per run.

use crate::properties::{RoomThermalProperties, Surface};

/// Specific heat capacity of air in J/(kg·K).
pub const AIR_SPECIFIC_HEAT: f64 = 1005.0;
/// Density of air in kg/m³ (at ~20°C).
pub const AIR_DENSITY: f64 = 1.2;
/// Gravitational acceleration in m/s².
const GRAVITY: f64 = 9.8;
/// Assumed glazing height for the stack-ventilation opening in m.
const WINDOW_OPENING_HEIGHT: f64 = 1.5;

/// Transmission and ventilation heat-transfer coefficients for one zone.
///
/// Computed once from envelope areas/U-values and specific air flows, then
/// passed read-only into the per-timestep resolution. Only the natural
/// ventilation conductance varies with temperature and is derived per
/// period from the precomputed stack constant.
#[derive(Debug, Clone)]
pub struct HeatTransferCoefficients {
    /// Transmission coefficient of opaque surfaces, `Σ U·A`, in W/K.
    pub h_transmission_opaque_w_per_k: f64,
    /// Transmission coefficient of windows in W/K.
    pub h_transmission_transparent_w_per_k: f64,
    /// Ventilation coefficient with heat recovery applied, in W/K.
    pub h_ventilation_w_per_k: f64,
    /// Ventilation coefficient with heat recovery disabled, in W/K.
    pub h_ventilation_no_hr_w_per_k: f64,
    /// Geometry-only constant of the buoyancy-driven window airflow, in
    /// m³/s per sqrt(K/K). `None` when natural ventilation is disabled.
    stack_constant_m3_per_s: Option<f64>,
}

impl HeatTransferCoefficients {
    pub fn new(
        properties: &RoomThermalProperties,
        surfaces: &[Surface],
        floor_area_m2: f64,
        use_natural_ventilation: bool,
    ) -> Self {
        let mut h_opaque = 0.0;
        let mut h_transparent = 0.0;
        let mut window_area = 0.0;
        for surface in surfaces {
            let area = if surface.area_m2.is_finite() {
                surface.area_m2.max(0.0)
            } else {
                0.0
            };
            let ua = area * properties.u_value(surface.surface_type);
            if surface.surface_type.is_transparent() {
                h_transparent += ua;
                window_area += area;
            } else {
                h_opaque += ua;
            }
        }

        let vdot_ventilation = properties.vdot_ventilation_m3_per_m2_h * floor_area_m2;
        let vdot_infiltration = properties.vdot_infiltration_m3_per_m2_h * floor_area_m2;
        let eta = properties.heat_recovery_effectiveness;

        let h_ventilation = airflow_conductance(vdot_ventilation * (1.0 - eta) + vdot_infiltration);
        let h_ventilation_no_hr = airflow_conductance(vdot_ventilation + vdot_infiltration);

        let stack_constant_m3_per_s = if use_natural_ventilation {
            let opening_width = window_area / WINDOW_OPENING_HEIGHT;
            Some(
                0.25 * WINDOW_OPENING_HEIGHT * opening_width / 3.0
                    * (GRAVITY * WINDOW_OPENING_HEIGHT).sqrt(),
            )
        } else {
            None
        };

        Self {
            h_transmission_opaque_w_per_k: h_opaque,
            h_transmission_transparent_w_per_k: h_transparent,
            h_ventilation_w_per_k: h_ventilation,
            h_ventilation_no_hr_w_per_k: h_ventilation_no_hr,
            stack_constant_m3_per_s,
        }
    }

    /// Total transmission coefficient in W/K.
    pub fn h_transmission_w_per_k(&self) -> f64 {
        self.h_transmission_opaque_w_per_k + self.h_transmission_transparent_w_per_k
    }

    pub fn natural_ventilation_enabled(&self) -> bool {
        self.stack_constant_m3_per_s.is_some()
    }

    /// Ventilation conductance of buoyancy-driven window airing in W/K.
    ///
    /// `V̇ = k · sqrt(|T_i − T_e| / T_e,abs)` with the precomputed stack
    /// constant `k`; the flow is already in m³/s, so no per-hour division.
    pub fn natural_ventilation_conductance_w_per_k(
        &self,
        indoor_c: f64,
        ambient_c: f64,
    ) -> f64 {
        let Some(k) = self.stack_constant_m3_per_s else {
            return 0.0;
        };
        let ambient_kelvin = ambient_c + 273.15;
        if ambient_kelvin <= 0.0 {
            return 0.0;
        }
        let vdot = k * ((indoor_c - ambient_c).abs() / ambient_kelvin).sqrt();
        vdot * AIR_DENSITY * AIR_SPECIFIC_HEAT
    }
}

/// Converts an outdoor air flow in m³/h to a conductance in W/K.
fn airflow_conductance(vdot_m3_per_h: f64) -> f64 {
    vdot_m3_per_h / 3600.0 * AIR_DENSITY * AIR_SPECIFIC_HEAT
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::properties::SurfaceType;

    fn surfaces() -> Vec<Surface> {
        vec![
            Surface {
                area_m2: 40.0,
                surface_type: SurfaceType::Wall,
            },
            Surface {
                area_m2: 20.0,
                surface_type: SurfaceType::Roof,
            },
            Surface {
                area_m2: 20.0,
                surface_type: SurfaceType::Floor,
            },
            Surface {
                area_m2: 6.0,
                surface_type: SurfaceType::Window,
            },
        ]
    }

    #[test]
    fn test_transmission_coefficients() {
        let props = RoomThermalProperties {
            u_value_wall: 0.25,
            u_value_roof: 0.2,
            u_value_floor: 0.3,
            u_value_window: 1.2,
            ..Default::default()
        };
        let coeffs = HeatTransferCoefficients::new(&props, &surfaces(), 20.0, false);

        let expected_opaque = 40.0 * 0.25 + 20.0 * 0.2 + 20.0 * 0.3;
        assert!(
            (coeffs.h_transmission_opaque_w_per_k - expected_opaque).abs() < 1e-9,
            "opaque H_T, got {}",
            coeffs.h_transmission_opaque_w_per_k
        );
        assert!((coeffs.h_transmission_transparent_w_per_k - 7.2).abs() < 1e-9);
        assert!(
            (coeffs.h_transmission_w_per_k() - (expected_opaque + 7.2)).abs() < 1e-9,
            "total H_T is the sum of both parts"
        );
    }

    #[test]
    fn test_ventilation_heat_recovery() {
        let props = RoomThermalProperties {
            vdot_ventilation_m3_per_m2_h: 1.0,
            vdot_infiltration_m3_per_m2_h: 0.2,
            heat_recovery_effectiveness: 0.75,
            ..Default::default()
        };
        let coeffs = HeatTransferCoefficients::new(&props, &surfaces(), 20.0, false);

        // Thermally effective flow: 20*1.0*(1-0.75) + 20*0.2 = 9 m³/h.
        let expected = 9.0 / 3600.0 * AIR_DENSITY * AIR_SPECIFIC_HEAT;
        assert!(
            (coeffs.h_ventilation_w_per_k - expected).abs() < 1e-9,
            "H_V with recovery, got {}",
            coeffs.h_ventilation_w_per_k
        );

        // Without recovery the full 24 m³/h is lost.
        let expected_no_hr = 24.0 / 3600.0 * AIR_DENSITY * AIR_SPECIFIC_HEAT;
        assert!((coeffs.h_ventilation_no_hr_w_per_k - expected_no_hr).abs() < 1e-9);
        assert!(
            coeffs.h_ventilation_no_hr_w_per_k > coeffs.h_ventilation_w_per_k,
            "recovery always reduces the effective loss"
        );
    }

    #[test]
    fn test_natural_ventilation_conductance() {
        let props = RoomThermalProperties::default();
        let coeffs = HeatTransferCoefficients::new(&props, &surfaces(), 20.0, true);
        assert!(coeffs.natural_ventilation_enabled());

        let h_small = coeffs.natural_ventilation_conductance_w_per_k(22.0, 20.0);
        let h_large = coeffs.natural_ventilation_conductance_w_per_k(30.0, 20.0);
        assert!(h_small > 0.0);
        assert!(
            h_large > h_small,
            "larger temperature difference drives more stack flow"
        );

        let h_zero_dt = coeffs.natural_ventilation_conductance_w_per_k(20.0, 20.0);
        assert_eq!(h_zero_dt, 0.0, "no buoyancy without a temperature difference");
    }

    #[test]
    fn test_natural_ventilation_disabled() {
        let props = RoomThermalProperties::default();
        let coeffs = HeatTransferCoefficients::new(&props, &surfaces(), 20.0, false);
        assert!(!coeffs.natural_ventilation_enabled());
        assert_eq!(coeffs.natural_ventilation_conductance_w_per_k(30.0, 20.0), 0.0);
    }

    #[test]
    fn test_no_windows_no_stack_flow() {
        let props = RoomThermalProperties::default();
        let opaque_only: Vec<Surface> = surfaces()
            .into_iter()
            .filter(|s| !s.surface_type.is_transparent())
            .collect();
        let coeffs = HeatTransferCoefficients::new(&props, &opaque_only, 20.0, true);
        assert_eq!(
            coeffs.natural_ventilation_conductance_w_per_k(30.0, 20.0),
            0.0,
            "no opening area, no stack flow"
        );
    }
}
