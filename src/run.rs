//! Zone demand run orchestration.
//!
//! Wires the phases together: schedule expansion, comfort bound
//! resolution, solar gain aggregation, the heat balance itself, and the
//! final unit conversion into the result series.

use anyhow::Result;

use crate::balance::{
    BalanceDrivers, HeatTransferCoefficients, TimeConstantPolicy, run_balance,
};
use crate::calendar::{HOURS_IN_MONTH, HOURS_PER_YEAR};
use crate::comfort::{FixedSetpoints, monthly_means, resolve_comfort_bounds};
use crate::input::SimulationInput;
use crate::properties::Horizon;
use crate::results::{DemandResultSeries, wh_to_kwh};
use crate::schedule::{annual_load_multiplier, expand_schedules};
use crate::solar::{aggregate_solar_gains, monthly_sums};

/// Runs the full annual demand computation for one zone.
///
/// Pure and deterministic: immutable input in, fresh result series out.
/// Multiple zones may run concurrently.
pub fn run_zone_demand(input: &SimulationInput) -> Result<DemandResultSeries> {
    input.validate()?;
    let horizon = input.horizon();
    let properties = input.properties.sanitized();
    let floor_area = input.floor_area_m2;

    log::debug!(
        "zone run: {horizon:?}, floor area {floor_area} m², {} surfaces, {} windows",
        input.surfaces.len(),
        input.window_count(),
    );

    // ── Schedules and internal loads ──
    let schedules = expand_schedules(&input.template, input.year_start_weekday)?;
    let occupant_w = properties.occupant_load_w_per_m2
        * floor_area
        * annual_load_multiplier(&schedules.occupancy, properties.occupant_full_load_hours);
    let lighting_w = properties.lighting_load_w_per_m2
        * floor_area
        * annual_load_multiplier(&schedules.lighting, properties.lighting_full_load_hours);
    let device_w = properties.device_load_w_per_m2
        * floor_area
        * annual_load_multiplier(&schedules.devices, properties.device_full_load_hours);

    let mut internal_hourly_wh = Vec::with_capacity(HOURS_PER_YEAR);
    let mut electricity_hourly_wh = Vec::with_capacity(HOURS_PER_YEAR);
    for hour in 0..HOURS_PER_YEAR {
        let lighting = lighting_w * schedules.lighting[hour];
        let devices = device_w * schedules.devices[hour];
        internal_hourly_wh.push(occupant_w * schedules.occupancy[hour] + lighting + devices);
        electricity_hourly_wh.push(lighting + devices);
    }

    // ── Comfort bounds ──
    let adaptive = if input.use_adaptive_comfort {
        match (&input.adaptive_upper_c, &input.adaptive_lower_c) {
            (Some(upper), Some(lower)) => Some((upper.as_slice(), lower.as_slice())),
            _ => None,
        }
    } else {
        None
    };
    let bounds = resolve_comfort_bounds(
        horizon,
        adaptive,
        FixedSetpoints {
            upper_c: properties.setpoint_upper_c,
            lower_c: properties.setpoint_lower_c,
            setback_upper_c: Some(properties.setback_upper_c),
            setback_lower_c: Some(properties.setback_lower_c),
        },
        Some(&schedules.setpoint_mode),
    )?;

    // ── Solar gains ──
    let window_areas: Vec<f64> = input
        .surfaces
        .iter()
        .filter(|s| s.surface_type.is_transparent())
        .map(|s| s.area_m2)
        .collect();
    let irradiance = if input.run_obstructed {
        &input.solar.irradiance_obstructed
    } else {
        &input.solar.irradiance_unobstructed
    };
    let solar = aggregate_solar_gains(
        irradiance,
        &window_areas,
        input.solar.g_value,
        input.solar.g_value_shaded,
        input.solar.shading_threshold_w_per_m2,
        horizon,
    )?;

    // ── Drivers at the run horizon ──
    let (ambient_c, internal_wh, electricity_wh) = match horizon {
        Horizon::Hourly => (
            input.ambient_c.clone(),
            internal_hourly_wh,
            electricity_hourly_wh,
        ),
        Horizon::Monthly => (
            monthly_means(&input.ambient_c),
            monthly_sums(&internal_hourly_wh),
            monthly_sums(&electricity_hourly_wh),
        ),
    };

    // ── Heat balance ──
    let coefficients = HeatTransferCoefficients::new(
        &properties,
        &input.surfaces,
        floor_area,
        input.use_natural_ventilation,
    );
    let time_constant = if input.use_fixed_time_constant {
        TimeConstantPolicy::Fixed(properties.time_constant_h)
    } else {
        TimeConstantPolicy::FromCapacitance {
            capacitance_wh_per_m2_k: properties.capacitance_wh_per_m2_k,
            floor_area_m2: floor_area,
        }
    };
    let balance = run_balance(
        &coefficients,
        time_constant,
        &BalanceDrivers {
            ambient_c: &ambient_c,
            upper_c: &bounds.upper_c,
            lower_c: &bounds.lower_c,
            internal_gains_wh: &internal_wh,
            solar_gains_wh: &solar.total_wh,
        },
        horizon,
    );

    // ── DHW, replicated uniformly over the year ──
    let dhw_wh_per_hour = properties.dhw_annual_kwh_per_m2 * 1000.0 * floor_area
        / HOURS_PER_YEAR as f64;
    let dhw_wh: Vec<f64> = match horizon {
        Horizon::Hourly => vec![dhw_wh_per_hour; HOURS_PER_YEAR],
        Horizon::Monthly => HOURS_IN_MONTH
            .iter()
            .map(|&h| dhw_wh_per_hour * h as f64)
            .collect(),
    };

    let result = DemandResultSeries {
        horizon,
        heating_kwh: wh_to_kwh(balance.heating_wh),
        cooling_kwh: wh_to_kwh(balance.cooling_wh),
        electricity_kwh: wh_to_kwh(electricity_wh),
        dhw_kwh: wh_to_kwh(dhw_wh),
        transmission_opaque_kwh: wh_to_kwh(balance.transmission_opaque_wh),
        transmission_transparent_kwh: wh_to_kwh(balance.transmission_transparent_wh),
        ventilation_kwh: wh_to_kwh(balance.ventilation_wh),
        internal_gains_kwh: wh_to_kwh(balance.internal_gains_wh),
        solar_gains_kwh: wh_to_kwh(balance.solar_gains_wh),
        solar_gains_per_window_kwh: solar
            .per_window_wh
            .into_iter()
            .map(wh_to_kwh)
            .collect(),
    };

    let heating_total: f64 = result.heating_kwh.iter().sum();
    let cooling_total: f64 = result.cooling_kwh.iter().sum();
    log::debug!(
        "zone run done: heating {heating_total:.1} kWh/yr, cooling {cooling_total:.1} kWh/yr"
    );

    Ok(result)
}
