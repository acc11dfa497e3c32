//! The quasi-steady-state heat balance engine.
//!
//! Coefficients are computed once per run ([`coefficients`]), utilization
//! factors are bootstrapped per period ([`utilization`], [`engine`]) and
//! every timestep is resolved independently given those factors.

pub mod coefficients;
pub mod engine;
pub mod utilization;

pub use coefficients::HeatTransferCoefficients;
pub use engine::{
    BalanceDrivers, BalanceSeries, PeriodDrivers, ScenarioEta, TimestepState, VariantSet,
    VentilationMode, resolve_timestep, run_balance, scenario_factors,
};
pub use utilization::{BalanceMode, TimeConstantPolicy, gain_loss_ratio, utilization_factor};
