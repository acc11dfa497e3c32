//! Quasi-steady-state building zone energy demand, following the SIA 380
//! degree-day / utilization-factor method.
//!
//! Given envelope properties, usage schedules, ambient conditions and
//! per-window solar irradiance, the crate computes monthly or hourly
//! heating, cooling, electricity and domestic-hot-water demand together
//! with a loss/gain breakdown. Geometry acquisition, material catalogs,
//! adaptive-comfort formulas and irradiance simulation are external
//! collaborators; this crate consumes their outputs as plain series.

pub mod balance;
pub mod calendar;
pub mod comfort;
pub mod input;
pub mod properties;
pub mod results;
pub mod run;
pub mod schedule;
pub mod solar;

// Prelude
pub use input::SimulationInput;
pub use properties::{Horizon, RoomThermalProperties, Surface, SurfaceType};
pub use results::{AnnualSummary, DemandResultSeries};
pub use run::run_zone_demand;
pub use schedule::{DailyProfile, UsageScheduleTemplate};
pub use solar::SolarGainInput;
