//! Gains/losses ratio, time constant and utilization factor.

/// Direction of the demand branch the utilization factor applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalanceMode {
    /// Utilization of gains against heating losses.
    Heating,
    /// Utilization of losses against cooling gains.
    Cooling,
}

/// Dimensionless gains/losses ratio γ.
///
/// A zero denominator (a zone without transmission or ventilation losses)
/// falls back to γ = 0 rather than failing; it is a legitimate edge
/// configuration and yields full utilization.
pub fn gain_loss_ratio(gains_wh: f64, losses_wh: f64) -> f64 {
    if losses_wh == 0.0 {
        return 0.0;
    }
    gains_wh / losses_wh
}

/// Policy for the building time constant τ.
#[derive(Debug, Clone, Copy)]
pub enum TimeConstantPolicy {
    /// Use a fixed τ in h (the tabulated SIA value).
    Fixed(f64),
    /// Derive τ from the room heat capacitance: `Cm·A / (H_V + H_T)`.
    FromCapacitance {
        capacitance_wh_per_m2_k: f64,
        floor_area_m2: f64,
    },
}

impl TimeConstantPolicy {
    /// Time constant in h for a given ventilation variant.
    ///
    /// Degenerate coefficients (`H_V + H_T <= 0`) return 0; in that case
    /// the gains/losses ratio is 0 as well and the utilization factor is 1
    /// regardless of τ.
    pub fn time_constant_h(&self, h_ventilation_w_per_k: f64, h_transmission_w_per_k: f64) -> f64 {
        match *self {
            TimeConstantPolicy::Fixed(tau_h) => tau_h.max(0.0),
            TimeConstantPolicy::FromCapacitance {
                capacitance_wh_per_m2_k,
                floor_area_m2,
            } => {
                let h_total = h_ventilation_w_per_k + h_transmission_w_per_k;
                if h_total <= 0.0 {
                    0.0
                } else {
                    (capacitance_wh_per_m2_k * floor_area_m2 / h_total).max(0.0)
                }
            }
        }
    }
}

/// Utilization factor η_g for a period.
///
/// `a = 1 + τ/15`. For γ ≤ 0 the factor is 1 (all gains useful / no
/// utilization penalty). At γ = 1 both directions take the continuous
/// limit `a / (a + 1)`. Otherwise:
/// heating `(1 − γ^a) / (1 − γ^(a+1))`,
/// cooling `(1 − γ^−a) / (1 − γ^−(a+1))`.
pub fn utilization_factor(gamma: f64, tau_h: f64, mode: BalanceMode) -> f64 {
    if !gamma.is_finite() || gamma <= 0.0 {
        return 1.0;
    }
    let a = 1.0 + tau_h.max(0.0) / 15.0;
    if (gamma - 1.0).abs() < 1e-9 {
        return a / (a + 1.0);
    }
    let eta = match mode {
        BalanceMode::Heating => (1.0 - gamma.powf(a)) / (1.0 - gamma.powf(a + 1.0)),
        BalanceMode::Cooling => (1.0 - gamma.powf(-a)) / (1.0 - gamma.powf(-(a + 1.0))),
    };
    if eta.is_finite() { eta.clamp(0.0, 1.0) } else { 1.0 }
}
