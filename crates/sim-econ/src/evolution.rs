//! Natural per-turn drift of the KPIs.

use crate::random::RandomSource;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sim_core::{Kpis, Mode};

/// Range of the sampled per-turn revenue growth, before the mode bonus.
pub const GROWTH_RANGE: (f64, f64) = (0.005, 0.025);
/// Share of margin-adjusted revenue converted to cash each turn.
pub const CASH_CONVERSION: Decimal = Decimal::from_parts(8, 0, 0, false, 2);
/// Largest per-turn satisfaction decay.
pub const MAX_SATISFACTION_DECAY: i64 = 3;
/// Bounds satisfaction is clamped to after evolution.
pub const SATISFACTION_FLOOR: Decimal = Decimal::from_parts(20, 0, 0, false, 0);
pub const SATISFACTION_CEILING: Decimal = Decimal::from_parts(100, 0, 0, false, 0);

/// What one evolution step did, for logging and inspection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Evolution {
    /// Applied growth rate, mode bonus included.
    pub growth: f64,
    pub cash_gain: Decimal,
    pub satisfaction_decay: i64,
}

/// Clamp satisfaction into `[SATISFACTION_FLOOR, SATISFACTION_CEILING]`.
pub fn clamp_satisfaction(kpis: &mut Kpis) {
    kpis.satisfaction = kpis
        .satisfaction
        .clamp(SATISFACTION_FLOOR, SATISFACTION_CEILING);
}

/// Apply one turn of organic drift to `kpis`.
///
/// Revenue grows by a uniform draw from [`GROWTH_RANGE`] multiplied by the
/// mode's growth bonus, cash accrues from the profit margin, and satisfaction
/// decays by up to [`MAX_SATISFACTION_DECAY`] before being clamped.
pub fn evolve<R: RandomSource + ?Sized>(kpis: &mut Kpis, mode: Mode, rng: &mut R) -> Evolution {
    let growth = rng.uniform(GROWTH_RANGE.0, GROWTH_RANGE.1) * mode.growth_bonus();
    let growth_dec = Decimal::from_f64(growth).unwrap_or(Decimal::ZERO);
    kpis.revenue = kpis
        .revenue
        .saturating_mul(Decimal::ONE + growth_dec)
        .round_dp(2);

    let cash_gain = kpis
        .revenue
        .saturating_mul(kpis.profit_margin / Decimal::ONE_HUNDRED)
        .saturating_mul(CASH_CONVERSION)
        .trunc();
    kpis.cash = kpis.cash.saturating_add(cash_gain);

    let satisfaction_decay = rng.int_inclusive(0, MAX_SATISFACTION_DECAY);
    kpis.satisfaction = kpis
        .satisfaction
        .saturating_sub(Decimal::from(satisfaction_decay));
    clamp_satisfaction(kpis);

    Evolution {
        growth,
        cash_gain,
        satisfaction_decay,
    }
}
