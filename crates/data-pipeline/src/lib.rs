#![deny(warnings)]

//! Market profile: classifies raw market indicators of a listed company into
//! coarse, game-facing descriptors and a crisis-risk score.
//!
//! Pure data transformation; fetching the indicators is the caller's job.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Raw indicators as reported by a market-data provider. All optional.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketIndicators {
    #[serde(default)]
    pub beta: Option<f64>,
    #[serde(default)]
    pub current_ratio: Option<f64>,
    #[serde(default)]
    pub debt_to_equity: Option<f64>,
    #[serde(default)]
    pub operating_margins: Option<f64>,
    /// Return on assets as a fraction.
    #[serde(default)]
    pub roa: Option<f64>,
    #[serde(default)]
    pub dividend_yield: Option<f64>,
    /// Market capitalisation in USD.
    #[serde(default)]
    pub market_cap: Option<f64>,
    #[serde(default)]
    pub full_time_employees: Option<u64>,
    #[serde(default)]
    pub revenue_per_employee: Option<f64>,
    #[serde(default)]
    pub cash: Option<f64>,
}

/// Three-step scale used by most descriptors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Low,
    Medium,
    High,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinancialHealth {
    Weak,
    Moderate,
    Strong,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompanySize {
    SmallCap,
    MidCap,
    LargeCap,
    MegaCap,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaturityStage {
    Growth,
    Mature,
}

/// Game-facing classification of a company.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarketProfile {
    pub market_volatility: Level,
    pub financial_health: FinancialHealth,
    pub debt_pressure: Level,
    pub profitability: Level,
    pub company_size: CompanySize,
    pub operational_efficiency: Level,
    pub maturity_stage: MaturityStage,
    pub workforce_size: u64,
    pub revenue_per_employee: f64,
    pub initial_cash: f64,
    /// Heuristic risk score in [0, 1].
    pub crisis_probability: f64,
}

/// Provider values of zero or absent count as missing, like the provider's
/// own falsy fallbacks.
fn or_default(v: Option<f64>, default: f64) -> f64 {
    match v {
        Some(x) if x != 0.0 && x.is_finite() => x,
        _ => default,
    }
}

fn tier(value: f64, medium_above: f64, high_above: f64) -> Level {
    if value > high_above {
        Level::High
    } else if value > medium_above {
        Level::Medium
    } else {
        Level::Low
    }
}

impl MarketIndicators {
    fn beta(&self) -> f64 {
        or_default(self.beta, 1.0)
    }

    fn current_ratio(&self) -> f64 {
        or_default(self.current_ratio, 1.0)
    }

    fn debt_to_equity(&self) -> f64 {
        or_default(self.debt_to_equity, 0.0)
    }

    fn operating_margins(&self) -> f64 {
        or_default(self.operating_margins, 0.0)
    }
}

/// Classify a market capitalisation.
pub fn company_size(market_cap: f64) -> CompanySize {
    if market_cap > 200_000_000_000.0 {
        CompanySize::MegaCap
    } else if market_cap > 10_000_000_000.0 {
        CompanySize::LargeCap
    } else if market_cap > 2_000_000_000.0 {
        CompanySize::MidCap
    } else {
        CompanySize::SmallCap
    }
}

/// Risk score built from volatility, leverage, liquidity and operating losses.
pub fn crisis_probability(ind: &MarketIndicators) -> f64 {
    // Tenths, so the cap lands exactly on 1.0.
    let mut tenths: u32 = 0;
    if ind.beta() > 1.5 {
        tenths += 2;
    }
    if ind.debt_to_equity() > 2.0 {
        tenths += 2;
    }
    if ind.current_ratio() < 1.0 {
        tenths += 3;
    }
    if ind.operating_margins() < 0.0 {
        tenths += 3;
    }
    f64::from(tenths.min(10)) / 10.0
}

/// Build the full profile.
pub fn profile(ind: &MarketIndicators) -> MarketProfile {
    let financial_health = if ind.current_ratio() > 2.0 {
        FinancialHealth::Strong
    } else if ind.current_ratio() > 1.0 {
        FinancialHealth::Moderate
    } else {
        FinancialHealth::Weak
    };
    let maturity_stage = if or_default(ind.dividend_yield, 0.0) > 0.02 {
        MaturityStage::Mature
    } else {
        MaturityStage::Growth
    };
    let risk = crisis_probability(ind);
    debug!(risk, "market profile built");
    MarketProfile {
        market_volatility: tier(ind.beta(), 1.0, 1.5),
        financial_health,
        debt_pressure: tier(ind.debt_to_equity(), 1.0, 2.0),
        profitability: tier(ind.operating_margins(), 0.10, 0.20),
        company_size: company_size(or_default(ind.market_cap, 0.0)),
        operational_efficiency: tier(or_default(ind.roa, 0.0), 0.05, 0.10),
        maturity_stage,
        workforce_size: ind.full_time_employees.unwrap_or(100),
        revenue_per_employee: or_default(ind.revenue_per_employee, 0.0),
        initial_cash: ind.cash.unwrap_or(1_000_000.0),
        crisis_probability: risk,
    }
}
