#![deny(warnings)]

//! Core domain models and invariants for the executive simulator.
//!
//! This crate defines the serializable types shared by the rule set and the
//! session runtime: operating modes, executive roles and their actions, the
//! flat KPI record, and the normalized financial snapshot used to seed it.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Number of turns in one game (one simulated year).
pub const MAX_TURNS: u32 = 12;

/// Validation errors for domain inputs.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// Intensity outside the playable range [25, 100].
    #[error("intensity {0} is out of range [25, 100]")]
    IntensityOutOfRange(u8),
    /// Role name not among the six executive roles.
    #[error("unknown role: {0}")]
    UnknownRole(String),
    /// Action name not allowed for the given role.
    #[error("unknown action {action} for role {role}")]
    UnknownAction { role: String, action: String },
    /// Operating mode name not recognised.
    #[error("unknown mode: {0}")]
    UnknownMode(String),
    /// Industry name not recognised.
    #[error("unknown industry: {0}")]
    UnknownIndustry(String),
}

/// Operating model of the simulated company.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Hierarchical company: actions lose part of their benefit to friction.
    Traditional,
    /// Agent-driven company: no friction, faster organic growth, live automation KPIs.
    AiNative,
}

impl Mode {
    /// Multiplier applied to friction-subject action benefits.
    pub fn friction(self) -> Decimal {
        match self {
            Mode::Traditional => Decimal::new(7, 1),
            Mode::AiNative => Decimal::ONE,
        }
    }

    /// Post-multiplier on the sampled per-turn revenue growth.
    pub fn growth_bonus(self) -> f64 {
        match self {
            Mode::Traditional => 1.0,
            Mode::AiNative => 1.2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Traditional => "traditional",
            Mode::AiNative => "ai_native",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "traditional" => Ok(Mode::Traditional),
            "ai_native" | "ai-native" => Ok(Mode::AiNative),
            _ => Err(ValidationError::UnknownMode(s.to_string())),
        }
    }
}

/// Industry of the simulated company. Display context only; no rule depends on it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Industry {
    Tech,
    Retail,
    Finance,
    Healthcare,
    Manufacturing,
}

impl Industry {
    pub const ALL: [Industry; 5] = [
        Industry::Tech,
        Industry::Retail,
        Industry::Finance,
        Industry::Healthcare,
        Industry::Manufacturing,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Industry::Tech => "tech",
            Industry::Retail => "retail",
            Industry::Finance => "finance",
            Industry::Healthcare => "healthcare",
            Industry::Manufacturing => "manufacturing",
        }
    }

    /// Human-readable label with icon.
    pub fn label(self) -> &'static str {
        match self {
            Industry::Tech => "🖥️ Technology",
            Industry::Retail => "🛒 Retail",
            Industry::Finance => "💰 Finance",
            Industry::Healthcare => "🏥 Healthcare",
            Industry::Manufacturing => "🏭 Manufacturing",
        }
    }
}

impl fmt::Display for Industry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Industry {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Industry::ALL
            .into_iter()
            .find(|i| i.as_str() == lower)
            .ok_or_else(|| ValidationError::UnknownIndustry(s.to_string()))
    }
}

/// Executive roles a player can act as.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Ceo,
    Cfo,
    Cmo,
    Coo,
    Chro,
    /// Chief AI Officer. Actionable in both modes so that all six seats stay playable.
    Caio,
}

impl Role {
    pub const ALL: [Role; 6] = [
        Role::Ceo,
        Role::Cfo,
        Role::Cmo,
        Role::Coo,
        Role::Chro,
        Role::Caio,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Ceo => "CEO",
            Role::Cfo => "CFO",
            Role::Cmo => "CMO",
            Role::Coo => "COO",
            Role::Chro => "CHRO",
            Role::Caio => "CAIO",
        }
    }

    /// Actions this role may take, in menu order.
    pub fn actions(self) -> &'static [ActionKind] {
        use ActionKind::*;
        match self {
            Role::Ceo => &[StrategicPivot, CostCutting],
            Role::Cfo => &[RaiseCapital, ReduceCosts, InvestRd],
            Role::Cmo => &[MarketingCampaign, CustomerLoyalty],
            Role::Coo => &[OptimizeOperations, ExpandCapacity],
            Role::Chro => &[HireTalent, TrainingProgram, ImproveCulture],
            Role::Caio => &[DeployAgents, TrainModels, AutomateTasks],
        }
    }

    /// Resolve an action name within this role.
    pub fn action(self, name: &str) -> Result<ActionKind, ValidationError> {
        let name = name.trim();
        self.actions()
            .iter()
            .copied()
            .find(|a| a.as_str() == name)
            .ok_or_else(|| ValidationError::UnknownAction {
                role: self.as_str().to_string(),
                action: name.to_string(),
            })
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        Role::ALL
            .into_iter()
            .find(|r| r.as_str() == upper)
            .ok_or_else(|| ValidationError::UnknownRole(s.to_string()))
    }
}

/// Every (role, action) pair the simulator understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    StrategicPivot,
    CostCutting,
    RaiseCapital,
    ReduceCosts,
    InvestRd,
    MarketingCampaign,
    CustomerLoyalty,
    OptimizeOperations,
    ExpandCapacity,
    HireTalent,
    TrainingProgram,
    ImproveCulture,
    DeployAgents,
    TrainModels,
    AutomateTasks,
}

impl ActionKind {
    pub const ALL: [ActionKind; 15] = [
        ActionKind::StrategicPivot,
        ActionKind::CostCutting,
        ActionKind::RaiseCapital,
        ActionKind::ReduceCosts,
        ActionKind::InvestRd,
        ActionKind::MarketingCampaign,
        ActionKind::CustomerLoyalty,
        ActionKind::OptimizeOperations,
        ActionKind::ExpandCapacity,
        ActionKind::HireTalent,
        ActionKind::TrainingProgram,
        ActionKind::ImproveCulture,
        ActionKind::DeployAgents,
        ActionKind::TrainModels,
        ActionKind::AutomateTasks,
    ];

    /// Role that owns this action.
    pub fn role(self) -> Role {
        use ActionKind::*;
        match self {
            StrategicPivot | CostCutting => Role::Ceo,
            RaiseCapital | ReduceCosts | InvestRd => Role::Cfo,
            MarketingCampaign | CustomerLoyalty => Role::Cmo,
            OptimizeOperations | ExpandCapacity => Role::Coo,
            HireTalent | TrainingProgram | ImproveCulture => Role::Chro,
            DeployAgents | TrainModels | AutomateTasks => Role::Caio,
        }
    }

    /// Wire name, e.g. "invest_rd".
    pub fn as_str(self) -> &'static str {
        use ActionKind::*;
        match self {
            StrategicPivot => "strategic_pivot",
            CostCutting => "cost_cutting",
            RaiseCapital => "raise_capital",
            ReduceCosts => "reduce_costs",
            InvestRd => "invest_rd",
            MarketingCampaign => "marketing_campaign",
            CustomerLoyalty => "customer_loyalty",
            OptimizeOperations => "optimize_operations",
            ExpandCapacity => "expand_capacity",
            HireTalent => "hire_talent",
            TrainingProgram => "training_program",
            ImproveCulture => "improve_culture",
            DeployAgents => "deploy_agents",
            TrainModels => "train_models",
            AutomateTasks => "automate_tasks",
        }
    }

    /// Menu label with icon.
    pub fn label(self) -> &'static str {
        use ActionKind::*;
        match self {
            StrategicPivot => "🎯 Strategic Pivot",
            CostCutting => "✂️ Cost Cutting",
            RaiseCapital => "💰 Raise Capital",
            ReduceCosts => "💵 Reduce Expenses",
            InvestRd => "🔬 Invest in R&D",
            MarketingCampaign => "📣 Marketing Campaign",
            CustomerLoyalty => "❤️ Loyalty Program",
            OptimizeOperations => "⚙️ Optimize Operations",
            ExpandCapacity => "🏭 Expand Capacity",
            HireTalent => "👥 Hire Talent",
            TrainingProgram => "🎓 Training Program",
            ImproveCulture => "🌟 Improve Culture",
            DeployAgents => "🤖 Deploy AI Agents",
            TrainModels => "🧠 Train Models",
            AutomateTasks => "⚡ Automate Tasks",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Caller-chosen action strength in [25, 100].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Intensity(u8);

impl Intensity {
    pub const MIN: u8 = 25;
    pub const MAX: u8 = 100;
    pub const DEFAULT: Intensity = Intensity(50);

    pub fn new(value: u8) -> Result<Self, ValidationError> {
        if !(Self::MIN..=Self::MAX).contains(&value) {
            return Err(ValidationError::IntensityOutOfRange(value));
        }
        Ok(Intensity(value))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Effect multiplier `0.5 + intensity/100`, in [0.75, 1.5].
    pub fn factor(self) -> Decimal {
        Decimal::new(50 + i64::from(self.0), 2)
    }
}

impl Default for Intensity {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<u8> for Intensity {
    type Error = ValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Intensity::new(value)
    }
}

impl From<Intensity> for u8 {
    fn from(i: Intensity) -> Self {
        i.0
    }
}

/// Named KPI fields, used to address `Kpis` by key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KpiField {
    Cash,
    Revenue,
    Ebitda,
    ProfitMargin,
    Debt,
    Efficiency,
    QualityScore,
    ProductionCapacity,
    Employees,
    Satisfaction,
    Productivity,
    TurnoverRate,
    BrandReputation,
    MarketShare,
    CustomerSatisfaction,
    AiAgents,
    AutomationLevel,
    ComputeCost,
}

impl KpiField {
    pub const ALL: [KpiField; 18] = [
        KpiField::Cash,
        KpiField::Revenue,
        KpiField::Ebitda,
        KpiField::ProfitMargin,
        KpiField::Debt,
        KpiField::Efficiency,
        KpiField::QualityScore,
        KpiField::ProductionCapacity,
        KpiField::Employees,
        KpiField::Satisfaction,
        KpiField::Productivity,
        KpiField::TurnoverRate,
        KpiField::BrandReputation,
        KpiField::MarketShare,
        KpiField::CustomerSatisfaction,
        KpiField::AiAgents,
        KpiField::AutomationLevel,
        KpiField::ComputeCost,
    ];

    /// Fields that only carry meaning in AI-native mode.
    pub fn is_automation(self) -> bool {
        matches!(
            self,
            KpiField::AiAgents | KpiField::AutomationLevel | KpiField::ComputeCost
        )
    }
}

/// All tracked metrics of the simulated company at one point in time.
///
/// Percent-like fields hold values on a 0..100 scale. Only `satisfaction` is
/// clamped (by turn evolution); every other field is unbounded up to the
/// `Decimal` range, where updates saturate instead of overflowing.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Kpis {
    // Financial
    pub cash: Decimal,
    pub revenue: Decimal,
    pub ebitda: Decimal,
    pub profit_margin: Decimal,
    pub debt: Decimal,
    // Operations
    pub efficiency: Decimal,
    pub quality_score: Decimal,
    pub production_capacity: Decimal,
    // People
    pub employees: Decimal,
    pub satisfaction: Decimal,
    pub productivity: Decimal,
    pub turnover_rate: Decimal,
    // Market
    pub brand_reputation: Decimal,
    pub market_share: Decimal,
    pub customer_satisfaction: Decimal,
    // Automation (AI-native only)
    pub ai_agents: Decimal,
    pub automation_level: Decimal,
    pub compute_cost: Decimal,
}

impl Kpis {
    pub fn get(&self, field: KpiField) -> Decimal {
        match field {
            KpiField::Cash => self.cash,
            KpiField::Revenue => self.revenue,
            KpiField::Ebitda => self.ebitda,
            KpiField::ProfitMargin => self.profit_margin,
            KpiField::Debt => self.debt,
            KpiField::Efficiency => self.efficiency,
            KpiField::QualityScore => self.quality_score,
            KpiField::ProductionCapacity => self.production_capacity,
            KpiField::Employees => self.employees,
            KpiField::Satisfaction => self.satisfaction,
            KpiField::Productivity => self.productivity,
            KpiField::TurnoverRate => self.turnover_rate,
            KpiField::BrandReputation => self.brand_reputation,
            KpiField::MarketShare => self.market_share,
            KpiField::CustomerSatisfaction => self.customer_satisfaction,
            KpiField::AiAgents => self.ai_agents,
            KpiField::AutomationLevel => self.automation_level,
            KpiField::ComputeCost => self.compute_cost,
        }
    }

    pub fn field_mut(&mut self, field: KpiField) -> &mut Decimal {
        match field {
            KpiField::Cash => &mut self.cash,
            KpiField::Revenue => &mut self.revenue,
            KpiField::Ebitda => &mut self.ebitda,
            KpiField::ProfitMargin => &mut self.profit_margin,
            KpiField::Debt => &mut self.debt,
            KpiField::Efficiency => &mut self.efficiency,
            KpiField::QualityScore => &mut self.quality_score,
            KpiField::ProductionCapacity => &mut self.production_capacity,
            KpiField::Employees => &mut self.employees,
            KpiField::Satisfaction => &mut self.satisfaction,
            KpiField::Productivity => &mut self.productivity,
            KpiField::TurnoverRate => &mut self.turnover_rate,
            KpiField::BrandReputation => &mut self.brand_reputation,
            KpiField::MarketShare => &mut self.market_share,
            KpiField::CustomerSatisfaction => &mut self.customer_satisfaction,
            KpiField::AiAgents => &mut self.ai_agents,
            KpiField::AutomationLevel => &mut self.automation_level,
            KpiField::ComputeCost => &mut self.compute_cost,
        }
    }

    /// Add `delta` to one field, saturating at the `Decimal` bounds.
    pub fn add(&mut self, field: KpiField, delta: Decimal) {
        let slot = self.field_mut(field);
        *slot = slot.saturating_add(delta);
    }

    /// Fields whose value differs between `self` and `other`.
    pub fn changed_fields(&self, other: &Kpis) -> Vec<KpiField> {
        KpiField::ALL
            .into_iter()
            .filter(|f| self.get(*f) != other.get(*f))
            .collect()
    }
}

/// Normalized real-world financials used to seed the initial KPIs.
///
/// Every field is optional. An absent or zero value falls back to its default.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialSnapshot {
    /// Cash on hand in USD (default 1,000,000).
    #[serde(default)]
    pub cash: Option<Decimal>,
    /// Trailing revenue in USD (default 100,000,000).
    #[serde(default)]
    pub total_revenue: Option<Decimal>,
    /// Headcount (default 100).
    #[serde(default)]
    pub full_time_employees: Option<u64>,
    /// EBITDA in USD (default 15% of revenue).
    #[serde(default)]
    pub ebitda: Option<Decimal>,
    /// Profit margin as a fraction, e.g. 0.1 (default 0.10).
    #[serde(default)]
    pub profit_margins: Option<Decimal>,
    /// Total debt in USD (default half of cash).
    #[serde(default)]
    pub total_debt: Option<Decimal>,
}

fn non_zero(v: Option<Decimal>) -> Option<Decimal> {
    v.filter(|d| !d.is_zero())
}

impl FinancialSnapshot {
    pub fn cash_or_default(&self) -> Decimal {
        non_zero(self.cash).unwrap_or_else(|| Decimal::new(1_000_000, 0))
    }

    pub fn revenue_or_default(&self) -> Decimal {
        non_zero(self.total_revenue).unwrap_or_else(|| Decimal::new(100_000_000, 0))
    }

    pub fn employees_or_default(&self) -> Decimal {
        match self.full_time_employees {
            Some(n) if n > 0 => Decimal::from(n),
            _ => Decimal::from(100u64),
        }
    }

    pub fn ebitda_or_default(&self) -> Decimal {
        non_zero(self.ebitda).unwrap_or_else(|| self.revenue_or_default() * Decimal::new(15, 2))
    }

    /// Margin as a fraction.
    pub fn profit_margin_or_default(&self) -> Decimal {
        non_zero(self.profit_margins).unwrap_or_else(|| Decimal::new(10, 2))
    }

    pub fn debt_or_default(&self) -> Decimal {
        non_zero(self.total_debt).unwrap_or_else(|| self.cash_or_default() * Decimal::new(5, 1))
    }
}

/// Category of an event log entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Info,
    Crisis,
}

/// One entry in the session's event log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameEvent {
    /// Turn during which the event happened.
    pub turn: u32,
    pub description: String,
    pub kind: EventKind,
}

/// The most recent action request and its outcome message.
///
/// Role and action are kept as the caller supplied them so unrecognised
/// requests are still visible.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastAction {
    pub role: String,
    pub action: String,
    pub message: String,
}

/// Render a USD amount truncated to whole dollars with thousands separators,
/// e.g. `$1,234,567`.
pub fn format_usd(amount: Decimal) -> String {
    let whole = amount.trunc();
    let digits = whole.abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if whole.is_sign_negative() && !whole.is_zero() {
        format!("-${grouped}")
    } else {
        format!("${grouped}")
    }
}
