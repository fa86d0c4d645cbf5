//! Action rule table: one pure effect function per (role, action) pair.
//!
//! Each rule reads the current KPIs and returns the deltas to apply plus a
//! result message. Scaled magnitudes are computed as `base × factor × friction`
//! in exact decimal arithmetic and truncated toward zero. Spend amounts scale
//! by `factor` alone, and CAIO rules never use `friction`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sim_core::{format_usd, ActionKind, Intensity, KpiField, Kpis, Mode, Role};

/// Multipliers derived from the request intensity and the operating mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scaling {
    /// `0.5 + intensity/100`.
    pub factor: Decimal,
    /// 0.7 traditional, 1.0 AI-native.
    pub friction: Decimal,
}

impl Scaling {
    pub fn new(intensity: Intensity, mode: Mode) -> Self {
        Self {
            factor: intensity.factor(),
            friction: mode.friction(),
        }
    }

    /// `trunc(base × factor × friction)`.
    fn damped(&self, base: i64) -> Decimal {
        self.damped_share(Decimal::from(base), Decimal::ONE)
    }

    /// `trunc(base × factor)`.
    fn raw(&self, base: i64) -> Decimal {
        self.spend(Decimal::from(base), Decimal::ONE)
    }

    /// `trunc(amount × share × factor)`, saturating at the `Decimal` bounds.
    fn spend(&self, amount: Decimal, share: Decimal) -> Decimal {
        amount
            .saturating_mul(share)
            .saturating_mul(self.factor)
            .trunc()
    }

    /// `trunc(amount × share × factor × friction)`, saturating at the `Decimal` bounds.
    fn damped_share(&self, amount: Decimal, share: Decimal) -> Decimal {
        amount
            .saturating_mul(share)
            .saturating_mul(self.factor)
            .saturating_mul(self.friction)
            .trunc()
    }
}

/// KPI deltas and the message produced by one action.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Effect {
    pub deltas: Vec<(KpiField, Decimal)>,
    pub message: String,
}

impl Effect {
    fn new(message: impl Into<String>) -> Self {
        Self {
            deltas: Vec::new(),
            message: message.into(),
        }
    }

    fn with(mut self, field: KpiField, delta: Decimal) -> Self {
        self.deltas.push((field, delta));
        self
    }

    /// Delta recorded for `field`, or zero.
    pub fn delta(&self, field: KpiField) -> Decimal {
        self.deltas
            .iter()
            .filter(|(f, _)| *f == field)
            .fold(Decimal::ZERO, |acc, (_, d)| acc.saturating_add(*d))
    }

    /// Fields this effect may change.
    pub fn fields(&self) -> Vec<KpiField> {
        let mut out: Vec<KpiField> = self.deltas.iter().map(|(f, _)| *f).collect();
        out.sort();
        out.dedup();
        out
    }
}

/// Apply every delta of `effect` to `kpis`.
pub fn apply_effect(kpis: &mut Kpis, effect: &Effect) {
    for (field, delta) in &effect.deltas {
        kpis.add(*field, *delta);
    }
}

/// Entry of the action rule table.
pub struct ActionRule {
    pub kind: ActionKind,
    pub apply: fn(&Kpis, Scaling) -> Effect,
}

impl ActionRule {
    pub const fn new(kind: ActionKind, apply: fn(&Kpis, Scaling) -> Effect) -> Self {
        Self { kind, apply }
    }

    pub fn role(&self) -> Role {
        self.kind.role()
    }
}

/// The full rule table, one entry per [`ActionKind`].
pub static ACTION_RULES: [ActionRule; 15] = [
    ActionRule::new(ActionKind::StrategicPivot, strategic_pivot),
    ActionRule::new(ActionKind::CostCutting, cost_cutting),
    ActionRule::new(ActionKind::RaiseCapital, raise_capital),
    ActionRule::new(ActionKind::ReduceCosts, reduce_costs),
    ActionRule::new(ActionKind::InvestRd, invest_rd),
    ActionRule::new(ActionKind::MarketingCampaign, marketing_campaign),
    ActionRule::new(ActionKind::CustomerLoyalty, customer_loyalty),
    ActionRule::new(ActionKind::OptimizeOperations, optimize_operations),
    ActionRule::new(ActionKind::ExpandCapacity, expand_capacity),
    ActionRule::new(ActionKind::HireTalent, hire_talent),
    ActionRule::new(ActionKind::TrainingProgram, training_program),
    ActionRule::new(ActionKind::ImproveCulture, improve_culture),
    ActionRule::new(ActionKind::DeployAgents, deploy_agents),
    ActionRule::new(ActionKind::TrainModels, train_models),
    ActionRule::new(ActionKind::AutomateTasks, automate_tasks),
];

/// Look up the rule for an action.
pub fn rule_for(kind: ActionKind) -> Option<&'static ActionRule> {
    ACTION_RULES.iter().find(|r| r.kind == kind)
}

/// Evaluate an action against the current KPIs without mutating them.
pub fn evaluate(
    kpis: &Kpis,
    kind: ActionKind,
    intensity: Intensity,
    mode: Mode,
) -> Option<Effect> {
    rule_for(kind).map(|rule| (rule.apply)(kpis, Scaling::new(intensity, mode)))
}

/// Message used when a role is known but the action is not.
pub fn fallback_message(role: &str) -> String {
    format!("{role} action executed")
}

/// Message used when the role itself is not recognised.
pub const GENERIC_MESSAGE: &str = "Action executed";

fn pct(n: i64) -> Decimal {
    Decimal::new(n, 2)
}

// CEO

fn strategic_pivot(_k: &Kpis, s: Scaling) -> Effect {
    Effect::new("🎯 Strategic pivot underway")
        .with(KpiField::BrandReputation, s.damped(8))
        .with(KpiField::MarketShare, s.damped(3))
}

fn cost_cutting(k: &Kpis, s: Scaling) -> Effect {
    Effect::new("✂️ Cost-reduction plan implemented")
        .with(KpiField::Cash, s.spend(k.revenue, pct(5)))
        .with(KpiField::Satisfaction, -s.raw(5))
}

// CFO

fn raise_capital(k: &Kpis, s: Scaling) -> Effect {
    let amount = s.damped_share(k.cash, pct(30));
    let debt = amount.saturating_mul(Decimal::new(8, 1)).trunc();
    Effect::new(format!("💰 Capital raised: {}", format_usd(amount)))
        .with(KpiField::Cash, amount)
        .with(KpiField::Debt, debt)
}

fn reduce_costs(k: &Kpis, s: Scaling) -> Effect {
    let saved = s.damped_share(k.revenue, pct(3));
    Effect::new(format!("💵 Costs reduced: {}", format_usd(saved))).with(KpiField::Cash, saved)
}

fn invest_rd(k: &Kpis, s: Scaling) -> Effect {
    let invested = s.spend(k.cash, pct(10));
    Effect::new(format!("🔬 R&D investment: {}", format_usd(invested)))
        .with(KpiField::Cash, -invested)
        .with(KpiField::Efficiency, s.damped(5))
}

// CMO

fn marketing_campaign(k: &Kpis, s: Scaling) -> Effect {
    let cost = s.spend(k.revenue, pct(2));
    Effect::new(format!("📣 Campaign launched ({})", format_usd(cost)))
        .with(KpiField::Cash, -cost)
        .with(KpiField::BrandReputation, s.damped(8))
        .with(KpiField::MarketShare, s.damped(2))
}

fn customer_loyalty(_k: &Kpis, s: Scaling) -> Effect {
    Effect::new("❤️ Loyalty program activated")
        .with(KpiField::CustomerSatisfaction, s.damped(10))
}

// COO

fn optimize_operations(_k: &Kpis, s: Scaling) -> Effect {
    Effect::new("⚙️ Operations optimized")
        .with(KpiField::Efficiency, s.damped(10))
        .with(KpiField::QualityScore, s.damped(5))
}

fn expand_capacity(k: &Kpis, s: Scaling) -> Effect {
    let cost = s.spend(k.cash, pct(15));
    Effect::new(format!("🏭 Capacity expanded ({})", format_usd(cost)))
        .with(KpiField::Cash, -cost)
        .with(KpiField::ProductionCapacity, s.damped(15))
}

// CHRO

const COST_PER_HIRE: i64 = 75_000;

fn hire_talent(_k: &Kpis, s: Scaling) -> Effect {
    let hires = s.raw(10);
    Effect::new(format!("👥 {hires} employees hired"))
        .with(KpiField::Cash, -hires.saturating_mul(Decimal::from(COST_PER_HIRE)))
        .with(KpiField::Employees, hires)
        .with(KpiField::Productivity, s.damped(3))
}

fn training_program(_k: &Kpis, s: Scaling) -> Effect {
    Effect::new("🎓 Training program launched")
        .with(KpiField::Productivity, s.damped(8))
        .with(KpiField::Satisfaction, s.damped(5))
}

fn improve_culture(_k: &Kpis, s: Scaling) -> Effect {
    Effect::new("🌟 Company culture improved")
        .with(KpiField::Satisfaction, s.damped(12))
        .with(KpiField::TurnoverRate, -s.damped(3))
}

// CAIO: friction never applies.

const COST_PER_AGENT: i64 = 10_000;
const TRAINING_RUN_COST: i64 = 50_000;

fn deploy_agents(_k: &Kpis, s: Scaling) -> Effect {
    let agents = s.raw(5);
    Effect::new(format!("🤖 {agents} AI agents deployed"))
        .with(KpiField::Cash, -agents.saturating_mul(Decimal::from(COST_PER_AGENT)))
        .with(KpiField::AiAgents, agents)
        .with(KpiField::AutomationLevel, s.raw(5))
        .with(KpiField::Efficiency, s.raw(8))
}

fn train_models(_k: &Kpis, s: Scaling) -> Effect {
    let cost = s.raw(TRAINING_RUN_COST);
    Effect::new("🧠 AI models trained")
        .with(KpiField::Cash, -cost)
        .with(KpiField::ComputeCost, cost)
        .with(KpiField::AutomationLevel, s.raw(10))
        .with(KpiField::Productivity, s.raw(5))
}

fn automate_tasks(_k: &Kpis, s: Scaling) -> Effect {
    Effect::new("⚡ Tasks automated")
        .with(KpiField::Efficiency, s.raw(15))
        .with(KpiField::Employees, -s.raw(5))
}
