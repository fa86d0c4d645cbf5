//! Random per-turn crises drawn from a fixed catalog.

use crate::random::RandomSource;
use rust_decimal::Decimal;
use sim_core::{KpiField, Kpis};

/// Chance that a crisis strikes on any given turn, regardless of mode.
pub const CRISIS_PROBABILITY: f64 = 0.15;

/// A single KPI hit caused by a crisis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CrisisImpact {
    /// Fixed integer delta.
    Flat { field: KpiField, delta: i64 },
    /// Delta proportional to the current revenue, in percent (negative to lose).
    RevenueShare { field: KpiField, percent: i64 },
}

impl CrisisImpact {
    pub fn field(&self) -> KpiField {
        match self {
            CrisisImpact::Flat { field, .. } | CrisisImpact::RevenueShare { field, .. } => *field,
        }
    }

    /// Integer delta this impact would apply to `kpis` right now.
    pub fn delta(&self, kpis: &Kpis) -> Decimal {
        match self {
            CrisisImpact::Flat { delta, .. } => Decimal::from(*delta),
            CrisisImpact::RevenueShare { percent, .. } => {
                kpis.revenue.saturating_mul(Decimal::new(*percent, 2)).trunc()
            }
        }
    }
}

/// Catalog entry.
#[derive(Debug, PartialEq, Eq)]
pub struct Crisis {
    pub name: &'static str,
    pub icon: &'static str,
    pub impacts: &'static [CrisisImpact],
}

impl Crisis {
    /// Event log text, e.g. "📦 Supply chain crisis".
    pub fn description(&self) -> String {
        format!("{} {}", self.icon, self.name)
    }

    /// Apply every impact to `kpis`.
    ///
    /// Deltas are all computed against the pre-crisis state and only touch the
    /// fields named in the catalog.
    pub fn apply(&self, kpis: &mut Kpis) {
        let deltas: Vec<(KpiField, Decimal)> = self
            .impacts
            .iter()
            .map(|i| (i.field(), i.delta(kpis)))
            .collect();
        for (field, delta) in deltas {
            kpis.add(field, delta);
        }
    }
}

pub static CRISES: [Crisis; 4] = [
    Crisis {
        name: "Supply chain crisis",
        icon: "📦",
        impacts: &[
            CrisisImpact::Flat { field: KpiField::Efficiency, delta: -15 },
            CrisisImpact::Flat { field: KpiField::ProductionCapacity, delta: -10 },
        ],
    },
    Crisis {
        name: "Talent flight",
        icon: "🚪",
        impacts: &[
            CrisisImpact::Flat { field: KpiField::Employees, delta: -5 },
            CrisisImpact::Flat { field: KpiField::Productivity, delta: -10 },
            CrisisImpact::Flat { field: KpiField::Satisfaction, delta: -8 },
        ],
    },
    Crisis {
        name: "Quality problem",
        icon: "⚠️",
        impacts: &[
            CrisisImpact::Flat { field: KpiField::QualityScore, delta: -20 },
            CrisisImpact::Flat { field: KpiField::BrandReputation, delta: -10 },
        ],
    },
    Crisis {
        name: "Aggressive competitor",
        icon: "🎯",
        impacts: &[
            CrisisImpact::Flat { field: KpiField::MarketShare, delta: -5 },
            CrisisImpact::RevenueShare { field: KpiField::Revenue, percent: -3 },
        ],
    },
];

/// Decide whether a crisis strikes this turn and, if so, which one.
pub fn roll_crisis<R: RandomSource + ?Sized>(rng: &mut R) -> Option<&'static Crisis> {
    if !rng.chance(CRISIS_PROBABILITY) {
        return None;
    }
    Some(&CRISES[rng.pick(CRISES.len())])
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    struct Scripted {
        hit: bool,
        index: usize,
    }

    impl RandomSource for Scripted {
        fn uniform(&mut self, lo: f64, _hi: f64) -> f64 {
            lo
        }
        fn int_inclusive(&mut self, lo: i64, _hi: i64) -> i64 {
            lo
        }
        fn chance(&mut self, _p: f64) -> bool {
            self.hit
        }
        fn pick(&mut self, len: usize) -> usize {
            self.index % len
        }
    }

    fn kpis() -> Kpis {
        Kpis {
            revenue: Decimal::new(100_000_000, 0),
            market_share: Decimal::new(20, 0),
            efficiency: Decimal::new(70, 0),
            production_capacity: Decimal::new(75, 0),
            ..Default::default()
        }
    }

    #[test]
    fn no_crisis_when_chance_fails() {
        let mut rng = Scripted { hit: false, index: 0 };
        assert!(roll_crisis(&mut rng).is_none());
    }

    #[test]
    fn supply_chain_hits_operations() {
        let mut rng = Scripted { hit: true, index: 0 };
        let crisis = roll_crisis(&mut rng).unwrap();
        assert_eq!(crisis.description(), "📦 Supply chain crisis");
        let mut k = kpis();
        crisis.apply(&mut k);
        assert_eq!(k.efficiency, Decimal::new(55, 0));
        assert_eq!(k.production_capacity, Decimal::new(65, 0));
    }

    #[test]
    fn competitor_takes_three_percent_of_revenue() {
        let mut k = kpis();
        CRISES[3].apply(&mut k);
        assert_eq!(k.revenue, Decimal::new(97_000_000, 0));
        assert_eq!(k.market_share, Decimal::new(15, 0));
    }

    #[test]
    fn crises_touch_only_catalog_fields() {
        for crisis in &CRISES {
            let before = kpis();
            let mut k = before.clone();
            crisis.apply(&mut k);
            let allowed: Vec<KpiField> = crisis.impacts.iter().map(|i| i.field()).collect();
            for field in k.changed_fields(&before) {
                assert!(allowed.contains(&field), "{} changed {:?}", crisis.name, field);
            }
            assert!(!crisis.impacts.iter().any(|i| i.field().is_automation()));
        }
    }

    #[test]
    fn hit_rate_is_roughly_fifteen_percent() {
        let mut rng = ChaCha8Rng::seed_from_u64(2024);
        let trials = 20_000;
        let hits = (0..trials).filter(|_| roll_crisis(&mut rng).is_some()).count();
        let rate = hits as f64 / trials as f64;
        assert!((0.13..0.17).contains(&rate), "rate {rate}");
    }
}
