#![deny(warnings)]

//! Rule set for the executive simulator.
//!
//! This crate provides the pure rules that move KPIs:
//! - The per-role action rule table (deltas plus result message)
//! - Natural per-turn evolution of revenue, cash and satisfaction
//! - The random crisis catalog
//!
//! Randomness comes in through [`RandomSource`] so callers can swap the seeded
//! production generator for a scripted one.

pub mod actions;
pub mod crisis;
pub mod evolution;
pub mod random;

pub use actions::{
    apply_effect, evaluate, fallback_message, rule_for, ActionRule, Effect, Scaling,
    ACTION_RULES, GENERIC_MESSAGE,
};
pub use crisis::{roll_crisis, Crisis, CrisisImpact, CRISES, CRISIS_PROBABILITY};
pub use evolution::{clamp_satisfaction, evolve, Evolution};
pub use random::RandomSource;
