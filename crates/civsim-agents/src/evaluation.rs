//! Situation assessment that drives a faction's behaviour state.
//!
//! A [`StateEvaluator`] reports threats, opportunities and resource needs.
//! [`next_state`] maps the findings onto a [`BehaviorState`] with a fixed
//! precedence: threats, then opportunities, then needs, else exploring.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use civsim_types::{BehaviorState, DiplomaticStatus, FactionId, ResourceKind};

use crate::agent::FactionAgent;
use crate::relations::FactionLookup;

/// One observation produced by a [`StateEvaluator`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Finding {
    /// Another faction is a danger.
    Threat {
        /// The dangerous faction.
        from: FactionId,
        /// Current status toward it.
        status: DiplomaticStatus,
    },
    /// The faction is in a position to grow.
    Opportunity {
        /// Short description for logs.
        note: &'static str,
    },
    /// A resource is short or shrinking.
    ResourceNeed {
        /// The resource concerned.
        resource: ResourceKind,
    },
}

/// Pluggable situation assessment.
pub trait StateEvaluator {
    /// Dangers facing `agent`.
    fn threats(&self, agent: &FactionAgent, lookup: &dyn FactionLookup) -> Vec<Finding>;

    /// Chances for `agent` to expand.
    fn opportunities(&self, agent: &FactionAgent, lookup: &dyn FactionLookup) -> Vec<Finding>;

    /// Resources `agent` is short of.
    fn resource_needs(&self, agent: &FactionAgent, lookup: &dyn FactionLookup) -> Vec<Finding>;
}

/// Evaluator that never reports anything, leaving every faction exploring.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassiveEvaluator;

impl StateEvaluator for PassiveEvaluator {
    fn threats(&self, _agent: &FactionAgent, _lookup: &dyn FactionLookup) -> Vec<Finding> {
        Vec::new()
    }

    fn opportunities(&self, _agent: &FactionAgent, _lookup: &dyn FactionLookup) -> Vec<Finding> {
        Vec::new()
    }

    fn resource_needs(&self, _agent: &FactionAgent, _lookup: &dyn FactionLookup) -> Vec<Finding> {
        Vec::new()
    }
}

/// Evaluator based on relations and the faction's own ledger.
///
/// - Threat: every counterpart at war.
/// - Opportunity: food covers at least twice the population's need.
/// - Need: food below the population's need, or any stock shrinking.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicEvaluator;

impl StateEvaluator for HeuristicEvaluator {
    fn threats(&self, agent: &FactionAgent, lookup: &dyn FactionLookup) -> Vec<Finding> {
        lookup
            .counterparts(agent.id())
            .into_iter()
            .filter(|(_, status)| *status == DiplomaticStatus::War)
            .map(|(from, status)| Finding::Threat { from, status })
            .collect()
    }

    fn opportunities(&self, agent: &FactionAgent, _lookup: &dyn FactionLookup) -> Vec<Finding> {
        let food = agent.ledger().amount(ResourceKind::Food);
        let need = Decimal::from(agent.population());
        if agent.population() > 0 && food >= need.saturating_mul(Decimal::TWO) {
            vec![Finding::Opportunity {
                note: "food surplus",
            }]
        } else {
            Vec::new()
        }
    }

    fn resource_needs(&self, agent: &FactionAgent, _lookup: &dyn FactionLookup) -> Vec<Finding> {
        let ledger = agent.ledger();
        let mut needs: Vec<Finding> = ledger
            .stocks()
            .iter()
            .filter(|(_, stock)| stock.net_rate().to_f64().is_some_and(|rate| rate < 0.0))
            .map(|(resource, _)| Finding::ResourceNeed {
                resource: *resource,
            })
            .collect();
        let starving = ledger.amount(ResourceKind::Food) < Decimal::from(agent.population());
        let food_listed = needs.iter().any(|f| {
            matches!(
                f,
                Finding::ResourceNeed {
                    resource: ResourceKind::Food
                }
            )
        });
        if starving && !food_listed {
            needs.push(Finding::ResourceNeed {
                resource: ResourceKind::Food,
            });
        }
        needs
    }
}

/// The behaviour state implied by an evaluator's findings for `agent`.
pub fn next_state(
    agent: &FactionAgent,
    lookup: &dyn FactionLookup,
    evaluator: &dyn StateEvaluator,
) -> BehaviorState {
    if !evaluator.threats(agent, lookup).is_empty() {
        BehaviorState::Defending
    } else if !evaluator.opportunities(agent, lookup).is_empty() {
        BehaviorState::Expanding
    } else if !evaluator.resource_needs(agent, lookup).is_empty() {
        BehaviorState::Developing
    } else {
        BehaviorState::Exploring
    }
}
