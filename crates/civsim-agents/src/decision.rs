//! Candidate generation and scoring.
//!
//! Each decision cycle a faction enumerates building, research and
//! diplomacy candidates. Every candidate gets a base benefit and priority
//! from the faction's behaviour state, then a personality multiplier on the
//! benefit. Candidates below the configured benefit threshold are dropped
//! and the rest are stable-sorted by their unrounded rank, highest first.
//! The rounded `priority` is for display only.
//!
//! # State scoring
//!
//! | State      | Building (benefit/priority)                       | Research (benefit/priority)   |
//! |------------|---------------------------------------------------|-------------------------------|
//! | Exploring  | `Hut`, `Campfire` 5/8                             | any production effect 6/7     |
//! | Expanding  | `BasicDefense` 7/9; `Farm`, `Mine` 6/7            | production/all 7/8            |
//! | Developing | `Workshop`, `ResearchLab` 8/8; `Factory`, `PowerPlant` 7/7 | population/growth 8/8 |
//! | Defending  | `BasicDefense` 10/10                              | production/metal 9/9          |

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use civsim_types::{
    BehaviorState, BuildingType, DecisionKind, DiplomaticStatus, FactionId, Personality,
    ResourceKind, TechType,
};
use civsim_world::{
    TechAuthority, TechEffect, TechEffectKind, TechEffectTarget, blueprint, definition,
};

use crate::agent::FactionAgent;
use crate::config::DecisionConfig;
use crate::personality;
use crate::relations::FactionLookup;

/// What a decision acts on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecisionTarget {
    /// A building to place.
    Building(BuildingType),
    /// A tech to research.
    Tech(TechType),
    /// A faction to approach.
    Faction(FactionId),
}

/// A scored candidate action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    /// Action category.
    pub kind: DecisionKind,
    /// What the action applies to.
    pub target: DecisionTarget,
    /// Rounded priority, 1 (lowest) to 10 (highest).
    pub priority: u8,
    /// Unrounded priority in `[1, 10]`; the sort key.
    pub rank: f64,
    /// Estimated cost in resource units.
    pub cost: Decimal,
    /// Expected benefit after personality adjustment.
    pub expected_benefit: f64,
}

/// Round and clamp a raw priority into `1..=10`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn clamp_priority(raw: f64) -> u8 {
    if raw.is_nan() {
        return 1;
    }
    raw.round().clamp(1.0, 10.0) as u8
}

/// Clamp a raw priority into `[1, 10]` without rounding.
pub fn priority_rank(raw: f64) -> f64 {
    if raw.is_nan() {
        return 1.0;
    }
    raw.clamp(1.0, 10.0)
}

/// Enumerate, score, filter and sort every candidate for `agent`.
pub fn generate_decisions(
    agent: &FactionAgent,
    techs: &dyn TechAuthority,
    lookup: &dyn FactionLookup,
    config: &DecisionConfig,
) -> Vec<Decision> {
    let mut decisions: Vec<Decision> = building_candidates(agent, config)
        .chain(research_candidates(agent, techs, config))
        .chain(diplomacy_candidates(agent, lookup, config))
        .chain(military_candidates(agent))
        .collect();
    // `sort_by` is stable: equal ranks keep generation order.
    decisions.sort_by(|a, b| b.rank.total_cmp(&a.rank));
    tracing::debug!(
        faction = %agent.id(),
        state = ?agent.state(),
        candidates = decisions.len(),
        "decisions generated"
    );
    decisions
}

// ---------------------------------------------------------------------------
// Building
// ---------------------------------------------------------------------------

/// Base (benefit, priority) of `building` in `state`, if it is of interest.
const fn building_score(state: BehaviorState, building: BuildingType) -> Option<(f64, u8)> {
    use BuildingType as B;

    match (state, building) {
        (BehaviorState::Exploring, B::Hut | B::Campfire) => Some((5.0, 8)),
        (BehaviorState::Expanding, B::BasicDefense) => Some((7.0, 9)),
        (BehaviorState::Expanding, B::Farm | B::Mine) => Some((6.0, 7)),
        (BehaviorState::Developing, B::Workshop | B::ResearchLab) => Some((8.0, 8)),
        (BehaviorState::Developing, B::Factory | B::PowerPlant) => Some((7.0, 7)),
        (BehaviorState::Defending, B::BasicDefense) => Some((10.0, 10)),
        _ => None,
    }
}

fn building_candidates<'a>(
    agent: &'a FactionAgent,
    config: &'a DecisionConfig,
) -> impl Iterator<Item = Decision> + 'a {
    BuildingType::ALL.into_iter().filter_map(move |building| {
        let bp = blueprint(building);
        if bp.epoch > agent.epoch() {
            return None;
        }
        let cost = bp.cost();
        if !agent.ledger().can_afford(&cost) {
            return None;
        }
        let (base, priority) = building_score(agent.state(), building)?;
        let benefit = base * personality::building_multiplier(agent.personality(), building);
        if benefit < config.build_benefit_threshold {
            return None;
        }
        Some(Decision {
            kind: DecisionKind::Build,
            target: DecisionTarget::Building(building),
            priority,
            rank: f64::from(priority),
            cost: cost.total(),
            expected_benefit: benefit,
        })
    })
}

// ---------------------------------------------------------------------------
// Research
// ---------------------------------------------------------------------------

/// Base (benefit, priority) of a tech effect in `state`, if it is of interest.
const fn research_score(state: BehaviorState, effect: &TechEffect) -> Option<(f64, u8)> {
    use TechEffectKind::{Population, Production};
    use TechEffectTarget::{All, Growth, Metal};

    match (state, effect.kind, effect.target) {
        (BehaviorState::Exploring, Production, _) => Some((6.0, 7)),
        (BehaviorState::Expanding, Production, All) => Some((7.0, 8)),
        (BehaviorState::Developing, Population, Growth) => Some((8.0, 8)),
        (BehaviorState::Defending, Production, Metal) => Some((9.0, 9)),
        _ => None,
    }
}

fn research_candidates<'a>(
    agent: &'a FactionAgent,
    techs: &'a dyn TechAuthority,
    config: &'a DecisionConfig,
) -> impl Iterator<Item = Decision> + 'a {
    TechType::ALL.into_iter().filter_map(move |tech| {
        let def = definition(tech);
        if def.epoch > agent.epoch() || !techs.can_research(agent.id(), tech) {
            return None;
        }
        // The last matching effect sets the base score; multipliers compound.
        let (base, priority) = def
            .effects
            .iter()
            .filter_map(|effect| research_score(agent.state(), effect))
            .last()?;
        let benefit = def.effects.iter().fold(base, |acc, effect| {
            acc * personality::tech_multiplier(agent.personality(), effect)
        });
        if benefit < config.research_benefit_threshold {
            return None;
        }
        Some(Decision {
            kind: DecisionKind::Research,
            target: DecisionTarget::Tech(tech),
            priority,
            rank: f64::from(priority),
            cost: Decimal::from(def.cost),
            expected_benefit: benefit,
        })
    })
}

// ---------------------------------------------------------------------------
// Diplomacy
// ---------------------------------------------------------------------------

/// Base benefit and food cost of approaching a faction at `status`.
fn diplomacy_offer(agent: &FactionAgent, status: DiplomaticStatus) -> Option<(f64, Decimal)> {
    let food = agent.ledger().amount(ResourceKind::Food);
    let military = agent.military_strength();
    match status {
        DiplomaticStatus::War if food < Decimal::from(50) || military < 30.0 => {
            Some((8.0, Decimal::from(20)))
        }
        DiplomaticStatus::Hostile if military < 40.0 => Some((6.0, Decimal::from(15))),
        DiplomaticStatus::Neutral
            if matches!(
                agent.personality(),
                Personality::Diplomatic | Personality::Trader
            ) =>
        {
            Some((4.0, Decimal::from(10)))
        }
        DiplomaticStatus::Friendly
            if agent.personality() == Personality::Diplomatic
                && agent.state() == BehaviorState::Developing =>
        {
            Some((7.0, Decimal::from(25)))
        }
        _ => None,
    }
}

fn diplomacy_candidates<'a>(
    agent: &'a FactionAgent,
    lookup: &'a dyn FactionLookup,
    config: &'a DecisionConfig,
) -> impl Iterator<Item = Decision> + 'a {
    let raw = personality::diplomacy_priority(agent.personality(), agent.traits(), agent.state());
    let (priority, rank) = (clamp_priority(raw), priority_rank(raw));
    let food = agent.ledger().amount(ResourceKind::Food);

    lookup
        .counterparts(agent.id())
        .into_iter()
        .filter_map(move |(other, status)| {
            let (base, cost) = diplomacy_offer(agent, status)?;
            let benefit = base * personality::diplomacy_multiplier(agent.personality());
            if benefit < config.diplomacy_benefit_threshold || food < cost {
                return None;
            }
            Some(Decision {
                kind: DecisionKind::Diplomacy,
                target: DecisionTarget::Faction(other),
                priority,
                rank,
                cost,
                expected_benefit: benefit,
            })
        })
}

// ---------------------------------------------------------------------------
// Military
// ---------------------------------------------------------------------------

/// Military planning is not modelled; no candidates are produced.
fn military_candidates(_agent: &FactionAgent) -> impl Iterator<Item = Decision> {
    core::iter::empty()
}
