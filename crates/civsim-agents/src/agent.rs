//! The autonomous faction and its per-turn update.
//!
//! [`FactionAgent::update`] runs one turn for one faction:
//!
//! 1. Resource stocks advance by production minus consumption.
//! 2. Population grows on a food surplus or shrinks in proportion to the
//!    shortfall.
//! 3. If the action cooldown has elapsed, the faction re-evaluates its
//!    behaviour state, generates and scores candidates, and executes the
//!    best one.
//! 4. Research progress accumulates toward the current target.
//!
//! Relation changes are never applied here. A diplomacy decision comes back
//! as an [`AgentAction`] for the director to apply through the relation
//! table.

use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use civsim_ledger::{ResourceCost, ResourceLedger};
use civsim_types::{
    BehaviorState, BuildingType, DecisionKind, DiplomaticStatus, Effect, EffectType, Epoch,
    FactionId, FactionTraits, HexCoord, Personality, ResourceKind, TechType,
};
use civsim_world::hex::neighbors;
use civsim_world::{BuildingAuthority, TechAuthority, blueprint, techs_in_epoch};

use crate::config::{DecisionConfig, FactionConfig};
use crate::decision::{Decision, DecisionTarget, generate_decisions};
use crate::error::AgentError;
use crate::evaluation::{StateEvaluator, next_state};
use crate::relations::FactionLookup;

/// Research progress at which the current target completes.
const RESEARCH_COMPLETE: f64 = 100.0;

// ---------------------------------------------------------------------------
// Turn plumbing
// ---------------------------------------------------------------------------

/// Everything an agent may touch during its turn besides itself.
pub struct TurnContext<'a> {
    /// Current turn number.
    pub turn: u64,
    /// Research state authority.
    pub techs: &'a mut dyn TechAuthority,
    /// Building placement authority.
    pub buildings: &'a mut dyn BuildingAuthority,
    /// Read access to the roster and relations.
    pub lookup: &'a dyn FactionLookup,
    /// Every hex owned by any faction, this one included.
    pub claimed: &'a BTreeSet<HexCoord>,
    /// Situation assessment.
    pub evaluator: &'a dyn StateEvaluator,
    /// Decision tunables.
    pub config: &'a DecisionConfig,
}

/// A change the agent asks the director to apply on its behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentAction {
    /// Move the relation with `target` one rung up, to `status`.
    ImproveRelation {
        /// The faction approached.
        target: FactionId,
        /// The status to set.
        status: DiplomaticStatus,
    },
}

/// What happened during one agent turn.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentTurn {
    /// Behaviour state at the end of the turn.
    pub state: BehaviorState,
    /// The decision selected this turn, if a cycle ran and produced one.
    pub decision: Option<Decision>,
    /// Whether the selected decision took effect.
    pub executed: bool,
    /// Follow-up for the director.
    pub action: Option<AgentAction>,
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Persistable state of one faction.
///
/// Pending decisions are transient and never included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactionSnapshot {
    /// Faction key.
    pub id: FactionId,
    /// Display name.
    pub name: String,
    /// Behavioural archetype.
    pub personality: Personality,
    /// Behavioural weights.
    pub traits: FactionTraits,
    /// Behaviour state.
    pub state: BehaviorState,
    /// Technological epoch.
    pub epoch: Epoch,
    /// Resource stocks.
    pub ledger: ResourceLedger,
    /// Population.
    pub population: u64,
    /// Owned hexes.
    pub territory: BTreeSet<HexCoord>,
    /// Progress toward the current research target.
    pub tech_progress: f64,
    /// Current research target.
    pub current_research: Option<TechType>,
    /// Military strength.
    pub military_strength: f64,
    /// Economic strength.
    pub economic_strength: f64,
    /// Research speed multiplier.
    pub research_speed: f64,
    /// Population growth multiplier.
    pub growth_multiplier: f64,
    /// Exploration speed multiplier.
    pub exploration_speed: f64,
    /// Turn of the last decision cycle.
    pub last_action_turn: u64,
    /// Turns between decision cycles.
    pub action_cooldown: u64,
    /// Status toward every other faction.
    pub relations: BTreeMap<FactionId, DiplomaticStatus>,
}

// ---------------------------------------------------------------------------
// FactionAgent
// ---------------------------------------------------------------------------

/// An autonomous faction.
#[derive(Debug, Clone, PartialEq)]
pub struct FactionAgent {
    id: FactionId,
    name: String,
    personality: Personality,
    traits: FactionTraits,
    state: BehaviorState,
    epoch: Epoch,
    ledger: ResourceLedger,
    population: u64,
    territory: BTreeSet<HexCoord>,
    tech_progress: f64,
    current_research: Option<TechType>,
    military_strength: f64,
    economic_strength: f64,
    research_speed: f64,
    growth_multiplier: f64,
    exploration_speed: f64,
    last_action_turn: u64,
    action_cooldown: u64,
    decisions: Vec<Decision>,
}

impl FactionAgent {
    /// Spawn a faction from its configuration.
    pub fn from_config(
        config: &FactionConfig,
        decisions: &DecisionConfig,
    ) -> Result<Self, AgentError> {
        if !config.traits.is_normalized() {
            return Err(AgentError::InvalidState {
                faction: config.id.clone(),
                reason: String::from("traits must lie in [0, 1]"),
            });
        }
        check_scalar(&config.id, "military_strength", config.military_strength)?;
        check_scalar(&config.id, "economic_strength", config.economic_strength)?;

        let mut ledger = ResourceLedger::starting();
        for (resource, amount) in &config.starting_resources {
            ledger.set_amount(*resource, *amount)?;
        }

        Ok(Self {
            id: config.id.clone(),
            name: config.name.clone(),
            personality: config.personality,
            traits: config.traits,
            state: BehaviorState::Exploring,
            epoch: Epoch::Tribal,
            ledger,
            population: config.starting_population,
            territory: BTreeSet::from([config.starting_position]),
            tech_progress: 0.0,
            current_research: None,
            military_strength: config.military_strength,
            economic_strength: config.economic_strength,
            research_speed: 1.0,
            growth_multiplier: 1.0,
            exploration_speed: 1.0,
            last_action_turn: 0,
            action_cooldown: decisions.action_cooldown,
            decisions: Vec::new(),
        })
    }

    /// Rebuild a faction from a snapshot, validating every field.
    pub fn from_snapshot(snapshot: FactionSnapshot) -> Result<Self, AgentError> {
        let id = snapshot.id;
        if !snapshot.traits.is_normalized() {
            return Err(AgentError::InvalidState {
                faction: id,
                reason: String::from("traits must lie in [0, 1]"),
            });
        }
        snapshot.ledger.validate()?;
        for (field, value) in [
            ("tech_progress", snapshot.tech_progress),
            ("military_strength", snapshot.military_strength),
            ("economic_strength", snapshot.economic_strength),
            ("research_speed", snapshot.research_speed),
            ("growth_multiplier", snapshot.growth_multiplier),
            ("exploration_speed", snapshot.exploration_speed),
        ] {
            check_scalar(&id, field, value)?;
        }
        if snapshot.tech_progress > RESEARCH_COMPLETE {
            return Err(AgentError::InvalidState {
                faction: id,
                reason: format!("tech_progress {} exceeds 100", snapshot.tech_progress),
            });
        }

        Ok(Self {
            id,
            name: snapshot.name,
            personality: snapshot.personality,
            traits: snapshot.traits,
            state: snapshot.state,
            epoch: snapshot.epoch,
            ledger: snapshot.ledger,
            population: snapshot.population,
            territory: snapshot.territory,
            tech_progress: snapshot.tech_progress,
            current_research: snapshot.current_research,
            military_strength: snapshot.military_strength,
            economic_strength: snapshot.economic_strength,
            research_speed: snapshot.research_speed,
            growth_multiplier: snapshot.growth_multiplier,
            exploration_speed: snapshot.exploration_speed,
            last_action_turn: snapshot.last_action_turn,
            action_cooldown: snapshot.action_cooldown,
            decisions: Vec::new(),
        })
    }

    /// Capture persistable state, with `relations` as this faction's view.
    pub fn to_snapshot(&self, relations: BTreeMap<FactionId, DiplomaticStatus>) -> FactionSnapshot {
        FactionSnapshot {
            id: self.id.clone(),
            name: self.name.clone(),
            personality: self.personality,
            traits: self.traits,
            state: self.state,
            epoch: self.epoch,
            ledger: self.ledger.clone(),
            population: self.population,
            territory: self.territory.clone(),
            tech_progress: self.tech_progress,
            current_research: self.current_research,
            military_strength: self.military_strength,
            economic_strength: self.economic_strength,
            research_speed: self.research_speed,
            growth_multiplier: self.growth_multiplier,
            exploration_speed: self.exploration_speed,
            last_action_turn: self.last_action_turn,
            action_cooldown: self.action_cooldown,
            relations,
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// Faction key.
    pub const fn id(&self) -> &FactionId {
        &self.id
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Behavioural archetype.
    pub const fn personality(&self) -> Personality {
        self.personality
    }

    /// Behavioural weights.
    pub const fn traits(&self) -> &FactionTraits {
        &self.traits
    }

    /// Current behaviour state.
    pub const fn state(&self) -> BehaviorState {
        self.state
    }

    /// Current epoch.
    pub const fn epoch(&self) -> Epoch {
        self.epoch
    }

    /// Resource stocks.
    pub const fn ledger(&self) -> &ResourceLedger {
        &self.ledger
    }

    /// Mutable resource stocks. The ledger itself keeps amounts non-negative.
    pub const fn ledger_mut(&mut self) -> &mut ResourceLedger {
        &mut self.ledger
    }

    /// Population.
    pub const fn population(&self) -> u64 {
        self.population
    }

    /// Owned hexes.
    pub const fn territory(&self) -> &BTreeSet<HexCoord> {
        &self.territory
    }

    /// Progress toward the current research target, 0 to 100.
    pub const fn tech_progress(&self) -> f64 {
        self.tech_progress
    }

    /// Current research target.
    pub const fn current_research(&self) -> Option<TechType> {
        self.current_research
    }

    /// Military strength.
    pub const fn military_strength(&self) -> f64 {
        self.military_strength
    }

    /// Economic strength.
    pub const fn economic_strength(&self) -> f64 {
        self.economic_strength
    }

    /// Research speed multiplier.
    pub const fn research_speed(&self) -> f64 {
        self.research_speed
    }

    /// Population growth multiplier.
    pub const fn growth_multiplier(&self) -> f64 {
        self.growth_multiplier
    }

    /// Exploration speed multiplier.
    pub const fn exploration_speed(&self) -> f64 {
        self.exploration_speed
    }

    /// Turn of the last decision cycle.
    pub const fn last_action_turn(&self) -> u64 {
        self.last_action_turn
    }

    /// Candidates generated by the last decision cycle, best first.
    pub fn decisions(&self) -> &[Decision] {
        &self.decisions
    }

    /// Whether a decision cycle is due on `turn`.
    pub const fn cooldown_elapsed(&self, turn: u64) -> bool {
        turn.saturating_sub(self.last_action_turn) >= self.action_cooldown
    }

    // -----------------------------------------------------------------------
    // Turn
    // -----------------------------------------------------------------------

    /// Run one turn for this faction.
    pub fn update(&mut self, ctx: &mut TurnContext<'_>) -> AgentTurn {
        self.update_resources();
        self.update_population(ctx.config.growth_rate);

        let mut outcome = AgentTurn {
            state: self.state,
            decision: None,
            executed: false,
            action: None,
        };

        if self.cooldown_elapsed(ctx.turn) {
            self.state = next_state(self, ctx.lookup, ctx.evaluator);
            self.decisions = generate_decisions(self, &*ctx.techs, ctx.lookup, ctx.config);
            if let Some(best) = self.decisions.first().cloned() {
                let (executed, action) = self.execute_decision(&best, ctx);
                debug!(
                    faction = %self.id,
                    kind = ?best.kind,
                    target = ?best.target,
                    priority = best.priority,
                    executed,
                    "decision selected"
                );
                outcome.executed = executed;
                outcome.action = action;
                outcome.decision = Some(best);
            }
            self.last_action_turn = ctx.turn;
            outcome.state = self.state;
        }

        self.update_research(&mut *ctx.techs, ctx.config.research_rate);
        outcome
    }

    /// Advance every resource stock by one turn.
    pub fn update_resources(&mut self) {
        self.ledger.tick();
    }

    /// Grow or shrink the population against the food supply.
    ///
    /// Each person needs one food. A surplus adds
    /// `floor(surplus * growth_rate * growth_multiplier)` people; a
    /// shortfall scales the population by `food / needed`, rounded down.
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn update_population(&mut self, growth_rate: f64) {
        let food = self
            .ledger
            .amount(ResourceKind::Food)
            .to_f64()
            .unwrap_or(0.0)
            .max(0.0);
        let needed = self.population as f64;

        if food >= needed {
            let growth = ((food - needed) * growth_rate * self.growth_multiplier).floor();
            if growth.is_finite() && growth > 0.0 {
                self.population = self.population.saturating_add(growth as u64);
            }
        } else {
            // population * (food / needed) reduces to the food on hand.
            self.population = food.floor() as u64;
        }
    }

    /// Accumulate research progress and complete the target at 100.
    pub fn update_research(&mut self, techs: &mut dyn TechAuthority, research_rate: f64) {
        let Some(tech) = self.current_research else {
            return;
        };
        let tech_points = self
            .ledger
            .amount(ResourceKind::TechPoints)
            .to_f64()
            .unwrap_or(0.0);
        let focus = self.traits.research_focus.mul_add(0.5, 0.5);
        let gained = tech_points * research_rate * self.research_speed * focus;
        if gained.is_finite() && gained > 0.0 {
            self.tech_progress += gained;
        }
        if self.tech_progress < RESEARCH_COMPLETE {
            return;
        }

        if !techs.is_tech_researched(&self.id, tech) {
            match techs.start_research(&self.id, tech) {
                Ok(()) => info!(faction = %self.id, ?tech, "research completed"),
                Err(err) => debug!(faction = %self.id, ?tech, error = %err, "research rejected"),
            }
        }
        self.current_research = None;
        self.tech_progress = 0.0;
        self.advance_epoch(techs);
    }

    /// Drop the current research target and its progress.
    pub const fn cancel_research(&mut self) {
        self.current_research = None;
        self.tech_progress = 0.0;
    }

    fn advance_epoch(&mut self, techs: &dyn TechAuthority) {
        let complete = techs_in_epoch(self.epoch).all(|tech| techs.is_tech_researched(&self.id, tech));
        if !complete {
            return;
        }
        if let Some(next) = self.epoch.next() {
            info!(faction = %self.id, from = ?self.epoch, to = ?next, "epoch advanced");
            self.epoch = next;
        }
    }

    // -----------------------------------------------------------------------
    // Execution
    // -----------------------------------------------------------------------

    fn execute_decision(
        &mut self,
        decision: &Decision,
        ctx: &mut TurnContext<'_>,
    ) -> (bool, Option<AgentAction>) {
        match (&decision.kind, &decision.target) {
            (DecisionKind::Build, DecisionTarget::Building(building)) => {
                (self.execute_build(*building, &mut *ctx.buildings, ctx.claimed), None)
            }
            (DecisionKind::Research, DecisionTarget::Tech(tech)) => {
                (self.execute_research(*tech, &*ctx.techs), None)
            }
            (DecisionKind::Diplomacy, DecisionTarget::Faction(target)) => {
                let action = self.execute_diplomacy(target, decision.cost, ctx.lookup);
                (action.is_some(), action)
            }
            (kind, _) => {
                debug!(faction = %self.id, ?kind, "no handler for decision");
                (false, None)
            }
        }
    }

    fn execute_build(
        &mut self,
        building: BuildingType,
        buildings: &mut dyn BuildingAuthority,
        claimed: &BTreeSet<HexCoord>,
    ) -> bool {
        let bp = blueprint(building);
        let cost = bp.cost();
        if !self.ledger.can_afford(&cost) {
            return false;
        }
        let Some(site) = self.find_site(building, &*buildings, claimed) else {
            debug!(faction = %self.id, ?building, "no site available");
            return false;
        };
        if let Err(err) = buildings.place_building(&self.id, building, site) {
            debug!(faction = %self.id, ?building, error = %err, "placement rejected");
            return false;
        }
        if let Err(err) = self.ledger.deduct(&cost) {
            debug!(faction = %self.id, ?building, error = %err, "building cost not paid");
        }
        for (resource, rate) in bp.production() {
            self.ledger.add_production(resource, rate);
        }
        self.territory.insert(site);
        info!(faction = %self.id, ?building, %site, "building constructed");
        true
    }

    /// First placeable hex: owned hexes first, then neighbours no faction
    /// owns.
    fn find_site(
        &self,
        building: BuildingType,
        buildings: &dyn BuildingAuthority,
        claimed: &BTreeSet<HexCoord>,
    ) -> Option<HexCoord> {
        let frontier: BTreeSet<HexCoord> = self
            .territory
            .iter()
            .flat_map(|hex| neighbors(*hex))
            .filter(|hex| !self.territory.contains(hex) && !claimed.contains(hex))
            .collect();
        self.territory
            .iter()
            .chain(frontier.iter())
            .copied()
            .find(|hex| buildings.can_place_building(building, *hex))
    }

    fn execute_research(&mut self, tech: TechType, techs: &dyn TechAuthority) -> bool {
        if !techs.can_research(&self.id, tech) {
            return false;
        }
        if self.current_research != Some(tech) {
            self.current_research = Some(tech);
            self.tech_progress = 0.0;
        }
        true
    }

    fn execute_diplomacy(
        &mut self,
        target: &FactionId,
        cost: Decimal,
        lookup: &dyn FactionLookup,
    ) -> Option<AgentAction> {
        let current = lookup.status_between(&self.id, target)?;
        let status = current.improved();
        if status == current {
            return None;
        }
        let price = ResourceCost::new().with(ResourceKind::Food, cost);
        if let Err(err) = self.ledger.deduct(&price) {
            debug!(faction = %self.id, target = %target, error = %err, "overture not paid");
            return None;
        }
        Some(AgentAction::ImproveRelation {
            target: target.clone(),
            status,
        })
    }

    // -----------------------------------------------------------------------
    // Modifiers
    // -----------------------------------------------------------------------

    /// Apply the standing bonus of entering `status`.
    ///
    /// | Status   | Effect                                   |
    /// |----------|------------------------------------------|
    /// | Allied   | research speed x1.2, economic strength x1.1 |
    /// | Friendly | research speed x1.1                      |
    /// | Hostile  | military strength x1.1                   |
    /// | War      | military strength x1.2                   |
    pub fn apply_status_effects(&mut self, status: DiplomaticStatus) {
        match status {
            DiplomaticStatus::Allied => {
                self.research_speed *= 1.2;
                self.economic_strength *= 1.1;
            }
            DiplomaticStatus::Friendly => self.research_speed *= 1.1,
            DiplomaticStatus::Hostile => self.military_strength *= 1.1,
            DiplomaticStatus::War => self.military_strength *= 1.2,
            DiplomaticStatus::Neutral => {}
        }
    }

    /// Apply one diplomatic effect multiplicatively.
    pub fn apply_effect(&mut self, effect: &Effect) -> Result<(), AgentError> {
        let factor = effect.factor();
        if !factor.is_finite() || factor < 0.0 {
            return Err(AgentError::InvalidState {
                faction: self.id.clone(),
                reason: format!("effect factor {factor} for {:?}", effect.effect_type),
            });
        }
        match effect.effect_type {
            EffectType::ResearchSpeed => self.research_speed *= factor,
            EffectType::EconomicStrength => self.economic_strength *= factor,
            EffectType::MilitaryStrength => self.military_strength *= factor,
            EffectType::PopulationGrowth => self.growth_multiplier *= factor,
            EffectType::ExplorationSpeed => self.exploration_speed *= factor,
            EffectType::ResourceProduction => self.ledger.scale_production(factor)?,
        }
        Ok(())
    }

    /// Pay `cost` from this faction's stocks, all or nothing.
    pub fn pay(&mut self, cost: &ResourceCost) -> Result<(), AgentError> {
        self.ledger.deduct(cost)?;
        Ok(())
    }
}

fn check_scalar(faction: &FactionId, field: &str, value: f64) -> Result<(), AgentError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(AgentError::InvalidState {
            faction: faction.clone(),
            reason: format!("{field} must be finite and non-negative, got {value}"),
        })
    }
}
