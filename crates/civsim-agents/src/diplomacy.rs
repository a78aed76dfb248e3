//! Diplomatic event templates and the registry of active events.
//!
//! Every [`DiplomaticEventType`] has one fixed template: a cost paid by the
//! source faction, a duration in turns, and a single effect applied to both
//! parties. [`DiplomaticEventCatalog`] creates events from templates,
//! executes them, and ages their effects once per turn.
//!
//! | Type              | Cost                        | Turns | Effect                     |
//! |-------------------|-----------------------------|-------|----------------------------|
//! | TradeAgreement    | gold 10, food 20            | 10    | economic strength +10%     |
//! | ResearchPact      | tech points 15, gold 20     | 15    | research speed +15%        |
//! | MilitaryAlliance  | metal 30, food 40           | 20    | military strength +20%     |
//! | ResourceSharing   | food 30, wood 20, stone 15  | 12    | resource production +10%   |
//! | PeaceTreaty       | gold 50, food 40            | 25    | economic strength +15%     |
//! | NonAggressionPact | gold 20, food 15            | 15    | economic strength +5%      |
//! | CulturalExchange  | gold 15, food 10            | 10    | population growth +10%     |
//! | JointExploration  | food 25, wood 15            | 12    | exploration speed +20%     |

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use civsim_ledger::ResourceCost;
use civsim_types::{
    DiplomaticEventType, DiplomaticStatus, Effect, EffectType, EventId, FactionId, ResourceKind,
};

use crate::agent::FactionAgent;
use crate::relations::RelationTable;

// ---------------------------------------------------------------------------
// Templates
// ---------------------------------------------------------------------------

/// Static definition of one event type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventTemplate {
    /// The event type this template defines.
    pub event_type: DiplomaticEventType,
    /// Cost lines paid by the source.
    pub cost: &'static [(ResourceKind, i64)],
    /// Turns the event and its effect last.
    pub duration: u32,
    /// Scalar modified on both parties.
    pub effect_type: EffectType,
    /// Fractional change applied as `*= 1 + value`.
    pub effect_value: f64,
    /// Description attached to the effect.
    pub effect_description: &'static str,
    /// Description attached to the event.
    pub description: &'static str,
}

impl EventTemplate {
    /// Cost as a [`ResourceCost`].
    pub fn cost(&self) -> ResourceCost {
        self.cost
            .iter()
            .map(|(resource, qty)| (*resource, Decimal::from(*qty)))
            .collect()
    }

    /// A fresh copy of the template's effect.
    pub fn effect(&self) -> Effect {
        Effect {
            effect_type: self.effect_type,
            value: self.effect_value,
            remaining: self.duration,
            description: String::from(self.effect_description),
        }
    }
}

/// Look up the template for `event_type`.
pub const fn template(event_type: DiplomaticEventType) -> EventTemplate {
    use DiplomaticEventType as T;
    use EffectType as E;
    use ResourceKind::{Food, Gold, Metal, Stone, TechPoints, Wood};

    match event_type {
        T::TradeAgreement => tpl(
            event_type,
            &[(Gold, 10), (Food, 20)],
            10,
            (E::EconomicStrength, 0.10, "Increased economic strength from trade"),
            "Establish trade routes between civilizations",
        ),
        T::ResearchPact => tpl(
            event_type,
            &[(TechPoints, 15), (Gold, 20)],
            15,
            (E::ResearchSpeed, 0.15, "Faster research through knowledge sharing"),
            "Share knowledge and research findings",
        ),
        T::MilitaryAlliance => tpl(
            event_type,
            &[(Metal, 30), (Food, 40)],
            20,
            (E::MilitaryStrength, 0.20, "Enhanced military capabilities through alliance"),
            "Form a military alliance for mutual defense",
        ),
        T::ResourceSharing => tpl(
            event_type,
            &[(Food, 30), (Wood, 20), (Stone, 15)],
            12,
            (E::ResourceProduction, 0.10, "Improved resource production through sharing"),
            "Share resources and production capabilities",
        ),
        T::PeaceTreaty => tpl(
            event_type,
            &[(Gold, 50), (Food, 40)],
            25,
            (E::EconomicStrength, 0.15, "Economic recovery from peace"),
            "End hostilities and establish peace",
        ),
        T::NonAggressionPact => tpl(
            event_type,
            &[(Gold, 20), (Food, 15)],
            15,
            (E::EconomicStrength, 0.05, "Slight economic boost from stability"),
            "Agree to maintain peaceful relations",
        ),
        T::CulturalExchange => tpl(
            event_type,
            &[(Gold, 15), (Food, 10)],
            10,
            (E::PopulationGrowth, 0.10, "Population growth from cultural exchange"),
            "Exchange cultural knowledge and traditions",
        ),
        T::JointExploration => tpl(
            event_type,
            &[(Food, 25), (Wood, 15)],
            12,
            (E::ExplorationSpeed, 0.20, "Faster exploration through cooperation"),
            "Collaborate on map exploration",
        ),
    }
}

const fn tpl(
    event_type: DiplomaticEventType,
    cost: &'static [(ResourceKind, i64)],
    duration: u32,
    effect: (EffectType, f64, &'static str),
    description: &'static str,
) -> EventTemplate {
    EventTemplate {
        event_type,
        cost,
        duration,
        effect_type: effect.0,
        effect_value: effect.1,
        effect_description: effect.2,
        description,
    }
}

/// The event that accompanies a relation moving to `status`, if any.
pub const fn event_for_status(status: DiplomaticStatus) -> Option<DiplomaticEventType> {
    match status {
        DiplomaticStatus::Allied => Some(DiplomaticEventType::MilitaryAlliance),
        DiplomaticStatus::Friendly => Some(DiplomaticEventType::TradeAgreement),
        DiplomaticStatus::Neutral | DiplomaticStatus::Hostile | DiplomaticStatus::War => None,
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// A diplomatic transaction between two factions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiplomaticEvent {
    /// Unique id.
    pub id: EventId,
    /// Template the event was built from.
    pub event_type: DiplomaticEventType,
    /// Faction that proposed and pays for the event.
    pub source: FactionId,
    /// Counterpart.
    pub target: FactionId,
    /// Status both parties hold once the event executes.
    pub status: DiplomaticStatus,
    /// Cost paid by the source.
    pub cost: ResourceCost,
    /// Lifetime in turns.
    pub duration: u32,
    /// Effects applied to both parties.
    pub effects: Vec<Effect>,
    /// Human-readable description.
    pub description: String,
    /// Turn the event was created.
    pub created_at_turn: u64,
    /// First turn on which the event is no longer tracked.
    pub expires_at_turn: u64,
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// Registry of live events and per-faction active effects.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiplomaticEventCatalog {
    events: BTreeMap<EventId, DiplomaticEvent>,
    active_effects: BTreeMap<FactionId, Vec<Effect>>,
}

impl DiplomaticEventCatalog {
    /// An empty catalog.
    pub const fn new() -> Self {
        Self {
            events: BTreeMap::new(),
            active_effects: BTreeMap::new(),
        }
    }

    /// Build an event of `event_type` from `source` to `target` and store it.
    ///
    /// Returns `None` when `status` is not allowed for the type, when both
    /// sides are the same faction, or when the source cannot pay the cost.
    /// The target's stocks are never consulted.
    pub fn create_event(
        &mut self,
        event_type: DiplomaticEventType,
        source: &FactionAgent,
        target: &FactionAgent,
        status: DiplomaticStatus,
        turn: u64,
    ) -> Option<DiplomaticEvent> {
        if !event_type.is_valid_for(status) || source.id() == target.id() {
            return None;
        }
        let tpl = template(event_type);
        let cost = tpl.cost();
        if !source.ledger().can_afford(&cost) {
            debug!(source = %source.id(), ?event_type, "event unaffordable");
            return None;
        }

        let event = DiplomaticEvent {
            id: EventId::new(),
            event_type,
            source: source.id().clone(),
            target: target.id().clone(),
            status,
            cost,
            duration: tpl.duration,
            effects: vec![tpl.effect()],
            description: String::from(tpl.description),
            created_at_turn: turn,
            expires_at_turn: turn.saturating_add(u64::from(tpl.duration)),
        };
        self.events.insert(event.id, event.clone());
        Some(event)
    }

    /// Carry out `event`: the source pays, both sides receive every effect,
    /// and their mutual status becomes the event's status.
    ///
    /// Returns `false` when the agents do not match the event's parties or
    /// the source can no longer pay. Neither agent is touched and the event
    /// is dropped from the registry.
    pub fn execute_event(
        &mut self,
        event: &DiplomaticEvent,
        source: &mut FactionAgent,
        target: &mut FactionAgent,
        relations: &mut RelationTable,
    ) -> bool {
        if source.id() != &event.source || target.id() != &event.target {
            warn!(event = %event.id, "event parties do not match the agents given");
            self.events.remove(&event.id);
            return false;
        }
        if let Err(err) = source.pay(&event.cost) {
            debug!(event = %event.id, error = %err, "event cost not paid");
            self.events.remove(&event.id);
            return false;
        }
        self.events
            .entry(event.id)
            .or_insert_with(|| event.clone());

        for party in [&mut *source, &mut *target] {
            for effect in &event.effects {
                if let Err(err) = party.apply_effect(effect) {
                    warn!(faction = %party.id(), error = %err, "effect skipped");
                    continue;
                }
                self.active_effects
                    .entry(party.id().clone())
                    .or_default()
                    .push(effect.clone());
            }
        }
        relations.set(&event.source, &event.target, event.status);

        info!(
            event = %event.id,
            event_type = ?event.event_type,
            source = %event.source,
            target = %event.target,
            status = ?event.status,
            "diplomatic event executed"
        );
        true
    }

    /// Age the registry to `turn`.
    ///
    /// Events with `expires_at_turn <= turn` are purged. Every active
    /// effect loses one turn and is dropped at zero. Returns the number of
    /// purged events.
    pub fn update_events(&mut self, turn: u64) -> usize {
        let before = self.events.len();
        self.events.retain(|_, event| event.expires_at_turn > turn);
        let expired = before.saturating_sub(self.events.len());

        for effects in self.active_effects.values_mut() {
            for effect in effects.iter_mut() {
                effect.remaining = effect.remaining.saturating_sub(1);
            }
            effects.retain(|effect| effect.remaining > 0);
        }
        self.active_effects.retain(|_, effects| !effects.is_empty());

        if expired > 0 {
            debug!(turn, expired, "diplomatic events expired");
        }
        expired
    }

    /// Effects currently tracked for `faction`.
    pub fn active_effects(&self, faction: &FactionId) -> &[Effect] {
        self.active_effects.get(faction).map_or(&[], Vec::as_slice)
    }

    /// All live events, in id order.
    pub fn events(&self) -> impl Iterator<Item = &DiplomaticEvent> {
        self.events.values()
    }

    /// A live event by id.
    pub fn event(&self, id: EventId) -> Option<&DiplomaticEvent> {
        self.events.get(&id)
    }

    /// Factions that currently have tracked effects.
    pub fn tracked_factions(&self) -> impl Iterator<Item = &FactionId> {
        self.active_effects.keys()
    }
}
