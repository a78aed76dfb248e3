//! The faction director: per-turn orchestration of every faction.
//!
//! Each call to [`FactionDirector::update`] runs one turn:
//!
//! 1. **Agents** -- every faction, in id order, runs its own update. A
//!    relation action it returns is applied through the relation table, and
//!    both parties receive the status side effects.
//! 2. **Drift** -- every ordered pair takes one draw from the
//!    [`RandomSource`]. A realized change moves the pair one rung. Moves to
//!    friendly or allied are followed by the matching diplomatic event when
//!    the source can pay for it.
//! 3. **Aging** -- the event catalog is advanced to the next turn.
//! 4. The turn counter increments.
//!
//! All collaborators are supplied through [`FactionDirectorBuilder`]; a
//! missing one fails the build rather than a later turn.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use tracing::{debug, info, warn};

use civsim_agents::{
    AgentAction, AgentError, Decision, DecisionConfig, DiplomaticEvent, DiplomaticEventCatalog,
    FactionAgent, FactionConfig, FactionLookup, PassiveEvaluator, RelationTable, StateEvaluator,
    TurnContext, event_for_status, initial_status,
};
use civsim_types::{DiplomaticStatus, FactionId, HexCoord};
use civsim_world::{
    BuildingAuthority, BuildingRegistry, DistanceProvider, HexGrid, TechAuthority, TechTree,
};

use crate::config::SimulationConfig;
use crate::drift::{self, DriftConfig};
use crate::persist::{self, PersistError};
use crate::random::{RandomSource, SeededRandom};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors raised while assembling a director.
#[derive(Debug, thiserror::Error)]
pub enum DirectorError {
    /// A required collaborator was not supplied to the builder.
    #[error("missing required collaborator: {0}")]
    MissingCollaborator(&'static str),

    /// Two factions share an id.
    #[error("duplicate faction id {0}")]
    DuplicateFaction(FactionId),

    /// A faction description could not be turned into an agent.
    #[error("invalid faction {faction}: {source}")]
    InvalidFaction {
        /// The rejected faction.
        faction: FactionId,
        /// Why it was rejected.
        source: AgentError,
    },
}

// ---------------------------------------------------------------------------
// Turn summary
// ---------------------------------------------------------------------------

/// Why a relation changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeCause {
    /// A faction executed a diplomacy decision.
    Overture,
    /// Random drift.
    Drift,
}

/// One relation transition during a turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationChange {
    /// The faction whose turn or draw caused the change.
    pub from_faction: FactionId,
    /// The counterpart.
    pub to_faction: FactionId,
    /// Status before.
    pub previous: DiplomaticStatus,
    /// Status after.
    pub current: DiplomaticStatus,
    /// What triggered the change.
    pub cause: ChangeCause,
}

/// A decision selected by one faction during a turn.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionRecord {
    /// The deciding faction.
    pub faction: FactionId,
    /// The selected decision.
    pub decision: Decision,
    /// Whether it took effect.
    pub executed: bool,
}

/// What happened during one turn.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TurnSummary {
    /// The turn that ran.
    pub turn: u64,
    /// Decisions selected, in faction order.
    pub decisions: Vec<DecisionRecord>,
    /// Relation transitions, in the order they happened.
    pub relation_changes: Vec<RelationChange>,
    /// Diplomatic events executed.
    pub events: Vec<DiplomaticEvent>,
    /// Events that expired at the end of the turn.
    pub expired_events: usize,
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Assembles a [`FactionDirector`].
#[derive(Default)]
pub struct FactionDirectorBuilder {
    factions: Vec<FactionConfig>,
    decisions: DecisionConfig,
    drift: DriftConfig,
    distance: Option<Box<dyn DistanceProvider>>,
    techs: Option<Box<dyn TechAuthority>>,
    buildings: Option<Box<dyn BuildingAuthority>>,
    random: Option<Box<dyn RandomSource>>,
    evaluator: Option<Box<dyn StateEvaluator>>,
}

impl FactionDirectorBuilder {
    /// An empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// A builder wired from `config` with the reference collaborators: a
    /// bounded [`HexGrid`], a [`TechTree`], a [`BuildingRegistry`] confined
    /// to the grid, and a [`SeededRandom`] from the world seed.
    pub fn from_config(config: &SimulationConfig) -> Self {
        let grid = HexGrid::new(config.world.width, config.world.height);
        Self::new()
            .factions(config.factions.iter().cloned())
            .decisions(config.decisions.clone())
            .drift(config.drift.clone())
            .distance(grid)
            .tech_authority(TechTree::new())
            .building_authority(BuildingRegistry::bounded(grid))
            .random(SeededRandom::new(config.world.seed))
            .boxed_evaluator(config.evaluator.build())
    }

    /// Add one faction.
    #[must_use]
    pub fn faction(mut self, config: FactionConfig) -> Self {
        self.factions.push(config);
        self
    }

    /// Add several factions.
    #[must_use]
    pub fn factions(mut self, configs: impl IntoIterator<Item = FactionConfig>) -> Self {
        self.factions.extend(configs);
        self
    }

    /// Decision tunables shared by every faction.
    #[must_use]
    pub fn decisions(mut self, config: DecisionConfig) -> Self {
        self.decisions = config;
        self
    }

    /// Relation drift tunables.
    #[must_use]
    pub fn drift(mut self, config: DriftConfig) -> Self {
        self.drift = config;
        self
    }

    /// Hex distance provider. Required.
    #[must_use]
    pub fn distance(mut self, provider: impl DistanceProvider + 'static) -> Self {
        self.distance = Some(Box::new(provider));
        self
    }

    /// Research authority. Required.
    #[must_use]
    pub fn tech_authority(mut self, authority: impl TechAuthority + 'static) -> Self {
        self.techs = Some(Box::new(authority));
        self
    }

    /// Building placement authority. Required.
    #[must_use]
    pub fn building_authority(mut self, authority: impl BuildingAuthority + 'static) -> Self {
        self.buildings = Some(Box::new(authority));
        self
    }

    /// Source of drift draws. Required.
    #[must_use]
    pub fn random(mut self, source: impl RandomSource + 'static) -> Self {
        self.random = Some(Box::new(source));
        self
    }

    /// Situation assessment. Defaults to the passive evaluator.
    #[must_use]
    pub fn evaluator(self, evaluator: impl StateEvaluator + 'static) -> Self {
        self.boxed_evaluator(Box::new(evaluator))
    }

    /// Situation assessment, already boxed.
    #[must_use]
    pub fn boxed_evaluator(mut self, evaluator: Box<dyn StateEvaluator>) -> Self {
        self.evaluator = Some(evaluator);
        self
    }

    /// Validate the factions and assemble the director.
    ///
    /// Opening relations follow [`initial_status`].
    pub fn build(self) -> Result<FactionDirector, DirectorError> {
        let distance = self
            .distance
            .ok_or(DirectorError::MissingCollaborator("distance provider"))?;
        let techs = self
            .techs
            .ok_or(DirectorError::MissingCollaborator("tech authority"))?;
        let buildings = self
            .buildings
            .ok_or(DirectorError::MissingCollaborator("building authority"))?;
        let random = self
            .random
            .ok_or(DirectorError::MissingCollaborator("random source"))?;
        let evaluator = self
            .evaluator
            .unwrap_or_else(|| Box::new(PassiveEvaluator));

        let mut agents = BTreeMap::new();
        let mut relations = RelationTable::new();
        for config in &self.factions {
            if agents.contains_key(&config.id) {
                return Err(DirectorError::DuplicateFaction(config.id.clone()));
            }
            let agent = FactionAgent::from_config(config, &self.decisions).map_err(|source| {
                DirectorError::InvalidFaction {
                    faction: config.id.clone(),
                    source,
                }
            })?;
            relations.register(agent.id().clone());
            agents.insert(agent.id().clone(), agent);
        }

        let ids: Vec<&FactionId> = agents.keys().collect();
        for (i, a) in ids.iter().enumerate() {
            for b in ids.iter().skip(i.saturating_add(1)) {
                if let (Some(fa), Some(fb)) = (agents.get(*a), agents.get(*b)) {
                    relations.set(a, b, initial_status(fa.personality(), fb.personality()));
                }
            }
        }

        info!(factions = agents.len(), "faction director ready");
        Ok(FactionDirector {
            turn: 0,
            agents,
            relations,
            catalog: DiplomaticEventCatalog::new(),
            distance,
            techs,
            buildings,
            random,
            evaluator,
            decisions: self.decisions,
            drift: self.drift,
        })
    }
}

// ---------------------------------------------------------------------------
// Director
// ---------------------------------------------------------------------------

/// Owns every faction, the relation table and the event catalog.
pub struct FactionDirector {
    turn: u64,
    agents: BTreeMap<FactionId, FactionAgent>,
    relations: RelationTable,
    catalog: DiplomaticEventCatalog,
    distance: Box<dyn DistanceProvider>,
    techs: Box<dyn TechAuthority>,
    buildings: Box<dyn BuildingAuthority>,
    random: Box<dyn RandomSource>,
    evaluator: Box<dyn StateEvaluator>,
    decisions: DecisionConfig,
    drift: DriftConfig,
}

impl fmt::Debug for FactionDirector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FactionDirector")
            .field("turn", &self.turn)
            .field("agents", &self.agents)
            .field("relations", &self.relations)
            .field("catalog", &self.catalog)
            .finish_non_exhaustive()
    }
}

impl FactionDirector {
    /// Start a builder.
    pub fn builder() -> FactionDirectorBuilder {
        FactionDirectorBuilder::new()
    }

    /// Every faction, keyed by id.
    pub const fn factions(&self) -> &BTreeMap<FactionId, FactionAgent> {
        &self.agents
    }

    /// One faction by id.
    pub fn faction(&self, id: &FactionId) -> Option<&FactionAgent> {
        self.agents.get(id)
    }

    /// The next turn to run.
    pub const fn turn(&self) -> u64 {
        self.turn
    }

    /// The diplomatic event registry.
    pub const fn event_catalog(&self) -> &DiplomaticEventCatalog {
        &self.catalog
    }

    /// The relation table.
    pub const fn relations(&self) -> &RelationTable {
        &self.relations
    }

    /// Status between two factions, `None` for unknown or identical ids.
    pub fn relation_between(&self, a: &FactionId, b: &FactionId) -> Option<DiplomaticStatus> {
        self.relations.status_between(a, b)
    }

    /// Run one turn.
    pub fn update(&mut self) -> TurnSummary {
        let turn = self.turn;
        let mut summary = TurnSummary {
            turn,
            ..TurnSummary::default()
        };

        self.run_agents(turn, &mut summary);
        self.drift_relations(turn, &mut summary);
        summary.expired_events = self.catalog.update_events(turn.saturating_add(1));
        self.turn = turn.saturating_add(1);

        info!(
            turn,
            decisions = summary.decisions.len(),
            relation_changes = summary.relation_changes.len(),
            events = summary.events.len(),
            expired = summary.expired_events,
            "turn complete"
        );
        summary
    }

    fn run_agents(&mut self, turn: u64, summary: &mut TurnSummary) {
        let ids: Vec<FactionId> = self.agents.keys().cloned().collect();
        for id in ids {
            let claimed: BTreeSet<HexCoord> = self
                .agents
                .values()
                .flat_map(|agent| agent.territory().iter().copied())
                .collect();
            let Some(agent) = self.agents.get_mut(&id) else {
                continue;
            };
            let mut ctx = TurnContext {
                turn,
                techs: &mut *self.techs,
                buildings: &mut *self.buildings,
                lookup: &self.relations,
                claimed: &claimed,
                evaluator: &*self.evaluator,
                config: &self.decisions,
            };
            let outcome = agent.update(&mut ctx);

            if let Some(decision) = outcome.decision {
                summary.decisions.push(DecisionRecord {
                    faction: id.clone(),
                    decision,
                    executed: outcome.executed,
                });
            }
            if let Some(AgentAction::ImproveRelation { target, status }) = outcome.action {
                self.apply_overture(&id, &target, status, summary);
            }
        }
    }

    fn apply_overture(
        &mut self,
        source: &FactionId,
        target: &FactionId,
        status: DiplomaticStatus,
        summary: &mut TurnSummary,
    ) {
        let Some(previous) = self.relations.set(source, target, status) else {
            debug!(source = %source, target = %target, "overture to unknown faction dropped");
            return;
        };
        for id in [source, target] {
            if let Some(agent) = self.agents.get_mut(id) {
                agent.apply_status_effects(status);
            }
        }
        info!(source = %source, target = %target, ?previous, ?status, "relation improved by overture");
        summary.relation_changes.push(RelationChange {
            from_faction: source.clone(),
            to_faction: target.clone(),
            previous,
            current: status,
            cause: ChangeCause::Overture,
        });
    }

    fn drift_relations(&mut self, turn: u64, summary: &mut TurnSummary) {
        let ids: Vec<FactionId> = self.agents.keys().cloned().collect();
        for a in &ids {
            for b in &ids {
                if a == b {
                    continue;
                }
                let (Some(fa), Some(fb)) = (self.agents.get(a), self.agents.get(b)) else {
                    continue;
                };
                let probability =
                    drift::transition_probability(fa, fb, &*self.distance, &self.drift);
                let draw = self.random.next_f64();

                let Some(current) = self.relations.status_between(a, b) else {
                    continue;
                };
                if draw >= probability.abs() {
                    continue;
                }
                let next = drift::next_status(current, probability);
                if next == current {
                    continue;
                }

                self.relations.set(a, b, next);
                info!(a = %a, b = %b, previous = ?current, current = ?next, probability, "relation drifted");
                summary.relation_changes.push(RelationChange {
                    from_faction: a.clone(),
                    to_faction: b.clone(),
                    previous: current,
                    current: next,
                    cause: ChangeCause::Drift,
                });

                if let Some(event) = self.run_event(a, b, next, turn) {
                    summary.events.push(event);
                }
            }
        }
    }

    /// Create and execute the event matching a move to `status`, if any.
    fn run_event(
        &mut self,
        source_id: &FactionId,
        target_id: &FactionId,
        status: DiplomaticStatus,
        turn: u64,
    ) -> Option<DiplomaticEvent> {
        let event_type = event_for_status(status)?;
        let mut source = self.agents.remove(source_id)?;
        let Some(mut target) = self.agents.remove(target_id) else {
            self.agents.insert(source_id.clone(), source);
            return None;
        };

        let executed = match self
            .catalog
            .create_event(event_type, &source, &target, status, turn)
        {
            Some(event) => self
                .catalog
                .execute_event(&event, &mut source, &mut target, &mut self.relations)
                .then_some(event),
            None => {
                debug!(source = %source_id, ?event_type, "no event for relation change");
                None
            }
        };

        self.agents.insert(source_id.clone(), source);
        self.agents.insert(target_id.clone(), target);
        executed
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    /// Capture the director as a snapshot.
    pub fn snapshot(&self) -> persist::DirectorSnapshot {
        persist::capture(self.turn, &self.agents, &self.relations)
    }

    /// Serialize the director as a JSON snapshot.
    pub fn serialize(&self) -> Result<String, PersistError> {
        Ok(serde_json::to_string_pretty(&self.snapshot())?)
    }

    /// Replace faction state, relations and the turn counter from a JSON
    /// snapshot. Live events and active effects belong to the discarded
    /// timeline and are cleared.
    ///
    /// The blob is validated completely first; on any error the director
    /// is left untouched.
    pub fn deserialize(&mut self, blob: &str) -> Result<(), PersistError> {
        let roster: BTreeSet<FactionId> = self.agents.keys().cloned().collect();
        let restored = persist::parse(blob).and_then(|snapshot| persist::restore(snapshot, &roster));
        match restored {
            Ok(state) => {
                self.turn = state.turn;
                self.agents = state.agents;
                self.relations = state.relations;
                self.catalog = DiplomaticEventCatalog::new();
                info!(turn = self.turn, "director restored from snapshot");
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "snapshot rejected");
                Err(err)
            }
        }
    }
}
