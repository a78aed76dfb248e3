//! JSON snapshots of director state.
//!
//! A [`DirectorSnapshot`] holds the turn counter and one
//! [`FactionSnapshot`] per faction, each carrying that faction's view of
//! its relations. Pending decisions, live events and active effects are
//! not persisted.
//!
//! [`restore`] validates a snapshot completely before anything is handed
//! back, so a rejected blob never touches live state.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use civsim_agents::{AgentError, FactionAgent, FactionSnapshot, RelationError, RelationTable};
use civsim_types::FactionId;

/// Errors raised while writing or reading a snapshot.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    /// The blob is not valid snapshot JSON.
    #[error("snapshot JSON error: {source}")]
    Json {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },

    /// The snapshot names a faction the director does not have.
    #[error("snapshot contains unknown faction {0}")]
    UnknownFaction(FactionId),

    /// The snapshot omits a faction the director has.
    #[error("snapshot is missing faction {0}")]
    MissingFaction(FactionId),

    /// The snapshot lists a faction more than once.
    #[error("snapshot lists faction {0} more than once")]
    DuplicateFaction(FactionId),

    /// The relation maps are inconsistent.
    #[error("snapshot relations are invalid: {source}")]
    Relations {
        /// The underlying relation error.
        #[from]
        source: RelationError,
    },

    /// A faction's own state is malformed.
    #[error("snapshot state for {faction} is invalid: {source}")]
    Faction {
        /// The faction whose state was rejected.
        faction: FactionId,
        /// The underlying agent error.
        source: AgentError,
    },
}

/// Serializable director state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectorSnapshot {
    /// Turn counter at capture time.
    pub turn: u64,
    /// Wall-clock capture time. Informational only.
    pub saved_at: DateTime<Utc>,
    /// Every faction, in id order.
    pub factions: Vec<FactionSnapshot>,
}

/// State rebuilt from a validated snapshot.
#[derive(Debug)]
pub struct RestoredState {
    /// Turn counter.
    pub turn: u64,
    /// Rebuilt factions.
    pub agents: BTreeMap<FactionId, FactionAgent>,
    /// Rebuilt relation table.
    pub relations: RelationTable,
}

/// Capture the persistable part of a director.
pub fn capture(
    turn: u64,
    agents: &BTreeMap<FactionId, FactionAgent>,
    relations: &RelationTable,
) -> DirectorSnapshot {
    DirectorSnapshot {
        turn,
        saved_at: Utc::now(),
        factions: agents
            .values()
            .map(|agent| agent.to_snapshot(relations.relations_of(agent.id())))
            .collect(),
    }
}

/// Parse a snapshot blob.
pub fn parse(blob: &str) -> Result<DirectorSnapshot, PersistError> {
    Ok(serde_json::from_str(blob)?)
}

/// Validate `snapshot` against the director's `roster` and rebuild state.
///
/// The snapshot must contain exactly the roster's factions, each once,
/// with symmetric relation maps and well-formed scalars and stocks.
pub fn restore(
    snapshot: DirectorSnapshot,
    roster: &BTreeSet<FactionId>,
) -> Result<RestoredState, PersistError> {
    let mut seen = BTreeSet::new();
    for faction in &snapshot.factions {
        if !roster.contains(&faction.id) {
            return Err(PersistError::UnknownFaction(faction.id.clone()));
        }
        if !seen.insert(faction.id.clone()) {
            return Err(PersistError::DuplicateFaction(faction.id.clone()));
        }
    }
    if let Some(missing) = roster.difference(&seen).next() {
        return Err(PersistError::MissingFaction(missing.clone()));
    }

    let views: BTreeMap<FactionId, _> = snapshot
        .factions
        .iter()
        .map(|faction| (faction.id.clone(), faction.relations.clone()))
        .collect();
    let relations = RelationTable::from_views(&views)?;

    let mut agents = BTreeMap::new();
    for faction in snapshot.factions {
        let id = faction.id.clone();
        let agent = FactionAgent::from_snapshot(faction).map_err(|source| {
            PersistError::Faction {
                faction: id.clone(),
                source,
            }
        })?;
        agents.insert(id, agent);
    }

    Ok(RestoredState {
        turn: snapshot.turn,
        agents,
        relations,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use civsim_agents::{DecisionConfig, FactionConfig};
    use civsim_types::DiplomaticStatus;

    fn world() -> (BTreeMap<FactionId, FactionAgent>, RelationTable) {
        let decisions = DecisionConfig::default();
        let mut agents = BTreeMap::new();
        let mut relations = RelationTable::new();
        for config in FactionConfig::stock_opponents() {
            let agent = FactionAgent::from_config(&config, &decisions).unwrap();
            relations.register(agent.id().clone());
            agents.insert(agent.id().clone(), agent);
        }
        relations.set(
            &FactionId::new("ai1"),
            &FactionId::new("ai2"),
            DiplomaticStatus::Hostile,
        );
        (agents, relations)
    }

    #[test]
    fn capture_then_restore_is_lossless() {
        let (agents, relations) = world();
        let snapshot = capture(9, &agents, &relations);
        let blob = serde_json::to_string(&snapshot).unwrap();
        let restored = restore(parse(&blob).unwrap(), relations.members()).unwrap();
        assert_eq!(restored.turn, 9);
        assert_eq!(restored.agents, agents);
        assert_eq!(restored.relations, relations);
    }

    #[test]
    fn roster_mismatch_is_rejected() {
        let (agents, relations) = world();
        let mut snapshot = capture(0, &agents, &relations);
        let dropped = snapshot.factions.pop().unwrap();
        assert!(matches!(
            restore(snapshot.clone(), relations.members()),
            Err(PersistError::MissingFaction(id)) if id == dropped.id
        ));

        snapshot.factions.push(snapshot.factions[0].clone());
        assert!(matches!(
            restore(snapshot, relations.members()),
            Err(PersistError::DuplicateFaction(_))
        ));
    }

    #[test]
    fn garbage_is_a_json_error() {
        assert!(matches!(parse("{\"turn\": "), Err(PersistError::Json { .. })));
    }
}
