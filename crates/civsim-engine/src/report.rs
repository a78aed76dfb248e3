//! Turn and end-of-run logging.

use rust_decimal::Decimal;
use tracing::{debug, info};

use civsim_agents::FactionAgent;
use civsim_core::{FactionDirector, TurnSummary};
use civsim_types::{Epoch, FactionId, ResourceKind};

/// One faction's position at the end of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct Standing {
    /// Faction key.
    pub faction: FactionId,
    /// Technological epoch reached.
    pub epoch: Epoch,
    /// Final population.
    pub population: u64,
    /// Owned hexes.
    pub territory: usize,
    /// Food on hand.
    pub food: Decimal,
    /// Gold on hand.
    pub gold: Decimal,
}

impl Standing {
    fn of(agent: &FactionAgent) -> Self {
        Self {
            faction: agent.id().clone(),
            epoch: agent.epoch(),
            population: agent.population(),
            territory: agent.territory().len(),
            food: agent.ledger().amount(ResourceKind::Food),
            gold: agent.ledger().amount(ResourceKind::Gold),
        }
    }
}

/// Factions ranked by population, then territory, then id.
pub fn standings(director: &FactionDirector) -> Vec<Standing> {
    let mut standings: Vec<Standing> = director.factions().values().map(Standing::of).collect();
    standings.sort_by(|a, b| {
        b.population
            .cmp(&a.population)
            .then(b.territory.cmp(&a.territory))
            .then_with(|| a.faction.cmp(&b.faction))
    });
    standings
}

/// Log the details of one turn at debug level.
pub fn log_turn(summary: &TurnSummary) {
    for record in &summary.decisions {
        debug!(
            turn = summary.turn,
            faction = %record.faction,
            kind = ?record.decision.kind,
            priority = record.decision.priority,
            executed = record.executed,
            "decision"
        );
    }
    for change in &summary.relation_changes {
        debug!(
            turn = summary.turn,
            from = %change.from_faction,
            to = %change.to_faction,
            previous = ?change.previous,
            current = ?change.current,
            cause = ?change.cause,
            "relation change"
        );
    }
}

/// Log the final standings and every relation.
pub fn log_run_end(director: &FactionDirector) {
    for (rank, standing) in standings(director).iter().enumerate() {
        info!(
            rank = rank.saturating_add(1),
            faction = %standing.faction,
            epoch = ?standing.epoch,
            population = standing.population,
            territory = standing.territory,
            food = %standing.food,
            gold = %standing.gold,
            "final standing"
        );
    }
    for (a, b, status) in director.relations().pairs() {
        info!(a = %a, b = %b, ?status, "final relation");
    }
}
