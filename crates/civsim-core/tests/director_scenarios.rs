//! Whole-director scenarios: drift invariants, event flow, persistence and
//! determinism.
//!
//! Runs use [`ScriptedRandom`] when a test needs a specific transition and
//! [`SeededRandom`] when it needs many varied turns.

#![allow(
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::too_many_lines,
    clippy::missing_panics_doc
)]

use civsim_agents::{
    DecisionConfig, DiplomaticEventCatalog, FactionAgent, FactionConfig, HeuristicEvaluator,
};
use civsim_core::{
    ChangeCause, FactionDirector, PersistError, RandomSource, ScriptedRandom, SeededRandom,
};
use civsim_types::{
    DiplomaticEventType, DiplomaticStatus, FactionId, HexCoord, Personality, ResourceKind,
};
use civsim_world::{BuildingRegistry, HexGrid, TechTree};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// =============================================================================
// Helpers
// =============================================================================

fn director(configs: Vec<FactionConfig>, random: impl RandomSource + 'static) -> FactionDirector {
    let grid = HexGrid::new(20, 20);
    FactionDirector::builder()
        .factions(configs)
        .distance(grid)
        .tech_authority(TechTree::new())
        .building_authority(BuildingRegistry::bounded(grid))
        .random(random)
        .evaluator(HeuristicEvaluator)
        .build()
        .unwrap()
}

/// The diplomatic federation and the isolationist kingdom: neutral at the
/// start, mildly compatible, and eight hexes apart.
fn federation_and_kingdom() -> Vec<FactionConfig> {
    let mut configs = FactionConfig::stock_opponents();
    configs.remove(0);
    for config in &mut configs {
        config.economic_strength = 10.0;
    }
    configs[0].starting_resources.insert(ResourceKind::Gold, dec!(100));
    configs
}

/// Two diplomats two hexes apart with matched strength, so only proximity
/// and compatibility move their relation.
fn neighbouring_diplomats() -> Vec<FactionConfig> {
    let stock = FactionConfig::stock_opponents();
    let mut east = stock[1].clone();
    east.id = id("dip_east");
    east.starting_position = HexCoord::new(10, 10);
    east.economic_strength = 10.0;
    east.starting_resources.insert(ResourceKind::Gold, dec!(100));
    let mut west = east.clone();
    west.id = id("dip_west");
    west.starting_position = HexCoord::new(10, 12);
    west.starting_resources.remove(&ResourceKind::Gold);
    vec![east, west]
}

/// Rewrite the relation between `a` and `b` through a snapshot round trip.
fn force_relation(
    director: &mut FactionDirector,
    a: &FactionId,
    b: &FactionId,
    status: DiplomaticStatus,
) {
    let mut snapshot = director.snapshot();
    for faction in &mut snapshot.factions {
        if &faction.id == a {
            faction.relations.insert(b.clone(), status);
        } else if &faction.id == b {
            faction.relations.insert(a.clone(), status);
        }
    }
    let blob = serde_json::to_string(&snapshot).unwrap();
    director.deserialize(&blob).unwrap();
}

fn id(key: &str) -> FactionId {
    FactionId::new(key)
}

fn assert_symmetric(director: &FactionDirector) {
    for a in director.factions().keys() {
        for b in director.factions().keys() {
            assert_eq!(
                director.relation_between(a, b),
                director.relation_between(b, a),
                "{a} vs {b}"
            );
        }
        assert_eq!(director.relation_between(a, a), None);
    }
}

fn assert_well_formed(agent: &FactionAgent) {
    for (resource, stock) in agent.ledger().stocks() {
        assert!(
            stock.amount >= Decimal::ZERO,
            "{} has negative {resource:?}",
            agent.id()
        );
    }
    for value in [
        agent.military_strength(),
        agent.economic_strength(),
        agent.research_speed(),
        agent.tech_progress(),
    ] {
        assert!(value.is_finite() && value >= 0.0, "{}: {value}", agent.id());
    }
}

// =============================================================================
// Invariants over long seeded runs
// =============================================================================

#[test]
fn relations_stay_symmetric_and_move_one_rung() {
    let mut configs = FactionConfig::stock_opponents();
    for config in &mut configs {
        config.military_strength = 20.0;
        config.economic_strength = 20.0;
    }
    let mut director = director(configs, SeededRandom::new(11));

    let mut transitions = 0;
    for _ in 0..200 {
        let summary = director.update();
        for change in &summary.relation_changes {
            assert_ne!(change.previous, change.current);
            assert!(
                change.current == change.previous.improved()
                    || change.current == change.previous.worsened(),
                "{:?} -> {:?} skipped a rung",
                change.previous,
                change.current
            );
            transitions += 1;
        }
        assert_symmetric(&director);
        for agent in director.factions().values() {
            assert_well_formed(agent);
        }
    }
    assert!(transitions > 0, "200 seeded turns produced no drift");
}

#[test]
fn territories_never_overlap() {
    let mut configs = FactionConfig::stock_opponents();
    configs.truncate(2);
    configs[1].starting_position = HexCoord::new(5, 6);
    for config in &mut configs {
        for resource in ResourceKind::ALL {
            config.starting_resources.insert(resource, dec!(500));
        }
    }
    let mut director = director(configs, ScriptedRandom::never());

    for _ in 0..60 {
        director.update();
        let agents: Vec<_> = director.factions().values().collect();
        let overlap: Vec<_> = agents[0]
            .territory()
            .intersection(agents[1].territory())
            .collect();
        assert!(overlap.is_empty(), "turn {}: {overlap:?}", director.turn());
    }
}

#[test]
fn pending_decisions_are_sorted_by_priority() {
    let mut director = director(FactionConfig::stock_opponents(), SeededRandom::new(3));
    for _ in 0..30 {
        director.update();
        for agent in director.factions().values() {
            let priorities: Vec<u8> = agent.decisions().iter().map(|d| d.priority).collect();
            assert!(
                priorities.windows(2).all(|w| w[0] >= w[1]),
                "{}: {priorities:?}",
                agent.id()
            );
        }
    }
}

#[test]
fn one_draw_per_ordered_pair_per_turn() {
    // The script fires only on the very first draw; afterwards every draw is
    // too high. Three factions make six ordered pairs per turn.
    let mut draws = vec![0.999_999; 12];
    draws[0] = 0.0;
    let mut director = director(FactionConfig::stock_opponents(), ScriptedRandom::new(draws));

    let first = director.update();
    let drifted: Vec<_> = first
        .relation_changes
        .iter()
        .filter(|c| c.cause == ChangeCause::Drift)
        .collect();
    assert_eq!(drifted.len(), 1);
    // ai1 and ai2 start hostile and are incompatible: first pair worsens.
    assert_eq!(drifted[0].from_faction, id("ai1"));
    assert_eq!(drifted[0].to_faction, id("ai2"));
    assert_eq!(drifted[0].current, DiplomaticStatus::War);

    let second = director.update();
    assert!(second.relation_changes.is_empty());
}

// =============================================================================
// Event flow
// =============================================================================

#[test]
fn neutral_to_friendly_triggers_a_trade_agreement() {
    let mut director = director(
        federation_and_kingdom(),
        ScriptedRandom::new(vec![0.0, 0.999_999]),
    );
    let (ai2, ai3) = (id("ai2"), id("ai3"));
    assert_eq!(
        director.relation_between(&ai2, &ai3),
        Some(DiplomaticStatus::Neutral)
    );

    let summary = director.update();
    assert_eq!(
        director.relation_between(&ai2, &ai3),
        Some(DiplomaticStatus::Friendly)
    );
    assert_eq!(summary.events.len(), 1);
    let event = &summary.events[0];
    assert_eq!(event.event_type, DiplomaticEventType::TradeAgreement);
    assert_eq!(event.source, ai2);

    // Only the source pays: food 100 + 10 - 5 - 20, gold 100 - 10.
    let source = director.faction(&ai2).unwrap();
    let target = director.faction(&ai3).unwrap();
    assert_eq!(source.ledger().amount(ResourceKind::Gold), dec!(90));
    assert_eq!(source.ledger().amount(ResourceKind::Food), dec!(85));
    assert_eq!(target.ledger().amount(ResourceKind::Food), dec!(105));

    // Both sides gain 10% economic strength and track the effect.
    assert!((source.economic_strength() - 11.0).abs() < 1e-9);
    assert!((target.economic_strength() - 11.0).abs() < 1e-9);
    let catalog = director.event_catalog();
    assert_eq!(catalog.active_effects(&ai2).len(), 1);
    assert_eq!(catalog.active_effects(&ai3).len(), 1);
    assert!(catalog.event(event.id).is_some());
}

#[test]
fn near_neutral_diplomats_become_friendly_and_trade() {
    let mut director = director(
        neighbouring_diplomats(),
        ScriptedRandom::new(vec![0.1, 0.999_999]),
    );
    let (east, west) = (id("dip_east"), id("dip_west"));
    assert_eq!(
        director.relation_between(&east, &west),
        Some(DiplomaticStatus::Friendly)
    );
    force_relation(&mut director, &east, &west, DiplomaticStatus::Neutral);
    assert_eq!(director.turn(), 0);

    // p = 0.2 (two hexes) + 0.5 * 0.3 (compatibility) = 0.35 > 0.1
    let summary = director.update();
    assert_eq!(
        director.relation_between(&east, &west),
        Some(DiplomaticStatus::Friendly)
    );
    assert_eq!(summary.relation_changes.len(), 1);
    assert_eq!(summary.relation_changes[0].from_faction, east);
    assert_eq!(summary.relation_changes[0].cause, ChangeCause::Drift);
    assert_eq!(summary.events.len(), 1);
    assert_eq!(
        summary.events[0].event_type,
        DiplomaticEventType::TradeAgreement
    );

    let source = director.faction(&east).unwrap();
    let target = director.faction(&west).unwrap();
    assert_eq!(source.ledger().amount(ResourceKind::Gold), dec!(90));
    assert_eq!(source.ledger().amount(ResourceKind::Food), dec!(85));
    assert_eq!(target.ledger().amount(ResourceKind::Food), dec!(105));
    assert!((source.economic_strength() - 11.0).abs() < 1e-9);
    assert!((target.economic_strength() - 11.0).abs() < 1e-9);
}

#[test]
fn military_balance_tips_an_otherwise_idle_pair() {
    let stock = FactionConfig::stock_opponents();
    let mut strong = stock[2].clone();
    strong.id = id("strong");
    strong.starting_position = HexCoord::new(5, 5);
    strong.military_strength = 90.0;
    strong.economic_strength = 0.0;
    let mut weak = strong.clone();
    weak.id = id("weak");
    weak.personality = Personality::Trader;
    weak.starting_position = HexCoord::new(10, 10);
    weak.military_strength = 10.0;

    // Seven hexes apart: no proximity term. Compatibility adds 0.03 and the
    // 0.8 balance adds +0.16 for the stronger side, -0.16 for the weaker.
    let mut director = director(vec![strong, weak], ScriptedRandom::new(vec![0.15]));
    let (strong, weak) = (id("strong"), id("weak"));
    assert_eq!(
        director.relation_between(&strong, &weak),
        Some(DiplomaticStatus::Neutral)
    );

    let summary = director.update();
    assert_eq!(summary.relation_changes.len(), 1);
    let change = &summary.relation_changes[0];
    assert_eq!(change.from_faction, strong);
    assert_eq!(change.current, DiplomaticStatus::Friendly);
    // |p| for the weaker side is 0.13, under the 0.15 draw.
    assert_eq!(
        director.relation_between(&weak, &strong),
        Some(DiplomaticStatus::Friendly)
    );
}

#[test]
fn unaffordable_event_still_changes_the_relation() {
    let mut configs = federation_and_kingdom();
    configs[0].starting_resources.clear();
    let mut director = director(configs, ScriptedRandom::new(vec![0.0, 0.999_999]));

    let summary = director.update();
    assert!(summary.events.is_empty());
    assert_eq!(
        director.relation_between(&id("ai2"), &id("ai3")),
        Some(DiplomaticStatus::Friendly)
    );
}

#[test]
fn trade_agreement_expires_after_its_duration() {
    let mut draws = vec![0.999_999; 40];
    draws[0] = 0.0;
    let mut director = director(federation_and_kingdom(), ScriptedRandom::new(draws));
    let event_id = director.update().events[0].id;

    let mut expired_on = None;
    for _ in 0..12 {
        let summary = director.update();
        if summary.expired_events > 0 {
            expired_on = Some(summary.turn);
            break;
        }
    }
    // Created on turn 0 with a ten-turn duration.
    assert_eq!(expired_on, Some(9));
    assert!(director.event_catalog().event(event_id).is_none());
    assert!(director.event_catalog().active_effects(&id("ai2")).is_empty());
}

#[test]
fn research_pact_applies_exactly_once() {
    let decisions = DecisionConfig::default();
    let configs = federation_and_kingdom();
    let mut a = FactionAgent::from_config(&configs[0], &decisions).unwrap();
    let mut b = FactionAgent::from_config(&configs[1], &decisions).unwrap();
    a.ledger_mut()
        .set_amount(ResourceKind::TechPoints, dec!(15))
        .unwrap();
    let mut relations = civsim_agents::RelationTable::new();
    relations.register(a.id().clone());
    relations.register(b.id().clone());

    let mut catalog = DiplomaticEventCatalog::new();
    let event = catalog
        .create_event(
            DiplomaticEventType::ResearchPact,
            &a,
            &b,
            DiplomaticStatus::Friendly,
            0,
        )
        .unwrap();
    assert!(catalog.execute_event(&event, &mut a, &mut b, &mut relations));
    for turn in 1..=20 {
        catalog.update_events(turn);
    }

    assert!((a.research_speed() - 1.15).abs() < 1e-12);
    assert!((b.research_speed() - 1.15).abs() < 1e-12);
    assert_eq!(catalog.events().count(), 0);
}

#[test]
fn event_validity_gates_creation() {
    let decisions = DecisionConfig::default();
    let mut configs = federation_and_kingdom();
    let rich = &mut configs[0].starting_resources;
    for resource in ResourceKind::ALL {
        rich.insert(resource, dec!(1000));
    }
    let a = FactionAgent::from_config(&configs[0], &decisions).unwrap();
    let b = FactionAgent::from_config(&configs[1], &decisions).unwrap();
    let mut catalog = DiplomaticEventCatalog::new();

    let statuses = [
        DiplomaticStatus::War,
        DiplomaticStatus::Hostile,
        DiplomaticStatus::Neutral,
        DiplomaticStatus::Friendly,
        DiplomaticStatus::Allied,
    ];
    for event_type in DiplomaticEventType::ALL {
        for status in statuses {
            let created = catalog.create_event(event_type, &a, &b, status, 0).is_some();
            assert_eq!(
                created,
                event_type.is_valid_for(status),
                "{event_type:?} at {status:?}"
            );
        }
    }
    assert_eq!(catalog.events().count(), 11);
}

// =============================================================================
// Population
// =============================================================================

#[test]
fn food_shortfall_shrinks_population() {
    let mut configs = FactionConfig::stock_opponents();
    configs.truncate(1);
    configs[0].starting_population = 50;
    // 35 + 10 - 5 leaves 40 food for 50 people.
    configs[0]
        .starting_resources
        .insert(ResourceKind::Food, dec!(35));
    let mut director = director(configs, ScriptedRandom::never());

    director.update();
    let agent = director.faction(&id("ai1")).unwrap();
    assert_eq!(agent.population(), 40);
}

// =============================================================================
// Persistence and determinism
// =============================================================================

#[test]
fn snapshot_round_trips_into_a_fresh_director() {
    let mut original = director(FactionConfig::stock_opponents(), SeededRandom::new(5));
    for _ in 0..25 {
        original.update();
    }
    let blob = original.serialize().unwrap();

    let mut restored = director(FactionConfig::stock_opponents(), SeededRandom::new(99));
    restored.deserialize(&blob).unwrap();
    assert_eq!(restored.turn(), 25);
    assert_eq!(restored.relations(), original.relations());
    for (key, agent) in original.factions() {
        let twin = restored.faction(key).unwrap();
        assert_eq!(twin.ledger(), agent.ledger());
        assert_eq!(twin.population(), agent.population());
        assert_eq!(twin.territory(), agent.territory());
        assert_eq!(twin.last_action_turn(), agent.last_action_turn());
        assert!(twin.decisions().is_empty());
    }
}

#[test]
fn restoring_a_snapshot_drops_live_events() {
    let mut director = director(
        federation_and_kingdom(),
        ScriptedRandom::new(vec![0.0, 0.999_999]),
    );
    let blob = director.serialize().unwrap();
    let event_id = director.update().events[0].id;
    let ai2 = id("ai2");
    assert!((director.faction(&ai2).unwrap().economic_strength() - 11.0).abs() < 1e-9);

    director.deserialize(&blob).unwrap();
    assert_eq!(director.turn(), 0);
    let catalog = director.event_catalog();
    assert_eq!(catalog.events().count(), 0);
    assert!(catalog.event(event_id).is_none());
    assert!(catalog.active_effects(&ai2).is_empty());
    assert!(catalog.active_effects(&id("ai3")).is_empty());
    assert!((director.faction(&ai2).unwrap().economic_strength() - 10.0).abs() < 1e-9);
}

#[test]
fn malformed_snapshot_leaves_state_untouched() {
    let mut director = director(FactionConfig::stock_opponents(), SeededRandom::new(5));
    director.update();
    let before_relations = director.relations().clone();
    let before_turn = director.turn();

    let mut snapshot = director.snapshot();
    snapshot.turn = 500;
    snapshot.factions[0]
        .relations
        .insert(id("ai2"), DiplomaticStatus::Allied);
    snapshot.factions[1]
        .relations
        .insert(id("ai1"), DiplomaticStatus::War);
    let asymmetric = serde_json::to_string(&snapshot).unwrap();
    assert!(matches!(
        director.deserialize(&asymmetric),
        Err(PersistError::Relations { .. })
    ));

    let mut snapshot = director.snapshot();
    snapshot.factions[2].id = id("ghost");
    let unknown = serde_json::to_string(&snapshot).unwrap();
    assert!(matches!(
        director.deserialize(&unknown),
        Err(PersistError::UnknownFaction(_))
    ));

    let mut snapshot = director.snapshot();
    snapshot.factions[1].military_strength = -4.0;
    let negative = serde_json::to_string(&snapshot).unwrap();
    assert!(matches!(
        director.deserialize(&negative),
        Err(PersistError::Faction { .. })
    ));

    assert!(director.deserialize("not json").is_err());
    assert_eq!(director.turn(), before_turn);
    assert_eq!(director.relations(), &before_relations);
}

#[test]
fn same_seed_same_history() {
    let mut a = director(FactionConfig::stock_opponents(), SeededRandom::new(2024));
    let mut b = director(FactionConfig::stock_opponents(), SeededRandom::new(2024));
    for _ in 0..60 {
        let sa = a.update();
        let sb = b.update();
        assert_eq!(sa.relation_changes, sb.relation_changes);
        assert_eq!(sa.decisions, sb.decisions);
    }
    assert_eq!(a.snapshot().factions, b.snapshot().factions);
}
