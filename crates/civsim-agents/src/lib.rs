//! Faction decision engine, relations, and diplomatic events.
//!
//! This crate holds the logic of one autonomous faction and of the
//! diplomacy between factions. It performs no I/O: the world is reached
//! through the authority traits of `civsim-world`, and orchestration across
//! factions lives in `civsim-core`.
//!
//! # Modules
//!
//! - [`agent`] -- [`FactionAgent`] and its per-turn update
//! - [`config`] -- Decision tunables ([`DecisionConfig`]) and faction spawn
//!   descriptions ([`FactionConfig`])
//! - [`decision`] -- Candidate generation and scoring
//! - [`diplomacy`] -- Event templates and the [`DiplomaticEventCatalog`]
//! - [`error`] -- Error types for agent operations ([`AgentError`])
//! - [`evaluation`] -- Situation assessment ([`StateEvaluator`])
//! - [`personality`] -- Personality multipliers and compatibility
//! - [`relations`] -- The symmetric [`RelationTable`]

pub mod agent;
pub mod config;
pub mod decision;
pub mod diplomacy;
pub mod error;
pub mod evaluation;
pub mod personality;
pub mod relations;

// Re-export primary types at crate root for convenience.
pub use agent::{AgentAction, AgentTurn, FactionAgent, FactionSnapshot, TurnContext};
pub use config::{DecisionConfig, FactionConfig};
pub use decision::{Decision, DecisionTarget, generate_decisions};
pub use diplomacy::{
    DiplomaticEvent, DiplomaticEventCatalog, EventTemplate, event_for_status, template,
};
pub use error::AgentError;
pub use evaluation::{Finding, HeuristicEvaluator, PassiveEvaluator, StateEvaluator, next_state};
pub use personality::compatibility;
pub use relations::{FactionLookup, RelationError, RelationTable, initial_status};
