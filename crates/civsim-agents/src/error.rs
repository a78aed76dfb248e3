//! Error types for the civsim-agents crate.
//!
//! Ordinary "not applicable" outcomes (unaffordable action, invalid
//! event/status combination, unknown counterpart) are `Option`/`bool`
//! results. The variants here cover genuine failures surfaced while
//! executing a decision or restoring faction state.

use civsim_ledger::LedgerError;
use civsim_types::FactionId;
use civsim_world::WorldError;

use crate::relations::RelationError;

/// Errors that can occur during faction agent operations.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    /// A ledger mutation failed.
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// A world authority rejected a request.
    #[error("world error: {0}")]
    World(#[from] WorldError),

    /// The relation table rejected a change.
    #[error("relation error: {0}")]
    Relation(#[from] RelationError),

    /// Restored faction state was malformed.
    #[error("invalid state for faction {faction}: {reason}")]
    InvalidState {
        /// The faction whose state was rejected.
        faction: FactionId,
        /// Why it was rejected.
        reason: String,
    },
}
