//! Per-faction resource bookkeeping for the civsim faction simulation.
//!
//! Every faction owns one [`ResourceLedger`]: a stock per [`ResourceKind`]
//! with a production rate, a consumption rate and a production multiplier.
//! Stocks never go negative. Spending goes through [`ResourceLedger::deduct`],
//! which is all-or-nothing: either every line of a [`ResourceCost`] is paid
//! or nothing changes.
//!
//! # Modules
//!
//! - [`stock`] -- [`ResourceStock`] and the [`ResourceLedger`] that owns them.
//! - [`cost`] -- [`ResourceCost`], a multi-resource price.
//!
//! # Usage
//!
//! ```
//! use civsim_ledger::{ResourceCost, ResourceLedger};
//! use civsim_types::ResourceKind;
//! use rust_decimal::Decimal;
//!
//! let mut ledger = ResourceLedger::starting();
//! let cost = ResourceCost::new().with(ResourceKind::Food, 20);
//!
//! assert!(ledger.can_afford(&cost));
//! ledger.deduct(&cost).ok();
//! assert_eq!(ledger.amount(ResourceKind::Food), Decimal::new(80, 0));
//! ```
//!
//! [`ResourceKind`]: civsim_types::ResourceKind

pub mod cost;
pub mod stock;

pub use cost::ResourceCost;
pub use stock::{ResourceLedger, ResourceStock};

use rust_decimal::Decimal;

use civsim_types::ResourceKind;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur when mutating a resource ledger.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// The ledger does not hold enough of a resource to pay a cost.
    #[error("insufficient {resource:?}: requested {requested}, available {available}")]
    InsufficientResource {
        /// The resource that fell short.
        resource: ResourceKind,
        /// Quantity requested.
        requested: Decimal,
        /// Quantity on hand.
        available: Decimal,
    },

    /// Quantities and stock amounts must not be negative.
    #[error("{resource:?} quantity must not be negative, got {quantity}")]
    NegativeQuantity {
        /// The resource concerned.
        resource: ResourceKind,
        /// The invalid quantity.
        quantity: Decimal,
    },

    /// A multiplier was not a finite, non-negative number.
    #[error("invalid production factor: {0}")]
    InvalidFactor(f64),
}
