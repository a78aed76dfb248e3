//! Resource stocks and the per-faction ledger that owns them.
//!
//! # Design
//!
//! - **Non-negative**: no operation leaves an amount below zero.
//! - **All-or-nothing**: [`ResourceLedger::deduct`] checks every line
//!   before touching any stock.
//! - **Precision**: amounts and rates use [`Decimal`].

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::{Deserialize, Serialize};

use civsim_types::ResourceKind;

use crate::{LedgerError, ResourceCost};

// ---------------------------------------------------------------------------
// ResourceStock
// ---------------------------------------------------------------------------

/// One resource held by a faction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceStock {
    /// Quantity on hand. Never negative.
    pub amount: Decimal,
    /// Units produced per turn before the multiplier.
    pub production_rate: Decimal,
    /// Units consumed per turn.
    pub consumption_rate: Decimal,
    /// Scales production; raised by resource-production effects.
    pub production_multiplier: Decimal,
}

impl ResourceStock {
    /// An empty stock with no production or consumption.
    pub const fn empty() -> Self {
        Self {
            amount: Decimal::ZERO,
            production_rate: Decimal::ZERO,
            consumption_rate: Decimal::ZERO,
            production_multiplier: Decimal::ONE,
        }
    }

    /// A stock with the given amount and rates and a multiplier of one.
    pub fn new(amount: i64, production_rate: i64, consumption_rate: i64) -> Self {
        Self {
            amount: Decimal::from(amount),
            production_rate: Decimal::from(production_rate),
            consumption_rate: Decimal::from(consumption_rate),
            production_multiplier: Decimal::ONE,
        }
    }

    /// Net change per turn: production times multiplier, minus consumption.
    pub fn net_rate(&self) -> Decimal {
        self.production_rate
            .saturating_mul(self.production_multiplier)
            .saturating_sub(self.consumption_rate)
    }
}

impl Default for ResourceStock {
    fn default() -> Self {
        Self::empty()
    }
}

// ---------------------------------------------------------------------------
// ResourceLedger
// ---------------------------------------------------------------------------

/// All resource stocks of a single faction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceLedger {
    stocks: BTreeMap<ResourceKind, ResourceStock>,
}

impl ResourceLedger {
    /// A ledger with an empty stock for every resource kind.
    pub fn new() -> Self {
        Self {
            stocks: ResourceKind::ALL
                .iter()
                .map(|kind| (*kind, ResourceStock::empty()))
                .collect(),
        }
    }

    /// The standard opening ledger of a new faction.
    ///
    /// | Resource | Amount | Production | Consumption |
    /// |----------|--------|------------|-------------|
    /// | Food     | 100    | 10         | 5           |
    /// | Wood     | 50     | 5          | 2           |
    /// | Stone    | 30     | 3          | 1           |
    ///
    /// Every other resource starts empty.
    pub fn starting() -> Self {
        let mut ledger = Self::new();
        ledger
            .stocks
            .insert(ResourceKind::Food, ResourceStock::new(100, 10, 5));
        ledger
            .stocks
            .insert(ResourceKind::Wood, ResourceStock::new(50, 5, 2));
        ledger
            .stocks
            .insert(ResourceKind::Stone, ResourceStock::new(30, 3, 1));
        ledger
    }

    /// The stock for `resource`, if the ledger tracks it.
    pub fn stock(&self, resource: ResourceKind) -> Option<&ResourceStock> {
        self.stocks.get(&resource)
    }

    /// All stocks, in resource order.
    pub const fn stocks(&self) -> &BTreeMap<ResourceKind, ResourceStock> {
        &self.stocks
    }

    /// Quantity of `resource` on hand (zero when untracked).
    pub fn amount(&self, resource: ResourceKind) -> Decimal {
        self.stocks
            .get(&resource)
            .map_or(Decimal::ZERO, |stock| stock.amount)
    }

    /// Overwrite the quantity of `resource`.
    pub fn set_amount(&mut self, resource: ResourceKind, amount: Decimal) -> Result<(), LedgerError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(LedgerError::NegativeQuantity {
                resource,
                quantity: amount,
            });
        }
        self.stocks.entry(resource).or_default().amount = amount;
        Ok(())
    }

    /// Add `quantity` of `resource` to the stock.
    pub fn credit(&mut self, resource: ResourceKind, quantity: Decimal) -> Result<(), LedgerError> {
        if quantity.is_sign_negative() && !quantity.is_zero() {
            return Err(LedgerError::NegativeQuantity { resource, quantity });
        }
        let stock = self.stocks.entry(resource).or_default();
        stock.amount = stock.amount.saturating_add(quantity);
        Ok(())
    }

    /// Raise the per-turn production rate of `resource`.
    pub fn add_production(&mut self, resource: ResourceKind, rate: Decimal) {
        let stock = self.stocks.entry(resource).or_default();
        stock.production_rate = stock.production_rate.saturating_add(rate);
    }

    /// Multiply the production multiplier of every stock by `factor`.
    pub fn scale_production(&mut self, factor: f64) -> Result<(), LedgerError> {
        let scale = Decimal::from_f64(factor)
            .filter(|d| !d.is_sign_negative())
            .ok_or(LedgerError::InvalidFactor(factor))?;
        for stock in self.stocks.values_mut() {
            stock.production_multiplier = stock.production_multiplier.saturating_mul(scale);
        }
        Ok(())
    }

    /// Advance every stock by one turn of production and consumption.
    ///
    /// `amount = max(0, amount + production_rate * multiplier - consumption_rate)`
    pub fn tick(&mut self) {
        for stock in self.stocks.values_mut() {
            let next = stock.amount.saturating_add(stock.net_rate());
            stock.amount = next.max(Decimal::ZERO);
        }
    }

    /// Whether every line of `cost` can be paid from current stocks.
    ///
    /// An untracked resource cannot pay a positive line.
    pub fn can_afford(&self, cost: &ResourceCost) -> bool {
        cost.iter().all(|(resource, quantity)| {
            quantity <= Decimal::ZERO
                || self
                    .stocks
                    .get(&resource)
                    .is_some_and(|stock| stock.amount >= quantity)
        })
    }

    /// Pay `cost`. Nothing is deducted unless every line is affordable.
    pub fn deduct(&mut self, cost: &ResourceCost) -> Result<(), LedgerError> {
        for (resource, quantity) in cost.iter() {
            if quantity.is_sign_negative() && !quantity.is_zero() {
                return Err(LedgerError::NegativeQuantity { resource, quantity });
            }
            let available = self.amount(resource);
            if available < quantity {
                return Err(LedgerError::InsufficientResource {
                    resource,
                    requested: quantity,
                    available,
                });
            }
        }
        for (resource, quantity) in cost.iter() {
            if let Some(stock) = self.stocks.get_mut(&resource) {
                stock.amount = stock.amount.saturating_sub(quantity).max(Decimal::ZERO);
            }
        }
        tracing::trace!(total = %cost.total(), "ledger deducted cost");
        Ok(())
    }

    /// Check that no stock is negative. Used when restoring snapshots.
    pub fn validate(&self) -> Result<(), LedgerError> {
        for (resource, stock) in &self.stocks {
            for quantity in [stock.amount, stock.production_multiplier] {
                if quantity.is_sign_negative() && !quantity.is_zero() {
                    return Err(LedgerError::NegativeQuantity {
                        resource: *resource,
                        quantity,
                    });
                }
            }
        }
        Ok(())
    }
}

impl Default for ResourceLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    // -----------------------------------------------------------------------
    // Production
    // -----------------------------------------------------------------------

    #[test]
    fn tick_applies_net_rate() {
        let mut ledger = ResourceLedger::starting();
        ledger.tick();
        assert_eq!(ledger.amount(ResourceKind::Food), dec!(105));
        assert_eq!(ledger.amount(ResourceKind::Wood), dec!(53));
        assert_eq!(ledger.amount(ResourceKind::Stone), dec!(32));
        assert_eq!(ledger.amount(ResourceKind::Gold), Decimal::ZERO);
    }

    #[test]
    fn tick_clamps_at_zero() {
        let mut ledger = ResourceLedger::new();
        ledger.set_amount(ResourceKind::Food, dec!(3)).unwrap();
        if let Some(stock) = ledger.stocks.get_mut(&ResourceKind::Food) {
            stock.consumption_rate = dec!(10);
        }
        ledger.tick();
        assert_eq!(ledger.amount(ResourceKind::Food), Decimal::ZERO);
    }

    #[test]
    fn scale_production_multiplies_every_stock() {
        let mut ledger = ResourceLedger::starting();
        ledger.scale_production(1.5).unwrap();
        ledger.tick();
        // 100 + 10 * 1.5 - 5
        assert_eq!(ledger.amount(ResourceKind::Food), dec!(110));
        assert!(ledger.scale_production(f64::NAN).is_err());
        assert!(ledger.scale_production(-1.0).is_err());
    }

    // -----------------------------------------------------------------------
    // Spending
    // -----------------------------------------------------------------------

    #[test]
    fn deduct_is_all_or_nothing() {
        let mut ledger = ResourceLedger::starting();
        let cost = ResourceCost::new()
            .with(ResourceKind::Food, 20)
            .with(ResourceKind::Gold, 10);
        assert!(!ledger.can_afford(&cost));
        let err = ledger.deduct(&cost);
        assert!(matches!(
            err,
            Err(LedgerError::InsufficientResource {
                resource: ResourceKind::Gold,
                ..
            })
        ));
        assert_eq!(ledger.amount(ResourceKind::Food), dec!(100));
    }

    #[test]
    fn deduct_pays_every_line() {
        let mut ledger = ResourceLedger::starting();
        ledger.credit(ResourceKind::Gold, dec!(50)).unwrap();
        let cost = ResourceCost::new()
            .with(ResourceKind::Food, 20)
            .with(ResourceKind::Gold, 10);
        assert!(ledger.can_afford(&cost));
        ledger.deduct(&cost).unwrap();
        assert_eq!(ledger.amount(ResourceKind::Food), dec!(80));
        assert_eq!(ledger.amount(ResourceKind::Gold), dec!(40));
    }

    #[test]
    fn negative_amounts_are_rejected() {
        let mut ledger = ResourceLedger::new();
        assert!(ledger.set_amount(ResourceKind::Food, dec!(-1)).is_err());
        assert!(ledger.credit(ResourceKind::Food, dec!(-1)).is_err());
        assert!(ledger.validate().is_ok());
    }

    #[test]
    fn json_form_restores_equal_ledger() {
        let ledger = ResourceLedger::starting();
        let json = serde_json::to_string(&ledger).unwrap();
        let back: ResourceLedger = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ledger);
        assert!(back.validate().is_ok());
    }
}
