//! Multi-resource prices.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use civsim_types::ResourceKind;

/// A price expressed in one or more resources.
///
/// Lines with the same resource are merged by [`ResourceCost::with`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceCost {
    lines: BTreeMap<ResourceKind, Decimal>,
}

impl ResourceCost {
    /// An empty cost.
    pub const fn new() -> Self {
        Self {
            lines: BTreeMap::new(),
        }
    }

    /// Add `quantity` of `resource` to this cost.
    #[must_use]
    pub fn with(mut self, resource: ResourceKind, quantity: impl Into<Decimal>) -> Self {
        let entry = self.lines.entry(resource).or_insert(Decimal::ZERO);
        *entry = entry.saturating_add(quantity.into());
        self
    }

    /// Quantity of `resource` in this cost (zero when absent).
    pub fn get(&self, resource: ResourceKind) -> Decimal {
        self.lines.get(&resource).copied().unwrap_or(Decimal::ZERO)
    }

    /// Iterate over `(resource, quantity)` lines in resource order.
    pub fn iter(&self) -> impl Iterator<Item = (ResourceKind, Decimal)> + '_ {
        self.lines.iter().map(|(k, v)| (*k, *v))
    }

    /// Sum of every line, in resource units.
    pub fn total(&self) -> Decimal {
        self.lines
            .values()
            .fold(Decimal::ZERO, |acc, q| acc.saturating_add(*q))
    }

    /// Whether the cost has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl FromIterator<(ResourceKind, Decimal)> for ResourceCost {
    fn from_iter<I: IntoIterator<Item = (ResourceKind, Decimal)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::new(), |cost, (resource, quantity)| cost.with(resource, quantity))
    }
}
