//! Symmetric diplomatic relations between factions.
//!
//! # Architecture
//!
//! [`RelationTable`] stores one [`DiplomaticStatus`] per unordered faction
//! pair, keyed as `(min, max)`. Reading `A -> B` and `B -> A` therefore hits
//! the same entry, and symmetry cannot drift. Every change goes through
//! [`RelationTable::set`].
//!
//! Agents never hold the table. They read it through [`FactionLookup`],
//! which the director hands them each turn.

use std::collections::{BTreeMap, BTreeSet};

use civsim_types::{DiplomaticStatus, FactionId, Personality};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors raised when rebuilding a relation table from per-faction views.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RelationError {
    /// A view references a faction that is not a member.
    #[error("{owner} lists unknown faction {other}")]
    UnknownFaction {
        /// The faction whose view contains the bad entry.
        owner: FactionId,
        /// The unknown counterpart.
        other: FactionId,
    },

    /// A faction lists a relation with itself.
    #[error("{0} lists a relation with itself")]
    SelfRelation(FactionId),

    /// Two views disagree about the status of their pair.
    #[error("relation between {a} and {b} is asymmetric ({a_view:?} vs {b_view:?})")]
    Asymmetric {
        /// First faction.
        a: FactionId,
        /// Second faction.
        b: FactionId,
        /// Status according to `a`.
        a_view: Option<DiplomaticStatus>,
        /// Status according to `b`.
        b_view: Option<DiplomaticStatus>,
    },
}

// ---------------------------------------------------------------------------
// Read access
// ---------------------------------------------------------------------------

/// Read-only view of the faction roster and their relations.
pub trait FactionLookup {
    /// Whether `id` is a known faction.
    fn contains(&self, id: &FactionId) -> bool;

    /// Status between `a` and `b`, or `None` for unknown or identical ids.
    fn status_between(&self, a: &FactionId, b: &FactionId) -> Option<DiplomaticStatus>;

    /// Every other faction together with its status toward `id`.
    fn counterparts(&self, id: &FactionId) -> Vec<(FactionId, DiplomaticStatus)>;
}

// ---------------------------------------------------------------------------
// RelationTable
// ---------------------------------------------------------------------------

/// Opening status between two personalities.
///
/// Hostile when either side is aggressive, friendly when both are
/// diplomatic, neutral otherwise.
pub fn initial_status(a: Personality, b: Personality) -> DiplomaticStatus {
    if a == Personality::Aggressive || b == Personality::Aggressive {
        DiplomaticStatus::Hostile
    } else if a == Personality::Diplomatic && b == Personality::Diplomatic {
        DiplomaticStatus::Friendly
    } else {
        DiplomaticStatus::Neutral
    }
}

/// The single store of pairwise diplomatic status.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelationTable {
    members: BTreeSet<FactionId>,
    statuses: BTreeMap<(FactionId, FactionId), DiplomaticStatus>,
}

fn pair_key(a: &FactionId, b: &FactionId) -> (FactionId, FactionId) {
    if a <= b {
        (a.clone(), b.clone())
    } else {
        (b.clone(), a.clone())
    }
}

impl RelationTable {
    /// An empty table.
    pub const fn new() -> Self {
        Self {
            members: BTreeSet::new(),
            statuses: BTreeMap::new(),
        }
    }

    /// Add a faction. Its relations with existing members start neutral.
    /// Returns `false` if it was already a member.
    pub fn register(&mut self, id: FactionId) -> bool {
        if self.members.contains(&id) {
            return false;
        }
        for other in &self.members {
            self.statuses
                .insert(pair_key(&id, other), DiplomaticStatus::Neutral);
        }
        self.members.insert(id);
        true
    }

    /// All members, in id order.
    pub const fn members(&self) -> &BTreeSet<FactionId> {
        &self.members
    }

    /// Set the status between `a` and `b` for both sides at once.
    ///
    /// Returns the previous status, or `None` (and changes nothing) when
    /// the ids are identical or either is not a member.
    pub fn set(
        &mut self,
        a: &FactionId,
        b: &FactionId,
        status: DiplomaticStatus,
    ) -> Option<DiplomaticStatus> {
        if a == b || !self.members.contains(a) || !self.members.contains(b) {
            return None;
        }
        let previous = self
            .statuses
            .insert(pair_key(a, b), status)
            .unwrap_or(DiplomaticStatus::Neutral);
        if previous != status {
            tracing::debug!(a = %a, b = %b, ?previous, ?status, "relation updated");
        }
        Some(previous)
    }

    /// Per-faction relation map: every counterpart of `id` and its status.
    pub fn relations_of(&self, id: &FactionId) -> BTreeMap<FactionId, DiplomaticStatus> {
        self.counterparts(id).into_iter().collect()
    }

    /// Iterate over each unordered pair once, as `(a, b, status)` with `a < b`.
    pub fn pairs(&self) -> impl Iterator<Item = (&FactionId, &FactionId, DiplomaticStatus)> {
        self.statuses
            .iter()
            .map(|((a, b), status)| (a, b, *status))
    }

    /// Rebuild a table from per-faction relation maps.
    ///
    /// Every view must reference only known members, never the owner
    /// itself, and must agree with the counterpart's view. A pair absent
    /// from both views is neutral.
    pub fn from_views(
        views: &BTreeMap<FactionId, BTreeMap<FactionId, DiplomaticStatus>>,
    ) -> Result<Self, RelationError> {
        let mut table = Self::new();
        for id in views.keys() {
            table.register(id.clone());
        }

        for (owner, view) in views {
            for (other, status) in view {
                if owner == other {
                    return Err(RelationError::SelfRelation(owner.clone()));
                }
                let Some(other_view) = views.get(other) else {
                    return Err(RelationError::UnknownFaction {
                        owner: owner.clone(),
                        other: other.clone(),
                    });
                };
                let mirrored = other_view.get(owner).copied();
                if mirrored != Some(*status) {
                    return Err(RelationError::Asymmetric {
                        a: owner.clone(),
                        b: other.clone(),
                        a_view: Some(*status),
                        b_view: mirrored,
                    });
                }
                table.statuses.insert(pair_key(owner, other), *status);
            }
        }
        Ok(table)
    }
}

impl FactionLookup for RelationTable {
    fn contains(&self, id: &FactionId) -> bool {
        self.members.contains(id)
    }

    fn status_between(&self, a: &FactionId, b: &FactionId) -> Option<DiplomaticStatus> {
        if a == b || !self.members.contains(a) || !self.members.contains(b) {
            return None;
        }
        Some(
            self.statuses
                .get(&pair_key(a, b))
                .copied()
                .unwrap_or(DiplomaticStatus::Neutral),
        )
    }

    fn counterparts(&self, id: &FactionId) -> Vec<(FactionId, DiplomaticStatus)> {
        self.members
            .iter()
            .filter_map(|other| {
                self.status_between(id, other)
                    .map(|status| (other.clone(), status))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(ids: &[&str]) -> RelationTable {
        let mut table = RelationTable::new();
        for id in ids {
            table.register(FactionId::new(*id));
        }
        table
    }

    #[test]
    fn set_is_visible_from_both_sides() {
        let mut t = table(&["a", "b", "c"]);
        let a = FactionId::new("a");
        let b = FactionId::new("b");
        assert_eq!(t.set(&b, &a, DiplomaticStatus::Friendly), Some(DiplomaticStatus::Neutral));
        assert_eq!(t.status_between(&a, &b), Some(DiplomaticStatus::Friendly));
        assert_eq!(t.status_between(&b, &a), Some(DiplomaticStatus::Friendly));
    }

    #[test]
    fn self_and_unknown_pairs_are_rejected() {
        let mut t = table(&["a", "b"]);
        let a = FactionId::new("a");
        let ghost = FactionId::new("ghost");
        assert_eq!(t.set(&a, &a, DiplomaticStatus::Allied), None);
        assert_eq!(t.set(&a, &ghost, DiplomaticStatus::Allied), None);
        assert_eq!(t.status_between(&a, &a), None);
        assert_eq!(t.status_between(&a, &ghost), None);
        assert!(!t.contains(&ghost));
    }

    #[test]
    fn counterparts_exclude_self() {
        let t = table(&["a", "b", "c"]);
        let others = t.counterparts(&FactionId::new("b"));
        assert_eq!(others.len(), 2);
        assert!(others.iter().all(|(id, _)| id.as_str() != "b"));
    }

    #[test]
    fn initial_status_follows_personalities() {
        use Personality::{Aggressive, Diplomatic, Isolationist, Trader};
        assert_eq!(initial_status(Aggressive, Diplomatic), DiplomaticStatus::Hostile);
        assert_eq!(initial_status(Trader, Aggressive), DiplomaticStatus::Hostile);
        assert_eq!(initial_status(Diplomatic, Diplomatic), DiplomaticStatus::Friendly);
        assert_eq!(initial_status(Diplomatic, Isolationist), DiplomaticStatus::Neutral);
    }

    #[test]
    fn views_round_trip_and_asymmetry_is_rejected() {
        let mut t = table(&["a", "b", "c"]);
        let a = FactionId::new("a");
        let c = FactionId::new("c");
        t.set(&a, &c, DiplomaticStatus::War);

        let views: BTreeMap<_, _> = t
            .members()
            .iter()
            .map(|id| (id.clone(), t.relations_of(id)))
            .collect();
        let rebuilt = RelationTable::from_views(&views);
        assert_eq!(rebuilt.as_ref().ok(), Some(&t));

        let mut broken = views;
        if let Some(view) = broken.get_mut(&c) {
            view.insert(a.clone(), DiplomaticStatus::Allied);
        }
        assert!(matches!(
            RelationTable::from_views(&broken),
            Err(RelationError::Asymmetric { .. })
        ));
    }

    #[test]
    fn views_with_unknown_or_self_entries_are_rejected() {
        let a = FactionId::new("a");
        let mut views = BTreeMap::new();
        views.insert(
            a.clone(),
            BTreeMap::from([(a.clone(), DiplomaticStatus::Neutral)]),
        );
        assert!(matches!(
            RelationTable::from_views(&views),
            Err(RelationError::SelfRelation(_))
        ));

        views.insert(
            a,
            BTreeMap::from([(FactionId::new("ghost"), DiplomaticStatus::Neutral)]),
        );
        assert!(matches!(
            RelationTable::from_views(&views),
            Err(RelationError::UnknownFaction { .. })
        ));
    }
}
