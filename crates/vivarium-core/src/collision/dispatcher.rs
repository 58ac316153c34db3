//! Broad phase, narrow phase, and reaction dispatch.

use quadrant::{QuadTree, QuadTreeConfig, TreeStats};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::arena::Arena;
use crate::entity::EntityId;

use super::collider::{ColliderRecord, CollisionPairKey};
use super::registry::{ReactionContext, ReactionRegistry};

/// A confirmed overlap between two records of the current snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    /// Owner that reacts as `first`
    pub first: EntityId,
    /// Owner that reacts as `second`
    pub second: EntityId,
    /// Collider-type pair
    pub key: CollisionPairKey,
}

/// Counters from one dispatch pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchReport {
    /// Records in the snapshot
    pub records: usize,
    /// Unordered pairs whose boxes intersected
    pub candidates: usize,
    /// Pairs whose circles overlapped
    pub confirmed: usize,
    /// Reactions invoked
    pub dispatched: usize,
    /// Confirmed pairs with no registered reaction
    pub unhandled: usize,
    /// Pairs skipped because an entity was flagged earlier in the frame
    pub skipped: usize,
}

/// Per-frame collision pipeline.
///
/// Each frame the dispatcher snapshots the colliders of every entity not yet
/// flagged for removal, rebuilds its quad-tree from scratch, finds each
/// overlapping pair exactly once, and runs the registered reaction for it.
///
/// Pair discovery only accepts a candidate whose snapshot index is greater
/// than the querying record's. Records are snapshotted in entity-id order, so
/// every unordered pair is seen once and self-pairs never occur.
#[derive(Debug)]
pub struct CollisionDispatcher {
    index: QuadTree<usize>,
    records: Vec<ColliderRecord>,
    contacts: Vec<Contact>,
}

impl CollisionDispatcher {
    /// Creates a dispatcher whose index uses `config`.
    #[must_use]
    pub fn new(config: QuadTreeConfig) -> Self {
        Self {
            index: QuadTree::new(config),
            records: Vec::new(),
            contacts: Vec::new(),
        }
    }

    /// Replaces the snapshot with the arena's live colliders and rebuilds the
    /// index. Collider records must already be refreshed.
    pub fn rebuild(&mut self, arena: &Arena) -> TreeStats {
        self.records.clear();
        self.records.extend(arena.live_colliders().copied());

        self.index.clear();
        for (slot, record) in self.records.iter().enumerate() {
            self.index.insert(slot, record.aabb);
        }
        self.index.stats()
    }

    /// Finds every overlapping pair in the current snapshot.
    ///
    /// Contacts are ordered by `(lower id, higher id)` and oriented so that
    /// `first` has the lower collider type (ties: lower id).
    ///
    /// Returns the number of broad-phase candidates.
    pub fn find_contacts(&mut self) -> usize {
        self.contacts.clear();
        let mut candidates = 0;

        for (slot, record) in self.records.iter().enumerate() {
            let records = &self.records;
            let contacts = &mut self.contacts;
            self.index.for_each_in(&record.aabb, |entry| {
                let other_slot = entry.item;
                if other_slot <= slot {
                    return;
                }
                candidates += 1;
                let other = &records[other_slot];
                if record.overlaps(other) {
                    contacts.push(orient(record, other));
                }
            });
        }

        self.contacts
            .sort_by_key(|c| (c.first.min(c.second), c.first.max(c.second)));
        candidates
    }

    /// Runs the narrow phase on the current snapshot and invokes reactions.
    ///
    /// A pair is skipped if either entity is already flagged for removal by
    /// an earlier reaction this frame. Pairs with no registered reaction are
    /// counted and otherwise ignored.
    pub fn dispatch(
        &mut self,
        arena: &mut Arena,
        registry: &ReactionRegistry,
        ctx: &ReactionContext,
    ) -> DispatchReport {
        let candidates = self.find_contacts();
        let mut report = DispatchReport {
            records: self.records.len(),
            candidates,
            confirmed: self.contacts.len(),
            ..DispatchReport::default()
        };

        for contact in &self.contacts {
            let Some(reaction) = registry.get(contact.key) else {
                report.unhandled += 1;
                trace!(first = %contact.first, second = %contact.second, key = %contact.key, "no reaction registered");
                continue;
            };
            let Some((first, second)) = arena.get_pair_mut(contact.first, contact.second) else {
                report.skipped += 1;
                continue;
            };
            if first.is_pending_destruction() || second.is_pending_destruction() {
                report.skipped += 1;
                trace!(first = %contact.first, second = %contact.second, "pair skipped, entity already flagged");
                continue;
            }
            trace!(first = %contact.first, second = %contact.second, key = %contact.key, "dispatching reaction");
            reaction.react(first, second, ctx);
            report.dispatched += 1;
        }

        debug!(
            frame = ctx.frame,
            records = report.records,
            candidates = report.candidates,
            confirmed = report.confirmed,
            dispatched = report.dispatched,
            "collision dispatch complete"
        );
        report
    }

    /// Contacts found by the last [`find_contacts`](Self::find_contacts).
    #[must_use]
    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    /// Snapshot taken by the last [`rebuild`](Self::rebuild).
    #[must_use]
    pub fn records(&self) -> &[ColliderRecord] {
        &self.records
    }

    /// The spatial index.
    #[must_use]
    pub fn index(&self) -> &QuadTree<usize> {
        &self.index
    }
}

impl Default for CollisionDispatcher {
    fn default() -> Self {
        Self::new(QuadTreeConfig::default())
    }
}

fn orient(a: &ColliderRecord, b: &ColliderRecord) -> Contact {
    let key = CollisionPairKey::new(a.kind, b.kind);
    let (first, second) = if a.canonical_key() <= b.canonical_key() {
        (a.owner, b.owner)
    } else {
        (b.owner, a.owner)
    };
    Contact { first, second, key }
}
