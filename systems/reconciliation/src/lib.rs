#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Converges the live summon population toward the desired slot quantities.
//!
//! Two passes are offered. A full resync kills every entity of a class and
//! respawns slot by slot; an incremental top-up only fills the deficit left
//! by entities that died on their own. Both passes re-sample the host before
//! every spawn and never make more spawn attempts than the class ceiling, so
//! a host that silently drops spawns cannot trap them in a loop.
//!
//! Minion weights are only visible once an entity exists. The cost of every
//! item is learned from its first spawn; a spawn that lands above the ceiling
//! is despawned on the spot, and later passes skip items that no longer fit.

use std::collections::BTreeMap;

use auto_summon_core::{
    EntityId, ItemId, LiveEntity, OwnerId, SlotView, SpawnOutcome, SummonClass, SummonHost,
};
use tracing::{debug, warn};

/// Outcome of a single reconciliation pass over one class.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PassReport {
    /// Spawn requests the host accepted, indexed by slot.
    pub spawned_per_slot: Vec<u32>,
    /// Spawn requests issued, accepted or not.
    pub attempts: u32,
}

impl PassReport {
    fn for_slots(slots: &SlotView) -> Self {
        Self {
            spawned_per_slot: vec![0; slots.len()],
            attempts: 0,
        }
    }

    /// Total spawn requests the host accepted.
    #[must_use]
    pub fn spawned(&self) -> u32 {
        self.spawned_per_slot
            .iter()
            .fold(0u32, |total, count| total.saturating_add(*count))
    }
}

const UNIT_TOLERANCE: f32 = 1e-4;

/// Reconciliation system with reusable scratch buffers.
#[derive(Debug, Default)]
pub struct Reconciliation {
    deficits: Vec<u32>,
    present: Vec<EntityId>,
    costs: BTreeMap<ItemId, f32>,
}

impl Reconciliation {
    /// Creates a reconciliation system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Capacity units one entity of the item was last observed to occupy.
    #[must_use]
    pub fn observed_cost(&self, item: &ItemId) -> Option<f32> {
        self.costs.get(item).copied()
    }

    /// Despawns every entity of the class and respawns to the desired quantities.
    ///
    /// Slots are served in order, one unit at a time, until every slot is
    /// satisfied or the class ceiling is reached. Over-subscription is
    /// therefore truncated first-come-first-served by slot position.
    pub fn full_resync(
        &mut self,
        host: &mut impl SummonHost,
        owner: OwnerId,
        class: SummonClass,
        slots: &SlotView,
    ) -> PassReport {
        host.despawn_all(owner, class);

        self.deficits.clear();
        self.deficits
            .extend(slots.iter().map(|snapshot| snapshot.quantity));

        let report = self.spawn_deficits(host, owner, class, slots);
        debug!(
            class = %class,
            spawned = report.spawned(),
            attempts = report.attempts,
            "full resync issued"
        );
        report
    }

    /// Spawns only what the live population is missing, without despawning.
    ///
    /// Live entities are credited to slots in slot order, so the earliest
    /// slots are considered satisfied first.
    pub fn top_up(
        &mut self,
        host: &mut impl SummonHost,
        owner: OwnerId,
        class: SummonClass,
        slots: &SlotView,
    ) -> PassReport {
        let live = host
            .live_entities(owner)
            .iter()
            .filter(|entity| entity.class == class)
            .count();
        let mut uncredited = u32::try_from(live).unwrap_or(u32::MAX);

        self.deficits.clear();
        for snapshot in slots.iter() {
            let credited = snapshot.quantity.min(uncredited);
            uncredited -= credited;
            self.deficits.push(snapshot.quantity - credited);
        }

        if self.deficits.iter().all(|deficit| *deficit == 0) {
            return PassReport::for_slots(slots);
        }

        let report = self.spawn_deficits(host, owner, class, slots);
        if report.spawned() > 0 {
            debug!(class = %class, spawned = report.spawned(), "topped up summons");
        }
        report
    }

    fn spawn_deficits(
        &mut self,
        host: &mut impl SummonHost,
        owner: OwnerId,
        class: SummonClass,
        slots: &SlotView,
    ) -> PassReport {
        let mut report = PassReport::for_slots(slots);
        let capacity = host.capacity(owner, class);
        let ceiling = capacity as f32;
        let mut budget = capacity;

        for (index, snapshot) in slots.iter().enumerate() {
            let Some(item) = snapshot.item.as_ref() else {
                continue;
            };
            let mut outstanding = self.deficits.get(index).copied().unwrap_or(0);

            while outstanding > 0 {
                let live = host.live_entities(owner);
                let occupied = units(class, &live);
                if budget == 0 || occupied + UNIT_TOLERANCE >= ceiling {
                    return report;
                }
                if let Some(cost) = self.observed_cost(item) {
                    if occupied + cost > ceiling + UNIT_TOLERANCE {
                        debug!(class = %class, item = %item, cost, "item no longer fits");
                        break;
                    }
                }

                budget -= 1;
                outstanding -= 1;
                report.attempts = report.attempts.saturating_add(1);

                self.present.clear();
                self.present.extend(live.iter().map(|entity| entity.id));
                if !spawn_one(host, owner, class, item) {
                    break;
                }

                let live = host.live_entities(owner);
                let after = units(class, &live);
                if after > occupied {
                    let _ = self.costs.insert(item.clone(), after - occupied);
                }
                if after > ceiling + UNIT_TOLERANCE {
                    for entity in live.iter().filter(|entity| {
                        entity.class == class && !self.present.contains(&entity.id)
                    }) {
                        host.despawn(owner, entity.id);
                    }
                    debug!(
                        class = %class,
                        item = %item,
                        occupied = after,
                        capacity,
                        "spawn overshot the ceiling; despawned"
                    );
                    break;
                }
                report.spawned_per_slot[index] = report.spawned_per_slot[index].saturating_add(1);
            }
        }

        report
    }
}

fn units(class: SummonClass, live: &[LiveEntity]) -> f32 {
    live.iter().map(|entity| class.units_for(entity)).sum()
}

fn spawn_one(host: &mut impl SummonHost, owner: OwnerId, class: SummonClass, item: &ItemId) -> bool {
    match host.spawn(owner, item) {
        SpawnOutcome::Spawned => true,
        SpawnOutcome::Failed => {
            warn!(class = %class, item = %item, "host refused spawn request");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_report_spawns_nothing() {
        let report = PassReport::for_slots(&SlotView::default());
        assert_eq!(report.spawned(), 0);
        assert!(report.spawned_per_slot.is_empty());
    }
}
