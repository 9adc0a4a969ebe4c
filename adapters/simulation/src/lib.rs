#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic in-memory host used by tests and the command-line adapter.
//!
//! The simulation keeps a catalogue of summon items, a flat list of live
//! entities, and per-class ceilings that callers may change at any time. It
//! deliberately does not enforce ceilings itself so that any over-allocation
//! by the engine shows up in the live population.

use std::collections::{BTreeMap, BTreeSet};

use auto_summon_core::{
    AvatarStatus, EntityId, ItemId, LiveEntity, OwnerId, Position, SpawnOutcome, SummonClass,
    SummonHost, Viewport,
};

const DEFAULT_VIEWPORT_WIDTH: f32 = 1920.0;
const DEFAULT_VIEWPORT_HEIGHT: f32 = 1080.0;
const DEFAULT_HEALTH: i32 = 100;

/// Summon produced by a catalogued item.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SummonProfile {
    /// Class of the summoned entity.
    pub class: SummonClass,
    /// Capacity units the entity occupies.
    pub weight: f32,
}

/// How despawn requests take effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum DespawnTiming {
    /// Entities disappear as soon as they are killed.
    #[default]
    Immediate,
    /// Killed entities linger until the next call to [`SimulatedHost::advance`].
    Deferred,
}

#[derive(Clone, Debug)]
struct SimEntity {
    entity: LiveEntity,
    owner: OwnerId,
    item: ItemId,
    dying: bool,
}

/// In-memory stand-in for the host game.
#[derive(Clone, Debug)]
pub struct SimulatedHost {
    catalogue: BTreeMap<ItemId, SummonProfile>,
    entities: Vec<SimEntity>,
    capacities: BTreeMap<(OwnerId, SummonClass), u32>,
    failing_items: BTreeSet<ItemId>,
    avatar: AvatarStatus,
    avatar_position: Position,
    viewport: Viewport,
    despawn_timing: DespawnTiming,
    next_entity: u32,
    spawn_requests: u32,
    despawn_requests: u32,
}

impl SimulatedHost {
    /// Creates an empty simulation with a healthy avatar at the origin.
    #[must_use]
    pub fn new() -> Self {
        Self {
            catalogue: BTreeMap::new(),
            entities: Vec::new(),
            capacities: BTreeMap::new(),
            failing_items: BTreeSet::new(),
            avatar: AvatarStatus::alive(DEFAULT_HEALTH),
            avatar_position: Position::default(),
            viewport: Viewport::new(
                Position::default(),
                DEFAULT_VIEWPORT_WIDTH,
                DEFAULT_VIEWPORT_HEIGHT,
            ),
            despawn_timing: DespawnTiming::Immediate,
            next_entity: 0,
            spawn_requests: 0,
            despawn_requests: 0,
        }
    }

    /// Registers an item that summons minions of the provided weight.
    #[must_use]
    pub fn with_minion_item(mut self, item: ItemId, weight: f32) -> Self {
        let _ = self.catalogue.insert(
            item,
            SummonProfile {
                class: SummonClass::Minion,
                weight,
            },
        );
        self
    }

    /// Registers an item that summons sentries.
    #[must_use]
    pub fn with_sentry_item(mut self, item: ItemId) -> Self {
        let _ = self.catalogue.insert(
            item,
            SummonProfile {
                class: SummonClass::Sentry,
                weight: 1.0,
            },
        );
        self
    }

    /// Sets the ceiling of a class for an owner.
    pub fn set_capacity(&mut self, owner: OwnerId, class: SummonClass, capacity: u32) {
        let _ = self.capacities.insert((owner, class), capacity);
    }

    /// Replaces the avatar state reported to the engine.
    pub fn set_avatar(&mut self, avatar: AvatarStatus) {
        self.avatar = avatar;
    }

    /// Moves the avatar, which is where new summons appear.
    pub fn set_avatar_position(&mut self, position: Position) {
        self.avatar_position = position;
    }

    /// Replaces the visible region reported to the engine.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Chooses whether despawns take effect immediately or on the next advance.
    pub fn set_despawn_timing(&mut self, timing: DespawnTiming) {
        self.despawn_timing = timing;
    }

    /// Makes every spawn request for the item silently produce nothing.
    pub fn fail_spawns_of(&mut self, item: ItemId) {
        let _ = self.failing_items.insert(item);
    }

    /// Moves a live entity, e.g. to simulate a sentry drifting off-screen.
    pub fn move_entity(&mut self, entity: EntityId, position: Position) {
        if let Some(sim) = self.entities.iter_mut().find(|sim| sim.entity.id == entity) {
            sim.entity.position = position;
        }
    }

    /// Kills an entity for reasons outside the engine's control.
    pub fn kill(&mut self, entity: EntityId) {
        self.entities.retain(|sim| sim.entity.id != entity);
    }

    /// Completes any deferred despawns.
    pub fn advance(&mut self) {
        self.entities.retain(|sim| !sim.dying);
    }

    /// Number of non-dying live entities of the class.
    #[must_use]
    pub fn population(&self, class: SummonClass) -> usize {
        self.entities
            .iter()
            .filter(|sim| !sim.dying && sim.entity.class == class)
            .count()
    }

    /// Number of non-dying live entities summoned from the item.
    #[must_use]
    pub fn population_of(&self, item: &ItemId) -> usize {
        self.entities
            .iter()
            .filter(|sim| !sim.dying && &sim.item == item)
            .count()
    }

    /// Capacity units occupied by non-dying entities of the class.
    #[must_use]
    pub fn occupied(&self, class: SummonClass) -> f32 {
        self.entities
            .iter()
            .filter(|sim| !sim.dying)
            .map(|sim| class.units_for(&sim.entity))
            .sum()
    }

    /// Identifiers of non-dying entities of the class in spawn order.
    #[must_use]
    pub fn entity_ids(&self, class: SummonClass) -> Vec<EntityId> {
        self.entities
            .iter()
            .filter(|sim| !sim.dying && sim.entity.class == class)
            .map(|sim| sim.entity.id)
            .collect()
    }

    /// Total spawn requests received, successful or not.
    #[must_use]
    pub const fn spawn_requests(&self) -> u32 {
        self.spawn_requests
    }

    /// Total despawn requests received, class-wide and single.
    #[must_use]
    pub const fn despawn_requests(&self) -> u32 {
        self.despawn_requests
    }

    fn mark_dead(&mut self, predicate: impl Fn(&SimEntity) -> bool) {
        match self.despawn_timing {
            DespawnTiming::Immediate => self.entities.retain(|sim| !predicate(sim)),
            DespawnTiming::Deferred => {
                for sim in self.entities.iter_mut().filter(|sim| predicate(sim)) {
                    sim.dying = true;
                }
            }
        }
    }
}

impl Default for SimulatedHost {
    fn default() -> Self {
        Self::new()
    }
}

impl SummonHost for SimulatedHost {
    fn is_valid_minion_item(&self, item: &ItemId) -> bool {
        self.catalogue
            .get(item)
            .is_some_and(|profile| profile.class == SummonClass::Minion)
    }

    fn is_valid_sentry_item(&self, item: &ItemId) -> bool {
        self.catalogue
            .get(item)
            .is_some_and(|profile| profile.class == SummonClass::Sentry)
    }

    fn live_entities(&self, owner: OwnerId) -> Vec<LiveEntity> {
        self.entities
            .iter()
            .filter(|sim| sim.owner == owner)
            .map(|sim| sim.entity)
            .collect()
    }

    fn spawn(&mut self, owner: OwnerId, item: &ItemId) -> SpawnOutcome {
        self.spawn_requests = self.spawn_requests.saturating_add(1);
        let Some(profile) = self.catalogue.get(item).copied() else {
            return SpawnOutcome::Failed;
        };
        if self.failing_items.contains(item) {
            // The real game reports success when the projectile pool is full.
            return SpawnOutcome::Spawned;
        }

        let id = EntityId::new(self.next_entity);
        self.next_entity = self.next_entity.wrapping_add(1);
        self.entities.push(SimEntity {
            entity: LiveEntity {
                id,
                class: profile.class,
                weight: profile.weight,
                position: self.avatar_position,
            },
            owner,
            item: item.clone(),
            dying: false,
        });
        SpawnOutcome::Spawned
    }

    fn despawn_all(&mut self, owner: OwnerId, class: SummonClass) {
        self.despawn_requests = self.despawn_requests.saturating_add(1);
        self.mark_dead(|sim| sim.owner == owner && sim.entity.class == class);
    }

    fn despawn(&mut self, owner: OwnerId, entity: EntityId) {
        self.despawn_requests = self.despawn_requests.saturating_add(1);
        self.mark_dead(|sim| sim.owner == owner && sim.entity.id == entity);
    }

    fn capacity(&self, owner: OwnerId, class: SummonClass) -> u32 {
        self.capacities.get(&(owner, class)).copied().unwrap_or(0)
    }

    fn avatar(&self, _owner: OwnerId) -> AvatarStatus {
        self.avatar
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }
}
