#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Façade that owns one world session of the auto-summon engine for one actor.
//!
//! The [`AllocationEngine`] routes UI mutations into the loadout, samples
//! capacity ceilings before every mutation and on every tick, and drives the
//! reconciliation, respawn and sentry-refresh systems against a
//! [`SummonHost`]. Nothing here returns an error: malformed input is turned
//! into rejection events and the engine stays usable.

mod config;

pub use config::EngineConfig;

use std::collections::BTreeMap;

use auto_summon_core::{
    capacity_text, occupied_units, Command, EntityId, Event, ItemId, LoadoutRecord, OwnerId,
    ResyncReason, SlotIndex, SlotView, SummonClass, SummonHost,
};
use auto_summon_system_capacity::{CapacitySample, CapacityTracker, Phase};
use auto_summon_system_reconciliation::Reconciliation;
use auto_summon_system_respawn::RespawnGate;
use auto_summon_system_sentry_refresh::SentryRefresh;
use auto_summon_world::{self as world, query, Loadout};
use tracing::{debug, info, warn};

/// Allocation and reconciliation engine for one local actor.
#[derive(Debug)]
pub struct AllocationEngine {
    owner: OwnerId,
    config: EngineConfig,
    loadout: Loadout,
    capacity: CapacityTracker,
    reconciliation: Reconciliation,
    respawn: RespawnGate,
    sentry_refresh: SentryRefresh,
    commands: Vec<Command>,
    events: Vec<Event>,
    stale_sentries: Vec<EntityId>,
    deferred: BTreeMap<SummonClass, ResyncReason>,
    tick: u64,
    suppress_next_tick: bool,
    in_world: bool,
}

impl AllocationEngine {
    /// Creates an engine outside of any world session with an empty loadout.
    #[must_use]
    pub fn new(owner: OwnerId, config: EngineConfig) -> Self {
        Self {
            owner,
            sentry_refresh: SentryRefresh::new(config.refresh_policy()),
            config,
            loadout: Loadout::new(),
            capacity: CapacityTracker::new(),
            reconciliation: Reconciliation::new(),
            respawn: RespawnGate::new(),
            commands: Vec::new(),
            events: Vec::new(),
            stale_sentries: Vec::new(),
            deferred: BTreeMap::new(),
            tick: 0,
            suppress_next_tick: false,
            in_world: false,
        }
    }

    /// Actor whose summons the engine manages.
    #[must_use]
    pub const fn owner(&self) -> OwnerId {
        self.owner
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Replaces the configuration; sentry cooldowns restart when the policy changes.
    pub fn set_config(&mut self, config: EngineConfig) {
        if config.refresh_policy() != self.sentry_refresh.policy() {
            self.sentry_refresh = SentryRefresh::new(config.refresh_policy());
        }
        self.config = config;
    }

    /// Switches the per-tick top-up on or off.
    pub fn set_auto_summon(&mut self, enabled: bool) {
        self.config.auto_summon = enabled;
    }

    /// Switches off-screen sentry refresh on or off.
    pub fn set_sentry_refresh(&mut self, enabled: bool) {
        self.config.refresh_offscreen_sentries = enabled;
    }

    /// Number of ticks processed during the current session.
    #[must_use]
    pub const fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Reports whether a world session is active.
    #[must_use]
    pub const fn is_in_world(&self) -> bool {
        self.in_world
    }

    /// Read-only access to the desired state.
    #[must_use]
    pub fn loadout(&self) -> &Loadout {
        &self.loadout
    }

    /// Snapshot of every slot of the class in display order.
    #[must_use]
    pub fn slot_view(&self, class: SummonClass) -> SlotView {
        query::slot_view(&self.loadout, class)
    }

    /// Class-wide usage label, e.g. `Minion Slots: 3/5`.
    #[must_use]
    pub fn capacity_text(&self, host: &impl SummonHost, class: SummonClass) -> String {
        capacity_text(
            class,
            occupied_units(host, self.owner, class),
            host.capacity(self.owner, class),
        )
    }

    /// Removes and returns every event produced since the last drain.
    pub fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    /// Binds an item to a slot, refusing items the host does not classify as `class`.
    pub fn set_slot_item(
        &mut self,
        host: &mut impl SummonHost,
        class: SummonClass,
        slot: SlotIndex,
        item: ItemId,
    ) {
        let _ = self.sample_capacity(host, class);
        let command = if host.is_valid_item(class, &item) {
            Command::SetSlotItem { class, slot, item }
        } else {
            warn!(class = %class, item = %item, "item cannot summon this class");
            Command::RejectSlotItem { class, slot, item }
        };
        self.mutate(host, class, command);
    }

    /// Takes the item out of a slot.
    pub fn clear_slot_item(
        &mut self,
        host: &mut impl SummonHost,
        class: SummonClass,
        slot: SlotIndex,
    ) {
        let _ = self.sample_capacity(host, class);
        self.mutate(host, class, Command::ClearSlotItem { class, slot });
    }

    /// Changes a slot's desired quantity against the freshly sampled ceiling.
    pub fn adjust_slot_quantity(
        &mut self,
        host: &mut impl SummonHost,
        class: SummonClass,
        slot: SlotIndex,
        delta: i32,
    ) {
        let capacity = self.sample_capacity(host, class);
        self.mutate(
            host,
            class,
            Command::AdjustSlotQuantity {
                class,
                slot,
                delta,
                capacity,
            },
        );
    }

    /// Toggles fill mode of a slot.
    pub fn toggle_slot_fill(
        &mut self,
        host: &mut impl SummonHost,
        class: SummonClass,
        slot: SlotIndex,
    ) {
        let capacity = self.sample_capacity(host, class);
        self.mutate(
            host,
            class,
            Command::ToggleSlotFill {
                class,
                slot,
                capacity,
            },
        );
    }

    /// Removes a slot outright; the sole slot of a group is kept.
    pub fn remove_slot(&mut self, host: &mut impl SummonHost, class: SummonClass, slot: SlotIndex) {
        let _ = self.sample_capacity(host, class);
        self.mutate(host, class, Command::RemoveSlot { class, slot });
    }

    /// Resets both groups to one empty slot and despawns every summon.
    pub fn clear_all(&mut self, host: &mut impl SummonHost) {
        world::apply(&mut self.loadout, Command::ClearAll, &mut self.events);
        for class in SummonClass::ALL {
            let _ = self.sample_capacity(host, class);
            self.resync(host, class, ResyncReason::SlotMutation);
        }
    }

    /// Skips summoning on the next tick only.
    pub fn suppress_next_tick(&mut self) {
        self.suppress_next_tick = true;
    }

    /// Starts a world session from persisted slots and summons the whole loadout.
    ///
    /// Records whose items the host no longer recognises for their class are
    /// dropped; a record with no usable entries yields one empty slot per class.
    pub fn enter_world(&mut self, host: &mut impl SummonHost, record: &LoadoutRecord) {
        self.in_world = true;
        self.tick = 0;
        self.suppress_next_tick = false;
        self.capacity.reset();
        self.respawn.disarm();
        self.sentry_refresh.reset();
        self.deferred.clear();

        self.rehydrate(host, record);
        info!(
            owner = self.owner.get(),
            minion_slots = query::slot_count(&self.loadout, SummonClass::Minion),
            sentry_slots = query::slot_count(&self.loadout, SummonClass::Sentry),
            "entered world"
        );
        self.summon_all(host, ResyncReason::WorldEntered);
    }

    /// Re-summons the whole loadout after the actor reconnected to a session.
    pub fn reconnect(&mut self, host: &mut impl SummonHost) {
        self.in_world = true;
        info!(owner = self.owner.get(), "reconnected");
        self.summon_all(host, ResyncReason::Reconnected);
    }

    /// Ends the world session and returns the slots to persist.
    pub fn exit_world(&mut self) -> LoadoutRecord {
        self.in_world = false;
        self.deferred.clear();
        let record = LoadoutRecord::capture(
            &self.slot_view(SummonClass::Minion),
            &self.slot_view(SummonClass::Sentry),
        );
        info!(
            owner = self.owner.get(),
            minions = record.minions.len(),
            sentries = record.sentries.len(),
            "exited world"
        );
        record
    }

    /// Advances the engine by one host tick.
    ///
    /// Capacity ceilings are sampled every tick. Pending resyncs (capacity
    /// edges, revival, deferred mutations) run first; classes without one get
    /// the incremental top-up. Off-screen sentries are refreshed last.
    pub fn tick(&mut self, host: &mut impl SummonHost) {
        if !self.in_world {
            return;
        }
        self.tick = self.tick.saturating_add(1);

        let avatar = host.avatar(self.owner);
        if self.respawn.observe(avatar) {
            info!(owner = self.owner.get(), "avatar respawned; resummoning loadout");
            for class in SummonClass::ALL {
                let _ = self.deferred.insert(class, ResyncReason::Respawned);
            }
        }

        for class in SummonClass::ALL {
            let _ = self.sample_capacity(host, class);
        }

        if std::mem::take(&mut self.suppress_next_tick) {
            debug!(tick = self.tick, "summoning suppressed for this tick");
            return;
        }
        if !avatar.can_summon() {
            return;
        }

        for class in SummonClass::ALL {
            let pending = self.deferred.get(&class).copied().or_else(|| {
                (self.capacity.phase(class) == Phase::CapacityChanged)
                    .then_some(ResyncReason::CapacityChanged)
            });
            match pending {
                Some(reason) => self.resync(host, class, reason),
                None if self.config.auto_summon => self.top_up(host, class),
                None => {}
            }
        }

        if self.config.refresh_offscreen_sentries {
            self.refresh_sentries(host);
        }
    }

    fn summon_all(&mut self, host: &mut impl SummonHost, reason: ResyncReason) {
        for class in SummonClass::ALL {
            let _ = self.sample_capacity(host, class);
            self.resync(host, class, reason);
        }
    }

    fn rehydrate(&mut self, host: &impl SummonHost, record: &LoadoutRecord) {
        world::apply(&mut self.loadout, Command::ClearAll, &mut self.events);
        for class in SummonClass::ALL {
            for entry in record.class(class) {
                if !host.is_valid_item(class, &entry.item) {
                    warn!(class = %class, item = %entry.item, "dropping saved slot with unusable item");
                    continue;
                }
                let slot = query::last_slot(&self.loadout, class);
                world::apply(
                    &mut self.loadout,
                    Command::SetSlotItem {
                        class,
                        slot,
                        item: entry.item.clone(),
                    },
                    &mut self.events,
                );
                world::apply(
                    &mut self.loadout,
                    Command::RestoreSlotQuantity {
                        class,
                        slot,
                        quantity: entry.quantity,
                    },
                    &mut self.events,
                );
            }
        }
    }

    fn sample_capacity(&mut self, host: &impl SummonHost, class: SummonClass) -> u32 {
        let sample = CapacitySample::take(host, self.owner, class);
        self.capacity.observe(sample, &mut self.commands);
        for command in self.commands.drain(..) {
            world::apply(&mut self.loadout, command, &mut self.events);
        }
        sample.ceiling
    }

    fn mutate(&mut self, host: &mut impl SummonHost, class: SummonClass, command: Command) {
        let first = self.events.len();
        world::apply(&mut self.loadout, command, &mut self.events);

        let mut changed = false;
        for event in &self.events[first..] {
            match event {
                Event::SlotCommandRejected {
                    class,
                    slot,
                    reason,
                } => {
                    debug!(class = %class, slot = slot.get(), reason = ?reason, "slot command rejected");
                }
                Event::SlotItemAssigned { .. }
                | Event::SlotItemCleared { .. }
                | Event::SlotRemoved { .. }
                | Event::QuantityChanged { .. } => changed = true,
                _ => {}
            }
        }

        if changed {
            self.resync(host, class, ResyncReason::SlotMutation);
        }
    }

    fn resync(&mut self, host: &mut impl SummonHost, class: SummonClass, reason: ResyncReason) {
        if !self.in_world {
            return;
        }
        if !host.avatar(self.owner).can_summon() {
            debug!(class = %class, reason = ?reason, "avatar cannot summon; resync deferred");
            let _ = self.deferred.insert(class, reason);
            return;
        }

        let _ = self.deferred.remove(&class);
        let _ = self.capacity.begin_reconciling(class);
        let view = query::slot_view(&self.loadout, class);
        let report = self
            .reconciliation
            .full_resync(host, self.owner, class, &view);
        self.capacity.settle(class);

        info!(
            class = %class,
            reason = ?reason,
            spawned = report.spawned(),
            "full resync issued"
        );
        self.events.push(Event::ResyncCompleted {
            class,
            reason,
            spawned: report.spawned(),
        });
    }

    fn top_up(&mut self, host: &mut impl SummonHost, class: SummonClass) {
        let view = query::slot_view(&self.loadout, class);
        let report = self.reconciliation.top_up(host, self.owner, class, &view);
        if report.spawned() > 0 {
            self.events.push(Event::ToppedUp {
                class,
                spawned: report.spawned(),
            });
        }
    }

    fn refresh_sentries(&mut self, host: &mut impl SummonHost) {
        let live = host.live_entities(self.owner);
        self.stale_sentries.clear();
        self.sentry_refresh
            .collect(self.tick, host.viewport(), &live, &mut self.stale_sentries);
        if self.stale_sentries.is_empty() {
            return;
        }

        for entity in &self.stale_sentries {
            host.despawn(self.owner, *entity);
        }
        let despawned = u32::try_from(self.stale_sentries.len()).unwrap_or(u32::MAX);
        info!(despawned, "sentries refreshed");
        self.events.push(Event::SentriesRefreshed { despawned });
        self.top_up(host, SummonClass::Sentry);
    }
}
