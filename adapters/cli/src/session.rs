use anyhow::{Context, Result};
use auto_summon_core::{AvatarStatus, Event, OwnerId, Position, SlotIndex, SummonClass, SummonHost};
use auto_summon_engine::{AllocationEngine, EngineConfig};
use auto_summon_persistence::{load_or_default, LoadoutStore};
use auto_summon_simulation::SimulatedHost;
use tracing::{debug, info};

use crate::script::{parse_item, Script, Step};

const LOCAL_PLAYER: OwnerId = OwnerId::new(0);
const DRIFT_OFFSET: f32 = 10_000.0;

/// Final state of a replayed session.
#[derive(Debug)]
pub(crate) struct SessionReport {
    pub(crate) lines: Vec<String>,
    pub(crate) ticks: u64,
    pub(crate) events: usize,
}

/// Replays the script against a fresh simulated host and saves the resulting loadout.
pub(crate) fn run(
    script: &Script,
    config: EngineConfig,
    store: &impl LoadoutStore,
    player: &str,
) -> Result<SessionReport> {
    let mut host = SimulatedHost::new();
    for entry in &script.items {
        host = match entry.class {
            SummonClass::Minion => host.with_minion_item(entry.item.clone(), entry.weight),
            SummonClass::Sentry => host.with_sentry_item(entry.item.clone()),
        };
    }
    host.set_capacity(LOCAL_PLAYER, SummonClass::Minion, script.minion_capacity);
    host.set_capacity(LOCAL_PLAYER, SummonClass::Sentry, script.sentry_capacity);
    host.set_avatar_position(Position::new(960.0, 540.0));

    let mut engine = AllocationEngine::new(LOCAL_PLAYER, config);
    let record = load_or_default(store, player);
    engine.enter_world(&mut host, &record);
    let mut events = log_events(engine.drain_events());

    for (index, step) in script.steps.iter().enumerate() {
        debug!(step = index, slot = ?step.slot(), action = ?step, "replaying step");
        apply_step(&mut engine, &mut host, step)
            .with_context(|| format!("step {index} failed"))?;
        events += log_events(engine.drain_events());
    }

    let mut lines = Vec::new();
    for class in SummonClass::ALL {
        lines.push(engine.capacity_text(&host, class));
        for slot in engine.slot_view(class).iter() {
            let item = slot
                .item
                .as_ref()
                .map_or_else(|| String::from("<empty>"), ToString::to_string);
            lines.push(format!(
                "  [{}] {item} {} ({})",
                slot.slot.get(),
                slot.quantity_text(),
                slot.fill_label()
            ));
        }
    }

    let ticks = engine.tick_count();
    let saved = engine.exit_world();
    store
        .save(player, &saved)
        .with_context(|| format!("failed to save loadout for {player}"))?;
    info!(player, ticks, events, "session finished");

    Ok(SessionReport {
        lines,
        ticks,
        events,
    })
}

fn apply_step(engine: &mut AllocationEngine, host: &mut SimulatedHost, step: &Step) -> Result<()> {
    match step {
        Step::SetItem { class, slot, item } => {
            let item = parse_item(item)?;
            engine.set_slot_item(host, *class, SlotIndex::new(*slot), item);
        }
        Step::ClearItem { class, slot } => {
            engine.clear_slot_item(host, *class, SlotIndex::new(*slot));
        }
        Step::Adjust { class, slot, delta } => {
            engine.adjust_slot_quantity(host, *class, SlotIndex::new(*slot), *delta);
        }
        Step::ToggleFill { class, slot } => {
            engine.toggle_slot_fill(host, *class, SlotIndex::new(*slot));
        }
        Step::RemoveSlot { class, slot } => {
            engine.remove_slot(host, *class, SlotIndex::new(*slot));
        }
        Step::ClearAll => engine.clear_all(host),
        Step::Capacity { class, capacity } => host.set_capacity(LOCAL_PLAYER, *class, *capacity),
        Step::Tick { count } => {
            for _ in 0..*count {
                engine.tick(host);
                host.advance();
            }
        }
        Step::Kill { class, count } => {
            let victims = host.entity_ids(*class);
            for id in victims.into_iter().take(*count as usize) {
                host.kill(id);
            }
        }
        Step::Drift { count } => {
            let sentries = host.entity_ids(SummonClass::Sentry);
            for id in sentries.into_iter().take(*count as usize) {
                host.move_entity(id, Position::new(DRIFT_OFFSET, DRIFT_OFFSET));
            }
        }
        Step::Die => {
            host.set_avatar(AvatarStatus::dead());
            for class in SummonClass::ALL {
                for id in host.entity_ids(class) {
                    host.kill(id);
                }
            }
        }
        Step::Revive { health } => host.set_avatar(AvatarStatus::alive(*health)),
        Step::Busy { busy } => {
            let mut avatar = host.avatar(LOCAL_PLAYER);
            avatar.busy = *busy;
            host.set_avatar(avatar);
        }
        Step::Suppress => engine.suppress_next_tick(),
        Step::AutoSummon { enabled } => engine.set_auto_summon(*enabled),
        Step::SentryRefresh { enabled } => engine.set_sentry_refresh(*enabled),
        Step::Reconnect => engine.reconnect(host),
    }
    Ok(())
}

fn log_events(events: Vec<Event>) -> usize {
    for event in &events {
        match event {
            Event::SlotItemRejected { class, item, .. } => {
                info!(class = %class, item = %item, "not a valid {class}-summoning item");
            }
            Event::SlotCommandRejected { class, slot, reason } => {
                info!(class = %class, slot = slot.get(), reason = ?reason, "slot command rejected");
            }
            Event::ResyncCompleted {
                class,
                reason,
                spawned,
            } => debug!(class = %class, reason = ?reason, spawned, "resync completed"),
            Event::SentriesRefreshed { despawned } => info!(despawned, "sentries refreshed"),
            other => debug!(event = ?other, "engine event"),
        }
    }
    events.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use auto_summon_core::{ItemId, LoadoutRecord, SlotRecord};
    use auto_summon_persistence::PersistenceError;
    use std::cell::RefCell;

    #[derive(Default)]
    struct MemoryStore {
        saved: RefCell<Option<LoadoutRecord>>,
    }

    impl LoadoutStore for MemoryStore {
        fn load(&self, _player: &str) -> Result<Option<LoadoutRecord>, PersistenceError> {
            Ok(self.saved.borrow().clone())
        }

        fn save(&self, _player: &str, record: &LoadoutRecord) -> Result<(), PersistenceError> {
            *self.saved.borrow_mut() = Some(record.clone());
            Ok(())
        }
    }

    #[test]
    fn session_saves_final_loadout() {
        let script = Script::parse(
            r#"
            version = 1
            minion_capacity = 4
            sentry_capacity = 1

            [[items]]
            id = "native:1802"
            class = "minion"

            [[steps]]
            action = "set_item"
            class = "minion"
            slot = 0
            item = "native:1802"

            [[steps]]
            action = "toggle_fill"
            class = "minion"
            slot = 0

            [[steps]]
            action = "capacity"
            class = "minion"
            capacity = 6

            [[steps]]
            action = "tick"
            count = 3
            "#,
        )
        .expect("valid script");
        let store = MemoryStore::default();

        let report = run(&script, EngineConfig::default(), &store, "Guide").expect("session");

        assert_eq!(report.ticks, 3);
        assert_eq!(report.lines[0], "Minion Slots: 6/6");
        assert_eq!(
            store.saved.borrow().as_ref().map(|record| record.minions.clone()),
            Some(vec![SlotRecord {
                item: ItemId::native(1802),
                quantity: 6,
            }])
        );
    }
}
