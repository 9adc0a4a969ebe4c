use auto_summon_core::{
    ItemId, OwnerId, SlotIndex, SlotSnapshot, SlotView, SummonClass, SummonHost,
};
use auto_summon_simulation::{DespawnTiming, SimulatedHost};
use auto_summon_system_reconciliation::Reconciliation;

const OWNER: OwnerId = OwnerId::new(1);

fn raven() -> ItemId {
    ItemId::native(1802)
}

fn hornet() -> ItemId {
    ItemId::native(1157)
}

fn stardust_dragon() -> ItemId {
    ItemId::native(3531)
}

fn hydra() -> ItemId {
    ItemId::native(1572)
}

fn host(minion_capacity: u32, sentry_capacity: u32) -> SimulatedHost {
    let mut host = SimulatedHost::new()
        .with_minion_item(raven(), 1.0)
        .with_minion_item(hornet(), 1.0)
        .with_minion_item(stardust_dragon(), 2.0)
        .with_sentry_item(hydra());
    host.set_capacity(OWNER, SummonClass::Minion, minion_capacity);
    host.set_capacity(OWNER, SummonClass::Sentry, sentry_capacity);
    host
}

fn view(class: SummonClass, slots: &[(Option<ItemId>, u32)]) -> SlotView {
    SlotView::from_snapshots(
        slots
            .iter()
            .enumerate()
            .map(|(index, (item, quantity))| SlotSnapshot {
                class,
                slot: SlotIndex::new(index),
                item: item.clone(),
                quantity: *quantity,
                filled: false,
            })
            .collect(),
    )
}

#[test]
fn full_resync_truncates_oversubscription_in_slot_order() {
    let mut host = host(7, 0);
    let slots = view(
        SummonClass::Minion,
        &[(Some(raven()), 5), (Some(hornet()), 5), (None, 0)],
    );

    let report = Reconciliation::new().full_resync(&mut host, OWNER, SummonClass::Minion, &slots);

    assert_eq!(report.spawned_per_slot, vec![5, 2, 0]);
    assert_eq!(host.population_of(&raven()), 5);
    assert_eq!(host.population_of(&hornet()), 2);
    assert_eq!(host.population(SummonClass::Minion), 7);
}

#[test]
fn full_resync_replaces_the_existing_population() {
    let mut host = host(4, 0);
    for _ in 0..4 {
        let _ = host.spawn(OWNER, &hornet());
    }
    let slots = view(SummonClass::Minion, &[(Some(raven()), 2), (None, 0)]);

    let report = Reconciliation::new().full_resync(&mut host, OWNER, SummonClass::Minion, &slots);

    assert_eq!(report.spawned(), 2);
    assert_eq!(host.population_of(&hornet()), 0, "stale summons must be despawned");
    assert_eq!(host.population_of(&raven()), 2);
}

#[test]
fn weighted_minions_respect_the_ceiling() {
    let mut host = host(5, 0);
    let slots = view(
        SummonClass::Minion,
        &[(Some(stardust_dragon()), 2), (Some(raven()), 3), (None, 0)],
    );

    let report = Reconciliation::new().full_resync(&mut host, OWNER, SummonClass::Minion, &slots);

    assert_eq!(report.spawned_per_slot, vec![2, 1, 0]);
    assert!(host.occupied(SummonClass::Minion) <= 5.0);
}

#[test]
fn weighted_spawn_that_would_overshoot_is_rolled_back() {
    let mut host = host(3, 0);
    let slots = view(
        SummonClass::Minion,
        &[(Some(stardust_dragon()), 2), (Some(raven()), 3), (None, 0)],
    );
    let mut reconciliation = Reconciliation::new();

    let report = reconciliation.full_resync(&mut host, OWNER, SummonClass::Minion, &slots);

    assert_eq!(report.spawned_per_slot, vec![1, 1, 0]);
    assert_eq!(host.population_of(&stardust_dragon()), 1);
    assert!((host.occupied(SummonClass::Minion) - 3.0).abs() < f32::EPSILON);
    assert_eq!(reconciliation.observed_cost(&stardust_dragon()), Some(2.0));
}

#[test]
fn first_heavy_spawn_over_the_ceiling_is_despawned() {
    let mut host = host(1, 0);
    let slots = view(SummonClass::Minion, &[(Some(stardust_dragon()), 1), (None, 0)]);
    let mut reconciliation = Reconciliation::new();

    let report = reconciliation.full_resync(&mut host, OWNER, SummonClass::Minion, &slots);

    assert_eq!(report.spawned(), 0);
    assert_eq!(report.attempts, 1);
    assert_eq!(host.population(SummonClass::Minion), 0);
    assert!(host.occupied(SummonClass::Minion) <= 1.0);

    let before = host.spawn_requests();
    for _ in 0..5 {
        let report = reconciliation.top_up(&mut host, OWNER, SummonClass::Minion, &slots);
        assert_eq!(report.attempts, 0, "known cost must not be retried");
    }
    assert_eq!(host.spawn_requests(), before);
}

#[test]
fn top_up_skips_items_that_no_longer_fit() {
    let mut host = host(3, 0);
    let slots = view(SummonClass::Minion, &[(Some(stardust_dragon()), 2), (None, 0)]);
    let mut reconciliation = Reconciliation::new();
    let _ = reconciliation.full_resync(&mut host, OWNER, SummonClass::Minion, &slots);
    assert_eq!(host.population_of(&stardust_dragon()), 1);
    let despawns = host.despawn_requests();

    for _ in 0..5 {
        let report = reconciliation.top_up(&mut host, OWNER, SummonClass::Minion, &slots);
        assert_eq!(report.spawned(), 0);
    }

    assert_eq!(host.despawn_requests(), despawns, "steady state must not churn");
    assert!(host.occupied(SummonClass::Minion) <= 3.0);
}

#[test]
fn sentries_count_flat_against_their_ceiling() {
    let mut host = host(0, 2);
    let slots = view(SummonClass::Sentry, &[(Some(hydra()), 3), (None, 0)]);

    let report = Reconciliation::new().full_resync(&mut host, OWNER, SummonClass::Sentry, &slots);

    assert_eq!(report.spawned(), 2);
    assert_eq!(host.population(SummonClass::Sentry), 2);
}

#[test]
fn top_up_only_replaces_dead_entities() {
    let mut host = host(6, 0);
    let slots = view(
        SummonClass::Minion,
        &[(Some(raven()), 3), (Some(hornet()), 2), (None, 0)],
    );
    let mut reconciliation = Reconciliation::new();
    let _ = reconciliation.full_resync(&mut host, OWNER, SummonClass::Minion, &slots);
    let before = host.spawn_requests();

    let ids = host.entity_ids(SummonClass::Minion);
    host.kill(ids[0]);
    host.kill(ids[1]);

    let report = reconciliation.top_up(&mut host, OWNER, SummonClass::Minion, &slots);

    assert_eq!(report.spawned(), 2);
    assert_eq!(host.spawn_requests() - before, 2);
    assert_eq!(host.population(SummonClass::Minion), 5);
}

#[test]
fn top_up_is_a_no_op_when_population_matches() {
    let mut host = host(6, 0);
    let slots = view(SummonClass::Minion, &[(Some(raven()), 3), (None, 0)]);
    let mut reconciliation = Reconciliation::new();
    let _ = reconciliation.full_resync(&mut host, OWNER, SummonClass::Minion, &slots);
    let before = host.spawn_requests();

    for _ in 0..5 {
        let report = reconciliation.top_up(&mut host, OWNER, SummonClass::Minion, &slots);
        assert_eq!(report.attempts, 0);
    }
    assert_eq!(host.spawn_requests(), before);
}

#[test]
fn top_up_terminates_when_spawns_silently_fail() {
    let mut host = host(0, 3);
    host.fail_spawns_of(hydra());
    let slots = view(SummonClass::Sentry, &[(Some(hydra()), 3), (None, 0)]);

    let report = Reconciliation::new().top_up(&mut host, OWNER, SummonClass::Sentry, &slots);

    assert!(report.attempts <= 3, "attempts must be bounded by capacity");
    assert_eq!(host.population(SummonClass::Sentry), 0);
}

#[test]
fn lingering_despawns_are_counted_until_they_clear() {
    let mut host = host(3, 0);
    host.set_despawn_timing(DespawnTiming::Deferred);
    let slots = view(SummonClass::Minion, &[(Some(raven()), 3), (None, 0)]);
    let mut reconciliation = Reconciliation::new();
    let _ = reconciliation.full_resync(&mut host, OWNER, SummonClass::Minion, &slots);
    host.advance();

    let report = reconciliation.full_resync(&mut host, OWNER, SummonClass::Minion, &slots);
    assert_eq!(report.spawned(), 0, "dying entities still occupy capacity");
    assert!(host.live_entities(OWNER).len() <= 3);

    host.advance();
    let report = reconciliation.top_up(&mut host, OWNER, SummonClass::Minion, &slots);
    assert_eq!(report.spawned(), 3);
    assert_eq!(host.population(SummonClass::Minion), 3);
}

#[test]
fn empty_slots_never_spawn() {
    let mut host = host(4, 4);
    let slots = view(SummonClass::Minion, &[(None, 0)]);

    let report = Reconciliation::new().top_up(&mut host, OWNER, SummonClass::Minion, &slots);

    assert_eq!(report.attempts, 0);
    assert_eq!(host.spawn_requests(), 0);
}
