#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the auto-summon engine.
//!
//! This crate defines the message surface that connects the UI collaborator,
//! the authoritative slot loadout, and the reconciliation systems. Callers
//! submit [`Command`] values describing desired slot mutations, the loadout
//! executes those commands via its `apply` entry point, and then broadcasts
//! [`Event`] values that describe what actually changed. The host game is
//! reached exclusively through the [`SummonHost`] trait so that every system
//! can be exercised without a live game loop.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Namespace recorded for items that ship with the base game.
pub const NATIVE_NAMESPACE: &str = "native";

/// Summon categories that draw from independent capacity pools.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummonClass {
    /// Mobile summons whose capacity cost is weighted per entity.
    Minion,
    /// Stationary summons counted one unit per entity.
    Sentry,
}

impl SummonClass {
    /// Both classes in the order the engine services them.
    pub const ALL: [SummonClass; 2] = [SummonClass::Minion, SummonClass::Sentry];

    /// Prefix used when presenting a slot's desired quantity.
    #[must_use]
    pub const fn quantity_label(self) -> &'static str {
        match self {
            Self::Minion => "Minions",
            Self::Sentry => "Sentries",
        }
    }

    /// Prefix used when presenting the class-wide capacity usage.
    #[must_use]
    pub const fn capacity_label(self) -> &'static str {
        match self {
            Self::Minion => "Minion Slots",
            Self::Sentry => "Sentry Slots",
        }
    }

    /// Capacity units the provided entity occupies within this class.
    ///
    /// Minions report their declared weight; sentries always count as one.
    /// Entities belonging to the other class occupy nothing.
    #[must_use]
    pub fn units_for(self, entity: &LiveEntity) -> f32 {
        if entity.class != self {
            return 0.0;
        }

        match self {
            Self::Minion => entity.weight.max(0.0),
            Self::Sentry => 1.0,
        }
    }
}

impl fmt::Display for SummonClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Minion => write!(f, "minion"),
            Self::Sentry => write!(f, "sentry"),
        }
    }
}

/// Identifier of an item capable of triggering a summon.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ItemId {
    /// Item shipped with the base game, addressed by its numeric type.
    Native(u32),
    /// Item contributed by a content mod, addressed by namespace and name.
    Modded {
        /// Namespace of the mod that registered the item.
        namespace: String,
        /// Name the mod registered the item under.
        name: String,
    },
}

impl ItemId {
    /// Creates an identifier for a base-game item.
    #[must_use]
    pub const fn native(type_id: u32) -> Self {
        Self::Native(type_id)
    }

    /// Creates an identifier for a modded item.
    #[must_use]
    pub fn modded(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Modded {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Parses the display form, `native:<type>` or `<namespace>:<name>`.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let (namespace, name) = value.trim().split_once(':')?;
        if namespace.is_empty() || name.is_empty() {
            return None;
        }
        if namespace == NATIVE_NAMESPACE {
            return name.parse().ok().map(Self::Native);
        }
        Some(Self::modded(namespace, name))
    }

    /// Namespace owning the item; [`NATIVE_NAMESPACE`] for base-game items.
    #[must_use]
    pub fn namespace(&self) -> &str {
        match self {
            Self::Native(_) => NATIVE_NAMESPACE,
            Self::Modded { namespace, .. } => namespace,
        }
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Native(type_id) => write!(f, "{NATIVE_NAMESPACE}:{type_id}"),
            Self::Modded { namespace, name } => write!(f, "{namespace}:{name}"),
        }
    }
}

/// Position of a slot within its class group.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SlotIndex(usize);

impl SlotIndex {
    /// Creates a new slot index with the provided zero-based value.
    #[must_use]
    pub const fn new(value: usize) -> Self {
        Self(value)
    }

    /// Retrieves the zero-based position.
    #[must_use]
    pub const fn get(&self) -> usize {
        self.0
    }
}

/// Identity of the actor that owns summoned entities.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OwnerId(u32);

impl OwnerId {
    /// Creates a new owner identifier.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the owner.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Ephemeral identifier the host assigns to a live summoned entity.
///
/// Identifiers may be recycled by the host once an entity dies, so they must
/// never be retained as references across ticks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(u32);

impl EntityId {
    /// Creates a new entity identifier.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the entity.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location expressed in host world units.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Position {
    /// Horizontal coordinate.
    pub x: f32,
    /// Vertical coordinate.
    pub y: f32,
}

impl Position {
    /// Creates a new position.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Region of the world currently visible to the local actor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    origin: Position,
    width: f32,
    height: f32,
}

impl Viewport {
    /// Creates a viewport anchored at its upper-left corner.
    #[must_use]
    pub const fn new(origin: Position, width: f32, height: f32) -> Self {
        Self {
            origin,
            width,
            height,
        }
    }

    /// Upper-left corner of the visible region.
    #[must_use]
    pub const fn origin(&self) -> Position {
        self.origin
    }

    /// Reports whether the position lies outside the viewport grown by `margin`.
    #[must_use]
    pub fn is_outside(&self, position: Position, margin: f32) -> bool {
        position.x < self.origin.x - margin
            || position.x > self.origin.x + self.width + margin
            || position.y < self.origin.y - margin
            || position.y > self.origin.y + self.height + margin
    }
}

/// Snapshot of one live summoned entity owned by the local actor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LiveEntity {
    /// Ephemeral host identifier of the entity.
    pub id: EntityId,
    /// Class the entity counts against.
    pub class: SummonClass,
    /// Capacity units the entity occupies when it is a minion.
    pub weight: f32,
    /// Current location of the entity.
    pub position: Position,
}

/// Observed state of the local actor's avatar.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AvatarStatus {
    /// Whether the avatar is currently dead.
    pub dead: bool,
    /// Whether the avatar is a spectating ghost.
    pub ghost: bool,
    /// Current health of the avatar.
    pub health: i32,
    /// Whether the avatar is mid item use or holding an item on the cursor.
    pub busy: bool,
}

impl AvatarStatus {
    /// Healthy, idle avatar.
    #[must_use]
    pub const fn alive(health: i32) -> Self {
        Self {
            dead: false,
            ghost: false,
            health,
            busy: false,
        }
    }

    /// Dead avatar awaiting respawn.
    #[must_use]
    pub const fn dead() -> Self {
        Self {
            dead: true,
            ghost: false,
            health: 0,
            busy: false,
        }
    }

    /// Reports whether the avatar is fully revived.
    #[must_use]
    pub const fn is_revived(&self) -> bool {
        !self.dead && self.health > 0
    }

    /// Reports whether summoning may be attempted for the avatar right now.
    #[must_use]
    pub const fn can_summon(&self) -> bool {
        !self.dead && !self.ghost && !self.busy
    }
}

/// Result of asking the host to create one summoned entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpawnOutcome {
    /// The host accepted the request.
    Spawned,
    /// The host declined or could not create the entity.
    Failed,
}

/// Capabilities the surrounding game exposes to the engine.
///
/// Every query returns a fresh sample; implementations must not assume the
/// engine caches anything between calls.
pub trait SummonHost {
    /// Reports whether the item summons minions.
    fn is_valid_minion_item(&self, item: &ItemId) -> bool;

    /// Reports whether the item summons sentries.
    fn is_valid_sentry_item(&self, item: &ItemId) -> bool;

    /// Reports whether the item summons entities of the provided class.
    fn is_valid_item(&self, class: SummonClass, item: &ItemId) -> bool {
        match class {
            SummonClass::Minion => self.is_valid_minion_item(item),
            SummonClass::Sentry => self.is_valid_sentry_item(item),
        }
    }

    /// Snapshot of every live entity owned by the actor.
    fn live_entities(&self, owner: OwnerId) -> Vec<LiveEntity>;

    /// Requests creation of one summoned entity from the item.
    fn spawn(&mut self, owner: OwnerId, item: &ItemId) -> SpawnOutcome;

    /// Kills every live entity of the class owned by the actor.
    fn despawn_all(&mut self, owner: OwnerId, class: SummonClass);

    /// Kills a single live entity owned by the actor.
    fn despawn(&mut self, owner: OwnerId, entity: EntityId);

    /// Current capacity ceiling of the class for the actor.
    fn capacity(&self, owner: OwnerId, class: SummonClass) -> u32;

    /// Current avatar state of the actor.
    fn avatar(&self, owner: OwnerId) -> AvatarStatus;

    /// Region currently visible to the local actor.
    fn viewport(&self) -> Viewport;
}

/// Sums the capacity units the class currently occupies within the host.
#[must_use]
pub fn occupied_units(host: &impl SummonHost, owner: OwnerId, class: SummonClass) -> f32 {
    host.live_entities(owner)
        .iter()
        .map(|entity| class.units_for(entity))
        .sum()
}

/// Counts the live entities of the class regardless of weight.
#[must_use]
pub fn live_count(host: &impl SummonHost, owner: OwnerId, class: SummonClass) -> u32 {
    let count = host
        .live_entities(owner)
        .iter()
        .filter(|entity| entity.class == class)
        .count();
    u32::try_from(count).unwrap_or(u32::MAX)
}

/// Commands that express all permissible loadout mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Records a new capacity ceiling and recomputes filled slots.
    ApplyCapacity {
        /// Class whose ceiling changed.
        class: SummonClass,
        /// Newly observed ceiling.
        capacity: u32,
    },
    /// Binds an item already known to be valid for the class to a slot.
    SetSlotItem {
        /// Class owning the slot.
        class: SummonClass,
        /// Slot receiving the item.
        slot: SlotIndex,
        /// Item to bind.
        item: ItemId,
    },
    /// Reports that an item incompatible with the class was dropped on a slot.
    RejectSlotItem {
        /// Class owning the slot.
        class: SummonClass,
        /// Slot the item was dropped on.
        slot: SlotIndex,
        /// Item that failed validation.
        item: ItemId,
    },
    /// Empties a slot, shrinking the group when it is not the sole slot.
    ClearSlotItem {
        /// Class owning the slot.
        class: SummonClass,
        /// Slot to empty.
        slot: SlotIndex,
    },
    /// Changes a slot's desired quantity by a signed delta.
    AdjustSlotQuantity {
        /// Class owning the slot.
        class: SummonClass,
        /// Slot to adjust.
        slot: SlotIndex,
        /// Signed change applied to the desired quantity.
        delta: i32,
        /// Capacity ceiling sampled immediately before the adjustment.
        capacity: u32,
    },
    /// Toggles a slot in or out of fill mode.
    ToggleSlotFill {
        /// Class owning the slot.
        class: SummonClass,
        /// Slot to toggle.
        slot: SlotIndex,
        /// Capacity ceiling sampled immediately before the toggle.
        capacity: u32,
    },
    /// Writes a persisted quantity back onto a slot without capacity checks.
    RestoreSlotQuantity {
        /// Class owning the slot.
        class: SummonClass,
        /// Slot to restore.
        slot: SlotIndex,
        /// Quantity recorded at save time.
        quantity: u32,
    },
    /// Removes a slot outright, never the sole slot of a group.
    RemoveSlot {
        /// Class owning the slot.
        class: SummonClass,
        /// Slot to remove.
        slot: SlotIndex,
    },
    /// Resets both groups to a single empty slot.
    ClearAll,
}

/// Why a slot command left the loadout untouched.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SlotRejection {
    /// No slot exists at the requested index.
    MissingSlot,
    /// The slot holds no item, so it cannot carry a quantity.
    EmptySlot,
    /// The sole slot of a group cannot be removed.
    SoleSlot,
    /// The change would push the group's desired total beyond capacity.
    ExceedsCapacity,
}

/// Why the engine issued a full resync.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResyncReason {
    /// A slot's item or quantity changed.
    SlotMutation,
    /// The class capacity ceiling changed.
    CapacityChanged,
    /// The avatar came back to life.
    Respawned,
    /// The actor entered a world session.
    WorldEntered,
    /// The actor reconnected to a session.
    Reconnected,
}

/// Events broadcast after commands are processed or reconciliation runs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that a capacity ceiling was recorded.
    CapacityApplied {
        /// Class whose ceiling was recorded.
        class: SummonClass,
        /// Recorded ceiling.
        capacity: u32,
    },
    /// Confirms that an item was bound to a slot.
    SlotItemAssigned {
        /// Class owning the slot.
        class: SummonClass,
        /// Slot that received the item.
        slot: SlotIndex,
        /// Item bound to the slot.
        item: ItemId,
    },
    /// Announces that a new empty slot was appended to a group.
    SlotAppended {
        /// Class owning the new slot.
        class: SummonClass,
        /// Position of the new slot.
        slot: SlotIndex,
    },
    /// Confirms that a slot was emptied in place.
    SlotItemCleared {
        /// Class owning the slot.
        class: SummonClass,
        /// Slot that was emptied.
        slot: SlotIndex,
    },
    /// Reports that an incompatible item was refused.
    SlotItemRejected {
        /// Class owning the slot.
        class: SummonClass,
        /// Slot the item was dropped on.
        slot: SlotIndex,
        /// Item that was refused.
        item: ItemId,
    },
    /// Confirms that a slot was removed; later slots shift down by one.
    SlotRemoved {
        /// Class that owned the slot.
        class: SummonClass,
        /// Position the slot occupied before removal.
        slot: SlotIndex,
    },
    /// Confirms that a slot's desired quantity or fill mode changed.
    QuantityChanged {
        /// Class owning the slot.
        class: SummonClass,
        /// Slot whose quantity changed.
        slot: SlotIndex,
        /// New desired quantity.
        quantity: u32,
        /// Whether the slot is now in fill mode.
        filled: bool,
    },
    /// Reports that a slot command was refused.
    SlotCommandRejected {
        /// Class owning the slot.
        class: SummonClass,
        /// Slot targeted by the command.
        slot: SlotIndex,
        /// Specific reason the command failed.
        reason: SlotRejection,
    },
    /// Announces that both groups were reset.
    LoadoutCleared,
    /// Reports the outcome of a full despawn-then-respawn pass.
    ResyncCompleted {
        /// Class that was resynchronised.
        class: SummonClass,
        /// Trigger for the pass.
        reason: ResyncReason,
        /// Spawn requests the host accepted.
        spawned: u32,
    },
    /// Reports entities added by the per-tick top-up.
    ToppedUp {
        /// Class that was topped up.
        class: SummonClass,
        /// Spawn requests the host accepted.
        spawned: u32,
    },
    /// Reports that off-screen sentries were killed for respawn.
    SentriesRefreshed {
        /// Number of sentries that were despawned.
        despawned: u32,
    },
}

/// Immutable representation of one slot used for queries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlotSnapshot {
    /// Class owning the slot.
    pub class: SummonClass,
    /// Position of the slot within its group.
    pub slot: SlotIndex,
    /// Item bound to the slot, if any.
    pub item: Option<ItemId>,
    /// Number of instances that should be alive.
    pub quantity: u32,
    /// Whether the slot tracks the remaining capacity automatically.
    pub filled: bool,
}

impl SlotSnapshot {
    /// Display text for the slot's desired quantity, e.g. `Minions: 3`.
    #[must_use]
    pub fn quantity_text(&self) -> String {
        format!("{}: {}", self.class.quantity_label(), self.quantity)
    }

    /// Label for the fill toggle button.
    #[must_use]
    pub const fn fill_label(&self) -> &'static str {
        if self.filled {
            "Unfill"
        } else {
            "Fill"
        }
    }
}

/// Read-only snapshot describing every slot of one class in display order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SlotView {
    snapshots: Vec<SlotSnapshot>,
}

impl SlotView {
    /// Creates a new slot view from snapshots already in slot order.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<SlotSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.slot);
        Self { snapshots }
    }

    /// Iterator over the captured slots in display order.
    pub fn iter(&self) -> impl Iterator<Item = &SlotSnapshot> {
        self.snapshots.iter()
    }

    /// Number of slots captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view captured no slots.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Retrieves the snapshot at the provided slot index.
    #[must_use]
    pub fn get(&self, slot: SlotIndex) -> Option<&SlotSnapshot> {
        self.snapshots.get(slot.get())
    }

    /// Sum of desired quantities across the captured slots.
    #[must_use]
    pub fn total_quantity(&self) -> u32 {
        self.snapshots
            .iter()
            .fold(0u32, |total, snapshot| total.saturating_add(snapshot.quantity))
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<SlotSnapshot> {
        self.snapshots
    }
}

/// Formats the class-wide usage label, e.g. `Minion Slots: 2.5/4`.
#[must_use]
pub fn capacity_text(class: SummonClass, used: f32, capacity: u32) -> String {
    format!("{}: {used}/{capacity}", class.capacity_label())
}

/// Persisted binding of one slot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotRecord {
    /// Item bound to the slot.
    pub item: ItemId,
    /// Desired quantity at save time.
    pub quantity: u32,
}

/// Persisted contents of both groups, each in slot order.
///
/// Empty slots are never recorded; the trailing empty slot of each group is
/// recreated on load.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadoutRecord {
    /// Minion slots in slot order.
    pub minions: Vec<SlotRecord>,
    /// Sentry slots in slot order.
    pub sentries: Vec<SlotRecord>,
}

impl LoadoutRecord {
    /// Records of the provided class.
    #[must_use]
    pub fn class(&self, class: SummonClass) -> &[SlotRecord] {
        match class {
            SummonClass::Minion => &self.minions,
            SummonClass::Sentry => &self.sentries,
        }
    }

    /// Captures every bound slot of the two views.
    #[must_use]
    pub fn capture(minions: &SlotView, sentries: &SlotView) -> Self {
        fn bound(view: &SlotView) -> Vec<SlotRecord> {
            view.iter()
                .filter_map(|snapshot| {
                    snapshot.item.clone().map(|item| SlotRecord {
                        item,
                        quantity: snapshot.quantity,
                    })
                })
                .collect()
        }

        Self {
            minions: bound(minions),
            sentries: bound(sentries),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        capacity_text, EntityId, ItemId, LiveEntity, LoadoutRecord, Position, SlotIndex,
        SlotRecord, SlotSnapshot, SlotView, SummonClass, Viewport,
    };
    use serde::{de::DeserializeOwned, Serialize};

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn modded_item_id_round_trips_through_bincode() {
        assert_round_trip(&ItemId::modded("Calamity", "StaffOfNecrosteocytes"));
    }

    #[test]
    fn item_id_display_carries_namespace() {
        assert_eq!(ItemId::native(1309).to_string(), "native:1309");
        assert_eq!(
            ItemId::modded("Thorium", "BoneBaton").to_string(),
            "Thorium:BoneBaton"
        );
        assert_eq!(ItemId::native(7).namespace(), "native");
    }

    #[test]
    fn item_id_parses_its_display_form() {
        for item in [ItemId::native(1802), ItemId::modded("Thorium", "BoneBaton")] {
            assert_eq!(ItemId::parse(&item.to_string()), Some(item));
        }
        assert_eq!(ItemId::parse("native:staff"), None);
        assert_eq!(ItemId::parse("NoSeparator"), None);
        assert_eq!(ItemId::parse(":1802"), None);
    }

    #[test]
    fn minion_units_follow_weight_and_sentries_count_flat() {
        let heavy = LiveEntity {
            id: EntityId::new(1),
            class: SummonClass::Minion,
            weight: 2.0,
            position: Position::default(),
        };
        let turret = LiveEntity {
            id: EntityId::new(2),
            class: SummonClass::Sentry,
            weight: 0.0,
            position: Position::default(),
        };

        assert!((SummonClass::Minion.units_for(&heavy) - 2.0).abs() < f32::EPSILON);
        assert!((SummonClass::Sentry.units_for(&turret) - 1.0).abs() < f32::EPSILON);
        assert!(SummonClass::Sentry.units_for(&heavy).abs() < f32::EPSILON);
    }

    #[test]
    fn viewport_margin_extends_visible_region() {
        let viewport = Viewport::new(Position::new(0.0, 0.0), 800.0, 600.0);

        assert!(!viewport.is_outside(Position::new(850.0, 300.0), 100.0));
        assert!(viewport.is_outside(Position::new(901.0, 300.0), 100.0));
        assert!(viewport.is_outside(Position::new(400.0, -101.0), 100.0));
    }

    #[test]
    fn labels_are_derived_from_typed_quantities() {
        let snapshot = SlotSnapshot {
            class: SummonClass::Sentry,
            slot: SlotIndex::new(0),
            item: Some(ItemId::native(1)),
            quantity: 7,
            filled: true,
        };

        assert_eq!(snapshot.quantity_text(), "Sentries: 7");
        assert_eq!(snapshot.fill_label(), "Unfill");
        assert_eq!(
            capacity_text(SummonClass::Minion, 2.5, 4),
            "Minion Slots: 2.5/4"
        );
    }

    #[test]
    fn slot_view_sorts_and_totals() {
        let view = SlotView::from_snapshots(vec![
            SlotSnapshot {
                class: SummonClass::Minion,
                slot: SlotIndex::new(1),
                item: None,
                quantity: 0,
                filled: false,
            },
            SlotSnapshot {
                class: SummonClass::Minion,
                slot: SlotIndex::new(0),
                item: Some(ItemId::native(3)),
                quantity: 4,
                filled: false,
            },
        ]);

        assert_eq!(view.len(), 2);
        assert_eq!(view.total_quantity(), 4);
        assert_eq!(
            view.get(SlotIndex::new(0)).and_then(|slot| slot.item.clone()),
            Some(ItemId::native(3))
        );
    }

    #[test]
    fn capture_skips_empty_slots() {
        let snapshot = |slot: usize, item: Option<ItemId>, quantity: u32| SlotSnapshot {
            class: SummonClass::Minion,
            slot: SlotIndex::new(slot),
            item,
            quantity,
            filled: false,
        };
        let minions = SlotView::from_snapshots(vec![
            snapshot(0, Some(ItemId::native(1802)), 3),
            snapshot(1, None, 0),
        ]);

        let record = LoadoutRecord::capture(&minions, &SlotView::default());

        assert_eq!(
            record.class(SummonClass::Minion),
            &[SlotRecord {
                item: ItemId::native(1802),
                quantity: 3,
            }]
        );
        assert!(record.sentries.is_empty());
    }
}
