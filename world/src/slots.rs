//! Slot groups that bind summon items to desired quantities.

use auto_summon_core::{Event, ItemId, SlotIndex, SlotRejection, SlotSnapshot, SummonClass};

/// One binding between an item and the number of its summons that should live.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SlotEntry {
    item: Option<ItemId>,
    quantity: u32,
    filled: bool,
}

impl SlotEntry {
    /// Creates a slot with no item and a zero quantity.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            item: None,
            quantity: 0,
            filled: false,
        }
    }

    /// Item bound to the slot, if any.
    #[must_use]
    pub fn item(&self) -> Option<&ItemId> {
        self.item.as_ref()
    }

    /// Desired number of live summons for the slot.
    #[must_use]
    pub const fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Whether the slot tracks the remaining capacity automatically.
    #[must_use]
    pub const fn is_filled(&self) -> bool {
        self.filled
    }

    /// Whether the slot holds no item.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.item.is_none()
    }
}

/// Ordered slots for a single summon class.
///
/// The group always holds at least one slot. Order is display order and
/// decides spawn priority when the desired total exceeds capacity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlotGroup {
    class: SummonClass,
    entries: Vec<SlotEntry>,
}

impl SlotGroup {
    /// Creates a group holding a single empty slot.
    #[must_use]
    pub fn new(class: SummonClass) -> Self {
        Self {
            class,
            entries: vec![SlotEntry::empty()],
        }
    }

    /// Class whose capacity pool the group draws from.
    #[must_use]
    pub const fn class(&self) -> SummonClass {
        self.class
    }

    /// Slots in display order.
    #[must_use]
    pub fn entries(&self) -> &[SlotEntry] {
        &self.entries
    }

    /// Number of slots in the group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Sum of desired quantities across every slot.
    #[must_use]
    pub fn total_quantity(&self) -> u32 {
        self.entries
            .iter()
            .fold(0u32, |total, entry| total.saturating_add(entry.quantity))
    }

    /// Index of the slot currently in fill mode, if any.
    #[must_use]
    pub fn filled_slot(&self) -> Option<SlotIndex> {
        self.entries
            .iter()
            .position(|entry| entry.filled)
            .map(SlotIndex::new)
    }

    /// Captures an immutable snapshot of every slot.
    #[must_use]
    pub fn snapshots(&self) -> Vec<SlotSnapshot> {
        self.entries
            .iter()
            .enumerate()
            .map(|(index, entry)| SlotSnapshot {
                class: self.class,
                slot: SlotIndex::new(index),
                item: entry.item.clone(),
                quantity: entry.quantity,
                filled: entry.filled,
            })
            .collect()
    }

    /// Binds a valid item to the slot, growing the group when the slot is last.
    ///
    /// Rebinding the item a slot already holds keeps its quantity; any other
    /// item starts from zero.
    pub fn set_item(
        &mut self,
        slot: SlotIndex,
        item: ItemId,
        out: &mut Vec<Event>,
    ) -> Result<(), SlotRejection> {
        let index = self.index_of(slot)?;
        let class = self.class;
        let entry = &mut self.entries[index];

        if entry.item.as_ref() != Some(&item) {
            let had_quantity = entry.quantity != 0 || entry.filled;
            entry.item = Some(item.clone());
            entry.quantity = 0;
            entry.filled = false;
            if had_quantity {
                out.push(quantity_changed(class, index, entry));
            }
        }
        out.push(Event::SlotItemAssigned { class, slot, item });

        if index + 1 == self.entries.len() {
            self.entries.push(SlotEntry::empty());
            out.push(Event::SlotAppended {
                class,
                slot: SlotIndex::new(index + 1),
            });
        }

        Ok(())
    }

    /// Empties the slot, removing it unless it is the sole slot.
    ///
    /// A slot that is already empty is left alone so the trailing empty slot
    /// survives repeated clears.
    pub fn clear_item(&mut self, slot: SlotIndex, out: &mut Vec<Event>) -> Result<(), SlotRejection> {
        let index = self.index_of(slot)?;
        if self.entries[index].is_empty() {
            return Ok(());
        }

        if self.entries.len() == 1 {
            self.entries[index] = SlotEntry::empty();
            out.push(Event::SlotItemCleared {
                class: self.class,
                slot,
            });
            return Ok(());
        }

        let _ = self.entries.remove(index);
        out.push(Event::SlotRemoved {
            class: self.class,
            slot,
        });
        Ok(())
    }

    /// Refuses an incompatible item and empties the slot it was dropped on.
    pub fn reject_item(
        &mut self,
        slot: SlotIndex,
        item: ItemId,
        out: &mut Vec<Event>,
    ) -> Result<(), SlotRejection> {
        let _ = self.index_of(slot)?;
        out.push(Event::SlotItemRejected {
            class: self.class,
            slot,
            item,
        });
        self.clear_item(slot, out)
    }

    /// Removes the slot; the sole remaining slot is never removed.
    pub fn remove_slot(&mut self, slot: SlotIndex, out: &mut Vec<Event>) -> Result<(), SlotRejection> {
        let index = self.index_of(slot)?;
        if self.entries.len() == 1 {
            return Err(SlotRejection::SoleSlot);
        }

        let _ = self.entries.remove(index);
        out.push(Event::SlotRemoved {
            class: self.class,
            slot,
        });
        Ok(())
    }

    /// Applies a signed change to the slot's desired quantity.
    ///
    /// Any change that leaves the group total above `capacity` is refused,
    /// decreases included. Dropping a slot to zero is always accepted.
    pub fn adjust_quantity(
        &mut self,
        slot: SlotIndex,
        delta: i32,
        capacity: u32,
        out: &mut Vec<Event>,
    ) -> Result<(), SlotRejection> {
        let index = self.index_of(slot)?;
        if self.entries[index].is_empty() {
            return Err(SlotRejection::EmptySlot);
        }

        let current = self.entries[index].quantity;
        let others = self.total_quantity().saturating_sub(current);
        let requested = i64::from(current) + i64::from(delta);
        let new_quantity = u32::try_from(requested.max(0)).unwrap_or(u32::MAX);

        if new_quantity > 0 && u64::from(others) + u64::from(new_quantity) > u64::from(capacity) {
            return Err(SlotRejection::ExceedsCapacity);
        }

        let reaches_brim = delta > 0 && new_quantity == capacity.saturating_sub(others);
        let other_filled = self
            .entries
            .iter()
            .enumerate()
            .any(|(position, entry)| position != index && entry.filled);

        let entry = &mut self.entries[index];
        let before = (entry.quantity, entry.filled);
        entry.quantity = new_quantity;
        if delta < 0 && new_quantity == 0 {
            entry.filled = false;
        }
        if reaches_brim && !other_filled {
            entry.filled = true;
        }

        if before != (entry.quantity, entry.filled) {
            out.push(quantity_changed(self.class, index, entry));
        }
        Ok(())
    }

    /// Switches the slot in or out of fill mode.
    ///
    /// Fill is exclusive: entering it zeroes every other filled slot before
    /// the slot claims whatever capacity remains.
    pub fn toggle_fill(
        &mut self,
        slot: SlotIndex,
        capacity: u32,
        out: &mut Vec<Event>,
    ) -> Result<(), SlotRejection> {
        let index = self.index_of(slot)?;
        if self.entries[index].is_empty() {
            return Err(SlotRejection::EmptySlot);
        }

        if self.entries[index].filled {
            let entry = &mut self.entries[index];
            entry.quantity = 0;
            entry.filled = false;
            out.push(quantity_changed(self.class, index, entry));
            return Ok(());
        }

        for position in 0..self.entries.len() {
            if position == index || !self.entries[position].filled {
                continue;
            }
            let entry = &mut self.entries[position];
            entry.quantity = 0;
            entry.filled = false;
            out.push(quantity_changed(self.class, position, entry));
        }

        let current = self.entries[index].quantity;
        let others = self.total_quantity().saturating_sub(current);
        let entry = &mut self.entries[index];
        entry.quantity = capacity.saturating_sub(others).min(capacity);
        entry.filled = true;
        out.push(quantity_changed(self.class, index, entry));
        Ok(())
    }

    /// Recomputes every filled slot against a new capacity ceiling.
    ///
    /// Manually set slots keep their stored quantity even when the group now
    /// exceeds the ceiling; reconciliation truncates what is actually spawned.
    pub fn recompute(&mut self, capacity: u32, out: &mut Vec<Event>) {
        for index in 0..self.entries.len() {
            if !self.entries[index].filled {
                continue;
            }

            let current = self.entries[index].quantity;
            let others = self.total_quantity().saturating_sub(current);
            let recomputed = capacity.saturating_sub(others);
            if recomputed != current {
                let entry = &mut self.entries[index];
                entry.quantity = recomputed;
                out.push(quantity_changed(self.class, index, entry));
            }
        }
    }

    /// Writes a persisted quantity back without consulting capacity.
    pub fn restore_quantity(
        &mut self,
        slot: SlotIndex,
        quantity: u32,
        out: &mut Vec<Event>,
    ) -> Result<(), SlotRejection> {
        let index = self.index_of(slot)?;
        if self.entries[index].is_empty() {
            return Err(SlotRejection::EmptySlot);
        }

        let entry = &mut self.entries[index];
        if entry.quantity != quantity || entry.filled {
            entry.quantity = quantity;
            entry.filled = false;
            out.push(quantity_changed(self.class, index, entry));
        }
        Ok(())
    }

    /// Resets the group to a single empty slot.
    pub fn reset(&mut self) {
        self.entries.clear();
        self.entries.push(SlotEntry::empty());
    }

    fn index_of(&self, slot: SlotIndex) -> Result<usize, SlotRejection> {
        let index = slot.get();
        if index < self.entries.len() {
            Ok(index)
        } else {
            Err(SlotRejection::MissingSlot)
        }
    }
}

fn quantity_changed(class: SummonClass, index: usize, entry: &SlotEntry) -> Event {
    Event::QuantityChanged {
        class,
        slot: SlotIndex::new(index),
        quantity: entry.quantity,
        filled: entry.filled,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group_with(items: &[u32]) -> SlotGroup {
        let mut group = SlotGroup::new(SummonClass::Minion);
        let mut events = Vec::new();
        for (index, item) in items.iter().enumerate() {
            group
                .set_item(SlotIndex::new(index), ItemId::native(*item), &mut events)
                .expect("slot exists");
        }
        group
    }

    #[test]
    fn new_group_holds_one_empty_slot() {
        let group = SlotGroup::new(SummonClass::Sentry);
        assert_eq!(group.len(), 1);
        assert!(group.entries()[0].is_empty());
        assert_eq!(group.total_quantity(), 0);
    }

    #[test]
    fn rebinding_same_item_keeps_quantity() {
        let mut group = group_with(&[10]);
        let mut events = Vec::new();
        group
            .adjust_quantity(SlotIndex::new(0), 3, 10, &mut events)
            .expect("within capacity");

        group
            .set_item(SlotIndex::new(0), ItemId::native(10), &mut events)
            .expect("slot exists");

        assert_eq!(group.entries()[0].quantity(), 3);
        assert_eq!(group.len(), 2, "rebinding a non-last slot must not grow");
    }

    #[test]
    fn replacing_item_resets_quantity() {
        let mut group = group_with(&[10]);
        let mut events = Vec::new();
        group
            .adjust_quantity(SlotIndex::new(0), 3, 10, &mut events)
            .expect("within capacity");
        events.clear();

        group
            .set_item(SlotIndex::new(0), ItemId::native(11), &mut events)
            .expect("slot exists");

        assert_eq!(group.entries()[0].quantity(), 0);
        assert_eq!(
            events[0],
            Event::QuantityChanged {
                class: SummonClass::Minion,
                slot: SlotIndex::new(0),
                quantity: 0,
                filled: false,
            }
        );
    }

    #[test]
    fn decrement_below_zero_clamps() {
        let mut group = group_with(&[10]);
        let mut events = Vec::new();

        group
            .adjust_quantity(SlotIndex::new(0), -5, 10, &mut events)
            .expect("decrement accepted");

        assert_eq!(group.entries()[0].quantity(), 0);
        assert!(events.is_empty(), "no change means no event");
    }

    #[test]
    fn clearing_trailing_empty_slot_is_a_no_op() {
        let mut group = group_with(&[10]);
        let mut events = Vec::new();

        group
            .clear_item(SlotIndex::new(1), &mut events)
            .expect("slot exists");

        assert_eq!(group.len(), 2);
        assert!(events.is_empty());
    }

    #[test]
    fn missing_slot_is_reported() {
        let mut group = SlotGroup::new(SummonClass::Minion);
        let mut events = Vec::new();

        assert_eq!(
            group.toggle_fill(SlotIndex::new(4), 10, &mut events),
            Err(SlotRejection::MissingSlot)
        );
        assert_eq!(
            group.adjust_quantity(SlotIndex::new(0), 1, 10, &mut events),
            Err(SlotRejection::EmptySlot)
        );
        assert!(events.is_empty());
    }
}
