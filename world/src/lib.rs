#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative desired-state management for the auto-summon engine.
//!
//! The [`Loadout`] owns one [`SlotGroup`] per summon class. It never talks to
//! the host; capacity ceilings arrive inside the commands that need them.

mod slots;

pub use slots::{SlotEntry, SlotGroup};

use auto_summon_core::{Command, Event, SlotIndex, SlotRejection, SummonClass};

/// Desired summon state for one actor across both classes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Loadout {
    minions: SlotGroup,
    sentries: SlotGroup,
}

impl Loadout {
    /// Creates a loadout holding one empty slot per class.
    #[must_use]
    pub fn new() -> Self {
        Self {
            minions: SlotGroup::new(SummonClass::Minion),
            sentries: SlotGroup::new(SummonClass::Sentry),
        }
    }

    /// Provides read-only access to the group of the provided class.
    #[must_use]
    pub fn group(&self, class: SummonClass) -> &SlotGroup {
        match class {
            SummonClass::Minion => &self.minions,
            SummonClass::Sentry => &self.sentries,
        }
    }

    fn group_mut(&mut self, class: SummonClass) -> &mut SlotGroup {
        match class {
            SummonClass::Minion => &mut self.minions,
            SummonClass::Sentry => &mut self.sentries,
        }
    }
}

impl Default for Loadout {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the loadout, mutating state deterministically.
///
/// Commands that cannot be honoured leave the loadout untouched and emit
/// [`Event::SlotCommandRejected`] instead.
pub fn apply(loadout: &mut Loadout, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ApplyCapacity { class, capacity } => {
            out_events.push(Event::CapacityApplied { class, capacity });
            loadout.group_mut(class).recompute(capacity, out_events);
        }
        Command::SetSlotItem { class, slot, item } => {
            let outcome = loadout.group_mut(class).set_item(slot, item, out_events);
            report(class, slot, outcome, out_events);
        }
        Command::RejectSlotItem { class, slot, item } => {
            let outcome = loadout.group_mut(class).reject_item(slot, item, out_events);
            report(class, slot, outcome, out_events);
        }
        Command::ClearSlotItem { class, slot } => {
            let outcome = loadout.group_mut(class).clear_item(slot, out_events);
            report(class, slot, outcome, out_events);
        }
        Command::AdjustSlotQuantity {
            class,
            slot,
            delta,
            capacity,
        } => {
            let outcome = loadout
                .group_mut(class)
                .adjust_quantity(slot, delta, capacity, out_events);
            report(class, slot, outcome, out_events);
        }
        Command::ToggleSlotFill {
            class,
            slot,
            capacity,
        } => {
            let outcome = loadout
                .group_mut(class)
                .toggle_fill(slot, capacity, out_events);
            report(class, slot, outcome, out_events);
        }
        Command::RestoreSlotQuantity {
            class,
            slot,
            quantity,
        } => {
            let outcome = loadout
                .group_mut(class)
                .restore_quantity(slot, quantity, out_events);
            report(class, slot, outcome, out_events);
        }
        Command::RemoveSlot { class, slot } => {
            let outcome = loadout.group_mut(class).remove_slot(slot, out_events);
            report(class, slot, outcome, out_events);
        }
        Command::ClearAll => {
            loadout.minions.reset();
            loadout.sentries.reset();
            out_events.push(Event::LoadoutCleared);
        }
    }
}

fn report(
    class: SummonClass,
    slot: SlotIndex,
    outcome: Result<(), SlotRejection>,
    out_events: &mut Vec<Event>,
) {
    if let Err(reason) = outcome {
        out_events.push(Event::SlotCommandRejected {
            class,
            slot,
            reason,
        });
    }
}

/// Query functions that provide read-only access to the loadout.
pub mod query {
    use auto_summon_core::{SlotIndex, SlotView, SummonClass};

    use super::Loadout;

    /// Captures a read-only view of every slot of the class.
    #[must_use]
    pub fn slot_view(loadout: &Loadout, class: SummonClass) -> SlotView {
        SlotView::from_snapshots(loadout.group(class).snapshots())
    }

    /// Number of slots the class currently holds.
    #[must_use]
    pub fn slot_count(loadout: &Loadout, class: SummonClass) -> usize {
        loadout.group(class).len()
    }

    /// Sum of desired quantities for the class.
    #[must_use]
    pub fn total_quantity(loadout: &Loadout, class: SummonClass) -> u32 {
        loadout.group(class).total_quantity()
    }

    /// Slot of the class currently in fill mode, if any.
    #[must_use]
    pub fn filled_slot(loadout: &Loadout, class: SummonClass) -> Option<SlotIndex> {
        loadout.group(class).filled_slot()
    }

    /// Index of the last slot of the class.
    #[must_use]
    pub fn last_slot(loadout: &Loadout, class: SummonClass) -> SlotIndex {
        SlotIndex::new(slot_count(loadout, class).saturating_sub(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use auto_summon_core::ItemId;

    #[test]
    fn clear_all_resets_both_groups() {
        let mut loadout = Loadout::new();
        let mut events = Vec::new();
        for class in SummonClass::ALL {
            apply(
                &mut loadout,
                Command::SetSlotItem {
                    class,
                    slot: SlotIndex::new(0),
                    item: ItemId::native(1),
                },
                &mut events,
            );
        }
        events.clear();

        apply(&mut loadout, Command::ClearAll, &mut events);

        assert_eq!(loadout, Loadout::new());
        assert_eq!(events, vec![Event::LoadoutCleared]);
    }

    #[test]
    fn rejected_commands_are_reported_not_applied() {
        let mut loadout = Loadout::new();
        let mut events = Vec::new();

        apply(
            &mut loadout,
            Command::RemoveSlot {
                class: SummonClass::Sentry,
                slot: SlotIndex::new(0),
            },
            &mut events,
        );

        assert_eq!(query::slot_count(&loadout, SummonClass::Sentry), 1);
        assert_eq!(
            events,
            vec![Event::SlotCommandRejected {
                class: SummonClass::Sentry,
                slot: SlotIndex::new(0),
                reason: SlotRejection::SoleSlot,
            }]
        );
    }

    #[test]
    fn capacity_is_echoed_before_recompute_events() {
        let mut loadout = Loadout::new();
        let mut events = Vec::new();

        apply(
            &mut loadout,
            Command::ApplyCapacity {
                class: SummonClass::Minion,
                capacity: 3,
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![Event::CapacityApplied {
                class: SummonClass::Minion,
                capacity: 3,
            }]
        );
    }
}
