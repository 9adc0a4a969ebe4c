#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Edge-triggered tracking of per-class capacity ceilings.
//!
//! Ceilings may change on any tick. The tracker remembers the last ceiling it
//! saw for each class and only asks for a recompute when that value moves, so
//! steady-state ticks never pay for a full despawn and respawn.

use auto_summon_core::{occupied_units, Command, OwnerId, SummonClass, SummonHost};
use tracing::debug;

/// Occupancy and ceiling of one class, sampled once per tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CapacitySample {
    /// Class the sample describes.
    pub class: SummonClass,
    /// Capacity units occupied by live entities of the class.
    pub live_units: f32,
    /// Maximum units the class may occupy.
    pub ceiling: u32,
}

impl CapacitySample {
    /// Samples the host for the provided class.
    #[must_use]
    pub fn take(host: &impl SummonHost, owner: OwnerId, class: SummonClass) -> Self {
        Self {
            class,
            live_units: occupied_units(host, owner, class),
            ceiling: host.capacity(owner, class),
        }
    }
}

/// Stage of the capacity-edge state machine for one class.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Phase {
    /// No capacity change is pending.
    #[default]
    Idle,
    /// A new ceiling was observed and must be reconciled.
    CapacityChanged,
    /// A resync triggered by the change is in progress.
    Reconciling,
}

#[derive(Clone, Copy, Debug, Default)]
struct ClassTrack {
    last_capacity: Option<u32>,
    phase: Phase,
}

/// Remembers the last observed ceiling of each class.
#[derive(Debug, Default)]
pub struct CapacityTracker {
    minion: ClassTrack,
    sentry: ClassTrack,
}

impl CapacityTracker {
    /// Creates a tracker that has not yet observed any ceiling.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a sample and emits `Command::ApplyCapacity` when the ceiling moved.
    ///
    /// The first sample of a class always counts as a change.
    pub fn observe(&mut self, sample: CapacitySample, out: &mut Vec<Command>) {
        let track = self.track_mut(sample.class);
        if track.last_capacity == Some(sample.ceiling) {
            return;
        }

        debug!(
            class = %sample.class,
            previous = ?track.last_capacity,
            ceiling = sample.ceiling,
            "capacity edge observed"
        );
        track.last_capacity = Some(sample.ceiling);
        track.phase = Phase::CapacityChanged;
        out.push(Command::ApplyCapacity {
            class: sample.class,
            capacity: sample.ceiling,
        });
    }

    /// Moves a pending change into reconciliation.
    ///
    /// Returns `true` when a capacity change was pending.
    pub fn begin_reconciling(&mut self, class: SummonClass) -> bool {
        let track = self.track_mut(class);
        if track.phase != Phase::CapacityChanged {
            return false;
        }
        track.phase = Phase::Reconciling;
        true
    }

    /// Returns the class to idle once its resync has been issued.
    pub fn settle(&mut self, class: SummonClass) {
        self.track_mut(class).phase = Phase::Idle;
    }

    /// Current phase of the class.
    #[must_use]
    pub fn phase(&self, class: SummonClass) -> Phase {
        self.track(class).phase
    }

    /// Last ceiling observed for the class, if any.
    #[must_use]
    pub fn last_capacity(&self, class: SummonClass) -> Option<u32> {
        self.track(class).last_capacity
    }

    /// Forgets every observed ceiling, e.g. when a new world session starts.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn track(&self, class: SummonClass) -> &ClassTrack {
        match class {
            SummonClass::Minion => &self.minion,
            SummonClass::Sentry => &self.sentry,
        }
    }

    fn track_mut(&mut self, class: SummonClass) -> &mut ClassTrack {
        match class {
            SummonClass::Minion => &mut self.minion,
            SummonClass::Sentry => &mut self.sentry,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(class: SummonClass, ceiling: u32) -> CapacitySample {
        CapacitySample {
            class,
            live_units: 0.0,
            ceiling,
        }
    }

    #[test]
    fn settle_without_change_stays_idle() {
        let mut tracker = CapacityTracker::new();
        assert!(!tracker.begin_reconciling(SummonClass::Sentry));
        tracker.settle(SummonClass::Sentry);
        assert_eq!(tracker.phase(SummonClass::Sentry), Phase::Idle);
    }

    #[test]
    fn reset_forgets_observed_ceilings() {
        let mut tracker = CapacityTracker::new();
        let mut out = Vec::new();
        tracker.observe(sample(SummonClass::Minion, 3), &mut out);

        tracker.reset();

        assert_eq!(tracker.last_capacity(SummonClass::Minion), None);
        assert_eq!(tracker.phase(SummonClass::Minion), Phase::Idle);
    }
}
