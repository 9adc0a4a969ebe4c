#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Selects sentries that drifted out of view so they can be recreated near the avatar.

use std::collections::BTreeMap;

use auto_summon_core::{EntityId, LiveEntity, SummonClass, Viewport};
use tracing::trace;

/// Distance beyond the viewport edges a sentry may sit before it counts as off-screen.
pub const DEFAULT_MARGIN: f32 = 100.0;

/// Ticks that must elapse before the same entity may be refreshed again.
pub const DEFAULT_COOLDOWN_TICKS: u64 = 120;

/// Tunables for off-screen detection.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RefreshPolicy {
    /// Margin added around the viewport, in world units.
    pub margin: f32,
    /// Minimum tick distance between two refreshes of one entity.
    pub cooldown_ticks: u64,
}

impl Default for RefreshPolicy {
    fn default() -> Self {
        Self {
            margin: DEFAULT_MARGIN,
            cooldown_ticks: DEFAULT_COOLDOWN_TICKS,
        }
    }
}

/// Off-screen sentry selector with a per-entity cooldown.
#[derive(Debug, Default)]
pub struct SentryRefresh {
    policy: RefreshPolicy,
    last_refresh: BTreeMap<EntityId, u64>,
}

impl SentryRefresh {
    /// Creates a selector using the provided policy.
    #[must_use]
    pub fn new(policy: RefreshPolicy) -> Self {
        Self {
            policy,
            last_refresh: BTreeMap::new(),
        }
    }

    /// Policy currently applied.
    #[must_use]
    pub const fn policy(&self) -> RefreshPolicy {
        self.policy
    }

    /// Pushes every off-screen sentry whose cooldown elapsed and stamps it with `tick`.
    ///
    /// Non-sentry entities are ignored. Cooldown records older than the
    /// cooldown window are discarded.
    pub fn collect(
        &mut self,
        tick: u64,
        viewport: Viewport,
        entities: &[LiveEntity],
        out: &mut Vec<EntityId>,
    ) {
        let cooldown = self.policy.cooldown_ticks;
        self.last_refresh
            .retain(|_, stamped| tick.saturating_sub(*stamped) <= cooldown);

        for entity in entities
            .iter()
            .filter(|entity| entity.class == SummonClass::Sentry)
        {
            if !viewport.is_outside(entity.position, self.policy.margin) {
                continue;
            }
            if self.last_refresh.contains_key(&entity.id) {
                trace!(entity = entity.id.get(), "off-screen sentry still cooling down");
                continue;
            }

            let _ = self.last_refresh.insert(entity.id, tick);
            out.push(entity.id);
        }
    }

    /// Tick at which the entity was last selected, if it is still cooling down.
    #[must_use]
    pub fn last_refreshed(&self, entity: EntityId) -> Option<u64> {
        self.last_refresh.get(&entity).copied()
    }

    /// Forgets every cooldown.
    pub fn reset(&mut self) {
        self.last_refresh.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use auto_summon_core::Position;

    fn viewport() -> Viewport {
        Viewport::new(Position::new(0.0, 0.0), 800.0, 600.0)
    }

    fn sentry(id: u32, x: f32, y: f32) -> LiveEntity {
        LiveEntity {
            id: EntityId::new(id),
            class: SummonClass::Sentry,
            weight: 1.0,
            position: Position::new(x, y),
        }
    }

    #[test]
    fn margin_keeps_nearby_sentries() {
        let mut refresh = SentryRefresh::default();
        let mut out = Vec::new();

        refresh.collect(
            0,
            viewport(),
            &[sentry(1, -99.0, 10.0), sentry(2, 900.5, 10.0), sentry(3, 10.0, 701.0)],
            &mut out,
        );

        assert_eq!(out, vec![EntityId::new(2), EntityId::new(3)]);
    }

    #[test]
    fn minions_are_never_selected() {
        let mut refresh = SentryRefresh::default();
        let mut minion = sentry(4, -5000.0, 0.0);
        minion.class = SummonClass::Minion;
        let mut out = Vec::new();

        refresh.collect(0, viewport(), &[minion], &mut out);

        assert!(out.is_empty());
    }
}
