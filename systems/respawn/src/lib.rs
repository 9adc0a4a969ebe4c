#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Detects the moment a dead avatar comes back to life.

use auto_summon_core::AvatarStatus;
use tracing::debug;

/// One-shot gate that opens on the first tick the avatar is revived.
///
/// The gate arms itself whenever it observes the avatar dead and fires
/// exactly once when the avatar is alive again with positive health.
#[derive(Debug, Default)]
pub struct RespawnGate {
    waiting: bool,
}

impl RespawnGate {
    /// Creates a gate that is not waiting for a respawn.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Forces the gate to wait for the next revival, e.g. on entering a world.
    pub fn arm(&mut self) {
        self.waiting = true;
    }

    /// Drops any pending wait.
    pub fn disarm(&mut self) {
        self.waiting = false;
    }

    /// Reports whether the gate is waiting for the avatar to revive.
    #[must_use]
    pub const fn is_waiting(&self) -> bool {
        self.waiting
    }

    /// Feeds the current avatar state and returns `true` on the tick of revival.
    pub fn observe(&mut self, avatar: AvatarStatus) -> bool {
        if avatar.dead {
            if !self.waiting {
                debug!("avatar died; waiting for respawn");
            }
            self.waiting = true;
            return false;
        }

        if self.waiting && avatar.is_revived() {
            self.waiting = false;
            debug!(health = avatar.health, "avatar respawned");
            return true;
        }

        false
    }
}
