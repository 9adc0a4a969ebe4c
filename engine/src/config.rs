use auto_summon_system_sentry_refresh::{RefreshPolicy, DEFAULT_COOLDOWN_TICKS, DEFAULT_MARGIN};
use serde::{Deserialize, Serialize};

/// Player-facing switches and tunables of the allocation engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Replace summons that died on their own every tick.
    pub auto_summon: bool,
    /// Recreate sentries that drifted out of view.
    pub refresh_offscreen_sentries: bool,
    /// Distance beyond the viewport edges before a sentry counts as off-screen.
    pub offscreen_margin: f32,
    /// Ticks before the same sentry may be refreshed again.
    pub refresh_cooldown_ticks: u64,
}

impl EngineConfig {
    /// Off-screen detection policy derived from the configuration.
    #[must_use]
    pub fn refresh_policy(&self) -> RefreshPolicy {
        RefreshPolicy {
            margin: self.offscreen_margin,
            cooldown_ticks: self.refresh_cooldown_ticks,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            auto_summon: true,
            refresh_offscreen_sentries: true,
            offscreen_margin: DEFAULT_MARGIN,
            refresh_cooldown_ticks: DEFAULT_COOLDOWN_TICKS,
        }
    }
}
