use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use auto_summon_core::{ItemId, SlotIndex, SummonClass};
use serde::Deserialize;

const SUPPORTED_SCRIPT_VERSION: u32 = 1;

/// Scripted play session replayed against the simulated host.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Script {
    /// Items the simulated game knows how to summon.
    pub(crate) items: Vec<CatalogueItem>,
    /// Minion ceiling when the session starts.
    pub(crate) minion_capacity: u32,
    /// Sentry ceiling when the session starts.
    pub(crate) sentry_capacity: u32,
    /// Actions replayed in order.
    pub(crate) steps: Vec<Step>,
}

/// Summon item registered with the simulated host.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct CatalogueItem {
    pub(crate) item: ItemId,
    pub(crate) class: SummonClass,
    pub(crate) weight: f32,
}

/// One scripted action.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub(crate) enum Step {
    SetItem {
        class: SummonClass,
        slot: usize,
        item: String,
    },
    ClearItem {
        class: SummonClass,
        slot: usize,
    },
    Adjust {
        class: SummonClass,
        slot: usize,
        delta: i32,
    },
    ToggleFill {
        class: SummonClass,
        slot: usize,
    },
    RemoveSlot {
        class: SummonClass,
        slot: usize,
    },
    ClearAll,
    Capacity {
        class: SummonClass,
        capacity: u32,
    },
    Tick {
        #[serde(default = "one")]
        count: u32,
    },
    Kill {
        class: SummonClass,
        #[serde(default = "one")]
        count: u32,
    },
    Drift {
        #[serde(default = "one")]
        count: u32,
    },
    Die,
    Revive {
        #[serde(default = "full_health")]
        health: i32,
    },
    Busy {
        busy: bool,
    },
    Suppress,
    AutoSummon {
        enabled: bool,
    },
    SentryRefresh {
        enabled: bool,
    },
    Reconnect,
}

impl Step {
    /// Slot targeted by the step, when it targets one.
    pub(crate) fn slot(&self) -> Option<SlotIndex> {
        match self {
            Self::SetItem { slot, .. }
            | Self::ClearItem { slot, .. }
            | Self::Adjust { slot, .. }
            | Self::ToggleFill { slot, .. }
            | Self::RemoveSlot { slot, .. } => Some(SlotIndex::new(*slot)),
            _ => None,
        }
    }
}

const fn one() -> u32 {
    1
}

const fn full_health() -> i32 {
    100
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawScript {
    version: u32,
    #[serde(default)]
    minion_capacity: u32,
    #[serde(default)]
    sentry_capacity: u32,
    #[serde(default)]
    items: Vec<RawItem>,
    #[serde(default)]
    steps: Vec<Step>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawItem {
    id: String,
    class: SummonClass,
    #[serde(default = "unit_weight")]
    weight: f32,
}

const fn unit_weight() -> f32 {
    1.0
}

impl Script {
    /// Reads and validates a script file.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read session script at {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("invalid session script at {}", path.display()))
    }

    /// Parses script contents.
    pub(crate) fn parse(contents: &str) -> Result<Self> {
        let raw: RawScript =
            toml::from_str(contents).context("failed to parse session script toml contents")?;
        if raw.version != SUPPORTED_SCRIPT_VERSION {
            bail!(
                "unsupported session script version {}; expected {}",
                raw.version,
                SUPPORTED_SCRIPT_VERSION
            );
        }

        let mut items = Vec::with_capacity(raw.items.len());
        for raw_item in raw.items {
            let item = parse_item(&raw_item.id)?;
            if items.iter().any(|known: &CatalogueItem| known.item == item) {
                bail!("item `{item}` is registered twice");
            }
            if raw_item.weight.is_nan() || raw_item.weight < 0.0 {
                bail!("item `{item}` has invalid weight {}", raw_item.weight);
            }
            items.push(CatalogueItem {
                item,
                class: raw_item.class,
                weight: raw_item.weight,
            });
        }

        for (index, step) in raw.steps.iter().enumerate() {
            if let Step::SetItem { item, .. } = step {
                let _ = parse_item(item).with_context(|| format!("step {index}"))?;
            }
        }

        Ok(Self {
            items,
            minion_capacity: raw.minion_capacity,
            sentry_capacity: raw.sentry_capacity,
            steps: raw.steps,
        })
    }
}

/// Parses `native:<type>` or `<namespace>:<name>`.
pub(crate) fn parse_item(value: &str) -> Result<ItemId> {
    ItemId::parse(value).with_context(|| {
        format!("`{value}` is not an item id; expected `native:<type>` or `<namespace>:<name>`")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_items_and_steps() {
        let script = Script::parse(
            r#"
            version = 1
            minion_capacity = 3

            [[items]]
            id = "native:1802"
            class = "minion"

            [[items]]
            id = "Thorium:BoneBaton"
            class = "minion"
            weight = 0.5

            [[steps]]
            action = "set_item"
            class = "minion"
            slot = 0
            item = "native:1802"

            [[steps]]
            action = "tick"
            "#,
        )
        .expect("valid script");

        assert_eq!(script.minion_capacity, 3);
        assert_eq!(script.sentry_capacity, 0);
        assert_eq!(script.items.len(), 2);
        assert_eq!(script.items[1].item, ItemId::modded("Thorium", "BoneBaton"));
        assert_eq!(script.steps[1], Step::Tick { count: 1 });
        assert_eq!(script.steps[0].slot(), Some(SlotIndex::new(0)));
    }

    #[test]
    fn rejects_unknown_versions() {
        let error = Script::parse("version = 2").expect_err("version 2 is unsupported");
        assert!(format!("{error:#}").contains("unsupported session script version 2"));
    }

    #[test]
    fn rejects_malformed_item_ids_in_steps() {
        let result = Script::parse(
            r#"
            version = 1

            [[steps]]
            action = "set_item"
            class = "sentry"
            slot = 0
            item = "native:staff"
            "#,
        );
        assert!(result.is_err());
    }
}
