#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Per-player persistence of the summon loadout.
//!
//! Loadouts are stored as JSON, one file per player, holding an ordered list
//! of `(namespace, item, stack)` entries per class. Decoding is lenient: an
//! entry that cannot be understood is dropped on its own, and any failure to
//! read the file as a whole falls back to an empty loadout.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use auto_summon_core::{ItemId, LoadoutRecord, SlotRecord, NATIVE_NAMESPACE};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

const FILE_EXTENSION: &str = "json";

/// Errors raised while reading or writing a stored loadout.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    /// The player name cannot be turned into a file name.
    #[error("player name `{0}` cannot be used as a file name")]
    InvalidPlayer(String),
    /// The stored loadout exists but could not be read.
    #[error("failed to read loadout at {path}")]
    Read {
        /// File that failed to read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The loadout could not be written.
    #[error("failed to write loadout at {path}")]
    Write {
        /// File that failed to write.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The stored loadout is not a JSON document of the expected shape.
    #[error("loadout at {path} is malformed")]
    Malformed {
        /// File holding the malformed document.
        path: PathBuf,
        /// Underlying decoding failure.
        #[source]
        source: serde_json::Error,
    },
}

/// One persisted slot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedItem {
    /// Namespace owning the item, `native` for base-game items.
    pub namespace: String,
    /// Item name for modded items, numeric type for base-game items.
    pub item: String,
    /// Desired quantity.
    pub stack: u32,
}

impl SavedItem {
    fn from_record(record: &SlotRecord) -> Self {
        let item = match &record.item {
            ItemId::Native(type_id) => type_id.to_string(),
            ItemId::Modded { name, .. } => name.clone(),
        };
        Self {
            namespace: record.item.namespace().to_owned(),
            item,
            stack: record.quantity,
        }
    }

    /// Resolves the stored identifier, or `None` when it cannot name an item.
    #[must_use]
    pub fn to_record(&self) -> Option<SlotRecord> {
        if self.item.is_empty() || self.namespace.is_empty() {
            return None;
        }
        let item = if self.namespace == NATIVE_NAMESPACE {
            ItemId::native(self.item.parse().ok()?)
        } else {
            ItemId::modded(self.namespace.clone(), self.item.clone())
        };
        Some(SlotRecord {
            item,
            quantity: self.stack,
        })
    }
}

/// On-disk representation of a loadout.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedLoadout {
    /// Minion slots in slot order.
    pub minion_items: Vec<SavedItem>,
    /// Sentry slots in slot order.
    pub sentry_items: Vec<SavedItem>,
}

impl SavedLoadout {
    /// Captures the bound slots of a loadout record.
    #[must_use]
    pub fn from_record(record: &LoadoutRecord) -> Self {
        Self {
            minion_items: record.minions.iter().map(SavedItem::from_record).collect(),
            sentry_items: record.sentries.iter().map(SavedItem::from_record).collect(),
        }
    }
}

#[derive(Default, Deserialize)]
struct LenientLoadout {
    #[serde(default)]
    minion_items: Vec<serde_json::Value>,
    #[serde(default)]
    sentry_items: Vec<serde_json::Value>,
}

/// Decodes a JSON document, dropping every entry that does not name an item.
///
/// # Errors
///
/// Returns the decoding error when the document itself is not a JSON object.
pub fn decode(json: &str) -> Result<LoadoutRecord, serde_json::Error> {
    let lenient: LenientLoadout = serde_json::from_str(json)?;
    Ok(LoadoutRecord {
        minions: decode_entries(lenient.minion_items),
        sentries: decode_entries(lenient.sentry_items),
    })
}

fn decode_entries(values: Vec<serde_json::Value>) -> Vec<SlotRecord> {
    values
        .into_iter()
        .filter_map(|value| {
            let record = serde_json::from_value::<SavedItem>(value.clone())
                .ok()
                .and_then(|saved| saved.to_record());
            if record.is_none() {
                warn!(entry = %value, "dropping unreadable saved slot");
            }
            record
        })
        .collect()
}

/// Encodes a record as pretty-printed JSON.
///
/// # Errors
///
/// Propagates serializer failures, which do not occur for well-formed records.
pub fn encode(record: &LoadoutRecord) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&SavedLoadout::from_record(record))
}

/// Storage keyed by player identity.
pub trait LoadoutStore {
    /// Loads the player's loadout; `Ok(None)` when nothing was saved yet.
    ///
    /// # Errors
    ///
    /// Returns an error when stored data exists but cannot be used.
    fn load(&self, player: &str) -> Result<Option<LoadoutRecord>, PersistenceError>;

    /// Replaces the player's stored loadout.
    ///
    /// # Errors
    ///
    /// Returns an error when the loadout could not be written.
    fn save(&self, player: &str, record: &LoadoutRecord) -> Result<(), PersistenceError>;
}

/// Loads the player's loadout, falling back to an empty one on any failure.
pub fn load_or_default(store: &impl LoadoutStore, player: &str) -> LoadoutRecord {
    match store.load(player) {
        Ok(Some(record)) => record,
        Ok(None) => {
            debug!(player, "no saved loadout; starting empty");
            LoadoutRecord::default()
        }
        Err(error) => {
            warn!(player, error = %error, "failed to load loadout; starting empty");
            LoadoutRecord::default()
        }
    }
}

/// Stores each player's loadout as `<dir>/<player>.json`.
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Creates a store rooted at the provided directory.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the stored loadouts.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing the player's loadout.
    ///
    /// # Errors
    ///
    /// Rejects names that are empty or would escape the store directory.
    pub fn path_for(&self, player: &str) -> Result<PathBuf, PersistenceError> {
        let usable = !player.is_empty()
            && player != "."
            && player != ".."
            && !player.contains(['/', '\\', '\0']);
        if !usable {
            return Err(PersistenceError::InvalidPlayer(player.to_owned()));
        }
        Ok(self.dir.join(format!("{player}.{FILE_EXTENSION}")))
    }
}

impl LoadoutStore for JsonFileStore {
    fn load(&self, player: &str) -> Result<Option<LoadoutRecord>, PersistenceError> {
        let path = self.path_for(player)?;
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(PersistenceError::Read { path, source }),
        };
        decode(&contents)
            .map(Some)
            .map_err(|source| PersistenceError::Malformed { path, source })
    }

    fn save(&self, player: &str, record: &LoadoutRecord) -> Result<(), PersistenceError> {
        let path = self.path_for(player)?;
        let json = encode(record).map_err(|source| PersistenceError::Malformed {
            path: path.clone(),
            source,
        })?;
        fs::create_dir_all(&self.dir).map_err(|source| PersistenceError::Write {
            path: path.clone(),
            source,
        })?;
        fs::write(&path, json).map_err(|source| PersistenceError::Write {
            path: path.clone(),
            source,
        })?;
        debug!(player, path = %path.display(), "saved loadout");
        Ok(())
    }
}
