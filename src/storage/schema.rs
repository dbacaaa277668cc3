//! Typed access to the persisted keys.
//!
//! `Repository` is the only code that knows which key holds what and how each
//! value is shaped. Reads are lenient: a missing or corrupt value yields an
//! empty default plus a notice, never an error. Writes report failure through
//! `AppResult` so the caller can abort an operation without touching state.
//!
//! | key             | shape                                                  |
//! |-----------------|--------------------------------------------------------|
//! | `dream-entries` | JSON array of entry objects                            |
//! | `custom-moods`  | JSON array of mood objects, or legacy bare label strings |
//! | `app-pin`       | four ASCII digits                                      |
//! | `theme`         | `"dark"` or `"light"`                                  |

use super::{Notice, SafeStorage};
use crate::constants::{
    DEFAULT_MOOD_EMOJI, KEY_CUSTOM_MOODS, KEY_ENTRIES, KEY_PIN, KEY_THEME, LEGACY_MOOD_COLOR,
    PIN_LENGTH,
};
use crate::errors::{AppError, AppResult};
use crate::journal::Entry;
use crate::moods::MoodDefinition;
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

/// Display theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }
}

impl FromStr for Theme {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "dark" => Ok(Theme::Dark),
            "light" => Ok(Theme::Light),
            other => Err(AppError::Validation(format!(
                "unknown theme '{}': expected dark or light",
                other
            ))),
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One element of the persisted custom mood list.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredMood {
    Current(MoodDefinition),
    /// Early versions stored only the label.
    Legacy(String),
}

impl From<StoredMood> for MoodDefinition {
    fn from(stored: StoredMood) -> Self {
        match stored {
            StoredMood::Current(mood) => mood,
            StoredMood::Legacy(label) => MoodDefinition {
                key: label.clone(),
                label,
                emoji: DEFAULT_MOOD_EMOJI.to_string(),
                color: LEGACY_MOOD_COLOR.to_string(),
            },
        }
    }
}

/// Typed repository over [`SafeStorage`].
pub struct Repository {
    storage: SafeStorage,
}

impl Repository {
    pub fn new(storage: SafeStorage) -> Self {
        Repository { storage }
    }

    pub fn storage(&self) -> &SafeStorage {
        &self.storage
    }

    /// Drains the notices collected by the underlying adapter.
    pub fn take_notices(&self) -> Vec<Notice> {
        self.storage.take_notices()
    }

    /// Parses a stored JSON array, reporting corrupt values as a notice.
    fn load_array(&self, key: &str, what: &str) -> Vec<Value> {
        let Some(raw) = self.storage.get(key) else {
            return Vec::new();
        };

        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Array(items)) => items,
            Ok(other) => {
                warn!("'{}' holds a JSON {} instead of an array", key, json_kind(&other));
                self.storage.notify(Notice::error(format!(
                    "Saved {} are not a list and were ignored",
                    what
                )));
                Vec::new()
            }
            Err(e) => {
                warn!("Failed to parse '{}': {}", key, e);
                self.storage.notify(Notice::error(format!(
                    "Saved {} are corrupt and were ignored",
                    what
                )));
                Vec::new()
            }
        }
    }

    /// Loads the entry list, empty when absent or unreadable.
    ///
    /// Elements that are not valid entries are hidden from the list and
    /// counted in a notice. They stay in storage: see [`Repository::save_entries`].
    pub fn load_entries(&self) -> Vec<Entry> {
        let (entries, unreadable) = split_entries(self.load_array(KEY_ENTRIES, "entries"));

        if !unreadable.is_empty() {
            warn!("{} stored entries are unreadable", unreadable.len());
            self.storage.notify(Notice::warning(format!(
                "{} saved entries could not be read; they are kept but not shown",
                unreadable.len()
            )));
        }
        entries
    }

    /// Persists the complete entry list.
    ///
    /// Stored elements that could not be read are written back after
    /// `entries`, so editing the journal never drops them.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Unavailable` when no store accepted the write.
    pub fn save_entries(&self, entries: &[Entry]) -> AppResult<()> {
        let kept = match self.storage.get(KEY_ENTRIES) {
            Some(raw) => match serde_json::from_str::<Value>(&raw) {
                Ok(Value::Array(items)) => split_entries(items).1,
                _ => Vec::new(),
            },
            None => Vec::new(),
        };
        if !kept.is_empty() {
            debug!("Keeping {} unreadable entries in the saved list", kept.len());
        }
        self.write_entries(entries, kept)
    }

    /// Persists exactly `entries`, discarding anything else stored under the
    /// key. Used when an import overwrites the journal.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Unavailable` when no store accepted the write.
    pub fn replace_entries(&self, entries: &[Entry]) -> AppResult<()> {
        self.write_entries(entries, Vec::new())
    }

    fn write_entries(&self, entries: &[Entry], kept: Vec<Value>) -> AppResult<()> {
        let mut items = entries
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<Value>, _>>()?;
        items.extend(kept);
        let json = serde_json::to_string(&items)?;
        self.storage.set(KEY_ENTRIES, &json).require(KEY_ENTRIES)
    }

    pub fn clear_entries(&self) -> AppResult<()> {
        self.storage.remove(KEY_ENTRIES).require(KEY_ENTRIES)
    }

    /// Loads the custom moods in stored order, upgrading legacy label strings.
    pub fn load_custom_moods(&self) -> Vec<MoodDefinition> {
        self.load_array(KEY_CUSTOM_MOODS, "custom moods")
            .into_iter()
            .filter_map(|item| match serde_json::from_value::<StoredMood>(item) {
                Ok(stored) => Some(MoodDefinition::from(stored)),
                Err(e) => {
                    warn!("Skipping unreadable custom mood: {}", e);
                    None
                }
            })
            .collect()
    }

    /// Persists the custom moods. Legacy entries are written back as objects.
    pub fn save_custom_moods(&self, moods: &[MoodDefinition]) -> AppResult<()> {
        let json = serde_json::to_string(moods)?;
        self.storage
            .set(KEY_CUSTOM_MOODS, &json)
            .require(KEY_CUSTOM_MOODS)
    }

    /// The stored PIN, `None` when the lock is off.
    ///
    /// A value that is not exactly four digits is treated as absent, since it
    /// could never be entered.
    pub fn load_pin(&self) -> Option<String> {
        let pin = self.storage.get(KEY_PIN)?;
        if is_valid_pin(&pin) {
            Some(pin)
        } else {
            warn!("Ignoring malformed stored PIN");
            self.storage
                .notify(Notice::warning("Stored PIN is malformed; the lock is off"));
            None
        }
    }

    pub fn save_pin(&self, pin: &str) -> AppResult<()> {
        if !is_valid_pin(pin) {
            return Err(AppError::Validation(format!(
                "PIN must be exactly {} digits",
                PIN_LENGTH
            )));
        }
        self.storage.set(KEY_PIN, pin).require(KEY_PIN)
    }

    pub fn clear_pin(&self) -> AppResult<()> {
        self.storage.remove(KEY_PIN).require(KEY_PIN)
    }

    pub fn load_theme(&self) -> Theme {
        match self.storage.get(KEY_THEME) {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                debug!("Unknown stored theme '{}', using default", raw);
                Theme::default()
            }),
            None => Theme::default(),
        }
    }

    pub fn save_theme(&self, theme: Theme) -> AppResult<()> {
        self.storage.set(KEY_THEME, theme.as_str()).require(KEY_THEME)
    }
}

/// Splits stored elements into readable entries and the raw elements that
/// are not entries at all (no usable id, or not an object).
fn split_entries(items: Vec<Value>) -> (Vec<Entry>, Vec<Value>) {
    let mut entries = Vec::with_capacity(items.len());
    let mut unreadable = Vec::new();
    for item in items {
        match Entry::deserialize(&item) {
            Ok(entry) => entries.push(entry),
            Err(e) => {
                debug!("Unreadable stored entry: {}", e);
                unreadable.push(item);
            }
        }
    }
    (entries, unreadable)
}

fn is_valid_pin(pin: &str) -> bool {
    pin.len() == PIN_LENGTH && pin.bytes().all(|b| b.is_ascii_digit())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
