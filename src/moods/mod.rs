//! Built-in and user-defined moods.
//!
//! Entries refer to moods by key. The registry maps a key to its label, emoji
//! and color; keys it does not know (for example a custom mood deleted after
//! it was used) still resolve, to a neutral fallback style.

use crate::constants::{
    CUSTOM_MOOD_KEY_PREFIX, DEFAULT_CUSTOM_MOOD_COLOR, DEFAULT_MOOD_EMOJI, FALLBACK_MOOD_COLOR,
};
use crate::errors::{AppError, AppResult};
use crate::storage::{Notice, Repository};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// A mood as persisted in the custom mood list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoodDefinition {
    pub key: String,
    pub label: String,
    #[serde(default = "default_emoji")]
    pub emoji: String,
    #[serde(default = "default_color")]
    pub color: String,
}

fn default_emoji() -> String {
    DEFAULT_MOOD_EMOJI.to_string()
}

fn default_color() -> String {
    DEFAULT_CUSTOM_MOOD_COLOR.to_string()
}

/// How a mood key is displayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoodStyle {
    pub label: String,
    pub emoji: String,
    pub color: String,
}

/// A row of [`MoodRegistry::list`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoodListing {
    pub mood: MoodDefinition,
    pub custom: bool,
}

struct BuiltinMood {
    key: &'static str,
    label: &'static str,
    emoji: &'static str,
    color: &'static str,
}

const BUILTIN_MOODS: [BuiltinMood; 7] = [
    BuiltinMood { key: "happy", label: "Happy", emoji: "😊", color: "#FFD166" },
    BuiltinMood { key: "calm", label: "Calm", emoji: "😌", color: "#06D6A0" },
    BuiltinMood { key: "sad", label: "Sad", emoji: "😢", color: "#118AB2" },
    BuiltinMood { key: "anxious", label: "Anxious", emoji: "😰", color: "#118AB2" },
    BuiltinMood { key: "excited", label: "Excited", emoji: "🤩", color: "#FFD166" },
    BuiltinMood { key: "confused", label: "Confused", emoji: "😵", color: "#EF476F" },
    BuiltinMood { key: "scared", label: "Scared", emoji: "😱", color: "#9B89B3" },
];

impl BuiltinMood {
    fn definition(&self) -> MoodDefinition {
        MoodDefinition {
            key: self.key.to_string(),
            label: self.label.to_string(),
            emoji: self.emoji.to_string(),
            color: self.color.to_string(),
        }
    }
}

/// Normalizes a hex color to lower-case `#rrggbb`.
///
/// Surrounding whitespace and a missing `#` are tolerated; the three-digit
/// short form is expanded. Anything else is rejected.
///
/// # Examples
///
/// ```
/// use dreamlog::moods::normalize_hex;
///
/// assert_eq!(normalize_hex("f0a").as_deref(), Some("#ff00aa"));
/// assert_eq!(normalize_hex(" #A18CD1 ").as_deref(), Some("#a18cd1"));
/// assert_eq!(normalize_hex("zzz"), None);
/// assert_eq!(normalize_hex("#abcd"), None);
/// ```
pub fn normalize_hex(input: &str) -> Option<String> {
    let trimmed = input.trim();
    let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    let digits = digits.to_ascii_lowercase();
    match digits.len() {
        3 => {
            let expanded: String = digits.chars().flat_map(|c| [c, c]).collect();
            Some(format!("#{}", expanded))
        }
        6 => Some(format!("#{}", digits)),
        _ => None,
    }
}

/// Built-in moods plus the custom moods loaded from the repository.
#[derive(Debug, Clone, Default)]
pub struct MoodRegistry {
    custom: Vec<MoodDefinition>,
}

impl MoodRegistry {
    /// A registry with only the built-in moods.
    pub fn builtins() -> Self {
        MoodRegistry::default()
    }

    /// Loads the custom moods on top of the built-ins.
    pub fn load(repo: &Repository) -> Self {
        let custom = repo.load_custom_moods();
        debug!("Loaded {} custom moods", custom.len());
        MoodRegistry { custom }
    }

    pub fn is_builtin(key: &str) -> bool {
        BUILTIN_MOODS.iter().any(|m| m.key == key)
    }

    pub fn contains(&self, key: &str) -> bool {
        Self::is_builtin(key) || self.custom.iter().any(|m| m.key == key)
    }

    /// Display style for `key`, never failing.
    ///
    /// Unknown keys get the default emoji, the fallback color and the raw key
    /// as label.
    pub fn resolve(&self, key: &str) -> MoodStyle {
        if let Some(builtin) = BUILTIN_MOODS.iter().find(|m| m.key == key) {
            return MoodStyle {
                label: builtin.label.to_string(),
                emoji: builtin.emoji.to_string(),
                color: builtin.color.to_string(),
            };
        }
        match self.custom.iter().find(|m| m.key == key) {
            Some(mood) => MoodStyle {
                label: mood.label.clone(),
                emoji: mood.emoji.clone(),
                color: mood.color.clone(),
            },
            None => MoodStyle {
                label: key.to_string(),
                emoji: DEFAULT_MOOD_EMOJI.to_string(),
                color: FALLBACK_MOOD_COLOR.to_string(),
            },
        }
    }

    /// Finds a mood by key, or failing that by label (case-insensitive).
    pub fn lookup(&self, key_or_label: &str) -> Option<MoodDefinition> {
        let wanted = key_or_label.trim();
        let all = self.list();
        all.iter()
            .find(|m| m.mood.key == wanted)
            .or_else(|| {
                all.iter()
                    .find(|m| m.mood.label.to_lowercase() == wanted.to_lowercase())
            })
            .map(|m| m.mood.clone())
    }

    /// Every mood, built-ins first in their fixed order, then customs in
    /// stored order.
    pub fn list(&self) -> Vec<MoodListing> {
        BUILTIN_MOODS
            .iter()
            .map(|m| MoodListing {
                mood: m.definition(),
                custom: false,
            })
            .chain(self.custom.iter().map(|m| MoodListing {
                mood: m.clone(),
                custom: true,
            }))
            .collect()
    }

    /// Creates and persists a custom mood.
    ///
    /// A blank emoji becomes the default one. A missing or invalid color is
    /// replaced by the default custom color; an invalid one also leaves a
    /// warning notice.
    ///
    /// # Errors
    ///
    /// - `AppError::Validation` if the label is blank
    /// - `AppError::Duplicate` if a custom mood already has this label
    /// - `AppError::Storage` if the list could not be saved
    pub fn add_custom(
        &mut self,
        repo: &Repository,
        label: &str,
        emoji: &str,
        color: Option<&str>,
        now: DateTime<Local>,
    ) -> AppResult<MoodDefinition> {
        let label = label.trim();
        if label.is_empty() {
            return Err(AppError::Validation("Mood label cannot be empty".to_string()));
        }

        let mut stored = repo.load_custom_moods();
        if stored.iter().any(|m| m.label == label) {
            return Err(AppError::Duplicate(format!("mood '{}'", label)));
        }

        let color = match color.map(str::trim).filter(|c| !c.is_empty()) {
            Some(raw) => normalize_hex(raw).unwrap_or_else(|| {
                warn!("Invalid mood color '{}', using default", raw);
                repo.storage().notify(Notice::warning(format!(
                    "'{}' is not a hex color; using {}",
                    raw, DEFAULT_CUSTOM_MOOD_COLOR
                )));
                DEFAULT_CUSTOM_MOOD_COLOR.to_string()
            }),
            None => DEFAULT_CUSTOM_MOOD_COLOR.to_string(),
        };

        let emoji = match emoji.trim() {
            "" => DEFAULT_MOOD_EMOJI.to_string(),
            e => e.to_string(),
        };

        let mut millis = now.timestamp_millis();
        let mut key = format!("{}{}", CUSTOM_MOOD_KEY_PREFIX, millis);
        while stored.iter().any(|m| m.key == key) {
            millis += 1;
            key = format!("{}{}", CUSTOM_MOOD_KEY_PREFIX, millis);
        }

        let mood = MoodDefinition {
            key,
            label: label.to_string(),
            emoji,
            color,
        };
        stored.push(mood.clone());
        repo.save_custom_moods(&stored)?;

        info!("Added custom mood {}", mood.key);
        self.custom = stored;
        Ok(mood)
    }

    /// Deletes a custom mood. Built-in and unknown keys are left alone and
    /// return `false`.
    pub fn remove_custom(&mut self, repo: &Repository, key: &str) -> AppResult<bool> {
        if Self::is_builtin(key) {
            debug!("Refusing to remove built-in mood {}", key);
            return Ok(false);
        }

        let mut stored = repo.load_custom_moods();
        let before = stored.len();
        stored.retain(|m| m.key != key);
        if stored.len() == before {
            return Ok(false);
        }

        repo.save_custom_moods(&stored)?;
        info!("Removed custom mood {}", key);
        self.custom = stored;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{KEY_CUSTOM_MOODS, LEGACY_MOOD_COLOR};
    use crate::storage::{MemoryStore, SafeStorage};
    use chrono::TimeZone;

    fn now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_normalize_hex() {
        assert_eq!(normalize_hex("f0a").as_deref(), Some("#ff00aa"));
        assert_eq!(normalize_hex("#FFD166").as_deref(), Some("#ffd166"));
        assert_eq!(normalize_hex("  abc  ").as_deref(), Some("#aabbcc"));
        assert_eq!(normalize_hex("zzz"), None);
        assert_eq!(normalize_hex(""), None);
        assert_eq!(normalize_hex("#"), None);
        assert_eq!(normalize_hex("##abc"), None);
        assert_eq!(normalize_hex("12345"), None);
    }

    #[test]
    fn test_resolve_builtin_custom_and_unknown() {
        let registry = MoodRegistry {
            custom: vec![MoodDefinition {
                key: "custom_1".to_string(),
                label: "Proud".to_string(),
                emoji: "🦁".to_string(),
                color: "#ffb7b2".to_string(),
            }],
        };

        let happy = registry.resolve("happy");
        assert_eq!(happy.emoji, "😊");
        assert_eq!(happy.color, "#FFD166");

        assert_eq!(registry.resolve("custom_1").label, "Proud");

        let unknown = registry.resolve("custom_999");
        assert_eq!(unknown.label, "custom_999");
        assert_eq!(unknown.emoji, DEFAULT_MOOD_EMOJI);
        assert_eq!(unknown.color, FALLBACK_MOOD_COLOR);
    }

    #[test]
    fn test_add_custom_persists_and_updates_registry() {
        let repo = Repository::new(SafeStorage::new(MemoryStore::new()));
        let mut registry = MoodRegistry::load(&repo);

        let mood = registry
            .add_custom(&repo, " Nostalgic ", "", Some("9b9ece"), now())
            .unwrap();

        assert_eq!(mood.key, format!("custom_{}", now().timestamp_millis()));
        assert_eq!(mood.label, "Nostalgic");
        assert_eq!(mood.emoji, DEFAULT_MOOD_EMOJI);
        assert_eq!(mood.color, "#9b9ece");
        assert!(registry.contains(&mood.key));
        assert_eq!(MoodRegistry::load(&repo).resolve(&mood.key).label, "Nostalgic");
    }

    #[test]
    fn test_add_custom_rejects_blank_and_duplicate_labels() {
        let repo = Repository::new(SafeStorage::new(MemoryStore::new()));
        let mut registry = MoodRegistry::load(&repo);

        assert!(matches!(
            registry.add_custom(&repo, "  ", "🙂", None, now()),
            Err(AppError::Validation(_))
        ));

        registry.add_custom(&repo, "Tired", "😴", None, now()).unwrap();
        assert!(matches!(
            registry.add_custom(&repo, "Tired", "🥱", None, now()),
            Err(AppError::Duplicate(_))
        ));
        assert_eq!(repo.load_custom_moods().len(), 1);
    }

    #[test]
    fn test_invalid_color_falls_back_with_notice() {
        let repo = Repository::new(SafeStorage::new(MemoryStore::new()));
        let mut registry = MoodRegistry::load(&repo);

        let mood = registry
            .add_custom(&repo, "Odd", "🌀", Some("zzz"), now())
            .unwrap();
        assert_eq!(mood.color, DEFAULT_CUSTOM_MOOD_COLOR);
        assert_eq!(repo.take_notices().len(), 1);

        let mood = registry.add_custom(&repo, "Plain", "🌀", None, now()).unwrap();
        assert_eq!(mood.color, DEFAULT_CUSTOM_MOOD_COLOR);
        assert_ne!(mood.key, format!("custom_{}", now().timestamp_millis()));
        assert!(repo.take_notices().is_empty());
    }

    #[test]
    fn test_remove_custom_handles_legacy_and_builtins() {
        let store = MemoryStore::new();
        store.insert(KEY_CUSTOM_MOODS, r#"["Tired", "Bored"]"#);
        let repo = Repository::new(SafeStorage::new(store));
        let mut registry = MoodRegistry::load(&repo);

        assert_eq!(registry.resolve("Tired").color, LEGACY_MOOD_COLOR);
        assert!(!registry.remove_custom(&repo, "happy").unwrap());
        assert!(registry.remove_custom(&repo, "Tired").unwrap());
        assert!(!registry.remove_custom(&repo, "Tired").unwrap());

        let remaining = repo.load_custom_moods();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].key, "Bored");
        assert!(!registry.contains("Tired"));
        assert!(registry.contains("happy"));
    }

    #[test]
    fn test_list_orders_builtins_first() {
        let repo = Repository::new(SafeStorage::new(MemoryStore::new()));
        let mut registry = MoodRegistry::load(&repo);
        registry.add_custom(&repo, "Proud", "🦁", None, now()).unwrap();

        let listing = registry.list();
        assert_eq!(listing.len(), 8);
        assert_eq!(listing[0].mood.key, "happy");
        assert!(!listing[6].custom);
        assert!(listing[7].custom);
        assert_eq!(listing[7].mood.label, "Proud");
    }

    #[test]
    fn test_lookup_by_key_or_label() {
        let repo = Repository::new(SafeStorage::new(MemoryStore::new()));
        let mut registry = MoodRegistry::load(&repo);
        let proud = registry.add_custom(&repo, "Proud", "🦁", None, now()).unwrap();

        assert_eq!(registry.lookup("calm").unwrap().label, "Calm");
        assert_eq!(registry.lookup("ANXIOUS").unwrap().key, "anxious");
        assert_eq!(registry.lookup("proud").unwrap().key, proud.key);
        assert_eq!(registry.lookup(&proud.key).unwrap().label, "Proud");
        assert!(registry.lookup("bored").is_none());
    }
}
