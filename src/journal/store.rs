//! The canonical entry list and every mutation applied to it.
//!
//! The list is read from the repository on each call and written back in full
//! after each successful mutation. Validation always happens before the write,
//! so a rejected operation never changes what is stored.

use super::dates::format_display_date;
use super::entry::{Entry, EntryId, EntryType, Tags};
use crate::errors::{AppError, AppResult};
use crate::storage::Repository;
use chrono::{DateTime, Local};
use serde_json::{Map, Value};
use std::cmp::Reverse;
use std::collections::HashSet;
use tracing::{debug, info};

/// Fields supplied by the user when writing a new entry.
#[derive(Debug, Clone, Default)]
pub struct EntryDraft {
    pub text: String,
    pub kind: EntryType,
    pub mood: String,
    pub tags: Tags,
}

impl EntryDraft {
    pub fn new(text: impl Into<String>) -> Self {
        EntryDraft {
            text: text.into(),
            kind: EntryType::Dream,
            ..EntryDraft::default()
        }
    }

    pub fn kind(mut self, kind: EntryType) -> Self {
        self.kind = kind;
        self
    }

    pub fn mood(mut self, mood: impl Into<String>) -> Self {
        self.mood = mood.into();
        self
    }

    pub fn tags(mut self, tags: Tags) -> Self {
        self.tags = tags;
        self
    }
}

/// Changes applied by [`EntryStore::update`]. `None` leaves a field alone.
#[derive(Debug, Clone, Default)]
pub struct EntryPatch {
    pub text: Option<String>,
    pub kind: Option<EntryType>,
    pub mood: Option<String>,
    pub tags: Option<Tags>,
    pub date: Option<String>,
    pub timestamp: Option<i64>,
}

impl EntryPatch {
    /// Moves the entry to `when`: sets both the sort timestamp and the display date.
    pub fn retime(mut self, when: &DateTime<Local>) -> Self {
        self.timestamp = Some(when.timestamp_millis());
        self.date = Some(format_display_date(when));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_none()
            && self.kind.is_none()
            && self.mood.is_none()
            && self.tags.is_none()
            && self.date.is_none()
            && self.timestamp.is_none()
    }
}

/// Outcome of [`EntryStore::merge_from`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MergeReport {
    /// Entries whose id was new and were added.
    pub added: usize,
    /// Entries dropped because their id already existed.
    pub skipped: usize,
}

fn validated_text(text: &str) -> AppResult<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(
            "Entry text cannot be empty".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

/// Parses an import document into entries.
///
/// The document must be a JSON array whose elements are all objects carrying
/// a numeric `id` (number or numeric string) and a non-empty string `text`.
/// Nothing is returned unless every element passes.
///
/// # Errors
///
/// - `AppError::Parse` when the input is not JSON at all
/// - `AppError::Validation` when the shape is wrong, naming the first bad element
///
/// # Examples
///
/// ```
/// use dreamlog::journal::parse_entries;
///
/// let entries = parse_entries(r#"[{"id": "1700000000000", "text": "sea"}]"#).unwrap();
/// assert_eq!(entries[0].id.as_millis(), 1_700_000_000_000);
///
/// assert!(parse_entries(r#"{"a": 1}"#).is_err());
/// assert!(parse_entries(r#"[{"id": 1}]"#).is_err());
/// ```
pub fn parse_entries(raw: &str) -> AppResult<Vec<Entry>> {
    let document: Value = serde_json::from_str(raw)?;
    let Value::Array(items) = document else {
        return Err(AppError::Validation(
            "Import file must contain a JSON array of entries".to_string(),
        ));
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            let object = item.as_object().ok_or_else(|| {
                AppError::Validation(format!("Element {} is not an object", index))
            })?;
            check_required_fields(index, object)?;
            serde_json::from_value::<Entry>(item).map_err(|e| {
                AppError::Validation(format!("Element {} is not a valid entry: {}", index, e))
            })
        })
        .collect()
}

fn check_required_fields(index: usize, object: &Map<String, Value>) -> AppResult<()> {
    let id_ok = match object.get("id") {
        Some(Value::Number(_)) => true,
        Some(Value::String(s)) => s.trim().parse::<i64>().is_ok(),
        _ => false,
    };
    if !id_ok {
        return Err(AppError::Validation(format!(
            "Element {} is missing a numeric id",
            index
        )));
    }

    match object.get("text") {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(()),
        _ => Err(AppError::Validation(format!(
            "Element {} is missing its text",
            index
        ))),
    }
}

/// Operations on the persisted entry list.
pub struct EntryStore<'a> {
    repo: &'a Repository,
}

impl<'a> EntryStore<'a> {
    pub fn new(repo: &'a Repository) -> Self {
        EntryStore { repo }
    }

    /// The persisted list in stored order; empty when absent or corrupt.
    pub fn list(&self) -> Vec<Entry> {
        self.repo.load_entries()
    }

    /// Looks up one entry by id.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if no entry has that id.
    pub fn get(&self, id: &str) -> AppResult<Entry> {
        self.list()
            .into_iter()
            .find(|e| e.id.matches(id))
            .ok_or_else(|| AppError::NotFound(format!("entry {}", id.trim())))
    }

    /// Creates an entry stamped with `now` and stores it first in the list.
    ///
    /// The id is `now` in milliseconds, moved past the largest existing id if
    /// another entry already uses it.
    ///
    /// # Errors
    ///
    /// - `AppError::Validation` if the text is blank
    /// - `AppError::Storage` if the list could not be saved; nothing is changed
    pub fn create(&self, draft: EntryDraft, now: DateTime<Local>) -> AppResult<Entry> {
        let text = validated_text(&draft.text)?;
        let mut entries = self.list();

        let mut id = now.timestamp_millis();
        if entries.iter().any(|e| e.id.as_millis() == id) {
            let max = entries.iter().map(|e| e.id.as_millis()).max().unwrap_or(id);
            id = max + 1;
            debug!("Id collision at {}, using {}", now.timestamp_millis(), id);
        }

        let entry = Entry {
            id: EntryId::new(id),
            text,
            kind: draft.kind,
            mood: draft.mood.trim().to_string(),
            tags: draft.tags,
            date: format_display_date(&now),
            timestamp: None,
            extra: Map::new(),
        };

        entries.insert(0, entry.clone());
        self.repo.save_entries(&entries)?;
        info!("Created entry {}", entry.id);
        Ok(entry)
    }

    /// Applies `patch` to the entry with `id`.
    ///
    /// # Errors
    ///
    /// - `AppError::NotFound` if the entry no longer exists
    /// - `AppError::Validation` if the patch blanks the text
    /// - `AppError::Storage` if the list could not be saved
    pub fn update(&self, id: &str, patch: EntryPatch) -> AppResult<Entry> {
        let mut entries = self.list();
        let entry = entries
            .iter_mut()
            .find(|e| e.id.matches(id))
            .ok_or_else(|| AppError::NotFound(format!("entry {}", id.trim())))?;

        if let Some(text) = &patch.text {
            entry.text = validated_text(text)?;
        }
        if let Some(kind) = patch.kind {
            entry.kind = kind;
        }
        if let Some(mood) = patch.mood {
            entry.mood = mood.trim().to_string();
        }
        if let Some(tags) = patch.tags {
            entry.tags = tags;
        }
        if let Some(date) = patch.date {
            entry.date = date;
        }
        if let Some(timestamp) = patch.timestamp {
            entry.timestamp = Some(timestamp);
        }

        let updated = entry.clone();
        self.repo.save_entries(&entries)?;
        info!("Updated entry {}", updated.id);
        Ok(updated)
    }

    /// Removes the entry with `id`. Returns whether anything was removed;
    /// deleting a missing id succeeds without writing.
    pub fn delete(&self, id: &str) -> AppResult<bool> {
        let mut entries = self.list();
        let before = entries.len();
        entries.retain(|e| !e.id.matches(id));

        if entries.len() == before {
            debug!("Delete of missing entry {} ignored", id.trim());
            return Ok(false);
        }

        self.repo.save_entries(&entries)?;
        info!("Deleted entry {}", id.trim());
        Ok(true)
    }

    /// Replaces the whole list with the entries in an import document.
    ///
    /// Returns the number of entries now stored.
    ///
    /// # Errors
    ///
    /// See [`parse_entries`]; on any error the stored list is untouched.
    pub fn replace_all(&self, raw: &str) -> AppResult<usize> {
        let entries = parse_entries(raw)?;
        self.repo.replace_entries(&entries)?;
        info!("Replaced entry list with {} entries", entries.len());
        Ok(entries.len())
    }

    /// Adds the entries whose id is not already stored.
    ///
    /// The result is the new entries followed by the existing ones, sorted by
    /// id, newest first. Colliding ids are dropped without comparing fields.
    /// When nothing is new the stored list is not rewritten.
    pub fn merge_from(&self, incoming: Vec<Entry>) -> AppResult<MergeReport> {
        let existing = self.list();
        let mut seen: HashSet<EntryId> = existing.iter().map(|e| e.id).collect();

        let mut report = MergeReport::default();
        let mut merged = Vec::with_capacity(incoming.len() + existing.len());
        for entry in incoming {
            if seen.insert(entry.id) {
                merged.push(entry);
                report.added += 1;
            } else {
                report.skipped += 1;
            }
        }

        if report.added == 0 {
            debug!("Merge found nothing new ({} skipped)", report.skipped);
            return Ok(report);
        }

        merged.extend(existing);
        merged.sort_by_key(|e| Reverse(e.id));
        self.repo.save_entries(&merged)?;
        info!(
            "Merged {} entries, skipped {} existing",
            report.added, report.skipped
        );
        Ok(report)
    }

    /// Deletes every entry.
    pub fn clear(&self) -> AppResult<()> {
        self.repo.clear_entries()?;
        info!("Cleared all entries");
        Ok(())
    }
}
