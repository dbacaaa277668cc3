//! Per-session view state: the active filter, the search keyword, the mood
//! picked for the next entry and the PIN gate.
//!
//! Each CLI invocation builds one `Session`; the query engine reads the
//! filter and keyword from it, and nothing reaches the entry list until the
//! gate is unlocked.

use crate::errors::{AppError, AppResult};
use crate::gate::Gate;
use crate::journal::{Entry, EntryType};
use crate::query::{self, Filter, QueryOutcome};

#[derive(Debug)]
pub struct Session {
    filter: Filter,
    search: String,
    selected_mood: Option<String>,
    gate: Gate,
}

impl Session {
    pub fn new(gate: Gate) -> Self {
        Session {
            filter: Filter::None,
            search: String::new(),
            selected_mood: None,
            gate,
        }
    }

    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    /// Shows only entries of `kind`, replacing any tag filter.
    pub fn apply_type_filter(&mut self, kind: EntryType) {
        self.filter = Filter::Type(kind);
    }

    /// Shows only entries tagged `tag`, replacing any type filter.
    pub fn apply_tag_filter(&mut self, tag: &str) {
        self.filter = Filter::Tag(tag.trim().to_string());
    }

    /// Removes the filter and the search keyword.
    pub fn clear_filter(&mut self) {
        self.filter = Filter::None;
        self.search.clear();
    }

    /// Stores the keyword trimmed and lower-cased.
    pub fn set_search(&mut self, keyword: &str) {
        self.search = keyword.trim().to_lowercase();
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    /// Selects `key`, or clears the selection if it was already selected.
    pub fn toggle_mood(&mut self, key: &str) -> Option<&str> {
        if self.selected_mood.as_deref() == Some(key) {
            self.selected_mood = None;
        } else {
            self.selected_mood = Some(key.to_string());
        }
        self.selected_mood.as_deref()
    }

    pub fn selected_mood(&self) -> Option<&str> {
        self.selected_mood.as_deref()
    }

    /// Drops the selection if it points at a mood that was just removed.
    pub fn forget_mood(&mut self, key: &str) {
        if self.selected_mood.as_deref() == Some(key) {
            self.selected_mood = None;
        }
    }

    pub fn gate(&self) -> &Gate {
        &self.gate
    }

    pub fn gate_mut(&mut self) -> &mut Gate {
        &mut self.gate
    }

    /// Fails unless the gate is unlocked.
    pub fn ensure_unlocked(&self) -> AppResult<()> {
        if self.gate.is_unlocked() {
            Ok(())
        } else {
            Err(AppError::Gate("Journal is locked".to_string()))
        }
    }

    /// The current view of `entries`.
    pub fn view(&self, entries: &[Entry]) -> AppResult<QueryOutcome> {
        self.ensure_unlocked()?;
        Ok(query::view(entries, &self.filter, &self.search))
    }
}
