//! Destructive operations that need the user's confirmation.

use super::confirm::{Confirm, Prompt};
use crate::constants::PREVIEW_CHARS;
use crate::errors::{AppError, AppResult};
use crate::journal::EntryStore;
use crate::moods::MoodRegistry;
use crate::session::Session;
use crate::storage::Repository;
use tracing::{debug, info};

/// What a confirmed removal did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    Removed,
    /// The user cancelled or dismissed the prompt.
    Declined,
    /// There was nothing to remove.
    Missing,
}

/// Deletes one entry after confirmation.
///
/// A missing id is not an error and nothing is asked.
pub fn delete_entry(
    store: &EntryStore<'_>,
    id: &str,
    confirm: &mut dyn Confirm,
) -> AppResult<Removal> {
    let entry = match store.get(id) {
        Ok(entry) => entry,
        Err(AppError::NotFound(_)) => {
            debug!("Entry {} already gone", id.trim());
            return Ok(Removal::Missing);
        }
        Err(e) => return Err(e),
    };

    let prompt = Prompt::new(
        "Delete entry?",
        format!(
            "\"{}\"\nThis memory will be forgotten and cannot be recovered.",
            entry.preview(PREVIEW_CHARS)
        ),
    )
    .labels("Delete", "Cancel")
    .dangerous();
    if !confirm.ask(&prompt)?.is_confirmed() {
        return Ok(Removal::Declined);
    }

    if store.delete(id)? {
        Ok(Removal::Removed)
    } else {
        Ok(Removal::Missing)
    }
}

/// Deletes every entry after two separate confirmations.
pub fn clear_entries(store: &EntryStore<'_>, confirm: &mut dyn Confirm) -> AppResult<Removal> {
    let count = store.list().len();
    if count == 0 {
        return Ok(Removal::Missing);
    }

    let first = Prompt::new(
        "Clear all data?",
        format!("Delete all {} entries? This cannot be undone!", count),
    )
    .labels("Continue", "Cancel")
    .dangerous();
    if !confirm.ask(&first)?.is_confirmed() {
        return Ok(Removal::Declined);
    }

    let second = Prompt::new("Confirm again", "Really delete everything?")
        .labels("Clear", "Cancel")
        .dangerous();
    if !confirm.ask(&second)?.is_confirmed() {
        return Ok(Removal::Declined);
    }

    store.clear()?;
    info!("Cleared {} entries after double confirmation", count);
    Ok(Removal::Removed)
}

/// Deletes a custom mood after confirmation and drops it from the session's
/// selection. Entries that reference the key keep it.
///
/// # Errors
///
/// - `AppError::Validation` for a built-in mood
/// - `AppError::NotFound` for an unknown key
pub fn remove_mood(
    registry: &mut MoodRegistry,
    repo: &Repository,
    session: &mut Session,
    key: &str,
    confirm: &mut dyn Confirm,
) -> AppResult<Removal> {
    let key = key.trim();
    if MoodRegistry::is_builtin(key) {
        return Err(AppError::Validation(format!(
            "'{}' is a built-in mood and cannot be removed",
            key
        )));
    }
    if !registry.contains(key) {
        return Err(AppError::NotFound(format!("mood '{}'", key)));
    }

    let style = registry.resolve(key);
    let prompt = Prompt::new(
        "Delete mood?",
        format!("Delete the mood {} {}?", style.emoji, style.label),
    )
    .labels("Delete", "Cancel")
    .dangerous();
    if !confirm.ask(&prompt)?.is_confirmed() {
        return Ok(Removal::Declined);
    }

    if !registry.remove_custom(repo, key)? {
        return Ok(Removal::Missing);
    }
    session.forget_mood(key);
    Ok(Removal::Removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::Gate;
    use crate::ops::confirm::{Choice, PresetConfirm};
    use crate::storage::{MemoryStore, SafeStorage};
    use chrono::Local;

    fn repo_with_entries() -> Repository {
        let repo = Repository::new(SafeStorage::new(MemoryStore::new()));
        EntryStore::new(&repo)
            .replace_all(r#"[{"id": 2, "text": "two"}, {"id": 1, "text": "one"}]"#)
            .unwrap();
        repo
    }

    #[test]
    fn test_delete_asks_then_removes() {
        let repo = repo_with_entries();
        let store = EntryStore::new(&repo);

        let mut no = PresetConfirm::always(Choice::Dismissed);
        assert_eq!(delete_entry(&store, "2", &mut no).unwrap(), Removal::Declined);
        assert_eq!(store.list().len(), 2);

        let mut yes = PresetConfirm::always(Choice::Confirmed);
        assert_eq!(delete_entry(&store, "2", &mut yes).unwrap(), Removal::Removed);
        assert_eq!(store.list().len(), 1);

        assert_eq!(delete_entry(&store, "2", &mut yes).unwrap(), Removal::Missing);
        assert_eq!(yes.asked().len(), 1);
    }

    #[test]
    fn test_clear_needs_both_confirmations() {
        let repo = repo_with_entries();
        let store = EntryStore::new(&repo);

        let mut half = PresetConfirm::sequence([Choice::Confirmed, Choice::Cancelled]);
        assert_eq!(clear_entries(&store, &mut half).unwrap(), Removal::Declined);
        assert_eq!(store.list().len(), 2);

        let mut both = PresetConfirm::sequence([Choice::Confirmed, Choice::Confirmed]);
        assert_eq!(clear_entries(&store, &mut both).unwrap(), Removal::Removed);
        assert!(store.list().is_empty());

        assert_eq!(clear_entries(&store, &mut both).unwrap(), Removal::Missing);
    }

    #[test]
    fn test_remove_mood_rules() {
        let repo = Repository::new(SafeStorage::new(MemoryStore::new()));
        let mut registry = MoodRegistry::load(&repo);
        let mut session = Session::new(Gate::at_launch(None));
        let mood = registry
            .add_custom(&repo, "Tired", "😴", None, Local::now())
            .unwrap();
        session.toggle_mood(&mood.key);

        let mut yes = PresetConfirm::always(Choice::Confirmed);
        assert!(matches!(
            remove_mood(&mut registry, &repo, &mut session, "happy", &mut yes),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            remove_mood(&mut registry, &repo, &mut session, "custom_0", &mut yes),
            Err(AppError::NotFound(_))
        ));

        let mut no = PresetConfirm::always(Choice::Cancelled);
        assert_eq!(
            remove_mood(&mut registry, &repo, &mut session, &mood.key, &mut no).unwrap(),
            Removal::Declined
        );
        assert!(registry.contains(&mood.key));

        assert_eq!(
            remove_mood(&mut registry, &repo, &mut session, &mood.key, &mut yes).unwrap(),
            Removal::Removed
        );
        assert!(!registry.contains(&mood.key));
        assert!(repo.load_custom_moods().is_empty());
        assert_eq!(session.selected_mood(), None);
    }
}
