use dreamlog::config::Config;
use dreamlog::journal::{EntryDraft, EntryStore};
use dreamlog::storage::{
    FileStore, KeyValueStore, NoticeLevel, Repository, SafeStorage, SqliteBridge, WriteOutcome,
};
use chrono::Local;
use std::fs;
use tempfile::tempdir;

fn config_for(dir: &std::path::Path, bridge: Option<std::path::PathBuf>) -> Config {
    Config {
        data_dir: dir.to_path_buf(),
        bridge_db: bridge,
        ..Config::default()
    }
}

#[test]
fn test_bridge_is_primary_when_configured() {
    let dir = tempdir().unwrap();
    let config = config_for(&dir.path().join("data"), Some(dir.path().join("bridge.db")));

    let storage = SafeStorage::open(&config);
    assert!(storage.has_bridge());
    assert_eq!(storage.set("theme", "light"), WriteOutcome::Primary);
    assert_eq!(storage.get("theme").as_deref(), Some("light"));

    // Nothing reached the file store.
    assert!(!dir.path().join("data").join("theme.json").exists());

    // A new adapter over the same database sees the value.
    let reopened = SafeStorage::open(&config);
    assert_eq!(reopened.get("theme").as_deref(), Some("light"));
    assert!(reopened.take_notices().is_empty());
}

#[test]
fn test_unusable_bridge_falls_back_to_files_with_notice() {
    let dir = tempdir().unwrap();
    let config = config_for(
        dir.path(),
        Some(dir.path().join("missing").join("bridge.db")),
    );

    let storage = SafeStorage::open(&config);
    assert!(!storage.has_bridge());
    let notices = storage.take_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Warning);

    assert_eq!(storage.set("theme", "dark"), WriteOutcome::Fallback);
    assert_eq!(
        fs::read_to_string(dir.path().join("theme.json")).unwrap(),
        "dark"
    );
}

#[test]
fn test_unwritable_data_dir_reports_failure() {
    let dir = tempdir().unwrap();
    let blocker = dir.path().join("not-a-dir");
    fs::write(&blocker, "file in the way").unwrap();

    let repo = Repository::new(SafeStorage::new(FileStore::new(&blocker)));
    let store = EntryStore::new(&repo);
    let result = store.create(EntryDraft::new("lost"), Local::now());

    assert!(result.is_err());
    let notices = repo.take_notices();
    assert!(notices.iter().any(|n| n.level == NoticeLevel::Error));
}

#[test]
fn test_file_store_rejects_path_like_keys() {
    let dir = tempdir().unwrap();
    let store = FileStore::new(dir.path());
    assert!(store.set("../escape", "x").is_err());
    assert!(store.set("dream-entries", "[]").is_ok());
    assert_eq!(store.get("dream-entries").unwrap().as_deref(), Some("[]"));
    store.remove("dream-entries").unwrap();
    store.remove("dream-entries").unwrap();
    assert_eq!(store.get("dream-entries").unwrap(), None);
}

#[test]
fn test_in_memory_bridge_with_file_fallback() {
    let dir = tempdir().unwrap();
    let storage = SafeStorage::new(FileStore::new(dir.path()))
        .with_bridge(SqliteBridge::open_in_memory().unwrap());
    let repo = Repository::new(storage);

    repo.save_pin("1357").unwrap();
    assert_eq!(repo.load_pin().as_deref(), Some("1357"));
    repo.clear_pin().unwrap();
    assert_eq!(repo.load_pin(), None);
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}
