//! String-keyed persistence with a primary bridge and a built-in fallback.
//!
//! Every value the application keeps is a string (JSON for structured data)
//! stored under one of a handful of fixed keys. `SafeStorage` tries an
//! optional injected bridge first and falls back to the built-in store when
//! the bridge is absent, fails, or answers asynchronously. No failure ever
//! reaches the caller as a panic or an error: each one is logged and recorded
//! as a [`Notice`] that the front end shows to the user.
//!
//! # Module Structure
//!
//! - `file`: directory-backed store, one file per key (the built-in fallback)
//! - `sqlite`: SQLite key/value table used as the primary bridge
//! - `memory`: in-process store for tests and ephemeral sessions
//! - `schema`: typed per-key repository on top of `SafeStorage`
//!
//! # Example
//!
//! ```
//! use dreamlog::storage::{MemoryStore, SafeStorage, WriteOutcome};
//!
//! let storage = SafeStorage::new(MemoryStore::new());
//! assert_eq!(storage.set("theme", "dark"), WriteOutcome::Fallback);
//! assert_eq!(storage.get("theme").as_deref(), Some("dark"));
//! ```

pub mod file;
pub mod memory;
pub mod schema;
pub mod sqlite;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use schema::{Repository, Theme};
pub use sqlite::SqliteBridge;

use crate::config::Config;
use crate::errors::{AppResult, StorageError};
use std::cell::RefCell;
use std::fmt;
use std::task::Poll;
use tracing::{debug, warn};

/// A synchronous key/value store.
pub trait KeyValueStore {
    /// Short name used in logs and notices.
    fn name(&self) -> &str;

    /// Reads a value, `Ok(None)` when the key is absent.
    fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// Writes a value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> AppResult<()>;

    /// Removes a key. Removing an absent key succeeds.
    fn remove(&self, key: &str) -> AppResult<()>;
}

/// An externally provided store that is expected to answer synchronously.
///
/// A bridge may reply `Poll::Pending` when it can only complete later; the
/// adapter treats that like a failure and uses the fallback store instead.
pub trait StorageBridge {
    /// Short name used in logs and notices.
    fn name(&self) -> &str;

    fn get(&self, key: &str) -> AppResult<Poll<Option<String>>>;

    fn set(&self, key: &str, value: &str) -> AppResult<Poll<()>>;

    fn remove(&self, key: &str) -> AppResult<Poll<()>>;
}

/// Which store accepted a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The bridge accepted the write.
    Primary,
    /// The built-in store accepted the write.
    Fallback,
    /// Neither store accepted the write.
    Failed,
}

impl WriteOutcome {
    /// Converts a failed write into `StorageError::Unavailable` for `key`.
    pub fn require(self, key: &str) -> AppResult<()> {
        match self {
            WriteOutcome::Failed => Err(StorageError::Unavailable {
                key: key.to_string(),
            }
            .into()),
            _ => Ok(()),
        }
    }
}

/// Severity of a user-visible notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Warning,
    Error,
}

/// A non-blocking message for the user, produced by a caught failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn warning(message: impl Into<String>) -> Self {
        Notice {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Notice {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.level {
            NoticeLevel::Warning => write!(f, "warning: {}", self.message),
            NoticeLevel::Error => write!(f, "error: {}", self.message),
        }
    }
}

/// Storage adapter that never fails its callers.
pub struct SafeStorage {
    bridge: Option<Box<dyn StorageBridge>>,
    fallback: Box<dyn KeyValueStore>,
    notices: RefCell<Vec<Notice>>,
}

impl SafeStorage {
    /// Creates an adapter backed only by the built-in store.
    pub fn new(fallback: impl KeyValueStore + 'static) -> Self {
        SafeStorage {
            bridge: None,
            fallback: Box::new(fallback),
            notices: RefCell::new(Vec::new()),
        }
    }

    /// Installs a primary bridge tried before the built-in store.
    pub fn with_bridge(mut self, bridge: impl StorageBridge + 'static) -> Self {
        self.bridge = Some(Box::new(bridge));
        self
    }

    /// Builds the adapter described by the configuration.
    ///
    /// The file store in `config.data_dir` is always the fallback. When a
    /// bridge database is configured but cannot be opened, the adapter runs
    /// without it and records a notice.
    pub fn open(config: &Config) -> Self {
        let storage = SafeStorage::new(FileStore::new(&config.data_dir));

        match &config.bridge_db {
            Some(path) => match SqliteBridge::open(path) {
                Ok(bridge) => {
                    debug!("Using SQLite bridge as primary store");
                    storage.with_bridge(bridge)
                }
                Err(e) => {
                    warn!("Failed to open SQLite bridge: {}", e);
                    storage.notify(Notice::warning(format!(
                        "Bridge storage unavailable, using local files: {}",
                        e
                    )));
                    storage
                }
            },
            None => storage,
        }
    }

    /// Whether a primary bridge is installed.
    pub fn has_bridge(&self) -> bool {
        self.bridge.is_some()
    }

    /// Records a notice for the user.
    pub fn notify(&self, notice: Notice) {
        self.notices.borrow_mut().push(notice);
    }

    /// Removes and returns all notices recorded so far.
    pub fn take_notices(&self) -> Vec<Notice> {
        self.notices.borrow_mut().drain(..).collect()
    }

    /// Runs `op` against the bridge, returning `None` when the fallback must be used.
    fn via_bridge<T>(
        &self,
        action: &str,
        key: &str,
        op: impl FnOnce(&dyn StorageBridge) -> AppResult<Poll<T>>,
    ) -> Option<T> {
        let bridge = self.bridge.as_deref()?;
        match op(bridge) {
            Ok(Poll::Ready(value)) => Some(value),
            Ok(Poll::Pending) => {
                let error = StorageError::Pending {
                    backend: bridge.name().to_string(),
                };
                warn!("{} '{}': {}; falling back", action, key, error);
                self.notify(Notice::warning(format!(
                    "{}; using local storage instead",
                    error
                )));
                None
            }
            Err(e) => {
                warn!("{} '{}' failed on {}: {}", action, key, bridge.name(), e);
                self.notify(Notice::warning(format!(
                    "{} store could not {} '{}', trying local storage",
                    bridge.name(),
                    action,
                    key
                )));
                None
            }
        }
    }

    /// Reads `key`, `None` when absent or when every store failed.
    pub fn get(&self, key: &str) -> Option<String> {
        if let Some(value) = self.via_bridge("read", key, |b| b.get(key)) {
            return value;
        }

        match self.fallback.get(key) {
            Ok(value) => value,
            Err(e) => {
                warn!("read '{}' failed on {}: {}", key, self.fallback.name(), e);
                self.notify(Notice::error(format!(
                    "Could not read '{}': check storage permissions",
                    key
                )));
                None
            }
        }
    }

    /// Writes `key`, reporting which store accepted it.
    pub fn set(&self, key: &str, value: &str) -> WriteOutcome {
        if self.via_bridge("write", key, |b| b.set(key, value)).is_some() {
            return WriteOutcome::Primary;
        }

        match self.fallback.set(key, value) {
            Ok(()) => WriteOutcome::Fallback,
            Err(e) => {
                warn!("write '{}' failed on {}: {}", key, self.fallback.name(), e);
                self.notify(Notice::error(format!(
                    "Could not save '{}': storage is full or not writable",
                    key
                )));
                WriteOutcome::Failed
            }
        }
    }

    /// Removes `key`, reporting which store handled it.
    pub fn remove(&self, key: &str) -> WriteOutcome {
        if self.via_bridge("remove", key, |b| b.remove(key)).is_some() {
            return WriteOutcome::Primary;
        }

        match self.fallback.remove(key) {
            Ok(()) => WriteOutcome::Fallback,
            Err(e) => {
                warn!("remove '{}' failed on {}: {}", key, self.fallback.name(), e);
                self.notify(Notice::error(format!("Could not remove '{}'", key)));
                WriteOutcome::Failed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AppError;

    /// Bridge that fails or defers every call.
    struct BrokenBridge {
        pending: bool,
    }

    impl BrokenBridge {
        fn reply<T>(&self) -> AppResult<Poll<T>> {
            if self.pending {
                Ok(Poll::Pending)
            } else {
                Err(AppError::Storage(StorageError::Backend {
                    backend: "broken".to_string(),
                    message: "bridge exploded".to_string(),
                }))
            }
        }
    }

    impl StorageBridge for BrokenBridge {
        fn name(&self) -> &str {
            "broken"
        }
        fn get(&self, _key: &str) -> AppResult<Poll<Option<String>>> {
            self.reply()
        }
        fn set(&self, _key: &str, _value: &str) -> AppResult<Poll<()>> {
            self.reply()
        }
        fn remove(&self, _key: &str) -> AppResult<Poll<()>> {
            self.reply()
        }
    }

    /// Store that rejects every call.
    struct ReadOnlyDisk;

    impl KeyValueStore for ReadOnlyDisk {
        fn name(&self) -> &str {
            "disk"
        }
        fn get(&self, _key: &str) -> AppResult<Option<String>> {
            Err(std::io::Error::other("unreadable").into())
        }
        fn set(&self, _key: &str, _value: &str) -> AppResult<()> {
            Err(std::io::Error::other("quota exceeded").into())
        }
        fn remove(&self, _key: &str) -> AppResult<()> {
            Err(std::io::Error::other("read-only").into())
        }
    }

    #[test]
    fn test_bridge_takes_priority() {
        let bridge = MemoryStore::new();
        bridge.insert("theme", "dark");
        let storage = SafeStorage::new(MemoryStore::new()).with_bridge(bridge);

        assert_eq!(storage.get("theme").as_deref(), Some("dark"));
        assert_eq!(storage.set("app-pin", "1234"), WriteOutcome::Primary);
        assert_eq!(storage.remove("app-pin"), WriteOutcome::Primary);
        assert!(storage.take_notices().is_empty());
    }

    #[test]
    fn test_failing_bridge_falls_back_with_notice() {
        let fallback = MemoryStore::new();
        fallback.insert("theme", "light");
        let storage = SafeStorage::new(fallback).with_bridge(BrokenBridge { pending: false });

        assert_eq!(storage.get("theme").as_deref(), Some("light"));
        assert_eq!(storage.set("theme", "dark"), WriteOutcome::Fallback);
        assert_eq!(storage.get("theme").as_deref(), Some("dark"));

        let notices = storage.take_notices();
        assert_eq!(notices.len(), 3);
        assert!(notices.iter().all(|n| n.level == NoticeLevel::Warning));
        assert!(storage.take_notices().is_empty());
    }

    #[test]
    fn test_pending_bridge_is_treated_as_unavailable() {
        let storage = SafeStorage::new(MemoryStore::new()).with_bridge(BrokenBridge { pending: true });

        assert_eq!(storage.set("theme", "dark"), WriteOutcome::Fallback);
        let notices = storage.take_notices();
        assert_eq!(notices.len(), 1);
        assert!(notices[0].message.contains("asynchronously"));
    }

    #[test]
    fn test_total_failure_is_reported_not_raised() {
        let storage = SafeStorage::new(ReadOnlyDisk).with_bridge(BrokenBridge { pending: false });

        assert_eq!(storage.get("dream-entries"), None);
        assert_eq!(storage.set("dream-entries", "[]"), WriteOutcome::Failed);
        assert_eq!(storage.remove("dream-entries"), WriteOutcome::Failed);

        let notices = storage.take_notices();
        assert!(notices.iter().any(|n| n.level == NoticeLevel::Error));
        assert!(WriteOutcome::Failed.require("dream-entries").is_err());
        assert!(WriteOutcome::Fallback.require("dream-entries").is_ok());
    }

    #[test]
    fn test_notice_display() {
        assert_eq!(Notice::warning("slow").to_string(), "warning: slow");
        assert_eq!(Notice::error("full").to_string(), "error: full");
    }
}
