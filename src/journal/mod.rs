//! Journal entries and the store that owns them.
//!
//! An [`Entry`] is one dream, diary page or inner monologue. The
//! [`EntryStore`] keeps the canonical list in the repository and is the only
//! place that mutates it; queries and statistics work on the `Vec<Entry>` it
//! returns from [`EntryStore::list`].
//!
//! # Example
//!
//! ```
//! use dreamlog::journal::{EntryDraft, EntryStore, EntryType, Tags};
//! use dreamlog::storage::{MemoryStore, Repository, SafeStorage};
//! use chrono::Local;
//!
//! let repo = Repository::new(SafeStorage::new(MemoryStore::new()));
//! let store = EntryStore::new(&repo);
//!
//! let draft = EntryDraft::new("Flying over a green sea")
//!     .kind(EntryType::Dream)
//!     .mood("excited")
//!     .tags(Tags::new(["flying", "sea"]));
//! let entry = store.create(draft, Local::now()).unwrap();
//!
//! assert_eq!(store.list(), vec![entry]);
//! ```

pub mod dates;
pub mod entry;
pub mod store;

pub use entry::{Entry, EntryId, EntryType, Tags};
pub use store::{parse_entries, EntryDraft, EntryPatch, EntryStore, MergeReport};
