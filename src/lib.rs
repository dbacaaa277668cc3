/*!
# Dreamlog

Dreamlog is a mood-tagged journal for dreams, diary pages and inner monologue.
Entries live in a small key/value store; on top of them sit search and
filtering, statistics (writing streak, mood and type frequencies, a four-week
mood heatmap, flashbacks), user-defined moods, JSON backups and an optional
four-digit PIN lock.

## Architecture

- `storage`: fault-tolerant key/value adapter (SQLite bridge, file store) and
  the typed repository over it
- `journal`: the entry model and the entry store that owns every mutation
- `moods`: built-in and custom moods
- `query`: filtered and searched views
- `stats`: streak, frequencies, heatmap and flashback
- `gate`: the PIN lock state machine and its terminal driver
- `session`: per-invocation view state
- `ops`: confirmations, backup export/import and destructive operations
- `cli`: argument parsing, command execution and text output
- `config`, `errors`, `constants`: ambient plumbing

## Usage Example

```rust
use dreamlog::journal::{EntryDraft, EntryStore};
use dreamlog::query::{view, Filter};
use dreamlog::storage::{MemoryStore, Repository, SafeStorage};
use chrono::Local;

fn main() -> dreamlog::AppResult<()> {
    let repo = Repository::new(SafeStorage::new(MemoryStore::new()));
    let store = EntryStore::new(&repo);

    store.create(EntryDraft::new("A staircase that never ended"), Local::now())?;

    let outcome = view(&store.list(), &Filter::None, "staircase");
    assert_eq!(outcome.entries().len(), 1);
    Ok(())
}
```
*/

/// Command-line interface for parsing and executing user commands
pub mod cli;
/// Configuration loading and management
pub mod config;
/// Application-wide constants
pub mod constants;
/// Error types and utilities for error handling
pub mod errors;
/// PIN lock
pub mod gate;
/// Entry model and entry store
pub mod journal;
/// Built-in and custom moods
pub mod moods;
/// Confirmations, backups and destructive operations
pub mod ops;
/// Filtered and searched views
pub mod query;
pub mod session;
/// Aggregate statistics
pub mod stats;
/// Key/value storage adapter and typed repository
pub mod storage;

// Re-export important types for convenience
pub use cli::CliArgs;
pub use config::Config;
pub use errors::{AppError, AppResult};
