//! User-facing operations that need a confirmation step or touch files
//! outside the data directory: backup export/import and the destructive
//! deletes.

pub mod backup;
pub mod confirm;
pub mod manage;

pub use backup::{export_entries, import_entries, import_file, ExportReport, ImportReport};
pub use confirm::{Choice, Confirm, PresetConfirm, Prompt, TerminalConfirm};
pub use manage::{clear_entries, delete_entry, remove_mood, Removal};
