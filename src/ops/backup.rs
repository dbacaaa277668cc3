//! JSON backup export and import.
//!
//! An export is the full entry list written as pretty-printed JSON into a file
//! named after the moment it was taken. Import validates the whole document
//! before touching anything, then asks whether to overwrite or merge.

use super::confirm::{Choice, Confirm, Prompt};
use crate::constants::{EXPORT_DATE_FORMAT, EXPORT_FILE_PREFIX, EXPORT_TIME_FORMAT};
use crate::errors::{AppError, AppResult};
use crate::journal::{parse_entries, Entry, EntryStore, MergeReport};
use blake3::Hasher;
use chrono::{DateTime, Local};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Report of a completed export.
#[derive(Debug, Clone)]
pub struct ExportReport {
    /// Where the backup was written
    pub path: PathBuf,
    /// Number of entries in the backup
    pub entries: usize,
    /// Size of the backup file in bytes
    pub bytes: u64,
    /// BLAKE3 checksum of the file contents
    pub checksum: String,
    /// Time taken to write the backup
    pub duration: Duration,
}

/// What an import did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportReport {
    /// The stored list was replaced by the imported one.
    Overwritten { entries: usize },
    /// New entries were added to the stored list.
    Merged(MergeReport),
    /// Merge was chosen but every imported id already existed.
    NothingNew { skipped: usize },
    /// The prompt was dismissed; nothing changed.
    Aborted,
}

/// File name for an export taken at `now`, e.g.
/// `dream_diary_backup_20240305_071502.json`.
pub fn export_file_name(now: &DateTime<Local>) -> String {
    format!(
        "{}{}_{}.json",
        EXPORT_FILE_PREFIX,
        now.format(EXPORT_DATE_FORMAT),
        now.format(EXPORT_TIME_FORMAT)
    )
}

/// Serializes entries as pretty-printed JSON with two-space indentation.
pub fn render_export(entries: &[Entry]) -> AppResult<String> {
    Ok(serde_json::to_string_pretty(entries)?)
}

/// Writes every stored entry into a new backup file inside `dir`.
///
/// `dir` is created if it does not exist.
///
/// # Errors
///
/// - `AppError::Validation` if there are no entries to export
/// - `AppError::Io` if the directory or file cannot be written
pub fn export_entries(
    store: &EntryStore<'_>,
    dir: &Path,
    now: &DateTime<Local>,
) -> AppResult<ExportReport> {
    let start_time = Instant::now();
    let entries = store.list();
    if entries.is_empty() {
        return Err(AppError::Validation(
            "There are no entries to export".to_string(),
        ));
    }

    let document = render_export(&entries)?;
    let bytes = document.as_bytes();

    let mut hasher = Hasher::new();
    hasher.update(bytes);
    let checksum = hasher.finalize().to_hex().to_string();

    fs::create_dir_all(dir)?;
    let path = dir.join(export_file_name(now));
    debug!("Writing export to {:?}", path);
    fs::write(&path, bytes)?;

    let report = ExportReport {
        path,
        entries: entries.len(),
        bytes: bytes.len() as u64,
        checksum,
        duration: start_time.elapsed(),
    };
    info!(
        "Exported {} entries ({} bytes) in {:?}",
        report.entries, report.bytes, report.duration
    );
    Ok(report)
}

fn import_prompt(count: usize) -> Prompt {
    Prompt::new(
        "Import mode",
        format!(
            "Ready to import {} entries.\n\n\
             Overwrite: delete the current entries and import.\n\
             Merge: keep the current entries and add the new ones.",
            count
        ),
    )
    .labels("Overwrite", "Merge")
    .dangerous()
    .no_backdrop_dismiss()
}

/// Imports a backup document.
///
/// The document is validated first; only then is `confirm` asked. Confirmed
/// overwrites the stored list, cancelled merges into it and dismissed aborts
/// without writing.
///
/// # Errors
///
/// - `AppError::Parse` / `AppError::Validation` for a malformed document
/// - `AppError::Storage` if the result could not be persisted
pub fn import_entries(
    store: &EntryStore<'_>,
    raw: &str,
    confirm: &mut dyn Confirm,
) -> AppResult<ImportReport> {
    let incoming = parse_entries(raw)?;
    debug!("Import document holds {} entries", incoming.len());

    let report = match confirm.ask(&import_prompt(incoming.len()))? {
        Choice::Confirmed => ImportReport::Overwritten {
            entries: store.replace_all(raw)?,
        },
        Choice::Cancelled => {
            let merged = store.merge_from(incoming)?;
            if merged.added == 0 {
                ImportReport::NothingNew {
                    skipped: merged.skipped,
                }
            } else {
                ImportReport::Merged(merged)
            }
        }
        Choice::Dismissed => {
            warn!("Import dismissed, nothing changed");
            ImportReport::Aborted
        }
    };
    info!("Import finished: {:?}", report);
    Ok(report)
}

/// Reads `path` and imports it with [`import_entries`].
pub fn import_file(
    store: &EntryStore<'_>,
    path: &Path,
    confirm: &mut dyn Confirm,
) -> AppResult<ImportReport> {
    let raw = fs::read_to_string(path)?;
    import_entries(store, &raw, confirm)
}
