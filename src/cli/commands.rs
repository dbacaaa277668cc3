//! Executes parsed commands against the repository.
//!
//! Everything interactive (PIN input, confirmations) and the output sink are
//! passed in, so the same code serves the binary and the tests.

use super::output;
use super::{Command, EditArgs, ListArgs, MoodsCommand, NewArgs, PinCommand};
use crate::errors::{AppError, AppResult};
use crate::gate::prompt::{run_flow, PinSource};
use crate::gate::{Gate, GateEvent, GateRequest};
use crate::journal::dates::parse_edit_datetime;
use crate::journal::{EntryDraft, EntryPatch, EntryStore, Tags};
use crate::moods::MoodRegistry;
use crate::ops::{self, Choice, Confirm, PresetConfirm, Removal};
use crate::query::QueryOutcome;
use crate::session::Session;
use crate::stats;
use crate::storage::{Repository, Theme};
use chrono::{DateTime, Local};
use std::io::Write;
use std::path::PathBuf;
use tracing::{debug, info};

/// Builds the session gate, running the unlock flow when a PIN is stored.
///
/// # Errors
///
/// Returns `AppError::Gate` when the PIN is not entered correctly.
pub fn unlock(repo: &Repository, pins: &mut dyn PinSource) -> AppResult<Gate> {
    let mut gate = Gate::at_launch(repo.load_pin().as_deref());
    if !gate.is_unlocked() {
        debug!("PIN lock active, verifying");
        run_flow(&mut gate, repo, pins, GateRequest::Start)?;
    }
    Ok(gate)
}

/// Interactive collaborators of [`execute`].
pub struct Io<'a> {
    pub confirm: &'a mut dyn Confirm,
    pub pins: &'a mut dyn PinSource,
    pub out: &'a mut dyn Write,
}

fn pick<'c>(preset: &'c mut Option<PresetConfirm>, fallback: &'c mut dyn Confirm) -> &'c mut dyn Confirm {
    match preset {
        Some(preset) => preset,
        None => fallback,
    }
}

fn mood_key(registry: &MoodRegistry, raw: &str) -> AppResult<String> {
    registry
        .lookup(raw)
        .map(|m| m.key)
        .ok_or_else(|| AppError::Validation(format!("unknown mood '{}'", raw.trim())))
}

/// Runs `command`. The session must already be unlocked unless the command
/// is a `pin` or `theme` command.
pub fn execute(
    command: Command,
    repo: &Repository,
    session: &mut Session,
    io: Io<'_>,
    now: DateTime<Local>,
) -> AppResult<()> {
    debug!("Executing {:?}", command);
    if command.needs_unlock() {
        session.ensure_unlocked()?;
    }

    let store = EntryStore::new(repo);
    let mut registry = MoodRegistry::load(repo);
    let out = io.out;

    match command {
        Command::New(args) => new_entry(args, &store, &registry, session, out, now),
        Command::List(args) => list_entries(args, &store, &registry, session, out),
        Command::Show { id } => {
            let entry = store.get(&id)?;
            write!(out, "{}", output::entry_detail(&entry, &registry))?;
            Ok(())
        }
        Command::Edit(args) => edit_entry(args, &store, &registry, out),
        Command::Delete { id, yes } => {
            let mut preset = yes.then(|| PresetConfirm::always(Choice::Confirmed));
            match ops::delete_entry(&store, &id, pick(&mut preset, io.confirm))? {
                Removal::Removed => writeln!(out, "Deleted entry {}.", id.trim())?,
                Removal::Declined => writeln!(out, "Kept entry {}.", id.trim())?,
                Removal::Missing => writeln!(out, "No entry {}; nothing deleted.", id.trim())?,
            }
            Ok(())
        }
        Command::Clear { yes } => {
            let mut preset = yes.then(|| PresetConfirm::always(Choice::Confirmed));
            match ops::clear_entries(&store, pick(&mut preset, io.confirm))? {
                Removal::Removed => writeln!(out, "All entries deleted.")?,
                Removal::Declined => writeln!(out, "Nothing was deleted.")?,
                Removal::Missing => writeln!(out, "There are no entries to delete.")?,
            }
            Ok(())
        }
        Command::Stats => {
            let entries = store.list();
            let today = now.date_naive();
            let report = output::stats_report(
                &stats::summary(&entries, today),
                &stats::mood_frequency(&entries),
                &stats::type_frequency(&entries),
                &stats::mood_heatmap(&entries, today),
                &registry,
            );
            write!(out, "{}", report)?;
            Ok(())
        }
        Command::Flashback => {
            let entries = store.list();
            let mut rng = rand::thread_rng();
            match stats::flashback(&entries, now.date_naive(), &mut rng) {
                Some(flashback) => write!(out, "{}", output::flashback_card(&flashback, &registry))?,
                None => writeln!(
                    out,
                    "No flashback yet. Keep writing; memories resurface once there are a few past entries."
                )?,
            }
            Ok(())
        }
        Command::Moods(MoodsCommand::List) => {
            write!(out, "{}", output::mood_table(&registry.list()))?;
            Ok(())
        }
        Command::Moods(MoodsCommand::Add { label, emoji, color }) => {
            let mood = registry.add_custom(repo, &label, &emoji, color.as_deref(), now)?;
            writeln!(out, "Added mood {} {} ({}).", mood.emoji, mood.label, mood.key)?;
            Ok(())
        }
        Command::Moods(MoodsCommand::Remove { mood, yes }) => {
            let key = registry
                .lookup(&mood)
                .map(|m| m.key)
                .unwrap_or_else(|| mood.trim().to_string());
            let mut preset = yes.then(|| PresetConfirm::always(Choice::Confirmed));
            let confirm = pick(&mut preset, io.confirm);
            match ops::remove_mood(&mut registry, repo, session, &key, confirm)? {
                Removal::Removed => writeln!(out, "Removed mood {}.", key)?,
                Removal::Declined | Removal::Missing => writeln!(out, "Mood {} kept.", key)?,
            }
            Ok(())
        }
        Command::Export { out: dir } => {
            let dir = match dir {
                Some(dir) => dir,
                None => std::env::current_dir()?,
            };
            let report = ops::export_entries(&store, &dir, &now)?;
            write!(out, "{}", output::export_summary(&report))?;
            Ok(())
        }
        Command::Import {
            file,
            overwrite,
            merge,
        } => import(&store, file, overwrite, merge, io.confirm, out),
        Command::Pin(pin) => {
            let request = match pin {
                PinCommand::Set => GateRequest::Set,
                PinCommand::Disable => GateRequest::Disable,
            };
            match run_flow(session.gate_mut(), repo, io.pins, request)? {
                GateEvent::PinSet(_) => writeln!(out, "PIN lock enabled.")?,
                GateEvent::PinCleared => writeln!(out, "PIN lock disabled.")?,
                other => debug!("PIN flow ended with {:?}", other),
            }
            Ok(())
        }
        Command::Theme { theme } => {
            match theme {
                Some(raw) => {
                    let theme: Theme = raw.parse()?;
                    repo.save_theme(theme)?;
                    info!("Theme set to {}", theme);
                    writeln!(out, "Theme set to {}.", theme)?;
                }
                None => writeln!(out, "{}", repo.load_theme())?,
            }
            Ok(())
        }
    }
}

fn new_entry(
    args: NewArgs,
    store: &EntryStore<'_>,
    registry: &MoodRegistry,
    session: &mut Session,
    out: &mut dyn Write,
    now: DateTime<Local>,
) -> AppResult<()> {
    if let Some(raw) = &args.mood {
        let key = mood_key(registry, raw)?;
        session.toggle_mood(&key);
    }

    let draft = EntryDraft::new(args.text)
        .kind(args.kind)
        .mood(session.selected_mood().unwrap_or_default())
        .tags(Tags::new(&args.tags));
    let entry = store.create(draft, now)?;
    writeln!(out, "Saved entry {} ({}).", entry.id, entry.date)?;
    Ok(())
}

fn list_entries(
    args: ListArgs,
    store: &EntryStore<'_>,
    registry: &MoodRegistry,
    session: &mut Session,
    out: &mut dyn Write,
) -> AppResult<()> {
    if let Some(kind) = args.kind {
        session.apply_type_filter(kind);
    }
    if let Some(tag) = &args.tag {
        session.apply_tag_filter(tag);
    }
    if let Some(keyword) = &args.search {
        session.set_search(keyword);
    }

    match session.view(&store.list())? {
        QueryOutcome::Entries(entries) => {
            for entry in &entries {
                writeln!(out, "{}", output::entry_line(entry, registry))?;
            }
        }
        QueryOutcome::Empty(reason) => writeln!(out, "{}", reason)?,
    }
    Ok(())
}

fn edit_entry(
    args: EditArgs,
    store: &EntryStore<'_>,
    registry: &MoodRegistry,
    out: &mut dyn Write,
) -> AppResult<()> {
    let mut patch = EntryPatch {
        text: args.text,
        kind: args.kind,
        ..EntryPatch::default()
    };
    if let Some(raw) = &args.mood {
        patch.mood = Some(match raw.trim() {
            "" => String::new(),
            _ => mood_key(registry, raw)?,
        });
    }
    if args.clear_tags {
        patch.tags = Some(Tags::default());
    } else if !args.tags.is_empty() {
        patch.tags = Some(Tags::new(&args.tags));
    }
    if let Some(raw) = &args.date {
        let when = parse_edit_datetime(raw).ok_or_else(|| {
            AppError::Validation(format!(
                "cannot read date '{}': use YYYY-MM-DDTHH:MM",
                raw.trim()
            ))
        })?;
        patch = patch.retime(&when);
    }
    if patch.is_empty() {
        return Err(AppError::Validation("Nothing to change".to_string()));
    }

    let entry = store.update(&args.id, patch)?;
    writeln!(out, "Updated entry {}.", entry.id)?;
    Ok(())
}

fn import(
    store: &EntryStore<'_>,
    file: PathBuf,
    overwrite: bool,
    merge: bool,
    confirm: &mut dyn Confirm,
    out: &mut dyn Write,
) -> AppResult<()> {
    let mut preset = if overwrite {
        Some(PresetConfirm::always(Choice::Confirmed))
    } else if merge {
        Some(PresetConfirm::always(Choice::Cancelled))
    } else {
        None
    };
    let report = ops::import_file(store, &file, pick(&mut preset, confirm))?;
    write!(out, "{}", output::import_summary(&report))?;
    Ok(())
}
