//! Plain-text rendering of entries, statistics and operation reports.

use crate::constants::{FLASHBACK_PREVIEW_CHARS, PRESET_MOOD_COLORS, PREVIEW_CHARS};
use crate::journal::{Entry, MergeReport};
use crate::moods::{MoodListing, MoodRegistry};
use crate::ops::{ExportReport, ImportReport};
use crate::stats::{Flashback, FlashbackKind, HeatmapCell, MoodCount, Summary, TypeFrequency};
use crate::storage::Notice;

const BAR_WIDTH: usize = 20;
const EMPTY_CELL: &str = "·";

fn mood_badge(registry: &MoodRegistry, key: &str) -> String {
    let style = registry.resolve(key);
    format!("{} {}", style.emoji, style.label)
}

fn tag_list(entry: &Entry) -> String {
    entry
        .tags
        .iter()
        .map(|t| format!("#{}", t))
        .collect::<Vec<_>>()
        .join(" ")
}

/// One line per entry: id, date, type, mood, preview and tags.
pub fn entry_line(entry: &Entry, registry: &MoodRegistry) -> String {
    let mut parts = vec![
        entry.id.to_string(),
        entry.date.clone(),
        entry.kind.label().to_string(),
    ];
    if entry.has_mood() {
        parts.push(mood_badge(registry, &entry.mood));
    }
    parts.push(entry.preview(PREVIEW_CHARS).replace('\n', " "));
    if !entry.tags.is_empty() {
        parts.push(tag_list(entry));
    }
    parts.join("  ")
}

/// The full entry.
pub fn entry_detail(entry: &Entry, registry: &MoodRegistry) -> String {
    let mut out = format!("{}  {}\nid: {}\n", entry.kind.label(), entry.date, entry.id);
    if entry.has_mood() {
        out.push_str(&format!("mood: {}\n", mood_badge(registry, &entry.mood)));
    }
    if !entry.tags.is_empty() {
        out.push_str(&format!("tags: {}\n", tag_list(entry)));
    }
    out.push_str(&format!("\n{}\n", entry.text));
    out
}

pub fn mood_table(listing: &[MoodListing]) -> String {
    let mut out: String = listing
        .iter()
        .map(|row| {
            let origin = if row.custom { "custom" } else { "built-in" };
            format!(
                "{} {:<12} {:<22} {}  {}\n",
                row.mood.emoji, row.mood.label, row.mood.key, row.mood.color, origin
            )
        })
        .collect();
    out.push_str(&format!("\nPreset colors: {}\n", PRESET_MOOD_COLORS.join(" ")));
    out
}

fn bar(count: usize, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    let filled = ((count * BAR_WIDTH) + max - 1) / max;
    "█".repeat(filled.max(1))
}

/// The statistics screen.
pub fn stats_report(
    summary: &Summary,
    moods: &[MoodCount],
    types: &TypeFrequency,
    heatmap: &[HeatmapCell],
    registry: &MoodRegistry,
) -> String {
    let mut lines = vec![format!(
        "Entries: {}   Dreams: {}   Streak: {} day{}",
        summary.total,
        summary.dreams,
        summary.streak,
        if summary.streak == 1 { "" } else { "s" }
    )];

    lines.push("\nMoods".to_string());
    if moods.is_empty() {
        lines.push("  No moods recorded yet.".to_string());
    }
    let max = moods.first().map(|m| m.count).unwrap_or(0);
    lines.extend(moods.iter().map(|mood| {
        format!(
            "  {:<16} {:>4} {}",
            mood_badge(registry, &mood.mood),
            mood.count,
            bar(mood.count, max)
        )
    }));

    lines.push("\nTypes".to_string());
    lines.extend(types.counts.iter().map(|count| {
        format!(
            "  {:<20} {:>4} {:>3}%",
            count.kind.label(),
            count.count,
            count.percent
        )
    }));

    lines.push(format!("\nLast {} days", heatmap.len()));
    for week in heatmap.chunks(7) {
        let cells: Vec<String> = week
            .iter()
            .map(|cell| match &cell.mood {
                Some(key) => registry.resolve(key).emoji,
                None => EMPTY_CELL.to_string(),
            })
            .collect();
        let first = week.first().map(|c| c.day.format("%m-%d").to_string());
        lines.push(format!("  {}  {}", first.unwrap_or_default(), cells.join(" ")));
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

pub fn flashback_card(flashback: &Flashback, registry: &MoodRegistry) -> String {
    let heading = match flashback.kind {
        FlashbackKind::Anniversary => "On this day",
        FlashbackKind::Random => "From the past",
    };
    let entry = &flashback.entry;
    let mut out = format!("{} ({})\n", heading, entry.date);
    if entry.has_mood() {
        out.push_str(&format!("{}\n", mood_badge(registry, &entry.mood)));
    }
    out.push_str(&format!(
        "{}\ndreamlog show {}\n",
        entry.preview(FLASHBACK_PREVIEW_CHARS),
        entry.id
    ));
    out
}

pub fn export_summary(report: &ExportReport) -> String {
    format!(
        "Exported {} entries to {}\n{} bytes, blake3 {}\n",
        report.entries,
        report.path.display(),
        report.bytes,
        report.checksum
    )
}

pub fn import_summary(report: &ImportReport) -> String {
    match report {
        ImportReport::Overwritten { entries } => {
            format!("Import complete: {} entries now stored.\n", entries)
        }
        ImportReport::Merged(MergeReport { added, skipped }) => format!(
            "Merge complete: {} new entries added, {} already present.\n",
            added, skipped
        ),
        ImportReport::NothingNew { .. } => {
            "Nothing new to import: every entry already exists.\n".to_string()
        }
        ImportReport::Aborted => "Import cancelled.\n".to_string(),
    }
}

/// Notices collected by the storage layer, one per line.
pub fn notices(notices: &[Notice]) -> String {
    notices.iter().map(|n| format!("{}\n", n)).collect()
}
