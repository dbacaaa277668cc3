//! Aggregate views over the entry list: streak, frequencies, heatmap and
//! flashback.
//!
//! Every function takes `today` explicitly so results do not depend on the
//! wall clock. Calendar days come from the entry id (creation time, local
//! zone), except for the flashback, which reads the display date like the
//! user sees it.

use crate::constants::{FLASHBACK_MIN_ENTRIES, HEATMAP_DAYS, MOOD_FREQUENCY_TOP, STREAK_MAX_DAYS};
use crate::journal::{Entry, EntryType};
use chrono::{Datelike, Duration, NaiveDate};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::{HashMap, HashSet};

/// Consecutive days with at least one entry, counting back from `today`.
///
/// A day without entries ends the streak, except `today` itself: not having
/// written yet today does not break yesterday's streak. The walk stops after
/// a year.
///
/// # Examples
///
/// ```
/// use dreamlog::journal::parse_entries;
/// use dreamlog::stats::streak;
/// use chrono::{Local, NaiveDate, TimeZone};
///
/// let id = |d: u32| Local.with_ymd_and_hms(2024, 1, d, 9, 0, 0).unwrap().timestamp_millis();
/// let raw = format!(
///     r#"[{{"id": {}, "text": "a"}}, {{"id": {}, "text": "b"}}]"#,
///     id(9),
///     id(8)
/// );
/// let entries = parse_entries(&raw).unwrap();
///
/// let today = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
/// assert_eq!(streak(&entries, today), 2);
/// ```
pub fn streak(entries: &[Entry], today: NaiveDate) -> u32 {
    let days: HashSet<NaiveDate> = entries.iter().filter_map(Entry::created_day).collect();
    if days.is_empty() {
        return 0;
    }

    let mut count = 0;
    for offset in 0..STREAK_MAX_DAYS {
        let day = today - Duration::days(offset);
        if days.contains(&day) {
            count += 1;
        } else if offset == 0 {
            continue;
        } else {
            break;
        }
    }
    count
}

/// How often a mood was used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoodCount {
    pub mood: String,
    pub count: usize,
}

/// The most used moods, most frequent first, at most eight.
///
/// Entries without a mood are ignored. Ties keep the order in which the moods
/// first appear in `entries`.
pub fn mood_frequency(entries: &[Entry]) -> Vec<MoodCount> {
    let mut counts: Vec<MoodCount> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for entry in entries.iter().filter(|e| e.has_mood()) {
        match index.get(entry.mood.as_str()) {
            Some(&i) => counts[i].count += 1,
            None => {
                index.insert(entry.mood.as_str(), counts.len());
                counts.push(MoodCount {
                    mood: entry.mood.clone(),
                    count: 1,
                });
            }
        }
    }

    // Stable, so equal counts stay in first-seen order.
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(MOOD_FREQUENCY_TOP);
    counts
}

/// Entries of one type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeCount {
    pub kind: EntryType,
    pub count: usize,
    /// Rounded share of the recognized total.
    pub percent: u32,
}

/// Breakdown by recognized type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeFrequency {
    /// Dream, diary and inner monologue, in that order.
    pub counts: Vec<TypeCount>,
    /// Entries with a recognized type.
    pub total: usize,
}

/// Counts per type. Entries whose type is missing or unknown are left out of
/// both the counts and the total.
pub fn type_frequency(entries: &[Entry]) -> TypeFrequency {
    let raw: Vec<(EntryType, usize)> = EntryType::ALL
        .into_iter()
        .map(|kind| {
            let count = entries.iter().filter(|e| e.kind == kind).count();
            (kind, count)
        })
        .collect();
    let total: usize = raw.iter().map(|(_, c)| c).sum();

    let counts = raw
        .into_iter()
        .map(|(kind, count)| TypeCount {
            kind,
            count,
            percent: if total == 0 {
                0
            } else {
                ((count as f64 / total as f64) * 100.0).round() as u32
            },
        })
        .collect();

    TypeFrequency { counts, total }
}

/// One day of the heatmap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeatmapCell {
    pub day: NaiveDate,
    /// The mood shown for the day, `None` when nothing was recorded.
    pub mood: Option<String>,
}

/// The last 28 days, oldest first and ending with `today`.
///
/// A day shows the mood of the first entry for that day in list order that
/// has one. With the usual newest-first list, that is the latest mood of the
/// day.
pub fn mood_heatmap(entries: &[Entry], today: NaiveDate) -> Vec<HeatmapCell> {
    let mut by_day: HashMap<NaiveDate, &str> = HashMap::new();
    for entry in entries.iter().filter(|e| e.has_mood()) {
        if let Some(day) = entry.created_day() {
            by_day.entry(day).or_insert(entry.mood.as_str());
        }
    }

    (0..HEATMAP_DAYS)
        .rev()
        .map(|offset| {
            let day = today - Duration::days(offset);
            HeatmapCell {
                day,
                mood: by_day.get(&day).map(|m| m.to_string()),
            }
        })
        .collect()
}

/// Why an entry was picked for the flashback card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashbackKind {
    /// Written on this month and day in an earlier (or later) year.
    Anniversary,
    /// Any entry not from today.
    Random,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Flashback {
    pub kind: FlashbackKind,
    pub entry: Entry,
}

/// Picks a past entry to resurface.
///
/// Needs at least three entries. The first entry whose display date falls on
/// today's month and day in another year wins; otherwise one entry not dated
/// today is chosen uniformly with `rng`. Entries whose date cannot be parsed
/// are never picked.
pub fn flashback<R>(entries: &[Entry], today: NaiveDate, rng: &mut R) -> Option<Flashback>
where
    R: Rng + ?Sized,
{
    if entries.len() < FLASHBACK_MIN_ENTRIES {
        return None;
    }

    let dated: Vec<(&Entry, NaiveDate)> = entries
        .iter()
        .filter_map(|e| e.display_day().map(|day| (e, day)))
        .collect();

    let anniversary = dated.iter().find(|(_, day)| {
        day.month() == today.month() && day.day() == today.day() && day.year() != today.year()
    });
    if let Some((entry, _)) = anniversary {
        return Some(Flashback {
            kind: FlashbackKind::Anniversary,
            entry: (*entry).clone(),
        });
    }

    let past: Vec<&Entry> = dated
        .iter()
        .filter(|(_, day)| *day != today)
        .map(|(e, _)| *e)
        .collect();
    past.choose(rng).map(|entry| Flashback {
        kind: FlashbackKind::Random,
        entry: (*entry).clone(),
    })
}

/// Headline numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub total: usize,
    pub dreams: usize,
    pub streak: u32,
}

pub fn summary(entries: &[Entry], today: NaiveDate) -> Summary {
    Summary {
        total: entries.len(),
        dreams: entries.iter().filter(|e| e.kind == EntryType::Dream).count(),
        streak: streak(entries, today),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::json;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn millis(y: i32, m: u32, d: u32, h: u32) -> i64 {
        Local
            .with_ymd_and_hms(y, m, d, h, 0, 0)
            .unwrap()
            .timestamp_millis()
    }

    fn entry(id: i64, mood: &str, kind: &str, date: &str) -> Entry {
        serde_json::from_value(json!({
            "id": id,
            "text": format!("entry {}", id),
            "type": kind,
            "mood": mood,
            "date": date,
        }))
        .unwrap()
    }

    fn on(y: i32, m: u32, d: u32) -> Entry {
        entry(
            millis(y, m, d, 12),
            "",
            "dream",
            &format!("{}/{}/{} 12:00:00", y, m, d),
        )
    }

    #[test]
    fn test_streak_examples() {
        let today = day(2024, 1, 10);

        let consecutive = vec![on(2024, 1, 10), on(2024, 1, 9), on(2024, 1, 8)];
        assert_eq!(streak(&consecutive, today), 3);

        let gap = vec![on(2024, 1, 8)];
        assert_eq!(streak(&gap, today), 0);

        assert_eq!(streak(&[], today), 0);
    }

    #[test]
    fn test_streak_tolerates_missing_today_only() {
        let today = day(2024, 1, 10);
        let entries = vec![on(2024, 1, 9), on(2024, 1, 8), on(2024, 1, 6)];
        assert_eq!(streak(&entries, today), 2);

        let many_per_day = vec![on(2024, 1, 10), on(2024, 1, 10), on(2024, 1, 9)];
        assert_eq!(streak(&many_per_day, today), 2);
    }

    #[test]
    fn test_streak_stops_after_a_year() {
        let today = day(2024, 12, 31);
        let entries: Vec<Entry> = (0..400)
            .map(|offset| {
                let d = today - Duration::days(offset);
                on(d.year(), d.month(), d.day())
            })
            .collect();
        assert_eq!(streak(&entries, today), STREAK_MAX_DAYS as u32);
    }

    #[test]
    fn test_mood_frequency_example() {
        let entries = vec![
            entry(3, "happy", "dream", ""),
            entry(2, "happy", "dream", ""),
            entry(1, "sad", "dream", ""),
        ];
        let freq = mood_frequency(&entries);
        assert_eq!(
            freq,
            vec![
                MoodCount { mood: "happy".to_string(), count: 2 },
                MoodCount { mood: "sad".to_string(), count: 1 },
            ]
        );
    }

    #[test]
    fn test_mood_frequency_ties_and_limit() {
        let moods = ["calm", "sad", "", "a", "b", "c", "d", "e", "f", "g", "sad"];
        let entries: Vec<Entry> = moods
            .iter()
            .enumerate()
            .map(|(i, m)| entry(i as i64, m, "dream", ""))
            .collect();

        let freq = mood_frequency(&entries);
        assert_eq!(freq.len(), 8);
        assert_eq!(freq[0].mood, "sad");
        assert_eq!(freq[1].mood, "calm");
        let rest: Vec<&str> = freq[2..].iter().map(|m| m.mood.as_str()).collect();
        assert_eq!(rest, ["a", "b", "c", "d", "e", "f"]);
    }

    #[test]
    fn test_type_frequency_ignores_unrecognized() {
        let entries = vec![
            entry(1, "", "dream", ""),
            entry(2, "", "dream", ""),
            entry(3, "", "os", ""),
            entry(4, "", "memo", ""),
        ];
        let freq = type_frequency(&entries);
        assert_eq!(freq.total, 3);
        assert_eq!(freq.counts[0].kind, EntryType::Dream);
        assert_eq!(freq.counts[0].count, 2);
        assert_eq!(freq.counts[0].percent, 67);
        assert_eq!(freq.counts[1].count, 0);
        assert_eq!(freq.counts[2].percent, 33);

        assert_eq!(type_frequency(&[]).total, 0);
    }

    #[test]
    fn test_heatmap_covers_28_days_and_takes_first_mood() {
        let today = day(2024, 3, 28);
        let entries = vec![
            entry(millis(2024, 3, 28, 22), "", "dream", ""),
            entry(millis(2024, 3, 28, 21), "calm", "dream", ""),
            entry(millis(2024, 3, 28, 8), "sad", "dream", ""),
            entry(millis(2024, 3, 1, 8), "happy", "dream", ""),
            entry(millis(2024, 2, 29, 8), "scared", "dream", ""),
        ];

        let cells = mood_heatmap(&entries, today);
        assert_eq!(cells.len(), 28);
        assert_eq!(cells[0].day, day(2024, 3, 1));
        assert_eq!(cells[0].mood.as_deref(), Some("happy"));
        assert_eq!(cells[27].day, today);
        assert_eq!(cells[27].mood.as_deref(), Some("calm"));
        assert_eq!(cells.iter().filter(|c| c.mood.is_some()).count(), 2);
    }

    #[test]
    fn test_flashback_needs_three_entries() {
        let mut rng = StdRng::seed_from_u64(7);
        let entries = vec![on(2023, 5, 20), on(2022, 5, 20)];
        assert!(flashback(&entries, day(2024, 5, 20), &mut rng).is_none());
    }

    #[test]
    fn test_flashback_prefers_anniversary() {
        let mut rng = StdRng::seed_from_u64(7);
        let entries = vec![on(2024, 5, 19), on(2023, 5, 20), on(2022, 5, 20), on(2024, 5, 20)];

        let picked = flashback(&entries, day(2024, 5, 20), &mut rng).unwrap();
        assert_eq!(picked.kind, FlashbackKind::Anniversary);
        assert_eq!(picked.entry, entries[1]);
    }

    #[test]
    fn test_flashback_random_skips_today_and_unparsable() {
        let today = day(2024, 5, 20);
        let mut entries = vec![on(2024, 5, 20), on(2024, 5, 20), on(2024, 4, 2)];
        entries.push(entry(99, "", "dream", "someday"));

        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let picked = flashback(&entries, today, &mut rng).unwrap();
            assert_eq!(picked.kind, FlashbackKind::Random);
            assert_eq!(picked.entry, entries[2]);
        }

        let only_today = vec![on(2024, 5, 20), on(2024, 5, 20), on(2024, 5, 20)];
        let mut rng = StdRng::seed_from_u64(1);
        assert!(flashback(&only_today, today, &mut rng).is_none());
    }

    #[test]
    fn test_summary() {
        let today = day(2024, 1, 10);
        let mut entries = vec![on(2024, 1, 10), on(2024, 1, 9)];
        entries.push(entry(millis(2024, 1, 9, 8), "", "diary", "2024/1/9 08:00:00"));

        let s = summary(&entries, today);
        assert_eq!(s, Summary { total: 3, dreams: 2, streak: 2 });
    }
}
