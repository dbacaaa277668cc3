//! Filtered and searched views over the entry list.

use crate::journal::{Entry, EntryType};
use std::fmt;

/// The structural filter. Only one can be active at a time.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Filter {
    #[default]
    None,
    Type(EntryType),
    Tag(String),
}

/// Why a view came out empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyReason {
    /// Nothing is stored at all.
    NoEntries,
    /// Entries exist but none have the filtered type.
    NoTypeMatch,
    /// Entries exist but none carry the filtered tag.
    NoTagMatch,
    /// Nothing matched the search keyword.
    NoSearchMatch,
}

impl fmt::Display for EmptyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            EmptyReason::NoEntries => {
                "No entries yet. Write your first one with `dreamlog new`."
            }
            EmptyReason::NoTypeMatch => "No entries of this type yet.",
            EmptyReason::NoTagMatch => "No entries with this tag yet.",
            EmptyReason::NoSearchMatch => "No memories match that search.",
        };
        f.write_str(message)
    }
}

/// Result of [`view`].
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    Entries(Vec<Entry>),
    Empty(EmptyReason),
}

impl QueryOutcome {
    /// The matching entries, empty for an `Empty` outcome.
    pub fn entries(&self) -> &[Entry] {
        match self {
            QueryOutcome::Entries(entries) => entries,
            QueryOutcome::Empty(_) => &[],
        }
    }
}

fn matches_filter(entry: &Entry, filter: &Filter) -> bool {
    match filter {
        Filter::None => true,
        Filter::Type(kind) => &entry.kind == kind,
        Filter::Tag(tag) => entry.tags.contains(tag),
    }
}

fn matches_keyword(entry: &Entry, keyword: &str) -> bool {
    entry.text.to_lowercase().contains(keyword) || entry.date.to_lowercase().contains(keyword)
}

/// Applies `filter`, then `keyword`, keeping the input order.
///
/// The keyword is a case-insensitive substring match against the text and the
/// display date; an empty keyword matches everything.
///
/// # Examples
///
/// ```
/// use dreamlog::journal::parse_entries;
/// use dreamlog::query::{view, EmptyReason, Filter, QueryOutcome};
///
/// let entries = parse_entries(
///     r#"[{"id": 2, "text": "Ocean", "type": "dream"}, {"id": 1, "text": "Work", "type": "diary"}]"#,
/// ).unwrap();
///
/// let dreams = view(&entries, &Filter::Type("dream".parse().unwrap()), "");
/// assert_eq!(dreams.entries().len(), 1);
///
/// let nothing = view(&entries, &Filter::None, "mountain");
/// assert_eq!(nothing, QueryOutcome::Empty(EmptyReason::NoSearchMatch));
/// ```
pub fn view(entries: &[Entry], filter: &Filter, keyword: &str) -> QueryOutcome {
    if entries.is_empty() {
        return QueryOutcome::Empty(EmptyReason::NoEntries);
    }

    let keyword = keyword.to_lowercase();
    let matched: Vec<Entry> = entries
        .iter()
        .filter(|e| matches_filter(e, filter))
        .filter(|e| keyword.is_empty() || matches_keyword(e, &keyword))
        .cloned()
        .collect();

    if !matched.is_empty() {
        return QueryOutcome::Entries(matched);
    }

    let reason = if !keyword.is_empty() {
        EmptyReason::NoSearchMatch
    } else {
        match filter {
            Filter::Type(_) => EmptyReason::NoTypeMatch,
            Filter::Tag(_) => EmptyReason::NoTagMatch,
            Filter::None => EmptyReason::NoEntries,
        }
    };
    QueryOutcome::Empty(reason)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journal::parse_entries;

    fn sample() -> Vec<Entry> {
        parse_entries(
            r#"[
                {"id": 3, "text": "Falling through CLOUDS", "type": "dream", "tags": ["sky"], "date": "2024/1/3 07:00:00"},
                {"id": 2, "text": "Meeting ran long", "type": "diary", "tags": ["work"], "date": "2024/1/2 18:00:00"},
                {"id": 1, "text": "Why do I dream of clouds", "type": "os", "tags": ["sky", "work"], "date": "2024/1/1 23:00:00"}
            ]"#,
        )
        .unwrap()
    }

    fn ids(outcome: &QueryOutcome) -> Vec<i64> {
        outcome.entries().iter().map(|e| e.id.as_millis()).collect()
    }

    #[test]
    fn test_no_filter_keeps_order() {
        let entries = sample();
        assert_eq!(ids(&view(&entries, &Filter::None, "")), [3, 2, 1]);
    }

    #[test]
    fn test_type_and_tag_filters() {
        let entries = sample();
        assert_eq!(ids(&view(&entries, &Filter::Type(EntryType::Diary), "")), [2]);
        assert_eq!(
            ids(&view(&entries, &Filter::Tag("sky".to_string()), "")),
            [3, 1]
        );
        assert_eq!(
            view(&entries, &Filter::Tag("Sky".to_string()), ""),
            QueryOutcome::Empty(EmptyReason::NoTagMatch)
        );
    }

    #[test]
    fn test_search_is_case_insensitive_over_text_and_date() {
        let entries = sample();
        assert_eq!(ids(&view(&entries, &Filter::None, "clouds")), [3, 1]);
        assert_eq!(ids(&view(&entries, &Filter::None, "CLOUDS")), [3, 1]);
        assert_eq!(ids(&view(&entries, &Filter::None, "2024/1/2")), [2]);
        assert_eq!(
            ids(&view(&entries, &Filter::Tag("work".to_string()), "clouds")),
            [1]
        );
    }

    #[test]
    fn test_empty_reasons() {
        let entries = sample();
        assert_eq!(
            view(&[], &Filter::Type(EntryType::Dream), "x"),
            QueryOutcome::Empty(EmptyReason::NoEntries)
        );
        assert_eq!(
            view(&entries, &Filter::Type(EntryType::Diary), "clouds"),
            QueryOutcome::Empty(EmptyReason::NoSearchMatch)
        );

        let dreams_only = parse_entries(r#"[{"id": 1, "text": "a", "type": "dream"}]"#).unwrap();
        assert_eq!(
            view(&dreams_only, &Filter::Type(EntryType::Os), ""),
            QueryOutcome::Empty(EmptyReason::NoTypeMatch)
        );
    }

    #[test]
    fn test_unrecognized_type_never_matches_type_filters() {
        let entries = parse_entries(r#"[{"id": 1, "text": "a", "type": "memo"}]"#).unwrap();
        for kind in EntryType::ALL {
            assert!(matches!(
                view(&entries, &Filter::Type(kind), ""),
                QueryOutcome::Empty(EmptyReason::NoTypeMatch)
            ));
        }
    }
}
