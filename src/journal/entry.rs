//! The journal entry record and its field types.

use super::dates;
use chrono::NaiveDate;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Identity of an entry: its creation time in milliseconds.
///
/// Accepted from JSON as a number or a numeric string, always written back as
/// a number. Lookups compare the decimal string form, so `"1700000000000"`
/// and `1700000000000` name the same entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(i64);

impl EntryId {
    pub fn new(millis: i64) -> Self {
        EntryId(millis)
    }

    pub fn as_millis(self) -> i64 {
        self.0
    }

    /// Whether `raw` names this id.
    pub fn matches(self, raw: &str) -> bool {
        self.to_string() == raw.trim()
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for EntryId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.0)
    }
}

struct EntryIdVisitor;

impl<'de> Visitor<'de> for EntryIdVisitor {
    type Value = EntryId;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an integer id or a string holding one")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<EntryId, E> {
        Ok(EntryId(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<EntryId, E> {
        i64::try_from(v)
            .map(EntryId)
            .map_err(|_| E::custom("id out of range"))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<EntryId, E> {
        if v.fract() == 0.0 && v.abs() < i64::MAX as f64 {
            Ok(EntryId(v as i64))
        } else {
            Err(E::custom("id must be a whole number"))
        }
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<EntryId, E> {
        v.trim()
            .parse::<i64>()
            .map(EntryId)
            .map_err(|_| E::custom(format!("id '{}' is not numeric", v)))
    }
}

impl<'de> Deserialize<'de> for EntryId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(EntryIdVisitor)
    }
}

/// Kind of entry. Unknown values are kept verbatim so a round trip through
/// the store never rewrites them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "Option<String>")]
pub enum EntryType {
    Dream,
    Diary,
    /// Inner monologue.
    Os,
    /// Missing or unknown type.
    Unrecognized(Option<String>),
}

impl Default for EntryType {
    fn default() -> Self {
        EntryType::Unrecognized(None)
    }
}

impl EntryType {
    /// The recognized kinds in display order.
    pub const ALL: [EntryType; 3] = [EntryType::Dream, EntryType::Diary, EntryType::Os];

    pub fn as_str(&self) -> &str {
        match self {
            EntryType::Dream => "dream",
            EntryType::Diary => "diary",
            EntryType::Os => "os",
            EntryType::Unrecognized(raw) => raw.as_deref().unwrap_or(""),
        }
    }

    /// Human label with icon.
    pub fn label(&self) -> &'static str {
        match self {
            EntryType::Dream => "🌙 Dream",
            EntryType::Diary => "📖 Diary",
            EntryType::Os => "💭 Inner monologue",
            EntryType::Unrecognized(_) => "📝 Note",
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, EntryType::Unrecognized(_))
    }

    fn is_absent(&self) -> bool {
        matches!(self, EntryType::Unrecognized(None))
    }
}

impl From<Option<String>> for EntryType {
    fn from(raw: Option<String>) -> Self {
        match raw.as_deref() {
            Some("dream") => EntryType::Dream,
            Some("diary") => EntryType::Diary,
            Some("os") => EntryType::Os,
            _ => EntryType::Unrecognized(raw),
        }
    }
}

impl From<EntryType> for Option<String> {
    fn from(kind: EntryType) -> Self {
        match kind {
            EntryType::Unrecognized(raw) => raw,
            known => Some(known.as_str().to_string()),
        }
    }
}

impl FromStr for EntryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match EntryType::from(Some(s.trim().to_lowercase())) {
            EntryType::Unrecognized(_) => Err(format!(
                "unknown entry type '{}': expected dream, diary or os",
                s
            )),
            known => Ok(known),
        }
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered, de-duplicated, non-empty tags.
///
/// Every way of building a `Tags` value (including deserialization) trims
/// each tag, drops empty ones and keeps the first occurrence of duplicates.
/// Equality is case-sensitive.
///
/// # Examples
///
/// ```
/// use dreamlog::journal::Tags;
///
/// let tags = Tags::new(["sea", " sea ", "", "Sea", "flying"]);
/// assert_eq!(tags.as_slice(), ["sea", "Sea", "flying"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct Tags(Vec<String>);

impl Tags {
    pub fn new<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out = Tags::default();
        for tag in tags {
            out.push(tag.as_ref());
        }
        out
    }

    /// Adds a tag, returning `false` when it was empty or already present.
    pub fn push(&mut self, tag: &str) -> bool {
        let tag = tag.trim();
        if tag.is_empty() || self.contains(tag) {
            return false;
        }
        self.0.push(tag.to_string());
        true
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.0.iter().any(|t| t == tag)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<String>> for Tags {
    fn from(tags: Vec<String>) -> Self {
        Tags::new(tags)
    }
}

impl From<Tags> for Vec<String> {
    fn from(tags: Tags) -> Self {
        tags.0
    }
}

/// Field readers that accept whatever older versions and hand-edited
/// backups put in a field. `null` and values of the wrong shape become the
/// field's empty value; scalars are turned into their string form.
mod loose {
    use super::{EntryType, Tags};
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    fn scalar(value: Value) -> Option<String> {
        match value {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    pub fn string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        Ok(scalar(Value::deserialize(deserializer)?).unwrap_or_default())
    }

    pub fn kind<'de, D: Deserializer<'de>>(deserializer: D) -> Result<EntryType, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(s) => EntryType::from(Some(s)),
            _ => EntryType::default(),
        })
    }

    pub fn tags<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Tags, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::Array(items) => Tags::new(items.into_iter().filter_map(scalar)),
            Value::String(s) => Tags::new([s]),
            _ => Tags::default(),
        })
    }

    pub fn timestamp<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<i64>, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        })
    }
}

/// One journal record.
///
/// Fields this crate does not know about are kept in `extra` and written back
/// unchanged, so importing a file from a newer version loses nothing. Only
/// `id` is strict; every other field tolerates `null` and odd types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub id: EntryId,
    #[serde(default, deserialize_with = "loose::string")]
    pub text: String,
    #[serde(
        rename = "type",
        default,
        deserialize_with = "loose::kind",
        skip_serializing_if = "EntryType::is_absent"
    )]
    pub kind: EntryType,
    #[serde(default, deserialize_with = "loose::string")]
    pub mood: String,
    #[serde(default, deserialize_with = "loose::tags")]
    pub tags: Tags,
    #[serde(default, deserialize_with = "loose::string")]
    pub date: String,
    #[serde(
        default,
        deserialize_with = "loose::timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub timestamp: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Entry {
    /// Ordering key: the edited time when one was set, else the creation time.
    pub fn sort_key(&self) -> i64 {
        self.timestamp.unwrap_or(self.id.as_millis())
    }

    /// Calendar day the entry was created, from its id.
    pub fn created_day(&self) -> Option<NaiveDate> {
        dates::day_from_millis(self.id.as_millis())
    }

    /// Calendar day parsed from the display date.
    pub fn display_day(&self) -> Option<NaiveDate> {
        dates::parse_display_day(&self.date)
    }

    pub fn has_mood(&self) -> bool {
        !self.mood.is_empty()
    }

    /// First `max_chars` characters of the text, with an ellipsis when cut.
    pub fn preview(&self, max_chars: usize) -> String {
        let mut chars = self.text.chars();
        let head: String = chars.by_ref().take(max_chars).collect();
        if chars.next().is_some() {
            format!("{}...", head)
        } else {
            head
        }
    }
}
