//! Constants used throughout the application.
//!
//! This module contains all constants used in the dreamlog application, organized
//! into logical groups. Having constants centralized makes them easier to find,
//! modify, and reference consistently.

// Application Metadata
/// The name of the application.
pub const APP_NAME: &str = "dreamlog";
/// The description of the application used in CLI help text.
pub const APP_DESCRIPTION: &str = "A mood-tagged journal for dreams, diary entries and inner monologue";

// CLI Arguments & Defaults
/// Log format identifier for plain text.
pub const LOG_FORMAT_TEXT: &str = "text";
/// Log format identifier for JSON.
pub const LOG_FORMAT_JSON: &str = "json";
/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

// Configuration Keys & Environment Variables
/// Environment variable for specifying the data directory.
pub const ENV_VAR_DREAMLOG_DIR: &str = "DREAMLOG_DIR";
/// Environment variable naming an SQLite database used as the primary storage bridge.
pub const ENV_VAR_DREAMLOG_BRIDGE: &str = "DREAMLOG_BRIDGE";
/// Environment variable selecting the log format.
pub const ENV_VAR_DREAMLOG_LOG_FORMAT: &str = "DREAMLOG_LOG_FORMAT";
/// Environment variable selecting the default log level.
pub const ENV_VAR_DREAMLOG_LOG_LEVEL: &str = "DREAMLOG_LOG_LEVEL";
/// Environment variable supplying PIN digits for non-interactive unlocking.
pub const ENV_VAR_DREAMLOG_PIN: &str = "DREAMLOG_PIN";
/// Standard environment variable for the user's home directory.
pub const ENV_VAR_HOME: &str = "HOME";
/// Default sub-directory for the data directory within the user's home directory.
pub const DEFAULT_DATA_SUBDIR: &str = ".local/share/dreamlog";
/// Placeholder string for redacted information in debug output.
pub const REDACTED_PLACEHOLDER: &str = "[REDACTED]";

// Storage Keys
/// Key holding the JSON array of journal entries.
pub const KEY_ENTRIES: &str = "dream-entries";
/// Key holding the JSON array of custom mood definitions (or legacy strings).
pub const KEY_CUSTOM_MOODS: &str = "custom-moods";
/// Key holding the 4-digit PIN.
pub const KEY_PIN: &str = "app-pin";
/// Key holding the display theme.
pub const KEY_THEME: &str = "theme";

// File System Parameters
/// Suffix of files written by the file store, one per key.
pub const STORE_FILE_EXTENSION: &str = ".json";
/// Name of the lock file guarding writes in the data directory.
pub const STORE_LOCK_FILE: &str = ".lock";
/// Default POSIX permissions for newly created directories (owner read/write/execute).
#[cfg(unix)]
pub const DEFAULT_DIR_PERMISSIONS: u32 = 0o700;
/// Maximum pooled connections for the SQLite bridge.
pub const BRIDGE_POOL_SIZE: u32 = 2;
/// Seconds to wait for a bridge connection before giving up.
pub const BRIDGE_CONNECT_TIMEOUT_SECS: u64 = 5;

// Entries
/// Display date format written into `Entry::date`.
pub const ENTRY_DATE_FORMAT: &str = "%Y/%-m/%-d %H:%M:%S";
/// Date/time formats accepted by `--date` when editing an entry.
pub const EDIT_DATE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M", "%Y-%m-%d %H:%M:%S"];
/// Characters of an entry shown in list previews.
pub const PREVIEW_CHARS: usize = 80;
/// Characters of an entry shown in the flashback card.
pub const FLASHBACK_PREVIEW_CHARS: usize = 30;

// Export
/// Prefix of exported backup files.
pub const EXPORT_FILE_PREFIX: &str = "dream_diary_backup_";
/// Date portion of the export file name.
pub const EXPORT_DATE_FORMAT: &str = "%Y%m%d";
/// Time portion of the export file name.
pub const EXPORT_TIME_FORMAT: &str = "%H%M%S";

// Moods
/// Emoji used for custom moods without one, legacy moods and unknown keys.
pub const DEFAULT_MOOD_EMOJI: &str = "✨";
/// Color assigned to a custom mood when none (or an invalid one) is given.
pub const DEFAULT_CUSTOM_MOOD_COLOR: &str = "#a18cd1";
/// Color assigned to legacy custom moods stored as bare strings.
pub const LEGACY_MOOD_COLOR: &str = "#888888";
/// Color used when a mood key cannot be resolved.
pub const FALLBACK_MOOD_COLOR: &str = "#cccccc";
/// Prefix of generated custom mood keys.
pub const CUSTOM_MOOD_KEY_PREFIX: &str = "custom_";
/// Preset palette offered for custom moods.
pub const PRESET_MOOD_COLORS: &[&str] = &[
    "#a18cd1", "#9b9ece", "#6a6c9c", "#ffb7b2", "#ffd166", "#06d6a0", "#118ab2", "#ef476f",
    "#fbc2eb", "#c5cae9", "#80edce", "#7acfe6", "#f7a8b8", "#9b89b3", "#f0f2f7", "#434343",
];

// Statistics
/// Number of days the streak walk looks back at most.
pub const STREAK_MAX_DAYS: i64 = 365;
/// Number of moods reported by the mood frequency chart.
pub const MOOD_FREQUENCY_TOP: usize = 8;
/// Number of days covered by the mood heatmap.
pub const HEATMAP_DAYS: i64 = 28;
/// Minimum number of entries before a flashback is offered.
pub const FLASHBACK_MIN_ENTRIES: usize = 3;

// Access Gate
/// Number of digits in a PIN.
pub const PIN_LENGTH: usize = 4;
/// Delay before a rejected PIN input is cleared and prompted again, in milliseconds.
pub const PIN_ERROR_CLEAR_DELAY_MS: u64 = 400;
/// Wrong PINs accepted at an interactive prompt before giving up.
pub const MAX_PIN_ATTEMPTS: usize = 3;

// Logging Configuration
/// Service name used in tracing spans and structured logs.
pub const TRACING_SERVICE_NAME: &str = "dreamlog";
/// Name for the root tracing span covering an application invocation.
pub const TRACING_ROOT_SPAN_NAME: &str = "app_invocation";
