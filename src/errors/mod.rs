//! Error handling utilities for the dreamlog application.
//!
//! This module provides the central error type `AppError` which represents all
//! possible error conditions that might occur in the application, as well as the
//! convenience type alias `AppResult` for functions that can return these errors.

use thiserror::Error;

/// Represents failures of the key/value stores behind the storage adapter.
///
/// The storage adapter never lets these escape to its callers: it logs them,
/// turns them into user-visible notices and tries the next store. They surface
/// as `AppError::Storage` only when an operation needs to tell its caller that
/// nothing was persisted.
///
/// # Examples
///
/// ```
/// use dreamlog::errors::StorageError;
///
/// let error = StorageError::Unavailable {
///     key: "dream-entries".to_string(),
/// };
/// assert!(format!("{}", error).contains("dream-entries"));
/// assert!(format!("{}", error).contains("No storage"));
/// ```
#[derive(Debug, Error)]
pub enum StorageError {
    /// Both the primary bridge and the built-in store failed for a key.
    #[error("No storage accepted the write for '{key}'. Check free disk space and permissions on the data directory.")]
    Unavailable {
        /// The key that could not be written
        key: String,
    },

    /// A store reported a failure.
    #[error("{backend} store failed: {message}")]
    Backend {
        /// Name of the failing store
        backend: String,
        /// A description of the failure
        message: String,
    },

    /// A bridge answered asynchronously where a synchronous reply was required.
    #[error("{backend} store answered asynchronously; a synchronous reply is required")]
    Pending {
        /// Name of the bridge
        backend: String,
    },

    /// SQLite bridge error.
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Connection pool error.
    #[error("Failed to get connection from pool: {0}")]
    Pool(#[from] r2d2::Error),
}

/// Represents all possible errors that can occur in the dreamlog application.
///
/// This enum is the central error type used across the application, with variants
/// for different error categories. It uses `thiserror` for deriving the `Error` trait
/// implementation and formatted error messages.
///
/// # Examples
///
/// Creating a validation error:
/// ```
/// use dreamlog::errors::AppError;
///
/// let error = AppError::Validation("Entry text cannot be empty".to_string());
/// assert_eq!(format!("{}", error), "Invalid input: Entry text cannot be empty");
/// ```
///
/// Converting from an IO error:
/// ```
/// use dreamlog::errors::AppError;
/// use std::io::{self, ErrorKind};
///
/// let io_error = io::Error::new(ErrorKind::NotFound, "file not found");
/// let app_error: AppError = io_error.into();
///
/// match app_error {
///     AppError::Io(inner) => assert_eq!(inner.kind(), ErrorKind::NotFound),
///     _ => panic!("Expected Io variant"),
/// }
/// ```
#[derive(Debug, Error)]
pub enum AppError {
    /// Errors related to configuration loading or validation.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input/output errors from filesystem operations.
    ///
    /// This variant automatically converts from `std::io::Error` through the `From` trait.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Errors raised by the storage layer when nothing could be persisted.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Rejected user input: empty text, empty mood label, malformed import file.
    #[error("Invalid input: {0}")]
    Validation(String),

    /// An operation referenced an entry or mood that no longer exists.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A custom mood with the same label already exists.
    #[error("Already exists: {0}")]
    Duplicate(String),

    /// Persisted or imported JSON could not be parsed.
    #[error("Malformed JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// The PIN gate refused the request.
    #[error("Privacy lock: {0}")]
    Gate(String),

    /// The user dismissed or cancelled a confirmation.
    #[error("Cancelled: {0}")]
    Cancelled(String),
}

/// A type alias for `Result<T, AppError>` to simplify function signatures.
///
/// # Examples
///
/// ```
/// use dreamlog::errors::{AppResult, AppError};
///
/// fn might_fail(text: &str) -> AppResult<String> {
///     if text.trim().is_empty() {
///         return Err(AppError::Validation("Entry text cannot be empty".to_string()));
///     }
///     Ok(text.trim().to_string())
/// }
///
/// assert!(might_fail("  ").is_err());
/// ```
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_app_error_from_io_error() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");

        let app_error: AppError = io_error.into();

        match app_error {
            AppError::Io(inner) => {
                assert_eq!(inner.kind(), io::ErrorKind::NotFound);
            }
            _ => panic!("Expected AppError::Io variant"),
        }
    }

    #[test]
    fn test_app_error_display() {
        let config_error = AppError::Config("Invalid configuration".to_string());
        assert_eq!(
            format!("{}", config_error),
            "Configuration error: Invalid configuration"
        );

        let io_error = io::Error::new(io::ErrorKind::PermissionDenied, "permission denied");
        let app_io_error = AppError::Io(io_error);
        assert_eq!(format!("{}", app_io_error), "I/O error: permission denied");

        let not_found = AppError::NotFound("entry 42".to_string());
        assert_eq!(format!("{}", not_found), "Not found: entry 42");

        let duplicate = AppError::Duplicate("mood 'Tired'".to_string());
        assert_eq!(format!("{}", duplicate), "Already exists: mood 'Tired'");
    }

    #[test]
    fn test_storage_error_variants() {
        let error = StorageError::Backend {
            backend: "file".to_string(),
            message: "disk full".to_string(),
        };
        assert!(format!("{}", error).contains("file store failed"));
        assert!(format!("{}", error).contains("disk full"));

        let error = StorageError::Pending {
            backend: "bridge".to_string(),
        };
        assert!(format!("{}", error).contains("asynchronously"));

        let app_error: AppError = StorageError::Unavailable {
            key: "theme".to_string(),
        }
        .into();
        assert!(format!("{}", app_error).starts_with("Storage error:"));
        assert!(format!("{}", app_error).contains("theme"));
    }

    #[test]
    fn test_parse_error_conversion() {
        let json_error = serde_json::from_str::<Vec<u8>>("{not json").unwrap_err();
        let app_error: AppError = json_error.into();

        match app_error {
            AppError::Parse(_) => {}
            _ => panic!("Expected AppError::Parse variant"),
        }
    }

    #[test]
    fn test_result_combinators() {
        let io_result: Result<(), io::Error> = Err(io::Error::other("test error"));
        let app_result: AppResult<()> = io_result.map_err(AppError::Io);

        assert!(app_result.is_err());
        match app_result {
            Err(AppError::Io(inner)) => {
                assert_eq!(inner.kind(), io::ErrorKind::Other);
            }
            _ => panic!("Expected AppError::Io variant"),
        }
    }
}
