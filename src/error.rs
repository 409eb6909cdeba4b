//! Error types for the Crisis Copilot core.
//!
//! Store operations report [`StoreError`]; the persistence codec uses
//! [`PersistenceError`] internally but never hands it to callers of
//! `save`/`load`.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, StoreError>;

/// Rejections raised by [`crate::state::Store`] mutations.
///
/// A rejected mutation leaves the current snapshot untouched and triggers
/// neither persistence nor subscriber notification.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Journal entry text must not be empty")]
    EmptyJournalEntry,

    #[error("No trusted contact with id {0}")]
    UnknownContact(String),
}

/// Failures inside the persistence codec.
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize state: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("Failed to parse stored state: {0}")]
    Deserialize(#[source] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_messages() {
        assert_eq!(
            StoreError::InvalidArgument("unknown theme: neon".to_string()).to_string(),
            "Invalid argument: unknown theme: neon"
        );
        assert_eq!(
            StoreError::UnknownContact("42".to_string()).to_string(),
            "No trusted contact with id 42"
        );
    }

    #[test]
    fn test_persistence_error_from_io() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        let err: PersistenceError = io.into();
        assert!(matches!(err, PersistenceError::Io(_)));
        assert!(err.to_string().contains("read-only"));
    }
}
