//! Error types for vnotes.
//!
//! The first four variants are *local* failures: the operation is aborted before any
//! state changes and the caller reports them to the user. Storage failures are handled
//! inside the persistence engine by falling back to the next tier; they only surface
//! here when there is nothing left to fall back to.

use crate::store::Tier;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VnotesError {
    #[error("{0}")]
    Validation(String),

    #[error("Please wait before performing another action")]
    RateLimited,

    #[error("Maximum {max} notes allowed")]
    CapacityExceeded { max: usize },

    #[error("Note not found: {0}")]
    NotFound(String),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Data verification failed after save ({tier} storage)")]
    PersistenceVerifyFailed { tier: Tier },

    #[error("Invalid backup format: {0}")]
    ImportFormat(String),

    #[error("Could not generate a unique note id after {attempts} attempts")]
    IdCollision { attempts: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),
}

impl VnotesError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn storage_unavailable(message: impl Into<String>) -> Self {
        Self::StorageUnavailable(message.into())
    }

    pub fn import_format(message: impl Into<String>) -> Self {
        Self::ImportFormat(message.into())
    }

    /// Local errors abort an operation without touching state and are not worth logging
    /// above debug level.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::RateLimited | Self::CapacityExceeded { .. } | Self::NotFound(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, VnotesError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_message_names_the_limit() {
        let err = VnotesError::CapacityExceeded { max: 100 };
        assert_eq!(err.to_string(), "Maximum 100 notes allowed");
    }

    #[test]
    fn verify_failure_names_the_tier() {
        let err = VnotesError::PersistenceVerifyFailed {
            tier: Tier::Durable,
        };
        assert!(err.to_string().contains("durable"));
    }

    #[test]
    fn local_errors_are_classified() {
        assert!(VnotesError::RateLimited.is_local());
        assert!(VnotesError::NotFound("x".into()).is_local());
        assert!(VnotesError::validation("Title is required").is_local());
        assert!(VnotesError::CapacityExceeded { max: 1 }.is_local());
        assert!(!VnotesError::storage_unavailable("full").is_local());
        assert!(!VnotesError::import_format("nope").is_local());
    }

    #[test]
    fn from_serde_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: VnotesError = json_err.into();
        assert!(matches!(err, VnotesError::Serialization(_)));
    }
}
