// src/utils/error.rs
use thiserror::Error;

use crate::storage::StorageError;

#[derive(Debug, Error)]
pub enum BiometricError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Malformed template: {0}")]
    MalformedTemplate(String),

    #[error("Template integrity check failed for stored template #{index}")]
    IntegrityMismatch { index: usize },

    #[error("Identity already exists: {0}")]
    IdentityAlreadyExists(String),

    #[error("Registration failed: {0}")]
    RegistrationFailed(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("No templates enrolled for: {0}")]
    NoEnrollment(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

pub type Result<T> = std::result::Result<T, BiometricError>;
