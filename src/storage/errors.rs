// src/storage/errors.rs
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Duplicate {field}: {value}")]
    Duplicate { field: &'static str, value: String },

    #[error("Unknown identity: {0}")]
    UnknownIdentity(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<serde_json::Error> for StorageError {
    fn from(error: serde_json::Error) -> Self {
        StorageError::InvalidFormat(error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, StorageError>;
