// src/core/identity/types.rs
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::utils::error::BiometricError;

/// Opaque handle identifying a registered identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentityHandle(Uuid);

impl IdentityHandle {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for IdentityHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for IdentityHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentityRecord {
    pub handle: IdentityHandle,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl IdentityRecord {
    pub fn new(username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            handle: IdentityHandle::new(),
            username: username.into(),
            email: email.into(),
            created_at: Utc::now(),
        }
    }
}

/// A template as held by the store: hash plus canonical serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredTemplate {
    pub identity: IdentityHandle,
    pub hash: String,
    pub serialized_vector: String,
    pub enrolled_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub identity: IdentityHandle,
    pub timestamp: DateTime<Utc>,
    pub success: bool,
    /// `None` when the identity had no templates at the time of the attempt.
    pub match_percentage: Option<f64>,
}

/// Live input presented at authentication time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum LiveSample {
    /// Capture identifier, run through the template generator.
    Identifier(String),
    /// Canonically serialized feature vector.
    Serialized(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrollmentFailure {
    IdentityAlreadyExists,
    RegistrationFailed,
    PartialEnrollment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthFailure {
    UserNotFound,
    NoEnrollment,
    NoMatch,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrollmentResult {
    pub success: bool,
    pub message: String,
    pub identity: Option<IdentityHandle>,
    pub templates_stored: usize,
    pub templates_requested: usize,
    pub sample_ids: Vec<String>,
    pub completed_at: DateTime<Utc>,
    pub failure: Option<EnrollmentFailure>,
}

impl EnrollmentResult {
    pub(crate) fn rejected(failure: EnrollmentFailure, message: String, requested: usize) -> Self {
        Self {
            success: false,
            message,
            identity: None,
            templates_stored: 0,
            templates_requested: requested,
            sample_ids: Vec::new(),
            completed_at: Utc::now(),
            failure: Some(failure),
        }
    }

    /// Converts a failed enrollment into the matching error kind.
    pub fn into_result(self) -> crate::utils::error::Result<Self> {
        match self.failure {
            None => Ok(self),
            Some(EnrollmentFailure::IdentityAlreadyExists) => {
                Err(BiometricError::IdentityAlreadyExists(self.message))
            }
            Some(EnrollmentFailure::RegistrationFailed)
            | Some(EnrollmentFailure::PartialEnrollment) => {
                Err(BiometricError::RegistrationFailed(self.message))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrollmentStatus {
    pub enrolled: bool,
    pub message: String,
    pub username: String,
    pub identity: Option<IdentityHandle>,
    pub templates_stored: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthResult {
    pub success: bool,
    pub message: String,
    pub match_percentage: f64,
    pub username: String,
    pub timestamp: DateTime<Utc>,
    pub failure: Option<AuthFailure>,
}

impl AuthResult {
    pub(crate) fn rejected(username: &str, failure: AuthFailure, message: &str) -> Self {
        Self {
            success: false,
            message: message.to_string(),
            match_percentage: 0.0,
            username: username.to_string(),
            timestamp: Utc::now(),
            failure: Some(failure),
        }
    }

    /// Converts lookup failures into errors. A plain rejection stays a value.
    pub fn into_result(self) -> crate::utils::error::Result<Self> {
        match self.failure {
            Some(AuthFailure::UserNotFound) => Err(BiometricError::UserNotFound(self.username)),
            Some(AuthFailure::NoEnrollment) => Err(BiometricError::NoEnrollment(self.username)),
            Some(AuthFailure::NoMatch) | None => Ok(self),
        }
    }
}
