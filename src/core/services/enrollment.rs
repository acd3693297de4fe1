// src/core/services/enrollment.rs
use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{
    core::identity::{
        biometric::TemplateGenerator,
        types::{EnrollmentFailure, EnrollmentResult, EnrollmentStatus, IdentityHandle},
    },
    storage::{IdentityStore, StorageError},
    utils::error::{BiometricError, Result},
};

/// Registers identities and captures their enrollment templates.
pub struct EnrollmentService {
    store: Arc<dyn IdentityStore>,
    generator: Arc<TemplateGenerator>,
}

impl EnrollmentService {
    pub fn new(store: Arc<dyn IdentityStore>, generator: Arc<TemplateGenerator>) -> Self {
        Self { store, generator }
    }

    pub async fn enroll(
        &self,
        username: &str,
        email: &str,
        sample_count: usize,
    ) -> Result<EnrollmentResult> {
        validate_field("username", username)?;
        validate_field("email", email)?;
        if sample_count == 0 {
            return Err(BiometricError::InvalidInput("sample count must be at least 1".into()));
        }

        if self.store.lookup_identity(username).await?.is_some() {
            warn!(username, "Enrollment rejected: identity already exists");
            return Ok(EnrollmentResult::rejected(
                EnrollmentFailure::IdentityAlreadyExists,
                format!("User {} already exists", username),
                sample_count,
            ));
        }

        let identity = match self.store.create_identity(username, email).await {
            Ok(record) => record,
            Err(StorageError::Duplicate { field, value }) => {
                warn!(username, field, "Enrollment rejected: registration failed");
                return Ok(EnrollmentResult::rejected(
                    EnrollmentFailure::RegistrationFailed,
                    format!("Failed to create user: {} {} is already registered", field, value),
                    sample_count,
                ));
            }
            Err(e) => return Err(e.into()),
        };

        info!(username, identity = %identity.handle, "Identity registered");

        // A fresh uuid per call keeps re-enrollments of a name from
        // reproducing earlier templates.
        let batch = Uuid::new_v4();
        let mut sample_ids = Vec::with_capacity(sample_count);
        let mut failure = None;

        for n in 1..=sample_count {
            let sample_id = format!("{}_sample_{}_{}", username, n, batch);
            let template = match self.generator.generate(&sample_id) {
                Ok(template) => template,
                Err(e) => {
                    error!(username, sample = n, "Template generation failed: {}", e);
                    failure = Some(e.to_string());
                    break;
                }
            };

            if let Err(e) = self
                .store
                .store_template(identity.handle, &template.hash, &template.serialized)
                .await
            {
                error!(username, sample = n, "Template write failed: {}", e);
                failure = Some(e.to_string());
                break;
            }
            sample_ids.push(sample_id);
        }

        let templates_stored = sample_ids.len();
        let completed_at = Utc::now();

        if let Some(cause) = failure {
            return Ok(EnrollmentResult {
                success: false,
                message: format!(
                    "User {} enrolled partially: stored {} of {} fingerprint samples ({})",
                    username, templates_stored, sample_count, cause
                ),
                identity: Some(identity.handle),
                templates_stored,
                templates_requested: sample_count,
                sample_ids,
                completed_at,
                failure: Some(EnrollmentFailure::PartialEnrollment),
            });
        }

        info!(username, templates_stored, "Enrollment complete");
        Ok(EnrollmentResult {
            success: true,
            message: format!(
                "User {} enrolled successfully with {} fingerprint samples",
                username, templates_stored
            ),
            identity: Some(identity.handle),
            templates_stored,
            templates_requested: sample_count,
            sample_ids,
            completed_at,
            failure: None,
        })
    }

    pub async fn status(&self, username: &str) -> Result<EnrollmentStatus> {
        let identity = match self.store.lookup_identity(username).await? {
            Some(identity) => identity,
            None => {
                return Ok(EnrollmentStatus {
                    enrolled: false,
                    message: "User not found".to_string(),
                    username: username.to_string(),
                    identity: None,
                    templates_stored: 0,
                })
            }
        };

        let templates_stored = self.store.fetch_templates(identity.handle).await?.len();
        Ok(EnrollmentStatus {
            enrolled: templates_stored > 0,
            message: format!("{} fingerprint samples stored", templates_stored),
            username: username.to_string(),
            identity: Some(identity.handle),
            templates_stored,
        })
    }

    pub async fn list_identities(&self) -> Result<Vec<(IdentityHandle, String)>> {
        Ok(self.store.list_identities().await?)
    }
}

fn validate_field(name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(BiometricError::InvalidInput(format!("{} must not be empty", name)));
    }
    Ok(())
}
