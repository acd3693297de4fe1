// src/core/services/authentication.rs
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    core::{
        identity::{
            biometric::{FeatureVector, TemplateGenerator},
            types::{AttemptRecord, AuthFailure, AuthResult, IdentityHandle, LiveSample, StoredTemplate},
        },
        matching::matcher::Matcher,
    },
    storage::IdentityStore,
    utils::error::{BiometricError, Result},
};

pub struct AuthenticationService {
    store: Arc<dyn IdentityStore>,
    generator: Arc<TemplateGenerator>,
    matcher: Matcher,
    verify_integrity: bool,
}

impl AuthenticationService {
    pub fn new(
        store: Arc<dyn IdentityStore>,
        generator: Arc<TemplateGenerator>,
        matcher: Matcher,
        verify_integrity: bool,
    ) -> Self {
        Self {
            store,
            generator,
            matcher,
            verify_integrity,
        }
    }

    pub async fn authenticate(&self, username: &str, live_sample: Option<LiveSample>) -> Result<AuthResult> {
        let identity = match self.store.lookup_identity(username).await? {
            Some(identity) => identity,
            None => {
                info!(username, "Authentication rejected: user not found");
                return Ok(AuthResult::rejected(username, AuthFailure::UserNotFound, "User not found"));
            }
        };

        let stored = self.store.fetch_templates(identity.handle).await?;
        if stored.is_empty() {
            warn!(username, "Authentication rejected: no templates enrolled");
            self.store.append_attempt(identity.handle, false, None).await?;
            return Ok(AuthResult::rejected(
                username,
                AuthFailure::NoEnrollment,
                "No fingerprints enrolled for this user",
            ));
        }

        let (live, enrolled) = match self.collect_features(username, live_sample, &stored) {
            Ok(features) => features,
            Err(e) => {
                self.record_aborted(identity.handle, &e).await;
                return Err(e);
            }
        };

        let outcome = self.matcher.match_sample(&live, &enrolled);
        debug!(username, best_index = ?outcome.best_index, "Matcher finished");

        self.store
            .append_attempt(identity.handle, outcome.accepted, Some(outcome.percentage))
            .await?;

        let match_percentage = round_percentage(outcome.percentage);
        info!(username, accepted = outcome.accepted, match_percentage, "Authentication attempt recorded");

        Ok(AuthResult {
            success: outcome.accepted,
            message: if outcome.accepted { "Access Granted" } else { "Access Denied" }.to_string(),
            match_percentage,
            username: username.to_string(),
            timestamp: Utc::now(),
            failure: (!outcome.accepted).then_some(AuthFailure::NoMatch),
        })
    }

    pub async fn history(&self, username: &str, limit: usize) -> Result<Vec<AttemptRecord>> {
        match self.store.lookup_identity(username).await? {
            Some(identity) => Ok(self.store.fetch_attempts(identity.handle, limit).await?),
            None => Ok(Vec::new()),
        }
    }

    fn collect_features(
        &self,
        username: &str,
        live_sample: Option<LiveSample>,
        stored: &[StoredTemplate],
    ) -> Result<(FeatureVector, Vec<FeatureVector>)> {
        let live = match live_sample {
            Some(LiveSample::Identifier(sample_id)) => self.generator.generate(&sample_id)?.vector,
            Some(LiveSample::Serialized(serialized)) => self.generator.extract_features(&serialized)?,
            None => {
                let sample_id = format!("{}_auth_{}", username, Uuid::new_v4());
                self.generator.generate(&sample_id)?.vector
            }
        };

        // Any bad template aborts the attempt; skipping it would quietly
        // narrow the match set.
        let enrolled = stored
            .iter()
            .enumerate()
            .map(|(index, template)| {
                if self.verify_integrity
                    && !self.generator.verify_integrity(&template.serialized_vector, &template.hash)
                {
                    return Err(BiometricError::IntegrityMismatch { index });
                }
                self.generator.extract_features(&template.serialized_vector)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok((live, enrolled))
    }

    async fn record_aborted(&self, identity: IdentityHandle, cause: &BiometricError) {
        warn!(identity = %identity, "Authentication aborted: {}", cause);
        if let Err(e) = self.store.append_attempt(identity, false, None).await {
            warn!(identity = %identity, "Failed to record aborted attempt: {}", e);
        }
    }
}

fn round_percentage(percentage: f64) -> f64 {
    (percentage * 100.0).round() / 100.0
}
