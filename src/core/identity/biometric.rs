// src/core/identity/biometric.rs
use std::sync::Arc;

use rand::{rngs::StdRng, Rng, SeedableRng};
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};
use sha3::{Digest, Sha3_256};

use crate::utils::error::{BiometricError, Result};

pub const FEATURE_DIMENSION: usize = 128;

/// Fixed-length feature vector. Construction enforces the dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct FeatureVector(Vec<f64>);

impl FeatureVector {
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn zeros() -> Self {
        Self(vec![0.0; FEATURE_DIMENSION])
    }
}

impl TryFrom<Vec<f64>> for FeatureVector {
    type Error = BiometricError;

    fn try_from(values: Vec<f64>) -> Result<Self> {
        if values.len() != FEATURE_DIMENSION {
            return Err(BiometricError::MalformedTemplate(format!(
                "expected {} values, found {}",
                FEATURE_DIMENSION,
                values.len()
            )));
        }
        if let Some(pos) = values.iter().position(|v| !v.is_finite()) {
            return Err(BiometricError::MalformedTemplate(format!(
                "non-finite value at position {}",
                pos
            )));
        }
        Ok(Self(values))
    }
}

impl From<FeatureVector> for Vec<f64> {
    fn from(vector: FeatureVector) -> Self {
        vector.0
    }
}

/// Source of feature vectors for a capture event.
///
/// The seeded implementation stands in for a sensor pipeline; a real
/// extractor can be plugged in without touching scoring or matching.
pub trait FeatureSynthesizer: Send + Sync {
    fn synthesize(&self, sample_id: &str) -> Result<FeatureVector>;
}

/// Deterministic standard-normal features seeded from the sample id.
#[derive(Debug, Default, Clone, Copy)]
pub struct SeededSynthesizer;

impl SeededSynthesizer {
    fn seed_for(sample_id: &str) -> u64 {
        let digest = Sha3_256::digest(sample_id.as_bytes());
        let mut seed = [0u8; 8];
        seed.copy_from_slice(&digest[..8]);
        u64::from_le_bytes(seed)
    }
}

impl FeatureSynthesizer for SeededSynthesizer {
    fn synthesize(&self, sample_id: &str) -> Result<FeatureVector> {
        let mut rng = StdRng::seed_from_u64(Self::seed_for(sample_id));
        let values: Vec<f64> = (0..FEATURE_DIMENSION)
            .map(|_| rng.sample::<f64, _>(StandardNormal))
            .collect();
        FeatureVector::try_from(values)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedTemplate {
    pub hash: String,
    pub vector: FeatureVector,
    pub serialized: String,
}

pub struct TemplateGenerator {
    synthesizer: Arc<dyn FeatureSynthesizer>,
}

impl Default for TemplateGenerator {
    fn default() -> Self {
        Self::new(Arc::new(SeededSynthesizer))
    }
}

impl TemplateGenerator {
    pub fn new(synthesizer: Arc<dyn FeatureSynthesizer>) -> Self {
        Self { synthesizer }
    }

    pub fn generate(&self, sample_id: &str) -> Result<GeneratedTemplate> {
        if sample_id.trim().is_empty() {
            return Err(BiometricError::InvalidInput("sample id must not be empty".into()));
        }

        let vector = self.synthesizer.synthesize(sample_id)?;
        let serialized = serialize_features(&vector)?;
        let hash = template_hash(&serialized);

        Ok(GeneratedTemplate {
            hash,
            vector,
            serialized,
        })
    }

    pub fn extract_features(&self, serialized: &str) -> Result<FeatureVector> {
        let values: Vec<f64> = serde_json::from_str(serialized)
            .map_err(|e| BiometricError::MalformedTemplate(e.to_string()))?;
        FeatureVector::try_from(values)
    }

    pub fn verify_integrity(&self, serialized: &str, hash: &str) -> bool {
        template_hash(serialized).eq_ignore_ascii_case(hash)
    }
}

/// Canonical serialization: ordered JSON array with round-trip float formatting.
pub fn serialize_features(vector: &FeatureVector) -> Result<String> {
    serde_json::to_string(vector.as_slice())
        .map_err(|e| BiometricError::MalformedTemplate(e.to_string()))
}

/// Lowercase hex SHA3-256 of the canonical serialization.
pub fn template_hash(serialized: &str) -> String {
    hex::encode(Sha3_256::digest(serialized.as_bytes()))
}
