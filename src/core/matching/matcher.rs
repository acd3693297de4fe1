// src/core/matching/matcher.rs
use serde::{Deserialize, Serialize};

use super::similarity::similarity;
use crate::core::identity::biometric::FeatureVector;
use crate::utils::error::{BiometricError, Result};

pub const DEFAULT_MATCH_THRESHOLD: f64 = 0.85;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchOutcome {
    pub accepted: bool,
    /// Best similarity scaled to [0, 100].
    pub percentage: f64,
    /// Position of the best-scoring stored vector. Any maximum may be reported on ties.
    pub best_index: Option<usize>,
}

impl MatchOutcome {
    fn no_match() -> Self {
        Self {
            accepted: false,
            percentage: 0.0,
            best_index: None,
        }
    }
}

/// Best-of-N matcher: a live sample needs to resemble one enrolled sample.
#[derive(Debug, Clone, Copy)]
pub struct Matcher {
    threshold: f64,
}

impl Default for Matcher {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_MATCH_THRESHOLD,
        }
    }
}

impl Matcher {
    pub fn new(threshold: f64) -> Result<Self> {
        if !(threshold > 0.0 && threshold <= 1.0) {
            return Err(BiometricError::InvalidInput(format!(
                "match threshold must be in (0, 1], got {}",
                threshold
            )));
        }
        Ok(Self { threshold })
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn match_sample(&self, live: &FeatureVector, stored: &[FeatureVector]) -> MatchOutcome {
        let best = stored
            .iter()
            .enumerate()
            .map(|(index, candidate)| (index, similarity(live, candidate)))
            .fold(None, |best: Option<(usize, f64)>, (index, score)| match best {
                Some((_, top)) if top >= score => best,
                _ => Some((index, score)),
            });

        let Some((index, score)) = best else {
            return MatchOutcome::no_match();
        };

        MatchOutcome {
            accepted: score >= self.threshold,
            percentage: (score * 100.0).clamp(0.0, 100.0),
            best_index: Some(index),
        }
    }
}
