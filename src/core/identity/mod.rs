pub mod biometric;
pub mod types;

pub use biometric::{FeatureSynthesizer, FeatureVector, GeneratedTemplate, SeededSynthesizer, TemplateGenerator, FEATURE_DIMENSION};
pub use types::*;
