// src/core/matching/similarity.rs
use crate::core::identity::biometric::FeatureVector;

/// Cosine similarity remapped from [-1, 1] to [0, 1].
///
/// A zero-norm vector carries no signal and scores 0.0 against anything.
pub fn similarity(a: &FeatureVector, b: &FeatureVector) -> f64 {
    match cosine_similarity(a.as_slice(), b.as_slice()) {
        Some(cosine) => ((cosine + 1.0) / 2.0).clamp(0.0, 1.0),
        None => 0.0,
    }
}

/// Raw cosine similarity, or `None` when either side has zero norm or the
/// lengths differ.
///
/// Each side is divided by its largest magnitude first, so finite inputs
/// near `f64::MAX` or `f64::MIN_POSITIVE` cannot overflow or underflow the sums.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> Option<f64> {
    if a.len() != b.len() {
        return None;
    }

    let scale_a = max_abs(a);
    let scale_b = max_abs(b);
    if !(scale_a > 0.0 && scale_b > 0.0) || !scale_a.is_finite() || !scale_b.is_finite() {
        return None;
    }

    let (dot, norm_a, norm_b) = a.iter().zip(b).fold((0.0, 0.0, 0.0), |(dot, na, nb), (x, y)| {
        let (x, y) = (x / scale_a, y / scale_b);
        (dot + x * y, na + x * x, nb + y * y)
    });

    let cosine = dot / (norm_a.sqrt() * norm_b.sqrt());
    cosine.is_finite().then(|| cosine.clamp(-1.0, 1.0))
}

fn max_abs(values: &[f64]) -> f64 {
    values.iter().fold(0.0_f64, |max, x| max.max(x.abs()))
}
