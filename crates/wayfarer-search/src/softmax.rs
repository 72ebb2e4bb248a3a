//! Softmax weighting and sampling over candidate similarities

use rand::distr::weighted::WeightedIndex;
use rand::distr::Distribution;
use rand::Rng;

/// Softmax of `scores`, subtracting the maximum first for numerical stability
///
/// Returns an empty vector for empty input. Non-finite scores make the
/// result meaningless; callers only pass cosine similarities.
pub fn softmax(scores: &[f64]) -> Vec<f64> {
    if scores.is_empty() {
        return Vec::new();
    }

    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exp_scores: Vec<f64> = scores.iter().map(|&s| (s - max).exp()).collect();

    // The max element contributes exp(0) = 1, so the sum is at least 1
    let sum: f64 = exp_scores.iter().sum();
    exp_scores.iter().map(|&e| e / sum).collect()
}

/// Draw one index with probability proportional to the softmax of `scores`
///
/// Returns `None` only when `scores` is empty.
pub fn sample_index<R: Rng + ?Sized>(scores: &[f64], rng: &mut R) -> Option<usize> {
    let weights = softmax(scores);
    match WeightedIndex::new(&weights) {
        Ok(dist) => Some(dist.sample(rng)),
        // Only reachable with NaN scores; fall back to the first candidate
        Err(_) => (!scores.is_empty()).then_some(0),
    }
}
