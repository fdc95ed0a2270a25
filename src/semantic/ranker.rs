//! Cosine similarity and ranked result lists.
//!
//! Similarity uses only the first `min(len(a), len(b))` components so
//! vectors from different model generations still compare instead of
//! erroring. Zero-magnitude policy: a zero denominator scores 0.0 via an
//! explicit guard (no epsilon); this is the single place the policy
//! lives, and an empty query therefore produces a uniform-zero,
//! order-preserving ranking rather than a failure.

use crate::catalog::Item;
use crate::semantic::codec;

/// An item with its similarity score and 1-based rank.
///
/// Scores are ephemeral, derived per ranking pass, never persisted.
#[derive(Debug, Clone)]
pub struct ScoredResult {
    pub item: Item,
    /// Cosine similarity, typically within [-1, 1], not clamped
    pub score: f64,
    /// 1-based, assigned after truncation to the requested limit
    pub rank: usize,
}

/// Cosine similarity over the shared prefix of the two vectors.
///
/// Returns 0.0 when either vector is empty or has zero magnitude.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let len = a.len().min(b.len());
    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;

    for i in 0..len {
        let (x, y) = (a[i] as f64, b[i] as f64);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denominator = norm_a.sqrt() * norm_b.sqrt();
    if denominator > 0.0 {
        dot / denominator
    } else {
        0.0
    }
}

/// Score every candidate against the query vector and return the top
/// `limit`, ranked.
///
/// Sort is descending by score and stable: candidates with equal scores
/// keep their input order. Candidates' stored vectors are decoded here;
/// an undecodable or absent vector scores 0.0 like any zero-magnitude
/// one.
pub fn rank(query: &[f32], candidates: Vec<Item>, limit: usize) -> Vec<ScoredResult> {
    let mut results: Vec<ScoredResult> = candidates
        .into_iter()
        .map(|item| {
            let vector = codec::decode(&item.vector);
            let score = cosine_similarity(query, &vector);
            ScoredResult {
                item,
                score,
                rank: 0,
            }
        })
        .collect();

    // Vec::sort_by is stable; ties keep first-seen order
    results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    results.truncate(limit);

    for (i, result) in results.iter_mut().enumerate() {
        result.rank = i + 1;
    }

    results
}
