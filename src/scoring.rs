//! Scoring functions for playlist matching.
//!
//! This module contains:
//! - Keyword-set overlap scoring (recall / Jaccard / precision blend)
//! - Plain string similarity for the filename short-circuit tiers

use rustc_hash::FxHashSet;

use crate::models::KeywordSet;

// ============================================================================
// Score Weights
// ============================================================================

/// Share of the query's keywords found in the candidate.
pub const RECALL_WEIGHT: f64 = 0.50;

/// Overlap relative to the union of both sets.
pub const JACCARD_WEIGHT: f64 = 0.30;

/// Share of the candidate's keywords found in the query.
pub const PRECISION_WEIGHT: f64 = 0.20;

// ============================================================================
// Keyword Overlap
// ============================================================================

/// Similarity of a query keyword set to a target keyword set, in [0, 1].
///
/// Recall-heavy: a candidate covering most of the query wins, while the
/// precision term still penalizes candidates with many unrelated keywords.
pub fn score(query: &KeywordSet, target: &KeywordSet) -> f64 {
    let common = query.intersection(target).count();
    if common == 0 || target.is_empty() {
        return 0.0;
    }

    let c = common as f64;
    let q = query.len() as f64;
    let t = target.len() as f64;

    let recall = c / q;
    let jaccard = c / (q + t - c);
    let precision = c / t;

    RECALL_WEIGHT * recall + JACCARD_WEIGHT * jaccard + PRECISION_WEIGHT * precision
}

// ============================================================================
// String Similarity
// ============================================================================

/// Compute similarity between two normalized strings (0.0 to 1.0).
///
/// 1.0 for equal strings, length ratio when one contains the other,
/// otherwise Jaccard similarity on character sets.
pub fn string_similarity(a: &str, b: &str) -> f64 {
    if a == b {
        return 1.0;
    }

    let (shorter, longer) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    if longer.contains(shorter) {
        return shorter.len() as f64 / longer.len() as f64;
    }

    let chars_a: FxHashSet<char> = a.chars().collect();
    let chars_b: FxHashSet<char> = b.chars().collect();
    let union = chars_a.union(&chars_b).count();
    if union == 0 {
        return 0.0;
    }

    chars_a.intersection(&chars_b).count() as f64 / union as f64
}
