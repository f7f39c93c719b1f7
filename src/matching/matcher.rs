//! Intent matcher
//!
//! Scans every pattern of every intent and keeps the single best score.

use tracing::debug;

use crate::matching::normalize::normalize;
use crate::matching::similarity::similarity;
use crate::models::intent::{Intent, IntentStore};

/// Best-scoring intent for an utterance
#[derive(Debug, Clone, PartialEq)]
pub struct IntentMatch<'a> {
    /// The winning intent
    pub intent: &'a Intent,

    /// Similarity of the winning pattern (0.0 to 1.0)
    pub score: f64,

    /// Index of the winning pattern within `intent.patterns`
    pub pattern_index: usize,
}

impl IntentMatch<'_> {
    pub fn pattern(&self) -> &str {
        &self.intent.patterns[self.pattern_index]
    }
}

/// Returns the highest-scoring intent when its score reaches `threshold`.
///
/// Replacement is strict-greater, so on equal scores the intent that appears
/// first in the store wins. The cost is a full scan over all patterns; this is
/// meant for stores of a few hundred patterns, not large corpora.
pub fn match_intent<'a>(
    utterance: &str,
    store: &'a IntentStore,
    threshold: f64,
) -> Option<IntentMatch<'a>> {
    let best = best_candidate(utterance, store)?;

    if best.score >= threshold {
        debug!(
            tag = %best.intent.tag,
            score = best.score,
            pattern = %best.pattern(),
            "intent matched"
        );
        Some(best)
    } else {
        debug!(
            tag = %best.intent.tag,
            score = best.score,
            threshold,
            "best intent below threshold"
        );
        None
    }
}

/// Highest-scoring intent regardless of threshold.
///
/// Returns `None` only when no pattern shares a single character with the
/// utterance.
pub fn best_candidate<'a>(utterance: &str, store: &'a IntentStore) -> Option<IntentMatch<'a>> {
    let processed = normalize(utterance);
    let mut best: Option<IntentMatch<'a>> = None;

    for intent in store {
        for (pattern_index, pattern) in intent.patterns.iter().enumerate() {
            let score = similarity(&processed, &normalize(pattern));
            let current = best.as_ref().map_or(0.0, |m| m.score);
            if score > current {
                best = Some(IntentMatch {
                    intent,
                    score,
                    pattern_index,
                });
            }
        }
    }

    best
}
