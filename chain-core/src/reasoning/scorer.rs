//! Ranking competing chains.

use crate::reasoning::chain::InferenceChain;

const W_CONFIDENCE: f64 = 0.4;
const W_DEPTH: f64 = 0.3;
const W_CONSISTENCY: f64 = 0.2;
const W_CIRCULARITY: f64 = 0.1;

/// Depth at which the depth term saturates.
const DEPTH_SATURATION: f64 = 5.0;

/// Weighted ranking of validated chains.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChainScorer;

impl ChainScorer {
    pub fn new() -> Self {
        Self
    }

    /// Score a validated chain.
    ///
    /// `0.4·confidence + 0.3·min(1, depth/5) + 0.2·(1 − 0.1·contradictions)
    /// + 0.1·(1 − 0.05·circular)`
    pub fn score(&self, chain: &InferenceChain) -> f64 {
        W_CONFIDENCE * chain.total_confidence
            + W_DEPTH * (chain.max_depth_reached as f64 / DEPTH_SATURATION).min(1.0)
            + W_CONSISTENCY * (1.0 - 0.1 * chain.contradiction_count() as f64)
            + W_CIRCULARITY * (1.0 - 0.05 * chain.circular_count() as f64)
    }

    /// Index and score of the best chain.
    ///
    /// Only valid chains compete unless none are valid. Ties keep the
    /// earlier chain.
    pub fn select_best(&self, chains: &[InferenceChain]) -> Option<(usize, f64)> {
        let any_valid = chains.iter().any(|c| c.chain_valid);
        let mut best: Option<(usize, f64)> = None;

        for (i, chain) in chains.iter().enumerate() {
            if any_valid && !chain.chain_valid {
                continue;
            }
            let score = self.score(chain);
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((i, score));
            }
        }

        best
    }
}
