//! Chain validation: penalties, aggregate confidence and validity.

use crate::reasoning::chain::InferenceChain;
use crate::reasoning::contradiction::ContradictionDetector;

/// Penalty removed per contradiction.
pub const CONTRADICTION_PENALTY: f64 = 0.2;

/// Flat multiplier once any circular reference exists.
pub const CIRCULAR_PENALTY: f64 = 0.5;

/// Chains whose penalty does not exceed this are invalid.
pub const VALIDITY_FLOOR: f64 = 0.3;

/// Geometric mean of the values; 0 for an empty input or any non-positive value.
pub fn geometric_mean(values: &[f64]) -> f64 {
    if values.is_empty() || values.iter().any(|v| *v <= 0.0) {
        return 0.0;
    }
    let log_sum: f64 = values.iter().map(|v| v.ln()).sum();
    (log_sum / values.len() as f64).exp()
}

/// Penalty factor for the given finding counts.
pub fn penalty_for(contradictions: usize, circular: usize) -> f64 {
    let mut penalty = 1.0;
    if contradictions > 0 {
        penalty *= 1.0 - (contradictions as f64 * CONTRADICTION_PENALTY).min(1.0);
    }
    if circular > 0 {
        penalty *= CIRCULAR_PENALTY;
    }
    penalty
}

/// Runs contradiction detection and recomputes a chain's aggregates.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChainValidator {
    detector: ContradictionDetector,
}

impl ChainValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate in place. Running it twice gives the same result.
    pub fn validate(&self, chain: &mut InferenceChain) {
        chain.contradictions_found = self.detector.detect(chain);

        let penalty = penalty_for(chain.contradiction_count(), chain.circular_count());
        let confidences: Vec<f64> = chain.completed_steps().map(|s| s.confidence).collect();

        chain.penalty = penalty;
        chain.total_confidence = geometric_mean(&confidences) * penalty;
        chain.chain_valid = penalty > VALIDITY_FLOOR;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reasoning::types::{InferenceStep, ReasoningCategory, StepId, StepStatus};

    fn child(parent: &InferenceStep, conclusion: &str, confidence: f64) -> InferenceStep {
        InferenceStep {
            id: StepId::new(),
            premise: parent.conclusion.clone(),
            conclusion: conclusion.to_string(),
            category: ReasoningCategory::Deductive,
            pattern_id: "test".to_string(),
            rationale: String::new(),
            confidence,
            depth: parent.depth + 1,
            parent_id: Some(parent.id),
            children_ids: Vec::new(),
            status: StepStatus::Completed,
            circular: false,
        }
    }

    #[test]
    fn test_geometric_mean() {
        assert_eq!(geometric_mean(&[]), 0.0);
        assert!((geometric_mean(&[1.0, 0.25]) - 0.5).abs() < 1e-12);
        assert_eq!(geometric_mean(&[0.9, 0.0]), 0.0);
    }

    #[test]
    fn test_penalty_for() {
        assert_eq!(penalty_for(0, 0), 1.0);
        assert!((penalty_for(1, 0) - 0.8).abs() < 1e-12);
        assert!((penalty_for(2, 3) - 0.3).abs() < 1e-12);
        assert_eq!(penalty_for(7, 0), 0.0);
    }

    #[test]
    fn test_clean_chain() {
        let mut chain = InferenceChain::new("P", None);
        let root = chain.root().clone();
        chain.push_step(child(&root, "Q", 0.81));

        ChainValidator::new().validate(&mut chain);
        assert!(chain.chain_valid);
        assert_eq!(chain.penalty, 1.0);
        assert!((chain.total_confidence - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_circular_halves_confidence() {
        let mut chain = InferenceChain::new("P", None);
        let root = chain.root().clone();
        chain.push_step(child(&root, "Q", 0.81));
        chain.push_circular(InferenceStep::circular_reference(&root, "P"));

        ChainValidator::new().validate(&mut chain);
        assert_eq!(chain.penalty, 0.5);
        assert!((chain.total_confidence - 0.45).abs() < 1e-9);
        assert!(chain.chain_valid);
    }

    #[test]
    fn test_contradictions_invalidate() {
        let mut chain = InferenceChain::new("P", None);
        let root = chain.root().clone();
        chain.push_step(child(&root, "A is true", 0.9));
        chain.push_step(child(&root, "A is false", 0.9));
        chain.push_step(child(&root, "B is possible", 0.9));
        chain.push_step(child(&root, "B is impossible", 0.9));
        chain.push_circular(InferenceStep::circular_reference(&root, "P"));

        let validator = ChainValidator::new();
        validator.validate(&mut chain);
        assert_eq!(chain.contradiction_count(), 2);
        // (1 - 0.4) * 0.5 = 0.3, not above the floor
        assert!((chain.penalty - 0.3).abs() < 1e-12);
        assert!(!chain.chain_valid);

        let before = chain.total_confidence;
        validator.validate(&mut chain);
        assert_eq!(chain.total_confidence, before);
        assert_eq!(chain.contradiction_count(), 2);
    }
}
