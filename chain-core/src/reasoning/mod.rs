//! Bounded inference-chain search.
//!
//! A premise is expanded breadth-first into a tree of [`InferenceStep`]s.
//! Each step is derived from its parent by a rule template whose base
//! confidence decays with depth. Low-confidence candidates are discarded,
//! repeated conclusions become circular-reference markers, and finished
//! chains are checked for contradictions before being scored.
//!
//! ## Core Concepts
//!
//! - **RuleMatcher**: Maps a conclusion to candidate [`Template`]s
//! - **ChainExplorer**: Breadth-first expansion under depth and step ceilings
//! - **ChainValidator**: Contradictions, penalties and aggregate confidence
//! - **ChainScorer**: Ranks competing chains
//! - **AlternativePlan**: Category-biased re-exploration of weak premises
//!
//! ## Example
//!
//! ```rust,ignore
//! use chain_core::reasoning::{
//!     ChainExplorer, ChainValidator, ExplorationLimits, InferenceChain, PatternRuleSet,
//!     PRIMARY_STEP_LIMIT,
//! };
//!
//! let rules = PatternRuleSet::new();
//! let explorer = ChainExplorer::new(&rules, ExplorationLimits::new(15, PRIMARY_STEP_LIMIT, 0.1));
//!
//! let mut chain = InferenceChain::new("All humans are mortal", None);
//! explorer.explore(&mut chain);
//! ChainValidator::new().validate(&mut chain);
//!
//! for step in chain.path_to(chain.reasoning_path.last().unwrap()) {
//!     println!("{} ({:.2})", step.conclusion, step.confidence);
//! }
//! ```

mod alternatives;
mod chain;
mod contradiction;
mod explorer;
mod rules;
mod scorer;
mod step;
mod types;
mod validator;

#[cfg(test)]
mod proptest;

pub use alternatives::{
    alternative_count, needs_alternatives, AlternativePlan, StrategyBias, ALTERNATIVE_DEPTH_CAP,
    BIAS_MULTIPLIER, MAX_ALTERNATIVES, THRESHOLD_MULTIPLIER,
};
pub use chain::InferenceChain;
pub use contradiction::{contradicts, fallacy_in, ContradictionDetector};
pub use explorer::{
    ChainExplorer, ExplorationLimits, ExplorationReport, StopReason, ALTERNATIVE_STEP_LIMIT,
    PRIMARY_STEP_LIMIT,
};
pub use rules::{PatternRuleSet, RuleMatcher, Template};
pub use scorer::ChainScorer;
pub use step::{decay, validate_template, StepBuilder, DECAY_FLOOR, DECAY_PER_DEPTH};
pub use types::{
    ChainId, ChainStrategy, Contradiction, ContradictionKind, InferenceStep, ReasoningCategory,
    StepId, StepStatus, CIRCULAR_REFERENCE_PATTERN, ROOT_PATTERN,
};
pub use validator::{
    geometric_mean, penalty_for, ChainValidator, CIRCULAR_PENALTY, CONTRADICTION_PENALTY,
    VALIDITY_FLOOR,
};
