//! # chain-core
//!
//! Bounded, explainable inference-chain search.
//!
//! Starting from a premise, the engine expands a tree of reasoning steps
//! breadth-first, decays confidence with depth, discards weak candidates,
//! flags circular logic and contradictions, and ranks the competing chains
//! it finds. A circuit breaker guards the whole pipeline.
//!
//! ## Core Components
//!
//! - **Reasoning**: Steps, chains, rule matching, exploration, validation and scoring
//! - **Engine**: The `infer` façade that never fails outward
//! - **Breaker**: Consecutive-failure circuit breaker with lazy reset
//! - **Stats**: Running counters and averages per engine
//!
//! ## Example
//!
//! ```rust,ignore
//! use chain_core::{EngineConfig, InferenceEngine};
//!
//! let engine = InferenceEngine::new(EngineConfig::default())?;
//! let result = engine.infer("All humans are mortal", None, None);
//!
//! if let Some(chain) = &result.primary_chain {
//!     for id in &chain.reasoning_path {
//!         let step = chain.get_step(id).unwrap();
//!         println!("[{}] {} ({:.2})", step.category, step.conclusion, step.confidence);
//!     }
//! }
//! println!("quality: {:.2}", result.reasoning_quality);
//! ```

pub mod breaker;
pub mod config;
pub mod engine;
pub mod error;
pub mod reasoning;
pub mod stats;

// Re-exports for convenience
pub use breaker::{CircuitBreaker, CircuitBreakerStatus, CircuitState};
pub use config::EngineConfig;
pub use engine::{InferenceEngine, InferenceResult, PerformanceMetrics};
pub use error::{Error, Result};
pub use reasoning::{
    ChainStrategy, Contradiction, ContradictionKind, InferenceChain, InferenceStep,
    PatternRuleSet, ReasoningCategory, RuleMatcher, StepId, StepStatus, Template,
};
pub use stats::PerformanceStats;
