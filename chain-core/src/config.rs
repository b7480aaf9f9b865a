//! Engine configuration.

use crate::error::{Error, Result};
use crate::reasoning::{ALTERNATIVE_STEP_LIMIT, PRIMARY_STEP_LIMIT};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for an [`InferenceEngine`](crate::InferenceEngine).
///
/// Every field has a default, so partial JSON is accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Steps at this depth are not expanded further
    pub max_depth: u32,
    /// Upper bound on chains per query (primary plus alternatives)
    pub max_chains: usize,
    /// Candidates below this confidence are pruned
    pub confidence_threshold: f64,
    /// Soft time budget per `infer` call
    pub max_processing_time_ms: f64,
    /// Advisory consistency target; reported, not enforced
    pub contradiction_threshold: f64,
    /// Consecutive failures that open the circuit breaker
    pub circuit_breaker_threshold: u32,
    /// How long the breaker stays open before the next call may close it
    pub circuit_breaker_cooldown_ms: u64,
    /// Step ceiling for the primary chain
    pub primary_step_limit: usize,
    /// Step ceiling for each alternative chain
    pub alternative_step_limit: usize,
    /// Abort exploration once the time budget is spent
    pub enforce_time_budget: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_depth: 15,
            max_chains: 5,
            confidence_threshold: 0.1,
            max_processing_time_ms: 200.0,
            contradiction_threshold: 0.98,
            circuit_breaker_threshold: 3,
            circuit_breaker_cooldown_ms: 30_000,
            primary_step_limit: PRIMARY_STEP_LIMIT,
            alternative_step_limit: ALTERNATIVE_STEP_LIMIT,
            enforce_time_budget: false,
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_max_chains(mut self, max_chains: usize) -> Self {
        self.max_chains = max_chains;
        self
    }

    pub fn with_confidence_threshold(mut self, threshold: f64) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    pub fn with_time_budget_ms(mut self, budget_ms: f64) -> Self {
        self.max_processing_time_ms = budget_ms;
        self
    }

    pub fn with_circuit_breaker(mut self, threshold: u32, cooldown_ms: u64) -> Self {
        self.circuit_breaker_threshold = threshold;
        self.circuit_breaker_cooldown_ms = cooldown_ms;
        self
    }

    /// Enforce the time budget as a hard deadline.
    pub fn with_enforced_budget(mut self, enforce: bool) -> Self {
        self.enforce_time_budget = enforce;
        self
    }

    pub fn time_budget(&self) -> Duration {
        Duration::from_secs_f64(self.max_processing_time_ms.max(0.0) / 1000.0)
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.circuit_breaker_cooldown_ms)
    }

    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<()> {
        if self.max_depth == 0 {
            return Err(Error::config("max_depth must be >= 1"));
        }
        if self.max_chains == 0 {
            return Err(Error::config("max_chains must be >= 1"));
        }
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(Error::config(format!(
                "confidence_threshold must be in [0, 1], got {}",
                self.confidence_threshold
            )));
        }
        if !(0.0..=1.0).contains(&self.contradiction_threshold) {
            return Err(Error::config(format!(
                "contradiction_threshold must be in [0, 1], got {}",
                self.contradiction_threshold
            )));
        }
        if !self.max_processing_time_ms.is_finite() || self.max_processing_time_ms <= 0.0 {
            return Err(Error::config(format!(
                "max_processing_time_ms must be > 0, got {}",
                self.max_processing_time_ms
            )));
        }
        if self.circuit_breaker_threshold == 0 {
            return Err(Error::config("circuit_breaker_threshold must be >= 1"));
        }
        if self.primary_step_limit == 0 || self.alternative_step_limit == 0 {
            return Err(Error::config("step limits must be >= 1"));
        }
        Ok(())
    }

    /// Load from a JSON string and validate.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.max_depth, 15);
        assert_eq!(config.max_chains, 5);
        assert_eq!(config.confidence_threshold, 0.1);
        assert_eq!(config.max_processing_time_ms, 200.0);
        assert_eq!(config.contradiction_threshold, 0.98);
        assert_eq!(config.circuit_breaker_threshold, 3);
        assert_eq!(config.cooldown(), Duration::from_secs(30));
        assert!(!config.enforce_time_budget);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_errors() {
        assert!(EngineConfig::default().with_max_depth(0).validate().is_err());
        assert!(EngineConfig::default().with_max_chains(0).validate().is_err());
        assert!(EngineConfig::default()
            .with_confidence_threshold(1.5)
            .validate()
            .is_err());
        assert!(EngineConfig::default()
            .with_time_budget_ms(f64::NAN)
            .validate()
            .is_err());
        assert!(EngineConfig::default()
            .with_circuit_breaker(0, 10)
            .validate()
            .is_err());
    }

    #[test]
    fn test_from_json_partial() {
        let config = EngineConfig::from_json(r#"{"max_depth": 6, "enforce_time_budget": true}"#)
            .unwrap();
        assert_eq!(config.max_depth, 6);
        assert!(config.enforce_time_budget);
        assert_eq!(config.max_chains, 5);

        assert!(matches!(
            EngineConfig::from_json(r#"{"max_chains": 0}"#),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            EngineConfig::from_json("not json"),
            Err(Error::Serialization(_))
        ));
    }
}
