//! The inference engine façade.
//!
//! [`InferenceEngine::infer`] is the only entry point callers need. It runs
//! the whole pipeline behind a circuit breaker:
//!
//! 1. breaker check (an open breaker short-circuits the call)
//! 2. primary exploration and validation
//! 3. alternative strategies when the primary chain is weak
//! 4. scoring and selection of the best chain
//! 5. statistics and breaker bookkeeping
//!
//! Every failure, including a panic inside a rule matcher, is turned into an
//! [`InferenceResult`] with `success = false`. Nothing propagates out.

use crate::breaker::{CircuitBreaker, CircuitBreakerStatus};
use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::reasoning::{
    needs_alternatives, AlternativePlan, ChainExplorer, ChainScorer, ChainValidator,
    ExplorationLimits, InferenceChain, PatternRuleSet, RuleMatcher, StopReason,
};
use crate::stats::{InferenceSample, PerformanceStats};
use futures::future::join_all;
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::Value;
use std::any::Any;
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

/// Outcome of a pipeline stage: a panic payload or the stage's own result.
type Outcome<T> = std::thread::Result<Result<T>>;

/// Timing and health figures for one call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PerformanceMetrics {
    pub processing_time_ms: f64,
    /// Processing time divided by the steps across all returned chains
    pub time_per_step_ms: f64,
    /// Whether the call finished inside `max_processing_time_ms`
    pub within_budget: bool,
    /// Whether the breaker was open when the call returned
    pub circuit_breaker_active: bool,
}

/// Response to one `infer` call.
#[derive(Debug, Clone, Serialize)]
pub struct InferenceResult {
    pub query: String,
    /// Best-scoring chain
    pub primary_chain: Option<InferenceChain>,
    /// Remaining chains in discovery order
    pub alternative_chains: Vec<InferenceChain>,
    pub total_steps: usize,
    pub max_depth_explored: u32,
    pub contradictions_detected: usize,
    pub circular_logic_detected: usize,
    /// Validated confidence of the primary chain
    pub confidence_score: f64,
    /// Scorer rating of the primary chain, in [0, 1]
    pub reasoning_quality: f64,
    pub success: bool,
    pub error_message: Option<String>,
    pub metrics: PerformanceMetrics,
    /// Whether the primary chain concluded the target, if one was given
    pub target_reached: Option<bool>,
}

impl InferenceResult {
    fn failure(query: &str, message: String, metrics: PerformanceMetrics) -> Self {
        Self {
            query: query.to_string(),
            primary_chain: None,
            alternative_chains: Vec::new(),
            total_steps: 0,
            max_depth_explored: 0,
            contradictions_detected: 0,
            circular_logic_detected: 0,
            confidence_score: 0.0,
            reasoning_quality: 0.0,
            success: false,
            error_message: Some(message),
            metrics,
            target_reached: None,
        }
    }

    /// Primary chain followed by the alternatives.
    pub fn chains(&self) -> impl Iterator<Item = &InferenceChain> {
        self.primary_chain.iter().chain(self.alternative_chains.iter())
    }

    /// Export as pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Validated primary chain plus the alternatives it calls for.
struct PrimaryOutcome {
    chain: InferenceChain,
    plan: Option<AlternativePlan>,
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Bounded inference-chain search engine.
///
/// `Send + Sync`: one engine can serve concurrent callers. Only the breaker
/// and the statistics are shared between calls.
pub struct InferenceEngine {
    config: EngineConfig,
    matcher: Arc<dyn RuleMatcher>,
    breaker: CircuitBreaker,
    stats: Mutex<PerformanceStats>,
    validator: ChainValidator,
    scorer: ChainScorer,
}

impl Default for InferenceEngine {
    fn default() -> Self {
        Self::build(EngineConfig::default(), Arc::new(PatternRuleSet::new()))
    }
}

impl InferenceEngine {
    /// Create an engine with the default rule set.
    pub fn new(config: EngineConfig) -> Result<Self> {
        Self::with_matcher(config, PatternRuleSet::new())
    }

    /// Create an engine with a custom rule matcher.
    pub fn with_matcher(config: EngineConfig, matcher: impl RuleMatcher + 'static) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config, Arc::new(matcher)))
    }

    fn build(config: EngineConfig, matcher: Arc<dyn RuleMatcher>) -> Self {
        Self {
            breaker: CircuitBreaker::new(config.circuit_breaker_threshold, config.cooldown()),
            matcher,
            stats: Mutex::new(PerformanceStats::default()),
            validator: ChainValidator::new(),
            scorer: ChainScorer::new(),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ==================== Inference ====================

    /// Run one inference. Never panics and never returns an error; check
    /// `success` and `error_message` on the result.
    #[instrument(skip(self, context))]
    pub fn infer(
        &self,
        premise: &str,
        target: Option<&str>,
        context: Option<HashMap<String, Value>>,
    ) -> InferenceResult {
        let start = Instant::now();
        if !self.breaker.allow_request() {
            return self.short_circuit(premise, start);
        }

        let outcome = catch_unwind(AssertUnwindSafe(|| {
            let primary = self.explore_primary(premise, target, context, start)?;
            let alternatives = match &primary.plan {
                Some(plan) => plan.explore_all(self.matcher.as_ref()),
                None => Vec::new(),
            };
            self.conclude(premise, primary.chain, alternatives, start)
        }));

        self.settle(premise, outcome, start)
    }

    /// Like [`infer`](Self::infer), but explores alternative strategies
    /// concurrently on the blocking pool.
    ///
    /// Alternatives are joined in strategy order, so the result matches the
    /// synchronous path.
    #[instrument(skip(self, context))]
    pub async fn infer_async(
        &self,
        premise: &str,
        target: Option<&str>,
        context: Option<HashMap<String, Value>>,
    ) -> InferenceResult {
        let start = Instant::now();
        if !self.breaker.allow_request() {
            return self.short_circuit(premise, start);
        }

        let primary = match catch_unwind(AssertUnwindSafe(|| {
            self.explore_primary(premise, target, context, start)
        })) {
            Ok(Ok(primary)) => primary,
            Ok(Err(e)) => return self.settle(premise, Ok(Err(e)), start),
            Err(payload) => return self.settle(premise, Err(payload), start),
        };

        let alternatives = match primary.plan {
            Some(plan) => match self.explore_concurrently(plan).await {
                Ok(chains) => chains,
                Err(payload) => return self.settle(premise, Err(payload), start),
            },
            None => Vec::new(),
        };

        let outcome = catch_unwind(AssertUnwindSafe(|| {
            self.conclude(premise, primary.chain, alternatives, start)
        }));
        self.settle(premise, outcome, start)
    }

    async fn explore_concurrently(
        &self,
        plan: AlternativePlan,
    ) -> std::thread::Result<Vec<InferenceChain>> {
        let plan = Arc::new(plan);
        let tasks = (0..plan.count).map(|index| {
            let plan = Arc::clone(&plan);
            let matcher = Arc::clone(&self.matcher);
            tokio::task::spawn_blocking(move || plan.explore(matcher.as_ref(), index))
        });

        let mut chains = Vec::with_capacity(plan.count);
        for joined in join_all(tasks).await {
            match joined {
                Ok(Some(chain)) => chains.push(chain),
                Ok(None) => {}
                Err(e) if e.is_panic() => return Err(e.into_panic()),
                Err(e) => {
                    let message: Box<dyn Any + Send> =
                        Box::new(format!("alternative strategy cancelled: {}", e));
                    return Err(message);
                }
            }
        }
        Ok(chains)
    }

    fn deadline(&self, start: Instant) -> Option<Instant> {
        self.config
            .enforce_time_budget
            .then(|| start + self.config.time_budget())
    }

    /// Explore and validate the primary chain, and decide on alternatives.
    fn explore_primary(
        &self,
        premise: &str,
        target: Option<&str>,
        context: Option<HashMap<String, Value>>,
        start: Instant,
    ) -> Result<PrimaryOutcome> {
        if premise.trim().is_empty() {
            return Err(Error::invalid_input("premise must not be blank"));
        }

        let deadline = self.deadline(start);
        let mut limits = ExplorationLimits::new(
            self.config.max_depth,
            self.config.primary_step_limit,
            self.config.confidence_threshold,
        );
        limits.deadline = deadline;

        let target = target.map(str::to_string);
        let mut chain =
            InferenceChain::new(premise, target.clone()).with_context(context.clone());
        let report = ChainExplorer::new(self.matcher.as_ref(), limits).explore(&mut chain);

        if report.stop_reason == StopReason::Deadline {
            return Err(Error::timeout(self.config.max_processing_time_ms as u64));
        }

        debug!(
            steps = chain.len(),
            depth = chain.max_depth_reached,
            pruned = report.pruned,
            circular = report.circular,
            skipped = report.skipped,
            "Primary chain explored"
        );

        self.validator.validate(&mut chain);

        let plan = needs_alternatives(&chain)
            .then(|| AlternativePlan::new(premise, target, context, &self.config, deadline))
            .filter(|plan| plan.count > 0);

        Ok(PrimaryOutcome { chain, plan })
    }

    /// Validate alternatives, pick the best chain and assemble the result.
    fn conclude(
        &self,
        query: &str,
        primary: InferenceChain,
        alternatives: Vec<InferenceChain>,
        start: Instant,
    ) -> Result<InferenceResult> {
        let mut chains = Vec::with_capacity(alternatives.len() + 1);
        chains.push(primary);
        for mut chain in alternatives {
            self.validator.validate(&mut chain);
            chains.push(chain);
        }

        let (best, score) = self
            .scorer
            .select_best(&chains)
            .ok_or_else(|| Error::internal("no chain to select from"))?;

        let total_steps = chains.iter().map(InferenceChain::len).sum();
        let max_depth_explored = chains
            .iter()
            .map(|c| c.max_depth_reached)
            .max()
            .unwrap_or(0);
        let contradictions_detected = chains.iter().map(InferenceChain::contradiction_count).sum();
        let circular_logic_detected = chains.iter().map(InferenceChain::circular_count).sum();

        let primary_chain = chains.remove(best);
        let metrics = self.metrics(start, total_steps, false);

        Ok(InferenceResult {
            query: query.to_string(),
            confidence_score: primary_chain.total_confidence,
            reasoning_quality: score.clamp(0.0, 1.0),
            target_reached: primary_chain.target_reached(),
            primary_chain: Some(primary_chain),
            alternative_chains: chains,
            total_steps,
            max_depth_explored,
            contradictions_detected,
            circular_logic_detected,
            success: true,
            error_message: None,
            metrics,
        })
    }

    // ==================== Bookkeeping ====================

    fn settle(&self, query: &str, outcome: Outcome<InferenceResult>, start: Instant) -> InferenceResult {
        match outcome {
            Ok(Ok(result)) => {
                self.record_success(&result);
                result
            }
            Ok(Err(e)) => self.fail(query, e.to_string(), start),
            Err(payload) => self.fail(
                query,
                format!("Inference panicked: {}", panic_message(payload.as_ref())),
                start,
            ),
        }
    }

    fn record_success(&self, result: &InferenceResult) {
        self.breaker.record_success();
        self.stats.lock().record_success(InferenceSample {
            processing_time_ms: result.metrics.processing_time_ms,
            confidence: result.confidence_score,
            depth: result.max_depth_explored,
            steps: result.total_steps,
            chains: result.chains().count(),
            contradictions: result.contradictions_detected,
            circular: result.circular_logic_detected,
            within_budget: result.metrics.within_budget,
        });

        if !result.metrics.within_budget {
            warn!(
                processing_ms = result.metrics.processing_time_ms,
                budget_ms = self.config.max_processing_time_ms,
                "Inference exceeded time budget"
            );
        }
        info!(
            steps = result.total_steps,
            depth = result.max_depth_explored,
            confidence = result.confidence_score,
            quality = result.reasoning_quality,
            processing_ms = result.metrics.processing_time_ms,
            "Inference complete"
        );
    }

    fn fail(&self, query: &str, message: String, start: Instant) -> InferenceResult {
        let tripped = self.breaker.record_failure();
        self.stats.lock().record_failure(tripped);
        warn!(error = %message, tripped, "Inference failed");

        let metrics = self.metrics(start, 0, self.breaker.is_open());
        InferenceResult::failure(query, message, metrics)
    }

    fn short_circuit(&self, query: &str, start: Instant) -> InferenceResult {
        self.stats.lock().record_short_circuit();
        debug!("Circuit breaker open, short-circuiting");

        let message = Error::circuit_open(self.config.circuit_breaker_threshold).to_string();
        InferenceResult::failure(query, message, self.metrics(start, 0, true))
    }

    fn metrics(&self, start: Instant, steps: usize, circuit_breaker_active: bool) -> PerformanceMetrics {
        let processing_time_ms = start.elapsed().as_secs_f64() * 1000.0;
        PerformanceMetrics {
            processing_time_ms,
            time_per_step_ms: if steps > 0 {
                processing_time_ms / steps as f64
            } else {
                0.0
            },
            within_budget: processing_time_ms <= self.config.max_processing_time_ms,
            circuit_breaker_active,
        }
    }

    // ==================== State ====================

    /// Snapshot of the running statistics.
    pub fn get_performance_stats(&self) -> PerformanceStats {
        self.stats.lock().clone()
    }

    /// Clear the running statistics. The breaker is left alone.
    pub fn reset_stats(&self) {
        *self.stats.lock() = PerformanceStats::default();
    }

    /// Clear statistics and close the breaker.
    pub fn reset(&self) {
        self.reset_stats();
        self.breaker.reset();
    }

    pub fn circuit_breaker_status(&self) -> CircuitBreakerStatus {
        self.breaker.status()
    }
}
