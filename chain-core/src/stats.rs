//! Running performance statistics for an engine instance.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Counters and running averages across `infer` calls.
///
/// Averages cover successful calls only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceStats {
    /// Calls that ran the pipeline (successful or failed)
    pub total_inferences: u64,
    pub successful_inferences: u64,
    pub failed_inferences: u64,
    /// Calls rejected by an open circuit breaker
    pub short_circuited: u64,
    /// Times the circuit breaker opened
    pub circuit_breaker_trips: u64,
    /// Successful calls that overran the time budget
    pub budget_violations: u64,
    pub total_steps: u64,
    pub total_chains: u64,
    pub contradictions_detected: u64,
    pub circular_logic_detected: u64,
    pub avg_processing_time_ms: f64,
    pub avg_confidence: f64,
    pub avg_depth: f64,
    pub avg_steps: f64,
    pub max_processing_time_ms: f64,
    /// When the counters were last cleared
    pub last_reset: DateTime<Utc>,
}

impl Default for PerformanceStats {
    fn default() -> Self {
        Self {
            total_inferences: 0,
            successful_inferences: 0,
            failed_inferences: 0,
            short_circuited: 0,
            circuit_breaker_trips: 0,
            budget_violations: 0,
            total_steps: 0,
            total_chains: 0,
            contradictions_detected: 0,
            circular_logic_detected: 0,
            avg_processing_time_ms: 0.0,
            avg_confidence: 0.0,
            avg_depth: 0.0,
            avg_steps: 0.0,
            max_processing_time_ms: 0.0,
            last_reset: Utc::now(),
        }
    }
}

/// Figures from one successful call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InferenceSample {
    pub processing_time_ms: f64,
    pub confidence: f64,
    pub depth: u32,
    pub steps: usize,
    pub chains: usize,
    pub contradictions: usize,
    pub circular: usize,
    pub within_budget: bool,
}

fn rolling(avg: f64, n: u64, value: f64) -> f64 {
    let n = n as f64;
    ((n - 1.0) * avg + value) / n
}

impl PerformanceStats {
    /// Record a successful call.
    pub fn record_success(&mut self, sample: InferenceSample) {
        self.total_inferences += 1;
        self.successful_inferences += 1;
        if !sample.within_budget {
            self.budget_violations += 1;
        }

        self.total_steps += sample.steps as u64;
        self.total_chains += sample.chains as u64;
        self.contradictions_detected += sample.contradictions as u64;
        self.circular_logic_detected += sample.circular as u64;

        // Update rolling averages
        let n = self.successful_inferences;
        self.avg_processing_time_ms = rolling(self.avg_processing_time_ms, n, sample.processing_time_ms);
        self.avg_confidence = rolling(self.avg_confidence, n, sample.confidence);
        self.avg_depth = rolling(self.avg_depth, n, sample.depth as f64);
        self.avg_steps = rolling(self.avg_steps, n, sample.steps as f64);
        self.max_processing_time_ms = self.max_processing_time_ms.max(sample.processing_time_ms);
    }

    /// Record a failed call.
    pub fn record_failure(&mut self, tripped_breaker: bool) {
        self.total_inferences += 1;
        self.failed_inferences += 1;
        if tripped_breaker {
            self.circuit_breaker_trips += 1;
        }
    }

    /// Record a call rejected by the breaker.
    pub fn record_short_circuit(&mut self) {
        self.short_circuited += 1;
    }

    pub fn success_rate(&self) -> f64 {
        if self.total_inferences == 0 {
            1.0
        } else {
            self.successful_inferences as f64 / self.total_inferences as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(ms: f64, confidence: f64) -> InferenceSample {
        InferenceSample {
            processing_time_ms: ms,
            confidence,
            depth: 2,
            steps: 4,
            chains: 1,
            contradictions: 0,
            circular: 1,
            within_budget: ms <= 200.0,
        }
    }

    #[test]
    fn test_rolling_averages() {
        let mut stats = PerformanceStats::default();
        stats.record_success(sample(10.0, 0.8));
        stats.record_success(sample(30.0, 0.4));

        assert_eq!(stats.successful_inferences, 2);
        assert!((stats.avg_processing_time_ms - 20.0).abs() < 1e-9);
        assert!((stats.avg_confidence - 0.6).abs() < 1e-9);
        assert_eq!(stats.max_processing_time_ms, 30.0);
        assert_eq!(stats.total_steps, 8);
        assert_eq!(stats.circular_logic_detected, 2);
    }

    #[test]
    fn test_failures_and_budget() {
        let mut stats = PerformanceStats::default();
        stats.record_success(sample(500.0, 0.5));
        stats.record_failure(false);
        stats.record_failure(true);
        stats.record_short_circuit();

        assert_eq!(stats.budget_violations, 1);
        assert_eq!(stats.total_inferences, 3);
        assert_eq!(stats.failed_inferences, 2);
        assert_eq!(stats.circuit_breaker_trips, 1);
        assert_eq!(stats.short_circuited, 1);
        assert!((stats.success_rate() - 1.0 / 3.0).abs() < 1e-9);
    }
}
