//! Consecutive-failure circuit breaker.
//!
//! The breaker has no half-open state and no timer of its own. An open
//! breaker only closes when a request arrives after the cooldown has
//! elapsed, so the transition always happens on the caller's thread.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Breaker position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CircuitState {
    /// Requests proceed.
    Closed,
    /// Requests are short-circuited.
    Open,
}

#[derive(Debug)]
struct BreakerState {
    state: CircuitState,
    consecutive_failures: u32,
    opened_at: Option<Instant>,
    trips: u64,
    last_reset: DateTime<Utc>,
}

impl BreakerState {
    fn closed() -> Self {
        Self {
            state: CircuitState::Closed,
            consecutive_failures: 0,
            opened_at: None,
            trips: 0,
            last_reset: Utc::now(),
        }
    }

    fn close(&mut self) {
        self.state = CircuitState::Closed;
        self.consecutive_failures = 0;
        self.opened_at = None;
        self.last_reset = Utc::now();
    }
}

/// Snapshot of the breaker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircuitBreakerStatus {
    pub state: CircuitState,
    pub consecutive_failures: u32,
    pub threshold: u32,
    /// Times the breaker has opened since construction or the last full reset.
    pub trips: u64,
    /// When the breaker last closed.
    pub last_reset: DateTime<Utc>,
    /// How long the breaker has been open.
    pub open_for_ms: Option<u64>,
}

/// Opens after `threshold` consecutive failures; closes lazily after `cooldown`.
#[derive(Debug)]
pub struct CircuitBreaker {
    threshold: u32,
    cooldown: Duration,
    state: Mutex<BreakerState>,
}

impl CircuitBreaker {
    pub fn new(threshold: u32, cooldown: Duration) -> Self {
        Self {
            threshold: threshold.max(1),
            cooldown,
            state: Mutex::new(BreakerState::closed()),
        }
    }

    /// Check whether a request may proceed.
    ///
    /// An open breaker whose cooldown has been exceeded closes here and
    /// lets the request through.
    pub fn allow_request(&self) -> bool {
        let mut state = self.state.lock();
        match state.state {
            CircuitState::Closed => true,
            CircuitState::Open => {
                let elapsed = state.opened_at.map(|t| t.elapsed()).unwrap_or_default();
                if elapsed > self.cooldown {
                    info!(
                        open_ms = elapsed.as_millis() as u64,
                        "Circuit breaker cooldown expired, closing"
                    );
                    state.close();
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Record a failure. Returns `true` if this failure opened the breaker.
    pub fn record_failure(&self) -> bool {
        let mut state = self.state.lock();
        state.consecutive_failures = state.consecutive_failures.saturating_add(1);

        if state.state == CircuitState::Closed && state.consecutive_failures >= self.threshold {
            state.state = CircuitState::Open;
            state.opened_at = Some(Instant::now());
            state.trips += 1;
            warn!(
                failures = state.consecutive_failures,
                cooldown_ms = self.cooldown.as_millis() as u64,
                "Circuit breaker tripped"
            );
            return true;
        }

        false
    }

    /// Record a success, clearing the failure streak.
    pub fn record_success(&self) {
        self.state.lock().consecutive_failures = 0;
    }

    /// Close the breaker and forget its history.
    pub fn reset(&self) {
        let mut state = self.state.lock();
        state.close();
        state.trips = 0;
    }

    /// Whether the breaker is open, without attempting the lazy reset.
    pub fn is_open(&self) -> bool {
        self.state.lock().state == CircuitState::Open
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.state.lock().consecutive_failures
    }

    pub fn status(&self) -> CircuitBreakerStatus {
        let state = self.state.lock();
        CircuitBreakerStatus {
            state: state.state,
            consecutive_failures: state.consecutive_failures,
            threshold: self.threshold,
            trips: state.trips,
            last_reset: state.last_reset,
            open_for_ms: state.opened_at.map(|t| t.elapsed().as_millis() as u64),
        }
    }
}
