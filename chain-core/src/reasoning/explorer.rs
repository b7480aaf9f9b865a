//! Bounded breadth-first expansion of a chain.
//!
//! Exploration of one chain is strictly sequential: dequeue order decides
//! which conclusions count as already seen, and therefore which candidates
//! become circular-reference markers.

use crate::reasoning::alternatives::StrategyBias;
use crate::reasoning::chain::InferenceChain;
use crate::reasoning::rules::RuleMatcher;
use crate::reasoning::step::StepBuilder;
use crate::reasoning::types::{InferenceStep, StepId, StepStatus};
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};
use std::time::Instant;
use tracing::debug;

/// Step ceiling for primary exploration.
pub const PRIMARY_STEP_LIMIT: usize = 50;

/// Step ceiling for alternative exploration.
pub const ALTERNATIVE_STEP_LIMIT: usize = 40;

/// Bounds for one exploration run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExplorationLimits {
    /// Steps at this depth are never expanded.
    pub max_depth: u32,
    /// Exploration stops once the chain holds this many steps.
    pub max_steps: usize,
    /// Candidates below this confidence are pruned.
    pub confidence_threshold: f64,
    /// Optional hard deadline checked between queue iterations.
    pub deadline: Option<Instant>,
}

impl ExplorationLimits {
    pub fn new(max_depth: u32, max_steps: usize, confidence_threshold: f64) -> Self {
        Self {
            max_depth,
            max_steps,
            confidence_threshold,
            deadline: None,
        }
    }

    /// Stop expanding once `deadline` has passed.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

/// Why exploration stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    QueueExhausted,
    StepLimit,
    Deadline,
}

/// Counters from one exploration run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplorationReport {
    /// Steps handed to the rule matcher.
    pub expanded: usize,
    /// Candidates accepted into the chain.
    pub accepted: usize,
    /// Candidates discarded below the threshold.
    pub pruned: usize,
    /// Templates rejected as malformed.
    pub skipped: usize,
    /// Circular-reference markers added.
    pub circular: usize,
    pub stop_reason: StopReason,
}

impl ExplorationReport {
    fn new() -> Self {
        Self {
            expanded: 0,
            accepted: 0,
            pruned: 0,
            skipped: 0,
            circular: 0,
            stop_reason: StopReason::QueueExhausted,
        }
    }
}

/// Expands a chain from its root using a rule matcher.
pub struct ChainExplorer<'a> {
    matcher: &'a dyn RuleMatcher,
    builder: StepBuilder,
    limits: ExplorationLimits,
    bias: Option<StrategyBias>,
}

impl<'a> ChainExplorer<'a> {
    pub fn new(matcher: &'a dyn RuleMatcher, limits: ExplorationLimits) -> Self {
        Self {
            matcher,
            builder: StepBuilder::new(),
            limits,
            bias: None,
        }
    }

    /// Boost templates of preferred categories before acceptance.
    pub fn with_bias(mut self, bias: StrategyBias) -> Self {
        self.bias = Some(bias);
        self
    }

    pub fn limits(&self) -> &ExplorationLimits {
        &self.limits
    }

    /// Expand `chain` breadth-first until the queue empties, the step
    /// ceiling is hit, or the deadline passes.
    ///
    /// Fills `reasoning_path` before returning.
    pub fn explore(&self, chain: &mut InferenceChain) -> ExplorationReport {
        let mut report = ExplorationReport::new();
        let mut seen: HashSet<String> = HashSet::new();
        seen.insert(chain.root_premise.clone());

        let mut queue: VecDeque<StepId> = VecDeque::new();
        queue.push_back(chain.root().id);

        'queue: while let Some(step_id) = queue.pop_front() {
            if let Some(deadline) = self.limits.deadline {
                if Instant::now() >= deadline {
                    queue.push_front(step_id);
                    Self::break_circuit(chain, &queue);
                    report.stop_reason = StopReason::Deadline;
                    break;
                }
            }

            let Some(parent) = chain.get_step(&step_id).cloned() else {
                continue;
            };
            if parent.depth >= self.limits.max_depth {
                continue;
            }

            report.expanded += 1;
            let templates = self.matcher.match_rules(&parent.conclusion, parent.depth);

            for template in templates {
                if chain.len() >= self.limits.max_steps {
                    report.stop_reason = StopReason::StepLimit;
                    break 'queue;
                }

                let template = match &self.bias {
                    Some(bias) => bias.apply(template),
                    None => template,
                };

                let mut candidate = match self.builder.build(&template, &parent) {
                    Ok(step) => step,
                    Err(e) => {
                        debug!(error = %e, "Skipping malformed template");
                        report.skipped += 1;
                        continue;
                    }
                };
                candidate.status = StepStatus::Processing;

                if seen.contains(&candidate.conclusion) {
                    debug!(
                        conclusion = %candidate.conclusion,
                        depth = candidate.depth,
                        "Circular reference detected"
                    );
                    chain.push_circular(InferenceStep::circular_reference(
                        &parent,
                        &candidate.conclusion,
                    ));
                    report.circular += 1;
                    continue;
                }

                if candidate.confidence >= self.limits.confidence_threshold {
                    candidate.status = StepStatus::Completed;
                    seen.insert(candidate.conclusion.clone());
                    let depth = candidate.depth;
                    let id = chain.push_step(candidate);
                    report.accepted += 1;
                    if depth < self.limits.max_depth {
                        queue.push_back(id);
                    }
                } else {
                    candidate.status = StepStatus::Pruned;
                    debug!(
                        pattern = %candidate.pattern_id,
                        confidence = candidate.confidence,
                        threshold = self.limits.confidence_threshold,
                        "Pruned candidate"
                    );
                    report.pruned += 1;
                }
            }
        }

        chain.reasoning_path = chain.best_path();
        report
    }

    /// Mark every step still waiting for expansion as cut off.
    fn break_circuit(chain: &mut InferenceChain, queue: &VecDeque<StepId>) {
        for id in queue {
            if let Some(step) = chain.get_step_mut(id) {
                step.status = StepStatus::CircuitBroken;
            }
        }
    }
}
