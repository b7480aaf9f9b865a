//! InferenceChain implementation.
//!
//! A chain is an arena of steps: `steps` owns every node, and parent/child
//! links are ids resolved through a position index.

use crate::reasoning::types::*;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::HashMap;

/// One complete exploration attempt from a root premise.
#[derive(Debug, Clone, Serialize)]
pub struct InferenceChain {
    /// Unique identifier for this chain.
    pub chain_id: ChainId,

    /// Premise the chain starts from.
    pub root_premise: String,

    /// Conclusion the caller hoped to reach, if any.
    pub target_conclusion: Option<String>,

    /// All steps in discovery order, root first.
    pub steps: Vec<InferenceStep>,

    /// One accepted walk through the tree, root first.
    pub reasoning_path: Vec<StepId>,

    /// Deepest completed step.
    pub max_depth_reached: u32,

    /// Aggregate confidence after validation.
    pub total_confidence: f64,

    /// Whether validation accepted the chain.
    pub chain_valid: bool,

    /// Penalty factor applied by validation.
    pub penalty: f64,

    /// Contradiction and fallacy records.
    pub contradictions_found: Vec<Contradiction>,

    /// Ids of synthetic circular-reference steps.
    pub circular_references: Vec<StepId>,

    /// How the chain was explored.
    pub strategy: ChainStrategy,

    /// When the chain was created.
    pub created_at: DateTime<Utc>,

    /// Caller context passed through unchanged.
    pub metadata: Option<HashMap<String, Value>>,

    #[serde(skip)]
    positions: HashMap<StepId, usize>,
}

impl InferenceChain {
    /// Create a chain holding only the root step.
    pub fn new(premise: impl Into<String>, target: Option<String>) -> Self {
        let root = InferenceStep::root(premise);
        let mut positions = HashMap::new();
        positions.insert(root.id, 0);

        Self {
            chain_id: ChainId::new(),
            root_premise: root.premise.clone(),
            target_conclusion: target,
            steps: vec![root],
            reasoning_path: Vec::new(),
            max_depth_reached: 0,
            total_confidence: 0.0,
            chain_valid: false,
            penalty: 1.0,
            contradictions_found: Vec::new(),
            circular_references: Vec::new(),
            strategy: ChainStrategy::Primary,
            created_at: Utc::now(),
            metadata: None,
            positions,
        }
    }

    /// Set the exploration strategy.
    pub fn with_strategy(mut self, strategy: ChainStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Attach caller context.
    pub fn with_context(mut self, context: Option<HashMap<String, Value>>) -> Self {
        self.metadata = context;
        self
    }

    // ==================== Step Operations ====================

    /// Append a step and link it under its parent.
    ///
    /// This is the only place `children_ids` is mutated.
    pub fn push_step(&mut self, step: InferenceStep) -> StepId {
        let id = step.id;
        if let Some(parent_id) = step.parent_id {
            if let Some(parent) = self.get_step_mut(&parent_id) {
                parent.children_ids.push(id);
            }
        }
        if step.is_completed() && !step.circular {
            self.max_depth_reached = self.max_depth_reached.max(step.depth);
        }
        self.positions.insert(id, self.steps.len());
        self.steps.push(step);
        id
    }

    /// Append a circular-reference marker and record it.
    pub fn push_circular(&mut self, marker: InferenceStep) -> StepId {
        let id = self.push_step(marker);
        self.circular_references.push(id);
        id
    }

    /// Get a step by ID.
    pub fn get_step(&self, id: &StepId) -> Option<&InferenceStep> {
        self.positions.get(id).and_then(|&i| self.steps.get(i))
    }

    /// Get a mutable step by ID.
    pub fn get_step_mut(&mut self, id: &StepId) -> Option<&mut InferenceStep> {
        match self.positions.get(id) {
            Some(&i) => self.steps.get_mut(i),
            None => None,
        }
    }

    /// Get the root step.
    pub fn root(&self) -> &InferenceStep {
        &self.steps[0]
    }

    /// Get the parent of a step.
    pub fn parent(&self, id: &StepId) -> Option<&InferenceStep> {
        self.get_step(id)?
            .parent_id
            .as_ref()
            .and_then(|p| self.get_step(p))
    }

    /// Get the children of a step.
    pub fn children(&self, id: &StepId) -> Vec<&InferenceStep> {
        self.get_step(id)
            .map(|s| {
                s.children_ids
                    .iter()
                    .filter_map(|c| self.get_step(c))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Steps from the root down to the given step.
    pub fn path_to(&self, id: &StepId) -> Vec<&InferenceStep> {
        let mut path = Vec::new();
        let mut current = self.get_step(id);

        // A parent always precedes its child, so this walk cannot exceed
        // the step count.
        while let Some(step) = current {
            path.push(step);
            if path.len() > self.steps.len() {
                break;
            }
            current = step.parent_id.as_ref().and_then(|p| self.get_step(p));
        }

        path.reverse();
        path
    }

    /// Completed steps in discovery order.
    pub fn completed_steps(&self) -> impl Iterator<Item = &InferenceStep> {
        self.steps.iter().filter(|s| s.is_completed())
    }

    /// Number of steps, including the root and circular markers.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// A chain always holds its root, so this is only true for a
    /// chain whose steps were cleared by hand.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn contradiction_count(&self) -> usize {
        self.contradictions_found.len()
    }

    pub fn circular_count(&self) -> usize {
        self.circular_references.len()
    }

    // ==================== Analysis ====================

    /// Greedy walk from the root through the most confident completed child.
    ///
    /// Ties go to the child discovered first.
    pub fn best_path(&self) -> Vec<StepId> {
        let mut path = vec![self.root().id];
        let mut current = self.root();

        loop {
            let mut best: Option<&InferenceStep> = None;
            for child in self.children(&current.id) {
                if !child.is_completed() {
                    continue;
                }
                if best.map_or(true, |b| child.confidence > b.confidence) {
                    best = Some(child);
                }
            }
            match best {
                Some(next) if path.len() < self.steps.len() => {
                    path.push(next.id);
                    current = next;
                }
                _ => break,
            }
        }

        path
    }

    /// Whether a completed step concludes the target (case-insensitive).
    ///
    /// Returns `None` when no target was given.
    pub fn target_reached(&self) -> Option<bool> {
        let target = self.target_conclusion.as_ref()?;
        let target = normalize(target);
        Some(
            self.completed_steps()
                .any(|s| normalize(&s.conclusion) == target),
        )
    }

    /// Structural fingerprint independent of the random step ids.
    ///
    /// Two chains with the same shape, texts and confidences hash equal.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.root_premise.as_bytes());
        hasher.update(b"\n");

        for step in &self.steps {
            let parent_pos = step
                .parent_id
                .as_ref()
                .and_then(|p| self.positions.get(p))
                .map(|p| p.to_string())
                .unwrap_or_else(|| "-".to_string());
            hasher.update(
                format!(
                    "{}|{}|{}|{}|{}|{:016x}|{}\n",
                    parent_pos,
                    step.depth,
                    step.category,
                    step.pattern_id,
                    step.status,
                    step.confidence.to_bits(),
                    step.conclusion
                )
                .as_bytes(),
            );
        }

        let hash = hasher.finalize();
        format!("{:x}", hash)
    }

    /// Export as pretty JSON.
    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn normalize(text: &str) -> String {
    text.trim()
        .trim_end_matches('.')
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
