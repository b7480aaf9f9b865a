//! Type definitions for inference chains.
//!
//! This module defines the identifiers, enums and the step record that
//! inference chains are built from.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for an inference chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChainId(pub Uuid);

impl ChainId {
    /// Generate a new random chain ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse from string.
    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl Default for ChainId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ChainId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a step within a chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StepId(pub Uuid);

impl StepId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl Default for StepId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for StepId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of reasoning move a step represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasoningCategory {
    /// General rule applied to a specific case.
    Deductive,
    /// Specific observations generalized to a rule.
    Inductive,
    /// Inference to the best explanation.
    Abductive,
    /// Properties transferred between similar things.
    Analogical,
    /// Cause and effect.
    Causal,
    /// If/then reasoning.
    Conditional,
    /// Ordering of events in time.
    Temporal,
    /// Likelihood-based reasoning.
    Probabilistic,
}

impl ReasoningCategory {
    /// All categories in declaration order.
    pub const ALL: [ReasoningCategory; 8] = [
        Self::Deductive,
        Self::Inductive,
        Self::Abductive,
        Self::Analogical,
        Self::Causal,
        Self::Conditional,
        Self::Temporal,
        Self::Probabilistic,
    ];

    /// Get a human-readable description.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Deductive => "General rule applied to a case",
            Self::Inductive => "Generalization from instances",
            Self::Abductive => "Inference to the best explanation",
            Self::Analogical => "Transfer between similar cases",
            Self::Causal => "Cause and effect",
            Self::Conditional => "If/then reasoning",
            Self::Temporal => "Ordering in time",
            Self::Probabilistic => "Likelihood estimate",
        }
    }
}

impl std::fmt::Display for ReasoningCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Deductive => write!(f, "deductive"),
            Self::Inductive => write!(f, "inductive"),
            Self::Abductive => write!(f, "abductive"),
            Self::Analogical => write!(f, "analogical"),
            Self::Causal => write!(f, "causal"),
            Self::Conditional => write!(f, "conditional"),
            Self::Temporal => write!(f, "temporal"),
            Self::Probabilistic => write!(f, "probabilistic"),
        }
    }
}

/// Lifecycle status of a step.
///
/// Candidates move `Pending -> Processing -> {Completed | Failed | Pruned}`.
/// Pruned candidates never enter a chain's step list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Pending,
    Processing,
    Completed,
    Failed,
    Pruned,
    /// Waiting for expansion when a strict time budget cut exploration short.
    CircuitBroken,
}

impl StepStatus {
    /// Whether the status is final.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending | Self::Processing)
    }
}

impl std::fmt::Display for StepStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Processing => write!(f, "processing"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
            Self::Pruned => write!(f, "pruned"),
            Self::CircuitBroken => write!(f, "circuit_broken"),
        }
    }
}

/// Pattern id carried by synthetic circular-reference steps.
pub const CIRCULAR_REFERENCE_PATTERN: &str = "circular_reference";

/// Pattern id carried by root steps.
pub const ROOT_PATTERN: &str = "root";

/// One reasoning move from a premise to a conclusion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceStep {
    /// Unique identifier for this step.
    pub id: StepId,

    /// Text this step reasons from.
    pub premise: String,

    /// Text this step concludes.
    pub conclusion: String,

    /// Kind of reasoning used.
    pub category: ReasoningCategory,

    /// Rule pattern that produced this step.
    pub pattern_id: String,

    /// Explanation carried over from the rule template.
    pub rationale: String,

    /// Confidence score (0.0 - 1.0).
    pub confidence: f64,

    /// Distance from the root step.
    pub depth: u32,

    /// Step this one was derived from. A lookup key into the owning chain.
    pub parent_id: Option<StepId>,

    /// Steps derived from this one, in discovery order.
    pub children_ids: Vec<StepId>,

    /// Lifecycle status.
    pub status: StepStatus,

    /// Set on the synthetic step that marks a repeated conclusion.
    pub circular: bool,
}

impl InferenceStep {
    /// Create the root step for a premise.
    ///
    /// The premise is trimmed the same way built conclusions are, so a
    /// derived step that repeats it is recognized as circular.
    pub fn root(premise: impl Into<String>) -> Self {
        let premise = premise.into().trim().to_string();
        Self {
            id: StepId::new(),
            conclusion: premise.clone(),
            premise,
            category: ReasoningCategory::Deductive,
            pattern_id: ROOT_PATTERN.to_string(),
            rationale: "Initial premise".to_string(),
            confidence: 1.0,
            depth: 0,
            parent_id: None,
            children_ids: Vec::new(),
            status: StepStatus::Completed,
            circular: false,
        }
    }

    /// Create the failed marker that stands in for a repeated conclusion.
    pub fn circular_reference(parent: &InferenceStep, repeated: &str) -> Self {
        Self {
            id: StepId::new(),
            premise: parent.conclusion.clone(),
            conclusion: format!("Circular reference: {}", repeated),
            category: parent.category,
            pattern_id: CIRCULAR_REFERENCE_PATTERN.to_string(),
            rationale: format!("Conclusion '{}' already appears in this chain", repeated),
            confidence: 0.0,
            depth: parent.depth + 1,
            parent_id: Some(parent.id),
            children_ids: Vec::new(),
            status: StepStatus::Failed,
            circular: true,
        }
    }

    /// Whether this is the root of its chain.
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Whether the step completed successfully.
    pub fn is_completed(&self) -> bool {
        self.status == StepStatus::Completed
    }
}

/// Kind of problem found between or within steps.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum ContradictionKind {
    /// One conclusion negates the other.
    DirectNegation,
    /// Conclusions differ only by an antonym pair.
    AntonymPair { term: String, opposite: String },
    /// A conditional step commits a named fallacy.
    LogicalFallacy { name: String },
}

impl std::fmt::Display for ContradictionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DirectNegation => write!(f, "direct negation"),
            Self::AntonymPair { term, opposite } => write!(f, "antonyms {}/{}", term, opposite),
            Self::LogicalFallacy { name } => write!(f, "fallacy: {}", name),
        }
    }
}

/// A contradiction or fallacy record referencing the offending steps.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Contradiction {
    /// First (or only) offending step.
    pub first: StepId,
    /// Second step of a conflicting pair; `None` for fallacies.
    pub second: Option<StepId>,
    /// What was detected.
    pub kind: ContradictionKind,
}

impl Contradiction {
    /// Record a conflict between two steps.
    pub fn pair(first: StepId, second: StepId, kind: ContradictionKind) -> Self {
        Self {
            first,
            second: Some(second),
            kind,
        }
    }

    /// Record a fallacy committed by a single step.
    pub fn fallacy(step: StepId, name: impl Into<String>) -> Self {
        Self {
            first: step,
            second: None,
            kind: ContradictionKind::LogicalFallacy { name: name.into() },
        }
    }

    /// Whether the record references the given step.
    pub fn involves(&self, step: &StepId) -> bool {
        self.first == *step || self.second.as_ref() == Some(step)
    }
}

/// How a chain was explored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum ChainStrategy {
    /// Unbiased primary exploration.
    Primary,
    /// Biased re-exploration preferring two categories.
    Alternative {
        index: usize,
        preferred: [ReasoningCategory; 2],
    },
}

impl std::fmt::Display for ChainStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Primary => write!(f, "primary"),
            Self::Alternative { index, preferred } => {
                write!(f, "alternative#{} ({}+{})", index, preferred[0], preferred[1])
            }
        }
    }
}
