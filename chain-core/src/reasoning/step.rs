//! Building steps from matched templates.

use crate::error::{Error, Result};
use crate::reasoning::rules::Template;
use crate::reasoning::types::{InferenceStep, StepId, StepStatus};

/// Lowest decay factor; deep steps keep a tenth of their base confidence.
pub const DECAY_FLOOR: f64 = 0.1;

/// Confidence lost per level of depth.
pub const DECAY_PER_DEPTH: f64 = 0.1;

/// Depth-based decay factor: `max(0.1, 1 - depth * 0.1)`.
pub fn decay(depth: u32) -> f64 {
    (1.0 - depth as f64 * DECAY_PER_DEPTH).max(DECAY_FLOOR)
}

/// Reject templates that cannot produce a well-formed step.
pub fn validate_template(template: &Template) -> Result<()> {
    if template.pattern_id.trim().is_empty() {
        return Err(Error::invalid_template("<unnamed>", "pattern id is blank"));
    }
    if !template.base_confidence.is_finite() {
        return Err(Error::invalid_template(
            &template.pattern_id,
            "base confidence is not finite",
        ));
    }
    if template.base_confidence <= 0.0 || template.base_confidence > 1.0 {
        return Err(Error::invalid_template(
            &template.pattern_id,
            format!(
                "base confidence must be in (0, 1], got {}",
                template.base_confidence
            ),
        ));
    }
    if template.conclusion.trim().is_empty() {
        return Err(Error::invalid_template(
            &template.pattern_id,
            "conclusion is blank",
        ));
    }
    Ok(())
}

/// Turns a template plus its parent into a pending child step.
#[derive(Debug, Clone, Copy, Default)]
pub struct StepBuilder;

impl StepBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Build the child of `parent` described by `template`.
    ///
    /// The child sits at `parent.depth + 1` and its confidence is the
    /// template's base confidence times the decay for that depth.
    pub fn build(&self, template: &Template, parent: &InferenceStep) -> Result<InferenceStep> {
        validate_template(template)?;

        let depth = parent.depth + 1;
        let confidence = (template.base_confidence * decay(depth)).clamp(0.0, 1.0);

        Ok(InferenceStep {
            id: StepId::new(),
            premise: parent.conclusion.clone(),
            conclusion: template.conclusion.trim().to_string(),
            category: template.category,
            pattern_id: template.pattern_id.clone(),
            rationale: template.rationale.clone(),
            confidence,
            depth,
            parent_id: Some(parent.id),
            children_ids: Vec::new(),
            status: StepStatus::Pending,
            circular: false,
        })
    }
}
