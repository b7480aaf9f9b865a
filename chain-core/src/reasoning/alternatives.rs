//! Alternative strategies for weak primary chains.
//!
//! Each strategy re-explores the premise with a tighter depth ceiling, a
//! smaller step ceiling, a raised acceptance threshold and a confidence
//! boost for two preferred reasoning categories.

use crate::config::EngineConfig;
use crate::reasoning::chain::InferenceChain;
use crate::reasoning::explorer::{ChainExplorer, ExplorationLimits};
use crate::reasoning::rules::{RuleMatcher, Template};
use crate::reasoning::types::{ChainStrategy, ReasoningCategory};
use serde_json::Value;
use std::collections::HashMap;
use std::time::Instant;
use tracing::debug;

/// Boost applied to templates of preferred categories.
pub const BIAS_MULTIPLIER: f64 = 1.3;

/// Factor applied to the acceptance threshold.
pub const THRESHOLD_MULTIPLIER: f64 = 1.2;

/// Most alternatives generated for one query.
pub const MAX_ALTERNATIVES: usize = 3;

/// Depth ceiling for alternatives, before the configured max depth.
pub const ALTERNATIVE_DEPTH_CAP: u32 = 10;

/// Preferred categories per strategy index.
const BIAS_TABLE: [[ReasoningCategory; 2]; MAX_ALTERNATIVES] = [
    [ReasoningCategory::Inductive, ReasoningCategory::Abductive],
    [ReasoningCategory::Analogical, ReasoningCategory::Causal],
    [ReasoningCategory::Probabilistic, ReasoningCategory::Temporal],
];

/// Category preference for one alternative strategy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrategyBias {
    pub index: usize,
    pub preferred: [ReasoningCategory; 2],
    pub multiplier: f64,
}

impl StrategyBias {
    /// Bias for a strategy index (wraps around the table).
    pub fn for_index(index: usize) -> Self {
        Self {
            index,
            preferred: BIAS_TABLE[index % BIAS_TABLE.len()],
            multiplier: BIAS_MULTIPLIER,
        }
    }

    pub fn prefers(&self, category: ReasoningCategory) -> bool {
        self.preferred.contains(&category)
    }

    /// Boost a template's base confidence if its category is preferred,
    /// capped at 1.0.
    pub fn apply(&self, mut template: Template) -> Template {
        if self.prefers(template.category) {
            template.base_confidence = (template.base_confidence * self.multiplier).min(1.0);
        }
        template
    }

    pub fn strategy(&self) -> ChainStrategy {
        ChainStrategy::Alternative {
            index: self.index,
            preferred: self.preferred,
        }
    }
}

/// Whether a validated primary chain is weak enough to try alternatives.
pub fn needs_alternatives(primary: &InferenceChain) -> bool {
    primary.max_depth_reached < 3
        || primary.total_confidence < 0.5
        || !primary.contradictions_found.is_empty()
}

/// Number of alternatives allowed for a `max_chains` setting.
pub fn alternative_count(max_chains: usize) -> usize {
    max_chains.saturating_sub(1).min(MAX_ALTERNATIVES)
}

/// Everything needed to run alternative strategies for one query.
///
/// Owns its inputs so strategies can be explored on other threads.
#[derive(Debug, Clone)]
pub struct AlternativePlan {
    pub premise: String,
    pub target: Option<String>,
    pub context: Option<HashMap<String, Value>>,
    pub limits: ExplorationLimits,
    pub count: usize,
}

impl AlternativePlan {
    pub fn new(
        premise: impl Into<String>,
        target: Option<String>,
        context: Option<HashMap<String, Value>>,
        config: &EngineConfig,
        deadline: Option<Instant>,
    ) -> Self {
        let mut limits = ExplorationLimits::new(
            config.max_depth.min(ALTERNATIVE_DEPTH_CAP),
            config.alternative_step_limit,
            config.confidence_threshold * THRESHOLD_MULTIPLIER,
        );
        limits.deadline = deadline;

        Self {
            premise: premise.into(),
            target,
            context,
            limits,
            count: alternative_count(config.max_chains),
        }
    }

    /// Explore the strategy at `index`.
    ///
    /// Returns `None` when the strategy never gets past the root.
    pub fn explore(&self, matcher: &dyn RuleMatcher, index: usize) -> Option<InferenceChain> {
        let bias = StrategyBias::for_index(index);
        let mut chain = InferenceChain::new(self.premise.clone(), self.target.clone())
            .with_strategy(bias.strategy())
            .with_context(self.context.clone());

        let report = ChainExplorer::new(matcher, self.limits)
            .with_bias(bias)
            .explore(&mut chain);

        if chain.max_depth_reached == 0 {
            debug!(index, "Alternative strategy produced no depth, dropping");
            return None;
        }

        debug!(
            index,
            steps = chain.len(),
            depth = chain.max_depth_reached,
            pruned = report.pruned,
            "Alternative strategy explored"
        );
        Some(chain)
    }

    /// Explore every strategy in index order.
    pub fn explore_all(&self, matcher: &dyn RuleMatcher) -> Vec<InferenceChain> {
        (0..self.count)
            .filter_map(|index| self.explore(matcher, index))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reasoning::explorer::ALTERNATIVE_STEP_LIMIT;
    use crate::reasoning::rules::PatternRuleSet;
    use crate::reasoning::types::{Contradiction, ContradictionKind, StepId};

    #[test]
    fn test_bias_table() {
        assert!(StrategyBias::for_index(0).prefers(ReasoningCategory::Abductive));
        assert!(StrategyBias::for_index(1).prefers(ReasoningCategory::Causal));
        assert!(StrategyBias::for_index(2).prefers(ReasoningCategory::Temporal));
        assert!(!StrategyBias::for_index(2).prefers(ReasoningCategory::Deductive));
        assert_eq!(StrategyBias::for_index(3).preferred, StrategyBias::for_index(0).preferred);
    }

    #[test]
    fn test_bias_caps_at_one() {
        let bias = StrategyBias::for_index(1);
        let t = Template::new(ReasoningCategory::Causal, "c", 0.9, "", "x");
        assert_eq!(bias.apply(t).base_confidence, 1.0);

        let untouched = Template::new(ReasoningCategory::Deductive, "d", 0.9, "", "x");
        assert_eq!(bias.apply(untouched).base_confidence, 0.9);
    }

    #[test]
    fn test_alternative_count() {
        assert_eq!(alternative_count(5), 3);
        assert_eq!(alternative_count(3), 2);
        assert_eq!(alternative_count(1), 0);
        assert_eq!(alternative_count(0), 0);
    }

    #[test]
    fn test_needs_alternatives() {
        let mut chain = InferenceChain::new("p", None);
        chain.max_depth_reached = 4;
        chain.total_confidence = 0.8;
        assert!(!needs_alternatives(&chain));

        chain.total_confidence = 0.4;
        assert!(needs_alternatives(&chain));

        chain.total_confidence = 0.8;
        chain.max_depth_reached = 2;
        assert!(needs_alternatives(&chain));

        // Deep and confident, but contradictory.
        chain.max_depth_reached = 4;
        chain.contradictions_found.push(Contradiction::pair(
            StepId::new(),
            StepId::new(),
            ContradictionKind::DirectNegation,
        ));
        assert!(needs_alternatives(&chain));
    }

    #[test]
    fn test_plan_limits() {
        let config = EngineConfig::default();
        let plan = AlternativePlan::new("p", None, None, &config, None);
        assert_eq!(plan.limits.max_depth, 10);
        assert_eq!(plan.limits.max_steps, ALTERNATIVE_STEP_LIMIT);
        assert!((plan.limits.confidence_threshold - 0.12).abs() < 1e-12);
        assert_eq!(plan.count, 3);

        let shallow = EngineConfig::default().with_max_depth(4);
        let plan = AlternativePlan::new("p", None, None, &shallow, None);
        assert_eq!(plan.limits.max_depth, 4);
    }

    #[test]
    fn test_explore_all_tags_strategies() {
        let rules = PatternRuleSet::new();
        let plan = AlternativePlan::new("All humans are mortal", None, None, &EngineConfig::default(), None);
        let chains = plan.explore_all(&rules);

        assert_eq!(chains.len(), 3);
        for (i, chain) in chains.iter().enumerate() {
            assert!(matches!(chain.strategy, ChainStrategy::Alternative { index, .. } if index == i));
            assert!(chain.len() <= ALTERNATIVE_STEP_LIMIT);
        }
    }

    #[test]
    fn test_rootless_alternatives_dropped() {
        let rules = PatternRuleSet::new();
        let plan = AlternativePlan::new("hello", None, None, &EngineConfig::default(), None);
        assert!(plan.explore_all(&rules).is_empty());
    }
}
