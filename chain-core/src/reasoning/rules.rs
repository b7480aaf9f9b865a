//! Rule matching: turning a conclusion into candidate inference templates.
//!
//! The default [`PatternRuleSet`] is an ordered table of lexical rules. Each
//! rule is a case-insensitive regex plus a builder that phrases the derived
//! conclusion. Rules are evaluated in table order, so identical input always
//! yields the identical template sequence.

use crate::reasoning::types::ReasoningCategory;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// A candidate inference produced by a rule match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    /// Kind of reasoning the rule applies.
    pub category: ReasoningCategory,
    /// Stable identifier of the rule.
    pub pattern_id: String,
    /// Confidence before depth decay.
    pub base_confidence: f64,
    /// Why the rule applies.
    pub rationale: String,
    /// Conclusion the rule derives.
    pub conclusion: String,
}

impl Template {
    pub fn new(
        category: ReasoningCategory,
        pattern_id: impl Into<String>,
        base_confidence: f64,
        rationale: impl Into<String>,
        conclusion: impl Into<String>,
    ) -> Self {
        Self {
            category,
            pattern_id: pattern_id.into(),
            base_confidence,
            rationale: rationale.into(),
            conclusion: conclusion.into(),
        }
    }
}

/// Source of candidate inferences.
///
/// Implementations must be pure and deterministic: the same
/// `(conclusion, depth)` must always produce the same templates in the same
/// order. Returning an empty vector means nothing applies.
pub trait RuleMatcher: Send + Sync {
    fn match_rules(&self, conclusion: &str, depth: u32) -> Vec<Template>;
}

impl<F> RuleMatcher for F
where
    F: Fn(&str, u32) -> Vec<Template> + Send + Sync,
{
    fn match_rules(&self, conclusion: &str, depth: u32) -> Vec<Template> {
        self(conclusion, depth)
    }
}

type Phrase = fn(&Captures<'_>) -> Option<(String, String)>;

/// One entry of the rule table.
struct Rule {
    pattern_id: &'static str,
    category: ReasoningCategory,
    base_confidence: f64,
    pattern: &'static LazyLock<Regex>,
    /// Only applied while the matched step is shallower than this.
    below_depth: Option<u32>,
    /// Returns `(conclusion, rationale)`, or `None` when a guard rejects the match.
    phrase: Phrase,
}

// Lazy-initialized regex patterns
static UNIVERSAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:all|every)\s+(?P<subject>.+?)\s+(?:are|is)\s+(?P<predicate>.+?)\.?$")
        .expect("invalid regex")
});

static MEMBERSHIP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^any one of the\s+(?P<subject>.+?)\s+is\s+(?P<predicate>.+?)\.?$")
        .expect("invalid regex")
});

static CONDITIONAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^if\s+(?P<antecedent>.+?),?\s+then\s+(?P<consequent>.+?)\.?$")
        .expect("invalid regex")
});

static CAUSAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?P<cause>.+?)\s+(?:causes|leads to|results in|produces)\s+(?P<effect>.+?)\.?$")
        .expect("invalid regex")
});

static TEMPORAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:after|once|when|before)\s+(?P<event>.+?),\s*(?P<outcome>.+?)\.?$")
        .expect("invalid regex")
});

static INDUCTIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:some|many|several)\s+(?P<subject>.+?)\s+(?:are|is)\s+(?P<predicate>.+?)\.?$")
        .expect("invalid regex")
});

static PROBABILISTIC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?P<body>.*\b(?:likely|probably|usually|often|most)\b.*?)\.?$")
        .expect("invalid regex")
});

static ANALOGICAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?P<source>.+?)\s+(?:is|are)\s+(?:like|similar to|analogous to)\s+(?P<target>.+?)\.?$")
        .expect("invalid regex")
});

static ABDUCTIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?P<subject>.+?)\s+(?:is|are)\s+(?P<predicate>.+?)\.?$")
        .expect("invalid regex")
});

fn cap<'a>(caps: &'a Captures<'_>, name: &str) -> &'a str {
    caps.name(name).map(|m| m.as_str().trim()).unwrap_or("")
}

fn lower_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn upper_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn has_negation(text: &str) -> bool {
    text.split_whitespace()
        .any(|w| w.eq_ignore_ascii_case("not") || w.eq_ignore_ascii_case("no"))
}

static RULES: [Rule; 11] = [
    Rule {
        pattern_id: "universal_instantiation",
        category: ReasoningCategory::Deductive,
        base_confidence: 0.9,
        pattern: &UNIVERSAL,
        below_depth: None,
        phrase: |c| {
            Some((
                format!("Any one of the {} is {}", cap(c, "subject"), cap(c, "predicate")),
                "A universal claim holds for each of its instances".to_string(),
            ))
        },
    },
    Rule {
        pattern_id: "membership_syllogism",
        category: ReasoningCategory::Deductive,
        base_confidence: 0.8,
        pattern: &MEMBERSHIP,
        below_depth: None,
        phrase: |c| {
            Some((
                format!(
                    "Whatever is shown to be one of the {} is {}",
                    cap(c, "subject"),
                    cap(c, "predicate")
                ),
                "Membership in the class carries the class property".to_string(),
            ))
        },
    },
    Rule {
        pattern_id: "modus_ponens",
        category: ReasoningCategory::Conditional,
        base_confidence: 0.85,
        pattern: &CONDITIONAL,
        below_depth: None,
        phrase: |c| {
            Some((
                format!(
                    "Given that {}, {}",
                    lower_first(cap(c, "antecedent")),
                    lower_first(cap(c, "consequent"))
                ),
                "Modus ponens: affirming the antecedent yields the consequent".to_string(),
            ))
        },
    },
    Rule {
        pattern_id: "contrapositive",
        category: ReasoningCategory::Conditional,
        base_confidence: 0.75,
        pattern: &CONDITIONAL,
        below_depth: None,
        phrase: |c| {
            let antecedent = cap(c, "antecedent");
            let consequent = cap(c, "consequent");
            if has_negation(antecedent) || has_negation(consequent) {
                return None;
            }
            Some((
                format!(
                    "If it is not the case that {}, then it is not the case that {}",
                    lower_first(consequent),
                    lower_first(antecedent)
                ),
                "Contraposition preserves the truth of a conditional".to_string(),
            ))
        },
    },
    Rule {
        pattern_id: "affirming_consequent",
        category: ReasoningCategory::Conditional,
        base_confidence: 0.4,
        pattern: &CONDITIONAL,
        below_depth: None,
        phrase: |c| {
            Some((
                format!(
                    "{}, since {}",
                    upper_first(cap(c, "antecedent")),
                    lower_first(cap(c, "consequent"))
                ),
                "The consequent holds, therefore the antecedent is assumed \
                 (affirming the consequent)"
                    .to_string(),
            ))
        },
    },
    Rule {
        pattern_id: "causal_chain",
        category: ReasoningCategory::Causal,
        base_confidence: 0.7,
        pattern: &CAUSAL,
        below_depth: None,
        phrase: |c| {
            Some((
                format!(
                    "{} is expected wherever {} is present",
                    upper_first(cap(c, "effect")),
                    lower_first(cap(c, "cause"))
                ),
                "A stated cause predicts its effect".to_string(),
            ))
        },
    },
    Rule {
        pattern_id: "temporal_succession",
        category: ReasoningCategory::Temporal,
        base_confidence: 0.65,
        pattern: &TEMPORAL,
        below_depth: None,
        phrase: |c| {
            Some((
                format!(
                    "{} follows {} in time",
                    upper_first(cap(c, "outcome")),
                    lower_first(cap(c, "event"))
                ),
                "Events keep their stated order".to_string(),
            ))
        },
    },
    Rule {
        pattern_id: "inductive_generalization",
        category: ReasoningCategory::Inductive,
        base_confidence: 0.6,
        pattern: &INDUCTIVE,
        below_depth: None,
        phrase: |c| {
            Some((
                format!("Most {} are probably {}", cap(c, "subject"), cap(c, "predicate")),
                "Observed instances suggest a general tendency".to_string(),
            ))
        },
    },
    Rule {
        pattern_id: "statistical_inference",
        category: ReasoningCategory::Probabilistic,
        base_confidence: 0.6,
        pattern: &PROBABILISTIC,
        below_depth: None,
        phrase: |c| {
            let body = cap(c, "body");
            if body.to_lowercase().starts_with("it is probable that") {
                return None;
            }
            Some((
                format!("It is probable that {}", lower_first(body)),
                "Hedged frequency language supports a likelihood estimate".to_string(),
            ))
        },
    },
    Rule {
        pattern_id: "analogical_transfer",
        category: ReasoningCategory::Analogical,
        base_confidence: 0.55,
        pattern: &ANALOGICAL,
        below_depth: None,
        phrase: |c| {
            Some((
                format!(
                    "Properties of {} may also hold for {}",
                    lower_first(cap(c, "target")),
                    lower_first(cap(c, "source"))
                ),
                "Similar things tend to share properties".to_string(),
            ))
        },
    },
    Rule {
        pattern_id: "best_explanation",
        category: ReasoningCategory::Abductive,
        base_confidence: 0.5,
        pattern: &ABDUCTIVE,
        below_depth: Some(1),
        phrase: |c| {
            let subject = cap(c, "subject");
            let predicate = cap(c, "predicate");
            let lowered = subject.to_lowercase();
            if ["if ", "it ", "there "].iter().any(|p| lowered.starts_with(p)) {
                return None;
            }
            Some((
                format!(
                    "An underlying cause explains why {} {} {}",
                    lower_first(subject),
                    if c.get(0).map_or(false, |m| m.as_str().contains(" are ")) {
                        "are"
                    } else {
                        "is"
                    },
                    predicate
                ),
                "The simplest explanation of an observation is preferred".to_string(),
            ))
        },
    },
];

/// Default lexical rule set.
#[derive(Debug, Clone, Default)]
pub struct PatternRuleSet {
    /// Pattern ids to skip.
    disabled: Vec<String>,
}

impl PatternRuleSet {
    /// Create a rule set with every rule enabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Disable a rule by pattern id.
    pub fn without(mut self, pattern_id: impl Into<String>) -> Self {
        self.disabled.push(pattern_id.into());
        self
    }

    /// Pattern ids in evaluation order.
    pub fn pattern_ids() -> Vec<&'static str> {
        RULES.iter().map(|r| r.pattern_id).collect()
    }
}

impl RuleMatcher for PatternRuleSet {
    fn match_rules(&self, conclusion: &str, depth: u32) -> Vec<Template> {
        let text = conclusion.trim();
        let mut templates = Vec::new();

        for rule in RULES.iter() {
            if self.disabled.iter().any(|d| d == rule.pattern_id) {
                continue;
            }
            if rule.below_depth.map_or(false, |limit| depth >= limit) {
                continue;
            }
            let Some(caps) = rule.pattern.captures(text) else {
                continue;
            };
            if let Some((derived, rationale)) = (rule.phrase)(&caps) {
                templates.push(Template::new(
                    rule.category,
                    rule.pattern_id,
                    rule.base_confidence,
                    rationale,
                    derived,
                ));
            }
        }

        templates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ids(templates: &[Template]) -> Vec<&str> {
        templates.iter().map(|t| t.pattern_id.as_str()).collect()
    }

    #[test]
    fn test_universal_instantiation() {
        let rules = PatternRuleSet::new();
        let templates = rules.match_rules("All humans are mortal", 0);

        let first = &templates[0];
        assert_eq!(first.pattern_id, "universal_instantiation");
        assert_eq!(first.category, ReasoningCategory::Deductive);
        assert_eq!(first.base_confidence, 0.9);
        assert_eq!(first.conclusion, "Any one of the humans is mortal");
    }

    #[test]
    fn test_membership_follows_instantiation() {
        let rules = PatternRuleSet::new();
        let templates = rules.match_rules("Any one of the humans is mortal", 1);
        assert_eq!(ids(&templates), vec!["membership_syllogism"]);
        assert_eq!(
            templates[0].conclusion,
            "Whatever is shown to be one of the humans is mortal"
        );
    }

    #[test]
    fn test_conditional_rules_in_order() {
        let rules = PatternRuleSet::new();
        let templates = rules.match_rules("If it rains, then the ground is wet", 0);
        assert_eq!(
            ids(&templates),
            vec!["modus_ponens", "contrapositive", "affirming_consequent"]
        );
        assert_eq!(templates[0].conclusion, "Given that it rains, the ground is wet");
        assert!(templates[2].rationale.contains("affirming the consequent"));
    }

    #[test]
    fn test_contrapositive_skips_negated_parts() {
        let rules = PatternRuleSet::new();
        let templates = rules.match_rules("If it is not raining, then the road is dry", 0);
        assert!(!ids(&templates).contains(&"contrapositive"));
    }

    #[test]
    fn test_causal_and_temporal() {
        let rules = PatternRuleSet::new();
        let causal = rules.match_rules("Heat causes expansion", 2);
        assert_eq!(ids(&causal), vec!["causal_chain"]);
        assert_eq!(causal[0].conclusion, "Expansion is expected wherever heat is present");

        let temporal = rules.match_rules("After the storm, the river rose", 2);
        assert_eq!(ids(&temporal), vec!["temporal_succession"]);
    }

    #[test]
    fn test_abductive_only_at_root() {
        let rules = PatternRuleSet::new();
        let at_root = rules.match_rules("The lawn is wet", 0);
        assert_eq!(ids(&at_root), vec!["best_explanation"]);
        assert!(rules.match_rules("The lawn is wet", 1).is_empty());
    }

    #[test]
    fn test_probabilistic_does_not_nest() {
        let rules = PatternRuleSet::new();
        let first = rules.match_rules("Cats usually sleep at noon", 1);
        assert_eq!(ids(&first), vec!["statistical_inference"]);
        let again = rules.match_rules(&first[0].conclusion, 2);
        assert!(again.is_empty());
    }

    #[test]
    fn test_no_match_is_empty() {
        let rules = PatternRuleSet::new();
        assert!(rules.match_rules("hello", 0).is_empty());
        assert!(rules.match_rules("", 0).is_empty());
    }

    #[test]
    fn test_deterministic() {
        let rules = PatternRuleSet::new();
        let a = rules.match_rules("Some birds are migratory", 0);
        let b = rules.match_rules("Some birds are migratory", 0);
        assert_eq!(a, b);
    }

    #[test]
    fn test_disabled_rule() {
        let rules = PatternRuleSet::new().without("affirming_consequent");
        let templates = rules.match_rules("If A, then B", 0);
        assert!(!ids(&templates).contains(&"affirming_consequent"));
        assert_eq!(PatternRuleSet::pattern_ids().len(), 11);
    }

    #[test]
    fn test_closure_matcher() {
        let matcher = |conclusion: &str, _depth: u32| {
            vec![Template::new(
                ReasoningCategory::Causal,
                "echo",
                0.5,
                "echo",
                conclusion.to_string(),
            )]
        };
        let templates = matcher.match_rules("x", 0);
        assert_eq!(templates[0].conclusion, "x");
    }
}
