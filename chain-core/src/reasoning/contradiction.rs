//! Contradiction and fallacy detection over a finished chain.
//!
//! Every unordered pair of completed steps is compared, so the cost is
//! quadratic in the step count; the step ceiling keeps that bounded.

use crate::reasoning::chain::InferenceChain;
use crate::reasoning::types::{Contradiction, ContradictionKind, InferenceStep, ReasoningCategory};

/// Opposing terms. Multi-word entries are matched as whole token runs.
const ANTONYM_PAIRS: [(&str, &str); 8] = [
    ("true", "false"),
    ("possible", "impossible"),
    ("always", "never"),
    ("exists", "does not exist"),
    ("valid", "invalid"),
    ("all", "none"),
    ("can", "cannot"),
    ("increases", "decreases"),
];

const NEGATION_PREFIX: [&str; 6] = ["it", "is", "not", "the", "case", "that"];

const CONDITIONAL_MARKERS: [&str; 4] = ["if", "when", "unless", "implies"];

const CONCLUSION_MARKERS: [&str; 4] = ["therefore", "thus", "hence", "so"];

const NAMED_FALLACIES: [&str; 5] = [
    "affirming the consequent",
    "denying the antecedent",
    "circular reasoning",
    "false dichotomy",
    "hasty generalization",
];

fn tokens(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric() && c != '\'')
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

fn phrase(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_string).collect()
}

fn contains_phrase(haystack: &[String], needle: &[String]) -> bool {
    !needle.is_empty() && haystack.windows(needle.len()).any(|w| w == needle)
}

/// Replace every occurrence of the token run `from` with `to`.
fn replace_phrase(tokens: &[String], from: &[String], to: &[String]) -> Vec<String> {
    let mut out = Vec::with_capacity(tokens.len());
    let mut i = 0;
    while i < tokens.len() {
        if !from.is_empty() && tokens[i..].starts_with(from) {
            out.extend_from_slice(to);
            i += from.len();
        } else {
            out.push(tokens[i].clone());
            i += 1;
        }
    }
    out
}

/// Strip negations, returning the remaining tokens and how many were removed.
fn strip_negation(tokens: &[String]) -> (Vec<String>, usize) {
    let mut rest = tokens;
    let mut count = 0;

    while rest.len() > NEGATION_PREFIX.len()
        && rest.iter().zip(NEGATION_PREFIX.iter()).all(|(t, p)| t == p)
    {
        rest = &rest[NEGATION_PREFIX.len()..];
        count += 1;
    }

    let mut core = Vec::with_capacity(rest.len());
    for token in rest {
        match token.as_str() {
            "not" | "no" => count += 1,
            t if t.len() > 3 && t.ends_with("n't") => {
                count += 1;
                core.push(t[..t.len() - 3].to_string());
            }
            _ => core.push(token.clone()),
        }
    }

    (core, count)
}

/// Whether two conclusions contradict each other, and how.
pub fn contradicts(a: &str, b: &str) -> Option<ContradictionKind> {
    let ta = tokens(a);
    let tb = tokens(b);
    if ta.is_empty() || tb.is_empty() || ta == tb {
        return None;
    }

    for (term, opposite) in ANTONYM_PAIRS {
        let term_tokens = phrase(term);
        let opposite_tokens = phrase(opposite);

        for (x, y) in [(&ta, &tb), (&tb, &ta)] {
            if contains_phrase(x, &term_tokens)
                && contains_phrase(y, &opposite_tokens)
                && replace_phrase(y, &opposite_tokens, &term_tokens) == *x
            {
                return Some(ContradictionKind::AntonymPair {
                    term: term.to_string(),
                    opposite: opposite.to_string(),
                });
            }
        }
    }

    let (core_a, neg_a) = strip_negation(&ta);
    let (core_b, neg_b) = strip_negation(&tb);
    if !core_a.is_empty() && core_a == core_b && neg_a % 2 != neg_b % 2 {
        return Some(ContradictionKind::DirectNegation);
    }

    None
}

/// Named fallacy committed by a conditional step, if any.
///
/// The step's premise must be conditional and its rationale must draw a
/// conclusion while naming the fallacy.
pub fn fallacy_in(step: &InferenceStep) -> Option<&'static str> {
    if step.category != ReasoningCategory::Conditional {
        return None;
    }

    let premise = tokens(&step.premise);
    if !premise.iter().any(|t| CONDITIONAL_MARKERS.contains(&t.as_str())) {
        return None;
    }

    let rationale = tokens(&step.rationale);
    if !rationale.iter().any(|t| CONCLUSION_MARKERS.contains(&t.as_str())) {
        return None;
    }

    NAMED_FALLACIES
        .iter()
        .find(|name| contains_phrase(&rationale, &phrase(name)))
        .copied()
}

/// Scans completed steps for conflicting conclusions and fallacies.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContradictionDetector;

impl ContradictionDetector {
    pub fn new() -> Self {
        Self
    }

    /// All contradiction records for a chain: pairs first, in discovery
    /// order, then fallacies.
    pub fn detect(&self, chain: &InferenceChain) -> Vec<Contradiction> {
        let completed: Vec<&InferenceStep> = chain.completed_steps().collect();
        let mut found = Vec::new();

        for (i, first) in completed.iter().enumerate() {
            for second in &completed[i + 1..] {
                if let Some(kind) = contradicts(&first.conclusion, &second.conclusion) {
                    found.push(Contradiction::pair(first.id, second.id, kind));
                }
            }
        }

        for step in &completed {
            if let Some(name) = fallacy_in(step) {
                found.push(Contradiction::fallacy(step.id, name));
            }
        }

        found
    }
}
