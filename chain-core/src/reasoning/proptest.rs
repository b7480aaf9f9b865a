//! Property-based tests for chain exploration using proptest.
//!
//! These tests check structural invariants that must hold for any rule
//! matcher and any premise:
//!
//! - Every non-root step sits one level below its parent, and no step is its
//!   own ancestor
//! - Chains never exceed their step ceiling
//! - Confidence decay never drops below its floor
//! - Exploration is deterministic for a deterministic matcher
//! - The engine always terminates with a well-formed result

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use crate::config::EngineConfig;
    use crate::engine::InferenceEngine;
    use crate::reasoning::{
        decay, ChainExplorer, ChainValidator, ExplorationLimits, InferenceChain, ReasoningCategory,
        StepStatus, Template, DECAY_FLOOR, VALIDITY_FLOOR,
    };

    /// Parameters of a synthetic rule graph.
    #[derive(Debug, Clone, Copy)]
    struct Graph {
        width: usize,
        base: f64,
        /// Size of the conclusion space; small values force repeats.
        nodes: u64,
    }

    fn graph() -> impl Strategy<Value = Graph> {
        (1usize..5, 0.05f64..1.0, 2u64..200).prop_map(|(width, base, nodes)| Graph {
            width,
            base,
            nodes,
        })
    }

    fn limits() -> impl Strategy<Value = ExplorationLimits> {
        (1u32..20, 1usize..60, 0.0f64..0.5)
            .prop_map(|(depth, steps, threshold)| ExplorationLimits::new(depth, steps, threshold))
    }

    // Stable across runs, unlike a seeded hasher.
    fn fnv(text: &str) -> u64 {
        text.bytes().fold(0xcbf29ce484222325, |h, b| {
            (h ^ b as u64).wrapping_mul(0x100000001b3)
        })
    }

    fn matcher(g: Graph) -> impl Fn(&str, u32) -> Vec<Template> + Send + Sync {
        move |conclusion: &str, _depth: u32| {
            let h = fnv(conclusion);
            (0..g.width)
                .map(|i| {
                    let category = ReasoningCategory::ALL[(h as usize).wrapping_add(i) % 8];
                    Template::new(
                        category,
                        "graph",
                        g.base,
                        "edge",
                        format!("n{}", (h.wrapping_add(i as u64 * 7919)) % g.nodes),
                    )
                })
                .collect()
        }
    }

    fn explore(g: Graph, limits: ExplorationLimits) -> InferenceChain {
        let m = matcher(g);
        let mut chain = InferenceChain::new("n0", None);
        ChainExplorer::new(&m, limits).explore(&mut chain);
        chain
    }

    fn premise() -> impl Strategy<Value = String> {
        prop_oneof![
            "[a-z]{1,12}".prop_map(|s| format!("All {} are mortal", s)),
            "[a-z]{1,12}".prop_map(|s| format!("If {} rains, then the ground is wet", s)),
            "[a-z]{1,12}".prop_map(|s| format!("Some {} are likely {}", s, s)),
            "[a-z]{1,12}".prop_map(|s| format!("{} causes {} to increase", s, s)),
            "[a-zA-Z ,.]{0,60}",
        ]
    }

    // =========================================================================
    // Structural Properties
    // =========================================================================

    proptest! {
        /// Non-root depth is parent depth + 1; the root has depth 0 and no parent.
        #[test]
        fn depth_follows_parent(g in graph(), l in limits()) {
            let chain = explore(g, l);
            let root = chain.root();
            prop_assert_eq!(root.depth, 0);
            prop_assert!(root.parent_id.is_none());

            for step in chain.steps.iter().skip(1) {
                let parent = chain.parent(&step.id);
                prop_assert!(parent.is_some(), "step {} has no parent", step.id);
                prop_assert_eq!(step.depth, parent.unwrap().depth + 1);
            }
        }

        /// Walking parent links always reaches the root without revisiting a step.
        #[test]
        fn no_step_is_its_own_ancestor(g in graph(), l in limits()) {
            let chain = explore(g, l);
            for step in &chain.steps {
                let path = chain.path_to(&step.id);
                prop_assert!(path.len() <= chain.len());
                prop_assert_eq!(path.first().map(|s| s.id), Some(chain.root().id));

                let mut ids: Vec<_> = path.iter().map(|s| s.id).collect();
                ids.sort_by_key(|id| id.to_string());
                ids.dedup();
                prop_assert_eq!(ids.len(), path.len());
            }
        }

        /// The step ceiling is never exceeded.
        #[test]
        fn step_ceiling_holds(g in graph(), l in limits()) {
            let chain = explore(g, l);
            prop_assert!(chain.len() <= l.max_steps.max(1));
        }

        /// Accepted steps clear the threshold; pruned candidates never appear.
        #[test]
        fn accepted_steps_clear_threshold(g in graph(), l in limits()) {
            let chain = explore(g, l);
            for step in &chain.steps {
                prop_assert_ne!(step.status, StepStatus::Pruned);
                if step.circular {
                    prop_assert_eq!(step.status, StepStatus::Failed);
                    prop_assert!(step.children_ids.is_empty());
                } else if !step.is_root() {
                    prop_assert!(step.confidence >= l.confidence_threshold);
                    prop_assert!(step.depth <= l.max_depth);
                }
            }
        }

        /// Completed conclusions are unique within a chain.
        #[test]
        fn completed_conclusions_are_unique(g in graph(), l in limits()) {
            let chain = explore(g, l);
            let mut seen = std::collections::HashSet::new();
            for step in chain.completed_steps() {
                prop_assert!(seen.insert(step.conclusion.clone()), "repeat: {}", step.conclusion);
            }
        }

        /// Same matcher, same limits, same chain.
        #[test]
        fn exploration_is_deterministic(g in graph(), l in limits()) {
            prop_assert_eq!(explore(g, l).fingerprint(), explore(g, l).fingerprint());
        }

        /// Validation yields a confidence in [0, 1] and agrees with the floor.
        #[test]
        fn validation_is_consistent(g in graph(), l in limits()) {
            let mut chain = explore(g, l);
            ChainValidator::new().validate(&mut chain);
            prop_assert!((0.0..=1.0).contains(&chain.total_confidence));
            prop_assert_eq!(chain.chain_valid, chain.penalty > VALIDITY_FLOOR);
        }
    }

    // =========================================================================
    // Decay Properties
    // =========================================================================

    proptest! {
        /// Decay stays within [floor, 1] and never increases with depth.
        #[test]
        fn decay_is_bounded_and_monotonic(depth in 0u32..1000) {
            let d = decay(depth);
            prop_assert!(d >= DECAY_FLOOR);
            prop_assert!(d <= 1.0);
            prop_assert!(decay(depth + 1) <= d);
        }
    }

    // =========================================================================
    // Engine Properties
    // =========================================================================

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        /// Any premise yields a well-formed result within the ceilings.
        #[test]
        fn engine_terminates_with_bounded_chains(p in premise()) {
            let engine = InferenceEngine::new(EngineConfig::default()).unwrap();
            let result = engine.infer(&p, None, None);

            if p.trim().is_empty() {
                prop_assert!(!result.success);
                prop_assert!(result.primary_chain.is_none());
            } else {
                prop_assert!(result.success, "failed: {:?}", result.error_message);
                prop_assert!(result.alternative_chains.len() <= 3);
                for chain in result.chains() {
                    prop_assert!(chain.len() <= 50);
                    prop_assert!(chain.max_depth_reached <= 15);
                }
                prop_assert!((0.0..=1.0).contains(&result.reasoning_quality));
            }
        }
    }
}
