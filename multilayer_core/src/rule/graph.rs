// Copyright 2026 the Multilayer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dependency graph between layers induced by a rule table.

use understory_dirty::{CycleHandling, DirtyTracker, EagerPolicy};

use super::RuleTable;
use crate::dirty;
use crate::layer::{LayerIndex, LayerStateMask};

/// Which then-layers depend, directly or through other rules, on which
/// layers.
///
/// Every rule adds an edge from its then-layer to each of its if-layers.
/// Edges that would close a cycle are refused; the first refusal is kept as
/// the table's [feedback cycle](Self::feedback_cycle). A table with a
/// feedback cycle can latch a then-layer on or make evaluation oscillate, so
/// [`validate`](super::validate) rejects it.
#[derive(Debug)]
pub struct RuleGraph {
    tracker: DirtyTracker<u32>,
    cycle: Option<(usize, LayerIndex)>,
}

impl RuleGraph {
    /// Builds the graph for `table`.
    #[must_use]
    pub fn new(table: &RuleTable<'_>) -> Self {
        let mut tracker = DirtyTracker::with_cycle_handling(CycleHandling::Error);
        let mut cycle = None;

        for (rule_index, rule) in table.iter().enumerate() {
            let then = u32::from(rule.then_layer.get());
            for if_layer in rule.if_mask {
                let refused = tracker
                    .add_dependency(then, u32::from(if_layer.get()), dirty::ACTIVATION)
                    .is_err();
                if refused && cycle.is_none() {
                    cycle = Some((rule_index, rule.then_layer));
                }
            }
        }

        Self { tracker, cycle }
    }

    /// Returns the first rule (index and then-layer) whose dependency edge
    /// would have closed a cycle, if any.
    #[must_use]
    pub fn feedback_cycle(&self) -> Option<(usize, LayerIndex)> {
        self.cycle
    }

    /// Returns every then-layer whose rule outcome can change, directly or
    /// through chained rules, when `layer` changes.
    ///
    /// `layer` itself is not included. Edges refused as cycles are not
    /// followed, so the answer is only complete for acyclic tables.
    pub fn downstream(&mut self, layer: LayerIndex) -> LayerStateMask {
        let key = u32::from(layer.get());
        self.tracker
            .mark_with(key, dirty::ACTIVATION, &EagerPolicy);
        self.tracker
            .drain(dirty::ACTIVATION)
            .affected()
            .deterministic()
            .run()
            .filter(|&k| k != key)
            .filter_map(|k| u8::try_from(k).ok())
            .map(LayerIndex)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::MultiLayerRule;

    const A: LayerIndex = LayerIndex(1);
    const B: LayerIndex = LayerIndex(2);
    const C: LayerIndex = LayerIndex(3);
    const D: LayerIndex = LayerIndex(4);

    #[test]
    fn tri_layer_downstream() {
        let rules = [MultiLayerRule::new(&[A, B], C)];
        let mut graph = RuleGraph::new(&RuleTable::from_static(&rules));

        assert_eq!(graph.downstream(A), LayerStateMask::from_layer(C));
        assert_eq!(graph.downstream(B), LayerStateMask::from_layer(C));
        assert!(graph.downstream(C).is_empty(), "nothing depends on C");
        assert!(graph.feedback_cycle().is_none());
    }

    #[test]
    fn chained_rules_propagate() {
        let rules = [
            MultiLayerRule::new(&[A], B),
            MultiLayerRule::new(&[B], C),
            MultiLayerRule::new(&[C, D], LayerIndex(5)),
        ];
        let mut graph = RuleGraph::new(&RuleTable::from_static(&rules));

        assert_eq!(
            graph.downstream(A),
            LayerStateMask::from_layers(&[B, C, LayerIndex(5)])
        );
        assert_eq!(graph.downstream(D), LayerStateMask::from_layer(LayerIndex(5)));
    }

    #[test]
    fn downstream_is_repeatable() {
        let rules = [MultiLayerRule::new(&[A], B)];
        let mut graph = RuleGraph::new(&RuleTable::from_static(&rules));

        let first = graph.downstream(A);
        let second = graph.downstream(A);
        assert_eq!(first, second, "drain leaves no residue between queries");
    }

    #[test]
    fn unrelated_layer_has_no_downstream() {
        let rules = [MultiLayerRule::new(&[A], B)];
        let mut graph = RuleGraph::new(&RuleTable::from_static(&rules));
        assert!(graph.downstream(D).is_empty());
    }

    #[test]
    fn two_rule_loop_is_a_feedback_cycle() {
        let rules = [MultiLayerRule::new(&[A], B), MultiLayerRule::new(&[B], A)];
        let graph = RuleGraph::new(&RuleTable::from_static(&rules));
        assert_eq!(graph.feedback_cycle(), Some((1, A)));
    }

    #[test]
    fn longer_loop_is_a_feedback_cycle() {
        let rules = [
            MultiLayerRule::new(&[A, D], B),
            MultiLayerRule::new(&[B], C),
            MultiLayerRule::new(&[C], A),
        ];
        let graph = RuleGraph::new(&RuleTable::from_static(&rules));
        assert_eq!(graph.feedback_cycle(), Some((2, A)));
    }

    #[test]
    fn shared_then_layer_is_not_a_cycle() {
        let rules = [MultiLayerRule::new(&[A, B], C), MultiLayerRule::new(&[D], C)];
        let graph = RuleGraph::new(&RuleTable::from_static(&rules));
        assert!(graph.feedback_cycle().is_none());
    }
}
