// Copyright 2026 the Multilayer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Configuration-time checks for rule declarations.

use core::fmt;

use super::{RuleDecl, RuleGraph, RuleTable};
use crate::layer::{LayerIndex, MAX_LAYERS};

/// A malformed rule declaration.
///
/// `rule` is the position of the offending declaration in the input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RuleError {
    /// The declaration lists no if-layers, so its then-layer would be
    /// permanently active.
    EmptyIfLayers {
        /// Declaration index.
        rule: usize,
    },
    /// An if-layer or the then-layer does not fit in the layer-state mask.
    LayerOutOfRange {
        /// Declaration index.
        rule: usize,
        /// The offending layer.
        layer: LayerIndex,
    },
    /// The then-layer is also one of its own if-layers.
    ThenLayerIsIfLayer {
        /// Declaration index.
        rule: usize,
        /// The layer listed on both sides.
        layer: LayerIndex,
    },
    /// The rule closes a dependency cycle with earlier rules.
    FeedbackCycle {
        /// Declaration index.
        rule: usize,
        /// Then-layer of the rule that closes the cycle.
        then_layer: LayerIndex,
    },
}

impl fmt::Display for RuleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyIfLayers { rule } => write!(f, "rule {rule} has no if-layers"),
            Self::LayerOutOfRange { rule, layer } => write!(
                f,
                "rule {rule} references layer {layer}, beyond the {MAX_LAYERS}-layer limit"
            ),
            Self::ThenLayerIsIfLayer { rule, layer } => {
                write!(f, "rule {rule} lists then-layer {layer} among its if-layers")
            }
            Self::FeedbackCycle { rule, then_layer } => write!(
                f,
                "rule {rule} (then-layer {then_layer}) closes a feedback cycle between rules"
            ),
        }
    }
}

impl core::error::Error for RuleError {}

/// Checks rule declarations before they are turned into a
/// [`RuleTable`].
///
/// Per-declaration checks run first, in order; the feedback-cycle check
/// runs over the whole list once every declaration is well formed.
///
/// # Errors
///
/// Returns the first [`RuleError`] found.
pub fn validate(decls: &[RuleDecl<'_>]) -> Result<(), RuleError> {
    for (rule, decl) in decls.iter().enumerate() {
        if decl.if_layers.is_empty() {
            return Err(RuleError::EmptyIfLayers { rule });
        }
        if let Some(&layer) = decl.if_layers.iter().find(|layer| !layer.is_valid()) {
            return Err(RuleError::LayerOutOfRange { rule, layer });
        }
        if !decl.then_layer.is_valid() {
            return Err(RuleError::LayerOutOfRange {
                rule,
                layer: decl.then_layer,
            });
        }
        if decl.if_layers.contains(&decl.then_layer) {
            return Err(RuleError::ThenLayerIsIfLayer {
                rule,
                layer: decl.then_layer,
            });
        }
    }

    let graph = RuleGraph::new(&RuleTable::from_decls(decls));
    if let Some((rule, then_layer)) = graph.feedback_cycle() {
        return Err(RuleError::FeedbackCycle { rule, then_layer });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::*;

    const LOWER: LayerIndex = LayerIndex(1);
    const RAISE: LayerIndex = LayerIndex(2);
    const ADJUST: LayerIndex = LayerIndex(3);

    #[test]
    fn tri_layer_is_valid() {
        let decls = [RuleDecl {
            if_layers: &[LOWER, RAISE],
            then_layer: ADJUST,
        }];
        assert_eq!(validate(&decls), Ok(()));
        let table = RuleTable::try_from_decls(&decls).unwrap();
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn empty_if_layers_rejected() {
        let decls = [
            RuleDecl {
                if_layers: &[LOWER, RAISE],
                then_layer: ADJUST,
            },
            RuleDecl {
                if_layers: &[],
                then_layer: LayerIndex(4),
            },
        ];
        assert_eq!(validate(&decls), Err(RuleError::EmptyIfLayers { rule: 1 }));
    }

    #[test]
    fn out_of_range_if_layer_rejected() {
        let decls = [RuleDecl {
            if_layers: &[LOWER, LayerIndex(MAX_LAYERS)],
            then_layer: ADJUST,
        }];
        assert_eq!(
            validate(&decls),
            Err(RuleError::LayerOutOfRange {
                rule: 0,
                layer: LayerIndex(MAX_LAYERS),
            })
        );
    }

    #[test]
    fn out_of_range_then_layer_rejected() {
        let decls = [RuleDecl {
            if_layers: &[LOWER],
            then_layer: LayerIndex(99),
        }];
        assert_eq!(
            validate(&decls),
            Err(RuleError::LayerOutOfRange {
                rule: 0,
                layer: LayerIndex(99),
            })
        );
    }

    #[test]
    fn self_referencing_rule_rejected() {
        let decls = [RuleDecl {
            if_layers: &[LOWER, ADJUST],
            then_layer: ADJUST,
        }];
        assert_eq!(
            validate(&decls),
            Err(RuleError::ThenLayerIsIfLayer {
                rule: 0,
                layer: ADJUST,
            })
        );
    }

    #[test]
    fn feedback_cycle_rejected() {
        let decls = [
            RuleDecl {
                if_layers: &[LOWER],
                then_layer: RAISE,
            },
            RuleDecl {
                if_layers: &[RAISE],
                then_layer: LOWER,
            },
        ];
        let err = RuleTable::try_from_decls(&decls).unwrap_err();
        assert_eq!(
            err,
            RuleError::FeedbackCycle {
                rule: 1,
                then_layer: LOWER,
            }
        );
        assert!(
            err.to_string().contains("feedback cycle"),
            "message: {err}"
        );
    }

    #[test]
    fn display_names_the_rule() {
        let err = RuleError::EmptyIfLayers { rule: 7 };
        assert_eq!(err.to_string(), "rule 7 has no if-layers");
    }
}
