// Copyright 2026 the Multilayer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Multi-layer rules and the rule table.
//!
//! A [`MultiLayerRule`] pairs a conjunction of *if-layers* (stored as a
//! [`LayerStateMask`]) with the *then-layer* it controls. A keymap's rules
//! form a [`RuleTable`]: built once from configuration, never mutated, and
//! scanned in order by the [`Evaluator`](crate::evaluate::Evaluator).
//!
//! # Construction paths
//!
//! - **Compiled constant** — [`MultiLayerRule::new`] is `const`, so a
//!   firmware image can carry its rules in a `static` array and wrap it with
//!   [`RuleTable::from_static`].
//! - **From declarations** — [`RuleTable::from_decls`] folds each
//!   [`RuleDecl`] into a rule. It performs no checks; malformed
//!   configuration is expected to be rejected before it gets here.
//! - **Validated** — [`RuleTable::try_from_decls`] runs [`validate`] first
//!   and is the path configuration tooling should use.
//!
//! # Order
//!
//! Table order is evaluation order. It matters when two rules share a
//! then-layer: within one pass the later rule's request is applied last and
//! wins.

mod graph;
mod validation;

use alloc::borrow::Cow;
use alloc::vec::Vec;
use core::slice;

pub use graph::RuleGraph;
pub use validation::{RuleError, validate};

use crate::layer::{LayerIndex, LayerStateMask};

/// One rule: `then_layer` is active exactly while every layer of `if_mask`
/// is active.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MultiLayerRule {
    /// Layers that must all be active for the rule to hold.
    pub if_mask: LayerStateMask,
    /// Layer the rule activates and deactivates.
    pub then_layer: LayerIndex,
}

impl MultiLayerRule {
    /// Creates a rule from its if-layers and then-layer.
    #[must_use]
    pub const fn new(if_layers: &[LayerIndex], then_layer: LayerIndex) -> Self {
        Self {
            if_mask: LayerStateMask::from_layers(if_layers),
            then_layer,
        }
    }

    /// Creates a rule from a configuration declaration.
    #[must_use]
    pub const fn from_decl(decl: &RuleDecl<'_>) -> Self {
        Self::new(decl.if_layers, decl.then_layer)
    }

    /// Returns whether every if-layer is set in `layers`.
    #[inline]
    #[must_use]
    pub const fn is_satisfied_by(&self, layers: LayerStateMask) -> bool {
        layers.contains_all(self.if_mask)
    }
}

/// A rule as written in the keymap configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RuleDecl<'a> {
    /// Layers that must all be active. Expected to be non-empty.
    pub if_layers: &'a [LayerIndex],
    /// Layer controlled by the rule.
    pub then_layer: LayerIndex,
}

/// Ordered, immutable sequence of [`MultiLayerRule`]s.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RuleTable<'r> {
    rules: Cow<'r, [MultiLayerRule]>,
}

impl<'r> RuleTable<'r> {
    /// Wraps a borrowed (typically `static`) rule array without copying.
    #[must_use]
    pub const fn from_static(rules: &'r [MultiLayerRule]) -> Self {
        Self {
            rules: Cow::Borrowed(rules),
        }
    }

    /// Returns the rules in evaluation order.
    #[inline]
    #[must_use]
    pub fn rules(&self) -> &[MultiLayerRule] {
        &self.rules
    }

    /// Returns an iterator over the rules in evaluation order.
    #[inline]
    pub fn iter(&self) -> slice::Iter<'_, MultiLayerRule> {
        self.rules.iter()
    }

    /// Returns the number of rules.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns whether the table has no rules.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Returns the union of all then-layers.
    #[must_use]
    pub fn then_layers(&self) -> LayerStateMask {
        self.iter().map(|rule| rule.then_layer).collect()
    }
}

impl RuleTable<'static> {
    /// Builds a table from configuration declarations, in order.
    ///
    /// Performs no validation. Use [`try_from_decls`](Self::try_from_decls)
    /// when the declarations come from user configuration.
    #[must_use]
    pub fn from_decls(decls: &[RuleDecl<'_>]) -> Self {
        decls.iter().map(MultiLayerRule::from_decl).collect()
    }

    /// Validates the declarations with [`validate`] and builds the table.
    ///
    /// # Errors
    ///
    /// Returns the first [`RuleError`] found.
    pub fn try_from_decls(decls: &[RuleDecl<'_>]) -> Result<Self, RuleError> {
        validate(decls)?;
        Ok(Self::from_decls(decls))
    }
}

impl FromIterator<MultiLayerRule> for RuleTable<'static> {
    fn from_iter<I: IntoIterator<Item = MultiLayerRule>>(iter: I) -> Self {
        Self {
            rules: Cow::Owned(iter.into_iter().collect::<Vec<_>>()),
        }
    }
}

impl<'a> IntoIterator for &'a RuleTable<'_> {
    type Item = &'a MultiLayerRule;
    type IntoIter = slice::Iter<'a, MultiLayerRule>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
