// Copyright 2026 the Multilayer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rule evaluation.
//!
//! On every layer-state change the [`Evaluator`] re-derives which
//! then-layers should be active and issues the activate/deactivate calls
//! needed to get there. One *scan* works as follows:
//!
//! 1. Read the layer state once; this snapshot is not re-read mid-scan.
//! 2. For each rule in table order: if every if-layer is set in the
//!    snapshot, activate the then-layer unless it is already active;
//!    otherwise deactivate it unless it is already inactive. The "already"
//!    checks ask the layer service for its live state.
//!
//! Rules that share a then-layer resolve in table order: the later rule's
//! call lands last.
//!
//! # Modes
//!
//! An activation can satisfy another rule's if-layers, so one scan is not
//! always enough. [`EvaluationMode`] picks how further scans happen:
//!
//! - [`Reentrant`](EvaluationMode::Reentrant): each call made by a scan
//!   notifies the layer service's listeners, the evaluator among them, and
//!   the nested notification runs a nested scan before the call returns. A
//!   scan whose call triggered a nested scan stops there, since the nested
//!   scan already judged every rule against newer state. An optional depth
//!   limit stops runaway recursion.
//! - [`FixedPoint`](EvaluationMode::FixedPoint): nested notifications are
//!   ignored and the top-level evaluation re-scans with a fresh snapshot
//!   until a scan makes no calls, up to a pass limit.
//!
//! The two modes reach the same state for tables without feedback cycles,
//! but the order (and number) of layer-change notifications differs.
//!
//! # Limits
//!
//! Once a limit is exceeded every open scan stops at its next rule and the
//! layer state is left as it is at that moment. The overflow is counted in
//! [`EvaluatorStats::overflows`], reported to the tracer, and returned as an
//! [`EvaluateError`] from [`Evaluator::settle`].

use core::cell::{Cell, RefCell};
use core::fmt;

use crate::event::LayerStateListener;
use crate::layer::LayerStateSource;
use crate::rule::RuleTable;
use crate::trace::{
    EvaluateBeginEvent, EvaluateEndEvent, LimitExceededEvent, LimitKind, SettledEvent, Tracer,
    TransitionEvent, TransitionKind,
};

/// How repeated scans are driven.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EvaluationMode {
    /// Recursive evaluation through nested layer-change notifications.
    Reentrant {
        /// Maximum number of simultaneously open scans, the top-level one
        /// included. `None` leaves recursion unbounded.
        max_depth: Option<u32>,
    },
    /// Explicit loop in the top-level evaluation; nested notifications are
    /// ignored.
    FixedPoint {
        /// Maximum number of scans before giving up. 0 is treated as 1.
        max_passes: u32,
    },
}

/// Configuration for the [`Evaluator`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EvaluatorConfig {
    /// How repeated scans are driven.
    pub mode: EvaluationMode,
}

impl EvaluatorConfig {
    /// Depth limit used by [`guarded`](Self::guarded).
    pub const DEFAULT_MAX_DEPTH: u32 = 64;

    /// Re-entrant evaluation with a depth limit of
    /// [`DEFAULT_MAX_DEPTH`](Self::DEFAULT_MAX_DEPTH). This is the default.
    #[must_use]
    pub const fn guarded() -> Self {
        Self {
            mode: EvaluationMode::Reentrant {
                max_depth: Some(Self::DEFAULT_MAX_DEPTH),
            },
        }
    }

    /// Re-entrant evaluation without a depth limit.
    ///
    /// A table with a feedback cycle can then recurse until the stack runs
    /// out; validate tables with [`RuleTable::try_from_decls`] first.
    #[must_use]
    pub const fn unbounded() -> Self {
        Self {
            mode: EvaluationMode::Reentrant { max_depth: None },
        }
    }

    /// Fixed-point loop capped at `max_passes` scans.
    ///
    /// A cap of 0 would never scan, so it is raised to 1. With a cap of 1 the
    /// scan is applied but a scan that made calls cannot be confirmed as
    /// settled, so [`settle`](Evaluator::settle) reports
    /// [`EvaluateError::NoFixedPoint`].
    #[must_use]
    pub const fn fixed_point(max_passes: u32) -> Self {
        let max_passes = if max_passes == 0 { 1 } else { max_passes };
        Self {
            mode: EvaluationMode::FixedPoint { max_passes },
        }
    }
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self::guarded()
    }
}

/// An evaluation that gave up before reaching a stable layer state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EvaluateError {
    /// Re-entrant recursion went deeper than `max_depth`.
    DepthExceeded {
        /// The configured limit.
        max_depth: u32,
    },
    /// The fixed-point loop still made calls after `passes` scans.
    NoFixedPoint {
        /// Scans performed.
        passes: u32,
    },
}

impl fmt::Display for EvaluateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DepthExceeded { max_depth } => {
                write!(f, "rule evaluation nested deeper than {max_depth} scans")
            }
            Self::NoFixedPoint { passes } => {
                write!(f, "rule evaluation did not settle within {passes} passes")
            }
        }
    }
}

impl core::error::Error for EvaluateError {}

/// Outcome of a top-level evaluation that reached a stable layer state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Settled {
    /// Scans performed, nested ones included.
    pub passes: u32,
    /// Activate/deactivate calls made.
    pub transitions: u32,
}

/// Cumulative counters since the evaluator was created.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EvaluatorStats {
    /// Scans performed, nested ones included.
    pub evaluations: u64,
    /// `activate` calls made.
    pub activations: u64,
    /// `deactivate` calls made.
    pub deactivations: u64,
    /// Deepest scan nesting observed.
    pub max_depth: u32,
    /// Evaluations that exceeded a limit.
    pub overflows: u64,
}

/// Keeps then-layers in line with their rules.
///
/// The evaluator is a [`LayerStateListener`]: subscribe it (by shared
/// reference) to the layer service and it runs on every change. It can also
/// be driven directly with [`evaluate`](Self::evaluate) or
/// [`settle`](Self::settle).
///
/// # Deactivation contract
///
/// A then-layer is deactivated whenever its rule's if-layers are not all
/// active, whatever activated it. Activating a then-layer through any other
/// mechanism (a momentary layer key, say) is therefore unsupported: the next
/// evaluation turns it back off. Multi-layer rules and independent
/// activation of the same layer are mutually exclusive usage patterns.
///
/// # Re-entrancy
///
/// All evaluator state sits behind `Cell`/`RefCell` so that a nested
/// notification can re-enter [`evaluate`](Self::evaluate) through the same
/// shared reference. The tracer is borrowed only while an event is being
/// emitted, never across a call into the layer service.
#[derive(Debug)]
pub struct Evaluator<'a> {
    rules: &'a RuleTable<'a>,
    config: EvaluatorConfig,
    depth: Cell<u32>,
    overflowed: Cell<bool>,
    run: Cell<Settled>,
    stats: Cell<EvaluatorStats>,
    tracer: RefCell<Tracer<'a>>,
}

impl<'a> Evaluator<'a> {
    /// Creates an evaluator for `rules`.
    #[must_use]
    pub fn new(rules: &'a RuleTable<'a>, config: EvaluatorConfig) -> Self {
        Self::with_tracer(rules, config, Tracer::none())
    }

    /// Creates an evaluator that reports to `tracer`.
    #[must_use]
    pub fn with_tracer(
        rules: &'a RuleTable<'a>,
        config: EvaluatorConfig,
        tracer: Tracer<'a>,
    ) -> Self {
        Self {
            rules,
            config,
            depth: Cell::new(0),
            overflowed: Cell::new(false),
            run: Cell::new(Settled::default()),
            stats: Cell::new(EvaluatorStats::default()),
            tracer: RefCell::new(tracer),
        }
    }

    /// Returns the rule table.
    #[must_use]
    pub fn rules(&self) -> &RuleTable<'a> {
        self.rules
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> EvaluatorConfig {
        self.config
    }

    /// Returns the cumulative counters.
    #[must_use]
    pub fn stats(&self) -> EvaluatorStats {
        self.stats.get()
    }

    /// Brings then-layers in line with the current layer state.
    ///
    /// At the top level this is [`settle`](Self::settle) with the result
    /// dropped: an exceeded limit is still counted and traced. Called while
    /// an evaluation is in progress (from a nested notification), it runs a
    /// nested scan in re-entrant mode and returns immediately in fixed-point
    /// mode.
    pub fn evaluate(&self, layers: &mut dyn LayerStateSource) {
        if self.depth.get() == 0 {
            _ = self.settle(layers);
            return;
        }
        match self.config.mode {
            EvaluationMode::Reentrant { max_depth } => self.reentrant(layers, max_depth),
            // The running loop re-scans with a fresh snapshot.
            EvaluationMode::FixedPoint { .. } => {}
        }
    }

    /// Runs one top-level evaluation and reports how it went.
    ///
    /// # Errors
    ///
    /// Returns an [`EvaluateError`] if the configured depth or pass limit was
    /// exceeded; the layer state is left where evaluation stopped.
    ///
    /// # Panics
    ///
    /// Panics if called while this evaluator is already evaluating.
    pub fn settle(&self, layers: &mut dyn LayerStateSource) -> Result<Settled, EvaluateError> {
        assert_eq!(self.depth.get(), 0, "settle called from inside an evaluation");
        self.run.set(Settled::default());
        self.overflowed.set(false);

        let result = match self.config.mode {
            EvaluationMode::Reentrant { max_depth } => {
                self.reentrant(layers, max_depth);
                match max_depth {
                    Some(max_depth) if self.overflowed.get() => {
                        Err(EvaluateError::DepthExceeded { max_depth })
                    }
                    _ => Ok(()),
                }
            }
            EvaluationMode::FixedPoint { max_passes } => {
                self.fixed_point(layers, max_passes.max(1))
            }
        };

        let run = self.run.get();
        self.tracer.borrow_mut().settled(&SettledEvent {
            passes: run.passes,
            transitions: run.transitions,
        });
        result.map(|()| run)
    }

    // -- Internal helpers --

    fn reentrant(&self, layers: &mut dyn LayerStateSource, max_depth: Option<u32>) {
        if self.overflowed.get() {
            return;
        }
        if let Some(limit) = max_depth.filter(|&limit| self.depth.get() >= limit) {
            self.overflow(LimitKind::Depth, limit);
            return;
        }
        self.pass(layers);
    }

    fn fixed_point(
        &self,
        layers: &mut dyn LayerStateSource,
        max_passes: u32,
    ) -> Result<(), EvaluateError> {
        let mut passes = 0;
        loop {
            if passes == max_passes {
                self.overflow(LimitKind::Passes, max_passes);
                return Err(EvaluateError::NoFixedPoint { passes });
            }
            passes += 1;
            if self.pass(layers) == 0 {
                return Ok(());
            }
        }
    }

    /// Scans the table once and returns the number of calls made.
    fn pass(&self, layers: &mut dyn LayerStateSource) -> u32 {
        let depth = self.depth.get() + 1;
        self.depth.set(depth);
        self.update_stats(|s| {
            s.evaluations += 1;
            s.max_depth = s.max_depth.max(depth);
        });
        self.update_run(|r| r.passes += 1);

        let snapshot = layers.current_mask();
        self.tracer
            .borrow_mut()
            .evaluate_begin(&EvaluateBeginEvent { depth, snapshot });

        let mut transitions = 0;
        for (i, rule) in self.rules.iter().enumerate() {
            if self.overflowed.get() {
                break;
            }
            #[expect(
                clippy::cast_possible_truncation,
                reason = "rule tables hold far fewer than u32::MAX rules"
            )]
            let rule_index = i as u32;
            let satisfied = rule.is_satisfied_by(snapshot);
            #[cfg(feature = "trace-rich")]
            self.tracer
                .borrow_mut()
                .rule_check(&crate::trace::RuleCheckEvent {
                    depth,
                    rule_index,
                    satisfied,
                });

            let layer = rule.then_layer;
            let kind = match (satisfied, layers.is_active(layer)) {
                (true, false) => TransitionKind::Activate,
                (false, true) => TransitionKind::Deactivate,
                _ => continue,
            };
            transitions += 1;
            self.record(kind);
            self.tracer.borrow_mut().transition(&TransitionEvent {
                depth,
                rule_index,
                layer,
                kind,
            });

            let scans_before = self.stats.get().evaluations;
            match kind {
                TransitionKind::Activate => layers.activate(layer),
                TransitionKind::Deactivate => layers.deactivate(layer),
            }
            if self.stats.get().evaluations != scans_before {
                // Superseded by the nested scan. Carrying on with the stale
                // snapshot would undo then redo the nested scan's calls
                // (deactivate C, then activate it again in a chain A -> B -> C).
                break;
            }
        }

        self.tracer
            .borrow_mut()
            .evaluate_end(&EvaluateEndEvent { depth, transitions });
        self.depth.set(depth - 1);
        transitions
    }

    fn record(&self, kind: TransitionKind) {
        self.update_run(|r| r.transitions += 1);
        self.update_stats(|s| match kind {
            TransitionKind::Activate => s.activations += 1,
            TransitionKind::Deactivate => s.deactivations += 1,
        });
    }

    fn overflow(&self, kind: LimitKind, limit: u32) {
        self.overflowed.set(true);
        self.update_stats(|s| s.overflows += 1);
        self.tracer
            .borrow_mut()
            .limit_exceeded(&LimitExceededEvent { kind, limit });
    }

    fn update_stats(&self, f: impl FnOnce(&mut EvaluatorStats)) {
        let mut stats = self.stats.get();
        f(&mut stats);
        self.stats.set(stats);
    }

    fn update_run(&self, f: impl FnOnce(&mut Settled)) {
        let mut run = self.run.get();
        f(&mut run);
        self.run.set(run);
    }
}

impl LayerStateListener for Evaluator<'_> {
    fn on_layer_state_changed(&self, layers: &mut dyn LayerStateSource) {
        self.evaluate(layers);
    }
}
