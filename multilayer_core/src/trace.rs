// Copyright 2026 the Multilayer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for rule evaluation.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that the
//! [`Evaluator`](crate::evaluate::Evaluator) calls as it scans the rule
//! table. All method bodies default to no-ops, so implementing only the
//! events you care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing (zero overhead). When
//! **on**, each method performs a single `Option` branch before dispatching.
//!
//! Nested evaluations (those triggered by the evaluator's own activations)
//! carry their nesting depth; the top-level evaluation has depth 1.
//!
//! # Crate features
//!
//! - `trace` — enables the `Tracer` method bodies (one branch per call).
//! - `trace-rich` (implies `trace`) — gates [`RuleCheckEvent`] and the
//!   corresponding `TraceSink` method.

use crate::layer::{LayerIndex, LayerStateMask};

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Direction of a then-layer transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransitionKind {
    /// The then-layer was activated.
    Activate,
    /// The then-layer was deactivated.
    Deactivate,
}

/// Which evaluation limit was hit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LimitKind {
    /// Re-entrant nesting went deeper than `max_depth`.
    Depth,
    /// The fixed-point loop did not settle within `max_passes`.
    Passes,
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted when an evaluation starts scanning the rule table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EvaluateBeginEvent {
    /// Nesting depth (1 for a top-level evaluation).
    pub depth: u32,
    /// Layer state the scan judges rule conditions against.
    pub snapshot: LayerStateMask,
}

/// Emitted just before the evaluator activates or deactivates a then-layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransitionEvent {
    /// Nesting depth of the evaluation making the call.
    pub depth: u32,
    /// Position of the deciding rule in the table.
    pub rule_index: u32,
    /// The then-layer.
    pub layer: LayerIndex,
    /// Activation or deactivation.
    pub kind: TransitionKind,
}

/// Emitted when an evaluation finishes its scan.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EvaluateEndEvent {
    /// Nesting depth.
    pub depth: u32,
    /// Activate/deactivate calls made by this scan (nested scans excluded).
    pub transitions: u32,
}

/// Emitted when a top-level evaluation returns.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SettledEvent {
    /// Table scans performed (nested scans included).
    pub passes: u32,
    /// Activate/deactivate calls made in total.
    pub transitions: u32,
}

/// Emitted when an evaluation limit is exceeded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LimitExceededEvent {
    /// Which limit.
    pub kind: LimitKind,
    /// The configured value of that limit.
    pub limit: u32,
}

/// Result of checking one rule against the snapshot.
#[cfg(feature = "trace-rich")]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RuleCheckEvent {
    /// Nesting depth.
    pub depth: u32,
    /// Position of the rule in the table.
    pub rule_index: u32,
    /// Whether every if-layer was active in the snapshot.
    pub satisfied: bool,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the evaluator.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
///
/// Events from nested evaluations arrive while the outer evaluation is still
/// open, so a sink sees properly nested begin/end pairs.
pub trait TraceSink {
    /// Called when an evaluation starts.
    fn on_evaluate_begin(&mut self, e: &EvaluateBeginEvent) {
        _ = e;
    }

    /// Called before each activate/deactivate call.
    fn on_transition(&mut self, e: &TransitionEvent) {
        _ = e;
    }

    /// Called when an evaluation finishes its scan.
    fn on_evaluate_end(&mut self, e: &EvaluateEndEvent) {
        _ = e;
    }

    /// Called when a top-level evaluation returns.
    fn on_settled(&mut self, e: &SettledEvent) {
        _ = e;
    }

    /// Called when an evaluation limit is exceeded.
    fn on_limit_exceeded(&mut self, e: &LimitExceededEvent) {
        _ = e;
    }

    /// Called for every rule checked (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    fn on_rule_check(&mut self, e: &RuleCheckEvent) {
        _ = e;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl Default for Tracer<'_> {
    fn default() -> Self {
        Self::none()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Emits an [`EvaluateBeginEvent`].
    #[inline]
    pub fn evaluate_begin(&mut self, e: &EvaluateBeginEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_evaluate_begin(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`TransitionEvent`].
    #[inline]
    pub fn transition(&mut self, e: &TransitionEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_transition(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits an [`EvaluateEndEvent`].
    #[inline]
    pub fn evaluate_end(&mut self, e: &EvaluateEndEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_evaluate_end(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`SettledEvent`].
    #[inline]
    pub fn settled(&mut self, e: &SettledEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_settled(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`LimitExceededEvent`].
    #[inline]
    pub fn limit_exceeded(&mut self, e: &LimitExceededEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_limit_exceeded(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`RuleCheckEvent`] (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    #[inline]
    pub fn rule_check(&mut self, e: &RuleCheckEvent) {
        if let Some(s) = &mut self.sink {
            s.on_rule_check(e);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_begin() -> EvaluateBeginEvent {
        EvaluateBeginEvent {
            depth: 1,
            snapshot: LayerStateMask(0b110),
        }
    }

    fn sample_transition() -> TransitionEvent {
        TransitionEvent {
            depth: 1,
            rule_index: 0,
            layer: LayerIndex(3),
            kind: TransitionKind::Activate,
        }
    }

    #[test]
    fn noop_sink_compiles() {
        let mut sink = NoopSink;
        sink.on_evaluate_begin(&sample_begin());
        sink.on_transition(&sample_transition());
        sink.on_evaluate_end(&EvaluateEndEvent {
            depth: 1,
            transitions: 1,
        });
        sink.on_settled(&SettledEvent {
            passes: 2,
            transitions: 1,
        });
        sink.on_limit_exceeded(&LimitExceededEvent {
            kind: LimitKind::Depth,
            limit: 64,
        });
    }

    #[test]
    fn tracer_none_does_nothing() {
        let mut tracer = Tracer::none();
        tracer.evaluate_begin(&sample_begin());
        tracer.transition(&sample_transition());
    }

    #[cfg(feature = "trace")]
    #[test]
    fn tracer_dispatches_to_sink() {
        use alloc::vec::Vec;

        struct RecordingSink {
            layers: Vec<LayerIndex>,
            limits: Vec<LimitKind>,
        }
        impl TraceSink for RecordingSink {
            fn on_transition(&mut self, e: &TransitionEvent) {
                self.layers.push(e.layer);
            }
            fn on_limit_exceeded(&mut self, e: &LimitExceededEvent) {
                self.limits.push(e.kind);
            }
        }

        let mut sink = RecordingSink {
            layers: Vec::new(),
            limits: Vec::new(),
        };
        let mut tracer = Tracer::new(&mut sink);
        tracer.transition(&sample_transition());
        tracer.limit_exceeded(&LimitExceededEvent {
            kind: LimitKind::Passes,
            limit: 8,
        });
        // Access sink after tracer is dropped.
        drop(tracer);
        assert_eq!(sink.layers, &[LayerIndex(3)]);
        assert_eq!(sink.limits, &[LimitKind::Passes]);
    }

    #[cfg(feature = "trace-rich")]
    #[test]
    fn rule_check_reaches_sink() {
        struct Count(u32);
        impl TraceSink for Count {
            fn on_rule_check(&mut self, e: &RuleCheckEvent) {
                if e.satisfied {
                    self.0 += 1;
                }
            }
        }

        let mut sink = Count(0);
        let mut tracer = Tracer::new(&mut sink);
        tracer.rule_check(&RuleCheckEvent {
            depth: 1,
            rule_index: 0,
            satisfied: true,
        });
        tracer.rule_check(&RuleCheckEvent {
            depth: 1,
            rule_index: 1,
            satisfied: false,
        });
        drop(tracer);
        assert_eq!(sink.0, 1);
    }
}
