// Copyright 2026 the Multilayer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Derived-layer activation for keyboard firmware.
//!
//! `multilayer_core` lets a keymap declare *composite* layers: a then-layer
//! that is active exactly while a configured conjunction of if-layers is
//! active. The classic case is "tri-layer", where an `ADJUST` layer turns on
//! only while both `LOWER` and `RAISE` are held. The crate is `no_std`
//! compatible (with `alloc`).
//!
//! # Architecture
//!
//! Every layer-state change runs the evaluator, whose activations can in
//! turn re-enter it:
//!
//! ```text
//!   key binding ──► LayerStateSource::activate()
//!                         │
//!                         ▼
//!              LayerStateListener::on_layer_state_changed()
//!                         │
//!                         ▼
//!   Evaluator::evaluate() ──► scan RuleTable against snapshot
//!                         │
//!                         ▼
//!        activate()/deactivate() then-layers ──► (re-enters above)
//! ```
//!
//! **[`layer`]** — Layer indices, the layer-state bitmask, the
//! [`LayerStateSource`](layer::LayerStateSource) contract, and
//! [`LayerState`](layer::LayerState), a reference layer service with
//! synchronous re-entrant dispatch.
//!
//! **[`rule`]** — Multi-layer rules, the immutable [`RuleTable`](rule::RuleTable),
//! configuration validation, and the rule dependency graph used to detect
//! feedback cycles.
//!
//! **[`evaluate`]** — The [`Evaluator`](evaluate::Evaluator), its modes
//! (re-entrant recursion or an explicit fixed-point loop) and its limits.
//!
//! **[`event`]** — The listener contract between a layer service and the
//! evaluator.
//!
//! **[`dirty`]** — Dirty-tracking channel used by the rule dependency graph.
//!
//! **[`trace`]** — [`TraceSink`](trace::TraceSink) trait and event types for
//! evaluation instrumentation, with zero-overhead [`Tracer`](trace::Tracer)
//! wrapper.
//!
//! # Crate features
//!
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).
//! - `trace-rich` (disabled by default, implies `trace`): Gates per-rule
//!   check events.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod dirty;
pub mod evaluate;
pub mod event;
pub mod layer;
pub mod rule;
pub mod trace;
