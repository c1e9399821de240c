// Copyright 2026 the Multilayer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layer identity and layer-state model.
//!
//! A *layer* is a set of key bindings that is either active or inactive;
//! any number of layers can be active at once. This module provides:
//!
//! - [`LayerIndex`] — a small integer naming one base layer, bounded by
//!   [`MAX_LAYERS`].
//! - [`LayerStateMask`] — a fixed-width bitset of active layers, always
//!   produced and consumed as a whole value.
//! - [`LayerStateSource`] — the contract of the service that owns the
//!   layer state: snapshot, single-layer query, activate, deactivate.
//! - [`LayerState`] — a reference implementation of that service which
//!   owns the mask and notifies subscribed
//!   [listeners](crate::event::LayerStateListener) synchronously after
//!   every effective change.
//!
//! # Ownership
//!
//! The layer state is never a process-wide variable. It is owned by one
//! service value and passed by `&mut` to whatever needs to change it, which
//! keeps test isolation trivial: every test builds its own [`LayerState`].

mod id;
mod mask;
mod source;
mod state;

pub use id::{LayerIndex, MAX_LAYERS};
pub use mask::{LayerStateMask, Layers};
pub use source::LayerStateSource;
pub use state::LayerState;
