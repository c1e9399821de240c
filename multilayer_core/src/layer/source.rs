// Copyright 2026 the Multilayer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layer service contract.

use super::id::LayerIndex;
use super::mask::LayerStateMask;

/// The service that owns the set of active layers.
///
/// Firmware keymaps implement this over their own layer storage; the crate
/// ships [`LayerState`](super::LayerState) as a reference implementation.
///
/// # Re-entrancy
///
/// [`activate`](Self::activate) and [`deactivate`](Self::deactivate) may
/// synchronously notify [listeners](crate::event::LayerStateListener) before
/// returning, and those listeners receive this same service by `&mut`. An
/// implementation must therefore be in a consistent state (the new layer
/// state already applied) before it dispatches.
pub trait LayerStateSource {
    /// Returns a snapshot of all currently active layers.
    fn current_mask(&self) -> LayerStateMask;

    /// Returns whether `layer` is currently active.
    fn is_active(&self, layer: LayerIndex) -> bool {
        self.current_mask().contains(layer)
    }

    /// Requests that `layer` become active.
    fn activate(&mut self, layer: LayerIndex);

    /// Requests that `layer` become inactive.
    fn deactivate(&mut self, layer: LayerIndex);
}
