// Copyright 2026 the Multilayer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Reference layer service with synchronous listener dispatch.

use alloc::vec::Vec;
use core::fmt;

use super::id::{LayerIndex, MAX_LAYERS};
use super::mask::LayerStateMask;
use super::source::LayerStateSource;
use crate::event::LayerStateListener;

/// Owns the active-layer mask and notifies listeners of every change.
///
/// Notification happens after the new state is stored, synchronously and in
/// subscription order. Requests that do not change the state (activating an
/// active layer, deactivating an inactive one) notify nobody.
///
/// Listeners are held by shared reference for the lifetime `'a`; they must
/// outlive the service.
pub struct LayerState<'a> {
    mask: LayerStateMask,
    listeners: Vec<&'a dyn LayerStateListener>,
    notifications: u64,
}

impl fmt::Debug for LayerState<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayerState")
            .field("mask", &self.mask)
            .field("listeners", &self.listeners.len())
            .field("notifications", &self.notifications)
            .finish()
    }
}

impl Default for LayerState<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> LayerState<'a> {
    /// Creates a service with no active layers and no listeners.
    #[must_use]
    pub fn new() -> Self {
        Self::with_mask(LayerStateMask::EMPTY)
    }

    /// Creates a service whose initial state is `mask`.
    ///
    /// No notification is sent for the initial state.
    #[must_use]
    pub fn with_mask(mask: LayerStateMask) -> Self {
        Self {
            mask,
            listeners: Vec::new(),
            notifications: 0,
        }
    }

    /// Subscribes `listener` to every later state change.
    pub fn subscribe(&mut self, listener: &'a dyn LayerStateListener) {
        self.listeners.push(listener);
    }

    /// Returns the number of subscribed listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Returns how many change notifications have been dispatched so far,
    /// counting nested ones.
    #[must_use]
    pub fn notifications(&self) -> u64 {
        self.notifications
    }

    /// Replaces the whole layer state.
    ///
    /// Notifies listeners once if the state changed.
    pub fn set_mask(&mut self, mask: LayerStateMask) {
        if mask != self.mask {
            self.mask = mask;
            self.notify();
        }
    }

    // -- Internal helpers --

    /// Panics if `layer` cannot be stored in the mask.
    fn validate(layer: LayerIndex) {
        assert!(
            layer.is_valid(),
            "layer index {layer} out of range (max {MAX_LAYERS})"
        );
    }

    fn notify(&mut self) {
        self.notifications += 1;
        // Handlers cannot subscribe (they only see `dyn LayerStateSource`),
        // so the list is stable for the duration of the loop.
        for i in 0..self.listeners.len() {
            let listener = self.listeners[i];
            listener.on_layer_state_changed(self);
        }
    }
}

impl LayerStateSource for LayerState<'_> {
    fn current_mask(&self) -> LayerStateMask {
        self.mask
    }

    /// # Panics
    ///
    /// Panics if `layer` is not below [`MAX_LAYERS`].
    fn is_active(&self, layer: LayerIndex) -> bool {
        Self::validate(layer);
        self.mask.contains(layer)
    }

    /// # Panics
    ///
    /// Panics if `layer` is not below [`MAX_LAYERS`].
    fn activate(&mut self, layer: LayerIndex) {
        Self::validate(layer);
        if !self.mask.contains(layer) {
            self.mask = self.mask.with(layer);
            self.notify();
        }
    }

    /// # Panics
    ///
    /// Panics if `layer` is not below [`MAX_LAYERS`].
    fn deactivate(&mut self, layer: LayerIndex) {
        Self::validate(layer);
        if self.mask.contains(layer) {
            self.mask = self.mask.without(layer);
            self.notify();
        }
    }
}
