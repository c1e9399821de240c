// Copyright 2026 the Multilayer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layer-state change notification contract.
//!
//! A layer service announces every effective change of its layer state to
//! the listeners subscribed to it. The notification carries no payload: a
//! listener re-reads whatever it needs from the service it is handed, so a
//! stale or coalesced notification can never mislead it.
//!
//! Dispatch is synchronous. A listener that changes the layer state from
//! inside its handler causes a nested notification before its own call
//! returns; the [`Evaluator`](crate::evaluate::Evaluator) relies on this to
//! chain rules (the activation of one then-layer can satisfy the
//! if-condition of another).
//!
//! # Wiring
//!
//! ```rust,ignore
//! let rules = RuleTable::from_static(&RULES);
//! let evaluator = Evaluator::new(&rules, EvaluatorConfig::default());
//!
//! let mut layers = LayerState::new();
//! layers.subscribe(&evaluator);
//!
//! // A key binding holds LOWER, then RAISE: ADJUST follows.
//! layers.activate(LOWER);
//! layers.activate(RAISE);
//! assert!(layers.is_active(ADJUST));
//! ```

use crate::layer::LayerStateSource;

/// Receives layer-state change notifications.
///
/// Handlers take `&self` so that one listener can be subscribed by shared
/// reference and still be re-entered while it runs. Listeners that keep
/// state use interior mutability.
pub trait LayerStateListener {
    /// Called after the layer state owned by `layers` changed.
    fn on_layer_state_changed(&self, layers: &mut dyn LayerStateSource);
}

impl<F> LayerStateListener for F
where
    F: Fn(&mut dyn LayerStateSource),
{
    fn on_layer_state_changed(&self, layers: &mut dyn LayerStateSource) {
        self(layers);
    }
}
