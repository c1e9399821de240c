// Copyright 2026 the Multilayer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layer identity.

use core::fmt;

/// Number of layers a [`LayerStateMask`](super::LayerStateMask) can address.
pub const MAX_LAYERS: u8 = 32;

/// Identifies one base layer of the keymap.
///
/// Indices are assigned by the keymap configuration; core code only uses
/// them to address bits of a [`LayerStateMask`](super::LayerStateMask).
/// Range validity is a configuration-time contract (see
/// [`RuleTable::try_from_decls`](crate::rule::RuleTable::try_from_decls)),
/// not something evaluation checks.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct LayerIndex(pub u8);

impl LayerIndex {
    /// Returns whether this index fits in a layer-state mask.
    #[inline]
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 < MAX_LAYERS
    }

    /// Returns the raw index.
    #[inline]
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl From<u8> for LayerIndex {
    fn from(value: u8) -> Self {
        Self(value)
    }
}

impl fmt::Debug for LayerIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Layer({})", self.0)
    }
}

impl fmt::Display for LayerIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
