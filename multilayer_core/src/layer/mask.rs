// Copyright 2026 the Multilayer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layer-state bitmask.

use core::fmt;
use core::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign};

use super::id::LayerIndex;

/// Bitset of active layers: bit `i` set means layer `i` is active.
///
/// A layer index at or beyond [`MAX_LAYERS`](super::MAX_LAYERS) has no bit;
/// adding it leaves the mask unchanged and querying it returns `false`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LayerStateMask(pub u32);

impl LayerStateMask {
    /// No layers.
    pub const EMPTY: Self = Self(0);

    /// Returns a mask with only `layer` set.
    #[inline]
    #[must_use]
    pub const fn from_layer(layer: LayerIndex) -> Self {
        match 1_u32.checked_shl(layer.0 as u32) {
            Some(bit) => Self(bit),
            None => Self::EMPTY,
        }
    }

    /// Returns the union of the bits of every layer in `layers`.
    #[must_use]
    pub const fn from_layers(layers: &[LayerIndex]) -> Self {
        let mut bits = 0;
        let mut i = 0;
        while i < layers.len() {
            bits |= Self::from_layer(layers[i]).0;
            i += 1;
        }
        Self(bits)
    }

    /// Returns the raw bits.
    #[inline]
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Returns a copy of this mask with `layer` set.
    #[inline]
    #[must_use]
    pub const fn with(self, layer: LayerIndex) -> Self {
        Self(self.0 | Self::from_layer(layer).0)
    }

    /// Returns a copy of this mask with `layer` cleared.
    #[inline]
    #[must_use]
    pub const fn without(self, layer: LayerIndex) -> Self {
        Self(self.0 & !Self::from_layer(layer).0)
    }

    /// Returns whether `layer` is set.
    #[inline]
    #[must_use]
    pub const fn contains(self, layer: LayerIndex) -> bool {
        let bit = Self::from_layer(layer).0;
        bit != 0 && self.0 & bit == bit
    }

    /// Returns whether every layer of `other` is also set in `self`.
    ///
    /// The empty mask is contained in every mask.
    #[inline]
    #[must_use]
    pub const fn contains_all(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns whether no layer is set.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns the number of layers set.
    #[inline]
    #[must_use]
    pub const fn count(self) -> u32 {
        self.0.count_ones()
    }

    /// Returns the highest set layer, if any.
    #[must_use]
    pub const fn highest(self) -> Option<LayerIndex> {
        if self.0 == 0 {
            None
        } else {
            #[expect(
                clippy::cast_possible_truncation,
                reason = "bit position of a u32 is below 32"
            )]
            let idx = (31 - self.0.leading_zeros()) as u8;
            Some(LayerIndex(idx))
        }
    }

    /// Returns an iterator over the set layers in ascending order.
    #[inline]
    #[must_use]
    pub const fn iter(self) -> Layers {
        Layers { remaining: self.0 }
    }
}

impl BitOr for LayerStateMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for LayerStateMask {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for LayerStateMask {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl BitAndAssign for LayerStateMask {
    fn bitand_assign(&mut self, rhs: Self) {
        self.0 &= rhs.0;
    }
}

impl FromIterator<LayerIndex> for LayerStateMask {
    fn from_iter<I: IntoIterator<Item = LayerIndex>>(iter: I) -> Self {
        iter.into_iter().fold(Self::EMPTY, Self::with)
    }
}

impl IntoIterator for LayerStateMask {
    type Item = LayerIndex;
    type IntoIter = Layers;

    fn into_iter(self) -> Layers {
        self.iter()
    }
}

impl fmt::Debug for LayerStateMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("LayerStateMask")?;
        f.debug_set().entries(self.iter().map(LayerIndex::get)).finish()
    }
}

/// Iterator over the layers set in a [`LayerStateMask`], lowest first.
///
/// Created by [`LayerStateMask::iter`].
#[derive(Clone, Debug)]
pub struct Layers {
    remaining: u32,
}

impl Iterator for Layers {
    type Item = LayerIndex;

    fn next(&mut self) -> Option<LayerIndex> {
        if self.remaining == 0 {
            return None;
        }
        #[expect(
            clippy::cast_possible_truncation,
            reason = "bit position of a u32 is below 32"
        )]
        let idx = self.remaining.trailing_zeros() as u8;
        // Clear the lowest set bit.
        self.remaining &= self.remaining - 1;
        Some(LayerIndex(idx))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining.count_ones() as usize;
        (n, Some(n))
    }
}

impl ExactSizeIterator for Layers {}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use super::*;

    #[test]
    fn from_layers_sets_each_bit() {
        let mask = LayerStateMask::from_layers(&[LayerIndex(1), LayerIndex(2)]);
        assert_eq!(mask.bits(), 0b110);
        assert!(mask.contains(LayerIndex(1)));
        assert!(mask.contains(LayerIndex(2)));
        assert!(!mask.contains(LayerIndex(0)));
    }

    #[test]
    fn out_of_range_layer_has_no_bit() {
        let mask = LayerStateMask::from_layer(LayerIndex(32));
        assert!(mask.is_empty(), "layer 32 is beyond the mask width");
        assert!(!LayerStateMask(u32::MAX).contains(LayerIndex(40)));
        assert_eq!(LayerStateMask(0b1).with(LayerIndex(200)), LayerStateMask(0b1));
    }

    #[test]
    fn contains_all_is_conjunction() {
        let lower_raise = LayerStateMask::from_layers(&[LayerIndex(1), LayerIndex(2)]);
        assert!(LayerStateMask(0b111).contains_all(lower_raise));
        assert!(!LayerStateMask(0b011).contains_all(lower_raise));
        assert!(
            LayerStateMask::EMPTY.contains_all(LayerStateMask::EMPTY),
            "empty condition is vacuously true"
        );
    }

    #[test]
    fn with_and_without() {
        let mask = LayerStateMask::EMPTY.with(LayerIndex(3)).with(LayerIndex(5));
        assert_eq!(mask.count(), 2);
        let mask = mask.without(LayerIndex(3));
        assert_eq!(mask, LayerStateMask::from_layer(LayerIndex(5)));
    }

    #[test]
    fn iter_is_ascending() {
        let mask = LayerStateMask((1 << 31) | (1 << 4) | 1);
        let layers: Vec<_> = mask.iter().collect();
        assert_eq!(layers, [LayerIndex(0), LayerIndex(4), LayerIndex(31)]);
        assert_eq!(mask.iter().len(), 3);
        assert_eq!(mask.highest(), Some(LayerIndex(31)));
        assert_eq!(LayerStateMask::EMPTY.highest(), None);
    }

    #[test]
    fn collect_from_indices() {
        let mask: LayerStateMask = [LayerIndex(0), LayerIndex(2)].into_iter().collect();
        assert_eq!(mask.bits(), 0b101);
    }

    #[test]
    fn debug_lists_layers() {
        let text = alloc::format!("{:?}", LayerStateMask(0b1010));
        assert_eq!(text, "LayerStateMask{1, 3}");
    }
}
