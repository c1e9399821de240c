// Copyright 2026 the Multilayer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty-tracking channel constants.
//!
//! The rule dependency graph ([`RuleGraph`](crate::rule::RuleGraph)) is
//! stored in an [`understory_dirty`] tracker keyed by layer index. Each rule
//! contributes edges from its then-layer to each of its if-layers, so that
//! marking a layer with [`EagerPolicy`](understory_dirty::EagerPolicy)
//! propagates to every then-layer whose state may have to change.
//!
//! The tracker is created with
//! [`CycleHandling::Error`](understory_dirty::CycleHandling::Error): an edge
//! that would close a cycle is refused, which is how feedback between rules
//! is detected at configuration time.

use understory_dirty::Channel;

/// Layer activation changed — propagates from if-layers to the then-layers
/// that depend on them.
pub const ACTIVATION: Channel = Channel::new(0);
