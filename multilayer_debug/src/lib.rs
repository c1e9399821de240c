// Copyright 2026 the Multilayer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recording, pretty-printing, and Chrome trace export for multilayer
//! diagnostics.
//!
//! This crate provides [`TraceSink`](multilayer_core::trace::TraceSink)
//! implementations for development and post-mortem analysis:
//!
//! - [`pretty::PrettyPrintSink`] — human-readable one-line-per-event output,
//!   indented by evaluation depth.
//! - [`recorder::RecorderSink`] — compact binary recording with
//!   [`recorder::decode`] and [`recorder::replay`] for playback.
//! - [`chrome::export`] — writes Chrome Trace Event Format JSON from
//!   recorded bytes.

pub mod chrome;
pub mod pretty;
pub mod recorder;
