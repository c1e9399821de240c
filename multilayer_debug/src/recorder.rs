// Copyright 2026 the Multilayer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as fixed-size little-endian records, each prefixed by a one-byte
//! tag. [`decode`] reads them back as an iterator of [`RecordedEvent`], and
//! [`replay`] feeds them into another sink.
//!
//! Recording is cheap enough to leave on in a firmware build that has a spare
//! buffer; decoding and formatting happen later on the host.

use multilayer_core::layer::{LayerIndex, LayerStateMask};
use multilayer_core::trace::{
    EvaluateBeginEvent, EvaluateEndEvent, LimitExceededEvent, LimitKind, RuleCheckEvent,
    SettledEvent, TraceSink, TransitionEvent, TransitionKind,
};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_EVALUATE_BEGIN: u8 = 1;
const TAG_TRANSITION: u8 = 2;
const TAG_EVALUATE_END: u8 = 3;
const TAG_SETTLED: u8 = 4;
const TAG_LIMIT_EXCEEDED: u8 = 5;
const TAG_RULE_CHECK: u8 = 6;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Discards everything recorded so far.
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_transition_kind(&mut self, k: TransitionKind) {
        self.write_u8(match k {
            TransitionKind::Activate => 0,
            TransitionKind::Deactivate => 1,
        });
    }

    fn write_limit_kind(&mut self, k: LimitKind) {
        self.write_u8(match k {
            LimitKind::Depth => 0,
            LimitKind::Passes => 1,
        });
    }
}

impl TraceSink for RecorderSink {
    fn on_evaluate_begin(&mut self, e: &EvaluateBeginEvent) {
        self.write_u8(TAG_EVALUATE_BEGIN);
        self.write_u32(e.depth);
        self.write_u32(e.snapshot.bits());
    }

    fn on_transition(&mut self, e: &TransitionEvent) {
        self.write_u8(TAG_TRANSITION);
        self.write_u32(e.depth);
        self.write_u32(e.rule_index);
        self.write_u8(e.layer.get());
        self.write_transition_kind(e.kind);
    }

    fn on_evaluate_end(&mut self, e: &EvaluateEndEvent) {
        self.write_u8(TAG_EVALUATE_END);
        self.write_u32(e.depth);
        self.write_u32(e.transitions);
    }

    fn on_settled(&mut self, e: &SettledEvent) {
        self.write_u8(TAG_SETTLED);
        self.write_u32(e.passes);
        self.write_u32(e.transitions);
    }

    fn on_limit_exceeded(&mut self, e: &LimitExceededEvent) {
        self.write_u8(TAG_LIMIT_EXCEEDED);
        self.write_limit_kind(e.kind);
        self.write_u32(e.limit);
    }

    fn on_rule_check(&mut self, e: &RuleCheckEvent) {
        self.write_u8(TAG_RULE_CHECK);
        self.write_u32(e.depth);
        self.write_u32(e.rule_index);
        self.write_u8(u8::from(e.satisfied));
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordedEvent {
    /// An [`EvaluateBeginEvent`].
    EvaluateBegin(EvaluateBeginEvent),
    /// A [`TransitionEvent`].
    Transition(TransitionEvent),
    /// An [`EvaluateEndEvent`].
    EvaluateEnd(EvaluateEndEvent),
    /// A [`SettledEvent`].
    Settled(SettledEvent),
    /// A [`LimitExceededEvent`].
    LimitExceeded(LimitExceededEvent),
    /// A [`RuleCheckEvent`].
    RuleCheck(RuleCheckEvent),
}

impl RecordedEvent {
    /// Delivers this event to `sink` through the matching [`TraceSink`]
    /// method.
    pub fn dispatch(&self, sink: &mut dyn TraceSink) {
        match self {
            Self::EvaluateBegin(e) => sink.on_evaluate_begin(e),
            Self::Transition(e) => sink.on_transition(e),
            Self::EvaluateEnd(e) => sink.on_evaluate_end(e),
            Self::Settled(e) => sink.on_settled(e),
            Self::LimitExceeded(e) => sink.on_limit_exceeded(e),
            Self::RuleCheck(e) => sink.on_rule_check(e),
        }
    }
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
///
/// Iteration stops at the first unknown tag or truncated record.
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Feeds every event of a recording to `sink`, in order, and returns how
/// many were delivered.
pub fn replay(bytes: &[u8], sink: &mut dyn TraceSink) -> usize {
    let mut count = 0;
    for event in decode(bytes) {
        event.dispatch(sink);
        count += 1;
    }
    count
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn read_u8(&mut self) -> Option<u8> {
        if self.remaining() < 1 {
            return None;
        }
        let v = self.data[self.pos];
        self.pos += 1;
        Some(v)
    }

    fn read_u32(&mut self) -> Option<u32> {
        if self.remaining() < 4 {
            return None;
        }
        let v = u32::from_le_bytes(self.data[self.pos..self.pos + 4].try_into().ok()?);
        self.pos += 4;
        Some(v)
    }

    fn read_transition_kind(&mut self) -> Option<TransitionKind> {
        Some(match self.read_u8()? {
            0 => TransitionKind::Activate,
            _ => TransitionKind::Deactivate,
        })
    }

    fn read_limit_kind(&mut self) -> Option<LimitKind> {
        Some(match self.read_u8()? {
            0 => LimitKind::Depth,
            _ => LimitKind::Passes,
        })
    }

    fn decode_evaluate_begin(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::EvaluateBegin(EvaluateBeginEvent {
            depth: self.read_u32()?,
            snapshot: LayerStateMask(self.read_u32()?),
        }))
    }

    fn decode_transition(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Transition(TransitionEvent {
            depth: self.read_u32()?,
            rule_index: self.read_u32()?,
            layer: LayerIndex(self.read_u8()?),
            kind: self.read_transition_kind()?,
        }))
    }

    fn decode_evaluate_end(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::EvaluateEnd(EvaluateEndEvent {
            depth: self.read_u32()?,
            transitions: self.read_u32()?,
        }))
    }

    fn decode_settled(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Settled(SettledEvent {
            passes: self.read_u32()?,
            transitions: self.read_u32()?,
        }))
    }

    fn decode_limit_exceeded(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::LimitExceeded(LimitExceededEvent {
            kind: self.read_limit_kind()?,
            limit: self.read_u32()?,
        }))
    }

    fn decode_rule_check(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::RuleCheck(RuleCheckEvent {
            depth: self.read_u32()?,
            rule_index: self.read_u32()?,
            satisfied: self.read_u8()? != 0,
        }))
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.read_u8()?;
        match tag {
            TAG_EVALUATE_BEGIN => self.decode_evaluate_begin(),
            TAG_TRANSITION => self.decode_transition(),
            TAG_EVALUATE_END => self.decode_evaluate_end(),
            TAG_SETTLED => self.decode_settled(),
            TAG_LIMIT_EXCEEDED => self.decode_limit_exceeded(),
            TAG_RULE_CHECK => self.decode_rule_check(),
            _ => None, // unknown tag → stop iteration
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
