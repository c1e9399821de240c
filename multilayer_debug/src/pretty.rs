// Copyright 2026 the Multilayer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr). Events from
//! nested evaluations are indented by their depth so that the re-entrant
//! call structure reads top to bottom.

use std::io::Write;

use multilayer_core::layer::LayerStateMask;
use multilayer_core::trace::{
    EvaluateBeginEvent, EvaluateEndEvent, LimitExceededEvent, LimitKind, RuleCheckEvent,
    SettledEvent, TraceSink, TransitionEvent, TransitionKind,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink").finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the sink and returns its writer.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Two spaces per nesting level below the top-level scan.
fn indent(depth: u32) -> String {
    "  ".repeat(depth.saturating_sub(1) as usize)
}

/// Formats a mask as `{1,2,3}`.
fn layer_list(mask: LayerStateMask) -> String {
    let layers: Vec<String> = mask.iter().map(|layer| layer.get().to_string()).collect();
    format!("{{{}}}", layers.join(","))
}

fn transition_name(kind: TransitionKind) -> &'static str {
    match kind {
        TransitionKind::Activate => "activate",
        TransitionKind::Deactivate => "deactivate",
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_evaluate_begin(&mut self, e: &EvaluateBeginEvent) {
        let _ = writeln!(
            self.writer,
            "{}[eval:begin] depth={} layers={}",
            indent(e.depth),
            e.depth,
            layer_list(e.snapshot),
        );
    }

    fn on_transition(&mut self, e: &TransitionEvent) {
        let _ = writeln!(
            self.writer,
            "{}[{}] layer={} rule={}",
            indent(e.depth),
            transition_name(e.kind),
            e.layer,
            e.rule_index,
        );
    }

    fn on_evaluate_end(&mut self, e: &EvaluateEndEvent) {
        let _ = writeln!(
            self.writer,
            "{}[eval:end] depth={} transitions={}",
            indent(e.depth),
            e.depth,
            e.transitions,
        );
    }

    fn on_settled(&mut self, e: &SettledEvent) {
        let _ = writeln!(
            self.writer,
            "[settled] passes={} transitions={}",
            e.passes, e.transitions,
        );
    }

    fn on_limit_exceeded(&mut self, e: &LimitExceededEvent) {
        let what = match e.kind {
            LimitKind::Depth => "depth",
            LimitKind::Passes => "passes",
        };
        let _ = writeln!(self.writer, "[LIMIT] {what} > {}", e.limit);
    }

    fn on_rule_check(&mut self, e: &RuleCheckEvent) {
        let verdict = if e.satisfied { "holds" } else { "fails" };
        let _ = writeln!(
            self.writer,
            "{}[check] rule={} {verdict}",
            indent(e.depth),
            e.rule_index,
        );
    }
}

#[cfg(test)]
mod tests {
    use multilayer_core::layer::LayerIndex;

    use super::*;

    #[test]
    fn pretty_print_begin() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_evaluate_begin(&EvaluateBeginEvent {
            depth: 1,
            snapshot: LayerStateMask::from_layers(&[LayerIndex(1), LayerIndex(2)]),
        });
        let output = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(output, "[eval:begin] depth=1 layers={1,2}\n");
    }

    #[test]
    fn nested_events_are_indented() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_transition(&TransitionEvent {
            depth: 3,
            rule_index: 2,
            layer: LayerIndex(4),
            kind: TransitionKind::Deactivate,
        });
        let output = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(output, "    [deactivate] layer=4 rule=2\n");
    }

    #[test]
    fn limit_is_flagged() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_limit_exceeded(&LimitExceededEvent {
            kind: LimitKind::Depth,
            limit: 64,
        });
        let output = String::from_utf8(sink.into_inner()).unwrap();
        assert!(output.contains("[LIMIT] depth > 64"), "got: {output}");
    }

    #[test]
    fn replayed_recording_prints_every_event() {
        use crate::recorder::{RecorderSink, decode, replay};

        let mut rec = RecorderSink::new();
        rec.on_evaluate_begin(&EvaluateBeginEvent {
            depth: 1,
            snapshot: LayerStateMask::EMPTY,
        });
        rec.on_evaluate_end(&EvaluateEndEvent {
            depth: 1,
            transitions: 0,
        });
        rec.on_settled(&SettledEvent {
            passes: 1,
            transitions: 0,
        });

        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        let delivered = replay(rec.as_bytes(), &mut sink);
        let output = String::from_utf8(sink.into_inner()).unwrap();

        assert_eq!(delivered, decode(rec.as_bytes()).count());
        assert_eq!(output.lines().count(), 3, "got: {output}");
        assert!(output.contains("layers={}"), "got: {output}");
    }
}
