// Copyright 2026 the Multilayer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][spec] JSON to the given writer.
//!
//! Evaluation carries no clock, so the position of each record in the
//! recording serves as its timestamp (one microsecond per record). Each scan
//! becomes a `B`/`E` slice, so nested evaluations stack up as a flame graph;
//! transitions, rule checks, limits, and settle summaries are instants.
//!
//! [spec]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use multilayer_core::layer::LayerIndex;

use crate::recorder::{RecordedEvent, decode};

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
pub fn export(bytes: &[u8], writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();

    for (ts, recorded) in decode(bytes).enumerate() {
        match recorded {
            RecordedEvent::EvaluateBegin(e) => {
                let layers: Vec<u8> = e.snapshot.iter().map(LayerIndex::get).collect();
                events.push(json!({
                    "ph": "B",
                    "name": "evaluate",
                    "cat": "Evaluate",
                    "ts": ts,
                    "pid": 0,
                    "tid": 0,
                    "args": {
                        "depth": e.depth,
                        "layers": layers,
                    }
                }));
            }
            RecordedEvent::EvaluateEnd(e) => {
                events.push(json!({
                    "ph": "E",
                    "name": "evaluate",
                    "cat": "Evaluate",
                    "ts": ts,
                    "pid": 0,
                    "tid": 0,
                    "args": {
                        "depth": e.depth,
                        "transitions": e.transitions,
                    }
                }));
            }
            RecordedEvent::Transition(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": format!("{:?} {}", e.kind, e.layer),
                    "cat": "Transition",
                    "ts": ts,
                    "pid": 0,
                    "tid": 0,
                    "s": "t",
                    "args": {
                        "depth": e.depth,
                        "rule": e.rule_index,
                        "layer": e.layer.get(),
                    }
                }));
            }
            RecordedEvent::Settled(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "Settled",
                    "cat": "Summary",
                    "ts": ts,
                    "pid": 0,
                    "tid": 0,
                    "s": "p",
                    "args": {
                        "passes": e.passes,
                        "transitions": e.transitions,
                    }
                }));
            }
            RecordedEvent::LimitExceeded(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": format!("{:?}LimitExceeded", e.kind),
                    "cat": "Limit",
                    "ts": ts,
                    "pid": 0,
                    "tid": 0,
                    "s": "g",
                    "args": {
                        "limit": e.limit,
                    }
                }));
            }
            RecordedEvent::RuleCheck(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "RuleCheck",
                    "cat": "Rich",
                    "ts": ts,
                    "pid": 0,
                    "tid": 0,
                    "s": "t",
                    "args": {
                        "depth": e.depth,
                        "rule": e.rule_index,
                        "satisfied": e.satisfied,
                    }
                }));
            }
        }
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::RecorderSink;
    use multilayer_core::evaluate::{Evaluator, EvaluatorConfig};
    use multilayer_core::layer::{LayerState, LayerStateSource};
    use multilayer_core::rule::{MultiLayerRule, RuleTable};
    use multilayer_core::trace::{LimitExceededEvent, LimitKind, TraceSink, Tracer};

    const A: LayerIndex = LayerIndex(1);
    const B: LayerIndex = LayerIndex(2);
    const C: LayerIndex = LayerIndex(3);

    fn export_to_values(bytes: &[u8]) -> Vec<Value> {
        let mut out = Vec::new();
        export(bytes, &mut out).unwrap();
        let json_str = String::from_utf8(out).unwrap();
        serde_json::from_str(&json_str).unwrap()
    }

    #[test]
    fn nested_scans_become_nested_slices() {
        let rules = [MultiLayerRule::new(&[A], B), MultiLayerRule::new(&[B], C)];
        let table = RuleTable::from_static(&rules);
        let mut rec = RecorderSink::new();
        {
            let evaluator = Evaluator::with_tracer(
                &table,
                EvaluatorConfig::default(),
                Tracer::new(&mut rec),
            );
            let mut layers = LayerState::new();
            layers.subscribe(&evaluator);
            layers.activate(A);
        }

        let parsed: Vec<Value> = export_to_values(rec.as_bytes())
            .into_iter()
            .filter(|e| e["cat"] != "Rich")
            .collect();

        let phases: Vec<&str> = parsed.iter().map(|e| e["ph"].as_str().unwrap()).collect();
        assert_eq!(
            phases,
            ["B", "i", "B", "i", "B", "E", "E", "E", "i"],
            "three nested scans, two transitions, one summary"
        );
        assert_eq!(parsed[0]["args"]["layers"], json!([1]));
        assert_eq!(parsed[1]["name"], "Activate 2");
        assert_eq!(parsed[3]["name"], "Activate 3");
        assert_eq!(parsed[8]["name"], "Settled");
        assert_eq!(parsed[8]["args"]["passes"], 3);

        let stamps: Vec<u64> = parsed.iter().map(|e| e["ts"].as_u64().unwrap()).collect();
        assert!(stamps.windows(2).all(|w| w[0] < w[1]), "got {stamps:?}");
    }

    #[test]
    fn limit_is_a_global_instant() {
        let mut rec = RecorderSink::new();
        rec.on_limit_exceeded(&LimitExceededEvent {
            kind: LimitKind::Depth,
            limit: 64,
        });

        let parsed = export_to_values(rec.as_bytes());
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0]["name"], "DepthLimitExceeded");
        assert_eq!(parsed[0]["s"], "g");
        assert_eq!(parsed[0]["args"]["limit"], 64);
    }

    #[test]
    fn export_empty_recording() {
        let parsed = export_to_values(&[]);
        assert!(parsed.is_empty());
    }
}
