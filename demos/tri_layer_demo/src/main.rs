// Copyright 2026 the Multilayer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Simulated keymap that exercises rule evaluation and the diagnostics
//! pipeline.
//!
//! Declares a tri-layer keymap plus one chained rule, validates it, then
//! plays a script of layer-key presses and releases through a
//! [`LayerState`] with an [`Evaluator`] subscribed. Events are recorded with
//! a [`RecorderSink`], replayed to stdout through a [`PrettyPrintSink`], and
//! exported as a Chrome trace JSON file. The same script then runs in
//! fixed-point mode to check that both modes end in the same states.

use std::fs::File;
use std::io::BufWriter;

use multilayer_core::evaluate::{Evaluator, EvaluatorConfig};
use multilayer_core::layer::{LayerIndex, LayerState, LayerStateMask, LayerStateSource};
use multilayer_core::rule::{RuleDecl, RuleGraph, RuleTable};
use multilayer_core::trace::Tracer;

use multilayer_debug::pretty::PrettyPrintSink;
use multilayer_debug::recorder::{RecorderSink, replay};

const BASE: LayerIndex = LayerIndex(0);
const LOWER: LayerIndex = LayerIndex(1);
const RAISE: LayerIndex = LayerIndex(2);
const ADJUST: LayerIndex = LayerIndex(3);
const NAV: LayerIndex = LayerIndex(4);
const SYSTEM: LayerIndex = LayerIndex(5);

const RULES: [RuleDecl<'static>; 2] = [
    RuleDecl {
        if_layers: &[LOWER, RAISE],
        then_layer: ADJUST,
    },
    // Chained: only reachable once ADJUST itself is active.
    RuleDecl {
        if_layers: &[ADJUST, NAV],
        then_layer: SYSTEM,
    },
];

/// A layer key going down or up.
#[derive(Clone, Copy, Debug)]
enum Key {
    Press(LayerIndex),
    Release(LayerIndex),
}

const SCRIPT: [Key; 6] = [
    Key::Press(LOWER),
    Key::Press(RAISE),
    Key::Press(NAV),
    Key::Release(LOWER),
    Key::Release(NAV),
    Key::Release(RAISE),
];

fn main() {
    // -- configuration -----------------------------------------------------
    let table = RuleTable::try_from_decls(&RULES).expect("keymap rules are valid");

    println!("derived layers: {:?}", table.then_layers());
    let mut graph = RuleGraph::new(&table);
    for layer in [LOWER, RAISE, NAV] {
        println!("layer {layer} drives {:?}", graph.downstream(layer));
    }

    let looping = [
        RuleDecl {
            if_layers: &[LOWER],
            then_layer: RAISE,
        },
        RuleDecl {
            if_layers: &[RAISE],
            then_layer: LOWER,
        },
    ];
    if let Err(err) = RuleTable::try_from_decls(&looping) {
        println!("rejected looping keymap: {err}");
    }

    // -- re-entrant run, recorded ------------------------------------------
    let mut recorder = RecorderSink::new();
    let reentrant = {
        let evaluator = Evaluator::with_tracer(
            &table,
            EvaluatorConfig::default(),
            Tracer::new(&mut recorder),
        );
        let mut layers = LayerState::with_mask(LayerStateMask::from_layer(BASE));
        layers.subscribe(&evaluator);
        let states = play("reentrant", &mut layers);
        println!("reentrant: {:?}", evaluator.stats());
        states
    };

    // -- fixed-point run ---------------------------------------------------
    let fixed = {
        let evaluator = Evaluator::new(&table, EvaluatorConfig::fixed_point(16));
        let mut layers = LayerState::with_mask(LayerStateMask::from_layer(BASE));
        layers.subscribe(&evaluator);
        let states = play("fixed-point", &mut layers);
        println!("fixed-point: {:?}", evaluator.stats());
        states
    };
    assert_eq!(reentrant, fixed, "both modes settle on the same layers");

    // -- replay ------------------------------------------------------------
    let mut pretty = PrettyPrintSink::new(Box::new(std::io::stdout()));
    let count = replay(recorder.as_bytes(), &mut pretty);

    // -- export Chrome trace -----------------------------------------------
    let path = "trace.json";
    let file = File::create(path).expect("failed to create trace.json");
    let mut writer = BufWriter::new(file);
    multilayer_debug::chrome::export(recorder.as_bytes(), &mut writer)
        .expect("failed to write Chrome trace");

    println!("Wrote {path} ({count} events)");
}

/// Plays [`SCRIPT`] and returns the layer state after each key.
fn play(label: &str, layers: &mut LayerState<'_>) -> Vec<LayerStateMask> {
    SCRIPT
        .iter()
        .map(|&key| {
            match key {
                Key::Press(layer) => layers.activate(layer),
                Key::Release(layer) => layers.deactivate(layer),
            }
            let state = layers.current_mask();
            let top = state.highest().unwrap_or(BASE);
            println!("[{label}] {key:?} -> {state:?} (top layer {top})");
            state
        })
        .collect()
}
