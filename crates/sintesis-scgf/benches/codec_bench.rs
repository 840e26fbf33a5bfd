//! Criterion benchmarks for container encode/decode throughput.
//!
//! Run with: `cargo bench -p sintesis-scgf`
#![allow(missing_docs)]

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use sintesis_catalog::Catalog;
use sintesis_graph::{GraphBuilder, Parameter, SynthDef};
use sintesis_scgf::{decode_one, encode_one};

/// A mid-sized synthdef: a detuned oscillator bank mixed down to stereo.
fn bank(catalog: &Catalog) -> SynthDef {
    let mut builder = GraphBuilder::new("bench_bank", catalog);
    let freq = builder.parameter(Parameter::new("frequency", 110.0)).unwrap();
    let mut mix = None;
    for voice in 0..32 {
        let detune = builder.add(&freq, voice as f32 * 0.3).unwrap();
        let osc = builder
            .ugen("SinOsc")
            .input("frequency", detune)
            .add()
            .unwrap();
        mix = Some(match mix {
            None => osc,
            Some(previous) => builder.add(previous, osc).unwrap(),
        });
    }
    let panned = builder
        .ugen("Pan2")
        .input("source", mix.unwrap())
        .add()
        .unwrap();
    builder.ugen("Out").input("source", panned).add().unwrap();
    builder.compile().unwrap()
}

fn bench_codec(c: &mut Criterion) {
    let catalog = Catalog::with_builtins();
    let def = bank(&catalog);
    let bytes = encode_one(&def).unwrap();

    c.bench_function("scgf/encode_32_voices", |b| {
        b.iter(|| black_box(encode_one(&def).unwrap()));
    });
    c.bench_function("scgf/decode_32_voices", |b| {
        b.iter(|| black_box(decode_one(&bytes, &catalog).unwrap()));
    });
}

criterion_group!(benches, bench_codec);
criterion_main!(benches);
