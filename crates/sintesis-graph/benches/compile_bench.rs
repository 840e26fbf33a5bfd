//! Criterion benchmarks for graph construction and compilation.
//!
//! Two axes:
//!
//! - **Build** — call resolution, expansion, and node creation
//! - **Compile** — parameter materialization, sort, and table finalization
//!
//! Run with: `cargo bench -p sintesis-graph`
#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use sintesis_catalog::Catalog;
use sintesis_graph::{GraphBuilder, Parameter, SynthDef};

const VOICE_COUNTS: &[usize] = &[4, 16, 64];

/// Builds an additive synth: one detuned oscillator pair per voice, mixed
/// down and written to a stereo bus.
fn build_voices(catalog: &Catalog, voices: usize) -> SynthDef {
    let mut builder = GraphBuilder::new("bench_voices", catalog);
    let freq = builder.parameter(Parameter::new("frequency", 110.0)).unwrap();
    let amp = builder.parameter(Parameter::new("amplitude", 0.1)).unwrap();

    let mut mix = None;
    for voice in 0..voices {
        let detune = builder.add(&freq, voice as f32 * 0.7).unwrap();
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
    let scaled = builder.mul(mix.unwrap(), &amp).unwrap();
    let panned = builder.ugen("Pan2").input("source", scaled).add().unwrap();
    builder.ugen("Out").input("source", panned).add().unwrap();
    builder.compile().unwrap()
}

fn bench_build_and_compile(c: &mut Criterion) {
    let catalog = Catalog::with_builtins();
    let mut group = c.benchmark_group("graph/build_and_compile");
    for &voices in VOICE_COUNTS {
        group.bench_with_input(BenchmarkId::from_parameter(voices), &voices, |b, &n| {
            b.iter(|| black_box(build_voices(&catalog, n)));
        });
    }
    group.finish();
}

fn bench_expansion(c: &mut Criterion) {
    let catalog = Catalog::with_builtins();
    c.bench_function("graph/expand_64_channels", |b| {
        let frequencies: Vec<f32> = (0..64).map(|i| 100.0 + i as f32).collect();
        b.iter(|| {
            let mut builder = GraphBuilder::new("bench_expand", &catalog);
            let bank = builder
                .ugen("SinOsc")
                .input("frequency", frequencies.clone())
                .add()
                .unwrap();
            black_box(bank);
            black_box(builder.compile().unwrap())
        });
    });
}

criterion_group!(benches, bench_build_and_compile, bench_expansion);
criterion_main!(benches);
