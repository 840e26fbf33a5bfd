//! Property-based tests for the graph builder.
//!
//! Randomized expansion arity, constant interning, topological validity,
//! rate grouping, and compile determinism.

use proptest::prelude::*;
use sintesis_catalog::{BinaryOp, Catalog};
use sintesis_graph::{GraphBuilder, Input, Rate, SynthDef};

/// Builds a pseudo-random operator mesh over mixed-rate sources and compiles
/// it. Choices are fully determined by `ops`, so the same input always
/// yields the same graph description.
fn build_mesh(catalog: &Catalog, ops: &[(usize, bool)]) -> SynthDef {
    let mut builder = GraphBuilder::new("mesh", catalog);
    let mut signals = vec![
        builder.ugen("SinOsc").add().unwrap(),
        builder.ugen("LFNoise0").add().unwrap(),
    ];
    for (step, &(selector, control_rate)) in ops.iter().enumerate() {
        let source = if control_rate {
            builder
                .ugen("LFNoise1")
                .input("frequency", 1.0 + step as f32)
                .add()
                .unwrap()
        } else {
            builder
                .ugen("Saw")
                .input("frequency", 50.0 + step as f32)
                .add()
                .unwrap()
        };
        signals.push(source);

        let left = signals[(step * 7 + 1) % signals.len()].clone();
        let right = signals[(step * 5 + 2) % signals.len()].clone();
        let op = [BinaryOp::Add, BinaryOp::Mul, BinaryOp::Min, BinaryOp::Max][selector % 4];
        let combined = builder.binary(op, left, right).unwrap();
        signals.push(combined);
    }
    let last = signals.last().unwrap().clone();
    builder.ugen("Out").input("source", last).add().unwrap();
    builder.compile().unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Expansion arity equals the longest non-array input; one node is
    /// appended per repetition.
    #[test]
    fn expansion_fans_out_to_the_longest_input(
        freq_len in 1usize..=8,
        width_len in 1usize..=8,
    ) {
        let catalog = Catalog::with_builtins();
        let mut builder = GraphBuilder::new("fan", &catalog);
        let frequencies: Vec<f32> = (0..freq_len).map(|i| 100.0 + i as f32).collect();
        let widths: Vec<f32> = (0..width_len).map(|i| 0.05 * i as f32 + 0.1).collect();
        let result = builder
            .ugen("VarSaw")
            .input("frequency", frequencies)
            .input("width", widths)
            .add()
            .unwrap();

        let expected = freq_len.max(width_len);
        prop_assert_eq!(result.channels(), expected);
        prop_assert_eq!(builder.node_count(), expected);
    }

    /// Every distinct bit pattern lands in the constant table exactly once,
    /// in first-use order over the compiled node list.
    #[test]
    fn constants_intern_by_bit_pattern_in_first_use_order(
        values in prop::collection::vec(-100.0f32..100.0, 1..24),
    ) {
        let catalog = Catalog::with_builtins();
        let mut builder = GraphBuilder::new("consts", &catalog);
        for &value in &values {
            builder.ugen("SinOsc").input("frequency", value).add().unwrap();
        }
        let def = builder.compile().unwrap();

        // Replicate the interning walk: frequency then phase, per node.
        let mut expected: Vec<f32> = Vec::new();
        let mut seen: Vec<u32> = Vec::new();
        for &value in &values {
            for candidate in [value, 0.0] {
                if !seen.contains(&candidate.to_bits()) {
                    seen.push(candidate.to_bits());
                    expected.push(candidate);
                }
            }
        }
        prop_assert_eq!(&def.constants, &expected);
    }

    /// Compiled meshes are structurally valid: every node reference points
    /// strictly backwards and control nodes precede audio nodes.
    #[test]
    fn meshes_are_topologically_valid_and_rate_grouped(
        ops in prop::collection::vec((0usize..4, any::<bool>()), 1..24),
    ) {
        let catalog = Catalog::with_builtins();
        let def = build_mesh(&catalog, &ops);
        prop_assert!(def.validate().is_ok());

        for (position, ugen) in def.ugens.iter().enumerate() {
            for input in &ugen.inputs {
                if let Input::Ugen { ugen: source, .. } = input {
                    prop_assert!(*source < position);
                }
            }
        }

        // No source in this mesh lets a control node depend on an audio
        // node, so the grouping is total.
        let rates: Vec<Rate> = def.ugens.iter().map(|u| u.rate).collect();
        if let (Some(last_control), Some(first_audio)) = (
            rates.iter().rposition(|&r| r == Rate::Control),
            rates.iter().position(|&r| r == Rate::Audio),
        ) {
            prop_assert!(
                last_control < first_audio,
                "rate grouping violated: {:?}",
                rates
            );
        }
    }

    /// Compiling the same description twice yields structurally equal
    /// synthdefs.
    #[test]
    fn compilation_is_deterministic(
        ops in prop::collection::vec((0usize..4, any::<bool>()), 1..16),
    ) {
        let catalog = Catalog::with_builtins();
        prop_assert_eq!(build_mesh(&catalog, &ops), build_mesh(&catalog, &ops));
    }
}
