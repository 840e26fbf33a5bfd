//! Round-trip and wire-compatibility tests for the container codec.

use proptest::prelude::*;
use sintesis_catalog::{BinaryOp, Catalog, Rate};
use sintesis_graph::{GraphBuilder, Input, Parameter, ParameterRate, Signal, SynthDef, Ugen};
use sintesis_scgf::{
    DecodeError, decode, decode_one, encode, encode_one, read_synthdef_file, write_synthdef_file,
};

fn catalog() -> Catalog {
    Catalog::with_builtins()
}

/// A representative synthdef: parameters of several rate categories, a lag,
/// an implicit rate lift, multichannel expansion, and operators.
fn rich_def(catalog: &Catalog) -> SynthDef {
    let mut builder = GraphBuilder::new("rich", catalog);
    let freq = builder
        .parameter(Parameter::new("frequency", 440.0).lag(0.05))
        .unwrap();
    let amp = builder
        .parameter(Parameter::new("amplitude", 0.2))
        .unwrap();
    let _attack = builder
        .parameter(Parameter::new("attack", 0.01).rate(ParameterRate::Scalar))
        .unwrap();

    let pair = builder
        .ugen("SinOsc")
        .input("frequency", Signal::Vector(vec![freq.clone(), freq]))
        .add()
        .unwrap();
    let scaled = builder.binary(BinaryOp::Mul, pair, amp).unwrap();
    let wobble = builder.ugen("LFNoise2").input("frequency", 3.0).add().unwrap();
    let mixed = builder.add(scaled, wobble).unwrap();
    builder.ugen("Out").input("source", mixed).add().unwrap();
    builder.compile().unwrap()
}

fn simple_def(catalog: &Catalog) -> SynthDef {
    let mut builder = GraphBuilder::new("t", catalog);
    builder.ugen("SinOsc").add().unwrap();
    builder.compile().unwrap()
}

#[test]
fn minimal_synthdef_encodes_to_known_bytes() {
    let catalog = catalog();
    let def = simple_def(&catalog);
    let bytes = encode_one(&def).unwrap();

    #[rustfmt::skip]
    let expected: Vec<u8> = vec![
        // magic, version, synthdef count
        b'S', b'C', b'g', b'f',
        0x00, 0x00, 0x00, 0x02,
        0x00, 0x01,
        // name "t"
        0x01, b't',
        // constants: 440.0, 0.0
        0x00, 0x00, 0x00, 0x02,
        0x43, 0xDC, 0x00, 0x00,
        0x00, 0x00, 0x00, 0x00,
        // parameter values, parameter names
        0x00, 0x00, 0x00, 0x00,
        0x00, 0x00, 0x00, 0x00,
        // one ugen
        0x00, 0x00, 0x00, 0x01,
        0x06, b'S', b'i', b'n', b'O', b's', b'c',
        0x02,
        0x00, 0x00, 0x00, 0x02,
        0x00, 0x00, 0x00, 0x01,
        0x00, 0x00,
        // inputs: constant 0, constant 1
        0xFF, 0xFF, 0xFF, 0xFF, 0x00, 0x00, 0x00, 0x00,
        0xFF, 0xFF, 0xFF, 0xFF, 0x00, 0x00, 0x00, 0x01,
        // output rate
        0x02,
        // variant count
        0x00, 0x00,
    ];
    assert_eq!(bytes, expected);
}

#[test]
fn round_trip_preserves_structure() {
    let catalog = catalog();
    let def = rich_def(&catalog);
    let bytes = encode_one(&def).unwrap();
    let decoded = decode_one(&bytes, &catalog).unwrap();
    assert_eq!(decoded, def);
}

#[test]
fn encoding_is_deterministic() {
    let catalog = catalog();
    let def = rich_def(&catalog);
    assert_eq!(encode_one(&def).unwrap(), encode_one(&def).unwrap());
}

#[test]
fn containers_hold_several_synthdefs() {
    let catalog = catalog();
    let defs = vec![simple_def(&catalog), rich_def(&catalog)];
    let bytes = encode(&defs).unwrap();
    let decoded = decode(&bytes, &catalog).unwrap();
    assert_eq!(decoded, defs);

    // decode_one refuses the plural container.
    assert_eq!(
        decode_one(&bytes, &catalog),
        Err(DecodeError::MultipleSynthDefs(2))
    );
}

#[test]
fn bad_magic_is_rejected() {
    let catalog = catalog();
    let mut bytes = encode_one(&simple_def(&catalog)).unwrap();
    bytes[0] = b'X';
    assert_eq!(decode(&bytes, &catalog), Err(DecodeError::BadMagic));
}

#[test]
fn unsupported_version_is_rejected() {
    let catalog = catalog();
    let mut bytes = encode_one(&simple_def(&catalog)).unwrap();
    bytes[7] = 0x01;
    assert_eq!(
        decode(&bytes, &catalog),
        Err(DecodeError::UnsupportedVersion(1))
    );
}

#[test]
fn truncation_is_detected_everywhere() {
    let catalog = catalog();
    let bytes = encode_one(&rich_def(&catalog)).unwrap();
    // Any prefix must fail with a decode error, never panic or succeed.
    for len in 0..bytes.len() {
        let err = decode(&bytes[..len], &catalog).unwrap_err();
        assert!(
            matches!(err, DecodeError::Truncated | DecodeError::TrailingBytes(_)),
            "prefix of {len} bytes: unexpected error {err:?}"
        );
    }
}

#[test]
fn trailing_bytes_are_rejected() {
    let catalog = catalog();
    let mut bytes = encode_one(&simple_def(&catalog)).unwrap();
    bytes.push(0x00);
    assert_eq!(decode(&bytes, &catalog), Err(DecodeError::TrailingBytes(1)));
}

#[test]
fn nonzero_variant_count_is_rejected() {
    let catalog = catalog();
    let mut bytes = encode_one(&simple_def(&catalog)).unwrap();
    let last = bytes.len() - 1;
    bytes[last] = 0x01;
    assert_eq!(
        decode(&bytes, &catalog),
        Err(DecodeError::UnsupportedVariants(1))
    );
}

#[test]
fn unknown_ugen_names_fail_decoding() {
    let catalog = catalog();
    let def = SynthDef {
        name: "mystery".to_string(),
        constants: vec![0.0],
        parameter_values: Vec::new(),
        parameter_names: Vec::new(),
        ugens: vec![Ugen {
            name: "Mystery".to_string(),
            rate: Rate::Audio,
            special_index: 0,
            inputs: vec![Input::Constant(0)],
            output_rates: vec![Rate::Audio],
        }],
    };
    let bytes = encode_one(&def).unwrap();
    assert_eq!(
        decode(&bytes, &catalog),
        Err(DecodeError::UnknownUgen("Mystery".to_string()))
    );
}

#[test]
fn forward_references_fail_decoding() {
    let catalog = catalog();
    let def = SynthDef {
        name: "forward".to_string(),
        constants: Vec::new(),
        parameter_values: Vec::new(),
        parameter_names: Vec::new(),
        ugens: vec![Ugen {
            name: "K2A".to_string(),
            rate: Rate::Audio,
            special_index: 0,
            inputs: vec![Input::Ugen { ugen: 0, output: 0 }],
            output_rates: vec![Rate::Audio],
        }],
    };
    let bytes = encode_one(&def).unwrap();
    assert!(matches!(
        decode(&bytes, &catalog),
        Err(DecodeError::Structure { .. })
    ));
}

#[test]
fn synthdef_files_round_trip() {
    let catalog = catalog();
    let defs = vec![rich_def(&catalog)];
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rich.scsyndef");

    write_synthdef_file(&path, &defs).unwrap();
    let decoded = read_synthdef_file(&path, &catalog).unwrap();
    assert_eq!(decoded, defs);
}

#[test]
fn missing_file_reports_its_path() {
    let catalog = catalog();
    let err = read_synthdef_file("/no/such/dir/x.scsyndef", &catalog).unwrap_err();
    assert!(err.to_string().contains("/no/such/dir/x.scsyndef"));
}

/// Mesh builder shared with the graph crate's property tests: choices are
/// fully determined by `ops`.
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
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Any builder-produced graph survives a byte round trip unchanged.
    #[test]
    fn random_meshes_round_trip(
        ops in prop::collection::vec((0usize..4, any::<bool>()), 1..16),
    ) {
        let catalog = Catalog::with_builtins();
        let def = build_mesh(&catalog, &ops);
        let bytes = encode_one(&def).unwrap();
        prop_assert_eq!(decode_one(&bytes, &catalog).unwrap(), def);
    }

    /// Encoding the same graph twice yields identical bytes.
    #[test]
    fn random_meshes_encode_deterministically(
        ops in prop::collection::vec((0usize..4, any::<bool>()), 1..12),
    ) {
        let catalog = Catalog::with_builtins();
        let def = build_mesh(&catalog, &ops);
        prop_assert_eq!(encode_one(&def).unwrap(), encode_one(&def).unwrap());
    }
}
