//! Built-in UGen spec set.
//!
//! Declarative metadata only. Names, input order, defaults, and output
//! arities mirror the synthesis engine's own catalog; the compiler trusts
//! these tables when resolving calls and when sizing encoded node records.

use crate::{InputSlot, Outputs, Rate, RateConstraint, SpecialIndex, UgenSpec};

const AR_KR: &[Rate] = &[Rate::Audio, Rate::Control];
const KR_AR: &[Rate] = &[Rate::Control, Rate::Audio];
const ALL_RATES: &[Rate] = &[Rate::Scalar, Rate::Control, Rate::Audio, Rate::Demand];

macro_rules! spec {
    ($name:literal, $rates:expr, $default:expr, $inputs:expr, $outputs:expr) => {
        UgenSpec {
            name: $name,
            rates: $rates,
            default_rate: $default,
            inputs: $inputs,
            outputs: $outputs,
            special: SpecialIndex::None,
            infer_rate: false,
        }
    };
}

// --- Oscillators and noise ---

const SIN_OSC: UgenSpec = spec!(
    "SinOsc",
    AR_KR,
    Rate::Audio,
    &[
        InputSlot::value("frequency", 440.0),
        InputSlot::value("phase", 0.0),
    ],
    Outputs::Fixed(1)
);

const SAW: UgenSpec = spec!(
    "Saw",
    AR_KR,
    Rate::Audio,
    &[InputSlot::value("frequency", 440.0)],
    Outputs::Fixed(1)
);

const VAR_SAW: UgenSpec = spec!(
    "VarSaw",
    AR_KR,
    Rate::Audio,
    &[
        InputSlot::value("frequency", 440.0),
        InputSlot::value("initial_phase", 0.0),
        InputSlot::value("width", 0.5),
    ],
    Outputs::Fixed(1)
);

const WHITE_NOISE: UgenSpec = spec!("WhiteNoise", AR_KR, Rate::Audio, &[], Outputs::Fixed(1));

const PINK_NOISE: UgenSpec = spec!("PinkNoise", AR_KR, Rate::Audio, &[], Outputs::Fixed(1));

const LF_NOISE_0: UgenSpec = spec!(
    "LFNoise0",
    KR_AR,
    Rate::Control,
    &[InputSlot::value("frequency", 500.0)],
    Outputs::Fixed(1)
);

const LF_NOISE_1: UgenSpec = spec!(
    "LFNoise1",
    KR_AR,
    Rate::Control,
    &[InputSlot::value("frequency", 500.0)],
    Outputs::Fixed(1)
);

const LF_NOISE_2: UgenSpec = spec!(
    "LFNoise2",
    KR_AR,
    Rate::Control,
    &[InputSlot::value("frequency", 500.0)],
    Outputs::Fixed(1)
);

const RAND: UgenSpec = spec!(
    "Rand",
    &[Rate::Scalar],
    Rate::Scalar,
    &[
        InputSlot::value("minimum", 0.0),
        InputSlot::value("maximum", 1.0),
    ],
    Outputs::Fixed(1)
);

// --- Envelopes and smoothing ---

// The envelope array carries the flattened segment description; the gate and
// scaling slots precede it in the encoded input order.
const ENV_GEN: UgenSpec = spec!(
    "EnvGen",
    KR_AR,
    Rate::Control,
    &[
        InputSlot::value("gate", 1.0),
        InputSlot::value("level_scale", 1.0),
        InputSlot::value("level_bias", 0.0),
        InputSlot::value("time_scale", 1.0),
        InputSlot::control_value("done_action", 0.0),
        InputSlot::required_array("envelope"),
    ],
    Outputs::Fixed(1)
);

const LAG: UgenSpec = spec!(
    "Lag",
    KR_AR,
    Rate::Control,
    &[
        InputSlot::signal("source"),
        InputSlot::value("lag_time", 0.1),
    ],
    Outputs::Fixed(1)
);

// --- Filters ---

const LPF: UgenSpec = spec!(
    "LPF",
    AR_KR,
    Rate::Audio,
    &[
        InputSlot::signal("source"),
        InputSlot::value("frequency", 440.0),
    ],
    Outputs::Fixed(1)
);

const HPF: UgenSpec = spec!(
    "HPF",
    AR_KR,
    Rate::Audio,
    &[
        InputSlot::signal("source"),
        InputSlot::value("frequency", 440.0),
    ],
    Outputs::Fixed(1)
);

const BPF: UgenSpec = spec!(
    "BPF",
    AR_KR,
    Rate::Audio,
    &[
        InputSlot::signal("source"),
        InputSlot::value("frequency", 440.0),
        InputSlot::value("reciprocal_q", 1.0),
    ],
    Outputs::Fixed(1)
);

const RLPF: UgenSpec = spec!(
    "RLPF",
    AR_KR,
    Rate::Audio,
    &[
        InputSlot::signal("source"),
        InputSlot::value("frequency", 440.0),
        InputSlot::value("reciprocal_q", 1.0),
    ],
    Outputs::Fixed(1)
);

const LEAK_DC: UgenSpec = spec!(
    "LeakDC",
    AR_KR,
    Rate::Audio,
    &[
        InputSlot::signal("source"),
        InputSlot::value("coefficient", 0.995),
    ],
    Outputs::Fixed(1)
);

const COMB_C: UgenSpec = spec!(
    "CombC",
    AR_KR,
    Rate::Audio,
    &[
        InputSlot::signal("source"),
        InputSlot::value("maximum_delay_time", 0.2),
        InputSlot::value("delay_time", 0.2),
        InputSlot::value("decay_time", 1.0),
    ],
    Outputs::Fixed(1)
);

const FREE_VERB: UgenSpec = spec!(
    "FreeVerb",
    &[Rate::Audio],
    Rate::Audio,
    &[
        InputSlot::signal("source"),
        InputSlot::value("mix", 0.33),
        InputSlot::value("room_size", 0.5),
        InputSlot::value("damping", 0.5),
    ],
    Outputs::Fixed(1)
);

const LIMITER: UgenSpec = spec!(
    "Limiter",
    &[Rate::Audio],
    Rate::Audio,
    &[
        InputSlot::signal("source"),
        InputSlot::value("level", 1.0),
        InputSlot::value("duration", 0.01),
    ],
    Outputs::Fixed(1)
);

// --- Panning ---

const PAN2: UgenSpec = spec!(
    "Pan2",
    AR_KR,
    Rate::Audio,
    &[
        InputSlot::signal("source"),
        InputSlot::value("position", 0.0),
        InputSlot::value("level", 1.0),
    ],
    Outputs::Fixed(2)
);

const BALANCE2: UgenSpec = spec!(
    "Balance2",
    AR_KR,
    Rate::Audio,
    &[
        InputSlot::signal("left"),
        InputSlot::signal("right"),
        InputSlot::value("position", 0.0),
        InputSlot::value("level", 1.0),
    ],
    Outputs::Fixed(2)
);

// --- Bus I/O ---

const OUT: UgenSpec = spec!(
    "Out",
    AR_KR,
    Rate::Audio,
    &[
        InputSlot::control_value("bus", 0.0),
        InputSlot::signal_array("source"),
    ],
    Outputs::Fixed(0)
);

const IN: UgenSpec = spec!(
    "In",
    AR_KR,
    Rate::Audio,
    &[InputSlot::control_value("bus", 0.0)],
    Outputs::Variable { default: 1 }
);

// --- Buffers ---

const PLAY_BUF: UgenSpec = spec!(
    "PlayBuf",
    AR_KR,
    Rate::Audio,
    &[
        InputSlot::control_required("buffer_id"),
        InputSlot::value("rate", 1.0),
        InputSlot::value("trigger", 1.0),
        InputSlot::value("start_position", 0.0),
        InputSlot::value("loop", 0.0),
        InputSlot::control_value("done_action", 0.0),
    ],
    Outputs::Variable { default: 1 }
);

const BUF_RATE_SCALE: UgenSpec = spec!(
    "BufRateScale",
    &[Rate::Scalar, Rate::Control],
    Rate::Scalar,
    &[InputSlot::control_required("buffer_id")],
    Outputs::Fixed(1)
);

// --- Rate conversion ---

const K2A: UgenSpec = spec!(
    "K2A",
    &[Rate::Audio],
    Rate::Audio,
    &[InputSlot::value("source", 0.0)],
    Outputs::Fixed(1)
);

// --- Control family ---
//
// Output counts are bound at materialization time, one output per parameter
// value owned by the node. The special index is the offset of the first
// owned value in the parameter value table.

const CONTROL: UgenSpec = UgenSpec {
    name: "Control",
    rates: &[Rate::Scalar, Rate::Control],
    default_rate: Rate::Control,
    inputs: &[],
    outputs: Outputs::Variable { default: 1 },
    special: SpecialIndex::ParameterOffset,
    infer_rate: false,
};

const TRIG_CONTROL: UgenSpec = UgenSpec {
    name: "TrigControl",
    rates: &[Rate::Control],
    default_rate: Rate::Control,
    inputs: &[],
    outputs: Outputs::Variable { default: 1 },
    special: SpecialIndex::ParameterOffset,
    infer_rate: false,
};

const AUDIO_CONTROL: UgenSpec = UgenSpec {
    name: "AudioControl",
    rates: &[Rate::Audio],
    default_rate: Rate::Audio,
    inputs: &[],
    outputs: Outputs::Variable { default: 1 },
    special: SpecialIndex::ParameterOffset,
    infer_rate: false,
};

const LAG_CONTROL: UgenSpec = UgenSpec {
    name: "LagControl",
    rates: &[Rate::Control],
    default_rate: Rate::Control,
    inputs: &[InputSlot {
        name: "lags",
        default: None,
        array: true,
        constraint: RateConstraint::AtMost(Rate::Control),
    }],
    outputs: Outputs::Variable { default: 1 },
    special: SpecialIndex::ParameterOffset,
    infer_rate: false,
};

// --- Operators ---

const UNARY_OP: UgenSpec = UgenSpec {
    name: "UnaryOpUGen",
    rates: ALL_RATES,
    default_rate: Rate::Audio,
    inputs: &[InputSlot::required("source")],
    outputs: Outputs::Fixed(1),
    special: SpecialIndex::UnaryOp,
    infer_rate: true,
};

const BINARY_OP: UgenSpec = UgenSpec {
    name: "BinaryOpUGen",
    rates: ALL_RATES,
    default_rate: Rate::Audio,
    inputs: &[InputSlot::required("left"), InputSlot::required("right")],
    outputs: Outputs::Fixed(1),
    special: SpecialIndex::BinaryOp,
    infer_rate: true,
};

/// Every built-in spec, in catalog registration order.
pub(crate) const BUILTINS: &[UgenSpec] = &[
    SIN_OSC,
    SAW,
    VAR_SAW,
    WHITE_NOISE,
    PINK_NOISE,
    LF_NOISE_0,
    LF_NOISE_1,
    LF_NOISE_2,
    RAND,
    ENV_GEN,
    LAG,
    LPF,
    HPF,
    BPF,
    RLPF,
    LEAK_DC,
    COMB_C,
    FREE_VERB,
    LIMITER,
    PAN2,
    BALANCE2,
    OUT,
    IN,
    PLAY_BUF,
    BUF_RATE_SCALE,
    K2A,
    CONTROL,
    TRIG_CONTROL,
    AUDIO_CONTROL,
    LAG_CONTROL,
    UNARY_OP,
    BINARY_OP,
];
