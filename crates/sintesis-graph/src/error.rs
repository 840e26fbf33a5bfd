//! Error types for graph construction and compilation.

use sintesis_catalog::Rate;
use thiserror::Error;

/// Errors raised while describing a graph through a builder context.
///
/// All variants are construction-time failures raised at the point of
/// detection; retrying without changing the call cannot succeed. A call that
/// fails partway through multichannel expansion leaves its earlier
/// repetitions in place as inert nodes, which the engine tolerates.
#[derive(Debug, Error, PartialEq)]
pub enum BuildError {
    /// The catalog has no spec under this name.
    #[error("unknown unit generator: {0}")]
    UnknownUgen(String),

    /// The call requested a rate the spec does not declare.
    #[error("unit generator '{ugen}' does not support {rate} rate")]
    UnsupportedRate {
        /// UGen whose rate table was consulted.
        ugen: String,
        /// The rejected rate.
        rate: Rate,
    },

    /// A slot with no declared default was left unbound.
    #[error("missing required input '{slot}' for '{ugen}'")]
    MissingInput {
        /// UGen being instantiated.
        ugen: String,
        /// Name of the unbound slot.
        slot: String,
    },

    /// The call supplied a keyword the spec does not declare.
    #[error("unknown input '{input}' for '{ugen}'")]
    UnknownInput {
        /// UGen being instantiated.
        ugen: String,
        /// The unrecognized keyword.
        input: String,
    },

    /// An input runs faster than its slot accepts and the engine defines no
    /// downsampling.
    #[error("input '{slot}' of '{ugen}' cannot accept a {supplied}-rate signal (at most {accepted})")]
    RateMismatch {
        /// UGen being instantiated.
        ugen: String,
        /// Name of the offending slot.
        slot: String,
        /// Rate of the supplied signal.
        supplied: Rate,
        /// Fastest rate the slot accepts.
        accepted: Rate,
    },

    /// An input runs slower than its slot requires and no converter UGen is
    /// declared for that lift.
    #[error("no rate conversion from {from} to {to} exists for input '{slot}' of '{ugen}'")]
    NoConversion {
        /// UGen being instantiated.
        ugen: String,
        /// Name of the offending slot.
        slot: String,
        /// Rate of the supplied signal.
        from: Rate,
        /// Rate the slot requires.
        to: Rate,
    },

    /// A second parameter was declared under an existing name.
    #[error("duplicate parameter name: {0}")]
    DuplicateParameter(String),

    /// A parameter declared a lag at a rate category that cannot lag.
    #[error("parameter '{parameter}' declares a lag but is {rate:?}-rate")]
    UnsupportedLag {
        /// The offending parameter.
        parameter: String,
        /// Its declared rate category.
        rate: crate::ParameterRate,
    },

    /// A parameter was declared with no default values.
    #[error("parameter '{0}' declares no default values")]
    EmptyParameter(String),

    /// Parameters may only be declared on a root builder context.
    #[error("parameter '{0}' declared inside a nested builder context")]
    NestedParameter(String),

    /// An empty channel vector was bound to an input slot.
    #[error("input '{slot}' of '{ugen}' received an empty channel vector")]
    EmptyInput {
        /// UGen being instantiated.
        ugen: String,
        /// Name of the offending slot.
        slot: String,
    },

    /// A signal created in an unrelated builder context was used as an input.
    #[error("input '{slot}' of '{ugen}' references a signal from an unrelated builder context")]
    ForeignSignal {
        /// UGen being instantiated.
        ugen: String,
        /// Name of the offending slot.
        slot: String,
    },

    /// Multichannel expansion would exceed the fan-out bound.
    #[error("multichannel expansion of '{ugen}' fans out to {requested} channels (limit {limit})")]
    ExpansionTooLarge {
        /// UGen being instantiated.
        ugen: String,
        /// Requested fan-out.
        requested: usize,
        /// The builder's fan-out bound.
        limit: usize,
    },

    /// A channel-count override was applied to a fixed-arity UGen.
    #[error("'{0}' has a fixed output arity; channel count cannot be overridden")]
    FixedOutputs(String),

    /// A finalized scope was spliced into a builder that is not its parent.
    #[error("spliced scope does not belong to this builder context")]
    ForeignSplice,
}

/// Errors raised while compiling a finished node set into a synthdef.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CompileError {
    /// The dependency graph contains a cycle. Unreachable through builder
    /// calls alone; guards against malformed direct graph surgery.
    #[error("dependency cycle: {remaining} nodes could not be ordered")]
    Cycle {
        /// Number of nodes left unordered when the sort stalled.
        remaining: usize,
    },

    /// A node references a scope that was never spliced back into this
    /// builder.
    #[error("node {node} references a scope that was never spliced into this builder")]
    UnmergedScope {
        /// Construction index of the offending node.
        node: usize,
    },

    /// A node or parameter entry references an index outside the graph.
    #[error("ugen {ugen}: {detail}")]
    InvalidReference {
        /// Index of the offending ugen in the node list.
        ugen: usize,
        /// Human-readable description of the bad reference.
        detail: String,
    },
}
