//! Synthdef graph builder and compiler.
//!
//! This crate turns declarative unit-generator calls into a compiled,
//! immutable [`SynthDef`]: the named, topologically ordered node list (plus
//! constant and parameter tables) that the engine's binary container
//! encodes. The catalog of available UGens lives in `sintesis-catalog`; the
//! byte codec lives in `sintesis-scgf`.
//!
//! # Core Abstractions
//!
//! - [`GraphBuilder`] - scoped construction session; one per graph
//! - [`Signal`] / [`OutputProxy`] - values flowing between calls
//! - [`Parameter`] / [`ParameterRate`] - externally settable knobs
//! - [`SynthDef`] / [`Ugen`] / [`Input`] - the compiled result
//! - [`BuildError`] / [`CompileError`] - construction and compile failures
//!
//! # Construction model
//!
//! Every UGen call resolves through the catalog: keyword inputs bind to
//! slots, channel vectors fan the call out (multichannel expansion, shorter
//! inputs cycling modulo their length), rate rules are checked with implicit
//! lifting where the engine declares a conversion, and bare literals become
//! shared constant-table entries. Compilation runs a stable rate-grouped
//! topological sort, so identical graphs always compile to identical
//! synthdefs.
//!
//! # Example
//!
//! ```rust
//! use sintesis_catalog::Catalog;
//! use sintesis_graph::{GraphBuilder, Parameter};
//!
//! let catalog = Catalog::with_builtins();
//! let mut builder = GraphBuilder::new("simple_sine", &catalog);
//! let frequency = builder.parameter(Parameter::new("frequency", 440.0))?;
//! let sine = builder.ugen("SinOsc").input("frequency", frequency).add()?;
//! let scaled = builder.mul(sine, 0.2)?;
//! builder
//!     .ugen("Out")
//!     .input("bus", 0.0)
//!     .input("source", scaled)
//!     .add()?;
//! let synthdef = builder.compile()?;
//! assert_eq!(synthdef.name, "simple_sine");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod builder;
mod error;
mod node;
mod param;
mod signal;
mod sort;
mod synthdef;

pub use builder::{GraphBuilder, MAX_FAN_OUT, ScopedNodes, UgenCall};
pub use error::{BuildError, CompileError};
pub use param::{Parameter, ParameterRate};
pub use signal::{NodeId, OutputProxy, Signal};
pub use synthdef::{Input, ParameterName, SynthDef, Ugen};

// The catalog types every builder call touches.
pub use sintesis_catalog::{BinaryOp, Rate, UnaryOp};
