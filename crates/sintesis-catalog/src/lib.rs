//! Unit-generator spec catalog for the sintesis synthdef compiler.
//!
//! This crate describes *what* unit generators exist, never *how* they sound:
//! each [`UgenSpec`] records a UGen's name as the synthesis engine knows it,
//! the calculation rates it supports, its ordered input slots with defaults,
//! its output arity, and the meaning of its special index. The graph builder
//! consults the catalog by name through a single generic instantiation path;
//! no per-UGen types exist anywhere in the workspace.
//!
//! # Example
//!
//! ```rust
//! use sintesis_catalog::{Catalog, Rate};
//!
//! let catalog = Catalog::with_builtins();
//! let spec = catalog.get("SinOsc").unwrap();
//! assert!(spec.supports(Rate::Audio));
//! assert_eq!(spec.inputs[0].name, "frequency");
//! ```
//!
//! # Extending the catalog
//!
//! The built-in set covers the UGens the workspace itself exercises. Callers
//! with a larger engine catalog register their own specs:
//!
//! ```rust
//! use sintesis_catalog::{Catalog, InputSlot, Outputs, Rate, SpecialIndex, UgenSpec};
//!
//! const DUST: UgenSpec = UgenSpec {
//!     name: "Dust",
//!     rates: &[Rate::Audio, Rate::Control],
//!     default_rate: Rate::Audio,
//!     inputs: &[InputSlot::value("density", 0.0)],
//!     outputs: Outputs::Fixed(1),
//!     special: SpecialIndex::None,
//!     infer_rate: false,
//! };
//!
//! let mut catalog = Catalog::with_builtins();
//! catalog.register(DUST);
//! assert!(catalog.get("Dust").is_some());
//! ```

mod builtins;
mod ops;

pub use ops::{BinaryOp, UnaryOp};

use core::fmt;

/// Calculation rate of a UGen output or node.
///
/// The discriminants are the engine's wire tags, and the derived ordering is
/// the engine's execution-block priority: scalar-init nodes run once, control
/// nodes per control block, audio nodes per sample block, demand nodes on
/// demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Rate {
    /// Computed once at initialization.
    Scalar = 0,
    /// Computed once per control period.
    Control = 1,
    /// Computed once per output sample.
    Audio = 2,
    /// Computed when polled by a demand-driven consumer.
    Demand = 3,
}

impl Rate {
    /// The engine's wire tag for this rate.
    #[inline]
    pub fn tag(self) -> u8 {
        self as u8
    }

    /// Parses an engine wire tag.
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(Rate::Scalar),
            1 => Some(Rate::Control),
            2 => Some(Rate::Audio),
            3 => Some(Rate::Demand),
            _ => None,
        }
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Rate::Scalar => "scalar",
            Rate::Control => "control",
            Rate::Audio => "audio",
            Rate::Demand => "demand",
        };
        f.write_str(name)
    }
}

/// Rate rule for one input slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateConstraint {
    /// Any rate is accepted unchanged.
    Any,
    /// Signals faster than the given rate are rejected; the engine defines no
    /// implicit downsampling.
    AtMost(Rate),
    /// The slot follows the node's own calculation rate. When the node runs
    /// at audio rate, slower signals and bare constants are lifted through
    /// the converter named by [`lift_converter`]; faster signals are always
    /// rejected.
    NodeRate,
}

/// One named input slot of a UGen spec.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputSlot {
    /// Keyword name used at call sites.
    pub name: &'static str,
    /// Default value, or `None` if the slot must be supplied.
    pub default: Option<f32>,
    /// Whether a channel vector is consumed whole as consecutive inputs of
    /// one node instead of triggering multichannel expansion.
    pub array: bool,
    /// Rate rule applied to whatever the slot receives.
    pub constraint: RateConstraint,
}

impl InputSlot {
    /// A plain value slot with a default, any rate accepted.
    pub const fn value(name: &'static str, default: f32) -> Self {
        Self {
            name,
            default: Some(default),
            array: false,
            constraint: RateConstraint::Any,
        }
    }

    /// A required slot with no default, any rate accepted.
    pub const fn required(name: &'static str) -> Self {
        Self {
            name,
            default: None,
            array: false,
            constraint: RateConstraint::Any,
        }
    }

    /// A required signal slot that follows the node's own rate.
    pub const fn signal(name: &'static str) -> Self {
        Self {
            name,
            default: None,
            array: false,
            constraint: RateConstraint::NodeRate,
        }
    }

    /// A required array slot whose elements follow the node's own rate.
    pub const fn signal_array(name: &'static str) -> Self {
        Self {
            name,
            default: None,
            array: true,
            constraint: RateConstraint::NodeRate,
        }
    }

    /// A required array slot with no rate rule on its elements.
    pub const fn required_array(name: &'static str) -> Self {
        Self {
            name,
            default: None,
            array: true,
            constraint: RateConstraint::Any,
        }
    }

    /// A value slot capped at control rate.
    pub const fn control_value(name: &'static str, default: f32) -> Self {
        Self {
            name,
            default: Some(default),
            array: false,
            constraint: RateConstraint::AtMost(Rate::Control),
        }
    }

    /// A required slot capped at control rate.
    pub const fn control_required(name: &'static str) -> Self {
        Self {
            name,
            default: None,
            array: false,
            constraint: RateConstraint::AtMost(Rate::Control),
        }
    }
}

/// Output arity of a UGen spec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outputs {
    /// Always exactly this many outputs.
    Fixed(usize),
    /// Output count is chosen per call (multichannel buses, buffer players,
    /// control UGens). The default applies when the call does not choose.
    Variable {
        /// Channel count used when the call site does not override it.
        default: usize,
    },
}

/// Meaning of the special-index integer carried by every encoded node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialIndex {
    /// Unused; always encoded as zero.
    None,
    /// Selects an operator from the [`UnaryOp`] table.
    UnaryOp,
    /// Selects an operator from the [`BinaryOp`] table.
    BinaryOp,
    /// Index of the node's first value in the parameter value table
    /// (control-family UGens).
    ParameterOffset,
}

/// Static description of one unit generator.
///
/// Specs are plain data: the compiler reads them, never executes them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UgenSpec {
    /// Name as the synthesis engine spells it.
    pub name: &'static str,
    /// Calculation rates this UGen can run at.
    pub rates: &'static [Rate],
    /// Rate used when the call site does not request one.
    pub default_rate: Rate,
    /// Ordered input slots.
    pub inputs: &'static [InputSlot],
    /// Output arity.
    pub outputs: Outputs,
    /// What the special index means for this UGen.
    pub special: SpecialIndex,
    /// Whether an unspecified rate is inferred as the fastest input rate
    /// (operator UGens) rather than taken from `default_rate`.
    pub infer_rate: bool,
}

impl UgenSpec {
    /// Whether this UGen supports the given calculation rate.
    pub fn supports(&self, rate: Rate) -> bool {
        self.rates.contains(&rate)
    }

    /// Looks up an input slot by keyword name.
    pub fn slot(&self, name: &str) -> Option<(usize, &InputSlot)> {
        self.inputs
            .iter()
            .enumerate()
            .find(|(_, slot)| slot.name == name)
    }

    /// The default output count before any per-call override.
    pub fn default_output_count(&self) -> usize {
        match self.outputs {
            Outputs::Fixed(n) => n,
            Outputs::Variable { default } => default,
        }
    }
}

/// Name of the converter UGen that lifts a signal from one rate to another,
/// if the engine defines one.
///
/// Only the control-to-audio lift exists; there is no implicit downsampling.
pub fn lift_converter(from: Rate, to: Rate) -> Option<&'static str> {
    match (from, to) {
        (Rate::Scalar | Rate::Control, Rate::Audio) => Some("K2A"),
        _ => None,
    }
}

/// Read-only registry of UGen specs, looked up by engine name.
///
/// The catalog is loaded once and shared by reference; nothing in the
/// compiler mutates it after construction.
pub struct Catalog {
    specs: Vec<UgenSpec>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl Catalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self { specs: Vec::new() }
    }

    /// Creates a catalog preloaded with the built-in spec set.
    pub fn with_builtins() -> Self {
        let mut catalog = Self {
            specs: Vec::with_capacity(builtins::BUILTINS.len()),
        };
        for spec in builtins::BUILTINS {
            catalog.register(*spec);
        }
        catalog
    }

    /// Registers a spec, replacing any existing spec with the same name.
    pub fn register(&mut self, spec: UgenSpec) {
        if let Some(existing) = self.specs.iter_mut().find(|s| s.name == spec.name) {
            *existing = spec;
        } else {
            self.specs.push(spec);
        }
    }

    /// Looks up a spec by engine name.
    pub fn get(&self, name: &str) -> Option<&UgenSpec> {
        self.specs.iter().find(|s| s.name == name)
    }

    /// Whether a spec with the given name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterates over all registered spec names.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.specs.iter().map(|s| s.name)
    }

    /// Returns the number of registered specs.
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// Returns true if no specs are registered.
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}
