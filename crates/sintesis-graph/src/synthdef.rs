//! The compiled synthdef.
//!
//! A [`SynthDef`] is the immutable result of
//! [`GraphBuilder::compile`](crate::GraphBuilder::compile): a named,
//! topologically ordered node list
//! plus the deduplicated constant table and the parameter tables. It carries
//! exactly the data the engine's container format encodes, so the binary
//! codec round-trips it without consulting anything else.

use sintesis_catalog::Rate;

use crate::error::CompileError;

/// One input reference of a compiled node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    /// Index into the synthdef's constant table.
    Constant(usize),
    /// An output slot of an earlier node in the node list.
    Ugen {
        /// Position of the producing node in the node list.
        ugen: usize,
        /// Output slot on that node.
        output: usize,
    },
}

/// One node of a compiled synthdef.
#[derive(Debug, Clone, PartialEq)]
pub struct Ugen {
    /// Engine name of the unit generator.
    pub name: String,
    /// Calculation rate.
    pub rate: Rate,
    /// Operator selector or parameter offset; zero when unused.
    pub special_index: i16,
    /// Input references in slot order.
    pub inputs: Vec<Input>,
    /// Calculation rate of each output channel.
    pub output_rates: Vec<Rate>,
}

/// One entry of the parameter name table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterName {
    /// Name unique within the synthdef.
    pub name: String,
    /// Index of the parameter's first value in the value table.
    pub index: usize,
}

/// A compiled unit-generator graph.
///
/// Equality is structural and node-wise: same ordered node list, same
/// constant table, same parameter tables. Two graphs that compare equal
/// encode to identical bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthDef {
    /// Name the engine registers the definition under.
    pub name: String,
    /// Deduplicated literal values, in first-use order over the node list.
    pub constants: Vec<f32>,
    /// Flattened parameter default values, in materialization order.
    pub parameter_values: Vec<f32>,
    /// Parameter names mapped to their first value index.
    pub parameter_names: Vec<ParameterName>,
    /// Topologically ordered node list.
    pub ugens: Vec<Ugen>,
}

impl SynthDef {
    /// Checks the structural invariants the builder guarantees: every
    /// constant reference indexes the constant table, every node reference
    /// points at an earlier node's real output slot, and every parameter
    /// name maps into the value table.
    ///
    /// Graphs produced by [`GraphBuilder::compile`](crate::GraphBuilder::compile)
    /// always pass; this guards decoded or hand-assembled graphs.
    pub fn validate(&self) -> Result<(), CompileError> {
        for (position, ugen) in self.ugens.iter().enumerate() {
            for input in &ugen.inputs {
                match *input {
                    Input::Constant(index) => {
                        if index >= self.constants.len() {
                            return Err(CompileError::InvalidReference {
                                ugen: position,
                                detail: format!(
                                    "constant index {index} outside table of {}",
                                    self.constants.len()
                                ),
                            });
                        }
                    }
                    Input::Ugen { ugen: source, output } => {
                        if source >= position {
                            return Err(CompileError::InvalidReference {
                                ugen: position,
                                detail: format!("forward reference to node {source}"),
                            });
                        }
                        let available = self.ugens[source].output_rates.len();
                        if output >= available {
                            return Err(CompileError::InvalidReference {
                                ugen: position,
                                detail: format!(
                                    "output slot {output} outside node {source}'s {available} outputs"
                                ),
                            });
                        }
                    }
                }
            }
        }
        for (position, parameter) in self.parameter_names.iter().enumerate() {
            if parameter.index >= self.parameter_values.len() {
                return Err(CompileError::InvalidReference {
                    ugen: position,
                    detail: format!(
                        "parameter '{}' maps to value index {} outside table of {}",
                        parameter.name,
                        parameter.index,
                        self.parameter_values.len()
                    ),
                });
            }
        }
        Ok(())
    }

    /// Looks up a parameter's first value index by name.
    pub fn parameter_index(&self, name: &str) -> Option<usize> {
        self.parameter_names
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.index)
    }
}
