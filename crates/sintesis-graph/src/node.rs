//! Builder-side node storage.
//!
//! `UgenNode` is the mutable, pre-compilation form of a node: inputs still
//! carry literal values and context-relative references. Compilation resolves
//! these into constant-table indices and node-list positions.

use sintesis_catalog::Rate;

use crate::signal::NodeId;

/// One resolved input of a pending node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum PortInput {
    /// A literal value, interned into the constant table at compile time.
    Literal(f32),
    /// An output slot of another node.
    Ugen {
        /// The producing node.
        node: NodeId,
        /// Output slot on that node.
        output: usize,
    },
    /// A channel of a declared parameter, remapped to its control node at
    /// compile time. `node.index` is the parameter's declaration index.
    Parameter {
        /// Context and declaration index of the parameter.
        node: NodeId,
        /// Channel within the parameter's value list.
        channel: usize,
    },
}

/// One instantiated unit generator, before compilation.
///
/// Appending is the sole mutation: once pushed, a node is never edited,
/// reordered, or dropped by the builder. The sort step only reorders.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct UgenNode {
    /// Engine name of the spec this node instantiates.
    pub name: &'static str,
    /// Resolved calculation rate.
    pub rate: Rate,
    /// Operator selector or parameter offset; zero when unused.
    pub special_index: i16,
    /// Resolved inputs in slot order (array slots contribute one entry per
    /// element).
    pub inputs: Vec<PortInput>,
    /// Number of output channels.
    pub outputs: usize,
}
