//! Builder context: the scoped construction session for one graph.
//!
//! A [`GraphBuilder`] accumulates unit-generator nodes while a graph is being
//! described. Every call goes through one generic instantiation path: the
//! catalog is consulted by name, keyword inputs are bound to slots,
//! multichannel expansion fans the call out over channel vectors, rate rules
//! are enforced (inserting implicit lift nodes where the engine declares a
//! conversion), and bare literals are recorded for constant interning.
//!
//! Construction is single threaded and strictly scoped: a builder owns its
//! node list, nested contexts are explicit child values, and nothing merges
//! back without [`GraphBuilder::splice`]. Compilation consumes the builder
//! and produces an immutable [`SynthDef`].

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};

use sintesis_catalog::{
    BinaryOp, Catalog, InputSlot, Outputs, Rate, RateConstraint, UgenSpec, UnaryOp, lift_converter,
};

use crate::error::{BuildError, CompileError};
use crate::node::{PortInput, UgenNode};
use crate::param::{Parameter, ParameterRate};
use crate::signal::{NodeId, OutputProxy, ProxySource, Signal};
use crate::synthdef::{Input, ParameterName, SynthDef, Ugen};

/// Upper bound on multichannel fan-out for a single call.
///
/// Expansion is multiplicative under nesting; this bound turns a pathological
/// blow-up into an error instead of an effectively unbounded allocation.
pub const MAX_FAN_OUT: usize = 4096;

static NEXT_CONTEXT: AtomicU32 = AtomicU32::new(0);

/// Scoped construction session for one unit-generator graph.
///
/// ```rust
/// use sintesis_catalog::Catalog;
/// use sintesis_graph::{GraphBuilder, Parameter};
///
/// let catalog = Catalog::with_builtins();
/// let mut builder = GraphBuilder::new("beep", &catalog);
/// let freq = builder.parameter(Parameter::new("frequency", 440.0))?;
/// let osc = builder.ugen("SinOsc").input("frequency", freq).add()?;
/// builder.ugen("Out").input("source", osc).add()?;
/// let synthdef = builder.compile()?;
/// assert_eq!(synthdef.name, "beep");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct GraphBuilder<'a> {
    name: String,
    catalog: &'a Catalog,
    context: u32,
    parent: Option<&'a GraphBuilder<'a>>,
    nodes: Vec<UgenNode>,
    params: Vec<Parameter>,
}

/// A nested context detached from its parent, ready to splice.
///
/// Produced by [`GraphBuilder::finalize`]; holds the child's nodes and the
/// signals the child chose to export. Nothing in it is visible to the parent
/// until [`GraphBuilder::splice`] accepts it.
pub struct ScopedNodes {
    context: u32,
    parent_context: Option<u32>,
    nodes: Vec<UgenNode>,
    exports: Vec<Signal>,
}

/// One pending unit-generator call, built keyword by keyword.
///
/// Created by [`GraphBuilder::ugen`]; consumed by [`UgenCall::add`], which
/// performs the lookup, binding, expansion, and node creation.
pub struct UgenCall<'b, 'a> {
    builder: &'b mut GraphBuilder<'a>,
    name: String,
    rate: Option<Rate>,
    inputs: Vec<(String, Signal)>,
    channels: Option<usize>,
    special: Option<i16>,
}

impl<'b, 'a> UgenCall<'b, 'a> {
    /// Requests an explicit calculation rate instead of the spec default.
    pub fn rate(mut self, rate: Rate) -> Self {
        self.rate = Some(rate);
        self
    }

    /// Binds a keyword input. Unknown keywords fail at [`add`](Self::add).
    pub fn input(mut self, name: &str, signal: impl Into<Signal>) -> Self {
        self.inputs.push((name.to_string(), signal.into()));
        self
    }

    /// Overrides the output channel count of a variable-arity UGen.
    pub fn channels(mut self, count: usize) -> Self {
        self.channels = Some(count);
        self
    }

    /// Sets the special index (operator selector or engine-defined code).
    pub fn special(mut self, special: i16) -> Self {
        self.special = Some(special);
        self
    }

    /// Resolves the call against the catalog and appends one node per
    /// expansion repetition.
    ///
    /// Returns a scalar signal for a plain call, or a channel vector when
    /// any non-array input was a vector or the node has several outputs.
    pub fn add(self) -> Result<Signal, BuildError> {
        let UgenCall {
            builder,
            name,
            rate,
            inputs,
            channels,
            special,
        } = self;

        let Some(&spec) = builder.catalog.get(&name) else {
            return Err(BuildError::UnknownUgen(name));
        };

        if let Some(requested) = rate
            && !spec.supports(requested)
        {
            return Err(BuildError::UnsupportedRate {
                ugen: name,
                rate: requested,
            });
        }

        let out_count = match (spec.outputs, channels) {
            (Outputs::Fixed(n), None) => n,
            (Outputs::Fixed(n), Some(c)) if c == n => n,
            (Outputs::Fixed(_), Some(_)) => return Err(BuildError::FixedOutputs(name)),
            (Outputs::Variable { default }, c) => c.unwrap_or(default),
        };

        let mut supplied = inputs;
        let mut bindings = Vec::with_capacity(spec.inputs.len());
        for slot in spec.inputs {
            let value = match supplied.iter().position(|(n, _)| n == slot.name) {
                Some(pos) => supplied.swap_remove(pos).1,
                None => match slot.default {
                    Some(default) => Signal::Constant(default),
                    None => {
                        return Err(BuildError::MissingInput {
                            ugen: name,
                            slot: slot.name.to_string(),
                        });
                    }
                },
            };
            bindings.push((*slot, value));
        }
        if let Some((leftover, _)) = supplied.first() {
            return Err(BuildError::UnknownInput {
                ugen: name,
                input: leftover.clone(),
            });
        }

        builder.expand(spec, rate, special.unwrap_or(0), out_count, bindings)
    }
}

impl<'a> GraphBuilder<'a> {
    /// Creates a root builder context for a graph with the given name.
    pub fn new(name: impl Into<String>, catalog: &'a Catalog) -> Self {
        Self {
            name: name.into(),
            catalog,
            context: NEXT_CONTEXT.fetch_add(1, Ordering::Relaxed),
            parent: None,
            nodes: Vec::new(),
            params: Vec::new(),
        }
    }

    /// The graph name the compiled synthdef will carry.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The catalog this builder resolves calls against.
    pub fn catalog(&self) -> &Catalog {
        self.catalog
    }

    /// Number of nodes appended so far, implicit lift nodes included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of parameters declared so far.
    pub fn parameter_count(&self) -> usize {
        self.params.len()
    }

    /// Starts a unit-generator call.
    pub fn ugen(&mut self, name: &str) -> UgenCall<'_, 'a> {
        UgenCall {
            builder: self,
            name: name.to_string(),
            rate: None,
            inputs: Vec::new(),
            channels: None,
            special: None,
        }
    }

    /// Declares a named parameter and returns its proxy signal.
    ///
    /// Parameters materialize as control nodes heading the compiled node
    /// order. Duplicate names within one graph fail immediately; nested
    /// contexts may reference a parent's parameters but not declare their
    /// own.
    pub fn parameter(&mut self, parameter: Parameter) -> Result<Signal, BuildError> {
        if self.parent.is_some() {
            return Err(BuildError::NestedParameter(parameter.name().to_string()));
        }
        if parameter.values().is_empty() {
            return Err(BuildError::EmptyParameter(parameter.name().to_string()));
        }
        if self.params.iter().any(|p| p.name() == parameter.name()) {
            return Err(BuildError::DuplicateParameter(parameter.name().to_string()));
        }
        if parameter.lag_time() != 0.0 && parameter.rate_category() != ParameterRate::Control {
            return Err(BuildError::UnsupportedLag {
                parameter: parameter.name().to_string(),
                rate: parameter.rate_category(),
            });
        }

        let id = NodeId {
            context: self.context,
            index: self.params.len() as u32,
        };
        let rate = parameter.rate_category().signal_rate();
        let channels = parameter.values().len();
        #[cfg(feature = "tracing")]
        tracing::debug!(
            "graph_parameter: '{}' ({} channel(s))",
            parameter.name(),
            channels
        );
        self.params.push(parameter);

        let proxy = |channel: usize| {
            Signal::Node(OutputProxy {
                source: ProxySource::Parameter(id),
                output: channel,
                rate,
            })
        };
        Ok(if channels == 1 {
            proxy(0)
        } else {
            Signal::Vector((0..channels).map(proxy).collect())
        })
    }

    // --- Signal arithmetic ---

    /// Builds a binary-operator node (or one per expansion repetition).
    pub fn binary(
        &mut self,
        op: BinaryOp,
        left: impl Into<Signal>,
        right: impl Into<Signal>,
    ) -> Result<Signal, BuildError> {
        self.ugen("BinaryOpUGen")
            .special(op.selector())
            .input("left", left)
            .input("right", right)
            .add()
    }

    /// Builds a unary-operator node (or one per expansion repetition).
    pub fn unary(&mut self, op: UnaryOp, source: impl Into<Signal>) -> Result<Signal, BuildError> {
        self.ugen("UnaryOpUGen")
            .special(op.selector())
            .input("source", source)
            .add()
    }

    /// Adds two signals.
    pub fn add(
        &mut self,
        left: impl Into<Signal>,
        right: impl Into<Signal>,
    ) -> Result<Signal, BuildError> {
        self.binary(BinaryOp::Add, left, right)
    }

    /// Subtracts `right` from `left`.
    pub fn sub(
        &mut self,
        left: impl Into<Signal>,
        right: impl Into<Signal>,
    ) -> Result<Signal, BuildError> {
        self.binary(BinaryOp::Sub, left, right)
    }

    /// Multiplies two signals.
    pub fn mul(
        &mut self,
        left: impl Into<Signal>,
        right: impl Into<Signal>,
    ) -> Result<Signal, BuildError> {
        self.binary(BinaryOp::Mul, left, right)
    }

    /// Divides `left` by `right`.
    pub fn div(
        &mut self,
        left: impl Into<Signal>,
        right: impl Into<Signal>,
    ) -> Result<Signal, BuildError> {
        self.binary(BinaryOp::Div, left, right)
    }

    /// Minimum of two signals.
    pub fn min(
        &mut self,
        left: impl Into<Signal>,
        right: impl Into<Signal>,
    ) -> Result<Signal, BuildError> {
        self.binary(BinaryOp::Min, left, right)
    }

    /// Maximum of two signals.
    pub fn max(
        &mut self,
        left: impl Into<Signal>,
        right: impl Into<Signal>,
    ) -> Result<Signal, BuildError> {
        self.binary(BinaryOp::Max, left, right)
    }

    /// Negates a signal.
    pub fn neg(&mut self, source: impl Into<Signal>) -> Result<Signal, BuildError> {
        self.unary(UnaryOp::Neg, source)
    }

    /// Absolute value of a signal.
    pub fn abs(&mut self, source: impl Into<Signal>) -> Result<Signal, BuildError> {
        self.unary(UnaryOp::Abs, source)
    }

    /// Converts a MIDI note number signal to cycles per second.
    pub fn midicps(&mut self, source: impl Into<Signal>) -> Result<Signal, BuildError> {
        self.unary(UnaryOp::MidiCps, source)
    }

    // --- Nested contexts ---

    /// Opens a nested builder context.
    ///
    /// The child may consume this builder's signals (and its ancestors'),
    /// but its own nodes stay local until finalized and spliced back.
    pub fn child(&self) -> GraphBuilder<'_> {
        GraphBuilder {
            name: self.name.clone(),
            catalog: self.catalog,
            context: NEXT_CONTEXT.fetch_add(1, Ordering::Relaxed),
            parent: Some(self),
            nodes: Vec::new(),
            params: Vec::new(),
        }
    }

    /// Detaches this context from its parent, keeping the chosen exports
    /// addressable after the splice.
    pub fn finalize(self, exports: Vec<Signal>) -> ScopedNodes {
        ScopedNodes {
            context: self.context,
            parent_context: self.parent.map(|p| p.context),
            nodes: self.nodes,
            exports,
        }
    }

    /// Appends a finalized child's nodes to this builder and returns the
    /// child's exports, remapped into this context.
    pub fn splice(&mut self, scoped: ScopedNodes) -> Result<Vec<Signal>, BuildError> {
        if scoped.parent_context != Some(self.context) {
            return Err(BuildError::ForeignSplice);
        }
        let base = self.nodes.len() as u32;
        let child = scoped.context;
        let target = self.context;
        let remap_id = move |id: NodeId| {
            if id.context == child {
                NodeId {
                    context: target,
                    index: base + id.index,
                }
            } else {
                id
            }
        };

        #[cfg(feature = "tracing")]
        tracing::debug!("graph_splice: {} nodes from child context", scoped.nodes.len());

        for mut node in scoped.nodes {
            for input in &mut node.inputs {
                match input {
                    PortInput::Ugen { node: id, .. } => *id = remap_id(*id),
                    PortInput::Parameter { node: id, .. } => *id = remap_id(*id),
                    PortInput::Literal(_) => {}
                }
            }
            self.nodes.push(node);
        }
        Ok(scoped
            .exports
            .iter()
            .map(|signal| remap_signal(signal, &remap_id))
            .collect())
    }

    // --- Expansion and node creation ---

    /// Fans a bound call out over its channel-vector inputs.
    ///
    /// Inputs shorter than the widest vector cycle modulo their own length;
    /// scalars repeat unchanged. Array slots never trigger expansion; their
    /// vectors are consumed whole by each repetition.
    fn expand(
        &mut self,
        spec: UgenSpec,
        requested: Option<Rate>,
        special: i16,
        out_count: usize,
        bindings: Vec<(InputSlot, Signal)>,
    ) -> Result<Signal, BuildError> {
        let expanding = bindings
            .iter()
            .any(|(slot, signal)| !slot.array && signal.is_vector());
        if !expanding {
            return self.make_node(spec, requested, special, out_count, &bindings);
        }

        for (slot, signal) in &bindings {
            if !slot.array && signal.is_vector() && signal.channels() == 0 {
                return Err(BuildError::EmptyInput {
                    ugen: spec.name.to_string(),
                    slot: slot.name.to_string(),
                });
            }
        }

        let fan = bindings
            .iter()
            .filter(|(slot, _)| !slot.array)
            .map(|(_, signal)| signal.channels())
            .max()
            .unwrap_or(1);
        if fan > MAX_FAN_OUT {
            return Err(BuildError::ExpansionTooLarge {
                ugen: spec.name.to_string(),
                requested: fan,
                limit: MAX_FAN_OUT,
            });
        }

        #[cfg(feature = "tracing")]
        tracing::debug!("graph_expand: '{}' fans out to {fan} channels", spec.name);

        let mut channels = Vec::with_capacity(fan);
        for repetition in 0..fan {
            let selected: Vec<(InputSlot, Signal)> = bindings
                .iter()
                .map(|(slot, signal)| {
                    let value = if slot.array {
                        signal.clone()
                    } else {
                        signal.at(repetition).clone()
                    };
                    (*slot, value)
                })
                .collect();
            channels.push(self.expand(spec, requested, special, out_count, selected)?);
        }
        Ok(Signal::Vector(channels))
    }

    /// Appends one node from fully scalar bindings.
    fn make_node(
        &mut self,
        spec: UgenSpec,
        requested: Option<Rate>,
        special: i16,
        out_count: usize,
        bindings: &[(InputSlot, Signal)],
    ) -> Result<Signal, BuildError> {
        let rate = match requested {
            Some(rate) => rate,
            None if spec.infer_rate => bindings
                .iter()
                .filter_map(|(_, signal)| signal.rate())
                .max()
                .unwrap_or(spec.default_rate),
            None => spec.default_rate,
        };
        if !spec.supports(rate) {
            return Err(BuildError::UnsupportedRate {
                ugen: spec.name.to_string(),
                rate,
            });
        }

        let mut inputs = Vec::with_capacity(bindings.len());
        for (slot, signal) in bindings {
            if slot.array {
                let mut elements = Vec::new();
                flatten(signal, &mut elements);
                if elements.is_empty() {
                    return Err(BuildError::EmptyInput {
                        ugen: spec.name.to_string(),
                        slot: slot.name.to_string(),
                    });
                }
                for element in elements {
                    inputs.push(self.resolve_port(spec.name, slot, rate, element)?);
                }
            } else {
                inputs.push(self.resolve_port(spec.name, slot, rate, signal)?);
            }
        }

        let id = NodeId {
            context: self.context,
            index: self.nodes.len() as u32,
        };
        self.nodes.push(UgenNode {
            name: spec.name,
            rate,
            special_index: special,
            inputs,
            outputs: out_count,
        });
        #[cfg(feature = "tracing")]
        tracing::debug!(
            "graph_add: '{}' at {rate} rate, node {}",
            spec.name,
            id.index
        );

        let proxy = |output: usize| {
            Signal::Node(OutputProxy {
                source: ProxySource::Ugen(id),
                output,
                rate,
            })
        };
        Ok(match out_count {
            0 => Signal::Vector(Vec::new()),
            1 => proxy(0),
            n => Signal::Vector((0..n).map(proxy).collect()),
        })
    }

    /// Resolves one scalar signal against a slot's rate rule, inserting an
    /// implicit lift node where the engine declares the conversion legal.
    fn resolve_port(
        &mut self,
        ugen: &'static str,
        slot: &InputSlot,
        node_rate: Rate,
        signal: &Signal,
    ) -> Result<PortInput, BuildError> {
        match signal {
            Signal::Constant(value) => {
                if slot.constraint == RateConstraint::NodeRate && node_rate == Rate::Audio {
                    return self.lift(ugen, slot, Rate::Scalar, node_rate, PortInput::Literal(*value));
                }
                Ok(PortInput::Literal(*value))
            }
            Signal::Node(proxy) => {
                let (node_id, port) = match proxy.source {
                    ProxySource::Ugen(id) => (
                        id,
                        PortInput::Ugen {
                            node: id,
                            output: proxy.output,
                        },
                    ),
                    ProxySource::Parameter(id) => (
                        id,
                        PortInput::Parameter {
                            node: id,
                            channel: proxy.output,
                        },
                    ),
                };
                if !self.knows_context(node_id.context) {
                    return Err(BuildError::ForeignSignal {
                        ugen: ugen.to_string(),
                        slot: slot.name.to_string(),
                    });
                }
                let supplied = proxy.rate;
                match slot.constraint {
                    RateConstraint::Any => Ok(port),
                    RateConstraint::AtMost(limit) => {
                        if supplied <= limit {
                            Ok(port)
                        } else {
                            Err(BuildError::RateMismatch {
                                ugen: ugen.to_string(),
                                slot: slot.name.to_string(),
                                supplied,
                                accepted: limit,
                            })
                        }
                    }
                    RateConstraint::NodeRate => {
                        if supplied > node_rate {
                            Err(BuildError::RateMismatch {
                                ugen: ugen.to_string(),
                                slot: slot.name.to_string(),
                                supplied,
                                accepted: node_rate,
                            })
                        } else if supplied < node_rate && node_rate == Rate::Audio {
                            self.lift(ugen, slot, supplied, node_rate, port)
                        } else {
                            Ok(port)
                        }
                    }
                }
            }
            Signal::Vector(_) => unreachable!("expansion leaves only scalar bindings"),
        }
    }

    /// Inserts the engine's rate-conversion node in front of an input.
    fn lift(
        &mut self,
        ugen: &'static str,
        slot: &InputSlot,
        from: Rate,
        to: Rate,
        source: PortInput,
    ) -> Result<PortInput, BuildError> {
        let no_conversion = || BuildError::NoConversion {
            ugen: ugen.to_string(),
            slot: slot.name.to_string(),
            from,
            to,
        };
        let converter = lift_converter(from, to).ok_or_else(no_conversion)?;
        let Some(&spec) = self.catalog.get(converter) else {
            return Err(no_conversion());
        };

        let id = NodeId {
            context: self.context,
            index: self.nodes.len() as u32,
        };
        self.nodes.push(UgenNode {
            name: spec.name,
            rate: to,
            special_index: 0,
            inputs: vec![source],
            outputs: spec.default_output_count(),
        });
        #[cfg(feature = "tracing")]
        tracing::debug!(
            "graph_lift: '{converter}' inserted for input '{}' of '{ugen}'",
            slot.name
        );
        Ok(PortInput::Ugen {
            node: id,
            output: 0,
        })
    }

    fn knows_context(&self, context: u32) -> bool {
        if context == self.context {
            return true;
        }
        let mut ancestor = self.parent;
        while let Some(builder) = ancestor {
            if builder.context == context {
                return true;
            }
            ancestor = builder.parent;
        }
        false
    }

    // --- Compilation ---

    /// Compiles the finished node set into an immutable [`SynthDef`].
    ///
    /// Materializes parameters as control nodes heading the order, runs the
    /// stable rate-grouped topological sort, interns constants in first-use
    /// order over the final node list, and resolves every input to a
    /// constant-table index or a prior-node reference.
    pub fn compile(self) -> Result<SynthDef, CompileError> {
        // Parameter materialization: one control node per non-empty rate
        // category, special index pointing at its first value.
        let mut control_nodes: Vec<UgenNode> = Vec::new();
        let mut parameter_values: Vec<f32> = Vec::new();
        let mut parameter_names: Vec<ParameterName> = Vec::new();
        let mut param_map = vec![(0usize, 0usize); self.params.len()];

        for category in ParameterRate::GROUP_ORDER {
            let group: Vec<(usize, &Parameter)> = self
                .params
                .iter()
                .enumerate()
                .filter(|(_, p)| p.rate_category() == category)
                .collect();
            if group.is_empty() {
                continue;
            }
            let node_index = control_nodes.len();
            let offset = parameter_values.len();
            let lagged = category == ParameterRate::Control
                && group.iter().any(|(_, p)| p.lag_time() != 0.0);

            let mut inputs = Vec::new();
            let mut channels = 0usize;
            for (declaration, parameter) in &group {
                param_map[*declaration] = (node_index, channels);
                parameter_names.push(ParameterName {
                    name: parameter.name().to_string(),
                    index: parameter_values.len(),
                });
                parameter_values.extend_from_slice(parameter.values());
                if lagged {
                    for _ in parameter.values() {
                        inputs.push(PortInput::Literal(parameter.lag_time()));
                    }
                }
                channels += parameter.values().len();
            }

            let name = if lagged {
                "LagControl"
            } else {
                category.control_ugen()
            };
            control_nodes.push(UgenNode {
                name,
                rate: category.signal_rate(),
                special_index: offset as i16,
                inputs,
                outputs: channels,
            });
        }

        let pinned = control_nodes.len();
        let total = pinned + self.nodes.len();

        // Flatten to construction order: control block, then user nodes,
        // with every reference resolved to a plain index.
        enum RawInput {
            Literal(f32),
            Ref { node: usize, output: usize },
        }
        let mut names = Vec::with_capacity(total);
        let mut rates = Vec::with_capacity(total);
        let mut specials = Vec::with_capacity(total);
        let mut out_counts = Vec::with_capacity(total);
        let mut raw_inputs: Vec<Vec<RawInput>> = Vec::with_capacity(total);

        for node in &control_nodes {
            names.push(node.name);
            rates.push(node.rate);
            specials.push(node.special_index);
            out_counts.push(node.outputs);
            raw_inputs.push(
                node.inputs
                    .iter()
                    .map(|input| match input {
                        PortInput::Literal(value) => RawInput::Literal(*value),
                        PortInput::Ugen { .. } | PortInput::Parameter { .. } => {
                            unreachable!("control nodes carry only literal inputs")
                        }
                    })
                    .collect(),
            );
        }

        for (position, node) in self.nodes.iter().enumerate() {
            let mut resolved = Vec::with_capacity(node.inputs.len());
            for input in &node.inputs {
                let raw = match input {
                    PortInput::Literal(value) => RawInput::Literal(*value),
                    PortInput::Ugen { node: id, output } => {
                        if id.context != self.context {
                            return Err(CompileError::UnmergedScope {
                                node: pinned + position,
                            });
                        }
                        RawInput::Ref {
                            node: pinned + id.index as usize,
                            output: *output,
                        }
                    }
                    PortInput::Parameter { node: id, channel } => {
                        if id.context != self.context {
                            return Err(CompileError::UnmergedScope {
                                node: pinned + position,
                            });
                        }
                        let (control, offset) = param_map[id.index as usize];
                        RawInput::Ref {
                            node: control,
                            output: offset + channel,
                        }
                    }
                };
                resolved.push(raw);
            }
            names.push(node.name);
            rates.push(node.rate);
            specials.push(node.special_index);
            out_counts.push(node.outputs);
            raw_inputs.push(resolved);
        }

        // Stable rate-grouped topological sort.
        let sortable: Vec<crate::sort::SortableNode> = raw_inputs
            .iter()
            .zip(&rates)
            .map(|(inputs, &rate)| crate::sort::SortableNode {
                rate,
                deps: inputs
                    .iter()
                    .filter_map(|input| match input {
                        RawInput::Ref { node, .. } => Some(*node),
                        RawInput::Literal(_) => None,
                    })
                    .collect(),
            })
            .collect();
        let order = crate::sort::ordered(&sortable, pinned)?;

        let mut position_of = vec![0usize; total];
        for (new_position, &old) in order.iter().enumerate() {
            position_of[old] = new_position;
        }

        // Constant interning in first-use order over the final node list,
        // keyed by bit pattern for deterministic bytes.
        let mut constants: Vec<f32> = Vec::new();
        let mut interned: HashMap<u32, usize> = HashMap::new();
        let mut ugens = Vec::with_capacity(total);
        for &old in &order {
            let inputs = raw_inputs[old]
                .iter()
                .map(|input| match input {
                    RawInput::Literal(value) => {
                        let index = *interned.entry(value.to_bits()).or_insert_with(|| {
                            constants.push(*value);
                            constants.len() - 1
                        });
                        Input::Constant(index)
                    }
                    RawInput::Ref { node, output } => Input::Ugen {
                        ugen: position_of[*node],
                        output: *output,
                    },
                })
                .collect();
            ugens.push(Ugen {
                name: names[old].to_string(),
                rate: rates[old],
                special_index: specials[old],
                inputs,
                output_rates: vec![rates[old]; out_counts[old]],
            });
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            "graph_compile: '{}' with {} nodes, {} constants, {} parameters",
            self.name,
            ugens.len(),
            constants.len(),
            parameter_values.len()
        );

        Ok(SynthDef {
            name: self.name,
            constants,
            parameter_values,
            parameter_names,
            ugens,
        })
    }
}

/// Collects the scalar leaves of a signal, flattening nested vectors.
fn flatten<'s>(signal: &'s Signal, out: &mut Vec<&'s Signal>) {
    match signal {
        Signal::Vector(items) => {
            for item in items {
                flatten(item, out);
            }
        }
        scalar => out.push(scalar),
    }
}

/// Rewrites proxies from a spliced child context into the parent's.
fn remap_signal(signal: &Signal, remap_id: &impl Fn(NodeId) -> NodeId) -> Signal {
    match signal {
        Signal::Constant(value) => Signal::Constant(*value),
        Signal::Node(proxy) => {
            let source = match proxy.source {
                ProxySource::Ugen(id) => ProxySource::Ugen(remap_id(id)),
                ProxySource::Parameter(id) => ProxySource::Parameter(remap_id(id)),
            };
            Signal::Node(OutputProxy {
                source,
                output: proxy.output,
                rate: proxy.rate,
            })
        }
        Signal::Vector(items) => Signal::Vector(
            items
                .iter()
                .map(|item| remap_signal(item, remap_id))
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        Catalog::with_builtins()
    }

    #[test]
    fn plain_call_uses_spec_defaults() {
        let catalog = catalog();
        let mut builder = GraphBuilder::new("t", &catalog);
        let osc = builder.ugen("SinOsc").add().unwrap();
        assert!(matches!(osc, Signal::Node(_)));
        assert_eq!(builder.node_count(), 1);

        let def = builder.compile().unwrap();
        assert_eq!(def.ugens.len(), 1);
        assert_eq!(def.ugens[0].name, "SinOsc");
        assert_eq!(def.ugens[0].rate, Rate::Audio);
        assert_eq!(def.constants, vec![440.0, 0.0]);
    }

    #[test]
    fn unknown_ugen_is_rejected() {
        let catalog = catalog();
        let mut builder = GraphBuilder::new("t", &catalog);
        let err = builder.ugen("NoSuchThing").add().unwrap_err();
        assert_eq!(err, BuildError::UnknownUgen("NoSuchThing".to_string()));
    }

    #[test]
    fn unknown_keyword_is_rejected() {
        let catalog = catalog();
        let mut builder = GraphBuilder::new("t", &catalog);
        let err = builder
            .ugen("SinOsc")
            .input("frequencyy", 440.0)
            .add()
            .unwrap_err();
        assert!(matches!(err, BuildError::UnknownInput { .. }));
    }

    #[test]
    fn missing_required_input_names_the_slot() {
        let catalog = catalog();
        let mut builder = GraphBuilder::new("t", &catalog);
        let err = builder.ugen("PlayBuf").add().unwrap_err();
        assert_eq!(
            err,
            BuildError::MissingInput {
                ugen: "PlayBuf".to_string(),
                slot: "buffer_id".to_string(),
            }
        );
        assert_eq!(builder.node_count(), 0, "failed call must not append");
    }

    #[test]
    fn unsupported_rate_is_rejected() {
        let catalog = catalog();
        let mut builder = GraphBuilder::new("t", &catalog);
        let err = builder
            .ugen("Rand")
            .rate(Rate::Audio)
            .add()
            .unwrap_err();
        assert!(matches!(err, BuildError::UnsupportedRate { .. }));
    }

    #[test]
    fn fixed_arity_rejects_channel_override() {
        let catalog = catalog();
        let mut builder = GraphBuilder::new("t", &catalog);
        let err = builder.ugen("SinOsc").channels(2).add().unwrap_err();
        assert_eq!(err, BuildError::FixedOutputs("SinOsc".to_string()));
    }

    #[test]
    fn variable_arity_honors_channel_override() {
        let catalog = catalog();
        let mut builder = GraphBuilder::new("t", &catalog);
        let ins = builder.ugen("In").channels(4).add().unwrap();
        assert_eq!(ins.channels(), 4);
    }

    #[test]
    fn operator_rate_is_inferred_from_operands() {
        let catalog = catalog();
        let mut builder = GraphBuilder::new("t", &catalog);
        let osc = builder.ugen("SinOsc").rate(Rate::Control).add().unwrap();
        builder.mul(osc, 0.5).unwrap();
        let def = builder.compile().unwrap();
        let op = def.ugens.iter().find(|u| u.name == "BinaryOpUGen").unwrap();
        assert_eq!(op.rate, Rate::Control);
        assert_eq!(op.special_index, BinaryOp::Mul.selector());
    }

    #[test]
    fn multichannel_call_returns_a_vector() {
        let catalog = catalog();
        let mut builder = GraphBuilder::new("t", &catalog);
        let oscs = builder
            .ugen("SinOsc")
            .input("frequency", vec![440.0_f32, 550.0, 660.0])
            .add()
            .unwrap();
        assert_eq!(oscs.channels(), 3);
        assert_eq!(builder.node_count(), 3);
    }

    #[test]
    fn multi_output_node_returns_one_proxy_per_output() {
        let catalog = catalog();
        let mut builder = GraphBuilder::new("t", &catalog);
        let osc = builder.ugen("SinOsc").add().unwrap();
        let panned = builder.ugen("Pan2").input("source", osc).add().unwrap();
        assert_eq!(panned.channels(), 2);
        assert_eq!(builder.node_count(), 2);
    }

    #[test]
    fn duplicate_parameter_fails_before_any_node() {
        let catalog = catalog();
        let mut builder = GraphBuilder::new("t", &catalog);
        builder.parameter(Parameter::new("freq", 440.0)).unwrap();
        let err = builder
            .parameter(Parameter::new("freq", 220.0))
            .unwrap_err();
        assert_eq!(err, BuildError::DuplicateParameter("freq".to_string()));
        assert_eq!(builder.node_count(), 0);
    }

    #[test]
    fn lag_on_trigger_parameter_is_rejected() {
        let catalog = catalog();
        let mut builder = GraphBuilder::new("t", &catalog);
        let err = builder
            .parameter(Parameter::new("gate", 1.0).rate(ParameterRate::Trigger).lag(0.1))
            .unwrap_err();
        assert!(matches!(err, BuildError::UnsupportedLag { .. }));
    }

    #[test]
    fn child_nodes_stay_local_until_spliced() {
        let catalog = catalog();
        let mut parent = GraphBuilder::new("t", &catalog);
        let carrier = parent.ugen("SinOsc").add().unwrap();

        let mut child = parent.child();
        let shaped = child.ugen("LPF").input("source", &carrier).add().unwrap();
        assert_eq!(child.node_count(), 1);
        let scoped = child.finalize(vec![shaped]);

        assert_eq!(parent.node_count(), 1, "child nodes not yet merged");
        let exports = parent.splice(scoped).unwrap();
        assert_eq!(parent.node_count(), 2);
        assert_eq!(exports.len(), 1);

        parent
            .ugen("Out")
            .input("source", exports[0].clone())
            .add()
            .unwrap();
        let def = parent.compile().unwrap();
        assert_eq!(def.ugens.len(), 3);
    }

    #[test]
    fn splice_into_non_parent_is_rejected() {
        let catalog = catalog();
        let parent = GraphBuilder::new("t", &catalog);
        let child = parent.child();
        let scoped = child.finalize(Vec::new());

        let mut other = GraphBuilder::new("u", &catalog);
        assert_eq!(other.splice(scoped), Err(BuildError::ForeignSplice));
    }

    #[test]
    fn parameters_cannot_be_declared_in_a_child() {
        let catalog = catalog();
        let parent = GraphBuilder::new("t", &catalog);
        let mut child = parent.child();
        let err = child.parameter(Parameter::new("freq", 440.0)).unwrap_err();
        assert!(matches!(err, BuildError::NestedParameter(_)));
    }

    #[test]
    fn foreign_signal_is_rejected() {
        let catalog = catalog();
        let mut one = GraphBuilder::new("one", &catalog);
        let osc = one.ugen("SinOsc").add().unwrap();

        let mut two = GraphBuilder::new("two", &catalog);
        let err = two.ugen("LPF").input("source", osc).add().unwrap_err();
        assert!(matches!(err, BuildError::ForeignSignal { .. }));
    }

    #[test]
    fn compiling_a_child_that_kept_parent_references_fails() {
        let catalog = catalog();
        let mut parent = GraphBuilder::new("t", &catalog);
        let osc = parent.ugen("SinOsc").add().unwrap();

        let mut child = parent.child();
        child.ugen("LPF").input("source", &osc).add().unwrap();
        let err = child.compile().unwrap_err();
        assert!(matches!(err, CompileError::UnmergedScope { .. }));
    }

    #[test]
    fn empty_vector_input_is_rejected() {
        let catalog = catalog();
        let mut builder = GraphBuilder::new("t", &catalog);
        let err = builder
            .ugen("SinOsc")
            .input("frequency", Signal::Vector(Vec::new()))
            .add()
            .unwrap_err();
        assert!(matches!(err, BuildError::EmptyInput { .. }));
    }
}
