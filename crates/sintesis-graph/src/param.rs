//! Parameter declarations.
//!
//! Parameters are the externally settable knobs of a compiled synthdef. They
//! are declared on a builder context and materialized at compile time as
//! control-family nodes heading the node order, grouped by rate category.

use sintesis_catalog::Rate;

/// Rate category of a declared parameter.
///
/// The materialization order of the groups is the engine's convention:
/// scalar, then trigger, then audio, then plain control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterRate {
    /// Read once at synth creation.
    Scalar,
    /// Control-rate, resets to zero after one control period.
    Trigger,
    /// Ordinary control-rate knob. The only category that may lag.
    Control,
    /// Audio-rate control, mappable to an audio bus.
    Audio,
}

impl ParameterRate {
    /// Materialization order of the rate-category groups.
    pub(crate) const GROUP_ORDER: [ParameterRate; 4] = [
        ParameterRate::Scalar,
        ParameterRate::Trigger,
        ParameterRate::Audio,
        ParameterRate::Control,
    ];

    /// Calculation rate of the signals this category produces.
    pub fn signal_rate(self) -> Rate {
        match self {
            ParameterRate::Scalar => Rate::Scalar,
            ParameterRate::Trigger | ParameterRate::Control => Rate::Control,
            ParameterRate::Audio => Rate::Audio,
        }
    }

    /// Engine name of the control UGen that carries this category.
    ///
    /// A lagging control group uses the lagged variant instead; see the
    /// compile step.
    pub(crate) fn control_ugen(self) -> &'static str {
        match self {
            ParameterRate::Scalar | ParameterRate::Control => "Control",
            ParameterRate::Trigger => "TrigControl",
            ParameterRate::Audio => "AudioControl",
        }
    }
}

/// A named parameter declaration.
///
/// ```rust
/// use sintesis_graph::{Parameter, ParameterRate};
///
/// let freq = Parameter::new("frequency", 440.0).lag(0.1);
/// let gate = Parameter::new("gate", 1.0).rate(ParameterRate::Trigger);
/// let amps = Parameter::multi("amplitudes", vec![0.1, 0.2]);
/// assert_eq!(amps.values().len(), 2);
/// # let _ = (freq, gate);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    name: String,
    values: Vec<f32>,
    rate: ParameterRate,
    lag: f32,
}

impl Parameter {
    /// A single-valued control-rate parameter with no lag.
    pub fn new(name: impl Into<String>, value: f32) -> Self {
        Self {
            name: name.into(),
            values: vec![value],
            rate: ParameterRate::Control,
            lag: 0.0,
        }
    }

    /// A multi-valued parameter occupying consecutive value slots; its proxy
    /// is a channel vector.
    pub fn multi(name: impl Into<String>, values: impl Into<Vec<f32>>) -> Self {
        Self {
            name: name.into(),
            values: values.into(),
            rate: ParameterRate::Control,
            lag: 0.0,
        }
    }

    /// Sets the rate category.
    pub fn rate(mut self, rate: ParameterRate) -> Self {
        self.rate = rate;
        self
    }

    /// Sets the lag time in seconds. Only control-rate parameters may lag.
    pub fn lag(mut self, lag: f32) -> Self {
        self.lag = lag;
        self
    }

    /// The parameter's name, unique within one graph.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Default values, one per channel.
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Rate category.
    pub fn rate_category(&self) -> ParameterRate {
        self.rate
    }

    /// Lag time in seconds; zero means no lag.
    pub fn lag_time(&self) -> f32 {
        self.lag
    }
}
