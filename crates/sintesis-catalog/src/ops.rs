//! Operator selector tables for the engine's operator UGens.
//!
//! The engine implements all signal arithmetic with two UGens, `UnaryOpUGen`
//! and `BinaryOpUGen`, and selects the actual operation through the node's
//! special index. The selector values here are the engine's own table
//! positions and must never be renumbered.

/// Unary operator selectors for `UnaryOpUGen`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    /// Negation.
    Neg,
    /// Absolute value.
    Abs,
    /// Round up to the next integer.
    Ceil,
    /// Round down to the previous integer.
    Floor,
    /// Fractional part.
    Frac,
    /// Sign (-1, 0, or 1).
    Sign,
    /// Square.
    Squared,
    /// Cube.
    Cubed,
    /// Square root.
    Sqrt,
    /// Natural exponential.
    Exp,
    /// Reciprocal.
    Recip,
    /// MIDI note number to cycles per second.
    MidiCps,
    /// Cycles per second to MIDI note number.
    CpsMidi,
    /// Decibels to linear amplitude.
    DbAmp,
    /// Linear amplitude to decibels.
    AmpDb,
    /// Natural logarithm.
    Log,
    /// Base-2 logarithm.
    Log2,
    /// Base-10 logarithm.
    Log10,
    /// Sine.
    Sin,
    /// Cosine.
    Cos,
    /// Tangent.
    Tan,
    /// Hyperbolic tangent.
    Tanh,
}

impl UnaryOp {
    /// The engine's selector value, encoded as the node's special index.
    pub fn selector(self) -> i16 {
        match self {
            UnaryOp::Neg => 0,
            UnaryOp::Abs => 5,
            UnaryOp::Ceil => 8,
            UnaryOp::Floor => 9,
            UnaryOp::Frac => 10,
            UnaryOp::Sign => 11,
            UnaryOp::Squared => 12,
            UnaryOp::Cubed => 13,
            UnaryOp::Sqrt => 14,
            UnaryOp::Exp => 15,
            UnaryOp::Recip => 16,
            UnaryOp::MidiCps => 17,
            UnaryOp::CpsMidi => 18,
            UnaryOp::DbAmp => 21,
            UnaryOp::AmpDb => 22,
            UnaryOp::Log => 25,
            UnaryOp::Log2 => 26,
            UnaryOp::Log10 => 27,
            UnaryOp::Sin => 28,
            UnaryOp::Cos => 29,
            UnaryOp::Tan => 30,
            UnaryOp::Tanh => 36,
        }
    }

    /// Short lowercase name, matching the engine's operator vocabulary.
    pub fn name(self) -> &'static str {
        match self {
            UnaryOp::Neg => "neg",
            UnaryOp::Abs => "abs",
            UnaryOp::Ceil => "ceil",
            UnaryOp::Floor => "floor",
            UnaryOp::Frac => "frac",
            UnaryOp::Sign => "sign",
            UnaryOp::Squared => "squared",
            UnaryOp::Cubed => "cubed",
            UnaryOp::Sqrt => "sqrt",
            UnaryOp::Exp => "exp",
            UnaryOp::Recip => "recip",
            UnaryOp::MidiCps => "midicps",
            UnaryOp::CpsMidi => "cpsmidi",
            UnaryOp::DbAmp => "dbamp",
            UnaryOp::AmpDb => "ampdb",
            UnaryOp::Log => "log",
            UnaryOp::Log2 => "log2",
            UnaryOp::Log10 => "log10",
            UnaryOp::Sin => "sin",
            UnaryOp::Cos => "cos",
            UnaryOp::Tan => "tan",
            UnaryOp::Tanh => "tanh",
        }
    }
}

/// Binary operator selectors for `BinaryOpUGen`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    /// Addition.
    Add,
    /// Subtraction.
    Sub,
    /// Multiplication.
    Mul,
    /// Integer division.
    IntDiv,
    /// Division.
    Div,
    /// Floating-point modulo.
    Mod,
    /// Equality comparison (outputs 0 or 1).
    Eq,
    /// Inequality comparison.
    Ne,
    /// Less-than comparison.
    Lt,
    /// Greater-than comparison.
    Gt,
    /// Less-or-equal comparison.
    Le,
    /// Greater-or-equal comparison.
    Ge,
    /// Minimum of two signals.
    Min,
    /// Maximum of two signals.
    Max,
    /// Round to a multiple of the right operand.
    Round,
    /// Arc tangent of left/right.
    Atan2,
    /// Euclidean distance from origin.
    Hypot,
    /// Left raised to the power of right.
    Pow,
    /// Absolute difference.
    AbsDif,
}

impl BinaryOp {
    /// The engine's selector value, encoded as the node's special index.
    pub fn selector(self) -> i16 {
        match self {
            BinaryOp::Add => 0,
            BinaryOp::Sub => 1,
            BinaryOp::Mul => 2,
            BinaryOp::IntDiv => 3,
            BinaryOp::Div => 4,
            BinaryOp::Mod => 5,
            BinaryOp::Eq => 6,
            BinaryOp::Ne => 7,
            BinaryOp::Lt => 8,
            BinaryOp::Gt => 9,
            BinaryOp::Le => 10,
            BinaryOp::Ge => 11,
            BinaryOp::Min => 12,
            BinaryOp::Max => 13,
            BinaryOp::Round => 19,
            BinaryOp::Atan2 => 22,
            BinaryOp::Hypot => 23,
            BinaryOp::Pow => 25,
            BinaryOp::AbsDif => 38,
        }
    }

    /// Short lowercase name, matching the engine's operator vocabulary.
    pub fn name(self) -> &'static str {
        match self {
            BinaryOp::Add => "add",
            BinaryOp::Sub => "sub",
            BinaryOp::Mul => "mul",
            BinaryOp::IntDiv => "idiv",
            BinaryOp::Div => "div",
            BinaryOp::Mod => "mod",
            BinaryOp::Eq => "eq",
            BinaryOp::Ne => "ne",
            BinaryOp::Lt => "lt",
            BinaryOp::Gt => "gt",
            BinaryOp::Le => "le",
            BinaryOp::Ge => "ge",
            BinaryOp::Min => "min",
            BinaryOp::Max => "max",
            BinaryOp::Round => "round",
            BinaryOp::Atan2 => "atan2",
            BinaryOp::Hypot => "hypot",
            BinaryOp::Pow => "pow",
            BinaryOp::AbsDif => "absdif",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arithmetic_selectors_match_engine_table() {
        assert_eq!(BinaryOp::Add.selector(), 0);
        assert_eq!(BinaryOp::Sub.selector(), 1);
        assert_eq!(BinaryOp::Mul.selector(), 2);
        assert_eq!(BinaryOp::Div.selector(), 4);
        assert_eq!(BinaryOp::Pow.selector(), 25);
    }

    #[test]
    fn unary_selectors_match_engine_table() {
        assert_eq!(UnaryOp::Neg.selector(), 0);
        assert_eq!(UnaryOp::Abs.selector(), 5);
        assert_eq!(UnaryOp::MidiCps.selector(), 17);
        assert_eq!(UnaryOp::Tanh.selector(), 36);
    }

    #[test]
    fn selectors_are_unique() {
        let binary = [
            BinaryOp::Add,
            BinaryOp::Sub,
            BinaryOp::Mul,
            BinaryOp::IntDiv,
            BinaryOp::Div,
            BinaryOp::Mod,
            BinaryOp::Eq,
            BinaryOp::Ne,
            BinaryOp::Lt,
            BinaryOp::Gt,
            BinaryOp::Le,
            BinaryOp::Ge,
            BinaryOp::Min,
            BinaryOp::Max,
            BinaryOp::Round,
            BinaryOp::Atan2,
            BinaryOp::Hypot,
            BinaryOp::Pow,
            BinaryOp::AbsDif,
        ];
        let mut selectors: Vec<i16> = binary.iter().map(|op| op.selector()).collect();
        selectors.sort_unstable();
        selectors.dedup();
        assert_eq!(selectors.len(), binary.len());
    }

    #[test]
    fn operator_names() {
        assert_eq!(BinaryOp::Mul.name(), "mul");
        assert_eq!(UnaryOp::MidiCps.name(), "midicps");
    }
}
