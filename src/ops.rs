//! Opcode vocabulary of the lanewise algebra.
//!
//! These enums name every operation that is offered to the acceleration
//! backend together with its portable fallback closure. The closure is the
//! semantic ground truth; the opcode exists so a hardware backend can
//! pattern-match the request without inspecting the closure.

/// Single-operand lanewise operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Unary {
    /// Two's-complement negation for integers, sign flip for floats.
    Neg,
    /// Absolute value; identity for unsigned types.
    Abs,
    /// Bitwise complement. Integral element types only.
    Not,
    /// Square root. Floating element types only.
    Sqrt,
}

/// Two-operand lanewise operators. The shift opcodes take a scalar shift
/// amount rather than a full vector second operand; they are dispatched
/// through [`crate::Vector::lanewise_shift`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Binary {
    Add,
    Sub,
    Mul,
    Min,
    Max,
    /// Bitwise and. Integral only.
    And,
    /// Bitwise or. Integral only.
    Or,
    /// Bitwise xor. Integral only.
    Xor,
    /// Shift left; amount taken modulo the element bit width.
    Shl,
    /// Arithmetic (sign-propagating) shift right.
    AShr,
    /// Logical (zero-filling) shift right.
    LShr,
}

/// Three-operand lanewise operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ternary {
    /// Fused `self * v1 + v2`. Floating element types only.
    MulAdd,
    /// `(self & !v2) | (v1 & v2)`. Integral element types only.
    BitwiseBlend,
}

/// Lanewise comparisons producing a mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparison {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

/// Single-operand lanewise predicates producing a mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Test {
    IsNegative,
    IsZero,
    /// Floating element types only.
    IsFinite,
    /// Floating element types only.
    IsNan,
}

/// Associative operators for cross-lane reductions. The fold order is
/// unspecified but must be deterministic for a fixed backend; the portable
/// backend folds lanes strictly in index order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Associative {
    Add,
    Mul,
    Min,
    Max,
    And,
    Or,
    Xor,
}

impl Unary {
    pub fn name(self) -> &'static str {
        match self {
            Unary::Neg => "neg",
            Unary::Abs => "abs",
            Unary::Not => "not",
            Unary::Sqrt => "sqrt",
        }
    }
}

impl Binary {
    pub fn name(self) -> &'static str {
        match self {
            Binary::Add => "add",
            Binary::Sub => "sub",
            Binary::Mul => "mul",
            Binary::Min => "min",
            Binary::Max => "max",
            Binary::And => "and",
            Binary::Or => "or",
            Binary::Xor => "xor",
            Binary::Shl => "shl",
            Binary::AShr => "ashr",
            Binary::LShr => "lshr",
        }
    }

    /// Whether the opcode takes a scalar shift amount instead of a vector.
    pub fn is_shift(self) -> bool {
        matches!(self, Binary::Shl | Binary::AShr | Binary::LShr)
    }
}

impl Ternary {
    pub fn name(self) -> &'static str {
        match self {
            Ternary::MulAdd => "mul_add",
            Ternary::BitwiseBlend => "bitwise_blend",
        }
    }
}

impl Test {
    pub fn name(self) -> &'static str {
        match self {
            Test::IsNegative => "is_negative",
            Test::IsZero => "is_zero",
            Test::IsFinite => "is_finite",
            Test::IsNan => "is_nan",
        }
    }
}

impl Associative {
    pub fn name(self) -> &'static str {
        match self {
            Associative::Add => "reduce_add",
            Associative::Mul => "reduce_mul",
            Associative::Min => "reduce_min",
            Associative::Max => "reduce_max",
            Associative::And => "reduce_and",
            Associative::Or => "reduce_or",
            Associative::Xor => "reduce_xor",
        }
    }

    /// The two-operand opcode that combines the accumulator with a lane.
    pub fn binary(self) -> Binary {
        match self {
            Associative::Add => Binary::Add,
            Associative::Mul => Binary::Mul,
            Associative::Min => Binary::Min,
            Associative::Max => Binary::Max,
            Associative::And => Binary::And,
            Associative::Or => Binary::Or,
            Associative::Xor => Binary::Xor,
        }
    }
}
