//! The operator dispatch layer.
//!
//! Each supported operation is described by a static descriptor carrying
//! the value transform, the closed-form partial derivatives, and the unit
//! rule. The uncertain-value core and `Quantity` both consult these
//! tables, so adding an operation means adding a descriptor; the
//! propagation algorithm itself never changes.

/// How an operation combines the operand units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitRule {
    /// Units must be compatible; the result takes the left operand's unit
    /// (the right value is converted first).
    Same,
    /// Result unit is the product of the operand units.
    Multiply,
    /// Result unit is the quotient of the operand units.
    Divide,
    /// Both operands must be dimensionless; so is the result.
    Dimensionless,
}

/// How a unary operation transforms its operand unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryUnitRule {
    /// Result keeps the operand unit (negate, absolute value).
    Same,
    /// Operand must be dimensionless (transcendental functions).
    Dimensionless,
    /// Result unit is the operand unit to the power one half.
    Sqrt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Atan2,
    Hypot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Neg,
    Abs,
    Sin,
    Cos,
    Tan,
    ArcSin,
    ArcCos,
    ArcTan,
    Sinh,
    Cosh,
    Tanh,
    ArcSinh,
    ArcCosh,
    ArcTanh,
    Exp,
    Ln,
    Log2,
    Log10,
    Sqrt,
}

/// Descriptor of a binary operation: value transform, partial derivatives
/// with respect to (left, right), and the unit rule.
pub struct BinaryDescriptor {
    pub symbol: &'static str,
    pub value: fn(f64, f64) -> f64,
    pub partials: fn(f64, f64) -> (f64, f64),
    pub unit: UnitRule,
}

/// Descriptor of a unary operation: value transform, derivative, unit rule.
pub struct UnaryDescriptor {
    pub symbol: &'static str,
    pub value: fn(f64) -> f64,
    pub derivative: fn(f64) -> f64,
    pub unit: UnaryUnitRule,
}

static ADD: BinaryDescriptor = BinaryDescriptor {
    symbol: "+",
    value: |x, y| x + y,
    partials: |_, _| (1.0, 1.0),
    unit: UnitRule::Same,
};

static SUB: BinaryDescriptor = BinaryDescriptor {
    symbol: "-",
    value: |x, y| x - y,
    partials: |_, _| (1.0, -1.0),
    unit: UnitRule::Same,
};

static MUL: BinaryDescriptor = BinaryDescriptor {
    symbol: "*",
    value: |x, y| x * y,
    partials: |x, y| (y, x),
    unit: UnitRule::Multiply,
};

static DIV: BinaryDescriptor = BinaryDescriptor {
    symbol: "/",
    // No guard on y == 0: non-finite results propagate as floats.
    value: |x, y| x / y,
    partials: |x, y| (1.0 / y, -x / (y * y)),
    unit: UnitRule::Divide,
};

static ATAN2: BinaryDescriptor = BinaryDescriptor {
    symbol: "atan2",
    value: f64::atan2,
    partials: |x, y| {
        let d = x * x + y * y;
        (y / d, -x / d)
    },
    unit: UnitRule::Dimensionless,
};

static HYPOT: BinaryDescriptor = BinaryDescriptor {
    symbol: "hypot",
    value: f64::hypot,
    partials: |x, y| {
        let h = x.hypot(y);
        (x / h, y / h)
    },
    unit: UnitRule::Dimensionless,
};

static NEG: UnaryDescriptor = UnaryDescriptor {
    symbol: "-",
    value: |x| -x,
    derivative: |_| -1.0,
    unit: UnaryUnitRule::Same,
};

static ABS: UnaryDescriptor = UnaryDescriptor {
    symbol: "abs",
    value: f64::abs,
    derivative: f64::signum,
    unit: UnaryUnitRule::Same,
};

static SIN: UnaryDescriptor = UnaryDescriptor {
    symbol: "sin",
    value: f64::sin,
    derivative: f64::cos,
    unit: UnaryUnitRule::Dimensionless,
};

static COS: UnaryDescriptor = UnaryDescriptor {
    symbol: "cos",
    value: f64::cos,
    derivative: |x| -x.sin(),
    unit: UnaryUnitRule::Dimensionless,
};

static TAN: UnaryDescriptor = UnaryDescriptor {
    symbol: "tan",
    value: f64::tan,
    derivative: |x| {
        let c = x.cos();
        1.0 / (c * c)
    },
    unit: UnaryUnitRule::Dimensionless,
};

static ARCSIN: UnaryDescriptor = UnaryDescriptor {
    symbol: "asin",
    value: f64::asin,
    derivative: |x| 1.0 / (1.0 - x * x).sqrt(),
    unit: UnaryUnitRule::Dimensionless,
};

static ARCCOS: UnaryDescriptor = UnaryDescriptor {
    symbol: "acos",
    value: f64::acos,
    derivative: |x| -1.0 / (1.0 - x * x).sqrt(),
    unit: UnaryUnitRule::Dimensionless,
};

static ARCTAN: UnaryDescriptor = UnaryDescriptor {
    symbol: "atan",
    value: f64::atan,
    derivative: |x| 1.0 / (1.0 + x * x),
    unit: UnaryUnitRule::Dimensionless,
};

static SINH: UnaryDescriptor = UnaryDescriptor {
    symbol: "sinh",
    value: f64::sinh,
    derivative: f64::cosh,
    unit: UnaryUnitRule::Dimensionless,
};

static COSH: UnaryDescriptor = UnaryDescriptor {
    symbol: "cosh",
    value: f64::cosh,
    derivative: f64::sinh,
    unit: UnaryUnitRule::Dimensionless,
};

static TANH: UnaryDescriptor = UnaryDescriptor {
    symbol: "tanh",
    value: f64::tanh,
    derivative: |x| {
        let c = x.cosh();
        1.0 / (c * c)
    },
    unit: UnaryUnitRule::Dimensionless,
};

static ARCSINH: UnaryDescriptor = UnaryDescriptor {
    symbol: "asinh",
    value: f64::asinh,
    derivative: |x| 1.0 / (x * x + 1.0).sqrt(),
    unit: UnaryUnitRule::Dimensionless,
};

static ARCCOSH: UnaryDescriptor = UnaryDescriptor {
    symbol: "acosh",
    value: f64::acosh,
    derivative: |x| 1.0 / (x * x - 1.0).sqrt(),
    unit: UnaryUnitRule::Dimensionless,
};

static ARCTANH: UnaryDescriptor = UnaryDescriptor {
    symbol: "atanh",
    value: f64::atanh,
    derivative: |x| 1.0 / (1.0 - x * x),
    unit: UnaryUnitRule::Dimensionless,
};

static EXP: UnaryDescriptor = UnaryDescriptor {
    symbol: "exp",
    value: f64::exp,
    derivative: f64::exp,
    unit: UnaryUnitRule::Dimensionless,
};

static LN: UnaryDescriptor = UnaryDescriptor {
    symbol: "ln",
    value: f64::ln,
    derivative: |x| 1.0 / x,
    unit: UnaryUnitRule::Dimensionless,
};

static LOG2: UnaryDescriptor = UnaryDescriptor {
    symbol: "log2",
    value: f64::log2,
    derivative: |x| 1.0 / (x * std::f64::consts::LN_2),
    unit: UnaryUnitRule::Dimensionless,
};

static LOG10: UnaryDescriptor = UnaryDescriptor {
    symbol: "log10",
    value: f64::log10,
    derivative: |x| 1.0 / (x * std::f64::consts::LN_10),
    unit: UnaryUnitRule::Dimensionless,
};

static SQRT: UnaryDescriptor = UnaryDescriptor {
    symbol: "sqrt",
    value: f64::sqrt,
    derivative: |x| 0.5 / x.sqrt(),
    unit: UnaryUnitRule::Sqrt,
};

impl BinaryOp {
    pub fn descriptor(&self) -> &'static BinaryDescriptor {
        match self {
            BinaryOp::Add => &ADD,
            BinaryOp::Sub => &SUB,
            BinaryOp::Mul => &MUL,
            BinaryOp::Div => &DIV,
            BinaryOp::Atan2 => &ATAN2,
            BinaryOp::Hypot => &HYPOT,
        }
    }
}

impl UnaryOp {
    pub fn descriptor(&self) -> &'static UnaryDescriptor {
        match self {
            UnaryOp::Neg => &NEG,
            UnaryOp::Abs => &ABS,
            UnaryOp::Sin => &SIN,
            UnaryOp::Cos => &COS,
            UnaryOp::Tan => &TAN,
            UnaryOp::ArcSin => &ARCSIN,
            UnaryOp::ArcCos => &ARCCOS,
            UnaryOp::ArcTan => &ARCTAN,
            UnaryOp::Sinh => &SINH,
            UnaryOp::Cosh => &COSH,
            UnaryOp::Tanh => &TANH,
            UnaryOp::ArcSinh => &ARCSINH,
            UnaryOp::ArcCosh => &ARCCOSH,
            UnaryOp::ArcTanh => &ARCTANH,
            UnaryOp::Exp => &EXP,
            UnaryOp::Ln => &LN,
            UnaryOp::Log2 => &LOG2,
            UnaryOp::Log10 => &LOG10,
            UnaryOp::Sqrt => &SQRT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[rstest]
    #[case(BinaryOp::Add, 2.0, 3.0, 5.0, (1.0, 1.0))]
    #[case(BinaryOp::Sub, 2.0, 3.0, -1.0, (1.0, -1.0))]
    #[case(BinaryOp::Mul, 2.0, 3.0, 6.0, (3.0, 2.0))]
    #[case(BinaryOp::Div, 6.0, 3.0, 2.0, (1.0 / 3.0, -2.0 / 3.0))]
    fn binary_values_and_partials(
        #[case] op: BinaryOp,
        #[case] x: f64,
        #[case] y: f64,
        #[case] value: f64,
        #[case] partials: (f64, f64),
    ) {
        let desc = op.descriptor();
        assert_relative_eq!((desc.value)(x, y), value);
        let (dx, dy) = (desc.partials)(x, y);
        assert_relative_eq!(dx, partials.0);
        assert_relative_eq!(dy, partials.1);
    }

    #[test]
    fn division_by_zero_yields_non_finite() {
        let desc = BinaryOp::Div.descriptor();
        assert!((desc.value)(1.0, 0.0).is_infinite());
        let (dx, _) = (desc.partials)(1.0, 0.0);
        assert!(dx.is_infinite());
    }

    #[rstest]
    #[case(UnaryOp::Sin)]
    #[case(UnaryOp::Cos)]
    #[case(UnaryOp::Tan)]
    #[case(UnaryOp::Exp)]
    #[case(UnaryOp::Ln)]
    #[case(UnaryOp::Sqrt)]
    #[case(UnaryOp::Tanh)]
    fn unary_derivative_matches_finite_difference(#[case] op: UnaryOp) {
        let desc = op.descriptor();
        let x = 0.7;
        let h = 1e-6;
        let numeric = ((desc.value)(x + h) - (desc.value)(x - h)) / (2.0 * h);
        assert_relative_eq!((desc.derivative)(x), numeric, max_relative = 1e-5);
    }

    #[rstest]
    // acosh is only defined past one.
    #[case(UnaryOp::ArcSinh, 0.7)]
    #[case(UnaryOp::ArcCosh, 1.5)]
    #[case(UnaryOp::ArcTanh, 0.7)]
    fn inverse_hyperbolic_derivatives_match_finite_difference(
        #[case] op: UnaryOp,
        #[case] x: f64,
    ) {
        let desc = op.descriptor();
        let h = 1e-6;
        let numeric = ((desc.value)(x + h) - (desc.value)(x - h)) / (2.0 * h);
        assert_relative_eq!((desc.derivative)(x), numeric, max_relative = 1e-5);
    }

    #[test]
    fn unit_rules_are_declared() {
        assert_eq!(BinaryOp::Add.descriptor().unit, UnitRule::Same);
        assert_eq!(BinaryOp::Mul.descriptor().unit, UnitRule::Multiply);
        assert_eq!(UnaryOp::Sqrt.descriptor().unit, UnaryUnitRule::Sqrt);
        assert_eq!(UnaryOp::Exp.descriptor().unit, UnaryUnitRule::Dimensionless);
    }
}
