use smol_str::SmolStr;
use std::{
    fmt::{self, Display, Formatter},
    ops::{Add, Div, Mul, Neg, Sub},
};

/// An expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Parameter(Parameter),
    Constant(f64),
    /// An expression involving two operands.
    Binary {
        left: Box<Expression>,
        right: Box<Expression>,
        op: BinaryOperation,
    },
    /// Negate the expression.
    Negate(Box<Expression>),
    /// Invoke a builtin function.
    FunctionCall {
        function: Builtin,
        argument: Box<Expression>,
    },
}

impl Expression {
    /// Iterate over all [`Parameter`]s mentioned in this [`Expression`].
    pub fn params(&self) -> impl Iterator<Item = &Parameter> + '_ {
        let mut params = Vec::new();
        self.collect_params(&mut params);
        params.into_iter()
    }

    fn collect_params<'a>(&'a self, params: &mut Vec<&'a Parameter>) {
        match self {
            Expression::Parameter(p) => params.push(p),
            Expression::Constant(_) => {},
            Expression::Binary { left, right, .. } => {
                left.collect_params(params);
                right.collect_params(params);
            },
            Expression::Negate(inner) => inner.collect_params(params),
            Expression::FunctionCall { argument, .. } => {
                argument.collect_params(params)
            },
        }
    }

    /// Does this [`Expression`] mention a particular [`Parameter`]?
    pub fn depends_on(&self, param: &Parameter) -> bool {
        self.params().any(|p| p == param)
    }

    pub fn is_constant(&self) -> bool {
        matches!(self, Expression::Constant(_))
    }

    /// Raise this [`Expression`] to some power.
    pub fn pow(self, exponent: Expression) -> Expression {
        Expression::Binary {
            left: Box::new(self),
            right: Box::new(exponent),
            op: BinaryOperation::Power,
        }
    }

    /// Wrap this [`Expression`] in a call to a [`Builtin`].
    pub fn call(function: Builtin, argument: Expression) -> Expression {
        Expression::FunctionCall {
            function,
            argument: Box::new(argument),
        }
    }

    fn precedence(&self) -> u8 {
        match self {
            Expression::Parameter(_)
            | Expression::FunctionCall { .. } => 4,
            Expression::Constant(value) if *value < 0.0 => 2,
            Expression::Constant(_) => 4,
            Expression::Binary { op, .. } => op.precedence(),
            Expression::Negate(_) => 2,
        }
    }
}

/// A named unknown (or a named constant which hasn't been substituted yet).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Parameter(SmolStr);

impl Parameter {
    pub fn named<S: AsRef<str>>(name: S) -> Self {
        Parameter(SmolStr::new(name))
    }

    pub fn name(&self) -> &str { &self.0 }
}

impl Display for Parameter {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An operation that can be applied to two arguments.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum BinaryOperation {
    Plus,
    Minus,
    Times,
    Divide,
    Power,
}

impl BinaryOperation {
    fn precedence(self) -> u8 {
        match self {
            BinaryOperation::Plus | BinaryOperation::Minus => 1,
            BinaryOperation::Times | BinaryOperation::Divide => 2,
            BinaryOperation::Power => 3,
        }
    }

    pub fn apply(self, left: f64, right: f64) -> f64 {
        match self {
            BinaryOperation::Plus => left + right,
            BinaryOperation::Minus => left - right,
            BinaryOperation::Times => left * right,
            BinaryOperation::Divide => left / right,
            BinaryOperation::Power => left.powf(right),
        }
    }
}

/// Various builtin functions.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Builtin {
    Sine,
    Cosine,
    Tangent,
    /// The natural logarithm, spelled either `log` or `ln`.
    Log,
    Exp,
    Sqrt,
    Abs,
    Floor,
    Ceil,
    Factorial,
}

impl Builtin {
    pub fn from_name(name: &str) -> Option<Builtin> {
        match name {
            "sin" => Some(Builtin::Sine),
            "cos" => Some(Builtin::Cosine),
            "tan" => Some(Builtin::Tangent),
            "log" | "ln" => Some(Builtin::Log),
            "exp" => Some(Builtin::Exp),
            "sqrt" => Some(Builtin::Sqrt),
            "abs" => Some(Builtin::Abs),
            "floor" => Some(Builtin::Floor),
            "ceil" => Some(Builtin::Ceil),
            "factorial" => Some(Builtin::Factorial),
            _ => None,
        }
    }

    /// Evaluate the function, yielding `NaN` for anything outside its domain.
    pub fn apply(self, argument: f64) -> f64 {
        match self {
            Builtin::Sine => argument.sin(),
            Builtin::Cosine => argument.cos(),
            Builtin::Tangent => argument.tan(),
            Builtin::Log if argument <= 0.0 => f64::NAN,
            Builtin::Log => argument.ln(),
            Builtin::Exp => argument.exp(),
            Builtin::Sqrt => argument.sqrt(),
            Builtin::Abs => argument.abs(),
            Builtin::Floor => argument.floor(),
            Builtin::Ceil => argument.ceil(),
            Builtin::Factorial => factorial(argument),
        }
    }
}

/// `n!` for non-negative integers. Anything else is outside the domain.
fn factorial(n: f64) -> f64 {
    if !n.is_finite() || n < 0.0 || n.fract() != 0.0 {
        return f64::NAN;
    }

    // 171! overflows an f64 anyway
    let n = n.min(171.0) as u32;
    (2..=n).fold(1.0, |acc, k| acc * f64::from(k))
}

impl Display for Builtin {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Builtin::Sine => write!(f, "sin"),
            Builtin::Cosine => write!(f, "cos"),
            Builtin::Tangent => write!(f, "tan"),
            Builtin::Log => write!(f, "log"),
            Builtin::Exp => write!(f, "exp"),
            Builtin::Sqrt => write!(f, "sqrt"),
            Builtin::Abs => write!(f, "abs"),
            Builtin::Floor => write!(f, "floor"),
            Builtin::Ceil => write!(f, "ceil"),
            Builtin::Factorial => write!(f, "factorial"),
        }
    }
}

// define some operator overloads to make constructing an expression easier.

impl Add for Expression {
    type Output = Expression;

    fn add(self, rhs: Expression) -> Expression {
        Expression::Binary {
            left: Box::new(self),
            right: Box::new(rhs),
            op: BinaryOperation::Plus,
        }
    }
}

impl Sub for Expression {
    type Output = Expression;

    fn sub(self, rhs: Expression) -> Expression {
        Expression::Binary {
            left: Box::new(self),
            right: Box::new(rhs),
            op: BinaryOperation::Minus,
        }
    }
}

impl Mul for Expression {
    type Output = Expression;

    fn mul(self, rhs: Expression) -> Expression {
        Expression::Binary {
            left: Box::new(self),
            right: Box::new(rhs),
            op: BinaryOperation::Times,
        }
    }
}

impl Div for Expression {
    type Output = Expression;

    fn div(self, rhs: Expression) -> Expression {
        Expression::Binary {
            left: Box::new(self),
            right: Box::new(rhs),
            op: BinaryOperation::Divide,
        }
    }
}

impl Neg for Expression {
    type Output = Expression;

    fn neg(self) -> Self::Output { Expression::Negate(Box::new(self)) }
}

impl Display for Expression {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Parameter(p) => write!(f, "{}", p),
            Expression::Constant(value) => write!(f, "{}", value),
            Expression::Binary { left, right, op } => {
                let precedence = op.precedence();

                // powers are right-associative, everything else is
                // left-associative
                let (left_min, right_min) = match op {
                    BinaryOperation::Power => (precedence + 1, precedence),
                    _ => (precedence, precedence + 1),
                };

                write_operand(left, left_min, f)?;

                let op = match op {
                    BinaryOperation::Plus => " + ",
                    BinaryOperation::Minus => " - ",
                    BinaryOperation::Times => "*",
                    BinaryOperation::Divide => "/",
                    BinaryOperation::Power => "^",
                };
                write!(f, "{}", op)?;

                write_operand(right, right_min, f)
            },
            Expression::Negate(inner) => {
                write!(f, "-")?;
                write_operand(inner, 3, f)
            },
            Expression::FunctionCall { function, argument } => {
                write!(f, "{}({})", function, argument)
            },
        }
    }
}

fn write_operand(
    expr: &Expression,
    min_precedence: u8,
    f: &mut Formatter<'_>,
) -> fmt::Result {
    if expr.precedence() < min_precedence {
        write!(f, "({})", expr)
    } else {
        write!(f, "{}", expr)
    }
}
