use crate::{
    algebra::{ops, Expression, ParseError},
    function::Function,
    Parameter,
};
use smol_str::SmolStr;
use std::{
    f64::consts::{E, PI},
    fmt::{self, Display, Formatter},
    str::FromStr,
};

/// The only unknown an [`Equation`] may contain.
pub const UNKNOWN: &str = "x";

/// Compile some text into an [`Equation`].
///
/// A single `=` is allowed, in which case `left = right` is rewritten as
/// `(left) - (right)` so the root of the [`Equation`] is where both sides
/// agree.
pub fn compile(text: &str) -> Result<Equation, CompileError> { text.parse() }

/// A compiled version of `f(x) = 0`.
///
/// The named constants `pi` and `e` have already been substituted in, leaving
/// `x` as the only [`Parameter`].
#[derive(Debug, Clone, PartialEq)]
pub struct Equation {
    text: String,
    body: Expression,
}

impl Equation {
    /// The text this [`Equation`] was compiled from.
    pub fn text(&self) -> &str { &self.text }

    /// The expression which should equal zero.
    pub fn body(&self) -> &Expression { &self.body }

    /// Calculate `f(x)`.
    ///
    /// This never fails. Inputs outside the equation's domain (e.g. the
    /// `sqrt()` of a negative number) give you `NaN`.
    pub fn evaluate(&self, x: f64) -> f64 {
        // compile() guarantees "x" is the only parameter left
        ops::evaluate(&self.body, |_| Some(x)).unwrap_or(f64::NAN)
    }

    /// Differentiate the [`Equation`] with respect to `x`.
    ///
    /// Constant sub-expressions are folded first, so only `factorial()` of
    /// something involving `x` lacks a symbolic rule. Those fall back to a
    /// central difference, and the returned [`Derivative`] says which one
    /// you got.
    pub fn derivative(&self) -> Derivative {
        let x = Parameter::named(UNKNOWN);
        let body = ops::fold_constants(&self.body);

        match ops::partial_derivative(&body, &x) {
            Ok(derivative) => {
                Derivative::Symbolic(ops::fold_constants(&derivative))
            },
            Err(e) => {
                log::warn!(
                    "Falling back to a numeric derivative for \"{}\": {}",
                    self.text,
                    e
                );
                Derivative::Numeric(self.body.clone())
            },
        }
    }

    /// Evaluate the [`Equation`] at `count` evenly spaced points across
    /// `[min, max]`, keeping any `NaN`s so gaps in the domain can be drawn.
    pub fn sample(&self, min: f64, max: f64, count: usize) -> Vec<(f64, f64)> {
        match count {
            0 => Vec::new(),
            1 => vec![(min, self.evaluate(min))],
            _ => {
                let step = (max - min) / (count - 1) as f64;

                (0..count)
                    .map(|i| {
                        let x = if i + 1 == count {
                            max
                        } else {
                            min + step * i as f64
                        };
                        (x, self.evaluate(x))
                    })
                    .collect()
            },
        }
    }
}

impl Function for Equation {
    fn evaluate(&self, x: f64) -> f64 { Equation::evaluate(self, x) }
}

impl Display for Equation {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

impl FromStr for Equation {
    type Err = CompileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(CompileError::Empty);
        }

        let body = match s.split_once('=') {
            None => s.parse()?,
            Some((left, right)) if !right.contains('=') => {
                let left: Expression = left.parse()?;
                let right: Expression = right.parse()?;
                left - right
            },
            Some(_) => {
                let count = s.matches('=').count();
                return Err(CompileError::MultipleEqualitySigns { count });
            },
        };

        Ok(Equation {
            text: s.trim().to_string(),
            body: resolve_constants(body)?,
        })
    }
}

/// Swap the named constants for their values and make sure nothing but the
/// unknown is left over.
fn resolve_constants(body: Expression) -> Result<Expression, CompileError> {
    let constants = [("pi", PI), ("e", E)];

    let body = constants.iter().fold(body, |body, (name, value)| {
        ops::substitute(
            &body,
            &Parameter::named(name),
            &Expression::Constant(*value),
        )
    });

    let unknown: Option<SmolStr> = body
        .params()
        .find(|p| p.name() != UNKNOWN)
        .map(|p| p.name().into());

    match unknown {
        Some(name) => Err(CompileError::UnknownVariable { name }),
        None => Ok(body),
    }
}

/// The derivative of an [`Equation`].
#[derive(Debug, Clone, PartialEq)]
pub enum Derivative {
    /// An exact derivative, found by differentiating the expression tree.
    Symbolic(Expression),
    /// A central-difference approximation of the original expression's
    /// slope, used when it contains something we can't differentiate.
    Numeric(Expression),
}

impl Derivative {
    pub fn is_symbolic(&self) -> bool {
        matches!(self, Derivative::Symbolic(_))
    }

    /// Calculate `f'(x)`.
    pub fn evaluate(&self, x: f64) -> f64 {
        match self {
            Derivative::Symbolic(derivative) => {
                ops::evaluate(derivative, |_| Some(x)).unwrap_or(f64::NAN)
            },
            Derivative::Numeric(body) => central_difference(body, x),
        }
    }
}

impl Function for Derivative {
    fn evaluate(&self, x: f64) -> f64 { Derivative::evaluate(self, x) }
}

impl Display for Derivative {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Derivative::Symbolic(derivative) => write!(f, "{}", derivative),
            Derivative::Numeric(body) => write!(f, "d/dx ({})", body),
        }
    }
}

/// `f'(x) ≈ (f(x + h) - f(x - h)) / 2h`, with the step scaled so it stays
/// representable relative to `x`.
fn central_difference(body: &Expression, x: f64) -> f64 {
    let h = f64::EPSILON.cbrt() * x.abs().max(1.0);
    let f = |x: f64| ops::evaluate(body, |_| Some(x)).unwrap_or(f64::NAN);

    (f(x + h) - f(x - h)) / (2.0 * h)
}

/// Errors that can occur while compiling an [`Equation`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CompileError {
    #[error("the equation is empty")]
    Empty,
    #[error("an equation may contain at most one \"=\", but found {count}")]
    MultipleEqualitySigns { count: usize },
    #[error("syntax error: {0}")]
    Syntax(#[from] ParseError),
    #[error(
        "unknown variable \"{name}\" (only \"x\", \"pi\" and \"e\" are allowed)"
    )]
    UnknownVariable { name: SmolStr },
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    #[test]
    fn simple_quadratic() {
        let equation = compile("x^2-4").unwrap();

        assert_abs_diff_eq!(equation.evaluate(2.0), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(equation.evaluate(-2.0), 0.0, epsilon = 1e-12);
        assert_eq!(equation.evaluate(0.0), -4.0);
    }

    #[test]
    fn an_equals_sign_moves_everything_to_the_left() {
        let with_equals = compile("cos(x)=x").unwrap();
        let without = compile("cos(x)-x").unwrap();

        for &x in &[-3.0, -1.0, 0.0, 0.5, 0.739, 1.0, 2.5, 10.0] {
            assert_eq!(with_equals.evaluate(x), without.evaluate(x), "x={}", x);
        }
        assert_eq!(with_equals.body().to_string(), "cos(x) - x");
    }

    #[test]
    fn the_right_hand_side_is_grouped() {
        let equation = compile("x = 1 - x").unwrap();

        // x - (1 - x), not x - 1 - x
        assert_eq!(equation.evaluate(2.0), 3.0);
    }

    #[test]
    fn named_constants() {
        let inputs = vec![
            ("pi", PI),
            ("e", E),
            ("2*pi", 2.0 * PI),
            ("e^x", E),
            ("sin(pi/2)", 1.0),
            ("log(e)", 1.0),
            ("ln(e^2)", 2.0),
        ];

        for (src, should_be) in inputs {
            let got = compile(src).unwrap().evaluate(1.0);
            assert_relative_eq!(got, should_be, max_relative = 1e-15);
        }
    }

    #[test]
    fn every_builtin_is_recognised() {
        let src = "sin(x) + cos(x) + tan(x) + log(x) + ln(x) + exp(x) \
                   + sqrt(x) + abs(x) + floor(x) + ceil(x) + factorial(x)";

        let equation = compile(src).unwrap();

        let should_be = 2_f64.sin()
            + 2_f64.cos()
            + 2_f64.tan()
            + 2.0 * 2_f64.ln()
            + 2_f64.exp()
            + 2_f64.sqrt()
            + 2.0
            + 2.0
            + 2.0
            + 2.0;
        assert_relative_eq!(
            equation.evaluate(2.0),
            should_be,
            max_relative = 1e-12
        );
    }

    #[test]
    fn out_of_domain_inputs_are_nan() {
        let equation = compile("sqrt(x) + log(x)").unwrap();

        assert!(equation.evaluate(-1.0).is_nan());
        assert!(equation.evaluate(0.0).is_nan());
        assert!(equation.evaluate(1.0).is_finite());
    }

    #[test]
    fn blank_equations_are_rejected() {
        for src in &["", "   ", "\t\n"] {
            assert_eq!(compile(src), Err(CompileError::Empty));
        }
    }

    #[test]
    fn too_many_equals_signs() {
        let got = compile("x = 1 = 2");

        assert_eq!(got, Err(CompileError::MultipleEqualitySigns { count: 2 }));
    }

    #[test]
    fn syntax_errors() {
        let inputs = vec!["x +", "x = ", "(x", "2 x", "sinh(x)", "x $ 2"];

        for src in inputs {
            let got = compile(src);
            assert!(
                matches!(got, Err(CompileError::Syntax(_))),
                "{:?} gave {:?}",
                src,
                got
            );
        }
    }

    #[test]
    fn unknown_variables() {
        let got = compile("x + y = 2");

        assert_eq!(
            got,
            Err(CompileError::UnknownVariable { name: "y".into() })
        );
    }

    #[test]
    fn keeps_the_original_text() {
        let equation = compile("  cos(x) = x ").unwrap();

        assert_eq!(equation.to_string(), "cos(x) = x");
    }

    #[test]
    fn symbolic_derivative() {
        let equation = compile("x^2 - 2").unwrap();

        let derivative = equation.derivative();

        assert!(derivative.is_symbolic());
        assert_eq!(derivative.to_string(), "2*x");
        assert_eq!(derivative.evaluate(3.0), 6.0);
    }

    #[test]
    fn derivative_of_an_equality() {
        let derivative = compile("cos(x) = x").unwrap().derivative();

        assert_relative_eq!(derivative.evaluate(0.5), -(0.5_f64.sin()) - 1.0);
    }

    #[test]
    fn constant_factorials_are_folded_before_differentiating() {
        let equation = compile("factorial(3) * x^2").unwrap();

        let derivative = equation.derivative();

        assert!(derivative.is_symbolic());
        assert_relative_eq!(derivative.evaluate(2.0), 24.0);
    }

    #[test]
    fn factorial_of_x_falls_back_to_a_numeric_derivative() {
        let equation = compile("factorial(x) - x").unwrap();

        let derivative = equation.derivative();

        assert!(!derivative.is_symbolic());
        assert_eq!(derivative.to_string(), "d/dx (factorial(x) - x)");
        // factorial is only defined on the integers, so x ± h never is
        assert!(derivative.evaluate(3.0).is_nan());
    }

    #[test]
    fn sample_over_a_range() {
        let equation = compile("sqrt(x)").unwrap();

        let got = equation.sample(-1.0, 4.0, 6);

        let xs: Vec<_> = got.iter().map(|(x, _)| *x).collect();
        assert_eq!(xs, vec![-1.0, 0.0, 1.0, 2.0, 3.0, 4.0]);
        assert!(got[0].1.is_nan());
        assert_eq!(got[5].1, 2.0);
        assert!(equation.sample(0.0, 1.0, 0).is_empty());
        assert_eq!(equation.sample(0.0, 1.0, 1), vec![(0.0, 0.0)]);
    }
}
