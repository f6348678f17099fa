//! [`Expression`] operations.

use crate::algebra::{BinaryOperation, Builtin, Expression, Parameter};
use euclid::approxeq::ApproxEq;
use smol_str::SmolStr;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvaluationError {
    #[error("no value was provided for \"{name}\"")]
    UnknownParameter { name: SmolStr },
    #[error("unable to differentiate {function}() symbolically")]
    UnableToDifferentiate { function: Builtin },
}

/// Evaluate an [`Expression`], using `lookup_parameter_value` to find the value
/// of each [`Parameter`].
///
/// Evaluation itself never fails for numeric reasons. Anything outside a
/// function's domain comes back as `NaN`.
pub fn evaluate<F>(
    expr: &Expression,
    lookup_parameter_value: F,
) -> Result<f64, EvaluationError>
where
    F: Fn(&Parameter) -> Option<f64>,
{
    evaluate_with(expr, &lookup_parameter_value)
}

fn evaluate_with<F>(
    expr: &Expression,
    lookup_parameter_value: &F,
) -> Result<f64, EvaluationError>
where
    F: Fn(&Parameter) -> Option<f64>,
{
    match expr {
        Expression::Parameter(p) => lookup_parameter_value(p).ok_or_else(|| {
            EvaluationError::UnknownParameter {
                name: p.name().into(),
            }
        }),
        Expression::Constant(value) => Ok(*value),
        Expression::Binary { left, right, op } => {
            let left = evaluate_with(left, lookup_parameter_value)?;
            let right = evaluate_with(right, lookup_parameter_value)?;
            Ok(op.apply(left, right))
        },
        Expression::Negate(inner) => {
            evaluate_with(inner, lookup_parameter_value).map(|value| -value)
        },
        Expression::FunctionCall { function, argument } => {
            evaluate_with(argument, lookup_parameter_value)
                .map(|value| function.apply(value))
        },
    }
}

/// Get `f'(g)` for some [`Builtin`], `f`, applied to an `argument`, `g`.
pub fn differentiate_function(
    function: Builtin,
    argument: &Expression,
) -> Result<Expression, EvaluationError> {
    let g = || argument.clone();

    let derivative = match function {
        Builtin::Sine => Expression::call(Builtin::Cosine, g()),
        Builtin::Cosine => -Expression::call(Builtin::Sine, g()),
        Builtin::Tangent => {
            let cos_g = Expression::call(Builtin::Cosine, g());
            Expression::Constant(1.0) / cos_g.pow(Expression::Constant(2.0))
        },
        Builtin::Log => Expression::Constant(1.0) / g(),
        Builtin::Exp => Expression::call(Builtin::Exp, g()),
        Builtin::Sqrt => {
            Expression::Constant(0.5) / Expression::call(Builtin::Sqrt, g())
        },
        Builtin::Abs => g() / Expression::call(Builtin::Abs, g()),
        // piecewise constant, so the slope is zero wherever it's defined
        Builtin::Floor | Builtin::Ceil => Expression::Constant(0.0),
        Builtin::Factorial => {
            return Err(EvaluationError::UnableToDifferentiate { function })
        },
    };

    Ok(derivative)
}

/// Simplify an expression by evaluating all constant operations.
pub fn fold_constants(expr: &Expression) -> Expression {
    match expr {
        Expression::Binary { left, right, op } => {
            fold_binary_op(left, right, *op)
        },
        Expression::Negate(expr) => match fold_constants(expr) {
            Expression::Constant(value) => Expression::Constant(-value),
            // double negative
            Expression::Negate(inner) => *inner,
            other => Expression::Negate(Box::new(other)),
        },
        Expression::FunctionCall { function, argument } => {
            let argument = fold_constants(argument);

            if let Expression::Constant(argument) = argument {
                let result = function.apply(argument);

                // leave domain errors in place so they show up when printed
                if result.is_finite() {
                    return Expression::Constant(result);
                }
            }

            Expression::call(*function, argument)
        },
        _ => expr.clone(),
    }
}

fn fold_binary_op(
    left: &Expression,
    right: &Expression,
    op: BinaryOperation,
) -> Expression {
    let left = fold_constants(left);
    let right = fold_constants(right);

    // If our operands contain constants, we can use arithmetic's identity laws
    // to simplify things
    match (left, right, op) {
        (
            Expression::Parameter(p_left),
            Expression::Parameter(p_right),
            BinaryOperation::Plus,
        ) if p_left == p_right => {
            Expression::Constant(2.0) * Expression::Parameter(p_right)
        },
        (
            Expression::Parameter(p_left),
            Expression::Parameter(p_right),
            BinaryOperation::Minus,
        ) if p_left == p_right => Expression::Constant(0.0),
        (
            Expression::Parameter(p_left),
            Expression::Parameter(p_right),
            BinaryOperation::Divide,
        ) if p_left == p_right => Expression::Constant(1.0),

        // x + 0 = x
        (Expression::Constant(l), right, BinaryOperation::Plus)
            if l.approx_eq(&0.0) =>
        {
            right
        },
        (left, Expression::Constant(r), BinaryOperation::Plus)
            if r.approx_eq(&0.0) =>
        {
            left
        },

        // 0 * x = 0
        (Expression::Constant(l), _, BinaryOperation::Times)
            if l.approx_eq(&0.0) =>
        {
            Expression::Constant(0.0)
        },
        (_, Expression::Constant(r), BinaryOperation::Times)
            if r.approx_eq(&0.0) =>
        {
            Expression::Constant(0.0)
        },

        // 1 * x = x
        (Expression::Constant(l), right, BinaryOperation::Times)
            if l.approx_eq(&1.0) =>
        {
            right
        },
        (left, Expression::Constant(r), BinaryOperation::Times)
            if r.approx_eq(&1.0) =>
        {
            left
        },

        // 0 / x = 0
        (Expression::Constant(l), _, BinaryOperation::Divide)
            if l.approx_eq(&0.0) =>
        {
            Expression::Constant(0.0)
        },

        // x / 1 = x
        (left, Expression::Constant(r), BinaryOperation::Divide)
            if r.approx_eq(&1.0) =>
        {
            left
        },

        // 0 - x = -x
        (Expression::Constant(l), right, BinaryOperation::Minus)
            if l.approx_eq(&0.0) =>
        {
            fold_constants(&-right)
        },

        // x - 0 = x
        (left, Expression::Constant(r), BinaryOperation::Minus)
            if r.approx_eq(&0.0) =>
        {
            left
        },

        // x^1 = x
        (left, Expression::Constant(r), BinaryOperation::Power)
            if r.approx_eq(&1.0) =>
        {
            left
        },

        // x^0 = 1
        (_, Expression::Constant(r), BinaryOperation::Power)
            if r.approx_eq(&0.0) =>
        {
            Expression::Constant(1.0)
        },

        // (x * y) * z
        (
            Expression::Constant(constant_a),
            Expression::Binary {
                left,
                right,
                op: BinaryOperation::Times,
            },
            BinaryOperation::Times,
        ) if left.is_constant() || right.is_constant() => {
            let (constant_b, expr) = match (&*left, &*right) {
                (Expression::Constant(left), right) => (left, right),
                (left, Expression::Constant(right)) => (right, left),
                _ => unreachable!(),
            };
            Expression::Constant(constant_a * constant_b)
                * Expression::clone(expr)
        },
        (
            Expression::Binary {
                left,
                right,
                op: BinaryOperation::Times,
            },
            Expression::Constant(constant_a),
            BinaryOperation::Times,
        ) if left.is_constant() || right.is_constant() => {
            let (constant_b, expr) = match (&*left, &*right) {
                (Expression::Constant(left), right) => (left, right),
                (left, Expression::Constant(right)) => (right, left),
                _ => unreachable!(),
            };
            Expression::Constant(constant_a * constant_b)
                * Expression::clone(expr)
        },

        // Evaluate in-place
        (Expression::Constant(l), Expression::Constant(r), op) => {
            Expression::Constant(op.apply(l, r))
        },

        // Oh well, we tried
        (left, right, op) => Expression::Binary {
            left: Box::new(left),
            right: Box::new(right),
            op,
        },
    }
}

/// Replace all references to a [`Parameter`] with an [`Expression`].
pub fn substitute(
    expression: &Expression,
    param: &Parameter,
    value: &Expression,
) -> Expression {
    match expression {
        Expression::Parameter(p) => {
            if p == param {
                value.clone()
            } else {
                Expression::Parameter(p.clone())
            }
        },
        Expression::Constant(value) => Expression::Constant(*value),
        Expression::Binary { left, right, op } => {
            let left = substitute(left, param, value);
            let right = substitute(right, param, value);
            Expression::Binary {
                left: Box::new(left),
                right: Box::new(right),
                op: *op,
            }
        },
        Expression::Negate(inner) => -substitute(inner, param, value),
        Expression::FunctionCall { function, argument } => {
            Expression::call(*function, substitute(argument, param, value))
        },
    }
}

/// Calculate an [`Expression`]'s partial derivative with respect to a
/// particular [`Parameter`].
pub fn partial_derivative(
    expr: &Expression,
    param: &Parameter,
) -> Result<Expression, EvaluationError> {
    let got = match expr {
        Expression::Parameter(p) => {
            if p == param {
                Expression::Constant(1.0)
            } else {
                Expression::Constant(0.0)
            }
        },
        Expression::Constant(_) => Expression::Constant(0.0),
        Expression::Binary {
            left,
            right,
            op: BinaryOperation::Plus,
        } => {
            partial_derivative(left, param)?
                + partial_derivative(right, param)?
        },
        Expression::Binary {
            left,
            right,
            op: BinaryOperation::Minus,
        } => {
            partial_derivative(left, param)?
                - partial_derivative(right, param)?
        },
        Expression::Binary {
            left,
            right,
            op: BinaryOperation::Times,
        } => {
            // The product rule
            let d_left = partial_derivative(left, param)?;
            let d_right = partial_derivative(right, param)?;
            let left = Expression::clone(left);
            let right = Expression::clone(right);

            d_left * right + d_right * left
        },
        Expression::Binary {
            left,
            right,
            op: BinaryOperation::Divide,
        } => {
            // The quotient rule
            let d_left = partial_derivative(left, param)?;
            let d_right = partial_derivative(right, param)?;
            let right = Expression::clone(right);
            let left = Expression::clone(left);

            (d_left * right.clone() - left * d_right) / (right.clone() * right)
        },
        Expression::Binary {
            left,
            right,
            op: BinaryOperation::Power,
        } => power_derivative(left, right, param)?,

        Expression::Negate(inner) => -partial_derivative(inner, param)?,
        Expression::FunctionCall { function, argument } => {
            // implement the chain rule: (f o g)' = (f' o g) * g'
            let f_dash_of_g = differentiate_function(*function, argument)?;
            let g_dash = partial_derivative(argument, param)?;

            f_dash_of_g * g_dash
        },
    };

    Ok(got)
}

fn power_derivative(
    base: &Expression,
    exponent: &Expression,
    param: &Parameter,
) -> Result<Expression, EvaluationError> {
    let f = Expression::clone(base);
    let g = Expression::clone(exponent);

    if !exponent.depends_on(param) {
        // the power rule: (f^n)' = n * f^(n - 1) * f'
        let f_dash = partial_derivative(base, param)?;
        return Ok(g.clone() * f.pow(g - Expression::Constant(1.0)) * f_dash);
    }

    let g_dash = partial_derivative(exponent, param)?;
    let ln_f = Expression::call(Builtin::Log, f.clone());

    if !base.depends_on(param) {
        // (a^g)' = a^g * ln(a) * g'
        return Ok(f.pow(g) * ln_f * g_dash);
    }

    // the general case: (f^g)' = f^g * (g' * ln(f) + g * f' / f)
    let f_dash = partial_derivative(base, param)?;
    Ok(f.clone().pow(g.clone()) * (g_dash * ln_f + g * f_dash / f))
}
