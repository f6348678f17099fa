use crate::{
    function::Function,
    solve::{
        evaluate_checked, BracketStep, Method, RootResult, Run, SolveError,
        SolverConfig, Status,
    },
};

/// Find a root of `f` inside `[a, b]` by repeatedly halving the bracket.
///
/// Stops once `|f(c)|` or the half-width, `(b - a)/2`, drops below the
/// tolerance. Starting from a bracket of width `w`, that takes at most
/// `floor(log2(w / tolerance)) + 1` iterations.
///
/// # Errors
///
/// - [`SolveError::NoSignChange`] if `f(a)` and `f(b)` have the same sign
/// - [`SolveError::NumericDomain`] if `f` isn't finite at a point we need
/// - [`SolveError::InvalidBracket`] if either bound isn't finite
pub fn bisection<F>(
    f: &F,
    a: f64,
    b: f64,
    config: &SolverConfig,
) -> Result<Run<BracketStep>, SolveError>
where
    F: Function + ?Sized,
{
    solve_bracketed::<Bisection, F>(f, a, b, config)
}

/// Find a root of `f` inside `[a, b]` using the secant through both ends of
/// the bracket (a.k.a. *Regula Falsi*).
///
/// One end of the bracket often stays put, so the bracket's width says
/// nothing about progress and the only stopping criterion is `|f(c)|`.
///
/// # Errors
///
/// The same as [`bisection()`], plus [`SolveError::DivisionByZero`] when
/// `f(a) == f(b)`.
pub fn false_position<F>(
    f: &F,
    a: f64,
    b: f64,
    config: &SolverConfig,
) -> Result<Run<BracketStep>, SolveError>
where
    F: Function + ?Sized,
{
    solve_bracketed::<FalsePosition, F>(f, a, b, config)
}

/// The parts that differ between bracketing methods.
trait BracketRule {
    const METHOD: Method;

    /// Pick the next estimate, `c`, somewhere inside `[a, b]`.
    fn next_estimate(
        a: f64,
        b: f64,
        f_a: f64,
        f_b: f64,
    ) -> Result<f64, SolveError>;

    fn error(a: f64, b: f64, f_c: f64) -> f64;

    fn has_converged(f_c: f64, error: f64, tolerance: f64) -> bool;
}

enum Bisection {}

impl BracketRule for Bisection {
    const METHOD: Method = Method::Bisection;

    fn next_estimate(
        a: f64,
        b: f64,
        _f_a: f64,
        _f_b: f64,
    ) -> Result<f64, SolveError> {
        Ok((a + b) / 2.0)
    }

    fn error(a: f64, b: f64, _f_c: f64) -> f64 { (b - a) / 2.0 }

    fn has_converged(f_c: f64, half_width: f64, tolerance: f64) -> bool {
        f_c.abs() < tolerance || half_width < tolerance
    }
}

enum FalsePosition {}

impl BracketRule for FalsePosition {
    const METHOD: Method = Method::FalsePosition;

    fn next_estimate(
        a: f64,
        b: f64,
        f_a: f64,
        f_b: f64,
    ) -> Result<f64, SolveError> {
        if f_a == f_b {
            return Err(SolveError::DivisionByZero { a, b, value: f_a });
        }

        Ok((a * f_b - b * f_a) / (f_b - f_a))
    }

    fn error(_a: f64, _b: f64, f_c: f64) -> f64 { f_c.abs() }

    fn has_converged(f_c: f64, _error: f64, tolerance: f64) -> bool {
        f_c.abs() < tolerance
    }
}

fn solve_bracketed<R, F>(
    f: &F,
    a: f64,
    b: f64,
    config: &SolverConfig,
) -> Result<Run<BracketStep>, SolveError>
where
    R: BracketRule,
    F: Function + ?Sized,
{
    let max_iterations = config.checked_max_iterations()?;
    let tolerance = config.tolerance().get();

    if !(a.is_finite() && b.is_finite()) {
        return Err(SolveError::InvalidBracket { a, b });
    }
    let (mut a, mut b) = if a <= b { (a, b) } else { (b, a) };

    let mut f_a = evaluate_checked(f, a)?;
    let mut f_b = evaluate_checked(f, b)?;

    if same_sign(f_a, f_b) {
        return Err(SolveError::NoSignChange { a, b, f_a, f_b });
    }

    log::debug!(
        "Starting {} on [{}, {}] with a tolerance of {}",
        R::METHOD,
        a,
        b,
        tolerance
    );

    let mut records = Vec::new();
    let mut status = Status::MaxIterationsReached;

    for index in 1..=max_iterations {
        let c = R::next_estimate(a, b, f_a, f_b)?;
        let f_c = evaluate_checked(f, c)?;
        let error = R::error(a, b, f_c);

        let step = BracketStep {
            index,
            a,
            b,
            c,
            f_a,
            f_b,
            f_c,
            error,
        };
        log::trace!("{:?}", step);
        records.push(step);

        if R::has_converged(f_c, error, tolerance) {
            status = Status::Converged;
            break;
        }

        // an exact root sitting on the left bound keeps the left half
        if opposite_signs(f_a, f_c) || f_a == 0.0 {
            b = c;
            f_b = f_c;
        } else {
            a = c;
            f_a = f_c;
        }
    }

    let last = records
        .last()
        .copied()
        .ok_or(SolveError::InvalidMaxIterations { got: max_iterations })?;

    let result = RootResult {
        method: R::METHOD,
        root: last.c,
        error: last.error,
        iterations: records.len(),
        f_root: last.f_c,
        status,
    };
    log::debug!("Finished {}: {:?}", R::METHOD, result);

    Ok(Run::new(records, result))
}

fn same_sign(x: f64, y: f64) -> bool {
    (x > 0.0 && y > 0.0) || (x < 0.0 && y < 0.0)
}

fn opposite_signs(x: f64, y: f64) -> bool {
    (x > 0.0 && y < 0.0) || (x < 0.0 && y > 0.0)
}
