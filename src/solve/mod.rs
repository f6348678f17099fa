//! Iterative root finders which record every step they take.
//!
//! Each method is a pure function of its inputs. A successful call returns a
//! [`Run`], the full list of [`Record`]s plus exactly one [`RootResult`].
//! Hitting the iteration cap is a [`Status`], not an error.

mod bracket;
mod config;
mod newton;
mod record;

pub use bracket::{bisection, false_position};
pub use config::SolverConfig;
pub use newton::newton_raphson;
pub use record::{BracketStep, NewtonStep, Record, Row};

use crate::{function::Function, ErrorKind};
use std::fmt::{self, Display, Formatter};

/// The available root-finding algorithms.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Method {
    Bisection,
    FalsePosition,
    NewtonRaphson,
}

impl Method {
    /// The column headings for this method's iteration table, matching
    /// [`Record::values()`].
    pub fn columns(self) -> &'static [&'static str] {
        match self {
            Method::Bisection => &[
                "iteration",
                "a",
                "b",
                "c",
                "f(a)",
                "f(b)",
                "f(c)",
                "(b - a)/2",
            ],
            Method::FalsePosition => &[
                "iteration",
                "a",
                "b",
                "c",
                "f(a)",
                "f(b)",
                "f(c)",
                "|f(c)|",
            ],
            Method::NewtonRaphson => &[
                "iteration",
                "x",
                "f(x)",
                "f'(x)",
                "x_new",
                "|x_new - x|",
            ],
        }
    }

    /// Does this method need a bracket, `[a, b]`, rather than a single
    /// starting guess?
    pub fn is_bracketing(self) -> bool {
        match self {
            Method::Bisection | Method::FalsePosition => true,
            Method::NewtonRaphson => false,
        }
    }
}

impl Display for Method {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Method::Bisection => write!(f, "bisection"),
            Method::FalsePosition => write!(f, "false position"),
            Method::NewtonRaphson => write!(f, "Newton-Raphson"),
        }
    }
}

/// How a run finished.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Status {
    Converged,
    MaxIterationsReached,
}

/// The outcome of a root-finding run.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RootResult {
    pub method: Method,
    /// The final estimate of the root.
    pub root: f64,
    /// The method's error measure on the final iteration.
    pub error: f64,
    pub iterations: usize,
    /// `f(root)`
    pub f_root: f64,
    pub status: Status,
}

impl RootResult {
    pub fn converged(&self) -> bool { self.status == Status::Converged }
}

/// Everything produced by a single root-finding run.
#[derive(Debug, Clone, PartialEq)]
pub struct Run<R> {
    records: Vec<R>,
    result: RootResult,
}

impl<R: Record> Run<R> {
    pub(crate) fn new(records: Vec<R>, result: RootResult) -> Self {
        debug_assert_eq!(records.len(), result.iterations);
        debug_assert!(records
            .iter()
            .enumerate()
            .all(|(i, record)| record.index() == i + 1));

        Run { records, result }
    }

    /// The audit trail, one [`Record`] per iteration.
    pub fn records(&self) -> &[R] { &self.records }

    pub fn result(&self) -> &RootResult { &self.result }

    /// The iteration table's column headings.
    pub fn columns(&self) -> &'static [&'static str] {
        self.result.method.columns()
    }

    /// Every record's values, ready to be put in a table.
    pub fn rows(&self) -> impl Iterator<Item = Row> + '_ {
        self.records.iter().map(Record::values)
    }

    pub fn into_parts(self) -> (Vec<R>, RootResult) {
        (self.records, self.result)
    }
}

/// Reasons a root-finding run can fail.
#[derive(Debug, Copy, Clone, PartialEq, thiserror::Error)]
pub enum SolveError {
    #[error(
        "f(a) and f(b) must have opposite signs, but f({a}) = {f_a} and \
         f({b}) = {f_b}"
    )]
    NoSignChange { a: f64, b: f64, f_a: f64, f_b: f64 },
    #[error("division by zero, f(a) = f(b) = {value} on [{a}, {b}]")]
    DivisionByZero { a: f64, b: f64, value: f64 },
    #[error("the derivative is zero at x = {x} (iteration {iteration})")]
    ZeroDerivative { x: f64, iteration: usize },
    #[error("the function isn't defined at x = {x} (got {value})")]
    NumericDomain { x: f64, value: f64 },
    #[error("the derivative isn't defined at x = {x} (got {value})")]
    NonFiniteDerivative { x: f64, value: f64 },
    #[error("the bracket [{a}, {b}] must have finite bounds")]
    InvalidBracket { a: f64, b: f64 },
    #[error("the initial guess must be finite, but got {x0}")]
    InvalidInitialGuess { x0: f64 },
    #[error("at least one iteration is required, but got {got}")]
    InvalidMaxIterations { got: usize },
}

impl SolveError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SolveError::NumericDomain { .. }
            | SolveError::NonFiniteDerivative { .. } => ErrorKind::NumericDomain,
            _ => ErrorKind::Precondition,
        }
    }
}

/// Evaluate `f(x)`, turning anything non-finite into a
/// [`SolveError::NumericDomain`].
fn evaluate_checked<F>(f: &F, x: f64) -> Result<f64, SolveError>
where
    F: Function + ?Sized,
{
    let value = f.evaluate(x);

    if value.is_finite() {
        Ok(value)
    } else {
        Err(SolveError::NumericDomain { x, value })
    }
}
