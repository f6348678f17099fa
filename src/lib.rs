//! A small engine for finding the roots of single-variable equations.
//!
//! Equations are compiled from text (e.g. `"cos(x) = x"`) into an
//! [`Equation`] which can be evaluated and differentiated, then handed to one
//! of the root finders. Every run records each iteration it takes so the
//! caller can show their working.
//!
//! ```rust
//! use equation_roots::{bisection, compile, SolverConfig, Status};
//!
//! let f = compile("x^2 - 4")?;
//! let tolerance = "1e-6".parse()?;
//!
//! let run = bisection(&f, 0.0, 3.0, &SolverConfig::new(tolerance))?;
//!
//! assert_eq!(run.result().status, Status::Converged);
//! assert!((run.result().root - 2.0).abs() < 1e-6);
//! # Ok::<(), equation_roots::Error>(())
//! ```
//!
//! Use [`scan_intervals()`] when you don't know where to look.

#[cfg(test)]
#[macro_use]
extern crate pretty_assertions;

pub mod algebra;
mod equation;
mod error;
mod function;
mod scan;
mod solve;
mod tolerance;

pub use algebra::{Builtin, Expression, Parameter, ParseError};
pub use equation::{compile, CompileError, Derivative, Equation, UNKNOWN};
pub use error::{Error, ErrorKind};
pub use function::Function;
pub use scan::{
    scan_intervals, Interval, ScanError, DEFAULT_SCAN_STEP, MAX_SCAN_SAMPLES,
};
pub use solve::{
    bisection, false_position, newton_raphson, BracketStep, Method,
    NewtonStep, Record, RootResult, Row, Run, SolveError, SolverConfig,
    Status,
};
pub use tolerance::{parse_tolerance, Tolerance, ToleranceError};
