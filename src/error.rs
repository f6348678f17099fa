use crate::{CompileError, ParseError, ScanError, SolveError, ToleranceError};

/// The broad category an error falls into.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed or empty equation or tolerance text.
    Parse,
    /// The inputs don't satisfy a method's requirements (no sign change,
    /// zero derivative, a bad range, ...).
    Precondition,
    /// Evaluation produced something non-finite at a point a method needed.
    NumericDomain,
}

/// Any error this crate can produce.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Compile(#[from] CompileError),
    #[error(transparent)]
    Tolerance(#[from] ToleranceError),
    #[error(transparent)]
    Solve(#[from] SolveError),
    #[error(transparent)]
    Scan(#[from] ScanError),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Compile(e) => e.kind(),
            Error::Tolerance(e) => e.kind(),
            Error::Solve(e) => e.kind(),
            Error::Scan(e) => e.kind(),
        }
    }
}

impl From<ParseError> for Error {
    fn from(e: ParseError) -> Self { Error::Compile(CompileError::from(e)) }
}

impl CompileError {
    pub fn kind(&self) -> ErrorKind { ErrorKind::Parse }
}

impl ToleranceError {
    pub fn kind(&self) -> ErrorKind { ErrorKind::Parse }
}
