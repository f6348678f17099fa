use crate::{solve::SolveError, Tolerance};

/// Settings shared by every root-finding method.
///
/// # Defaults
///
/// The tolerance is [`Tolerance::DEFAULT`] and `max_iterations` is
/// [`SolverConfig::DEFAULT_MAX_ITERATIONS`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SolverConfig {
    tolerance: Tolerance,
    max_iterations: usize,
}

impl SolverConfig {
    pub const DEFAULT_MAX_ITERATIONS: usize = 1000;

    pub fn new(tolerance: Tolerance) -> Self {
        SolverConfig {
            tolerance,
            max_iterations: SolverConfig::DEFAULT_MAX_ITERATIONS,
        }
    }

    pub fn with_tolerance(mut self, tolerance: Tolerance) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Cap the number of iterations. Reaching the cap isn't an error, the run
    /// just finishes with [`crate::Status::MaxIterationsReached`].
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn tolerance(&self) -> Tolerance { self.tolerance }

    pub fn max_iterations(&self) -> usize { self.max_iterations }

    /// Get the iteration cap, making sure we'll do at least one iteration.
    pub(crate) fn checked_max_iterations(&self) -> Result<usize, SolveError> {
        match self.max_iterations {
            0 => Err(SolveError::InvalidMaxIterations {
                got: self.max_iterations,
            }),
            n => Ok(n),
        }
    }
}

impl Default for SolverConfig {
    fn default() -> Self { SolverConfig::new(Tolerance::default()) }
}

impl From<Tolerance> for SolverConfig {
    fn from(tolerance: Tolerance) -> Self { SolverConfig::new(tolerance) }
}
