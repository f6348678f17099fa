use crate::{
    function::Function,
    solve::{
        evaluate_checked, Method, NewtonStep, RootResult, Run, SolveError,
        SolverConfig, Status,
    },
};

/// Find a root of `f` by following its tangent, starting from `x0`.
///
/// Each iteration takes `x_new = x - f(x)/f'(x)` and the run stops once
/// consecutive estimates are closer than the tolerance. Convergence isn't
/// guaranteed, a poor starting guess may oscillate or wander off until the
/// iteration cap is hit.
///
/// The `derivative` is usually [`Equation::derivative()`], but any
/// [`Function`] will do.
///
/// [`Equation::derivative()`]: crate::Equation::derivative
pub fn newton_raphson<F, D>(
    f: &F,
    derivative: &D,
    x0: f64,
    config: &SolverConfig,
) -> Result<Run<NewtonStep>, SolveError>
where
    F: Function + ?Sized,
    D: Function + ?Sized,
{
    let max_iterations = config.checked_max_iterations()?;
    let tolerance = config.tolerance().get();

    if !x0.is_finite() {
        return Err(SolveError::InvalidInitialGuess { x0 });
    }

    log::debug!(
        "Starting {} from x0 = {} with a tolerance of {}",
        Method::NewtonRaphson,
        x0,
        tolerance
    );

    let mut records = Vec::new();
    let mut status = Status::MaxIterationsReached;
    let mut x = x0;

    for index in 1..=max_iterations {
        let f_x = evaluate_checked(f, x)?;
        let f_dash_x = derivative.evaluate(x);

        if !f_dash_x.is_finite() {
            return Err(SolveError::NonFiniteDerivative { x, value: f_dash_x });
        }
        if f_dash_x == 0.0 {
            return Err(SolveError::ZeroDerivative {
                x,
                iteration: index,
            });
        }

        let x_new = x - f_x / f_dash_x;
        if !x_new.is_finite() {
            return Err(SolveError::NumericDomain { x, value: x_new });
        }
        let error = (x_new - x).abs();

        let step = NewtonStep {
            index,
            x,
            f_x,
            f_dash_x,
            x_new,
            error,
        };
        log::trace!("{:?}", step);
        records.push(step);

        x = x_new;

        if error < tolerance {
            status = Status::Converged;
            break;
        }
    }

    let last = records
        .last()
        .copied()
        .ok_or(SolveError::InvalidMaxIterations { got: max_iterations })?;

    let result = RootResult {
        method: Method::NewtonRaphson,
        root: last.x_new,
        error: last.error,
        iterations: records.len(),
        f_root: evaluate_checked(f, last.x_new)?,
        status,
    };
    log::debug!("Finished {}: {:?}", Method::NewtonRaphson, result);

    Ok(Run::new(records, result))
}
