//! Looking for sign changes to use as brackets.

use crate::{function::Function, ErrorKind};
use std::fmt::{self, Display, Formatter};

/// The step used when the caller doesn't have a better idea.
pub const DEFAULT_SCAN_STEP: f64 = 1.0;

/// The most points a single scan will evaluate.
pub const MAX_SCAN_SAMPLES: usize = 1_000_000;

/// A pair of neighbouring sample points where `f` changes sign.
///
/// This is only a suggestion. The interval may hold more than one root, and
/// a root at which `f` touches zero without crossing it will never show up.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Interval {
    pub lo: f64,
    pub hi: f64,
}

impl Interval {
    pub fn new(lo: f64, hi: f64) -> Self { Interval { lo, hi } }

    pub fn width(self) -> f64 { self.hi - self.lo }

    pub fn contains(self, x: f64) -> bool { self.lo <= x && x <= self.hi }

    /// The `(a, b)` to hand to a bracketing method.
    pub fn bounds(self) -> (f64, f64) { (self.lo, self.hi) }
}

impl Display for Interval {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.lo, self.hi)
    }
}

/// Sample `f` every `step` across `[min, max]` and report each pair of
/// neighbouring samples whose values have opposite signs.
///
/// `max` is always the last sample, even when the range isn't a whole
/// number of steps. Pairs where either value is `NaN` (or infinite) are
/// skipped, so gaps in the function's domain don't stop the scan. A sample
/// that lands exactly on a root has a product of zero with its neighbours and
/// is not reported either.
///
/// Scans needing more than [`MAX_SCAN_SAMPLES`] points are rejected with
/// [`ScanError::TooManySamples`].
pub fn scan_intervals<F>(
    f: &F,
    min: f64,
    max: f64,
    step: f64,
) -> Result<Vec<Interval>, ScanError>
where
    F: Function + ?Sized,
{
    let samples = sample_points(min, max, step)?;
    log::debug!(
        "Scanning [{}, {}] with a step of {} ({} samples)",
        min,
        max,
        step,
        samples.len()
    );

    let values: Vec<(f64, f64)> =
        samples.into_iter().map(|x| (x, f.evaluate(x))).collect();

    let intervals: Vec<Interval> = values
        .windows(2)
        .filter_map(|pair| {
            let (lo, f_lo) = pair[0];
            let (hi, f_hi) = pair[1];

            if !(f_lo.is_finite() && f_hi.is_finite()) {
                log::trace!("Skipping [{}, {}], f isn't defined", lo, hi);
                return None;
            }

            if f_lo * f_hi < 0.0 {
                Some(Interval::new(lo, hi))
            } else {
                None
            }
        })
        .collect();

    log::debug!("Found {} candidate intervals", intervals.len());

    Ok(intervals)
}

fn sample_points(min: f64, max: f64, step: f64) -> Result<Vec<f64>, ScanError> {
    if !(min.is_finite() && max.is_finite()) {
        return Err(ScanError::InvalidRange { min, max });
    }
    if min >= max {
        return Err(ScanError::EmptyRange { min, max });
    }
    if !(step.is_finite() && step > 0.0) {
        return Err(ScanError::InvalidStep { step });
    }

    // includes the final sample at max
    let count = ((max - min) / step).ceil() + 1.0;
    if !(count <= MAX_SCAN_SAMPLES as f64) {
        return Err(ScanError::TooManySamples { min, max, step });
    }
    let count = count as usize - 1;

    // min + i*step rather than a running sum
    let mut points: Vec<f64> = (0..count)
        .map(|i| min + i as f64 * step)
        .take_while(|&x| {
            x < max && !approx::relative_eq!(x, max, max_relative = 1e-12)
        })
        .collect();
    points.push(max);

    Ok(points)
}

/// Reasons a scan can't be started.
#[derive(Debug, Copy, Clone, PartialEq, thiserror::Error)]
pub enum ScanError {
    #[error("the range [{min}, {max}] must have finite bounds")]
    InvalidRange { min: f64, max: f64 },
    #[error("the range [{min}, {max}] is empty")]
    EmptyRange { min: f64, max: f64 },
    #[error("the step must be a positive number, but got {step}")]
    InvalidStep { step: f64 },
    #[error(
        "scanning [{min}, {max}] every {step} would need more than {} samples",
        MAX_SCAN_SAMPLES
    )]
    TooManySamples { min: f64, max: f64, step: f64 },
}

impl ScanError {
    pub fn kind(&self) -> ErrorKind { ErrorKind::Precondition }
}
