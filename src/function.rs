/// Something which can be evaluated at a single point.
///
/// This is how the root finders and the interval scanner see the world, so
/// they work equally well with a compiled [`crate::Equation`], its
/// [`crate::Derivative`] or a plain closure.
pub trait Function {
    fn evaluate(&self, x: f64) -> f64;
}

impl<F> Function for F
where
    F: Fn(f64) -> f64,
{
    fn evaluate(&self, x: f64) -> f64 { self(x) }
}
