use arrayvec::ArrayVec;

/// The values making up one row of a run's iteration table.
pub type Row = ArrayVec<[f64; 8]>;

/// One audit row produced by a root-finding run.
pub trait Record {
    /// The 1-based iteration this row was recorded on.
    fn index(&self) -> usize;

    /// Every column of the row, in the order given by
    /// [`crate::Method::columns()`], starting with the iteration number.
    fn values(&self) -> Row;
}

/// A single step of a bracketing method ([`crate::bisection()`] or
/// [`crate::false_position()`]).
///
/// `a`, `b`, `f(a)` and `f(b)` are the bracket as it was *before* this
/// step's estimate, `c`, was used to shrink it.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BracketStep {
    pub index: usize,
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub f_a: f64,
    pub f_b: f64,
    pub f_c: f64,
    /// The half-width of `[a, b]` for bisection, `|f(c)|` for false
    /// position.
    pub error: f64,
}

impl Record for BracketStep {
    fn index(&self) -> usize { self.index }

    fn values(&self) -> Row {
        let BracketStep {
            index,
            a,
            b,
            c,
            f_a,
            f_b,
            f_c,
            error,
        } = *self;

        [index as f64, a, b, c, f_a, f_b, f_c, error]
            .iter()
            .copied()
            .collect()
    }
}

/// A single Newton-Raphson step.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct NewtonStep {
    pub index: usize,
    pub x: f64,
    pub f_x: f64,
    pub f_dash_x: f64,
    pub x_new: f64,
    /// `|x_new - x|`
    pub error: f64,
}

impl Record for NewtonStep {
    fn index(&self) -> usize { self.index }

    fn values(&self) -> Row {
        let NewtonStep {
            index,
            x,
            f_x,
            f_dash_x,
            x_new,
            error,
        } = *self;

        [index as f64, x, f_x, f_dash_x, x_new, error]
            .iter()
            .copied()
            .collect()
    }
}
