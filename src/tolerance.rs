//! Parsing the loosely formatted tolerances people actually type.
//!
//! After lowercasing, replacing `×` with `x` and `,` with `.`, the first
//! matching rule wins:
//!
//! 1. contains `e` - scientific notation (`1e-4`)
//! 2. contains `x10^` - `base x10^exp`, where `base` defaults to 1
//! 3. contains `10^` - `base 10^exp`, where `base` defaults to 1
//! 4. contains `10-` - `base 10-exp`, meaning `base * 10^-exp`
//! 5. anything else is a plain decimal number
//!
//! The rules overlap (`1x10^-4` also contains `10^`), so their order is part
//! of the format.

use std::{
    fmt::{self, Display, Formatter},
    str::FromStr,
};

/// Parse a tolerance, returning its value.
pub fn parse_tolerance(text: &str) -> Result<f64, ToleranceError> {
    text.parse().map(Tolerance::get)
}

/// A finite, strictly positive tolerance.
#[derive(Debug, Copy, Clone, PartialEq, PartialOrd)]
pub struct Tolerance(f64);

impl Tolerance {
    /// The tolerance used when none is given.
    pub const DEFAULT: Tolerance = Tolerance(1e-6);

    pub fn new(value: f64) -> Result<Self, ToleranceError> {
        if !value.is_finite() {
            Err(ToleranceError::NotFinite { value })
        } else if value <= 0.0 {
            Err(ToleranceError::NotPositive { value })
        } else {
            Ok(Tolerance(value))
        }
    }

    pub fn get(self) -> f64 { self.0 }
}

impl Default for Tolerance {
    fn default() -> Self { Tolerance::DEFAULT }
}

impl FromStr for Tolerance {
    type Err = ToleranceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s
            .trim()
            .to_lowercase()
            .replace('×', "x")
            .replace(',', ".");

        if normalized.is_empty() {
            return Err(ToleranceError::Empty);
        }

        let value = if normalized.contains('e') {
            number(&normalized, s)?
        } else if let Some((base, exponent)) = normalized.split_once("x10^") {
            scaled(base, exponent, 1.0, s)?
        } else if let Some((base, exponent)) = normalized.split_once("10^") {
            scaled(base, exponent, 1.0, s)?
        } else if let Some((base, exponent)) = normalized.split_once("10-") {
            scaled(base, exponent, -1.0, s)?
        } else {
            number(&normalized, s)?
        };

        Tolerance::new(value)
    }
}

impl Display for Tolerance {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn number(text: &str, original: &str) -> Result<f64, ToleranceError> {
    text.trim()
        .parse()
        .map_err(|_| ToleranceError::Unparseable {
            text: original.to_string(),
        })
}

/// `base * 10^(sign * exponent)`, where a missing base means 1.
fn scaled(
    base: &str,
    exponent: &str,
    sign: f64,
    original: &str,
) -> Result<f64, ToleranceError> {
    let base = if base.trim().is_empty() {
        1.0
    } else {
        number(base, original)?
    };
    let exponent = number(exponent, original)?;

    Ok(base * 10_f64.powf(sign * exponent))
}

/// Reasons a tolerance may be rejected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ToleranceError {
    #[error("the tolerance is empty")]
    Empty,
    #[error("\"{text}\" is not a recognised tolerance")]
    Unparseable { text: String },
    #[error("the tolerance must be finite, but got {value}")]
    NotFinite { value: f64 },
    #[error("the tolerance must be greater than zero, but got {value}")]
    NotPositive { value: f64 },
}
