//! The Scheme numeric tower, as far as the reader needs it.
//!
//! Exactness is carried by the variant: integers and rationals are exact,
//! floats and complex numbers are inexact. The tokenizer produces these
//! values directly from literal text; no arithmetic is defined here.

use std::fmt;

use num_bigint::BigInt;
use num_complex::Complex64;
use num_rational::BigRational;
use num_traits::ToPrimitive;

/// A Scheme number.
///
/// Exact values with denominator 1 are always represented as `Integer`,
/// so `4/2` and `2` compare equal.
#[derive(Clone, Debug, PartialEq)]
pub enum Number {
    Integer(BigInt),
    Rational(BigRational),
    Real(f64),
    Complex(Complex64),
}

impl Number {
    /// Build an exact number from a rational, collapsing integral values.
    pub fn exact(value: BigRational) -> Number {
        if value.is_integer() {
            Number::Integer(value.to_integer())
        } else {
            Number::Rational(value)
        }
    }

    /// Whether this number is exact (an integer or rational).
    pub fn is_exact(&self) -> bool {
        matches!(self, Number::Integer(_) | Number::Rational(_))
    }
}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        Number::Integer(BigInt::from(value))
    }
}

impl From<f64> for Number {
    fn from(value: f64) -> Self {
        Number::Real(value)
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Integer(i) => write!(f, "{i}"),
            Number::Rational(r) => write!(f, "{r}"),
            // {:?} keeps a trailing ".0" on whole floats, distinguishing
            // inexact 12.0 from exact 12.
            Number::Real(x) => write!(f, "{x:?}"),
            Number::Complex(c) => {
                if c.im.is_sign_negative() {
                    write!(f, "{:?}{:?}i", c.re, c.im)
                } else {
                    write!(f, "{:?}+{:?}i", c.re, c.im)
                }
            }
        }
    }
}

/// Approximate an exact ratio as a float.
pub(crate) fn ratio_to_f64(value: &BigRational) -> f64 {
    value.to_f64().unwrap_or(f64::NAN)
}
