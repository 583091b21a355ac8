//! Quadrature rules for finite element reference domains.
//!
//! The rules in this crate are computed on demand in double precision. They are used by
//! `fenris-basis` to integrate products of polynomials during basis construction, but have
//! no dependency on it.
//!
//! Reference domains:
//!
//! - The segment is the interval `[-1, 1]`.
//! - The triangle is the unit triangle with vertices `(0, 0)`, `(1, 0)` and `(0, 1)`.
//! - The tetrahedron is the unit tetrahedron with vertices `(0, 0, 0)`, `(1, 0, 0)`,
//!   `(0, 1, 0)` and `(0, 0, 1)`.

use std::fmt;
use std::fmt::{Display, Formatter};

pub mod simplex;
pub mod univariate;

/// Library-wide error type.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// Indicates that a rule satisfying the given requirements is not available.
    NoRuleAvailable,
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoRuleAvailable => {
                write!(
                    f,
                    "There is no quadrature rule satisfying the requirements available"
                )
            }
        }
    }
}

impl std::error::Error for Error {}

/// A D-dimensional point.
pub type Point<const D: usize> = [f64; D];

/// A two-dimensional point.
pub type Point2 = Point<2>;

/// A three-dimensional point.
pub type Point3 = Point<3>;

/// A D-dimensional rule.
pub type Rule<const D: usize> = (Vec<f64>, Vec<Point<D>>);

/// A one-dimensional quadrature rule.
pub type Rule1d = Rule<1>;

/// A two-dimensional quadrature rule.
pub type Rule2d = Rule<2>;

/// A three-dimensional rule.
pub type Rule3d = Rule<3>;

/// Approximates the integral of `f` with the given quadrature rule.
pub fn integrate<const D: usize>(rule: &Rule<D>, f: impl Fn(&Point<D>) -> f64) -> f64 {
    let (weights, points) = rule;
    assert_eq!(weights.len(), points.len(), "weights and points must have the same length");
    weights
        .iter()
        .zip(points)
        .map(|(w, x)| w * f(x))
        .sum()
}
