//! Differential operators, function spaces and their validity rules.
use crate::error::BasisError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::{Display, Formatter};

/// The maximum derivative order supported by [`Operator::dk`].
pub const MAX_DERIVATIVE_ORDER: usize = 10;

/// An operator applied to basis functions during evaluation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    Value,
    Grad,
    Curl,
    Div,
    D1,
    D2,
    D3,
    D4,
    D5,
    D6,
    D7,
    D8,
    D9,
    D10,
}

impl Operator {
    /// The operator of all partial derivatives of order `k`, for `1 <= k <= 10`.
    pub fn dk(k: usize) -> Option<Self> {
        use Operator::*;
        [D1, D2, D3, D4, D5, D6, D7, D8, D9, D10].get(k.checked_sub(1)?).copied()
    }

    /// The highest order of partial derivatives needed to evaluate the operator.
    pub fn derivative_order(&self) -> usize {
        use Operator::*;
        match self {
            Value => 0,
            Grad | Curl | Div | D1 => 1,
            D2 => 2,
            D3 => 3,
            D4 => 4,
            D5 => 5,
            D6 => 6,
            D7 => 7,
            D8 => 8,
            D9 => 9,
            D10 => 10,
        }
    }

    /// Returns `k` if the operator is `Grad` or `Dk`.
    pub fn as_dk(&self) -> Option<usize> {
        match self {
            Self::Value | Self::Curl | Self::Div => None,
            _ => Some(self.derivative_order()),
        }
    }

    /// The number of output components of the operator applied to a single basis function.
    ///
    /// Returns an error if the operator is not defined for fields in the given function space
    /// and dimension.
    pub fn num_components(&self, space: FunctionSpace, dim: usize) -> Result<usize, BasisError> {
        let unsupported = || BasisError::UnsupportedOperator {
            operator: *self,
            function_space: space,
            dimension: dim,
        };
        let scalar = space.is_scalar();
        match self {
            Self::Value if scalar => Ok(1),
            Self::Value => Ok(dim),
            _ if !scalar && self.as_dk().is_some() => Err(unsupported()),
            Self::Curl => match (space, dim) {
                (FunctionSpace::HCurl, 3) => Ok(3),
                (FunctionSpace::HCurl, 2) => Ok(1),
                (_, 1) if scalar => Ok(1),
                (_, 2) if scalar => Ok(2),
                _ => Err(unsupported()),
            },
            Self::Div => match (space, dim) {
                (FunctionSpace::HDiv, _) => Ok(1),
                (_, 1) if scalar => Ok(1),
                _ => Err(unsupported()),
            },
            _ => Ok(num_partial_derivatives(self.derivative_order(), dim)),
        }
    }
}

impl Display for Operator {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value => write!(f, "VALUE"),
            Self::Grad => write!(f, "GRAD"),
            Self::Curl => write!(f, "CURL"),
            Self::Div => write!(f, "DIV"),
            _ => write!(f, "D{}", self.derivative_order()),
        }
    }
}

/// The function space a basis spans.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FunctionSpace {
    HGrad,
    HCurl,
    HDiv,
    HVol,
}

impl FunctionSpace {
    /// Whether fields in this space are scalar-valued.
    pub fn is_scalar(&self) -> bool {
        matches!(self, Self::HGrad | Self::HVol)
    }
}

impl Display for FunctionSpace {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::HGrad => write!(f, "H(grad)"),
            Self::HCurl => write!(f, "H(curl)"),
            Self::HDiv => write!(f, "H(div)"),
            Self::HVol => write!(f, "H(vol)"),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CoordinateSystem {
    Cartesian,
}

fn binomial(n: usize, k: usize) -> usize {
    (0..k).fold(1, |acc, i| acc * (n - i) / (i + 1))
}

/// Number of distinct partial derivatives of order `k` in `dim` variables.
pub fn num_partial_derivatives(k: usize, dim: usize) -> usize {
    binomial(k + dim - 1, dim - 1)
}

/// Number of distinct partial derivatives of all orders up to and including `k`.
pub fn num_partial_derivatives_up_to(k: usize, dim: usize) -> usize {
    binomial(k + dim, dim)
}

/// The multi-indices of all partial derivatives of order `k` in `dim` variables.
///
/// Entries are ordered by descending x-exponent, then descending y-exponent, so that for
/// `k = 2` in three dimensions the order is `xx, xy, xz, yy, yz, zz`. Unused trailing exponents
/// are zero.
pub fn partial_derivative_multi_indices(k: usize, dim: usize) -> Vec<[usize; 3]> {
    match dim {
        1 => vec![[k, 0, 0]],
        2 => (0..=k).rev().map(|a| [a, k - a, 0]).collect(),
        3 => (0..=k)
            .rev()
            .flat_map(|a| (0..=k - a).rev().map(move |b| [a, b, k - a - b]))
            .collect(),
        _ => panic!("unsupported dimension {dim}"),
    }
}

/// Position of a multi-index among all partial derivatives of the same order.
pub fn partial_derivative_position(multi_index: [usize; 3], dim: usize) -> usize {
    let [_, b, c] = multi_index;
    match dim {
        1 => 0,
        2 => b,
        _ => {
            let s = b + c;
            s * (s + 1) / 2 + c
        }
    }
}
