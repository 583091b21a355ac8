//! Errors raised while constructing or evaluating bases.
use crate::operator::{FunctionSpace, Operator};
use std::error::Error;
use std::fmt;
use std::fmt::{Display, Formatter};

/// Error type shared by basis construction and evaluation.
///
/// Construction errors abort the creation of a basis entirely. Evaluation errors only abort the
/// offending call, and the basis remains usable for other requests.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum BasisError {
    /// The requested basis configuration is not supported, e.g. an order beyond the configured
    /// maximum.
    Configuration { reason: String },
    /// The numerical rank of the ambient embedding does not match the dimension of the space.
    NumericalRank { expected: usize, found: usize },
    /// Factorization or inversion of a generalized Vandermonde matrix failed.
    Factorization { reason: String },
    /// The operator is not defined for the function space in the given dimension, or not
    /// implemented by the basis.
    UnsupportedOperator {
        operator: Operator,
        function_space: FunctionSpace,
        dimension: usize,
    },
    /// The requested evaluation mode is not implemented.
    NotImplemented { feature: &'static str },
    /// No quadrature rule of sufficient strength is available.
    Quadrature(fenris_quadrature::Error),
}

impl BasisError {
    pub(crate) fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration { reason: reason.into() }
    }

    pub(crate) fn factorization(reason: impl Into<String>) -> Self {
        Self::Factorization { reason: reason.into() }
    }
}

impl Display for BasisError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration { reason } => write!(f, "invalid basis configuration: {reason}"),
            Self::NumericalRank { expected, found } => write!(
                f,
                "numerical rank of ambient embedding is {found}, but the space has dimension {expected}"
            ),
            Self::Factorization { reason } => write!(f, "factorization failed: {reason}"),
            Self::UnsupportedOperator {
                operator,
                function_space,
                dimension,
            } => write!(
                f,
                "operator {operator} is not supported for {function_space} bases in dimension {dimension}"
            ),
            Self::NotImplemented { feature } => write!(f, "{feature} is not implemented"),
            Self::Quadrature(err) => write!(f, "quadrature unavailable: {err}"),
        }
    }
}

impl Error for BasisError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Quadrature(err) => Some(err),
            _ => None,
        }
    }
}

impl From<fenris_quadrature::Error> for BasisError {
    fn from(err: fenris_quadrature::Error) -> Self {
        Self::Quadrature(err)
    }
}
