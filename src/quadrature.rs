//! Quadrature rules on reference cells in the working precision.
use crate::error::BasisError;
use crate::topology::CellTopology;
use crate::Real;
use fenris_quadrature::simplex;
use fenris_quadrature::Rule;
use nalgebra::{convert, DMatrix};

/// Quadrature weights and points, the points being the columns of the matrix.
pub type QuadraturePair<T> = (Vec<T>, DMatrix<T>);

/// Returns a rule on the reference cell that integrates polynomials of total degree up to
/// `strength` exactly.
pub fn cubature<T: Real>(topology: CellTopology, strength: usize) -> Result<QuadraturePair<T>, BasisError> {
    let pair = match topology {
        CellTopology::Line => convert_rule(simplex::segment(strength)?),
        CellTopology::Triangle => convert_rule(simplex::triangle(strength)?),
        CellTopology::Tetrahedron => convert_rule(simplex::tetrahedron(strength)?),
    };
    Ok(pair)
}

fn convert_rule<T: Real, const D: usize>((weights, points): Rule<D>) -> QuadraturePair<T> {
    let weights = weights.into_iter().map(convert).collect();
    let points = DMatrix::from_fn(D, points.len(), |i, j| convert(points[j][i]));
    (weights, points)
}
