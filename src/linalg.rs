//! Dense factorizations used during basis construction.
use crate::error::BasisError;
use crate::Real;
use nalgebra::{convert, DMatrix};
use std::cmp::Ordering;

/// Orthonormal basis for the numerical column space of a matrix.
#[derive(Debug, Clone)]
pub struct ColumnSpace<T> {
    /// Left singular vectors whose singular values exceed the tolerance.
    pub basis: DMatrix<T>,
    /// All singular values in descending order.
    pub singular_values: Vec<T>,
}

/// Computes an orthonormal basis for the column space of `matrix` with a singular value
/// decomposition.
///
/// Singular vectors are ordered by descending singular value, and those with singular values
/// above `tolerance` are retained.
pub fn column_space<T: Real>(matrix: DMatrix<T>, tolerance: T) -> Result<ColumnSpace<T>, BasisError> {
    let svd = matrix
        .try_svd(true, false, T::default_epsilon(), 0)
        .ok_or_else(|| BasisError::factorization("singular value decomposition did not converge"))?;
    let u = svd
        .u
        .ok_or_else(|| BasisError::factorization("singular value decomposition produced no singular vectors"))?;
    let sigma = svd.singular_values;

    let mut order: Vec<usize> = (0..sigma.len()).collect();
    order.sort_by(|&i, &j| sigma[j].partial_cmp(&sigma[i]).unwrap_or(Ordering::Equal));
    let rank = order.iter().take_while(|&&i| sigma[i] > tolerance).count();

    Ok(ColumnSpace {
        basis: u.select_columns(&order[..rank]),
        singular_values: order.iter().map(|&i| sigma[i]).collect(),
    })
}

/// Inverse of a square matrix computed by LU factorization with partial pivoting.
#[derive(Debug, Clone)]
pub struct LuInverse<T> {
    pub inverse: DMatrix<T>,
    /// Ratio of the smallest to the largest pivot magnitude.
    pub pivot_ratio: T,
}

/// Inverts a square matrix.
///
/// Fails if the factorization has a zero pivot, or if the pivots span more than the working
/// precision so that the matrix is singular to machine precision.
///
/// # Panics
///
/// Panics if the matrix is not square.
pub fn lu_inverse<T: Real>(matrix: DMatrix<T>) -> Result<LuInverse<T>, BasisError> {
    assert!(matrix.is_square(), "only square matrices can be inverted");
    let n = matrix.nrows();
    let lu = matrix.lu();

    let pivots = lu.u().diagonal().map(|u_ii| u_ii.abs());
    let max_pivot = pivots.max();
    let min_pivot = pivots.min();
    if n > 0 && !(min_pivot > T::zero()) {
        return Err(BasisError::factorization("matrix is singular"));
    }
    let pivot_ratio = if n > 0 { min_pivot / max_pivot } else { T::one() };
    if pivot_ratio <= T::default_epsilon() * convert::<f64, T>(n as f64) {
        return Err(BasisError::factorization(format!(
            "matrix is singular to working precision (pivot ratio {pivot_ratio:?})"
        )));
    }

    let inverse = lu
        .try_inverse()
        .ok_or_else(|| BasisError::factorization("LU factors could not be inverted"))?;
    Ok(LuInverse { inverse, pivot_ratio })
}
