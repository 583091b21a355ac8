//! Lattices of points on reference cells.
//!
//! Lattice points are enumerated by barycentric index tuples `(l_0, ..., l_d)` summing to the
//! lattice order, where every entry is at least the offset. An offset of one therefore removes
//! the boundary of the cell, which is how nodes on the interior of edges, faces and cells are
//! obtained.
use crate::operator::num_partial_derivatives_up_to;
use crate::topology::CellTopology;
use crate::Real;
use fenris_quadrature::univariate::try_gauss_lobatto;
use nalgebra::{convert, DMatrix};
use serde::{Deserialize, Serialize};

/// The distribution of lattice points.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointFamily {
    /// Points at equispaced barycentric coordinates.
    #[default]
    Equispaced,
    /// Equispaced points warped so that every edge carries Gauss-Lobatto-Legendre points.
    WarpBlend,
}

/// The number of points in a lattice of the given order and offset.
pub fn lattice_size(topology: CellTopology, order: usize, offset: usize) -> usize {
    let d = topology.dimension();
    match order.checked_sub((d + 1) * offset) {
        Some(effective_order) => num_partial_derivatives_up_to(effective_order, d),
        None => 0,
    }
}

/// Barycentric index tuples of a lattice, with unused trailing entries set to zero.
///
/// The first entry belongs to vertex 0. Points are ordered with the index of the last vertex
/// varying slowest and that of vertex 1 varying fastest.
fn barycentric_indices(dim: usize, order: usize, offset: usize) -> Vec<[usize; 4]> {
    let mut indices = Vec::new();
    match dim {
        1 => {
            if order >= 2 * offset {
                for i in offset..=order - offset {
                    indices.push([order - i, i, 0, 0]);
                }
            }
        }
        2 => {
            for j in offset..=order {
                for i in offset..=order - j {
                    if order - i - j >= offset {
                        indices.push([order - i - j, i, j, 0]);
                    }
                }
            }
        }
        3 => {
            for k in offset..=order {
                for j in offset..=order - k {
                    for i in offset..=order - j - k {
                        if order - i - j - k >= offset {
                            indices.push([order - i - j - k, i, j, k]);
                        }
                    }
                }
            }
        }
        _ => unreachable!("reference cells have dimension 1, 2 or 3"),
    }
    indices
}

/// One-dimensional warp function mapping equispaced points on `[-1, 1]` to
/// Gauss-Lobatto-Legendre points.
#[derive(Debug, Clone)]
struct EdgeWarp {
    equispaced: Vec<f64>,
    displacement: Vec<f64>,
}

impl EdgeWarp {
    fn new(order: usize) -> Self {
        let equispaced: Vec<f64> = (0..=order)
            .map(|i| -1.0 + 2.0 * i as f64 / order as f64)
            .collect();
        let (_, gll) = try_gauss_lobatto(order + 1).expect("Internal error: order + 1 >= 2 points must be available");
        let displacement = gll
            .iter()
            .zip(&equispaced)
            .map(|([x_gll], x_eq)| x_gll - x_eq)
            .collect();
        Self {
            equispaced,
            displacement,
        }
    }

    /// Interpolates the displacement at `r`.
    fn evaluate(&self, r: f64) -> f64 {
        let nodes = &self.equispaced;
        let mut result = 0.0;
        for (i, (&x_i, &d_i)) in nodes.iter().zip(&self.displacement).enumerate() {
            let lagrange: f64 = nodes
                .iter()
                .enumerate()
                .filter(|&(j, _)| j != i)
                .map(|(_, &x_j)| (r - x_j) / (x_i - x_j))
                .product();
            result += d_i * lagrange;
        }
        result
    }

    /// Warps barycentric coordinates along every edge of the simplex.
    ///
    /// Each edge contributes a displacement blended by `4 l_a l_c / (1 - r^2)`, which equals one
    /// on the edge itself and vanishes on the faces opposite to its endpoints.
    fn warp_barycentric(&self, lambda: &mut [f64]) {
        let original = lambda.to_vec();
        for a in 0..original.len() {
            for c in a + 1..original.len() {
                let r = original[c] - original[a];
                if r.abs() < 1.0 - 1e-10 {
                    let shift = 4.0 * original[a] * original[c] * self.evaluate(r) / (1.0 - r * r);
                    lambda[c] += 0.5 * shift;
                    lambda[a] -= 0.5 * shift;
                }
            }
        }
    }
}

/// Generates a lattice of points on a reference cell.
///
/// Returns a matrix whose columns are the points. See [`lattice_size`] for the number of points.
///
/// # Panics
///
/// Panics if `order` is zero.
pub fn lattice<T: Real>(topology: CellTopology, order: usize, offset: usize, family: PointFamily) -> DMatrix<T> {
    assert!(order > 0, "lattice order must be positive");
    let dim = topology.dimension();
    let indices = barycentric_indices(dim, order, offset);
    debug_assert_eq!(indices.len(), lattice_size(topology, order, offset));

    let warp = match family {
        PointFamily::Equispaced => None,
        PointFamily::WarpBlend => Some(EdgeWarp::new(order)),
    };

    let mut points = DMatrix::zeros(dim, indices.len());
    let mut lambda = vec![0.0; dim + 1];
    for (mut column, index) in points.column_iter_mut().zip(&indices) {
        for (l, &i) in lambda.iter_mut().zip(index) {
            *l = i as f64 / order as f64;
        }
        if let Some(warp) = &warp {
            warp.warp_barycentric(&mut lambda);
        }
        for (v, &l) in lambda.iter().enumerate() {
            for (x, &vertex_x) in column.iter_mut().zip(topology.vertex(v)) {
                *x += convert::<f64, T>(l * vertex_x);
            }
        }
    }
    points
}

/// Generates a lattice on a subcell of positive dimension and maps it into the cell.
///
/// # Panics
///
/// Panics if `subcell_dim` is zero or the subcell does not exist.
pub fn subcell_lattice<T: Real>(
    topology: CellTopology,
    subcell_dim: usize,
    subcell_ordinal: usize,
    order: usize,
    offset: usize,
    family: PointFamily,
) -> DMatrix<T> {
    let subcell_topology =
        CellTopology::from_dimension(subcell_dim).expect("subcell lattices require a subcell of positive dimension");
    let params = lattice::<T>(subcell_topology, order, offset, family);
    let mut points = DMatrix::zeros(topology.dimension(), params.ncols());
    for (mut column, param) in points.column_iter_mut().zip(params.column_iter()) {
        let param: Vec<T> = param.iter().copied().collect();
        let mapped = topology.map_from_subcell(subcell_dim, subcell_ordinal, &param);
        column.copy_from(&mapped);
    }
    points
}
