//! Construction of nodal bases from an orthonormal ambient basis.
//!
//! A basis is constructed in three steps:
//!
//! 1. An embedding matrix `V1` whose columns span the target space within the (vector-valued)
//!    orthonormal polynomials of the ambient degree. Its singular value decomposition yields an
//!    orthonormal basis `U` of the target space.
//! 2. A functional matrix `V2` whose rows apply the degrees of freedom to the ambient
//!    polynomials. Every degree of freedom is a point evaluation of the component along a
//!    direction (a tangent, a normal or a coordinate axis).
//! 3. The generalized Vandermonde matrix `V2 U` is inverted, and `U (V2 U)^-1` expresses the
//!    dual basis in the ambient basis.
use crate::error::BasisError;
use crate::lattice::PointFamily;
use crate::linalg::{column_space, lu_inverse};
use crate::polynomials::OrthonormalTabulator;
use crate::tags::{DofTag, DofTags};
use crate::topology::CellTopology;
use crate::Real;
use log::{debug, warn};
use nalgebra::{convert, DMatrix, DVector};
use serde::{Deserialize, Serialize};

/// The default maximum polynomial order accepted by constructed bases.
pub const DEFAULT_MAX_ORDER: usize = 20;

/// Pivot ratios below this value trigger a warning about the conditioning of the Vandermonde
/// matrix.
const PIVOT_RATIO_WARNING: f64 = 1e-10;

/// Settings that control basis construction.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstructionSettings {
    /// Distribution of the nodes of point-evaluation degrees of freedom.
    pub point_family: PointFamily,
    /// Orders above this value are rejected before any numerical work.
    pub max_order: usize,
    /// Singular values of the embedding above this value count towards its rank.
    pub rank_tolerance: f64,
    /// Log singular values and pivot ratios of every construction.
    pub diagnostics: bool,
}

impl Default for ConstructionSettings {
    fn default() -> Self {
        Self {
            point_family: PointFamily::default(),
            max_order: DEFAULT_MAX_ORDER,
            rank_tolerance: 1000.0 * f64::EPSILON,
            diagnostics: false,
        }
    }
}

impl ConstructionSettings {
    pub fn with_point_family(self, point_family: PointFamily) -> Self {
        Self { point_family, ..self }
    }

    pub fn with_max_order(self, max_order: usize) -> Self {
        Self { max_order, ..self }
    }

    pub fn with_rank_tolerance(self, rank_tolerance: f64) -> Self {
        Self { rank_tolerance, ..self }
    }

    pub fn with_diagnostics(self, diagnostics: bool) -> Self {
        Self { diagnostics, ..self }
    }

    /// Checks that `order` lies in `[min_order, max_order]`.
    pub(crate) fn check_order(&self, family: &str, order: usize, min_order: usize) -> Result<(), BasisError> {
        if order < min_order {
            Err(BasisError::configuration(format!(
                "{family} bases require order at least {min_order}, got {order}"
            )))
        } else if order > self.max_order {
            Err(BasisError::configuration(format!(
                "order {order} exceeds the maximum supported order {} for {family} bases",
                self.max_order
            )))
        } else {
            Ok(())
        }
    }
}

/// Accumulates the rows of the functional matrix together with the degree of freedom data.
#[derive(Debug)]
pub(crate) struct DofFunctionals<T> {
    num_components: usize,
    tabulator: OrthonormalTabulator<T>,
    scratch: Vec<T>,
    rows: Vec<Vec<T>>,
    coords: Vec<DVector<T>>,
    directions: Vec<DVector<T>>,
    tags: Vec<DofTag>,
}

impl<T: Real> DofFunctionals<T> {
    /// Functionals on fields with `num_components` components of polynomials of the given
    /// ambient degree.
    pub fn new(topology: CellTopology, ambient_degree: usize, num_components: usize) -> Self {
        let tabulator = OrthonormalTabulator::new(topology, ambient_degree, 0);
        Self {
            num_components,
            scratch: vec![T::zero(); tabulator.scratch_len()],
            tabulator,
            rows: Vec::new(),
            coords: Vec::new(),
            directions: Vec::new(),
            tags: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Appends the functional `v -> direction . v(point)`.
    pub fn push(&mut self, point: &DVector<T>, direction: &DVector<T>, tag: DofTag) {
        assert_eq!(direction.len(), self.num_components);
        let n = self.tabulator.num_polynomials();
        let phi = self.tabulator.tabulate_point(point.as_slice(), &mut self.scratch);
        let mut row = vec![T::zero(); n * self.num_components];
        for (d, &direction_d) in direction.iter().enumerate() {
            for (entry, &phi_k) in row[d * n..(d + 1) * n].iter_mut().zip(phi) {
                *entry = direction_d * phi_k;
            }
        }
        self.rows.push(row);
        self.coords.push(point.clone());
        self.directions.push(direction.clone());
        self.tags.push(tag);
    }

    /// Appends one functional per point and direction on a subcell.
    ///
    /// Degrees of freedom are grouped by point, so the local index is
    /// `point_index * directions.len() + direction_index`.
    pub fn push_subcell(
        &mut self,
        subcell_dim: usize,
        subcell_ordinal: usize,
        points: &DMatrix<T>,
        directions: &[DVector<T>],
    ) {
        let count = points.ncols() * directions.len();
        for (j, point) in points.column_iter().enumerate() {
            let point = point.clone_owned();
            for (m, direction) in directions.iter().enumerate() {
                let tag = DofTag::new(subcell_dim, subcell_ordinal, j * directions.len() + m, count);
                self.push(&point, direction, tag);
            }
        }
    }
}

/// Unit coordinate directions of the given dimension.
pub(crate) fn coordinate_directions<T: Real>(dim: usize) -> Vec<DVector<T>> {
    (0..dim)
        .map(|d| DVector::from_fn(dim, |i, _| if i == d { T::one() } else { T::zero() }))
        .collect()
}

/// The result of a successful construction.
#[derive(Debug, Clone)]
pub(crate) struct ConstructedBasis<T> {
    /// Ambient coefficients, one column per basis function.
    pub coeffs: DMatrix<T>,
    pub dof_coords: DMatrix<T>,
    pub dof_coeffs: DMatrix<T>,
    pub tags: DofTags,
}

fn columns_to_matrix<T: Real>(columns: &[DVector<T>], nrows: usize) -> DMatrix<T> {
    DMatrix::from_fn(nrows, columns.len(), |i, j| columns[j][i])
}

/// Computes the dual basis of the functionals within the column space of the embedding.
pub(crate) fn construct_basis<T: Real>(
    label: &str,
    embedding: DMatrix<T>,
    functionals: DofFunctionals<T>,
    cardinality: usize,
    settings: &ConstructionSettings,
) -> Result<ConstructedBasis<T>, BasisError> {
    assert_eq!(
        functionals.len(),
        cardinality,
        "Internal error: number of functionals must match cardinality"
    );
    let space = column_space(embedding, convert(settings.rank_tolerance))?;
    if settings.diagnostics {
        debug!("{label}: singular values of embedding {:?}", space.singular_values);
    }
    if space.basis.ncols() != cardinality {
        return Err(BasisError::NumericalRank {
            expected: cardinality,
            found: space.basis.ncols(),
        });
    }

    let DofFunctionals {
        num_components,
        tabulator,
        rows,
        coords,
        directions,
        tags,
        ..
    } = functionals;
    let ambient_dim = num_components * tabulator.num_polynomials();
    let functional_matrix = DMatrix::from_fn(cardinality, ambient_dim, |i, j| rows[i][j]);

    let vandermonde = &functional_matrix * &space.basis;
    let inverse = lu_inverse(vandermonde)?;
    if settings.diagnostics {
        debug!("{label}: Vandermonde pivot ratio {:?}", inverse.pivot_ratio);
    }
    if inverse.pivot_ratio < convert::<f64, T>(PIVOT_RATIO_WARNING) {
        warn!(
            "{label}: Vandermonde matrix is badly conditioned (pivot ratio {:?})",
            inverse.pivot_ratio
        );
    }

    let coeffs = space.basis * inverse.inverse;
    debug!("{label}: constructed basis with cardinality {cardinality}");

    let dim = tabulator.topology().dimension();
    Ok(ConstructedBasis {
        coeffs,
        dof_coords: columns_to_matrix(&coords, dim),
        dof_coeffs: columns_to_matrix(&directions, num_components),
        tags: DofTags::from_tags(tags),
    })
}

/// A basis given by its coefficients in the (vector-valued) orthonormal ambient basis.
///
/// Holds tabulators for every derivative order the basis supports.
#[derive(Debug, Clone)]
pub(crate) struct AmbientExpansion<T> {
    coeffs: DMatrix<T>,
    tabulators: Vec<OrthonormalTabulator<T>>,
}

impl<T: Real> AmbientExpansion<T> {
    pub fn new(topology: CellTopology, degree: usize, max_derivative_order: usize, coeffs: DMatrix<T>) -> Self {
        let tabulators = (0..=max_derivative_order)
            .map(|k| OrthonormalTabulator::new(topology, degree, k))
            .collect();
        Self { coeffs, tabulators }
    }

    pub fn coeffs(&self) -> &DMatrix<T> {
        &self.coeffs
    }

    pub fn tabulator(&self, derivative_order: usize) -> &OrthonormalTabulator<T> {
        &self.tabulators[derivative_order]
    }

    /// Accumulates `scale * sum_k coeffs[(block * n + k, i)] * jet_k[entry]` into
    /// `values[i * stride + offset]` for every basis function `i`.
    #[allow(clippy::too_many_arguments)]
    pub fn accumulate(
        &self,
        jets: &[T],
        jet_len: usize,
        entry: usize,
        block: usize,
        scale: T,
        values: &mut [T],
        stride: usize,
        offset: usize,
    ) {
        let n = jets.len() / jet_len;
        let nrows = self.coeffs.nrows();
        for (i, column) in self.coeffs.as_slice().chunks_exact(nrows).enumerate() {
            let block_coeffs = &column[block * n..(block + 1) * n];
            let sum = block_coeffs
                .iter()
                .zip(jets.chunks_exact(jet_len))
                .fold(T::zero(), |acc, (&c, jet)| acc + c * jet[entry]);
            values[i * stride + offset] += scale * sum;
        }
    }
}
