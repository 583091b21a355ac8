use crate::basis::ReferenceBasis;
use crate::construction::{
    construct_basis, coordinate_directions, AmbientExpansion, ConstructionSettings, DofFunctionals,
};
use crate::error::BasisError;
use crate::lattice::{lattice, subcell_lattice};
use crate::operator::{FunctionSpace, Operator};
use crate::polynomials::{num_polynomials, tabulate};
use crate::quadrature::cubature;
use crate::tags::DofTags;
use crate::topology::CellTopology;
use crate::Real;
use nalgebra::{DMatrix, DMatrixView};

const LABEL: &str = "H(curl) tetrahedron";

/// Nédélec (first kind) basis of arbitrary order for `H(curl)` on the reference tetrahedron.
///
/// The space of order `n` is `P_{n-1}^3 + x cross P~_{n-1}^3`, where `P~_{n-1}` denotes
/// homogeneous polynomials of degree `n - 1`. Its degrees of freedom are tangential components
/// at the interior lattice points of every edge, the two face tangent components at the interior
/// lattice points of every face, and all three components at the interior lattice points of the
/// cell. Lattices have order `n + 1`.
#[derive(Debug, Clone)]
pub struct HCurlTetIn<T: Real> {
    degree: usize,
    expansion: AmbientExpansion<T>,
    dof_coords: DMatrix<T>,
    dof_coeffs: DMatrix<T>,
    tags: DofTags,
}

impl<T: Real> HCurlTetIn<T> {
    /// Dimension of the space of the given order.
    pub fn cardinality_for_order(order: usize) -> usize {
        order * (order + 2) * (order + 3) / 2
    }

    pub fn new(order: usize) -> Result<Self, BasisError> {
        Self::with_settings(order, &ConstructionSettings::default())
    }

    pub fn with_settings(order: usize, settings: &ConstructionSettings) -> Result<Self, BasisError> {
        settings.check_order(LABEL, order, 1)?;
        let topology = CellTopology::Tetrahedron;
        let n = order;
        let embedding = curl_embedding::<T>(n)?;

        let family = settings.point_family;
        let mut functionals = DofFunctionals::new(topology, n, 3);
        for edge in 0..topology.num_edges() {
            let points = subcell_lattice(topology, 1, edge, n + 1, 1, family);
            functionals.push_subcell(1, edge, &points, &[topology.edge_tangent(edge)]);
        }
        for face in 0..topology.num_faces() {
            let points = subcell_lattice(topology, 2, face, n + 1, 1, family);
            let (t1, t2) = topology.face_tangents(face);
            functionals.push_subcell(2, face, &points, &[t1, t2]);
        }
        let interior_points = lattice(topology, n + 1, 1, family);
        functionals.push_subcell(3, 0, &interior_points, &coordinate_directions(3));

        let cardinality = Self::cardinality_for_order(n);
        let label = format!("{LABEL} (order {n})");
        let constructed = construct_basis(&label, embedding, functionals, cardinality, settings)?;
        Ok(Self {
            degree: n,
            expansion: AmbientExpansion::new(topology, n, 1, constructed.coeffs),
            dof_coords: constructed.dof_coords,
            dof_coeffs: constructed.dof_coeffs,
            tags: constructed.tags,
        })
    }

    /// Coefficients of the basis functions in the vector-valued orthonormal basis of degree
    /// `n`, one column per basis function.
    pub fn coeffs(&self) -> &DMatrix<T> {
        self.expansion.coeffs()
    }
}

/// Integrals of `x_d psi_j phi_i` for every ambient polynomial `phi_i` and every homogeneous
/// polynomial `psi_j` of degree `n - 1`, for each coordinate direction `d`.
pub(crate) fn weighted_moments<T: Real>(n: usize) -> Result<[DMatrix<T>; 3], BasisError> {
    let topology = CellTopology::Tetrahedron;
    let num_lower = if n >= 2 { num_polynomials(3, n - 2) } else { 0 };
    let num_homogeneous = num_polynomials(3, n - 1) - num_lower;
    let (weights, points) = cubature::<T>(topology, 2 * n)?;
    let phi = tabulate(topology, n, Operator::Value, &points)?;
    let psi = phi.rows(num_lower, num_homogeneous);

    let moment = |d: usize| {
        let mut weighted_psi = psi.clone_owned();
        for (q, mut column) in weighted_psi.column_iter_mut().enumerate() {
            column *= weights[q] * points[(d, q)];
        }
        &phi * weighted_psi.transpose()
    };
    Ok([moment(0), moment(1), moment(2)])
}

/// The embedding of the Nédélec space into vector polynomials of degree `n`.
///
/// The first `3 dim(P_{n-1})` columns embed `P_{n-1}^3` component-wise. The remaining columns
/// hold `e_k cross (x psi_j)` for every homogeneous `psi_j`, grouped by `k`.
fn curl_embedding<T: Real>(n: usize) -> Result<DMatrix<T>, BasisError> {
    let num_ambient = num_polynomials(3, n);
    let num_lower = num_polynomials(3, n - 1);
    let num_homogeneous = num_lower - if n >= 2 { num_polynomials(3, n - 2) } else { 0 };

    let mut embedding = DMatrix::zeros(3 * num_ambient, 3 * num_lower + 3 * num_homogeneous);
    for d in 0..3 {
        for i in 0..num_lower {
            embedding[(i + d * num_ambient, i + d * num_lower)] = T::one();
        }
    }

    let moments = weighted_moments::<T>(n)?;
    let shape = (num_ambient, num_homogeneous);
    for (d, moment) in moments.iter().enumerate() {
        let d1 = (d + 1) % 3;
        let d2 = (d + 2) % 3;
        embedding
            .view_mut((d2 * num_ambient, 3 * num_lower + d1 * num_homogeneous), shape)
            .copy_from(&(-moment));
        embedding
            .view_mut((d1 * num_ambient, 3 * num_lower + d2 * num_homogeneous), shape)
            .copy_from(moment);
    }
    Ok(embedding)
}

impl<T: Real> ReferenceBasis<T> for HCurlTetIn<T> {
    fn cardinality(&self) -> usize {
        self.tags.len()
    }

    fn degree(&self) -> usize {
        self.degree
    }

    fn cell_topology(&self) -> CellTopology {
        CellTopology::Tetrahedron
    }

    fn function_space(&self) -> FunctionSpace {
        FunctionSpace::HCurl
    }

    fn dof_tags(&self) -> &DofTags {
        &self.tags
    }

    fn dof_coords(&self) -> DMatrixView<T> {
        DMatrixView::from(&self.dof_coords)
    }

    fn dof_coeffs(&self) -> DMatrixView<T> {
        DMatrixView::from(&self.dof_coeffs)
    }

    fn implements_operator(&self, operator: Operator) -> bool {
        matches!(operator, Operator::Value | Operator::Curl)
    }

    fn scratch_len(&self, operator: Operator) -> usize {
        self.expansion
            .tabulator(operator.derivative_order().min(1))
            .scratch_len()
    }

    fn evaluate_value_at(&self, point: &[T], values: &mut [T], scratch: &mut [T]) {
        let tabulator = self.expansion.tabulator(0);
        let jets = tabulator.tabulate_point(point, scratch);
        values.fill(T::zero());
        for d in 0..3 {
            self.expansion
                .accumulate(jets, tabulator.jet_len(), 0, d, T::one(), values, 3, d);
        }
    }

    fn evaluate_derivative_at(&self, operator: Operator, point: &[T], values: &mut [T], scratch: &mut [T]) {
        assert_eq!(operator, Operator::Curl, "unsupported operator {operator}");
        let tabulator = self.expansion.tabulator(1);
        let jet_len = tabulator.jet_len();
        let jets = tabulator.tabulate_point(point, scratch);
        values.fill(T::zero());
        // First derivatives follow the value in each jet
        let partial = |d: usize| 1 + d;
        for d in 0..3 {
            let d1 = (d + 1) % 3;
            let d2 = (d + 2) % 3;
            self.expansion
                .accumulate(jets, jet_len, partial(d1), d2, T::one(), values, 3, d);
            self.expansion
                .accumulate(jets, jet_len, partial(d2), d1, -T::one(), values, 3, d);
        }
    }
}
