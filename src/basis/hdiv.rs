use crate::basis::hcurl::weighted_moments;
use crate::basis::ReferenceBasis;
use crate::construction::{
    construct_basis, coordinate_directions, AmbientExpansion, ConstructionSettings, DofFunctionals,
};
use crate::error::BasisError;
use crate::lattice::{lattice, subcell_lattice};
use crate::operator::{FunctionSpace, Operator};
use crate::polynomials::num_polynomials;
use crate::tags::DofTags;
use crate::topology::CellTopology;
use crate::Real;
use nalgebra::{DMatrix, DMatrixView};

const LABEL: &str = "H(div) tetrahedron";

/// Raviart-Thomas-Nédélec basis of arbitrary order for `H(div)` on the reference tetrahedron.
///
/// The space of order `n` is `P_{n-1}^3 + x P~_{n-1}`. Its degrees of freedom are normal
/// components at the interior lattice points of every face and all three components at the
/// interior lattice points of the cell, for lattices of order `n + 2`. Face normals are not
/// normalized.
#[derive(Debug, Clone)]
pub struct HDivTetIn<T: Real> {
    degree: usize,
    expansion: AmbientExpansion<T>,
    dof_coords: DMatrix<T>,
    dof_coeffs: DMatrix<T>,
    tags: DofTags,
}

impl<T: Real> HDivTetIn<T> {
    /// Dimension of the space of the given order.
    pub fn cardinality_for_order(order: usize) -> usize {
        order * (order + 1) * (order + 3) / 2
    }

    pub fn new(order: usize) -> Result<Self, BasisError> {
        Self::with_settings(order, &ConstructionSettings::default())
    }

    pub fn with_settings(order: usize, settings: &ConstructionSettings) -> Result<Self, BasisError> {
        settings.check_order(LABEL, order, 1)?;
        let topology = CellTopology::Tetrahedron;
        let n = order;
        let embedding = div_embedding::<T>(n)?;

        let family = settings.point_family;
        let mut functionals = DofFunctionals::new(topology, n, 3);
        for face in 0..topology.num_faces() {
            let points = subcell_lattice(topology, 2, face, n + 2, 1, family);
            functionals.push_subcell(2, face, &points, &[topology.face_normal(face)]);
        }
        let interior_points = lattice(topology, n + 2, 1, family);
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

    pub fn coeffs(&self) -> &DMatrix<T> {
        self.expansion.coeffs()
    }
}

/// The embedding of the Raviart-Thomas-Nédélec space into vector polynomials of degree `n`.
fn div_embedding<T: Real>(n: usize) -> Result<DMatrix<T>, BasisError> {
    let num_ambient = num_polynomials(3, n);
    let num_lower = num_polynomials(3, n - 1);
    let num_homogeneous = num_lower - if n >= 2 { num_polynomials(3, n - 2) } else { 0 };

    let mut embedding = DMatrix::zeros(3 * num_ambient, 3 * num_lower + num_homogeneous);
    for d in 0..3 {
        for i in 0..num_lower {
            embedding[(i + d * num_ambient, i + d * num_lower)] = T::one();
        }
    }

    let moments = weighted_moments::<T>(n)?;
    for (d, moment) in moments.iter().enumerate() {
        embedding
            .view_mut((d * num_ambient, 3 * num_lower), (num_ambient, num_homogeneous))
            .copy_from(moment);
    }
    Ok(embedding)
}

impl<T: Real> ReferenceBasis<T> for HDivTetIn<T> {
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
        FunctionSpace::HDiv
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
        matches!(operator, Operator::Value | Operator::Div)
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
        assert_eq!(operator, Operator::Div, "unsupported operator {operator}");
        let tabulator = self.expansion.tabulator(1);
        let jet_len = tabulator.jet_len();
        let jets = tabulator.tabulate_point(point, scratch);
        values.fill(T::zero());
        for d in 0..3 {
            self.expansion
                .accumulate(jets, jet_len, 1 + d, d, T::one(), values, 1, 0);
        }
    }
}
