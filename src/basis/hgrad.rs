use crate::basis::ReferenceBasis;
use crate::construction::{construct_basis, AmbientExpansion, ConstructionSettings, DofFunctionals};
use crate::error::BasisError;
use crate::lattice::{lattice, subcell_lattice};
use crate::operator::{num_partial_derivatives, FunctionSpace, Operator, MAX_DERIVATIVE_ORDER};
use crate::polynomials::num_polynomials;
use crate::tags::DofTags;
use crate::topology::CellTopology;
use crate::Real;
use nalgebra::{DMatrix, DMatrixView, DVector};

/// Nodal Lagrange basis of arbitrary order for `H(grad)` on the reference line, triangle or
/// tetrahedron.
///
/// Nodes are ordered by subcell: vertices, then the interior lattice points of edges, faces and
/// the cell, each for a lattice of order `n`.
#[derive(Debug, Clone)]
pub struct HGradCn<T: Real> {
    topology: CellTopology,
    degree: usize,
    expansion: AmbientExpansion<T>,
    dof_coords: DMatrix<T>,
    dof_coeffs: DMatrix<T>,
    tags: DofTags,
}

impl<T: Real> HGradCn<T> {
    pub fn new(topology: CellTopology, order: usize) -> Result<Self, BasisError> {
        Self::with_settings(topology, order, &ConstructionSettings::default())
    }

    pub fn with_settings(
        topology: CellTopology,
        order: usize,
        settings: &ConstructionSettings,
    ) -> Result<Self, BasisError> {
        let label = format!("H(grad) {topology:?}");
        settings.check_order(&label, order, 1)?;
        let n = order;
        let dim = topology.dimension();
        let cardinality = num_polynomials(dim, n);
        let embedding = DMatrix::identity(cardinality, cardinality);

        let family = settings.point_family;
        let one = [DVector::from_element(1, T::one())];
        let mut functionals = DofFunctionals::new(topology, n, 1);
        for vertex in 0..topology.num_vertices() {
            let point = DMatrix::from_column_slice(dim, 1, topology.vertex_vector::<T>(vertex).as_slice());
            functionals.push_subcell(0, vertex, &point, &one);
        }
        for subcell_dim in 1..dim {
            for ordinal in 0..topology.num_subcells(subcell_dim) {
                let points = subcell_lattice(topology, subcell_dim, ordinal, n, 1, family);
                functionals.push_subcell(subcell_dim, ordinal, &points, &one);
            }
        }
        let interior_points = lattice(topology, n, 1, family);
        functionals.push_subcell(dim, 0, &interior_points, &one);

        let label = format!("{label} (order {n})");
        let constructed = construct_basis(&label, embedding, functionals, cardinality, settings)?;
        let max_derivative_order = n.min(MAX_DERIVATIVE_ORDER);
        Ok(Self {
            topology,
            degree: n,
            expansion: AmbientExpansion::new(topology, n, max_derivative_order, constructed.coeffs),
            dof_coords: constructed.dof_coords,
            dof_coeffs: constructed.dof_coeffs,
            tags: constructed.tags,
        })
    }

    pub fn coeffs(&self) -> &DMatrix<T> {
        self.expansion.coeffs()
    }

    /// Accumulates all partial derivatives of order `k` into `values`.
    fn evaluate_dk(&self, k: usize, point: &[T], values: &mut [T], scratch: &mut [T]) {
        let num_components = num_partial_derivatives(k, self.topology.dimension());
        if k > self.degree {
            return;
        }
        let tabulator = self.expansion.tabulator(k);
        let offset = tabulator.derivative_offset(k);
        let jets = tabulator.tabulate_point(point, scratch);
        for c in 0..num_components {
            self.expansion
                .accumulate(jets, tabulator.jet_len(), offset + c, 0, T::one(), values, num_components, c);
        }
    }
}

impl<T: Real> ReferenceBasis<T> for HGradCn<T> {
    fn cardinality(&self) -> usize {
        self.tags.len()
    }

    fn degree(&self) -> usize {
        self.degree
    }

    fn cell_topology(&self) -> CellTopology {
        self.topology
    }

    fn function_space(&self) -> FunctionSpace {
        FunctionSpace::HGrad
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

    fn implements_operator(&self, _operator: Operator) -> bool {
        true
    }

    fn scratch_len(&self, operator: Operator) -> usize {
        let k = operator.derivative_order();
        if k > self.degree {
            0
        } else {
            self.expansion.tabulator(k).scratch_len()
        }
    }

    fn evaluate_value_at(&self, point: &[T], values: &mut [T], scratch: &mut [T]) {
        values.fill(T::zero());
        self.evaluate_dk(0, point, values, scratch);
    }

    fn evaluate_derivative_at(&self, operator: Operator, point: &[T], values: &mut [T], scratch: &mut [T]) {
        values.fill(T::zero());
        match (operator, self.topology.dimension()) {
            (Operator::Curl, 2) => {
                // Rotated gradient (d/dy, -d/dx)
                let tabulator = self.expansion.tabulator(1);
                let jet_len = tabulator.jet_len();
                let jets = tabulator.tabulate_point(point, scratch);
                self.expansion
                    .accumulate(jets, jet_len, 2, 0, T::one(), values, 2, 0);
                self.expansion
                    .accumulate(jets, jet_len, 1, 0, -T::one(), values, 2, 1);
            }
            // In one dimension, curl and divergence coincide with the derivative
            _ => self.evaluate_dk(operator.derivative_order(), point, values, scratch),
        }
    }
}
