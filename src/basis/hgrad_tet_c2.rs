use crate::basis::ReferenceBasis;
use crate::operator::{FunctionSpace, Operator};
use crate::tags::{DofTag, DofTags};
use crate::topology::CellTopology;
use crate::Real;
use nalgebra::{DMatrix, DMatrixView};
use numeric_literals::replace_float_literals;

const CARDINALITY: usize = 10;

/// Quadratic Lagrange basis for `H(grad)` on the reference tetrahedron, in closed form.
///
/// Nodes are the four vertices followed by the midpoints of the six edges.
#[derive(Debug, Clone)]
pub struct HGradTetC2<T: Real> {
    dof_coords: DMatrix<T>,
    dof_coeffs: DMatrix<T>,
    tags: DofTags,
}

impl<T: Real> Default for HGradTetC2<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Real> HGradTetC2<T> {
    #[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
    pub fn new() -> Self {
        #[rustfmt::skip]
        let dof_coords = DMatrix::from_column_slice(3, CARDINALITY, &[
            0.0, 0.0, 0.0,
            1.0, 0.0, 0.0,
            0.0, 1.0, 0.0,
            0.0, 0.0, 1.0,
            0.5, 0.0, 0.0,
            0.5, 0.5, 0.0,
            0.0, 0.5, 0.0,
            0.0, 0.0, 0.5,
            0.5, 0.0, 0.5,
            0.0, 0.5, 0.5,
        ]);
        let vertex_tags = (0..4).map(|v| DofTag::new(0, v, 0, 1));
        let edge_tags = (0..6).map(|e| DofTag::new(1, e, 0, 1));
        Self {
            dof_coords,
            dof_coeffs: DMatrix::repeat(1, CARDINALITY, T::one()),
            tags: DofTags::from_tags(vertex_tags.chain(edge_tags).collect()),
        }
    }
}

#[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
fn values<T: Real>(x: T, y: T, z: T) -> [T; CARDINALITY] {
    let s = x + y + z - 1.0;
    [
        s * (2.0 * s + 1.0),
        x * (2.0 * x - 1.0),
        y * (2.0 * y - 1.0),
        z * (2.0 * z - 1.0),
        -4.0 * x * s,
        4.0 * x * y,
        -4.0 * y * s,
        -4.0 * z * s,
        4.0 * x * z,
        4.0 * y * z,
    ]
}

#[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
fn gradients<T: Real>(x: T, y: T, z: T) -> [[T; 3]; CARDINALITY] {
    let g = 4.0 * (x + y + z) - 3.0;
    [
        [g, g, g],
        [4.0 * x - 1.0, 0.0, 0.0],
        [0.0, 4.0 * y - 1.0, 0.0],
        [0.0, 0.0, 4.0 * z - 1.0],
        [-4.0 * (2.0 * x + y + z - 1.0), -4.0 * x, -4.0 * x],
        [4.0 * y, 4.0 * x, 0.0],
        [-4.0 * y, -4.0 * (x + 2.0 * y + z - 1.0), -4.0 * y],
        [-4.0 * z, -4.0 * z, -4.0 * (x + y + 2.0 * z - 1.0)],
        [4.0 * z, 0.0, 4.0 * x],
        [0.0, 4.0 * z, 4.0 * y],
    ]
}

/// Second derivatives ordered as `xx, xy, xz, yy, yz, zz`.
#[rustfmt::skip]
const SECOND_DERIVATIVES: [[f64; 6]; CARDINALITY] = [
    [ 4.0,  4.0,  4.0,  4.0,  4.0,  4.0],
    [ 4.0,  0.0,  0.0,  0.0,  0.0,  0.0],
    [ 0.0,  0.0,  0.0,  4.0,  0.0,  0.0],
    [ 0.0,  0.0,  0.0,  0.0,  0.0,  4.0],
    [-8.0, -4.0, -4.0,  0.0,  0.0,  0.0],
    [ 0.0,  4.0,  0.0,  0.0,  0.0,  0.0],
    [ 0.0, -4.0,  0.0, -8.0, -4.0,  0.0],
    [ 0.0,  0.0, -4.0,  0.0, -4.0, -8.0],
    [ 0.0,  0.0,  4.0,  0.0,  0.0,  0.0],
    [ 0.0,  0.0,  0.0,  0.0,  4.0,  0.0],
];

impl<T: Real> ReferenceBasis<T> for HGradTetC2<T> {
    fn cardinality(&self) -> usize {
        CARDINALITY
    }

    fn degree(&self) -> usize {
        2
    }

    fn cell_topology(&self) -> CellTopology {
        CellTopology::Tetrahedron
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

    fn implements_operator(&self, operator: Operator) -> bool {
        !matches!(operator, Operator::Curl | Operator::Div)
    }

    fn scratch_len(&self, _operator: Operator) -> usize {
        0
    }

    fn evaluate_value_at(&self, point: &[T], values: &mut [T], _scratch: &mut [T]) {
        values.copy_from_slice(&self::values(point[0], point[1], point[2]));
    }

    fn evaluate_derivative_at(&self, operator: Operator, point: &[T], values: &mut [T], _scratch: &mut [T]) {
        match operator.derivative_order() {
            1 => {
                let gradients = gradients(point[0], point[1], point[2]);
                for (out, gradient) in values.chunks_exact_mut(3).zip(&gradients) {
                    out.copy_from_slice(gradient);
                }
            }
            2 => {
                for (out, d2) in values.chunks_exact_mut(6).zip(&SECOND_DERIVATIVES) {
                    for (out_c, &d2_c) in out.iter_mut().zip(d2) {
                        *out_c = nalgebra::convert(d2_c);
                    }
                }
            }
            _ => values.fill(T::zero()),
        }
    }
}
