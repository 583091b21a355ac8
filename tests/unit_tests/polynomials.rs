use fenris_basis::operator::{partial_derivative_multi_indices, partial_derivative_position};
use fenris_basis::polynomials::{num_polynomials, tabulate, OrthonormalTabulator};
use fenris_basis::proptest::reference_point;
use fenris_basis::quadrature::cubature;
use fenris_basis::{BasisError, CellTopology, Operator};
use matrixcompare::assert_scalar_eq;
use nalgebra::{DMatrix, DVector};
use proptest::prelude::*;
use util::{assert_approx_matrix_eq, central_difference};

const TOPOLOGIES: [CellTopology; 3] = [CellTopology::Line, CellTopology::Triangle, CellTopology::Tetrahedron];

fn tabulate_at(topology: CellTopology, degree: usize, operator: Operator, x: &DVector<f64>) -> DMatrix<f64> {
    let points = DMatrix::from_column_slice(x.len(), 1, x.as_slice());
    tabulate(topology, degree, operator, &points).unwrap()
}

#[test]
fn num_polynomials_matches_dimension_of_polynomial_space() {
    assert_eq!(num_polynomials(1, 5), 6);
    assert_eq!(num_polynomials(2, 3), 10);
    assert_eq!(num_polynomials(3, 0), 1);
    assert_eq!(num_polynomials(3, 2), 10);
    assert_eq!(num_polynomials(3, 4), 35);
}

#[test]
fn tabulator_scratch_holds_all_jets_and_a_temporary() {
    let tabulator = OrthonormalTabulator::<f64>::new(CellTopology::Tetrahedron, 2, 1);
    assert_eq!(tabulator.num_polynomials(), 10);
    assert_eq!(tabulator.jet_len(), 4);
    assert_eq!(tabulator.scratch_len(), 44);
    assert_eq!(tabulator.derivative_offset(0), 0);
    assert_eq!(tabulator.derivative_offset(1), 1);

    let tabulator = OrthonormalTabulator::<f64>::new(CellTopology::Triangle, 3, 3);
    assert_eq!(tabulator.jet_len(), 10);
    assert_eq!(tabulator.derivative_offset(2), 3);
    assert_eq!(tabulator.derivative_offset(3), 6);
}

#[test]
fn orthonormal_bases_are_orthonormal() {
    for topology in TOPOLOGIES {
        for degree in [0, 1, 3, 6] {
            let (weights, points) = cubature::<f64>(topology, 2 * degree).unwrap();
            let phi = tabulate(topology, degree, Operator::Value, &points).unwrap();
            let mut weighted_phi = phi.clone();
            for (q, mut column) in weighted_phi.column_iter_mut().enumerate() {
                column *= weights[q];
            }
            let gram = &phi * weighted_phi.transpose();
            let n = num_polynomials(topology.dimension(), degree);
            assert_approx_matrix_eq!(&gram, &DMatrix::<f64>::identity(n, n), abstol = 1e-12);
        }
    }
}

#[test]
fn constant_polynomial_is_normalized_volume() {
    // The constant is 1 / sqrt(|K|)
    let expected = [1.0 / 2.0f64.sqrt(), 2.0f64.sqrt(), 6.0f64.sqrt()];
    for (topology, expected) in TOPOLOGIES.iter().zip(expected) {
        let x = DVector::from_element(topology.dimension(), 0.2);
        let phi = tabulate_at(*topology, 3, Operator::Value, &x);
        assert_scalar_eq!(phi[(0, 0)], expected, comp = abs, tol = 1e-14);
    }
}

#[test]
fn tabulate_rejects_operators_without_partial_derivative_structure() {
    let points = DMatrix::from_element(3, 1, 0.1);
    for operator in [Operator::Curl, Operator::Div] {
        let result = tabulate::<f64>(CellTopology::Tetrahedron, 2, operator, &points);
        assert!(matches!(result, Err(BasisError::UnsupportedOperator { .. })));
    }
}

#[test]
fn grad_coincides_with_first_derivatives() {
    let x = DVector::from_column_slice(&[0.2, 0.1, 0.3]);
    let grad = tabulate_at(CellTopology::Tetrahedron, 4, Operator::Grad, &x);
    let d1 = tabulate_at(CellTopology::Tetrahedron, 4, Operator::D1, &x);
    assert_eq!(grad, d1);
}

#[test]
fn derivatives_above_degree_vanish() {
    let x = DVector::from_column_slice(&[0.2, 0.4]);
    let d3 = tabulate_at(CellTopology::Triangle, 2, Operator::D3, &x);
    assert_eq!(d3.shape(), (6, 4));
    assert!(d3.iter().all(|&v| v == 0.0));
}

/// Compares the order `k` derivatives with central differences of the order `k - 1`
/// derivatives.
fn check_derivatives_against_finite_differences(topology: CellTopology, degree: usize, k: usize, x: &DVector<f64>) {
    let dim = topology.dimension();
    let lower = Operator::dk(k - 1).unwrap_or(Operator::Value);
    let upper = Operator::dk(k).unwrap();
    let exact = tabulate_at(topology, degree, upper, x);

    let h = 1e-5;
    for (position, alpha) in partial_derivative_multi_indices(k, dim).into_iter().enumerate() {
        let direction = alpha.iter().position(|&a| a > 0).unwrap();
        let mut beta = alpha;
        beta[direction] -= 1;
        let lower_position = partial_derivative_position(beta, dim);
        let approx = central_difference(|y| tabulate_at(topology, degree, lower, y), x, direction, h);
        let approx_column = approx.column(lower_position).clone_owned();
        let exact_column = exact.column(position).clone_owned();
        let scale = 1.0 + exact_column.amax();
        assert_approx_matrix_eq!(&exact_column, &approx_column, abstol = 1e-6 * scale);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn line_derivatives_match_finite_differences(x in reference_point(CellTopology::Line, 0.01)) {
        for k in 1..=3 {
            check_derivatives_against_finite_differences(CellTopology::Line, 5, k, &x);
        }
    }

    #[test]
    fn triangle_derivatives_match_finite_differences(x in reference_point(CellTopology::Triangle, 0.01)) {
        for k in 1..=3 {
            check_derivatives_against_finite_differences(CellTopology::Triangle, 4, k, &x);
        }
    }

    #[test]
    fn tetrahedron_derivatives_match_finite_differences(x in reference_point(CellTopology::Tetrahedron, 0.01)) {
        for k in 1..=3 {
            check_derivatives_against_finite_differences(CellTopology::Tetrahedron, 4, k, &x);
        }
    }
}
