use crate::{dof_matrix, evaluate_at_point, interior_tetrahedron_points};
use fenris_basis::proptest::reference_point;
use fenris_basis::{BasisError, CellTopology, HGradCn, HGradTetC2, Operator, ReferenceBasis};
use matrixcompare::assert_scalar_eq;
use nalgebra::{DMatrix, DMatrixView, DVector};
use proptest::prelude::*;
use util::{assert_approx_matrix_eq, central_difference};

#[test]
fn values_at_vertices() {
    let basis = HGradTetC2::<f64>::new();
    let origin = DVector::zeros(3);
    let values = evaluate_at_point(&basis, Operator::Value, &origin);
    let mut expected = DMatrix::zeros(1, 10);
    expected[0] = 1.0;
    assert_eq!(values, expected);

    let x = DVector::from_column_slice(&[1.0, 0.0, 0.0]);
    let values = evaluate_at_point(&basis, Operator::Value, &x);
    let mut expected = DMatrix::zeros(1, 10);
    expected[1] = 1.0;
    assert_eq!(values, expected);
}

#[test]
fn gradients_at_origin() {
    let basis = HGradTetC2::<f64>::new();
    let grad = evaluate_at_point(&basis, Operator::Grad, &DVector::zeros(3));
    assert_eq!(grad.shape(), (3, 10));
    assert_eq!(grad.column(0).as_slice(), &[-3.0, -3.0, -3.0]);
    assert_eq!(grad.column(1).as_slice(), &[-1.0, 0.0, 0.0]);
    assert_eq!(grad.column(4).as_slice(), &[4.0, 0.0, 0.0]);
}

#[test]
fn basis_is_nodal() {
    let basis = HGradTetC2::<f64>::new();
    assert_eq!(basis.cardinality(), 10);
    assert_eq!(basis.degree(), 2);
    assert_approx_matrix_eq!(&dof_matrix(&basis), &DMatrix::<f64>::identity(10, 10), abstol = 1e-15);
}

#[test]
fn dof_tags_place_nodes_on_vertices_and_edges() {
    let basis = HGradTetC2::<f64>::new();
    let tags = basis.dof_tags();
    assert_eq!(tags.len(), 10);
    for v in 0..4 {
        assert_eq!(tags.dofs_on_subcell(0, v), vec![v]);
    }
    for e in 0..6 {
        assert_eq!(tags.dofs_on_subcell(1, e), vec![4 + e]);
    }
    assert_eq!(tags.num_dofs_on_subcell(2, 0), 0);
    assert_eq!(tags.num_dofs_on_subcell(3, 0), 0);
}

#[test]
fn second_derivatives_are_constant_and_higher_derivatives_vanish() {
    let basis = HGradTetC2::<f64>::new();
    let points = interior_tetrahedron_points(5);
    let d2 = basis.values(Operator::D2, DMatrixView::from(&points)).unwrap();
    assert_eq!(d2.shape(), [10, 5, 6]);
    for j in 1..5 {
        assert_eq!(d2.point_values(j), d2.point_values(0));
    }
    // phi_0 = s (2 s + 1) with s = x + y + z - 1 has all second derivatives equal to 4
    assert!(d2.point_values(0).column(0).iter().all(|&v| v == 4.0));

    for operator in [Operator::D3, Operator::D7] {
        let values = basis.values(operator, DMatrixView::from(&points)).unwrap();
        assert!(values.as_slice().iter().all(|&v| v == 0.0));
    }
    assert_eq!(basis.scratch_space_size(Operator::D3).unwrap().per_thread, 0);
}

#[test]
fn curl_and_div_are_unsupported() {
    let basis = HGradTetC2::<f64>::new();
    let points = interior_tetrahedron_points(2);
    for operator in [Operator::Curl, Operator::Div] {
        let result = basis.values(operator, DMatrixView::from(&points));
        assert!(matches!(
            result,
            Err(BasisError::UnsupportedOperator { dimension: 3, .. })
        ));
    }
}

#[test]
fn coincides_with_constructed_quadratic_basis() {
    let closed_form = HGradTetC2::<f64>::new();
    let constructed = HGradCn::<f64>::new(CellTopology::Tetrahedron, 2).unwrap();
    assert_eq!(constructed.cardinality(), closed_form.cardinality());
    assert_approx_matrix_eq!(
        &constructed.dof_coords().clone_owned(),
        &closed_form.dof_coords().clone_owned(),
        abstol = 1e-15
    );
    assert_eq!(constructed.dof_tags(), closed_form.dof_tags());

    let points = interior_tetrahedron_points(11);
    for operator in [Operator::Value, Operator::Grad, Operator::D2] {
        let a = closed_form.values(operator, DMatrixView::from(&points)).unwrap();
        let b = constructed.values(operator, DMatrixView::from(&points)).unwrap();
        for j in 0..points.ncols() {
            assert_approx_matrix_eq!(&a.point_values(j), &b.point_values(j), abstol = 1e-11);
        }
    }
}

proptest! {
    #[test]
    fn partition_of_unity(x in reference_point(CellTopology::Tetrahedron, 0.0)) {
        let basis = HGradTetC2::<f64>::new();
        let values = evaluate_at_point(&basis, Operator::Value, &x);
        assert_scalar_eq!(values.sum(), 1.0, comp = abs, tol = 1e-13);
        let grad = evaluate_at_point(&basis, Operator::Grad, &x);
        for row in grad.row_iter() {
            assert_scalar_eq!(row.sum(), 0.0, comp = abs, tol = 1e-13);
        }
    }

    #[test]
    fn gradients_match_finite_differences(x in reference_point(CellTopology::Tetrahedron, 0.01)) {
        let basis = HGradTetC2::<f64>::new();
        let grad = evaluate_at_point(&basis, Operator::Grad, &x);
        for d in 0..3 {
            let approx = central_difference(|y| evaluate_at_point(&basis, Operator::Value, y), &x, d, 1e-6);
            assert_approx_matrix_eq!(&grad.row(d).clone_owned(), &approx, abstol = 1e-8);
        }
    }
}
