use fenris_basis::{BasisError, FunctionSpace, Operator};
use std::error::Error;

#[test]
fn error_messages() {
    let err = BasisError::UnsupportedOperator {
        operator: Operator::Curl,
        function_space: FunctionSpace::HGrad,
        dimension: 3,
    };
    assert_eq!(
        err.to_string(),
        "operator CURL is not supported for H(grad) bases in dimension 3"
    );

    let err = BasisError::NumericalRank { expected: 6, found: 5 };
    assert_eq!(
        err.to_string(),
        "numerical rank of ambient embedding is 5, but the space has dimension 6"
    );

    let err = BasisError::NotImplemented {
        feature: "subcell-restricted evaluation",
    };
    assert_eq!(err.to_string(), "subcell-restricted evaluation is not implemented");
}

#[test]
fn quadrature_errors_are_wrapped() {
    let err = fenris_quadrature::simplex::tetrahedron(1000).unwrap_err();
    let wrapped = BasisError::from(err.clone());
    assert_eq!(wrapped, BasisError::Quadrature(err));
    assert!(wrapped.source().is_some());
    assert!(BasisError::NumericalRank { expected: 1, found: 0 }.source().is_none());
}

#[test]
fn errors_convert_into_reports() -> eyre::Result<()> {
    let basis = fenris_basis::HGradTetC2::<f64>::new();
    let points = nalgebra::DMatrix::from_element(3, 1, 0.25);
    let values = fenris_basis::ReferenceBasis::values(&basis, Operator::Value, (&points).into())?;
    assert_eq!(values.num_points(), 1);
    Ok(())
}
