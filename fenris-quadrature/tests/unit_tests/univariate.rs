use fenris_quadrature::integrate;
use fenris_quadrature::univariate::{gauss, try_gauss_lobatto};

use matrixcompare::assert_scalar_eq;

#[test]
fn gauss_rules_satisfy_expected_accuracy() {
    for n in 1..=64 {
        let expected_polynomial_degree = 2 * n - 1;
        let rule = gauss(n);

        // Also test that weights are positive
        assert!(rule.0.iter().all(|&w| w > 0.0));

        // Integrate all monomials of degree <= expected polynomial degree that can be
        // exactly integrated
        for alpha in 0..=expected_polynomial_degree as i32 {
            let monomial = |x: f64| x.powi(alpha);
            let monomial_integral = (1.0 - (-1.0f64).powi(alpha + 1)) / (alpha as f64 + 1.0);
            let estimated_integral = integrate(&rule, |x| monomial(x[0]));

            assert_scalar_eq!(estimated_integral, monomial_integral, comp = abs, tol = 1e-13);
        }
    }
}

#[test]
fn gauss_points_are_sorted_and_symmetric() {
    for n in 1..=20 {
        let (weights, points) = gauss(n);
        assert!(points.windows(2).all(|pair| pair[0][0] < pair[1][0]));
        for i in 0..n {
            assert_scalar_eq!(points[i][0], -points[n - i - 1][0], comp = abs, tol = 1e-15);
            assert_scalar_eq!(weights[i], weights[n - i - 1], comp = abs, tol = 1e-15);
        }
    }
}

#[test]
fn gauss_lobatto_rules_satisfy_expected_accuracy() {
    assert!(try_gauss_lobatto(0).is_none());
    assert!(try_gauss_lobatto(1).is_none());

    for n in 2..=32 {
        let expected_polynomial_degree = 2 * n - 3;
        let rule = try_gauss_lobatto(n).unwrap();

        // Check that rule contains endpoints, like Gauss-Lobatto should
        assert_eq!(rule.1.first().unwrap(), &[-1.0]);
        assert_eq!(rule.1.last().unwrap(), &[1.0]);
        assert!(rule.1.windows(2).all(|pair| pair[0][0] < pair[1][0]));

        // Also test that weights are positive
        assert!(rule.0.iter().all(|&w| w > 0.0));

        for alpha in 0..=expected_polynomial_degree as i32 {
            let monomial = |x: f64| x.powi(alpha);
            let monomial_integral = (1.0 - (-1.0f64).powi(alpha + 1)) / (alpha as f64 + 1.0);
            let estimated_integral = integrate(&rule, |x| monomial(x[0]));

            assert_scalar_eq!(estimated_integral, monomial_integral, comp = abs, tol = 1e-13);
        }
    }
}

#[test]
fn gauss_lobatto_five_points_match_closed_form() {
    let (weights, points) = try_gauss_lobatto(5).unwrap();
    let a = (3.0f64 / 7.0).sqrt();
    let expected_points = [-1.0, -a, 0.0, a, 1.0];
    let expected_weights = [0.1, 49.0 / 90.0, 32.0 / 45.0, 49.0 / 90.0, 0.1];
    for i in 0..5 {
        assert_scalar_eq!(points[i][0], expected_points[i], comp = abs, tol = 1e-14);
        assert_scalar_eq!(weights[i], expected_weights[i], comp = abs, tol = 1e-14);
    }
}
