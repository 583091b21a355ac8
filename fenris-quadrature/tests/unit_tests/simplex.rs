use fenris_quadrature::simplex::{segment, tetrahedron, triangle, MAX_STRENGTH};
use fenris_quadrature::{integrate, Error};

use matrixcompare::assert_scalar_eq;

fn factorial(n: i32) -> f64 {
    (1..=n).map(|i| i as f64).product()
}

/// Exact integral of x^a y^b over the unit triangle.
fn triangle_monomial_integral(a: i32, b: i32) -> f64 {
    factorial(a) * factorial(b) / factorial(a + b + 2)
}

/// Exact integral of x^a y^b z^c over the unit tetrahedron.
fn tetrahedron_monomial_integral(a: i32, b: i32, c: i32) -> f64 {
    factorial(a) * factorial(b) * factorial(c) / factorial(a + b + c + 3)
}

#[test]
fn segment_rules_satisfy_expected_accuracy() {
    for strength in 0..=30 {
        let rule = segment(strength).unwrap();
        for alpha in 0..=strength as i32 {
            let exact = (1.0 - (-1.0f64).powi(alpha + 1)) / (alpha as f64 + 1.0);
            let estimated = integrate(&rule, |&[x]| x.powi(alpha));
            assert_scalar_eq!(estimated, exact, comp = abs, tol = 1e-14);
        }
    }
}

#[test]
fn triangle_rules_satisfy_expected_accuracy() {
    for strength in 0..=20 {
        let rule = triangle(strength).unwrap();
        assert!(rule.0.iter().all(|&w| w > 0.0));
        assert!(rule
            .1
            .iter()
            .all(|&[x, y]| x > 0.0 && y > 0.0 && x + y < 1.0));

        for a in 0..=strength as i32 {
            for b in 0..=(strength as i32 - a) {
                let estimated = integrate(&rule, |&[x, y]| x.powi(a) * y.powi(b));
                let exact = triangle_monomial_integral(a, b);
                assert_scalar_eq!(estimated, exact, comp = abs, tol = 1e-14);
            }
        }
    }
}

#[test]
fn tetrahedron_rules_satisfy_expected_accuracy() {
    for strength in 0..=14 {
        let rule = tetrahedron(strength).unwrap();
        assert!(rule.0.iter().all(|&w| w > 0.0));
        assert_scalar_eq!(rule.0.iter().sum::<f64>(), 1.0 / 6.0, comp = abs, tol = 1e-14);

        for a in 0..=strength as i32 {
            for b in 0..=(strength as i32 - a) {
                for c in 0..=(strength as i32 - a - b) {
                    let estimated = integrate(&rule, |&[x, y, z]| x.powi(a) * y.powi(b) * z.powi(c));
                    let exact = tetrahedron_monomial_integral(a, b, c);
                    assert_scalar_eq!(estimated, exact, comp = abs, tol = 1e-14);
                }
            }
        }
    }
}

#[test]
fn strength_beyond_maximum_is_rejected() {
    assert_eq!(segment(MAX_STRENGTH + 1), Err(Error::NoRuleAvailable));
    assert_eq!(triangle(MAX_STRENGTH + 1), Err(Error::NoRuleAvailable));
    assert_eq!(tetrahedron(MAX_STRENGTH + 1), Err(Error::NoRuleAvailable));
    assert!(tetrahedron(MAX_STRENGTH).is_ok());
}
