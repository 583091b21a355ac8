use nalgebra::{DMatrix, DVector};

/// Poor man's approx assertion for matrices
#[macro_export]
macro_rules! assert_approx_matrix_eq {
    ($x:expr, $y:expr, abstol = $tol:expr) => {{
        let diff = $x - $y;

        let max_absdiff = diff.abs().max();
        let approx_eq = max_absdiff <= $tol;

        if !approx_eq {
            println!("abstol: {:e}", $tol);
            println!("left: {}", $x);
            println!("right: {}", $y);
            println!("diff: {:e}", diff);
        }
        assert!(approx_eq);
    }};
}

#[macro_export]
macro_rules! assert_panics {
    ($e:expr) => {{
        use std::panic::catch_unwind;
        use std::stringify;
        let expr_string = stringify!($e);
        let result = catch_unwind(|| $e);
        if result.is_ok() {
            panic!("assert_panics!({}) failed.", expr_string);
        }
    }};
}

/// Approximates the directional derivative of `f` at `x` along coordinate `direction` with a
/// second-order central difference.
pub fn central_difference(
    f: impl Fn(&DVector<f64>) -> DMatrix<f64>,
    x: &DVector<f64>,
    direction: usize,
    h: f64,
) -> DMatrix<f64> {
    let mut x_plus = x.clone();
    let mut x_minus = x.clone();
    x_plus[direction] += h;
    x_minus[direction] -= h;
    (f(&x_plus) - f(&x_minus)) / (2.0 * h)
}
