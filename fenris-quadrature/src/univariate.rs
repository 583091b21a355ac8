//! Quadrature rules for the one-dimensional domain `[-1, 1]`.

use crate::Rule;
use std::f64::consts::PI;

/// Upper bound on Newton iterations when locating roots of Legendre polynomials.
const MAX_NEWTON_ITERATIONS: usize = 100;

/// Recurrence relation for Legendre polynomials.
///
/// Note: we use a formula for which derivatives are *not* defined at |x| == 1, so it is only
/// suitable for evaluation in the open interval (-1, 1).
#[derive(Debug, Default)]
struct LegendreRecurrence {
    n: usize,
    x: f64,
    // p_n(x)
    p1: f64,
    // p_{n - 1}(x)
    p2: f64,
}

impl LegendreRecurrence {
    pub fn evaluate(n: usize, x: f64) -> Self {
        //  m P_m(x) = (2m - 1) * x P_{m - 1}(x) - (m - 1) P_{m - 2}(x)
        let mut p1 = 1.0;
        let mut p2 = 0.0;
        let mut p3;
        for m in 1..=n {
            let m = m as f64;
            p3 = p2;
            p2 = p1;
            p1 = ((2.0 * m - 1.0) * x * p2 - (m - 1.0) * p3) / m;
        }

        Self { n, x, p1, p2 }
    }

    fn value(&self) -> f64 {
        self.p1
    }

    fn derivative(&self) -> f64 {
        let Self { n, x, p1, p2 } = &self;
        let n = *n as f64;
        // dp_n/dx (x) = n * (x * p_n(x) - p_{n - 1}(x)) / (x^2 - 1)
        n * (x * p1 - p2) / (x * x - 1.0)
    }

    fn second_derivative(&self) -> f64 {
        // Legendre's differential equation:
        // (1 - x^2) p_n''(x) = 2 x p_n'(x) - n (n + 1) p_n(x)
        let n = self.n as f64;
        let x = self.x;
        (2.0 * x * self.derivative() - n * (n + 1.0) * self.value()) / (1.0 - x * x)
    }

    fn value_and_derivative(&self) -> (f64, f64) {
        (self.value(), self.derivative())
    }
}

/// Runs Newton's method from `x` until the update falls below machine precision.
fn newton_root(mut x: f64, f_and_df: impl Fn(f64) -> (f64, f64)) -> f64 {
    for _ in 0..MAX_NEWTON_ITERATIONS {
        let (f, df) = f_and_df(x);
        let dx = -f / df;
        x += dx;
        if dx.abs() <= 1e-15 {
            break;
        }
    }
    x
}

/// Gauss quadrature for the reference interval [-1, 1].
///
/// Returns the [Gauss quadrature rule] with the given number of points. Given `n` points,
/// the rule integrates polynomials of order up to `2 n - 1` exactly.
///
/// # Panics
///
/// Panics if zero points are requested.
///
/// [Gauss quadrature rule]: https://en.wikipedia.org/wiki/Gaussian_quadrature
pub fn gauss(num_points: usize) -> Rule<1> {
    let n = num_points;
    assert!(n > 0, "number of points must be positive");

    // Loosely based on the procedure used in
    // Numerical Recipes, The art of Scientific Computing, Third Edition (2007)
    let m = (n + 1) / 2;

    let mut points = Vec::with_capacity(n);
    let mut weights = Vec::with_capacity(n);

    // Only find the first m roots. The remaining roots can be found by symmetry
    for i in 0..m {
        let guess = (PI * (i as f64 + 0.75) / (n as f64 + 0.5)).cos();
        let x = newton_root(guess, |x| LegendreRecurrence::evaluate(n, x).value_and_derivative());
        let dp = LegendreRecurrence::evaluate(n, x).derivative();
        let w = 2.0 / ((1.0 - x * x) * dp * dp);

        points.push([x]);
        weights.push(w);
    }

    for i in m..n {
        let mirror_idx = n - i - 1;
        points.push([-points[mirror_idx][0]]);
        weights.push(weights[mirror_idx]);
    }

    // Roots were found in descending order
    points.reverse();
    weights.reverse();

    debug_assert_eq!(points.len(), n, "Internal error: incorrect number of points produced");
    (weights, points)
}

/// Gauss-Lobatto quadrature for the reference interval [-1, 1].
///
/// Returns the Gauss-Lobatto rule with `n` points, sorted in ascending order. The endpoints
/// `-1` and `1` are always included, and the rule integrates polynomials of order up to
/// `2 n - 3` exactly. Returns `None` if fewer than two points are requested.
pub fn try_gauss_lobatto(num_points: usize) -> Option<Rule<1>> {
    let n = num_points;
    if n < 2 {
        return None;
    }

    // Interior points are the roots of p_{n - 1}'
    let m = n - 1;
    let mf = m as f64;
    let mut points = Vec::with_capacity(n);
    points.push([-1.0]);
    for i in 1..m {
        // Chebyshev-Gauss-Lobatto nodes are good initial guesses
        let guess = -(PI * i as f64 / mf).cos();
        let x = newton_root(guess, |x| {
            let recurrence = LegendreRecurrence::evaluate(m, x);
            (recurrence.derivative(), recurrence.second_derivative())
        });
        points.push([x]);
    }
    points.push([1.0]);

    // Enforce exact symmetry
    for i in 0..n / 2 {
        let x = 0.5 * (points[n - i - 1][0] - points[i][0]);
        points[i] = [-x];
        points[n - i - 1] = [x];
    }
    if n % 2 == 1 {
        points[n / 2] = [0.0];
    }

    let weights = points
        .iter()
        .map(|&[x]| {
            let p = LegendreRecurrence::evaluate(m, x).value();
            2.0 / (mf * (mf + 1.0) * p * p)
        })
        .collect();

    Some((weights, points))
}
