//! Quadrature rules for simplices formed by collapsed tensor products.
//!
//! Triangle and tetrahedron rules are obtained by mapping a tensor product of Gauss rules on
//! the unit square (cube) onto the simplex with the collapsed (Duffy) coordinate transform.
//! The rules are not as economical as dedicated simplex rules, but they exist for any
//! strength and have positive weights with all points strictly inside the domain.

use crate::univariate::gauss;
use crate::{Error, Rule};

/// The highest polynomial strength for which rules are provided.
pub const MAX_STRENGTH: usize = 100;

fn check_strength(strength: usize) -> Result<(), Error> {
    if strength > MAX_STRENGTH {
        Err(Error::NoRuleAvailable)
    } else {
        Ok(())
    }
}

/// Gauss rule on `[0, 1]` with the given number of points.
fn unit_interval_gauss(num_points: usize) -> Rule<1> {
    let (weights, points) = gauss(num_points);
    let weights = weights.into_iter().map(|w| 0.5 * w).collect();
    let points = points.into_iter().map(|[x]| [0.5 * (x + 1.0)]).collect();
    (weights, points)
}

/// A rule for the reference segment `[-1, 1]` that integrates polynomials of degree up to
/// `strength` exactly.
pub fn segment(strength: usize) -> Result<Rule<1>, Error> {
    check_strength(strength)?;
    Ok(gauss((strength + 2) / 2))
}

/// A rule for the unit triangle that integrates polynomials of total degree up to `strength`
/// exactly.
pub fn triangle(strength: usize) -> Result<Rule<2>, Error> {
    check_strength(strength)?;
    // The collapse adds one to the degree in the collapsed direction
    let n = (strength + 3) / 2;
    let (weights1d, points1d) = unit_interval_gauss(n);
    let mut weights = Vec::with_capacity(n * n);
    let mut points = Vec::with_capacity(n * n);

    let rule1d_iter = || weights1d.iter().zip(&points1d);

    for (&wb, &[b]) in rule1d_iter() {
        for (&wa, &[a]) in rule1d_iter() {
            weights.push(wa * wb * (1.0 - b));
            points.push([a * (1.0 - b), b]);
        }
    }

    Ok((weights, points))
}

/// A rule for the unit tetrahedron that integrates polynomials of total degree up to
/// `strength` exactly.
pub fn tetrahedron(strength: usize) -> Result<Rule<3>, Error> {
    check_strength(strength)?;
    let n = (strength + 4) / 2;
    let (weights1d, points1d) = unit_interval_gauss(n);
    let mut weights = Vec::with_capacity(n * n * n);
    let mut points = Vec::with_capacity(n * n * n);

    let rule1d_iter = || weights1d.iter().zip(&points1d);

    for (&wc, &[c]) in rule1d_iter() {
        for (&wb, &[b]) in rule1d_iter() {
            for (&wa, &[a]) in rule1d_iter() {
                let jacobian = (1.0 - b) * (1.0 - c) * (1.0 - c);
                weights.push(wa * wb * wc * jacobian);
                points.push([a * (1.0 - b) * (1.0 - c), b * (1.0 - c), c]);
            }
        }
    }

    Ok((weights, points))
}
