//! Orthonormal polynomial bases on reference cells.
//!
//! The bases are the Legendre polynomials on the line and the Dubiner polynomials on the
//! triangle and tetrahedron, graded by total degree and normalized to be orthonormal in `L2`
//! of the reference cell. They are evaluated through their three-term recurrences in
//! collapsed coordinates. Partial derivatives are carried through the recurrences as jets, so
//! every derivative is exact up to rounding.
//!
//! A jet holds the value and all partial derivatives up to a fixed order of one polynomial.
//! Jet entries are graded by derivative order, and within each order they follow
//! [`partial_derivative_multi_indices`].
use crate::error::BasisError;
use crate::operator::{
    num_partial_derivatives, num_partial_derivatives_up_to, partial_derivative_multi_indices, FunctionSpace,
    Operator,
};
use crate::topology::CellTopology;
use crate::Real;
use itertools::izip;
use nalgebra::{convert, DMatrix, DMatrixView};

/// The number of polynomials of total degree at most `degree` in `dim` variables.
pub fn num_polynomials(dim: usize, degree: usize) -> usize {
    num_partial_derivatives_up_to(degree, dim)
}

/// Index of the triangle polynomial with collapsed degrees `(p, q)`.
pub fn triangle_index(p: usize, q: usize) -> usize {
    (p + q) * (p + q + 1) / 2 + q
}

/// Index of the tetrahedron polynomial with collapsed degrees `(p, q, r)`.
pub fn tetrahedron_index(p: usize, q: usize, r: usize) -> usize {
    let s = p + q + r;
    s * (s + 1) * (s + 2) / 6 + (q + r) * (q + r + 1) / 2 + r
}

/// Recurrence coefficients of the Jacobi polynomials `P^(a, b)`.
fn jacobi_recurrence_coefficients(a: f64, b: f64, n: usize) -> (f64, f64, f64) {
    let n = n as f64;
    let an = (2.0 * n + 1.0 + a + b) * (2.0 * n + 2.0 + a + b) / (2.0 * (n + 1.0) * (n + 1.0 + a + b));
    let bn = (a * a - b * b) * (2.0 * n + 1.0 + a + b)
        / (2.0 * (n + 1.0) * (2.0 * n + a + b) * (n + 1.0 + a + b));
    let cn = (n + a) * (n + b) * (2.0 * n + 2.0 + a + b) / ((n + 1.0) * (n + 1.0 + a + b) * (2.0 * n + a + b));
    (an, bn, cn)
}

/// An affine function `c + s . x` of the biunit coordinates `x`.
#[derive(Debug, Copy, Clone)]
struct Affine<T> {
    constant: T,
    slope: [T; 3],
}

impl<T: Real> Affine<T> {
    fn new(constant: f64, slope: [f64; 3]) -> Self {
        Self {
            constant: convert(constant),
            slope: slope.map(|s| convert(s)),
        }
    }

    fn constant(constant: f64) -> Self {
        Self::new(constant, [0.0; 3])
    }

    fn value(&self, x: &[T; 3]) -> T {
        self.constant + self.slope[0] * x[0] + self.slope[1] * x[1] + self.slope[2] * x[2]
    }
}

/// Mutable access to one jet while reading another jet from the same buffer.
fn jet_pair<T>(jets: &mut [T], target: usize, source: usize, len: usize) -> (&mut [T], &[T]) {
    assert_ne!(target, source, "a jet cannot be updated from itself");
    if target > source {
        let (lower, upper) = jets.split_at_mut(target * len);
        (&mut upper[..len], &lower[source * len..(source + 1) * len])
    } else {
        let (lower, upper) = jets.split_at_mut(source * len);
        (&mut lower[target * len..(target + 1) * len], &upper[..len])
    }
}

/// Tabulates an orthonormal polynomial basis and its derivatives at single points.
#[derive(Debug, Clone)]
pub struct OrthonormalTabulator<T> {
    topology: CellTopology,
    degree: usize,
    derivative_order: usize,
    num_polynomials: usize,
    multi_indices: Vec<[usize; 3]>,
    // For each jet entry and direction: the entry with that exponent lowered by one, together
    // with the exponent scaled by the chain rule factor of the biunit map.
    lowered: Vec<[Option<(usize, T)>; 3]>,
}

impl<T: Real> OrthonormalTabulator<T> {
    pub fn new(topology: CellTopology, degree: usize, derivative_order: usize) -> Self {
        let dim = topology.dimension();
        let multi_indices: Vec<_> = (0..=derivative_order)
            .flat_map(|k| partial_derivative_multi_indices(k, dim))
            .collect();

        // Reference coordinates x relate to biunit coordinates by x_hat = 2 x - 1 on simplices
        let chain_rule_factor = match topology {
            CellTopology::Line => 1.0,
            CellTopology::Triangle | CellTopology::Tetrahedron => 2.0,
        };
        let lowered = multi_indices
            .iter()
            .map(|alpha| {
                let mut entry = [None; 3];
                for i in 0..dim {
                    if alpha[i] > 0 {
                        let mut beta = *alpha;
                        beta[i] -= 1;
                        let position = multi_indices
                            .iter()
                            .position(|gamma| gamma == &beta)
                            .expect("Internal error: lowered multi-index must be present");
                        entry[i] = Some((position, convert(alpha[i] as f64 * chain_rule_factor)));
                    }
                }
                entry
            })
            .collect();

        Self {
            topology,
            degree,
            derivative_order,
            num_polynomials: num_polynomials(dim, degree),
            multi_indices,
            lowered,
        }
    }

    pub fn topology(&self) -> CellTopology {
        self.topology
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    pub fn derivative_order(&self) -> usize {
        self.derivative_order
    }

    pub fn num_polynomials(&self) -> usize {
        self.num_polynomials
    }

    /// The length of a jet, i.e. the number of partial derivatives of order up to
    /// [`derivative_order`](Self::derivative_order), including the value.
    pub fn jet_len(&self) -> usize {
        self.multi_indices.len()
    }

    /// Offset of the derivatives of order `k` within a jet.
    pub fn derivative_offset(&self, k: usize) -> usize {
        assert!(k <= self.derivative_order);
        match k {
            0 => 0,
            k => num_partial_derivatives_up_to(k - 1, self.topology.dimension()),
        }
    }

    /// Number of scalars of scratch memory needed by [`tabulate_point`](Self::tabulate_point).
    pub fn scratch_len(&self) -> usize {
        // One jet per polynomial plus one temporary jet
        (self.num_polynomials + 1) * self.jet_len()
    }

    /// Tabulates the jets of all polynomials at the given reference point.
    ///
    /// The returned slice holds [`num_polynomials`](Self::num_polynomials) consecutive jets.
    ///
    /// # Panics
    ///
    /// Panics if the point does not match the cell dimension or the scratch buffer is shorter
    /// than [`scratch_len`](Self::scratch_len).
    pub fn tabulate_point<'a>(&self, point: &[T], scratch: &'a mut [T]) -> &'a [T] {
        let dim = self.topology.dimension();
        assert_eq!(point.len(), dim, "point dimension must match cell dimension");
        let scratch_len = self.scratch_len();
        assert!(scratch.len() >= scratch_len, "insufficient scratch memory");
        let jets = &mut scratch[..scratch_len];
        jets.fill(T::zero());
        jets[0] = T::one();

        let mut biunit = [T::zero(); 3];
        for (x_hat, &x) in biunit.iter_mut().zip(point) {
            *x_hat = match self.topology {
                CellTopology::Line => x,
                _ => x + x - T::one(),
            };
        }

        match self.topology {
            CellTopology::Line => self.recurrence_line(jets, &biunit),
            CellTopology::Triangle => self.recurrence_triangle(jets, &biunit),
            CellTopology::Tetrahedron => self.recurrence_tetrahedron(jets, &biunit),
        }
        self.normalize(jets);

        &scratch[..self.num_polynomials * self.jet_len()]
    }

    /// `jets[target] += coefficient * factor * jets[source]`, applying the product rule.
    fn multiply_add(&self, jets: &mut [T], target: usize, source: usize, factor: &Affine<T>, coefficient: f64, x: &[T; 3]) {
        let coefficient: T = convert(coefficient);
        let (out, src) = jet_pair(jets, target, source, self.jet_len());
        let value = factor.value(x);
        for (out_alpha, &src_alpha, lowered) in izip!(out.iter_mut(), src.iter(), &self.lowered) {
            let mut sum = value * src_alpha;
            for (entry, &slope) in lowered.iter().zip(&factor.slope) {
                if let Some((beta, exponent)) = *entry {
                    sum += exponent * slope * src[beta];
                }
            }
            *out_alpha += coefficient * sum;
        }
    }

    /// `jets[target] = factor * jets[source]`.
    fn multiply_into(&self, jets: &mut [T], target: usize, source: usize, factor: &Affine<T>, x: &[T; 3]) {
        let len = self.jet_len();
        jets[target * len..(target + 1) * len].fill(T::zero());
        self.multiply_add(jets, target, source, factor, 1.0, x);
    }

    fn recurrence_line(&self, jets: &mut [T], x: &[T; 3]) {
        let x_factor = Affine::new(0.0, [1.0, 0.0, 0.0]);
        let one = Affine::constant(1.0);
        for p in 0..self.degree {
            let pf = p as f64;
            self.multiply_add(jets, p + 1, p, &x_factor, (2.0 * pf + 1.0) / (pf + 1.0), x);
            if p > 0 {
                self.multiply_add(jets, p + 1, p - 1, &one, -pf / (pf + 1.0), x);
            }
        }
    }

    fn recurrence_triangle(&self, jets: &mut [T], x: &[T; 3]) {
        let n = self.degree;
        let idx = triangle_index;
        let tmp = self.num_polynomials;
        let one = Affine::constant(1.0);
        let f1 = Affine::new(0.5, [1.0, 0.5, 0.0]);
        // The collapse factor (1 - y) / 2, which appears squared in the recurrence
        let f2 = Affine::new(0.5, [0.0, -0.5, 0.0]);

        for p in 0..n {
            let pf = p as f64;
            self.multiply_add(jets, idx(p + 1, 0), idx(p, 0), &f1, (2.0 * pf + 1.0) / (pf + 1.0), x);
            if p > 0 {
                self.multiply_into(jets, tmp, idx(p - 1, 0), &f2, x);
                self.multiply_add(jets, idx(p + 1, 0), tmp, &f2, -pf / (pf + 1.0), x);
            }
        }

        for p in 0..n {
            let pf = p as f64;
            let factor = Affine::new(0.5 + pf, [0.0, 1.5 + pf, 0.0]);
            self.multiply_add(jets, idx(p, 1), idx(p, 0), &factor, 1.0, x);
        }

        for p in 0..n.saturating_sub(1) {
            for q in 1..n - p {
                let (a1, a2, a3) = jacobi_recurrence_coefficients(2.0 * p as f64 + 1.0, 0.0, q);
                let factor = Affine::new(a2, [0.0, a1, 0.0]);
                self.multiply_add(jets, idx(p, q + 1), idx(p, q), &factor, 1.0, x);
                self.multiply_add(jets, idx(p, q + 1), idx(p, q - 1), &one, -a3, x);
            }
        }
    }

    fn recurrence_tetrahedron(&self, jets: &mut [T], x: &[T; 3]) {
        let n = self.degree;
        let idx = tetrahedron_index;
        let tmp = self.num_polynomials;
        let one = Affine::constant(1.0);
        let f1 = Affine::new(1.0, [1.0, 0.5, 0.5]);
        // Collapse factors -(y + z) / 2 and (1 - z) / 2, which appear squared in the recurrence
        let g = Affine::new(0.0, [0.0, 0.5, 0.5]);
        let f4 = Affine::new(0.5, [0.0, 0.0, -0.5]);

        for p in 0..n {
            let pf = p as f64;
            self.multiply_add(jets, idx(p + 1, 0, 0), idx(p, 0, 0), &f1, (2.0 * pf + 1.0) / (pf + 1.0), x);
            if p > 0 {
                self.multiply_into(jets, tmp, idx(p - 1, 0, 0), &g, x);
                self.multiply_add(jets, idx(p + 1, 0, 0), tmp, &g, -pf / (pf + 1.0), x);
            }
        }

        for p in 0..n {
            let pf = p as f64;
            let factor = Affine::new(pf + 1.0, [0.0, pf + 1.5, 0.5]);
            self.multiply_add(jets, idx(p, 1, 0), idx(p, 0, 0), &factor, 1.0, x);
        }

        for p in 0..n.saturating_sub(1) {
            for q in 1..n - p {
                let (aq, bq, cq) = jacobi_recurrence_coefficients(2.0 * p as f64 + 1.0, 0.0, q);
                let factor = Affine::new(0.5 * (aq + bq), [0.0, aq, 0.5 * (aq - bq)]);
                self.multiply_add(jets, idx(p, q + 1, 0), idx(p, q, 0), &factor, 1.0, x);
                self.multiply_into(jets, tmp, idx(p, q - 1, 0), &f4, x);
                self.multiply_add(jets, idx(p, q + 1, 0), tmp, &f4, -cq, x);
            }
        }

        for p in 0..n {
            for q in 0..n - p {
                let s = (p + q) as f64;
                let factor = Affine::new(1.0 + s, [0.0, 0.0, 2.0 + s]);
                self.multiply_add(jets, idx(p, q, 1), idx(p, q, 0), &factor, 1.0, x);
            }
        }

        for p in 0..n.saturating_sub(1) {
            for q in 0..n - p - 1 {
                for r in 1..n - p - q {
                    let a = 2.0 * (p + q) as f64 + 2.0;
                    let (ar, br, cr) = jacobi_recurrence_coefficients(a, 0.0, r);
                    let factor = Affine::new(br, [0.0, 0.0, ar]);
                    self.multiply_add(jets, idx(p, q, r + 1), idx(p, q, r), &factor, 1.0, x);
                    self.multiply_add(jets, idx(p, q, r + 1), idx(p, q, r - 1), &one, -cr, x);
                }
            }
        }
    }

    /// Scales the recurrence polynomials to be orthonormal on the reference cell.
    fn normalize(&self, jets: &mut [T]) {
        let n = self.degree;
        let len = self.jet_len();
        let mut scale = |index: usize, factor: f64| {
            let factor: T = convert(factor);
            for entry in &mut jets[index * len..(index + 1) * len] {
                *entry *= factor;
            }
        };
        match self.topology {
            CellTopology::Line => {
                for p in 0..=n {
                    scale(p, (p as f64 + 0.5).sqrt());
                }
            }
            CellTopology::Triangle => {
                for p in 0..=n {
                    for q in 0..=n - p {
                        let (pf, qf) = (p as f64, q as f64);
                        scale(triangle_index(p, q), 2.0 * ((pf + 0.5) * (pf + qf + 1.0)).sqrt());
                    }
                }
            }
            CellTopology::Tetrahedron => {
                for p in 0..=n {
                    for q in 0..=n - p {
                        for r in 0..=n - p - q {
                            let (pf, qf, rf) = (p as f64, q as f64, r as f64);
                            let norm = ((pf + 0.5) * (pf + qf + 1.0) * (pf + qf + rf + 1.5)).sqrt();
                            scale(tetrahedron_index(p, q, r), 2.0 * 2.0f64.sqrt() * norm);
                        }
                    }
                }
            }
        }
    }
}

/// Tabulates the orthonormal basis of the given degree at a set of points.
///
/// Points are the columns of `points`. The result has one row per polynomial, and one column
/// per point and operator component, with components varying fastest. Only `Value`, `Grad`
/// and `Dk` are meaningful for the scalar ambient basis.
pub fn tabulate<'a, T: Real>(
    topology: CellTopology,
    degree: usize,
    operator: Operator,
    points: impl Into<DMatrixView<'a, T>>,
) -> Result<DMatrix<T>, BasisError> {
    let points = points.into();
    let dim = topology.dimension();
    assert_eq!(points.nrows(), dim, "points must have one row per reference coordinate");

    let k = match operator {
        Operator::Value => 0,
        _ => operator
            .as_dk()
            .ok_or_else(|| BasisError::UnsupportedOperator {
                operator,
                function_space: FunctionSpace::HGrad,
                dimension: dim,
            })?,
    };
    let tabulator = OrthonormalTabulator::<T>::new(topology, degree, k);
    let num_components = num_partial_derivatives(k, dim);
    let offset = tabulator.derivative_offset(k);
    let jet_len = tabulator.jet_len();

    let mut scratch = vec![T::zero(); tabulator.scratch_len()];
    let mut point = Vec::with_capacity(dim);
    let mut result = DMatrix::zeros(tabulator.num_polynomials(), points.ncols() * num_components);
    for (j, x) in points.column_iter().enumerate() {
        point.clear();
        point.extend(x.iter().copied());
        let jets = tabulator.tabulate_point(&point, &mut scratch);
        for (i, jet) in jets.chunks_exact(jet_len).enumerate() {
            for c in 0..num_components {
                result[(i, j * num_components + c)] = jet[offset + c];
            }
        }
    }
    Ok(result)
}
