//! Reference bases and their evaluation.
use crate::error::BasisError;
use crate::operator::{CoordinateSystem, FunctionSpace, Operator};
use crate::tags::DofTags;
use crate::topology::CellTopology;
use crate::Real;
use davenport::{define_thread_local_workspace, with_thread_local_workspace};
use nalgebra::{DMatrix, DMatrixView, Scalar};
use num::Zero;
use serde::{Deserialize, Serialize};
use std::mem::size_of;

mod hcurl;
mod hdiv;
mod hgrad;
mod hgrad_tet_c2;

pub use hcurl::HCurlTetIn;
pub use hdiv::HDivTetIn;
pub use hgrad::HGradCn;
pub use hgrad_tet_c2::HGradTetC2;

/// Scratch memory in bytes needed to evaluate an operator.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScratchSpaceSize {
    /// Memory shared by all threads of a team.
    pub per_team: usize,
    /// Memory private to each thread.
    pub per_thread: usize,
}

/// A subcell of a reference cell, identified by dimension and ordinal.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Subcell {
    pub dim: usize,
    pub ordinal: usize,
}

/// A request to evaluate an operator at a set of reference points.
#[derive(Debug, Clone)]
pub struct EvaluationRequest<'a, T: Scalar> {
    pub operator: Operator,
    /// Points are stored as columns.
    pub points: DMatrixView<'a, T>,
    /// Restricts evaluation to the basis functions associated with a subcell.
    pub subcell: Option<Subcell>,
}

impl<'a, T: Scalar> EvaluationRequest<'a, T> {
    pub fn new(operator: Operator, points: impl Into<DMatrixView<'a, T>>) -> Self {
        Self {
            operator,
            points: points.into(),
            subcell: None,
        }
    }

    pub fn restricted_to(self, subcell: Subcell) -> Self {
        Self {
            subcell: Some(subcell),
            ..self
        }
    }
}

/// Values of an operator applied to every basis function at every point.
///
/// The logical shape is `[num_functions, num_points, num_components]`. Values are stored point
/// by point, and for each point function by function with the components stored contiguously.
#[derive(Debug, Clone, PartialEq)]
pub struct Tabulation<T> {
    num_functions: usize,
    num_points: usize,
    num_components: usize,
    values: Vec<T>,
}

impl<T: Scalar + Zero> Tabulation<T> {
    pub fn zeros(num_functions: usize, num_points: usize, num_components: usize) -> Self {
        Self {
            num_functions,
            num_points,
            num_components,
            values: vec![T::zero(); num_functions * num_points * num_components],
        }
    }

    pub fn num_functions(&self) -> usize {
        self.num_functions
    }

    pub fn num_points(&self) -> usize {
        self.num_points
    }

    pub fn num_components(&self) -> usize {
        self.num_components
    }

    pub fn shape(&self) -> [usize; 3] {
        [self.num_functions, self.num_points, self.num_components]
    }

    /// Number of values stored per point.
    pub fn point_block_len(&self) -> usize {
        self.num_functions * self.num_components
    }

    /// The value of a component of a basis function at a point.
    ///
    /// # Panics
    ///
    /// Panics if any index is out of bounds.
    pub fn get(&self, function: usize, point: usize, component: usize) -> T {
        assert!(function < self.num_functions && point < self.num_points && component < self.num_components);
        let index = (point * self.num_functions + function) * self.num_components + component;
        self.values[index].clone()
    }

    /// The values at a single point as a `num_components x num_functions` matrix.
    pub fn point_values(&self, point: usize) -> DMatrixView<T> {
        let len = self.point_block_len();
        DMatrixView::from_slice(
            &self.values[point * len..(point + 1) * len],
            self.num_components,
            self.num_functions,
        )
    }

    /// The values of a single basis function as a `num_components x num_points` matrix.
    pub fn function_values(&self, function: usize) -> DMatrix<T> {
        DMatrix::from_fn(self.num_components, self.num_points, |c, j| self.get(function, j, c))
    }

    pub fn as_slice(&self) -> &[T] {
        &self.values
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.values
    }
}

/// Scratch buffer for serial evaluation, stored in a thread-local workspace.
#[derive(Debug)]
struct EvaluationScratch<T> {
    buffer: Vec<T>,
}

impl<T> Default for EvaluationScratch<T> {
    fn default() -> Self {
        Self { buffer: Vec::new() }
    }
}

define_thread_local_workspace!(EVALUATION_WORKSPACE);

/// Copies column `j` of `points` into `point`.
pub(crate) fn copy_point<T: Real>(points: &DMatrixView<T>, j: usize, point: &mut [T]) {
    for (x, &p) in point.iter_mut().zip(points.column(j).iter()) {
        *x = p;
    }
}

/// A basis of a finite-dimensional function space on a reference cell.
///
/// Implementors provide the basis data and the evaluation kernels at single points. Request
/// validation, batching and scratch management are provided on top of these kernels.
pub trait ReferenceBasis<T: Real>: Sync {
    fn cardinality(&self) -> usize;

    /// Polynomial degree of the basis.
    fn degree(&self) -> usize;

    fn cell_topology(&self) -> CellTopology;

    fn function_space(&self) -> FunctionSpace;

    fn coordinate_system(&self) -> CoordinateSystem {
        CoordinateSystem::Cartesian
    }

    fn dof_tags(&self) -> &DofTags;

    /// Reference coordinates of the degrees of freedom, one column per degree of freedom.
    fn dof_coords(&self) -> DMatrixView<T>;

    /// Directions of the degrees of freedom, one column per degree of freedom.
    ///
    /// For vector-valued bases these are the tangents, normals or coordinate directions along
    /// which the field is evaluated. Scalar bases have a single row of ones.
    fn dof_coeffs(&self) -> DMatrixView<T>;

    /// Whether the basis implements the operator.
    ///
    /// Operators that are undefined for the function space are rejected regardless.
    fn implements_operator(&self, operator: Operator) -> bool;

    /// Number of scalars of per-thread scratch memory needed to evaluate the operator at a
    /// single point.
    fn scratch_len(&self, operator: Operator) -> usize;

    /// Evaluates all basis functions at a point.
    ///
    /// `values` holds the components of each basis function contiguously.
    fn evaluate_value_at(&self, point: &[T], values: &mut [T], scratch: &mut [T]);

    /// Evaluates a derivative operator of all basis functions at a point.
    ///
    /// The operator must be supported, see [`num_components`](Self::num_components).
    fn evaluate_derivative_at(&self, operator: Operator, point: &[T], values: &mut [T], scratch: &mut [T]);

    /// The number of components of the operator applied to a basis function, or an error if
    /// the basis does not support the operator.
    fn num_components(&self, operator: Operator) -> Result<usize, BasisError> {
        let dim = self.cell_topology().dimension();
        let num_components = operator.num_components(self.function_space(), dim)?;
        if self.implements_operator(operator) {
            Ok(num_components)
        } else {
            Err(BasisError::UnsupportedOperator {
                operator,
                function_space: self.function_space(),
                dimension: dim,
            })
        }
    }

    /// The exact scratch memory needed to evaluate the operator.
    fn scratch_space_size(&self, operator: Operator) -> Result<ScratchSpaceSize, BasisError> {
        self.num_components(operator)?;
        Ok(ScratchSpaceSize {
            per_team: 0,
            per_thread: self.scratch_len(operator) * size_of::<T>(),
        })
    }

    /// Dispatches to [`evaluate_value_at`](Self::evaluate_value_at) or
    /// [`evaluate_derivative_at`](Self::evaluate_derivative_at).
    fn evaluate_at(&self, operator: Operator, point: &[T], values: &mut [T], scratch: &mut [T]) {
        match operator {
            Operator::Value => self.evaluate_value_at(point, values, scratch),
            _ => self.evaluate_derivative_at(operator, point, values, scratch),
        }
    }

    /// Evaluates the operator at a batch of points using caller-provided scratch memory.
    ///
    /// `output` receives the values point by point, as in [`Tabulation`].
    ///
    /// # Panics
    ///
    /// Panics if the points do not match the cell dimension, if `output` does not have room
    /// for exactly the values of all points, or if `scratch` is shorter than
    /// [`scratch_len`](Self::scratch_len).
    fn evaluate_batch(
        &self,
        operator: Operator,
        points: DMatrixView<T>,
        output: &mut [T],
        scratch: &mut [T],
    ) -> Result<(), BasisError> {
        let num_components = self.num_components(operator)?;
        let dim = self.cell_topology().dimension();
        assert_eq!(points.nrows(), dim, "points must have one row per reference coordinate");
        let block_len = self.cardinality() * num_components;
        assert_eq!(output.len(), block_len * points.ncols(), "output has incorrect size");
        let scratch_len = self.scratch_len(operator);
        assert!(scratch.len() >= scratch_len, "insufficient scratch memory");

        let mut point = [T::zero(); 3];
        for (j, values) in output.chunks_exact_mut(block_len).enumerate() {
            copy_point(&points, j, &mut point[..dim]);
            self.evaluate_at(operator, &point[..dim], values, &mut scratch[..scratch_len]);
        }
        Ok(())
    }

    /// Evaluates the operator at the given points into a preallocated tabulation, using
    /// thread-local scratch memory.
    ///
    /// # Panics
    ///
    /// Panics if the shape of `output` does not match the cardinality, the number of points and
    /// the number of components of the operator.
    fn evaluate_into(&self, output: &mut Tabulation<T>, points: DMatrixView<T>, operator: Operator) -> Result<(), BasisError> {
        let num_components = self.num_components(operator)?;
        assert_eq!(
            output.shape(),
            [self.cardinality(), points.ncols(), num_components],
            "output tabulation has incorrect shape"
        );
        let scratch_len = self.scratch_len(operator);
        with_thread_local_workspace(&EVALUATION_WORKSPACE, |scratch: &mut EvaluationScratch<T>| {
            scratch.buffer.resize(scratch_len, T::zero());
            self.evaluate_batch(operator, points, output.as_mut_slice(), &mut scratch.buffer)
        })
    }

    /// Evaluates a request into a preallocated tabulation.
    ///
    /// Subcell-restricted requests fail with [`BasisError::NotImplemented`].
    fn evaluate(&self, request: &EvaluationRequest<T>, output: &mut Tabulation<T>) -> Result<(), BasisError> {
        if request.subcell.is_some() {
            return Err(BasisError::NotImplemented {
                feature: "subcell-restricted evaluation",
            });
        }
        self.evaluate_into(output, request.points.clone(), request.operator)
    }

    /// Evaluates the operator at the given points.
    fn values(&self, operator: Operator, points: DMatrixView<T>) -> Result<Tabulation<T>, BasisError> {
        let num_components = self.num_components(operator)?;
        let mut output = Tabulation::zeros(self.cardinality(), points.ncols(), num_components);
        self.evaluate_into(&mut output, points, operator)?;
        Ok(output)
    }
}
