//! Data-parallel evaluation over points.
use crate::basis::{copy_point, ReferenceBasis, Tabulation};
use crate::error::BasisError;
use crate::operator::Operator;
use crate::Real;
use nalgebra::DMatrixView;
use rayon::prelude::*;
use std::cell::RefCell;
use thread_local::ThreadLocal;

/// Evaluates bases in parallel over points, with scratch memory private to each worker thread.
///
/// Batches with fewer points than the minimum task size are evaluated sequentially on the
/// calling thread.
#[derive(Debug)]
pub struct ParBasisEvaluator<T: Send> {
    workspace: ThreadLocal<RefCell<Vec<T>>>,
    min_points_per_task: usize,
}

impl<T: Real> Default for ParBasisEvaluator<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Real> ParBasisEvaluator<T> {
    pub fn new() -> Self {
        Self {
            workspace: ThreadLocal::new(),
            min_points_per_task: 64,
        }
    }

    pub fn with_min_points_per_task(self, min_points_per_task: usize) -> Self {
        Self {
            min_points_per_task: min_points_per_task.max(1),
            ..self
        }
    }

    /// Evaluates the operator at the given points into a preallocated tabulation.
    ///
    /// # Panics
    ///
    /// Panics if `points` does not have one row per reference coordinate, or if the shape of
    /// `output` does not match the basis, points and operator.
    pub fn evaluate_into<B>(
        &self,
        basis: &B,
        output: &mut Tabulation<T>,
        points: DMatrixView<T>,
        operator: Operator,
    ) -> Result<(), BasisError>
    where
        B: ReferenceBasis<T> + ?Sized,
    {
        let num_components = basis.num_components(operator)?;
        assert_eq!(
            points.nrows(),
            basis.cell_topology().dimension(),
            "points must have one row per reference coordinate"
        );
        assert_eq!(
            output.shape(),
            [basis.cardinality(), points.ncols(), num_components],
            "output tabulation has incorrect shape"
        );
        if points.ncols() < self.min_points_per_task {
            return basis.evaluate_into(output, points, operator);
        }

        let dim = basis.cell_topology().dimension();
        let scratch_len = basis.scratch_len(operator);
        let block_len = output.point_block_len();
        output
            .as_mut_slice()
            .par_chunks_mut(block_len)
            .enumerate()
            .with_min_len(self.min_points_per_task)
            .for_each(|(j, values)| {
                let mut scratch = self.workspace.get_or_default().borrow_mut();
                if scratch.len() < scratch_len {
                    scratch.resize(scratch_len, T::zero());
                }
                let mut point = [T::zero(); 3];
                copy_point(&points, j, &mut point[..dim]);
                basis.evaluate_at(operator, &point[..dim], values, &mut scratch[..scratch_len]);
            });
        Ok(())
    }

    /// Evaluates the operator at the given points.
    pub fn values<B>(&self, basis: &B, operator: Operator, points: DMatrixView<T>) -> Result<Tabulation<T>, BasisError>
    where
        B: ReferenceBasis<T> + ?Sized,
    {
        let num_components = basis.num_components(operator)?;
        let mut output = Tabulation::zeros(basis.cardinality(), points.ncols(), num_components);
        self.evaluate_into(basis, &mut output, points, operator)?;
        Ok(output)
    }
}
