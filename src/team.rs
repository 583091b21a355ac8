//! Evaluation by leagues of thread teams.
//!
//! A league consists of teams, each of which processes a contiguous block of points. Every team
//! allocates one scratch arena, and every member of the team receives a private window of the
//! arena sized by [`ReferenceBasis::scratch_space_size`]. Members never share mutable memory.
use crate::basis::{EvaluationRequest, ReferenceBasis, Tabulation};
use crate::error::BasisError;
use crate::operator::Operator;
use crate::Real;
use nalgebra::DMatrixView;
use rayon::prelude::*;
use std::mem::size_of;
use std::ops::Range;

/// A thread within a team of a league.
pub trait TeamMember {
    fn league_rank(&self) -> usize;

    fn team_size(&self) -> usize;

    fn team_rank(&self) -> usize;

    /// The contiguous share of `n` work items assigned to this member.
    fn thread_range(&self, n: usize) -> Range<usize> {
        let chunk = (n + self.team_size() - 1) / self.team_size();
        let start = (self.team_rank() * chunk).min(n);
        let end = (start + chunk).min(n);
        start..end
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TeamThread {
    pub league_rank: usize,
    pub team_size: usize,
    pub team_rank: usize,
}

impl TeamMember for TeamThread {
    fn league_rank(&self) -> usize {
        self.league_rank
    }

    fn team_size(&self) -> usize {
        self.team_size
    }

    fn team_rank(&self) -> usize {
        self.team_rank
    }
}

/// Evaluates the share of a team's points assigned to one member.
///
/// `team_points` are all points processed by the member's team, and `member_output` receives
/// the values of the member's share only. `window` is the member's private scratch memory.
///
/// # Panics
///
/// Panics if `member_output` does not match the member's share of points, or the window is
/// smaller than the per-thread scratch requirement.
pub fn evaluate_member<T, B>(
    basis: &B,
    member: &dyn TeamMember,
    operator: Operator,
    team_points: DMatrixView<T>,
    member_output: &mut [T],
    window: &mut [T],
) -> Result<(), BasisError>
where
    T: Real,
    B: ReferenceBasis<T> + ?Sized,
{
    let range = member.thread_range(team_points.ncols());
    let member_points = team_points.columns(range.start, range.len());
    basis.evaluate_batch(operator, member_points, member_output, window)
}

/// Distributes points over a league of teams of rayon tasks.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TeamPolicy {
    team_size: usize,
    points_per_team: usize,
}

impl TeamPolicy {
    /// # Panics
    ///
    /// Panics if `team_size` or `points_per_team` is zero.
    pub fn new(team_size: usize, points_per_team: usize) -> Self {
        assert!(team_size > 0, "team size must be positive");
        assert!(points_per_team > 0, "teams must process at least one point");
        Self {
            team_size,
            points_per_team,
        }
    }

    pub fn team_size(&self) -> usize {
        self.team_size
    }

    pub fn points_per_team(&self) -> usize {
        self.points_per_team
    }

    /// Number of teams needed to process the given number of points.
    pub fn league_size(&self, num_points: usize) -> usize {
        (num_points + self.points_per_team - 1) / self.points_per_team
    }

    /// Number of scalars of scratch memory allocated by each team.
    pub fn team_scratch_len<T, B>(&self, basis: &B, operator: Operator) -> Result<usize, BasisError>
    where
        T: Real,
        B: ReferenceBasis<T> + ?Sized,
    {
        let size = basis.scratch_space_size(operator)?;
        Ok((size.per_team + self.team_size * size.per_thread) / size_of::<T>())
    }

    /// Evaluates the operator at the given points into a preallocated tabulation.
    ///
    /// # Panics
    ///
    /// Panics if `points` does not have one row per reference coordinate, or if the shape of
    /// `output` does not match the basis, points and operator.
    pub fn evaluate_into<T, B>(
        &self,
        basis: &B,
        output: &mut Tabulation<T>,
        points: DMatrixView<T>,
        operator: Operator,
    ) -> Result<(), BasisError>
    where
        T: Real,
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
        let size = basis.scratch_space_size(operator)?;
        let per_team = size.per_team / size_of::<T>();
        let per_thread = size.per_thread / size_of::<T>();
        let block_len = output.point_block_len();
        let team_size = self.team_size;

        output
            .as_mut_slice()
            .par_chunks_mut(self.points_per_team * block_len)
            .enumerate()
            .try_for_each(|(league_rank, team_output)| {
                let mut arena = vec![T::zero(); per_team + team_size * per_thread];
                let (_shared, thread_arena) = arena.split_at_mut(per_team);
                let windows: Vec<&mut [T]> = if per_thread > 0 {
                    thread_arena.chunks_mut(per_thread).collect()
                } else {
                    (0..team_size).map(|_| <&mut [T]>::default()).collect()
                };

                let num_team_points = team_output.len() / block_len;
                let first_point = league_rank * self.points_per_team;
                let team_points = points.columns(first_point, num_team_points);
                let points_per_member = (num_team_points + team_size - 1) / team_size;

                team_output
                    .par_chunks_mut(points_per_member * block_len)
                    .zip(windows.into_par_iter())
                    .enumerate()
                    .try_for_each(|(team_rank, (member_output, window))| {
                        let member = TeamThread {
                            league_rank,
                            team_size,
                            team_rank,
                        };
                        evaluate_member(basis, &member, operator, team_points, member_output, window)
                    })
            })
    }

    /// Evaluates a request into a preallocated tabulation.
    ///
    /// Subcell-restricted requests fail with [`BasisError::NotImplemented`].
    pub fn evaluate<T, B>(
        &self,
        basis: &B,
        request: &EvaluationRequest<T>,
        output: &mut Tabulation<T>,
    ) -> Result<(), BasisError>
    where
        T: Real,
        B: ReferenceBasis<T> + ?Sized,
    {
        if request.subcell.is_some() {
            return Err(BasisError::NotImplemented {
                feature: "subcell-restricted evaluation",
            });
        }
        self.evaluate_into(basis, output, request.points.clone(), request.operator)
    }
}
