//! Reference finite element bases on simplices.
//!
//! Bases are constructed in a Vandermonde style: an orthonormal polynomial expansion spans the
//! ambient space, the target space is extracted as a column space, and the basis is made dual to
//! a set of degrees of freedom. Evaluation follows a scratch-space contract that allows bases to
//! be evaluated concurrently without hidden allocations.
use nalgebra::RealField;

pub mod basis;
pub mod construction;
pub mod error;
pub mod lattice;
pub mod linalg;
pub mod operator;
pub mod parallel;
pub mod polynomials;
pub mod quadrature;
pub mod tags;
pub mod team;
pub mod topology;

#[cfg(feature = "proptest")]
pub mod proptest;

pub use basis::{
    EvaluationRequest, HCurlTetIn, HDivTetIn, HGradCn, HGradTetC2, ReferenceBasis, ScratchSpaceSize, Subcell,
    Tabulation,
};
pub use construction::ConstructionSettings;
pub use error::BasisError;
pub use lattice::PointFamily;
pub use operator::{CoordinateSystem, FunctionSpace, Operator};
pub use topology::CellTopology;

pub extern crate nalgebra;

/// Scalar types supported by the bases.
///
/// Used as a trait alias for the traits needed by generic routines in this crate.
pub trait Real: RealField + Copy {}

impl<T> Real for T where T: RealField + Copy {}
