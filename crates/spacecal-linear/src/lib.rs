//! Linear estimators for tracker-space calibration.
//!
//! - [`rotation`]: rotation-axis correspondences from sample pairs, fitted
//!   with the Kabsch algorithm.
//! - [`translation`]: stacked rigid-offset constraints solved in the
//!   least-squares sense.

pub mod rotation;
pub mod translation;

/// Iteration cap for the SVDs. Non-finite input never converges.
const SVD_MAX_ITERATIONS: usize = 1_000;

pub use rotation::*;
pub use translation::*;
