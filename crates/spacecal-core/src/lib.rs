//! Core math and data types for `spacecal`.
//!
//! This crate contains:
//! - linear algebra type aliases (`Real`, `Vec3`, `Mat3`, ...),
//! - tracker observations ([`Pose`], [`Sample`]) and the derived [`DeltaSample`],
//! - the ten-value [`CalibrationResult`],
//! - deterministic synthetic rigs for tests and demos ([`synthetic`]).
//!
//! A calibration maps poses reported in the *target* tracking space into the
//! *reference* tracking space:
//! `p_ref = q * p_target + t`, `R_ref = q * R_target`.

/// Linear algebra type aliases.
pub mod math;
/// Tracker poses and paired samples.
pub mod pose;
/// Calibration output value.
pub mod result;
/// Deterministic synthetic sample generation.
pub mod synthetic;

pub use math::*;
pub use pose::*;
pub use result::*;
