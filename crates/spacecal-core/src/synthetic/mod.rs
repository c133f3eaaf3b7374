//! Deterministic synthetic data generation helpers.
//!
//! Builds sample streams for two rigidly attached trackers whose tracking
//! spaces differ by a known transform. Used by tests and demos.
//!
//! The helpers avoid RNG crates so the generated sequences are stable across
//! versions and platforms.
//!
//! # Example
//!
//! ```
//! use spacecal_core::synthetic::{orientations, positions, SyntheticRig};
//! use spacecal_core::{Iso3, Quat};
//! use nalgebra::Translation3;
//!
//! let space = Iso3::from_parts(
//!     Translation3::new(0.1, 0.0, 0.0),
//!     Quat::from_euler_angles(0.0, 0.0, std::f64::consts::FRAC_PI_2),
//! );
//! let rig = SyntheticRig::new(space);
//! let samples = rig.samples(&orientations(12, 7), &positions(12, 7, 1.5));
//! assert_eq!(samples.len(), 12);
//! ```

pub mod noise;
pub mod rig;

pub use noise::{orientations, positions};
pub use rig::SyntheticRig;
