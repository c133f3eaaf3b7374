//! Calibration pipeline for two rigidly attached trackers.
//!
//! Three entry points share one orchestrator ([`calibrate`]):
//!
//! - [`calibrate`] / [`run_calibration`]: batch calibration over a sample
//!   slice or a JSON [`CalibrationInput`].
//! - [`Registry`]: handle-based sample store with lenient unknown-handle
//!   semantics, suited to foreign callers.
//! - [`CalibrationSession`]: incremental `Idle → Rotation → Translation`
//!   collection that calibrates each phase as soon as it is full.
//!
//! ```
//! use spacecal_pipeline::Registry;
//! use spacecal_core::Pose;
//!
//! let registry = Registry::new();
//! let handle = registry.create();
//! registry.append(handle, Pose::identity(), Pose::identity());
//! assert_eq!(registry.len(handle), Some(1));
//!
//! // Not enough data: the lenient API answers with the zeroed result.
//! assert!(registry.compute(handle).is_zeroed());
//! registry.destroy(handle);
//! ```

pub mod calibrate;
pub mod config;
pub mod error;
pub mod io;
pub mod registry;
pub mod session;

pub use calibrate::{calibrate, correct_sample, correct_samples, split_samples, Calibration};
pub use config::CalibrationConfig;
pub use error::CalibrationError;
pub use io::{run_calibration, CalibrationInput, CalibrationReport};
pub use registry::{Handle, Registry};
pub use session::{CalibrationSession, SessionState, DEFAULT_PHASE_SAMPLES};
