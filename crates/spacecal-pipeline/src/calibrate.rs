//! Two-phase calibration over one sample sequence.
//!
//! The first half of the samples estimates the rotation, the second half
//! (after rotating its target poses into the reference orientation frame)
//! estimates the translation. The split is fixed: both phases draw on the
//! same finite sample budget.

use crate::{CalibrationConfig, CalibrationError};
use log::debug;
use spacecal_core::{CalibrationResult, Pose, Quat, Sample};
use spacecal_linear::{
    estimate_rotation, estimate_translation, RotationEstimate, TranslationEstimate,
};

/// Result of [`calibrate`] with per-phase diagnostics.
#[derive(Debug, Clone, Copy)]
pub struct Calibration {
    pub result: CalibrationResult,
    pub rotation: RotationEstimate,
    pub translation: TranslationEstimate,
    pub rotation_samples: usize,
    pub translation_samples: usize,
}

/// Split into the rotation phase (first `N / 2`) and translation phase (rest).
pub fn split_samples(samples: &[Sample]) -> (&[Sample], &[Sample]) {
    samples.split_at(samples.len() / 2)
}

/// Rotate a sample's target pose by `rotation`, as if the calibrated
/// rotation had already been applied to the target tracking space.
pub fn correct_sample(sample: &Sample, rotation: &Quat) -> Sample {
    let target = Pose::new(
        rotation * sample.target.position,
        rotation * sample.target.orientation,
    );
    Sample::new(sample.reference, target)
}

pub fn correct_samples(samples: &[Sample], rotation: &Quat) -> Vec<Sample> {
    samples
        .iter()
        .map(|s| correct_sample(s, rotation))
        .collect()
}

/// Calibrate the offset between the two tracking spaces.
///
/// The returned rotation quaternion is derived from the reported Z-Y-X Euler
/// angles, and that same quaternion corrects the translation-phase samples.
pub fn calibrate(
    samples: &[Sample],
    config: &CalibrationConfig,
) -> Result<Calibration, CalibrationError> {
    if samples.is_empty() {
        return Err(CalibrationError::NoSamples);
    }
    if let Some(index) = samples.iter().position(|s| !s.is_finite()) {
        return Err(CalibrationError::NonFiniteSample(index));
    }

    let (rotation_set, translation_set) = split_samples(samples);
    debug!(
        "calibrating {} samples: {} rotation, {} translation",
        samples.len(),
        rotation_set.len(),
        translation_set.len()
    );

    let rotation = estimate_rotation(rotation_set, &config.rotation_options())?;
    let corrected = correct_samples(translation_set, &rotation.quaternion());
    let translation = estimate_translation(&corrected, &config.translation_options())?;

    Ok(Calibration {
        result: CalibrationResult::from_euler(translation.translation, rotation.euler),
        rotation,
        translation,
        rotation_samples: rotation_set.len(),
        translation_samples: translation_set.len(),
    })
}
