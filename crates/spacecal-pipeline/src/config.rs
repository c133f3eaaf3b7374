use serde::{Deserialize, Serialize};
use spacecal_core::Real;
use spacecal_linear::{
    RotationOptions, TranslationOptions, MIN_AXIS_NORM, MIN_CORRESPONDENCES, MIN_PAIR_ANGLE_RAD,
    MIN_TRANSLATION_SAMPLES,
};

/// Tunables for both calibration phases. Unset fields use the defaults.
///
/// ```
/// use spacecal_pipeline::CalibrationConfig;
///
/// let cfg: CalibrationConfig = serde_json::from_str(r#"{"min_pair_angle_rad": 0.5}"#).unwrap();
/// assert_eq!(cfg.rotation_options().min_angle_rad, 0.5);
/// assert_eq!(cfg.rotation_options().min_axis_norm, 0.01);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    /// Minimum relative rotation (radians) for a sample pair in the rotation phase.
    pub min_pair_angle_rad: Option<Real>,
    /// Minimum unnormalized axis norm for a sample pair in the rotation phase.
    pub min_axis_norm: Option<Real>,
    /// Minimum surviving axis correspondences.
    pub min_rotation_correspondences: Option<usize>,
    /// Minimum samples in the translation phase.
    pub min_translation_samples: Option<usize>,
    /// Singular value cutoff for the translation least-squares solve.
    pub svd_eps: Option<Real>,
}

impl CalibrationConfig {
    pub fn rotation_options(&self) -> RotationOptions {
        RotationOptions {
            min_angle_rad: self.min_pair_angle_rad.unwrap_or(MIN_PAIR_ANGLE_RAD),
            min_axis_norm: self.min_axis_norm.unwrap_or(MIN_AXIS_NORM),
            min_correspondences: self
                .min_rotation_correspondences
                .unwrap_or(MIN_CORRESPONDENCES),
        }
    }

    pub fn translation_options(&self) -> TranslationOptions {
        TranslationOptions {
            svd_eps: self.svd_eps.unwrap_or(Real::EPSILON),
            min_samples: self
                .min_translation_samples
                .unwrap_or(MIN_TRANSLATION_SAMPLES),
        }
    }
}
