//! JSON input and report types for batch calibration.

use crate::{calibrate, CalibrationConfig, CalibrationError};
use serde::{Deserialize, Serialize};
use spacecal_core::{CalibrationResult, Pose, Sample};
use std::time::Instant;

/// Recorded poses of both devices, index-aligned.
///
/// Pose `k` of `reference` and pose `k` of `target` form one sample. Extra
/// poses in the longer list are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CalibrationInput {
    pub reference: Vec<Pose>,
    pub target: Vec<Pose>,
}

impl CalibrationInput {
    pub fn from_samples(samples: &[Sample]) -> Self {
        Self {
            reference: samples.iter().map(|s| s.reference).collect(),
            target: samples.iter().map(|s| s.target).collect(),
        }
    }

    pub fn from_json_str(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn samples(&self) -> Vec<Sample> {
        self.reference
            .iter()
            .zip(&self.target)
            .map(|(r, t)| Sample::new(*r, *t))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationReport {
    pub result: CalibrationResult,
    pub rotation_samples: usize,
    pub translation_samples: usize,
    /// Sample pairs examined by the rotation phase.
    pub rotation_pairs: usize,
    /// Pairs that passed the gate and fed the rotation fit.
    pub correspondences: usize,
    pub translation_equations: usize,
    pub elapsed_ms: f64,
}

impl CalibrationReport {
    pub fn to_json(&self, pretty: bool) -> serde_json::Result<String> {
        if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        }
    }
}

/// Calibrate the recorded samples and report diagnostics.
pub fn run_calibration(
    input: &CalibrationInput,
    config: &CalibrationConfig,
) -> Result<CalibrationReport, CalibrationError> {
    let start = Instant::now();
    let calibration = calibrate(&input.samples(), config)?;
    Ok(CalibrationReport {
        result: calibration.result,
        rotation_samples: calibration.rotation_samples,
        translation_samples: calibration.translation_samples,
        rotation_pairs: calibration.rotation.pairs,
        correspondences: calibration.rotation.correspondences,
        translation_equations: calibration.translation.equations,
        elapsed_ms: start.elapsed().as_secs_f64() * 1000.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Translation3;
    use spacecal_core::synthetic::{orientations, positions, SyntheticRig};
    use spacecal_core::{Iso3, Quat, Vec3};

    #[test]
    fn input_zips_to_shorter_list() {
        let input = CalibrationInput {
            reference: vec![Pose::identity(); 4],
            target: vec![Pose::identity(); 3],
        };
        assert_eq!(input.samples().len(), 3);
    }

    #[test]
    fn input_parses_from_json() {
        let json = r#"{
            "reference": [{"position": [1.0, 2.0, 3.0], "orientation": [0.0, 0.0, 0.0, 1.0]}],
            "target": [{"position": [0.0, 0.0, 0.0], "orientation": [0.0, 0.0, 0.0, 1.0]}]
        }"#;
        let input = CalibrationInput::from_json_str(json).unwrap();
        let samples = input.samples();
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].reference.position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(samples[0].target, Pose::identity());
    }

    #[test]
    fn report_carries_result_and_diagnostics() {
        let t0 = Vec3::new(0.1, 0.2, 0.3);
        let q0 = Quat::from_euler_angles(0.0, 0.0, 0.5);
        let rig = SyntheticRig::new(Iso3::from_parts(Translation3::from(t0), q0));
        let samples = rig.samples(&orientations(16, 3), &positions(16, 3, 1.0));
        let input = CalibrationInput::from_samples(&samples);

        let report = run_calibration(&input, &CalibrationConfig::default()).unwrap();
        assert_eq!(report.rotation_samples, 8);
        assert_eq!(report.translation_samples, 8);
        assert_eq!(report.rotation_pairs, 28);
        assert!(report.correspondences >= 3 && report.correspondences <= 28);
        assert_eq!(report.translation_equations, 28 * 6);
        assert!((report.result.translation() - t0).norm() < 1e-6);

        let json = report.to_json(false).unwrap();
        let back: CalibrationReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back.rotation_pairs, report.rotation_pairs);
        assert!((back.result.translation() - report.result.translation()).norm() < 1e-12);
    }

    #[test]
    fn empty_input_is_an_error() {
        let err = run_calibration(&CalibrationInput::default(), &CalibrationConfig::default())
            .unwrap_err();
        assert_eq!(err, CalibrationError::NoSamples);
    }
}
