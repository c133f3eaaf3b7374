//! Incremental calibration driven by a sample stream.
//!
//! A session collects a fixed number of samples per phase. When the
//! rotation phase is full its rotation is estimated right away and every
//! later sample is corrected with it on arrival; when the translation phase
//! is full the session finishes and goes back to idle.
//!
//! ```text
//! Idle --start--> Rotation --N samples--> Translation --N samples--> Idle
//! ```
//!
//! Pacing samples so consecutive ones differ meaningfully is the caller's
//! job; the session does not look at time.

use crate::{correct_sample, CalibrationConfig, CalibrationError};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use spacecal_core::{CalibrationResult, Quat, Sample, Vec3};
use spacecal_linear::{estimate_rotation, estimate_translation, RotationEstimate};

/// Samples collected per phase by default.
pub const DEFAULT_PHASE_SAMPLES: usize = 250;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    #[default]
    Idle,
    Rotation,
    Translation,
}

#[derive(Debug, Clone)]
pub struct CalibrationSession {
    config: CalibrationConfig,
    phase_samples: usize,
    state: SessionState,
    samples: Vec<Sample>,
    rotation: Option<(RotationEstimate, Quat)>,
    result: Option<CalibrationResult>,
}

impl Default for CalibrationSession {
    fn default() -> Self {
        Self::new(CalibrationConfig::default())
    }
}

impl CalibrationSession {
    pub fn new(config: CalibrationConfig) -> Self {
        Self {
            config,
            phase_samples: DEFAULT_PHASE_SAMPLES,
            state: SessionState::Idle,
            samples: Vec::new(),
            rotation: None,
            result: None,
        }
    }

    /// Set the per-phase sample count (at least 2).
    pub fn with_phase_samples(mut self, phase_samples: usize) -> Self {
        self.phase_samples = phase_samples.max(2);
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn phase_samples(&self) -> usize {
        self.phase_samples
    }

    /// Samples collected in the current phase.
    pub fn collected(&self) -> usize {
        self.samples.len()
    }

    /// Rotation estimated by the last completed rotation phase.
    pub fn rotation(&self) -> Option<&RotationEstimate> {
        self.rotation.as_ref().map(|(estimate, _)| estimate)
    }

    /// Result of the last completed calibration.
    pub fn result(&self) -> Option<&CalibrationResult> {
        self.result.as_ref()
    }

    /// Discard any progress and begin the rotation phase.
    pub fn start(&mut self) {
        self.samples.clear();
        self.rotation = None;
        self.result = None;
        self.state = SessionState::Rotation;
        debug!("calibration session started ({} samples per phase)", self.phase_samples);
    }

    /// Abandon the current run. The last finished result is kept.
    pub fn cancel(&mut self) {
        self.samples.clear();
        self.state = SessionState::Idle;
    }

    /// Feed one sample and advance the phase when it is full.
    ///
    /// Samples pushed while idle are ignored. A phase that fails to estimate
    /// returns the session to idle and reports the error.
    pub fn push(&mut self, sample: Sample) -> Result<SessionState, CalibrationError> {
        match self.state {
            SessionState::Idle => return Ok(SessionState::Idle),
            SessionState::Rotation => self.samples.push(sample),
            SessionState::Translation => {
                let q = match &self.rotation {
                    Some((_, q)) => *q,
                    None => Quat::identity(),
                };
                self.samples.push(correct_sample(&sample, &q));
            }
        }

        if self.samples.len() < self.phase_samples {
            return Ok(self.state);
        }

        let advanced = match self.state {
            SessionState::Rotation => self.finish_rotation(),
            SessionState::Translation => self.finish_translation(),
            SessionState::Idle => Ok(()),
        };
        self.samples.clear();
        if let Err(err) = advanced {
            self.state = SessionState::Idle;
            return Err(err);
        }
        Ok(self.state)
    }

    fn finish_rotation(&mut self) -> Result<(), CalibrationError> {
        let estimate = estimate_rotation(&self.samples, &self.config.rotation_options())?;
        let q = estimate.quaternion();
        self.rotation = Some((estimate, q));
        self.state = SessionState::Translation;
        Ok(())
    }

    fn finish_translation(&mut self) -> Result<(), CalibrationError> {
        let estimate = estimate_translation(&self.samples, &self.config.translation_options())?;
        let euler = match &self.rotation {
            Some((r, _)) => r.euler,
            None => Vec3::zeros(),
        };
        let result = CalibrationResult::from_euler(estimate.translation, euler);
        info!(
            "calibration session finished: t=({:.4}, {:.4}, {:.4}) euler=({:.4}, {:.4}, {:.4})",
            result.tx, result.ty, result.tz, result.rex, result.rey, result.rez
        );
        self.result = Some(result);
        self.state = SessionState::Idle;
        Ok(())
    }
}
