use crate::Handle;
use spacecal_linear::{RotationError, TranslationError};
use thiserror::Error;

/// Why a calibration could not be produced.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CalibrationError {
    #[error("unknown calibration handle {0}")]
    UnknownHandle(Handle),
    #[error("no samples to calibrate")]
    NoSamples,
    #[error("sample {0} has a non-finite position or orientation")]
    NonFiniteSample(usize),
    #[error("rotation phase failed: {0}")]
    Rotation(#[from] RotationError),
    #[error("translation phase failed: {0}")]
    Translation(#[from] TranslationError),
}

impl CalibrationError {
    /// True when more (or better distributed) samples could fix the failure.
    pub fn is_insufficient_data(&self) -> bool {
        matches!(
            self,
            CalibrationError::NoSamples
                | CalibrationError::Rotation(
                    RotationError::NotEnoughCorrespondences { .. }
                        | RotationError::DegenerateAxes(_)
                )
                | CalibrationError::Translation(
                    TranslationError::NotEnoughSamples { .. } | TranslationError::Degenerate(_)
                )
        )
    }
}
