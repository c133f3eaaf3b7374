//! Translation offset between two tracking spaces.
//!
//! Expects samples whose target poses have already been rotated into the
//! reference orientation frame. For a rigid rig the quantity
//! `Rᵀ · (p_ref − p_target)` differs between samples only through the
//! unknown translation `t`, which gives, for every sample pair `(i, j)` and
//! for both trackers' orientations `R`:
//!
//! `(R_jᵀ − R_iᵀ) · t = R_jᵀ (p_ref,j − p_target,j) − R_iᵀ (p_ref,i − p_target,i)`
//!
//! All blocks are stacked and solved in the least-squares sense via SVD.

use crate::SVD_MAX_ITERATIONS;
use log::{debug, info};
use nalgebra::{DMatrix, DVector};
use spacecal_core::{Mat3, Real, Sample, Vec3};
use thiserror::Error;

/// Minimum number of samples for the translation phase.
pub const MIN_TRANSLATION_SAMPLES: usize = 3;

/// Smallest-to-largest singular value ratio below which the stacked system
/// does not determine all three components of `t`.
const RANK_TOLERANCE: Real = 1e-9;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum TranslationError {
    #[error("need at least {required} samples for translation, got {found}")]
    NotEnoughSamples { found: usize, required: usize },
    #[error("sample {0} has a non-finite position or orientation")]
    NonFiniteSample(usize),
    #[error("translation system is rank deficient (singular values {0:?})")]
    Degenerate([Real; 3]),
    #[error("svd did not converge during translation estimation")]
    SvdFailed,
    #[error("linear solve failed during translation estimation: {0}")]
    SolveFailed(&'static str),
}

/// Settings for [`estimate_translation`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TranslationOptions {
    /// Singular values below this are treated as zero by the solver.
    pub svd_eps: Real,
    /// Fewer samples is reported as insufficient data.
    pub min_samples: usize,
}

impl Default for TranslationOptions {
    fn default() -> Self {
        Self {
            svd_eps: Real::EPSILON,
            min_samples: MIN_TRANSLATION_SAMPLES,
        }
    }
}

/// Output of the translation phase.
#[derive(Debug, Clone, Copy)]
pub struct TranslationEstimate {
    /// Translation in the trackers' native unit.
    pub translation: Vec3,
    /// Unordered sample pairs used.
    pub pairs: usize,
    /// Rows of the stacked linear system.
    pub equations: usize,
}

impl TranslationEstimate {
    /// Translation ×100, for centimeter display.
    pub fn centimeters(&self) -> Vec3 {
        self.translation * 100.0
    }
}

/// One 3-row constraint block `coefficients · t = constant`.
fn constraint(
    rot_i: &Mat3,
    rot_j: &Mat3,
    offset_i: &Vec3,
    offset_j: &Vec3,
) -> (Mat3, Vec3) {
    let q_i = rot_i.transpose();
    let q_j = rot_j.transpose();
    (q_j - q_i, q_j * offset_j - q_i * offset_i)
}

/// Build the stacked system `coefficients · t = constants`.
///
/// Each unordered pair contributes two 3-row blocks: one using the reference
/// orientations and one using the target orientations.
pub fn translation_system(samples: &[Sample]) -> (DMatrix<Real>, DVector<Real>) {
    let n = samples.len();
    let pairs = n * n.saturating_sub(1) / 2;
    let rows = pairs * 2 * 3;

    let mut coefficients = DMatrix::<Real>::zeros(rows, 3);
    let mut constants = DVector::<Real>::zeros(rows);

    let rotations: Vec<(Mat3, Mat3)> = samples
        .iter()
        .map(|s| (s.reference.rotation_matrix(), s.target.rotation_matrix()))
        .collect();
    let offsets: Vec<Vec3> = samples
        .iter()
        .map(|s| s.reference.position - s.target.position)
        .collect();

    let mut row = 0;
    for i in 0..n {
        for j in 0..i {
            let (ref_i, target_i) = &rotations[i];
            let (ref_j, target_j) = &rotations[j];

            for (rot_i, rot_j) in [(ref_i, ref_j), (target_i, target_j)] {
                let (coeff, constant) = constraint(rot_i, rot_j, &offsets[i], &offsets[j]);
                coefficients.view_mut((row, 0), (3, 3)).copy_from(&coeff);
                constants.rows_mut(row, 3).copy_from(&constant);
                row += 3;
            }
        }
    }

    (coefficients, constants)
}

/// Estimate the translation between the two tracking spaces.
pub fn estimate_translation(
    samples: &[Sample],
    opts: &TranslationOptions,
) -> Result<TranslationEstimate, TranslationError> {
    let required = opts.min_samples.max(2);
    if samples.len() < required {
        return Err(TranslationError::NotEnoughSamples {
            found: samples.len(),
            required,
        });
    }

    if let Some(index) = samples.iter().position(|s| !s.is_finite()) {
        return Err(TranslationError::NonFiniteSample(index));
    }

    let (coefficients, constants) = translation_system(samples);
    let equations = coefficients.nrows();
    debug!(
        "translation: {} samples, system {}x{}",
        samples.len(),
        equations,
        coefficients.ncols()
    );

    let svd = coefficients
        .try_svd(true, true, Real::EPSILON, SVD_MAX_ITERATIONS)
        .ok_or(TranslationError::SvdFailed)?;
    let mut sv = [
        svd.singular_values[0],
        svd.singular_values[1],
        svd.singular_values[2],
    ];
    sv.sort_by(|a, b| b.total_cmp(a));
    if sv[2] <= sv[0] * RANK_TOLERANCE || sv[2].is_nan() {
        return Err(TranslationError::Degenerate(sv));
    }

    let x = svd
        .solve(&constants, opts.svd_eps)
        .map_err(TranslationError::SolveFailed)?;
    let translation = Vec3::new(x[0], x[1], x[2]);

    let cm = translation * 100.0;
    info!(
        "Calibrated translation x={:.2} y={:.2} z={:.2}",
        cm.x, cm.y, cm.z
    );

    Ok(TranslationEstimate {
        translation,
        pairs: samples.len() * (samples.len() - 1) / 2,
        equations,
    })
}
