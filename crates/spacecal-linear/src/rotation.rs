//! Rotation offset between two tracking spaces.
//!
//! When two trackers are rigidly attached they rotate as a pair, so the axis
//! of the relative rotation between any two samples is the same physical
//! axis seen from both tracking spaces. Each sufficiently distinct pair of
//! samples yields one axis correspondence; the Kabsch algorithm then finds
//! the rotation that best aligns the target axes with the reference axes.

use crate::SVD_MAX_ITERATIONS;
use log::{debug, info, trace};
use spacecal_core::{DeltaSample, Mat3, Quat, Real, Rot3, Sample, Vec3};
use thiserror::Error;

/// Minimum relative rotation (radians) for a pair to be used.
pub const MIN_PAIR_ANGLE_RAD: Real = 0.4;
/// Minimum norm of the unnormalized axis vector (`2 sin θ`).
pub const MIN_AXIS_NORM: Real = 0.01;
/// Minimum number of axis correspondences fed to Kabsch. Fewer centered
/// axes never span a plane.
pub const MIN_CORRESPONDENCES: usize = 3;

/// Relative size of the second singular value of the cross covariance
/// below which the fit is rank deficient.
const RANK_TOLERANCE: Real = 1e-9;

/// `cos(pitch)` below which the Z-Y-X decomposition is treated as gimbal
/// locked.
const GIMBAL_TOLERANCE: Real = 1e-8;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RotationError {
    #[error("need at least {required} rotation correspondences, got {found}")]
    NotEnoughCorrespondences { found: usize, required: usize },
    #[error("rotation axes do not span a plane (singular values {0:?})")]
    DegenerateAxes([Real; 3]),
    #[error("svd failed during rotation estimation")]
    SvdFailed,
}

/// Pair gate and acceptance settings for [`estimate_rotation`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationOptions {
    /// Both relative rotations of a pair must exceed this angle (radians).
    pub min_angle_rad: Real,
    /// Both unnormalized axis vectors must exceed this norm.
    pub min_axis_norm: Real,
    /// Fewer surviving correspondences is reported as insufficient data.
    /// Values below [`MIN_CORRESPONDENCES`] are raised to it.
    pub min_correspondences: usize,
}

impl Default for RotationOptions {
    fn default() -> Self {
        Self {
            min_angle_rad: MIN_PAIR_ANGLE_RAD,
            min_axis_norm: MIN_AXIS_NORM,
            min_correspondences: MIN_CORRESPONDENCES,
        }
    }
}

/// Output of the rotation phase.
#[derive(Debug, Clone, Copy)]
pub struct RotationEstimate {
    /// Rotation taking target-space directions into reference space.
    pub rotation: Rot3,
    /// Z-Y-X Euler angles `(rex, rey, rez)` of `rotation`, radians.
    pub euler: Vec3,
    /// Unordered sample pairs examined.
    pub pairs: usize,
    /// Pairs that passed the gate.
    pub correspondences: usize,
}

impl RotationEstimate {
    /// Quaternion rebuilt from [`euler`](Self::euler). Equal to `rotation`
    /// up to rounding, gimbal lock included.
    pub fn quaternion(&self) -> Quat {
        Quat::from_euler_angles(self.euler.x, self.euler.y, self.euler.z)
    }
}

/// Unnormalized rotation axis of `r`, equal to `2 sin θ · axis`.
pub fn axis_from_rotation(r: &Mat3) -> Vec3 {
    Vec3::new(
        r[(2, 1)] - r[(1, 2)],
        r[(0, 2)] - r[(2, 0)],
        r[(1, 0)] - r[(0, 1)],
    )
}

/// Z-Y-X Euler angles `(roll, pitch, yaw)` of `r = Rz(yaw) · Ry(pitch) · Rx(roll)`.
///
/// Near pitch `±π/2` only `yaw ∓ roll` is determined; roll is reported as
/// zero there so that the angles still rebuild `r`.
pub fn euler_zyx(r: &Mat3) -> Vec3 {
    let cos_pitch = r[(0, 0)].hypot(r[(1, 0)]);
    let pitch = (-r[(2, 0)]).atan2(cos_pitch);
    if cos_pitch < GIMBAL_TOLERANCE {
        let yaw = (-r[(0, 1)]).atan2(r[(1, 1)]);
        return Vec3::new(0.0, pitch, yaw);
    }
    let roll = r[(2, 1)].atan2(r[(2, 2)]);
    let yaw = r[(1, 0)].atan2(r[(0, 0)]);
    Vec3::new(roll, pitch, yaw)
}

/// Rotation angle of `r` from its trace, in `[0, π]`.
pub fn angle_from_rotation(r: &Mat3) -> Real {
    ((r.trace() - 1.0) * 0.5).clamp(-1.0, 1.0).acos()
}

/// Axis correspondence for the relative motion between samples `a` and `b`.
///
/// Returns `None` when either relative rotation is too small or its axis is
/// too short to give a stable direction.
pub fn delta_rotation(a: &Sample, b: &Sample, opts: &RotationOptions) -> Option<DeltaSample> {
    let d_ref = a.reference.rotation_matrix() * b.reference.rotation_matrix().transpose();
    let d_target = a.target.rotation_matrix() * b.target.rotation_matrix().transpose();

    let axis_ref = axis_from_rotation(&d_ref);
    let axis_target = axis_from_rotation(&d_target);
    let angle_ref = angle_from_rotation(&d_ref);
    let angle_target = angle_from_rotation(&d_target);

    let valid = angle_ref > opts.min_angle_rad
        && angle_target > opts.min_angle_rad
        && axis_ref.norm() > opts.min_axis_norm
        && axis_target.norm() > opts.min_axis_norm;

    if !valid {
        trace!(
            "pair rejected: angles {:.3}/{:.3} rad, axis norms {:.4}/{:.4}",
            angle_ref,
            angle_target,
            axis_ref.norm(),
            axis_target.norm()
        );
        return None;
    }

    Some(DeltaSample {
        reference: axis_ref.normalize(),
        target: axis_target.normalize(),
    })
}

/// Axis correspondences for every unordered sample pair that passes the gate.
pub fn collect_deltas(samples: &[Sample], opts: &RotationOptions) -> Vec<DeltaSample> {
    let mut deltas = Vec::new();
    for i in 0..samples.len() {
        for j in 0..i {
            if let Some(delta) = delta_rotation(&samples[i], &samples[j], opts) {
                deltas.push(delta);
            }
        }
    }
    deltas
}

/// Kabsch fit over axis correspondences.
///
/// Returns the rotation `R` minimizing `Σ |R · target_k − reference_k|²`,
/// i.e. the transpose of the classic `V D Uᵀ` solution for
/// `H = Σ reference_k · target_kᵀ`.
pub fn kabsch(deltas: &[DeltaSample]) -> Result<Mat3, RotationError> {
    if deltas.len() < MIN_CORRESPONDENCES {
        return Err(RotationError::NotEnoughCorrespondences {
            found: deltas.len(),
            required: MIN_CORRESPONDENCES,
        });
    }

    let n = deltas.len() as Real;
    let mut c_ref = Vec3::zeros();
    let mut c_target = Vec3::zeros();
    for d in deltas {
        c_ref += d.reference;
        c_target += d.target;
    }
    c_ref /= n;
    c_target /= n;

    let mut h = Mat3::zeros();
    for d in deltas {
        let dr = d.reference - c_ref;
        let dt = d.target - c_target;
        h += dr * dt.transpose();
    }

    let svd = h
        .try_svd(true, true, Real::EPSILON, SVD_MAX_ITERATIONS)
        .ok_or(RotationError::SvdFailed)?;
    let mut sv = [
        svd.singular_values[0],
        svd.singular_values[1],
        svd.singular_values[2],
    ];
    sv.sort_by(|a, b| b.total_cmp(a));
    // Centered unit axes: singular values scale with the number of points.
    if sv[1] <= RANK_TOLERANCE * n.max(sv[0]) || sv[1].is_nan() {
        return Err(RotationError::DegenerateAxes(sv));
    }

    let u = svd.u.ok_or(RotationError::SvdFailed)?;
    let v_t = svd.v_t.ok_or(RotationError::SvdFailed)?;

    // Guard against a reflection.
    let mut d = Mat3::identity();
    if (u * v_t).determinant() < 0.0 {
        d[(2, 2)] = -1.0;
    }

    let r = v_t.transpose() * d * u.transpose();
    Ok(r.transpose())
}

/// Estimate the rotation between the two tracking spaces.
///
/// Every unordered pair of `samples` is considered once, so the cost is
/// quadratic in the number of samples.
pub fn estimate_rotation(
    samples: &[Sample],
    opts: &RotationOptions,
) -> Result<RotationEstimate, RotationError> {
    let pairs = samples.len() * samples.len().saturating_sub(1) / 2;
    let deltas = collect_deltas(samples, opts);
    debug!(
        "rotation: {} samples, {} pairs, {} correspondences",
        samples.len(),
        pairs,
        deltas.len()
    );

    let required = opts.min_correspondences.max(MIN_CORRESPONDENCES);
    if deltas.len() < required {
        return Err(RotationError::NotEnoughCorrespondences {
            found: deltas.len(),
            required,
        });
    }

    let rotation = Rot3::from_matrix_unchecked(kabsch(&deltas)?);
    let euler = euler_zyx(rotation.matrix());
    info!(
        "Calibrated rotation x={:.2} y={:.2} z={:.2}",
        euler.x, euler.y, euler.z
    );

    Ok(RotationEstimate {
        rotation,
        euler,
        pairs,
        correspondences: deltas.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Translation3;
    use spacecal_core::synthetic::{orientations, positions, SyntheticRig};
    use spacecal_core::{Iso3, Pose, Quat};
    use std::f64::consts::FRAC_PI_2;

    fn rig(rotation: Quat) -> SyntheticRig {
        SyntheticRig::new(Iso3::from_parts(Translation3::new(0.3, -0.2, 0.1), rotation))
    }

    fn sample_with_orientation(q: Quat) -> Sample {
        let pose = Pose::new(Vec3::zeros(), q);
        Sample::new(pose, pose)
    }

    #[test]
    fn axis_and_angle_of_known_rotation() {
        let r = Rot3::from_axis_angle(&Vec3::y_axis(), 0.7).into_inner();
        let axis = axis_from_rotation(&r);
        assert!((axis - Vec3::y() * 2.0 * (0.7 as Real).sin()).norm() < 1e-12);
        assert!((angle_from_rotation(&r) - 0.7).abs() < 1e-12);
        assert_eq!(angle_from_rotation(&Mat3::identity()), 0.0);
    }

    #[test]
    fn gate_rejects_pairs_closer_than_threshold() {
        let opts = RotationOptions::default();
        let base = Quat::identity();
        let near = Quat::from_axis_angle(&Vec3::x_axis(), 0.39);
        let far = Quat::from_axis_angle(&Vec3::x_axis(), 0.41);

        let a = sample_with_orientation(base);
        assert!(delta_rotation(&a, &sample_with_orientation(near), &opts).is_none());
        assert!(delta_rotation(&a, &sample_with_orientation(far), &opts).is_some());

        // Three samples within 0.2 rad of each other: 3 pairs, none usable.
        let close = [
            sample_with_orientation(base),
            sample_with_orientation(Quat::from_axis_angle(&Vec3::z_axis(), 0.1)),
            sample_with_orientation(Quat::from_axis_angle(&Vec3::z_axis(), 0.2)),
        ];
        assert!(collect_deltas(&close, &opts).is_empty());
        let err = estimate_rotation(&close, &opts).unwrap_err();
        assert_eq!(
            err,
            RotationError::NotEnoughCorrespondences {
                found: 0,
                required: MIN_CORRESPONDENCES
            }
        );
    }

    #[test]
    fn gate_counts_only_distinct_pairs() {
        let opts = RotationOptions::default();
        // Two clusters of near-identical orientations: only cross-cluster pairs survive.
        let samples = [
            sample_with_orientation(Quat::identity()),
            sample_with_orientation(Quat::from_axis_angle(&Vec3::x_axis(), 0.05)),
            sample_with_orientation(Quat::from_axis_angle(&Vec3::y_axis(), 1.0)),
            sample_with_orientation(Quat::from_axis_angle(&Vec3::y_axis(), 1.05)),
        ];
        assert_eq!(collect_deltas(&samples, &opts).len(), 4);
    }

    #[test]
    fn delta_axes_are_unit_and_related_by_space_rotation() {
        let q0 = Quat::from_euler_angles(0.2, -0.5, 1.0);
        let samples = rig(q0).samples(&orientations(6, 5), &positions(6, 5, 1.0));
        let deltas = collect_deltas(&samples, &RotationOptions::default());
        assert!(!deltas.is_empty());
        for d in deltas {
            assert!((d.reference.norm() - 1.0).abs() < 1e-12);
            assert!((q0 * d.target - d.reference).norm() < 1e-9);
        }
    }

    #[test]
    fn identical_trackers_give_identity() {
        let samples: Vec<Sample> = orientations(10, 1)
            .into_iter()
            .map(sample_with_orientation)
            .collect();
        let est = estimate_rotation(&samples, &RotationOptions::default()).unwrap();
        assert!((est.rotation.into_inner() - Mat3::identity()).norm() < 1e-9);
        assert!(est.euler.norm() < 1e-9);
        assert_eq!(est.pairs, 45);
    }

    #[test]
    fn recovers_known_rotation() {
        let q0 = Quat::from_euler_angles(0.3, -0.2, 1.3);
        let samples = rig(q0).samples(&orientations(8, 9), &positions(8, 9, 1.0));
        let est = estimate_rotation(&samples, &RotationOptions::default()).unwrap();

        let q = Quat::from_rotation_matrix(&est.rotation);
        assert!(q.angle_to(&q0) < 1e-6, "rotation error {}", q.angle_to(&q0));
        assert!((est.euler - Vec3::new(0.3, -0.2, 1.3)).norm() < 1e-8);
    }

    #[test]
    fn quarter_turn_about_z_reports_yaw() {
        let q0 = Quat::from_axis_angle(&Vec3::z_axis(), FRAC_PI_2);
        let samples = rig(q0).samples_fixed_position(&orientations(12, 21), Vec3::zeros());
        let est = estimate_rotation(&samples, &RotationOptions::default()).unwrap();
        assert!(est.euler.x.abs() < 1e-9);
        assert!(est.euler.y.abs() < 1e-9);
        assert!((est.euler.z - FRAC_PI_2).abs() < 1e-9);
    }

    #[test]
    fn kabsch_returns_proper_rotation() {
        let q0 = Quat::from_euler_angles(-1.0, 0.4, 2.5);
        let samples = rig(q0).samples(&orientations(7, 13), &positions(7, 13, 1.0));
        let deltas = collect_deltas(&samples, &RotationOptions::default());
        let r = kabsch(&deltas).unwrap();
        assert!((r.determinant() - 1.0).abs() < 1e-9);
        assert!((r * r.transpose() - Mat3::identity()).norm() < 1e-9);
    }

    #[test]
    fn euler_angles_rebuild_the_rotation() {
        let cases = [
            (0.3, -0.2, 1.3),
            (-2.0, 1.2, -0.4),
            (0.3, FRAC_PI_2, 0.2),
            (0.3, -FRAC_PI_2, 0.2),
            (-1.0, FRAC_PI_2, 2.5),
            (0.7, FRAC_PI_2 - 1e-9, -0.3),
        ];
        for (roll, pitch, yaw) in cases {
            let r = Rot3::from_euler_angles(roll, pitch, yaw).into_inner();
            let e = euler_zyx(&r);
            let rebuilt = Rot3::from_euler_angles(e.x, e.y, e.z).into_inner();
            assert!(
                (rebuilt - r).norm() < 1e-7,
                "({roll}, {pitch}, {yaw}) -> {e:?}: error {}",
                (rebuilt - r).norm()
            );
        }

        let e = euler_zyx(&Rot3::from_euler_angles(0.3, -0.2, 1.3).into_inner());
        assert!((e - Vec3::new(0.3, -0.2, 1.3)).norm() < 1e-12);
    }

    #[test]
    fn gimbal_locked_offset_is_recovered() {
        for pitch in [FRAC_PI_2, -FRAC_PI_2] {
            let q0 = Quat::from_euler_angles(0.3, pitch, 0.2);
            let samples = rig(q0).samples(&orientations(20, 40), &positions(20, 40, 1.0));
            let est = estimate_rotation(&samples, &RotationOptions::default()).unwrap();

            let expected = q0.to_rotation_matrix().into_inner();
            let fitted = est.rotation.into_inner();
            let rebuilt = est.quaternion().to_rotation_matrix().into_inner();
            assert!((fitted - expected).norm() < 1e-9);
            assert!(
                (rebuilt - expected).norm() < 1e-9,
                "pitch {pitch}: euler {:?}",
                est.euler
            );
            assert!((est.euler.y - pitch).abs() < 1e-6);
        }
    }

    #[test]
    fn too_few_correspondences_agree_across_entry_points() {
        let x = Vec3::x();
        let y = Vec3::y();
        let two = [
            DeltaSample { reference: x, target: x },
            DeltaSample { reference: y, target: y },
        ];
        let expected = RotationError::NotEnoughCorrespondences {
            found: 2,
            required: MIN_CORRESPONDENCES,
        };
        assert_eq!(kabsch(&two).unwrap_err(), expected);

        let lenient = RotationOptions {
            min_correspondences: 1,
            ..RotationOptions::default()
        };
        let samples = [
            sample_with_orientation(Quat::identity()),
            sample_with_orientation(Quat::from_axis_angle(&Vec3::x_axis(), 1.0)),
            sample_with_orientation(Quat::from_axis_angle(&Vec3::x_axis(), 0.9)),
        ];
        assert_eq!(collect_deltas(&samples, &lenient).len(), 2);
        assert_eq!(estimate_rotation(&samples, &lenient).unwrap_err(), expected);
    }

    #[test]
    fn single_axis_motion_is_degenerate() {
        let samples: Vec<Sample> = (0..6)
            .map(|k| {
                sample_with_orientation(Quat::from_axis_angle(&Vec3::z_axis(), 0.6 * k as Real))
            })
            .collect();
        let err = estimate_rotation(&samples, &RotationOptions::default()).unwrap_err();
        assert!(matches!(err, RotationError::DegenerateAxes(_)), "{err:?}");
    }
}
