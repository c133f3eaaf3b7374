use crate::{Iso3, Pose, Quat, Real, Vec3};
use nalgebra::{Quaternion, Translation3};
use serde::{Deserialize, Serialize};

/// Number of scalars in the flat result layout.
pub const RESULT_LEN: usize = 10;

/// Calibrated offset between the two tracking spaces.
///
/// Field order matches the flat boundary layout
/// `(tx, ty, tz, rex, rey, rez, rqx, rqy, rqz, rqw)`.
///
/// Euler angles are in radians with `R = Rz(rez) * Ry(rey) * Rx(rex)`.
/// Translation is in the trackers' native unit (meters for XR runtimes).
///
/// The all-zero value (see [`CalibrationResult::zeroed`]) is not a valid
/// calibration: it signals an unknown handle or insufficient data at the
/// lenient boundary.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CalibrationResult {
    pub tx: Real,
    pub ty: Real,
    pub tz: Real,
    pub rex: Real,
    pub rey: Real,
    pub rez: Real,
    pub rqx: Real,
    pub rqy: Real,
    pub rqz: Real,
    pub rqw: Real,
}

impl CalibrationResult {
    pub const fn zeroed() -> Self {
        Self {
            tx: 0.0,
            ty: 0.0,
            tz: 0.0,
            rex: 0.0,
            rey: 0.0,
            rez: 0.0,
            rqx: 0.0,
            rqy: 0.0,
            rqz: 0.0,
            rqw: 0.0,
        }
    }

    /// Package a translation and Z-Y-X Euler angles `(rex, rey, rez)`.
    ///
    /// The quaternion is derived from the Euler angles.
    pub fn from_euler(translation: Vec3, euler: Vec3) -> Self {
        let q = Quat::from_euler_angles(euler.x, euler.y, euler.z);
        let c = q.quaternion();
        Self {
            tx: translation.x,
            ty: translation.y,
            tz: translation.z,
            rex: euler.x,
            rey: euler.y,
            rez: euler.z,
            rqx: c.i,
            rqy: c.j,
            rqz: c.k,
            rqw: c.w,
        }
    }

    pub fn is_zeroed(&self) -> bool {
        self.to_array().iter().all(|v| *v == 0.0)
    }

    pub fn to_array(&self) -> [Real; RESULT_LEN] {
        [
            self.tx, self.ty, self.tz, self.rex, self.rey, self.rez, self.rqx, self.rqy, self.rqz,
            self.rqw,
        ]
    }

    pub fn from_array(v: [Real; RESULT_LEN]) -> Self {
        Self {
            tx: v[0],
            ty: v[1],
            tz: v[2],
            rex: v[3],
            rey: v[4],
            rez: v[5],
            rqx: v[6],
            rqy: v[7],
            rqz: v[8],
            rqw: v[9],
        }
    }

    pub fn translation(&self) -> Vec3 {
        Vec3::new(self.tx, self.ty, self.tz)
    }

    pub fn euler(&self) -> Vec3 {
        Vec3::new(self.rex, self.rey, self.rez)
    }

    /// Translation scaled to centimeters, for display only.
    pub fn centimeters(&self) -> Vec3 {
        self.translation() * 100.0
    }

    /// Rotation quaternion, renormalized.
    ///
    /// Returns `None` for a zeroed quaternion.
    pub fn rotation(&self) -> Option<Quat> {
        let q = Quaternion::new(self.rqw, self.rqx, self.rqy, self.rqz);
        Quat::try_new(q, Real::EPSILON)
    }

    /// Transform mapping target-space poses into reference space.
    pub fn transform(&self) -> Option<Iso3> {
        let rotation = self.rotation()?;
        Some(Iso3::from_parts(
            Translation3::from(self.translation()),
            rotation,
        ))
    }

    /// Express a target-space pose in reference space.
    pub fn apply_to_pose(&self, pose: &Pose) -> Option<Pose> {
        let iso = self.transform()?;
        Some(Pose::from_isometry(&(iso * pose.to_isometry())))
    }
}
