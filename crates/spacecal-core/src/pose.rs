use crate::{Iso3, Mat3, Quat, Real, Vec3};
use nalgebra::{Quaternion, Translation3};
use serde::{Deserialize, Serialize};

/// Tracker pose: position plus orientation.
///
/// The orientation is stored as given by the tracker. It is expected to be
/// (approximately) unit norm and is never renormalized here.
///
/// Serialized as `{"position": [x, y, z], "orientation": [qx, qy, qz, qw]}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vec3,
    pub orientation: Quat,
}

impl Pose {
    pub fn new(position: Vec3, orientation: Quat) -> Self {
        Self {
            position,
            orientation,
        }
    }

    pub fn identity() -> Self {
        Self::new(Vec3::zeros(), Quat::identity())
    }

    /// Build a pose from the flat boundary layout `(x, y, z, qx, qy, qz, qw)`.
    pub fn from_array(v: [Real; 7]) -> Self {
        let q = Quaternion::new(v[6], v[3], v[4], v[5]);
        Self::new(Vec3::new(v[0], v[1], v[2]), Quat::new_unchecked(q))
    }

    /// Flat boundary layout `(x, y, z, qx, qy, qz, qw)`.
    pub fn to_array(&self) -> [Real; 7] {
        let q = self.orientation.quaternion();
        [
            self.position.x,
            self.position.y,
            self.position.z,
            q.i,
            q.j,
            q.k,
            q.w,
        ]
    }

    pub fn from_isometry(iso: &Iso3) -> Self {
        Self::new(iso.translation.vector, iso.rotation)
    }

    pub fn to_isometry(&self) -> Iso3 {
        Iso3::from_parts(Translation3::from(self.position), self.orientation)
    }

    /// True when every position and quaternion component is finite.
    pub fn is_finite(&self) -> bool {
        self.position.iter().all(|v| v.is_finite())
            && self.orientation.coords.iter().all(|v| v.is_finite())
    }

    /// Orientation as a 3×3 rotation matrix.
    pub fn rotation_matrix(&self) -> Mat3 {
        self.orientation.to_rotation_matrix().into_inner()
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::identity()
    }
}

/// Reference and target poses captured at the same instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub reference: Pose,
    pub target: Pose,
}

impl Sample {
    pub fn new(reference: Pose, target: Pose) -> Self {
        Self { reference, target }
    }

    pub fn from_arrays(reference: [Real; 7], target: [Real; 7]) -> Self {
        Self::new(Pose::from_array(reference), Pose::from_array(target))
    }

    pub fn is_finite(&self) -> bool {
        self.reference.is_finite() && self.target.is_finite()
    }
}

/// Rotation-axis correspondence derived from two samples.
///
/// Both axes are unit vectors. Under rigid attachment they describe the same
/// physical axis expressed in the two tracking spaces.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeltaSample {
    pub reference: Vec3,
    pub target: Vec3,
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;

    #[test]
    fn array_layout_is_xyz_then_quaternion_xyzw() {
        let raw = [1.0, 2.0, 3.0, 0.0, 0.0, 0.707_106_781_186_547_6, 0.707_106_781_186_547_6];
        let pose = Pose::from_array(raw);

        assert_eq!(pose.position, Vec3::new(1.0, 2.0, 3.0));
        assert!((pose.orientation.angle() - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
        let axis = pose.orientation.axis().unwrap();
        assert!((axis.into_inner() - Vector3::z()).norm() < 1e-12);
        assert_eq!(pose.to_array(), raw);
    }

    #[test]
    fn orientation_is_not_renormalized() {
        let pose = Pose::from_array([0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 2.0]);
        assert_eq!(pose.orientation.quaternion().w, 2.0);
    }

    #[test]
    fn non_finite_components_are_detected() {
        let good = Pose::from_array([0.0, 1.0, 2.0, 0.0, 0.0, 0.0, 1.0]);
        let bad_quat = Pose::from_array([0.0, 1.0, 2.0, f64::NAN, 0.0, 0.0, 1.0]);
        let bad_pos = Pose::from_array([f64::INFINITY, 1.0, 2.0, 0.0, 0.0, 0.0, 1.0]);
        assert!(good.is_finite());
        assert!(!bad_quat.is_finite());
        assert!(!bad_pos.is_finite());
        assert!(!Sample::new(good, bad_quat).is_finite());
        assert!(Sample::new(good, good).is_finite());
    }

    #[test]
    fn pose_json_uses_flat_arrays() {
        let pose = Pose::from_array([0.5, -1.0, 2.0, 0.0, 0.0, 0.0, 1.0]);
        let json = serde_json::to_value(pose).unwrap();
        assert_eq!(json["position"], serde_json::json!([0.5, -1.0, 2.0]));
        assert_eq!(json["orientation"], serde_json::json!([0.0, 0.0, 0.0, 1.0]));

        let back: Pose = serde_json::from_value(json).unwrap();
        assert_eq!(back, pose);
    }

    #[test]
    fn isometry_conversion_keeps_parts() {
        let iso = Iso3::from_parts(
            Translation3::new(0.1, 0.2, 0.3),
            Quat::from_euler_angles(0.3, -0.2, 1.1),
        );
        let pose = Pose::from_isometry(&iso);
        let back = pose.to_isometry();
        assert_eq!(back.translation, iso.translation);
        assert_eq!(back.rotation, iso.rotation);
    }
}
