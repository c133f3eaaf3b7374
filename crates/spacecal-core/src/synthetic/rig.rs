//! Two rigidly attached trackers observed from two tracking spaces.

use crate::{Iso3, Pose, Quat, Sample, Vec3};
use nalgebra::Translation3;

/// Ground truth for a synthetic calibration problem.
///
/// - `space`: reference-from-target tracking space transform, the value a
///   calibration should recover.
/// - `mount`: pose of the target device in the reference device's body
///   frame. It cancels out of the calibration and only makes the data less
///   trivial.
#[derive(Debug, Clone, Copy)]
pub struct SyntheticRig {
    pub space: Iso3,
    pub mount: Iso3,
}

impl SyntheticRig {
    pub fn new(space: Iso3) -> Self {
        Self {
            space,
            mount: Iso3::identity(),
        }
    }

    pub fn with_mount(mut self, mount: Iso3) -> Self {
        self.mount = mount;
        self
    }

    /// Sample for a reference device at `reference` (in reference space).
    ///
    /// The target pose is expressed in target space:
    /// `space⁻¹ * reference * mount`.
    pub fn sample_at(&self, reference: &Iso3) -> Sample {
        let target = self.space.inverse() * reference * self.mount;
        Sample::new(Pose::from_isometry(reference), Pose::from_isometry(&target))
    }

    /// One sample per `(orientation, position)` pair, zipped to the shorter list.
    pub fn samples(&self, orientations: &[Quat], positions: &[Vec3]) -> Vec<Sample> {
        orientations
            .iter()
            .zip(positions)
            .map(|(q, p)| self.sample_at(&Iso3::from_parts(Translation3::from(*p), *q)))
            .collect()
    }

    /// Samples that share one position and only vary orientation.
    pub fn samples_fixed_position(&self, orientations: &[Quat], position: Vec3) -> Vec<Sample> {
        let positions = vec![position; orientations.len()];
        self.samples(orientations, &positions)
    }
}
