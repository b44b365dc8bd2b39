// atlas_core/src/robot.rs

use crate::types::IndexSet;
use nalgebra::{DVector, Quaternion, Vector3};

/// The robot entity as seen by an aiding sensor: where its 7-scalar pose
/// block lives inside the dense filter state, and the frozen offset between
/// the sensor's absolute reference frame and the filter's global frame.
///
/// `origin` is `None` until the very first successful reading bootstraps it,
/// and is never rewritten afterwards for the lifetime of the instance.
#[derive(Debug, Clone)]
pub struct Robot {
    /// Indices of the pose block: 3 position scalars then 4 quaternion
    /// scalars (w first).
    pub ia_pose: IndexSet,
    /// Offset of the absolute reference frame, fixed at the first reading.
    pub origin: Option<Vector3<f64>>,
}

impl Robot {
    pub fn new(ia_pose: IndexSet) -> Self {
        debug_assert_eq!(ia_pose.len(), 7);
        Self {
            ia_pose,
            origin: None,
        }
    }

    /// Index set of the 3 position scalars.
    pub fn ia_position(&self) -> IndexSet {
        self.ia_pose.subset(0..3)
    }

    /// Index set of the 4 quaternion scalars.
    pub fn ia_orientation(&self) -> IndexSet {
        self.ia_pose.subset(3..7)
    }

    /// Current global position, read out of the dense filter state.
    pub fn position(&self, x: &DVector<f64>) -> Vector3<f64> {
        let p = self.ia_position().gather_vector(x);
        Vector3::new(p[0], p[1], p[2])
    }

    /// Current global orientation quaternion (w, x, y, z).
    pub fn orientation(&self, x: &DVector<f64>) -> Quaternion<f64> {
        let q = self.ia_orientation().gather_vector(x);
        Quaternion::new(q[0], q[1], q[2], q[3])
    }
}
