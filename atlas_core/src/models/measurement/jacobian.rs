// atlas_core/src/models/measurement/jacobian.rs

use crate::errors::SensorError;
use crate::geometry::quaternion;
use crate::models::measurement::MeasurementShape;
use nalgebra::{DMatrix, Quaternion, Vector3};

/// The Jacobian buffers of an absolute-position measurement with respect to
/// the robot's 7-scalar global pose block.
///
/// Allocated once when the sensor is configured and rebuilt in place every
/// call. Decomposition for the position-only shape:
///
/// - `exp_rs` (inns x 7): expectation w.r.t. pose = `[ I3 | d(R(q) T)/dq ]`
/// - `inn_rs` (inns x 7): innovation w.r.t. pose, always `-exp_rs`
/// - `exp_q`  (inns x 4): the orientation columns alone, reused for the
///   bootstrap covariance term
#[derive(Debug, Clone, PartialEq)]
pub struct PoseJacobians {
    pub exp_rs: DMatrix<f64>,
    pub inn_rs: DMatrix<f64>,
    pub exp_q: DMatrix<f64>,
}

impl PoseJacobians {
    pub fn new(inns: usize) -> Self {
        Self {
            exp_rs: DMatrix::zeros(inns, 7),
            inn_rs: DMatrix::zeros(inns, 7),
            exp_q: DMatrix::zeros(inns, 4),
        }
    }

    /// Re-evaluates the buffers at the current orientation `q` and sensor
    /// lever-arm. Shapes other than position-only fail fast before touching
    /// anything.
    pub fn rebuild(
        &mut self,
        shape: MeasurementShape,
        q: &Quaternion<f64>,
        lever_arm: &Vector3<f64>,
    ) -> Result<(), SensorError> {
        match shape {
            MeasurementShape::Position => {
                let jac_q = quaternion::rotate_jacobian(q, lever_arm);
                self.exp_q.copy_from(&jac_q);

                self.exp_rs.fill(0.0);
                self.exp_rs.view_mut((0, 0), (3, 3)).fill_with_identity();
                self.exp_rs.view_mut((0, 3), (3, 4)).copy_from(&jac_q);

                self.inn_rs.copy_from(&self.exp_rs);
                self.inn_rs.neg_mut();
                Ok(())
            }
            MeasurementShape::Pose => {
                Err(SensorError::UnsupportedMeasurementShape(shape.dim()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn position_shape_assembles_identity_and_rotation_blocks() {
        let mut jacobians = PoseJacobians::new(3);
        let q = Quaternion::new(0.9, 0.1, -0.3, 0.2);
        let t = Vector3::new(0.4, -1.2, 2.0);
        jacobians.rebuild(MeasurementShape::Position, &q, &t).unwrap();

        let jac_q = quaternion::rotate_jacobian(&q, &t);
        for r in 0..3 {
            for c in 0..3 {
                let expected = if r == c { 1.0 } else { 0.0 };
                assert_abs_diff_eq!(jacobians.exp_rs[(r, c)], expected);
            }
            for c in 0..4 {
                assert_abs_diff_eq!(jacobians.exp_rs[(r, 3 + c)], jac_q[(r, c)]);
                assert_abs_diff_eq!(jacobians.exp_q[(r, c)], jac_q[(r, c)]);
            }
        }
        assert_eq!(jacobians.inn_rs, -&jacobians.exp_rs);
    }

    #[test]
    fn pose_shape_fails_fast_with_its_size() {
        let mut jacobians = PoseJacobians::new(7);
        let err = jacobians
            .rebuild(
                MeasurementShape::Pose,
                &Quaternion::new(1.0, 0.0, 0.0, 0.0),
                &Vector3::zeros(),
            )
            .unwrap_err();
        assert_eq!(err, SensorError::UnsupportedMeasurementShape(7));
    }
}
