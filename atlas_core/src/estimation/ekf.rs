// atlas_core/src/estimation/ekf.rs

use crate::errors::SensorError;
use crate::estimation::{Gaussian, SlamFilter};
use crate::types::IndexSet;
use log::warn;
use nalgebra::{DMatrix, DVector};

/// A concrete EKF-style corrector over a dense state and covariance.
///
/// Only the correction half of the filter lives here: prediction/dynamics is
/// the host system's concern. The correction works on index sets so it stays
/// valid as the state grows with mapped landmarks.
#[derive(Debug, Clone)]
pub struct ExtendedKalmanFilter {
    x: DVector<f64>,
    p: DMatrix<f64>,
    ia_used: IndexSet,
}

impl ExtendedKalmanFilter {
    /// Creates a filter over an initial state and covariance. Every slot is
    /// considered in use; hosts managing landmark slots can narrow the set
    /// with [`ExtendedKalmanFilter::set_used_states`].
    pub fn new(x: DVector<f64>, p: DMatrix<f64>) -> Self {
        assert_eq!(x.len(), p.nrows());
        assert_eq!(x.len(), p.ncols());
        let dim = x.len();
        Self {
            x,
            p,
            ia_used: IndexSet::from_range(0..dim),
        }
    }

    pub fn set_used_states(&mut self, ia_used: IndexSet) {
        self.ia_used = ia_used;
    }
}

impl SlamFilter for ExtendedKalmanFilter {
    fn ia_used_states(&self) -> IndexSet {
        self.ia_used.clone()
    }

    fn x(&self) -> &DVector<f64> {
        &self.x
    }

    fn x_mut(&mut self) -> &mut DVector<f64> {
        &mut self.x
    }

    fn p(&self) -> &DMatrix<f64> {
        &self.p
    }

    fn p_mut(&mut self) -> &mut DMatrix<f64> {
        &mut self.p
    }

    fn correct(
        &mut self,
        ia_x: &IndexSet,
        innovation: &Gaussian,
        inn_jacobian: &DMatrix<f64>,
        ia_obs: &IndexSet,
    ) -> Result<(), SensorError> {
        // The innovation Jacobian is d(inn)/d(state) = -H, so the gain picks
        // up a sign: K = -P[ia_x, ia_obs] * J^T * S^-1.
        let s_inv = match innovation.cov.clone().try_inverse() {
            Some(inv) => inv,
            None => {
                // A redundant or degenerate measurement. Skipping the update
                // keeps the filter consistent.
                warn!("singular innovation covariance, skipping correction");
                return Ok(());
            }
        };

        let p_xo = ia_x.gather_block(ia_obs, &self.p);
        let gain = -(&p_xo * inn_jacobian.transpose()) * s_inv;

        // x[ia_x] += K * inn
        let mut x_sub = ia_x.gather_vector(&self.x);
        x_sub += &gain * &innovation.x;
        ia_x.scatter_vector(&mut self.x, x_sub.as_slice());

        // P[ia_x, ia_x] -= K * S * K^T (symmetric Joseph-free form)
        let p_sub = ia_x.gather_matrix(&self.p) - &gain * &innovation.cov * gain.transpose();
        ia_x.scatter_block(ia_x, &mut self.p, &p_sub);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn correction_matches_hand_computed_kalman_update() {
        // Scalar-per-axis case with H = I, so K = P (P + R)^-1.
        let x = DVector::from_column_slice(&[1.0, 2.0]);
        let p = DMatrix::from_diagonal(&DVector::from_column_slice(&[4.0, 4.0]));
        let mut filter = ExtendedKalmanFilter::new(x, p);

        // Measurement z = (3, 2), R = I. Innovation = z - x = (2, 0).
        let innovation = Gaussian {
            x: DVector::from_column_slice(&[2.0, 0.0]),
            cov: DMatrix::from_diagonal(&DVector::from_column_slice(&[5.0, 5.0])),
        };
        let inn_jacobian = -DMatrix::<f64>::identity(2, 2);
        let ia = IndexSet::from_range(0..2);

        filter
            .correct(&ia, &innovation, &inn_jacobian, &ia)
            .unwrap();

        // K = 4/5, x0 -> 1 + 0.8 * 2 = 2.6, P -> P - K S K^T = 4 - 3.2
        assert_abs_diff_eq!(filter.x()[0], 2.6, epsilon = 1e-12);
        assert_abs_diff_eq!(filter.x()[1], 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(filter.p()[(0, 0)], 0.8, epsilon = 1e-12);
        assert_abs_diff_eq!(filter.p()[(1, 1)], 0.8, epsilon = 1e-12);
    }

    #[test]
    fn correction_only_touches_addressed_states() {
        let x = DVector::from_column_slice(&[0.0, 0.0, 7.0]);
        let p = DMatrix::<f64>::identity(3, 3);
        let mut filter = ExtendedKalmanFilter::new(x, p);

        let innovation = Gaussian {
            x: DVector::from_column_slice(&[1.0]),
            cov: DMatrix::from_element(1, 1, 2.0),
        };
        let inn_jacobian = -DMatrix::<f64>::identity(1, 1);
        let ia_x = IndexSet::from_range(0..2);
        let ia_obs = IndexSet::from_range(0..1);

        filter
            .correct(&ia_x, &innovation, &inn_jacobian, &ia_obs)
            .unwrap();

        assert_abs_diff_eq!(filter.x()[2], 7.0, epsilon = 1e-12);
        assert_abs_diff_eq!(filter.p()[(2, 2)], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn singular_innovation_covariance_is_skipped() {
        let mut filter = ExtendedKalmanFilter::new(DVector::zeros(2), DMatrix::identity(2, 2));
        let innovation = Gaussian::zeros(2); // zero covariance is singular
        let inn_jacobian = -DMatrix::<f64>::identity(2, 2);
        let ia = IndexSet::from_range(0..2);

        filter
            .correct(&ia, &innovation, &inn_jacobian, &ia)
            .unwrap();
        assert_eq!(filter.x(), &DVector::zeros(2));
    }
}
