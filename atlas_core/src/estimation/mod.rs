// atlas_core/src/estimation/mod.rs

use crate::errors::SensorError;
use crate::types::IndexSet;
use nalgebra::{DMatrix, DVector};
use std::fmt::Debug;

/// A mean/covariance pair with a fixed dimension.
///
/// Sensor models allocate these once at configure time (measurement,
/// expectation and innovation buffers) and overwrite them in place on every
/// call, so the steady-state path performs no per-call allocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Gaussian {
    pub x: DVector<f64>,
    pub cov: DMatrix<f64>,
}

impl Gaussian {
    pub fn zeros(dim: usize) -> Self {
        Self {
            x: DVector::zeros(dim),
            cov: DMatrix::zeros(dim, dim),
        }
    }

    pub fn dim(&self) -> usize {
        self.x.len()
    }
}

/// Congruence transform `J P J^T`, the covariance of `J x` for `x ~ P`.
pub fn prod_jpjt(jac: &DMatrix<f64>, p: &DMatrix<f64>) -> DMatrix<f64> {
    jac * p * jac.transpose()
}

// --- The filter contract ---
/// The map/filter collaborator that owns the dense state vector and the full
/// covariance matrix. Sensor models read pose sub-blocks through it and hand
/// innovations back to [`SlamFilter::correct`]; the bootstrap branch of the
/// absolute-position model is the only place that writes state directly.
pub trait SlamFilter: Debug {
    /// Index set of every state slot currently in use (robot + landmarks).
    fn ia_used_states(&self) -> IndexSet;

    fn x(&self) -> &DVector<f64>;

    fn x_mut(&mut self) -> &mut DVector<f64>;

    fn p(&self) -> &DMatrix<f64>;

    fn p_mut(&mut self) -> &mut DMatrix<f64>;

    /// Kalman correction from an innovation whose Jacobian spans only the
    /// `ia_obs` columns of the state. Updates mean and covariance over
    /// `ia_x`; the caller never computes the gain itself.
    fn correct(
        &mut self,
        ia_x: &IndexSet,
        innovation: &Gaussian,
        inn_jacobian: &DMatrix<f64>,
        ia_obs: &IndexSet,
    ) -> Result<(), SensorError>;
}

pub mod ekf;
