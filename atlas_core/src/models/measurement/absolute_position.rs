// atlas_core/src/models/measurement/absolute_position.rs

use crate::errors::SensorError;
use crate::estimation::{prod_jpjt, Gaussian};
use crate::geometry::quaternion;
use crate::hardware::{PositionSource, RawReading};
use crate::models::measurement::jacobian::PoseJacobians;
use crate::models::measurement::seed::seed_estimate;
use crate::models::measurement::{MeasurementShape, SensorContext, SensorModel};
use crate::types::{RawId, SensorHandle};
use log::info;
use nalgebra::{DVector, Vector3};
use serde::{Deserialize, Serialize};

/// Static configuration of one absolute-position aiding sensor
/// (GPS, motion capture, barometric aiding...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbslocConfig {
    /// Sensor mounting point in the robot body frame (the lever-arm).
    pub lever_arm: [f64; 3],
    /// Whether this sensor defines the global absolute frame. If false, the
    /// sensor is aligned to the filter's frame through its own origin offset
    /// and the robot starts at zero.
    pub absolute: bool,
}

/// Measurement-update model for an absolute-position sensor inside the
/// EKF-SLAM estimator.
///
/// Two structurally different paths share `process()`:
/// - the very first reading bootstraps the reference frame, writing robot
///   position and its covariance block directly into the filter;
/// - every later reading becomes an innovation handed to the filter's
///   generic correction step.
///
/// The transition happens exactly once per instance and is irreversible:
/// the robot's `origin` goes from `None` to `Some` and is never rewritten.
#[derive(Debug, Clone)]
pub struct AbsoluteLocalizationModel {
    handle: SensorHandle,
    lever_arm: Vector3<f64>,
    absolute: bool,
    use_for_init: bool,
    shape: Option<MeasurementShape>,
    has_var: bool,
    // Buffers sized once in configure() and overwritten in place each call.
    measurement: Gaussian,
    expectation: Gaussian,
    innovation: Gaussian,
    jacobians: PoseJacobians,
}

impl AbsoluteLocalizationModel {
    pub fn new(handle: SensorHandle, config: &AbslocConfig) -> Self {
        Self {
            handle,
            lever_arm: Vector3::from(config.lever_arm),
            absolute: config.absolute,
            use_for_init: false,
            shape: None,
            has_var: false,
            measurement: Gaussian::zeros(0),
            expectation: Gaussian::zeros(0),
            innovation: Gaussian::zeros(0),
            jacobians: PoseJacobians::new(0),
        }
    }

    /// Marks the next reading as seed data: instead of the raw instantaneous
    /// sample, the robust reference-frame estimate over all buffered
    /// readings is used. Cleared automatically after that reading.
    pub fn set_use_for_init(&mut self, flag: bool) {
        self.use_for_init = flag;
    }

    pub fn use_for_init(&self) -> bool {
        self.use_for_init
    }

    pub fn measurement(&self) -> &Gaussian {
        &self.measurement
    }

    pub fn expectation(&self) -> &Gaussian {
        &self.expectation
    }

    pub fn innovation(&self) -> &Gaussian {
        &self.innovation
    }

    pub fn jacobians(&self) -> &PoseJacobians {
        &self.jacobians
    }

    /// Fetches the raw sample for this call, or replaces it with the robust
    /// seed estimate when the reading is flagged for initialization.
    fn fetch_reading(
        &self,
        id: RawId,
        source: &mut dyn PositionSource,
    ) -> Result<RawReading, SensorError> {
        if self.use_for_init {
            let seed = seed_estimate(source, id)?;
            Ok(RawReading {
                timestamp: seed.timestamp,
                values: DVector::from_column_slice(seed.average.as_slice()),
                variances: Some(DVector::from_column_slice(seed.variance.as_slice())),
            })
        } else {
            source.get_raw(id)
        }
    }
}

impl SensorModel for AbsoluteLocalizationModel {
    fn configure(&mut self, source: &dyn PositionSource) -> Result<(), SensorError> {
        let inns = source.data_size();
        self.shape = Some(MeasurementShape::from_dim(inns)?);
        self.has_var = source.has_variance();
        self.measurement = Gaussian::zeros(inns);
        self.expectation = Gaussian::zeros(inns);
        self.innovation = Gaussian::zeros(inns);
        self.jacobians = PoseJacobians::new(inns);
        Ok(())
    }

    fn process(&mut self, id: RawId, ctx: &mut SensorContext) -> Result<(), SensorError> {
        let shape = self.shape.ok_or(SensorError::NotConfigured)?;
        let reading = self.fetch_reading(id, ctx.source)?;

        let first = ctx.robot.origin.is_none();
        let origin = ctx.robot.origin.unwrap_or_else(Vector3::zeros);

        let lever_arm = self.lever_arm;
        let x = ctx.filter.x();
        let position = ctx.robot.position(x);
        let orientation = ctx.robot.orientation(x);
        let lever_arm_global = quaternion::rotate(&orientation, &lever_arm);

        // Fails fast for anything but the position-only shape, before any
        // shared state is touched.
        self.jacobians.rebuild(shape, &orientation, &lever_arm)?;

        // Expectation: where the filter believes the sensor is, with the
        // pose covariance sub-block pushed through the Jacobian.
        self.expectation.x.copy_from(&(position + lever_arm_global));
        let p_pose = ctx.robot.ia_pose.gather_matrix(ctx.filter.p());
        self.expectation
            .cov
            .copy_from(&prod_jpjt(&self.jacobians.exp_rs, &p_pose));

        // Raw axes are consumed as (2nd, 1st, 3rd): the stream's horizontal
        // axes arrive swapped relative to the filter's x-y-z frame. This
        // matches the deployed driver's layout; keep it as observed until
        // the hardware contract pins the convention down.
        self.measurement.x[0] = reading.values[1] - origin[0];
        self.measurement.x[1] = reading.values[0] - origin[1];
        self.measurement.x[2] = reading.values[2] - origin[2];
        if !self.has_var {
            return Err(SensorError::MissingVarianceModel);
        }
        let deviations = reading
            .variances
            .as_ref()
            .ok_or(SensorError::MissingVarianceModel)?;
        self.measurement.cov.fill(0.0);
        self.measurement.cov[(0, 0)] = deviations[1] * deviations[1];
        self.measurement.cov[(1, 1)] = deviations[0] * deviations[0];
        self.measurement.cov[(2, 2)] = deviations[2] * deviations[2];

        self.innovation.x.copy_from(&self.measurement.x);
        self.innovation.x -= &self.expectation.x;
        self.innovation.cov.copy_from(&self.measurement.cov);
        self.innovation.cov += &self.expectation.cov;

        if first {
            // One-shot bootstrap: the reference frame is not estimated, it
            // is fixed here, directly overwriting the robot's position and
            // its covariance block.
            let measured = Vector3::new(
                self.measurement.x[0],
                self.measurement.x[1],
                self.measurement.x[2],
            );
            let (origin, robot_position) = if self.absolute {
                (Vector3::zeros(), measured - lever_arm_global)
            } else {
                (measured - lever_arm_global, Vector3::zeros())
            };

            let ia_position = ctx.robot.ia_position();
            let p_orientation = ctx.robot.ia_orientation().gather_matrix(ctx.filter.p());
            let position_cov =
                &self.measurement.cov + prod_jpjt(&self.jacobians.exp_q, &p_orientation);

            ia_position.scatter_vector(ctx.filter.x_mut(), robot_position.as_slice());
            ia_position.scatter_block(&ia_position, ctx.filter.p_mut(), &position_cov);
            ctx.robot.origin = Some(origin);

            info!(
                "sensor {:?} bootstrapped reference frame at t={}: origin={:?} position={:?} position_cov={:?}",
                self.handle,
                reading.timestamp,
                origin.as_slice(),
                robot_position.as_slice(),
                position_cov.as_slice(),
            );
        } else {
            let ia_used = ctx.filter.ia_used_states();
            ctx.filter.correct(
                &ia_used,
                &self.innovation,
                &self.jacobians.inn_rs,
                &ctx.robot.ia_pose,
            )?;
        }

        if self.use_for_init {
            self.use_for_init = false;
            // One consuming fetch just to release the buffered raw that the
            // seed estimate was built over.
            let _ = ctx.source.get_raw(id);
        }

        Ok(())
    }
}
