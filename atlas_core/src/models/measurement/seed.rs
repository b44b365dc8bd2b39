// atlas_core/src/models/measurement/seed.rs

use crate::errors::SensorError;
use crate::hardware::PositionSource;
use crate::types::RawId;
use nalgebra::Vector3;

/// Initial minimum-variance ceiling; any real reading is expected to report
/// a variance well below this.
const SEED_VAR_CEILING: f64 = 1e3;

/// The robust position estimate used to seed a sensor's reference frame.
///
/// `variance` is the *minimum* variance observed per axis, not an average:
/// the seed trusts the quietest readings and reports their uncertainty as
/// its own. Callers must not reinterpret it as a mean variance.
#[derive(Debug, Clone, PartialEq)]
pub struct SeedEstimate {
    pub average: Vector3<f64>,
    pub variance: Vector3<f64>,
    /// Timestamp of the target reading the estimate was anchored to.
    pub timestamp: f64,
}

/// Variance-weighted average over every reading buffered up to and including
/// `up_to`, evaluated once per sensor instance before the first correction.
///
/// Two passes per axis: find the minimum reported variance, then average only
/// the readings whose variance stays below twice that minimum. Readings
/// noisier than the window on an axis are excluded from that axis's average.
pub fn seed_estimate(
    source: &dyn PositionSource,
    up_to: RawId,
) -> Result<SeedEstimate, SensorError> {
    let available = source.available_raws();

    let mut min_var = Vector3::repeat(SEED_VAR_CEILING);
    let mut timestamp = 0.0;
    for info in &available {
        let reading = source.observe_raw(info.id)?;
        let vars = reading
            .variances
            .as_ref()
            .ok_or(SensorError::MissingVarianceModel)?;
        for axis in 0..3 {
            if vars[axis] < min_var[axis] {
                min_var[axis] = vars[axis];
            }
        }
        timestamp = reading.timestamp;
        if info.id == up_to {
            break;
        }
    }

    let mut average = Vector3::zeros();
    let mut sum_coeffs: Vector3<f64> = Vector3::zeros();
    for info in &available {
        let reading = source.observe_raw(info.id)?;
        let vars = reading
            .variances
            .as_ref()
            .ok_or(SensorError::MissingVarianceModel)?;
        for axis in 0..3 {
            if vars[axis] < 2.0 * min_var[axis] {
                average[axis] += reading.values[axis] * vars[axis];
                sum_coeffs[axis] += vars[axis];
            }
        }
        if info.id == up_to {
            break;
        }
    }

    for axis in 0..3 {
        if sum_coeffs[axis] <= 0.0 {
            return Err(SensorError::DegenerateSeedEstimate(axis));
        }
        average[axis] /= sum_coeffs[axis];
    }

    Ok(SeedEstimate {
        average,
        variance: min_var,
        timestamp,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::mock::MockSource;
    use crate::hardware::RawReading;
    use approx::assert_abs_diff_eq;
    use nalgebra::DVector;

    fn reading(t: f64, values: [f64; 3], variances: [f64; 3]) -> RawReading {
        RawReading {
            timestamp: t,
            values: DVector::from_column_slice(&values),
            variances: Some(DVector::from_column_slice(&variances)),
        }
    }

    #[test]
    fn averages_only_inside_the_variance_window() {
        // On the first axis: min variance 1, window < 2, so the middle
        // reading (variance 4) is excluded. Weighted by the variances:
        // (1*1 + 5*1.5) / (1 + 1.5) = 3.4.
        let source = MockSource::new(
            3,
            3,
            vec![
                reading(0.0, [1.0, 0.0, 0.0], [1.0, 1.0, 1.0]),
                reading(0.1, [3.0, 0.0, 0.0], [4.0, 1.0, 1.0]),
                reading(0.2, [5.0, 0.0, 0.0], [1.5, 1.0, 1.0]),
            ],
        );

        let seed = seed_estimate(&source, 2).unwrap();
        assert_abs_diff_eq!(seed.average[0], 3.4, epsilon = 1e-12);
        assert_abs_diff_eq!(seed.variance[0], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(seed.timestamp, 0.2, epsilon = 1e-12);
    }

    #[test]
    fn stops_at_the_target_reading() {
        let source = MockSource::new(
            3,
            3,
            vec![
                reading(0.0, [1.0, 2.0, 3.0], [1.0, 1.0, 1.0]),
                reading(0.1, [100.0, 200.0, 300.0], [0.1, 0.1, 0.1]),
            ],
        );

        // Only the first reading is in scope, so it is the average.
        let seed = seed_estimate(&source, 0).unwrap();
        assert_abs_diff_eq!(seed.average[0], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(seed.average[1], 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(seed.average[2], 3.0, epsilon = 1e-12);
    }

    #[test]
    fn zero_qualifying_weight_is_an_error() {
        // A zero reported variance makes the window empty on that axis.
        let source = MockSource::new(
            3,
            3,
            vec![reading(0.0, [1.0, 0.0, 0.0], [0.0, 1.0, 1.0])],
        );
        let err = seed_estimate(&source, 0).unwrap_err();
        assert_eq!(err, SensorError::DegenerateSeedEstimate(0));
    }

    #[test]
    fn missing_variances_are_rejected() {
        let source = MockSource::new(
            3,
            0,
            vec![RawReading {
                timestamp: 0.0,
                values: DVector::from_column_slice(&[1.0, 2.0, 3.0]),
                variances: None,
            }],
        );
        let err = seed_estimate(&source, 0).unwrap_err();
        assert_eq!(err, SensorError::MissingVarianceModel);
    }
}
