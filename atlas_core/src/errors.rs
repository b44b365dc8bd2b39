// atlas_core/src/errors.rs

use crate::types::RawId;
use thiserror::Error;

/// Everything that can go wrong while fusing an absolute-position reading.
///
/// All of these are fatal for the `process()` call that raised them: the call
/// aborts before mutating shared filter state and nothing is retried
/// internally. The external scheduler decides what to do with the update.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SensorError {
    /// Only position-only (3-dimensional) readings are implemented. A full
    /// pose reading (position + orientation, size 7) is a known future
    /// extension; anything else is a misconfigured source.
    #[error("measurement size {0} is not supported; only position-only (size 3) readings are implemented")]
    UnsupportedMeasurementShape(usize),

    /// The source reports no per-axis variance and a constant-uncertainty
    /// fallback is deliberately not implemented.
    #[error("position source does not report per-axis variance; constant measurement uncertainty is not implemented")]
    MissingVarianceModel,

    /// No reading passed the variance window of the reference-frame seed
    /// average, so the weighted mean would divide by zero.
    #[error("no reading qualified for the reference-frame seed average on axis {0}")]
    DegenerateSeedEstimate(usize),

    /// The hardware source could not produce the requested raw sample.
    #[error("raw reading {0} is not available from the position source")]
    ReadingUnavailable(RawId),

    /// `process()` was called before `configure()` sized the buffers.
    #[error("sensor model was not configured before processing")]
    NotConfigured,
}
