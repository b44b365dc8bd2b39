// atlas_core/src/hardware.rs

use crate::errors::SensorError;
use crate::types::RawId;
use nalgebra::DVector;
use std::fmt::Debug;

/// Bookkeeping entry for one raw sample still buffered by a source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawInfo {
    pub id: RawId,
    pub timestamp: f64,
}

/// One raw sample from an absolute-position source.
///
/// `values` holds the measured quantities in the source's native axis order;
/// `variances` holds the matching per-component variance fields, present only
/// when the source actually reports uncertainty ([`PositionSource::variance_size`]
/// equal to [`PositionSource::data_size`]).
#[derive(Debug, Clone)]
pub struct RawReading {
    pub timestamp: f64,
    pub values: DVector<f64>,
    pub variances: Option<DVector<f64>>,
}

// --- The hardware contract ("driver" side of the sensor) ---
// Streams raw samples and their uncertainties. Implemented by the hardware
// abstraction layer of the host system; the models in this crate only consume
// it through this trait.
pub trait PositionSource: Debug + Send {
    /// Number of measured quantities per sample (the innovation size).
    fn data_size(&self) -> usize;

    /// Number of variance fields per sample. Either `data_size()` or zero.
    fn variance_size(&self) -> usize;

    /// All samples currently buffered, in arrival order.
    fn available_raws(&self) -> Vec<RawInfo>;

    /// Non-mutating peek at a buffered sample.
    fn observe_raw(&self, id: RawId) -> Result<RawReading, SensorError>;

    /// Consuming fetch of a sample, releasing the source's buffer slot.
    fn get_raw(&mut self, id: RawId) -> Result<RawReading, SensorError>;

    /// Whether per-component variances accompany every sample.
    fn has_variance(&self) -> bool {
        self.variance_size() == self.data_size()
    }
}
