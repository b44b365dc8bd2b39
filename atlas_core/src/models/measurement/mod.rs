// atlas_core/src/models/measurement/mod.rs

use crate::errors::SensorError;
use crate::estimation::SlamFilter;
use crate::hardware::PositionSource;
use crate::robot::Robot;
use crate::types::RawId;
use dyn_clone::DynClone;
use std::fmt::Debug;

/// Tagged innovation dimensionality of an aiding sensor.
///
/// Selects the measurement equations at configure time instead of branching
/// on raw sizes at every call. Only `Position` is implemented; `Pose` is the
/// documented future variant for sources that also report orientation, and
/// processing it fails fast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeasurementShape {
    /// 3-vector position reading.
    Position,
    /// 7-vector position + orientation quaternion reading. Not implemented.
    Pose,
}

impl MeasurementShape {
    pub fn from_dim(dim: usize) -> Result<Self, SensorError> {
        match dim {
            3 => Ok(Self::Position),
            7 => Ok(Self::Pose),
            n => Err(SensorError::UnsupportedMeasurementShape(n)),
        }
    }

    pub fn dim(&self) -> usize {
        match self {
            Self::Position => 3,
            Self::Pose => 7,
        }
    }
}

/// Everything a sensor model may touch during one `process()` call: the
/// robot entity, the shared filter, and the hardware source. Bundled so the
/// borrow lives exactly as long as the call.
///
/// The scheduler that builds this context owns the serialization guarantee:
/// one sensor update runs to completion before the next one starts.
pub struct SensorContext<'a> {
    pub robot: &'a mut Robot,
    pub filter: &'a mut dyn SlamFilter,
    pub source: &'a mut dyn PositionSource,
}

// --- SENSOR MODEL TRAIT ---
// The contract every aiding-sensor model fulfils: size its buffers once from
// the attached source, then turn raw readings into filter updates.
pub trait SensorModel: DynClone + Debug + Send {
    /// Sizes the internal buffers from the attached source. Must be called
    /// once before the first `process()`.
    fn configure(&mut self, source: &dyn PositionSource) -> Result<(), SensorError>;

    /// Processes one raw reading against the shared filter state, either
    /// bootstrapping the reference frame (first call) or feeding the
    /// filter's correction step (every later call).
    fn process(&mut self, id: RawId, ctx: &mut SensorContext) -> Result<(), SensorError>;
}

// This macro automatically generates the implementation of `Clone` for `Box<dyn SensorModel>`.
dyn_clone::clone_trait_object!(SensorModel);

pub mod absolute_position;
pub mod jacobian;
pub mod seed;
