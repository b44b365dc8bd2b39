// atlas_core/src/prelude.rs

// --- Core Abstractions (The main contracts of the library) ---
pub use crate::estimation::SlamFilter;
pub use crate::hardware::PositionSource;
pub use crate::models::measurement::{MeasurementShape, SensorContext, SensorModel};

// --- Core Data Structures (The "nouns" of the library) ---
pub use crate::errors::SensorError;
pub use crate::estimation::Gaussian;
pub use crate::hardware::{RawInfo, RawReading};
pub use crate::robot::Robot;
pub use crate::types::{IndexSet, RawId, SensorHandle};

// --- Concrete Implementations (Export common ones for convenience) ---
pub use crate::estimation::ekf::ExtendedKalmanFilter;
pub use crate::models::measurement::absolute_position::{AbslocConfig, AbsoluteLocalizationModel};
pub use crate::models::measurement::jacobian::PoseJacobians;
pub use crate::models::measurement::seed::{seed_estimate, SeedEstimate};
