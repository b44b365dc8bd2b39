// atlas_core/src/geometry/mod.rs

pub mod quaternion;
