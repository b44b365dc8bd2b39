// atlas_core/src/lib.rs

// This file defines the public modules of your library.
pub mod errors;
pub mod estimation;
pub mod geometry;
pub mod hardware;
pub mod models;
pub mod prelude;
pub mod robot;
pub mod types;
