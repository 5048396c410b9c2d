//! Presentation side of the flock: settings loading, camera projection,
//! frame drawing and frame statistics. The simulation itself lives in
//! `flock-core`; everything here only reads it.

pub mod projection;
pub mod render;
pub mod settings;
pub mod stats;
