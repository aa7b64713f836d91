//! # Eve
//!
//! Particle evolution on an outward-growing 3D lattice.
//!
//! This facade re-exports the workspace crates so binaries and integration
//! tests can reach everything through one path:
//! - [`data`]: the plain data model (values, nets, particles, frames)
//! - [`core`]: the interpreter, the macrocosm engine and the tick driver
//! - [`io`]: the frame log and archives

pub mod logging;

pub use eve_core as core;
pub use eve_data as data;
pub use eve_io as io;

pub use eve_core::config::AppConfig;
pub use eve_core::{Macrocosm, Simulation, Tuning};
