//! Core data structures for the eve simulation.

pub mod computation;
pub mod edge;
pub mod frame;
pub mod net;
pub mod node;
pub mod particle;
pub mod value;
pub mod vector;
