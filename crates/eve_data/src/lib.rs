//! # Eve Data
//!
//! Plain data model shared by every eve crate: values, computations,
//! activation-net structure, particles, lattice vectors and the frames the
//! simulation exposes to persistence and query layers.
//!
//! Behaviour that needs randomness or concurrency lives in `eve_core`; the
//! types here only carry pure helpers (value arithmetic, predicates, vector
//! math).

pub mod data;

pub use data::computation::{Computation, Operation};
pub use data::edge::{Condition, ConditionalEdge};
pub use data::frame::{FlattenedMacrocosm, ParticleFrame, SystemFrame};
pub use data::net::{Net, NodeRef};
pub use data::node::{Node, NodeId};
pub use data::particle::Particle;
pub use data::value::{Abstract, Sentinel, Value};
pub use data::vector::Vector;
