//! # Eve Core
//!
//! The simulation engine for eve: an outward-growing 3D lattice of particles,
//! each running a small self-mutating activation net.
//!
//! This crate contains:
//! - The activation-net interpreter (conditional edges, injection, decay)
//! - Random genesis of particles and nets
//! - Region iteration over lattice cuboids
//! - The macrocosm engine (shell expansion and the poll pass)
//! - Configuration, entropy tuning, metrics and the tick driver
//!
//! ## Concurrency
//!
//! Every fan-out (lattice points, neighbourhoods, net roots) is a Rayon
//! fork-join and is always joined before the caller continues.
//!
//! ## Example
//!
//! ```
//! use eve_core::activation::NetLogic;
//! use eve_core::config::EvaluationConfig;
//! use eve_data::{Computation, ConditionalEdge, Net, Node, Operation, Value};
//!
//! let mut net = Net::new(
//!     vec![
//!         Node::new(
//!             Computation::new(Operation::Add, Value::Integer(5)),
//!             vec![ConditionalEdge::unconditional(1)],
//!         ),
//!         Node::leaf(Computation::new(Operation::Multiply, Value::Integer(3))),
//!     ],
//!     vec![0],
//! );
//! let config = EvaluationConfig { edge_kill_chance: 0.0, ..Default::default() };
//! assert_eq!(net.output(&[Value::Integer(2)], &config), Value::Integer(21));
//! ```

/// Activation-net evaluation, injection and random genesis
pub mod activation;
/// Configuration management for simulation parameters
pub mod config;
/// The particle lattice with expansion and polling
pub mod macrocosm;
/// Performance metrics collection and logging
pub mod metrics;
/// Random particle creation
pub mod particle;
/// Lattice cuboids and parallel iteration
pub mod region;
/// The per-simulation tick loop and frame sink seam
pub mod simulation;
/// Global difficulty and entropy with the adaptive controller
pub mod tuning;

pub use macrocosm::{Frontier, Macrocosm, PollSummary};
pub use region::{do_for_vectors_between, vectors_between, Region};
pub use simulation::{FrameSink, Simulation};
pub use tuning::{Tuning, TuningController};
