//! The activation-net interpreter.
//!
//! Nets are stored as plain data in `eve_data`; this module evaluates them.
//! Evaluation moves a net's nodes into a locked [`node::Arena`], walks every
//! alive root concurrently, and hands the nodes back together with any
//! injections that target other nets.

pub mod computation;
pub mod genesis;
pub mod net;
pub mod node;

pub use computation::{apply, Applied, Injection};
pub use genesis::{create_net_random_with_rng, random_computation, random_edge};
pub use net::{Evaluation, NetLogic};
pub use node::Arena;
