use super::computation::Computation;
use super::edge::ConditionalEdge;
use serde::{Deserialize, Serialize};

/// Index of a node inside its net's arena.
pub type NodeId = usize;

/// A single point of computation in an activation net.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// The node's function; may be replaced at runtime by an injection.
    pub function: Computation,
    /// Outgoing edges, scanned in declared order.
    pub edges: Vec<ConditionalEdge>,
    /// Only meaningful for roots: a dead root is skipped by its net.
    pub alive: bool,
}

impl Node {
    pub fn new(function: Computation, edges: Vec<ConditionalEdge>) -> Self {
        Self {
            function,
            edges,
            alive: true,
        }
    }

    pub fn leaf(function: Computation) -> Self {
        Self::new(function, Vec::new())
    }

    pub fn is_terminal(&self) -> bool {
        self.edges.is_empty()
    }
}

impl Default for Node {
    fn default() -> Self {
        Self::leaf(Computation::default())
    }
}
