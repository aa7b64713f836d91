use super::net::Net;
use super::value::Value;
use serde::{Deserialize, Serialize};

/// One lattice point's computational unit.
///
/// Created once per point and never removed; liveness is derived from the
/// roots of its net.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct Particle {
    pub net: Net,
    pub value: Value,
}

impl Particle {
    /// A particle with the given net and a zero value.
    pub fn new(net: Net) -> Self {
        Self {
            net,
            value: Value::default(),
        }
    }

    pub fn num_alive_nodes(&self) -> usize {
        self.net.num_alive_roots()
    }

    pub fn alive(&self) -> bool {
        self.num_alive_nodes() > 0
    }

    /// Marks every root dead.
    pub fn kill(&mut self) {
        for id in self.net.roots.clone() {
            if let Some(node) = self.net.nodes.get_mut(id) {
                node.alive = false;
            }
        }
    }
}
