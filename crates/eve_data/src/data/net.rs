use super::node::{Node, NodeId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Reference to a node in a specific net. Carried inside values, so a node of
/// one particle can be addressed from another.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeRef {
    pub net: Uuid,
    pub index: NodeId,
}

/// A small activation net: an arena of nodes plus the ordered roots that
/// receive input parameters positionally.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct Net {
    /// Identifier used by node references that point into this net.
    pub id: Uuid,
    /// Node arena. Edges address nodes by index.
    pub nodes: Vec<Node>,
    /// Arena indices of the root nodes, in parameter order.
    pub roots: Vec<NodeId>,
}

impl Net {
    pub fn new(nodes: Vec<Node>, roots: Vec<NodeId>) -> Self {
        Self::with_id(Uuid::new_v4(), nodes, roots)
    }

    pub fn with_id(id: Uuid, nodes: Vec<Node>, roots: Vec<NodeId>) -> Self {
        Self { id, nodes, roots }
    }

    /// A net in which every node is a root, in arena order.
    pub fn from_roots(nodes: Vec<Node>) -> Self {
        let roots = (0..nodes.len()).collect();
        Self::new(nodes, roots)
    }

    pub fn root(&self, position: usize) -> Option<&Node> {
        self.roots.get(position).and_then(|&id| self.nodes.get(id))
    }

    pub fn root_mut(&mut self, position: usize) -> Option<&mut Node> {
        let id = *self.roots.get(position)?;
        self.nodes.get_mut(id)
    }

    pub fn node_ref(&self, index: NodeId) -> NodeRef {
        NodeRef {
            net: self.id,
            index,
        }
    }

    pub fn num_alive_roots(&self) -> usize {
        self.roots
            .iter()
            .filter(|&&id| self.nodes.get(id).is_some_and(|n| n.alive))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alive_roots_counts_only_roots() {
        let mut nodes = vec![Node::default(), Node::default(), Node::default()];
        nodes[1].alive = false;
        let net = Net::new(nodes, vec![0, 1]);
        assert_eq!(net.num_alive_roots(), 1);
    }

    #[test]
    fn test_dangling_root_is_not_alive() {
        let net = Net::new(vec![Node::default()], vec![0, 7]);
        assert_eq!(net.num_alive_roots(), 1);
        assert!(net.root(1).is_none());
    }
}
