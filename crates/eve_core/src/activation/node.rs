//! Node evaluation over a locked arena.
//!
//! During evaluation a net's nodes live in an [`Arena`] of individually
//! locked nodes so several roots can walk the graph at once. A node's lock is
//! held only to read its function or to pick (and possibly kill) an edge;
//! it is never held while another node is visited, so cyclic graphs and
//! self-injection cannot deadlock.

use super::computation::{apply, Applied, Injection};
use crate::config::EvaluationConfig;
use eve_data::{Node, NodeId, NodeRef, Value};
use rand::Rng;
use std::sync::{Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

pub struct Arena {
    net: Uuid,
    nodes: Vec<Mutex<Node>>,
    foreign: Mutex<Vec<Injection>>,
}

impl Arena {
    pub fn new(net: Uuid, nodes: Vec<Node>) -> Self {
        Self {
            net,
            nodes: nodes.into_iter().map(Mutex::new).collect(),
            foreign: Mutex::new(Vec::new()),
        }
    }

    /// Returns the nodes and every injection addressed to another net.
    pub fn into_parts(self) -> (Vec<Node>, Vec<Injection>) {
        let nodes = self
            .nodes
            .into_iter()
            .map(|m| m.into_inner().unwrap_or_else(PoisonError::into_inner))
            .collect();
        let foreign = self
            .foreign
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        (nodes, foreign)
    }

    fn lock(&self, id: NodeId) -> Option<MutexGuard<'_, Node>> {
        self.nodes
            .get(id)
            .map(|m| m.lock().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn is_alive(&self, id: NodeId) -> bool {
        self.lock(id).is_some_and(|node| node.alive)
    }

    fn inject(&self, injection: Injection) {
        if injection.target.net != self.net {
            self.foreign
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(injection);
            return;
        }
        if let Some(mut node) = self.lock(injection.target.index) {
            node.function = injection.function;
        }
    }

    /// Picks the first edge of `id` that activates for `carried` and resolves
    /// to a node of this arena. The picked edge dies with probability
    /// `kill_chance`, after it has been picked.
    fn select_edge<R: Rng + ?Sized>(
        &self,
        id: NodeId,
        carried: &Value,
        kill_chance: f64,
        rng: &mut R,
    ) -> Option<NodeId> {
        let mut node = self.lock(id)?;
        let len = self.nodes.len();
        let edge = node.edges.iter_mut().find(|edge| {
            edge.can_activate(carried)
                && edge.has_destination()
                && edge.destination.is_some_and(|d| d < len)
        })?;
        if rng.gen_bool(kill_chance) {
            edge.alive = false;
        }
        edge.destination
    }

    /// Evaluates the node at `start` with `param` and follows activated edges
    /// until a node has no qualifying edge.
    ///
    /// Each step applies the node's function; an identity request is replaced
    /// by a reference to that node. Error values end the walk immediately and
    /// are returned without touching any edge.
    pub fn output<R: Rng + ?Sized>(
        &self,
        start: NodeId,
        param: Value,
        config: &EvaluationConfig,
        rng: &mut R,
    ) -> Value {
        let mut current = start;
        let mut carried = param;
        let mut hops = 0usize;

        loop {
            let function = match self.lock(current) {
                Some(node) => node.function.clone(),
                None => return carried,
            };

            let Applied { value, injection } = apply(&function, &carried);
            if let Some(injection) = injection {
                self.inject(injection);
            }

            carried = if value.is_identity() {
                NodeRef {
                    net: self.net,
                    index: current,
                }
                .into()
            } else {
                value
            };

            if carried.is_error() {
                return carried;
            }

            if hops >= config.max_traversal_depth {
                tracing::trace!(net = %self.net, hops, "Traversal depth cap reached");
                return carried;
            }
            match self.select_edge(current, &carried, config.edge_kill_chance, rng) {
                Some(next) => {
                    hops += 1;
                    current = next;
                }
                None => return carried,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eve_data::{Computation, Condition, ConditionalEdge, Operation};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn never_kill() -> EvaluationConfig {
        EvaluationConfig {
            edge_kill_chance: 0.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_leaf_returns_function_result() {
        let arena = Arena::new(
            Uuid::new_v4(),
            vec![Node::leaf(Computation::new(
                Operation::Add,
                Value::Integer(1),
            ))],
        );
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let out = arena.output(0, Value::Integer(41), &never_kill(), &mut rng);
        assert_eq!(out, Value::Integer(42));
    }

    #[test]
    fn test_first_qualifying_edge_wins() {
        let nodes = vec![
            Node::new(
                Computation::new(Operation::Add, Value::Integer(0)),
                vec![
                    ConditionalEdge::new(Condition::LessThan, Value::Integer(0), 1),
                    ConditionalEdge::new(Condition::GreaterThan, Value::Integer(0), 2),
                    ConditionalEdge::unconditional(1),
                ],
            ),
            Node::leaf(Computation::new(Operation::Add, Value::Integer(100))),
            Node::leaf(Computation::new(Operation::Multiply, Value::Integer(10))),
        ];
        let arena = Arena::new(Uuid::new_v4(), nodes);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let out = arena.output(0, Value::Integer(3), &never_kill(), &mut rng);
        assert_eq!(out, Value::Integer(30));
    }

    #[test]
    fn test_dangling_destination_is_skipped() {
        let nodes = vec![Node::new(
            Computation::new(Operation::Add, Value::Integer(1)),
            vec![ConditionalEdge::unconditional(9)],
        )];
        let arena = Arena::new(Uuid::new_v4(), nodes);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let out = arena.output(0, Value::Integer(1), &never_kill(), &mut rng);
        assert_eq!(out, Value::Integer(2));
        let (nodes, _) = arena.into_parts();
        assert!(nodes[0].edges[0].alive);
    }

    #[test]
    fn test_self_injection_through_identity() {
        // Node 0 asks for its identity and hands it to node 1, which rewrites
        // node 0's function.
        let replacement = Computation::new(Operation::Multiply, Value::Integer(7));
        let nodes = vec![
            Node::new(Computation::identity(), vec![ConditionalEdge::unconditional(1)]),
            Node::leaf(Computation::inject(replacement.clone())),
        ];
        let arena = Arena::new(Uuid::new_v4(), nodes);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let out = arena.output(0, Value::Integer(1), &never_kill(), &mut rng);
        assert_eq!(out.as_computation(), Some(&replacement));
        let (nodes, foreign) = arena.into_parts();
        assert_eq!(nodes[0].function, replacement);
        assert!(foreign.is_empty());
    }

    #[test]
    fn test_foreign_injection_is_deferred() {
        let other = NodeRef {
            net: Uuid::new_v4(),
            index: 0,
        };
        let replacement = Computation::identity();
        let nodes = vec![Node::leaf(Computation::inject(replacement.clone()))];
        let arena = Arena::new(Uuid::new_v4(), nodes);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        arena.output(0, other.into(), &never_kill(), &mut rng);
        let (nodes, foreign) = arena.into_parts();
        assert_eq!(nodes[0].function, Computation::inject(replacement.clone()));
        assert_eq!(
            foreign,
            vec![Injection {
                target: other,
                function: replacement
            }]
        );
    }

    #[test]
    fn test_cycle_stops_at_depth_cap() {
        let nodes = vec![Node::new(
            Computation::new(Operation::Add, Value::Integer(1)),
            vec![ConditionalEdge::unconditional(0)],
        )];
        let arena = Arena::new(Uuid::new_v4(), nodes);
        let config = EvaluationConfig {
            edge_kill_chance: 0.0,
            max_traversal_depth: 5,
            ..Default::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let out = arena.output(0, Value::Integer(0), &config, &mut rng);
        // The start node plus five hops.
        assert_eq!(out, Value::Integer(6));
    }

    #[test]
    fn test_depth_cap_leaves_untraversed_edge_alive() {
        let nodes = vec![Node::new(
            Computation::new(Operation::Add, Value::Integer(1)),
            vec![ConditionalEdge::unconditional(0)],
        )];
        let arena = Arena::new(Uuid::new_v4(), nodes);
        let config = EvaluationConfig {
            edge_kill_chance: 1.0,
            max_traversal_depth: 0,
            ..Default::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let out = arena.output(0, Value::Integer(0), &config, &mut rng);
        assert_eq!(out, Value::Integer(1));
        let (nodes, _) = arena.into_parts();
        assert!(nodes[0].edges[0].alive);
    }

    #[test]
    fn test_cycle_terminates_by_edge_decay() {
        let nodes = vec![Node::new(
            Computation::new(Operation::Add, Value::Integer(1)),
            vec![ConditionalEdge::unconditional(0)],
        )];
        let arena = Arena::new(Uuid::new_v4(), nodes);
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let out = arena.output(0, Value::Integer(0), &EvaluationConfig::default(), &mut rng);
        let (nodes, _) = arena.into_parts();
        assert!(!nodes[0].edges[0].alive);
        assert!(matches!(out, Value::Integer(n) if n >= 1));
    }
}
