mod common;

use common::{chained_net, computation};
use eve_lib::core::activation::{Arena, NetLogic};
use eve_lib::core::config::EvaluationConfig;
use eve_lib::data::{
    Computation, Condition, ConditionalEdge, Net, Node, NodeRef, Operation, Value,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn no_edge_decay() -> EvaluationConfig {
    EvaluationConfig {
        edge_kill_chance: 0.0,
        ..Default::default()
    }
}

#[test]
fn test_add_then_multiply_yields_21() {
    let mut net = chained_net(
        computation(Operation::Add, 5),
        computation(Operation::Multiply, 3),
    );
    let out = net.output(&[Value::Integer(2)], &no_edge_decay());
    assert_eq!(out, Value::Integer(21));
}

#[test]
fn test_error_short_circuits_traversal() {
    // Inject without a node reference halts; the edges must stay untouched
    // even though every one of them would activate and kill on selection.
    let mut net = Net::new(
        vec![
            Node::new(
                Computation::inject(Computation::identity()),
                vec![
                    ConditionalEdge::unconditional(1),
                    ConditionalEdge::new(Condition::NotEqualTo, Value::Integer(0), 1),
                ],
            ),
            Node::leaf(computation(Operation::Add, 1)),
        ],
        vec![0],
    );
    let config = EvaluationConfig {
        edge_kill_chance: 1.0,
        ..Default::default()
    };
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let out = net.evaluate_sequential_with_rng(&[Value::Integer(4)], &config, &mut rng);
    assert!(out.value.is_halted());
    assert!(net.nodes[0].edges.iter().all(|e| e.alive));
}

#[test]
fn test_identity_without_edges_returns_own_reference() {
    let mut net = Net::from_roots(vec![Node::leaf(Computation::identity())]);
    let out = net.output(&[Value::Integer(9)], &no_edge_decay());
    assert_eq!(out, NodeRef { net: net.id, index: 0 }.into());
    assert!(!out.is_error());
}

#[test]
fn test_identity_feeds_injection_that_reprograms_node() {
    // Root 0 hands its own reference to node 1, which installs Multiply(10)
    // on root 0. The next evaluation runs the new function.
    let mut net = Net::new(
        vec![
            Node::new(Computation::identity(), vec![ConditionalEdge::unconditional(1)]),
            Node::leaf(Computation::inject(computation(Operation::Multiply, 10))),
        ],
        vec![0],
    );
    let first = net.output(&[Value::Integer(4)], &no_edge_decay());
    assert_eq!(
        first.as_computation(),
        Some(&computation(Operation::Multiply, 10))
    );
    assert_eq!(net.nodes[0].function, computation(Operation::Multiply, 10));

    // Multiply(10) then Inject(Multiply 10) on an integer halts.
    let second = net.output(&[Value::Integer(4)], &no_edge_decay());
    assert!(second.is_halted());
}

#[test]
fn test_edge_kill_rate_is_one_in_ten() {
    let arena_nodes = vec![
        Node::new(
            computation(Operation::Add, 0),
            vec![ConditionalEdge::unconditional(1)],
        ),
        Node::leaf(computation(Operation::Add, 0)),
    ];
    let config = EvaluationConfig::default();
    let mut rng = ChaCha8Rng::seed_from_u64(2024);
    let trials = 20_000;
    let mut kills = 0;
    for _ in 0..trials {
        let arena = Arena::new(uuid::Uuid::nil(), arena_nodes.clone());
        arena.output(0, Value::Integer(1), &config, &mut rng);
        let (nodes, _) = arena.into_parts();
        if !nodes[0].edges[0].alive {
            kills += 1;
        }
    }
    let rate = kills as f64 / trials as f64;
    assert!((rate - 0.1).abs() < 0.01, "edge kill rate was {rate}");
}

#[test]
fn test_decay_rate_converges_to_one_over_n() {
    for n in [2usize, 5, 8] {
        let net = Net::from_roots((0..n).map(|_| Node::leaf(computation(Operation::Add, 0))).collect());
        let mut rng = ChaCha8Rng::seed_from_u64(n as u64);
        let trials = 30_000;
        let mut kills = 0;
        for _ in 0..trials {
            let mut fresh = net.clone();
            if fresh.apply_decay_with_rng(&mut rng).is_some() {
                kills += 1;
                assert_eq!(fresh.num_alive_roots(), n - 1);
            }
        }
        let rate = kills as f64 / trials as f64;
        let expected = 1.0 / n as f64;
        assert!((rate - expected).abs() < 0.015, "n={n} rate={rate}");
    }
}

#[test]
fn test_conditions_route_by_value() {
    let mut net = Net::new(
        vec![
            Node::new(
                computation(Operation::Add, 0),
                vec![
                    ConditionalEdge::new(Condition::GreaterOrEqual, Value::Integer(10), 1),
                    ConditionalEdge::new(Condition::LessThan, Value::Integer(10), 2),
                ],
            ),
            Node::leaf(computation(Operation::Subtract, 10)),
            Node::leaf(computation(Operation::Add, 10)),
        ],
        vec![0],
    );
    assert_eq!(net.output(&[Value::Integer(15)], &no_edge_decay()), Value::Integer(5));
    assert_eq!(net.output(&[Value::Integer(3)], &no_edge_decay()), Value::Integer(13));
}

#[test]
fn test_division_by_zero_is_not_an_error() {
    let mut net = chained_net(
        computation(Operation::Divide, 0),
        computation(Operation::Add, 1),
    );
    let out = net.output(&[Value::Integer(99)], &no_edge_decay());
    assert_eq!(out, Value::Integer(1));
}
