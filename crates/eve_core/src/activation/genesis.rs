use crate::config::GenesisConfig;
use crate::tuning::Tuning;
use eve_data::{Computation, Condition, ConditionalEdge, Net, Node, NodeId, Operation, Value};
use rand::seq::SliceRandom;
use rand::Rng;
use uuid::Uuid;

const RELATIONAL: [Condition; 6] = [
    Condition::EqualTo,
    Condition::NotEqualTo,
    Condition::LessThan,
    Condition::LessOrEqual,
    Condition::GreaterThan,
    Condition::GreaterOrEqual,
];

fn operand_range(genesis: &GenesisConfig, tuning: &Tuning) -> i64 {
    genesis
        .operand_range
        .saturating_mul(tuning.global_entropy.max(1))
}

fn random_integer<R: Rng + ?Sized>(range: i64, rng: &mut R) -> Value {
    Value::Integer(rng.gen_range(-range..=range))
}

fn random_arithmetic<R: Rng + ?Sized>(range: i64, rng: &mut R) -> Computation {
    let operation = Operation::ARITHMETIC
        .choose(rng)
        .copied()
        .unwrap_or(Operation::Add);
    Computation::new(operation, random_integer(range, rng))
}

/// Random node function: mostly arithmetic, occasionally an identity request
/// or an injection carrying a random arithmetic computation.
pub fn random_computation<R: Rng + ?Sized>(
    genesis: &GenesisConfig,
    tuning: &Tuning,
    rng: &mut R,
) -> Computation {
    let range = operand_range(genesis, tuning);
    let roll: f64 = rng.gen();
    if roll < genesis.identity_chance {
        Computation::identity()
    } else if roll < genesis.identity_chance + genesis.inject_chance {
        Computation::inject(random_arithmetic(range, rng))
    } else {
        random_arithmetic(range, rng)
    }
}

pub fn random_edge<R: Rng + ?Sized>(
    genesis: &GenesisConfig,
    tuning: &Tuning,
    destination: NodeId,
    rng: &mut R,
) -> ConditionalEdge {
    if rng.gen_bool(genesis.unconditional_chance) {
        return ConditionalEdge::unconditional(destination);
    }
    let condition = RELATIONAL
        .choose(rng)
        .copied()
        .unwrap_or(Condition::Unconditional);
    let comparator = random_integer(operand_range(genesis, tuning), rng);
    ConditionalEdge::new(condition, comparator, destination)
}

/// Generates a random net.
///
/// The first nodes of the arena are the roots. Each root then owns a chain of
/// up to `max_descendants` nodes, and every node receives up to `max_edges`
/// further edges pointing anywhere in the arena, cycles included.
pub fn create_net_random_with_rng<R: Rng + ?Sized>(
    genesis: &GenesisConfig,
    tuning: &Tuning,
    rng: &mut R,
) -> Net {
    let difficulty = usize::try_from(tuning.computational_difficulty.max(1)).unwrap_or(1);
    let max_roots = genesis
        .max_roots
        .saturating_mul(difficulty)
        .max(genesis.min_roots);
    let num_roots = rng.gen_range(genesis.min_roots..=max_roots);

    let mut nodes: Vec<Node> = (0..num_roots)
        .map(|_| Node::leaf(random_computation(genesis, tuning, rng)))
        .collect();

    for root in 0..num_roots {
        let descendants = rng.gen_range(0..=genesis.max_descendants);
        let mut parent = root;
        for _ in 0..descendants {
            let child = nodes.len();
            nodes.push(Node::leaf(random_computation(genesis, tuning, rng)));
            let edge = random_edge(genesis, tuning, child, rng);
            nodes[parent].edges.push(edge);
            parent = child;
        }
    }

    let total = nodes.len();
    for id in 0..total {
        let extra = rng.gen_range(0..=genesis.max_edges);
        for _ in 0..extra {
            let destination = rng.gen_range(0..total);
            let edge = random_edge(genesis, tuning, destination, rng);
            nodes[id].edges.push(edge);
        }
    }

    Net::with_id(Uuid::from_u128(rng.gen()), nodes, (0..num_roots).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_root_count_bounds() {
        let genesis = GenesisConfig {
            min_roots: 2,
            max_roots: 3,
            ..Default::default()
        };
        let tuning = Tuning {
            computational_difficulty: 2,
            global_entropy: 1,
        };
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        for _ in 0..100 {
            let net = create_net_random_with_rng(&genesis, &tuning, &mut rng);
            assert!((2..=6).contains(&net.roots.len()));
            assert_eq!(net.num_alive_roots(), net.roots.len());
        }
    }

    #[test]
    fn test_edges_stay_in_arena() {
        let genesis = GenesisConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..50 {
            let net = create_net_random_with_rng(&genesis, &Tuning::default(), &mut rng);
            for node in &net.nodes {
                for edge in &node.edges {
                    assert!(edge.destination.is_some_and(|d| d < net.nodes.len()));
                }
            }
        }
    }

    #[test]
    fn test_operands_scale_with_entropy() {
        let genesis = GenesisConfig {
            operand_range: 2,
            identity_chance: 0.0,
            inject_chance: 0.0,
            ..Default::default()
        };
        let tuning = Tuning {
            computational_difficulty: 1,
            global_entropy: 3,
        };
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..200 {
            let c = random_computation(&genesis, &tuning, &mut rng);
            assert!(c.operation.is_arithmetic());
            let v = c.operand.as_integer().unwrap_or(i64::MAX);
            assert!((-6..=6).contains(&v));
        }
    }

    #[test]
    fn test_inject_operand_is_computation() {
        let genesis = GenesisConfig {
            identity_chance: 0.0,
            inject_chance: 1.0,
            ..Default::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let c = random_computation(&genesis, &Tuning::default(), &mut rng);
        assert_eq!(c.operation, Operation::Inject);
        assert!(c.operand.as_computation().is_some());
    }

    #[test]
    fn test_seeded_genesis_is_deterministic() {
        let genesis = GenesisConfig::default();
        let a = create_net_random_with_rng(
            &genesis,
            &Tuning::default(),
            &mut ChaCha8Rng::seed_from_u64(11),
        );
        let b = create_net_random_with_rng(
            &genesis,
            &Tuning::default(),
            &mut ChaCha8Rng::seed_from_u64(11),
        );
        assert_eq!(a, b);
    }
}
