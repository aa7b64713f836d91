pub mod macros;

use eve_lib::core::config::AppConfig;
use eve_lib::data::{Computation, ConditionalEdge, Net, Node, Operation, Particle, Value, Vector};
use eve_lib::{Macrocosm, Tuning};
use std::collections::HashMap;

#[allow(dead_code)]
pub struct MacrocosmBuilder {
    config: AppConfig,
    identifier: usize,
    particles: HashMap<Vector, Particle>,
    fill: Option<Particle>,
    expansions: usize,
}

#[allow(dead_code)]
impl MacrocosmBuilder {
    pub fn new() -> Self {
        let mut config = AppConfig::default();
        config.evaluation.decay_enabled = false;
        config.evaluation.edge_kill_chance = 0.0;
        Self {
            config,
            identifier: 0,
            particles: HashMap::new(),
            fill: None,
            expansions: 1,
        }
    }

    pub fn with_identifier(mut self, identifier: usize) -> Self {
        self.identifier = identifier;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.genesis.seed = Some(seed);
        self
    }

    pub fn with_config<F>(mut self, modifier: F) -> Self
    where
        F: FnOnce(&mut AppConfig),
    {
        modifier(&mut self.config);
        self
    }

    /// Places `particle` at `at` when expansion reaches that point.
    pub fn with_particle(mut self, at: Vector, particle: Particle) -> Self {
        self.particles.insert(at, particle);
        self
    }

    /// Particle used for every point without an explicit one. Random
    /// genesis is used when unset.
    pub fn with_fill(mut self, particle: Particle) -> Self {
        self.fill = Some(particle);
        self
    }

    pub fn with_expansions(mut self, expansions: usize) -> Self {
        self.expansions = expansions;
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn build(self) -> Macrocosm {
        let macrocosm = Macrocosm::new(self.identifier, &self.config);
        let tuning = Tuning::from(&self.config.tuning);
        for _ in 0..self.expansions {
            if self.particles.is_empty() && self.fill.is_none() {
                macrocosm.expand(&tuning);
                continue;
            }
            macrocosm.expand_with(|at| {
                self.particles
                    .get(&at)
                    .or(self.fill.as_ref())
                    .cloned()
                    .unwrap_or_default()
            });
        }
        macrocosm
    }
}

#[allow(dead_code)]
pub fn computation(operation: Operation, operand: i64) -> Computation {
    Computation::new(operation, Value::Integer(operand))
}

/// Net whose only root runs `first` and then, unconditionally, `second`.
#[allow(dead_code)]
pub fn chained_net(first: Computation, second: Computation) -> Net {
    Net::new(
        vec![
            Node::new(first, vec![ConditionalEdge::unconditional(1)]),
            Node::leaf(second),
        ],
        vec![0],
    )
}

/// Particle with one root per computation and no edges.
#[allow(dead_code)]
pub fn leaf_particle(functions: Vec<Computation>) -> Particle {
    Particle::new(Net::from_roots(functions.into_iter().map(Node::leaf).collect()))
}
