use super::computation::Injection;
use super::genesis::create_net_random_with_rng;
use super::node::Arena;
use crate::config::{EvaluationConfig, GenesisConfig};
use crate::tuning::Tuning;
use eve_data::{Net, Value};
use rand::Rng;
use rayon::prelude::*;
use std::sync::{Mutex, PoisonError};

/// Outcome of one net evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Evaluation {
    /// Whatever the last root to finish wrote into the shared output cell.
    pub value: Value,
    /// Injections addressed to nodes of other nets, in the order they were
    /// requested.
    pub injections: Vec<Injection>,
}

/// Trait defining the evaluation logic of activation nets.
pub trait NetLogic {
    fn new_random(genesis: &GenesisConfig, tuning: &Tuning) -> Self;
    fn new_random_with_rng<R: Rng + ?Sized>(
        genesis: &GenesisConfig,
        tuning: &Tuning,
        rng: &mut R,
    ) -> Self;

    /// Evaluates root `i` with `params[i]` for every alive root that has a
    /// parameter, concurrently, and returns the merged output.
    fn evaluate(&mut self, params: &[Value], config: &EvaluationConfig) -> Evaluation;

    /// Same as [`NetLogic::evaluate`] but one root at a time in declared
    /// order, so the last evaluated root always provides the output.
    fn evaluate_sequential_with_rng<R: Rng + ?Sized>(
        &mut self,
        params: &[Value],
        config: &EvaluationConfig,
        rng: &mut R,
    ) -> Evaluation;

    /// Evaluates the net and discards injections addressed to other nets.
    fn output(&mut self, params: &[Value], config: &EvaluationConfig) -> Value {
        self.evaluate(params, config).value
    }

    /// Kills one root with probability `1 / roots`. Returns the position of
    /// the killed root, if any.
    fn apply_decay(&mut self) -> Option<usize>;
    fn apply_decay_with_rng<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<usize>;
}

impl NetLogic for Net {
    fn new_random(genesis: &GenesisConfig, tuning: &Tuning) -> Self {
        let mut rng = rand::thread_rng();
        Self::new_random_with_rng(genesis, tuning, &mut rng)
    }

    fn new_random_with_rng<R: Rng + ?Sized>(
        genesis: &GenesisConfig,
        tuning: &Tuning,
        rng: &mut R,
    ) -> Self {
        create_net_random_with_rng(genesis, tuning, rng)
    }

    fn evaluate(&mut self, params: &[Value], config: &EvaluationConfig) -> Evaluation {
        let arena = Arena::new(self.id, std::mem::take(&mut self.nodes));
        let cell = Mutex::new(Value::default());
        let count = params.len().min(self.roots.len());

        let roots = &self.roots;
        (0..count).into_par_iter().for_each(|i| {
            let root = roots[i];
            if !arena.is_alive(root) {
                return;
            }
            let mut rng = rand::thread_rng();
            let value = arena.output(root, params[i].clone(), config, &mut rng);
            *cell.lock().unwrap_or_else(PoisonError::into_inner) = value;
        });

        let (nodes, injections) = arena.into_parts();
        self.nodes = nodes;
        Evaluation {
            value: cell.into_inner().unwrap_or_else(PoisonError::into_inner),
            injections,
        }
    }

    fn evaluate_sequential_with_rng<R: Rng + ?Sized>(
        &mut self,
        params: &[Value],
        config: &EvaluationConfig,
        rng: &mut R,
    ) -> Evaluation {
        let arena = Arena::new(self.id, std::mem::take(&mut self.nodes));
        let mut value = Value::default();
        let count = params.len().min(self.roots.len());

        for (&root, param) in self.roots[..count].iter().zip(params) {
            if arena.is_alive(root) {
                value = arena.output(root, param.clone(), config, rng);
            }
        }

        let (nodes, injections) = arena.into_parts();
        self.nodes = nodes;
        Evaluation { value, injections }
    }

    fn apply_decay(&mut self) -> Option<usize> {
        let mut rng = rand::thread_rng();
        self.apply_decay_with_rng(&mut rng)
    }

    fn apply_decay_with_rng<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<usize> {
        let n = self.roots.len();
        if n == 0 {
            return None;
        }
        let candidate = rng.gen_range(0..n.saturating_mul(n));
        if candidate >= n {
            return None;
        }
        if let Some(node) = self.root_mut(candidate) {
            node.alive = false;
        }
        Some(candidate)
    }
}
