//! The particle lattice and its per-tick growth and evaluation passes.
//!
//! ## Locking
//!
//! All particle reads and writes go through one lattice-wide mutex, taken for
//! a single point at a time. Nets are evaluated on a private copy with the
//! lock released, then written back. The frontier (head and shell) has its
//! own lock and only changes at the end of [`Macrocosm::expand`], after every
//! creation task has joined.
//!
//! While a particle is checked out for evaluation, injections addressed to
//! it are queued and replayed onto the evaluated copy when it is written
//! back, so a whole-particle write-back never drops a reprogramming.

use crate::activation::{Injection, NetLogic};
use crate::config::{AppConfig, EvaluationConfig, GenesisConfig};
use crate::particle::ParticleLogic;
use crate::region::Region;
use crate::tuning::Tuning;
use eve_data::{FlattenedMacrocosm, Particle, ParticleFrame, SystemFrame, Value, Vector};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError, RwLock};
use uuid::Uuid;

#[derive(Default)]
struct Lattice {
    particles: HashMap<Vector, Particle>,
    /// Where the particle owning each net lives.
    owners: HashMap<Uuid, Vector>,
    /// Points whose particle is being evaluated on a private copy.
    checked_out: HashSet<Vector>,
    /// Injections that arrived for a checked-out point, in arrival order.
    pending: HashMap<Vector, Vec<Injection>>,
}

impl Lattice {
    fn insert_if_absent(&mut self, at: Vector, particle: Particle) -> bool {
        if self.particles.contains_key(&at) {
            return false;
        }
        self.owners.insert(particle.net.id, at);
        self.particles.insert(at, particle);
        true
    }

    /// Copies out the particle at `at` for evaluation, if it is alive.
    fn check_out(&mut self, at: Vector) -> Option<Particle> {
        let particle = self.particles.get(&at).filter(|p| p.alive())?.clone();
        self.checked_out.insert(at);
        Some(particle)
    }

    /// Writes an evaluated particle back and replays the injections queued
    /// for it meanwhile. Returns how many of them landed.
    fn check_in(&mut self, at: Vector, mut particle: Particle) -> usize {
        self.checked_out.remove(&at);
        let landed = self
            .pending
            .remove(&at)
            .unwrap_or_default()
            .into_iter()
            .filter(|injection| rebind(&mut particle, injection))
            .count();
        self.particles.insert(at, particle);
        landed
    }

    /// Rebinds the target node now, or queues the injection if its particle
    /// is checked out. Returns true only if the node was rebound now.
    fn apply_injection(&mut self, injection: Injection) -> bool {
        let Some(&at) = self.owners.get(&injection.target.net) else {
            return false;
        };
        if self.checked_out.contains(&at) {
            self.pending.entry(at).or_default().push(injection);
            return false;
        }
        self.particles
            .get_mut(&at)
            .is_some_and(|particle| rebind(particle, &injection))
    }
}

fn rebind(particle: &mut Particle, injection: &Injection) -> bool {
    if particle.net.id != injection.target.net {
        return false;
    }
    match particle.net.nodes.get_mut(injection.target.index) {
        Some(node) => {
            node.function = injection.function.clone();
            true
        }
        None => false,
    }
}

/// Corners of the completed and the next shell, upper corner first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Frontier {
    pub head: [Vector; 2],
    pub shell: [Vector; 2],
}

/// Counts gathered during one [`Macrocosm::poll`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PollSummary {
    pub evaluated: usize,
    pub decayed: usize,
    pub injections: usize,
}

pub struct Macrocosm {
    identifier: usize,
    lattice: Mutex<Lattice>,
    frontier: RwLock<Frontier>,
    genesis: GenesisConfig,
    evaluation: EvaluationConfig,
}

/// Per-point stream so seeded lattices do not depend on creation order.
fn point_stream(v: Vector) -> u64 {
    (v.x as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
        ^ (v.y as u64).wrapping_mul(0xC2B2_AE3D_27D4_EB4F)
        ^ (v.z as u64).wrapping_mul(0x1656_67B1_9E37_79F9)
}

impl Macrocosm {
    pub fn new(identifier: usize, config: &AppConfig) -> Self {
        Self::with_configs(identifier, config.genesis.clone(), config.evaluation.clone())
    }

    pub fn with_configs(
        identifier: usize,
        genesis: GenesisConfig,
        evaluation: EvaluationConfig,
    ) -> Self {
        Self {
            identifier,
            lattice: Mutex::new(Lattice::default()),
            frontier: RwLock::new(Frontier::default()),
            genesis,
            evaluation,
        }
    }

    fn lattice(&self) -> MutexGuard<'_, Lattice> {
        self.lattice.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn identifier(&self) -> usize {
        self.identifier
    }

    pub fn frontier(&self) -> Frontier {
        *self.frontier.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn head(&self) -> [Vector; 2] {
        self.frontier().head
    }

    pub fn shell(&self) -> [Vector; 2] {
        self.frontier().shell
    }

    pub fn evaluation_config(&self) -> &EvaluationConfig {
        &self.evaluation
    }

    pub fn particle_at(&self, at: Vector) -> Option<Particle> {
        self.lattice().particles.get(&at).cloned()
    }

    pub fn has_particle(&self, at: Vector) -> bool {
        self.lattice().particles.contains_key(&at)
    }

    pub fn value_at(&self, at: Vector) -> Option<Value> {
        self.lattice().particles.get(&at).map(|p| p.value.clone())
    }

    pub fn len(&self) -> usize {
        self.lattice().particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn alive_count(&self) -> usize {
        self.lattice()
            .particles
            .values()
            .filter(|p| p.alive())
            .count()
    }

    /// Places `particle` at `at` unless a particle already lives there.
    pub fn plant(&self, at: Vector, particle: Particle) -> bool {
        self.lattice().insert_if_absent(at, particle)
    }

    fn spawn(&self, at: Vector, tuning: &Tuning) -> Particle {
        match self.genesis.seed {
            Some(seed) => {
                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                rng.set_stream(point_stream(at));
                Particle::new_random_with_rng(&self.genesis, tuning, &mut rng)
            }
            None => Particle::new_random(&self.genesis, tuning),
        }
    }

    /// Grows the lattice by one shell of random particles.
    pub fn expand(&self, tuning: &Tuning) {
        self.expand_with(|at| self.spawn(at, tuning));
    }

    /// Grows the lattice by one shell, creating each missing particle with
    /// `make`.
    ///
    /// The first call only creates the origin. Later calls fill every missing
    /// point of the shell cuboid, then promote the shell to head and push the
    /// shell one unit further out.
    pub fn expand_with<F>(&self, make: F)
    where
        F: Fn(Vector) -> Particle + Sync + Send,
    {
        let origin = Vector::zero();
        if !self.has_particle(origin) {
            self.plant(origin, make(origin));
            let mut frontier = self.frontier.write().unwrap_or_else(PoisonError::into_inner);
            frontier.head = [origin, origin];
            frontier.shell = [origin.corner(true), origin.corner(false)];
            tracing::debug!(macrocosm = self.identifier, "Root layer initialized");
            return;
        }

        let shell = self.shell();
        tracing::info!(
            macrocosm = self.identifier,
            layer = shell[0].z,
            "Expanding"
        );

        let created = AtomicUsize::new(0);
        Region::new(shell[0], shell[1]).par_for_each(|at| {
            if self.has_particle(at) {
                return;
            }
            let particle = make(at);
            if self.plant(at, particle) {
                created.fetch_add(1, Ordering::Relaxed);
            }
        });

        let mut frontier = self.frontier.write().unwrap_or_else(PoisonError::into_inner);
        frontier.head = shell;
        frontier.shell = [shell[0].corner(true), shell[1].corner(false)];
        tracing::debug!(
            macrocosm = self.identifier,
            created = created.into_inner(),
            "Shell created"
        );
    }

    fn neighborhood_values(&self, at: Vector, inputs: usize) -> Vec<Value> {
        let params = Mutex::new(Vec::new());
        Region::neighborhood(at, inputs, self.evaluation.coverage_per_layer).par_for_each(|v| {
            if let Some(value) = self.value_at(v) {
                params
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push(value);
            }
        });
        params.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    /// Evaluates every alive particle inside the head once.
    ///
    /// Each particle feeds the values of its neighbourhood into its net and
    /// stores the merged output as its new value. Injections into other
    /// particles are applied after the write-back, under the lattice lock;
    /// one aimed at a particle still being evaluated lands when that particle
    /// is written back. `PollSummary::injections` counts only landed ones.
    pub fn poll(&self) -> PollSummary {
        let head = self.head();
        let evaluated = AtomicUsize::new(0);
        let decayed = AtomicUsize::new(0);
        let injections = AtomicUsize::new(0);

        Region::new(head[0], head[1]).par_for_each(|at| {
            let Some(mut particle) = self.lattice().check_out(at) else {
                return;
            };

            let inputs = particle.num_alive_nodes();
            let params = self.neighborhood_values(at, inputs);
            let evaluation = particle.net.evaluate(&params, &self.evaluation);
            particle.value = evaluation.value;
            if self.evaluation.decay_enabled && particle.net.apply_decay().is_some() {
                decayed.fetch_add(1, Ordering::Relaxed);
            }

            tracing::trace!(
                macrocosm = self.identifier,
                x = at.x,
                y = at.y,
                z = at.z,
                inputs,
                params = params.len(),
                value = ?particle.value,
                "Particle evaluated"
            );

            let mut lattice = self.lattice();
            let mut landed = lattice.check_in(at, particle);
            for injection in evaluation.injections {
                if lattice.apply_injection(injection) {
                    landed += 1;
                }
            }
            drop(lattice);
            injections.fetch_add(landed, Ordering::Relaxed);
            evaluated.fetch_add(1, Ordering::Relaxed);
        });

        let summary = PollSummary {
            evaluated: evaluated.into_inner(),
            decayed: decayed.into_inner(),
            injections: injections.into_inner(),
        };
        tracing::debug!(
            macrocosm = self.identifier,
            evaluated = summary.evaluated,
            decayed = summary.decayed,
            injections = summary.injections,
            "Poll complete"
        );
        summary
    }

    /// Dense copy of the head cuboid, `[z][y][x]` from the lower corner.
    /// Takes the lattice lock once per point.
    pub fn flatten(&self) -> FlattenedMacrocosm {
        let frontier = self.frontier();
        let region = Region::new(frontier.head[0], frontier.head[1]);
        let (lower, upper) = (region.lower(), region.upper());

        let particles = (lower.z..=upper.z)
            .map(|z| {
                (lower.y..=upper.y)
                    .map(|y| {
                        (lower.x..=upper.x)
                            .map(|x| self.particle_at(Vector::new(x, y, z)).unwrap_or_default())
                            .collect()
                    })
                    .collect()
            })
            .collect();

        FlattenedMacrocosm {
            particles,
            head: frontier.head,
            shell: frontier.shell,
            identifier: self.identifier,
        }
    }

    pub fn frame(&self, tuning: &Tuning) -> SystemFrame {
        let frontier = self.frontier();
        SystemFrame {
            head: frontier.head,
            shell: frontier.shell,
            global_difficulty: tuning.computational_difficulty,
            global_entropy: tuning.global_entropy,
        }
    }

    /// Every particle with its position, ordered z, y, x.
    pub fn particle_frame(&self) -> ParticleFrame {
        let mut particles: Vec<(Vector, Particle)> = self
            .lattice()
            .particles
            .iter()
            .map(|(v, p)| (*v, p.clone()))
            .collect();
        particles.sort_by_key(|(v, _)| (v.z, v.y, v.x));
        ParticleFrame { particles }
    }
}
