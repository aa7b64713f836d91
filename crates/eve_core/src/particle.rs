use crate::activation::NetLogic;
use crate::config::GenesisConfig;
use crate::tuning::Tuning;
use eve_data::{Net, Particle};
use rand::Rng;

/// Trait defining how particles come into existence.
pub trait ParticleLogic {
    fn new_random(genesis: &GenesisConfig, tuning: &Tuning) -> Self;
    fn new_random_with_rng<R: Rng + ?Sized>(
        genesis: &GenesisConfig,
        tuning: &Tuning,
        rng: &mut R,
    ) -> Self;
}

impl ParticleLogic for Particle {
    fn new_random(genesis: &GenesisConfig, tuning: &Tuning) -> Self {
        let mut rng = rand::thread_rng();
        Self::new_random_with_rng(genesis, tuning, &mut rng)
    }

    fn new_random_with_rng<R: Rng + ?Sized>(
        genesis: &GenesisConfig,
        tuning: &Tuning,
        rng: &mut R,
    ) -> Self {
        Particle::new(Net::new_random_with_rng(genesis, tuning, rng))
    }
}
