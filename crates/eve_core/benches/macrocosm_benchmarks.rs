use criterion::{black_box, criterion_group, criterion_main, Criterion};
use eve_core::activation::NetLogic;
use eve_core::config::{EvaluationConfig, GenesisConfig};
use eve_core::{Macrocosm, Tuning};
use eve_data::{Net, Value};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn seeded_genesis() -> GenesisConfig {
    GenesisConfig {
        seed: Some(42),
        ..Default::default()
    }
}

/// Benchmark growing a fresh lattice to three shells.
fn bench_expand(c: &mut Criterion) {
    let tuning = Tuning::default();
    c.bench_function("macrocosm_expand_3", |b| {
        b.iter(|| {
            let m = Macrocosm::with_configs(0, seeded_genesis(), EvaluationConfig::default());
            for _ in 0..3 {
                m.expand(&tuning);
            }
            black_box(m.len())
        })
    });
}

/// Benchmark one poll over a 5x5x5 head.
fn bench_poll(c: &mut Criterion) {
    let tuning = Tuning::default();
    let config = EvaluationConfig {
        decay_enabled: false,
        ..Default::default()
    };
    let m = Macrocosm::with_configs(0, seeded_genesis(), config);
    for _ in 0..3 {
        m.expand(&tuning);
    }

    c.bench_function("macrocosm_poll_125", |b| b.iter(|| black_box(m.poll())));
}

/// Benchmark a single random net evaluated sequentially.
fn bench_net_evaluation(c: &mut Criterion) {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let net = Net::new_random_with_rng(&seeded_genesis(), &Tuning::default(), &mut rng);
    let params = vec![Value::Integer(3); net.roots.len()];
    let config = EvaluationConfig {
        edge_kill_chance: 0.0,
        max_traversal_depth: 64,
        ..Default::default()
    };

    c.bench_function("net_evaluate_sequential", |b| {
        b.iter(|| {
            let mut net = net.clone();
            black_box(net.evaluate_sequential_with_rng(&params, &config, &mut rng))
        })
    });
}

criterion_group!(benches, bench_expand, bench_poll, bench_net_evaluation);
criterion_main!(benches);
