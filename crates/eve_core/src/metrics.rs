//! Performance metrics collection for running simulations.
//!
//! Provides structured logging and counters for monitoring tick duration and
//! lattice health.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Metrics collector for one simulation.
pub struct Metrics {
    tick_count: AtomicU64,
    particle_count: AtomicU64,
    alive_count: AtomicU64,
    last_tick_ms: AtomicU64,
    pub counters: Mutex<HashMap<String, AtomicU64>>,
    start_time: Instant,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    #[must_use]
    pub fn new() -> Self {
        Self {
            tick_count: AtomicU64::new(0),
            particle_count: AtomicU64::new(0),
            alive_count: AtomicU64::new(0),
            last_tick_ms: AtomicU64::new(0),
            counters: Mutex::new(HashMap::new()),
            start_time: Instant::now(),
        }
    }

    /// Records a completed tick. Logs a summary at INFO every
    /// `log_interval` ticks.
    pub fn record_tick(
        &self,
        macrocosm: usize,
        duration: Duration,
        particles: usize,
        alive: usize,
        log_interval: u64,
    ) {
        self.tick_count.fetch_add(1, Ordering::Relaxed);
        self.particle_count
            .store(particles as u64, Ordering::Relaxed);
        self.alive_count.store(alive as u64, Ordering::Relaxed);
        self.last_tick_ms
            .store(duration.as_millis() as u64, Ordering::Relaxed);

        let tick = self.tick_count.load(Ordering::Relaxed);
        if log_interval > 0 && tick % log_interval == 0 {
            tracing::info!(
                macrocosm,
                tick,
                particles,
                alive,
                duration_ms = duration.as_millis() as u64,
                "Simulation tick"
            );
        }
    }

    /// Increments a named counter by `by`.
    pub fn add_to_counter(&self, name: &str, by: u64) {
        let mut counters = self.counters.lock().unwrap_or_else(|e| e.into_inner());
        counters
            .entry(name.to_string())
            .or_insert_with(|| AtomicU64::new(0))
            .fetch_add(by, Ordering::Relaxed);
    }

    #[must_use]
    pub fn counter(&self, name: &str) -> u64 {
        let counters = self.counters.lock().unwrap_or_else(|e| e.into_inner());
        counters
            .get(name)
            .map_or(0, |c| c.load(Ordering::Relaxed))
    }

    #[must_use]
    pub fn tick_count(&self) -> u64 {
        self.tick_count.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn particle_count(&self) -> u64 {
        self.particle_count.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn alive_count(&self) -> u64 {
        self.alive_count.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn last_tick(&self) -> Duration {
        Duration::from_millis(self.last_tick_ms.load(Ordering::Relaxed))
    }

    /// Gets elapsed time since metrics creation.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_new() {
        let metrics = Metrics::new();
        assert_eq!(metrics.tick_count(), 0);
        assert_eq!(metrics.last_tick(), Duration::ZERO);
    }

    #[test]
    fn test_record_tick() {
        let metrics = Metrics::new();
        metrics.record_tick(0, Duration::from_millis(16), 27, 20, 1);
        assert_eq!(metrics.tick_count(), 1);
        assert_eq!(metrics.particle_count(), 27);
        assert_eq!(metrics.alive_count(), 20);
        assert_eq!(metrics.last_tick(), Duration::from_millis(16));
    }

    #[test]
    fn test_counters() {
        let metrics = Metrics::new();
        metrics.add_to_counter("injections", 2);
        metrics.add_to_counter("injections", 3);
        assert_eq!(metrics.counter("injections"), 5);
        assert_eq!(metrics.counter("missing"), 0);
    }
}
