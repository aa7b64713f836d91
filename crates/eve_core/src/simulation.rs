//! The tick loop that drives one macrocosm.

use crate::config::AppConfig;
use crate::macrocosm::Macrocosm;
use crate::metrics::Metrics;
use crate::tuning::{Tuning, TuningController};
use eve_data::SystemFrame;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Append-only destination for per-tick system frames.
pub trait FrameSink: Send + Sync {
    fn append(&self, macrocosm: usize, frame: &SystemFrame) -> anyhow::Result<()>;
}

pub struct Simulation {
    macrocosm: Arc<Macrocosm>,
    controller: TuningController,
    metrics: Metrics,
    sink: Option<Arc<dyn FrameSink>>,
    log_interval: u64,
}

impl Simulation {
    pub fn new(identifier: usize, config: &AppConfig) -> Self {
        Self::from_macrocosm(Macrocosm::new(identifier, config), config)
    }

    pub fn from_macrocosm(macrocosm: Macrocosm, config: &AppConfig) -> Self {
        Self {
            macrocosm: Arc::new(macrocosm),
            controller: TuningController::new(&config.tuning),
            metrics: Metrics::new(),
            sink: None,
            log_interval: config.simulation.log_interval,
        }
    }

    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn FrameSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Shared handle for readers such as the query API.
    pub fn macrocosm(&self) -> Arc<Macrocosm> {
        Arc::clone(&self.macrocosm)
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn tuning(&self) -> Tuning {
        self.controller.tuning()
    }

    /// Runs one expand and poll, retunes entropy from the tick's wall time and
    /// appends the resulting frame to the sink.
    ///
    /// # Errors
    ///
    /// Returns the sink's error if the frame could not be appended.
    pub fn step(&mut self) -> anyhow::Result<SystemFrame> {
        let start = Instant::now();
        let tuning = self.controller.tuning();
        self.macrocosm.expand(&tuning);
        let summary = self.macrocosm.poll();
        let elapsed = start.elapsed();

        let tuning = self.controller.observe(elapsed);
        let frame = self.macrocosm.frame(&tuning);

        self.metrics
            .add_to_counter("injections", summary.injections as u64);
        self.metrics.add_to_counter("decayed", summary.decayed as u64);
        self.metrics.record_tick(
            self.macrocosm.identifier(),
            elapsed,
            self.macrocosm.len(),
            self.macrocosm.alive_count(),
            self.log_interval,
        );

        if let Some(sink) = &self.sink {
            sink.append(self.macrocosm.identifier(), &frame)?;
        }
        Ok(frame)
    }

    /// Steps until `max_ticks` is reached or `shutdown` is raised. Returns
    /// the number of ticks run.
    pub fn run(&mut self, max_ticks: Option<u64>, shutdown: &AtomicBool) -> anyhow::Result<u64> {
        let mut ticks = 0;
        while max_ticks.map_or(true, |max| ticks < max) && !shutdown.load(Ordering::Relaxed) {
            self.step()?;
            ticks += 1;
        }
        tracing::info!(
            macrocosm = self.macrocosm.identifier(),
            ticks,
            particles = self.macrocosm.len(),
            "Simulation stopped"
        );
        Ok(ticks)
    }
}
