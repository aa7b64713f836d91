use anyhow::Result;
use clap::Parser;
use eve_lib::core::FrameSink;
use eve_lib::io::StorageManager;
use eve_lib::{AppConfig, Simulation};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(author, version, about = "Simulate particle evolution", long_about = None)]
struct Args {
    /// Number of independent macrocosms to run (at least one)
    #[arg(long)]
    num_simulations: Option<usize>,

    /// Custom config file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Store logs in a particular directory
    #[arg(long)]
    logs_path: Option<PathBuf>,

    /// Prevent logs from being persisted to disk
    #[arg(long)]
    disable_log_persistence: bool,

    /// Directory holding the frame log
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Do not record system frames
    #[arg(long)]
    disable_frame_persistence: bool,

    /// Stop every simulation after this many ticks
    #[arg(long)]
    ticks: Option<u64>,
}

impl Args {
    /// Flags override the config file.
    fn apply(&self, config: &mut AppConfig) {
        if let Some(n) = self.num_simulations {
            config.simulation.num_simulations = n;
        }
        config.simulation.num_simulations = config.simulation.num_simulations.max(1);
        if let Some(ticks) = self.ticks {
            config.simulation.max_ticks = Some(ticks);
        }
        if let Some(dir) = &self.data_dir {
            config.storage.data_dir = dir.display().to_string();
        }
        if let Some(dir) = &self.logs_path {
            config.storage.logs_dir = dir.display().to_string();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut config = AppConfig::load_or_default(&args.config)?;
    args.apply(&mut config);

    let logs_dir = (!args.disable_log_persistence).then(|| PathBuf::from(&config.storage.logs_dir));
    if let Some(path) = eve_lib::logging::init("eve=info,eve_core=info", logs_dir.as_deref())? {
        tracing::info!("Writing logs to {}", path.display());
    }

    let storage = if args.disable_frame_persistence {
        None
    } else {
        std::fs::create_dir_all(&config.storage.data_dir)?;
        let storage = StorageManager::new(Path::new(&config.storage.data_dir).join("frames.db"))?;
        storage.set_meta("fingerprint", config.fingerprint())?;
        Some(Arc::new(storage))
    };

    let n = config.simulation.num_simulations;
    tracing::info!("Preparing to spawn {} macrocosms", n);

    let shutdown = Arc::new(AtomicBool::new(false));
    let mut workers = Vec::with_capacity(n);
    for id in 0..n {
        let mut sim = Simulation::new(id, &config);
        if let Some(storage) = &storage {
            sim = sim.with_sink(Arc::clone(storage) as Arc<dyn FrameSink>);
        }
        let shutdown = Arc::clone(&shutdown);
        let max_ticks = config.simulation.max_ticks;
        workers.push(std::thread::spawn(move || sim.run(max_ticks, &shutdown)));
        tracing::info!("Spawned macrocosm ({}/{})", id + 1, n);
    }

    let signal = Arc::clone(&shutdown);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupted, stopping simulations");
            signal.store(true, Ordering::Relaxed);
        }
    });

    let results = tokio::task::spawn_blocking(move || {
        workers
            .into_iter()
            .map(|w| w.join())
            .collect::<Vec<_>>()
    })
    .await?;

    for (id, result) in results.into_iter().enumerate() {
        match result {
            Ok(Ok(ticks)) => tracing::info!(macrocosm = id, ticks, "Macrocosm finished"),
            Ok(Err(e)) => tracing::error!(macrocosm = id, "Simulation failed: {}", e),
            Err(_) => tracing::error!(macrocosm = id, "Simulation thread panicked"),
        }
    }

    if let Some(storage) = storage {
        storage.flush()?;
        storage.shutdown();
    }
    Ok(())
}
