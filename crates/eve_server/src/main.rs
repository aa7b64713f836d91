use eve_core::config::AppConfig;
use eve_core::Simulation;
use eve_io::StorageManager;
use eve_server::{router, AppState};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn load_config() -> AppConfig {
    let path = std::env::var("EVE_CONFIG").unwrap_or_else(|_| "config.toml".into());
    match AppConfig::load_or_default(&path) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load config: {}", e);
            std::process::exit(1);
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "eve_server=info,eve_core=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = load_config();

    if let Err(e) = std::fs::create_dir_all(&config.storage.data_dir) {
        tracing::error!("Failed to create data dir {}: {}", config.storage.data_dir, e);
        std::process::exit(1);
    }
    let db_path = Path::new(&config.storage.data_dir).join("frames.db");
    let storage = match StorageManager::new(&db_path) {
        Ok(s) => {
            tracing::info!("Initialized frame log: {}", db_path.display());
            Arc::new(s)
        }
        Err(e) => {
            tracing::error!("Failed to initialize storage: {}", e);
            std::process::exit(1);
        }
    };
    let _ = storage.set_meta("fingerprint", config.fingerprint());

    let shutdown = Arc::new(AtomicBool::new(false));
    let mut macrocosms = Vec::new();
    let mut workers = Vec::new();
    for id in 0..config.simulation.num_simulations {
        let mut sim = Simulation::new(id, &config).with_sink(storage.clone());
        macrocosms.push(sim.macrocosm());
        let shutdown = Arc::clone(&shutdown);
        let max_ticks = config.simulation.max_ticks;
        workers.push(std::thread::spawn(move || {
            if let Err(e) = sim.run(max_ticks, &shutdown) {
                tracing::error!(macrocosm = id, "Simulation failed: {}", e);
            }
        }));
    }

    let state = Arc::new(AppState::new(macrocosms).with_storage(Arc::clone(&storage)));
    let app = router(state);

    let addr: SocketAddr = std::env::var("EVE_ADDR")
        .ok()
        .and_then(|a| a.parse().ok())
        .unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], 8080)));

    tracing::info!("Eve query server listening on {}", addr);
    tracing::info!("    Sims API: http://{}/api/sims", addr);

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("Failed to bind to address {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    let serve = axum::serve(listener, app).with_graceful_shutdown(async {
        let _ = tokio::signal::ctrl_c().await;
        tracing::info!("Shutting down");
    });
    if let Err(e) = serve.await {
        tracing::error!("Server error: {}", e);
    }

    shutdown.store(true, Ordering::Relaxed);
    for worker in workers {
        let _ = worker.join();
    }
    storage.shutdown();
}
