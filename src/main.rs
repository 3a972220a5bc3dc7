//! Visit counter backend.
//!
//! The API tier of a three-tier demo deployment:
//!
//! ```text
//!     Frontend ──HTTP──▶ visit-counter ──RESP──▶ Redis
//!                        /health
//!                        /api/counter (GET, POST)
//!                        /api/info
//! ```
//!
//! Store location comes from `MY_REDIS_HOST` / `MY_REDIS_PORT`, optionally on
//! top of a TOML file given with `--config`.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use visit_counter::config::load_config;
use visit_counter::lifecycle::{signals, Shutdown};
use visit_counter::observability::{logging, metrics};
use visit_counter::store::RedisStore;
use visit_counter::HttpServer;

#[derive(Parser)]
#[command(name = "visit-counter")]
#[command(about = "Visit counter HTTP API backed by Redis", long_about = None)]
struct Args {
    /// Optional TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listen address (e.g. 0.0.0.0:5000).
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = load_config(args.config.as_deref())?;
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }

    logging::init(&config.observability);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        bind_address = %config.listener.bind_address,
        store_host = %config.store.host,
        store_port = config.store.port,
        "visit-counter starting"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;

    let shutdown = Shutdown::new();
    signals::spawn_signal_listener(&shutdown);

    let store = Arc::new(RedisStore::new(&config.store));
    let server = HttpServer::new(config, store);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
