//! Pairscore HTTP server entrypoint.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tokio::signal;

use pairscore::cache::TieredLookup;
use pairscore::compute::{ComputeStage, HttpScoreDelegate};
use pairscore::config::{Config, StoreBackend};
use pairscore::gateway::{HandlerState, create_router_with_state};
use pairscore::pipeline::SimilarityPipeline;
use pairscore::store::{DocumentStore, FirestoreAuth, FirestoreStore, MemoryStore};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if std::env::args().any(|arg| arg == "--health-check") {
        std::process::exit(run_health_check().await);
    }

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;
    config.validate()?;
    let addr: SocketAddr = config.socket_addr().parse()?;

    tracing::info!(
        bind_addr = %config.bind_addr,
        port = config.port,
        engine_url = %config.engine_url,
        "Pairscore starting"
    );

    let store = build_store(&config)?;
    let store_backend = store.backend_name();

    let lookup = TieredLookup::from_store(
        store,
        &config.curated_collection,
        &config.opportunistic_collection,
    );

    let delegate = HttpScoreDelegate::new(config.engine_url.clone(), config.engine_timeout)?;
    let compute = ComputeStage::new(
        Arc::new(delegate),
        config.engine_timeout,
        config.single_flight,
    );

    let pipeline = Arc::new(SimilarityPipeline::from_parts(lookup, compute));
    let state =
        HandlerState::new(pipeline, store_backend).with_static_dir(config.static_dir.clone());

    let app = create_router_with_state(state);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, store = store_backend, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Pairscore shutdown complete");
    Ok(())
}

fn build_store(config: &Config) -> anyhow::Result<Arc<dyn DocumentStore>> {
    match config.store_backend {
        StoreBackend::Memory => {
            let store = match &config.seed_path {
                Some(path) => MemoryStore::from_seed_file(path)?,
                None => {
                    tracing::warn!(
                        "No PAIRSCORE_SEED_PATH configured, starting with empty collections"
                    );
                    MemoryStore::new()
                }
            };
            tracing::info!(documents = store.total_len(), "Memory store ready");
            Ok(Arc::new(store))
        }
        StoreBackend::Firestore => {
            let project = config
                .firestore_project
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("Firestore backend requires a project"))?;

            let auth = match (&config.firestore_token, config.firestore_emulator) {
                (Some(token), _) => FirestoreAuth::Static(token.clone()),
                (None, true) => FirestoreAuth::Anonymous,
                (None, false) => FirestoreAuth::metadata(),
            };

            let store = FirestoreStore::new(
                &config.firestore_endpoint,
                project,
                &config.firestore_database,
                auth,
            );
            tracing::info!(documents_url = %store.documents_url(), "Firestore store ready");
            Ok(Arc::new(store))
        }
    }
}

async fn run_health_check() -> i32 {
    let url = match Config::from_env() {
        Ok(config) => config.health_check_url(),
        Err(_) => return 1,
    };

    let client = match reqwest::Client::builder()
        .timeout(Duration::from_secs(1))
        .build()
    {
        Ok(client) => client,
        Err(_) => return 1,
    };

    match client.get(&url).send().await {
        Ok(res) if res.status().is_success() => 0,
        _ => 1,
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
