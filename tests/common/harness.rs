//! Test server harness.
//!
//! Spawns the real router on an ephemeral port in front of a [`MemoryStore`] and a
//! fake scoring engine, so tests talk HTTP end to end.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use parking_lot::Mutex;
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use pairscore::cache::TieredLookup;
use pairscore::compute::{ComputeStage, HttpScoreDelegate};
use pairscore::constants::{CURATED_COLLECTION, OPPORTUNISTIC_COLLECTION};
use pairscore::gateway::{HandlerState, create_router_with_state};
use pairscore::hashing::PairKey;
use pairscore::pipeline::SimilarityPipeline;
use pairscore::store::{MemoryStore, ScoreRecord};

const STARTUP_WAIT_TIMEOUT_SECS: u64 = 5;
const STARTUP_POLL_INTERVAL_MS: u64 = 50;

#[derive(Debug, thiserror::Error)]
pub enum ServerStartupError {
    #[error("Server failed to start within timeout")]
    Timeout,
    #[error("Failed to bind to address: {0}")]
    BindError(#[from] std::io::Error),
    #[error("Server startup failed: {0}")]
    StartupFailed(String),
}

/// How the fake engine answers.
#[derive(Debug, Clone)]
pub struct FakeEngineConfig {
    pub score: f64,
    pub status: StatusCode,
    pub delay: Duration,
    /// When set, computed scores are written into this store's opportunistic collection.
    pub write_back: Option<MemoryStore>,
}

impl Default for FakeEngineConfig {
    fn default() -> Self {
        Self {
            score: 0.42,
            status: StatusCode::OK,
            delay: Duration::ZERO,
            write_back: None,
        }
    }
}

#[derive(Clone)]
struct FakeEngineState {
    config: FakeEngineConfig,
    calls: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<Value>>>,
}

async fn fake_score(
    State(state): State<FakeEngineState>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.calls.fetch_add(1, Ordering::SeqCst);
    state.requests.lock().push(body.clone());

    if !state.config.delay.is_zero() {
        tokio::time::sleep(state.config.delay).await;
    }

    if !state.config.status.is_success() {
        return (
            state.config.status,
            Json(serde_json::json!({ "error": "engine exploded" })),
        );
    }

    let persisted = match (&state.config.write_back, body.get("proteinHashId")) {
        (Some(store), Some(Value::String(key))) if state.config.score >= 0.0 => {
            store.insert(
                OPPORTUNISTIC_COLLECTION,
                PairKey::from_raw(key.clone()),
                ScoreRecord {
                    score: state.config.score,
                    is_cached: true,
                },
            );
            true
        }
        _ => false,
    };

    (
        StatusCode::OK,
        Json(serde_json::json!({ "score": state.config.score, "persisted": persisted })),
    )
}

pub struct FakeEngine {
    pub addr: SocketAddr,
    calls: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<Value>>>,
    _handle: JoinHandle<()>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl FakeEngine {
    pub fn url(&self) -> String {
        format!("http://{}/score", self.addr)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<Value> {
        self.requests.lock().clone()
    }
}

impl Drop for FakeEngine {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

pub async fn spawn_fake_engine(config: FakeEngineConfig) -> Result<FakeEngine, ServerStartupError> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    let state = FakeEngineState {
        config,
        calls: Arc::new(AtomicUsize::new(0)),
        requests: Arc::new(Mutex::new(Vec::new())),
    };
    let calls = state.calls.clone();
    let requests = state.requests.clone();

    let app = Router::new()
        .route("/score", post(fake_score))
        .with_state(state);

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let handle = tokio::spawn(async move {
        let _ = axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await;
    });

    Ok(FakeEngine {
        addr,
        calls,
        requests,
        _handle: handle,
        shutdown_tx: Some(shutdown_tx),
    })
}

#[derive(Debug, Clone)]
pub struct TestServerConfig {
    pub engine_url: String,
    pub engine_timeout: Duration,
    pub single_flight: bool,
    pub store: MemoryStore,
}

impl TestServerConfig {
    pub fn new(engine_url: impl Into<String>) -> Self {
        Self {
            engine_url: engine_url.into(),
            engine_timeout: Duration::from_secs(2),
            single_flight: true,
            store: MemoryStore::new(),
        }
    }

    pub fn with_store(mut self, store: MemoryStore) -> Self {
        self.store = store;
        self
    }

    pub fn with_engine_timeout(mut self, timeout: Duration) -> Self {
        self.engine_timeout = timeout;
        self
    }
}

pub struct TestServer {
    pub addr: SocketAddr,
    _server_handle: JoinHandle<()>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl TestServer {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

pub async fn wait_for_server_ready(
    addr: SocketAddr,
    timeout: Duration,
    interval: Duration,
) -> Result<(), ServerStartupError> {
    let start = std::time::Instant::now();

    loop {
        if start.elapsed() > timeout {
            return Err(ServerStartupError::Timeout);
        }

        match tokio::net::TcpStream::connect(addr).await {
            Ok(_) => return Ok(()),
            Err(_) => {
                tokio::time::sleep(interval).await;
            }
        }
    }
}

/// Spawns the gateway with the real HTTP engine client and a memory store.
pub async fn spawn_test_server(config: TestServerConfig) -> Result<TestServer, ServerStartupError> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let local_addr = listener.local_addr()?;

    let lookup = TieredLookup::from_store(
        Arc::new(config.store),
        CURATED_COLLECTION,
        OPPORTUNISTIC_COLLECTION,
    );
    let delegate = HttpScoreDelegate::new(config.engine_url, config.engine_timeout)
        .map_err(|e| ServerStartupError::StartupFailed(e.to_string()))?;
    let compute = ComputeStage::new(
        Arc::new(delegate),
        config.engine_timeout,
        config.single_flight,
    );
    let pipeline = Arc::new(SimilarityPipeline::from_parts(lookup, compute));

    let app = create_router_with_state(HandlerState::new(pipeline, "memory"));

    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    let server_handle = tokio::spawn(async move {
        let _ = axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await;
    });

    wait_for_server_ready(
        local_addr,
        Duration::from_secs(STARTUP_WAIT_TIMEOUT_SECS),
        Duration::from_millis(STARTUP_POLL_INTERVAL_MS),
    )
    .await?;

    Ok(TestServer {
        addr: local_addr,
        _server_handle: server_handle,
        shutdown_tx: Some(shutdown_tx),
    })
}
