//! Scripted engine double.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::error::DelegateError;
use super::{EngineResponse, ScoreDelegate, ScoreRequest};

/// Returns a fixed result after an optional delay and records every request.
#[derive(Debug, Clone)]
pub struct MockScoreDelegate {
    result: Arc<Mutex<Result<EngineResponse, DelegateError>>>,
    delay: Duration,
    calls: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<ScoreRequest>>>,
}

impl MockScoreDelegate {
    pub fn returning(score: f64) -> Self {
        Self::with_result(Ok(EngineResponse::new(score)))
    }

    pub fn failing(error: DelegateError) -> Self {
        Self::with_result(Err(error))
    }

    pub fn with_result(result: Result<EngineResponse, DelegateError>) -> Self {
        Self {
            result: Arc::new(Mutex::new(result)),
            delay: Duration::ZERO,
            calls: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn set_result(&self, result: Result<EngineResponse, DelegateError>) {
        *self.result.lock() = result;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<ScoreRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl ScoreDelegate for MockScoreDelegate {
    async fn score(&self, request: &ScoreRequest) -> Result<EngineResponse, DelegateError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push(request.clone());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.result.lock().clone()
    }
}
