//! reqwest-backed engine client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use tracing::{debug, instrument};

use super::error::DelegateError;
use super::{EngineResponse, ScoreDelegate, ScoreRequest};

/// POSTs [`ScoreRequest`] bodies to the engine's base URL.
#[derive(Debug, Clone)]
pub struct HttpScoreDelegate {
    http: HttpClient,
    url: String,
    timeout: Duration,
}

impl HttpScoreDelegate {
    /// Creates a client for `url`. `timeout` bounds the whole request at the
    /// transport level.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, DelegateError> {
        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DelegateError::Transport {
                message: e.to_string(),
            })?;

        Ok(Self {
            http,
            url: url.into(),
            timeout,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn transport_error(&self, e: reqwest::Error) -> DelegateError {
        if e.is_timeout() {
            DelegateError::Timeout {
                after: self.timeout,
            }
        } else {
            DelegateError::Transport {
                message: e.to_string(),
            }
        }
    }
}

#[async_trait]
impl ScoreDelegate for HttpScoreDelegate {
    #[instrument(skip(self, request), fields(key = %request.protein_hash_id))]
    async fn score(&self, request: &ScoreRequest) -> Result<EngineResponse, DelegateError> {
        let resp = self
            .http
            .post(&self.url)
            .json(request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(DelegateError::UpstreamStatus {
                status: status.as_u16(),
            });
        }

        let body: EngineResponse = resp.json().await.map_err(|e| {
            if e.is_timeout() {
                self.transport_error(e)
            } else {
                DelegateError::Decode {
                    message: e.to_string(),
                }
            }
        })?;

        debug!(score = body.score, "Engine responded");
        Ok(body)
    }
}
