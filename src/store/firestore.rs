//! Firestore REST backend.
//!
//! Reads `GET {endpoint}/projects/{project}/databases/{database}/documents/{collection}/{key}`
//! and extracts the `score` field from the typed-value document body.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::{Client as HttpClient, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, instrument};

use super::error::{StoreError, StoreResult};
use super::model::ScoreRecord;
use super::DocumentStore;
use crate::hashing::PairKey;

/// Default Firestore REST endpoint.
pub const DEFAULT_FIRESTORE_ENDPOINT: &str = "https://firestore.googleapis.com/v1";
/// Default database ID.
pub const DEFAULT_FIRESTORE_DATABASE: &str = "(default)";
/// GCE/Cloud Run metadata-server token URL for the default service account.
pub const METADATA_TOKEN_URL: &str =
    "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// How requests to Firestore are authorised.
#[derive(Debug)]
pub enum FirestoreAuth {
    /// No `Authorization` header (Firestore emulator).
    Anonymous,
    /// A fixed bearer token.
    Static(String),
    /// Tokens fetched from the metadata server and cached until shortly before expiry.
    Metadata {
        token_url: String,
        cached: Mutex<Option<CachedToken>>,
    },
}

impl FirestoreAuth {
    pub fn metadata() -> Self {
        Self::metadata_with_url(METADATA_TOKEN_URL)
    }

    pub fn metadata_with_url(token_url: impl Into<String>) -> Self {
        Self::Metadata {
            token_url: token_url.into(),
            cached: Mutex::new(None),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CachedToken {
    token: String,
    expires_at: Instant,
}

#[derive(Deserialize)]
struct MetadataToken {
    access_token: String,
    expires_in: u64,
}

/// Read-only Firestore client.
#[derive(Debug)]
pub struct FirestoreStore {
    http: HttpClient,
    documents_url: String,
    auth: FirestoreAuth,
}

impl FirestoreStore {
    pub fn new(endpoint: &str, project: &str, database: &str, auth: FirestoreAuth) -> Self {
        let documents_url = format!(
            "{}/projects/{}/databases/{}/documents",
            endpoint.trim_end_matches('/'),
            project,
            database
        );

        Self {
            http: HttpClient::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_else(|_| HttpClient::new()),
            documents_url,
            auth,
        }
    }

    /// Base URL that collection paths are appended to.
    pub fn documents_url(&self) -> &str {
        &self.documents_url
    }

    async fn bearer_token(&self) -> StoreResult<Option<String>> {
        match &self.auth {
            FirestoreAuth::Anonymous => Ok(None),
            FirestoreAuth::Static(token) => Ok(Some(token.clone())),
            FirestoreAuth::Metadata { token_url, cached } => {
                let still_valid = cached
                    .lock()
                    .as_ref()
                    .filter(|t| t.expires_at > Instant::now() + TOKEN_REFRESH_MARGIN)
                    .map(|t| t.token.clone());
                if let Some(token) = still_valid {
                    return Ok(Some(token));
                }

                let fresh = self.fetch_metadata_token(token_url).await?;
                let token = fresh.token.clone();
                *cached.lock() = Some(fresh);
                Ok(Some(token))
            }
        }
    }

    async fn fetch_metadata_token(&self, token_url: &str) -> StoreResult<CachedToken> {
        debug!("Fetching access token from metadata server");
        let resp = self
            .http
            .get(token_url)
            .header("Metadata-Flavor", "Google")
            .send()
            .await
            .map_err(|e| StoreError::Auth(format!("metadata request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(StoreError::Auth(format!(
                "metadata server returned {}",
                resp.status()
            )));
        }

        let body: MetadataToken = resp
            .json()
            .await
            .map_err(|e| StoreError::Auth(format!("invalid metadata token: {e}")))?;

        let expires_at = Instant::now()
            .checked_add(Duration::from_secs(body.expires_in))
            .ok_or_else(|| {
                StoreError::Auth(format!("token lifetime out of range: {}s", body.expires_in))
            })?;

        Ok(CachedToken {
            token: body.access_token,
            expires_at,
        })
    }
}

#[async_trait]
impl DocumentStore for FirestoreStore {
    #[instrument(skip(self, key), fields(key = %key))]
    async fn get(&self, collection: &str, key: &PairKey) -> StoreResult<Option<ScoreRecord>> {
        let url = format!("{}/{}/{}", self.documents_url, collection, key);

        let mut request = self.http.get(&url);
        if let Some(token) = self.bearer_token().await? {
            request = request.bearer_auth(token);
        }

        let resp = request.send().await.map_err(|e| StoreError::RequestFailed {
            collection: collection.to_string(),
            message: e.to_string(),
        })?;

        match resp.status() {
            StatusCode::NOT_FOUND => return Ok(None),
            status if !status.is_success() => {
                return Err(StoreError::UnexpectedStatus {
                    collection: collection.to_string(),
                    status: status.as_u16(),
                });
            }
            _ => {}
        }

        let document: Value = resp.json().await.map_err(|e| StoreError::MalformedDocument {
            collection: collection.to_string(),
            key: key.to_string(),
            reason: e.to_string(),
        })?;

        parse_score_document(&document)
            .map(Some)
            .map_err(|reason| StoreError::MalformedDocument {
                collection: collection.to_string(),
                key: key.to_string(),
                reason,
            })
    }

    fn backend_name(&self) -> &'static str {
        "firestore"
    }
}

/// Extracts a [`ScoreRecord`] from a Firestore REST document body.
///
/// `score` may be stored as `doubleValue` or `integerValue` (Firestore encodes
/// integers as strings). `is_cached` is optional.
pub fn parse_score_document(document: &Value) -> Result<ScoreRecord, String> {
    let fields = document
        .get("fields")
        .ok_or_else(|| "document has no fields".to_string())?;

    let score_value = fields
        .get("score")
        .ok_or_else(|| "missing `score` field".to_string())?;

    let score = numeric_value(score_value)
        .ok_or_else(|| format!("`score` is not numeric: {score_value}"))?;

    let is_cached = fields
        .get("is_cached")
        .and_then(|v| v.get("booleanValue"))
        .and_then(Value::as_bool)
        .unwrap_or(false);

    Ok(ScoreRecord { score, is_cached })
}

fn numeric_value(value: &Value) -> Option<f64> {
    if let Some(v) = value.get("doubleValue") {
        return v.as_f64();
    }
    let v = value.get("integerValue")?;
    v.as_str()
        .and_then(|s| s.parse::<i64>().ok())
        .or_else(|| v.as_i64())
        .map(|i| i as f64)
}
