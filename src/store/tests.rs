use super::*;
use crate::hashing::{PairKey, derive_pair_key};

use axum::{
    Json, Router,
    extract::Path,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::get,
};
use std::io::Write;
use tokio::net::TcpListener;

const PROJECT: &str = "test-project";

async fn fake_document(
    Path((_project, _database, collection, key)): Path<(String, String, String, String)>,
    headers: HeaderMap,
) -> axum::response::Response {
    let authorized = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == "Bearer secret");
    if !authorized {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    match (collection.as_str(), key.as_str()) {
        ("train-pairs", "pk1-known") => Json(serde_json::json!({
            "name": "projects/test-project/databases/(default)/documents/train-pairs/pk1-known",
            "fields": { "score": { "doubleValue": 0.87 } }
        }))
        .into_response(),
        ("new-pairs", "pk1-integer") => Json(serde_json::json!({
            "fields": {
                "score": { "integerValue": "1" },
                "is_cached": { "booleanValue": true }
            }
        }))
        .into_response(),
        ("new-pairs", "pk1-broken") => Json(serde_json::json!({ "fields": {} })).into_response(),
        ("new-pairs", "pk1-unavailable") => StatusCode::SERVICE_UNAVAILABLE.into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn fake_token(Path(lifetime): Path<String>, headers: HeaderMap) -> axum::response::Response {
    if headers.get("metadata-flavor").and_then(|v| v.to_str().ok()) != Some("Google") {
        return StatusCode::FORBIDDEN.into_response();
    }
    let expires_in: u64 = match lifetime.as_str() {
        "forever" => u64::MAX,
        _ => 3600,
    };
    Json(serde_json::json!({
        "access_token": "secret",
        "expires_in": expires_in,
        "token_type": "Bearer"
    }))
    .into_response()
}

async fn spawn_fake_firestore() -> String {
    let app = Router::new()
        .route(
            "/v1/projects/{project}/databases/{database}/documents/{collection}/{key}",
            get(fake_document),
        )
        .route("/token/{lifetime}", get(fake_token));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}/v1", addr)
}

fn firestore(endpoint: &str) -> FirestoreStore {
    FirestoreStore::new(
        endpoint,
        PROJECT,
        "(default)",
        FirestoreAuth::Static("secret".to_string()),
    )
}

#[tokio::test]
async fn test_memory_store_get_and_miss() {
    let store = MemoryStore::new();
    let key = derive_pair_key("ACDE", "FGHI");
    store.insert("train-pairs", key.clone(), ScoreRecord::new(0.5));

    let hit = store.get("train-pairs", &key).await.unwrap();
    assert_eq!(hit, Some(ScoreRecord::new(0.5)));

    let other_collection = store.get("new-pairs", &key).await.unwrap();
    assert!(other_collection.is_none());

    assert_eq!(store.len("train-pairs"), 1);
    assert_eq!(store.len("new-pairs"), 0);
    assert_eq!(store.backend_name(), "memory");
}

#[tokio::test]
async fn test_memory_store_clones_share_state() {
    let store = MemoryStore::new();
    let clone = store.clone();
    let key = derive_pair_key("MKT", "WY");

    clone.insert("new-pairs", key.clone(), ScoreRecord::new(0.1));
    assert!(store.get("new-pairs", &key).await.unwrap().is_some());

    store.insert("new-pairs", key.clone(), ScoreRecord::new(0.2));
    assert_eq!(clone.len("new-pairs"), 1);
    assert_eq!(
        clone.get("new-pairs", &key).await.unwrap(),
        Some(ScoreRecord::new(0.2))
    );
}

#[tokio::test]
async fn test_seed_json_derives_keys_from_sequences() {
    let store = MemoryStore::from_seed_json(
        r#"{
            "train-pairs": [
                { "first": "fghi", "second": "ACDE", "score": 0.91 },
                { "key": "pk1-explicit", "score": 0.2 }
            ],
            "new-pairs": []
        }"#,
    )
    .expect("valid seed");

    assert_eq!(store.total_len(), 2);
    let derived = store
        .get("train-pairs", &derive_pair_key("ACDE", "FGHI"))
        .await
        .unwrap();
    assert_eq!(derived.map(|r| r.score), Some(0.91));

    let explicit = store
        .get("train-pairs", &PairKey::from_raw("pk1-explicit"))
        .await
        .unwrap();
    assert_eq!(explicit.map(|r| r.score), Some(0.2));
}

#[test]
fn test_seed_json_rejects_keyless_entry() {
    let err = MemoryStore::from_seed_json(r#"{ "train-pairs": [ { "first": "ACDE", "score": 1.0 } ] }"#)
        .unwrap_err();
    assert!(err.contains("train-pairs[0]"), "{err}");
}

#[test]
fn test_seed_file_errors_name_the_path() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"not json").unwrap();

    let err = MemoryStore::from_seed_file(file.path()).unwrap_err();
    match err {
        StoreError::Seed { path, .. } => assert_eq!(path, file.path()),
        other => panic!("expected seed error, got {other:?}"),
    }
}

#[test]
fn test_seed_file_loads() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(br#"{"new-pairs": [{"first": "A", "second": "C", "score": 0.3}]}"#)
        .unwrap();

    let store = MemoryStore::from_seed_file(file.path()).unwrap();
    assert_eq!(store.len("new-pairs"), 1);
}

#[test]
fn test_parse_score_document_double() {
    let doc = serde_json::json!({ "fields": { "score": { "doubleValue": 0.42 } } });
    assert_eq!(parse_score_document(&doc), Ok(ScoreRecord::new(0.42)));
}

#[test]
fn test_parse_score_document_integer_forms() {
    let as_string = serde_json::json!({ "fields": { "score": { "integerValue": "0" } } });
    assert_eq!(parse_score_document(&as_string).map(|r| r.score), Ok(0.0));

    let as_number = serde_json::json!({ "fields": { "score": { "integerValue": 1 } } });
    assert_eq!(parse_score_document(&as_number).map(|r| r.score), Ok(1.0));
}

#[test]
fn test_parse_score_document_rejects_bad_shapes() {
    assert!(parse_score_document(&serde_json::json!({})).is_err());
    assert!(parse_score_document(&serde_json::json!({ "fields": {} })).is_err());
    assert!(
        parse_score_document(&serde_json::json!({
            "fields": { "score": { "stringValue": "high" } }
        }))
        .is_err()
    );
}

#[test]
fn test_firestore_documents_url() {
    let store = firestore("https://firestore.googleapis.com/v1/");
    assert_eq!(
        store.documents_url(),
        "https://firestore.googleapis.com/v1/projects/test-project/databases/(default)/documents"
    );
}

#[tokio::test]
async fn test_firestore_reads_existing_document() {
    let endpoint = spawn_fake_firestore().await;
    let store = firestore(&endpoint);

    let record = store
        .get("train-pairs", &PairKey::from_raw("pk1-known"))
        .await
        .unwrap();
    assert_eq!(record, Some(ScoreRecord::new(0.87)));

    let record = store
        .get("new-pairs", &PairKey::from_raw("pk1-integer"))
        .await
        .unwrap();
    assert_eq!(
        record,
        Some(ScoreRecord {
            score: 1.0,
            is_cached: true
        })
    );
}

#[tokio::test]
async fn test_firestore_missing_document_is_none() {
    let endpoint = spawn_fake_firestore().await;
    let store = firestore(&endpoint);

    let record = store
        .get("train-pairs", &PairKey::from_raw("pk1-absent"))
        .await
        .unwrap();
    assert!(record.is_none());
}

#[tokio::test]
async fn test_firestore_error_statuses() {
    let endpoint = spawn_fake_firestore().await;
    let store = firestore(&endpoint);

    let err = store
        .get("new-pairs", &PairKey::from_raw("pk1-unavailable"))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::UnexpectedStatus { status: 503, .. }));

    let err = store
        .get("new-pairs", &PairKey::from_raw("pk1-broken"))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::MalformedDocument { .. }));
}

#[tokio::test]
async fn test_firestore_anonymous_is_rejected_by_authenticated_server() {
    let endpoint = spawn_fake_firestore().await;
    let store = FirestoreStore::new(&endpoint, PROJECT, "(default)", FirestoreAuth::Anonymous);

    let err = store
        .get("train-pairs", &PairKey::from_raw("pk1-known"))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::UnexpectedStatus { status: 401, .. }));
}

#[tokio::test]
async fn test_firestore_unreachable_is_request_failure() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let store = firestore(&format!("http://{}/v1", addr));
    let err = store
        .get("train-pairs", &PairKey::from_raw("pk1-known"))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::RequestFailed { .. }));
}

#[tokio::test]
async fn test_firestore_metadata_token_is_sent() {
    let endpoint = spawn_fake_firestore().await;
    let token_url = endpoint.replace("/v1", "/token/hour");
    let store = FirestoreStore::new(
        &endpoint,
        PROJECT,
        "(default)",
        FirestoreAuth::metadata_with_url(token_url),
    );

    let record = store
        .get("train-pairs", &PairKey::from_raw("pk1-known"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.score, 0.87);
}

#[tokio::test]
async fn test_firestore_metadata_token_lifetime_overflow_is_auth_error() {
    let endpoint = spawn_fake_firestore().await;
    let token_url = endpoint.replace("/v1", "/token/forever");
    let store = FirestoreStore::new(
        &endpoint,
        PROJECT,
        "(default)",
        FirestoreAuth::metadata_with_url(token_url),
    );

    let err = store
        .get("train-pairs", &PairKey::from_raw("pk1-known"))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Auth(_)));
}
