#![allow(dead_code)]

pub mod harness;

use pairscore::pipeline::ResultEnvelope;

pub async fn post_similarity(
    base_url: &str,
    first: &str,
    second: &str,
) -> (u16, String, ResultEnvelope) {
    let body = serde_json::json!({
        "firstProteinSequence": first,
        "secondProteinSequence": second,
    });
    post_raw(base_url, body.to_string()).await
}

pub async fn post_raw(base_url: &str, body: String) -> (u16, String, ResultEnvelope) {
    let resp = reqwest::Client::new()
        .post(format!("{}/similarity", base_url))
        .header("Content-Type", "application/json")
        .body(body)
        .send()
        .await
        .expect("request failed");

    let status = resp.status().as_u16();
    let outcome = resp
        .headers()
        .get(pairscore::pipeline::PAIRSCORE_STATUS_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let envelope = resp.json().await.expect("body is not an envelope");
    (status, outcome, envelope)
}
