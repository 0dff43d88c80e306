//! Integration tests for the formgen-web server.
//!
//! These tests start a real axum server on a random port and exercise
//! `/generate-form` with stub models and a fake Gemini endpoint.

use std::sync::{Arc, Mutex};

use axum::Router;
use axum::routing::post;
use formgen::{FnModel, FormGenerator, GeminiClient, ModelConfig, Normalizer, UpstreamError};
use formgen_web::{ErrorBody, WebConfig, spawn_web};
use serde_json::{Value, json};

/// Helper: spawn a test server on port 0 (random available port).
async fn spawn_test_server(generator: FormGenerator) -> String {
    let config = WebConfig {
        bind_addr: ([127, 0, 0, 1], 0).into(),
        ..Default::default()
    };
    let addr = spawn_web(generator, config).await.unwrap();
    format!("http://{addr}")
}

/// Helper: server whose model always replies with `reply`.
async fn server_replying(reply: &str) -> String {
    spawn_test_server(FormGenerator::new(FnModel::constant(reply))).await
}

async fn post_prompt(base: &str, prompt: &str) -> reqwest::Response {
    reqwest::Client::new()
        .post(format!("{base}/generate-form"))
        .json(&json!({ "prompt": prompt }))
        .send()
        .await
        .unwrap()
}

fn fallback() -> Value {
    json!({"title": "Generated Form", "fields": []})
}

// ── Normalization through HTTP ───────────────────────────────────────

#[tokio::test]
async fn well_formed_reply_passes_through() {
    let reply = r#"{"title":"Contact","fields":[{"label":"Email","name":"email","type":"email","required":true,"meta":[]}]}"#;
    let base = server_replying(reply).await;

    let resp = post_prompt(&base, "contact form").await;
    assert_eq!(resp.status(), 200);

    let json: Value = resp.json().await.unwrap();
    assert_eq!(json, serde_json::from_str::<Value>(reply).unwrap());
}

#[tokio::test]
async fn response_body_keeps_reply_text() {
    let reply = r#"{"fields":[{"name":"id","default":123456789012345678901234567890}],"title":"Order"}"#;
    let base = server_replying(reply).await;

    let body = post_prompt(&base, "order form").await.text().await.unwrap();
    assert_eq!(body, reply);
}

#[tokio::test]
async fn array_reply_is_wrapped() {
    let base =
        server_replying(r#"[{"label":"Name","name":"name","type":"text","required":true,"meta":[]}]"#)
            .await;

    let json: Value = post_prompt(&base, "name form").await.json().await.unwrap();
    assert_eq!(
        json,
        json!({
            "title": "Generated Form",
            "fields": [{"label":"Name","name":"name","type":"text","required":true,"meta":[]}]
        })
    );
}

#[tokio::test]
async fn unusable_replies_return_fallback_with_200() {
    for reply in [
        "not json at all",
        r#"{"note":"no fields key here"}"#,
        "42",
        "```json\n{\"title\":\"X\",\"fields\":[]}\n```",
    ] {
        let base = server_replying(reply).await;
        let resp = post_prompt(&base, "anything").await;
        assert_eq!(resp.status(), 200, "{reply}");
        let json: Value = resp.json().await.unwrap();
        assert_eq!(json, fallback(), "{reply}");
    }
}

#[tokio::test]
async fn fence_stripping_server_recovers_fenced_reply() {
    let generator = FormGenerator::new(FnModel::constant(
        "```json\n{\"title\":\"X\",\"fields\":[]}\n```",
    ))
    .with_normalizer(Normalizer::new().with_fence_stripping(true));
    let base = spawn_test_server(generator).await;

    let json: Value = post_prompt(&base, "x").await.json().await.unwrap();
    assert_eq!(json, json!({"title": "X", "fields": []}));
}

#[tokio::test]
async fn prompt_reaches_model_verbatim() {
    let seen = Arc::new(Mutex::new(String::new()));
    let sink = seen.clone();
    let generator = FormGenerator::new(FnModel::new(move |prompt| {
        *sink.lock().unwrap() = prompt;
        Ok("[]".to_string())
    }));
    let base = spawn_test_server(generator).await;

    let user_prompt = "Survey with \"quotes\", {braces}\nand a newline";
    assert_eq!(post_prompt(&base, user_prompt).await.status(), 200);
    assert!(seen.lock().unwrap().contains(user_prompt));
}

#[tokio::test]
async fn empty_prompt_is_accepted() {
    let base = server_replying("[]").await;
    let resp = post_prompt(&base, "").await;
    assert_eq!(resp.status(), 200);
}

// ── Errors ───────────────────────────────────────────────────────────

#[tokio::test]
async fn missing_prompt_is_rejected() {
    let base = server_replying("[]").await;
    let resp = reqwest::Client::new()
        .post(format!("{base}/generate-form"))
        .json(&json!({"text": "wrong key"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 422);
}

#[tokio::test]
async fn upstream_failure_returns_502() {
    let generator = FormGenerator::new(FnModel::new(|_| {
        Err(UpstreamError::Network {
            message: "connection refused".into(),
        })
    }));
    let base = spawn_test_server(generator).await;

    let resp = post_prompt(&base, "x").await;
    assert_eq!(resp.status(), 502);
    let body: ErrorBody = resp.json().await.unwrap();
    assert_eq!(body.kind, "network");
    assert!(body.error.contains("connection refused"));
}

#[tokio::test]
async fn rate_limit_returns_503() {
    let generator = FormGenerator::new(FnModel::new(|_| {
        Err(UpstreamError::RateLimited {
            message: "quota".into(),
        })
    }));
    let base = spawn_test_server(generator).await;

    let resp = post_prompt(&base, "x").await;
    assert_eq!(resp.status(), 503);
}

// ── Transport ────────────────────────────────────────────────────────

#[tokio::test]
async fn cors_preflight_allows_any_origin() {
    let base = server_replying("[]").await;

    let resp = reqwest::Client::new()
        .request(reqwest::Method::OPTIONS, format!("{base}/generate-form"))
        .header("Origin", "http://localhost:5173")
        .header("Access-Control-Request-Method", "POST")
        .header("Access-Control-Request-Headers", "content-type")
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());
    assert_eq!(
        resp.headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
}

#[tokio::test]
async fn cors_header_on_simple_request() {
    let base = server_replying("[]").await;
    let resp = reqwest::Client::new()
        .post(format!("{base}/generate-form"))
        .header("Origin", "https://forms.example.com")
        .json(&json!({"prompt": "x"}))
        .send()
        .await
        .unwrap();
    assert_eq!(
        resp.headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
}

#[tokio::test]
async fn serves_static_frontend() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.html"), "<h2>Dynamic Form Generator</h2>").unwrap();

    let config = WebConfig {
        bind_addr: ([127, 0, 0, 1], 0).into(),
        static_dir: Some(dir.path().to_path_buf()),
    };
    let addr = spawn_web(FormGenerator::new(FnModel::constant("[]")), config)
        .await
        .unwrap();

    let resp = reqwest::get(format!("http://{addr}/index.html")).await.unwrap();
    assert_eq!(resp.status(), 200);
    assert!(resp.text().await.unwrap().contains("Dynamic Form Generator"));

    // The API route still wins over the static fallback.
    let resp = post_prompt(&format!("http://{addr}"), "x").await;
    assert_eq!(resp.status(), 200);
}

// ── End to end with a fake Gemini ────────────────────────────────────

#[tokio::test]
async fn gemini_reply_flows_through_endpoint() {
    let gemini = Router::new().route(
        "/v1beta/models/{*rest}",
        post(|| async {
            axum::Json(json!({
                "candidates": [{
                    "content": {"role": "model", "parts": [{"text": "[{\"name\":\"email\"}]"}]},
                    "finishReason": "STOP"
                }]
            }))
        }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let gemini_addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, gemini).await.unwrap();
    });

    let config = ModelConfig::new("test-key")
        .unwrap()
        .with_base_url(format!("http://{gemini_addr}"));
    let client = GeminiClient::new(config).unwrap();
    let base = spawn_test_server(FormGenerator::new(client)).await;

    let json: Value = post_prompt(&base, "newsletter").await.json().await.unwrap();
    assert_eq!(
        json,
        json!({"title": "Generated Form", "fields": [{"name": "email"}]})
    );
}
