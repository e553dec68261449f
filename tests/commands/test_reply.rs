//! Tests for the reply command

use comment_responder::commands::reply;
use comment_responder::config::DEFAULT_FALLBACK_REPLY;
use comment_responder::responder::NO_MODEL;
use httpmock::prelude::*;
use serde_json::json;

use super::mock_config;

#[tokio::test]
async fn test_reply_uses_first_tier() {
    let server = MockServer::start_async().await;
    let tier_a = server.mock(|when, then| {
        when.method(POST)
            .path("/models/tier-a:generateContent")
            .query_param("key", "gemini_key");
        then.status(200).json_body(json!({
            "candidates": [{ "content": { "parts": [{ "text": "Hello there" }] } }]
        }));
    });

    let generated = reply::run(&mock_config(&server.base_url()), "hi")
        .await
        .unwrap();

    assert_eq!(generated.text, "Hello there");
    assert_eq!(generated.model, "tier-a");
    tier_a.assert_calls(1);
}

#[tokio::test]
async fn test_reply_falls_back_when_every_tier_fails() {
    let server = MockServer::start_async().await;
    server.mock(|when, then| {
        when.method(POST);
        then.status(503).body("unavailable");
    });

    let generated = reply::run(&mock_config(&server.base_url()), "price?")
        .await
        .unwrap();

    assert_eq!(generated.text, DEFAULT_FALLBACK_REPLY);
    assert_eq!(generated.model, NO_MODEL);
}
