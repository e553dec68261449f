//! Tests for the autoreply command

use comment_responder::commands::autoreply;
use httpmock::prelude::*;
use serde_json::json;

use super::mock_config;

fn mock_comments(server: &MockServer) -> httpmock::Mock<'_> {
    server.mock(|when, then| {
        when.method(GET)
            .path("/v21.0/page1_post9/comments")
            .query_param("access_token", "token");
        then.status(200).json_body(json!({
            "data": [
                {
                    "id": "page1_post9_1",
                    "message": "price?",
                    "from": { "id": "user1", "name": "Karim" },
                    "created_time": "2024-05-01T10:00:00+0000"
                },
                {
                    "id": "page1_post9_2",
                    "message": "Inbox us!",
                    "from": { "id": "page1", "name": "Shop" },
                    "created_time": "2024-05-01T10:05:00+0000"
                }
            ]
        }));
    })
}

#[tokio::test]
async fn test_once_replies_with_second_tier_and_skips_own_comment() {
    let server = MockServer::start_async().await;
    let comments = mock_comments(&server);

    let tier_a = server.mock(|when, then| {
        when.method(POST).path("/models/tier-a:generateContent");
        then.status(429).body(r#"{"error":{"message":"quota"}}"#);
    });
    let tier_b = server.mock(|when, then| {
        when.method(POST).path("/models/tier-b:generateContent");
        then.status(200).json_body(json!({
            "candidates": [{ "content": { "parts": [{ "text": "Please inbox us!" }] } }]
        }));
    });
    let publish = server.mock(|when, then| {
        when.method(POST)
            .path("/v21.0/page1_post9_1/comments")
            .query_param("message", "Please inbox us!");
        then.status(200).json_body(json!({ "id": "reply_1" }));
    });
    let own_reply = server.mock(|when, then| {
        when.method(POST).path("/v21.0/page1_post9_2/comments");
        then.status(200).json_body(json!({ "id": "never" }));
    });

    let report = autoreply::once(&mock_config(&server.base_url()))
        .await
        .unwrap();

    assert_eq!(report.fetched, 2);
    assert_eq!(report.skipped_own, 1);
    assert_eq!(report.replied, 1);
    comments.assert_calls(1);
    tier_a.assert_calls(1);
    tier_b.assert_calls(1);
    publish.assert_calls(1);
    own_reply.assert_calls(0);
}

#[tokio::test]
async fn test_responder_does_not_reply_twice_across_cycles() {
    let server = MockServer::start_async().await;
    mock_comments(&server);
    server.mock(|when, then| {
        when.method(POST).path("/models/tier-a:generateContent");
        then.status(200).json_body(json!({
            "candidates": [{ "content": { "parts": [{ "text": "ধন্যবাদ!" }] } }]
        }));
    });
    let publish = server.mock(|when, then| {
        when.method(POST).path("/v21.0/page1_post9_1/comments");
        then.status(200).json_body(json!({ "id": "reply_1" }));
    });

    let responder = autoreply::build_responder(&mock_config(&server.base_url()))
        .await
        .unwrap();

    let first = responder.run_cycle().await.unwrap();
    let second = responder.run_cycle().await.unwrap();

    assert_eq!(first.replied, 1);
    assert_eq!(second.replied, 0);
    assert_eq!(second.skipped_processed, 1);
    publish.assert_calls(1);
}

#[tokio::test]
async fn test_rejected_publish_is_retried_next_cycle() {
    let server = MockServer::start_async().await;
    mock_comments(&server);
    server.mock(|when, then| {
        when.method(POST).path("/models/tier-a:generateContent");
        then.status(200).json_body(json!({
            "candidates": [{ "content": { "parts": [{ "text": "hi" }] } }]
        }));
    });
    let publish = server.mock(|when, then| {
        when.method(POST).path("/v21.0/page1_post9_1/comments");
        then.status(400)
            .body(r#"{"error":{"message":"(#100) Invalid parameter"}}"#);
    });

    let responder = autoreply::build_responder(&mock_config(&server.base_url()))
        .await
        .unwrap();

    assert_eq!(responder.run_cycle().await.unwrap().publish_failures, 1);
    assert_eq!(responder.run_cycle().await.unwrap().publish_failures, 1);
    publish.assert_calls(2);
}

#[tokio::test]
async fn test_graph_outage_yields_empty_cycle() {
    let server = MockServer::start_async().await;
    server.mock(|when, then| {
        when.method(GET).path("/v21.0/page1_post9/comments");
        then.status(500).body("internal error");
    });

    let report = autoreply::once(&mock_config(&server.base_url()))
        .await
        .unwrap();

    assert_eq!(report.fetched, 0);
    assert_eq!(report.attempted(), 0);
}

#[tokio::test]
async fn test_build_responder_requires_access_token() {
    let mut config = mock_config("http://127.0.0.1:1");
    config.facebook.access_token = "  ".to_string();

    assert!(autoreply::build_responder(&config).await.is_err());
}
