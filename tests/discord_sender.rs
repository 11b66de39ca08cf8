//! Integration tests for `DiscordSender`.
//!
//! Uses `wiremock` to stand in for the Discord REST API, covering message
//! delivery and how each failure status is classified.

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use cardwatch::error::{AppError, SendError};
use cardwatch::services::{DiscordSender, MessageSender};

const CHANNEL: &str = "123456789";
const MESSAGES_PATH: &str = "/channels/123456789/messages";

fn sender(server: &MockServer) -> DiscordSender {
    DiscordSender::new(server.uri(), "test-token").expect("failed to build test DiscordSender")
}

#[tokio::test]
async fn send_posts_content_with_bot_authorization() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(MESSAGES_PATH))
        .and(header("authorization", "Bot test-token"))
        .and(body_json(json!({ "content": "hello" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "1" })))
        .expect(1)
        .mount(&server)
        .await;

    let result = sender(&server).send(CHANNEL, "hello").await;

    assert!(result.is_ok(), "expected Ok, got: {result:?}");
}

#[tokio::test]
async fn send_maps_not_found_to_channel_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(MESSAGES_PATH))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = sender(&server).send(CHANNEL, "hello").await.unwrap_err();

    assert_eq!(
        err,
        SendError::ChannelNotFound {
            channel_id: CHANNEL.to_string()
        }
    );
    assert!(err.is_configuration());
}

#[tokio::test]
async fn send_maps_forbidden_to_permission_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(MESSAGES_PATH))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let err = sender(&server).send(CHANNEL, "hello").await.unwrap_err();

    assert!(matches!(err, SendError::Forbidden { .. }), "got: {err:?}");
    assert!(err.is_configuration());
}

#[tokio::test]
async fn send_maps_server_error_to_delivery_failure() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(MESSAGES_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream broke"))
        .mount(&server)
        .await;

    let err = sender(&server).send(CHANNEL, "hello").await.unwrap_err();

    match err {
        SendError::Delivery(message) => {
            assert!(message.contains("500"), "message: {message}");
            assert!(message.contains("upstream broke"), "message: {message}");
        }
        other => panic!("expected Delivery, got: {other:?}"),
    }
}

#[tokio::test]
async fn ready_returns_bot_user() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/@me"))
        .and(header("authorization", "Bot test-token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "id": "42", "username": "cardbot" })),
        )
        .mount(&server)
        .await;

    let user = sender(&server).ready().await.expect("ready should succeed");

    assert_eq!(user.id, "42");
    assert_eq!(user.username, "cardbot");
}

#[tokio::test]
async fn ready_rejects_invalid_token() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/@me"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let result = sender(&server).ready().await;

    assert!(matches!(result, Err(AppError::Config(_))), "got: {result:?}");
}
