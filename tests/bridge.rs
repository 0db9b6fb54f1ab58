//! Integration tests for the sync/async bridges.
//!
//! These run as plain `#[test]` functions: the point of the bridges is
//! that the calling thread has no runtime of its own.

use ai_client_core::{AsyncBridge, BlockingClient, ChatOptions, ClientConfig, Message};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn completion_body() -> String {
    serde_json::json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "model": "test-model",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": "pong"},
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 1, "completion_tokens": 1, "total_tokens": 2}
    })
    .to_string()
}

#[test]
fn blocking_client_round_trips_without_a_caller_runtime() {
    init_tracing();
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(completion_body())
        .expect(2)
        .create();

    let client =
        BlockingClient::new(ClientConfig::new(server.url(), "test-key", "test-model")).unwrap();

    let reply = client
        .chat_completion(&[Message::user("ping")], &ChatOptions::default())
        .unwrap();
    assert_eq!(reply.content().unwrap(), "pong");
    assert!(client.health_check());

    assert_eq!(client.client().stats().requests, 2);
    mock.assert();
    client.close();
}

#[test]
fn blocking_client_lists_models() {
    init_tracing();
    let mut server = mockito::Server::new();
    let _mock = server
        .mock("GET", "/models")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"object": "list", "data": [{"id": "llama-3"}]}"#)
        .create();

    let client =
        BlockingClient::new(ClientConfig::new(server.url(), "test-key", "test-model")).unwrap();
    let models = client.list_models().unwrap();
    assert_eq!(models.len(), 1);
    assert_eq!(models[0].id, "llama-3");
}

#[test]
fn async_bridge_drives_client_calls_for_a_ui_thread() {
    init_tracing();
    let mut server = mockito::Server::new();
    let _mock = server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(completion_body())
        .create();

    let bridge = AsyncBridge::new().unwrap();
    let config = ClientConfig::new(server.url(), "test-key", "test-model");

    // The "UI thread" hands the whole call to the background loop and
    // blocks on the handle; its own loop would keep servicing events.
    let handle = bridge.submit(async move {
        let client = ai_client_core::ApiClient::new(config)?;
        client
            .chat_completion(&[Message::user("ping")], &ChatOptions::default())
            .await
    });

    let reply = handle.wait().unwrap().unwrap();
    assert_eq!(reply.content().unwrap(), "pong");
    bridge.shutdown();
}
