//! Integration tests for the health endpoint

use std::net::TcpListener;
use std::sync::Arc;

use coreapi::configuration::{get_configuration, Settings};
use coreapi::startup::run;
use coreapi::users::InMemoryUserRepository;
use serde_json::Value;

fn spawn_app() -> (String, Settings) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    let settings = get_configuration().expect("Failed to read configuration");
    let address = format!("http://127.0.0.1:{}{}", port, settings.application.base_path());

    let server = run(listener, Arc::new(InMemoryUserRepository::new()), settings.clone())
        .expect("Failed to create server");
    let _ = tokio::spawn(server);

    (address, settings)
}

#[tokio::test]
async fn health_check_works() {
    let (address, settings) = spawn_app();

    let response = reqwest::Client::new()
        .get(&format!("{}/health", address))
        .send()
        .await
        .expect("Failed to execute request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "ok");
    assert_eq!(body["app_name"], settings.application.name.as_str());
    assert_eq!(body["environment"], settings.application.environment.as_str());
    assert_eq!(body["version"], settings.application.api_version.as_str());
}

#[tokio::test]
async fn health_check_is_not_cached() {
    let (address, _) = spawn_app();

    let response = reqwest::Client::new()
        .get(&format!("{}/health", address))
        .send()
        .await
        .expect("Failed to execute request");

    let cache_control = response
        .headers()
        .get("cache-control")
        .and_then(|v| v.to_str().ok());
    assert_eq!(cache_control, Some("no-store"));
}

#[tokio::test]
async fn trace_id_is_echoed() {
    let (address, _) = spawn_app();
    let client = reqwest::Client::new();

    let response = client
        .get(&format!("{}/health", address))
        .header("X-Trace-Id", "trace-abc-123")
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(
        response.headers().get("x-trace-id").and_then(|v| v.to_str().ok()),
        Some("trace-abc-123")
    );

    let response = client
        .get(&format!("{}/health", address))
        .send()
        .await
        .expect("Failed to execute request");
    let generated = response
        .headers()
        .get("x-trace-id")
        .and_then(|v| v.to_str().ok())
        .expect("trace id should be generated")
        .to_string();
    assert_eq!(generated.len(), 32);
    assert!(generated.chars().all(|c| c.is_ascii_hexdigit()));
}

#[tokio::test]
async fn unknown_route_still_gets_trace_id() {
    let (address, _) = spawn_app();

    let response = reqwest::Client::new()
        .get(&format!("{}/does-not-exist", address))
        .header("X-Trace-Id", "trace-404")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(404, response.status().as_u16());
    assert_eq!(
        response.headers().get("x-trace-id").and_then(|v| v.to_str().ok()),
        Some("trace-404")
    );
}
