//! GraphQL metadata client tests against an in-process HTTP server.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{extract::State, http::HeaderMap, http::StatusCode, routing::post, Json, Router};
use serde_json::{json, Value};

use reshoot_core::{
    config::RemoteConfig, FailureKind, GraphqlMetadataClient, MetadataClient, MetadataError,
};

/// What the mock server answers to a listing query.
#[derive(Clone)]
enum Listing {
    Scenes(Value),
    Errors(StatusCode),
}

#[derive(Clone)]
struct MockState {
    listing: Listing,
    requests: Arc<Mutex<Vec<(Option<String>, Value)>>>,
    update_result: Value,
}

async fn graphql(
    State(state): State<MockState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let api_key = headers
        .get("ApiKey")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    state
        .requests
        .lock()
        .unwrap()
        .push((api_key, body.clone()));

    let query = body["query"].as_str().unwrap_or_default();
    if query.contains("findScenes") {
        return match &state.listing {
            Listing::Scenes(data) => (StatusCode::OK, Json(json!({ "data": data }))),
            Listing::Errors(status) => (
                *status,
                Json(json!({ "data": null, "errors": [{ "message": "not authorized" }] })),
            ),
        };
    }

    (
        StatusCode::OK,
        Json(json!({ "data": { "sceneUpdate": state.update_result } })),
    )
}

async fn spawn_server(state: MockState) -> SocketAddr {
    let app = Router::new()
        .route("/graphql", post(graphql))
        .with_state(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn scenes() -> Value {
    json!({
        "findScenes": {
            "count": 2,
            "scenes": [
                { "id": "1", "title": "Beach", "paths": { "screenshot": "http://stash/scene/1/screenshot" } },
                { "id": "2", "title": null, "paths": { "screenshot": null } }
            ]
        }
    })
}

fn state(listing: Listing) -> MockState {
    MockState {
        listing,
        requests: Arc::new(Mutex::new(Vec::new())),
        update_result: json!({ "id": "1" }),
    }
}

fn client(addr: SocketAddr, api_key: &str) -> GraphqlMetadataClient {
    let config = RemoteConfig {
        url: format!("http://{}", addr),
        api_key: api_key.to_string(),
        timeout_secs: 5,
        ..Default::default()
    };
    GraphqlMetadataClient::new(&config).unwrap()
}

#[tokio::test]
async fn test_list_all_records() {
    let state = state(Listing::Scenes(scenes()));
    let requests = state.requests.clone();
    let addr = spawn_server(state).await;

    let records = client(addr, "secret").list_all_records().await.unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].id, "1");
    assert_eq!(records[0].screenshot(), Some("http://stash/scene/1/screenshot"));
    assert!(records[1].screenshot().is_none());

    let requests = requests.lock().unwrap();
    assert_eq!(requests[0].0.as_deref(), Some("secret"));
    assert!(requests[0].1["query"]
        .as_str()
        .unwrap()
        .contains("per_page: -1"));
}

#[tokio::test]
async fn test_no_api_key_header_when_empty() {
    let state = state(Listing::Scenes(scenes()));
    let requests = state.requests.clone();
    let addr = spawn_server(state).await;

    client(addr, "").list_all_records().await.unwrap();
    assert!(requests.lock().unwrap()[0].0.is_none());
}

#[tokio::test]
async fn test_count_mismatch_is_validation_failure() {
    let truncated = json!({
        "findScenes": { "count": 5, "scenes": [ { "id": "1", "title": "", "paths": {} } ] }
    });
    let addr = spawn_server(state(Listing::Scenes(truncated))).await;

    let err = client(addr, "").list_all_records().await.unwrap_err();
    assert_eq!(err.kind(), FailureKind::Validation);
}

#[tokio::test]
async fn test_error_payload_is_protocol_failure_for_any_status() {
    for status in [StatusCode::OK, StatusCode::UNPROCESSABLE_ENTITY] {
        let addr = spawn_server(state(Listing::Errors(status))).await;
        let err = client(addr, "").list_all_records().await.unwrap_err();
        match err {
            MetadataError::Protocol(msg) => assert!(msg.contains("not authorized")),
            other => panic!("expected protocol failure for {}, got {:?}", status, other),
        }
    }
}

#[tokio::test]
async fn test_connection_refused_is_transport_failure() {
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };

    let err = client(addr, "").list_all_records().await.unwrap_err();
    assert_eq!(err.kind(), FailureKind::Transport);
}

#[tokio::test]
async fn test_set_screenshot_path_variables() {
    let state = state(Listing::Scenes(scenes()));
    let requests = state.requests.clone();
    let addr = spawn_server(state).await;
    let client = client(addr, "");

    client
        .set_screenshot_path("1", "/blobs/ab/x.jpg")
        .await
        .unwrap();
    // Same value twice is fine.
    client
        .set_screenshot_path("1", "/blobs/ab/x.jpg")
        .await
        .unwrap();

    let requests = requests.lock().unwrap();
    assert_eq!(requests.len(), 2);
    let variables = &requests[0].1["variables"];
    assert_eq!(
        variables,
        &json!({ "input": { "id": "1", "paths": { "screenshot": "/blobs/ab/x.jpg" } } })
    );
    assert!(requests[0].1["query"]
        .as_str()
        .unwrap()
        .contains("sceneUpdate"));
}

#[tokio::test]
async fn test_set_embedded_screenshot_sends_data_uri() {
    let state = state(Listing::Scenes(scenes()));
    let requests = state.requests.clone();
    let addr = spawn_server(state).await;

    client(addr, "")
        .set_embedded_screenshot("1", &[0xFF, 0xD8, 0xFF])
        .await
        .unwrap();

    let requests = requests.lock().unwrap();
    let input = &requests[0].1["variables"]["input"];
    assert_eq!(input["id"], json!("1"));
    assert_eq!(input["cover_image"], json!("data:image/jpeg;base64,/9j/"));
}

#[tokio::test]
async fn test_null_update_is_protocol_failure() {
    let mut state = state(Listing::Scenes(scenes()));
    state.update_result = Value::Null;
    let addr = spawn_server(state).await;

    let err = client(addr, "")
        .set_screenshot_path("404", "/x.jpg")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), FailureKind::Protocol);
}
