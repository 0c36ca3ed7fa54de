//! Remote probe discovery tests against an in-process asset server.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};

use reshoot_core::{
    config::RemoteConfig,
    discovery::{AssetLocation, ContentDiscovery, DiscoveryError},
    pipeline::ReplacementAction,
    testing::{fixtures, MockMetadataClient},
    Classification, EmbeddedPersister, FailureKind, JpegConverter, Pipeline, PipelineConfig,
    Record, RemoteProbeDiscovery,
};

#[derive(Clone)]
struct AssetState {
    hits: Arc<AtomicUsize>,
    webp: Arc<Vec<u8>>,
    png: Arc<Vec<u8>>,
}

fn image(content_type: &'static str, bytes: &[u8]) -> Response {
    ([(header::CONTENT_TYPE, content_type)], bytes.to_vec()).into_response()
}

async fn webp(State(state): State<AssetState>) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);
    image("image/webp", &state.webp)
}

async fn png(State(state): State<AssetState>) -> Response {
    image("image/png", &state.png)
}

// Served as JPEG, actually WebP.
async fn disguised(State(state): State<AssetState>) -> Response {
    image("image/jpeg", &state.webp)
}

// WebP bytes behind a non-image content type.
async fn html(State(state): State<AssetState>) -> Response {
    image("text/html", &state.webp)
}

async fn missing() -> Response {
    StatusCode::NOT_FOUND.into_response()
}

async fn private(State(state): State<AssetState>, headers: HeaderMap) -> Response {
    match headers.get("ApiKey").and_then(|v| v.to_str().ok()) {
        Some("secret") => image("image/webp", &state.webp),
        _ => StatusCode::UNAUTHORIZED.into_response(),
    }
}

struct AssetServer {
    addr: SocketAddr,
    hits: Arc<AtomicUsize>,
}

impl AssetServer {
    async fn spawn() -> Self {
        let hits = Arc::new(AtomicUsize::new(0));
        let state = AssetState {
            hits: hits.clone(),
            webp: Arc::new(fixtures::webp_bytes(8, 8)),
            png: Arc::new(fixtures::png_bytes(8, 8)),
        };
        let app = Router::new()
            .route("/scene/{id}/webp", get(webp))
            .route("/png", get(png))
            .route("/disguised", get(disguised))
            .route("/html", get(html))
            .route("/missing", get(missing))
            .route("/private", get(private))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Self { addr, hits }
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

fn discovery(api_key: &str) -> RemoteProbeDiscovery {
    let config = RemoteConfig {
        api_key: api_key.to_string(),
        timeout_secs: 5,
        ..Default::default()
    };
    RemoteProbeDiscovery::new(&config).unwrap()
}

async fn classify(discovery: &RemoteProbeDiscovery, url: &str) -> Classification {
    let record = Record::new("1", "").with_screenshot(url);
    discovery
        .inspect(&record)
        .await
        .expect("inspect failed")
        .expect("no asset")
        .classification
}

#[tokio::test]
async fn test_inspect_classifies_by_body() {
    let server = AssetServer::spawn().await;
    let discovery = discovery("");

    assert_eq!(classify(&discovery, &server.url("/scene/1/webp")).await, Classification::WebP);
    assert_eq!(classify(&discovery, &server.url("/png")).await, Classification::OtherImage);
    assert_eq!(classify(&discovery, &server.url("/disguised")).await, Classification::WebP);
}

#[tokio::test]
async fn test_non_image_and_error_status_are_not_candidates() {
    let server = AssetServer::spawn().await;
    let discovery = discovery("");

    assert_eq!(classify(&discovery, &server.url("/html")).await, Classification::NotAnImage);
    assert_eq!(classify(&discovery, &server.url("/missing")).await, Classification::NotAnImage);

    let local = Record::new("1", "").with_screenshot("/local/path.webp");
    assert!(discovery.inspect(&local).await.unwrap().is_none());
}

#[tokio::test]
async fn test_api_key_sent_on_fetch() {
    let server = AssetServer::spawn().await;

    assert_eq!(
        classify(&discovery("secret"), &server.url("/private")).await,
        Classification::WebP
    );
    assert_eq!(
        classify(&discovery("wrong"), &server.url("/private")).await,
        Classification::NotAnImage
    );
}

fn closed_url() -> String {
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    format!("http://{}/scene/1/webp", addr)
}

#[tokio::test]
async fn test_unreachable_is_transport_error() {
    let record = Record::new("1", "").with_screenshot(closed_url());
    let err = discovery("").inspect(&record).await.unwrap_err();
    assert!(matches!(err, DiscoveryError::Transport { .. }));
}

#[tokio::test]
async fn test_read_reuses_probed_body() {
    let server = AssetServer::spawn().await;
    let discovery = discovery("");
    let url = server.url("/scene/1/webp");

    assert_eq!(classify(&discovery, &url).await, Classification::WebP);
    let bytes = discovery
        .read(&AssetLocation::Remote(url.clone()))
        .await
        .unwrap();
    assert!(bytes.starts_with(b"RIFF"));
    assert_eq!(server.hits(), 1);

    // The cached body is consumed; a second read fetches again.
    discovery.read(&AssetLocation::Remote(url)).await.unwrap();
    assert_eq!(server.hits(), 2);
}

#[tokio::test]
async fn test_list_candidates() {
    let server = AssetServer::spawn().await;
    let records = vec![
        Record::new("1", "").with_screenshot(server.url("/scene/1/webp")),
        Record::new("2", "").with_screenshot(server.url("/png")),
        Record::new("3", "").with_screenshot("/not/a/url"),
        Record::new("4", ""),
        Record::new("5", "").with_screenshot(server.url("/scene/5/webp")),
        Record::new("6", "").with_screenshot(closed_url()),
    ];

    let listing = discovery("").list_candidates(&records).await;

    assert_eq!(listing.scanned, 4);
    assert_eq!(listing.diagnostics.len(), 1);
    assert!(listing.diagnostics[0].starts_with("record 6"));
    let ids: Vec<&str> = listing
        .candidates
        .iter()
        .filter_map(|c| c.record_id.as_deref())
        .collect();
    assert_eq!(ids, vec!["1", "5"]);
}

#[tokio::test]
async fn test_pipeline_uploads_embedded_jpeg() {
    let server = AssetServer::spawn().await;
    let webp_url = server.url("/scene/1/webp");
    let unreachable = closed_url();
    let metadata = Arc::new(MockMetadataClient::with_records(vec![
        Record::new("1", "Beach").with_screenshot(&webp_url),
        Record::new("2", "Forest").with_screenshot(server.url("/png")),
        Record::new("3", "Gone").with_screenshot(server.url("/missing")),
        Record::new("4", "Offline").with_screenshot(&unreachable),
    ]));

    let pipeline = Pipeline::new(
        PipelineConfig {
            delete_original: true,
            ..Default::default()
        },
        metadata.clone(),
        Arc::new(discovery("")),
        Arc::new(JpegConverter::new()),
        Arc::new(EmbeddedPersister::new(metadata.clone())),
    );
    let report = pipeline.run().await.unwrap();

    assert_eq!(report.stats.processed, 1);
    assert_eq!(report.stats.converted, 1);

    // An unreachable asset is a recorded failure, not a silent skip.
    assert_eq!(report.stats.errors.len(), 1);
    assert_eq!(report.stats.errors[0].id, "4");
    assert_eq!(report.stats.errors[0].kind, FailureKind::Transport);
    assert!(report.stats.errors[0].to_string().contains(&unreachable));

    let replacement = &report.stats.replacements[0];
    assert_eq!(replacement.new_ref, webp_url);
    assert_eq!(replacement.action, ReplacementAction::Converted);

    let uploads = metadata.embedded_updates().await;
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0].0, "1");
    assert!(uploads[0].1.starts_with("data:image/jpeg;base64,/9j/"));
    assert!(metadata.path_updates().await.is_empty());

    // Probe and conversion share one download.
    assert_eq!(server.hits(), 1);
}
