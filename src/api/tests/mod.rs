use super::*;
use crate::decode::{Coordinates, Post, PostList, WeatherReport};
use crate::fetcher::SourceFetcher;
use crate::types::{FetchOutcome, Payload};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use tower::ServiceExt;


pub(super) const WEATHER: &str = "http://api.openweathermap.org/data/2.5/weather?q=Athens";
pub(super) const POSTS: &str = "https://jsonplaceholder.typicode.com/posts";
pub(super) const BROKEN: &str = "https://reqres.in/api/users?page=404";

/// In-memory fetcher returning canned outcomes; unknown sources echo as raw text
pub(super) struct ScriptedFetcher {
    outcomes: HashMap<String, FetchOutcome>,
    pub(super) calls: AtomicU32,
}

#[async_trait]
impl SourceFetcher for ScriptedFetcher {
    async fn fetch(&self, source: &str) -> FetchOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outcomes
            .get(source)
            .cloned()
            .unwrap_or_else(|| FetchOutcome::raw_text(format!("echo {source}")))
    }
}

fn scripted() -> Arc<ScriptedFetcher> {
    let mut outcomes = HashMap::new();
    outcomes.insert(
        WEATHER.to_string(),
        FetchOutcome::Structured(Payload::Weather(WeatherReport {
            city: "Athens".into(),
            coordinates: Coordinates {
                latitude: 37.9795,
                longitude: 23.7162,
            },
            description: "Clouds".into(),
            temperature: 12.5,
            temp_min: 11.0,
            temp_max: 14.0,
            pressure: 1031,
            humidity: 50,
            wind_speed: 4.92,
        })),
    );
    outcomes.insert(
        POSTS.to_string(),
        FetchOutcome::Structured(Payload::PostList(PostList {
            posts: vec![
                Post {
                    user_id: 1,
                    id: 1,
                    title: "Zeta".into(),
                    body: "first body".into(),
                },
                Post {
                    user_id: 1,
                    id: 2,
                    title: "Alpha".into(),
                    body: "second body".into(),
                },
            ],
        })),
    );
    outcomes.insert(
        BROKEN.to_string(),
        FetchOutcome::failed(crate::fetcher::failure_message(BROKEN, 3)),
    );

    Arc::new(ScriptedFetcher {
        outcomes,
        calls: AtomicU32::new(0),
    })
}

/// Router over a scripted fetcher, plus the fetcher for call counting
pub(super) fn test_app_with(config: Config) -> (Router, Arc<ScriptedFetcher>) {
    let fetcher = scripted();
    let engine = AggregationEngine::with_fetcher(&config, fetcher.clone());
    (create_router(engine, Arc::new(config)), fetcher)
}

pub(super) fn test_app() -> (Router, Arc<ScriptedFetcher>) {
    test_app_with(Config::default())
}

pub(super) async fn body_json(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let (app, _) = test_app();

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(json["cache"]["enabled"], true);
    assert_eq!(json["cache"]["entries"], 0);
}

#[tokio::test]
async fn test_health_reports_disabled_cache() {
    let mut config = Config::default();
    config.cache.enabled = false;
    let (app, _) = test_app_with(config);

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    let json = body_json(response).await;
    assert_eq!(json["cache"]["enabled"], false);
}

#[tokio::test]
async fn test_openapi_endpoint() {
    let (app, _) = test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/openapi.json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json["paths"]["/api/aggregate"]["post"].is_object());
}

#[tokio::test]
async fn test_swagger_ui_can_be_disabled() {
    let mut config = Config::default();
    config.server.swagger_ui = false;
    let (app, _) = test_app_with(config);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/swagger-ui/")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_cors_enabled() {
    let (app, _) = test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("Origin", "http://localhost:3000")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response
            .headers()
            .contains_key("access-control-allow-origin"),
        "CORS header should be present when CORS is enabled"
    );
}

#[tokio::test]
async fn test_cors_disabled() {
    let mut config = Config::default();
    config.server.cors_enabled = false;
    let (app, _) = test_app_with(config);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("Origin", "http://localhost:3000")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(!response
        .headers()
        .contains_key("access-control-allow-origin"));
}

#[tokio::test]
async fn test_cors_specific_origin() {
    let mut config = Config::default();
    config.server.cors_origins = vec!["http://allowed.example".to_string()];
    let (app, _) = test_app_with(config);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("Origin", "http://allowed.example")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "http://allowed.example"
    );
}

#[tokio::test]
async fn test_serve_shuts_down_gracefully() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    let fetcher = scripted();
    let config = Config::default();
    let engine = AggregationEngine::with_fetcher(&config, fetcher);

    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
    let server = tokio::spawn(serve(listener, engine, Arc::new(config), async move {
        let _ = stop_rx.await;
    }));

    let health: serde_json::Value = reqwest::get(format!("http://{address}/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["status"], "ok");

    stop_tx.send(()).unwrap();
    let result = tokio::time::timeout(std::time::Duration::from_secs(5), server)
        .await
        .expect("server should stop after the shutdown signal")
        .unwrap();
    assert!(result.is_ok());
}
