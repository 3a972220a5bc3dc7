//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (CORS, request ID, tracing, metrics)
//! - Serve on a listener until shutdown is signalled

use std::sync::Arc;

use axum::{
    http::HeaderName,
    middleware,
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::CounterConfig;
use crate::http::handlers;
use crate::observability::metrics;
use crate::store::CounterStore;

/// Header carrying the per-request correlation ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<CounterConfig>,
    pub store: Arc<dyn CounterStore>,
}

/// HTTP server for the counter API.
pub struct HttpServer {
    router: Router,
    config: Arc<CounterConfig>,
}

impl HttpServer {
    pub fn new(config: CounterConfig, store: Arc<dyn CounterStore>) -> Self {
        let config = Arc::new(config);
        let state = AppState {
            config: config.clone(),
            store,
        };
        Self {
            router: build_router(state),
            config,
        }
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            store_host = %self.config.store.host,
            store_port = self.config.store.port,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Build the Axum router with all middleware layers.
pub fn build_router(state: AppState) -> Router {
    let request_id = HeaderName::from_static(X_REQUEST_ID);

    Router::new()
        .route("/", get(handlers::service_info))
        .route("/health", get(handlers::health))
        .route(
            "/api/counter",
            get(handlers::get_counter).post(handlers::increment_counter),
        )
        .route("/api/info", get(handlers::host_info))
        .route_layer(middleware::from_fn(metrics::track))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(request_id.clone(), MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::new(request_id))
                .layer(CorsLayer::permissive()),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use axum::{body::Body, http::{Method, Request, StatusCode}};
    use tower::ServiceExt;

    fn test_router(store: MemoryStore) -> Router {
        build_router(AppState {
            config: Arc::new(CounterConfig::default()),
            store: Arc::new(store),
        })
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_root_lists_endpoints() {
        let response = test_router(MemoryStore::new())
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(X_REQUEST_ID));

        let body = json_body(response).await;
        assert_eq!(body["app"], handlers::APP_NAME);
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
        assert_eq!(body["endpoints"][0], "/health");
    }

    #[tokio::test]
    async fn test_increment_then_read() {
        let router = test_router(MemoryStore::new());

        let response = router
            .clone()
            .oneshot(Request::post("/api/counter").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = json_body(response).await;
        assert_eq!(body, serde_json::json!({"count": 1, "message": "Counter incremented"}));

        let response = router
            .oneshot(Request::get("/api/counter").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(json_body(response).await, serde_json::json!({"count": 1}));
    }

    #[tokio::test]
    async fn test_malformed_value_is_server_error() {
        let store = MemoryStore::new();
        store.set_raw(crate::store::COUNTER_KEY, "lots");
        let response = test_router(store)
            .oneshot(Request::get("/api/counter").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json_body(response).await["error"], "INTERNAL");
    }

    #[tokio::test]
    async fn test_cors_preflight_allows_any_origin() {
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/counter")
            .header("origin", "http://frontend.example")
            .header("access-control-request-method", "POST")
            .body(Body::empty())
            .unwrap();
        let response = test_router(MemoryStore::new()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()["access-control-allow-origin"],
            "*"
        );
    }

    #[tokio::test]
    async fn test_unknown_path() {
        let response = test_router(MemoryStore::new())
            .oneshot(Request::get("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
