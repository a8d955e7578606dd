// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the API.

use std::sync::Arc;

use axum::{
    routing::get,
    Router,
};
use herald_core::{Blacklist, DeliveryLog, HeraldError, RequestStore};
use herald_dispatch::Intake;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    /// Intake for new send requests.
    pub intake: Arc<Intake>,
    /// Request lifecycle store, for lookups.
    pub store: Arc<dyn RequestStore>,
    /// Blacklist guard, for administration and listing.
    pub blacklist: Arc<dyn Blacklist>,
    /// Delivery log, for history queries.
    pub delivery_log: Arc<dyn DeliveryLog>,
}

/// Gateway server configuration (mirrors ServerConfig from herald-config).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
}

/// Builds the API router over the given state.
pub fn router(state: GatewayState) -> Router {
    Router::new()
        .route("/v1/sms/send", axum::routing::post(handlers::post_sms_send))
        .route("/v1/sms/{request_id}", get(handlers::get_sms_request))
        .route(
            "/v1/blacklist",
            axum::routing::post(handlers::post_blacklist)
                .delete(handlers::delete_blacklist)
                .get(handlers::get_blacklist),
        )
        .route("/v1/sms-logs", get(handlers::get_sms_logs))
        .route("/v1/sms-logs/search", get(handlers::get_sms_logs_search))
        .route("/health", get(handlers::get_health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the gateway HTTP server.
///
/// Binds to the configured host:port and serves until the cancellation
/// token fires, then finishes in-flight requests and returns.
pub async fn start_server(
    config: &ServerConfig,
    state: GatewayState,
    cancel: CancellationToken,
) -> Result<(), HeraldError> {
    let app = router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| HeraldError::Internal(format!("failed to bind gateway to {addr}: {e}")))?;

    tracing::info!("gateway listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { cancel.cancelled().await })
        .await
        .map_err(|e| HeraldError::Internal(format!("gateway server error: {e}")))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use herald_core::{
        DeliveryLog, DeliveryRecord, DispatchMessage, DispatchQueue, Disposition, HeraldError,
        Page, PageRequest, RequestId, RequestStore, SmsRequest,
    };
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use super::*;

    struct EmptyStore;

    #[async_trait]
    impl RequestStore for EmptyStore {
        async fn save(&self, _request: &SmsRequest) -> Result<(), HeraldError> {
            Ok(())
        }
        async fn find_by_id(&self, _id: &RequestId) -> Result<Option<SmsRequest>, HeraldError> {
            Ok(None)
        }
        async fn transition_from_pending(
            &self,
            _id: &RequestId,
            _disposition: &Disposition,
        ) -> Result<bool, HeraldError> {
            Ok(false)
        }
    }

    struct EmptyBlacklist;

    #[async_trait]
    impl Blacklist for EmptyBlacklist {
        async fn add(&self, _recipients: &[String]) -> Result<(), HeraldError> {
            Ok(())
        }
        async fn remove(&self, _recipients: &[String]) -> Result<(), HeraldError> {
            Ok(())
        }
        async fn is_suppressed(&self, _recipient: &str) -> Result<bool, HeraldError> {
            Ok(false)
        }
        async fn list(&self) -> Result<Vec<String>, HeraldError> {
            Ok(Vec::new())
        }
    }

    struct NullQueue;

    #[async_trait]
    impl DispatchQueue for NullQueue {
        async fn publish(&self, _id: &RequestId) -> Result<(), HeraldError> {
            Ok(())
        }
        async fn dequeue(&self) -> Result<Option<DispatchMessage>, HeraldError> {
            Ok(None)
        }
        async fn ack(&self, _message_id: i64) -> Result<(), HeraldError> {
            Ok(())
        }
        async fn fail(&self, _message_id: i64) -> Result<(), HeraldError> {
            Ok(())
        }
    }

    struct EmptyLog;

    #[async_trait]
    impl DeliveryLog for EmptyLog {
        async fn record(&self, _record: &DeliveryRecord) -> Result<(), HeraldError> {
            Ok(())
        }
        async fn find_by_recipient(
            &self,
            _recipient: &str,
            _from: &str,
            _to: &str,
            page: PageRequest,
        ) -> Result<Page<DeliveryRecord>, HeraldError> {
            Ok(Page::new(Vec::new(), page, 0))
        }
        async fn search(
            &self,
            _phrase: &str,
            page: PageRequest,
        ) -> Result<Page<DeliveryRecord>, HeraldError> {
            Ok(Page::new(Vec::new(), page, 0))
        }
    }

    fn stub_router() -> Router {
        let store: Arc<dyn RequestStore> = Arc::new(EmptyStore);
        let queue: Arc<dyn DispatchQueue> = Arc::new(NullQueue);
        router(GatewayState {
            intake: Arc::new(Intake::new(store.clone(), queue)),
            store,
            blacklist: Arc::new(EmptyBlacklist),
            delivery_log: Arc::new(EmptyLog),
        })
    }

    #[tokio::test]
    async fn health_route_is_wired() {
        let app = stub_router();
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn missing_query_parameter_renders_error_envelope() {
        let app = stub_router();
        let response = app
            .oneshot(Request::get("/v1/sms-logs").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["error"]["code"], "BAD_REQUEST");
        assert!(json["error"]["message"].is_string());
    }

    #[tokio::test]
    async fn oversized_page_size_renders_error_envelope() {
        let app = stub_router();
        let response = app
            .oneshot(
                Request::get("/v1/sms-logs/search?text=hi&size=1000")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["error"]["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn malformed_json_body_renders_error_envelope() {
        let app = stub_router();
        let response = app
            .oneshot(
                Request::post("/v1/sms/send")
                    .header("content-type", "application/json")
                    .body(Body::from("{not json"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["error"]["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let app = stub_router();
        let response = app
            .oneshot(Request::get("/v1/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn server_config_debug() {
        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
        };
        let debug = format!("{config:?}");
        assert!(debug.contains("127.0.0.1"));
    }
}
