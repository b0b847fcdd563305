//! HTTP host: owns the middleware stack, the health probe, the OpenAPI
//! document endpoint and the serve loop. Feature modules hand in their
//! routers; this crate never knows about their state.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use arc_swap::ArcSwap;
use axum::{
    http::{header, StatusCode},
    middleware::from_fn,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
};

mod config;
pub mod request_id;
pub mod request_log;
mod web;

pub use config::ApiIngressConfig;

pub struct ApiIngress {
    // Lock-free config using arc-swap for read-mostly access
    config: ArcSwap<ApiIngressConfig>,
}

impl Default for ApiIngress {
    fn default() -> Self {
        Self::new(ApiIngressConfig::default())
    }
}

impl ApiIngress {
    pub fn new(config: ApiIngressConfig) -> Self {
        Self {
            config: ArcSwap::from_pointee(config),
        }
    }

    pub fn get_cached_config(&self) -> Arc<ApiIngressConfig> {
        self.config.load_full()
    }

    /// Replace the configuration used by subsequent `build_router` calls.
    pub fn reconfigure(&self, config: ApiIngressConfig) {
        self.config.store(Arc::new(config));
    }

    /// Wrap module routes with the host endpoints and the global middleware stack.
    ///
    /// Request path, outermost first: request id generation and propagation,
    /// trace span, request id extension, access log, panic interception,
    /// CORS (optional), timeout, body limit, routes.
    pub fn build_router(
        &self,
        routes: Router,
        openapi: Option<utoipa::openapi::OpenApi>,
    ) -> Result<Router> {
        let config = self.get_cached_config();
        let mut router = routes.route("/health", get(web::health_check));

        if config.enable_docs {
            if let Some(doc) = openapi {
                // Serialized once, served as static JSON
                let doc = Arc::new(
                    serde_json::to_value(&doc).context("failed to serialize OpenAPI document")?,
                );
                tracing::debug!("serving OpenAPI document at /openapi.json");
                router = router.route(
                    "/openapi.json",
                    get(move || {
                        let doc = doc.clone();
                        async move {
                            ([(header::CACHE_CONTROL, "no-store")], Json((*doc).clone()))
                                .into_response()
                        }
                    }),
                );
            }
        }

        router = router
            .layer(RequestBodyLimitLayer::new(config.body_limit_bytes))
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                Duration::from_secs(config.request_timeout_secs),
            ));

        if config.cors_enabled {
            router = router.layer(CorsLayer::permissive());
        }

        let x_request_id = request_id::header();
        let router = router
            .layer(CatchPanicLayer::custom(modkit::panic_to_problem))
            .layer(from_fn(request_log::log_requests))
            .layer(from_fn(request_id::push_req_id_to_extensions))
            .layer(request_id::create_trace_layer())
            .layer(PropagateRequestIdLayer::new(x_request_id.clone()))
            .layer(SetRequestIdLayer::new(x_request_id, request_id::MakeReqId));

        Ok(router)
    }

    /// Bind `addr` and serve until `cancel` fires.
    pub async fn serve(
        &self,
        router: Router,
        addr: SocketAddr,
        cancel: CancellationToken,
    ) -> Result<()> {
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind HTTP listener on {addr}"))?;
        tracing::info!("HTTP server bound on {}", addr);
        serve_with_listener(router, listener, cancel).await
    }
}

/// Serve on an already bound listener with graceful shutdown on cancel.
pub async fn serve_with_listener(
    router: Router,
    listener: TcpListener,
    cancel: CancellationToken,
) -> Result<()> {
    let shutdown = async move {
        cancel.cancelled().await;
        tracing::info!("HTTP server shutting down gracefully (cancellation)");
    };

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| anyhow::anyhow!(e))
}
