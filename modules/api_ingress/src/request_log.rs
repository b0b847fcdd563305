//! Access log middleware.
//!
//! One INFO line per request: `"{METHOD} {URL} - {STATUS} - {secs:.4}s"`.

use axum::{
    body::Body,
    http::{header::HOST, Request},
    middleware::Next,
    response::Response,
};
use std::time::Instant;

/// Logs method, full URL, final status and wall-clock latency. Never touches the response.
pub async fn log_requests(req: Request<Body>, next: Next) -> Response {
    let method = req.method().clone();
    let url = full_url(&req);
    let started = Instant::now();

    let response = next.run(req).await;

    let latency_s = started.elapsed().as_secs_f64();
    let status = response.status().as_u16();
    tracing::info!(
        method = %method,
        url = %url,
        status,
        latency_s,
        "{} {} - {} - {:.4}s",
        method,
        url,
        status,
        latency_s
    );
    response
}

/// Rebuilds the absolute URL of an origin-form request from its `Host` header.
pub fn full_url<B>(req: &Request<B>) -> String {
    let uri = req.uri();
    if uri.scheme().is_some() {
        return uri.to_string();
    }
    let path = uri.path_and_query().map(|p| p.as_str()).unwrap_or("/");
    match req.headers().get(HOST).and_then(|h| h.to_str().ok()) {
        Some(host) => format!("http://{host}{path}"),
        None => path.to_string(),
    }
}
