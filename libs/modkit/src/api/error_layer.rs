//! Centralized error mapping for Axum
//!
//! Everything that is not already a classified domain error ends up here:
//! extractor rejections become 422 Problems, unclassified failures and
//! panics become a detail-free 500.

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::any::Any;

use crate::api::problem::{unprocessable, Problem, ProblemResponse, ValidationError};

/// Detail sent to clients for every failure the server did not classify.
pub const INTERNAL_SERVER_ERROR_DETAIL: &str = "Internal server error";

/// Helper trait for converting errors to Problem responses with context
pub trait IntoProblemResponse {
    fn into_problem_response(self, instance: &str) -> ProblemResponse;
}

impl IntoProblemResponse for anyhow::Error {
    fn into_problem_response(self, instance: &str) -> ProblemResponse {
        tracing::error!(error = %self, "Global exception: {:#}", self);
        generic_internal_problem(instance)
    }
}

impl IntoProblemResponse for JsonRejection {
    fn into_problem_response(self, instance: &str) -> ProblemResponse {
        let message = self.body_text();
        tracing::debug!(%message, "rejected JSON body");

        let pointer = match self {
            JsonRejection::MissingJsonContentType(_) => "/body".to_string(),
            _ => json_pointer_from_message(&message),
        };
        with_instance(
            unprocessable(vec![ValidationError::new(pointer, message)]),
            instance,
        )
    }
}

impl IntoProblemResponse for PathRejection {
    fn into_problem_response(self, instance: &str) -> ProblemResponse {
        with_instance(
            unprocessable(vec![ValidationError::new("/path", self.body_text())]),
            instance,
        )
    }
}

impl IntoProblemResponse for QueryRejection {
    fn into_problem_response(self, instance: &str) -> ProblemResponse {
        with_instance(
            unprocessable(vec![ValidationError::new("/query", self.body_text())]),
            instance,
        )
    }
}

fn with_instance(mut problem: ProblemResponse, instance: &str) -> ProblemResponse {
    problem.0 = problem.0.with_instance(instance);
    problem
}

fn generic_internal_problem(instance: &str) -> ProblemResponse {
    Problem::new(
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal Server Error",
        INTERNAL_SERVER_ERROR_DETAIL,
    )
    .with_code("INTERNAL_ERROR")
    .with_instance(instance)
    .into()
}

/// Best-effort JSON pointer for a serde deserialization message.
///
/// Understands "missing field `x`" and the `path: reason` prefix produced by
/// path-aware deserializers; anything else points at the whole body.
fn json_pointer_from_message(message: &str) -> String {
    if let Some(rest) = message.split("missing field `").nth(1) {
        if let Some(field) = rest.split('`').next() {
            return format!("/{field}");
        }
    }

    let tail = message
        .split_once("target type: ")
        .map(|(_, t)| t)
        .unwrap_or(message);
    if let Some((path, _)) = tail.split_once(": ") {
        let is_path = !path.is_empty()
            && path
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == '[' || c == ']');
        if is_path {
            return format!("/{}", path.replace('.', "/"));
        }
    }
    "/body".to_string()
}

/// Panic handler for `tower_http::catch_panic::CatchPanicLayer::custom`.
///
/// Logs the panic payload and answers with the generic 500 envelope.
pub fn panic_to_problem(err: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic payload"
    };
    tracing::error!(panic = %message, "Global exception: {}", message);
    generic_internal_problem("").into_response()
}
