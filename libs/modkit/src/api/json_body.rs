//! JSON body extractor that reads a body without `Content-Type` as JSON.
//!
//! Any other non-JSON media type is still rejected through `JsonRejection`,
//! which the error layer reports as 422.

use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::{header::CONTENT_TYPE, HeaderValue},
    Json,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = JsonRejection;

    async fn from_request(mut req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if !req.headers().contains_key(CONTENT_TYPE) {
            req.headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::error_layer::IntoProblemResponse;
    use crate::api::problem::ProblemResponse;
    use axum::{body::Body, http::StatusCode, routing::post, Router};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn echo(
        body: Result<JsonBody<Value>, JsonRejection>,
    ) -> Result<Json<Value>, ProblemResponse> {
        let JsonBody(value) = body.map_err(|e| e.into_problem_response("/echo"))?;
        Ok(Json(value))
    }

    async fn call(content_type: Option<&str>, body: &str) -> (StatusCode, Value) {
        let app = Router::new().route("/echo", post(echo));
        let mut builder = axum::http::Request::builder().method("POST").uri("/echo");
        if let Some(ct) = content_type {
            builder = builder.header(CONTENT_TYPE, ct);
        }
        let response = app
            .oneshot(builder.body(Body::from(body.to_string())).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn body_without_content_type_is_parsed_as_json() {
        let (status, body) = call(None, r#"{"id":1}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"id": 1}));
    }

    #[tokio::test]
    async fn json_content_type_is_accepted() {
        let (status, body) = call(Some("application/json; charset=utf-8"), "[1,2]").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([1, 2]));
    }

    #[tokio::test]
    async fn other_media_types_are_unprocessable() {
        for ct in ["text/plain", "application/x-www-form-urlencoded"] {
            let (status, body) = call(Some(ct), r#"{"id":1}"#).await;
            assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "content-type {ct}");
            assert_eq!(body["errors"][0]["pointer"], "/body");
            assert_eq!(body["instance"], "/echo");
        }
    }
}
