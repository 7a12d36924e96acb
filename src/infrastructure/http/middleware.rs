//! HTTP Middleware
//!
//! HTTP 状态码错误日志中间件

use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;

/// HTTP 状态码错误日志中间件
///
/// 4xx 记录 warn，5xx 记录 error；包括路由层自动产生的 404 / 405
pub async fn error_logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let started = Instant::now();

    let response = next.run(request).await;
    let status = response.status();
    let elapsed_ms = started.elapsed().as_millis() as u64;

    if status.is_server_error() {
        tracing::error!(
            method = %method,
            uri = %uri,
            status = status.as_u16(),
            elapsed_ms,
            "HTTP server error"
        );
    } else if status.is_client_error() {
        tracing::warn!(
            method = %method,
            uri = %uri,
            status = status.as_u16(),
            elapsed_ms,
            "HTTP client error"
        );
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::http::ApiError;
    use axum::{
        body::Body,
        http::{Request as HttpRequest, StatusCode},
        routing::get,
        Router,
    };
    use tower::util::ServiceExt;

    async fn missing() -> Result<&'static str, ApiError> {
        Err(ApiError::NotFound("Document not found: x".into()))
    }

    async fn broken() -> Result<&'static str, ApiError> {
        Err(ApiError::Internal("disk full".into()))
    }

    fn router() -> Router {
        Router::new()
            .route("/ok", get(|| async { "OK" }))
            .route("/missing", get(missing))
            .route("/broken", get(broken))
            .layer(axum::middleware::from_fn(error_logging_middleware))
    }

    async fn call(method: &str, uri: &str) -> StatusCode {
        let request = HttpRequest::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        router().oneshot(request).await.unwrap().status()
    }

    #[tokio::test]
    async fn test_passes_responses_through() {
        assert_eq!(call("GET", "/ok").await, StatusCode::OK);
        assert_eq!(call("GET", "/missing").await, StatusCode::NOT_FOUND);
        assert_eq!(call("GET", "/broken").await, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_sees_method_not_allowed() {
        assert_eq!(call("DELETE", "/ok").await, StatusCode::METHOD_NOT_ALLOWED);
    }
}
