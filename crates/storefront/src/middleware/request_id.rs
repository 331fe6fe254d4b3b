//! Request ID middleware for request tracing and correlation.
//!
//! Payment notifications are relayed by the browser, so the request ID is the
//! thread that ties a gateway callback to the logs and Sentry events it
//! produced. An upstream `x-request-id` is reused when it looks sane;
//! otherwise a UUID v4 is minted.

use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use tracing::Span;
use uuid::Uuid;

/// The HTTP header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

const MAX_UPSTREAM_ID_LEN: usize = 128;

/// Middleware that ensures every request has a request ID, recorded in the
/// current span, tagged on the Sentry scope and echoed in the response.
pub async fn request_id_middleware(request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .and_then(accept_upstream_id)
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);

    Span::current().record("request_id", &request_id);
    sentry::configure_scope(|scope| {
        scope.set_tag("request_id", &request_id);
    });

    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}

fn accept_upstream_id(id: &str) -> Option<&str> {
    let id = id.trim();
    (!id.is_empty()
        && id.len() <= MAX_UPSTREAM_ID_LEN
        && id.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
    .then_some(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_id_filter() {
        assert_eq!(accept_upstream_id(" cf-8a1b2c "), Some("cf-8a1b2c"));
        assert_eq!(accept_upstream_id(""), None);
        assert_eq!(accept_upstream_id("has space"), None);
        assert_eq!(accept_upstream_id(&"a".repeat(129)), None);
    }
}
