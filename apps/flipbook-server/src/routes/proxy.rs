//! CORS relay
//!
//! Fetches a remote PDF server-side and returns it with permissive CORS
//! headers, for clients whose direct cross-origin fetch is blocked.

use axum::{
    body::Body,
    extract::{Query, State},
    http::{header, StatusCode},
    response::Response,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::state::AppState;
use crate::viewer::validate_url;

/// Create the relay router
pub fn router() -> Router<AppState> {
    Router::new().route("/*path", get(proxy_pdf))
}

#[derive(Debug, Deserialize)]
pub struct ProxyQuery {
    pub url: Option<String>,
}

/// Relay error body
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

type RelayError = (StatusCode, Json<ErrorResponse>);

fn relay_error(status: StatusCode, error: &str, details: Option<String>) -> RelayError {
    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
            details,
        }),
    )
}

async fn proxy_pdf(
    State(state): State<AppState>,
    Query(query): Query<ProxyQuery>,
) -> Result<Response, RelayError> {
    let raw = query
        .url
        .filter(|url| !url.trim().is_empty())
        .ok_or_else(|| relay_error(StatusCode::BAD_REQUEST, "PDF URL is required", None))?;

    let url = validate_url(&raw).map_err(|e| {
        relay_error(StatusCode::BAD_REQUEST, "Invalid PDF URL", Some(e.to_string()))
    })?;

    tracing::info!("Proxying PDF request to: {}", url);

    let upstream_failure = |details: String| {
        tracing::error!("PDF proxy error: {}", details);
        relay_error(StatusCode::BAD_GATEWAY, "Failed to proxy PDF", Some(details))
    };

    let response = state
        .http_client()
        .get(&url)
        .send()
        .await
        .map_err(|e| upstream_failure(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(upstream_failure(format!(
            "HTTP {}: {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("Unknown")
        )));
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| upstream_failure(e.to_string()))?;

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/pdf")
        .header(header::CONTENT_LENGTH, bytes.len())
        .header(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*")
        .header(header::ACCESS_CONTROL_ALLOW_METHODS, "GET, OPTIONS")
        .header(header::ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type")
        .body(Body::from(bytes))
        .map_err(|e| {
            relay_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to proxy PDF",
                Some(e.to_string()),
            )
        })
}
