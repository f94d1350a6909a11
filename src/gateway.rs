//! The HTTP gateway: one GET route that runs the pipeline and maps outcomes
//! onto wire responses. Authentication lives in front of this service; the
//! gateway's own job is parameter handling, status mapping, and attaching
//! request metadata to every body.

use axum::Json;
use axum::extract::{Query, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use std::time::{Duration, Instant};
use tracing::{info, instrument, warn};

use crate::app_state::AppState;
use crate::error::ScrapeError;
use crate::models::{BlockedResult, ErrorResult, Metadata};

/// Caller-supplied timeouts are clamped into this band.
const MIN_TIMEOUT_MS: u64 = 1_000;
const MAX_TIMEOUT_MS: u64 = 240_000;

#[derive(Debug, Deserialize)]
pub struct ScrapeParams {
    url: Option<String>,
    /// Remaining-time hint in milliseconds.
    timeout: Option<u64>,
}

#[instrument(skip_all, fields(url = params.url.as_deref().unwrap_or("-")))]
pub async fn scrape_handler(
    State(state): State<AppState>,
    Query(params): Query<ScrapeParams>,
) -> Response {
    let started = Instant::now();

    let Some(url) = params.url.filter(|url| !url.is_empty()) else {
        let body = ErrorResult {
            error: "missing \"url\" query parameter".to_string(),
            metadata: Metadata::new("", started),
        };
        return with_cors((StatusCode::BAD_REQUEST, Json(body)).into_response());
    };

    let timeout_ms = params
        .timeout
        .unwrap_or(state.config.default_timeout_ms())
        .clamp(MIN_TIMEOUT_MS, MAX_TIMEOUT_MS);
    let deadline = started + Duration::from_millis(timeout_ms);

    let response = match state.scraper.scrape(&url, deadline).await {
        Ok(result) => {
            info!(duration_ms = result.metadata.duration_ms, "scrape ok");
            (StatusCode::OK, Json(result)).into_response()
        }
        Err(ScrapeError::Blocked { provider, domain }) => {
            warn!(%provider, %domain, "scrape blocked");
            let body = BlockedResult {
                error: "blocked by site protection".to_string(),
                provider,
                domain,
                metadata: Metadata::new(&url, started),
            };
            (StatusCode::UNAVAILABLE_FOR_LEGAL_REASONS, Json(body)).into_response()
        }
        Err(err) => {
            warn!(%err, "scrape failed");
            let body = ErrorResult {
                error: err.to_string(),
                metadata: Metadata::new(&url, started),
            };
            (err.gateway_status(), Json(body)).into_response()
        }
    };

    with_cors(response)
}

/// Preflight response for browser callers.
pub async fn preflight() -> Response {
    with_cors(StatusCode::NO_CONTENT.into_response())
}

fn with_cors(mut response: Response) -> Response {
    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET,OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type,X-Api-Key,x-api-key"),
    );
    response
}
