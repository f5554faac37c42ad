//! HTTP surface
//!
//! `GET /url/reader/{url}` converts `{url}` and answers with the JSON
//! result, or with raw Markdown when the caller asks for text via
//! `?format=text` or `Accept: text/markdown`.

use axum::extract::{Path, RawQuery, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use readerkit::{Reader, ReaderError};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Query key selecting the response format; never forwarded to the target
const FORMAT_KEY: &str = "format";

/// Build the router
pub fn router(reader: Arc<Reader>) -> Router {
    Router::new()
        .route("/url/reader/{*url}", get(read_url))
        .layer(TraceLayer::new_for_http())
        .with_state(reader)
}

/// Bind and serve until Ctrl-C
pub async fn serve(reader: Arc<Reader>, addr: SocketAddr) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(address = %addr, "Starting server");
    axum::serve(listener, router(reader))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received, stopping server...");
}

/// Error body: `{ "error": "...", "kind": "..." }`
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    kind: &'static str,
}

/// Conversion failure mapped to an HTTP response
#[derive(Debug)]
struct ApiError(ReaderError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind) = if self.0.is_invalid_input() {
            (StatusCode::BAD_REQUEST, "invalid_url")
        } else {
            (StatusCode::BAD_GATEWAY, "extraction_failed")
        };
        let body = ErrorBody {
            error: self.0.to_string(),
            kind,
        };
        (status, Json(body)).into_response()
    }
}

async fn read_url(
    State(reader): State<Arc<Reader>>,
    Path(path): Path<String>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let (target_query, as_text) = split_query(query.as_deref());
    let target = target_url(&path, target_query.as_deref());

    // Reject before any conversion work
    if !target.starts_with("http://") && !target.starts_with("https://") {
        return Err(ApiError(ReaderError::InvalidUrlScheme));
    }

    let result = reader.convert(&target).await.map_err(|e| {
        warn!(url = %target, error = %e, "Conversion failed");
        ApiError(e)
    })?;

    if as_text || wants_markdown(&headers) {
        Ok((
            [(header::CONTENT_TYPE, "text/markdown; charset=utf-8")],
            result.markdown,
        )
            .into_response())
    } else {
        Ok(Json(result).into_response())
    }
}

/// Split the request query into the target's own query and the text flag
fn split_query(query: Option<&str>) -> (Option<String>, bool) {
    let Some(query) = query.filter(|q| !q.is_empty()) else {
        return (None, false);
    };

    let mut as_text = false;
    let mut forwarded = url::form_urlencoded::Serializer::new(String::new());
    let mut has_forwarded = false;
    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        if key == FORMAT_KEY {
            as_text = value == "text";
        } else {
            forwarded.append_pair(&key, &value);
            has_forwarded = true;
        }
    }
    let forwarded = has_forwarded.then(|| forwarded.finish());
    (forwarded, as_text)
}

/// Rebuild the target URL from the wildcard path and forwarded query
///
/// Some proxies collapse `//` in paths, so `https:/host` is repaired.
fn target_url(path: &str, query: Option<&str>) -> String {
    let path = path.trim_start_matches('/');
    let mut target = ["https:/", "http:/"]
        .iter()
        .find_map(|scheme| {
            let rest = path.strip_prefix(scheme)?;
            (!rest.starts_with('/')).then(|| format!("{}/{}", scheme, rest))
        })
        .unwrap_or_else(|| path.to_string());

    if let Some(query) = query {
        target.push(if target.contains('?') { '&' } else { '?' });
        target.push_str(query);
    }
    target
}

fn wants_markdown(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|accept| accept.contains("text/markdown"))
}
