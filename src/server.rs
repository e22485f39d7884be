//! HTTP API exposing the port store.
//!
//! Routes:
//! - `GET /ports/{id}` — look up one port
//! - `POST /ports/bulk-upsert` — upsert a JSON array of ports
//! - `GET /livez` — liveness probe

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Request, State};
use axum::http::header::HeaderName;
use axum::http::{HeaderValue, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, error, info, info_span};
use uuid::Uuid;

use crate::domain::Ports;
use crate::error::{Error, Result};
use crate::store::PortStore;

/// Correlation id header propagated between the ingestor and the server.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

type SharedStore = Arc<dyn PortStore>;

/// Build the API router over the given store.
pub fn router(store: SharedStore) -> Router {
    Router::new()
        .route("/ports/{id}", get(get_port))
        .route("/ports/bulk-upsert", post(bulk_upsert))
        .route("/livez", get(livez))
        .layer(middleware::from_fn(request_id))
        .with_state(store)
}

/// Bind `addr` and serve the API until `shutdown` is cancelled.
pub async fn serve(addr: &str, store: SharedStore, shutdown: CancellationToken) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| Error::Server(format!("failed to bind {addr}: {e}")))?;

    info!(%addr, "http server listening");

    axum::serve(listener, router(store))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| Error::Server(e.to_string()))
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorData,
}

#[derive(Serialize)]
struct ErrorData {
    message: String,
}

fn error_response(code: StatusCode, message: impl Into<String>) -> Response {
    (
        code,
        Json(ErrorResponse {
            error: ErrorData {
                message: message.into(),
            },
        }),
    )
        .into_response()
}

async fn livez() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn get_port(State(store): State<SharedStore>, Path(id): Path<String>) -> Response {
    match store.get(&id).await {
        Ok(port) => (StatusCode::OK, Json(port)).into_response(),
        Err(Error::PortNotFound) => error_response(StatusCode::NOT_FOUND, "port not found"),
        Err(e) => {
            error!(%id, error = %e, "failed to get port");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

async fn bulk_upsert(
    State(store): State<SharedStore>,
    body: std::result::Result<Json<Ports>, JsonRejection>,
) -> Response {
    let Json(ports) = match body {
        Ok(body) => body,
        Err(e) => {
            error!(error = %e, "failed to decode request body");
            return error_response(StatusCode::BAD_REQUEST, "failed to read request body");
        }
    };

    match store.bulk_upsert(ports).await {
        Ok(()) => StatusCode::CREATED.into_response(),
        Err(e) => {
            error!(error = %e, "failed to upsert ports");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

/// Attach a correlation id to every request: reuse the caller's
/// `x-request-id` when present, mint one otherwise, record it on the request
/// span and echo it back in the response.
async fn request_id(req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let span = info_span!(
        "request",
        method = %req.method(),
        path = %req.uri().path(),
        request_id = %id,
    );

    let mut res = next.run(req).instrument(span).await;

    if let Ok(value) = HeaderValue::from_str(&id) {
        res.headers_mut()
            .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
    }

    res
}
