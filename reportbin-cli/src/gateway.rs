// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! HTTP Gateway for reportbin.
//!
//! `POST /api/submit` stores the JSON body and answers `{"id": ...}`.
//! `GET /api/getReport?id=...` answers with the stored document verbatim.
//! Any other method on either route is a 405 that never reaches the store.

use std::fmt;
use std::net::SocketAddr;
use std::time::Instant;

use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, DefaultBodyLimit, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use serde_json::value::RawValue;
use thiserror::Error;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use reportbin_core::{ErrorClass, ReportError, ReportReader, ReportWriter};

use crate::metrics;

/// Gateway state shared across handlers
#[derive(Clone)]
pub struct GatewayState {
    writer: ReportWriter,
    reader: ReportReader,
}

impl GatewayState {
    pub fn new(writer: ReportWriter, reader: ReportReader) -> Self {
        Self { writer, reader }
    }
}

/// Which public operation failed, for response messages and metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Submit,
    Fetch,
}

impl Operation {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Submit => "submit",
            Self::Fetch => "fetch",
        }
    }

    fn failure_message(&self) -> &'static str {
        match self {
            Self::Submit => "Error processing report",
            Self::Fetch => "Error fetching report",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors surfaced over HTTP. Every body is `{"message": ...}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Method Not Allowed")]
    MethodNotAllowed,

    #[error("{message}")]
    BadRequest { message: &'static str },

    #[error("{operation} failed: {source}")]
    Report {
        operation: Operation,
        #[source]
        source: ReportError,
    },
}

impl ApiError {
    fn submit(source: ReportError) -> Self {
        Self::Report {
            operation: Operation::Submit,
            source,
        }
    }

    fn fetch(source: ReportError) -> Self {
        Self::Report {
            operation: Operation::Fetch,
            source,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (operation, source) = match self {
            Self::MethodNotAllowed => {
                return (
                    StatusCode::METHOD_NOT_ALLOWED,
                    Json(json!({ "message": "Method Not Allowed" })),
                )
                    .into_response();
            }
            Self::BadRequest { message } => {
                return (StatusCode::BAD_REQUEST, Json(json!({ "message": message })))
                    .into_response();
            }
            Self::Report { operation, source } => (operation, source),
        };

        let class = source.class();
        if class != ErrorClass::NotFound {
            metrics::REPORT_FAILURES
                .with_label_values(&[operation.as_str(), class_label(class)])
                .inc();
        }

        let (status, body) = match (class, &source) {
            (ErrorClass::Client, ReportError::MissingId) => (
                StatusCode::BAD_REQUEST,
                json!({ "message": "Report ID is required" }),
            ),
            (ErrorClass::Client, _) => (
                StatusCode::BAD_REQUEST,
                json!({ "message": "Report body must be a single JSON document" }),
            ),
            (ErrorClass::NotFound, _) => (
                StatusCode::NOT_FOUND,
                json!({ "message": "Report not found or has expired." }),
            ),
            (ErrorClass::Server, _) if operation == Operation::Fetch => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({
                    "message": operation.failure_message(),
                    "detail": server_detail(&source),
                }),
            ),
            (ErrorClass::Server, _) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "message": operation.failure_message() }),
            ),
        };

        (status, Json(body)).into_response()
    }
}

fn class_label(class: ErrorClass) -> &'static str {
    match class {
        ErrorClass::Client => "client",
        ErrorClass::NotFound => "not_found",
        ErrorClass::Server => "server",
    }
}

/// Short diagnostic that does not echo backend replies.
fn server_detail(err: &ReportError) -> &'static str {
    match err {
        ReportError::Store(_) => "report storage is unavailable",
        ReportError::CorruptRecord { .. } => "stored report could not be decoded",
        _ => "internal error",
    }
}

/// Build the router. Split from `start_gateway` so tests can drive it in-process.
pub fn router(state: GatewayState, max_body_bytes: usize, with_metrics: bool) -> Router {
    let mut app = Router::new()
        .route("/api/submit", post(submit).fallback(method_not_allowed))
        // HEAD is dispatched to the GET handler unless it has its own route
        .route(
            "/api/getReport",
            get(get_report)
                .head(method_not_allowed)
                .fallback(method_not_allowed),
        )
        .route("/healthz", get(|| async { "ok" }));

    if with_metrics {
        metrics::init();
        app = app.route("/metrics", get(|| async { metrics::render() }));
    }

    app.layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn start_gateway(
    addr: SocketAddr,
    app: Router,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Gateway listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down gateway");
        })
        .await?;

    Ok(())
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

async fn submit(
    State(state): State<GatewayState>,
    body: Bytes,
) -> Result<Json<serde_json::Value>, ApiError> {
    let text = std::str::from_utf8(&body).map_err(|_| ApiError::BadRequest {
        message: "Report body must be UTF-8 encoded JSON",
    })?;

    // Stored as submitted; the writer only validates it
    let started = Instant::now();
    let result = state.writer.write_raw(text).await;
    metrics::OPERATION_DURATION
        .with_label_values(&["write"])
        .observe(started.elapsed().as_secs_f64());

    let id = result.map_err(ApiError::submit)?;
    metrics::REPORTS_WRITTEN.inc();
    tracing::info!(report_id = %id, "Report submitted");

    Ok(Json(json!({ "id": id })))
}

#[derive(Debug, Deserialize)]
struct ReportQuery {
    id: Option<String>,
}

async fn get_report(
    State(state): State<GatewayState>,
    query: Result<Query<ReportQuery>, QueryRejection>,
) -> Result<Json<Box<RawValue>>, ApiError> {
    let Query(query) = query.map_err(|rejection| {
        tracing::debug!(error = %rejection, "Rejected report query");
        ApiError::BadRequest {
            message: "Invalid query string",
        }
    })?;

    let started = Instant::now();
    let result = state.reader.read_raw(query.id.as_deref()).await;
    metrics::OPERATION_DURATION
        .with_label_values(&["read"])
        .observe(started.elapsed().as_secs_f64());

    let outcome = match &result {
        Ok(_) => "found",
        Err(e) if e.class() == ErrorClass::NotFound => "not_found",
        Err(_) => "error",
    };
    metrics::REPORTS_READ.with_label_values(&[outcome]).inc();

    result.map(Json).map_err(ApiError::fetch)
}
