//! HTTP front for [`ApiRouter`].

use std::collections::HashMap;
use std::panic::AssertUnwindSafe;

use anyhow::{Context, Result};
use axum::extract::{RawQuery, State};
use axum::http::{header, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use axum::{Json, Router};
use futures::FutureExt;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::api::ApiRouter;
use crate::error::Error;
use crate::types::ResultEnvelope;

/// Every `/api/*` path goes to the dispatcher; anything else is a plain 404.
pub fn router(api: ApiRouter) -> Router {
    Router::new()
        .route("/api/{*rest}", any(handle_api))
        .with_state(api)
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}

async fn handle_api(State(api): State<ApiRouter>, uri: Uri, RawQuery(query): RawQuery) -> Response {
    let params: HashMap<String, String> = query
        .as_deref()
        .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
        .unwrap_or_default();

    // Envelope failures are still HTTP 200; only internal errors are a 500.
    let envelope = match AssertUnwindSafe(api.dispatch(uri.path(), &params)).catch_unwind().await {
        Ok(envelope) => envelope,
        Err(_) => {
            error!(path = uri.path(), "api handler panicked");
            return internal_error();
        }
    };
    let status = if envelope.code == 500 { StatusCode::INTERNAL_SERVER_ERROR } else { StatusCode::OK };

    match serde_json::to_string(&envelope) {
        Ok(json) => (status, [(header::CONTENT_TYPE, "application/json")], json).into_response(),
        Err(e) => {
            error!(error = %e, "failed to serialize envelope");
            internal_error()
        }
    }
}

fn internal_error() -> Response {
    let envelope = ResultEnvelope::failure(&Error::Internal("api handler failed".to_string()));
    (StatusCode::INTERNAL_SERVER_ERROR, Json(envelope)).into_response()
}

pub async fn serve(api: ApiRouter, bind: &str) -> Result<()> {
    let listener = TcpListener::bind(bind).await.with_context(|| format!("failed to bind {bind}"))?;
    info!(addr = %listener.local_addr()?, "vodhub listening");
    axum::serve(listener, router(api))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
