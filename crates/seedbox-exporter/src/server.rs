//! HTTP server exposing `/metrics`.

use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::response::{Html, IntoResponse};
use axum::routing::get;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::build_info;
use crate::collector::Exporter;
use crate::error::ExporterError;
use crate::metrics::{TEXT_FORMAT, render};

/// Build the router. Every `GET /metrics` triggers a fresh scrape.
pub fn router(exporter: Arc<Exporter>) -> Router {
    Router::new()
        .route("/", get(handle_index))
        .route("/metrics", get(handle_metrics))
        .with_state(exporter)
}

/// Bind the metrics listener, e.g. on `0.0.0.0:9190`.
pub async fn bind(addr: &str) -> Result<TcpListener, ExporterError> {
    TcpListener::bind(addr)
        .await
        .map_err(|source| ExporterError::Bind {
            addr: addr.to_string(),
            source,
        })
}

/// Serve until `shutdown` is cancelled, then stop accepting and drain
/// in-flight scrapes.
pub async fn serve(
    listener: TcpListener,
    exporter: Arc<Exporter>,
    shutdown: CancellationToken,
) -> Result<(), ExporterError> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, version = %build_info::version_string(), "metrics server listening");
    }

    axum::serve(listener, router(exporter))
        .with_graceful_shutdown(async move {
            shutdown.cancelled().await;
            info!("metrics server shutting down");
        })
        .await?;
    Ok(())
}

// ── Route handlers ──────────────────────────────────────────────────────

async fn handle_metrics(State(exporter): State<Arc<Exporter>>) -> impl IntoResponse {
    let families = exporter.collect().await;
    debug!(families = families.len(), "scrape complete");
    ([(CONTENT_TYPE, TEXT_FORMAT)], render(&families))
}

async fn handle_index() -> Html<String> {
    Html(format!(
        "<html><head><title>Transmission Exporter</title></head><body>\
         <h1>Transmission Exporter</h1><p>{}</p>\
         <p><a href=\"/metrics\">Metrics</a></p></body></html>",
        build_info::version_string()
    ))
}
