//! Delivery metrics and the exposition server
//!
//! The dispatcher and the axum server share one [`NotifyMetrics`] handle;
//! channel tasks write distinct `(type, name)` keys so the family's own
//! lock is the only synchronization needed.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use prometheus_client::encoding::text::encode;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::gauge::Gauge;
use prometheus_client::registry::Registry;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

type ChannelLabels = Vec<(String, String)>;

/// Per-channel delivery outcome gauges
pub struct NotifyMetrics {
    registry: Registry,
    notify_fail: Family<ChannelLabels, Gauge>,
}

impl NotifyMetrics {
    pub fn new() -> Self {
        let mut registry = Registry::default();
        let notify_fail = Family::<ChannelLabels, Gauge>::default();
        registry.register(
            "notify_fail",
            "Whether the most recent delivery for a channel failed (1) or succeeded (0)",
            notify_fail.clone(),
        );
        Self {
            registry,
            notify_fail,
        }
    }

    /// Record the outcome of one channel delivery, overwriting the
    /// previous value for that channel (last attempt wins)
    pub fn record_outcome(&self, kind: &str, name: &str, ok: bool) {
        self.notify_fail
            .get_or_create(&channel_labels(kind, name))
            .set(i64::from(!ok));
    }

    /// Current gauge value for a channel
    pub fn notify_fail_value(&self, kind: &str, name: &str) -> i64 {
        self.notify_fail
            .get_or_create(&channel_labels(kind, name))
            .get()
    }

    /// Encode the registry in OpenMetrics text format
    pub fn encode(&self) -> Result<String, std::fmt::Error> {
        let mut out = String::new();
        encode(&mut out, &self.registry)?;
        Ok(out)
    }
}

impl Default for NotifyMetrics {
    fn default() -> Self {
        Self::new()
    }
}

fn channel_labels(kind: &str, name: &str) -> ChannelLabels {
    vec![
        ("type".to_string(), kind.to_string()),
        ("name".to_string(), name.to_string()),
    ]
}

async fn serve_metrics(State(metrics): State<Arc<NotifyMetrics>>) -> Response {
    match metrics.encode() {
        Ok(body) => (
            StatusCode::OK,
            [(
                header::CONTENT_TYPE,
                "application/openmetrics-text; version=1.0.0; charset=utf-8",
            )],
            body,
        )
            .into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

async fn health_check() -> &'static str {
    "ok"
}

/// Build the exposition router
pub fn build_router(metrics: Arc<NotifyMetrics>) -> Router {
    Router::new()
        .route("/metrics", get(serve_metrics))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(metrics)
}

/// Serve `/metrics` and `/health` until the process exits
pub async fn run_metrics_server(
    addr: &str,
    metrics: Arc<NotifyMetrics>,
) -> Result<(), std::io::Error> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Metrics server listening on {}", addr);
    axum::serve(listener, build_router(metrics)).await
}
